//! DeltaPatch とバッファペイロード
//!
//! ## Wire Format
//! ```text
//! DeltaPatch:  {"16": 255, "32": 65}      キー = 10 進数アドレス, 値 = 0..=255
//! Full:        [0, 0, 255, ...]            バッファ全体（容量分）
//! 変更なし:     {}                          空パッチ
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtoError;

/// 疎なアドレス → バイト値の差分
///
/// 「クライアントが最後に知っている状態から変わったバイト」だけを表す。
/// 受信後すぐにレプリカへ適用され、破棄される。
///
/// デコード時にキーと値の形式を検証するため、ここまで届いた `DeltaPatch` は
/// アドレスが非負整数・値がバイトであることが保証される。
/// 容量に対する範囲チェックはレプリカ側の責任。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "BTreeMap<String, u8>")]
pub struct DeltaPatch {
    entries: BTreeMap<usize, u8>,
}

impl DeltaPatch {
    /// 空のパッチ（「変更なし」）
    pub fn new() -> Self {
        DeltaPatch::default()
    }

    /// エントリを追加する。同じアドレスが既にあれば上書きして古い値を返す
    pub fn insert(&mut self, address: usize, value: u8) -> Option<u8> {
        self.entries.insert(address, value)
    }

    /// アドレスの値
    pub fn get(&self, address: usize) -> Option<u8> {
        self.entries.get(&address).copied()
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空パッチか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// アドレス昇順でエントリを返す
    pub fn iter(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.entries.iter().map(|(&address, &value)| (address, value))
    }

    /// 最大アドレス（空なら None）
    pub fn max_address(&self) -> Option<usize> {
        self.entries.keys().next_back().copied()
    }
}

impl FromIterator<(usize, u8)> for DeltaPatch {
    fn from_iter<I: IntoIterator<Item = (usize, u8)>>(iter: I) -> Self {
        DeltaPatch {
            entries: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<Map<String, Value>> for DeltaPatch {
    type Error = ProtoError;

    /// JSON オブジェクトを検証して DeltaPatch に変換する
    ///
    /// 1 つでも不正なエントリがあればパッチ全体を拒否する。
    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let address = parse_address(&key)?;
            let byte = value
                .as_u64()
                .filter(|v| *v <= u8::MAX as u64)
                .ok_or_else(|| ProtoError::ValueOutOfRange {
                    address,
                    value: value.to_string(),
                })?;
            entries.insert(address, byte as u8);
        }
        Ok(DeltaPatch { entries })
    }
}

impl From<DeltaPatch> for BTreeMap<String, u8> {
    fn from(patch: DeltaPatch) -> Self {
        patch
            .entries
            .into_iter()
            .map(|(address, value)| (address.to_string(), value))
            .collect()
    }
}

/// 10 進数のアドレスキーを解析する（符号・空白・16 進は不可）
fn parse_address(key: &str) -> Result<usize, ProtoError> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtoError::NonNumericAddress(key.to_string()));
    }
    key.parse::<usize>()
        .map_err(|_| ProtoError::NonNumericAddress(key.to_string()))
}

/// メモリ / VRAM 同期レスポンスのペイロード
///
/// リモートは差分を返すか、差分が計算できない場合はバッファ全体を返す。
/// バッファ全体も「全アドレスを含む差分」と同値なので、常に正しいフォールバック。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BufferPayload {
    /// バッファ全体（JSON 配列）
    Full(Vec<u8>),
    /// 差分（JSON オブジェクト）。空なら「変更なし」
    Delta(DeltaPatch),
}

impl BufferPayload {
    /// JSON 値からペイロードを判別してデコードする
    ///
    /// - 配列 → `Full`
    /// - オブジェクト → `Delta`
    /// - `null` → 空の `Delta`（変更なし）
    pub fn from_value(value: Value) -> Result<Self, ProtoError> {
        match value {
            Value::Array(_) => Ok(BufferPayload::Full(serde_json::from_value(value)?)),
            Value::Object(map) => Ok(BufferPayload::Delta(DeltaPatch::try_from(map)?)),
            Value::Null => Ok(BufferPayload::Delta(DeltaPatch::new())),
            Value::Bool(_) => Err(ProtoError::UnexpectedPayload("boolean")),
            Value::Number(_) => Err(ProtoError::UnexpectedPayload("number")),
            Value::String(_) => Err(ProtoError::UnexpectedPayload("string")),
        }
    }

    /// JSON 文字列からデコードする（ポーリングのレスポンスボディ用）
    pub fn decode(text: &str) -> Result<Self, ProtoError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// 「変更なし」か
    pub fn is_unchanged(&self) -> bool {
        matches!(self, BufferPayload::Delta(patch) if patch.is_empty())
    }
}

impl<'de> Deserialize<'de> for BufferPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        BufferPayload::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_patch_object() {
        let patch: DeltaPatch = serde_json::from_str(r#"{"16": 255, "32": 65}"#).unwrap();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get(0x10), Some(0xFF));
        assert_eq!(patch.get(0x20), Some(0x41));
        assert_eq!(patch.max_address(), Some(0x20));
    }

    #[test]
    fn test_patch_encodes_string_keys() {
        let patch: DeltaPatch = [(0usize, 0x90u8), (65535, 1)].into_iter().collect();
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"0":144,"65535":1}"#);
    }

    #[test]
    fn test_non_numeric_address_rejected() {
        let map: Map<String, Value> = serde_json::from_str(r#"{"16": 1, "abc": 2}"#).unwrap();
        let err = DeltaPatch::try_from(map).unwrap_err();
        assert!(matches!(err, ProtoError::NonNumericAddress(ref key) if key == "abc"));
    }

    #[test]
    fn test_negative_and_hex_addresses_rejected() {
        assert!(serde_json::from_str::<DeltaPatch>(r#"{"-1": 1}"#).is_err());
        assert!(serde_json::from_str::<DeltaPatch>(r#"{"0x10": 1}"#).is_err());
        assert!(serde_json::from_str::<DeltaPatch>(r#"{"": 1}"#).is_err());
    }

    #[test]
    fn test_value_out_of_byte_range_rejected() {
        let map: Map<String, Value> = serde_json::from_str(r#"{"1": 256}"#).unwrap();
        match DeltaPatch::try_from(map) {
            Err(ProtoError::ValueOutOfRange { address, value }) => {
                assert_eq!(address, 1);
                assert_eq!(value, "256");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let map: Map<String, Value> = serde_json::from_str(r#"{"1": -3}"#).unwrap();
        assert!(DeltaPatch::try_from(map).is_err());

        let map: Map<String, Value> = serde_json::from_str(r#"{"1": "7"}"#).unwrap();
        assert!(DeltaPatch::try_from(map).is_err());
    }

    #[test]
    fn test_payload_discriminates_full_and_delta() {
        assert_eq!(
            BufferPayload::decode("[1, 2, 3]").unwrap(),
            BufferPayload::Full(vec![1, 2, 3])
        );
        let delta = BufferPayload::decode(r#"{"2": 9}"#).unwrap();
        assert!(matches!(delta, BufferPayload::Delta(ref p) if p.get(2) == Some(9)));
    }

    #[test]
    fn test_payload_unchanged_forms() {
        assert!(BufferPayload::decode("{}").unwrap().is_unchanged());
        assert!(BufferPayload::decode("null").unwrap().is_unchanged());
        assert!(!BufferPayload::decode("[]").unwrap().is_unchanged());
    }

    #[test]
    fn test_payload_rejects_scalars_and_bad_bytes() {
        assert!(matches!(
            BufferPayload::decode("42"),
            Err(ProtoError::UnexpectedPayload("number"))
        ));
        assert!(matches!(
            BufferPayload::decode("[1, 300]"),
            Err(ProtoError::Json(_))
        ));
    }
}

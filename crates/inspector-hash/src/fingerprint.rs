//! フィンガープリント（鮮度トークン）

use core::fmt;
use core::str::FromStr;

use crate::error::FingerprintError;
use crate::hash;

/// バッファ内容の 64 ビットフィンガープリント
///
/// ワイヤー上では 10 進数の文字列として扱う（例: `"17241709254077376921"`）。
/// 値そのものに意味はなく、同一性比較にのみ使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// バイト列のフィンガープリントを計算する
    pub fn of(bytes: &[u8]) -> Self {
        Fingerprint(hash(bytes))
    }

    /// 生の 64 ビット値から生成する
    pub const fn from_raw(value: u64) -> Self {
        Fingerprint(value)
    }

    /// 生の 64 ビット値を返す
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    /// 10 進数文字列を解析する
    ///
    /// 前後の空白は許容するが、符号・16 進表記は受け付けない。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FingerprintError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FingerprintError::NotDecimal);
        }
        s.parse::<u64>()
            .map(Fingerprint)
            .map_err(|_| FingerprintError::NotDecimal)
    }
}

impl From<u64> for Fingerprint {
    fn from(val: u64) -> Self {
        Fingerprint(val)
    }
}

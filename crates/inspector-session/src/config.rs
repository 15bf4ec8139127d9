//! セッション設定

use inspector_replica::{MEMORY_CAPACITY, VRAM_CAPACITY};
use inspector_render::DEFAULT_COLUMNS;
use inspector_transport::{TransportKind, DEFAULT_API_BASE, DEFAULT_PUSH_URL};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// レプリカ容量の上限（バイト）
pub const MAX_CAPACITY: usize = 16 * 1024 * 1024;

/// インスペクタの設定
///
/// JSON で省略したフィールドはデフォルト値になる。
///
/// ```json
/// { "transport": "push", "pushUrl": "ws://localhost:3000/ws", "memoryColumns": 16 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct InspectorConfig {
    /// トランスポート戦略
    pub transport: TransportKind,
    /// HTTP API のベース
    pub api_base: String,
    /// プッシュチャンネルの URL
    pub push_url: String,
    /// メモリビューの 1 行あたりの列数
    pub memory_columns: usize,
    /// VRAM ビューの 1 行あたりの列数
    pub video_columns: usize,
    /// メモリレプリカの容量（バイト）
    pub memory_capacity: usize,
    /// VRAM レプリカの容量（バイト）
    pub video_capacity: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        InspectorConfig {
            transport: TransportKind::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            push_url: DEFAULT_PUSH_URL.to_string(),
            memory_columns: DEFAULT_COLUMNS,
            video_columns: DEFAULT_COLUMNS,
            memory_capacity: MEMORY_CAPACITY,
            video_capacity: VRAM_CAPACITY,
        }
    }
}

impl InspectorConfig {
    /// JSON から読み込んで検証する
    ///
    /// # エラー
    /// - `SessionError::Config`: JSON として不正、未知のフィールド
    /// - `SessionError::InvalidConfig`: 値が範囲外
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let config: InspectorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 値を検証する
    ///
    /// 容量は `1..=MAX_CAPACITY`、列数は `1..=容量` に収まること。
    pub fn validate(&self) -> Result<(), SessionError> {
        check_capacity("memoryCapacity", self.memory_capacity)?;
        check_capacity("videoCapacity", self.video_capacity)?;
        check_columns("memoryColumns", self.memory_columns, self.memory_capacity)?;
        check_columns("videoColumns", self.video_columns, self.video_capacity)?;
        if self.transport == TransportKind::Push && self.push_url.is_empty() {
            return Err(SessionError::InvalidConfig("push transport needs a pushUrl".into()));
        }
        Ok(())
    }
}

fn check_capacity(field: &str, capacity: usize) -> Result<(), SessionError> {
    if capacity == 0 || capacity > MAX_CAPACITY {
        return Err(SessionError::InvalidConfig(format!(
            "{} must be between 1 and {} bytes, got {}",
            field, MAX_CAPACITY, capacity
        )));
    }
    Ok(())
}

/// 列数を検証する（セッションの列数変更でも使う）
pub(crate) fn check_columns(
    field: &str,
    columns: usize,
    capacity: usize,
) -> Result<(), SessionError> {
    if columns == 0 || columns > capacity {
        return Err(SessionError::InvalidConfig(format!(
            "{} must be between 1 and {}, got {}",
            field, capacity, columns
        )));
    }
    Ok(())
}

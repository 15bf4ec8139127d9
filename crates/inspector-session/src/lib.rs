//! # inspector-session
//!
//! レプリカストア・トランスポート戦略・差分ビューをまとめるセッション。
//!
//! ```text
//! ホスト (JS)                         InspectorSession
//! ───────────                        ─────────────────────────────────────
//! ユーザー操作 ──start/step/reset──▶ Transport ─▶ Vec<Outbound> ──▶ fetch / WebSocket
//! レスポンス   ──on_response───────▶ Transport::receive ─▶ ReplicaStore
//! プッシュ     ──on_push_message───▶        │
//!                                          └─▶ PC 変更 ─▶ 追加の同期要求 (Vec<Outbound>)
//! 描画         ◀─render_*─────────── HexView (メモリ / VRAM)
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::InspectorConfig;
pub use error::SessionError;
pub use session::{InspectorSession, SessionStats};

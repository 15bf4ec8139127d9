//! インスペクタセッション

use inspector_render::{render_program, render_registers, selected_entry_id, HexLayout, HexView};
use inspector_replica::{BufferId, ReplicaStore, StatusChange};
use inspector_transport::{
    transport_for, Applied, Inbound, Outbound, ResponseKind, Transport, TransportError,
    TransportKind,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{check_columns, InspectorConfig};
use crate::error::SessionError;

/// セッションの統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// 生成した送信要求の数
    pub requests_issued: u64,
    /// ストアに適用したメッセージの数
    pub messages_applied: u64,
    /// 破棄したメッセージの数（プロトコル違反・容量外・未知の種別）
    pub messages_dropped: u64,
    /// バッファに書き込んだ位置の累計
    pub bytes_patched: u64,
    /// 通信失敗の回数
    pub transport_errors: u64,
}

/// インスペクタセッション
///
/// ## 内部構成
/// ```text
/// InspectorSession
///   ├── ReplicaStore        リモート状態の複製
///   ├── Box<dyn Transport>  生成時に選んだ戦略（以後変わらない）
///   ├── HexView × 2         メモリ / VRAM の差分ビュー
///   └── error               通信失敗後のエラー状態（reconnect まで保持）
/// ```
///
/// I/O は持たない。各操作は送るべき [`Outbound`] を返し、
/// ホストが結果を `on_response` / `on_push_message` で戻す。
pub struct InspectorSession {
    config: InspectorConfig,
    store: ReplicaStore,
    transport: Box<dyn Transport>,
    memory_view: HexView,
    video_view: HexView,
    /// 通信失敗の内容。Some の間は新しい操作を受け付けない
    error: Option<String>,
    /// 全同期の要求を出した後
    started: bool,
    stats: SessionStats,
}

impl InspectorSession {
    /// 設定からセッションを生成する
    ///
    /// # エラー
    /// - `SessionError::InvalidConfig`: 設定値が範囲外
    pub fn new(config: InspectorConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let transport = transport_for(config.transport, &config.api_base, &config.push_url);
        info!(transport = %config.transport, "inspector session created");

        Ok(InspectorSession {
            store: ReplicaStore::new(config.memory_capacity, config.video_capacity),
            transport,
            memory_view: HexView::new(BufferId::Memory.as_str(), config.memory_columns),
            video_view: HexView::new(BufferId::Video.as_str(), config.video_columns),
            error: None,
            started: false,
            stats: SessionStats::default(),
            config,
        })
    }

    /// 設定
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// 使用中の戦略
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// レプリカストア（読み取り専用）
    pub fn store(&self) -> &ReplicaStore {
        &self.store
    }

    /// エラー状態の内容
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 統計
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    // ---------------------------------------------------------------
    // 操作
    // ---------------------------------------------------------------

    /// セッションを開始する
    ///
    /// チャンネルが必要な戦略では接続要求を先頭に置き、
    /// ステータス・プログラム・メモリ・VRAM の全同期を要求する。
    /// 開始済みなら何も返さない。エラー状態なら `reconnect` と同じ。
    pub fn start(&mut self) -> Vec<Outbound> {
        if self.error.is_some() {
            return self.reconnect();
        }
        if self.started {
            debug!("session already started");
            return Vec::new();
        }
        self.begin()
    }

    /// 列数を変える（メモリビュー）
    ///
    /// # エラー
    /// - `SessionError::InvalidConfig`: 0 または容量より大きい
    pub fn set_memory_columns(&mut self, columns: usize) -> Result<(), SessionError> {
        check_columns("memoryColumns", columns, self.config.memory_capacity)?;
        self.config.memory_columns = columns;
        self.memory_view.set_columns(columns);
        Ok(())
    }

    /// 列数を変える（VRAM ビュー）
    pub fn set_video_columns(&mut self, columns: usize) -> Result<(), SessionError> {
        check_columns("videoColumns", columns, self.config.video_capacity)?;
        self.config.video_columns = columns;
        self.video_view.set_columns(columns);
        Ok(())
    }

    fn begin(&mut self) -> Vec<Outbound> {
        self.started = true;
        let mut out = Vec::with_capacity(5);
        if let Some(connect) = self.transport.connect() {
            out.push(connect);
        }
        out.push(self.transport.request_status());
        out.push(self.transport.request_program());
        out.push(self.memory_sync());
        out.push(self.video_sync());
        self.issued(out)
    }

    /// ステータスとバッファを取り直す
    pub fn refresh(&mut self) -> Result<Vec<Outbound>, SessionError> {
        self.ensure_ready()?;
        let out = vec![
            self.transport.request_status(),
            self.memory_sync(),
            self.video_sync(),
        ];
        Ok(self.issued(out))
    }

    /// 1 ステップ実行する
    pub fn step(&mut self) -> Result<Vec<Outbound>, SessionError> {
        self.ensure_ready()?;
        let out = vec![self.transport.send_step()];
        Ok(self.issued(out))
    }

    /// リモートをリセットする
    pub fn reset(&mut self) -> Result<Vec<Outbound>, SessionError> {
        self.ensure_ready()?;
        let out = vec![self.transport.send_reset()];
        Ok(self.issued(out))
    }

    /// メモリ同期を要求する
    pub fn sync_memory(&mut self) -> Result<Vec<Outbound>, SessionError> {
        self.ensure_ready()?;
        let out = vec![self.memory_sync()];
        Ok(self.issued(out))
    }

    /// VRAM 同期を要求する
    pub fn sync_video(&mut self) -> Result<Vec<Outbound>, SessionError> {
        self.ensure_ready()?;
        let out = vec![self.video_sync()];
        Ok(self.issued(out))
    }

    // ---------------------------------------------------------------
    // 受信
    // ---------------------------------------------------------------

    /// HTTP レスポンスのボディを適用する
    ///
    /// # 戻り値
    /// 追加で送るべき要求（PC が変わったときの再同期など）
    pub fn on_response(&mut self, kind: ResponseKind, body: &str) -> Vec<Outbound> {
        self.receive(Inbound::Response { kind, body })
    }

    /// 種別名（`"status"` / `"vram"` など）で HTTP レスポンスを適用する
    ///
    /// # エラー
    /// - `SessionError::Transport`: 未知の種別名
    pub fn on_response_named(
        &mut self,
        kind: &str,
        body: &str,
    ) -> Result<Vec<Outbound>, SessionError> {
        let kind: ResponseKind = kind.parse()?;
        Ok(self.on_response(kind, body))
    }

    /// プッシュチャンネルのテキストフレームを適用する
    pub fn on_push_message(&mut self, text: &str) -> Vec<Outbound> {
        self.receive(Inbound::Push(text))
    }

    /// 通信失敗を記録してエラー状態に入る
    ///
    /// 複製済みの状態は最後の値のまま残す。自動の再試行はしない。
    pub fn on_transport_error(&mut self, message: &str) {
        warn!(%message, "transport failure");
        self.stats.transport_errors += 1;
        self.error = Some(message.to_string());
    }

    /// プッシュチャンネルが閉じたことを記録する
    pub fn on_channel_closed(&mut self) {
        self.transport.close();
        if self.error.is_none() {
            self.error = Some("push channel closed".to_string());
        }
        warn!("push channel closed; waiting for reconnect");
    }

    /// エラー状態を解除し、全同期からやり直す
    ///
    /// 切断中に届かなかった更新は取り戻せないため、
    /// 複製とスナップショットを捨てて全構造を取り直す。
    pub fn reconnect(&mut self) -> Vec<Outbound> {
        info!(previous_error = ?self.error, "reconnecting");
        self.error = None;
        self.store.reset_replicas();
        self.memory_view.forget();
        self.video_view.forget();
        self.begin()
    }

    // ---------------------------------------------------------------
    // 描画
    // ---------------------------------------------------------------

    /// メモリビューのレイアウト
    pub fn memory_layout(&mut self) -> &HexLayout {
        let replica = self.store.memory();
        self.memory_view.render(replica.bytes(), replica.revision())
    }

    /// VRAM ビューのレイアウト
    pub fn video_layout(&mut self) -> &HexLayout {
        let replica = self.store.video();
        self.video_view.render(replica.bytes(), replica.revision())
    }

    /// メモリビューの HTML
    pub fn render_memory(&mut self) -> String {
        let replica = self.store.memory();
        self.memory_view.render_html(replica.bytes(), replica.revision())
    }

    /// VRAM ビューの HTML
    pub fn render_video(&mut self) -> String {
        let replica = self.store.video();
        self.video_view.render_html(replica.bytes(), replica.revision())
    }

    /// レジスタの HTML（ステータス未受信なら None）
    pub fn render_registers(&self) -> Option<String> {
        self.store.snapshot_status().map(render_registers)
    }

    /// プログラムリストの HTML
    pub fn render_program(&self) -> String {
        let pc = self.store.snapshot_status().map(|s| s.program_counter);
        render_program(self.store.snapshot_program(), pc)
    }

    /// メモリビューのスクロール先の要素 ID（新しいデータごとに 1 回）
    pub fn take_memory_scroll_target(&mut self) -> Option<String> {
        self.memory_view.take_scroll_element_id()
    }

    /// VRAM ビューのスクロール先の要素 ID
    pub fn take_video_scroll_target(&mut self) -> Option<String> {
        self.video_view.take_scroll_element_id()
    }

    /// 選択中の命令の要素 ID（PC がリストにあるときのみ）
    pub fn selected_program_entry(&self) -> Option<String> {
        let pc = self.store.snapshot_status()?.program_counter;
        self.store.listing_contains(pc).then(|| selected_entry_id(pc))
    }

    // ---------------------------------------------------------------
    // 内部
    // ---------------------------------------------------------------

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if !self.transport.is_open() {
            return Err(SessionError::ChannelClosed);
        }
        if let Some(message) = &self.error {
            return Err(SessionError::Failed(message.clone()));
        }
        Ok(())
    }

    fn memory_sync(&mut self) -> Outbound {
        let fingerprint = self.store.current_fingerprint(BufferId::Memory);
        self.transport.request_memory_sync(fingerprint)
    }

    fn video_sync(&mut self) -> Outbound {
        let fingerprint = self.store.current_fingerprint(BufferId::Video);
        self.transport.request_video_sync(fingerprint)
    }

    fn issued(&mut self, out: Vec<Outbound>) -> Vec<Outbound> {
        self.stats.requests_issued += out.len() as u64;
        out
    }

    fn receive(&mut self, inbound: Inbound<'_>) -> Vec<Outbound> {
        let label = inbound.label();
        match self.transport.receive(inbound, &mut self.store) {
            Ok(applied) => self.after_applied(applied),
            Err(e) => {
                self.dropped(label, &e);
                Vec::new()
            }
        }
    }

    fn dropped(&mut self, label: &str, error: &TransportError) {
        warn!(inbound = label, %error, "dropping message");
        self.stats.messages_dropped += 1;
    }

    fn after_applied(&mut self, applied: Applied) -> Vec<Outbound> {
        match applied {
            Applied::Status(change) => {
                self.stats.messages_applied += 1;
                self.on_status_change(change)
            }
            Applied::Program { .. } => {
                self.stats.messages_applied += 1;
                Vec::new()
            }
            Applied::Buffer { written, .. } => {
                self.stats.messages_applied += 1;
                self.stats.bytes_patched += written as u64;
                Vec::new()
            }
            Applied::Ignored { .. } => {
                self.stats.messages_dropped += 1;
                Vec::new()
            }
        }
    }

    /// PC が変わったらバッファを再同期し、リスト外ならプログラムを取り直す
    fn on_status_change(&mut self, change: StatusChange) -> Vec<Outbound> {
        if !change.pc_changed() || self.ensure_ready().is_err() {
            return Vec::new();
        }

        debug!(
            from = ?change.previous_pc,
            to = change.current_pc,
            outside_listing = change.pc_outside_listing,
            "pc changed, resynchronizing"
        );
        let mut out = vec![self.memory_sync(), self.video_sync()];
        if change.pc_outside_listing {
            out.push(self.transport.request_program());
        }
        self.issued(out)
    }
}

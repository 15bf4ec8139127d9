//! InspectorClient wasm-bindgen エクスポート
//!
//! ブラウザの UI から呼び出すインスペクタの主エントリポイント。
//! レプリカストア・トランスポート戦略・差分ビューを持つセッションを包む。

use wasm_bindgen::prelude::*;

use inspector_session::{InspectorConfig, InspectorSession};
use inspector_transport::Outbound;

/// インスペクタクライアント
///
/// ## 内部アーキテクチャ
///
/// ```text
/// InspectorClient
///   └── InspectorSession  (inspector-session)
///         ├── ReplicaStore     (inspector-replica)   - リモート状態の複製
///         ├── Box<dyn Transport> (inspector-transport) - ポーリング / プッシュ
///         └── HexView × 2      (inspector-render)    - 差分付き 16 進ダンプ
/// ```
///
/// ## 送受信の流れ
///
/// 操作系メソッドは送信要求の配列（各要素は JSON 文字列）を返す。
/// ホストは要求を実行し、結果を `onResponse` / `onPushMessage` で戻す。
/// 受信メソッドも追加で送るべき要求の配列を返す。
///
/// ```json
/// {"transport":"http","method":"GET","url":"/api/memory?hash=123","kind":"memory"}
/// {"transport":"push","frame":"{\"type\":\"step\"}"}
/// {"transport":"connect","url":"/ws"}
/// ```
///
/// ## スレッド安全性
///
/// WASM は シングルスレッドのため、`!Send + !Sync` を満たす。
/// JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct InspectorClient {
    session: InspectorSession,
}

#[wasm_bindgen]
impl InspectorClient {
    /// クライアントを初期化する
    ///
    /// # 引数
    /// - `config_json`: [`InspectorConfig`] の JSON。省略時はすべてデフォルト
    ///   例: `'{"transport":"push","pushUrl":"ws://localhost:3000/ws"}'`
    ///
    /// # エラー
    /// - JSON の解析失敗、未知のフィールド
    /// - 設定値が範囲外
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<InspectorClient, JsError> {
        let config = match config_json.as_deref() {
            Some(json) => InspectorConfig::from_json(json)
                .map_err(|e| JsError::new(&format!("Invalid inspector config: {}", e)))?,
            None => InspectorConfig::default(),
        };
        let session = InspectorSession::new(config)
            .map_err(|e| JsError::new(&format!("Session init failed: {}", e)))?;
        Ok(InspectorClient { session })
    }

    /// 使用中の戦略名（`"polling"` / `"push"`）
    #[wasm_bindgen(getter, js_name = "transportKind")]
    pub fn transport_kind(&self) -> String {
        self.session.transport_kind().to_string()
    }

    /// セッションを開始する（全同期の要求を返す）
    #[wasm_bindgen]
    pub fn start(&mut self) -> js_sys::Array {
        to_js_array(self.session.start())
    }

    /// ステータスとバッファを取り直す
    #[wasm_bindgen]
    pub fn refresh(&mut self) -> Result<js_sys::Array, JsError> {
        self.session.refresh().map(to_js_array).map_err(session_error)
    }

    /// 1 ステップ実行する
    ///
    /// # エラー
    /// - プッシュチャンネルが閉じている、またはエラー状態（`reconnect` が必要）
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<js_sys::Array, JsError> {
        self.session.step().map(to_js_array).map_err(session_error)
    }

    /// リモートをリセットする
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<js_sys::Array, JsError> {
        self.session.reset().map(to_js_array).map_err(session_error)
    }

    /// HTTP レスポンスのボディを適用する
    ///
    /// # 引数
    /// - `kind`: 要求の `kind`（`"status"` / `"program"` / `"memory"` / `"vram"` / `"step"` / `"reset"`）
    /// - `body`: レスポンスのボディ（JSON テキスト）
    ///
    /// # 戻り値
    /// 追加で送るべき要求の配列
    ///
    /// # エラー
    /// - 未知の `kind`。ボディが不正な場合はエラーにせず破棄する
    #[wasm_bindgen(js_name = "onResponse")]
    pub fn on_response(&mut self, kind: &str, body: &str) -> Result<js_sys::Array, JsError> {
        self.session
            .on_response_named(kind, body)
            .map(to_js_array)
            .map_err(session_error)
    }

    /// プッシュチャンネルで届いたテキストフレームを適用する
    #[wasm_bindgen(js_name = "onPushMessage")]
    pub fn on_push_message(&mut self, text: &str) -> js_sys::Array {
        to_js_array(self.session.on_push_message(text))
    }

    /// 通信失敗を通知する（エラー状態に入る。自動再試行はしない）
    #[wasm_bindgen(js_name = "onTransportError")]
    pub fn on_transport_error(&mut self, message: &str) {
        self.session.on_transport_error(message);
    }

    /// プッシュチャンネルが閉じたことを通知する
    #[wasm_bindgen(js_name = "onChannelClosed")]
    pub fn on_channel_closed(&mut self) {
        self.session.on_channel_closed();
    }

    /// エラー状態を解除して全同期からやり直す
    #[wasm_bindgen]
    pub fn reconnect(&mut self) -> js_sys::Array {
        to_js_array(self.session.reconnect())
    }

    /// エラー状態の内容（正常なら undefined）
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.session.error().map(str::to_string)
    }

    /// メモリビューの HTML
    #[wasm_bindgen(js_name = "renderMemory")]
    pub fn render_memory(&mut self) -> String {
        self.session.render_memory()
    }

    /// VRAM ビューの HTML
    #[wasm_bindgen(js_name = "renderVideo")]
    pub fn render_video(&mut self) -> String {
        self.session.render_video()
    }

    /// メモリビューのテキストダンプ
    #[wasm_bindgen(js_name = "renderMemoryText")]
    pub fn render_memory_text(&mut self) -> String {
        self.session.memory_layout().to_text()
    }

    /// メモリビューの 1 行あたりの列数を変える
    ///
    /// # エラー
    /// - 0 またはメモリ容量より大きい
    #[wasm_bindgen(js_name = "setMemoryColumns")]
    pub fn set_memory_columns(&mut self, columns: u32) -> Result<(), JsError> {
        self.session
            .set_memory_columns(columns as usize)
            .map_err(session_error)
    }

    /// VRAM ビューの 1 行あたりの列数を変える
    #[wasm_bindgen(js_name = "setVideoColumns")]
    pub fn set_video_columns(&mut self, columns: u32) -> Result<(), JsError> {
        self.session
            .set_video_columns(columns as usize)
            .map_err(session_error)
    }

    /// レジスタの HTML（ステータス未受信なら undefined）
    #[wasm_bindgen(js_name = "renderRegisters")]
    pub fn render_registers(&self) -> Option<String> {
        self.session.render_registers()
    }

    /// プログラムリストの HTML
    #[wasm_bindgen(js_name = "renderProgram")]
    pub fn render_program(&self) -> String {
        self.session.render_program()
    }

    /// メモリビューのスクロール先の要素 ID（新しいデータごとに 1 回だけ返る）
    #[wasm_bindgen(js_name = "takeMemoryScrollTarget")]
    pub fn take_memory_scroll_target(&mut self) -> Option<String> {
        self.session.take_memory_scroll_target()
    }

    /// VRAM ビューのスクロール先の要素 ID
    #[wasm_bindgen(js_name = "takeVideoScrollTarget")]
    pub fn take_video_scroll_target(&mut self) -> Option<String> {
        self.session.take_video_scroll_target()
    }

    /// 選択中の命令の要素 ID
    #[wasm_bindgen(js_name = "selectedProgramEntry")]
    pub fn selected_program_entry(&self) -> Option<String> {
        self.session.selected_program_entry()
    }

    /// セッション統計を JSON 文字列で返す
    ///
    /// # 戻り値
    /// JSON 文字列:
    /// ```json
    /// {
    ///   "requestsIssued": 12,
    ///   "messagesApplied": 10,
    ///   "messagesDropped": 1,
    ///   "bytesPatched": 4096,
    ///   "transportErrors": 0
    /// }
    /// ```
    #[wasm_bindgen(js_name = "getStats")]
    pub fn get_stats(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.session.stats())
            .map_err(|e| JsError::new(&format!("Stats encode failed: {}", e)))
    }
}

impl InspectorClient {
    /// ラップしているセッション（native テスト用）
    pub fn session(&self) -> &InspectorSession {
        &self.session
    }
}

fn to_js_array(out: Vec<Outbound>) -> js_sys::Array {
    let result = js_sys::Array::new();
    for request in out {
        result.push(&JsValue::from_str(&request.to_json()));
    }
    result
}

fn session_error(e: inspector_session::SessionError) -> JsError {
    JsError::new(&format!("{}", e))
}

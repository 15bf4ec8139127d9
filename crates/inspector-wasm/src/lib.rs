//! # inspector-wasm
//!
//! wasm-bindgen エクスポート：ブラウザの UI から呼び出す公開 API。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import init, { InspectorClient, init_panic_hook, initLogging, scrollIntoView } from './pkg/inspector_wasm';
//!
//! await init();
//! init_panic_hook();
//! initLogging("debug");
//!
//! const client = new InspectorClient(JSON.stringify({ transport: "polling" }));
//!
//! // 要求はすべて JSON 文字列の配列で返る。I/O はホストが行う
//! for (const req of client.start().map(JSON.parse)) {
//!     if (req.transport === "http") {
//!         fetch(req.url, { method: req.method })
//!             .then((r) => r.text())
//!             .then((body) => dispatch(client.onResponse(req.kind, body)))
//!             .catch((e) => client.onTransportError(String(e)));
//!     }
//! }
//!
//! // 描画
//! memoryPane.innerHTML = client.renderMemory();
//! const target = client.takeMemoryScrollTarget();
//! if (target) scrollIntoView(target);
//! ```

use inspector_hash::Fingerprint;
use tracing::Level;
use wasm_bindgen::prelude::*;

pub mod client;
pub mod console;

pub use client::InspectorClient;
pub use console::ConsoleMakeWriter;

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `tracing` の出力をブラウザコンソールに流す
///
/// # 引数
/// - `level`: 最大レベル（`"error"` / `"warn"` / `"info"` / `"debug"` / `"trace"`）。省略時は `"info"`
///
/// # 戻り値
/// 今回インストールしたら true。すでにインストール済みなら false
///
/// # エラー
/// - レベル名が不正
#[wasm_bindgen(js_name = "initLogging")]
pub fn init_logging(level: Option<String>) -> Result<bool, JsError> {
    let level = match level.as_deref() {
        Some(name) => name
            .parse::<Level>()
            .map_err(|e| JsError::new(&format!("Invalid log level {:?}: {}", name, e)))?,
        None => Level::INFO,
    };

    // ブラウザには時計も端末もないので時刻と ANSI 色は出さない
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok();
    Ok(installed)
}

/// 要素をスムーズスクロールで表示範囲に入れる
///
/// # 引数
/// - `element_id`: `takeMemoryScrollTarget()` などが返した要素 ID
///
/// # 戻り値
/// 要素が見つかってスクロールしたら true
#[wasm_bindgen(js_name = "scrollIntoView")]
pub fn scroll_into_view(element_id: &str) -> bool {
    let Some(element) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(element_id))
    else {
        return false;
    };

    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    options.set_block(web_sys::ScrollLogicalPosition::Nearest);
    element.scroll_into_view_with_scroll_into_view_options(&options);
    true
}

/// バイト列のフィンガープリント（10 進文字列）
///
/// テスト・デバッグ用。リモートと同じ XXH64 (seed 0) を計算する。
#[wasm_bindgen(js_name = "fingerprintOf")]
pub fn fingerprint_of(bytes: &[u8]) -> String {
    Fingerprint::of(bytes).to_string()
}

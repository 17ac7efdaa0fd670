//! Romaji Dropdown (WASM userscript)
//!
//! クイズのオートコンプリートでローマ字表記を先に並べる。

mod app;
mod bridge;
mod hook;
mod host;
mod listener;
mod logging;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// DOM構築完了後に実行（構築済みなら即時）
fn on_dom_ready<F: FnOnce() + 'static>(f: F) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        f();
        return;
    };

    if document.ready_state() != "loading" {
        f();
        return;
    }

    let callback = Closure::once_into_js(f);
    if let Err(e) = document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
    {
        tracing::error!("DOMContentLoaded の購読に失敗: {}", bridge::js_error(e));
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);

    on_dom_ready(|| {
        let app = app::App::new(app::App::config_from_page());
        spawn_local(app::initialize(app));
    });
}

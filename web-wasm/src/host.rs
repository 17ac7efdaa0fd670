//! ホストページのオブジェクトを共通トレイトに合わせるアダプタ

use crate::bridge::{self, js_error};
use async_trait::async_trait;
use js_sys::Array;
use romaji_dropdown_common::{
    AutocompleteHost, Catalog, CatalogSource, CatalogVersion, DisplayComparator, Error, Result,
    Sleeper,
};
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// 待機を要するホストのグローバル（この順に待つ）
pub const HOST_GLOBALS: [&str; 4] = [
    "libraryCacheHandler",
    "AutoCompleteController",
    "Listener",
    "socket",
];

/// `quiz` からオートコンプリートコントローラへのパス
pub const QUIZ_CONTROLLER_PATH: [&str; 3] = ["answerInput", "typingInput", "autoCompleteController"];

/// 再ソートを行うホスト側インスタンスのプロパティ名
pub const AWESOMPLETE_PROPERTY: &str = "awesomepleteInstance";

/// インスタンスが持つ名前一覧バージョンのプロパティ名
pub const VERSION_PROPERTY: &str = "version";

/// 実行中のクイズのオートコンプリートコントローラ
pub fn quiz_controller() -> Option<JsValue> {
    bridge::global("quiz").and_then(|quiz| bridge::get_path(&quiz, &QUIZ_CONTROLLER_PATH))
}

// ============================================
// オートコンプリート
// ============================================

/// AutoCompleteController インスタンスのラッパー
pub struct JsAutocompleteHost {
    controller: JsValue,
}

impl JsAutocompleteHost {
    pub fn new(controller: JsValue) -> Self {
        Self { controller }
    }
}

impl AutocompleteHost for JsAutocompleteHost {
    fn set_list(&mut self, list: &[String]) {
        let array: Array = list.iter().map(|s| JsValue::from_str(s)).collect();
        if let Err(e) = bridge::set(&self.controller, "list", &array) {
            tracing::warn!("list の設定に失敗: {}", js_error(e));
        }
    }

    fn rebuild_index(&mut self) {
        if let Err(e) = bridge::call_method(&self.controller, "newList", &Array::new()) {
            tracing::warn!("newList の呼び出しに失敗: {}", js_error(e));
        }
    }

    fn set_comparator(&mut self, comparator: DisplayComparator) {
        let Some(instance) = bridge::get(&self.controller, AWESOMPLETE_PROPERTY) else {
            tracing::debug!("{} がないため sort は設定しない", AWESOMPLETE_PROPERTY);
            return;
        };

        // JS側が関数を保持し続けるので所有権ごと渡す
        let sort = Closure::<dyn FnMut(JsValue, JsValue) -> i32>::new(move |a: JsValue, b: JsValue| {
            comparator.sign(&bridge::suggestion_text(&a), &bridge::suggestion_text(&b))
        })
        .into_js_value();

        match bridge::set(&instance, "sort", &sort) {
            Ok(()) => tracing::debug!("Sort overridden"),
            Err(e) => tracing::warn!("sort の設定に失敗: {}", js_error(e)),
        }
    }

    fn version(&self) -> Option<CatalogVersion> {
        let value = bridge::get(&self.controller, VERSION_PROPERTY)?;
        serde_wasm_bindgen::from_value(value).ok()
    }

    fn set_version(&mut self, version: CatalogVersion) {
        let result = bridge::to_js(&version).and_then(|value| {
            bridge::set(&self.controller, VERSION_PROPERTY, &value).map_err(js_error)
        });
        if let Err(e) = result {
            tracing::warn!("version の設定に失敗: {}", e);
        }
    }
}

// ============================================
// カタログ
// ============================================

/// `libraryCacheHandler.getCache(callback)` を Future にする
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryCacheSource;

#[async_trait(?Send)]
impl CatalogSource for LibraryCacheSource {
    async fn fetch_catalog(&self) -> Result<Option<Catalog>> {
        let handler = bridge::global("libraryCacheHandler")
            .ok_or_else(|| Error::NotReadyYet("libraryCacheHandler".into()))?;

        let (tx, rx) = futures::channel::oneshot::channel::<JsValue>();
        let callback: Closure<dyn FnMut(JsValue)> = Closure::once(move |cache: JsValue| {
            let _ = tx.send(cache);
        });

        bridge::call_method(&handler, "getCache", &Array::of1(callback.as_ref()))
            .map_err(js_error)?;

        // callback は応答が来るまでこのスコープで生かしておく
        let cache = rx
            .await
            .map_err(|_| Error::Initialization("getCache callback was dropped".into()))?;
        drop(callback);

        if cache.is_undefined() || cache.is_null() {
            return Ok(None);
        }

        let catalog: Catalog = serde_wasm_bindgen::from_value(cache)
            .map_err(|e| Error::Initialization(format!("unexpected cache shape: {}", e)))?;
        Ok(Some(catalog))
    }
}

// ============================================
// タイマー
// ============================================

/// ブラウザのタイマーで待つ
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooSleeper;

#[async_trait(?Send)]
impl Sleeper for GlooSleeper {
    async fn sleep(&self, duration: Duration) {
        gloo::timers::future::sleep(duration).await;
    }
}


#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use romaji_dropdown_common::ComparatorStrategy;
    use std::collections::HashSet;
    use std::sync::Arc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_set_list_replaces_array() {
        let controller = js_sys::Object::new();
        let mut host = JsAutocompleteHost::new(controller.clone().into());
        host.set_list(&["Mushishi".to_string(), "Trigun".to_string()]);

        let list: Array = bridge::get(&controller, "list").unwrap().into();
        assert_eq!(list.length(), 2);
        assert_eq!(list.get(0).as_string().as_deref(), Some("Mushishi"));
    }

    #[wasm_bindgen_test]
    fn wasm_set_comparator_installs_sort() {
        let instance = js_sys::Object::new();
        let controller = js_sys::Object::new();
        bridge::set(&controller, "awesomepleteInstance", &instance).unwrap();

        let romaji: HashSet<String> = ["Mushishi".to_string()].into_iter().collect();
        let mut host = JsAutocompleteHost::new(controller.into());
        host.set_comparator(DisplayComparator::new(
            ComparatorStrategy::LengthThenAlpha,
            Arc::new(romaji),
        ));

        let sort: js_sys::Function = bridge::get(&instance, "sort").unwrap().into();
        let result = sort
            .call2(&JsValue::NULL, &"Mushishi".into(), &"Up".into())
            .unwrap();
        assert_eq!(result.as_f64(), Some(-1.0));
    }

    #[wasm_bindgen_test]
    fn wasm_version_round_trip() {
        let controller = js_sys::Object::new();
        bridge::set(&controller, "version", &JsValue::NULL).unwrap();
        let mut host = JsAutocompleteHost::new(controller.clone().into());
        assert_eq!(host.version(), None);

        host.set_version(serde_json::json!(17));
        assert_eq!(
            bridge::get(&controller, "version").and_then(|v| v.as_f64()),
            Some(17.0)
        );
        assert_eq!(host.version().and_then(|v| v.as_f64()), Some(17.0));
    }
}

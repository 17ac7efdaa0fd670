//! JavaScript Bridge ヘルパー
//!
//! ホストページのグローバル変数は存在しないことがあるため、
//! 静的な extern 宣言ではなく Reflect 経由で参照する。

use js_sys::{Array, Function, Reflect};
use romaji_dropdown_common::Error;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

// ============================================
// 参照系
// ============================================

/// undefined / null を None にする
fn defined(value: JsValue) -> Option<JsValue> {
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// グローバル変数を取得（`typeof name !== 'undefined'` 相当）
pub fn global(name: &str) -> Option<JsValue> {
    get(&js_sys::global(), name)
}

/// プロパティを取得
pub fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).ok().and_then(defined)
}

/// ネストしたプロパティを取得（`a?.b?.c` 相当）
pub fn get_path(target: &JsValue, path: &[&str]) -> Option<JsValue> {
    path.iter()
        .try_fold(target.clone(), |current, key| get(&current, key))
}

/// プロパティを設定
pub fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

/// メソッドを呼び出し
pub fn call_method(target: &JsValue, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let method: Function = get(target, name)
        .ok_or_else(|| JsValue::from_str(&format!("{} is not defined", name)))?
        .dyn_into()?;
    method.apply(target, args)
}

// ============================================
// 変換
// ============================================

/// JS側の例外をセットアップ失敗として扱う
pub fn js_error(value: JsValue) -> Error {
    let message = value
        .as_string()
        .or_else(|| get(&value, "message").and_then(|m| m.as_string()))
        .unwrap_or_else(|| format!("{:?}", value));
    Error::Initialization(message)
}

/// JSONと互換な形でJSオブジェクトへ変換（MapではなくObjectにする）
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, Error> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::Initialization(e.to_string()))
}

/// 候補オブジェクトから表示文字列を取り出す
///
/// 文字列そのもの、または `label` / `value` を持つオブジェクトを受け付ける。
pub fn suggestion_text(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| get(value, "label").and_then(|v| v.as_string()))
        .or_else(|| get(value, "value").and_then(|v| v.as_string()))
        .unwrap_or_default()
}

/// `this` を引数として受け取る関数を作る
///
/// wasm-bindgen のクロージャは `this` を受け取れないため、
/// JS側で薄いラッパーを作って `hook(this)` を呼ばせる。
pub fn with_this(hook: &JsValue) -> Result<Function, JsValue> {
    let factory = Function::new_with_args("hook", "return function () { return hook(this); };");
    factory.call1(&JsValue::NULL, hook)?.dyn_into()
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_get_path_missing_is_none() {
        let obj = js_sys::Object::new();
        assert!(get_path(&obj, &["answerInput", "typingInput"]).is_none());
    }

    #[wasm_bindgen_test]
    fn wasm_get_path_nested() {
        let inner = js_sys::Object::new();
        set(&inner, "autoCompleteController", &JsValue::from_str("ctrl")).unwrap();
        let outer = js_sys::Object::new();
        set(&outer, "typingInput", &inner).unwrap();

        let found = get_path(&outer, &["typingInput", "autoCompleteController"]).unwrap();
        assert_eq!(found.as_string().as_deref(), Some("ctrl"));
    }

    #[wasm_bindgen_test]
    fn wasm_suggestion_text_from_label() {
        let obj = js_sys::Object::new();
        set(&obj, "label", &JsValue::from_str("Mushishi")).unwrap();
        assert_eq!(suggestion_text(&obj), "Mushishi");
        assert_eq!(suggestion_text(&JsValue::from_str("K-On!")), "K-On!");
    }

    #[wasm_bindgen_test]
    fn wasm_to_js_object_not_map() {
        let value = to_js(&serde_json::json!({"currentVersion": 3})).unwrap();
        assert!(!value.is_instance_of::<js_sys::Map>());
        assert_eq!(get(&value, "currentVersion").and_then(|v| v.as_f64()), Some(3.0));
    }
}

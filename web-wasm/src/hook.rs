//! AutoCompleteController.prototype.updateList の差し替え
//!
//! ホストのメソッドを置き換えるのはここだけ。
//! 差し替え後の処理は App::on_update_list に委譲し、
//! 元のメソッドはリスト未準備時のフォールバックとして残す。

use crate::app::App;
use crate::bridge::{self, js_error};
use js_sys::Function;
use romaji_dropdown_common::{Error, Result};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// 二重フック防止の目印
const HOOK_MARKER: &str = "__romajiDropdownHooked";

pub fn install_update_list_hook(app: &Rc<App>) -> Result<()> {
    let class = bridge::global("AutoCompleteController")
        .ok_or_else(|| Error::NotReadyYet("AutoCompleteController".into()))?;
    let prototype = bridge::get(&class, "prototype")
        .ok_or_else(|| Error::Initialization("AutoCompleteController has no prototype".into()))?;

    if bridge::get(&prototype, HOOK_MARKER).is_some() {
        tracing::debug!("AutoComplete already hooked");
        return Ok(());
    }

    let original: Function = bridge::get(&prototype, "updateList")
        .ok_or_else(|| Error::Initialization("updateList is not defined".into()))?
        .dyn_into()
        .map_err(|_| Error::Initialization("updateList is not a function".into()))?;

    let app = Rc::clone(app);
    let hook = Closure::<dyn FnMut(JsValue)>::new(move |this: JsValue| {
        app.on_update_list(this, &original);
    })
    .into_js_value();

    let wrapper = bridge::with_this(&hook).map_err(js_error)?;
    bridge::set(&prototype, "updateList", &wrapper).map_err(js_error)?;
    bridge::set(&prototype, HOOK_MARKER, &JsValue::TRUE).map_err(js_error)?;

    tracing::info!("AutoComplete hooked successfully");
    Ok(())
}

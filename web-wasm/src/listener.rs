//! ホストのイベントバスとソケット

use crate::bridge::{self, js_error};
use js_sys::{Array, Function, Reflect};
use romaji_dropdown_common::host::HostCommand;
use romaji_dropdown_common::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `new Listener(event, callback)` を作って bind する
fn bind(event: &str, callback: &JsValue) -> Result<JsValue> {
    let class: Function = bridge::global("Listener")
        .ok_or_else(|| Error::NotReadyYet("Listener".into()))?
        .dyn_into()
        .map_err(|_| Error::Initialization("Listener is not a constructor".into()))?;

    let listener = Reflect::construct(&class, &Array::of2(&JsValue::from_str(event), callback))
        .map_err(js_error)?;
    bridge::call_method(&listener, "bindListener", &Array::new()).map_err(js_error)?;
    Ok(listener)
}

/// イベントを1回だけ受け取り、受信時に unbind する
pub fn listen_once<F>(event: &str, handler: F) -> Result<()>
where
    F: FnOnce(JsValue) + 'static,
{
    let slot: Rc<RefCell<Option<JsValue>>> = Rc::default();
    let mut handler = Some(handler);

    let callback = {
        let slot = Rc::clone(&slot);
        let event = event.to_string();
        Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            if let Some(listener) = slot.borrow_mut().take() {
                if let Err(e) = bridge::call_method(&listener, "unbindListener", &Array::new()) {
                    tracing::warn!("{} の unbind に失敗: {}", event, js_error(e));
                }
            }
            if let Some(handler) = handler.take() {
                handler(payload);
            }
        })
        .into_js_value()
    };

    let listener = bind(event, &callback)?;
    *slot.borrow_mut() = Some(listener);
    Ok(())
}

/// イベントを受け取り続ける
pub fn listen<F>(event: &str, handler: F) -> Result<()>
where
    F: FnMut(JsValue) + 'static,
{
    let callback = Closure::<dyn FnMut(JsValue)>::new(handler).into_js_value();
    bind(event, &callback).map(|_| ())
}

/// `socket.sendCommand(command)`
pub fn send_command(command: &HostCommand) -> Result<()> {
    let socket = bridge::global("socket").ok_or_else(|| Error::NotReadyYet("socket".into()))?;
    let payload = bridge::to_js(command)?;
    bridge::call_method(&socket, "sendCommand", &Array::of1(&payload)).map_err(js_error)?;
    tracing::debug!(command = command.command, "コマンド送信");
    Ok(())
}

/// テスト用の Listener / socket の代役
#[cfg(all(target_arch = "wasm32", test))]
pub(crate) mod test_support {
    use crate::bridge;
    use js_sys::{Array, Function};
    use wasm_bindgen::prelude::*;

    const FAKE_HOST: &str = r#"
        const bound = [];
        const sent = [];
        globalThis.Listener = class {
            constructor(event, cb) { this.event = event; this.cb = cb; this.active = false; }
            bindListener() { this.active = true; bound.push(this); }
            unbindListener() { this.active = false; }
        };
        globalThis.socket = { sendCommand(command) { sent.push(command); } };
        return { bound, sent };
    "#;

    /// グローバルを差し替え、`{ bound, sent }` を返す
    pub fn install() -> JsValue {
        Function::new_no_args(FAKE_HOST)
            .call0(&JsValue::NULL)
            .expect("fake host の設定に失敗")
    }

    pub fn bound(fake: &JsValue) -> Array {
        bridge::get(fake, "bound").expect("bound がない").into()
    }

    pub fn sent(fake: &JsValue) -> Array {
        bridge::get(fake, "sent").expect("sent がない").into()
    }

    /// bind された Listener のコールバックを呼ぶ
    pub fn fire(listener: &JsValue, payload: &JsValue) {
        let callback: Function = bridge::get(listener, "cb").expect("cb がない").into();
        callback
            .call1(&JsValue::NULL, payload)
            .expect("コールバックが失敗");
    }

    pub fn is_active(listener: &JsValue) -> bool {
        bridge::get(listener, "active").and_then(|v| v.as_bool()) == Some(true)
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::test_support::{bound, fire, install, is_active, sent};
    use super::*;
    use std::cell::Cell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_listen_once_unbinds_after_first_event() {
        let fake = install();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        listen_once("get all song names", move |_payload| {
            counter.set(counter.get() + 1);
        })
        .unwrap();

        let listener = bound(&fake).get(0);
        assert!(is_active(&listener));

        fire(&listener, &JsValue::NULL);
        assert!(!is_active(&listener));
        fire(&listener, &JsValue::NULL);
        assert_eq!(calls.get(), 1);
    }

    #[wasm_bindgen_test]
    fn wasm_listen_keeps_listening() {
        let fake = install();
        let calls = Rc::new(Cell::new(0));

        let counter = Rc::clone(&calls);
        listen("quiz ready", move |_payload| counter.set(counter.get() + 1)).unwrap();

        let listener = bound(&fake).get(0);
        fire(&listener, &JsValue::NULL);
        fire(&listener, &JsValue::NULL);
        assert_eq!(calls.get(), 2);
        assert!(is_active(&listener));
    }

    #[wasm_bindgen_test]
    fn wasm_send_command_shape() {
        let fake = install();
        send_command(&HostCommand::update_all_names(&serde_json::json!(9))).unwrap();

        let command = sent(&fake).get(0);
        assert_eq!(
            bridge::get(&command, "command").and_then(|v| v.as_string()).as_deref(),
            Some("update all song names")
        );
        let version = bridge::get_path(&command, &["data", "currentVersion"]).and_then(|v| v.as_f64());
        assert_eq!(version, Some(9.0));
    }
}

//! ユーザースクリプト本体
//!
//! ## 処理フロー
//! 1. ホストのグローバルを待つ
//! 2. updateList フックを入れる
//! 3. カタログ取得（空なら2秒ごとに再取得）→ 分類
//! 4. 実行中のクイズがあればリストを差し替え、なければ "quiz ready" を待つ
//!
//! 失敗時はセットアップ全体を5秒後にやり直す。

use crate::bridge;
use crate::host::{quiz_controller, GlooSleeper, JsAutocompleteHost, LibraryCacheSource, HOST_GLOBALS};
use crate::hook;
use crate::listener::{listen, listen_once, send_command};
use romaji_dropdown_common::host::EVENT_QUIZ_READY;
use romaji_dropdown_common::{
    await_until, complete_update, load_catalog, run_setup, DropdownConfig,
    DropdownController, HostCommand, Result, SetupGuard, Sleeper, UpdateOutcome, UpdatePlan,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// ページ側から設定を渡すためのグローバル名
pub const CONFIG_GLOBAL: &str = "romajiDropdownConfig";

/// アプリケーションの状態
pub struct App {
    config: DropdownConfig,
    controller: RefCell<DropdownController>,
    guard: SetupGuard,
    source: LibraryCacheSource,
    sleeper: GlooSleeper,
    quiz_ready_bound: Cell<bool>,
}

impl App {
    pub fn new(config: DropdownConfig) -> Rc<Self> {
        Rc::new(Self {
            controller: RefCell::new(DropdownController::new(config.classifier)),
            config,
            guard: SetupGuard::new(),
            source: LibraryCacheSource,
            sleeper: GlooSleeper,
            quiz_ready_bound: Cell::new(false),
        })
    }

    /// `window.romajiDropdownConfig` があれば読み込む
    pub fn config_from_page() -> DropdownConfig {
        let Some(value) = bridge::global(CONFIG_GLOBAL) else {
            return DropdownConfig::default();
        };
        match serde_wasm_bindgen::from_value::<DropdownConfig>(value) {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    tracing::warn!("{} を無視: {}", CONFIG_GLOBAL, e);
                    DropdownConfig::default()
                }
            },
            Err(e) => {
                tracing::warn!("{} を無視: {}", CONFIG_GLOBAL, e);
                DropdownConfig::default()
            }
        }
    }

    /// 指定のコントローラへ現在のリストを反映
    fn adopt(&self, controller: JsValue) -> bool {
        let mut host = JsAutocompleteHost::new(controller);
        self.controller.borrow().adopt_into(&mut host)
    }

    /// 実行中のクイズへ反映、なければ "quiz ready" で反映する
    fn force_update(self: &Rc<Self>) {
        if let Some(controller) = quiz_controller() {
            if self.adopt(controller) {
                tracing::info!("Forced list update - Romaji now appears first!");
            }
            return;
        }

        if self.quiz_ready_bound.replace(true) {
            return;
        }
        tracing::info!("Waiting for quiz to start...");

        let app = Rc::clone(self);
        let bound = listen(EVENT_QUIZ_READY, move |_payload| {
            let app = Rc::clone(&app);
            spawn_local(async move {
                app.sleeper.sleep(app.config.retry.quiz_ready_delay()).await;
                if let Some(controller) = quiz_controller() {
                    if app.adopt(controller) {
                        tracing::info!("List updated on quiz ready - Romaji now appears first!");
                    }
                }
            });
        });
        if let Err(e) = bound {
            tracing::warn!("quiz ready の購読に失敗: {}", e);
            self.quiz_ready_bound.set(false);
        }
    }

    /// フックされた updateList の本体
    ///
    /// 初回か差分かは呼び出し元インスタンスの version で決める。
    pub(crate) fn on_update_list(self: &Rc<Self>, this: JsValue, original: &js_sys::Function) {
        let host = JsAutocompleteHost::new(this.clone());
        let plan = self.controller.borrow().plan_for(&host);
        tracing::debug!(
            "updateList called, dropdownList.length = {}",
            self.controller.borrow().current_list().len()
        );

        let Some(command) = plan.command() else {
            tracing::warn!("List not ready, using default");
            if let Err(e) = original.call0(&this) {
                tracing::error!("元の updateList が失敗: {}", bridge::js_error(e));
            }
            return;
        };

        if let Err(e) = self.request_names(host, plan, &command) {
            tracing::error!("updateList の処理に失敗: {}", e);
        }
    }

    /// 応答を1回だけ購読してからコマンドを送る
    fn request_names(
        self: &Rc<Self>,
        mut host: JsAutocompleteHost,
        plan: UpdatePlan,
        command: &HostCommand,
    ) -> Result<()> {
        let Some(reply_event) = plan.reply_event() else {
            return Ok(());
        };

        let app = Rc::clone(self);
        listen_once(reply_event, move |payload| {
            let payload = serde_wasm_bindgen::from_value(payload).unwrap_or(serde_json::Value::Null);
            let Some(event) = plan.parse_reply(payload) else {
                return;
            };

            match complete_update(&app.controller, &mut host, event) {
                UpdateOutcome::Adopted { refresh: false } => tracing::info!("List adopted (initial)"),
                UpdateOutcome::Adopted { refresh: true } => {
                    tracing::info!("List adopted (update)");
                    spawn_local(app.refresh(host));
                }
                UpdateOutcome::Unchanged => tracing::debug!("差分なし、リストはそのまま"),
            }
        })?;
        send_command(command)
    }

    /// カタログを取り直して再分類し、反映する
    async fn refresh(self: Rc<Self>, mut host: JsAutocompleteHost) {
        let catalog = match load_catalog(&self.source, &self.sleeper, &self.config.retry).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!("カタログ再取得に失敗、現在のリストを維持: {}", e);
                return;
            }
        };

        let rebuilt = self.controller.borrow_mut().on_catalog_ready(Some(&catalog));
        match rebuilt {
            Ok(_) => {
                if self.controller.borrow().adopt_into(&mut host) {
                    tracing::info!("List re-classified after catalog change");
                }
            }
            Err(e) => tracing::warn!("再分類に失敗、現在のリストを維持: {}", e),
        }
    }

    /// セットアップ1回分
    async fn setup(self: Rc<Self>) -> Result<()> {
        let retry = &self.config.retry;
        for name in HOST_GLOBALS {
            await_until(
                || bridge::global(name).is_some(),
                retry.readiness_interval(),
                retry.readiness_max_attempts,
                &self.sleeper,
                name,
            )
            .await?;
        }

        hook::install_update_list_hook(&self)?;

        let catalog = load_catalog(&self.source, &self.sleeper, retry).await?;
        self.controller.borrow_mut().on_catalog_ready(Some(&catalog))?;
        self.force_update();
        Ok(())
    }
}

/// セットアップを開始（二重起動は無視される）
pub async fn initialize(app: Rc<App>) {
    let retry = app.config.retry.clone();
    run_setup(&app.guard, &app.sleeper, &retry, || Rc::clone(&app).setup()).await;
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use crate::listener::test_support::{bound, fire, install, is_active, sent};
    use js_sys::{Array, Function, Object};
    use romaji_dropdown_common::{Catalog, NameVariant, TitledEntry};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn ready_app() -> Rc<App> {
        let app = App::new(DropdownConfig::default());
        let catalog = Catalog::from_entries(vec![
            TitledEntry::with_names(vec![
                NameVariant::new("JA", "Mushishi Zoku Shou"),
                NameVariant::new("EN", "Mushishi"),
            ]),
            TitledEntry::with_names(vec![NameVariant::new("EN", "Trigun")]),
        ]);
        app.controller
            .borrow_mut()
            .on_catalog_ready(Some(&catalog))
            .unwrap();
        app
    }

    /// AutoCompleteController インスタンスの代役
    fn instance(version: JsValue) -> JsValue {
        let obj: JsValue = Object::new().into();
        bridge::set(&obj, "version", &version).unwrap();
        let new_list = Function::new_no_args("this.rebuilt = (this.rebuilt || 0) + 1;");
        bridge::set(&obj, "newList", &new_list).unwrap();
        obj
    }

    fn command_name(command: &JsValue) -> Option<String> {
        bridge::get(command, "command").and_then(|v| v.as_string())
    }

    #[wasm_bindgen_test]
    fn wasm_fresh_instance_gets_initial_list() {
        let fake = install();
        let app = ready_app();
        let this = instance(JsValue::NULL);
        let original = Function::new_no_args("this.defaultUsed = true;");

        app.on_update_list(this.clone(), &original);

        assert_eq!(command_name(&sent(&fake).get(0)).as_deref(), Some("get all song names"));
        let listener = bound(&fake).get(0);
        assert_eq!(
            bridge::get(&listener, "event").and_then(|v| v.as_string()).as_deref(),
            Some("get all song names")
        );

        let payload: JsValue = Object::new().into();
        bridge::set(&payload, "version", &JsValue::from_f64(3.0)).unwrap();
        fire(&listener, &payload);

        assert!(!is_active(&listener));
        assert_eq!(bridge::get(&this, "version").and_then(|v| v.as_f64()), Some(3.0));
        let list: Array = bridge::get(&this, "list").expect("list がない").into();
        assert_eq!(list.length(), 3);
        assert_eq!(list.get(0).as_string().as_deref(), Some("Mushishi Zoku Shou"));
        assert_eq!(bridge::get(&this, "rebuilt").and_then(|v| v.as_f64()), Some(1.0));
        assert!(bridge::get(&this, "defaultUsed").is_none());

        // 別のインスタンスも version が null なら初回取得から
        let other = instance(JsValue::NULL);
        app.on_update_list(other, &original);
        assert_eq!(command_name(&sent(&fake).get(1)).as_deref(), Some("get all song names"));
    }

    #[wasm_bindgen_test]
    fn wasm_empty_delta_only_updates_version() {
        let fake = install();
        let app = ready_app();
        let this = instance(JsValue::from_f64(3.0));
        let original = Function::new_no_args("");

        app.on_update_list(this.clone(), &original);

        let command = sent(&fake).get(0);
        assert_eq!(command_name(&command).as_deref(), Some("update all song names"));
        assert_eq!(
            bridge::get_path(&command, &["data", "currentVersion"]).and_then(|v| v.as_f64()),
            Some(3.0)
        );

        let payload: JsValue = Object::new().into();
        bridge::set(&payload, "version", &JsValue::from_f64(4.0)).unwrap();
        bridge::set(&payload, "new", &Array::new()).unwrap();
        bridge::set(&payload, "deleted", &Array::new()).unwrap();
        fire(&bound(&fake).get(0), &payload);

        assert_eq!(bridge::get(&this, "version").and_then(|v| v.as_f64()), Some(4.0));
        assert!(bridge::get(&this, "list").is_none());
    }

    #[wasm_bindgen_test]
    fn wasm_without_list_uses_host_default() {
        let fake = install();
        let app = App::new(DropdownConfig::default());
        let this = instance(JsValue::NULL);
        let original = Function::new_no_args("this.defaultUsed = true;");

        app.on_update_list(this.clone(), &original);

        assert_eq!(bridge::get(&this, "defaultUsed").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(sent(&fake).length(), 0);
        assert_eq!(bound(&fake).length(), 0);
    }
}

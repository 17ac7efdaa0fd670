//! 待機・再試行のプリミティブ
//!
//! - await_until: 条件が成立するまで一定間隔でポーリング（上限あり）
//! - load_catalog: 空カタログの間は再取得を続ける
//! - run_setup: セットアップ失敗時に間隔を空けて全体をやり直す（二重実行防止付き）

use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use crate::host::{CatalogSource, Sleeper};
use crate::types::Catalog;
use std::cell::Cell;
use std::future::Future;
use std::time::Duration;

/// 条件が成立するまで待つ
///
/// 最初に1回即時チェックし、その後 `interval` ごとに最大 `max_attempts` 回チェックする。
/// 上限に達したら `Error::Timeout` を返す。
pub async fn await_until<P, S>(
    mut predicate: P,
    interval: Duration,
    max_attempts: u32,
    sleeper: &S,
    description: &str,
) -> Result<()>
where
    P: FnMut() -> bool,
    S: Sleeper + ?Sized,
{
    if predicate() {
        return Ok(());
    }

    tracing::info!("Waiting for {}...", description);
    for _ in 0..max_attempts {
        sleeper.sleep(interval).await;
        if predicate() {
            tracing::info!("{} loaded", description);
            return Ok(());
        }
    }

    Err(Error::Timeout {
        what: description.to_string(),
        waited: interval * max_attempts,
    })
}

/// 空でないカタログが取れるまで取得を繰り返す
///
/// `max_empty_catalog_retries` が未設定なら無制限に待つ。
pub async fn load_catalog<C, S>(source: &C, sleeper: &S, policy: &RetryPolicy) -> Result<Catalog>
where
    C: CatalogSource + ?Sized,
    S: Sleeper + ?Sized,
{
    let mut retries = 0u32;
    loop {
        if let Some(catalog) = source.fetch_catalog().await? {
            if !catalog.is_empty() {
                return Ok(catalog);
            }
        }

        if let Some(max) = policy.max_empty_catalog_retries {
            if retries >= max {
                tracing::warn!("Cache still empty after {} retries, giving up", retries);
                return Err(Error::EmptyCatalog);
            }
        }

        retries += 1;
        tracing::warn!("Cache empty, retrying...");
        sleeper.sleep(policy.empty_catalog_retry()).await;
    }
}

/// セットアップの進行状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetupState {
    #[default]
    Idle,
    Running,
    Done,
}

/// 二重初期化を防ぐガード
#[derive(Debug, Default)]
pub struct SetupGuard {
    state: Cell<SetupState>,
}

impl SetupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SetupState {
        self.state.get()
    }

    /// Idle のときだけ Running に進めて true を返す
    pub fn try_begin(&self) -> bool {
        if self.state.get() != SetupState::Idle {
            return false;
        }
        self.state.set(SetupState::Running);
        true
    }

    pub fn finish(&self) {
        self.state.set(SetupState::Done);
    }
}

/// セットアップを成功するまで実行する
///
/// 既に実行中・完了済みなら何もせず false を返す。
pub async fn run_setup<S, F, Fut>(
    guard: &SetupGuard,
    sleeper: &S,
    policy: &RetryPolicy,
    mut setup: F,
) -> bool
where
    S: Sleeper + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if !guard.try_begin() {
        tracing::debug!("Setup already {:?}, skipping", guard.state());
        return false;
    }

    loop {
        tracing::info!("Starting initialization...");
        match setup().await {
            Ok(()) => {
                guard.finish();
                tracing::info!("Script initialized successfully (Romaji First)");
                return true;
            }
            Err(e) => {
                tracing::error!("Initialization failed: {}", e);
                tracing::info!(
                    "Will retry in {} seconds...",
                    policy.init_retry().as_secs_f32()
                );
                sleeper.sleep(policy.init_retry()).await;
            }
        }
    }
}

//! Romaji Dropdown Common Library
//!
//! CLIとWeb(WASM)で共有される分類ロジックとコントローラ

pub mod types;
pub mod config;
pub mod error;
pub mod classifier;
pub mod comparator;
pub mod host;
pub mod controller;
pub mod readiness;

pub use types::{Catalog, NameVariant, TitledEntry, LANG_ENGLISH, LANG_ROMAJI};
pub use config::{ClassifierConfig, DropdownConfig, NamePolicy, RetryPolicy};
pub use error::{Error, Result};
pub use classifier::{classify, Classification, NameClassifier};
pub use comparator::{compare_for_display, ComparatorStrategy, DisplayComparator};
pub use host::{
    AutocompleteHost, CatalogDelta, CatalogEvent, CatalogSource, CatalogVersion, HostCommand, Sleeper,
};
pub use controller::{complete_update, DropdownController, DropdownSnapshot, UpdateOutcome, UpdatePlan};
pub use readiness::{await_until, load_catalog, run_setup, SetupGuard, SetupState};

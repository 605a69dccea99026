//! # Seek Core Library
//!
//! Query providers, search results and the filesystem path cache behind the
//! Seek quick launcher. The crate owns no UI: a caller types text, hands it
//! to every [`Provider`], drains completions from a [`TaskRunner`], merges
//! the results and finally calls [`SearchResult::activate`] on the one the
//! user picked.
//!
//! ## Architecture
//!
//! - **Providers** (`providers`): Application, Calculator, File, Terminal, URL
//! - **Results** (`result`): Tagged search results and their activation
//! - **Cache** (`cache`): One-shot breadth-first crawl into an append-only path list
//! - **Tasks** (`task`): Background workers with cooperative cancellation
//! - **Collaborators** (`fuzzy`, `icon`, `apps`, `calc`, `desktop`): Traits
//!   with default implementations for matching, icons, installed
//!   applications, expression evaluation and OS side effects
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,ignore
//! use seek_core::{standard_providers, Config, TaskRunner};
//! use std::time::Duration;
//!
//! let config = Config::load()?;
//! let runner = TaskRunner::new();
//! let providers = standard_providers(&config, &runner);
//!
//! for provider in &providers {
//!     provider.query("=6*7", |results| {
//!         for result in results {
//!             println!("{} ({})", result.title(), result.score());
//!         }
//!     });
//! }
//! runner.run_until_idle(Duration::from_secs(1));
//! ```

pub mod apps;
pub mod cache;
pub mod calc;
pub mod config;
pub mod desktop;
pub mod error;
pub mod fuzzy;
pub mod icon;
pub mod providers;
pub mod result;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use apps::{AppCatalog, AppEntry, DesktopEntryCatalog};
pub use cache::{BuildState, PathCache};
pub use calc::{ArithmeticEvaluator, ExpressionEvaluator, Value};
pub use config::Config;
pub use desktop::{Desktop, Environment, SpawnRequest, SystemDesktop};
pub use error::{Result, SeekError};
pub use fuzzy::{FuzzyMatch, FuzzyMatcher, SubsequenceMatcher};
pub use icon::{Icon, IconRegistry, IconResolver};
pub use providers::{standard_providers, FileProvider, Provider};
pub use result::{Payload, ResultKind, SearchResult};
pub use task::{CancellationToken, Delivery, TaskHandle, TaskRunner};

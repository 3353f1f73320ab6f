pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileCamera, HttpBackend, HttpTranslator, LocalStorage, MemoryStorage};
pub use config::AppConfig;
pub use core::matcher::match_allergens;
pub use core::profile::{ProfileState, ProfileStore};
pub use core::router::CaptureRouter;
pub use core::screen::{ScreenScope, ScreenState};
pub use utils::error::{QsineError, Result};

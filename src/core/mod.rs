pub mod capture;
pub mod matcher;
pub mod profile;
pub mod router;
pub mod screen;

pub use crate::domain::model::{AllergenMatchResult, CaptureMode, CaptureResult, Route};
pub use crate::domain::ports::{Camera, ConfigProvider, FoodBackend, KeyValueStore, Translator};
pub use crate::utils::error::Result;

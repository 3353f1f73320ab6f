// Adapters layer: concrete implementations for external systems (http backend, translation, storage, camera)

pub mod camera;
pub mod http;
pub mod storage;
pub mod translate;

pub use camera::{path_from_uri, FileCamera};
pub use http::HttpBackend;
pub use storage::{LocalStorage, MemoryStorage};
pub use translate::HttpTranslator;

pub mod barcode_flow;
pub mod image_flow;
pub mod settings_flow;
pub mod text_flow;

pub use barcode_flow::{BarcodeDetail, BarcodeFlow, BarcodeOutcome};
pub use image_flow::ImageFlow;
pub use settings_flow::SettingsFlow;
pub use text_flow::{TextAnalysis, TextConfirmation, TextFlow};

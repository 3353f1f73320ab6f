use crate::domain::model::{CaptureMode, CaptureResult, Route};
use crate::utils::error::{QsineError, Result};

/// Maps capture events to the next screen.
///
/// After a barcode has been routed every further barcode event is dropped
/// until [`CaptureRouter::on_focus`] is called, so a code held in front of
/// the camera pushes its detail screen only once.
#[derive(Debug, Default)]
pub struct CaptureRouter {
    barcode_locked: bool,
}

impl CaptureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(None)` for a suppressed barcode event.
    pub fn route(&mut self, result: CaptureResult, mode: CaptureMode) -> Result<Option<Route>> {
        match result {
            CaptureResult::Barcode { value } => {
                if self.barcode_locked {
                    tracing::debug!("Ignoring repeated barcode scan: {}", value);
                    return Ok(None);
                }
                self.barcode_locked = true;
                Ok(Some(Route::BarcodeDetail { barcode: value }))
            }
            CaptureResult::Picture { uri } => route_picture(uri, mode).map(Some),
        }
    }

    /// Camera screen regained focus.
    pub fn on_focus(&mut self) {
        self.barcode_locked = false;
    }

    pub fn is_barcode_locked(&self) -> bool {
        self.barcode_locked
    }
}

fn route_picture(uri: String, mode: CaptureMode) -> Result<Route> {
    match mode {
        CaptureMode::Text => Ok(Route::TextAnalysis { uri }),
        CaptureMode::Image => Ok(Route::ImageAnalysis { uri }),
        CaptureMode::Barcode => Err(QsineError::InvalidModeForCapture {
            mode: mode.to_string(),
        }),
    }
}

/// Stateless routing, without debounce.
pub fn route(result: CaptureResult, mode: CaptureMode) -> Result<Route> {
    match result {
        CaptureResult::Barcode { value } => Ok(Route::BarcodeDetail { barcode: value }),
        CaptureResult::Picture { uri } => route_picture(uri, mode),
    }
}

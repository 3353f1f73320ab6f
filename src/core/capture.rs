use crate::core::router::CaptureRouter;
use crate::domain::model::{CaptureMode, CaptureResult, Route};
use crate::domain::ports::Camera;
use crate::utils::error::{CaptureError, QsineError, Result};

/// Camera screen logic: active mode, shutter state and capture events.
pub struct CaptureSession<C: Camera> {
    camera: C,
    mode: CaptureMode,
    router: CaptureRouter,
}

impl<C: Camera> CaptureSession<C> {
    pub fn new(camera: C, mode: CaptureMode) -> Self {
        Self {
            camera,
            mode,
            router: CaptureRouter::new(),
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        tracing::debug!("Capture mode changed: {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    /// 條碼模式下快門不可用
    pub fn shutter_enabled(&self) -> bool {
        self.mode != CaptureMode::Barcode && self.camera.permission_granted()
    }

    pub async fn press_shutter(&mut self) -> Result<Route> {
        if self.mode == CaptureMode::Barcode {
            return Err(QsineError::InvalidModeForCapture {
                mode: self.mode.to_string(),
            });
        }
        self.ensure_permission()?;

        let uri = match self.camera.take_picture().await {
            Ok(uri) if !uri.is_empty() => uri,
            Ok(_) => {
                return Err(CaptureError::Hardware("No photo captured or URI is missing".into()).into())
            }
            Err(e) => {
                tracing::error!("Error during picture capture: {}", e);
                return Err(e);
            }
        };

        tracing::info!("Picture captured: {}", uri);
        self.router
            .route(CaptureResult::Picture { uri }, self.mode)?
            .ok_or_else(|| CaptureError::Hardware("Picture was not routed".into()).into())
    }

    pub fn on_barcode_scanned(&mut self, value: &str) -> Result<Option<Route>> {
        self.ensure_permission()?;
        self.router.route(
            CaptureResult::Barcode {
                value: value.to_string(),
            },
            self.mode,
        )
    }

    pub fn on_focus(&mut self) {
        self.router.on_focus();
    }

    fn ensure_permission(&self) -> Result<()> {
        if self.camera.permission_granted() {
            Ok(())
        } else {
            Err(CaptureError::PermissionDenied.into())
        }
    }
}

use httpmock::prelude::*;
use qsine::app::flows::ImageFlow;
use qsine::core::capture::CaptureSession;
use qsine::core::{CaptureMode, Route};
use qsine::{FileCamera, HttpBackend, QsineError, ScreenScope};
use std::time::Duration;

#[tokio::test]
async fn test_image_capture_is_classified() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("burger.jpg");
    std::fs::write(&image, b"\xFF\xD8\xFFfake").unwrap();

    let server = MockServer::start();
    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/upload-image")
            .body_contains("filename=\"burger.jpg\"");
        then.status(200)
            .json_body(serde_json::json!({"classification": [0.875, "cheeseburger"]}));
    });

    let mut session = CaptureSession::new(FileCamera::new(Some(image)), CaptureMode::Image);
    assert!(session.shutter_enabled());

    let route = session.press_shutter().await.unwrap();
    let Route::ImageAnalysis { uri } = route else {
        panic!("expected image analysis, got {:?}", route);
    };
    assert!(uri.starts_with("file://"));

    let backend = HttpBackend::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    let scope = ScreenScope::new("image");
    let next = ImageFlow::new(backend).submit(&scope, &uri, None).await.unwrap();
    upload.assert();

    let Route::ImageResults { classification } = next else {
        panic!("expected image results");
    };
    assert_eq!(classification.label, "cheeseburger");
    assert_eq!(classification.display_confidence(), "87.5%");
}

#[tokio::test]
async fn test_text_mode_routes_to_text_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("menu.png");
    std::fs::write(&image, b"\x89PNGfake").unwrap();

    let mut session = CaptureSession::new(FileCamera::new(Some(image)), CaptureMode::Image);
    session.set_mode(CaptureMode::Text);

    let route = session.press_shutter().await.unwrap();
    assert_eq!(route.screen(), "TextAnalysis");
}

#[tokio::test]
async fn test_barcode_scans_are_debounced_until_focus() {
    let mut session = CaptureSession::new(FileCamera::new(None), CaptureMode::Barcode);
    assert!(!session.shutter_enabled());

    let first = session.on_barcode_scanned("014100099482").unwrap();
    assert_eq!(
        first,
        Some(Route::BarcodeDetail {
            barcode: "014100099482".to_string()
        })
    );
    for _ in 0..5 {
        assert_eq!(session.on_barcode_scanned("014100099482").unwrap(), None);
    }

    // 從詳細頁返回相機畫面
    session.on_focus();
    assert!(session.on_barcode_scanned("014100099482").unwrap().is_some());
}

#[tokio::test]
async fn test_shutter_in_barcode_mode_is_rejected() {
    let mut session = CaptureSession::new(FileCamera::new(None), CaptureMode::Barcode);
    let err = session.press_shutter().await.unwrap_err();
    assert!(matches!(err, QsineError::InvalidModeForCapture { .. }));
}

#[tokio::test]
async fn test_missing_picture_is_a_capture_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = CaptureSession::new(
        FileCamera::new(Some(dir.path().join("missing.jpg"))),
        CaptureMode::Image,
    );
    let err = session.press_shutter().await.unwrap_err();
    assert!(matches!(err, QsineError::Capture(_)));
}

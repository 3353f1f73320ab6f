use crate::adapters::camera::path_from_uri;
use crate::core::screen::ScreenScope;
use crate::domain::model::Route;
use crate::domain::ports::FoodBackend;
use crate::utils::error::Result;

pub struct ImageFlow<B: FoodBackend> {
    backend: B,
}

impl<B: FoodBackend> ImageFlow<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Uploads the (cropped) picture and routes to the classification result.
    pub async fn submit(
        &self,
        scope: &ScreenScope,
        uri: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<Route> {
        let image = path_from_uri(uri)?;
        tracing::info!("Uploading image {}", image.display());

        let classification = scope
            .run(self.backend.upload_image(&image, metadata))
            .await
            .inspect_err(|e| tracing::error!("Error processing image: {}", e))?;

        tracing::info!(
            "Image classified as {} ({})",
            classification.label,
            classification.display_confidence()
        );
        Ok(Route::ImageResults { classification })
    }
}

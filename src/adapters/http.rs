use crate::domain::model::{
    Allergen, ImageClassification, Product, ProductDetails, Recipe, TextClassification,
};
use crate::domain::ports::{ConfigProvider, FoodBackend};
use crate::utils::error::{QsineError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct UploadImageResponse {
    classification: ImageClassification,
}

#[derive(Deserialize)]
struct UploadTextImageResponse {
    text: String,
}

#[derive(Deserialize)]
struct ClassifyTextResponse {
    data: TextClassification,
}

#[derive(Serialize)]
struct ClassifyTextRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct UpdateProductRequest<'a> {
    product: &'a Product,
}

/// reqwest client for the QSine backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("qsine/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let parsed = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| QsineError::InvalidConfigValue {
                field: "api.base_url".to_string(),
                value: base_url.to_string(),
                reason: "Not a valid base URL".to_string(),
            })?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// 每一段路徑都會被百分比編碼，條碼或 key 裡的 `/`、`?` 不會改變目標
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url_for(segments);
        tracing::debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Something went wrong").to_string());

        if status == StatusCode::NOT_FOUND {
            tracing::warn!("Server reported not found: {}", message);
            Err(QsineError::not_found(message))
        } else {
            tracing::error!("Server Error: {}", message);
            Err(QsineError::api(status.as_u16(), message))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        Ok(response.json().await?)
    }

    async fn image_part(image: &Path) -> Result<Part> {
        let bytes = tokio::fs::read(image).await?;
        let file_name = image
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("photo.jpg")
            .to_string();
        let mime = match image.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
            _ => "image/jpeg",
        };
        Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime)?)
    }
}

#[async_trait]
impl FoodBackend for HttpBackend {
    async fn lookup_barcode(&self, barcode: &str) -> Result<ProductDetails> {
        self.send_json(self.request(Method::GET, &["barcode", barcode]))
            .await
    }

    async fn update_product(&self, barcode: &str, product: &Product) -> Result<()> {
        let builder = self
            .request(Method::PUT, &["barcode", barcode])
            .json(&UpdateProductRequest { product });
        self.send(builder).await?;
        Ok(())
    }

    async fn create_product(&self, barcode: &str, product: &Product) -> Result<()> {
        let builder = self
            .request(Method::POST, &["barcode", barcode])
            .json(product);
        self.send(builder).await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        image: &Path,
        metadata: Option<&serde_json::Value>,
    ) -> Result<ImageClassification> {
        let mut form = Form::new().part("image", Self::image_part(image).await?);
        if let Some(metadata) = metadata {
            form = form.text("metadata", serde_json::to_string(metadata)?);
        }

        let response: UploadImageResponse = self
            .send_json(self.request(Method::POST, &["upload-image"]).multipart(form))
            .await?;
        Ok(response.classification)
    }

    async fn upload_text_image(&self, image: &Path, language: &str) -> Result<String> {
        let form = Form::new()
            .part("image", Self::image_part(image).await?)
            .text("language", language.to_string());

        let response: UploadTextImageResponse = self
            .send_json(
                self.request(Method::POST, &["upload-text-image", language])
                    .multipart(form),
            )
            .await?;
        Ok(response.text)
    }

    async fn classify_text(&self, text: &str) -> Result<TextClassification> {
        let builder = self
            .request(Method::POST, &["classify-text"])
            .json(&ClassifyTextRequest { text });
        let response: ClassifyTextResponse = self.send_json(builder).await?;
        Ok(response.data)
    }

    async fn get_recipe(&self, key: &str) -> Result<Recipe> {
        self.send_json(self.request(Method::GET, &["get-recipe", key]))
            .await
    }

    async fn list_allergens(&self) -> Result<Vec<Allergen>> {
        self.send_json(self.request(Method::GET, &["get-allergens"])).await
    }
}

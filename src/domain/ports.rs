use crate::domain::model::{
    Allergen, ImageClassification, Product, ProductDetails, Recipe, TextClassification,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Durable key-value storage holding string values.
pub trait KeyValueStore: Send + Sync {
    fn get_item(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_item(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn translation_endpoint(&self) -> &str;
    fn translation_api_key(&self) -> Option<&str>;
    fn target_language(&self) -> &str;
    fn data_dir(&self) -> &str;
}

/// Remote food backend.
#[async_trait]
pub trait FoodBackend: Send + Sync {
    async fn lookup_barcode(&self, barcode: &str) -> Result<ProductDetails>;
    async fn update_product(&self, barcode: &str, product: &Product) -> Result<()>;
    async fn create_product(&self, barcode: &str, product: &Product) -> Result<()>;
    async fn upload_image(
        &self,
        image: &Path,
        metadata: Option<&serde_json::Value>,
    ) -> Result<ImageClassification>;
    async fn upload_text_image(&self, image: &Path, language: &str) -> Result<String>;
    async fn classify_text(&self, text: &str) -> Result<TextClassification>;
    async fn get_recipe(&self, key: &str) -> Result<Recipe>;
    async fn list_allergens(&self) -> Result<Vec<Allergen>>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// `source` 是 ISO-639-1 代碼，`None` 交給服務自動偵測
    async fn translate(&self, text: &str, source: Option<&str>) -> Result<String>;
}

/// Camera hardware. Picture capture returns a file URI.
#[async_trait]
pub trait Camera: Send + Sync {
    fn permission_granted(&self) -> bool;
    async fn take_picture(&self) -> Result<String>;
}

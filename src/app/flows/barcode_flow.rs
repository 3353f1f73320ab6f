use crate::core::matcher::match_allergens;
use crate::core::screen::ScreenScope;
use crate::domain::model::{AllergenMatchResult, Product, Route, UserAllergenProfile};
use crate::domain::ports::FoodBackend;
use crate::utils::error::{QsineError, Result};
use crate::utils::validation::validate_barcode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeDetail {
    pub barcode: String,
    pub product: Product,
    pub recipe_name: Option<String>,
    pub allergies: Vec<String>,
    pub allergens: AllergenMatchResult,
}

impl BarcodeDetail {
    /// 使用者的過敏原設定改變時重新計算
    pub fn rematch(&mut self, profile: &UserAllergenProfile) {
        self.allergens = match_allergens(profile.ids(), &self.allergies);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BarcodeOutcome {
    Detail(BarcodeDetail),
    /// Product unknown to the backend: continue on the manual entry screen.
    ManualEntry(Route),
}

pub struct BarcodeFlow<B: FoodBackend> {
    backend: B,
}

impl<B: FoodBackend> BarcodeFlow<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub async fn open(
        &self,
        scope: &ScreenScope,
        barcode: &str,
        profile: &UserAllergenProfile,
    ) -> Result<BarcodeOutcome> {
        validate_barcode(barcode)?;
        tracing::info!("Looking up barcode {}", barcode);

        let details = match scope.run(self.backend.lookup_barcode(barcode)).await {
            Ok(details) => details,
            Err(QsineError::NotFound { message }) => {
                tracing::info!("Barcode {} not found ({}), falling back to manual entry", barcode, message);
                return Ok(BarcodeOutcome::ManualEntry(Route::ManualEntry {
                    barcode: barcode.to_string(),
                }));
            }
            Err(e) => return Err(e),
        };

        let allergens = match_allergens(profile.ids(), &details.allergens.allergies);
        tracing::debug!(
            matching = allergens.matching.len(),
            other = allergens.other.len(),
            "Matched product allergens"
        );

        Ok(BarcodeOutcome::Detail(BarcodeDetail {
            barcode: barcode.to_string(),
            product: details.product,
            recipe_name: details.allergens.recipe_name,
            allergies: details.allergens.allergies,
            allergens,
        }))
    }

    /// Saves an edited product.
    pub async fn save_edit(&self, scope: &ScreenScope, barcode: &str, product: &Product) -> Result<()> {
        validate_barcode(barcode)?;
        scope
            .run(self.backend.update_product(barcode, product))
            .await
            .inspect_err(|e| tracing::error!("Failed to save changes: {}", e))
    }

    /// Submits a product entered by hand after a failed lookup.
    pub async fn submit_manual(
        &self,
        scope: &ScreenScope,
        barcode: &str,
        name: &str,
        company: &str,
        ingredients: &[String],
    ) -> Result<Product> {
        validate_barcode(barcode)?;
        let product = Product {
            name: name.to_string(),
            company: company.to_string(),
            ingredients: ingredients
                .iter()
                .filter(|ingredient| !ingredient.trim().is_empty())
                .cloned()
                .collect(),
        };

        scope
            .run(self.backend.create_product(barcode, &product))
            .await?;
        tracing::info!("Submitted product {} for barcode {}", product.name, barcode);
        Ok(product)
    }
}

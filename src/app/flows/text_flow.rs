use crate::adapters::camera::path_from_uri;
use crate::adapters::translate::iso_language_code;
use crate::core::matcher::match_allergens;
use crate::core::screen::ScreenScope;
use crate::domain::model::{
    capitalize_first, AllergenMatchResult, ClassificationItem, Route, TextClassification,
    UserAllergenProfile,
};
use crate::domain::ports::{FoodBackend, Translator};
use crate::utils::error::{QsineError, Result};
use serde::Serialize;

pub const DEFAULT_LANGUAGE: &str = "eng";

/// Editable text on the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextConfirmation {
    original: String,
    pub edited: String,
    pub language: String,
    pub manual: bool,
    translated: Option<String>,
}

impl TextConfirmation {
    pub fn new(text: &str, language: &str, manual: bool) -> Self {
        Self {
            original: text.to_string(),
            edited: text.to_string(),
            language: language.to_string(),
            manual,
            translated: None,
        }
    }

    pub fn from_route(route: &Route) -> Option<Self> {
        match route {
            Route::TextConfirm {
                text,
                language,
                manual,
            } => Some(Self::new(text, language, *manual)),
            _ => None,
        }
    }

    fn is_english(&self) -> bool {
        self.language.eq_ignore_ascii_case(DEFAULT_LANGUAGE)
    }

    /// 非英文的擷取文字一打開就自動翻譯
    pub fn needs_auto_translation(&self) -> bool {
        !self.original.is_empty() && !self.is_english()
    }

    pub fn is_modified(&self) -> bool {
        self.edited != self.original
    }

    pub fn can_retranslate(&self) -> bool {
        !self.original.is_empty() && !self.manual && !self.is_english() && self.is_modified()
    }

    pub fn translated(&self) -> Option<&str> {
        self.translated.as_deref()
    }

    /// The translation wins over the edited text when one exists.
    pub fn confirm(&self) -> Result<Route> {
        if self.edited.is_empty() {
            return Err(QsineError::validation("Please enter some text"));
        }
        let confirmed_text = self
            .translated
            .clone()
            .unwrap_or_else(|| self.edited.clone());
        Ok(Route::TextResults { confirmed_text })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecipeView {
    pub recipe_name: String,
    pub allergies: Vec<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub confirmed_text: String,
    pub items: Vec<ClassificationItem>,
    pub selected: usize,
    pub recipe: RecipeView,
}

impl TextAnalysis {
    fn from_classification(confirmed_text: &str, data: TextClassification) -> Self {
        let items: Vec<ClassificationItem> = data
            .classifications
            .iter()
            .enumerate()
            .map(|(index, name)| ClassificationItem {
                name: name.clone(),
                confidence: data
                    .confidences
                    .as_ref()
                    .and_then(|c| c.get(index).copied())
                    .unwrap_or(0.0),
            })
            .collect();

        let recipe = RecipeView {
            recipe_name: data.classifications.first().cloned().unwrap_or_default(),
            allergies: data.allergens.allergies,
            ingredients: data.ingredients,
            steps: data.steps,
            keys: data.keys,
        };

        Self {
            confirmed_text: confirmed_text.to_string(),
            items,
            selected: 0,
            recipe,
        }
    }

    pub fn selected_item(&self) -> Option<&ClassificationItem> {
        self.items.get(self.selected)
    }

    pub fn title(&self) -> String {
        match self.selected_item() {
            Some(item) if !item.name.is_empty() => capitalize_first(&item.name),
            _ => "Unknown".to_string(),
        }
    }

    pub fn allergen_match(&self, profile: &UserAllergenProfile) -> AllergenMatchResult {
        match_allergens(profile.ids(), &self.recipe.allergies)
    }
}

pub struct TextFlow<B: FoodBackend, T: Translator> {
    backend: B,
    translator: Option<T>,
}

impl<B: FoodBackend, T: Translator> TextFlow<B, T> {
    pub fn new(backend: B, translator: Option<T>) -> Self {
        Self {
            backend,
            translator,
        }
    }

    /// Uploads the cropped menu picture and routes to the confirmation screen.
    pub async fn submit_image(&self, scope: &ScreenScope, uri: &str, language: &str) -> Result<Route> {
        let image = path_from_uri(uri)?;
        tracing::info!("Uploading text image {} ({})", image.display(), language);

        let text = scope
            .run(self.backend.upload_text_image(&image, language))
            .await
            .inspect_err(|e| tracing::error!("Error processing image: {}", e))?;

        Ok(Route::TextConfirm {
            text,
            language: language.to_string(),
            manual: false,
        })
    }

    /// Typing the text instead of photographing it.
    pub fn manual_entry(&self) -> Route {
        Route::TextConfirm {
            text: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            manual: true,
        }
    }

    pub async fn translate(&self, scope: &ScreenScope, confirmation: &mut TextConfirmation) -> Result<()> {
        if confirmation.edited.is_empty() {
            return Err(QsineError::validation("No text to translate"));
        }
        let translator = self.translator.as_ref().ok_or_else(|| QsineError::MissingConfig {
            field: "translation.api_key".to_string(),
        })?;

        let source = iso_language_code(&confirmation.language);
        let translated = scope
            .run(translator.translate(&confirmation.edited, source))
            .await
            .inspect_err(|e| tracing::error!("Error translating text: {}", e))?;

        tracing::debug!("Translated text: {}", translated);
        confirmation.translated = Some(translated);
        Ok(())
    }

    pub async fn classify(&self, scope: &ScreenScope, confirmed_text: &str) -> Result<TextAnalysis> {
        if confirmed_text.is_empty() {
            return Err(QsineError::validation("No text provided for classification"));
        }

        let data = scope
            .run(self.backend.classify_text(confirmed_text))
            .await
            .inspect_err(|e| tracing::error!("Error classifying text: {}", e))?;

        let analysis = TextAnalysis::from_classification(confirmed_text, data);
        tracing::info!(
            "Text classified as {} ({} candidates)",
            analysis.title(),
            analysis.items.len()
        );
        Ok(analysis)
    }

    /// Switches to another candidate classification.
    ///
    /// When the candidate has a recipe key its recipe is fetched and merged
    /// over the current view; a failed fetch keeps the view unchanged apart
    /// from the selection.
    pub async fn select(&self, scope: &ScreenScope, analysis: &mut TextAnalysis, index: usize) -> Result<()> {
        if index == analysis.selected {
            return Ok(());
        }
        let item = analysis
            .items
            .get(index)
            .cloned()
            .ok_or_else(|| QsineError::validation(format!("No classification at index {}", index)))?;
        analysis.selected = index;

        let Some(key) = analysis.recipe.keys.get(index).filter(|k| !k.is_empty()).cloned() else {
            analysis.recipe.recipe_name = item.name;
            return Ok(());
        };

        match scope.run(self.backend.get_recipe(&key)).await {
            Ok(recipe) => {
                tracing::debug!("Recipe {} fetched", key);
                if let Some(name) = recipe.recipe_name.filter(|n| !n.is_empty()) {
                    analysis.recipe.recipe_name = name;
                }
                if let Some(ingredients) = recipe.ingredients {
                    analysis.recipe.ingredients = ingredients;
                }
                if let Some(steps) = recipe.steps {
                    analysis.recipe.steps = steps;
                }
                Ok(())
            }
            Err(QsineError::Cancelled) => Err(QsineError::Cancelled),
            Err(e) => {
                tracing::error!("Error fetching recipe {}: {}", key, e);
                Ok(())
            }
        }
    }
}

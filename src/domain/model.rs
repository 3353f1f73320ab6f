use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 使用者選擇的過敏原 id，順序只為了存檔往返時保持一致
///
/// Two profiles are equal when they hold the same set of ids; stored order
/// and repeated entries do not count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserAllergenProfile {
    ids: Vec<String>,
}

impl UserAllergenProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl PartialEq for UserAllergenProfile {
    fn eq(&self, other: &Self) -> bool {
        self.ids.iter().all(|id| other.contains(id)) && other.ids.iter().all(|id| self.contains(id))
    }
}

impl Eq for UserAllergenProfile {}

impl<S: Into<String>> FromIterator<S> for UserAllergenProfile {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Vec<String>> for UserAllergenProfile {
    fn from(ids: Vec<String>) -> Self {
        Self { ids }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllergenMatchResult {
    pub matching: Vec<String>,
    pub other: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaptureResult {
    Barcode { value: String },
    Picture { uri: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CaptureMode {
    Text,
    Image,
    Barcode,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Barcode => "barcode",
        };
        f.write_str(name)
    }
}

/// Typed navigation message passed from the router to the next screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", content = "params")]
pub enum Route {
    BarcodeDetail {
        barcode: String,
    },
    TextAnalysis {
        uri: String,
    },
    ImageAnalysis {
        uri: String,
    },
    ManualEntry {
        barcode: String,
    },
    TextConfirm {
        text: String,
        language: String,
        manual: bool,
    },
    TextResults {
        confirmed_text: String,
    },
    ImageResults {
        classification: ImageClassification,
    },
}

impl Route {
    pub fn screen(&self) -> &'static str {
        match self {
            Self::BarcodeDetail { .. } => "BarcodeDetail",
            Self::TextAnalysis { .. } => "TextAnalysis",
            Self::ImageAnalysis { .. } => "ImageAnalysis",
            Self::ManualEntry { .. } => "ManualEntry",
            Self::TextConfirm { .. } => "TextConfirm",
            Self::TextResults { .. } => "TextResults",
            Self::ImageResults { .. } => "ImageResults",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl Product {
    /// 編輯畫面的成分欄位：一行一個，空白行丟掉
    pub fn set_ingredients_from_text(&mut self, text: &str) {
        self.ingredients = text
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
    }

    pub fn ingredients_text(&self) -> String {
        self.ingredients.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergenSummary {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default)]
    pub allergens: AllergenSummary,
    pub product: Product,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergen {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Confidence {
    Number(f64),
    Text(String),
}

impl Confidence {
    fn value(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

/// `[confidence, label]` pair returned by the image upload endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageClassification {
    pub confidence: f64,
    pub label: String,
}

impl<'de> Deserialize<'de> for ImageClassification {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (confidence, label) = <(Confidence, String)>::deserialize(deserializer)?;
        Ok(Self {
            confidence: confidence.value(),
            label,
        })
    }
}

impl ImageClassification {
    pub fn display_confidence(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextClassification {
    #[serde(default)]
    pub classifications: Vec<String>,
    #[serde(default)]
    pub confidences: Option<Vec<f64>>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: AllergenSummary,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationItem {
    pub name: String,
    pub confidence: f64,
}

impl ClassificationItem {
    pub fn display_confidence(&self) -> String {
        format!("{:.1}", self.confidence.abs())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub steps: Option<Vec<String>>,
}

/// Upper-cases the first character, as result headers do.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

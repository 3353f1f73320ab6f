use crate::config::toml_config::AppConfig;
use crate::domain::model::CaptureMode;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "qsine.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "qsine")]
#[command(about = "Scan food, menus and barcodes and check them against your allergens")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "QSINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides [api].base_url)
    #[arg(long, env = "QSINE_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the local allergen profile
    #[arg(long, env = "QSINE_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Translation API key (overrides [translation].api_key)
    #[arg(long, env = "QSINE_TRANSLATE_KEY", hide_env_values = true)]
    pub translate_key: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Manage the local allergen profile
    Allergens {
        #[command(subcommand)]
        action: AllergenCommand,
    },
    /// Look up a barcode and check its allergens
    Barcode { code: String },
    /// Edit a known product
    EditProduct {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// File with one ingredient per line
        #[arg(long)]
        ingredients_file: Option<PathBuf>,
    },
    /// Enter a product the backend does not know yet
    AddProduct {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long = "ingredient")]
        ingredients: Vec<String>,
    },
    /// Run a capture event through the router and continue the flow
    Capture {
        #[arg(long, value_enum, default_value = "image")]
        mode: CaptureMode,
        /// Picture to "take" with the shutter
        #[arg(long, conflicts_with = "barcode")]
        image: Option<PathBuf>,
        /// Decoded barcode payload
        #[arg(long)]
        barcode: Option<String>,
        /// OCR language for text mode (eng, fre, spa)
        #[arg(long, default_value = "eng")]
        language: String,
    },
    /// Classify a food picture
    Image {
        path: PathBuf,
        /// JSON metadata sent along with the image
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Extract menu text from a picture, translate and classify it
    Text {
        path: PathBuf,
        #[arg(long, default_value = "eng")]
        language: String,
        /// Pick another candidate classification
        #[arg(long)]
        select: Option<usize>,
    },
    /// Classify typed text
    ClassifyText {
        text: String,
        #[arg(long)]
        select: Option<usize>,
    },
    /// Translate text to the configured target language
    Translate {
        text: String,
        #[arg(long, default_value = "eng")]
        language: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum AllergenCommand {
    /// Show the selected allergens
    List,
    /// Show the backend allergen catalogue
    Catalogue {
        #[arg(default_value = "")]
        query: String,
    },
    /// Select or deselect an allergen id
    Toggle { id: String },
    /// Replace the selection
    Set { ids: Vec<String> },
    /// Remove every selection
    Clear,
}

impl CliConfig {
    /// Loads the TOML file (when present) and applies the command line overrides.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                AppConfig::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => AppConfig::default(),
        };

        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if let Some(key) = &self.translate_key {
            config.translation.api_key = Some(key.clone());
        }
        if self.log_json {
            config.logging.json = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;

    #[test]
    fn test_overrides_apply_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qsine.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://file.example.com\"\n[storage]\ndata_dir = \"/from/file\"\n",
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "qsine",
            "--config",
            path.to_str().unwrap(),
            "--api-url",
            "https://cli.example.com",
            "allergens",
            "list",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.api.base_url, "https://cli.example.com");
        assert_eq!(config.storage.data_dir, "/from/file");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_capture_command() {
        let cli = CliConfig::parse_from([
            "qsine",
            "capture",
            "--mode",
            "barcode",
            "--barcode",
            "014100099482",
        ]);
        match cli.command {
            Command::Capture { mode, barcode, .. } => {
                assert_eq!(mode, CaptureMode::Barcode);
                assert_eq!(barcode.as_deref(), Some("014100099482"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_config_file_is_error() {
        let cli = CliConfig::parse_from(["qsine", "--config", "/nonexistent/qsine.toml", "allergens", "list"]);
        assert!(cli.resolve().is_err());
    }
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Camera permission has not been granted")]
    PermissionDenied,

    #[error("Capture hardware failure: {0}")]
    Hardware(String),
}

#[derive(Error, Debug)]
pub enum QsineError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Cannot take a picture while capture mode is '{mode}'")]
    InvalidModeForCapture { mode: String },

    #[error("Operation cancelled because its screen was closed")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    NotFound,
    Storage,
    Capture,
    Contract,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low => 0, // 警告，但成功
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl QsineError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Api { .. } => ErrorCategory::Network,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Storage { .. } | Self::Io(_) | Self::Serialization(_) => ErrorCategory::Storage,
            Self::Capture(_) => ErrorCategory::Capture,
            Self::InvalidModeForCapture { .. } | Self::Cancelled => ErrorCategory::Contract,
            Self::ConfigValidation { .. }
            | Self::MissingConfig { .. }
            | Self::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            Self::Validation { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound | ErrorCategory::Storage => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Capture => ErrorSeverity::High,
            ErrorCategory::Contract | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 顯示給使用者的訊息（畫面上的 inline error）
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Network(_) => "Something went wrong".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::NotFound { message } => message.clone(),
            Self::Storage { .. } => "Saved settings could not be read".to_string(),
            Self::Io(e) => format!("File error: {}", e),
            Self::Serialization(e) => format!("Malformed data: {}", e),
            Self::Capture(CaptureError::PermissionDenied) => {
                "We need your permission to show the camera".to_string()
            }
            Self::Capture(CaptureError::Hardware(_)) => {
                "No photo captured, please try again".to_string()
            }
            Self::InvalidModeForCapture { .. } => {
                "Pictures cannot be taken in barcode mode".to_string()
            }
            Self::Cancelled => "The request was cancelled".to_string(),
            Self::ConfigValidation { .. }
            | Self::MissingConfig { .. }
            | Self::InvalidConfigValue { .. } => format!("Configuration problem: {}", self),
            Self::Validation { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your connection and submit again",
            ErrorCategory::NotFound => "Enter the product details manually",
            ErrorCategory::Storage => "Your allergen selection will start empty; select it again",
            ErrorCategory::Capture => "Grant camera access or retake the picture",
            ErrorCategory::Contract => "Switch to text or image mode before taking a picture",
            ErrorCategory::Configuration => "Fix the configuration file or environment variables",
            ErrorCategory::Input => "Correct the input and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, QsineError>;

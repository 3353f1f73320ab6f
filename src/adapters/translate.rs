use crate::domain::ports::{ConfigProvider, Translator};
use crate::utils::error::{QsineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct TranslateResponse {
    data: Option<TranslateData>,
}

#[derive(Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Maps the OCR language codes used by the text upload endpoint to the
/// ISO-639-1 codes the translation service expects.
pub fn iso_language_code(ocr_language: &str) -> Option<&'static str> {
    match ocr_language.to_lowercase().as_str() {
        "eng" => Some("en"),
        "fre" => Some("fr"),
        "spa" => Some("es"),
        _ => None,
    }
}

/// Translation API client. The key is read from configuration only.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
    target: String,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, api_key: &str, target: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            target: target.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = config
            .translation_api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| QsineError::MissingConfig {
                field: "translation.api_key".to_string(),
            })?;
        Self::new(
            config.translation_endpoint(),
            api_key,
            config.target_language(),
            config.request_timeout(),
        )
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source: Option<&str>) -> Result<String> {
        let mut params = vec![
            ("key", self.api_key.as_str()),
            ("q", text),
            ("target", self.target.as_str()),
            ("format", "text"),
        ];
        if let Some(source) = source {
            params.push(("source", source));
        }

        tracing::debug!("Translating {} chars from {:?}", text.len(), source);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Error translating text: {} {}", status, body);
            return Err(QsineError::api(status.as_u16(), "Failed to translate text"));
        }

        let body: TranslateResponse = response.json().await?;
        body.data
            .and_then(|data| data.translations.into_iter().next())
            .map(|t| t.translated_text)
            .ok_or_else(|| QsineError::api(status.as_u16(), "Failed to translate text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_iso_language_code() {
        assert_eq!(iso_language_code("eng"), Some("en"));
        assert_eq!(iso_language_code("FRE"), Some("fr"));
        assert_eq!(iso_language_code("spa"), Some("es"));
        assert_eq!(iso_language_code("deu"), None);
    }

    #[tokio::test]
    async fn test_translate_sends_key_and_source() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/translate")
                .query_param("key", "test-key")
                .query_param("q", "pollo asado")
                .query_param("target", "en")
                .query_param("source", "es")
                .query_param("format", "text");
            then.status(200).json_body(serde_json::json!({
                "data": {"translations": [{"translatedText": "roast chicken"}]}
            }));
        });

        let translator = HttpTranslator::new(
            &server.url("/translate"),
            "test-key",
            "en",
            Duration::from_secs(5),
        )
        .unwrap();
        let translated = translator.translate("pollo asado", Some("es")).await.unwrap();

        mock.assert();
        assert_eq!(translated, "roast chicken");
    }

    #[tokio::test]
    async fn test_translate_missing_translations_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/translate");
            then.status(200).json_body(serde_json::json!({"data": {}}));
        });

        let translator =
            HttpTranslator::new(&server.url("/translate"), "k", "en", Duration::from_secs(5))
                .unwrap();
        assert!(translator.translate("hola", None).await.is_err());
    }
}

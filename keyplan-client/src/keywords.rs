use crate::error::{ClientError, Result};
use crate::result::KeywordTable;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

pub const DEFAULT_LOCALE: &str = "en-US";

/// Settings for the keyword volume API.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub api_key: String,
    pub endpoint: Url,
    pub locale: String,
}

impl FetcherConfig {
    pub fn new(api_key: impl Into<String>, endpoint: Url) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct KeywordRequest<'a> {
    search_question: &'a str,
    search_country: &'a str,
}

/// Client for the keyword volume endpoint.
pub struct KeywordFetcher {
    client: Client,
    config: FetcherConfig,
}

impl KeywordFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::ConfigError(
                "Keyword API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("keyplan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch the keyword table for one page.
    ///
    /// Callers that must not fail should use [`KeywordFetcher::fetch_or_empty`].
    pub async fn fetch(&self, page: &str) -> Result<KeywordTable> {
        debug!("Fetching keywords for '{}' ({})", page, self.config.locale);

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header("X-API-KEY", &self.config.api_key)
            .json(&KeywordRequest {
                search_question: page,
                search_country: &self.config.locale,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Invalid keyword body: {}", e)))?;

        let table = KeywordTable::from_json(body)?;
        debug!("Fetched {} keyword rows for '{}'", table.len(), page);
        Ok(table)
    }

    /// Like [`KeywordFetcher::fetch`], but a failure becomes an empty table
    /// plus the error that caused it.
    pub async fn fetch_or_empty(&self, page: &str) -> (KeywordTable, Option<ClientError>) {
        match self.fetch(page).await {
            Ok(table) => (table, None),
            Err(e) => {
                debug!("Keyword fetch for '{}' failed: {}", page, e);
                (KeywordTable::empty(), Some(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    fn fetcher_for(server: &MockServer) -> KeywordFetcher {
        let endpoint = Url::parse(&format!("{}/keywords", server.uri())).unwrap();
        KeywordFetcher::new(FetcherConfig::new("kw-test", endpoint)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_posts_question_and_country() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keywords"))
            .and(header("x-api-key", "kw-test"))
            .and(body_json(json!({
                "search_question": "trail shoes",
                "search_country": "en-US"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"keyword": "trail shoes", "volume": 1000},
                {"keyword": "best trail shoes", "volume": 250}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = fetcher_for(&mock_server);
        let table = fetcher.fetch("trail shoes").await.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns, vec!["keyword", "volume"]);
    }

    #[tokio::test]
    async fn test_fetch_uses_configured_locale() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keywords"))
            .and(body_json(json!({
                "search_question": "schuhe",
                "search_country": "de-DE"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"keyword": ["schuhe"]})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let endpoint = Url::parse(&format!("{}/keywords", mock_server.uri())).unwrap();
        let config = FetcherConfig::new("kw-test", endpoint).with_locale("de-DE");
        let fetcher = KeywordFetcher::new(config).unwrap();

        let table = fetcher.fetch("schuhe").await.unwrap();
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keywords"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&mock_server)
            .await;

        let fetcher = fetcher_for(&mock_server);
        let err = fetcher.fetch("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_fetch_or_empty_swallows_bad_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keywords"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = fetcher_for(&mock_server);
        let (table, error) = fetcher.fetch_or_empty("anything").await;

        assert!(table.is_empty());
        assert!(matches!(error, Some(ClientError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_fetch_or_empty_passes_through_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keywords"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"keyword": "a", "volume": 1}])),
            )
            .mount(&mock_server)
            .await;

        let fetcher = fetcher_for(&mock_server);
        let (table, error) = fetcher.fetch_or_empty("a").await;

        assert_eq!(table.len(), 1);
        assert!(error.is_none());
    }

    #[tokio::test]
    async fn test_fetch_or_empty_failure_stays_below_warn() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/keywords"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let fetcher = fetcher_for(&mock_server);
        let (logs, _guard) = CapturedLogs::install();
        let (table, error) = fetcher.fetch_or_empty("Shoes").await;

        assert!(table.is_empty());
        assert!(matches!(error, Some(ClientError::ApiError { status: 500, .. })));
        assert_eq!(logs.contents(), "");

        tracing::warn!("marker");
        assert!(logs.contents().contains("marker"));
    }
}

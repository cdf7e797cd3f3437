use async_trait::async_trait;
use serde_json::Value;

use crate::config::CatalogConfig;
use crate::error::CollaboratorError;

/// Product search and lookup against a regional catalog. Results are
/// raw nested records; `domain::item::normalize_search_result` turns
/// them into canonical items.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn search(&self, keywords: &str, region: &str)
        -> Result<Vec<Value>, CollaboratorError>;

    async fn lookup(&self, asin: &str, region: &str) -> Result<Vec<Value>, CollaboratorError>;
}

/// HTTP catalog client, routed per region to the configured host.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn host(&self, region: &str) -> Result<&str, CollaboratorError> {
        self.config
            .regions
            .get(region)
            .map(String::as_str)
            .ok_or_else(|| CollaboratorError::Other(format!("no catalog host for region {region}")))
    }

    async fn request(
        &self,
        host: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, CollaboratorError> {
        let url = format!("https://{host}/{path}");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("associateTag", self.config.associate_tag.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = resp.json().await?;
        match body {
            Value::Array(results) => Ok(results),
            other => Err(CollaboratorError::Parse(format!(
                "expected result array, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(
        &self,
        keywords: &str,
        region: &str,
    ) -> Result<Vec<Value>, CollaboratorError> {
        let host = self.host(region)?;
        self.request(host, "items/search", &[("keywords", keywords)])
            .await
    }

    async fn lookup(&self, asin: &str, region: &str) -> Result<Vec<Value>, CollaboratorError> {
        let host = self.host(region)?;
        self.request(host, "items/lookup", &[("asin", asin)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_region_rejected() {
        let client = HttpCatalogClient::new(CatalogConfig::default());
        let err = client.host("fr_FR").unwrap_err();
        assert!(matches!(err, CollaboratorError::Other(_)));
        assert_eq!(client.host("de_DE").unwrap(), "webservices.amazon.de");
    }
}

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::gdelt::{
    decoder,
    errors::RetrievalError,
    filters::Filter,
    types::{ArticleRecord, QueryMode},
};
use crate::ingest::ArticleSource;

pub const DEFAULT_BASE_URL: &str = "https://api.gdeltproject.org/api/v2/doc/doc";
pub const DEFAULT_USER_AGENT: &str = "esg-signals GDELT client";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub user_agent: String,
    pub decode_max_tries: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            decode_max_tries: decoder::DEFAULT_MAX_TRIES,
        }
    }
}

/// Client for the GDELT DOC 2.0 API.
#[derive(Debug, Clone)]
pub struct GdeltClient {
    http: Client,
    base_url: Url,
    decode_max_tries: usize,
}

impl GdeltClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, RetrievalError> {
        let base_url = Url::parse(&settings.base_url)?;
        let http = ClientBuilder::new()
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| RetrievalError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            decode_max_tries: settings.decode_max_tries,
        })
    }

    /// Fetches the article list matching `filter`. A response without an
    /// `articles` key is a valid empty result.
    pub async fn get_articles(&self, filter: &Filter) -> Result<Vec<ArticleRecord>, RetrievalError> {
        let value = self.query(QueryMode::ArtList, filter).await?;
        Ok(articles_from(value))
    }

    /// Runs a query in the named mode. Unsupported modes fail before any request
    /// is sent.
    pub async fn execute_query(&self, mode: &str, filter: &Filter) -> Result<Value, RetrievalError> {
        let mode: QueryMode = mode.parse()?;
        self.query(mode, filter).await
    }

    pub fn request_url(&self, mode: QueryMode, filter: &Filter) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in filter.params() {
                pairs.append_pair(name, &value);
            }
            pairs.append_pair("mode", mode.as_str());
            pairs.append_pair("format", "json");
        }
        url
    }

    #[instrument(skip_all, fields(mode = mode.as_str(), query = %filter.query_string()))]
    async fn query(&self, mode: QueryMode, filter: &Filter) -> Result<Value, RetrievalError> {
        let url = self.request_url(mode, filter);
        debug!("Requesting {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(RetrievalError::from_reqwest_error)?;

        let status = response.status();
        if !matches!(status.as_u16(), 200 | 202) {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(RetrievalError::from_reqwest_error)?;

        let repaired = decoder::decode_with_repairs(&body, self.decode_max_tries)?;
        if !repaired.repaired_offsets.is_empty() {
            warn!(
                "Repaired {} undecodable byte(s) in search response",
                repaired.repaired_offsets.len()
            );
        }
        Ok(repaired.value)
    }
}

#[async_trait]
impl ArticleSource for GdeltClient {
    async fn get_articles(&self, filter: &Filter) -> Result<Vec<ArticleRecord>, RetrievalError> {
        GdeltClient::get_articles(self, filter).await
    }
}

fn articles_from(value: Value) -> Vec<ArticleRecord> {
    let Value::Object(mut body) = value else {
        debug!("Search response is not an object; treating as no matches");
        return Vec::new();
    };
    let Some(Value::Array(entries)) = body.remove("articles") else {
        debug!("Search response has no article list; treating as no matches");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<ArticleRecord>(entry) {
            Ok(article) => Some(article),
            Err(e) => {
                warn!("Skipping malformed article entry: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_url_encodes_params_and_mode() {
        let client = GdeltClient::new(&ClientSettings::default()).unwrap();
        let filter = Filter::builder()
            .keywords(["Procter & Gamble"])
            .start_date("20230101")
            .max_records(10)
            .build()
            .unwrap();

        let url = client.request_url(QueryMode::ArtList, &filter);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.path(), "/api/v2/doc/doc");
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "\"Procter & Gamble\"".to_string()),
                ("startdatetime".to_string(), "20230101000000".to_string()),
                ("maxrecords".to_string(), "10".to_string()),
                ("mode".to_string(), "artlist".to_string()),
                ("format".to_string(), "json".to_string()),
            ]
        );
    }

    #[test]
    fn test_articles_from_skips_malformed_entries() {
        let articles = articles_from(json!({
            "articles": [
                {"url": "https://a.example/1", "seendate": "20230101T000000Z", "sourcecountry": "France"},
                {"url": "https://a.example/2"}
            ]
        }));
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://a.example/1");
    }

    #[test]
    fn test_articles_from_non_mapping_is_empty() {
        assert!(articles_from(json!([1, 2, 3])).is_empty());
        assert!(articles_from(json!({})).is_empty());
        assert!(articles_from(json!({"articles": "none"})).is_empty());
    }
}

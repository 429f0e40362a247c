use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::retry::retry_with_backoff;
use super::{sentiment, DataError, DataResult};

/// A single news item returned by the search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
}

/// Outcome of a news check for one topic: the first fetched headline (if
/// any item scored) and the mean sentiment polarity across scored items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSignal {
    pub headline: Option<String>,
    pub sentiment: f64,
}

impl NewsSignal {
    pub fn none() -> Self {
        NewsSignal {
            headline: None,
            sentiment: 0.0,
        }
    }
}

/// News-search provider keyed by a free-text query.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, query: &str) -> DataResult<Vec<NewsItem>>;
}

/// NewsAPI response structures
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    articles: Option<Vec<NewsApiArticle>>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
}

/// Production provider querying a NewsAPI-compatible search endpoint.
pub struct NewsApiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    page_size: usize,
}

impl NewsApiProvider {
    pub fn new(base_url: String, api_key: Option<String>, timeout_secs: u64, page_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("marketpulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            api_key,
            page_size,
        }
    }

    async fn fetch_page(&self, query: &str) -> DataResult<Vec<NewsItem>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| DataError::Config("NEWS_API_KEY not configured".to_string()))?;

        let url = format!(
            "{}?q={}&sortBy=publishedAt&pageSize={}&apiKey={}",
            self.base_url,
            urlencoding::encode(query),
            self.page_size,
            api_key
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Api {
                status_code: status.as_u16(),
                message: format!("news search error: {}", error_text),
            });
        }

        let body: NewsApiResponse = response.json().await?;
        let articles = body
            .articles
            .ok_or_else(|| DataError::parse_error("No articles array in response"))?;

        Ok(articles
            .into_iter()
            .filter_map(|a| a.title)
            .map(|title| NewsItem { title })
            .collect())
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn search(&self, query: &str) -> DataResult<Vec<NewsItem>> {
        retry_with_backoff(|| self.fetch_page(query), 2).await
    }
}

/// News-sentiment adapter: fetches recent headlines for a topic and scores
/// each for polarity. All provider and scoring failures are contained here;
/// callers only ever see a NewsSignal.
#[derive(Clone)]
pub struct NewsClient {
    provider: Arc<dyn NewsProvider>,
    max_items: usize,
}

impl NewsClient {
    pub fn new(provider: Arc<dyn NewsProvider>) -> Self {
        Self {
            provider,
            max_items: 5,
        }
    }

    /// Check recent news for a topic. Fetches up to five items, scores each
    /// title, skips per-item scoring failures, and averages the rest. Zero
    /// scored items (including a failed fetch) yields a neutral signal with
    /// no headline.
    pub async fn check_news(&self, topic: &str) -> NewsSignal {
        let query = format!("{} stock", topic);
        let items = match self.provider.search(&query).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(topic, error = %e, "News fetch failed, treating as no signal");
                return NewsSignal::none();
            }
        };

        let mut first_headline = None;
        let mut scores = Vec::new();
        for item in items.iter().take(self.max_items) {
            if first_headline.is_none() {
                first_headline = Some(item.title.clone());
            }
            match sentiment::polarity(&item.title) {
                Ok(score) => scores.push(score),
                Err(e) => {
                    tracing::debug!(topic, error = %e, "Skipping unscorable news item");
                }
            }
        }

        if scores.is_empty() {
            return NewsSignal::none();
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        NewsSignal {
            headline: first_headline,
            sentiment: mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        items: DataResult<Vec<NewsItem>>,
    }

    impl FakeProvider {
        fn with_titles(titles: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                items: Ok(titles
                    .iter()
                    .map(|t| NewsItem {
                        title: t.to_string(),
                    })
                    .collect()),
            })
        }
    }

    #[async_trait]
    impl NewsProvider for FakeProvider {
        async fn search(&self, _query: &str) -> DataResult<Vec<NewsItem>> {
            match &self.items {
                Ok(items) => Ok(items.clone()),
                Err(_) => Err(DataError::api_error(500, "boom")),
            }
        }
    }

    #[tokio::test]
    async fn empty_feed_yields_neutral_signal() {
        let client = NewsClient::new(FakeProvider::with_titles(&[]));
        assert_eq!(client.check_news("TCS").await, NewsSignal::none());
    }

    #[tokio::test]
    async fn fetch_failure_yields_neutral_signal() {
        let provider = Arc::new(FakeProvider {
            items: Err(DataError::api_error(500, "boom")),
        });
        let client = NewsClient::new(provider);
        assert_eq!(client.check_news("TCS").await, NewsSignal::none());
    }

    #[tokio::test]
    async fn mean_polarity_across_scored_items() {
        // Individual polarities: 1.0, -1.0, 1.0 -> mean 1/3
        let client = NewsClient::new(FakeProvider::with_titles(&[
            "Shares surge on record profit",
            "Heavy loss as demand falls",
            "Analysts upgrade on strong growth",
        ]));
        let signal = client.check_news("TCS").await;
        assert_eq!(
            signal.headline.as_deref(),
            Some("Shares surge on record profit")
        );
        assert!((signal.sentiment - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn first_fetched_headline_kept_even_when_neutral() {
        let client = NewsClient::new(FakeProvider::with_titles(&[
            "Quarterly report published",
            "Shares surge today",
        ]));
        let signal = client.check_news("TCS").await;
        assert_eq!(signal.headline.as_deref(), Some("Quarterly report published"));
        assert_eq!(signal.sentiment, 0.5);
    }

    #[tokio::test]
    async fn unscorable_item_does_not_drop_the_rest() {
        let client = NewsClient::new(FakeProvider::with_titles(&[
            "   ",
            "Shares surge today",
            "Profit jumps again",
        ]));
        let signal = client.check_news("TCS").await;
        // First fetched title is kept as the headline even though it
        // failed scoring; the mean covers only the two scored items.
        assert_eq!(signal.headline.as_deref(), Some("   "));
        assert_eq!(signal.sentiment, 1.0);
    }

    #[tokio::test]
    async fn only_first_five_items_are_considered() {
        let titles: Vec<String> = (0..8).map(|i| format!("Shares surge {i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let client = NewsClient::new(FakeProvider::with_titles(&refs));
        let signal = client.check_news("TCS").await;
        assert_eq!(signal.sentiment, 1.0);
        assert_eq!(signal.headline.as_deref(), Some("Shares surge 0"));
    }
}

//! Web and news search via SerpAPI.

use crate::sources::serp::{organic_results, str_field, SerpClient};
use crate::sources::SearchSource;
use crate::types::{Result, SearchHit};
use async_trait::async_trait;
use serde_json::Value;

/// Results kept per query; more adds noise without helping the analyst.
const MAX_RESULTS_PER_QUERY: usize = 8;

pub struct SerpApiSearch {
    serp: SerpClient,
}

impl SerpApiSearch {
    pub fn new(serp: SerpClient) -> Self {
        Self { serp }
    }
}

#[async_trait]
impl SearchSource for SerpApiSearch {
    async fn search_web(&self, query: &str) -> Result<Vec<SearchHit>> {
        if !self.serp.is_configured() {
            return Ok(Vec::new());
        }

        let data = self
            .serp
            .search(&[("engine", "google"), ("q", query), ("num", "10")])
            .await?;

        let hits = organic_results(&data)
            .iter()
            .map(|item| hit_from(item, "google"))
            .take(MAX_RESULTS_PER_QUERY)
            .collect();
        Ok(hits)
    }

    async fn search_news(&self, query: &str) -> Result<Vec<SearchHit>> {
        if !self.serp.is_configured() {
            return Ok(Vec::new());
        }

        let data = self
            .serp
            .search(&[
                ("engine", "google"),
                ("q", query),
                ("tbm", "nws"),
                ("num", "10"),
            ])
            .await?;

        let hits = data
            .get("news_results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|item| hit_from(item, "news"))
            .take(MAX_RESULTS_PER_QUERY)
            .collect();
        Ok(hits)
    }
}

fn hit_from(item: &Value, source: &str) -> SearchHit {
    SearchHit {
        title: str_field(item, "title"),
        url: str_field(item, "link"),
        snippet: str_field(item, "snippet"),
        source: source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hits_parse_with_missing_fields() {
        let item = json!({"title": "Jane Doe", "link": "https://example.com"});
        let hit = hit_from(&item, "google");
        assert_eq!(hit.title, "Jane Doe");
        assert_eq!(hit.url, "https://example.com");
        assert_eq!(hit.snippet, "");
        assert_eq!(hit.source, "google");
    }
}

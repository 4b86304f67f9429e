pub mod api_sports;
pub mod sofascore;
pub mod types;

use crate::config::{Config, FeedConfig, FeedProvider, OddsConfig};
use crate::engine::matcher::LiveEvent;
use crate::engine::types::Match;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A remote source of table-tennis matches. Decoded matches carry synthetic
/// ratings and odds but no prediction yet.
#[async_trait]
pub trait MatchFeed: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_matches(&mut self) -> Result<Vec<Match>>;
    async fn fetch_live(&mut self) -> Result<Vec<LiveEvent>>;
}

/// Build the feed selected by `[feed] provider`.
pub fn from_config(feed: &FeedConfig, odds: &OddsConfig) -> Result<Box<dyn MatchFeed>> {
    Ok(match feed.provider {
        FeedProvider::Sofascore => {
            Box::new(sofascore::SofaScoreFeed::new(feed.clone(), odds.clone())?)
        }
        FeedProvider::ApiSports => {
            let key = Config::api_sports_key(feed)?;
            Box::new(api_sports::ApiSportsFeed::new(feed.clone(), odds.clone(), key)?)
        }
    })
}

pub(crate) fn build_client(config: &FeedConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36")
        .build()
        .context("failed to build reqwest client")
}

/// GET with linear backoff (500ms, 1s, ...) between attempts.
pub(crate) async fn get_text_with_retry<F>(
    source: &str,
    max_retries: u32,
    request: F,
) -> Result<String>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;
    for attempt in 0..=max_retries {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
        }
        match request().send().await {
            Ok(resp) if resp.status().is_success() => {
                return resp
                    .text()
                    .await
                    .with_context(|| format!("{source} response read failed"));
            }
            Ok(resp) => {
                let status = resp.status();
                tracing::warn!(source, attempt, %status, "feed returned error status");
                last_err = Some(anyhow::anyhow!("{source} HTTP {status}"));
            }
            Err(e) => {
                tracing::warn!(source, attempt, error = %e, "feed request failed");
                last_err = Some(e.into());
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{source} fetch failed")))
}

/// Merge listings in order; an earlier listing wins on duplicate ids.
/// Returns None when every listing failed.
pub(crate) fn merge_listings(
    source: &str,
    listings: Vec<(&str, Result<Vec<Match>>)>,
) -> Option<Vec<Match>> {
    let mut merged: Vec<Match> = Vec::new();
    let mut any_ok = false;
    for (label, listing) in listings {
        match listing {
            Ok(parsed) => {
                any_ok = true;
                for m in parsed {
                    if !merged.iter().any(|x| x.id == m.id) {
                        merged.push(m);
                    }
                }
            }
            Err(e) => tracing::warn!(source, listing = label, error = %e, "listing failed"),
        }
    }
    any_ok.then_some(merged)
}

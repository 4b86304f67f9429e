use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub tiers: TierThresholds,
    #[serde(default)]
    pub odds: OddsConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Scoring weights and gates for the prediction engine.
///
/// These are empirical tuning values. Nothing calibrates them against outcomes,
/// so they live in config rather than in code.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub rating_min_gap: f64,
    pub rating_divisor: f64,
    pub rating_weight: f64,
    pub rating_factor_gap: f64,
    pub rating_large_gap: f64,

    pub win_rate_min_gap: f64,
    pub win_rate_divisor: f64,
    pub win_rate_weight: f64,
    pub win_rate_factor_gap: f64,

    pub form_scale: f64,
    pub form_weight: f64,
    pub form_strong_wins: u32,
    pub form_weak_wins: u32,

    pub odds_min_gap: f64,
    pub odds_weight: f64,
    pub clear_favorite_odds: f64,

    pub live_scale: f64,
    pub live_weight: f64,
    pub dominating_lead: u32,

    pub confidence_base: f64,
    pub confidence_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rating_min_gap: 10.0,
            rating_divisor: 50.0,
            rating_weight: 4.0,
            rating_factor_gap: 50.0,
            rating_large_gap: 100.0,
            win_rate_min_gap: 1.0,
            win_rate_divisor: 10.0,
            win_rate_weight: 3.5,
            win_rate_factor_gap: 5.0,
            form_scale: 0.5,
            form_weight: 2.8,
            form_strong_wins: 4,
            form_weak_wins: 1,
            odds_min_gap: 0.5,
            odds_weight: 1.2,
            clear_favorite_odds: 1.5,
            live_scale: 1.2,
            live_weight: 5.0,
            dominating_lead: 2,
            confidence_base: 50.0,
            confidence_scale: 4.5,
        }
    }
}

/// Lower confidence bounds for each bet tier; anything below `risky` is a skip.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TierThresholds {
    pub strong: u8,
    pub medium: u8,
    pub risky: u8,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            strong: 78,
            medium: 67,
            risky: 56,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsConfig {
    /// Elo-style logistic divisor.
    pub rating_scale: f64,
    /// Bookmaker overround, split evenly between both outcomes.
    pub margin: f64,
    pub min_odds: f64,
    pub max_odds: f64,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            rating_scale: 400.0,
            margin: 0.06,
            min_odds: 1.05,
            max_odds: 8.0,
        }
    }
}

/// Which upstream the poll loop reads matches from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedProvider {
    #[default]
    Sofascore,
    ApiSports,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub enabled: bool,
    pub provider: FeedProvider,
    pub live_url: String,
    pub scheduled_url: String,
    /// API-Sports `games` endpoint, queried with `live=all` and `date=YYYY-MM-DD`.
    pub api_sports_url: String,
    pub api_sports_host: String,
    /// Env var holding the RapidAPI key (may come from `.env`).
    pub api_sports_key_env: String,
    pub poll_interval_s: u64,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    /// Tournament keywords that mark an event as one we track.
    pub league_keywords: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: FeedProvider::Sofascore,
            live_url: "https://api.sofascore.com/api/v1/sport/table-tennis/events/live"
                .to_string(),
            scheduled_url:
                "https://api.sofascore.com/api/v1/sport/table-tennis/scheduled-events".to_string(),
            api_sports_url: "https://table-tennis.api-sports.io/games".to_string(),
            api_sports_host: "table-tennis.api-sports.io".to_string(),
            api_sports_key_env: "RAPID_API_KEY".to_string(),
            poll_interval_s: 15,
            request_timeout_ms: 10_000,
            max_retries: 2,
            league_keywords: [
                "liga pro",
                "setka cup",
                "tt cup",
                "masters",
                "tt elite",
                "win cup",
                "challenge",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub manual_matches_path: PathBuf,
    /// Every predicted match ever shown, settled as results come in.
    pub history_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            manual_matches_path: PathBuf::from("manual_matches.json"),
            history_path: PathBuf::from("prediction_history.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    /// Confidence at or above which a match counts as a top pick.
    pub high_confidence: u8,
    pub stats_period: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            high_confidence: 75,
            stats_period: "all".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Self::load(path)
    }

    /// `TT_PREDICT_CONFIG` overrides the default `config.toml`.
    pub fn path_from_env() -> PathBuf {
        match std::env::var("TT_PREDICT_CONFIG") {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
            _ => PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.tiers;
        if !(t.risky < t.medium && t.medium < t.strong) {
            anyhow::bail!(
                "tier thresholds must be strictly ascending (risky {} < medium {} < strong {})",
                t.risky,
                t.medium,
                t.strong
            );
        }
        if t.strong > crate::engine::predictor::CONFIDENCE_MAX {
            anyhow::bail!(
                "strong threshold {} is above the confidence ceiling {}",
                t.strong,
                crate::engine::predictor::CONFIDENCE_MAX
            );
        }
        if self.odds.min_odds <= 1.0 || self.odds.min_odds >= self.odds.max_odds {
            anyhow::bail!(
                "odds bounds must satisfy 1.0 < min_odds < max_odds (got {} / {})",
                self.odds.min_odds,
                self.odds.max_odds
            );
        }
        if self.engine.rating_divisor <= 0.0 || self.engine.win_rate_divisor <= 0.0 {
            anyhow::bail!("engine divisors must be positive");
        }
        Ok(())
    }

    /// RapidAPI key for the API-Sports feed, read from the configured env var.
    pub fn api_sports_key(feed: &FeedConfig) -> Result<String> {
        match std::env::var(&feed.api_sports_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => anyhow::bail!(
                "{} is not set (add it to the environment or .env)",
                feed.api_sports_key_env
            ),
        }
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

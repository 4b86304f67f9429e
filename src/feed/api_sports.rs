use super::types::*;
use super::{build_client, get_text_with_retry, merge_listings, MatchFeed};
use crate::config::{FeedConfig, OddsConfig};
use crate::engine::matcher::LiveEvent;
use crate::engine::odds::synthetic_odds;
use crate::engine::synthetic::synthetic_player;
use crate::engine::types::{Match, MatchStatus, Score};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;

const DEFAULT_LEAGUE: &str = "Table Tennis";
const DEFAULT_COUNTRY: &str = "RU";

fn status_of(raw: Option<&str>) -> MatchStatus {
    match raw {
        Some("LIVE") | Some("inprogress") => MatchStatus::Live,
        Some("FT") | Some("finished") => MatchStatus::Finished,
        _ => MatchStatus::Upcoming,
    }
}

pub fn decode_game(
    game: &ApiSportsGame,
    odds: &OddsConfig,
    now: DateTime<Utc>,
) -> Result<Match, DecodeError> {
    let event_id = id_string(&game.id).ok_or(DecodeError::MissingId)?;

    let home = game.teams.as_ref().and_then(|t| t.home.as_ref());
    let away = game.teams.as_ref().and_then(|t| t.away.as_ref());
    let p1_name = home.map(|t| t.name.trim()).unwrap_or("");
    let p2_name = away.map(|t| t.name.trim()).unwrap_or("");
    if p1_name.is_empty() {
        return Err(DecodeError::MissingPlayer { event_id, slot: 1 });
    }
    if p2_name.is_empty() {
        return Err(DecodeError::MissingPlayer { event_id, slot: 2 });
    }

    let start_time = match game.date.as_deref().map(str::trim) {
        None | Some("") => now,
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|_| DecodeError::BadStartTime {
                event_id: event_id.clone(),
                value: raw.to_string(),
            })?,
    };

    let p1_id = home.and_then(|t| id_string(&t.id));
    let p2_id = away.and_then(|t| id_string(&t.id));
    let player1 = synthetic_player(p1_id.as_deref().unwrap_or(""), p1_name, DEFAULT_COUNTRY);
    let player2 = synthetic_player(p2_id.as_deref().unwrap_or(""), p2_name, DEFAULT_COUNTRY);
    let odds = synthetic_odds(player1.rating, player2.rating, odds);

    let status = status_of(game.status.as_deref());
    let score = game
        .scores
        .as_ref()
        .map(|s| Score::new(s.home.unwrap_or(0), s.away.unwrap_or(0)))
        .filter(|s| status != MatchStatus::Upcoming && s.p1 + s.p2 > 0);

    let league = game
        .league
        .as_ref()
        .and_then(|l| l.name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_LEAGUE.to_string());

    Ok(Match {
        id: event_id,
        player1,
        player2,
        start_time,
        status,
        score,
        sets: Vec::new(),
        odds,
        league,
        prediction: None,
    })
}

/// A game is tracked when its league name contains any keyword.
/// No keywords means everything is tracked.
pub fn is_tracked_game(game: &ApiSportsGame, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let name = game
        .league
        .as_ref()
        .and_then(|l| l.name.as_deref())
        .unwrap_or("")
        .to_lowercase();
    keywords.iter().any(|k| name.contains(&k.to_lowercase()))
}

/// Parse an API-Sports `games` payload, keeping tracked leagues. Each game
/// decodes on its own; undecodable ones are skipped.
pub fn parse_games(
    json: &str,
    keywords: &[String],
    odds: &OddsConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Match>> {
    let resp: ApiSportsResponse = serde_json::from_str(json)?;
    let mut out = Vec::with_capacity(resp.response.len());
    for raw in resp.response {
        let decoded = decode_record::<ApiSportsGame>(raw).and_then(|game| {
            if !is_tracked_game(&game, keywords) {
                return Ok(None);
            }
            decode_game(&game, odds, now).map(Some)
        });
        match decoded {
            Ok(Some(m)) => out.push(m),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "skipping API-Sports game"),
        }
    }
    Ok(out)
}

/// Live scores from a `live=all` payload, home/away oriented.
pub fn parse_live_games(json: &str) -> Result<Vec<LiveEvent>> {
    let resp: ApiSportsResponse = serde_json::from_str(json)?;
    let mut out = Vec::new();
    for raw in resp.response {
        let game = match decode_record::<ApiSportsGame>(raw) {
            Ok(g) => g,
            Err(e) => {
                tracing::debug!(error = %e, "skipping API-Sports live game");
                continue;
            }
        };
        let name = |t: Option<&ApiSportsTeam>| t.map(|t| t.name.trim().to_string()).unwrap_or_default();
        let home = name(game.teams.as_ref().and_then(|t| t.home.as_ref()));
        let away = name(game.teams.as_ref().and_then(|t| t.away.as_ref()));
        if home.is_empty() || away.is_empty() {
            continue;
        }
        let score = game
            .scores
            .as_ref()
            .map(|s| Score::new(s.home.unwrap_or(0), s.away.unwrap_or(0)))
            .unwrap_or_default();
        out.push(LiveEvent {
            id: id_string(&game.id).unwrap_or_default(),
            home,
            away,
            score,
            league: game
                .league
                .as_ref()
                .and_then(|l| l.name.clone())
                .unwrap_or_else(|| DEFAULT_LEAGUE.to_string()),
        });
    }
    Ok(out)
}

/// API-Sports table-tennis feed. Needs a RapidAPI key.
pub struct ApiSportsFeed {
    client: Client,
    config: FeedConfig,
    odds: OddsConfig,
    key: String,
    cached_matches: Vec<Match>,
    cached_live: Vec<LiveEvent>,
}

impl ApiSportsFeed {
    pub fn new(config: FeedConfig, odds: OddsConfig, key: String) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
            odds,
            key,
            cached_matches: Vec::new(),
            cached_live: Vec::new(),
        })
    }

    async fn get_games(&self, query: &[(&str, String)]) -> Result<String> {
        get_text_with_retry("api_sports", self.config.max_retries, || {
            self.client
                .get(&self.config.api_sports_url)
                .query(query)
                .header("x-rapidapi-key", &self.key)
                .header("x-rapidapi-host", &self.config.api_sports_host)
        })
        .await
    }
}

#[async_trait]
impl MatchFeed for ApiSportsFeed {
    fn name(&self) -> &str {
        "api_sports"
    }

    async fn fetch_matches(&mut self) -> Result<Vec<Match>> {
        let now = Utc::now();
        let live_query = [("live", "all".to_string())];
        let date_query = [("date", now.format("%Y-%m-%d").to_string())];
        let (live, dated) =
            futures_util::future::join(self.get_games(&live_query), self.get_games(&date_query))
                .await;

        let keywords = &self.config.league_keywords;
        let parse = |body: Result<String>| body.and_then(|b| parse_games(&b, keywords, &self.odds, now));
        let merged = merge_listings(
            "api_sports",
            vec![("live", parse(live)), ("date", parse(dated))],
        );

        match merged {
            Some(matches) => {
                self.cached_matches = matches.clone();
                Ok(matches)
            }
            None if self.cached_matches.is_empty() => {
                anyhow::bail!("API-Sports fetch failed for both listings")
            }
            None => {
                tracing::warn!(
                    cached = self.cached_matches.len(),
                    "API-Sports unavailable, returning cached matches"
                );
                Ok(self.cached_matches.clone())
            }
        }
    }

    async fn fetch_live(&mut self) -> Result<Vec<LiveEvent>> {
        let fetched = self
            .get_games(&[("live", "all".to_string())])
            .await
            .and_then(|b| parse_live_games(&b));
        match fetched {
            Ok(events) => {
                self.cached_live = events.clone();
                Ok(events)
            }
            Err(e) if !self.cached_live.is_empty() => {
                tracing::warn!(error = %e, "live scores unavailable, returning cached events");
                Ok(self.cached_live.clone())
            }
            Err(e) => Err(e),
        }
    }
}

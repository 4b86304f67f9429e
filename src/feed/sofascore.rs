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

/// Map a tournament onto one of the board's league labels.
pub fn classify_league(tournament: &SofaTournament) -> String {
    let text = tournament.search_text();
    if text.contains("minsk") || text.contains("belarus") {
        return "Masters Minsk".to_string();
    }
    if text.contains("russia") && text.contains("liga pro") {
        return "Liga Pro Russia".to_string();
    }
    if text.contains("setka") {
        return "Setka Cup".to_string();
    }
    if text.contains("masters") {
        return "Masters".to_string();
    }
    if text.contains("tt cup") {
        return "TT Cup".to_string();
    }
    if text.contains("elite") {
        return "Elite Series".to_string();
    }
    tournament
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_LEAGUE.to_string())
}

/// An event is tracked when its tournament text contains any keyword.
/// No keywords means everything is tracked.
pub fn is_tracked_league(tournament: Option<&SofaTournament>, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let text = tournament.map(SofaTournament::search_text).unwrap_or_default();
    keywords.iter().any(|k| text.contains(&k.to_lowercase()))
}

fn status_of(ev: &SofaEvent) -> MatchStatus {
    match ev.status.as_ref().map(|s| s.status_type.as_str()) {
        Some("inprogress") => MatchStatus::Live,
        Some("finished") => MatchStatus::Finished,
        _ => MatchStatus::Upcoming,
    }
}

fn team_name(team: &Option<SofaTeam>) -> &str {
    team.as_ref().map(|t| t.name.trim()).unwrap_or("")
}

/// Turn one wire event into a `Match` with synthetic ratings and odds.
/// `now` stands in for a missing start timestamp.
pub fn decode_event(
    ev: &SofaEvent,
    odds: &OddsConfig,
    now: DateTime<Utc>,
) -> Result<Match, DecodeError> {
    let event_id = id_string(&ev.id).ok_or(DecodeError::MissingId)?;

    let p1_name = team_name(&ev.home_team);
    let p2_name = team_name(&ev.away_team);
    if p1_name.is_empty() {
        return Err(DecodeError::MissingPlayer { event_id, slot: 1 });
    }
    if p2_name.is_empty() {
        return Err(DecodeError::MissingPlayer { event_id, slot: 2 });
    }

    let start_time = match ev.start_timestamp {
        None | Some(0) => now,
        Some(ts) => DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
            DecodeError::BadStartTime {
                event_id: event_id.clone(),
                value: ts.to_string(),
            }
        })?,
    };

    let p1_id = ev.home_team.as_ref().and_then(|t| id_string(&t.id));
    let p2_id = ev.away_team.as_ref().and_then(|t| id_string(&t.id));
    let player1 = synthetic_player(p1_id.as_deref().unwrap_or(""), p1_name, DEFAULT_COUNTRY);
    let player2 = synthetic_player(p2_id.as_deref().unwrap_or(""), p2_name, DEFAULT_COUNTRY);
    let odds = synthetic_odds(player1.rating, player2.rating, odds);

    let status = status_of(ev);
    let (score, sets) = if status == MatchStatus::Upcoming {
        (None, Vec::new())
    } else {
        let empty = SofaScore::default();
        let hs = ev.home_score.as_ref().unwrap_or(&empty);
        let aws = ev.away_score.as_ref().unwrap_or(&empty);
        let score = Score::new(hs.current.unwrap_or(0), aws.current.unwrap_or(0));
        let sets = hs
            .periods()
            .iter()
            .zip(aws.periods().iter())
            .filter_map(|(h, a)| Some(Score::new((*h)?, (*a)?)))
            .collect();
        (Some(score), sets)
    };

    let league = ev
        .tournament
        .as_ref()
        .map(classify_league)
        .unwrap_or_else(|| DEFAULT_LEAGUE.to_string());

    Ok(Match {
        id: event_id,
        player1,
        player2,
        start_time,
        status,
        score,
        sets,
        odds,
        league,
        prediction: None,
    })
}

/// Parse a SofaScore events payload, keeping tracked leagues. Each event
/// decodes on its own, so a malformed one is skipped without losing the rest.
pub fn parse_events(
    json: &str,
    keywords: &[String],
    odds: &OddsConfig,
    now: DateTime<Utc>,
) -> Result<Vec<Match>> {
    let resp: SofaResponse = serde_json::from_str(json)?;
    let mut out = Vec::with_capacity(resp.events.len());
    for raw in resp.events {
        let decoded = decode_record::<SofaEvent>(raw).and_then(|ev| {
            if !is_tracked_league(ev.tournament.as_ref(), keywords) {
                return Ok(None);
            }
            decode_event(&ev, odds, now).map(Some)
        });
        match decoded {
            Ok(Some(m)) => out.push(m),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "skipping SofaScore event"),
        }
    }
    Ok(out)
}

fn live_event(ev: &SofaEvent) -> Option<LiveEvent> {
    let home = team_name(&ev.home_team);
    let away = team_name(&ev.away_team);
    if home.is_empty() || away.is_empty() {
        return None;
    }
    let current = |s: &Option<SofaScore>| s.as_ref().and_then(|s| s.current).unwrap_or(0);
    Some(LiveEvent {
        id: id_string(&ev.id).unwrap_or_default(),
        home: home.to_string(),
        away: away.to_string(),
        score: Score::new(current(&ev.home_score), current(&ev.away_score)),
        league: ev
            .tournament
            .as_ref()
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| DEFAULT_LEAGUE.to_string()),
    })
}

/// Home/away oriented live scores for the score matcher.
pub fn parse_live_events(json: &str) -> Result<Vec<LiveEvent>> {
    let resp: SofaResponse = serde_json::from_str(json)?;
    Ok(resp
        .events
        .into_iter()
        .filter_map(|raw| match decode_record::<SofaEvent>(raw) {
            Ok(ev) => live_event(&ev),
            Err(e) => {
                tracing::debug!(error = %e, "skipping SofaScore live event");
                None
            }
        })
        .collect())
}

pub struct SofaScoreFeed {
    client: Client,
    config: FeedConfig,
    odds: OddsConfig,
    cached_matches: Vec<Match>,
    cached_live: Vec<LiveEvent>,
}

impl SofaScoreFeed {
    pub fn new(config: FeedConfig, odds: OddsConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
            odds,
            cached_matches: Vec::new(),
            cached_live: Vec::new(),
        })
    }

    fn scheduled_url(&self, now: DateTime<Utc>) -> String {
        format!(
            "{}/{}",
            self.config.scheduled_url.trim_end_matches('/'),
            now.format("%Y-%m-%d")
        )
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        get_text_with_retry("sofascore", self.config.max_retries, || {
            self.client.get(url).header("Accept", "application/json")
        })
        .await
    }
}

#[async_trait]
impl MatchFeed for SofaScoreFeed {
    fn name(&self) -> &str {
        "sofascore"
    }

    async fn fetch_matches(&mut self) -> Result<Vec<Match>> {
        let now = Utc::now();
        let scheduled_url = self.scheduled_url(now);
        let (live, scheduled) = futures_util::future::join(
            self.get_text(&self.config.live_url),
            self.get_text(&scheduled_url),
        )
        .await;

        let keywords = &self.config.league_keywords;
        let parse = |body: Result<String>| body.and_then(|b| parse_events(&b, keywords, &self.odds, now));
        let merged = merge_listings(
            "sofascore",
            vec![("live", parse(live)), ("scheduled", parse(scheduled))],
        );

        match merged {
            Some(matches) => {
                self.cached_matches = matches.clone();
                Ok(matches)
            }
            None if self.cached_matches.is_empty() => {
                anyhow::bail!("SofaScore fetch failed for both listings")
            }
            None => {
                tracing::warn!(
                    cached = self.cached_matches.len(),
                    "SofaScore unavailable, returning cached matches"
                );
                Ok(self.cached_matches.clone())
            }
        }
    }

    async fn fetch_live(&mut self) -> Result<Vec<LiveEvent>> {
        let fetched = self
            .get_text(&self.config.live_url)
            .await
            .and_then(|b| parse_live_events(&b));
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

use serde::Deserialize;

/// Why a single feed event could not become a `Match`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("event has no id")]
    MissingId,
    #[error("event {event_id}: player {slot} has no name")]
    MissingPlayer { event_id: String, slot: u8 },
    #[error("event {event_id}: unusable start time {value:?}")]
    BadStartTime { event_id: String, value: String },
    #[error("malformed event: {detail}")]
    Malformed { detail: String },
}

/// Decode one element of a listing. A bad element never poisons its siblings.
pub fn decode_record<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| DecodeError::Malformed {
        detail: e.to_string(),
    })
}

/// Ids arrive as numbers from one provider and strings from another.
pub fn id_string(value: &Option<serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

// ── SofaScore ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SofaResponse {
    /// Kept raw so each event decodes on its own.
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SofaEvent {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub home_team: Option<SofaTeam>,
    #[serde(default)]
    pub away_team: Option<SofaTeam>,
    #[serde(default)]
    pub status: Option<SofaStatus>,
    #[serde(default)]
    pub start_timestamp: Option<i64>,
    #[serde(default)]
    pub home_score: Option<SofaScore>,
    #[serde(default)]
    pub away_score: Option<SofaScore>,
    #[serde(default)]
    pub tournament: Option<SofaTournament>,
}

#[derive(Debug, Deserialize)]
pub struct SofaTeam {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SofaStatus {
    #[serde(rename = "type", default)]
    pub status_type: String,
}

/// Running score plus per-set points (`period1`..`period7`).
#[derive(Debug, Default, Deserialize)]
pub struct SofaScore {
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub period1: Option<u32>,
    #[serde(default)]
    pub period2: Option<u32>,
    #[serde(default)]
    pub period3: Option<u32>,
    #[serde(default)]
    pub period4: Option<u32>,
    #[serde(default)]
    pub period5: Option<u32>,
    #[serde(default)]
    pub period6: Option<u32>,
    #[serde(default)]
    pub period7: Option<u32>,
}

impl SofaScore {
    pub fn periods(&self) -> [Option<u32>; 7] {
        [
            self.period1,
            self.period2,
            self.period3,
            self.period4,
            self.period5,
            self.period6,
            self.period7,
        ]
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SofaTournament {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub unique_tournament: Option<SofaNamed>,
    #[serde(default)]
    pub category: Option<SofaNamed>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SofaNamed {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl SofaTournament {
    /// Every name/slug we know, lowercased and space-joined, for keyword tests.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.name.as_deref());
        parts.extend(self.slug.as_deref());
        if let Some(u) = &self.unique_tournament {
            parts.extend(u.name.as_deref());
            parts.extend(u.slug.as_deref());
        }
        if let Some(c) = &self.category {
            parts.extend(c.name.as_deref());
        }
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

// ── API-Sports (table-tennis.api-sports.io) ─────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApiSportsResponse {
    #[serde(default)]
    pub response: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSportsGame {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub league: Option<ApiSportsLeague>,
    #[serde(default)]
    pub teams: Option<ApiSportsTeams>,
    #[serde(default)]
    pub scores: Option<ApiSportsScores>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSportsLeague {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSportsTeams {
    #[serde(default)]
    pub home: Option<ApiSportsTeam>,
    #[serde(default)]
    pub away: Option<ApiSportsTeam>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSportsTeam {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSportsScores {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_string_accepts_numbers_and_strings() {
        assert_eq!(id_string(&Some(serde_json::json!(12345))), Some("12345".to_string()));
        assert_eq!(id_string(&Some(serde_json::json!("abc"))), Some("abc".to_string()));
        assert_eq!(id_string(&Some(serde_json::json!(""))), None);
        assert_eq!(id_string(&None), None);
    }

    #[test]
    fn test_decode_record_isolates_bad_elements() {
        let resp: SofaResponse = serde_json::from_str(
            r#"{"events":[{"id":1,"homeTeam":{"name":"A"}},{"id":2,"homeTeam":{"name":null}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.events.len(), 2);
        let mut it = resp.events.into_iter();
        let good: SofaEvent = decode_record(it.next().unwrap()).unwrap();
        assert_eq!(good.home_team.map(|t| t.name), Some("A".to_string()));
        let bad = decode_record::<SofaEvent>(it.next().unwrap()).unwrap_err();
        assert!(matches!(bad, DecodeError::Malformed { .. }));
    }

    #[test]
    fn test_tournament_search_text() {
        let t: SofaTournament = serde_json::from_str(
            r#"{"name":"Liga Pro","slug":"liga-pro","uniqueTournament":{"name":"Liga Pro Russia"},
                "category":{"name":"Russia"}}"#,
        )
        .unwrap();
        assert_eq!(t.search_text(), "liga pro liga-pro liga pro russia russia");
    }
}

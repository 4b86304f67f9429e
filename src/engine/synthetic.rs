//! Stable per-player attributes derived from the player's name.
//!
//! Feeds only give us names, so rating, win rate and recent form are seeded
//! from a 32-bit string hash. The same name yields the same player on every run.

use super::types::{FormResult, Player};

pub const BASE_RATING: f64 = 1700.0;
pub const RATING_SPAN: u32 = 300;
pub const FORM_WINDOW: usize = 5;

/// 31-multiplier rolling hash over UTF-16 code units, wrapped to i32, then
/// taken as an absolute value.
pub fn name_hash(name: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in name.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(unit as i32);
    }
    (h as i64).unsigned_abs() as u32
}

/// Eight lowercase hex digits of `name_hash`.
pub fn name_hash_hex(name: &str) -> String {
    format!("{:08x}", name_hash(name))
}

pub fn synthetic_rating(name: &str) -> f64 {
    let hex = name_hash_hex(name);
    let prefix = u32::from_str_radix(&hex[..6], 16).unwrap_or(0);
    BASE_RATING + (prefix % RATING_SPAN) as f64
}

/// Linear in rating: 50% at the base rating up to 80% at the top of the span.
pub fn synthetic_win_rate(rating: f64) -> f64 {
    let raw = 50.0 + (rating - BASE_RATING) / RATING_SPAN as f64 * 30.0;
    (raw * 10.0).round() / 10.0
}

pub fn synthetic_form(name: &str) -> Vec<FormResult> {
    name_hash_hex(name)
        .chars()
        .take(FORM_WINDOW)
        .map(|c| match c.to_digit(16) {
            Some(d) if d > 7 => FormResult::Win,
            _ => FormResult::Loss,
        })
        .collect()
}

pub fn synthetic_player(id: &str, name: &str, country: &str) -> Player {
    let rating = synthetic_rating(name);
    Player {
        id: if id.is_empty() { name } else { id }.to_string(),
        name: name.to_string(),
        rating,
        win_rate: synthetic_win_rate(rating),
        recent_form: synthetic_form(name),
        country: country.to_string(),
    }
}

pub mod filter;
pub mod matcher;
pub mod odds;
pub mod predictor;
pub mod stats;
pub mod synthetic;
pub mod types;

pub use predictor::Predictor;
pub use stats::{aggregate, Statistics};
pub use types::{BetTier, Match, MatchStatus, Odds, Player, Prediction, Score, Side};

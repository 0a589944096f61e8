//! Flat record payloads as they arrive on the wire.
//!
//! One struct per record kind. Records are immutable once stored; a record
//! arriving again under the same id overwrites the stored content but keeps
//! its first-seen position. Fields the feed may omit default so that a lean
//! record never sinks the whole batch.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub number_of_events: i64,
    #[serde(default)]
    pub number_of_live_events: i64,
    #[serde(default)]
    pub is_top_sport: bool,
    #[serde(default)]
    pub has_matches: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    /// Kick-off in epoch milliseconds.
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub sport_id: String,
    #[serde(default)]
    pub venue_id: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub tournament_id: String,
    #[serde(default)]
    pub status_id: String,
    #[serde(default)]
    pub status_name: String,
    #[serde(default)]
    pub home_participant_id: String,
    #[serde(default)]
    pub home_participant_name: String,
    #[serde(default)]
    pub away_participant_id: String,
    #[serde(default)]
    pub away_participant_name: String,
    #[serde(default)]
    pub allows_live_odds: bool,
    #[serde(default)]
    pub number_of_markets: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub sport_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub display_name: String,
    /// Parent match id.
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub betting_type_id: String,
    #[serde(default)]
    pub betting_type_name: String,
    #[serde(default)]
    pub short_betting_type_name: String,
    /// Numeric line parameter (handicap, total, ...).
    #[serde(default)]
    pub param_float1: Option<f64>,
    #[serde(default)]
    pub main_line: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub number_of_outcomes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub translated_name: String,
    #[serde(default)]
    pub short_translated_name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub header_name: Option<String>,
    /// Explicit display ordering; feed order is the tie-break.
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub status_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingOfferRecord {
    pub id: String,
    #[serde(default)]
    pub outcome_id: String,
    #[serde(default)]
    pub provider_id: String,
    #[serde(default)]
    pub status_id: String,
    #[serde(default)]
    pub is_live: bool,
    /// Decimal price.
    pub odds: f64,
    /// Epoch milliseconds of the last price/state change.
    #[serde(default)]
    pub last_changed_time: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

/// Many-to-many link between a market and one of its outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOutcomeRelationRecord {
    pub id: String,
    pub market_id: String,
    pub outcome_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub type_id: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCategoryRecord {
    pub id: String,
    #[serde(default)]
    pub sport_id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub number_of_events: i64,
}

/// Declares the authoritative main-line betting type for a sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainMarketRecord {
    pub id: String,
    #[serde(default)]
    pub betting_type_id: String,
    #[serde(default)]
    pub sport_id: String,
    #[serde(default)]
    pub betting_type_name: String,
    #[serde(default)]
    pub live_market: bool,
    #[serde(default)]
    pub outright: bool,
}

/// Per-match live datum: score, serve, status or match time, discriminated
/// by `type_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfoRecord {
    pub id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub type_id: String,
    #[serde(default)]
    pub event_part_name: String,
    #[serde(default)]
    pub status_name: Option<String>,
    #[serde(default)]
    pub param_float1: Option<f64>,
    #[serde(default)]
    pub param_float2: Option<f64>,
    #[serde(default)]
    pub param_participant_id1: Option<String>,
    #[serde(default)]
    pub param_participant_id2: Option<String>,
}

/// `EVENT_INFO` type ids the live-data builder understands.
pub mod event_info_type {
    pub const SCORE: &str = "1";
    pub const SERVE: &str = "37";
    pub const EVENT_STATUS: &str = "92";
    pub const MATCH_TIME: &str = "95";
}

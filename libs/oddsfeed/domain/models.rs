//! Resolved, consumer-facing domain objects.
//!
//! These are disposable views derived from flat records; they do not own the
//! records and are rebuilt (or mutated in place by the live store) as the
//! feed moves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price, either already decimal or as fractional odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Odds {
    Decimal(f64),
    Fraction { numerator: u32, denominator: u32 },
}

impl Odds {
    /// Decimal price. Fractional odds convert as `n/d + 1`.
    pub fn price(&self) -> f64 {
        match self {
            Odds::Decimal(value) => *value,
            Odds::Fraction {
                numerator,
                denominator,
            } => {
                let denominator = (*denominator).max(1);
                f64::from(*numerator) / f64::from(denominator) + 1.0
            }
        }
    }

    pub fn fraction_parts(&self) -> Option<(u32, u32)> {
        match self {
            Odds::Fraction {
                numerator,
                denominator,
            } => Some((*numerator, *denominator)),
            Odds::Decimal(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingOffer {
    pub id: String,
    /// Decimal price.
    pub odds: f64,
    pub is_available: bool,
    pub is_live: bool,
    pub last_changed: DateTime<Utc>,
    pub provider_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub code: String,
    /// Column header this outcome renders under (1 / X / 2, Over / Under).
    pub header: Option<String>,
    /// Explicit display ordering; feed order breaks ties.
    pub sort_order: Option<i64>,
    /// Current price; live deltas update this in place.
    pub odds: Option<Odds>,
    pub is_tradable: bool,
    pub offers: Vec<BettingOffer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingType {
    pub id: String,
    pub name: String,
    pub short_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub display_name: Option<String>,
    pub betting_type: Option<BettingType>,
    /// Numeric line parameter (handicap, total, ...).
    pub line: Option<f64>,
    /// At most one market per event carries this at any time.
    pub is_main: bool,
    pub is_tradable: bool,
    pub is_available: bool,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStatus {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportInfo {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartScore {
    /// Event part the score belongs to ("1st Set", "2nd Half", ...).
    pub part: String,
    pub home: i64,
    pub away: i64,
}

/// Live match state: score, clock, status, serve indicator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventLiveData {
    pub status: Option<String>,
    pub match_time: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub detailed_scores: Vec<PartScore>,
    pub serving: Option<TeamSide>,
}

/// A match with everything a consumer needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub sport: Option<SportInfo>,
    pub venue: Option<Venue>,
    pub category: Option<Category>,
    pub tournament: Option<TournamentInfo>,
    pub home: Option<Participant>,
    pub away: Option<Participant>,
    pub status: EventStatus,
    pub allows_live_odds: bool,
    pub markets: Vec<Market>,
    pub live: EventLiveData,
}

impl Event {
    pub fn market(&self, id: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.id == id)
    }

    pub fn main_market(&self) -> Option<&Market> {
        self.markets.iter().find(|m| m.is_main)
    }

    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.markets
            .iter()
            .flat_map(|m| m.outcomes.iter())
            .find(|o| o.id == id)
    }
}

/// A sport with its ordered events, as list screens consume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub is_virtual: bool,
    pub is_top_sport: bool,
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_to_decimal_price() {
        let odds = Odds::Fraction {
            numerator: 5,
            denominator: 2,
        };
        assert!((odds.price() - 3.5).abs() < 1e-9);

        let evens = Odds::Fraction {
            numerator: 1,
            denominator: 1,
        };
        assert!((evens.price() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominator_does_not_divide_by_zero() {
        let odds = Odds::Fraction {
            numerator: 3,
            denominator: 0,
        };
        assert!(odds.price().is_finite());
        assert!((odds.price() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_decimal_price_passthrough() {
        assert!((Odds::Decimal(2.1).price() - 2.1).abs() < 1e-9);
        assert_eq!(Odds::Decimal(2.1).fraction_parts(), None);
    }
}

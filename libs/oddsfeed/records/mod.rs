//! Wire-level record model.
//!
//! Every item in a feed batch is tagged with a `_type` discriminator and
//! decodes into one [`EntityRecord`] variant. Unrecognized tags decode into
//! the explicit [`EntityRecord::Unknown`] case instead of failing, so a
//! schema the feed grows tomorrow cannot crash a client shipped today.

pub mod types;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use types::{
    BettingOfferRecord, EventCategoryRecord, EventInfoRecord, LocationRecord, MainMarketRecord,
    MarketOutcomeRelationRecord, MarketRecord, MatchRecord, OutcomeRecord, SportRecord,
    TournamentRecord,
};

/// Known record kinds, by wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Sport,
    Match,
    Tournament,
    Market,
    MainMarket,
    Outcome,
    BettingOffer,
    MarketOutcomeRelation,
    Location,
    EventCategory,
    EventInfo,
}

impl RecordKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RecordKind::Sport => "SPORT",
            RecordKind::Match => "MATCH",
            RecordKind::Tournament => "TOURNAMENT",
            RecordKind::Market => "MARKET",
            RecordKind::MainMarket => "MAIN_MARKET",
            RecordKind::Outcome => "OUTCOME",
            RecordKind::BettingOffer => "BETTING_OFFER",
            RecordKind::MarketOutcomeRelation => "MARKET_OUTCOME_RELATION",
            RecordKind::Location => "LOCATION",
            RecordKind::EventCategory => "EVENT_CATEGORY",
            RecordKind::EventInfo => "EVENT_INFO",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SPORT" => Some(RecordKind::Sport),
            "MATCH" => Some(RecordKind::Match),
            "TOURNAMENT" => Some(RecordKind::Tournament),
            "MARKET" => Some(RecordKind::Market),
            "MAIN_MARKET" => Some(RecordKind::MainMarket),
            "OUTCOME" => Some(RecordKind::Outcome),
            "BETTING_OFFER" => Some(RecordKind::BettingOffer),
            "MARKET_OUTCOME_RELATION" => Some(RecordKind::MarketOutcomeRelation),
            "LOCATION" => Some(RecordKind::Location),
            "EVENT_CATEGORY" => Some(RecordKind::EventCategory),
            "EVENT_INFO" => Some(RecordKind::EventInfo),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Errors from decoding a single feed item. The decoder recovers from these
/// per item; they never abort a batch.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is missing the _type tag")]
    MissingTag,

    #[error("record payload for {kind} failed to decode: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// One decoded feed item.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRecord {
    Sport(SportRecord),
    Match(MatchRecord),
    Tournament(TournamentRecord),
    Market(MarketRecord),
    MainMarket(MainMarketRecord),
    Outcome(OutcomeRecord),
    BettingOffer(BettingOfferRecord),
    MarketOutcomeRelation(MarketOutcomeRelationRecord),
    Location(LocationRecord),
    EventCategory(EventCategoryRecord),
    EventInfo(EventInfoRecord),
    /// A tag this client does not know. Carried so the caller can log it;
    /// never stored.
    Unknown { kind: String },
}

fn decode<T: DeserializeOwned>(kind: RecordKind, value: Value) -> Result<T, RecordError> {
    serde_json::from_value(value).map_err(|source| RecordError::Payload {
        kind: kind.tag(),
        source,
    })
}

impl EntityRecord {
    /// Decode one tagged item. Unknown tags are `Ok(Unknown)`; only a missing
    /// tag or a payload that fails its kind's schema is an error.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let tag = match value.get("_type").and_then(Value::as_str) {
            Some(tag) => tag.to_string(),
            None => return Err(RecordError::MissingTag),
        };

        let Some(kind) = RecordKind::from_tag(&tag) else {
            return Ok(EntityRecord::Unknown { kind: tag });
        };

        let record = match kind {
            RecordKind::Sport => EntityRecord::Sport(decode(kind, value)?),
            RecordKind::Match => EntityRecord::Match(decode(kind, value)?),
            RecordKind::Tournament => EntityRecord::Tournament(decode(kind, value)?),
            RecordKind::Market => EntityRecord::Market(decode(kind, value)?),
            RecordKind::MainMarket => EntityRecord::MainMarket(decode(kind, value)?),
            RecordKind::Outcome => EntityRecord::Outcome(decode(kind, value)?),
            RecordKind::BettingOffer => EntityRecord::BettingOffer(decode(kind, value)?),
            RecordKind::MarketOutcomeRelation => {
                EntityRecord::MarketOutcomeRelation(decode(kind, value)?)
            }
            RecordKind::Location => EntityRecord::Location(decode(kind, value)?),
            RecordKind::EventCategory => EntityRecord::EventCategory(decode(kind, value)?),
            RecordKind::EventInfo => EntityRecord::EventInfo(decode(kind, value)?),
        };
        Ok(record)
    }

    /// The record's kind; `None` for unknown records.
    pub fn kind(&self) -> Option<RecordKind> {
        match self {
            EntityRecord::Sport(_) => Some(RecordKind::Sport),
            EntityRecord::Match(_) => Some(RecordKind::Match),
            EntityRecord::Tournament(_) => Some(RecordKind::Tournament),
            EntityRecord::Market(_) => Some(RecordKind::Market),
            EntityRecord::MainMarket(_) => Some(RecordKind::MainMarket),
            EntityRecord::Outcome(_) => Some(RecordKind::Outcome),
            EntityRecord::BettingOffer(_) => Some(RecordKind::BettingOffer),
            EntityRecord::MarketOutcomeRelation(_) => Some(RecordKind::MarketOutcomeRelation),
            EntityRecord::Location(_) => Some(RecordKind::Location),
            EntityRecord::EventCategory(_) => Some(RecordKind::EventCategory),
            EntityRecord::EventInfo(_) => Some(RecordKind::EventInfo),
            EntityRecord::Unknown { .. } => None,
        }
    }

    /// The record's stable id; `None` for unknown records.
    pub fn id(&self) -> Option<&str> {
        match self {
            EntityRecord::Sport(r) => Some(&r.id),
            EntityRecord::Match(r) => Some(&r.id),
            EntityRecord::Tournament(r) => Some(&r.id),
            EntityRecord::Market(r) => Some(&r.id),
            EntityRecord::MainMarket(r) => Some(&r.id),
            EntityRecord::Outcome(r) => Some(&r.id),
            EntityRecord::BettingOffer(r) => Some(&r.id),
            EntityRecord::MarketOutcomeRelation(r) => Some(&r.id),
            EntityRecord::Location(r) => Some(&r.id),
            EntityRecord::EventCategory(r) => Some(&r.id),
            EntityRecord::EventInfo(r) => Some(&r.id),
            EntityRecord::Unknown { .. } => None,
        }
    }

    /// The (kind, id) pairs this record declares it depends on, read from
    /// the record's own fields only. Builders use this to pull children from
    /// the record store; empty reference fields yield nothing.
    pub fn references(&self) -> Vec<(RecordKind, String)> {
        fn push(out: &mut Vec<(RecordKind, String)>, kind: RecordKind, id: &str) {
            if !id.is_empty() {
                out.push((kind, id.to_string()));
            }
        }

        let mut refs = Vec::new();
        match self {
            EntityRecord::Match(r) => {
                push(&mut refs, RecordKind::Sport, &r.sport_id);
                push(&mut refs, RecordKind::Location, &r.venue_id);
                push(&mut refs, RecordKind::EventCategory, &r.category_id);
                push(&mut refs, RecordKind::Tournament, &r.tournament_id);
            }
            EntityRecord::Tournament(r) => push(&mut refs, RecordKind::Sport, &r.sport_id),
            EntityRecord::EventCategory(r) => push(&mut refs, RecordKind::Sport, &r.sport_id),
            EntityRecord::MainMarket(r) => push(&mut refs, RecordKind::Sport, &r.sport_id),
            EntityRecord::Market(r) => push(&mut refs, RecordKind::Match, &r.event_id),
            EntityRecord::Outcome(r) => push(&mut refs, RecordKind::Match, &r.event_id),
            EntityRecord::EventInfo(r) => push(&mut refs, RecordKind::Match, &r.event_id),
            EntityRecord::BettingOffer(r) => push(&mut refs, RecordKind::Outcome, &r.outcome_id),
            EntityRecord::MarketOutcomeRelation(r) => {
                push(&mut refs, RecordKind::Market, &r.market_id);
                push(&mut refs, RecordKind::Outcome, &r.outcome_id);
            }
            EntityRecord::Sport(_) | EntityRecord::Location(_) | EntityRecord::Unknown { .. } => {}
        }
        refs
    }
}

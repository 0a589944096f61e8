//! Live odds feed normalization engine.
//!
//! Turns a push-based sports-data feed — tagged flat records plus
//! fine-grained deltas — into a consistent, queryable hierarchy
//! (sport → match → market → outcome → priced offer) that consumers can
//! read or subscribe to at any instant.
//!
//! Data flow: wire payload → [`decoder`] → flat [`records`] → [`store`]
//! → [`domain::builders`] → nested domain tree → [`live`] (resident,
//! mutable) → [`facade`] → consumers. Deltas re-enter at the live store
//! directly, bypassing the full rebuild.

pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod domain;
pub mod facade;
pub mod live;
pub mod logging;
pub mod records;
pub mod store;

// Re-export commonly used items
pub use config::{ConfigError, EngineConfig};
pub use decoder::{decode_envelope, BatchKind, DecodeError, DecodedBatch};
pub use dispatch::{FeedCommand, FeedDispatcher, FeedError, MarketDelta};
pub use domain::builders::{EventBuilder, MarketBuilder, OutcomeBuilder, SportBuilder};
pub use domain::models::{
    BettingOffer, Event, EventLiveData, Market, Odds, Outcome, PartScore, Sport, TeamSide,
};
pub use facade::LiveEventFeed;
pub use live::{EventUpdateStore, LiveEventReader, SlotKind};
pub use logging::init_tracing;
pub use records::{EntityRecord, RecordKind};
pub use store::{RecordStore, SharedRecordStore};

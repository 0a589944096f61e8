//! Domain layer: resolved models and the builders that produce them.

pub mod builders;
pub mod models;

pub use builders::{
    BettingOfferBuilder, EventBuilder, LiveDataBuilder, MarketBuilder, OutcomeBuilder,
    SportBuilder,
};
pub use models::{
    BettingOffer, BettingType, Category, Event, EventLiveData, EventStatus, Market, Odds, Outcome,
    PartScore, Participant, Sport, SportInfo, TeamSide, TournamentInfo, Venue,
};

//! Feed dispatch: the single writer behind the engine.
//!
//! Everything that mutates state — snapshot envelopes, incremental
//! envelopes, fine-grained deltas — funnels through one [`FeedDispatcher`]
//! running on its own task, so multi-step mutations (main-market swaps,
//! tree rebuilds) appear atomic to every reader. Commands are applied
//! strictly in the order the feed delivered them.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::decoder::{decode_envelope, BatchKind};
use crate::domain::builders::EventBuilder;
use crate::domain::models::{Event, Market, PartScore, TeamSide};
use crate::live::{EventUpdateStore, LiveEventReader};
use crate::store::{RecordStore, SharedRecordStore};

/// The dispatcher has gone away (shut down or panicked); no more commands
/// will be applied.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed dispatcher is no longer running")]
    Closed,
}

/// A fine-grained update against the resident event, already decoded by the
/// transport collaborator.
#[derive(Debug, Clone)]
pub enum MarketDelta {
    /// Partial price update; `None` fields are the feed's "no change"
    /// sentinel and retain the prior value.
    OutcomeOdds {
        outcome_id: String,
        numerator: Option<u32>,
        denominator: Option<u32>,
    },
    OutcomeTradability {
        outcome_id: String,
        is_tradable: bool,
    },
    MarketTradability {
        market_id: String,
        is_tradable: bool,
    },
    AddMarket { market: Market },
    RemoveMarket { market_id: String },
    EnableMarket { market_id: String },
    AddMainMarket { market: Market },
    RemoveMainMarket { market_id: String },
    EventScore {
        home: Option<i64>,
        away: Option<i64>,
    },
    EventTime { match_time: String },
    EventStatus { status: String },
    EventDetailedScore { scores: Vec<PartScore> },
    ActivePlayer { serving: Option<TeamSide> },
}

/// Commands sent to the dispatcher task via channel.
#[derive(Debug, Clone)]
pub enum FeedCommand {
    /// A raw tagged envelope (snapshot or incremental) straight off the wire.
    Envelope { payload: String },
    /// A fully built event delivered by a main-market subscription.
    Event { event: Event, main_market: bool },
    /// Markets fetched separately from the lean main-market feed.
    SecondaryMarkets { markets: Vec<Market> },
    /// A fine-grained delta; bypasses decoder and builders entirely.
    Delta(MarketDelta),
    /// Graceful shutdown.
    Shutdown,
}

impl FeedCommand {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, FeedCommand::Shutdown)
    }

    /// Short label for logging.
    pub fn description(&self) -> &'static str {
        match self {
            FeedCommand::Envelope { .. } => "Envelope",
            FeedCommand::Event { .. } => "Event",
            FeedCommand::SecondaryMarkets { .. } => "SecondaryMarkets",
            FeedCommand::Delta(_) => "Delta",
            FeedCommand::Shutdown => "Shutdown",
        }
    }
}

/// Owns the record store and the live update store for one subscribed match.
pub struct FeedDispatcher {
    config: EngineConfig,
    match_id: String,
    store: SharedRecordStore,
    live: EventUpdateStore,
}

impl FeedDispatcher {
    pub fn new(config: EngineConfig, match_id: impl Into<String>) -> Self {
        Self {
            config,
            match_id: match_id.into(),
            store: Arc::new(RwLock::new(RecordStore::new())),
            live: EventUpdateStore::new(),
        }
    }

    /// Read handle for the facade; valid from any thread.
    pub fn reader(&self) -> LiveEventReader {
        self.live.reader()
    }

    /// Shared handle onto the flat-record table, for callers that build
    /// their own snapshots.
    pub fn record_store(&self) -> SharedRecordStore {
        Arc::clone(&self.store)
    }

    /// Apply one command. Nothing here is fatal: a bad envelope is logged
    /// and dropped, a delta against an unknown id is a no-op.
    pub fn handle(&mut self, command: FeedCommand) {
        match command {
            FeedCommand::Envelope { payload } => self.apply_envelope(&payload),
            FeedCommand::Event { event, main_market } => {
                self.live.store_event(event, main_market);
            }
            FeedCommand::SecondaryMarkets { markets } => {
                self.live.store_secondary_markets(markets);
            }
            FeedCommand::Delta(delta) => self.apply_delta(delta),
            FeedCommand::Shutdown => {}
        }
    }

    /// Process commands until the channel closes or a shutdown arrives.
    pub async fn run(mut self, mut commands: mpsc::Receiver<FeedCommand>) {
        info!(
            operator_id = %self.config.operator_id,
            language = %self.config.language,
            match_id = %self.match_id,
            "feed dispatcher started"
        );

        while let Some(command) = commands.recv().await {
            if command.is_shutdown() {
                break;
            }
            self.handle(command);
        }

        info!(match_id = %self.match_id, "feed dispatcher stopped");
    }

    fn apply_envelope(&mut self, payload: &str) {
        let batch = match decode_envelope(payload) {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, "dropping undecodable envelope");
                return;
            }
        };

        debug!(
            kind = ?batch.kind,
            records = batch.records.len(),
            skipped = batch.skipped,
            "applying feed batch"
        );

        {
            let mut store = self.store.write();
            if batch.kind == BatchKind::Snapshot {
                store.clear();
            }
            store.put_all(batch.records);

            if tracing::enabled!(tracing::Level::DEBUG) {
                let dangling = store.unresolved_references();
                if !dangling.is_empty() {
                    debug!(count = dangling.len(), "batch left dangling references");
                }
            }
        }
        self.rebuild_resident_event();
    }

    /// Rebuild the subscribed match from flat records and swap it into the
    /// live store. Slot senders persist across rebuilds for surviving ids,
    /// so subscribers stay attached.
    fn rebuild_resident_event(&mut self) {
        let built = {
            let store = self.store.read();
            store
                .match_record(&self.match_id)
                .and_then(|record| EventBuilder::build(record, &store))
        };
        match built {
            Some(event) => self.live.store_event(event, false),
            None => debug!(match_id = %self.match_id, "match not buildable from current records"),
        }
    }

    fn apply_delta(&mut self, delta: MarketDelta) {
        match delta {
            MarketDelta::OutcomeOdds {
                outcome_id,
                numerator,
                denominator,
            } => self.live.update_outcome_odds(&outcome_id, numerator, denominator),
            MarketDelta::OutcomeTradability {
                outcome_id,
                is_tradable,
            } => self.live.update_outcome_tradability(&outcome_id, is_tradable),
            MarketDelta::MarketTradability {
                market_id,
                is_tradable,
            } => self.live.update_market_tradability(&market_id, is_tradable),
            MarketDelta::AddMarket { market } => self.live.add_market(market),
            MarketDelta::RemoveMarket { market_id } => self.live.remove_market(&market_id),
            MarketDelta::EnableMarket { market_id } => {
                self.live.update_market_tradability(&market_id, true)
            }
            MarketDelta::AddMainMarket { market } => self.live.add_main_market(market),
            MarketDelta::RemoveMainMarket { market_id } => {
                self.live.remove_main_market(&market_id)
            }
            MarketDelta::EventScore { home, away } => self.live.update_event_score(home, away),
            MarketDelta::EventTime { match_time } => self.live.update_event_time(match_time),
            MarketDelta::EventStatus { status } => self.live.update_event_status(status),
            MarketDelta::EventDetailedScore { scores } => {
                self.live.update_event_detailed_score(scores)
            }
            MarketDelta::ActivePlayer { serving } => self.live.update_active_player(serving),
        }
    }
}

//! Live update store: one resident event tree plus fine-grained mutation.
//!
//! The store keeps one match resident and applies delta operations (price,
//! tradability, market lifecycle, score/clock changes) without decoder or
//! builder involvement. Every addressable thing gets its own reactive slot —
//! the event, each market, each outcome — backed by `tokio::sync::watch`
//! channels, so consumers observe exactly the slots they care about.
//!
//! Concurrency contract: all mutators go through one writer (the feed
//! dispatch task owns the [`EventUpdateStore`]); reads go through cloneable
//! [`LiveEventReader`] handles from any thread and only ever see fully
//! applied mutations. Dropping a receiver is the entire teardown of a
//! subscription.
//!
//! Mutators called with an id that is not resident are deliberate no-ops:
//! the feed may legitimately deliver deltas for a market that was already
//! removed, and late or duplicate delivery must not corrupt the tree.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::models::{Event, Market, Odds, Outcome, PartScore, TeamSide};

/// Slot addressing for `contains` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Event,
    Market,
    Outcome,
}

/// Main-market replacement is two-phase so consumers never observe a match
/// with zero main markets: removal only marks the outgoing market
/// non-tradable and parks its id here; the actual removal happens in the
/// same step that promotes the replacement.
#[derive(Debug, Clone, PartialEq)]
enum MainMarketState {
    Stable,
    PendingReplacement { outgoing: String },
}

#[derive(Debug)]
struct LiveSlots {
    event: watch::Sender<Option<Event>>,
    markets: DashMap<String, watch::Sender<Market>>,
    outcomes: DashMap<String, watch::Sender<Outcome>>,
}

/// Read handle; cheap to clone, valid from any thread.
#[derive(Debug, Clone)]
pub struct LiveEventReader {
    slots: Arc<LiveSlots>,
}

impl LiveEventReader {
    /// Point-in-time snapshot of the resident tree.
    pub fn current_event(&self) -> Option<Event> {
        self.slots.event.borrow().clone()
    }

    pub fn subscribe_event(&self) -> watch::Receiver<Option<Event>> {
        self.slots.event.subscribe()
    }

    /// `None` when the market is not resident. The receiver's channel closes
    /// if the market is later removed.
    pub fn subscribe_market(&self, id: &str) -> Option<watch::Receiver<Market>> {
        self.slots.markets.get(id).map(|tx| tx.subscribe())
    }

    pub fn subscribe_outcome(&self, id: &str) -> Option<watch::Receiver<Outcome>> {
        self.slots.outcomes.get(id).map(|tx| tx.subscribe())
    }

    pub fn contains(&self, kind: SlotKind, id: &str) -> bool {
        match kind {
            SlotKind::Event => self
                .slots
                .event
                .borrow()
                .as_ref()
                .is_some_and(|event| event.id == id),
            SlotKind::Market => self.slots.markets.contains_key(id),
            SlotKind::Outcome => self.slots.outcomes.contains_key(id),
        }
    }
}

/// The single-writer side.
#[derive(Debug)]
pub struct EventUpdateStore {
    slots: Arc<LiveSlots>,
    main_state: MainMarketState,
}

impl Default for EventUpdateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventUpdateStore {
    pub fn new() -> Self {
        let (event, _) = watch::channel(None);
        Self {
            slots: Arc::new(LiveSlots {
                event,
                markets: DashMap::new(),
                outcomes: DashMap::new(),
            }),
            main_state: MainMarketState::Stable,
        }
    }

    pub fn reader(&self) -> LiveEventReader {
        LiveEventReader {
            slots: Arc::clone(&self.slots),
        }
    }

    /// Replace the whole resident tree and repopulate the per-market and
    /// per-outcome slots. Senders are reused for ids that survive, so their
    /// subscribers stay attached across the rebuild. `mark_main` flags the
    /// event's first market as main.
    pub fn store_event(&mut self, mut event: Event, mark_main: bool) {
        if mark_main {
            for (index, market) in event.markets.iter_mut().enumerate() {
                market.is_main = index == 0;
            }
        }
        Self::keep_single_main(&mut event.markets);
        self.main_state = MainMarketState::Stable;

        let market_ids: HashSet<String> = event.markets.iter().map(|m| m.id.clone()).collect();
        let outcome_ids: HashSet<String> = event
            .markets
            .iter()
            .flat_map(|m| m.outcomes.iter())
            .map(|o| o.id.clone())
            .collect();
        self.slots.markets.retain(|id, _| market_ids.contains(id));
        self.slots.outcomes.retain(|id, _| outcome_ids.contains(id));

        for market in &event.markets {
            self.publish_market(market);
        }
        info!(event_id = %event.id, markets = event.markets.len(), "stored resident event");
        self.slots.event.send_replace(Some(event));
    }

    /// Drop the resident tree and every slot, e.g. on unsubscribe.
    pub fn clear(&mut self) {
        self.slots.markets.clear();
        self.slots.outcomes.clear();
        self.main_state = MainMarketState::Stable;
        self.slots.event.send_replace(None);
    }

    /// Merge markets fetched separately from the lean main-market feed. An
    /// incoming market whose id is already resident and flagged main is
    /// skipped: the authoritative main-market value wins over a secondary
    /// fetch.
    pub fn store_secondary_markets(&mut self, markets: Vec<Market>) {
        if self.slots.event.borrow().is_none() {
            debug!("no resident event, dropping secondary markets");
            return;
        }

        let mut touched: Vec<Market> = Vec::new();
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            let mut any = false;
            for mut incoming in markets {
                incoming.is_main = false;
                match event.markets.iter_mut().find(|m| m.id == incoming.id) {
                    Some(existing) if existing.is_main => continue,
                    Some(existing) => {
                        *existing = incoming.clone();
                        touched.push(incoming);
                        any = true;
                    }
                    None => {
                        event.markets.push(incoming.clone());
                        touched.push(incoming);
                        any = true;
                    }
                }
            }
            any
        });

        if !touched.is_empty() {
            self.retire_missing_slots();
            for market in &touched {
                self.publish_market(market);
            }
        }
    }

    /// Partial price update. An omitted fraction field retains the prior
    /// value (defaulting to 1 when there is no prior fraction). If the
    /// resulting price equals the current one, nothing fires.
    pub fn update_outcome_odds(
        &mut self,
        id: &str,
        numerator: Option<u32>,
        denominator: Option<u32>,
    ) {
        self.mutate_outcome(id, |outcome| {
            let (prior_numerator, prior_denominator) = outcome
                .odds
                .as_ref()
                .and_then(Odds::fraction_parts)
                .unwrap_or((1, 1));
            let next = Odds::Fraction {
                numerator: numerator.unwrap_or(prior_numerator),
                denominator: denominator.unwrap_or(prior_denominator),
            };
            if let Some(current) = &outcome.odds {
                if (current.price() - next.price()).abs() < 1e-9 {
                    return false;
                }
            }
            debug!(outcome_id = %outcome.id, price = next.price(), "outcome price changed");
            outcome.odds = Some(next);
            true
        });
    }

    pub fn update_outcome_tradability(&mut self, id: &str, is_tradable: bool) {
        self.mutate_outcome(id, |outcome| {
            outcome.is_tradable = is_tradable;
            true
        });
    }

    pub fn update_market_tradability(&mut self, id: &str, is_tradable: bool) {
        self.mutate_market(id, |market| {
            market.is_tradable = is_tradable;
            true
        });
    }

    /// Ordinary (non-main) market add. An id that already exists is treated
    /// as a tradability update, not a duplicate insert.
    pub fn add_market(&mut self, market: Market) {
        if self.slots.markets.contains_key(&market.id) {
            let id = market.id.clone();
            self.update_market_tradability(&id, market.is_tradable);
            return;
        }
        if self.slots.event.borrow().is_none() {
            debug!(market_id = %market.id, "no resident event, ignoring add_market");
            return;
        }

        let mut added: Option<Market> = None;
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            let mut market = market;
            market.is_main = false;
            added = Some(market.clone());
            event.markets.push(market);
            true
        });

        if let Some(market) = added {
            self.publish_market(&market);
        }
    }

    /// Ordinary market removal; unknown ids are no-ops.
    pub fn remove_market(&mut self, id: &str) {
        if !self.remove_market_inner(id) {
            debug!(market_id = %id, "ignoring removal of unknown market");
        }
    }

    /// First phase of a main-market swap: mark the outgoing market
    /// non-tradable and defer its removal until the replacement arrives, so
    /// the event never shows zero main markets.
    pub fn remove_main_market(&mut self, id: &str) {
        if !self.slots.markets.contains_key(id) {
            debug!(market_id = %id, "ignoring removal of unknown main market");
            return;
        }

        // A second removal without an intervening replacement completes the
        // older removal first; out-of-order feeds do produce this.
        if let MainMarketState::PendingReplacement { outgoing } =
            std::mem::replace(&mut self.main_state, MainMarketState::Stable)
        {
            if outgoing != id {
                self.remove_market_inner(&outgoing);
            }
        }

        self.mutate_market(id, |market| {
            market.is_tradable = false;
            true
        });
        self.main_state = MainMarketState::PendingReplacement {
            outgoing: id.to_string(),
        };
    }

    /// Second phase: promote the replacement and, in the same step, remove
    /// the market parked by [`remove_main_market`]. Called while `Stable`
    /// (out-of-order delivery) it promotes without removing anything.
    pub fn add_main_market(&mut self, market: Market) {
        if let MainMarketState::PendingReplacement { outgoing } =
            std::mem::replace(&mut self.main_state, MainMarketState::Stable)
        {
            if outgoing != market.id {
                self.remove_market_inner(&outgoing);
            }
        }

        if self.slots.event.borrow().is_none() {
            debug!(market_id = %market.id, "no resident event, ignoring add_main_market");
            return;
        }

        let mut demoted: Vec<Market> = Vec::new();
        let mut promoted: Option<Market> = None;
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            let mut market = market;
            market.is_main = true;

            for existing in event.markets.iter_mut() {
                if existing.is_main && existing.id != market.id {
                    existing.is_main = false;
                    demoted.push(existing.clone());
                }
            }

            match event.markets.iter_mut().find(|m| m.id == market.id) {
                Some(existing) => {
                    *existing = market.clone();
                }
                None => {
                    // The main market leads the list.
                    event.markets.insert(0, market.clone());
                }
            }
            promoted = Some(market);
            true
        });

        self.retire_missing_slots();
        for market in &demoted {
            self.send_market_slot(market);
        }
        if let Some(market) = promoted {
            info!(market_id = %market.id, "promoted main market");
            self.publish_market(&market);
        }
    }

    // Narrow event-level mutators.

    pub fn update_event_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            event.live.status = Some(status);
            true
        });
    }

    pub fn update_event_time(&mut self, match_time: impl Into<String>) {
        let match_time = match_time.into();
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            event.live.match_time = Some(match_time);
            true
        });
    }

    /// A side the feed did not include keeps its prior value.
    pub fn update_event_score(&mut self, home: Option<i64>, away: Option<i64>) {
        if home.is_none() && away.is_none() {
            return;
        }
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            if home.is_some() {
                event.live.home_score = home;
            }
            if away.is_some() {
                event.live.away_score = away;
            }
            true
        });
    }

    pub fn update_event_detailed_score(&mut self, scores: Vec<PartScore>) {
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            event.live.detailed_scores = scores;
            true
        });
    }

    pub fn update_active_player(&mut self, serving: Option<TeamSide>) {
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            event.live.serving = serving;
            true
        });
    }

    // Internals.

    fn keep_single_main(markets: &mut [Market]) {
        let mut seen_main = false;
        for market in markets.iter_mut() {
            market.is_main = market.is_main && !seen_main;
            seen_main = seen_main || market.is_main;
        }
    }

    /// Apply `mutate` to the outcome, then refresh the outcome slot, the
    /// owning market slot and the event slot — observers of any of the three
    /// see the change. Unknown ids are no-ops.
    fn mutate_outcome(&mut self, id: &str, mutate: impl FnOnce(&mut Outcome) -> bool) {
        let mut found = false;
        let mut touched_outcome: Option<Outcome> = None;
        let mut touched_market: Option<Market> = None;

        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            let Some((market_index, outcome_index)) =
                event.markets.iter().enumerate().find_map(|(mi, market)| {
                    market
                        .outcomes
                        .iter()
                        .position(|o| o.id == id)
                        .map(|oi| (mi, oi))
                })
            else {
                return false;
            };
            found = true;

            let market = &mut event.markets[market_index];
            if !mutate(&mut market.outcomes[outcome_index]) {
                return false;
            }
            touched_outcome = Some(market.outcomes[outcome_index].clone());
            touched_market = Some(market.clone());
            true
        });

        if !found {
            debug!(outcome_id = %id, "ignoring update for unknown outcome");
        }
        if let Some(outcome) = touched_outcome {
            self.send_outcome_slot(&outcome);
        }
        if let Some(market) = touched_market {
            self.send_market_slot(&market);
        }
    }

    fn mutate_market(&mut self, id: &str, mutate: impl FnOnce(&mut Market) -> bool) {
        let mut found = false;
        let mut touched: Option<Market> = None;

        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            let Some(market) = event.markets.iter_mut().find(|m| m.id == id) else {
                return false;
            };
            found = true;
            if !mutate(market) {
                return false;
            }
            touched = Some(market.clone());
            true
        });

        if !found {
            debug!(market_id = %id, "ignoring update for unknown market");
        }
        if let Some(market) = touched {
            self.send_market_slot(&market);
        }
    }

    fn remove_market_inner(&mut self, id: &str) -> bool {
        let mut removed: Option<Market> = None;
        self.slots.event.send_if_modified(|resident| {
            let Some(event) = resident.as_mut() else {
                return false;
            };
            let Some(position) = event.markets.iter().position(|m| m.id == id) else {
                return false;
            };
            removed = Some(event.markets.remove(position));
            true
        });

        match removed {
            Some(market) => {
                // Dropping the senders closes subscriber channels, which is
                // the removal signal.
                self.slots.markets.remove(&market.id);
                for outcome in &market.outcomes {
                    self.slots.outcomes.remove(&outcome.id);
                }
                true
            }
            None => false,
        }
    }

    /// Drop slot senders whose ids are no longer in the resident tree.
    fn retire_missing_slots(&self) {
        let (market_ids, outcome_ids) = {
            let borrowed = self.slots.event.borrow();
            match borrowed.as_ref() {
                Some(event) => (
                    event
                        .markets
                        .iter()
                        .map(|m| m.id.clone())
                        .collect::<HashSet<_>>(),
                    event
                        .markets
                        .iter()
                        .flat_map(|m| m.outcomes.iter())
                        .map(|o| o.id.clone())
                        .collect::<HashSet<_>>(),
                ),
                None => (HashSet::new(), HashSet::new()),
            }
        };
        self.slots.markets.retain(|id, _| market_ids.contains(id));
        self.slots.outcomes.retain(|id, _| outcome_ids.contains(id));
    }

    /// Push a market and all of its outcomes into their slots, creating
    /// senders as needed.
    fn publish_market(&self, market: &Market) {
        self.send_market_slot(market);
        for outcome in &market.outcomes {
            self.send_outcome_slot(outcome);
        }
    }

    fn send_market_slot(&self, market: &Market) {
        match self.slots.markets.entry(market.id.clone()) {
            Entry::Occupied(entry) => {
                entry.get().send_replace(market.clone());
            }
            Entry::Vacant(entry) => {
                entry.insert(watch::channel(market.clone()).0);
            }
        }
    }

    fn send_outcome_slot(&self, outcome: &Outcome) {
        match self.slots.outcomes.entry(outcome.id.clone()) {
            Entry::Occupied(entry) => {
                entry.get().send_replace(outcome.clone());
            }
            Entry::Vacant(entry) => {
                entry.insert(watch::channel(outcome.clone()).0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{EventLiveData, EventStatus};
    use chrono::DateTime;

    fn outcome(id: &str, price: f64) -> Outcome {
        Outcome {
            id: id.to_string(),
            name: format!("Outcome {id}"),
            short_name: None,
            code: String::new(),
            header: None,
            sort_order: None,
            odds: Some(Odds::Decimal(price)),
            is_tradable: true,
            offers: Vec::new(),
        }
    }

    fn market(id: &str, is_main: bool, outcomes: Vec<Outcome>) -> Market {
        Market {
            id: id.to_string(),
            name: format!("Market {id}"),
            short_name: None,
            display_name: None,
            betting_type: None,
            line: None,
            is_main,
            is_tradable: true,
            is_available: true,
            outcomes,
        }
    }

    fn event(id: &str, markets: Vec<Market>) -> Event {
        Event {
            id: id.to_string(),
            name: format!("Event {id}"),
            short_name: None,
            start_time: DateTime::from_timestamp_millis(1_735_725_600_000).unwrap(),
            sport: None,
            venue: None,
            category: None,
            tournament: None,
            home: None,
            away: None,
            status: EventStatus {
                id: "1".into(),
                name: "Live".into(),
            },
            allows_live_odds: true,
            markets,
            live: EventLiveData::default(),
        }
    }

    fn resident_store() -> EventUpdateStore {
        let mut store = EventUpdateStore::new();
        store.store_event(
            event(
                "m1",
                vec![
                    market("mkt1", true, vec![outcome("o1", 2.10)]),
                    market("mkt2", false, vec![outcome("o2", 3.40)]),
                ],
            ),
            false,
        );
        store
    }

    #[test]
    fn test_store_event_populates_slots() {
        let store = resident_store();
        let reader = store.reader();

        assert!(reader.contains(SlotKind::Event, "m1"));
        assert!(reader.contains(SlotKind::Market, "mkt1"));
        assert!(reader.contains(SlotKind::Outcome, "o2"));
        assert!(!reader.contains(SlotKind::Market, "nope"));
        assert!(reader.subscribe_market("mkt1").is_some());
        assert!(reader.subscribe_market("nope").is_none());
    }

    #[test]
    fn test_store_event_mark_main_flags_first_market() {
        let mut store = EventUpdateStore::new();
        store.store_event(
            event(
                "m1",
                vec![market("a", false, vec![]), market("b", false, vec![])],
            ),
            true,
        );
        let resident = store.reader().current_event().unwrap();
        assert!(resident.markets[0].is_main);
        assert!(!resident.markets[1].is_main);
    }

    #[test]
    fn test_same_price_update_is_silent() {
        let mut store = resident_store();
        let reader = store.reader();
        let mut rx = reader.subscribe_outcome("o1").unwrap();
        rx.borrow_and_update();

        // 11/10 fractional is exactly the resident 2.10 decimal.
        store.update_outcome_odds("o1", Some(11), Some(10));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_price_change_notifies_outcome_market_and_event() {
        let mut store = resident_store();
        let reader = store.reader();
        let mut outcome_rx = reader.subscribe_outcome("o1").unwrap();
        let mut market_rx = reader.subscribe_market("mkt1").unwrap();
        let mut event_rx = reader.subscribe_event();
        outcome_rx.borrow_and_update();
        market_rx.borrow_and_update();
        event_rx.borrow_and_update();

        // 19/20 → 1.95
        store.update_outcome_odds("o1", Some(19), Some(20));

        assert!(outcome_rx.has_changed().unwrap());
        assert!(market_rx.has_changed().unwrap());
        assert!(event_rx.has_changed().unwrap());
        let price = outcome_rx
            .borrow_and_update()
            .odds
            .as_ref()
            .unwrap()
            .price();
        assert!((price - 1.95).abs() < 1e-9);

        // Untouched sibling market stays silent.
        let mut other_rx = reader.subscribe_market("mkt2").unwrap();
        other_rx.borrow_and_update();
        store.update_outcome_odds("o1", Some(19), Some(20));
        assert!(!other_rx.has_changed().unwrap());
    }

    #[test]
    fn test_partial_odds_update_retains_prior_fraction() {
        let mut store = resident_store();
        store.update_outcome_odds("o1", Some(19), Some(20)); // 1.95
        store.update_outcome_odds("o1", Some(21), None); // denominator kept → 21/20

        let resident = store.reader().current_event().unwrap();
        let price = resident.outcome("o1").unwrap().odds.as_ref().unwrap().price();
        assert!((price - 2.05).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_id_mutations_are_noops() {
        let mut store = resident_store();
        let reader = store.reader();
        let mut event_rx = reader.subscribe_event();
        event_rx.borrow_and_update();

        store.update_outcome_odds("ghost", Some(2), Some(1));
        store.update_outcome_tradability("ghost", false);
        store.update_market_tradability("ghost", false);
        store.remove_market("ghost");
        store.remove_main_market("ghost");

        assert!(!event_rx.has_changed().unwrap());
        assert_eq!(
            store.reader().current_event().unwrap().markets.len(),
            2
        );
    }

    #[test]
    fn test_outcome_tradability_update() {
        let mut store = resident_store();
        store.update_outcome_tradability("o1", false);
        let resident = store.reader().current_event().unwrap();
        assert!(!resident.outcome("o1").unwrap().is_tradable);
    }

    #[test]
    fn test_add_existing_market_is_tradability_update() {
        let mut store = resident_store();
        let mut incoming = market("mkt2", false, vec![outcome("o-other", 5.0)]);
        incoming.is_tradable = false;
        store.add_market(incoming);

        let resident = store.reader().current_event().unwrap();
        assert_eq!(resident.markets.len(), 2);
        let mkt2 = resident.market("mkt2").unwrap();
        assert!(!mkt2.is_tradable);
        // Content was not replaced.
        assert_eq!(mkt2.outcomes[0].id, "o2");
    }

    #[test]
    fn test_add_and_remove_ordinary_market() {
        let mut store = resident_store();
        store.add_market(market("mkt3", false, vec![outcome("o3", 1.5)]));

        let reader = store.reader();
        assert!(reader.contains(SlotKind::Market, "mkt3"));
        let resident = reader.current_event().unwrap();
        assert_eq!(
            resident.markets.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["mkt1", "mkt2", "mkt3"]
        );

        let market_rx = reader.subscribe_market("mkt3").unwrap();
        store.remove_market("mkt3");
        assert!(!reader.contains(SlotKind::Market, "mkt3"));
        assert!(!reader.contains(SlotKind::Outcome, "o3"));
        // The slot channel closed; that is the removal signal.
        assert!(market_rx.has_changed().is_err());
    }

    #[test]
    fn test_main_market_two_phase_replacement() {
        let mut store = resident_store();
        let reader = store.reader();

        store.remove_main_market("mkt1");
        // Outgoing market is still resident but no longer tradable.
        let resident = reader.current_event().unwrap();
        let mkt1 = resident.market("mkt1").unwrap();
        assert!(!mkt1.is_tradable);
        assert!(resident.main_market().is_some());

        store.add_main_market(market("mkt3", false, vec![outcome("o3", 1.8)]));

        let resident = reader.current_event().unwrap();
        let ids: Vec<_> = resident.markets.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mkt3", "mkt2"]);
        let mains: Vec<_> = resident
            .markets
            .iter()
            .filter(|m| m.is_main)
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(mains, vec!["mkt3"]);
        assert!(!reader.contains(SlotKind::Market, "mkt1"));
        assert!(!reader.contains(SlotKind::Outcome, "o1"));
    }

    #[test]
    fn test_add_main_market_without_pending_removal() {
        let mut store = resident_store();
        store.add_main_market(market("mkt3", false, vec![]));

        let resident = store.reader().current_event().unwrap();
        // Nothing was removed, mkt3 leads and is the only main.
        let ids: Vec<_> = resident.markets.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["mkt3", "mkt1", "mkt2"]);
        let mains: Vec<_> = resident
            .markets
            .iter()
            .filter(|m| m.is_main)
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(mains, vec!["mkt3"]);
    }

    #[test]
    fn test_secondary_markets_never_displace_main() {
        let mut store = resident_store();
        let replacement_main = market("mkt1", false, vec![outcome("o-clash", 9.0)]);
        let fresh = market("mkt4", false, vec![outcome("o4", 4.2)]);
        store.store_secondary_markets(vec![replacement_main, fresh]);

        let resident = store.reader().current_event().unwrap();
        // mkt1 kept its main-feed content.
        assert_eq!(resident.market("mkt1").unwrap().outcomes[0].id, "o1");
        assert!(resident.market("mkt1").unwrap().is_main);
        // mkt4 was appended.
        assert_eq!(resident.markets.last().unwrap().id, "mkt4");
        assert!(store.reader().contains(SlotKind::Outcome, "o4"));
    }

    #[test]
    fn test_subscribers_survive_rebuild_with_same_ids() {
        let mut store = resident_store();
        let reader = store.reader();
        let mut market_rx = reader.subscribe_market("mkt1").unwrap();
        market_rx.borrow_and_update();

        // A fresh snapshot arrives with the same market id.
        store.store_event(
            event("m1", vec![market("mkt1", true, vec![outcome("o1", 2.50)])]),
            false,
        );

        assert!(market_rx.has_changed().unwrap());
        let seen = market_rx.borrow_and_update();
        assert!((seen.outcomes[0].odds.as_ref().unwrap().price() - 2.50).abs() < 1e-9);
    }

    #[test]
    fn test_event_level_mutators() {
        let mut store = resident_store();
        store.update_event_status("2nd Half");
        store.update_event_time("67'");
        store.update_event_score(Some(1), None);
        store.update_event_score(None, Some(2));
        store.update_event_detailed_score(vec![PartScore {
            part: "1st Half".into(),
            home: 1,
            away: 0,
        }]);
        store.update_active_player(Some(TeamSide::Away));

        let live = store.reader().current_event().unwrap().live;
        assert_eq!(live.status.as_deref(), Some("2nd Half"));
        assert_eq!(live.match_time.as_deref(), Some("67'"));
        assert_eq!(live.home_score, Some(1));
        assert_eq!(live.away_score, Some(2));
        assert_eq!(live.detailed_scores.len(), 1);
        assert_eq!(live.serving, Some(TeamSide::Away));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut store = resident_store();
        store.clear();
        let reader = store.reader();
        assert!(reader.current_event().is_none());
        assert!(!reader.contains(SlotKind::Market, "mkt1"));
    }
}

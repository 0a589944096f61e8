//! In-memory table of flat records.
//!
//! Holds the latest record for every (kind, id) pair while preserving the
//! first-seen insertion order per kind. Overwrites keep the original order
//! slot; so does a record that is removed and later re-stored, matching the
//! feed's replay semantics.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::records::{
    BettingOfferRecord, EntityRecord, EventCategoryRecord, EventInfoRecord, LocationRecord,
    MainMarketRecord, MarketOutcomeRelationRecord, MarketRecord, MatchRecord, OutcomeRecord,
    RecordKind, SportRecord, TournamentRecord,
};

/// Store shared between the single writer (feed dispatch) and any number of
/// concurrent builder reads.
pub type SharedRecordStore = Arc<RwLock<RecordStore>>;

#[derive(Debug, Default)]
struct Table {
    records: HashMap<String, EntityRecord>,
    /// First-seen id order. Ids survive removal here so a re-stored record
    /// keeps its original slot; iteration skips ids with no record.
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    tables: HashMap<RecordKind, Table>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by (kind, id). Unknown records are dropped here —
    /// they carry no id to key on.
    pub fn put(&mut self, record: EntityRecord) {
        let (Some(kind), Some(id)) = (record.kind(), record.id().map(str::to_string)) else {
            debug!("record store ignoring unknown record");
            return;
        };

        let table = self.tables.entry(kind).or_default();
        if !table.order.iter().any(|existing| *existing == id) {
            table.order.push(id.clone());
        }
        table.records.insert(id, record);
    }

    pub fn put_all(&mut self, records: impl IntoIterator<Item = EntityRecord>) {
        for record in records {
            self.put(record);
        }
    }

    /// Point lookup; absence is not an error.
    pub fn get(&self, kind: RecordKind, id: &str) -> Option<&EntityRecord> {
        self.tables.get(&kind)?.records.get(id)
    }

    /// Remove a record. The surviving order is untouched; a later `put` of
    /// the same id lands back in its original slot.
    pub fn remove(&mut self, kind: RecordKind, id: &str) -> Option<EntityRecord> {
        self.tables.get_mut(&kind)?.records.remove(id)
    }

    pub fn contains(&self, kind: RecordKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    pub fn len(&self, kind: RecordKind) -> usize {
        self.tables.get(&kind).map_or(0, |t| t.records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(|t| t.records.is_empty())
    }

    /// Wholesale reset, used when a fresh initial snapshot arrives.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Every declared cross-reference that does not resolve against the
    /// store right now. Builders tolerate these by omitting the child; this
    /// view exists for diagnostics.
    pub fn unresolved_references(&self) -> Vec<(RecordKind, String)> {
        let mut missing = Vec::new();
        for table in self.tables.values() {
            for record in table.records.values() {
                for (kind, id) in record.references() {
                    if !self.contains(kind, &id) {
                        missing.push((kind, id));
                    }
                }
            }
        }
        missing
    }

    /// Cloned ordered snapshot of one kind; later mutation of the store
    /// cannot affect the returned sequence.
    pub fn all_in_order(&self, kind: RecordKind) -> Vec<EntityRecord> {
        let Some(table) = self.tables.get(&kind) else {
            return Vec::new();
        };
        table
            .order
            .iter()
            .filter_map(|id| table.records.get(id))
            .cloned()
            .collect()
    }

    fn ordered<'a, T>(
        &'a self,
        kind: RecordKind,
        project: fn(&'a EntityRecord) -> Option<&'a T>,
    ) -> Vec<&'a T> {
        let Some(table) = self.tables.get(&kind) else {
            return Vec::new();
        };
        table
            .order
            .iter()
            .filter_map(|id| table.records.get(id))
            .filter_map(project)
            .collect()
    }

    // Typed point lookups used by the builders.

    pub fn sport(&self, id: &str) -> Option<&SportRecord> {
        match self.get(RecordKind::Sport, id) {
            Some(EntityRecord::Sport(r)) => Some(r),
            _ => None,
        }
    }

    pub fn match_record(&self, id: &str) -> Option<&MatchRecord> {
        match self.get(RecordKind::Match, id) {
            Some(EntityRecord::Match(r)) => Some(r),
            _ => None,
        }
    }

    pub fn tournament(&self, id: &str) -> Option<&TournamentRecord> {
        match self.get(RecordKind::Tournament, id) {
            Some(EntityRecord::Tournament(r)) => Some(r),
            _ => None,
        }
    }

    pub fn location(&self, id: &str) -> Option<&LocationRecord> {
        match self.get(RecordKind::Location, id) {
            Some(EntityRecord::Location(r)) => Some(r),
            _ => None,
        }
    }

    pub fn category(&self, id: &str) -> Option<&EventCategoryRecord> {
        match self.get(RecordKind::EventCategory, id) {
            Some(EntityRecord::EventCategory(r)) => Some(r),
            _ => None,
        }
    }

    pub fn outcome(&self, id: &str) -> Option<&OutcomeRecord> {
        match self.get(RecordKind::Outcome, id) {
            Some(EntityRecord::Outcome(r)) => Some(r),
            _ => None,
        }
    }

    // Typed ordered views used by the builders.

    pub fn matches_in_order(&self) -> Vec<&MatchRecord> {
        self.ordered(RecordKind::Match, |r| match r {
            EntityRecord::Match(m) => Some(m),
            _ => None,
        })
    }

    pub fn markets_in_order(&self) -> Vec<&MarketRecord> {
        self.ordered(RecordKind::Market, |r| match r {
            EntityRecord::Market(m) => Some(m),
            _ => None,
        })
    }

    pub fn relations_in_order(&self) -> Vec<&MarketOutcomeRelationRecord> {
        self.ordered(RecordKind::MarketOutcomeRelation, |r| match r {
            EntityRecord::MarketOutcomeRelation(rel) => Some(rel),
            _ => None,
        })
    }

    pub fn offers_in_order(&self) -> Vec<&BettingOfferRecord> {
        self.ordered(RecordKind::BettingOffer, |r| match r {
            EntityRecord::BettingOffer(b) => Some(b),
            _ => None,
        })
    }

    pub fn main_markets_in_order(&self) -> Vec<&MainMarketRecord> {
        self.ordered(RecordKind::MainMarket, |r| match r {
            EntityRecord::MainMarket(m) => Some(m),
            _ => None,
        })
    }

    pub fn event_infos_in_order(&self) -> Vec<&EventInfoRecord> {
        self.ordered(RecordKind::EventInfo, |r| match r {
            EntityRecord::EventInfo(i) => Some(i),
            _ => None,
        })
    }
}

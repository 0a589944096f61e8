//! Hierarchy builders: flat records + record store → nested domain objects.
//!
//! One builder per domain kind. A builder never errors: if a required field
//! is missing or a referenced child cannot be resolved, it returns `None`
//! (or omits the child) and the rest of the tree still builds. Builders are
//! stateless and safe to run concurrently against one store snapshot — they
//! only read.

use chrono::DateTime;

use crate::domain::models::{
    BettingOffer, BettingType, Category, Event, EventLiveData, EventStatus, Market, Odds, Outcome,
    PartScore, Participant, Sport, SportInfo, TeamSide, TournamentInfo, Venue,
};
use crate::records::types::event_info_type;
use crate::records::{
    BettingOfferRecord, EventInfoRecord, MatchRecord, MarketRecord, OutcomeRecord, SportRecord,
};
use crate::store::RecordStore;

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub struct BettingOfferBuilder;

impl BettingOfferBuilder {
    pub fn build(record: &BettingOfferRecord) -> Option<BettingOffer> {
        if record.id.is_empty() {
            return None;
        }
        Some(BettingOffer {
            id: record.id.clone(),
            odds: record.odds,
            is_available: record.is_available,
            is_live: record.is_live,
            last_changed: DateTime::from_timestamp_millis(record.last_changed_time)
                .unwrap_or_default(),
            provider_id: record.provider_id.clone(),
        })
    }
}

pub struct OutcomeBuilder;

impl OutcomeBuilder {
    pub fn build(record: &OutcomeRecord, store: &RecordStore) -> Option<Outcome> {
        if record.id.is_empty() {
            return None;
        }

        // Offers attach by outcome reference, in feed order.
        let offers: Vec<BettingOffer> = store
            .offers_in_order()
            .into_iter()
            .filter(|offer| offer.outcome_id == record.id)
            .filter_map(BettingOfferBuilder::build)
            .collect();

        let odds = offers.first().map(|offer| Odds::Decimal(offer.odds));
        let is_tradable = offers.is_empty() || offers.iter().any(|offer| offer.is_available);

        Some(Outcome {
            id: record.id.clone(),
            name: record.translated_name.clone(),
            short_name: none_if_empty(&record.short_translated_name),
            code: record.code.clone(),
            header: record.header_name.clone(),
            sort_order: record.sort_order,
            odds,
            is_tradable,
            offers,
        })
    }
}

pub struct MarketBuilder;

impl MarketBuilder {
    pub fn build(record: &MarketRecord, store: &RecordStore) -> Option<Market> {
        if record.id.is_empty() {
            return None;
        }

        // Market ↔ outcome is many-to-many and goes through the explicit
        // relation records, in relation feed order. A relation whose outcome
        // is absent from the store is simply omitted.
        let mut outcomes: Vec<Outcome> = store
            .relations_in_order()
            .into_iter()
            .filter(|relation| relation.market_id == record.id)
            .filter_map(|relation| store.outcome(&relation.outcome_id))
            .filter_map(|outcome| OutcomeBuilder::build(outcome, store))
            .collect();

        // Explicit sort key wins, feed order breaks ties (stable sort).
        outcomes.sort_by_key(|outcome| outcome.sort_order.unwrap_or(i64::MAX));

        let betting_type = (!record.betting_type_id.is_empty()).then(|| BettingType {
            id: record.betting_type_id.clone(),
            name: record.betting_type_name.clone(),
            short_name: record.short_betting_type_name.clone(),
        });

        Some(Market {
            id: record.id.clone(),
            name: record.name.clone(),
            short_name: none_if_empty(&record.short_name),
            display_name: none_if_empty(&record.display_name),
            betting_type,
            line: record.param_float1,
            is_main: record.main_line,
            is_tradable: record.is_available && !record.is_closed,
            is_available: record.is_available,
            outcomes,
        })
    }
}

pub struct EventBuilder;

impl EventBuilder {
    pub fn build(record: &MatchRecord, store: &RecordStore) -> Option<Event> {
        if record.id.is_empty() || record.name.is_empty() {
            return None;
        }

        // Direct references are optional point lookups.
        let sport = store.sport(&record.sport_id).map(|s| SportInfo {
            id: s.id.clone(),
            name: s.name.clone(),
            short_name: none_if_empty(&s.short_name),
        });
        let venue = store.location(&record.venue_id).map(|v| Venue {
            id: v.id.clone(),
            name: v.name.clone(),
        });
        let category = store.category(&record.category_id).map(|c| Category {
            id: c.id.clone(),
            name: c.name.clone(),
        });
        let tournament = store.tournament(&record.tournament_id).map(|t| TournamentInfo {
            id: t.id.clone(),
            name: t.name.clone(),
        });

        // Child markets filter the ordered market sequence by parent id.
        let mut markets: Vec<Market> = store
            .markets_in_order()
            .into_iter()
            .filter(|market| market.event_id == record.id)
            .filter_map(|market| MarketBuilder::build(market, store))
            .collect();
        Self::apply_main_flags(&mut markets, record, store);

        let home = (!record.home_participant_id.is_empty()).then(|| Participant {
            id: record.home_participant_id.clone(),
            name: record.home_participant_name.clone(),
        });
        let away = (!record.away_participant_id.is_empty()).then(|| Participant {
            id: record.away_participant_id.clone(),
            name: record.away_participant_name.clone(),
        });

        Some(Event {
            id: record.id.clone(),
            name: record.name.clone(),
            short_name: none_if_empty(&record.short_name),
            start_time: DateTime::from_timestamp_millis(record.start_time).unwrap_or_default(),
            sport,
            venue,
            category,
            tournament,
            home,
            away,
            status: EventStatus {
                id: record.status_id.clone(),
                name: record.status_name.clone(),
            },
            allows_live_odds: record.allows_live_odds,
            markets,
            live: LiveDataBuilder::build(&record.id, store, Some(record)),
        })
    }

    /// A market is main when its own main-line flag says so or its betting
    /// type matches a MAIN_MARKET declaration for the event's sport. At most
    /// one market keeps the flag: the first in feed order wins.
    fn apply_main_flags(markets: &mut [Market], record: &MatchRecord, store: &RecordStore) {
        let main_types: Vec<String> = store
            .main_markets_in_order()
            .into_iter()
            .filter(|m| m.sport_id == record.sport_id && !m.outright)
            .map(|m| m.betting_type_id.clone())
            .collect();

        let mut seen_main = false;
        for market in markets.iter_mut() {
            let declared = market
                .betting_type
                .as_ref()
                .is_some_and(|bt| main_types.contains(&bt.id));
            market.is_main = (market.is_main || declared) && !seen_main;
            seen_main = seen_main || market.is_main;
        }
    }
}

pub struct SportBuilder;

impl SportBuilder {
    pub fn build(record: &SportRecord, store: &RecordStore) -> Option<Sport> {
        if record.id.is_empty() || record.name.is_empty() {
            return None;
        }

        let events: Vec<Event> = store
            .matches_in_order()
            .into_iter()
            .filter(|m| m.sport_id == record.id)
            .filter_map(|m| EventBuilder::build(m, store))
            .collect();

        Some(Sport {
            id: record.id.clone(),
            name: record.name.clone(),
            short_name: none_if_empty(&record.short_name),
            is_virtual: record.is_virtual,
            is_top_sport: record.is_top_sport,
            events,
        })
    }
}

/// Folds EVENT_INFO records for one match into a single [`EventLiveData`].
pub struct LiveDataBuilder;

impl LiveDataBuilder {
    pub fn build(
        event_id: &str,
        store: &RecordStore,
        match_record: Option<&MatchRecord>,
    ) -> EventLiveData {
        let mut live = EventLiveData::default();

        for info in store
            .event_infos_in_order()
            .into_iter()
            .filter(|info| info.event_id == event_id)
        {
            Self::apply(&mut live, info, match_record);
        }
        live
    }

    fn apply(live: &mut EventLiveData, info: &EventInfoRecord, match_record: Option<&MatchRecord>) {
        match info.type_id.as_str() {
            event_info_type::SCORE => {
                let (home, away) = Self::oriented_values(info, match_record);
                if info.event_part_name.is_empty() {
                    live.home_score = home.or(live.home_score);
                    live.away_score = away.or(live.away_score);
                } else {
                    let entry = PartScore {
                        part: info.event_part_name.clone(),
                        home: home.unwrap_or(0),
                        away: away.unwrap_or(0),
                    };
                    match live
                        .detailed_scores
                        .iter_mut()
                        .find(|score| score.part == entry.part)
                    {
                        Some(existing) => *existing = entry,
                        None => live.detailed_scores.push(entry),
                    }
                }
            }
            event_info_type::SERVE => {
                live.serving = Self::side_of(info.param_participant_id1.as_deref(), match_record);
            }
            event_info_type::EVENT_STATUS => {
                if let Some(status) = info.status_name.clone() {
                    live.status = Some(status);
                }
            }
            event_info_type::MATCH_TIME => {
                live.match_time = info
                    .param_float1
                    .map(|minutes| format!("{}'", minutes as i64));
            }
            _ => {}
        }
    }

    /// Map (param1, param2) onto (home, away) using the participant ids when
    /// the match record is available; otherwise take feed order.
    fn oriented_values(
        info: &EventInfoRecord,
        match_record: Option<&MatchRecord>,
    ) -> (Option<i64>, Option<i64>) {
        let first = info.param_float1.map(|v| v as i64);
        let second = info.param_float2.map(|v| v as i64);

        if let (Some(m), Some(p1)) = (match_record, info.param_participant_id1.as_deref()) {
            if p1 == m.away_participant_id {
                return (second, first);
            }
        }
        (first, second)
    }

    fn side_of(participant_id: Option<&str>, match_record: Option<&MatchRecord>) -> Option<TeamSide> {
        let (participant_id, m) = (participant_id?, match_record?);
        if participant_id == m.home_participant_id {
            Some(TeamSide::Home)
        } else if participant_id == m.away_participant_id {
            Some(TeamSide::Away)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::types::{MainMarketRecord, MarketOutcomeRelationRecord};
    use crate::records::EntityRecord;

    fn sport(id: &str, name: &str) -> EntityRecord {
        EntityRecord::Sport(SportRecord {
            id: id.into(),
            name: name.into(),
            short_name: String::new(),
            is_virtual: false,
            number_of_events: 0,
            number_of_live_events: 0,
            is_top_sport: false,
            has_matches: true,
        })
    }

    fn match_rec(id: &str, sport_id: &str) -> EntityRecord {
        EntityRecord::Match(MatchRecord {
            id: id.into(),
            name: format!("Match {id}"),
            short_name: String::new(),
            start_time: 1_735_725_600_000,
            sport_id: sport_id.into(),
            venue_id: String::new(),
            category_id: String::new(),
            tournament_id: String::new(),
            status_id: "1".into(),
            status_name: "Live".into(),
            home_participant_id: "p-home".into(),
            home_participant_name: "Home Team".into(),
            away_participant_id: "p-away".into(),
            away_participant_name: "Away Team".into(),
            allows_live_odds: true,
            number_of_markets: 0,
        })
    }

    fn market(id: &str, event_id: &str, betting_type_id: &str, main_line: bool) -> EntityRecord {
        EntityRecord::Market(MarketRecord {
            id: id.into(),
            name: format!("Market {id}"),
            short_name: String::new(),
            display_name: String::new(),
            event_id: event_id.into(),
            betting_type_id: betting_type_id.into(),
            betting_type_name: String::new(),
            short_betting_type_name: String::new(),
            param_float1: None,
            main_line,
            is_available: true,
            is_closed: false,
            number_of_outcomes: 0,
        })
    }

    fn outcome(id: &str, event_id: &str, sort_order: Option<i64>) -> EntityRecord {
        EntityRecord::Outcome(OutcomeRecord {
            id: id.into(),
            event_id: event_id.into(),
            translated_name: format!("Outcome {id}"),
            short_translated_name: String::new(),
            code: String::new(),
            header_name: None,
            sort_order,
            status_id: String::new(),
        })
    }

    fn relation(id: &str, market_id: &str, outcome_id: &str) -> EntityRecord {
        EntityRecord::MarketOutcomeRelation(MarketOutcomeRelationRecord {
            id: id.into(),
            market_id: market_id.into(),
            outcome_id: outcome_id.into(),
        })
    }

    fn offer(id: &str, outcome_id: &str, odds: f64) -> EntityRecord {
        EntityRecord::BettingOffer(BettingOfferRecord {
            id: id.into(),
            outcome_id: outcome_id.into(),
            provider_id: "1".into(),
            status_id: String::new(),
            is_live: true,
            odds,
            last_changed_time: 1_735_725_600_000,
            is_available: true,
        })
    }

    #[test]
    fn test_event_builds_with_unresolved_references() {
        // sportId points nowhere; the event still builds, minus the sport.
        let mut store = RecordStore::new();
        store.put(match_rec("m1", "missing-sport"));

        let record = store.match_record("m1").unwrap().clone();
        let event = EventBuilder::build(&record, &store).unwrap();
        assert!(event.sport.is_none());
        assert!(event.markets.is_empty());
        assert_eq!(event.home.as_ref().unwrap().name, "Home Team");
    }

    #[test]
    fn test_missing_outcome_is_omitted_not_fatal() {
        let mut store = RecordStore::new();
        store.put(match_rec("m1", "s1"));
        store.put(market("mk1", "m1", "bt1", false));
        store.put(outcome("o1", "m1", None));
        store.put(relation("r1", "mk1", "o1"));
        // Relation to an outcome that never arrived.
        store.put(relation("r2", "mk1", "o-gone"));

        let record = store.match_record("m1").unwrap().clone();
        let event = EventBuilder::build(&record, &store).unwrap();
        assert_eq!(event.markets.len(), 1);
        assert_eq!(event.markets[0].outcomes.len(), 1);
        assert_eq!(event.markets[0].outcomes[0].id, "o1");
    }

    #[test]
    fn test_outcome_sort_key_beats_feed_order() {
        let mut store = RecordStore::new();
        store.put(match_rec("m1", "s1"));
        store.put(market("mk1", "m1", "bt1", false));
        // Feed order: o1, o2, o3. Sort keys put o3 first, o1/o2 tie after.
        store.put(outcome("o1", "m1", Some(2)));
        store.put(outcome("o2", "m1", Some(2)));
        store.put(outcome("o3", "m1", Some(1)));
        store.put(relation("r1", "mk1", "o1"));
        store.put(relation("r2", "mk1", "o2"));
        store.put(relation("r3", "mk1", "o3"));

        let record = store.match_record("m1").unwrap().clone();
        let event = EventBuilder::build(&record, &store).unwrap();
        let ids: Vec<_> = event.markets[0]
            .outcomes
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["o3", "o1", "o2"]);
    }

    #[test]
    fn test_offers_attach_in_feed_order_and_set_price() {
        let mut store = RecordStore::new();
        store.put(match_rec("m1", "s1"));
        store.put(market("mk1", "m1", "bt1", false));
        store.put(outcome("o1", "m1", None));
        store.put(relation("r1", "mk1", "o1"));
        store.put(offer("b1", "o1", 2.10));
        store.put(offer("b2", "o1", 2.15));

        let record = store.match_record("m1").unwrap().clone();
        let event = EventBuilder::build(&record, &store).unwrap();
        let built = &event.markets[0].outcomes[0];
        assert_eq!(built.offers.len(), 2);
        assert_eq!(built.offers[0].id, "b1");
        assert!((built.odds.as_ref().unwrap().price() - 2.10).abs() < 1e-9);
    }

    #[test]
    fn test_main_market_from_declaration_and_single_main() {
        let mut store = RecordStore::new();
        store.put(sport("s1", "Football"));
        store.put(match_rec("m1", "s1"));
        store.put(EntityRecord::MainMarket(MainMarketRecord {
            id: "mm1".into(),
            betting_type_id: "bt-1x2".into(),
            sport_id: "s1".into(),
            betting_type_name: "Match Result".into(),
            live_market: true,
            outright: false,
        }));
        // Both carry the main betting type; only the first may keep the flag.
        store.put(market("mk1", "m1", "bt-1x2", false));
        store.put(market("mk2", "m1", "bt-1x2", false));
        store.put(market("mk3", "m1", "bt-other", false));

        let record = store.match_record("m1").unwrap().clone();
        let event = EventBuilder::build(&record, &store).unwrap();
        let mains: Vec<_> = event
            .markets
            .iter()
            .filter(|m| m.is_main)
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(mains, vec!["mk1"]);
    }

    #[test]
    fn test_sport_builder_collects_events_in_feed_order() {
        let mut store = RecordStore::new();
        store.put(sport("s1", "Football"));
        store.put(match_rec("m1", "s1"));
        store.put(match_rec("m2", "other-sport"));
        store.put(match_rec("m3", "s1"));

        let record = store.sport("s1").unwrap().clone();
        let built = SportBuilder::build(&record, &store).unwrap();
        let ids: Vec<_> = built.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[test]
    fn test_live_data_folding() {
        let mut store = RecordStore::new();
        store.put(match_rec("m1", "s1"));
        // Total score, away participant listed first.
        store.put(EntityRecord::EventInfo(EventInfoRecord {
            id: "i1".into(),
            event_id: "m1".into(),
            type_id: event_info_type::SCORE.into(),
            event_part_name: String::new(),
            status_name: None,
            param_float1: Some(1.0),
            param_float2: Some(2.0),
            param_participant_id1: Some("p-away".into()),
            param_participant_id2: Some("p-home".into()),
        }));
        store.put(EntityRecord::EventInfo(EventInfoRecord {
            id: "i2".into(),
            event_id: "m1".into(),
            type_id: event_info_type::EVENT_STATUS.into(),
            event_part_name: String::new(),
            status_name: Some("2nd Half".into()),
            param_float1: None,
            param_float2: None,
            param_participant_id1: None,
            param_participant_id2: None,
        }));
        store.put(EntityRecord::EventInfo(EventInfoRecord {
            id: "i3".into(),
            event_id: "m1".into(),
            type_id: event_info_type::MATCH_TIME.into(),
            event_part_name: String::new(),
            status_name: None,
            param_float1: Some(67.0),
            param_float2: None,
            param_participant_id1: None,
            param_participant_id2: None,
        }));
        store.put(EntityRecord::EventInfo(EventInfoRecord {
            id: "i4".into(),
            event_id: "m1".into(),
            type_id: event_info_type::SERVE.into(),
            event_part_name: String::new(),
            status_name: None,
            param_float1: None,
            param_float2: None,
            param_participant_id1: Some("p-home".into()),
            param_participant_id2: None,
        }));

        let record = store.match_record("m1").unwrap().clone();
        let live = LiveDataBuilder::build("m1", &store, Some(&record));

        // Participant orientation flipped param1 onto the away side.
        assert_eq!(live.home_score, Some(2));
        assert_eq!(live.away_score, Some(1));
        assert_eq!(live.status.as_deref(), Some("2nd Half"));
        assert_eq!(live.match_time.as_deref(), Some("67'"));
        assert_eq!(live.serving, Some(TeamSide::Home));
    }
}

//! Integration test: the replay path the `replay_feed` binary uses.
//!
//! Feeds line-delimited envelopes through the facade exactly as the binary
//! does and checks the tree that comes out.

use odds_feed_engine::oddsfeed::{EngineConfig, FeedCommand, LiveEventFeed};

const DUMP: &str = r#"
{ "messageType": "INITIAL_DUMP", "records": [
    { "_type": "SPORT", "id": "s1", "name": "Tennis" },
    { "_type": "MATCH", "id": "m7", "name": "Player A vs Player B", "sportId": "s1",
      "homeParticipantId": "pa", "homeParticipantName": "Player A",
      "awayParticipantId": "pb", "awayParticipantName": "Player B" },
    { "_type": "MARKET", "id": "w1", "name": "Match Winner", "eventId": "m7",
      "bettingTypeId": "bt-winner", "mainLine": true },
    { "_type": "OUTCOME", "id": "oa", "eventId": "m7", "translatedName": "Player A" },
    { "_type": "MARKET_OUTCOME_RELATION", "id": "rel1", "marketId": "w1", "outcomeId": "oa" },
    { "_type": "BETTING_OFFER", "id": "off1", "outcomeId": "oa", "odds": 1.72 }
] }
{ "messageType": "UPDATE", "records": [
    { "_type": "BETTING_OFFER", "id": "off1", "outcomeId": "oa", "odds": 1.80 },
    { "_type": "EVENT_INFO", "id": "inf1", "eventId": "m7", "typeId": "92",
      "statusName": "Set 2" }
] }
"#;

#[tokio::test]
async fn test_line_delimited_replay() {
    let feed = LiveEventFeed::start(EngineConfig::default(), "m7");

    for line in DUMP.lines().filter(|line| !line.trim().is_empty()) {
        feed.submit(FeedCommand::Envelope {
            payload: line.to_string(),
        })
        .await
        .unwrap();
    }

    let reader = feed.reader();
    feed.shutdown().await;

    let event = reader.current_event().expect("match should build");
    assert_eq!(event.name, "Player A vs Player B");
    assert_eq!(event.sport.as_ref().unwrap().name, "Tennis");
    assert_eq!(event.markets.len(), 1);
    assert!(event.markets[0].is_main);

    // The update envelope overwrote the offer and added live status.
    let outcome = event.outcome("oa").unwrap();
    assert!((outcome.odds.as_ref().unwrap().price() - 1.80).abs() < 1e-9);
    assert_eq!(event.live.status.as_deref(), Some("Set 2"));
}

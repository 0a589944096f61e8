//! Replay a captured feed dump through the engine and print the result.
//!
//! The dump file holds one JSON envelope per line, in delivery order —
//! exactly what a transport session would have handed the engine. Useful
//! for inspecting what a recorded session builds without any socket.
//!
//! Usage: `replay_feed <dump-file> <match-id>`

use anyhow::{bail, Context, Result};
use oddsfeed::{EngineConfig, FeedCommand, LiveEventFeed};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    oddsfeed::init_tracing();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(match_id)) = (args.next(), args.next()) else {
        bail!("usage: replay_feed <dump-file> <match-id>");
    };

    let dump = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read dump file {path}"))?;

    let feed = LiveEventFeed::start(EngineConfig::default(), &match_id);
    let mut envelopes = 0usize;
    for line in dump.lines().filter(|line| !line.trim().is_empty()) {
        feed.submit(FeedCommand::Envelope {
            payload: line.to_string(),
        })
        .await?;
        envelopes += 1;
    }

    // Shut the dispatcher down so every envelope is fully applied before we
    // read the result.
    let reader = feed.reader();
    feed.shutdown().await;
    info!(envelopes, "replay complete");

    let Some(event) = reader.current_event() else {
        bail!("match {match_id} was not buildable from the dump");
    };
    println!("{}", serde_json::to_string_pretty(&event)?);

    Ok(())
}

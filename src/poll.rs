//! Live match polling.
//!
//! One poller per displayed match. The poller owns its timer, so polling
//! cadence is independent of any rendering loop: updates are pushed over an
//! mpsc channel and the consumer reacts whenever it drains them. Switching
//! matches or navigating away stops the poller; an aborted poller never
//! fires again.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::aggregator::MatchClient;
use crate::models::{MatchDetails, MatchStatus};

/// Updates pushed to the consumer.
#[derive(Debug)]
pub enum PollUpdate {
    /// A fresh details payload (initial load or poll refresh).
    Details(Box<MatchDetails>),
    /// A poll refresh started; show the updating indicator.
    Updating,
    /// The indicator window elapsed; hide the indicator.
    UpdatingDone,
    /// The match is no longer live. No further updates follow.
    Ended,
}

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Pause between poll refreshes.
    pub interval: Duration,
    /// How long the updating indicator stays visible, independent of how
    /// long the refresh itself takes.
    pub indicator: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(90),
            indicator: Duration::from_secs(1),
        }
    }
}

/// Handle to a running poll task. Dropping it stops the poller.
pub struct LivePoller {
    handle: JoinHandle<()>,
}

impl LivePoller {
    /// Start polling `match_id`. The task performs an initial detail fetch,
    /// then refreshes every `config.interval` for as long as the match
    /// reports live. A non-live payload emits [`PollUpdate::Ended`] and stops
    /// the task; transient fetch errors keep the loop alive.
    pub fn spawn(
        client: MatchClient,
        match_id: u64,
        tx: mpsc::Sender<PollUpdate>,
        config: PollConfig,
    ) -> Self {
        let handle = tokio::spawn(run(client, match_id, tx, config));
        LivePoller { handle }
    }

    /// Stop polling. No update is emitted after this returns.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(client: MatchClient, match_id: u64, tx: mpsc::Sender<PollUpdate>, config: PollConfig) {
    // Initial load may be served from cache.
    match client.match_details(match_id).await {
        Ok(details) => {
            let live = details.summary.status == MatchStatus::Live;
            if tx.send(PollUpdate::Details(Box::new(details))).await.is_err() {
                return;
            }
            if !live {
                let _ = tx.send(PollUpdate::Ended).await;
                return;
            }
        }
        // Keep polling; the match may well be live even if this fetch
        // failed.
        Err(e) => warn!("Initial detail load for {} failed: {}", match_id, e),
    }

    loop {
        sleep(config.interval).await;

        if tx.send(PollUpdate::Updating).await.is_err() {
            return;
        }

        // The indicator window is fixed: UpdatingDone fires when it elapses,
        // whether or not the refresh has answered yet.
        let (result, _) = tokio::join!(client.match_details_force_refresh(match_id), async {
            sleep(config.indicator).await;
            let _ = tx.send(PollUpdate::UpdatingDone).await;
        });

        match result {
            Ok(details) => {
                let live = details.summary.status == MatchStatus::Live;
                if tx.send(PollUpdate::Details(Box::new(details))).await.is_err() {
                    return;
                }
                if !live {
                    debug!("Match {} ended; stopping poll loop", match_id);
                    let _ = tx.send(PollUpdate::Ended).await;
                    return;
                }
            }
            Err(e) => warn!("Poll refresh for {} failed: {}", match_id, e),
        }
    }
}

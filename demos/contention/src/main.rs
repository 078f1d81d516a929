//! Two simulated game-server processes contending for one player.
//!
//! Walks through the full ownership story against a single shared store:
//!
//! 1. both servers race to acquire a brand-new player — one wins
//! 2. the loser's main loop receives the kick command
//! 3. the winner plays a session and releases on disconnect
//! 4. the other server acquires the released data
//! 5. that server "crashes" without releasing; after the lease is aged
//!    past the threshold, the first server recovers the data
//!
//! Run with `RUST_LOG=info cargo run -p contention-demo`.

use std::sync::Arc;

use playervault::{
    HostCommand, HostHandle, OwnershipManager, PlayerId, ProtocolConfig,
    RecordStore, SessionConfig, SessionTracker, SqlitePlayerStore,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

struct Server {
    name: &'static str,
    manager: OwnershipManager<SqlitePlayerStore>,
    tracker: Arc<Mutex<SessionTracker>>,
    commands: UnboundedReceiver<HostCommand>,
}

impl Server {
    fn new(name: &'static str, store: SqlitePlayerStore) -> Self {
        let tracker = Arc::new(Mutex::new(SessionTracker::new(
            SessionConfig::default(),
        )));
        let (host, commands) = HostHandle::channel();
        let manager = OwnershipManager::new(
            store,
            Arc::clone(&tracker),
            host,
            ProtocolConfig::default(),
        );
        Self {
            name,
            manager,
            tracker,
            commands,
        }
    }

    /// Drains the main-loop command queue, as the host loop would.
    fn drain_main_loop(&mut self) {
        while let Ok(cmd) = self.commands.try_recv() {
            match cmd {
                HostCommand::Kick { player, reason } => {
                    tracing::info!(
                        server = self.name, %player, %reason,
                        "main loop: player kicked"
                    );
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), playervault::PlayervaultError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = SqlitePlayerStore::open_in_memory()?;
    let mut alpha = Server::new("alpha", store.clone());
    let mut beta = Server::new("beta", store.clone());
    let player = PlayerId::random();

    // --- Round 1: both servers race for a brand-new player --------------
    let (a, b) = tokio::join!(
        alpha.manager.acquire(player),
        beta.manager.acquire(player),
    );
    tracing::info!(outcome = ?a, "alpha acquire");
    tracing::info!(outcome = ?b, "beta acquire");
    alpha.drain_main_loop();
    beta.drain_main_loop();

    let winner = if a.is_grant() { &alpha } else { &beta };
    let payload = winner
        .tracker
        .lock()
        .await
        .take_payload(player)
        .unwrap_or_default();
    tracing::info!(server = winner.name, %payload, "session attached");

    // --- Round 2: the winner saves and releases, the other takes over ---
    winner
        .manager
        .release(player, "coins=250;world=hub".into())
        .await?;

    let loser = if a.is_grant() { &beta } else { &alpha };
    let outcome = loser.manager.acquire(player).await;
    tracing::info!(server = loser.name, ?outcome, "reacquire after release");

    // --- Round 3: crash and stale recovery ------------------------------
    // The current owner vanishes without releasing. Age its lease by hand
    // (a real deployment just waits out the threshold).
    let aged = playervault::epoch_millis() - 10 * 60_000;
    store.release(player, "coins=300;world=nether", aged)?;
    let claim = store.claim_if_offline(player, aged)?;
    debug_assert!(claim.is_won());

    let outcome = winner.manager.acquire(player).await;
    tracing::info!(
        server = winner.name, ?outcome,
        "acquire against a crashed owner's stale lease"
    );

    Ok(())
}

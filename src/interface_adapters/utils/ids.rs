// Connection id allocation for accepted sockets.

use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// First id handed out by this process: microseconds since the epoch at first use,
// so players from a restarted server are told apart in logs.
static NEXT_CONNECTION_ID: LazyLock<AtomicU64> = LazyLock::new(|| {
    let started_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_micros() as u64)
        .unwrap_or(1);
    AtomicU64::new(started_at)
});

/// Id for a newly accepted socket, which the world also uses as its player id.
/// Ids only ever go up, so a reconnecting client always joins as a new player.
pub fn next_connection_id() -> u64 {
    NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)
}

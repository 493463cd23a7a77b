use super::sessions::SessionRegistry;
use super::types::GameEvent;
use super::world::World;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tracing::{info, warn};

/// Single consumer of every connection's events. Each event is handled to
/// completion before the next one, so registry mutations never interleave.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    mut world: World,
    shutdown: Arc<Notify>,
) {
    let mut sessions = SessionRegistry::new();
    info!(
        collectibles = world.collectible_count(),
        "world task started"
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("world task shutting down");
                break;
            }
            event = input_rx.recv() => {
                let Some(event) = event else {
                    // Every sender is gone; nothing can reach the world anymore.
                    info!("input channel closed; world task exiting");
                    break;
                };
                apply_event(&mut world, &mut sessions, event);
            }
        }
    }
}

/// Applies one event and routes the resulting dispatches.
pub fn apply_event(world: &mut World, sessions: &mut SessionRegistry, event: GameEvent) {
    match event {
        GameEvent::Join {
            player_id,
            outbound,
        } => match world.connect(player_id) {
            Ok(dispatches) => {
                sessions.register(player_id, outbound);
                for dispatch in dispatches {
                    sessions.deliver(dispatch);
                }
                sessions.activate(player_id);
            }
            Err(e) => {
                // Dropping `outbound` closes the new socket's queue.
                warn!(player_id, error = %e, "join rejected");
            }
        },
        GameEvent::Leave { player_id } => {
            sessions.close(player_id);
            for dispatch in world.disconnect(player_id) {
                sessions.deliver(dispatch);
            }
        }
        GameEvent::Intent { player_id, intent } => {
            for dispatch in world.handle_intent(player_id, intent) {
                sessions.deliver(dispatch);
            }
        }
    }
}

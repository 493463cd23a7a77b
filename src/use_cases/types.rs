// Use-case level inputs/outputs for the world task.

use crate::domain::{Collectible, CollectibleId, Player, PlayerId, PlayerIntent};
use tokio::sync::mpsc;

/// Per-connection queue the world task pushes events into.
pub type Outbound = mpsc::Sender<ArenaEvent>;

/// Events a connection may have buffered before it is dropped as too slow.
pub const OUTBOUND_CAPACITY: usize = 512;

#[derive(Debug)]
pub enum GameEvent {
    // Socket accepted; `outbound` is where this connection's events go.
    Join { player_id: PlayerId, outbound: Outbound },
    Leave { player_id: PlayerId },
    Intent { player_id: PlayerId, intent: PlayerIntent },
}

/// Registry mutation as seen by clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ArenaEvent {
    Bootstrap(WorldSnapshot),
    PlayerJoined(Player),
    PlayerLeft { id: PlayerId },
    PlayerMoved(Player),
    ScoreChanged { id: PlayerId, score: u32 },
    CollectibleSpawned(Collectible),
    CollectibleRemoved { id: CollectibleId },
}

/// Full point-in-time copy of both registries, addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub you: PlayerId,
    pub players: Vec<Player>,
    pub collectibles: Vec<Collectible>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Only(PlayerId),
    AllExcept(PlayerId),
    All,
}

impl Audience {
    pub fn includes(self, player_id: PlayerId) -> bool {
        match self {
            Audience::Only(id) => id == player_id,
            Audience::AllExcept(id) => id != player_id,
            Audience::All => true,
        }
    }
}

/// An event paired with who should receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub audience: Audience,
    pub event: ArenaEvent,
}

impl Dispatch {
    pub fn new(audience: Audience, event: ArenaEvent) -> Self {
        Self { audience, event }
    }
}

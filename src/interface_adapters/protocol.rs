// Wire protocol DTOs and conversions for the arena WebSocket.
// Every frame is JSON shaped as `{"type": ..., "data": ...}`.

use crate::domain::state::ParseDirectionError;
use crate::domain::{Collectible, CollectibleId, Player, PlayerIntent};
use crate::use_cases::{ArenaEvent, WorldSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    // Full state for a new connection, including its own id.
    Bootstrap {
        id: String,
        players: BTreeMap<String, PlayerDto>,
        collectibles: BTreeMap<String, CollectibleDto>,
    },
    Join {
        id: String,
        state: PlayerDto,
    },
    Leave {
        id: String,
    },
    // Authoritative position after a move.
    State {
        id: String,
        state: PlayerDto,
    },
    Score {
        id: String,
        score: u32,
    },
    NewCollectible(CollectibleDto),
    CollectibleRemoved {
        id: CollectibleId,
    },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Move(MoveDto),
    // Pickup attempt at the current position.
    Collect,
}

/// Movement intent. The direction stays a raw string so unknown values can be
/// told apart from unparseable frames.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveDto {
    pub direction: String,
}

impl TryFrom<ClientMessage> for PlayerIntent {
    type Error = ParseDirectionError;

    fn try_from(msg: ClientMessage) -> Result<Self, Self::Error> {
        match msg {
            ClientMessage::Move(dto) => Ok(PlayerIntent::Move(dto.direction.parse()?)),
            ClientMessage::Collect => Ok(PlayerIntent::Collect),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub score: u32,
    pub color: String,
    pub radius: f32,
}

impl From<Player> for PlayerDto {
    fn from(player: Player) -> Self {
        Self {
            id: player.id.to_string(),
            x: player.x,
            y: player.y,
            score: player.score,
            color: player.color,
            radius: player.radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectibleDto {
    pub id: CollectibleId,
    pub x: f32,
    pub y: f32,
    pub value: u32,
    pub radius: f32,
}

impl From<Collectible> for CollectibleDto {
    fn from(collectible: Collectible) -> Self {
        Self {
            id: collectible.id,
            x: collectible.x,
            y: collectible.y,
            value: collectible.value,
            radius: collectible.radius,
        }
    }
}

impl From<WorldSnapshot> for ServerMessage {
    fn from(snapshot: WorldSnapshot) -> Self {
        ServerMessage::Bootstrap {
            id: snapshot.you.to_string(),
            players: snapshot
                .players
                .into_iter()
                .map(|p| (p.id.to_string(), PlayerDto::from(p)))
                .collect(),
            collectibles: snapshot
                .collectibles
                .into_iter()
                .map(|c| (c.id.to_string(), CollectibleDto::from(c)))
                .collect(),
        }
    }
}

impl From<ArenaEvent> for ServerMessage {
    fn from(event: ArenaEvent) -> Self {
        match event {
            ArenaEvent::Bootstrap(snapshot) => snapshot.into(),
            ArenaEvent::PlayerJoined(player) => ServerMessage::Join {
                id: player.id.to_string(),
                state: player.into(),
            },
            ArenaEvent::PlayerLeft { id } => ServerMessage::Leave { id: id.to_string() },
            ArenaEvent::PlayerMoved(player) => ServerMessage::State {
                id: player.id.to_string(),
                state: player.into(),
            },
            ArenaEvent::ScoreChanged { id, score } => ServerMessage::Score {
                id: id.to_string(),
                score,
            },
            ArenaEvent::CollectibleSpawned(collectible) => {
                ServerMessage::NewCollectible(collectible.into())
            }
            ArenaEvent::CollectibleRemoved { id } => ServerMessage::CollectibleRemoved { id },
        }
    }
}

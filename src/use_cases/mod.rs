// Use cases layer: application workflows for the arena server.

pub mod game;
pub mod sessions;
pub mod types;
pub mod world;

pub use game::world_task;
pub use sessions::{SessionPhase, SessionRegistry};
pub use types::{
    ArenaEvent, Audience, Dispatch, GameEvent, OUTBOUND_CAPACITY, Outbound, WorldSnapshot,
};
pub use world::{World, WorldError};

// Domain layer: core arena types and rules.

pub mod state;
pub mod systems;
pub mod tuning;

pub use state::{Collectible, CollectibleId, Direction, Player, PlayerId, PlayerIntent};
pub use tuning::ArenaTuning;

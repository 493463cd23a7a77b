use crate::domain::state::{Collectible, CollectibleId, Player};
use std::collections::HashMap;

/// Circle overlap test. Touching circles (distance equal to the radius sum) do not collide.
pub fn is_colliding(player: &Player, collectible: &Collectible) -> bool {
    let dx = player.x - collectible.x;
    let dy = player.y - collectible.y;
    let reach = player.radius + collectible.radius;
    (dx * dx + dy * dy) < reach * reach
}

/// Ids of every collectible overlapping the player right now, in registry iteration order.
///
/// Linear scan; the live collectible count stays small.
pub fn overlapping(
    player: &Player,
    collectibles: &HashMap<CollectibleId, Collectible>,
) -> Vec<CollectibleId> {
    collectibles
        .values()
        .filter(|c| is_colliding(player, c))
        .map(|c| c.id)
        .collect()
}

use crate::domain::state::{Direction, Player};

/// Shifts a player one discrete step along the direction's axis.
///
/// No clamping: coordinates may leave the arena or go negative.
pub fn step_player(player: &mut Player, direction: Direction, step: f32) {
    let (ux, uy) = direction.unit();
    player.x += ux * step;
    player.y += uy * step;
}

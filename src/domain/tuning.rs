/// Gameplay tuning for the arena.
///
/// Keep this separate from runtime/server configuration (ports, channel sizes, etc.).
#[derive(Debug, Clone, Copy)]
pub struct ArenaTuning {
    /// Playable width in pixels; spawns land inside `[margin, width - margin)`.
    pub width: f32,

    /// Playable height in pixels.
    pub height: f32,

    /// Distance kept between spawn points and the arena edge.
    pub spawn_margin: f32,

    /// Distance a single move intent shifts a player along one axis.
    pub step: f32,

    /// Collision radius shared by every player.
    pub player_radius: f32,

    /// Collision radius shared by every collectible.
    pub collectible_radius: f32,

    /// Score awarded per pickup.
    pub collectible_value: u32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            spawn_margin: 10.0,
            step: 4.0,
            player_radius: 10.0,
            collectible_radius: 5.0,
            collectible_value: 1,
        }
    }
}

// Authoritative arena state: player and collectible registries plus the rules that mutate them.

use super::types::{ArenaEvent, Audience, Dispatch, WorldSnapshot};
use crate::domain::systems::{movement, pickups};
use crate::domain::{
    ArenaTuning, Collectible, CollectibleId, Direction, Player, PlayerId, PlayerIntent,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The id already belongs to a live player.
    DuplicatePlayer(PlayerId),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::DuplicatePlayer(id) => write!(f, "player {id} is already connected"),
        }
    }
}

impl std::error::Error for WorldError {}

/// Owns every entity in the arena. Each mutating call returns the events it produced.
pub struct World {
    tuning: ArenaTuning,
    players: HashMap<PlayerId, Player>,
    collectibles: HashMap<CollectibleId, Collectible>,
    // Next collectible id; only ever incremented.
    next_collectible_id: CollectibleId,
    rng: StdRng,
}

impl World {
    /// Creates a world seeded with `initial_collectibles` pickups at random positions.
    pub fn new(tuning: ArenaTuning, initial_collectibles: usize) -> Self {
        Self::with_rng(tuning, initial_collectibles, StdRng::from_entropy())
    }

    /// Same as [`World::new`] with a caller-supplied generator (deterministic in tests).
    pub fn with_rng(tuning: ArenaTuning, initial_collectibles: usize, rng: StdRng) -> Self {
        let mut world = Self {
            tuning,
            players: HashMap::new(),
            collectibles: HashMap::new(),
            next_collectible_id: 0,
            rng,
        };
        for _ in 0..initial_collectibles {
            world.spawn_collectible();
        }
        world
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn collectibles(&self) -> impl Iterator<Item = &Collectible> {
        self.collectibles.values()
    }

    pub fn collectible_count(&self) -> usize {
        self.collectibles.len()
    }

    /// Spawns a player for a new connection and announces it.
    ///
    /// The bootstrap for the newcomer is always the first dispatch returned.
    pub fn connect(&mut self, id: PlayerId) -> Result<Vec<Dispatch>, WorldError> {
        if self.players.contains_key(&id) {
            return Err(WorldError::DuplicatePlayer(id));
        }

        let (x, y) = self.random_spawn();
        let hue: f32 = self.rng.gen_range(0.0..360.0);
        let player = Player {
            id,
            x,
            y,
            score: 0,
            color: format!("hsl({hue:.1}, 100%, 70%)"),
            radius: self.tuning.player_radius,
        };
        info!(player_id = id, x, y, color = %player.color, "player joined");
        self.players.insert(id, player.clone());

        Ok(vec![
            Dispatch::new(Audience::Only(id), ArenaEvent::Bootstrap(self.snapshot_for(id))),
            Dispatch::new(Audience::AllExcept(id), ArenaEvent::PlayerJoined(player)),
        ])
    }

    /// Removes the player bound to a closed connection. Unknown ids produce nothing.
    pub fn disconnect(&mut self, id: PlayerId) -> Vec<Dispatch> {
        match self.players.remove(&id) {
            Some(player) => {
                info!(player_id = id, score = player.score, "player left");
                vec![Dispatch::new(
                    Audience::AllExcept(id),
                    ArenaEvent::PlayerLeft { id },
                )]
            }
            None => {
                trace!(player_id = id, "disconnect for unknown player");
                Vec::new()
            }
        }
    }

    pub fn handle_intent(&mut self, id: PlayerId, intent: PlayerIntent) -> Vec<Dispatch> {
        match intent {
            PlayerIntent::Move(direction) => self.apply_move(id, direction),
            PlayerIntent::Collect => self.collect(id),
        }
    }

    /// Steps the player, resolves any pickups, then publishes the new position.
    pub fn apply_move(&mut self, id: PlayerId, direction: Direction) -> Vec<Dispatch> {
        let Some(player) = self.players.get_mut(&id) else {
            // Movement raced a disconnect.
            trace!(player_id = id, "move for unknown player discarded");
            return Vec::new();
        };
        movement::step_player(player, direction, self.tuning.step);

        let mut out = Vec::new();
        self.resolve_pickups(id, &mut out);
        if let Some(player) = self.players.get(&id) {
            out.push(Dispatch::new(
                Audience::All,
                ArenaEvent::PlayerMoved(player.clone()),
            ));
        }
        out
    }

    /// Pickup attempt without movement.
    pub fn collect(&mut self, id: PlayerId) -> Vec<Dispatch> {
        if !self.players.contains_key(&id) {
            trace!(player_id = id, "collect for unknown player discarded");
            return Vec::new();
        }
        let mut out = Vec::new();
        self.resolve_pickups(id, &mut out);
        out
    }

    /// Full registry copy for a freshly connected player.
    pub fn snapshot_for(&self, id: PlayerId) -> WorldSnapshot {
        WorldSnapshot {
            you: id,
            players: self.players.values().cloned().collect(),
            collectibles: self.collectibles.values().cloned().collect(),
        }
    }

    // Consumes every collectible overlapping the player at call time, each exactly once.
    // Replacements spawned here are not re-checked until the next move or collect.
    fn resolve_pickups(&mut self, id: PlayerId, out: &mut Vec<Dispatch>) {
        let hits = match self.players.get(&id) {
            Some(player) => pickups::overlapping(player, &self.collectibles),
            None => return,
        };

        for collectible_id in hits {
            let Some(collectible) = self.collectibles.remove(&collectible_id) else {
                continue;
            };
            let Some(player) = self.players.get_mut(&id) else {
                return;
            };
            player.score = player.score.saturating_add(collectible.value);
            let score = player.score;
            info!(player_id = id, collectible_id, score, "collectible picked up");

            out.push(Dispatch::new(
                Audience::All,
                ArenaEvent::ScoreChanged { id, score },
            ));
            out.push(Dispatch::new(
                Audience::All,
                ArenaEvent::CollectibleRemoved { id: collectible_id },
            ));

            let replacement = self.spawn_collectible();
            out.push(Dispatch::new(
                Audience::All,
                ArenaEvent::CollectibleSpawned(replacement),
            ));
        }
    }

    fn spawn_collectible(&mut self) -> Collectible {
        let id = self.next_collectible_id;
        self.next_collectible_id += 1;

        let (x, y) = self.random_spawn();
        let collectible = Collectible {
            id,
            x,
            y,
            value: self.tuning.collectible_value,
            radius: self.tuning.collectible_radius,
        };
        debug!(collectible_id = id, x, y, "collectible spawned");
        self.collectibles.insert(id, collectible.clone());
        collectible
    }

    // Integral coordinates in [margin, extent - margin) on both axes.
    fn random_spawn(&mut self) -> (f32, f32) {
        let margin = self.tuning.spawn_margin;
        let span_x = (self.tuning.width - 2.0 * margin).max(0.0);
        let span_y = (self.tuning.height - 2.0 * margin).max(0.0);
        let x = (self.rng.r#gen::<f32>() * span_x).floor() + margin;
        let y = (self.rng.r#gen::<f32>() * span_y).floor() + margin;
        (x, y)
    }
}

#[cfg(test)]
impl World {
    pub(crate) fn place_player(&mut self, id: PlayerId, x: f32, y: f32) {
        let player = self.players.get_mut(&id).expect("player should exist");
        player.x = x;
        player.y = y;
    }

    // Moves every existing collectible far away and adds one at a fixed position.
    pub(crate) fn place_only_collectible(&mut self, x: f32, y: f32) -> CollectibleId {
        for c in self.collectibles.values_mut() {
            c.x = -1000.0;
            c.y = -1000.0;
        }
        let c = self.spawn_collectible();
        let entry = self.collectibles.get_mut(&c.id).expect("just spawned");
        entry.x = x;
        entry.y = y;
        c.id
    }
}

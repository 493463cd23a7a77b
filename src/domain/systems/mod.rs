// Pure simulation rules; no I/O and no randomness.

pub mod movement;
pub mod pickups;

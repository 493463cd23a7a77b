use std::{env, net::IpAddr};

// Runtime/server configuration (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("ARENA_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub fn bind_addr() -> IpAddr {
    env::var("ARENA_BIND_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

// Number of collectibles seeded at startup; the world keeps this count constant.
pub fn initial_collectibles() -> usize {
    parse_collectibles(env::var("ARENA_COLLECTIBLES").ok().as_deref())
}

fn parse_collectibles(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;

use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    time::Duration,
};

use crate::domain::tuning::ChargeAuthority;

// Runtime/server constants (not gameplay tuning).

pub const INPUT_CHANNEL_CAPACITY: usize = 256;
pub const ROOM_BROADCAST_CAPACITY: usize = 64;
pub const LOBBY_BROADCAST_CAPACITY: usize = 64;

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
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub fn leaderboard_path() -> PathBuf {
    env::var("LEADERBOARD_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/ranking.json"))
}

pub fn charge_authority() -> ChargeAuthority {
    env::var("CHARGE_AUTHORITY")
        .ok()
        .and_then(|v| parse_charge_authority(&v))
        .unwrap_or(ChargeAuthority::Client)
}

pub fn empty_room_grace() -> Duration {
    let secs = env::var("EMPTY_ROOM_GRACE_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(30);
    Duration::from_secs(secs)
}

fn parse_charge_authority(value: &str) -> Option<ChargeAuthority> {
    match value.trim().to_ascii_lowercase().as_str() {
        "client" => Some(ChargeAuthority::Client),
        "server" => Some(ChargeAuthority::Server),
        _ => None,
    }
}

/// Settings a server instance is started with.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub leaderboard_path: PathBuf,
    pub charge_authority: ChargeAuthority,
    pub empty_room_grace: Duration,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self {
            leaderboard_path: leaderboard_path(),
            charge_authority: charge_authority(),
            empty_room_grace: empty_room_grace(),
        }
    }
}

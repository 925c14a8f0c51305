//! Shared protocol crate for sendoff.
//!
//! This crate contains:
//! - Client -> server and server -> client event definitions (JSON text frames)
//! - Shared identifier types (`PlayerId`, `GameCode`)
//! - Roster types broadcast to every room member

mod error;
pub mod events;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};

/// Opaque identifier for one connected client, allocated by the server at
/// accept time and stable for the lifetime of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Characters a game code may be built from. No lowercase so codes survive
/// being read out loud and typed back in.
pub const GAME_CODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a game code.
pub const GAME_CODE_LEN: usize = 5;

/// Short alphanumeric identifier addressing one session as a multicast group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameCode(String);

impl GameCode {
    /// Wrap a raw code, normalizing to the uppercase alphabet.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code has the expected length and alphabet.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == GAME_CODE_LEN && self.0.chars().all(|ch| GAME_CODE_ALPHABET.contains(ch))
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One roster entry. This is both the lobby display row and the leaderboard
/// row; `score` is only ever written by the server's tally engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
        }
    }
}

/// Cosmetic session theme. Does not affect scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CelebrationType {
    #[default]
    Farewell,
    Birthday,
    TeamFun,
}

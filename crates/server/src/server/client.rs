//! Per-connection session state.

use std::net::SocketAddr;
use std::time::Instant;

use protocol::{GameCode, PlayerId};

/// A connected client session. Game-level data (name, score, roles) lives on
/// the session roster; this record only ties the socket to its room.
#[derive(Debug)]
pub struct Client {
    /// Connection identifier, stable for the connection's lifetime.
    pub id: PlayerId,
    /// Remote address.
    pub addr: SocketAddr,
    /// The session this connection created or joined, if any.
    pub room: Option<GameCode>,
    /// Last activity timestamp.
    pub last_activity: Instant,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            room: None,
            last_activity: Instant::now(),
        }
    }

    /// Update activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

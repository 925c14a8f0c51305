//! Session registry: owns the mapping from game code to session.

use std::collections::HashMap;

use protocol::{GAME_CODE_ALPHABET, GAME_CODE_LEN, GameCode, Player};
use rand::Rng;

use crate::session::Session;

/// All live sessions, keyed by game code. One registry per process; handed
/// by reference to every handler, never reached through a global.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<GameCode, Session>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with `creator` as sole player and taskmaster.
    /// Retries code generation until the code is unique.
    pub fn create_session(&mut self, creator: Player) -> GameCode {
        let mut rng = rand::rng();
        let code = loop {
            let candidate = generate_code(&mut rng);
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        self.sessions
            .insert(code.clone(), Session::new(code.clone(), creator));
        code
    }

    pub fn get(&self, code: &GameCode) -> Option<&Session> {
        self.sessions.get(code)
    }

    pub fn get_mut(&mut self, code: &GameCode) -> Option<&mut Session> {
        self.sessions.get_mut(code)
    }

    /// Tear down a session.
    pub fn remove(&mut self, code: &GameCode) -> Option<Session> {
        self.sessions.remove(code)
    }

    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn generate_code(rng: &mut impl Rng) -> GameCode {
    let alphabet = GAME_CODE_ALPHABET.as_bytes();
    let code: String = (0..GAME_CODE_LEN)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect();
    GameCode::new(code)
}

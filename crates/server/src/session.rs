//! Per-game-code session state.

use protocol::events::RosterUpdate;
use protocol::{CelebrationType, GameCode, Player, PlayerId};

use crate::rounds::game1::Game1Round;
use crate::rounds::game2::Game2Round;
use crate::rounds::game3::Game3Round;
use crate::rounds::game4::Game4Round;
use crate::timer::TimerSlots;

/// Every phase a session can be in. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Lobby,
    Game1Intro,
    Game1Running,
    Game1Pitching,
    Game2Submission,
    Game2Presentation,
    Game3Submission,
    Game3Presentation,
    Game4Submission,
    Game4Pitching,
    Game4Guessing,
    Game4Voting,
    Game4Results,
    FinalResults,
}

/// Ephemeral state of the currently active mini-game. Starting a new
/// mini-game replaces the whole value, so at most one round's ephemera
/// exists at a time and nothing leaks across rounds.
#[derive(Debug, Clone, Default)]
pub enum Round {
    #[default]
    Idle,
    Game1(Game1Round),
    Game2(Game2Round),
    Game3(Game3Round),
    Game4(Game4Round),
}

/// One independent game-code-scoped instance of the whole four-round game.
#[derive(Debug)]
pub struct Session {
    pub code: GameCode,
    pub taskmaster_id: PlayerId,
    /// Ordered, at most two, never containing the taskmaster.
    pub guests_of_honour: Vec<PlayerId>,
    /// Insertion order preserved for lobby display and tie-breaks.
    pub players: Vec<Player>,
    pub celebration_type: CelebrationType,
    pub phase: GamePhase,
    pub round: Round,
    pub timers: TimerSlots,
}

impl Session {
    pub fn new(code: GameCode, creator: Player) -> Self {
        Self {
            code,
            taskmaster_id: creator.id,
            guests_of_honour: Vec::new(),
            players: vec![creator],
            celebration_type: CelebrationType::default(),
            phase: GamePhase::Lobby,
            round: Round::Idle,
            timers: TimerSlots::new(),
        }
    }

    pub fn is_taskmaster(&self, id: PlayerId) -> bool {
        self.taskmaster_id == id
    }

    pub fn is_guest_of_honour(&self, id: PlayerId) -> bool {
        self.guests_of_honour.contains(&id)
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Toggle guest-of-honour membership. Returns `false` when nothing
    /// changed (cap reached, or the nominee is the taskmaster).
    pub fn toggle_guest_of_honour(&mut self, id: PlayerId) -> bool {
        if let Some(index) = self.guests_of_honour.iter().position(|&g| g == id) {
            self.guests_of_honour.remove(index);
            return true;
        }
        if id == self.taskmaster_id || self.guests_of_honour.len() >= 2 {
            return false;
        }
        self.guests_of_honour.push(id);
        true
    }

    /// Hand the taskmaster role to `new_master`. The new taskmaster loses
    /// guest-of-honour status; a player cannot be both.
    pub fn transfer_taskmaster(&mut self, new_master: PlayerId) {
        self.taskmaster_id = new_master;
        self.guests_of_honour.retain(|&g| g != new_master);
    }

    /// Replace the active round. Clears the previous round's ephemera,
    /// including any live countdown.
    pub fn start_round(&mut self, phase: GamePhase, round: Round) {
        self.timers = TimerSlots::new();
        self.phase = phase;
        self.round = round;
    }

    /// Canonical roster snapshot for `update-players`.
    pub fn roster_update(&self) -> RosterUpdate {
        RosterUpdate {
            players: self.players.clone(),
            taskmaster_id: self.taskmaster_id,
            guest_of_honour_ids: self.guests_of_honour.clone(),
            celebration_type: self.celebration_type,
        }
    }

    /// Leaderboard sorted descending by score. The sort is stable, so ties
    /// keep roster insertion order.
    pub fn leaderboard(&self) -> Vec<Player> {
        let mut sorted = self.players.clone();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted
    }
}

//! Central event dispatch and the timer tick loop.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use protocol::{CelebrationType, ClientEvent, GameCode, Player, PlayerId, ServerEvent};
use tokio::sync::{RwLock, broadcast};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::registry::Registry;
use crate::session::{GamePhase, Session};
use crate::timer::TimerKind;

use super::client::Client;

/// An event addressed to every member of one room.
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub code: GameCode,
    pub event: ServerEvent,
}

/// An event addressed to a single connection.
#[derive(Debug, Clone)]
pub struct DirectEvent {
    pub to: PlayerId,
    pub event: ServerEvent,
}

/// Fan-out handles shared with every connection task. Send failures mean no
/// receiver is subscribed yet, which is fine — nobody is listening.
#[derive(Debug, Clone)]
pub struct Outbox {
    room_tx: broadcast::Sender<RoomEvent>,
    direct_tx: broadcast::Sender<DirectEvent>,
}

impl Outbox {
    pub fn new(
        room_tx: broadcast::Sender<RoomEvent>,
        direct_tx: broadcast::Sender<DirectEvent>,
    ) -> Self {
        Self { room_tx, direct_tx }
    }

    /// Multicast to a room.
    pub fn room(&self, code: &GameCode, event: ServerEvent) {
        let _ = self.room_tx.send(RoomEvent {
            code: code.clone(),
            event,
        });
    }

    /// Address one connection.
    pub fn direct(&self, to: PlayerId, event: ServerEvent) {
        let _ = self.direct_tx.send(DirectEvent { to, event });
    }

    /// The canonical roster broadcast sent after every player/role/type
    /// mutation.
    pub fn roster(&self, session: &Session) {
        self.room(
            &session.code,
            ServerEvent::UpdatePlayers(session.roster_update()),
        );
    }
}

/// What a handler did with an event. Everything except `Handled` is silent
/// on the wire (a failed join additionally answers `join-error`); the
/// variants exist so tests and logs can tell the no-ops apart.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State mutated and/or events emitted.
    Handled,
    /// Unknown game code.
    NotFound,
    /// Actor is not the taskmaster (or not the holder) for this action.
    Unauthorized,
    /// The event does not apply to the session's current phase.
    InvalidPhase,
    /// Refused on its merits: validation failure, cap reached, or a timer
    /// already running.
    Rejected,
}

/// Resolve a session and require `actor` to be its taskmaster. The shared
/// guard for every taskmaster-triggered transition.
pub(crate) fn taskmaster_session<'a>(
    registry: &'a mut Registry,
    code: &GameCode,
    actor: PlayerId,
) -> Result<&'a mut Session, Outcome> {
    let Some(session) = registry.get_mut(code) else {
        return Err(Outcome::NotFound);
    };
    if !session.is_taskmaster(actor) {
        return Err(Outcome::Unauthorized);
    }
    Ok(session)
}

/// The single-threaded dispatcher. All inbound events and timer ticks
/// mutate state through one write lock, so each handler runs to completion
/// with no interleaving inside a session.
pub struct Hub {
    pub config: Config,
    pub(crate) registry: Registry,
    pub(crate) outbox: Outbox,
    clients: HashMap<PlayerId, Client>,
    next_client_id: u32,
}

impl Hub {
    pub fn new(config: Config, outbox: Outbox) -> Self {
        Self {
            config,
            registry: Registry::new(),
            outbox,
            clients: HashMap::new(),
            next_client_id: 1,
        }
    }

    /// Register a new connection.
    pub fn add_client(&mut self, addr: SocketAddr) -> PlayerId {
        let id = PlayerId(self.next_client_id);
        self.next_client_id += 1;
        self.clients.insert(id, Client::new(id, addr));
        info!("Client {} connected from {}", id, addr);
        id
    }

    /// Drop a connection record. Session rosters are deliberately not
    /// pruned; a departed player stays on the leaderboard.
    pub fn remove_client(&mut self, id: PlayerId) {
        if let Some(client) = self.clients.remove(&id) {
            info!("Client {} ({}) disconnected", id, client.addr);
        }
    }

    /// The room this connection has joined, if any.
    pub fn room_of(&self, id: PlayerId) -> Option<GameCode> {
        self.clients.get(&id).and_then(|c| c.room.clone())
    }

    /// Decode and dispatch one inbound text frame. Returns the client's
    /// current room so the connection task can filter broadcasts. Malformed
    /// frames are logged and dropped; they never tear anything down.
    pub fn handle_frame(&mut self, id: PlayerId, frame: &str) -> Option<GameCode> {
        match ClientEvent::parse(frame) {
            Ok(event) => {
                debug!("Client {} sent {:?}", id, event);
                if let Some(client) = self.clients.get_mut(&id) {
                    client.touch();
                }
                let outcome = self.handle_event(id, event);
                if outcome != Outcome::Handled {
                    debug!("Client {} event ignored: {:?}", id, outcome);
                }
            }
            Err(e) => {
                warn!("Client {} sent malformed frame: {}", id, e);
            }
        }
        self.room_of(id)
    }

    /// Dispatch one parsed event to its handler.
    pub fn handle_event(&mut self, actor: PlayerId, event: ClientEvent) -> Outcome {
        use ClientEvent::*;
        match event {
            CreateGame { name } => self.handle_create_game(actor, name),
            JoinGame { code, name } => self.handle_join_game(actor, code, name),
            NominateGoh { code, player_id } => self.handle_nominate_goh(actor, code, player_id),
            SetCelebrationType { code, celebration } => {
                self.handle_set_celebration_type(actor, code, celebration)
            }
            TransferTaskmaster {
                code,
                new_master_id,
            } => self.handle_transfer_taskmaster(actor, code, new_master_id),

            StartGame { code } => self.handle_start_game(actor, code),
            StartTimer { code } => self.handle_start_timer(actor, code),
            NextPitcher { code } => self.handle_next_pitcher(actor, code),
            StartPitchTimer { code } => self.handle_start_pitch_timer(actor, code),
            CastVote { code, emoji } => self.handle_cast_vote(actor, code, emoji),
            TallyVotes { code } => self.handle_tally_votes(actor, code),

            StartGame2 { code } => self.handle_start_game2(actor, code),
            SubmitEmoji { code, submission } => self.handle_submit_emoji(actor, code, submission),
            ShowSubmissions { code } => self.handle_show_submissions(actor, code),
            NextSubmission { code } => self.handle_next_submission(actor, code),
            CastVoteGame2 { code, emoji } => self.handle_cast_vote_game2(actor, code, emoji),
            TallyVotesGame2 { code } => self.handle_tally_votes_game2(actor, code),

            StartGame3 { code } => self.handle_start_game3(actor, code),
            SubmitWrongAnswers { code, answers } => {
                self.handle_submit_wrong_answers(actor, code, answers)
            }
            ShowWrongAnswers { code } => self.handle_show_wrong_answers(actor, code),
            NextWrongAnswer { code } => self.handle_next_wrong_answer(actor, code),
            CastVoteGame3 { code, emoji } => self.handle_cast_vote_game3(actor, code, emoji),
            TallyVotesGame3 { code } => self.handle_tally_votes_game3(actor, code),

            StartGame4 { code } => self.handle_start_game4(actor, code),
            SubmitMyMug { code, contents } => self.handle_submit_my_mug(actor, code, contents),
            NextMugHolder { code } => self.handle_next_mug_holder(actor, code),
            StartPitchTimerGame4 { code } => self.handle_start_pitch_timer_game4(actor, code),
            SubmitMugGuess { code, guess } => self.handle_submit_mug_guess(actor, code, guess),
            RevealAllGuesses { code } => self.handle_reveal_all_guesses(actor, code),
            MarkGuessCorrect { code, guesser_id } => {
                self.handle_mark_guess_correct(actor, code, guesser_id)
            }
            CastVoteGame4 {
                code,
                guesser_id,
                emoji,
            } => self.handle_cast_vote_game4(actor, code, guesser_id, emoji),
            TallyVotesGame4 { code } => self.handle_tally_votes_game4(actor, code),

            EndGameEarly { code } => self.handle_end_game_early(actor, code),
        }
    }

    // --- Lobby and roles ---

    fn handle_create_game(&mut self, actor: PlayerId, name: String) -> Outcome {
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Rejected;
        }

        let code = self.registry.create_session(Player::new(actor, name));
        if let Some(client) = self.clients.get_mut(&actor) {
            client.room = Some(code.clone());
        }
        info!("Client {} created session {}", actor, code);

        let Hub {
            registry, outbox, ..
        } = self;
        outbox.direct(
            actor,
            ServerEvent::GameCreated {
                game_code: code.clone(),
            },
        );
        if let Some(session) = registry.get(&code) {
            outbox.roster(session);
        }
        Outcome::Handled
    }

    fn handle_join_game(&mut self, actor: PlayerId, code: GameCode, name: String) -> Outcome {
        let name = name.trim().to_owned();
        let Hub {
            registry,
            outbox,
            clients,
            ..
        } = self;

        let Some(session) = registry.get_mut(&code) else {
            outbox.direct(actor, ServerEvent::JoinError("Game not found.".into()));
            return Outcome::NotFound;
        };
        // Late joiners mid-round are not supported.
        if session.phase != GamePhase::Lobby {
            outbox.direct(
                actor,
                ServerEvent::JoinError("Game has already started.".into()),
            );
            return Outcome::InvalidPhase;
        }
        if name.is_empty() || session.has_player(actor) {
            return Outcome::Rejected;
        }

        session.players.push(Player::new(actor, name));
        if let Some(client) = clients.get_mut(&actor) {
            client.room = Some(code.clone());
        }
        outbox.direct(
            actor,
            ServerEvent::JoinSuccessful {
                game_code: code,
                celebration_type: session.celebration_type,
            },
        );
        outbox.roster(session);
        Outcome::Handled
    }

    fn handle_nominate_goh(&mut self, actor: PlayerId, code: GameCode, nominee: PlayerId) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        if !session.has_player(nominee) {
            return Outcome::Rejected;
        }
        if !session.toggle_guest_of_honour(nominee) {
            return Outcome::Rejected;
        }
        outbox.roster(session);
        Outcome::Handled
    }

    fn handle_set_celebration_type(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        celebration: CelebrationType,
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        session.celebration_type = celebration;
        outbox.roster(session);
        Outcome::Handled
    }

    fn handle_transfer_taskmaster(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        new_master: PlayerId,
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        if !session.has_player(new_master) {
            return Outcome::Rejected;
        }
        session.transfer_taskmaster(new_master);
        outbox.roster(session);
        Outcome::Handled
    }

    fn handle_end_game_early(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        session.phase = GamePhase::FinalResults;
        outbox.room(
            &code,
            ServerEvent::ShowFinalResults {
                results: session.leaderboard(),
            },
        );
        Outcome::Handled
    }

    // --- Timers ---

    /// Advance every session's countdowns by one unit. Called once per
    /// configured interval by [`run_tick_loop`]; also driven directly by
    /// tests.
    pub fn tick(&mut self) {
        let Hub {
            registry, outbox, ..
        } = self;
        for session in registry.sessions_mut() {
            if let Some(step) = session.timers.tick(TimerKind::Main) {
                outbox.room(&session.code, ServerEvent::TimerTick(step.remaining));
                if step.finished {
                    crate::rounds::game1::on_main_timer_finished(session);
                    outbox.room(&session.code, ServerEvent::TimerFinished);
                }
            }
            if let Some(step) = session.timers.tick(TimerKind::Pitch) {
                outbox.room(&session.code, ServerEvent::PitchTimerTick(step.remaining));
                if step.finished {
                    // A Game 4 holder's pitch running out opens guessing.
                    if session.phase == GamePhase::Game4Pitching {
                        session.phase = GamePhase::Game4Guessing;
                    }
                    outbox.room(&session.code, ServerEvent::PitchTimerFinished);
                }
            }
        }
    }
}

/// Drive every session's countdowns at a fixed real-time interval.
pub async fn run_tick_loop(hub: Arc<RwLock<Hub>>, tick_interval_ms: u64) {
    let period = Duration::from_millis(tick_interval_ms.max(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        hub.write().await.tick();
    }
}

//! Game 1: the most impressive object.
//!
//! No submissions. The taskmaster opens a brainstorm countdown; when it runs
//! out a random pitching order is drawn and each pitcher in turn gets a
//! pitch countdown while everyone else votes. The tally is the score
//! baseline for the whole session.

use protocol::events::RoundDetails;
use protocol::{GameCode, Player, PlayerId, ServerEvent};
use rand::seq::SliceRandom;

use crate::scoring::{self, VoteBook};
use crate::server::hub::{Hub, Outcome, taskmaster_session};
use crate::session::{GamePhase, Round, Session};
use crate::timer::TimerKind;

const TITLE: &str = "Game 1: The most impressive object";
const INSTRUCTIONS: &str = "You have 30 seconds to find the most impressive object you can hold \
in one hand.\n\nOnce we are all back, each of us will get a chance to do a 20-second pitch to \
explain why it's impressive, weird, or emotionally significant. Be creative!";

fn details() -> RoundDetails {
    RoundDetails::new(TITLE, INSTRUCTIONS)
}

/// Ephemeral Game 1 state.
#[derive(Debug, Clone, Default)]
pub struct Game1Round {
    /// Shuffled pitching order, drawn when the brainstorm countdown ends.
    pub order: Vec<Player>,
    /// Index into `order`; `None` before the first pitcher.
    pub current: Option<usize>,
    pub votes: VoteBook,
}

impl Game1Round {
    pub fn current_pitcher(&self) -> Option<&Player> {
        self.current.and_then(|i| self.order.get(i))
    }

    /// Step to the next pitcher. `None` once the order is exhausted.
    pub fn advance(&mut self) -> Option<&Player> {
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next);
        self.order.get(next)
    }
}

/// The brainstorm countdown ran out: draw the pitching order and open
/// pitching. No-op if the session has moved on to something else.
pub(crate) fn on_main_timer_finished(session: &mut Session) {
    if !matches!(session.round, Round::Game1(_)) {
        return;
    }
    let mut order = session.players.clone();
    order.shuffle(&mut rand::rng());
    session.phase = GamePhase::Game1Pitching;
    session.round = Round::Game1(Game1Round {
        order,
        current: None,
        votes: VoteBook::new(),
    });
}

impl Hub {
    pub(crate) fn handle_start_game(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        session.start_round(GamePhase::Game1Intro, Round::Game1(Game1Round::default()));
        outbox.room(&code, ServerEvent::GameStarting(details()));
        Outcome::Handled
    }

    pub(crate) fn handle_start_timer(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, config, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        if !matches!(session.round, Round::Game1(_)) {
            return Outcome::InvalidPhase;
        }
        if !session
            .timers
            .start(TimerKind::Main, config.timers.brainstorm_secs)
        {
            return Outcome::Rejected;
        }
        session.phase = GamePhase::Game1Running;
        // Ticks go out on the hub's next tick; nothing to emit yet.
        Outcome::Handled
    }

    pub(crate) fn handle_start_pitch_timer(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, config, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        if !session.timers.start(TimerKind::Pitch, config.timers.pitch_secs) {
            return Outcome::Rejected;
        }
        Outcome::Handled
    }

    pub(crate) fn handle_next_pitcher(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        let Round::Game1(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        match round.advance().cloned() {
            Some(pitcher) => outbox.room(&code, ServerEvent::UpdatePitcher(pitcher)),
            None => outbox.room(&code, ServerEvent::PitchingFinished),
        }
        Outcome::Handled
    }

    pub(crate) fn handle_cast_vote(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        emoji: String,
    ) -> Outcome {
        let Some(session) = self.registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        if !session.has_player(actor) {
            return Outcome::Rejected;
        }
        let Round::Game1(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        let Some(pitcher_id) = round.current_pitcher().map(|p| p.id) else {
            return Outcome::InvalidPhase;
        };
        // The pitcher on stage does not vote on their own pitch.
        if pitcher_id == actor {
            return Outcome::Rejected;
        }
        scoring::cast_vote(&mut round.votes, pitcher_id, actor, emoji);
        Outcome::Handled
    }

    pub(crate) fn handle_tally_votes(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        {
            let Session {
                players,
                guests_of_honour,
                round,
                ..
            } = session;
            let Round::Game1(round) = round else {
                return Outcome::InvalidPhase;
            };
            // Game 1 is the baseline: wipe scores before summing.
            scoring::tally_round(
                players,
                guests_of_honour,
                &round.votes,
                scoring::standard_points,
                true,
            );
        }
        outbox.room(&code, ServerEvent::ShowResults(session.leaderboard()));
        Outcome::Handled
    }
}

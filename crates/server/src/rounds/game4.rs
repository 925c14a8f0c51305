//! Game 4: what's in your mug?
//!
//! Everyone secretly submits their mug's real contents, then a shuffled
//! sequence of holders each pitch (bluffing allowed) while the rest guess.
//! The holder marks correct guesses, the room votes on the guesses, and the
//! taskmaster tallies each holder's round before moving on. After the last
//! holder the cumulative final leaderboard goes out.

use protocol::events::{GuessView, GuessVote, RoundDetails};
use protocol::{GameCode, Player, PlayerId, ServerEvent};
use rand::seq::SliceRandom;

use crate::book::Book;
use crate::scoring::{self, MUG_VOTE_EMOJIS, POKER_FACE_BONUS};
use crate::server::hub::{Hub, Outcome, taskmaster_session};
use crate::session::{GamePhase, Round, Session};
use crate::timer::TimerKind;

const TITLE: &str = "Game 4: What's in Your Mug?";
const INSTRUCTIONS: &str = "First, everyone secretly submit what's *actually* in your mug.\n\n\
Then, one by one, a person will be chosen. They will have 10 seconds to pitch what's in their \
mug (you can bluff!). Everyone else will guess what's inside. Let's see who can fool the room!";

fn details() -> RoundDetails {
    RoundDetails::new(TITLE, INSTRUCTIONS)
}

/// One player's guess at the current holder's mug, with its live votes.
#[derive(Debug, Clone)]
pub struct MugGuess {
    pub guess: String,
    pub author: Player,
    /// Voter id -> emoji; an entry can be toggled off again.
    pub votes: Book<String>,
}

/// Ephemeral Game 4 state. The guess/vote/mark books are per-holder and
/// reset every time the sequence advances.
#[derive(Debug, Clone, Default)]
pub struct Game4Round {
    /// Everyone's secret mug contents.
    pub mug_contents: Book<String>,
    /// Shuffled holder sequence, fixed at round start.
    pub holder_order: Vec<Player>,
    pub current: Option<usize>,
    /// Guesser id -> guess, for the current holder.
    pub guesses: Book<MugGuess>,
    /// Guessers the current holder has marked correct.
    pub correct_guessers: Vec<PlayerId>,
    /// Symbol order dealt for the current holder.
    pub emojis: Vec<String>,
}

impl Game4Round {
    pub fn current_holder(&self) -> Option<&Player> {
        self.current.and_then(|i| self.holder_order.get(i))
    }

    pub fn advance(&mut self) -> Option<&Player> {
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next);
        self.holder_order.get(next)
    }
}

fn guess_views(guesses: &Book<MugGuess>) -> Vec<GuessView> {
    guesses
        .iter()
        .map(|(guesser_id, g)| GuessView {
            guesser_id,
            guess: g.guess.clone(),
            author: g.author.clone(),
            votes: g
                .votes
                .iter()
                .map(|(voter_id, emoji)| GuessVote {
                    voter_id,
                    emoji: emoji.clone(),
                })
                .collect(),
        })
        .collect()
}

impl Hub {
    pub(crate) fn handle_start_game4(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };

        let mut holder_order = session.players.clone();
        holder_order.shuffle(&mut rand::rng());
        session.start_round(
            GamePhase::Game4Submission,
            Round::Game4(Game4Round {
                holder_order,
                ..Game4Round::default()
            }),
        );
        outbox.room(&code, ServerEvent::Game4Starting(details()));
        Outcome::Handled
    }

    pub(crate) fn handle_submit_my_mug(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        contents: String,
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let Some(session) = registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        if session.phase != GamePhase::Game4Submission {
            return Outcome::InvalidPhase;
        }
        if !session.has_player(actor) || contents.trim().is_empty() {
            return Outcome::Rejected;
        }
        let total = session.players.len();
        let Round::Game4(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };

        round.mug_contents.insert(actor, contents);
        outbox.direct(actor, ServerEvent::SubmissionReceived);
        outbox.room(
            &code,
            ServerEvent::UpdateSubmissionCount {
                submitted: round.mug_contents.len(),
                total,
            },
        );
        Outcome::Handled
    }

    pub(crate) fn handle_next_mug_holder(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        let Session { round, phase, .. } = session;
        let Round::Game4(round) = round else {
            return Outcome::InvalidPhase;
        };

        match round.advance().cloned() {
            Some(holder) => {
                // Fresh books for the new holder.
                round.guesses = Book::new();
                round.correct_guessers = Vec::new();
                let mut emojis: Vec<String> =
                    MUG_VOTE_EMOJIS.iter().map(|e| e.to_string()).collect();
                emojis.shuffle(&mut rand::rng());
                round.emojis = emojis.clone();
                *phase = GamePhase::Game4Pitching;
                outbox.room(&code, ServerEvent::UpdateMugHolder { holder, emojis });
            }
            None => {
                *phase = GamePhase::FinalResults;
                outbox.room(
                    &code,
                    ServerEvent::ShowFinalResults {
                        results: session.leaderboard(),
                    },
                );
            }
        }
        Outcome::Handled
    }

    pub(crate) fn handle_start_pitch_timer_game4(
        &mut self,
        actor: PlayerId,
        code: GameCode,
    ) -> Outcome {
        let Hub {
            registry, config, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        if !matches!(session.round, Round::Game4(_)) {
            return Outcome::InvalidPhase;
        }
        if !session
            .timers
            .start(TimerKind::Pitch, config.timers.mug_pitch_secs)
        {
            return Outcome::Rejected;
        }
        Outcome::Handled
    }

    pub(crate) fn handle_submit_mug_guess(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        guess: String,
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let Some(session) = registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        if !matches!(
            session.phase,
            GamePhase::Game4Pitching | GamePhase::Game4Guessing
        ) {
            return Outcome::InvalidPhase;
        }
        if guess.trim().is_empty() {
            return Outcome::Rejected;
        }
        let Session { players, round, .. } = session;
        let Some(author) = players.iter().find(|p| p.id == actor).cloned() else {
            return Outcome::Rejected;
        };
        let total = players.len().saturating_sub(1);
        let Round::Game4(round) = round else {
            return Outcome::InvalidPhase;
        };
        let Some(holder_id) = round.current_holder().map(|p| p.id) else {
            return Outcome::InvalidPhase;
        };
        // The holder knows what's in their own mug.
        if holder_id == actor {
            return Outcome::Rejected;
        }

        round.guesses.insert(
            actor,
            MugGuess {
                guess,
                author,
                votes: Book::new(),
            },
        );
        outbox.direct(actor, ServerEvent::SubmissionReceived);
        outbox.room(
            &code,
            ServerEvent::UpdateSubmissionCount {
                submitted: round.guesses.len(),
                total,
            },
        );
        Outcome::Handled
    }

    pub(crate) fn handle_reveal_all_guesses(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        let Session { round, phase, .. } = session;
        let Round::Game4(round) = round else {
            return Outcome::InvalidPhase;
        };
        let Some(holder_id) = round.current_holder().map(|p| p.id) else {
            return Outcome::InvalidPhase;
        };

        *phase = GamePhase::Game4Voting;
        outbox.room(
            &code,
            ServerEvent::ShowAllGuesses {
                guesses: guess_views(&round.guesses),
                actual_contents: round.mug_contents.get(holder_id).cloned(),
            },
        );
        Outcome::Handled
    }

    pub(crate) fn handle_mark_guess_correct(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        guesser_id: PlayerId,
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let Some(session) = registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        let Round::Game4(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        let Some(holder_id) = round.current_holder().map(|p| p.id) else {
            return Outcome::InvalidPhase;
        };
        // Only the holder knows which guesses are right.
        if actor != holder_id {
            return Outcome::Unauthorized;
        }
        if !round.guesses.contains(guesser_id) {
            return Outcome::Rejected;
        }

        if let Some(index) = round.correct_guessers.iter().position(|&g| g == guesser_id) {
            round.correct_guessers.remove(index);
        } else {
            round.correct_guessers.push(guesser_id);
        }
        outbox.room(
            &code,
            ServerEvent::UpdateCorrectGuessers(round.correct_guessers.clone()),
        );
        Outcome::Handled
    }

    pub(crate) fn handle_cast_vote_game4(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        guesser_id: PlayerId,
        emoji: Option<String>,
    ) -> Outcome {
        let Some(session) = self.registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        if !session.has_player(actor) {
            return Outcome::Rejected;
        }
        if session.phase != GamePhase::Game4Voting {
            return Outcome::InvalidPhase;
        }
        let Round::Game4(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        let Some(holder_id) = round.current_holder().map(|p| p.id) else {
            return Outcome::InvalidPhase;
        };
        if actor == holder_id {
            return Outcome::Unauthorized;
        }
        let Some(guess) = round.guesses.get_mut(guesser_id) else {
            return Outcome::Rejected;
        };

        match emoji {
            Some(emoji) => guess.votes.insert(actor, emoji),
            // Toggled off: clear this voter's entry entirely.
            None => {
                guess.votes.remove(actor);
            }
        }
        let views = guess_views(&round.guesses);
        self.outbox
            .room(&code, ServerEvent::UpdateAllGuesses { guesses: views });
        Outcome::Handled
    }

    pub(crate) fn handle_tally_votes_game4(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };

        let (holder, correct_names) = {
            let Session {
                players,
                guests_of_honour,
                round,
                phase,
                ..
            } = session;
            let Round::Game4(round) = round else {
                return Outcome::InvalidPhase;
            };
            let Some(holder) = round.current_holder().cloned() else {
                return Outcome::InvalidPhase;
            };

            scoring::tally_mug_round(
                players,
                guests_of_honour,
                holder.id,
                &round.correct_guessers,
                round.guesses.iter().map(|(id, g)| (id, &g.votes)),
            );
            let correct_names: Vec<String> = players
                .iter()
                .filter(|p| round.correct_guessers.contains(&p.id))
                .map(|p| p.name.clone())
                .collect();
            *phase = GamePhase::Game4Results;
            (holder, correct_names)
        };

        outbox.room(
            &code,
            ServerEvent::ShowGame4RoundResults {
                mug_holder: holder,
                poker_face_bonus: POKER_FACE_BONUS,
                correct_guessers: correct_names,
            },
        );
        // Scores changed; re-sync the roster.
        outbox.roster(session);
        Outcome::Handled
    }
}

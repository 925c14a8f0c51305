//! Game 2: recreate your colleague in emoji.
//!
//! A content-producing round: everyone with a target writes an emoji
//! portrait of them, the taskmaster reveals the portraits one at a time in a
//! random order, and the room votes live on each. Guests of honour may be
//! exempt from contributing, per the assignment plan.

use protocol::events::RoundDetails;
use protocol::{GameCode, Player, PlayerId, ServerEvent};
use rand::seq::SliceRandom;

use crate::assign::assign_targets;
use crate::book::Book;
use crate::scoring::{self, VoteBook};
use crate::server::hub::{Hub, Outcome, taskmaster_session};
use crate::session::{GamePhase, Round, Session};

const TITLE: &str = "Game 2: Recreate in Emoji";
const INSTRUCTIONS: &str = "Use only emojis to describe the person below. Think about their \
personality, quirks, habits, and legacy. Submit your emoji masterpiece!";

fn details() -> RoundDetails {
    RoundDetails::new(TITLE, INSTRUCTIONS)
}

/// Ephemeral Game 2 state.
#[derive(Debug, Clone, Default)]
pub struct Game2Round {
    /// Author id -> the player they describe.
    pub assignments: Book<Player>,
    pub total_to_submit: usize,
    /// Author id -> emoji text, insertion-ordered.
    pub submissions: Book<String>,
    /// Shuffled reveal order over the authors who actually submitted.
    pub order: Vec<Player>,
    pub current: Option<usize>,
    pub votes: VoteBook,
}

impl Game2Round {
    pub fn current_author(&self) -> Option<&Player> {
        self.current.and_then(|i| self.order.get(i))
    }

    pub fn advance(&mut self) -> Option<&Player> {
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next);
        self.order.get(next)
    }
}

impl Hub {
    pub(crate) fn handle_start_game2(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };

        let plan = assign_targets(
            &session.players,
            &session.guests_of_honour,
            &mut rand::rng(),
        );
        let total = plan.total_to_submit;

        // Everyone learns their own target privately; an exempt guest of
        // honour just gets the intro.
        for player in &session.players {
            outbox.direct(
                player.id,
                ServerEvent::Game2Starting {
                    details: details(),
                    target: plan.targets.get(player.id).cloned(),
                },
            );
        }

        session.start_round(
            GamePhase::Game2Submission,
            Round::Game2(Game2Round {
                assignments: plan.targets,
                total_to_submit: total,
                ..Game2Round::default()
            }),
        );
        outbox.room(
            &code,
            ServerEvent::UpdateSubmissionCount {
                submitted: 0,
                total,
            },
        );
        Outcome::Handled
    }

    pub(crate) fn handle_submit_emoji(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        submission: String,
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let Some(session) = registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        if session.phase != GamePhase::Game2Submission {
            return Outcome::InvalidPhase;
        }
        let Round::Game2(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        if submission.trim().is_empty() {
            return Outcome::Rejected;
        }
        // Only players the plan expects content from may submit.
        if !round.assignments.contains(actor) {
            return Outcome::Rejected;
        }

        round.submissions.insert(actor, submission);
        outbox.direct(actor, ServerEvent::SubmissionReceived);
        outbox.room(
            &code,
            ServerEvent::UpdateSubmissionCount {
                submitted: round.submissions.len(),
                total: round.total_to_submit,
            },
        );
        Outcome::Handled
    }

    pub(crate) fn handle_show_submissions(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        let Session {
            players,
            round,
            phase,
            ..
        } = session;
        let Round::Game2(round) = round else {
            return Outcome::InvalidPhase;
        };

        let mut order: Vec<Player> = players
            .iter()
            .filter(|p| round.submissions.contains(p.id))
            .cloned()
            .collect();
        order.shuffle(&mut rand::rng());

        round.order = order;
        round.current = None;
        round.votes = VoteBook::new();
        *phase = GamePhase::Game2Presentation;

        outbox.room(&code, ServerEvent::PresentationStarting);
        Outcome::Handled
    }

    pub(crate) fn handle_next_submission(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        let Round::Game2(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        match round.advance().cloned() {
            Some(author) => {
                let emojis = round.submissions.get(author.id).cloned().unwrap_or_default();
                outbox.room(&code, ServerEvent::UpdateSubmission { author, emojis });
            }
            None => outbox.room(&code, ServerEvent::SubmissionFinished),
        }
        Outcome::Handled
    }

    pub(crate) fn handle_cast_vote_game2(
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
        let Round::Game2(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        let Some(author_id) = round.current_author().map(|p| p.id) else {
            return Outcome::InvalidPhase;
        };
        if author_id == actor {
            return Outcome::Rejected;
        }
        scoring::cast_vote(&mut round.votes, author_id, actor, emoji);
        Outcome::Handled
    }

    pub(crate) fn handle_tally_votes_game2(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
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
            let Round::Game2(round) = round else {
                return Outcome::InvalidPhase;
            };
            let round_scores = scoring::tally_round(
                players,
                guests_of_honour,
                &round.votes,
                scoring::standard_points,
                false,
            );
            let guest_submitted = guests_of_honour
                .first()
                .is_some_and(|g| round.submissions.contains(*g));
            scoring::apply_lone_guest_bonus(
                players,
                guests_of_honour,
                guest_submitted,
                &round_scores,
            );
        }
        outbox.room(&code, ServerEvent::ShowResultsGame2(session.leaderboard()));
        Outcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::hub::testing::*;
    use protocol::ClientEvent;

    /// Full Game 2 flow with one exempt guest of honour: assignment fan-out,
    /// submission gating, reveal order, live votes, tally with doubling and
    /// the averaging bonus.
    #[test]
    fn test_game2_flow_with_lone_guest() {
        let (mut hub, mut room_rx, mut direct_rx) = hub();
        let (code, ids) = session_of(&mut hub, &mut direct_rx, &["Ana", "Ben", "Cid", "Gem"]);
        let tm = ids[0];
        let guest = ids[3];

        assert_eq!(
            hub.handle_event(
                tm,
                ClientEvent::NominateGoh {
                    code: code.clone(),
                    player_id: guest,
                },
            ),
            Outcome::Handled
        );
        drain_room(&mut room_rx);
        drain_direct(&mut direct_rx);

        assert_eq!(
            hub.handle_event(tm, ClientEvent::StartGame2 { code: code.clone() }),
            Outcome::Handled
        );

        // Everyone but the guest is pointed at the guest; the guest only
        // gets the intro.
        let starts = drain_direct(&mut direct_rx);
        for (to, event) in &starts {
            let ServerEvent::Game2Starting { target, .. } = event else {
                panic!("unexpected direct event {event:?}");
            };
            if *to == guest {
                assert!(target.is_none());
            } else {
                assert_eq!(target.as_ref().map(|t| t.id), Some(guest));
            }
        }
        assert_eq!(starts.len(), 4);
        assert!(drain_room(&mut room_rx).iter().any(|e| matches!(
            e,
            ServerEvent::UpdateSubmissionCount {
                submitted: 0,
                total: 3,
            }
        )));

        // The exempt guest cannot submit; blanks are refused too.
        assert_eq!(
            hub.handle_event(
                guest,
                ClientEvent::SubmitEmoji {
                    code: code.clone(),
                    submission: "🦄".into(),
                },
            ),
            Outcome::Rejected
        );
        assert_eq!(
            hub.handle_event(
                ids[1],
                ClientEvent::SubmitEmoji {
                    code: code.clone(),
                    submission: "   ".into(),
                },
            ),
            Outcome::Rejected
        );

        for &author in &ids[..3] {
            assert_eq!(
                hub.handle_event(
                    author,
                    ClientEvent::SubmitEmoji {
                        code: code.clone(),
                        submission: format!("🎈 from {author}"),
                    },
                ),
                Outcome::Handled
            );
        }
        assert!(drain_room(&mut room_rx).iter().any(|e| matches!(
            e,
            ServerEvent::UpdateSubmissionCount {
                submitted: 3,
                total: 3,
            }
        )));

        assert_eq!(
            hub.handle_event(tm, ClientEvent::ShowSubmissions { code: code.clone() }),
            Outcome::Handled
        );
        assert!(
            drain_room(&mut room_rx)
                .iter()
                .any(|e| matches!(e, ServerEvent::PresentationStarting))
        );

        // Reveal all three; on each, the guest votes 😂 (doubled to 2) and
        // one ordinary non-author votes ⭐ (3), so every author earns 5.
        let mut revealed = Vec::new();
        for _ in 0..3 {
            assert_eq!(
                hub.handle_event(tm, ClientEvent::NextSubmission { code: code.clone() }),
                Outcome::Handled
            );
            let author = drain_room(&mut room_rx)
                .into_iter()
                .find_map(|e| match e {
                    ServerEvent::UpdateSubmission { author, emojis } => Some((author, emojis)),
                    _ => None,
                })
                .expect("submission revealed");
            assert_eq!(author.1, format!("🎈 from {}", author.0.id));
            let author = author.0;
            revealed.push(author.id);

            assert_eq!(
                hub.handle_event(
                    guest,
                    ClientEvent::CastVoteGame2 {
                        code: code.clone(),
                        emoji: "😂".into(),
                    },
                ),
                Outcome::Handled
            );
            let ordinary = ids[..3]
                .iter()
                .copied()
                .find(|&p| p != author.id)
                .expect("another contributor");
            assert_eq!(
                hub.handle_event(
                    ordinary,
                    ClientEvent::CastVoteGame2 {
                        code: code.clone(),
                        emoji: "⭐".into(),
                    },
                ),
                Outcome::Handled
            );
        }
        // Every contributor was revealed exactly once.
        let mut sorted = revealed.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);

        assert_eq!(
            hub.handle_event(tm, ClientEvent::NextSubmission { code: code.clone() }),
            Outcome::Handled
        );
        assert!(
            drain_room(&mut room_rx)
                .iter()
                .any(|e| matches!(e, ServerEvent::SubmissionFinished))
        );

        assert_eq!(
            hub.handle_event(tm, ClientEvent::TallyVotesGame2 { code }),
            Outcome::Handled
        );
        let results = drain_room(&mut room_rx)
            .into_iter()
            .find_map(|e| match e {
                ServerEvent::ShowResultsGame2(results) => Some(results),
                _ => None,
            })
            .expect("results");

        // Guest: mean(5, 5, 5) + 3 = 8; contributors 5 each, roster order.
        let summary: Vec<_> = results.iter().map(|p| (p.name.as_str(), p.score)).collect();
        assert_eq!(
            summary,
            vec![("Gem", 8), ("Ana", 5), ("Ben", 5), ("Cid", 5)]
        );
    }
}

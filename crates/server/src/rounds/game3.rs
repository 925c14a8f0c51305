//! Game 3: wrong answers only.
//!
//! Same shape as Game 2, but each submission carries exactly three answers
//! to three fixed prompts personalized with the target's name, and voting
//! uses a five-symbol set whose display order is reshuffled each round.

use protocol::events::RoundDetails;
use protocol::{GameCode, Player, PlayerId, ServerEvent};
use rand::seq::SliceRandom;

use crate::assign::assign_targets;
use crate::book::Book;
use crate::scoring::{self, VoteBook, WRONG_ANSWER_VOTE_EMOJIS};
use crate::server::hub::{Hub, Outcome, taskmaster_session};
use crate::session::{GamePhase, Round, Session};

const TITLE: &str = "Game 3: Wrong Answers Only";
const INSTRUCTIONS: &str = "Answer these questions about the person below, but with the \
wrongest answers you can think of. The more hilarious and absurd, the better!";

const QUESTIONS: [&str; 3] = [
    "What was [NAME] actually hired to do?",
    "What does our department even do?",
    "What will [NAME] do next in life?",
];

fn details() -> RoundDetails {
    RoundDetails::new(TITLE, INSTRUCTIONS)
}

/// The fixed prompts with `[NAME]` replaced by the target's name.
pub fn personalized_questions(target_name: &str) -> Vec<String> {
    QUESTIONS
        .iter()
        .map(|q| q.replace("[NAME]", target_name))
        .collect()
}

/// Ephemeral Game 3 state.
#[derive(Debug, Clone, Default)]
pub struct Game3Round {
    /// Author id -> the player they answer about.
    pub assignments: Book<Player>,
    pub total_to_submit: usize,
    /// Author id -> three wrong answers, insertion-ordered.
    pub submissions: Book<[String; 3]>,
    /// Shuffled reveal order over the authors who actually submitted.
    pub order: Vec<Player>,
    pub current: Option<usize>,
    pub votes: VoteBook,
}

impl Game3Round {
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
    pub(crate) fn handle_start_game3(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
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

        for player in &session.players {
            let target = plan.targets.get(player.id).cloned();
            let questions = target
                .as_ref()
                .map(|t| personalized_questions(&t.name))
                .unwrap_or_default();
            outbox.direct(
                player.id,
                ServerEvent::Game3Starting {
                    details: details(),
                    questions,
                    target,
                },
            );
        }

        session.start_round(
            GamePhase::Game3Submission,
            Round::Game3(Game3Round {
                assignments: plan.targets,
                total_to_submit: total,
                ..Game3Round::default()
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

    pub(crate) fn handle_submit_wrong_answers(
        &mut self,
        actor: PlayerId,
        code: GameCode,
        answers: [String; 3],
    ) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let Some(session) = registry.get_mut(&code) else {
            return Outcome::NotFound;
        };
        if session.phase != GamePhase::Game3Submission {
            return Outcome::InvalidPhase;
        }
        let Round::Game3(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        if answers.iter().any(|a| a.trim().is_empty()) {
            return Outcome::Rejected;
        }
        if !round.assignments.contains(actor) {
            return Outcome::Rejected;
        }

        round.submissions.insert(actor, answers);
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

    pub(crate) fn handle_show_wrong_answers(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
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
        let Round::Game3(round) = round else {
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
        *phase = GamePhase::Game3Presentation;

        // The five symbols are dealt out in a fresh order each round.
        let mut emojis: Vec<String> =
            WRONG_ANSWER_VOTE_EMOJIS.iter().map(|e| e.to_string()).collect();
        emojis.shuffle(&mut rand::rng());
        outbox.room(&code, ServerEvent::WrongAnswersStarting { emojis });
        Outcome::Handled
    }

    pub(crate) fn handle_next_wrong_answer(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
        let Hub {
            registry, outbox, ..
        } = self;
        let session = match taskmaster_session(registry, &code, actor) {
            Ok(s) => s,
            Err(outcome) => return outcome,
        };
        let Round::Game3(round) = &mut session.round else {
            return Outcome::InvalidPhase;
        };
        match round.advance().cloned() {
            Some(author) => {
                // A revealed author always has a target and a submission;
                // degrade to a skip rather than a crash if either is gone.
                let (Some(target), Some(answers)) = (
                    round.assignments.get(author.id).cloned(),
                    round.submissions.get(author.id).cloned(),
                ) else {
                    return Outcome::InvalidPhase;
                };
                let questions = personalized_questions(&target.name);
                outbox.room(
                    &code,
                    ServerEvent::UpdateWrongAnswer {
                        author,
                        target,
                        questions,
                        answers,
                    },
                );
            }
            None => outbox.room(&code, ServerEvent::WrongAnswersFinished),
        }
        Outcome::Handled
    }

    pub(crate) fn handle_cast_vote_game3(
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
        let Round::Game3(round) = &mut session.round else {
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

    pub(crate) fn handle_tally_votes_game3(&mut self, actor: PlayerId, code: GameCode) -> Outcome {
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
            let Round::Game3(round) = round else {
                return Outcome::InvalidPhase;
            };
            let round_scores = scoring::tally_round(
                players,
                guests_of_honour,
                &round.votes,
                scoring::wrong_answer_points,
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
        outbox.room(&code, ServerEvent::ShowResultsGame3(session.leaderboard()));
        Outcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::hub::testing::*;
    use protocol::ClientEvent;

    #[test]
    fn test_personalized_questions_substitute_the_name() {
        let questions = personalized_questions("Maya");
        assert_eq!(questions.len(), 3);
        assert!(questions[0].contains("Maya"));
        assert!(!questions[0].contains("[NAME]"));
        // The middle prompt has no name slot and stays as written.
        assert_eq!(questions[1], QUESTIONS[1]);
    }

    #[test]
    fn test_game3_flow_no_guests() {
        let (mut hub, mut room_rx, mut direct_rx) = hub();
        let (code, ids) = session_of(&mut hub, &mut direct_rx, &["Ana", "Ben", "Cid"]);
        let tm = ids[0];
        drain_room(&mut room_rx);
        drain_direct(&mut direct_rx);

        assert_eq!(
            hub.handle_event(tm, ClientEvent::StartGame3 { code: code.clone() }),
            Outcome::Handled
        );

        // Everyone has a target and prompts personalized with that target.
        let starts = drain_direct(&mut direct_rx);
        assert_eq!(starts.len(), 3);
        for (_, event) in &starts {
            let ServerEvent::Game3Starting {
                questions, target, ..
            } = event
            else {
                panic!("unexpected direct event {event:?}");
            };
            let target = target.as_ref().expect("everyone contributes");
            assert!(questions[0].contains(&target.name));
        }

        // A blank answer among the three is refused.
        assert_eq!(
            hub.handle_event(
                ids[0],
                ClientEvent::SubmitWrongAnswers {
                    code: code.clone(),
                    answers: ["a".into(), " ".into(), "c".into()],
                },
            ),
            Outcome::Rejected
        );

        for &author in &ids {
            assert_eq!(
                hub.handle_event(
                    author,
                    ClientEvent::SubmitWrongAnswers {
                        code: code.clone(),
                        answers: [
                            format!("wrong-{author}-1"),
                            format!("wrong-{author}-2"),
                            format!("wrong-{author}-3"),
                        ],
                    },
                ),
                Outcome::Handled
            );
        }

        assert_eq!(
            hub.handle_event(tm, ClientEvent::ShowWrongAnswers { code: code.clone() }),
            Outcome::Handled
        );
        let emojis = drain_room(&mut room_rx)
            .into_iter()
            .find_map(|e| match e {
                ServerEvent::WrongAnswersStarting { emojis } => Some(emojis),
                _ => None,
            })
            .expect("wrong-answers-starting");
        // The dealt symbol order is a permutation of the five-symbol set.
        let mut dealt = emojis.clone();
        dealt.sort();
        let mut expected: Vec<String> =
            WRONG_ANSWER_VOTE_EMOJIS.iter().map(|e| e.to_string()).collect();
        expected.sort();
        assert_eq!(dealt, expected);

        // Reveal all three; Ana's set earns two 🤯 (3 each), the others two
        // 🦄 (5 each).
        for _ in 0..3 {
            assert_eq!(
                hub.handle_event(tm, ClientEvent::NextWrongAnswer { code: code.clone() }),
                Outcome::Handled
            );
            let (author, answers) = drain_room(&mut room_rx)
                .into_iter()
                .find_map(|e| match e {
                    ServerEvent::UpdateWrongAnswer {
                        author, answers, ..
                    } => Some((author, answers)),
                    _ => None,
                })
                .expect("wrong answer revealed");
            assert_eq!(answers[0], format!("wrong-{}-1", author.id));

            let emoji = if author.id == ids[0] { "🤯" } else { "🦄" };
            for &voter in &ids {
                if voter == author.id {
                    continue;
                }
                assert_eq!(
                    hub.handle_event(
                        voter,
                        ClientEvent::CastVoteGame3 {
                            code: code.clone(),
                            emoji: emoji.to_owned(),
                        },
                    ),
                    Outcome::Handled
                );
            }
        }

        assert_eq!(
            hub.handle_event(tm, ClientEvent::NextWrongAnswer { code: code.clone() }),
            Outcome::Handled
        );
        assert!(
            drain_room(&mut room_rx)
                .iter()
                .any(|e| matches!(e, ServerEvent::WrongAnswersFinished))
        );

        assert_eq!(
            hub.handle_event(tm, ClientEvent::TallyVotesGame3 { code }),
            Outcome::Handled
        );
        let results = drain_room(&mut room_rx)
            .into_iter()
            .find_map(|e| match e {
                ServerEvent::ShowResultsGame3(results) => Some(results),
                _ => None,
            })
            .expect("results");
        let summary: Vec<_> = results.iter().map(|p| (p.name.as_str(), p.score)).collect();
        assert_eq!(summary, vec![("Ben", 10), ("Cid", 10), ("Ana", 6)]);
    }
}

//! Server -> client event building.

use serde::{Deserialize, Serialize};

use crate::{CelebrationType, GameCode, Player, PlayerId, ProtocolError};

/// Canonical roster snapshot broadcast after every player/role/type change.
/// There is no incremental diff protocol; this is how clients learn the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterUpdate {
    pub players: Vec<Player>,
    pub taskmaster_id: PlayerId,
    pub guest_of_honour_ids: Vec<PlayerId>,
    pub celebration_type: CelebrationType,
}

/// Title and instruction text shown when a mini-game starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundDetails {
    pub title: String,
    pub instructions: String,
}

impl RoundDetails {
    pub fn new(title: &str, instructions: &str) -> Self {
        Self {
            title: title.to_owned(),
            instructions: instructions.to_owned(),
        }
    }
}

/// One recorded vote on a Game 4 guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessVote {
    pub voter_id: PlayerId,
    pub emoji: String,
}

/// One guess in a Game 4 round, with its live vote record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessView {
    pub guesser_id: PlayerId,
    pub guess: String,
    pub author: Player,
    pub votes: Vec<GuessVote>,
}

/// Server event, addressed either to a whole room or to one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    // Lobby
    GameCreated {
        game_code: GameCode,
    },
    JoinSuccessful {
        game_code: GameCode,
        celebration_type: CelebrationType,
    },
    JoinError(String),
    UpdatePlayers(RosterUpdate),

    // Game 1
    GameStarting(RoundDetails),
    TimerTick(u32),
    TimerFinished,
    PitchTimerTick(u32),
    PitchTimerFinished,
    UpdatePitcher(Player),
    PitchingFinished,
    ShowResults(Vec<Player>),

    // Submission progress (Games 2-4)
    UpdateSubmissionCount {
        submitted: usize,
        total: usize,
    },
    SubmissionReceived,

    // Game 2
    #[serde(rename = "game-2-starting")]
    Game2Starting {
        #[serde(flatten)]
        details: RoundDetails,
        target: Option<Player>,
    },
    PresentationStarting,
    UpdateSubmission {
        author: Player,
        emojis: String,
    },
    SubmissionFinished,
    ShowResultsGame2(Vec<Player>),

    // Game 3
    #[serde(rename = "game-3-starting")]
    Game3Starting {
        #[serde(flatten)]
        details: RoundDetails,
        questions: Vec<String>,
        target: Option<Player>,
    },
    WrongAnswersStarting {
        emojis: Vec<String>,
    },
    UpdateWrongAnswer {
        author: Player,
        target: Player,
        questions: Vec<String>,
        answers: [String; 3],
    },
    WrongAnswersFinished,
    ShowResultsGame3(Vec<Player>),

    // Game 4
    #[serde(rename = "game-4-starting")]
    Game4Starting(RoundDetails),
    UpdateMugHolder {
        holder: Player,
        emojis: Vec<String>,
    },
    UpdateAllGuesses {
        guesses: Vec<GuessView>,
    },
    ShowAllGuesses {
        guesses: Vec<GuessView>,
        actual_contents: Option<String>,
    },
    UpdateCorrectGuessers(Vec<PlayerId>),
    ShowGame4RoundResults {
        mug_holder: Player,
        poker_face_bonus: u32,
        correct_guessers: Vec<String>,
    },
    ShowFinalResults {
        results: Vec<Player>,
    },
}

impl ServerEvent {
    /// Encode the event as a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, name: &str, score: u32) -> Player {
        Player {
            id: PlayerId(id),
            name: name.to_owned(),
            score,
        }
    }

    #[test]
    fn test_bare_value_payloads() {
        let frame = ServerEvent::TimerTick(30).encode().unwrap();
        assert_eq!(frame, r#"{"event":"timer-tick","data":30}"#);

        let frame = ServerEvent::TimerFinished.encode().unwrap();
        assert_eq!(frame, r#"{"event":"timer-finished"}"#);
    }

    #[test]
    fn test_leaderboard_is_a_bare_array() {
        let frame = ServerEvent::ShowResults(vec![player(1, "A", 6), player(2, "B", 4)])
            .encode()
            .unwrap();
        assert_eq!(
            frame,
            r#"{"event":"show-results","data":[{"id":1,"name":"A","score":6},{"id":2,"name":"B","score":4}]}"#
        );
    }

    #[test]
    fn test_round_details_flatten_into_starting_payload() {
        let event = ServerEvent::Game2Starting {
            details: RoundDetails::new("t", "i"),
            target: Some(player(3, "Maya", 0)),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "game-2-starting");
        assert_eq!(value["data"]["title"], "t");
        assert_eq!(value["data"]["instructions"], "i");
        assert_eq!(value["data"]["target"]["name"], "Maya");
    }

    #[test]
    fn test_roster_update_field_names() {
        let event = ServerEvent::UpdatePlayers(RosterUpdate {
            players: vec![player(1, "A", 0)],
            taskmaster_id: PlayerId(1),
            guest_of_honour_ids: vec![],
            celebration_type: CelebrationType::Farewell,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["data"]["taskmasterId"], 1);
        assert_eq!(value["data"]["celebrationType"], "farewell");
        assert!(value["data"]["guestOfHonourIds"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let event = ServerEvent::UpdateMugHolder {
            holder: player(2, "B", 9),
            emojis: vec!["🎉".into(), "👍".into()],
        };
        let frame = event.encode().unwrap();
        let back: ServerEvent = serde_json::from_str(&frame).unwrap();
        assert_eq!(back, event);
    }
}

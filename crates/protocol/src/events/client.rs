//! Client -> server event parsing.

use serde::{Deserialize, Serialize};

use crate::{CelebrationType, GameCode, PlayerId, ProtocolError};

/// Parsed client event. Every event except `create-game` addresses an
/// existing session by game code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    // Lobby and roles
    CreateGame {
        name: String,
    },
    JoinGame {
        code: GameCode,
        name: String,
    },
    NominateGoh {
        code: GameCode,
        player_id: PlayerId,
    },
    SetCelebrationType {
        code: GameCode,
        #[serde(rename = "type")]
        celebration: CelebrationType,
    },
    TransferTaskmaster {
        code: GameCode,
        new_master_id: PlayerId,
    },

    // Game 1: impressive object
    StartGame {
        code: GameCode,
    },
    StartTimer {
        code: GameCode,
    },
    NextPitcher {
        code: GameCode,
    },
    StartPitchTimer {
        code: GameCode,
    },
    CastVote {
        code: GameCode,
        emoji: String,
    },
    TallyVotes {
        code: GameCode,
    },

    // Game 2: emoji description
    #[serde(rename = "start-game-2")]
    StartGame2 {
        code: GameCode,
    },
    SubmitEmoji {
        code: GameCode,
        submission: String,
    },
    ShowSubmissions {
        code: GameCode,
    },
    NextSubmission {
        code: GameCode,
    },
    CastVoteGame2 {
        code: GameCode,
        emoji: String,
    },
    TallyVotesGame2 {
        code: GameCode,
    },

    // Game 3: wrong answers only
    #[serde(rename = "start-game-3")]
    StartGame3 {
        code: GameCode,
    },
    SubmitWrongAnswers {
        code: GameCode,
        answers: [String; 3],
    },
    ShowWrongAnswers {
        code: GameCode,
    },
    NextWrongAnswer {
        code: GameCode,
    },
    CastVoteGame3 {
        code: GameCode,
        emoji: String,
    },
    TallyVotesGame3 {
        code: GameCode,
    },

    // Game 4: mug guessing
    #[serde(rename = "start-game-4")]
    StartGame4 {
        code: GameCode,
    },
    SubmitMyMug {
        code: GameCode,
        contents: String,
    },
    NextMugHolder {
        code: GameCode,
    },
    StartPitchTimerGame4 {
        code: GameCode,
    },
    SubmitMugGuess {
        code: GameCode,
        guess: String,
    },
    RevealAllGuesses {
        code: GameCode,
    },
    MarkGuessCorrect {
        code: GameCode,
        guesser_id: PlayerId,
    },
    CastVoteGame4 {
        code: GameCode,
        guesser_id: PlayerId,
        emoji: Option<String>,
    },
    TallyVotesGame4 {
        code: GameCode,
    },

    EndGameEarly {
        code: GameCode,
    },
}

impl ClientEvent {
    /// Parse a client event from a JSON text frame.
    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }
}

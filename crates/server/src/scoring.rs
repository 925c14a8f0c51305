//! Emoji point tables and the vote tally engine.
//!
//! Scores are only ever written here, synchronously, inside a single tally
//! call. Each mini-game has its own symbol set and point values; guests of
//! honour amplify votes (doubled in Games 1-3, a flat per-symbol add-on in
//! Game 4).

use protocol::{Player, PlayerId};

use crate::book::Book;

/// Vote record for one presentation round: item (author) id -> voter id ->
/// emoji. Re-voting overwrites the voter's entry.
pub type VoteBook = Book<Book<String>>;

/// Record a vote, last write wins per voter.
pub fn cast_vote(votes: &mut VoteBook, item: PlayerId, voter: PlayerId, emoji: String) {
    votes.entry(item).insert(voter, emoji);
}

/// Games 1 and 2 symbol values.
pub fn standard_points(emoji: &str) -> u32 {
    match emoji {
        "⭐" => 3,
        "❤️" => 2,
        "😂" => 1,
        _ => 0,
    }
}

/// Game 3 symbol values.
pub fn wrong_answer_points(emoji: &str) -> u32 {
    match emoji {
        "🤨" => 1,
        "🥹" => 2,
        "🤯" => 3,
        "🤪" => 4,
        "🦄" => 5,
        _ => 0,
    }
}

/// Game 4 symbol values.
pub fn mug_points(emoji: &str) -> u32 {
    match emoji {
        "🧐" => 1,
        "🤭" => 2,
        "👍" => 3,
        "💡" => 4,
        "🎉" => 5,
        _ => 0,
    }
}

/// Game 4 guest-of-honour add-on. Only the higher-tier symbols carry it;
/// this is a flat bonus, not a multiplier.
pub fn mug_guest_bonus(emoji: &str) -> u32 {
    match emoji {
        "👍" | "💡" | "🎉" => 2,
        _ => 0,
    }
}

/// Game 3 symbol set, reshuffled per presentation round before display.
pub const WRONG_ANSWER_VOTE_EMOJIS: [&str; 5] = ["🤨", "🥹", "🤯", "🤪", "🦄"];

/// Game 4 symbol set, reshuffled per holder before display.
pub const MUG_VOTE_EMOJIS: [&str; 5] = ["🧐", "🤭", "👍", "💡", "🎉"];

/// Flat award for a guesser the holder marks correct.
pub const CORRECT_GUESS_BONUS: u32 = 4;

/// Flat award for a holder nobody guessed right.
pub const POKER_FACE_BONUS: u32 = 5;

/// Sum a round's votes into cumulative scores (Games 1-3 shape).
///
/// Each voter's emoji is valued by `points`; a guest-of-honour vote counts
/// double. With `reset_scores` every score is zeroed first — Game 1 is the
/// score baseline for the whole session. Returns the per-author round
/// scores for bonus computations.
pub fn tally_round(
    players: &mut [Player],
    guests: &[PlayerId],
    votes: &VoteBook,
    points: fn(&str) -> u32,
    reset_scores: bool,
) -> Book<u32> {
    if reset_scores {
        for player in players.iter_mut() {
            player.score = 0;
        }
    }

    let mut round_scores: Book<u32> = Book::new();
    for (author, voter_votes) in votes.iter() {
        for (voter, emoji) in voter_votes.iter() {
            let mut value = points(emoji);
            if guests.contains(&voter) {
                value *= 2;
            }
            *round_scores.entry(author) += value;
        }
    }

    for (author, score) in round_scores.iter() {
        if let Some(player) = players.iter_mut().find(|p| p.id == author) {
            player.score += score;
        }
    }

    round_scores
}

/// The non-participating lone guest's averaging bonus (Games 2 and 3).
///
/// When exactly one guest of honour exists and they have no submission this
/// round, they gain the rounded mean of the scored authors' round scores
/// plus a flat 3 — their score keeps moving in proportion to the round's
/// overall generosity.
pub fn apply_lone_guest_bonus(
    players: &mut [Player],
    guests: &[PlayerId],
    guest_submitted: bool,
    round_scores: &Book<u32>,
) {
    let [guest] = guests else {
        return;
    };
    if guest_submitted {
        return;
    }
    let Some(player) = players.iter_mut().find(|p| p.id == *guest) else {
        return;
    };

    let average = if round_scores.is_empty() {
        0.0
    } else {
        let total: u32 = round_scores.values().sum();
        f64::from(total) / round_scores.len() as f64
    };
    player.score += average.round() as u32 + 3;
}

/// One Game 4 round's tally: poker-face bonus, correct-guess bonuses, and
/// emoji vote points per guess, all additive into cumulative scores.
pub fn tally_mug_round<'a>(
    players: &mut [Player],
    guests: &[PlayerId],
    holder: PlayerId,
    correct_guessers: &[PlayerId],
    votes_by_guesser: impl Iterator<Item = (PlayerId, &'a Book<String>)>,
) {
    if correct_guessers.is_empty() {
        if let Some(player) = players.iter_mut().find(|p| p.id == holder) {
            player.score += POKER_FACE_BONUS;
        }
    }

    for &guesser in correct_guessers {
        if let Some(player) = players.iter_mut().find(|p| p.id == guesser) {
            player.score += CORRECT_GUESS_BONUS;
        }
    }

    for (guesser, votes) in votes_by_guesser {
        let mut guess_score = 0;
        for (voter, emoji) in votes.iter() {
            let mut value = mug_points(emoji);
            if guests.contains(&voter) {
                value += mug_guest_bonus(emoji);
            }
            guess_score += value;
        }
        if let Some(player) = players.iter_mut().find(|p| p.id == guesser) {
            player.score += guess_score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: u32) -> Vec<Player> {
        (1..=n)
            .map(|i| Player::new(PlayerId(i), format!("P{i}")))
            .collect()
    }

    #[test]
    fn test_game1_tally_resets_then_sums_with_goh_doubling() {
        // Pitcher 1 gets two ⭐ from ordinary voters, pitcher 2 one ❤️ from
        // a guest of honour. Expect 6 and 4 on a clean baseline.
        let mut roster = players(4);
        roster[0].score = 99;
        roster[3].score = 12;

        let guests = [PlayerId(4)];
        let mut votes = VoteBook::new();
        cast_vote(&mut votes, PlayerId(1), PlayerId(2), "⭐".into());
        cast_vote(&mut votes, PlayerId(1), PlayerId(3), "⭐".into());
        cast_vote(&mut votes, PlayerId(2), PlayerId(4), "❤️".into());

        tally_round(&mut roster, &guests, &votes, standard_points, true);

        assert_eq!(roster[0].score, 6);
        assert_eq!(roster[1].score, 4);
        assert_eq!(roster[2].score, 0);
        assert_eq!(roster[3].score, 0);
    }

    #[test]
    fn test_revote_overwrites_not_duplicates() {
        let mut votes = VoteBook::new();
        cast_vote(&mut votes, PlayerId(1), PlayerId(2), "😂".into());
        cast_vote(&mut votes, PlayerId(1), PlayerId(2), "⭐".into());

        let mut roster = players(2);
        tally_round(&mut roster, &[], &votes, standard_points, false);
        assert_eq!(roster[0].score, 3);
    }

    #[test]
    fn test_unknown_emoji_scores_zero() {
        let mut votes = VoteBook::new();
        cast_vote(&mut votes, PlayerId(1), PlayerId(2), "🦖".into());
        let mut roster = players(2);
        tally_round(&mut roster, &[], &votes, standard_points, false);
        assert_eq!(roster[0].score, 0);
    }

    #[test]
    fn test_cumulative_tally_does_not_reset() {
        let mut roster = players(2);
        roster[0].score = 10;
        let mut votes = VoteBook::new();
        cast_vote(&mut votes, PlayerId(1), PlayerId(2), "🦄".into());
        tally_round(&mut roster, &[], &votes, wrong_answer_points, false);
        assert_eq!(roster[0].score, 15);
    }

    #[test]
    fn test_lone_guest_bonus_is_rounded_mean_plus_three() {
        let mut roster = players(4);
        let guests = [PlayerId(4)];
        let mut round_scores = Book::new();
        round_scores.insert(PlayerId(1), 3);
        round_scores.insert(PlayerId(2), 4);

        // Mean 3.5 rounds up: 4 + 3 = 7.
        apply_lone_guest_bonus(&mut roster, &guests, false, &round_scores);
        assert_eq!(roster[3].score, 7);
    }

    #[test]
    fn test_lone_guest_bonus_floor_is_flat_three() {
        let mut roster = players(3);
        let guests = [PlayerId(3)];
        apply_lone_guest_bonus(&mut roster, &guests, false, &Book::new());
        assert_eq!(roster[2].score, 3);
    }

    #[test]
    fn test_no_bonus_when_guest_submitted_or_two_guests() {
        let mut roster = players(4);
        let mut round_scores = Book::new();
        round_scores.insert(PlayerId(1), 6);

        apply_lone_guest_bonus(&mut roster, &[PlayerId(4)], true, &round_scores);
        assert_eq!(roster[3].score, 0);

        apply_lone_guest_bonus(
            &mut roster,
            &[PlayerId(3), PlayerId(4)],
            false,
            &round_scores,
        );
        assert_eq!(roster[2].score, 0);
        assert_eq!(roster[3].score, 0);
    }

    #[test]
    fn test_mug_round_poker_face_and_correct_guess_bonuses() {
        let mut roster = players(4);
        let holder = PlayerId(1);

        let no_votes = std::iter::empty::<(PlayerId, &Book<String>)>;

        // Nobody marked correct: holder gets exactly the poker-face bonus.
        tally_mug_round(&mut roster, &[], holder, &[], no_votes());
        assert_eq!(roster[0].score, POKER_FACE_BONUS);

        // Two correct guessers get the flat bonus each, independent of votes.
        tally_mug_round(
            &mut roster,
            &[],
            holder,
            &[PlayerId(2), PlayerId(3)],
            no_votes(),
        );
        assert_eq!(roster[0].score, POKER_FACE_BONUS);
        assert_eq!(roster[1].score, CORRECT_GUESS_BONUS);
        assert_eq!(roster[2].score, CORRECT_GUESS_BONUS);
    }

    #[test]
    fn test_mug_round_guest_addon_only_on_high_tier_symbols() {
        let mut roster = players(4);
        let guests = [PlayerId(4)];

        let mut votes_a: Book<String> = Book::new();
        votes_a.insert(PlayerId(4), "🎉".into()); // guest, high tier: 5 + 2
        votes_a.insert(PlayerId(3), "🧐".into()); // ordinary: 1
        let mut votes_b: Book<String> = Book::new();
        votes_b.insert(PlayerId(4), "🧐".into()); // guest, low tier: 1, no add-on

        let books = [(PlayerId(1), &votes_a), (PlayerId(2), &votes_b)];
        tally_mug_round(
            &mut roster,
            &guests,
            PlayerId(3),
            &[PlayerId(1)],
            books.into_iter(),
        );

        // Guesser 1: correct (4) + 7 + 1 = 12; guesser 2: just the 1.
        assert_eq!(roster[0].score, 12);
        assert_eq!(roster[1].score, 1);
    }
}

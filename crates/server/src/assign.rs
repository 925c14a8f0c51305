//! Author -> target assignment for the content-producing rounds.
//!
//! Games 2 and 3 each draw a fresh plan: who writes about whom, and how many
//! submissions the round expects. Guests of honour are protected from
//! contributing in their own honour round (§ one-guest case) or write about
//! each other (two-guest case).

use protocol::{Player, PlayerId};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::book::Book;

/// A fresh author -> target plan for one content-producing round.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPlan {
    /// Author id -> the player they write about. Authors with no entry are
    /// exempt this round.
    pub targets: Book<Player>,
    /// How many submissions the round expects before everyone is in.
    pub total_to_submit: usize,
}

/// Compute a plan for the given roster and guest set.
///
/// - No guests: the shuffled roster forms a cycle, everyone targets the next
///   player in it. Even in/out degree of one, no self-assignment.
/// - One guest: every other player targets the guest; the guest is exempt.
/// - Two guests: the guests target each other; the rest are shuffled and
///   split as evenly as possible between the two (larger half first).
pub fn assign_targets(
    players: &[Player],
    guests: &[PlayerId],
    rng: &mut impl Rng,
) -> AssignmentPlan {
    let mut plan = AssignmentPlan {
        targets: Book::new(),
        total_to_submit: players.len(),
    };

    match guests {
        [] => {
            if players.len() < 2 {
                return plan;
            }
            let mut cycle: Vec<&Player> = players.iter().collect();
            cycle.shuffle(rng);
            for (index, author) in cycle.iter().enumerate() {
                let target = cycle[(index + 1) % cycle.len()];
                plan.targets.insert(author.id, (*target).clone());
            }
        }
        [guest] => {
            plan.total_to_submit = players.len().saturating_sub(1);
            let Some(target) = players.iter().find(|p| p.id == *guest) else {
                return plan;
            };
            for author in players.iter().filter(|p| p.id != *guest) {
                plan.targets.insert(author.id, target.clone());
            }
        }
        [guest1, guest2, ..] => {
            let (Some(target1), Some(target2)) = (
                players.iter().find(|p| p.id == *guest1),
                players.iter().find(|p| p.id == *guest2),
            ) else {
                return plan;
            };

            // The guests write about each other.
            plan.targets.insert(*guest1, target2.clone());
            plan.targets.insert(*guest2, target1.clone());

            let mut others: Vec<&Player> = players
                .iter()
                .filter(|p| p.id != *guest1 && p.id != *guest2)
                .collect();
            others.shuffle(rng);
            let midpoint = others.len().div_ceil(2);
            for (index, author) in others.iter().enumerate() {
                let target = if index < midpoint { target1 } else { target2 };
                plan.targets.insert(author.id, target.clone());
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: u32) -> Vec<Player> {
        (1..=n)
            .map(|i| Player::new(PlayerId(i), format!("P{i}")))
            .collect()
    }

    #[test]
    fn test_no_guests_is_a_cycle() {
        let players = roster(6);
        for _ in 0..50 {
            let plan = assign_targets(&players, &[], &mut rand::rng());
            assert_eq!(plan.total_to_submit, 6);
            assert_eq!(plan.targets.len(), 6);

            let mut in_degree = std::collections::HashMap::new();
            for (author, target) in plan.targets.iter() {
                assert_ne!(author, target.id, "self-assignment");
                *in_degree.entry(target.id).or_insert(0u32) += 1;
            }
            // Everyone is targeted exactly once.
            assert!(in_degree.values().all(|&d| d == 1));
            assert_eq!(in_degree.len(), 6);
        }
    }

    #[test]
    fn test_one_guest_is_everyones_target_and_exempt() {
        let players = roster(5);
        let guest = PlayerId(3);
        let plan = assign_targets(&players, &[guest], &mut rand::rng());

        assert_eq!(plan.total_to_submit, 4);
        assert!(!plan.targets.contains(guest));
        for (author, target) in plan.targets.iter() {
            assert_ne!(author, guest);
            assert_eq!(target.id, guest);
        }
        assert_eq!(plan.targets.len(), 4);
    }

    #[test]
    fn test_two_guests_write_about_each_other() {
        let players = roster(7);
        let guests = [PlayerId(2), PlayerId(5)];
        let plan = assign_targets(&players, &guests, &mut rand::rng());

        assert_eq!(plan.total_to_submit, 7);
        assert_eq!(plan.targets.get(PlayerId(2)).unwrap().id, PlayerId(5));
        assert_eq!(plan.targets.get(PlayerId(5)).unwrap().id, PlayerId(2));

        // The other five split 3/2 between the guests, larger half first.
        let mut toward_first = 0;
        let mut toward_second = 0;
        for (author, target) in plan.targets.iter() {
            if author == PlayerId(2) || author == PlayerId(5) {
                continue;
            }
            match target.id {
                PlayerId(2) => toward_first += 1,
                PlayerId(5) => toward_second += 1,
                other => panic!("unexpected target {other}"),
            }
        }
        assert_eq!(toward_first, 3);
        assert_eq!(toward_second, 2);
    }

    #[test]
    fn test_no_self_assignment_across_configurations() {
        for n in 2..=9u32 {
            let players = roster(n);
            for guests in [vec![], vec![PlayerId(1)], vec![PlayerId(1), PlayerId(2)]] {
                let plan = assign_targets(&players, &guests, &mut rand::rng());
                for (author, target) in plan.targets.iter() {
                    assert_ne!(author, target.id);
                }
            }
        }
    }

    #[test]
    fn test_tiny_rosters_degrade_gracefully() {
        let one = roster(1);
        let plan = assign_targets(&one, &[], &mut rand::rng());
        assert!(plan.targets.is_empty());
        assert_eq!(plan.total_to_submit, 1);

        let plan = assign_targets(&one, &[PlayerId(1)], &mut rand::rng());
        assert!(plan.targets.is_empty());
        assert_eq!(plan.total_to_submit, 0);
    }
}

//! The bot: infers moves from a [`Snapshot`] and serves them one at a time.
//!
//! Each refill tries three strategies in order:
//! 1. Local deduction from flag and hidden counts around every numbered tile.
//! 2. A weight map that spreads each number's remaining mines over its
//!    unresolved hidden and flagged neighbours, acting on tiles pushed to a certain extreme.
//! 3. A random reveal.

use std::collections::VecDeque;

use itertools::Itertools;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::snapshot::{Cell, Snapshot};
use crate::{Action, Point};

/// Which strategy produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reason {
    /// Certain, from a numbered tile's flag and hidden counts.
    Deduction,
    /// Heuristic, from the weight map.
    Weighting,
    /// Random reveal when nothing else applies.
    Guess,
}

/// A single action for the driver to replay into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub at: Point,
    pub action: Action,
    pub reason: Reason,
}

/// The result of the weighting fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightAnalysis {
    /// Moves for tiles whose weight crossed a threshold, in the order they were first weighted.
    pub moves: Vec<Move>,
    /// Accumulated weight per tile, indexed as `weights[y][x]`.
    pub weights: Vec<Vec<f32>>,
}

/// A stateful bot. It owns a queue of pending moves and only looks at the
/// snapshot again once the queue runs dry.
#[derive(Debug, Clone, Default)]
pub struct Bot {
    queue: VecDeque<Move>,
    weights: Vec<Vec<f32>>,
}

impl Bot {
    pub fn new() -> Self {
        Bot::default()
    }

    /// Returns the next move, refilling the queue from `snapshot` if it is empty.
    ///
    /// Queued moves were inferred from an earlier snapshot; replaying a stale one is
    /// harmless because the board ignores actions on revealed tiles.
    pub fn next_move<R: Rng + ?Sized>(&mut self, snapshot: &Snapshot, rng: &mut R) -> Move {
        if self.queue.is_empty() {
            self.refill(snapshot);
        }
        match self.queue.pop_front() {
            Some(next) => next,
            None => guess(snapshot, rng),
        }
    }

    fn refill(&mut self, snapshot: &Snapshot) {
        let deduced = deduce_moves(snapshot);
        if !deduced.is_empty() {
            self.queue.extend(deduced);
            return;
        }

        let analysis = weigh_moves(snapshot);
        self.queue.extend(analysis.moves);
        self.weights = analysis.weights;
    }

    /// Number of moves waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drops every queued move, e.g. when the board is swapped out.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// The weight map from the last weighting pass. Empty until one has run.
    pub fn weights(&self) -> &[Vec<f32>] {
        &self.weights
    }
}

/// Flag and hidden-unflagged neighbour counts around `at`.
fn count_neighbors(snapshot: &Snapshot, at: Point) -> (usize, Vec<Point>) {
    let mut flags = 0;
    let mut hidden = Vec::new();
    for neighbor in snapshot.neighbors(at) {
        match snapshot[neighbor] {
            Cell::Flagged => flags += 1,
            Cell::Hidden => hidden.push(neighbor),
            Cell::Revealed(_) | Cell::Mine => {}
        }
    }
    (flags, hidden)
}

/// Certain moves implied by the numbered tiles of `snapshot`.
///
/// For a tile showing `n` with `f` flagged and `h` hidden neighbours:
/// when `f == n` every hidden neighbour is safe, otherwise when `f + h == n`
/// every hidden neighbour is a mine. Zero tiles are skipped. When several
/// tiles imply a move on the same point, the first one in row-major order wins.
pub fn deduce_moves(snapshot: &Snapshot) -> Vec<Move> {
    let mut moves = Vec::new();

    for at in snapshot.points() {
        let value = match snapshot[at] {
            Cell::Revealed(value) if value > 0 => usize::from(value),
            _ => continue,
        };

        let (flags, hidden) = count_neighbors(snapshot, at);
        let action = if flags == value && !hidden.is_empty() {
            Action::Reveal
        } else if flags + hidden.len() == value {
            Action::Flag
        } else {
            continue;
        };

        moves.extend(hidden.into_iter().map(|neighbor| Move {
            at: neighbor,
            action,
            reason: Reason::Deduction,
        }));
    }

    moves.into_iter().unique_by(|m| m.at).collect()
}

/// The weighting fallback.
///
/// Every tile starts at weight 0. Numbered tiles are visited row by row; each
/// subtracts the weight already sitting on its hidden and flagged neighbours
/// from its number and splits the rest evenly across those neighbours still at
/// exactly 0. Afterwards a weighted tile at 1 or more is flagged, and one in
/// `(-1, 0]` is revealed. Tiles that are already flagged carry weight but never
/// produce a move, since flagging them again would remove the flag.
///
/// The result depends on visiting order and treats a tile balanced back to 0
/// the same as an untouched one. It is a heuristic, not a probability.
pub fn weigh_moves(snapshot: &Snapshot) -> WeightAnalysis {
    let mut weights = vec![vec![0.0f32; snapshot.width()]; snapshot.height()];

    let mut weighted = Vec::new();
    for at in snapshot.points() {
        let value = match snapshot[at] {
            Cell::Revealed(value) if value > 0 => f32::from(value),
            _ => continue,
        };

        let mut remaining = value;
        let mut unresolved = Vec::new();
        for neighbor in snapshot.neighbors(at) {
            let cell = snapshot[neighbor];
            if !matches!(cell, Cell::Hidden | Cell::Flagged) {
                continue;
            }
            let weight = weights[neighbor.y][neighbor.x];
            remaining -= weight;
            if weight == 0.0 {
                unresolved.push(neighbor);
            }
        }

        if unresolved.is_empty() {
            continue;
        }
        let share = remaining / unresolved.len() as f32;
        for neighbor in unresolved {
            weights[neighbor.y][neighbor.x] += share;
            weighted.push(neighbor);
        }
    }

    let moves = weighted
        .into_iter()
        .unique()
        .filter(|&at| snapshot[at] == Cell::Hidden)
        .filter_map(|at| {
            let weight = weights[at.y][at.x];
            let action = if weight >= 1.0 {
                Action::Flag
            } else if weight <= 0.0 && weight > -1.0 {
                Action::Reveal
            } else {
                return None;
            };
            Some(Move {
                at,
                action,
                reason: Reason::Weighting,
            })
        })
        .collect();

    WeightAnalysis { moves, weights }
}

/// A random reveal. Deliberately narrowed from any in-bounds point to the tiles
/// still hidden, so a guess is never a no-op; on a board with nothing left to
/// reveal any in-bounds point is returned.
fn guess<R: Rng + ?Sized>(snapshot: &Snapshot, rng: &mut R) -> Move {
    let hidden: Vec<Point> = snapshot
        .points()
        .filter(|&at| snapshot[at] == Cell::Hidden)
        .collect();

    let at = match hidden.choose(rng) {
        Some(&at) => at,
        None => Point::new(
            rng.random_range(0..snapshot.width()),
            rng.random_range(0..snapshot.height()),
        ),
    };

    Move {
        at,
        action: Action::Reveal,
        reason: Reason::Guess,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn snapshot(rows: &[&str]) -> Snapshot {
        Snapshot::parse(rows).unwrap()
    }

    fn mv(x: usize, y: usize, action: Action, reason: Reason) -> Move {
        Move {
            at: Point::new(x, y),
            action,
            reason,
        }
    }

    #[test]
    fn test_single_hidden_neighbor_is_flagged() {
        // Centre shows 1 with exactly one hidden neighbour and no flags
        let board = snapshot(&["-11", "111", "111"]);
        let moves = deduce_moves(&board);
        assert_eq!(moves, vec![mv(0, 0, Action::Flag, Reason::Deduction)]);
    }

    #[test]
    fn test_satisfied_number_reveals_the_rest() {
        let board = snapshot(&["B--", "-1-", "---"]);
        let moves = deduce_moves(&board);
        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|m| m.action == Action::Reveal));
        assert!(!moves.iter().any(|m| m.at == Point::new(0, 0)));
        assert!(!moves.iter().any(|m| m.at == Point::new(1, 1)));
    }

    #[test]
    fn test_zero_tiles_contribute_nothing() {
        let board = snapshot(&["---", "-0-", "---"]);
        assert!(deduce_moves(&board).is_empty());
    }

    #[test]
    fn test_undetermined_number_yields_nothing() {
        // A 1 with three hidden neighbours and no flags
        let board = snapshot(&["1-", "--"]);
        assert!(deduce_moves(&board).is_empty());
    }

    #[test]
    fn test_duplicate_moves_keep_first() {
        // Both 1s point at the same hidden corner
        let board = snapshot(&["11-", "111", "000"]);
        let moves = deduce_moves(&board);
        assert_eq!(moves, vec![mv(2, 0, Action::Flag, Reason::Deduction)]);
    }

    #[test]
    fn test_weighting_spreads_number_evenly() {
        // A lone 1 between two hidden tiles puts 0.5 on each, which is not decisive
        let board = snapshot(&["-1-"]);
        let analysis = weigh_moves(&board);
        assert!(analysis.moves.is_empty());
        assert_eq!(analysis.weights, vec![vec![0.5, 0.0, 0.5]]);
    }

    #[test]
    fn test_weighting_flags_and_clears_from_spent_numbers() {
        // The 2 on the left loads both of its hidden neighbours fully, so the
        // middle 2 has nothing left for (2,0).
        let board = snapshot(&["---", "221"]);
        let analysis = weigh_moves(&board);
        assert_eq!(analysis.weights[0], vec![1.0, 1.0, 0.0]);
        assert_eq!(
            analysis.moves,
            vec![
                mv(0, 0, Action::Flag, Reason::Weighting),
                mv(1, 0, Action::Flag, Reason::Weighting),
                mv(2, 0, Action::Reveal, Reason::Weighting),
            ]
        );

        // The 1 spreads 0.5 over (0,0) and (1,0), leaving the 2 a full mine for (2,0)
        let board = snapshot(&["---", "121"]);
        let analysis = weigh_moves(&board);
        assert_eq!(analysis.weights[0], vec![0.5, 0.5, 1.0]);
        assert_eq!(
            analysis.moves,
            vec![mv(2, 0, Action::Flag, Reason::Weighting)]
        );
    }

    #[test]
    fn test_weighting_shares_with_flagged_neighbors() {
        // The flag starts at 0 like everything else, so the 2 splits evenly over
        // all five of its hidden and flagged neighbours.
        let board = snapshot(&["B--", "-2-", "111"]);
        let analysis = weigh_moves(&board);
        assert_eq!(
            analysis.weights,
            vec![
                vec![0.4, 0.4, 0.4],
                vec![0.4, 0.0, 0.4],
                vec![0.0, 0.0, 0.0],
            ]
        );
        assert!(analysis.moves.is_empty());
    }

    #[test]
    fn test_weighting_never_toggles_a_flag() {
        // The flag takes the whole 1, but flagging it again would unflag it
        let board = snapshot(&["B", "1"]);
        let analysis = weigh_moves(&board);
        assert_eq!(analysis.weights[0][0], 1.0);
        assert!(analysis.moves.is_empty());
    }

    #[test]
    fn test_weighting_reveals_behind_overloaded_number() {
        // The 2 puts a full mine on (0,0) and (1,0). The 1 next to it is then
        // over-absorbed and spreads -1 over its two fresh neighbours.
        let board = snapshot(&["---", "21-"]);
        let analysis = weigh_moves(&board);
        assert_eq!(analysis.weights[0], vec![1.0, 1.0, -0.5]);
        assert_eq!(analysis.weights[1], vec![0.0, 0.0, -0.5]);
        assert_eq!(
            analysis.moves,
            vec![
                mv(0, 0, Action::Flag, Reason::Weighting),
                mv(1, 0, Action::Flag, Reason::Weighting),
                mv(2, 0, Action::Reveal, Reason::Weighting),
                mv(2, 1, Action::Reveal, Reason::Weighting),
            ]
        );
    }

    #[test]
    fn test_bot_serves_queue_before_looking_again() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bot = Bot::new();
        let board = snapshot(&["B--", "-1-", "---"]);

        let first = bot.next_move(&board, &mut rng);
        assert_eq!(first.reason, Reason::Deduction);
        assert_eq!(bot.pending(), 6);

        // A completely different snapshot does not matter while moves are queued
        let other = snapshot(&["---", "---", "---"]);
        for _ in 0..6 {
            assert_eq!(bot.next_move(&other, &mut rng).action, Action::Reveal);
        }
        assert_eq!(bot.pending(), 0);

        // Now the queue is empty and the blank board forces a guess
        let guess = bot.next_move(&other, &mut rng);
        assert_eq!(guess.reason, Reason::Guess);
        assert_eq!(guess.action, Action::Reveal);
    }

    #[test]
    fn test_guess_picks_hidden_tile() {
        let board = snapshot(&["000", "0-0", "000"]);
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut bot = Bot::new();
            let guess = bot.next_move(&board, &mut rng);
            assert_eq!(guess, mv(1, 1, Action::Reveal, Reason::Guess));
        }
    }

    #[test]
    fn test_resolved_board_falls_back_without_panicking() {
        // Nothing hidden: deduction and weighting are empty, the guess lands anywhere
        let board = snapshot(&["01B", "011"]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut bot = Bot::new();
        for _ in 0..20 {
            let next = bot.next_move(&board, &mut rng);
            assert_eq!(next.reason, Reason::Guess);
            assert!(next.at.x < 3 && next.at.y < 2);
        }
        assert_eq!(bot.weights().len(), 2);
    }

    #[test]
    fn test_clear_drops_pending_moves() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut bot = Bot::new();
        bot.next_move(&snapshot(&["B--", "-1-", "---"]), &mut rng);
        assert!(bot.pending() > 0);
        bot.clear();
        assert_eq!(bot.pending(), 0);
    }
}

//! Rolling statistics over the human player's moves

use std::collections::VecDeque;

use crate::moves::Move;

/// Default length of the recent-move window.
pub const HISTORY_WINDOW: usize = 10;

const MOVES: usize = Move::ALL.len();

/// Per-match record of what the human has thrown.
///
/// Counts only grow until `reset`, which clears everything at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveHistory {
    counts: [u32; MOVES],
    recent: VecDeque<Move>,
    transitions: [[u32; MOVES]; MOVES],
    last: Option<Move>,
    window: usize,
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::with_window(HISTORY_WINDOW)
    }
}

impl MoveHistory {
    pub fn with_window(window: usize) -> Self {
        Self {
            counts: [0; MOVES],
            recent: VecDeque::with_capacity(window + 1),
            transitions: [[0; MOVES]; MOVES],
            last: None,
            window,
        }
    }

    pub fn record(&mut self, m: Move) {
        self.counts[m.index()] += 1;

        self.recent.push_back(m);
        while self.recent.len() > self.window {
            self.recent.pop_front();
        }

        if let Some(prev) = self.last {
            self.transitions[prev.index()][m.index()] += 1;
        }
        self.last = Some(m);
    }

    pub fn reset(&mut self) {
        *self = Self::with_window(self.window);
    }

    /// Moves recorded since the last reset.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn count(&self, m: Move) -> u32 {
        self.counts[m.index()]
    }

    pub fn transition(&self, from: Move, to: Move) -> u32 {
        self.transitions[from.index()][to.index()]
    }

    pub fn last(&self) -> Option<Move> {
        self.last
    }

    /// Recent moves, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = Move> + '_ {
        self.recent.iter().copied()
    }

    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Most thrown move overall. Ties go to the lower move code.
    pub fn most_frequent(&self) -> Option<Move> {
        argmax(&self.counts)
    }

    /// Most common follow-up to the last move, from the transition table.
    pub fn predicted_next(&self) -> Option<Move> {
        let last = self.last?;
        argmax(&self.transitions[last.index()])
    }

    /// Move repeated by the last two throws (`.., x, x`).
    pub fn repeated(&self) -> Option<Move> {
        let n = self.recent.len();
        if n < 2 {
            return None;
        }
        let (a, b) = (self.recent[n - 2], self.recent[n - 1]);
        (a == b).then_some(a)
    }

    /// Expected continuation of an `x, y, x` alternation, i.e. `y`.
    pub fn alternating(&self) -> Option<Move> {
        let n = self.recent.len();
        if n < 3 {
            return None;
        }
        let (a, b, c) = (self.recent[n - 3], self.recent[n - 2], self.recent[n - 1]);
        (a == c && b != c).then_some(b)
    }
}

fn argmax(counts: &[u32; MOVES]) -> Option<Move> {
    let mut best: Option<(Move, u32)> = None;
    for m in Move::ALL {
        let c = counts[m.index()];
        if c > 0 && best.map_or(true, |(_, b)| c > b) {
            best = Some((m, c));
        }
    }
    best.map(|(m, _)| m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    fn history_of(moves: &[Move]) -> MoveHistory {
        let mut h = MoveHistory::default();
        for m in moves {
            h.record(*m);
        }
        h
    }

    #[test]
    fn test_record_counts_and_transitions() {
        let h = history_of(&[Move::Rock, Move::Paper, Move::Rock, Move::Paper]);
        assert_eq!(h.total(), 4);
        assert_eq!(h.count(Move::Rock), 2);
        assert_eq!(h.count(Move::Paper), 2);
        assert_eq!(h.transition(Move::Rock, Move::Paper), 2);
        assert_eq!(h.transition(Move::Paper, Move::Rock), 1);
        assert_eq!(h.last(), Some(Move::Paper));
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut h = MoveHistory::default();
        h.record(Move::Scissors);
        for _ in 0..10 {
            h.record(Move::Rock);
        }
        assert_eq!(h.recent_len(), 10);
        assert!(h.recent().all(|m| m == Move::Rock));
        // counts are not windowed
        assert_eq!(h.count(Move::Scissors), 1);
    }

    #[test]
    fn test_most_frequent() {
        assert_eq!(MoveHistory::default().most_frequent(), None);
        let h = history_of(&[Move::Paper, Move::Scissors, Move::Scissors]);
        assert_eq!(h.most_frequent(), Some(Move::Scissors));
        // tie resolves to the lower code
        let h = history_of(&[Move::Scissors, Move::Paper]);
        assert_eq!(h.most_frequent(), Some(Move::Paper));
    }

    #[test]
    fn test_predicted_next() {
        let h = history_of(&[Move::Rock]);
        assert_eq!(h.predicted_next(), None);

        let h = history_of(&[
            Move::Rock,
            Move::Scissors,
            Move::Rock,
            Move::Scissors,
            Move::Rock,
        ]);
        assert_eq!(h.predicted_next(), Some(Move::Scissors));
    }

    #[test]
    fn test_patterns() {
        let h = history_of(&[Move::Paper, Move::Rock, Move::Rock]);
        assert_eq!(h.repeated(), Some(Move::Rock));
        assert_eq!(h.alternating(), None);

        let h = history_of(&[Move::Rock, Move::Paper, Move::Rock]);
        assert_eq!(h.repeated(), None);
        assert_eq!(h.alternating(), Some(Move::Paper));

        let h = history_of(&[Move::Rock, Move::Paper, Move::Scissors]);
        assert_eq!(h.repeated(), None);
        assert_eq!(h.alternating(), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut h = history_of(&[Move::Rock, Move::Rock, Move::Paper]);
        h.reset();
        assert_eq!(h, MoveHistory::default());
    }

    proptest! {
        #[test]
        fn prop_window_length(moves in proptest::collection::vec(select(Move::ALL.to_vec()), 0..40)) {
            let h = history_of(&moves);
            prop_assert_eq!(h.recent_len(), moves.len().min(HISTORY_WINDOW));
            prop_assert_eq!(h.total() as usize, moves.len());
            let transitions: u32 = Move::ALL
                .iter()
                .flat_map(|a| Move::ALL.iter().map(move |b| (*a, *b)))
                .map(|(a, b)| h.transition(a, b))
                .sum();
            prop_assert_eq!(transitions as usize, moves.len().saturating_sub(1));
        }
    }
}

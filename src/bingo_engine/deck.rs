use rand::Rng;
use crate::bingo_engine::models::{GoalPool, PLACEHOLDER_GOAL};

/// Uniform in-place Fisher-Yates shuffle.
pub fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// A shuffled copy of the goal pool that board slots are dealt from.
///
/// Unlike a card deck it never runs dry: once the pool is exhausted every
/// further deal yields [`PLACEHOLDER_GOAL`].
pub struct GoalDeck {
    goals: Vec<String>,
    cursor: usize,
}

impl GoalDeck {
    /// Copy `pool` and shuffle it with `rng`.
    pub fn new_shuffled<R: Rng>(pool: &GoalPool, rng: &mut R) -> Self {
        let mut goals: Vec<String> = pool.goals().to_vec();
        fisher_yates(&mut goals, rng);
        GoalDeck { goals, cursor: 0 }
    }

    /// Deal one goal text, padding with the placeholder when empty.
    pub fn deal(&mut self) -> String {
        match self.goals.get(self.cursor) {
            Some(goal) => {
                self.cursor += 1;
                goal.clone()
            }
            None => PLACEHOLDER_GOAL.to_string(),
        }
    }

    /// Deal `n` goals at once.
    pub fn deal_n(&mut self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.deal()).collect()
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scenario pool with sampling-without-replacement semantics: every item is
/// drawn exactly once per pass, uniformly at random from the remainder, and
/// the pool resets only when exhausted.
#[derive(Clone, Debug)]
pub struct ScenarioDeck<R = StdRng> {
    pool: Vec<String>,
    remaining: Vec<usize>,
    rng: R,
}

impl ScenarioDeck<StdRng> {
    pub fn new(pool: Vec<String>) -> Self {
        Self::with_rng(pool, StdRng::from_entropy())
    }
}

impl<R> ScenarioDeck<R>
where
    R: Rng,
{
    pub fn with_rng(pool: Vec<String>, rng: R) -> Self {
        Self { pool, remaining: Vec::new(), rng }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Draw the next scenario, refilling the pass when the remainder runs out.
    /// `None` only for an empty pool.
    pub fn draw(&mut self) -> Option<String> {
        if self.pool.is_empty() {
            return None;
        }
        if self.remaining.is_empty() {
            self.remaining = (0..self.pool.len()).collect();
        }
        let pick = self.rng.gen_range(0..self.remaining.len());
        let index = self.remaining.swap_remove(pick);
        Some(self.pool[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::ScenarioDeck;

    fn deck(seed: u64) -> ScenarioDeck {
        let pool = vec![
            "a pirate ordering coffee".to_owned(),
            "a robot learning to dance".to_owned(),
            "a chef who lost their taste".to_owned(),
            "an astronaut stuck in traffic".to_owned(),
        ];
        ScenarioDeck::with_rng(pool, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn no_repeat_until_pool_is_exhausted() {
        for seed in 0..16u64 {
            let mut deck = deck(seed);
            let first_pass: Vec<String> = (0..4).map(|_| deck.draw().unwrap()).collect();
            let unique: BTreeSet<&String> = first_pass.iter().collect();
            assert_eq!(unique.len(), 4, "seed {seed} repeated within a pass");
        }
    }

    #[test]
    fn resets_after_exhaustion_and_keeps_the_property() {
        let mut deck = deck(7);
        let draws: Vec<String> = (0..12).map(|_| deck.draw().unwrap()).collect();
        for pass in draws.chunks(4) {
            let unique: BTreeSet<&String> = pass.iter().collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn empty_pool_draws_nothing() {
        let mut deck = ScenarioDeck::with_rng(Vec::new(), StdRng::seed_from_u64(1));
        assert!(deck.draw().is_none());
        assert!(deck.is_empty());
    }
}

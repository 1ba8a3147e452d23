use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::DrillConfig;
use crate::operator::Operator;
use crate::problem::Problem;

/// Results outside this range are never put in a set.
pub const RESULT_RANGE: std::ops::RangeInclusive<i64> = 0..=99;

/// Stable handle to a problem inside a [`ProblemSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemId(usize);

/// The pool of unsolved problems for one session.
///
/// Problems live in an arena and are never moved; the pool is a list of ids
/// plus a reverse index so removal is a swap-remove.
#[derive(Debug, Clone)]
pub struct ProblemSet {
    arena: Vec<Problem>,
    pool: Vec<ProblemId>,
    // arena index -> position in `pool`
    slots: Vec<Option<usize>>,
    starting_count: usize,
}

impl ProblemSet {
    /// Generate the pool for `config`.
    ///
    /// Each operator contributes at most its `sample_count` problems, picked at
    /// random from every operand pair in its range whose result lands in
    /// [`RESULT_RANGE`]. The merged pool is shuffled and cut to the overall cap.
    pub fn build<R: Rng + ?Sized>(config: &DrillConfig, rng: &mut R) -> Self {
        let mut problems = Vec::new();

        for op in Operator::ALL {
            let op_config = config.operator(op);
            let mut candidates = candidates_for(op, op_config.range.min, op_config.range.max, rng);
            let generated = candidates.len();

            candidates.shuffle(rng);
            candidates.truncate(op_config.sample_count);
            log::debug!(
                "{op}: {generated} valid problems, sampled {}",
                candidates.len()
            );
            problems.extend(candidates);
        }

        problems.shuffle(rng);
        if let Some(cap) = config.total_cap() {
            problems.truncate(cap);
        }

        log::info!("built problem set with {} problems", problems.len());
        Self::from_problems(problems)
    }

    /// Wrap an explicit list of problems, keeping their order.
    pub fn from_problems(problems: Vec<Problem>) -> Self {
        let count = problems.len();
        Self {
            arena: problems,
            pool: (0..count).map(ProblemId).collect(),
            slots: (0..count).map(Some).collect(),
            starting_count: count,
        }
    }

    /// Pick a live problem uniformly at random without removing it.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(ProblemId, &Problem)> {
        let id = *self.pool.choose(rng)?;
        Some((id, &self.arena[id.0]))
    }

    /// Remove one specific problem from the pool. Returns false if it was not live.
    pub fn remove(&mut self, id: ProblemId) -> bool {
        let Some(pos) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return false;
        };

        self.pool.swap_remove(pos);
        if let Some(moved) = self.pool.get(pos) {
            self.slots[moved.0] = Some(pos);
        }
        true
    }

    pub fn get(&self, id: ProblemId) -> Option<&Problem> {
        self.slots
            .get(id.0)
            .copied()
            .flatten()
            .map(|_| &self.arena[id.0])
    }

    pub fn contains(&self, id: ProblemId) -> bool {
        self.get(id).is_some()
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Size of the pool when it was built; the denominator for progress
    pub fn starting_count(&self) -> usize {
        self.starting_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProblemId, &Problem)> {
        self.pool.iter().map(|id| (*id, &self.arena[id.0]))
    }
}

fn candidates_for<R: Rng + ?Sized>(op: Operator, min: i64, max: i64, rng: &mut R) -> Vec<Problem> {
    let mut out = Vec::new();
    for i in min..=max {
        for j in min..=max {
            match op.apply(i, j) {
                Some(result) if RESULT_RANGE.contains(&result) => {
                    out.extend(Problem::new(i, j, op, rng));
                }
                _ => {}
            }
        }
    }
    out
}

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{DrillError, Result};
use crate::problem::{Problem, Token};
use crate::problem_set::{ProblemId, ProblemSet};

/// Bumped every time a new problem is presented. Ticks carry the generation
/// they were armed for so late ticks from a replaced problem are dropped.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Presenting,
    Completed,
}

/// Everything the surface needs to put a problem on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemView<'a> {
    pub tokens: &'a [Token],
    pub starting: usize,
    pub remaining: usize,
    /// Ticks on the armed timer, `None` when untimed
    pub timer_ticks: Option<u32>,
    pub generation: Generation,
}

/// The presentation side of a session. The session calls into it; the
/// surface calls back with `submit_answer` and `timer_tick`.
pub trait Surface {
    fn show_problem(&mut self, view: &ProblemView<'_>);
    fn clear_input(&mut self);
    fn session_completed(&mut self, summary: &SessionSummary);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    /// Not an integer, or the session is over
    Ignored,
    /// Wrong answer; the same problem stays up
    Incorrect,
    /// Right answer. `credited` is false when the problem had already been missed.
    Correct { credited: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Stale,
    Counting { remaining: u32 },
    TimedOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub solved: usize,
    pub wrong_answers: usize,
    pub timeouts: usize,
    pub submissions: usize,
}

/// Drives problems from a [`ProblemSet`] through to completion.
///
/// A wrong answer keeps the same problem on screen and stops its timer. A
/// timeout abandons the problem back to the pool and draws again. Only a
/// problem answered right without a miss or timeout is removed from the pool.
#[derive(Debug)]
pub struct Session<R: Rng = StdRng> {
    problems: ProblemSet,
    rng: R,
    timer_ticks: Option<u32>,
    state: SessionState,
    current_id: ProblemId,
    current: Problem,
    failed_current: bool,
    generation: Generation,
    countdown: Option<u32>,
    summary: SessionSummary,
}

impl<R: Rng> Session<R> {
    pub fn start<S: Surface + ?Sized>(
        problems: ProblemSet,
        timer_ticks: Option<u32>,
        mut rng: R,
        surface: &mut S,
    ) -> Result<Self> {
        let (current_id, current) = problems
            .draw(&mut rng)
            .map(|(id, p)| (id, p.clone()))
            .ok_or(DrillError::EmptyPool)?;
        let timer_ticks = timer_ticks.filter(|t| *t > 0);

        let session = Self {
            problems,
            rng,
            timer_ticks,
            state: SessionState::Presenting,
            current_id,
            current,
            failed_current: false,
            generation: 0,
            countdown: timer_ticks,
            summary: SessionSummary::default(),
        };
        log::info!(
            "session started: {} problems, timer {:?} ticks",
            session.problems.starting_count(),
            timer_ticks
        );
        session.present(surface);
        Ok(session)
    }

    pub fn submit_answer<S: Surface + ?Sized>(&mut self, raw: &str, surface: &mut S) -> Judgement {
        if self.state == SessionState::Completed {
            return Judgement::Ignored;
        }
        let Ok(answer) = raw.trim().parse::<i64>() else {
            log::trace!("ignoring non-integer answer {raw:?}");
            return Judgement::Ignored;
        };
        self.summary.submissions += 1;

        if !self.current.is_correct(answer) {
            log::debug!("'{}': {answer} is wrong", self.current);
            self.failed_current = true;
            self.countdown = None;
            self.summary.wrong_answers += 1;
            surface.clear_input();
            return Judgement::Incorrect;
        }

        let credited = !self.failed_current;
        if credited {
            let removed = self.problems.remove(self.current_id);
            debug_assert!(removed, "current problem missing from pool");
            self.summary.solved += 1;
        }
        log::debug!("'{}': {answer} is right (credited: {credited})", self.current);
        self.advance(surface);
        Judgement::Correct { credited }
    }

    pub fn timer_tick<S: Surface + ?Sized>(
        &mut self,
        generation: Generation,
        surface: &mut S,
    ) -> TickOutcome {
        if self.state == SessionState::Completed {
            return TickOutcome::Ignored;
        }
        if generation != self.generation {
            return TickOutcome::Stale;
        }
        let Some(left) = self.countdown else {
            return TickOutcome::Ignored;
        };

        let left = left.saturating_sub(1);
        if left > 0 {
            self.countdown = Some(left);
            return TickOutcome::Counting { remaining: left };
        }

        log::debug!("'{}': out of time", self.current);
        self.countdown = None;
        self.failed_current = true;
        self.summary.timeouts += 1;
        self.advance(surface);
        TickOutcome::TimedOut
    }

    fn advance<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        let next = self
            .problems
            .draw(&mut self.rng)
            .map(|(id, p)| (id, p.clone()));

        match next {
            None => {
                self.state = SessionState::Completed;
                self.countdown = None;
                log::info!("session completed: {:?}", self.summary);
                surface.session_completed(&self.summary);
            }
            Some((id, problem)) => {
                self.current_id = id;
                self.current = problem;
                self.failed_current = false;
                self.generation += 1;
                self.countdown = self.timer_ticks;
                self.present(surface);
            }
        }
    }

    fn present<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.show_problem(&ProblemView {
            tokens: self.current.tokens(),
            starting: self.problems.starting_count(),
            remaining: self.problems.remaining(),
            timer_ticks: self.timer_ticks,
            generation: self.generation,
        });
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        match self.state {
            SessionState::Presenting => Some(&self.current),
            SessionState::Completed => None,
        }
    }

    pub fn failed_current(&self) -> bool {
        self.failed_current
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Configured ticks per problem
    pub fn timer_ticks(&self) -> Option<u32> {
        self.timer_ticks
    }

    /// Ticks left on the current problem, `None` when untimed or stopped
    pub fn timer_remaining(&self) -> Option<u32> {
        self.countdown
    }

    pub fn remaining(&self) -> usize {
        self.problems.remaining()
    }

    pub fn starting_count(&self) -> usize {
        self.problems.starting_count()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    pub fn problems(&self) -> &ProblemSet {
        &self.problems
    }
}

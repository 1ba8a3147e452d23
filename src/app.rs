use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

use crate::config::DrillConfig;
use crate::error::Result;
use crate::problem::Token;
use crate::problem_set::ProblemSet;
use crate::session::{
    Generation, Judgement, ProblemView, Session, SessionSummary, Surface, TickOutcome,
};

/// Longest answer the input box accepts
pub const MAX_INPUT_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Drilling,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// What is currently on screen, as told by the session
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Board {
    pub tokens: Vec<Token>,
    pub starting: usize,
    pub remaining: usize,
    pub timer_ticks: Option<u32>,
    /// Generation the timer on screen was armed for; ticks are sent with it
    pub generation: Generation,
    pub input: String,
    /// The current problem has been answered wrong at least once
    pub missed: bool,
    pub completed: Option<SessionSummary>,
}

impl Surface for Board {
    fn show_problem(&mut self, view: &ProblemView<'_>) {
        self.tokens = view.tokens.to_vec();
        self.starting = view.starting;
        self.remaining = view.remaining;
        self.timer_ticks = view.timer_ticks;
        self.generation = view.generation;
        self.input.clear();
        self.missed = false;
        self.completed = None;
    }

    fn clear_input(&mut self) {
        self.input.clear();
        self.missed = true;
    }

    fn session_completed(&mut self, summary: &SessionSummary) {
        self.remaining = 0;
        self.completed = Some(*summary);
    }
}

#[derive(Debug)]
pub struct App {
    pub config: DrillConfig,
    pub session: Session,
    pub board: Board,
    pub state: AppState,
    seed: Option<u64>,
    rounds: u64,
}

impl App {
    pub fn new(config: DrillConfig, seed: Option<u64>) -> Result<Self> {
        let mut board = Board::default();
        let session = Self::start_session(&config, seed, &mut board)?;

        Ok(Self {
            config,
            session,
            board,
            state: AppState::Drilling,
            seed,
            rounds: 0,
        })
    }

    fn start_session(config: &DrillConfig, seed: Option<u64>, board: &mut Board) -> Result<Session> {
        config.validate()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let problems = ProblemSet::build(config, &mut rng);
        Session::start(problems, config.timer_ticks(), rng, board)
    }

    /// Build a fresh set from the same config
    pub fn restart(&mut self) -> Result<()> {
        self.rounds += 1;
        let seed = self.seed.map(|s| s.wrapping_add(self.rounds));
        let mut board = Board::default();
        self.session = Self::start_session(&self.config, seed, &mut board)?;
        self.board = board;
        self.state = AppState::Drilling;
        Ok(())
    }

    pub fn on_tick(&mut self) -> TickOutcome {
        let outcome = self.session.timer_tick(self.board.generation, &mut self.board);
        self.sync_state();
        outcome
    }

    pub fn submit(&mut self) -> Judgement {
        let raw = self.board.input.clone();
        let judgement = self.session.submit_answer(&raw, &mut self.board);
        self.sync_state();
        judgement
    }

    fn sync_state(&mut self) {
        if self.session.is_completed() {
            self.state = AppState::Results;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<KeyAction> {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Ok(KeyAction::Quit);
        }

        match self.state {
            AppState::Drilling => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
                    if self.board.input.len() < MAX_INPUT_LEN {
                        self.board.input.push(c);
                    }
                }
                KeyCode::Backspace => {
                    self.board.input.pop();
                }
                KeyCode::Enter => {
                    self.submit();
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('n') => self.restart()?,
                KeyCode::Char('q') => return Ok(KeyAction::Quit),
                _ => {}
            },
        }
        Ok(KeyAction::Continue)
    }

    /// Fraction of the timer left, `None` when the drill is untimed
    pub fn timer_ratio(&self) -> Option<f64> {
        let total = self.board.timer_ticks?;
        let left = self.session.timer_remaining().unwrap_or(0);
        Some(f64::from(left) / f64::from(total))
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.board.starting == 0 {
            return 0.0;
        }
        let done = self.board.starting - self.board.remaining;
        done as f64 / self.board.starting as f64
    }
}

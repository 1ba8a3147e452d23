use assert_matches::assert_matches;
use flashsum::config::{DrillConfig, OperatorConfig, Preset};
use flashsum::operator::Operator;
use flashsum::problem::Token;
use flashsum::problem_set::{ProblemSet, RESULT_RANGE};
use flashsum::session::{
    Judgement, ProblemView, Session, SessionState, SessionSummary, Surface, TickOutcome,
};
use flashsum::DrillError;
use rand::{rngs::StdRng, Rng, SeedableRng};

// Properties checked over many seeded sets and sessions

#[derive(Default)]
struct CountingSurface {
    shown: usize,
    completed: Option<SessionSummary>,
}

impl Surface for CountingSurface {
    fn show_problem(&mut self, view: &ProblemView<'_>) {
        assert_eq!(
            view.tokens.iter().filter(|t| **t == Token::Blank).count(),
            1
        );
        assert!(view.remaining <= view.starting);
        self.shown += 1;
    }

    fn clear_input(&mut self) {}

    fn session_completed(&mut self, summary: &SessionSummary) {
        self.completed = Some(*summary);
    }
}

fn configs() -> Vec<DrillConfig> {
    vec![
        DrillConfig::default(),
        Preset::Starter.config(),
        DrillConfig {
            timer_secs: Some(2),
            total_problems: Some(25),
            add: OperatorConfig::new(0, 60, 40),
            subtract: OperatorConfig::new(-5, 20, 40),
            multiply: OperatorConfig::new(0, 12, 40),
        },
        DrillConfig {
            timer_secs: None,
            total_problems: None,
            add: OperatorConfig::new(45, 55, 500),
            subtract: OperatorConfig::new(0, 3, 2),
            multiply: OperatorConfig::new(9, 11, 500),
        },
    ]
}

#[test]
fn generated_problems_are_well_formed() {
    for (i, cfg) in configs().iter().enumerate() {
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed * 31 + i as u64);
            let set = ProblemSet::build(cfg, &mut rng);

            let quota: usize = Operator::ALL
                .iter()
                .map(|op| cfg.operator(*op).sample_count)
                .sum();
            assert!(set.starting_count() <= quota);
            if let Some(cap) = cfg.total_cap() {
                assert!(set.starting_count() <= cap);
            }

            for (_, p) in set.iter() {
                assert_eq!(Some(p.result()), p.operator().apply(p.first(), p.second()));
                assert!(RESULT_RANGE.contains(&p.result()));
                let components = [p.first(), p.second(), p.result()];
                assert!(components.contains(&p.answer()));
                assert_eq!(
                    p.tokens().iter().filter(|t| **t == Token::Blank).count(),
                    1
                );
            }
        }
    }
}

#[test]
fn per_operator_quota_limits_each_operator() {
    let cfg = DrillConfig {
        timer_secs: None,
        total_problems: None,
        add: OperatorConfig::new(0, 9, 4),
        subtract: OperatorConfig::new(0, 9, 5),
        multiply: OperatorConfig::new(0, 9, 6),
    };
    let set = ProblemSet::build(&cfg, &mut StdRng::seed_from_u64(77));
    let count = |op: Operator| set.iter().filter(|(_, p)| p.operator() == op).count();
    assert_eq!(count(Operator::Add), 4);
    assert_eq!(count(Operator::Subtract), 5);
    assert_eq!(count(Operator::Multiply), 6);
}

#[test]
fn random_play_keeps_invariants() {
    for (i, cfg) in configs().iter().enumerate() {
        for seed in 0..10u64 {
            let mut rng = StdRng::seed_from_u64(1000 + seed * 7 + i as u64);
            let set = ProblemSet::build(cfg, &mut rng);
            let starting = set.starting_count();
            let mut player = StdRng::seed_from_u64(seed);
            let mut surface = CountingSurface::default();
            let mut session = Session::start(set, cfg.timer_ticks(), rng, &mut surface).unwrap();

            let mut last_remaining = session.remaining();
            let mut steps = 0;
            while !session.is_completed() {
                steps += 1;
                assert!(steps < 200_000, "session should finish");

                let before = session.remaining();
                let answer = session.current_problem().unwrap().answer();
                let was_failed = session.failed_current();

                match player.gen_range(0..10) {
                    0 => {
                        assert_eq!(
                            session.submit_answer("nope", &mut surface),
                            Judgement::Ignored
                        );
                        assert_eq!(session.remaining(), before);
                    }
                    1 | 2 => {
                        let wrong = (answer + player.gen_range(1..5)).to_string();
                        assert_eq!(
                            session.submit_answer(&wrong, &mut surface),
                            Judgement::Incorrect
                        );
                        assert!(session.failed_current());
                        assert_eq!(session.remaining(), before);
                    }
                    3 => {
                        let outcome = session.timer_tick(session.generation(), &mut surface);
                        assert_eq!(session.remaining(), before);
                        if cfg.timer_ticks().is_none() {
                            assert_eq!(outcome, TickOutcome::Ignored);
                        }
                    }
                    _ => match session.submit_answer(&answer.to_string(), &mut surface) {
                        Judgement::Correct { credited: true } => {
                            assert!(!was_failed);
                            assert_eq!(session.remaining(), before - 1);
                        }
                        Judgement::Correct { credited: false } => {
                            assert!(was_failed);
                            assert_eq!(session.remaining(), before);
                        }
                        other => panic!("unexpected judgement {other:?}"),
                    },
                }

                assert!(session.remaining() <= last_remaining);
                last_remaining = session.remaining();
                assert_eq!(session.starting_count(), starting);
            }

            assert_eq!(session.state(), SessionState::Completed);
            let summary = surface.completed.expect("completion reported");
            assert_eq!(summary.solved, starting);
        }
    }
}

#[test]
fn zero_problem_configs_never_start() {
    let cfgs = [
        DrillConfig {
            timer_secs: Some(3),
            total_problems: None,
            add: OperatorConfig::new(50, 90, 10),
            subtract: OperatorConfig::new(0, 9, 0),
            multiply: OperatorConfig::new(10, 20, 10),
        },
        DrillConfig {
            total_problems: Some(0),
            add: OperatorConfig::new(0, 9, 0),
            subtract: OperatorConfig::new(0, 9, 0),
            multiply: OperatorConfig::new(0, 9, 0),
            ..DrillConfig::default()
        },
    ];

    for cfg in cfgs {
        let mut rng = StdRng::seed_from_u64(5);
        let set = ProblemSet::build(&cfg, &mut rng);
        let mut surface = CountingSurface::default();
        assert_matches!(
            Session::start(set, cfg.timer_ticks(), rng, &mut surface),
            Err(DrillError::EmptyPool)
        );
        assert_eq!(surface.shown, 0);
    }
}

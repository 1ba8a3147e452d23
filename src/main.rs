use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flashsum::{
    app::{App, KeyAction},
    config::{ConfigStore, DrillConfig, FileConfigStore, OperandRange, Preset},
    runtime::{CrosstermEventSource, DrillEvent, FixedTicker, Runner},
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    process,
    time::Duration,
};

/// arithmetic flashcards in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Fill-in-the-blank addition, subtraction and multiplication drills with an optional per-problem timer. Problems you miss or run out of time on come back until you get them right first time."
)]
pub struct Cli {
    /// start from a built-in preset instead of the saved config
    #[clap(long, value_enum)]
    preset: Option<Preset>,

    /// seconds allowed per problem (0 disables the timer)
    #[clap(short = 't', long = "timer")]
    timer_secs: Option<u32>,

    /// cap on the number of problems in the set (0 means no cap)
    #[clap(short = 'n', long)]
    total_problems: Option<usize>,

    /// operand range for addition, e.g. 0..8
    #[clap(long, value_name = "MIN..MAX", allow_hyphen_values = true)]
    add_range: Option<OperandRange>,

    /// how many addition problems to sample at most
    #[clap(long)]
    adds: Option<usize>,

    /// operand range for subtraction, e.g. 0..8
    #[clap(long, value_name = "MIN..MAX", allow_hyphen_values = true)]
    subtract_range: Option<OperandRange>,

    /// how many subtraction problems to sample at most
    #[clap(long)]
    subtracts: Option<usize>,

    /// operand range for multiplication, e.g. 1..8
    #[clap(long, value_name = "MIN..MAX", allow_hyphen_values = true)]
    multiply_range: Option<OperandRange>,

    /// how many multiplication problems to sample at most
    #[clap(long)]
    multiplies: Option<usize>,

    /// seed the problem generator for a repeatable set
    #[clap(long)]
    seed: Option<u64>,

    /// read and write settings at this path instead of the default config file
    #[clap(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// save the resolved settings as the new defaults
    #[clap(long)]
    save: bool,

    /// print the resolved settings as JSON and exit
    #[clap(long)]
    print_config: bool,
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Preset (or stored config) with command line overrides on top
    fn resolve_config(&self, store: &impl ConfigStore) -> DrillConfig {
        let mut cfg = match self.preset {
            Some(preset) => preset.config(),
            None => store.load(),
        };

        if let Some(secs) = self.timer_secs {
            cfg.timer_secs = Some(secs);
        }
        if let Some(total) = self.total_problems {
            cfg.total_problems = Some(total);
        }

        let overrides = [
            (&mut cfg.add, self.add_range, self.adds),
            (&mut cfg.subtract, self.subtract_range, self.subtracts),
            (&mut cfg.multiply, self.multiply_range, self.multiplies),
        ];
        for (op_cfg, range, count) in overrides {
            if let Some(range) = range {
                op_cfg.range = range;
            }
            if let Some(count) = count {
                op_cfg.sample_count = count;
            }
        }

        cfg
    }
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {

    let store = cli.config_store();
    let config = cli.resolve_config(&store);
    config.validate()?;

    if cli.save {
        store.save(&config)?;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    // fail before touching the terminal if the settings yield no problems
    let mut app = App::new(config, cli.seed)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            DrillEvent::Tick => {
                // only redraw while a countdown is visibly moving
                if app.session.timer_remaining().is_some() {
                    app.on_tick();
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            DrillEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            DrillEvent::Closed => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "terminal input closed",
                )
                .into());
            }
            DrillEvent::Key(key) => {
                if app.handle_key(key)? == KeyAction::Quit {
                    if !app.session.is_completed() {
                        log::info!(
                            "quit early with {} of {} problems left",
                            app.session.remaining(),
                            app.session.starting_count()
                        );
                    }
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use typewright::config::{Preferences, RunSettings, DEFAULT_PREFS_FILE};
use typewright::controller::RunController;
use typewright::engine::{RunOutcome, TypingEngine};
use typewright::lexicon::Lexicon;
use typewright::model::Mode;
use typewright::progress::{ProgressEvent, RunState};
use typewright::sim::{self, Timeline};
use typewright::sink::{SystemClock, TerminalSink};
use typewright::trace::console_trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Variable speed with corrected typos and synonym slips.
    Natural,
    /// One fixed interval per character.
    Competition,
}

impl ModeArg {
    fn to_library(self) -> Mode {
        match self {
            ModeArg::Natural => Mode::Natural,
            ModeArg::Competition => Mode::Competition,
        }
    }
}

#[derive(Debug, Args, Clone)]
struct SettingsArgs {
    /// Preferences file supplying defaults for every option not given.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PREFS_FILE)]
    prefs: PathBuf,

    /// Target words per minute (10-500).
    #[arg(long, allow_negative_numbers = true)]
    wpm: Option<i64>,

    /// Seconds to wait before the first keystroke.
    #[arg(long, allow_negative_numbers = true)]
    delay: Option<i64>,

    /// Typo probability per character, in percent (0-20). Natural mode only.
    #[arg(long, allow_negative_numbers = true)]
    typo: Option<f64>,

    /// Synonym slip probability per word, in percent (0-20). Natural mode only.
    #[arg(long, allow_negative_numbers = true)]
    synonym: Option<f64>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
}

impl SettingsArgs {
    fn resolve(&self) -> (Preferences, RunSettings) {
        let prefs = Preferences::load_or_default(&self.prefs);
        let mut settings = prefs.settings();

        if let Some(wpm) = self.wpm {
            settings.target_wpm = wpm;
        }
        if let Some(delay) = self.delay {
            settings.start_delay_secs = delay;
        }
        if let Some(typo) = self.typo {
            settings.typo_percent = typo;
        }
        if let Some(synonym) = self.synonym {
            settings.synonym_percent = synonym;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode.to_library();
        }

        (prefs, settings)
    }
}

#[derive(Debug, Args, Clone)]
struct SourceArgs {
    /// Input text file, or '-' for stdin
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Optional JSON synonym table replacing the bundled one
    #[arg(long, value_name = "PATH")]
    lexicon: Option<PathBuf>,

    /// Optional RNG seed (for debugging)
    #[arg(long)]
    seed: Option<u64>,

    /// Disable console trace output
    #[arg(long)]
    no_trace: bool,
}

#[derive(Debug, Parser)]
#[command(name = "typewright")]
#[command(about = "Types text out like a person would", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Type the text to stdout in real time
    Run {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Dry-run on a virtual clock and print the keystroke transcript (JSON)
    Plan {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output transcript file (defaults to stdout)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Validate and save new default settings
    Prefs {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_lexicon(path: Option<&Path>) -> Result<Arc<Lexicon>> {
    let lexicon = match path {
        Some(path) => Lexicon::load(path)?,
        None => Lexicon::builtin()?,
    };
    Ok(Arc::new(lexicon))
}

fn print_trace_line(line: &str) {
    const RESET: &str = "\x1b[0m";
    const TYPING: &str = "\x1b[34m";
    const REPLACE: &str = "\x1b[33m";

    if let Some(rest) = line.strip_prefix("Typing") {
        eprintln!("{TYPING}Typing{RESET}{rest}");
    } else if let Some(rest) = line.strip_prefix("Replace") {
        eprintln!("{REPLACE}Replace{RESET}{rest}");
    } else {
        eprintln!("{line}");
    }
}

fn run_live(source: &SourceArgs, settings: RunSettings) -> Result<()> {
    let text = read_input(&source.input)?;
    let delay = settings.start_delay_secs;
    let request = settings.into_request(&text)?;
    let lexicon = load_lexicon(source.lexicon.as_deref())?;

    let controller = RunController::new(lexicon);
    {
        let controller = controller.clone();
        ctrlc::set_handler(move || controller.stop())
            .context("failed to install Ctrl+C handler")?;
    }

    if delay > 0 {
        eprintln!("Starting in {delay} seconds... Move the cursor to the target application!");
    }

    let handle = controller.start(
        request,
        TerminalSink::new(io::stdout()),
        SystemClock::new(),
        rng_from_seed(source.seed),
    )?;

    for event in handle.events() {
        let show = match event {
            ProgressEvent::Progress { .. } => !source.no_trace,
            _ => true,
        };
        if show {
            eprintln!("\n{}", event.status_line());
        }
    }

    match handle.join()? {
        RunOutcome::Completed { .. } => Ok(()),
        RunOutcome::Cancelled { characters } => {
            Err(anyhow!("aborted after {characters} characters"))
        }
    }
}

fn plan_dry_run(
    source: &SourceArgs,
    settings: RunSettings,
    output: Option<&Path>,
) -> Result<()> {
    let text = read_input(&source.input)?;
    let request = settings.into_request(&text)?;
    let lexicon = load_lexicon(source.lexicon.as_deref())?;

    let timeline = Timeline::new();
    let mut engine = TypingEngine::new(request, lexicon, rng_from_seed(source.seed));
    let mut progress: Vec<ProgressEvent> = Vec::new();
    engine.run(
        &mut timeline.clone(),
        &mut timeline.clone(),
        &mut progress,
        &RunState::new(),
    )?;

    let transcript = timeline.transcript(engine.request());
    let stats = sim::stats(&transcript.events);
    eprintln!(
        "Planned: {} events, {} keystrokes, {} backspaces, ~{:.1} min, target {} WPM",
        stats.events,
        stats.characters,
        stats.backspaces,
        stats.total_wait_secs / 60.0,
        transcript.config.target_wpm
    );
    if let Some(ProgressEvent::Completed { final_wpm }) = progress.last() {
        eprintln!("Simulated rate: {final_wpm:.1} WPM");
    }

    if !source.no_trace {
        for event in console_trace(&transcript.events) {
            print_trace_line(&event.line);
        }
    }

    let json =
        serde_json::to_string_pretty(&transcript).context("failed to serialize transcript")?;
    if let Some(out) = output {
        write_output(out, &json)?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn save_prefs(args: &SettingsArgs) -> Result<()> {
    let (mut prefs, settings) = args.resolve();
    settings.validate()?;
    prefs.apply(&settings);
    prefs.save(&args.prefs)?;

    let json = serde_json::to_string_pretty(&prefs).context("failed to serialize preferences")?;
    println!("{json}");
    eprintln!("Saved preferences to {}", args.prefs.display());
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { source, settings } => {
            let (_, settings) = settings.resolve();
            run_live(&source, settings)?;
        }
        Command::Plan {
            source,
            settings,
            output,
        } => {
            let (_, settings) = settings.resolve();
            plan_dry_run(&source, settings, output.as_deref())?;
        }
        Command::Prefs { settings } => {
            save_prefs(&settings)?;
        }
    }

    Ok(())
}

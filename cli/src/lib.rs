//! typj CLI (made by FontLab https://www.fontlab.com/)

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use regex::Regex;

use typj_core::backend::{host_comparator, FontLibrary, LibraryOptions};
use typj_core::candidate::{Candidate, CandidateSource, NameListSource, StaticSource};
use typj_core::classify::classify;
use typj_core::config::ScanConfig;
use typj_core::output::{filter_verdict, progress_line, write_json_pretty, write_ndjson};
use typj_core::scan::{ScanProgress, ScanSession, ScanSummary};
use typj_core::store::{ScanEntry, Verdict};

pub mod server;

/// CLI entrypoint for typj.
#[derive(Debug, Parser)]
#[command(
    name = "typj",
    about = "Find fonts that really render Japanese (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Log per-font decisions (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify fonts by name, then verify the rest by rendering
    Scan(ScanArgs),
    /// Name-only triage, no rendering
    Classify(ClassifyArgs),
    /// Serve scans over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Font directories to load (in addition to --system-fonts)
    #[arg(
        value_hint = ValueHint::DirPath,
        required_unless_present_any = ["system_fonts", "stdin_names"]
    )]
    paths: Vec<PathBuf>,

    /// Include the platform's installed fonts
    #[arg(long = "system-fonts", action = ArgAction::SetTrue)]
    system_fonts: bool,

    /// Read candidate names (`identity[<TAB>label]` per line) from STDIN
    #[arg(long = "stdin-names", action = ArgAction::SetTrue)]
    stdin_names: bool,

    /// Follow symlinks while walking paths
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,

    /// Regex patterns; only candidates whose identity matches one are scanned
    #[arg(short = 'n', long = "name", value_hint = ValueHint::Other)]
    name_patterns: Vec<String>,

    /// Only print fonts that render Japanese
    #[arg(short = 's', long = "supported-only", action = ArgAction::SetTrue)]
    supported_only: bool,

    /// JSON config file with scan tunables
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Candidates verified per batch
    #[arg(short = 'b', long = "batch-size")]
    batch_size: Option<usize>,

    /// Pause between batches in milliseconds
    #[arg(long = "yield-ms")]
    yield_ms: Option<u64>,

    /// Probe character to render
    #[arg(long = "probe")]
    probe: Option<char>,

    /// Report batch progress on STDERR
    #[arg(long = "progress", action = ArgAction::SetTrue)]
    progress: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct ClassifyArgs {
    /// Font family names to classify
    #[arg(required_unless_present = "stdin_names")]
    names: Vec<String>,

    /// Read names from STDIN as well
    #[arg(long = "stdin-names", action = ArgAction::SetTrue)]
    stdin_names: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long = "bind", default_value = "127.0.0.1:8765")]
    bind: String,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,

    /// Format output as padded columns
    #[arg(long = "columns", action = ArgAction::SetTrue)]
    columns: bool,

    /// Control colorized output (auto|always|never)
    #[arg(long = "color", default_value_t = ColorChoice::Auto, value_enum)]
    color: ColorChoice,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// What to load, what to scan and how.
#[derive(Debug, Clone, Default)]
pub struct DetectRequest {
    pub library: LibraryOptions,
    /// Explicit candidate list; `None` scans every face in the library.
    pub names: Option<Vec<Candidate>>,
    pub name_patterns: Vec<Regex>,
    pub config: ScanConfig,
}

/// Finished scan: every entry plus the terminal summary.
#[derive(Debug, Clone)]
pub struct Detection {
    pub entries: Vec<ScanEntry>,
    pub summary: ScanSummary,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan(args) => run_scan(args),
        Command::Classify(args) => run_classify(args),
        Command::Serve(args) => run_serve(args),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let names = if args.stdin_names {
        let stdin = io::stdin();
        let source = NameListSource::from_reader(stdin.lock())?;
        Some(source.enumerate().context("reading names from STDIN")?)
    } else {
        None
    };

    let request = DetectRequest {
        library: library_options(
            &args.paths,
            args.system_fonts || (args.stdin_names && args.paths.is_empty()),
            args.follow_symlinks,
        )?,
        names,
        name_patterns: compile_patterns(&args.name_patterns)?,
        config: build_config(&args)?,
    };

    let show_progress = args.progress;
    let detection = detect(&request, |progress| {
        if show_progress {
            eprintln!("{}", progress_line(&progress));
        }
    })?;

    let entries = if args.supported_only {
        filter_verdict(detection.entries, Verdict::Supported)
    } else {
        detection.entries
    };
    emit(&entries, &args.output)
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    let mut candidates: Vec<Candidate> = args.names.iter().map(Candidate::named).collect();
    if args.stdin_names {
        let stdin = io::stdin();
        candidates.extend(NameListSource::from_reader(stdin.lock())?.enumerate()?);
    }

    let entries = classify_all(candidates);
    emit(&entries, &args.output)
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(server::serve(&args.bind))
}

fn classify_all(candidates: Vec<Candidate>) -> Vec<ScanEntry> {
    typj_core::candidate::dedup_candidates(candidates)
        .into_iter()
        .map(|c| ScanEntry {
            verdict: classify(&c.identity),
            identity: c.identity,
            display_label: c.display_label,
        })
        .collect()
}

fn build_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(yield_ms) = args.yield_ms {
        config.yield_delay_ms = yield_ms;
    }
    if let Some(probe) = args.probe {
        config.compare.probe = probe;
    }

    config.validate()?;
    Ok(config)
}

/// Run one complete detection on a private single-threaded runtime.
///
/// Blocking: call from a plain thread or a blocking task.
pub fn detect(request: &DetectRequest, on_batch: impl FnMut(ScanProgress)) -> Result<Detection> {
    let library = FontLibrary::load(&request.library)?;

    let source: Box<dyn CandidateSource> = match &request.names {
        Some(names) => Box::new(StaticSource::new(names.clone())),
        None => Box::new(library.clone()),
    };
    let source = PatternFilter {
        inner: source.as_ref(),
        patterns: &request.name_patterns,
    };

    let mut session = ScanSession::new(request.config.clone())?;
    session.ingest(&source)?;
    let mut comparator = host_comparator(&library, &request.config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting scan runtime")?;
    let summary = runtime.block_on(session.start_scan(&mut comparator, on_batch, |_| {}))?;

    Ok(Detection {
        entries: session.store().entries(),
        summary,
    })
}

/// Candidate source restricted to identities matching any pattern.
struct PatternFilter<'a> {
    inner: &'a dyn CandidateSource,
    patterns: &'a [Regex],
}

impl CandidateSource for PatternFilter<'_> {
    fn enumerate(&self) -> Result<Vec<Candidate>> {
        let candidates = self.inner.enumerate()?;
        if self.patterns.is_empty() {
            return Ok(candidates);
        }
        Ok(candidates
            .into_iter()
            .filter(|c| self.patterns.iter().any(|re| re.is_match(&c.identity)))
            .collect())
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("invalid regex: {p}")))
        .collect()
}

fn library_options(
    paths: &[PathBuf],
    include_system: bool,
    follow_symlinks: bool,
) -> Result<LibraryOptions> {
    let mut opts = LibraryOptions {
        roots: paths.to_vec(),
        system_fonts: include_system,
        follow_symlinks,
    };

    if include_system {
        if let Some(overrides) = system_font_overrides()? {
            opts.roots.extend(overrides);
            opts.system_fonts = false;
        }
    }

    Ok(opts)
}

/// Directories from `TYPJ_SYSTEM_FONT_DIRS`, replacing the platform's own.
fn system_font_overrides() -> Result<Option<Vec<PathBuf>>> {
    let Ok(raw) = env::var("TYPJ_SYSTEM_FONT_DIRS") else {
        return Ok(None);
    };

    let mut overrides: Vec<PathBuf> = raw
        .split([':', ';'])
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .collect();

    overrides.sort();
    overrides.dedup();

    if overrides.is_empty() {
        Err(anyhow!("TYPJ_SYSTEM_FONT_DIRS is set but no paths exist"))
    } else {
        Ok(Some(overrides))
    }
}

fn emit(entries: &[ScanEntry], output: &OutputArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let use_color = match output.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => handle.is_terminal(),
    };

    if output.ndjson {
        write_ndjson(entries, &mut handle)?;
    } else if output.json {
        write_json_pretty(entries, &mut handle)?;
    } else if output.columns {
        write_columns(entries, &mut handle, use_color)?;
    } else {
        write_plain(entries, &mut handle, use_color)?;
    }

    Ok(())
}

fn write_plain(entries: &[ScanEntry], mut w: impl Write, color: bool) -> Result<()> {
    for entry in entries {
        let verdict = apply_color(
            entry.verdict.as_str(),
            color,
            verdict_color(entry.verdict),
        );
        writeln!(w, "{}\t{verdict}", entry.identity)?;
    }
    Ok(())
}

fn write_columns(entries: &[ScanEntry], mut w: impl Write, color: bool) -> Result<()> {
    let identity_width = entries
        .iter()
        .map(|e| e.identity.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(0, 80);
    let label_width = entries
        .iter()
        .map(|e| e.display_label.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(0, 80);

    for entry in entries {
        let padded_identity = format!("{:<identity_width$}", entry.identity);
        let padded_label = format!("{:<label_width$}", entry.display_label);
        let rendered_identity = apply_color(&padded_identity, color, AnsiColor::Cyan);
        let rendered_verdict =
            apply_color(entry.verdict.as_str(), color, verdict_color(entry.verdict));

        writeln!(w, "{rendered_identity}  {padded_label}  {rendered_verdict}")?;
    }

    Ok(())
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Cyan,
    Yellow,
    Green,
    Red,
}

fn verdict_color(verdict: Verdict) -> AnsiColor {
    match verdict {
        Verdict::Supported => AnsiColor::Green,
        Verdict::Unsupported => AnsiColor::Red,
        Verdict::Unknown => AnsiColor::Yellow,
    }
}

fn apply_color(text: &str, color: bool, code: AnsiColor) -> String {
    if !color {
        return text.to_string();
    }

    let code_str = match code {
        AnsiColor::Cyan => "36",
        AnsiColor::Yellow => "33",
        AnsiColor::Green => "32",
        AnsiColor::Red => "31",
    };

    format!("\u{1b}[{}m{}\u{1b}[0m", code_str, text)
}

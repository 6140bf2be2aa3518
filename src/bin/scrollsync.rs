use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scrollsync", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scene frame by frame and print one JSON record per frame.
    Simulate(SimulateArgs),
    /// Print settled timeline progress and values at a fixed scroll offset.
    Sample(SampleArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Extra input script (JSON array of events), merged with the scene's own.
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Simulated frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Number of frames to run.
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Output path for JSON lines. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Skip frames that wrote nothing.
    #[arg(long, default_value_t = false)]
    changes_only: bool,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scroll offset to sample at.
    #[arg(long)]
    offset: f64,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Sample(args) => cmd_sample(args),
    }
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let scene = scrollsync::SceneConfig::from_path(&args.in_path)?;
    let inputs = match &args.inputs {
        Some(path) => scrollsync::SceneConfig::inputs_from_path(path)?,
        None => Vec::new(),
    };
    let opts = scrollsync::RunOptions {
        fps: args.fps,
        frames: args.frames,
    };
    let records = scrollsync::run_scene(&scene, &inputs, opts)
        .with_context(|| format!("simulate '{}'", args.in_path.display()))?;

    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut written = 0usize;
    for record in records
        .iter()
        .filter(|r| !args.changes_only || !r.writes.is_empty())
    {
        serde_json::to_writer(&mut out, record).context("serialize frame record")?;
        out.write_all(b"\n").context("write frame record")?;
        written += 1;
    }
    out.flush().context("flush output")?;

    if let Some(path) = &args.out {
        eprintln!("wrote {written} frames to {}", path.display());
    }
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let scene = scrollsync::SceneConfig::from_path(&args.in_path)?;
    let samples = scrollsync::sample_scene(&scene, args.offset)
        .with_context(|| format!("sample '{}'", args.in_path.display()))?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&samples)
    } else {
        serde_json::to_string(&samples)
    }
    .context("serialize samples")?;
    println!("{json}");
    Ok(())
}

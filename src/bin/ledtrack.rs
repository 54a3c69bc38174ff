use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ledtrack::{AutomationEngine, DesignAction, FrameIndex, Pattern, TrackId};

#[derive(Parser, Debug)]
#[command(name = "ledtrack", version)]
struct Cli {
    /// Log filter passed to tracing (e.g. `warn`, `ledtrack=debug`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a single frame and write it as a PNG.
    Frame(FrameArgs),
    /// Compare stored composites against fresh ones. Exits with 2 when out of sync.
    Check(InArgs),
    /// Recomposite every frame and save the project.
    Resync(ResyncArgs),
    /// Print dimensions, frames and tracks.
    Info(InArgs),
    /// Commit design actions onto a new track and save the project.
    Automate(AutomateArgs),
}

#[derive(Parser, Debug)]
struct InArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Integer upscale factor (nearest neighbour), one LED becomes `scale x scale` pixels.
    #[arg(long, default_value_t = 1)]
    scale: u32,
}

#[derive(Parser, Debug)]
struct ResyncArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct AutomateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// Id of the track the actions read from; the new track lands above it.
    #[arg(long)]
    track: u64,

    /// Design action as JSON, e.g. `{"kind":"invert"}`. Repeat to chain actions.
    #[arg(long = "action", required = true)]
    actions: Vec<String>,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive). Defaults to the end of the pattern.
    #[arg(long)]
    end: Option<u64>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Check(args) => cmd_check(args),
        Command::Resync(args) => cmd_resync(args),
        Command::Info(args) => cmd_info(args),
        Command::Automate(args) => cmd_automate(args),
    }
}

fn load(path: &Path) -> anyhow::Result<Pattern> {
    let f = std::fs::File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    Pattern::from_json_reader(std::io::BufReader::new(f))
        .with_context(|| format!("load project '{}'", path.display()))
}

fn save(pattern: &Pattern, path: &Path) -> anyhow::Result<()> {
    create_parent(path)?;
    let f = std::fs::File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    pattern
        .to_json_writer(std::io::BufWriter::new(f))
        .with_context(|| format!("write project '{}'", path.display()))?;
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<ExitCode> {
    if args.scale == 0 {
        anyhow::bail!("--scale must be >= 1");
    }
    let pattern = load(&args.in_path)?;
    let frame = pattern.get_composite(FrameIndex(args.frame))?;

    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.as_bytes())
        .context("composite buffer does not match its dimensions")?;
    let img = if args.scale > 1 {
        image::imageops::resize(
            &img,
            frame.width() * args.scale,
            frame.height() * args.scale,
            image::imageops::FilterType::Nearest,
        )
    } else {
        img
    };

    create_parent(&args.out)?;
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(args: InArgs) -> anyhow::Result<ExitCode> {
    let pattern = load(&args.in_path)?;
    let report = ledtrack::sync_report(&pattern)?;
    if report.is_in_sync() {
        println!("in sync ({} frames)", report.frames_checked);
        return Ok(ExitCode::SUCCESS);
    }
    for m in &report.out_of_sync {
        match m.first_diff {
            Some(i) => println!(
                "frame {}: {} pixel(s) differ, first at index {i}",
                m.frame.0, m.differing_pixels
            ),
            None => println!("frame {}: stored composite has the wrong size", m.frame.0),
        }
    }
    println!(
        "{} of {} frames out of sync",
        report.out_of_sync.len(),
        report.frames_checked
    );
    Ok(ExitCode::from(2))
}

fn cmd_resync(args: ResyncArgs) -> anyhow::Result<ExitCode> {
    let mut pattern = load(&args.in_path)?;
    ledtrack::resync_all(&mut pattern)?;
    save(&pattern, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_info(args: InArgs) -> anyhow::Result<ExitCode> {
    let pattern = load(&args.in_path)?;
    println!(
        "{}x{}, {} frame(s)",
        pattern.width(),
        pattern.height(),
        pattern.frame_count()
    );
    for t in pattern.tracks_by_z() {
        println!(
            "  {} z={} {:?} opacity={:.2}{}{} '{}' ({} frame(s))",
            t.id,
            t.z_index,
            t.blend_mode,
            t.opacity,
            if t.visible { "" } else { " hidden" },
            if t.locked { " locked" } else { "" },
            t.name,
            t.frames.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_automate(args: AutomateArgs) -> anyhow::Result<ExitCode> {
    let mut pattern = load(&args.in_path)?;
    let mut engine = AutomationEngine::new();
    for raw in &args.actions {
        let action: DesignAction =
            serde_json::from_str(raw).with_context(|| format!("parse action '{raw}'"))?;
        engine.queue_action(action)?;
    }
    let end = args.end.unwrap_or(pattern.frame_count() as u64);
    let range = ledtrack::FrameRange::new(FrameIndex(args.start), FrameIndex(end))?;
    let id = engine.commit_actions(&mut pattern, TrackId(args.track), &range.frames())?;
    pattern.recomposite_all()?;
    save(&pattern, &args.out)?;
    eprintln!("added track {id}, wrote {}", args.out.display());
    Ok(ExitCode::SUCCESS)
}

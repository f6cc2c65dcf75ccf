use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use image::{Delay, Frame};

use optiplay::{
    AxisBounds, ObjectiveAxes, RasterSurface, ReplayConfig, ReplaySession, SkipStrategy, Tick,
};

#[derive(Parser, Debug)]
#[command(name = "optiplay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a trajectory log and its pacing plan.
    Info(InfoArgs),
    /// Replay a trajectory log to PNG frames or an animated GIF.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input log (`<Problem>_<Algorithm>.jsonl` or assembled JSON).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target animation length in seconds.
    #[arg(long, default_value_t = 10)]
    duration: u32,

    /// Frame-rate ceiling.
    #[arg(long = "fps-cap", default_value_t = 30)]
    fps_cap: u32,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input log (`<Problem>_<Algorithm>.jsonl` or assembled JSON).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output: a directory for numbered PNG frames, or a `.gif` path.
    #[arg(long)]
    out: PathBuf,

    /// Target animation length in seconds.
    #[arg(long, default_value_t = 10)]
    duration: u32,

    /// Frame-rate ceiling.
    #[arg(long = "fps-cap", default_value_t = 30)]
    fps_cap: u32,

    /// Output frame size in pixels (square).
    #[arg(long, default_value_t = 960)]
    size: u32,

    /// Usable fraction of the frame; the rest is label margin.
    #[arg(long, default_value_t = 0.95)]
    zoom: f64,

    /// Skip policy for hybrid logs.
    #[arg(long, value_enum, default_value_t = StrategyChoice::Plateau)]
    strategy: StrategyChoice,

    /// Objective index plotted on the x axis.
    #[arg(long = "x-index", default_value_t = 0)]
    x_index: usize,

    /// Objective index plotted on the y axis.
    #[arg(long = "y-index", default_value_t = 1)]
    y_index: usize,

    /// Literal x axis bounds as `min,max` (defaults to the unit range).
    #[arg(long = "x-bounds", value_parser = parse_bounds)]
    x_bounds: Option<AxisBounds>,

    /// Literal y axis bounds as `min,max` (defaults to the unit range).
    #[arg(long = "y-bounds", value_parser = parse_bounds)]
    y_bounds: Option<AxisBounds>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyChoice {
    /// Fixed-window plateau skip.
    Plateau,
    /// Greedy-improvement micro-stepping.
    Greedy,
}

impl From<StrategyChoice> for SkipStrategy {
    fn from(choice: StrategyChoice) -> Self {
        match choice {
            StrategyChoice::Plateau => SkipStrategy::PLATEAU_DEFAULT,
            StrategyChoice::Greedy => SkipStrategy::GREEDY_DEFAULT,
        }
    }
}

fn parse_bounds(s: &str) -> Result<AxisBounds, String> {
    let (min, max) = s
        .split_once(',')
        .ok_or_else(|| "expected `min,max`".to_string())?;
    let min: f64 = min.trim().parse().map_err(|e| format!("min: {e}"))?;
    let max: f64 = max.trim().parse().map_err(|e| format!("max: {e}"))?;
    AxisBounds::new(min, max).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let config = ReplayConfig {
        duration_secs: args.duration,
        frame_rate_ceiling: args.fps_cap,
        ..ReplayConfig::default()
    };
    let session = ReplaySession::load(&args.in_path, config)
        .with_context(|| format!("load log '{}'", args.in_path.display()))?;

    let plan = session.plan();
    println!("problem:      {}", session.problem().kind_name());
    println!("snapshots:    {}", session.snapshot_count());
    println!("baseline:     {}", session.baseline().is_some());
    println!("frame rate:   {} fps", plan.frame_rate);
    println!("advance step: {}", plan.advance_step);
    println!(
        "frame budget: {} frames (~{}s)",
        plan.frame_budget(session.snapshot_count()),
        args.duration
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = ReplayConfig {
        duration_secs: args.duration,
        frame_rate_ceiling: args.fps_cap,
        viewport_width: f64::from(args.size),
        viewport_height: f64::from(args.size),
        zoom: args.zoom,
        objective_axes: ObjectiveAxes {
            x_index: args.x_index,
            y_index: args.y_index,
            x_bounds: args.x_bounds.unwrap_or_default(),
            y_bounds: args.y_bounds.unwrap_or_default(),
        },
        strategy: args.strategy.into(),
        title: None,
    };
    let mut session = ReplaySession::load(&args.in_path, config)
        .with_context(|| format!("load log '{}'", args.in_path.display()))?;

    if args.out.extension().is_some_and(|e| e == "gif") {
        render_gif(&mut session, &args)?;
    } else {
        render_frames(&mut session, &args)?;
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn render_gif(session: &mut ReplaySession, args: &RenderArgs) -> anyhow::Result<()> {
    use image::codecs::gif::{GifEncoder, Repeat};

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let file = File::create(&args.out)
        .with_context(|| format!("create gif '{}'", args.out.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;

    // An empty log still plans frame_rate 0; show its single frame for 1s.
    let delay = Delay::from_numer_denom_ms(1000, session.plan().frame_rate.max(1));

    let mut surface = RasterSurface::new(args.size, args.size);
    while session.tick(&mut surface) == Tick::Drew {
        let frame = Frame::from_parts(surface.image().clone(), 0, 0, delay);
        encoder.encode_frame(frame)?;
    }
    Ok(())
}

fn render_frames(session: &mut ReplaySession, args: &RenderArgs) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let mut surface = RasterSurface::new(args.size, args.size);
    let mut index = 0u64;
    while session.tick(&mut surface) == Tick::Drew {
        let path = args.out.join(format!("frame_{index:05}.png"));
        let image = surface.image();
        image::save_buffer_with_format(
            &path,
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        index += 1;
    }
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use framecast::encode::command::{display_args, encoder_args};
use framecast::session::params::normalize;
use framecast::{
    Capability, EncoderBackend, EventRouter, FfmpegBackend, JsonLinesChannel, RecorderConfig,
    SessionController, StartRequest,
};

#[derive(Parser, Debug)]
#[command(name = "framecast", version)]
struct Cli {
    /// JSON config file. Missing keys use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that receives recordings.
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Encoder binary.
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve recording sessions over JSON lines on stdin/stdout.
    Serve,
    /// Check that the encoder can be invoked.
    Probe,
    /// Print the encoder command a start event would launch.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Output file stem or sequence directory name.
    #[arg(long)]
    output_name: String,

    #[arg(long, value_enum, default_value_t = FormatChoice::Video)]
    format: FormatChoice,

    #[arg(long, default_value_t = 30.0)]
    frame_rate: f64,

    #[arg(long)]
    width: i64,

    #[arg(long)]
    height: i64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Video,
    ImageSequence,
}

impl FormatChoice {
    fn as_wire(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::ImageSequence => "image-sequence",
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    match cli.cmd {
        Command::Serve => cmd_serve(cfg),
        Command::Probe => cmd_probe(cfg),
        Command::Plan(args) => cmd_plan(cfg, args),
    }
}

fn init_tracing() {
    // stdout carries the event protocol, so logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_env("FRAMECAST_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<RecorderConfig> {
    let mut cfg = match &cli.config {
        Some(path) => RecorderConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => RecorderConfig::default(),
    };
    if let Some(out_dir) = &cli.out_dir {
        cfg = cfg.with_out_dir(out_dir);
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        cfg = cfg.with_ffmpeg_path(ffmpeg);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_serve(cfg: RecorderConfig) -> anyhow::Result<()> {
    let backend = FfmpegBackend::new(cfg.clone());
    let controller = SessionController::new(cfg, backend);
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let mut router = EventRouter::new(controller, JsonLinesChannel::new(stdin, stdout));

    let reports = router.run()?;
    let failed = reports.iter().filter(|r| !r.success).count();
    if failed > 0 {
        tracing::warn!(failed, "some encoder runs did not exit cleanly");
    }
    Ok(())
}

fn cmd_probe(cfg: RecorderConfig) -> anyhow::Result<()> {
    match FfmpegBackend::new(cfg).probe() {
        Capability::Available { version } => {
            println!("available: {version}");
            Ok(())
        }
        Capability::Unavailable { detail } => anyhow::bail!("unavailable: {detail}"),
        Capability::Unchecked => anyhow::bail!("probe did not run (bug)"),
    }
}

fn cmd_plan(cfg: RecorderConfig, args: PlanArgs) -> anyhow::Result<()> {
    let raw = StartRequest {
        output_name: args.output_name,
        format: args.format.as_wire().to_string(),
        frame_rate: args.frame_rate,
        expected_frame_count: None,
        width: args.width,
        height: args.height,
    };
    let desc = normalize(&raw, &cfg)?;
    if let Some(warning) = desc.crop_warning() {
        eprintln!("{warning}");
    }
    println!("{}", display_args(&cfg.ffmpeg_path, &encoder_args(&desc, &cfg)));
    Ok(())
}

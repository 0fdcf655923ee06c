use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use talkcut::{
    PipelineConfig, ProjectLayout, Stage, StageContext, StageOptions, SystemRunner, Transcriber,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "talkcut", version, about = "Transcript-driven post-production for talking-head video")]
struct Cli {
    /// Debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Align the external microphone recording with the camera video.
    Sync(SyncArgs),
    /// Remove long silences.
    JumpCut(JumpCutArgs),
    /// Produce the word-level transcript and the clean transcript.
    Transcribe(TranscribeArgs),
    /// Splice clips in after marked words (overlay-inserts.md).
    Inserts(CommonArgs),
    /// Full-screen image and video overlays (overlay-media.md).
    Media(MediaArgs),
    /// Black text cards (overlay-text.md).
    Text(TextArgs),
    /// Corner logos (overlay-logos.md).
    Logos(LogoArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Project directory.
    project: PathBuf,

    /// Input file in source/video (defaults to the previous stage's output).
    #[arg(long)]
    input: Option<String>,

    /// Output file in source/video.
    #[arg(long)]
    output: Option<String>,

    /// Detect and resolve only; write no media.
    #[arg(long)]
    dry_run: bool,

    /// x264 constant rate factor.
    #[arg(long)]
    crf: Option<u8>,

    /// x264 preset.
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Parser, Debug)]
struct SyncArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// External recording in source/audio.
    #[arg(long)]
    audio: Option<String>,

    /// Where the reference chunk starts in the camera recording (seconds).
    #[arg(long)]
    reference_start: Option<f64>,

    /// Reference chunk length (seconds).
    #[arg(long)]
    reference_duration: Option<f64>,

    /// Probe chunk length read from the start of the external recording (seconds).
    #[arg(long)]
    probe_duration: Option<f64>,
}

#[derive(Parser, Debug)]
struct JumpCutArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Air kept around each cut (seconds).
    #[arg(long)]
    padding: Option<f64>,

    /// Only silences longer than this are cut (seconds).
    #[arg(long)]
    min_silence: Option<f64>,

    /// Detector noise floor (dB).
    #[arg(long, allow_hyphen_values = true)]
    noise: Option<f64>,

    /// Shortest silence the detector reports (seconds).
    #[arg(long)]
    min_detect: Option<f64>,
}

#[derive(Parser, Debug)]
struct TranscribeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Only regenerate the clean transcript from the existing document.
    #[arg(long)]
    clean_only: bool,

    /// Only extract the audio sent to the recognizer, then stop.
    #[arg(long, conflicts_with = "clean_only")]
    audio_only: bool,

    /// Spoken language (ISO 639-1).
    #[arg(long)]
    language: Option<String>,

    /// Recognizer model.
    #[arg(long)]
    model: Option<String>,
}

#[derive(Parser, Debug)]
struct MediaArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Shortest overlay when no duration is given (seconds).
    #[arg(long)]
    min_duration: Option<f64>,
}

#[derive(Parser, Debug)]
struct TextArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Font file for the cards.
    #[arg(long)]
    font: Option<String>,

    /// Font size.
    #[arg(long)]
    font_size: Option<u32>,

    /// Shortest card (seconds).
    #[arg(long)]
    min_duration: Option<f64>,
}

#[derive(Parser, Debug)]
struct LogoArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Logo box size (px).
    #[arg(long)]
    size: Option<u32>,

    /// Distance from the bottom-right corner (px).
    #[arg(long)]
    padding: Option<u32>,

    /// Fade in/out length (seconds).
    #[arg(long)]
    fade: Option<f64>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl CommonArgs {
    fn apply(&self, cfg: &mut PipelineConfig) {
        set(&mut cfg.encode.crf, self.crf);
        set(&mut cfg.encode.preset, self.preset.clone());
    }

    fn options(&self) -> StageOptions {
        StageOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            ..StageOptions::default()
        }
    }
}

impl Command {
    fn stage(&self) -> Stage {
        match self {
            Self::Sync(_) => Stage::Sync,
            Self::JumpCut(_) => Stage::JumpCut,
            Self::Transcribe(_) => Stage::Transcribe,
            Self::Inserts(_) => Stage::Inserts,
            Self::Media(_) => Stage::Media,
            Self::Text(_) => Stage::Text,
            Self::Logos(_) => Stage::Logos,
        }
    }

    fn common(&self) -> &CommonArgs {
        match self {
            Self::Sync(a) => &a.common,
            Self::JumpCut(a) => &a.common,
            Self::Transcribe(a) => &a.common,
            Self::Inserts(a) => a,
            Self::Media(a) => &a.common,
            Self::Text(a) => &a.common,
            Self::Logos(a) => &a.common,
        }
    }

    /// Apply command-line overrides on top of the project configuration.
    fn apply(&self, cfg: &mut PipelineConfig) {
        self.common().apply(cfg);
        match self {
            Self::Sync(a) => {
                set(&mut cfg.sync.reference_start_sec, a.reference_start);
                set(&mut cfg.sync.reference_duration_sec, a.reference_duration);
                set(&mut cfg.sync.probe_duration_sec, a.probe_duration);
            }
            Self::JumpCut(a) => {
                set(&mut cfg.silence.padding_sec, a.padding);
                set(&mut cfg.silence.min_silence_sec, a.min_silence);
                set(&mut cfg.silence.noise_db, a.noise);
                set(&mut cfg.silence.min_detect_sec, a.min_detect);
            }
            Self::Transcribe(a) => {
                set(&mut cfg.transcribe.language, a.language.clone());
                set(&mut cfg.transcribe.model, a.model.clone());
            }
            Self::Inserts(_) => {}
            Self::Media(a) => {
                set(&mut cfg.overlay.timing.image_min_duration_sec, a.min_duration);
            }
            Self::Text(a) => {
                set(&mut cfg.overlay.font, a.font.clone());
                set(&mut cfg.overlay.font_size, a.font_size);
                set(&mut cfg.overlay.timing.text_min_duration_sec, a.min_duration);
            }
            Self::Logos(a) => {
                set(&mut cfg.overlay.logo_size_px, a.size);
                set(&mut cfg.overlay.logo_padding_px, a.padding);
                set(&mut cfg.overlay.fade_sec, a.fade);
            }
        }
    }

    fn options(&self) -> StageOptions {
        let mut opts = self.common().options();
        match self {
            Self::Sync(a) => opts.audio = a.audio.clone(),
            Self::Transcribe(a) => {
                opts.clean_only = a.clean_only;
                opts.audio_only = a.audio_only;
            }
            _ => {}
        }
        opts
    }

    fn needs_encoder(&self) -> bool {
        !matches!(self, Self::Transcribe(a) if a.clean_only)
    }

    fn needs_transcriber(&self) -> bool {
        matches!(
            self,
            Self::Transcribe(a) if !a.clean_only && !a.audio_only && !a.common.dry_run
        )
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = match (verbose, quiet) {
        (true, _) => EnvFilter::new("warn,talkcut=debug"),
        (_, true) => EnvFilter::new("warn"),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let stage = cli.cmd.stage();
    let common = cli.cmd.common();
    let layout = ProjectLayout::new(&common.project);
    if !layout.root().is_dir() {
        anyhow::bail!("project directory not found: {}", layout.root().display());
    }

    let mut config = PipelineConfig::load_or_default(layout.root())?;
    cli.cmd.apply(&mut config);
    config.validate().context("invalid configuration")?;

    if cli.cmd.needs_encoder() && !talkcut::is_on_path("ffmpeg") {
        anyhow::bail!("ffmpeg not found on PATH");
    }

    #[cfg(feature = "remote-transcribe")]
    let remote = if cli.cmd.needs_transcriber() {
        Some(talkcut::RemoteTranscriber::from_env(config.transcribe.clone())?)
    } else {
        None
    };
    #[cfg(feature = "remote-transcribe")]
    let transcriber = remote.as_ref().map(|t| t as &dyn Transcriber);
    #[cfg(not(feature = "remote-transcribe"))]
    if cli.cmd.needs_transcriber() {
        anyhow::bail!("transcription requires the `remote-transcribe` feature");
    }
    #[cfg(not(feature = "remote-transcribe"))]
    let transcriber: Option<&dyn Transcriber> = None;

    let mut runner = SystemRunner;
    let mut ctx = StageContext {
        layout,
        config,
        runner: &mut runner,
        transcriber,
        dry_run: common.dry_run,
    };
    let report = talkcut::run_stage(stage, &mut ctx, &cli.cmd.options())
        .with_context(|| format!("stage '{stage}' failed"))?;
    print!("{report}");
    Ok(())
}

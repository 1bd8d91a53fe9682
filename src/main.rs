use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use narrator::camera::{self, FrameSource, TestPattern, Webcam};
use narrator::capture::{CaptureDispatcher, CaptureState};
use narrator::voice::{AudioPlayback, DecodedAudio, Speaker, TextToSpeech, TtsProvider, VoiceOutput};
use narrator::{Config, ConfigOverrides, DesktopWindow, DisplayLoop, NarrationSettings, Narrator, OpenAiVision};

/// Synthetic source size when running without a camera
const TEST_PATTERN_SIZE: (u32, u32) = (640, 480);
const TEST_PATTERN_FPS: u32 = 30;

/// Narrator - describe what the webcam sees and say it out loud
#[derive(Parser)]
#[command(name = "narrator", version, about)]
struct Cli {
    /// Voice id for speech (falls back to VOICE_ID)
    #[arg(long = "voice-id", visible_alias = "voice_id")]
    voice_id: Option<String>,

    /// Text file holding the system message
    #[arg(long = "txt-file", visible_alias = "txt_file")]
    txt_file: Option<PathBuf>,

    /// Camera device index
    #[arg(long)]
    camera: Option<u32>,

    /// Use a synthetic test pattern instead of a camera
    #[arg(long)]
    test_pattern: bool,

    /// Feed previous narrations back to the model
    #[arg(long)]
    keep_context: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List available cameras
    ListCameras,
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output with the configured voice
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

fn main() -> ExitCode {
    // Missing .env is fine; keys may come from the real environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));

    let filter = match cli.verbose {
        0 => "info,narrator=info",
        1 => "info,narrator=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Single-dash long flags accepted for compatibility
const LEGACY_FLAGS: [&str; 2] = ["-voice_id", "-txt_file"];

/// Accept the single-dash long flags (`-voice_id abc`, `-voice_id=abc`)
fn normalize_legacy_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let legacy = LEGACY_FLAGS.iter().any(|flag| {
                text.strip_prefix(flag)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
            });
            if legacy {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        voice_id: cli.voice_id,
        txt_file: cli.txt_file,
        camera: cli.camera,
        test_pattern: cli.test_pattern,
        keep_context: cli.keep_context,
    };

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::ListCameras => list_cameras(),
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&overrides, &text),
        };
    }

    let config = Config::load(&overrides)?;
    tracing::debug!(?config, "loaded configuration");

    config.ensure_frames_dir()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let narrator = Arc::new(build_narrator(&config)?);
    let state = Arc::new(CaptureState::new());

    println!("starting threaded video stream...");
    let mut frames = if config.test_pattern {
        let (width, height) = TEST_PATTERN_SIZE;
        FrameSource::open(move || Ok(TestPattern::new(width, height, TEST_PATTERN_FPS)))?
    } else {
        let index = config.camera_index;
        FrameSource::open(move || Webcam::open(index))?
    };
    frames.start();

    let first = frames.read();
    let window = DesktopWindow::open(first.width() as usize, first.height() as usize)?;

    let dispatcher = CaptureDispatcher::new(state, narrator, runtime.handle().clone())
        .keep_context(config.keep_context);

    tracing::info!(
        voice = %config.voice_id,
        model = %config.vision.model,
        keep_context = config.keep_context,
        "narrator ready - press 'd' to describe, 'q' to quit"
    );

    DisplayLoop::new(window, frames, dispatcher).run()?;

    Ok(())
}

/// Wire the vision and speech clients from configuration
fn build_narrator(config: &Config) -> anyhow::Result<Narrator> {
    let vision = OpenAiVision::new(config.api_keys.openai.clone().unwrap_or_default())?
        .with_model(config.vision.model.clone());

    let speaker = VoiceOutput::new(build_tts(config)?);

    let settings = NarrationSettings {
        voice: config.voice_id.clone(),
        system_message: config.system_message.clone(),
        max_tokens: config.vision.max_tokens,
        snapshot_path: config.snapshot_path(),
    };

    Ok(Narrator::new(Arc::new(vision), Arc::new(speaker), settings))
}

fn build_tts(config: &Config) -> narrator::Result<TextToSpeech> {
    match config.voice.provider {
        TtsProvider::ElevenLabs => TextToSpeech::new_elevenlabs(
            config.api_keys.elevenlabs.clone().unwrap_or_default(),
            config.voice.model.clone(),
        ),
        TtsProvider::OpenAI => TextToSpeech::new_openai(
            config.api_keys.openai.clone().unwrap_or_default(),
            config.voice.model.clone(),
            1.0,
        ),
    }
}

/// List cameras the native backend can see
fn list_cameras() -> anyhow::Result<()> {
    let cameras = camera::list_cameras()?;

    if cameras.is_empty() {
        println!("No cameras found");
        return Ok(());
    }

    println!("{:<5} | {:<30} | {:<10}", "Index", "Name", "Misc");
    println!("{}", "-".repeat(60));
    for cam in cameras {
        println!("{:<5} | {:<30} | {}", cam.index, cam.name, cam.misc);
    }

    Ok(())
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;

    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;
    let num_samples = sample_rate as usize * 2;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    playback.play(&DecodedAudio {
        samples,
        sample_rate,
    })?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");

    Ok(())
}

/// Test TTS output with the configured provider and voice
fn test_tts(overrides: &ConfigOverrides, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load(overrides)?;
    let speaker = VoiceOutput::new(build_tts(&config)?);

    println!("Synthesizing speech with voice {}...", config.voice_id);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(speaker.speak(text, &config.voice_id))?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}

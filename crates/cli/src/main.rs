#![deny(warnings)]

mod wire;

use anyhow::Context;
use clap::{ArgGroup, Parser};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use voice_emotion_core::config::EngineConfig;
use voice_emotion_core::engine::Engine;
use voice_emotion_core::events::{SessionEvent, SessionId};
use voice_emotion_core::sink::ChannelSink;

const ENV_LOG_LEVEL: &str = "VOICE_EMOTION_LOG";

#[derive(Parser, Debug)]
#[command(name = "voice-emotion")]
#[command(about = "Live speech emotion estimates from audio chunks and finalized turns")]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(false)
        .args(["events", "wav"])
))]
struct Args {
    /// Read line-delimited JSON session events on stdin, write emotion
    /// events on stdout.
    #[arg(long)]
    events: bool,

    /// Analyze a 16 kHz mono 16-bit WAV file as one synthetic session.
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Chunk size for WAV analysis.
    #[arg(long, default_value_t = 100)]
    chunk_ms: u64,

    /// Session id stamped on WAV-mode emissions.
    #[arg(long, default_value = "wav-session")]
    session_id: String,

    #[arg(long, env = ENV_LOG_LEVEL, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = EngineConfig::default().validated()?;

    match (args.events, args.wav.as_deref()) {
        (true, None) => run_events(config).await,
        (false, Some(path)) => run_wav(config, path, args.chunk_ms, &args.session_id).await,
        _ => anyhow::bail!("exactly one of --events or --wav must be provided"),
    }
}

async fn run_events(config: EngineConfig) -> anyhow::Result<()> {
    let engine = Engine::new(&config);
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(config.channel_capacity);
    let (sink, mut emissions) = ChannelSink::new(config.channel_capacity);

    let engine_task = tokio::spawn(engine.run(event_rx, sink));

    // Emissions own stdout; everything else logs to stderr.
    let writer_task = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = emissions.recv().await {
            let mut line = serde_json::to_vec(&event)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<(), anyhow::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<wire::InboundMessage>(trimmed) {
            Ok(message) => match message.into_event() {
                Ok(event) => {
                    if event_tx.send(event).await.is_err() {
                        tracing::error!("engine stopped, no longer accepting events");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "dropping invalid event");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable line");
            }
        }
    }
    drop(event_tx);

    let stats = engine_task.await.context("engine task stopped")??;
    writer_task.await.context("writer task stopped")??;

    tracing::info!(
        chunks = stats.chunks_processed,
        rejected = stats.chunks_rejected,
        turns = stats.turns_aligned,
        skipped = stats.turns_skipped,
        "event stream finished"
    );
    Ok(())
}

async fn run_wav(
    config: EngineConfig,
    path: &Path,
    chunk_ms: u64,
    session_id: &str,
) -> anyhow::Result<()> {
    let session_id = SessionId::new(session_id)?;
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    anyhow::ensure!(
        spec.channels == 1,
        "expected mono audio, got {} channels",
        spec.channels
    );
    anyhow::ensure!(
        spec.sample_rate == config.sample_rate_hz,
        "expected {} Hz audio, got {} Hz",
        config.sample_rate_hz,
        spec.sample_rate
    );
    anyhow::ensure!(
        spec.bits_per_sample == 16 && spec.sample_format == hound::SampleFormat::Int,
        "expected 16-bit signed PCM"
    );

    let samples: Vec<i16> = reader
        .into_samples::<i16>()
        .collect::<Result<_, _>>()
        .context("failed to read WAV samples")?;
    let samples_per_chunk = (u64::from(config.sample_rate_hz) * chunk_ms / 1000) as usize;
    anyhow::ensure!(samples_per_chunk > 0, "--chunk-ms too small");

    let mut engine = Engine::new(&config);
    let mut stdout = std::io::stdout().lock();

    engine.handle_event(SessionEvent::Start {
        session_id: session_id.clone(),
    })?;
    for (index, chunk) in samples.chunks(samples_per_chunk).enumerate() {
        let timestamp_ms = (index as u64 * chunk_ms) as i64;
        let pcm: Vec<u8> = chunk.iter().flat_map(|s| s.to_le_bytes()).collect();
        let event = SessionEvent::Audio {
            session_id: session_id.clone(),
            pcm: pcm.into(),
            timestamp_ms,
        };
        if let Some(emission) = engine.handle_event(event)? {
            serde_json::to_writer(&mut stdout, &emission)?;
            writeln!(stdout)?;
        }
    }
    engine.handle_event(SessionEvent::End { session_id })?;

    let stats = engine.stats();
    tracing::info!(chunks = stats.chunks_processed, "wav analysis finished");
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

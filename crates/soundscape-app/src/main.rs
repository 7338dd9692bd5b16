//! Soundscape - command-line composition player
//!
//! `soundscape play` renders a saved composition to the default output
//! device. `soundscape inspect` validates one and prints its features.

mod output;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use soundscape_audio::{EngineConfig, FileAssetLoader, Session, SoundscapeEngine};
use soundscape_core::{PackAssetResolver, LAST_SCENE_INDEX};
use soundscape_scene::{Composition, CompositionFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soundscape", version, about = "Spatial soundscape player")]
struct Cli {
    /// Log filter, e.g. `debug` or `soundscape_audio=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a composition until Ctrl-C, or through all scenes once.
    Play(PlayArgs),
    /// Validate a composition and print its features.
    Inspect {
        file: PathBuf,
    },
}

#[derive(Args)]
struct PlayArgs {
    file: PathBuf,

    /// Scene slot to loop.
    #[arg(long, default_value_t = 0, conflicts_with = "all")]
    scene: usize,

    /// Play every scene in sequence.
    #[arg(long)]
    all: bool,

    /// Directory asset URLs resolve against.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Engine config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Inspect { file } => inspect(&file),
        Command::Play(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(play(args))
        }
    }
}

fn load_composition(path: &Path) -> Result<Composition> {
    let file = CompositionFile::load_from_file(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(file.composition)
}

fn print_features(composition: &Composition) {
    let f = composition.features();
    println!("pack:                  {}", composition.pack);
    println!("sources:               {}", f.num_sources);
    println!("music sources:         {}", f.num_music_sources);
    println!("ambience sources:      {}", f.num_ambience_sources);
    println!("avg sources per scene: {:.2}", f.avg_sources_per_scene);
}

fn inspect(path: &Path) -> Result<()> {
    let composition = load_composition(path)?;
    print_features(&composition);

    let issues = composition.validation_issues();
    if issues.is_empty() {
        println!("valid");
        return Ok(());
    }
    for issue in &issues {
        println!("invalid: {}", issue);
    }
    bail!("{} validation issue(s) in {}", issues.len(), path.display())
}

async fn play(args: PlayArgs) -> Result<()> {
    if args.scene > LAST_SCENE_INDEX {
        bail!("Scene must be between 0 and {}", LAST_SCENE_INDEX);
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(assets) = args.assets {
        config.asset_root = assets;
    }

    let composition = load_composition(&args.file)?;
    composition.validate()?;
    print_features(&composition);

    let device = output::OutputDevice::open(config.sample_rate)?;
    config.sample_rate = device.sample_rate();

    let loader = Arc::new(FileAssetLoader::new(&config.asset_root));
    let (engine, mixer) =
        SoundscapeEngine::new(&config, loader, Arc::new(PackAssetResolver::new()));
    let _stream = device.start(mixer)?;

    let mut session = Session::new(engine.clone(), &config);
    session.load_composition(&composition)?;
    let loaded = engine.preload_pack(composition.pack).await;
    info!(loaded, "Assets ready");

    if args.all {
        session.play_all();
    } else {
        session.select_scene(args.scene)?;
        session.play();
    }
    session.sync().await;
    info!(scene = session.current_slot(), "Playing, Ctrl-C to stop");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            change = session.next_sequence_change() => {
                let Some(state) = change else { break };
                session.sync().await;
                if !session.is_playing() {
                    info!("Sequence finished");
                    break;
                }
                info!(scene = state.index, "Scene changed");
            }
        }
    }

    session.pause();
    session.sync().await;
    engine.close();
    info!("Stopped");
    Ok(())
}

/// Tensai - headless media player driven from stdin
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tensai_cli::{
    import_manifest, App, AppConfig, ClockSink, Command, Flow, FsResolver, JsonFileStore,
    LibraryStore, TerminalPresenter,
};
use tensai_core::{LibraryProvider, PersistenceProvider, Settings};
use tensai_playback::PlayerSession;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tensai")]
#[command(about = "Tensai headless media player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TENSAI_CONFIG")]
    config: Option<PathBuf>,

    /// Simulated length of every item, in seconds
    #[arg(long, default_value_t = 30)]
    track_length: u64,

    /// Progress report interval, in milliseconds
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// Print progress lines
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is for the player
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tensai_cli=info,tensai_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let store: Arc<dyn PersistenceProvider> =
        Arc::new(JsonFileStore::open(&config.storage.state_dir).await?);
    tracing::info!("State directory: {}", config.storage.state_dir.display());

    if let Some(manifest) = &config.storage.library_manifest {
        if let Err(e) = import_manifest(store.as_ref(), manifest).await {
            tracing::warn!(error = %e, "Library manifest import failed");
        }
    }

    let library = LibraryStore::load(Arc::clone(&store)).await?;

    let settings = match store.load_settings().await {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load settings, using defaults");
            Settings::default()
        }
    };

    // Persisted settings win over the config file
    let mut player = config.player.clone();
    player.auto_play_next = settings.auto_play_next;
    player.gapless_playback = settings.gapless_playback;

    let provider: Arc<dyn LibraryProvider> = library.shared();
    let session = PlayerSession::build(
        Box::new(ClockSink::new(
            Duration::from_secs(cli.track_length),
            Duration::from_millis(cli.tick_ms),
        )),
        Arc::new(FsResolver::new()),
        provider,
        Box::new(TerminalPresenter::stdout(cli.progress)),
        &player,
    );
    let (handle, task) = session.spawn();
    tracing::info!("Player ready, type `help` for commands");

    let mut app = App::new(handle.clone(), library, store, settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match app.execute(command).await {
            Ok(Flow::Continue(Some(output))) => println!("{output}"),
            Ok(Flow::Continue(None)) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    if let Err(e) = handle.shutdown().await {
        tracing::debug!(error = %e, "Session already stopped");
    }
    task.await?;

    tracing::info!("Bye");
    Ok(())
}

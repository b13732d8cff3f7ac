/// MediaCore - command-line front end for the playback core
mod config;
mod sim;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use config::CliConfig;
use mediacore_core::{format_duration, FeedPage, MediaItem};
use mediacore_playback::{
    AudioSessionController, JsonFileStorage, LibraryStore, PlaybackState, PlaybackStateStore,
    RepeatMode, SharedStore, StateStorage,
};
use sim::SimulatedEngine;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mediacore")]
#[command(about = "MediaCore playback core driver", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./mediacore.toml)
    #[arg(short, long, env = "MEDIACORE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the persisted player state
    Status,
    /// Queue a catalog feed and play it on the simulated engine
    Play {
        /// Feed page JSON file
        #[arg(short, long)]
        feed: PathBuf,
        /// Queue index to start from
        #[arg(short, long, default_value_t = 0)]
        index: usize,
        /// How long to run the session, in seconds
        #[arg(short, long, default_value_t = 10)]
        seconds: u64,
    },
    /// Advance to the next queued track
    Next,
    /// Go back one track (or restart the current one)
    Previous,
    /// Toggle shuffle
    Shuffle,
    /// Set repeat mode
    Repeat {
        /// off, all or one
        #[arg(value_parser = parse_repeat_mode)]
        mode: RepeatMode,
    },
    /// Set volume (0.0 - 1.0)
    Volume {
        level: f32,
    },
    /// Show or clear playback history
    History {
        /// Clear history instead of printing it
        #[arg(long)]
        clear: bool,
    },
    /// Like or unlike the current track
    Like {
        /// Queue index to like instead of the current track
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// List liked songs
    Liked {
        /// Remove a song from the library by id
        #[arg(long)]
        remove: Option<String>,
    },
}

fn parse_repeat_mode(value: &str) -> Result<RepeatMode, String> {
    RepeatMode::from_str(&value.to_ascii_lowercase())
        .ok_or_else(|| format!("unknown repeat mode '{value}' (expected off, all or one)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mediacore=info,mediacore_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Status => {
            let store = load_store(&config).await;
            print_state(&store.snapshot());
        }
        Commands::Play {
            feed,
            index,
            seconds,
        } => {
            play(&config, feed, index, Duration::from_secs(seconds)).await?;
        }
        Commands::Next => {
            update(&config, |store| match store.play_next() {
                Some(track) => println!("Now playing: {}", describe(&track)),
                None => println!("End of queue"),
            })
            .await?;
        }
        Commands::Previous => {
            update(&config, |store| match store.play_previous() {
                Some(track) => println!("Now playing: {}", describe(&track)),
                None => println!("Queue is empty"),
            })
            .await?;
        }
        Commands::Shuffle => {
            update(&config, |store| {
                store.toggle_shuffle();
                println!("Shuffle {}", if store.is_shuffled() { "on" } else { "off" });
            })
            .await?;
        }
        Commands::Repeat { mode } => {
            update(&config, |store| {
                store.set_repeat_mode(mode);
                println!("Repeat {mode}");
            })
            .await?;
        }
        Commands::Volume { level } => {
            update(&config, |store| {
                store.set_volume(level);
                println!("Volume {:.0}%", store.volume() * 100.0);
            })
            .await?;
        }
        Commands::History { clear: true } => {
            update(&config, |store| {
                store.clear_history();
                println!("History cleared");
            })
            .await?;
        }
        Commands::History { clear: false } => {
            let store = load_store(&config).await;
            let history = store.history();
            if history.is_empty() {
                println!("History is empty");
            }
            for (i, track) in history.to_vec().iter().enumerate() {
                println!("  {:>2}. {}", i + 1, describe(track));
            }
        }
        Commands::Like { index } => {
            let store = load_store(&config).await;
            let track = match index {
                Some(index) => store.queue().get(index).cloned(),
                None => store.current_track().cloned(),
            }
            .ok_or_else(|| anyhow!("no track to like"))?;

            let liked = update_library(&config, |library| library.toggle_like(track.clone())).await?;
            let verb = if liked { "Liked" } else { "Unliked" };
            println!("{verb}: {}", describe(&track));
        }
        Commands::Liked { remove: Some(id) } => {
            let removed = update_library(&config, |library| library.remove_from_library(&id)).await?;
            if removed {
                println!("Removed {id} from library");
            } else {
                println!("{id} is not in the library");
            }
        }
        Commands::Liked { remove: None } => {
            let library = LibraryStore::rehydrate(config.storage.library_key.clone(), &storage(&config)).await;
            if library.is_empty() {
                println!("No liked songs");
            }
            for (i, track) in library.liked_songs().iter().enumerate() {
                println!("  {:>2}. {}", i + 1, describe(track));
            }
        }
    }

    Ok(())
}

fn storage(config: &CliConfig) -> JsonFileStorage {
    JsonFileStorage::new(config.storage.dir.clone())
}

async fn load_store(config: &CliConfig) -> PlaybackStateStore {
    PlaybackStateStore::rehydrate(config.playback.clone(), &storage(config)).await
}

/// Apply one library operation to the persisted library and save it
async fn update_library<R>(config: &CliConfig, f: impl FnOnce(&mut LibraryStore) -> R) -> anyhow::Result<R> {
    let storage = storage(config);
    let mut library = LibraryStore::rehydrate(config.storage.library_key.clone(), &storage).await;
    let output = f(&mut library);
    library
        .persist(&storage)
        .await
        .context("failed to save library")?;
    Ok(output)
}

/// Apply one store operation to the persisted state and save it
async fn update(config: &CliConfig, f: impl FnOnce(&mut PlaybackStateStore)) -> anyhow::Result<()> {
    let mut store = load_store(config).await;
    f(&mut store);
    store
        .persist(&storage(config))
        .await
        .context("failed to save player state")
}

async fn play(config: &CliConfig, feed: PathBuf, index: usize, run_for: Duration) -> anyhow::Result<()> {
    let body = tokio::fs::read_to_string(&feed)
        .await
        .with_context(|| format!("failed to read feed {}", feed.display()))?;
    let items = FeedPage::from_json(&body)?.into_media_items();
    if items.is_empty() {
        anyhow::bail!("feed {} has no playable entries", feed.display());
    }
    tracing::info!(count = items.len(), "Loaded feed");

    let state = run_session(config, &storage(config), items, index, run_for).await?;
    print_state(&state);
    Ok(())
}

/// Queue `items`, play from `index` on the simulated engine for `run_for`,
/// then persist and return the final state
async fn run_session(
    config: &CliConfig,
    storage: &dyn StateStorage,
    items: Vec<MediaItem>,
    index: usize,
    run_for: Duration,
) -> anyhow::Result<PlaybackState> {
    let engine = SimulatedEngine::new(
        Duration::from_secs(config.engine.default_track_seconds),
        config.engine.speed,
    )
    .with_items(&items);

    let shared = SharedStore::new(PlaybackStateStore::rehydrate(config.playback.clone(), storage).await);
    let track = shared
        .update(|store| {
            store.set_queue(items);
            store.skip_to(index)
        })
        .ok_or_else(|| anyhow!("index {index} is out of range"))?;

    let (session, task) = AudioSessionController::new(engine, shared.clone()).spawn();
    session.play_track(track).await?;

    let deadline = tokio::time::sleep(run_for);
    tokio::pin!(deadline);
    let mut progress = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            () = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            _ = progress.tick() => {
                let state = shared.snapshot();
                if let Some(track) = &state.current_track {
                    tracing::info!(
                        track = %track.title,
                        position = %format_duration(state.position.as_secs()),
                        duration = %format_duration(state.duration.as_secs()),
                        playing = state.is_playing,
                        buffering = state.is_buffering,
                        "Progress"
                    );
                }
            }
        }
    }

    session.shutdown().await?;
    task.await?;

    shared
        .persist(storage)
        .await
        .context("failed to save player state")?;
    Ok(shared.snapshot())
}

fn describe(track: &MediaItem) -> String {
    format!("{} - {} [{}]", track.artist, track.title, track.duration)
}

fn print_state(state: &PlaybackState) {
    match &state.current_track {
        Some(track) => println!("Current: {}", describe(track)),
        None => println!("Current: -"),
    }
    println!(
        "Repeat: {}  Shuffle: {}  Volume: {:.0}%  Rate: {}x",
        state.repeat_mode,
        if state.is_shuffled { "on" } else { "off" },
        state.volume * 100.0,
        state.playback_rate
    );

    println!("Queue ({}):", state.queue.len());
    for (i, track) in state.queue.iter().enumerate() {
        let marker = if state.queue_index == Some(i) { ">" } else { " " };
        println!(" {marker}{:>3}. {}", i + 1, describe(track));
    }
    println!("History: {} tracks", state.history.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediacore_playback::MemoryStorage;

    #[test]
    fn parses_repeat_modes() {
        assert_eq!(parse_repeat_mode("ALL"), Ok(RepeatMode::All));
        assert_eq!(parse_repeat_mode("one"), Ok(RepeatMode::One));
        assert!(parse_repeat_mode("twice").is_err());
    }

    #[test]
    fn cli_parses_play() {
        let cli = Cli::try_parse_from(["mediacore", "play", "--feed", "feed.json", "-i", "2"]).unwrap();
        match cli.command {
            Commands::Play {
                feed,
                index,
                seconds,
            } => {
                assert_eq!(feed, PathBuf::from("feed.json"));
                assert_eq!(index, 2);
                assert_eq!(seconds, 10);
            }
            _ => panic!("expected play"),
        }
    }

    #[tokio::test]
    async fn update_persists_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = CliConfig::default();
        config.storage.dir = dir.path().to_path_buf();

        update(&config, |store| store.set_volume(0.25)).await.unwrap();
        update(&config, |store| store.set_repeat_mode(RepeatMode::All))
            .await
            .unwrap();

        let store = load_store(&config).await;
        assert_eq!(store.volume(), 0.25);
        assert_eq!(store.repeat_mode(), RepeatMode::All);
    }

    #[tokio::test]
    async fn update_library_persists_likes() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = CliConfig::default();
        config.storage.dir = dir.path().to_path_buf();
        let track = MediaItem::audio("1", "One", "A", "https://a/1.mp3");

        assert!(update_library(&config, |library| library.toggle_like(track.clone())).await.unwrap());

        let library = LibraryStore::rehydrate(config.storage.library_key.clone(), &storage(&config)).await;
        assert!(library.is_liked("1"));
        // Player state lives under a different key
        assert!(load_store(&config).await.queue().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn session_advances_through_feed_and_persists() {
        let storage = MemoryStorage::new();
        let mut config = CliConfig::default();
        config.playback.auto_advance = true;
        let items = vec![
            MediaItem::audio("1", "One", "A", "https://a/1.mp3").with_duration_ms(2_000),
            MediaItem::audio("2", "Two", "A", "https://a/2.mp3").with_duration_ms(60_000),
        ];

        let state = run_session(&config, &storage, items, 0, Duration::from_secs(3))
            .await
            .unwrap();

        assert_eq!(state.current_track_id(), Some("2"));
        assert_eq!(state.queue_index, Some(1));
        assert!(state.is_playing);
        assert!(state.position > Duration::ZERO);

        let restored = PlaybackStateStore::rehydrate(config.playback.clone(), &storage).await;
        assert_eq!(restored.current_track_id(), Some("2"));
        assert_eq!(restored.queue().len(), 2);
        assert!(!restored.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn session_rejects_out_of_range_index() {
        let storage = MemoryStorage::new();
        let items = vec![MediaItem::audio("1", "One", "A", "https://a/1.mp3")];

        let result = run_session(&CliConfig::default(), &storage, items, 5, Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}

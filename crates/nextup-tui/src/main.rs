// nextup entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Create mpsc channels
// 4. Build the engine and load the default list
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use nextup_core::config;
use nextup_core::engine::Engine;
use nextup_core::source::loader_from_config;
use nextup_tui::app;
use nextup_tui::sinks::{ChannelCelebration, TerminalBell};
use nextup_tui::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("nextup starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded from {}: {} lists at {}, default {}, spin {}s",
        config.base_dir.display(),
        config.sources.lists.len(),
        config.sources.location,
        config.sources.default,
        config.spin.duration_secs
    );

    // 3. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 4. Build the engine and load the default list
    let mut engine = Engine::new(loader_from_config(&config))
        .with_spin_duration(config.spin_duration())
        .with_audio(TerminalBell {
            on_tick: config.audio.tick,
            on_settle: config.audio.bell,
        })
        .with_celebration(ChannelCelebration::new(ui_tx.clone()));
    let loaded = engine.load_from(config.default_source()).await;
    info!("Loaded {} entries from {}", loaded, config.sources.default);

    // 5. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, engine).await {
            error!("Application loop error: {}", e);
        }
    });

    // 6. Run the TUI (blocks until the user presses 'q' or Ctrl+C)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 7. Cleanup: wait for app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("nextup shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("nextup.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("nextup=info,nextup_core=info,nextup_tui=info,warn")
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

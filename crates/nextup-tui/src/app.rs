// App loop: owns the engine and bridges it to the TUI.
//
// A single task selects over user commands and the engine's spin events.
// The engine pump is only polled while a spin is running.

use nextup_core::engine::{Engine, EngineEvent, PickOutcome};
use nextup_core::pool::MAX_POOL_SIZE;
use nextup_core::{Snapshot, Source};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::protocol::{UiUpdate, UserCommand};

/// Run the app loop until the user quits or the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut engine: Engine,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    send_snapshot(&ui_tx, engine.snapshot()).await;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut engine, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Spin events (only while spinning) ---
            event = engine.next_event(), if engine.is_spinning() => {
                if let Some(event) = event {
                    let settled = matches!(event, EngineEvent::Settled { .. });
                    forward_engine_event(event, &ui_tx).await;
                    if settled {
                        send_snapshot(&ui_tx, engine.snapshot()).await;
                    }
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(ui_tx: &mpsc::Sender<UiUpdate>, snapshot: Snapshot) {
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

async fn notice(ui_tx: &mpsc::Sender<UiUpdate>, text: impl Into<String>) {
    let _ = ui_tx.send(UiUpdate::Notice(text.into())).await;
}

async fn handle_user_command(
    engine: &mut Engine,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Pick => match engine.pick() {
            PickOutcome::Started => send_snapshot(ui_tx, engine.snapshot()).await,
            PickOutcome::NothingToDraw => {
                let text = if engine.pool().is_empty() {
                    "The list is empty, add some names first"
                } else {
                    "Everyone has been picked, switch lists to start over"
                };
                notice(ui_tx, text).await;
            }
            PickOutcome::AlreadySpinning => {}
        },
        UserCommand::AddEntry(text) => {
            if engine.add_entry(&text) {
                send_snapshot(ui_tx, engine.snapshot()).await;
            } else if engine.pool().is_full() {
                notice(ui_tx, format!("The list is full ({MAX_POOL_SIZE} names max)")).await;
            }
        }
        UserCommand::RemoveEntry(name) => {
            if engine.remove_entry(&name) {
                send_snapshot(ui_tx, engine.snapshot()).await;
            }
        }
        UserCommand::SwitchSource(name) => {
            let source = Source::parse(&name);
            info!("Switching to list {}", source);
            let size = engine.load_from(source).await;
            if size == 0 && !matches!(engine.active_source(), Source::Custom) {
                notice(ui_tx, format!("Could not load any names from `{name}`")).await;
            }
            send_snapshot(ui_tx, engine.snapshot()).await;
        }
        UserCommand::SetSpinDuration(secs) => {
            if engine.set_spin_duration(secs) {
                debug!("Spin duration set to {}s", secs);
                send_snapshot(ui_tx, engine.snapshot()).await;
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

async fn forward_engine_event(event: EngineEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
    match event {
        EngineEvent::Tick { count } => {
            let _ = ui_tx.send(UiUpdate::Tick { count }).await;
        }
        EngineEvent::Countdown { remaining_secs } => {
            let _ = ui_tx.send(UiUpdate::Countdown { remaining_secs }).await;
        }
        EngineEvent::Settled { winner, ordinal } => {
            let _ = ui_tx
                .send(UiUpdate::Settled {
                    winner: winner.to_string(),
                    ordinal,
                })
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use nextup_core::source::StaticSource;
    use nextup_core::DrawState;
    use std::time::Duration;
    use tokio::task::JoinHandle;

    struct Harness {
        cmd_tx: mpsc::Sender<UserCommand>,
        ui_rx: mpsc::Receiver<UiUpdate>,
        handle: JoinHandle<anyhow::Result<()>>,
    }

    async fn start() -> Harness {
        let loader = StaticSource::new()
            .with_list("home", "Ada\nGrace")
            .with_list("solo", "Linus");
        let mut engine = Engine::new(Box::new(loader));
        engine.set_spin_duration(3);
        engine.load_from(Source::Named("home".into())).await;

        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(256);
        let handle = tokio::spawn(run(cmd_rx, ui_tx, engine));
        let mut harness = Harness {
            cmd_tx,
            ui_rx,
            handle,
        };
        // Initial snapshot
        assert!(matches!(
            harness.ui_rx.recv().await,
            Some(UiUpdate::Snapshot(_))
        ));
        harness
    }

    impl Harness {
        async fn send(&self, cmd: UserCommand) {
            self.cmd_tx.send(cmd).await.unwrap();
        }

        async fn next(&mut self) -> UiUpdate {
            tokio::time::timeout(Duration::from_secs(30), self.ui_rx.recv())
                .await
                .expect("timed out waiting for a UI update")
                .expect("UI channel closed")
        }

        async fn next_snapshot(&mut self) -> nextup_core::Snapshot {
            loop {
                if let UiUpdate::Snapshot(snapshot) = self.next().await {
                    return *snapshot;
                }
            }
        }

        async fn quit(self) {
            self.cmd_tx.send(UserCommand::Quit).await.unwrap();
            self.handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pick_streams_ticks_then_settles() {
        let mut h = start().await;
        h.send(UserCommand::Pick).await;

        let snapshot = h.next_snapshot().await;
        assert!(matches!(snapshot.draw_state, DrawState::Spinning { .. }));

        let mut ticks = 0;
        let mut countdowns = Vec::new();
        let (winner, ordinal) = loop {
            match h.next().await {
                UiUpdate::Tick { .. } => ticks += 1,
                UiUpdate::Countdown { remaining_secs } => countdowns.push(remaining_secs),
                UiUpdate::Settled { winner, ordinal } => break (winner, ordinal),
                other => panic!("unexpected update mid-spin: {other:?}"),
            }
        };
        assert_eq!(ticks, 29);
        assert_eq!(countdowns, vec![2, 1]);
        assert!(winner == "Ada" || winner == "Grace");
        assert_eq!(ordinal, 1);

        let after = h.next_snapshot().await;
        assert_eq!(after.draw_state, DrawState::Idle);
        assert_eq!(after.history.len(), 1);
        assert_eq!(after.eligible_count, 1);

        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn pick_with_nothing_left_sends_notice() {
        let mut h = start().await;
        h.send(UserCommand::SwitchSource("solo".into())).await;
        h.next_snapshot().await;

        h.send(UserCommand::Pick).await;
        loop {
            if let UiUpdate::Settled { winner, .. } = h.next().await {
                assert_eq!(winner, "Linus");
                break;
            }
        }
        h.next_snapshot().await;

        h.send(UserCommand::Pick).await;
        match h.next().await {
            UiUpdate::Notice(text) => assert!(text.contains("Everyone")),
            other => panic!("expected notice, got {other:?}"),
        }

        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switching_source_mid_spin_resets() {
        let mut h = start().await;
        h.send(UserCommand::Pick).await;
        h.next_snapshot().await;
        assert!(matches!(h.next().await, UiUpdate::Tick { count: 1 }));

        h.send(UserCommand::SwitchSource("solo".into())).await;
        let snapshot = h.next_snapshot().await;
        assert_eq!(snapshot.source, "solo");
        assert_eq!(snapshot.draw_state, DrawState::Idle);
        assert!(snapshot.history.is_empty());

        // The abandoned spin never settles.
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(h.ui_rx.try_recv().is_err());

        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn edits_and_duration_produce_snapshots() {
        let mut h = start().await;

        h.send(UserCommand::AddEntry("  Linus ".into())).await;
        let snapshot = h.next_snapshot().await;
        assert_eq!(snapshot.pool.len(), 3);
        assert_eq!(snapshot.pool[2].entry, "Linus");

        h.send(UserCommand::RemoveEntry("Ada".into())).await;
        let snapshot = h.next_snapshot().await;
        assert_eq!(snapshot.pool.len(), 2);

        h.send(UserCommand::SetSpinDuration(9)).await;
        h.send(UserCommand::SetSpinDuration(5)).await;
        let snapshot = h.next_snapshot().await;
        assert_eq!(snapshot.spin_duration_secs, 5);

        h.quit().await;
    }

    #[tokio::test(start_paused = true)]
    async fn custom_source_starts_empty() {
        let mut h = start().await;
        h.send(UserCommand::SwitchSource("custom".into())).await;
        let snapshot = h.next_snapshot().await;
        assert_eq!(snapshot.source, "custom");
        assert!(snapshot.pool.is_empty());

        h.send(UserCommand::Pick).await;
        match h.next().await {
            UiUpdate::Notice(text) => assert!(text.contains("empty")),
            other => panic!("expected notice, got {other:?}"),
        }

        h.quit().await;
    }

    #[tokio::test]
    async fn closed_command_channel_stops_loop() {
        let h = start().await;
        let Harness { cmd_tx, handle, .. } = h;
        drop(cmd_tx);
        handle.await.unwrap().unwrap();
    }
}

// Engine facade: the single entry point the presentation layer talks to.
//
// Owns the pool, the history and the draw scheduler, and dispatches spin
// events to the audio and celebration sinks.

use rand::RngCore;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::draw::{DrawScheduler, DrawState, SpinDuration, SpinEvent};
use crate::history::{ordinal_label, DrawRecord, SelectionHistory};
use crate::pool::{parse_lines, Entry, Pool};
use crate::sink::{AudioSink, CelebrationSink, Silent};
use crate::source::{Source, SourceLoader};

// ---------------------------------------------------------------------------
// Public result and event types
// ---------------------------------------------------------------------------

/// What happened to a pick request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// A spin is now running.
    Started,
    /// Every pool entry has already been drawn (or the pool is empty).
    NothingToDraw,
    /// A spin was already running; the request was ignored.
    AlreadySpinning,
}

/// Events pumped out of [`Engine::next_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Tick { count: u32 },
    Countdown { remaining_secs: u32 },
    /// The winner has been appended to history as the `ordinal`-th draw.
    Settled { winner: Entry, ordinal: usize },
}

/// One pool entry as displayed, with its draw rank if it has been drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolRow {
    pub entry: Entry,
    pub ordinal: Option<usize>,
    pub ordinal_label: Option<String>,
}

/// Read-only projection of everything a view needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Loader-provided list names in display order, then "custom".
    pub sources: Vec<String>,
    pub source: String,
    pub pool: Vec<PoolRow>,
    pub history: Vec<DrawRecord>,
    pub draw_state: DrawState,
    pub remaining_secs: u32,
    pub spin_duration_secs: u32,
    pub eligible_count: usize,
    pub at_capacity: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    loader: Box<dyn SourceLoader>,
    source: Source,
    pool: Pool,
    history: SelectionHistory,
    scheduler: DrawScheduler,
    spin_duration: SpinDuration,
    audio: Box<dyn AudioSink>,
    celebration: Box<dyn CelebrationSink>,
}

impl Engine {
    /// Engine with an empty custom pool, silent sinks and an OS-seeded RNG.
    pub fn new(loader: Box<dyn SourceLoader>) -> Self {
        Engine {
            loader,
            source: Source::Custom,
            pool: Pool::new(),
            history: SelectionHistory::new(),
            scheduler: DrawScheduler::new(),
            spin_duration: SpinDuration::default(),
            audio: Box::new(Silent),
            celebration: Box::new(Silent),
        }
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_celebration(mut self, celebration: impl CelebrationSink + 'static) -> Self {
        self.celebration = Box::new(celebration);
        self
    }

    /// Replace the random source used to pick winners.
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.scheduler = DrawScheduler::with_rng(rng);
        self
    }

    pub fn with_spin_duration(mut self, duration: SpinDuration) -> Self {
        self.spin_duration = duration;
        self
    }

    // --- Pool lifecycle ---

    /// Switch to `source`: replace the pool, clear history and return to
    /// `Idle`. Any running spin is dropped without settling.
    ///
    /// A loader failure is logged and leaves an empty pool under the
    /// requested source. Returns the new pool size.
    pub async fn load_from(&mut self, source: Source) -> usize {
        if self.scheduler.teardown() {
            info!("Abandoned running spin to load {}", source);
        }

        let entries = match &source {
            Source::Custom => Vec::new(),
            Source::Named(name) => match self.loader.fetch(name).await {
                Ok(text) => parse_lines(&text),
                Err(e) => {
                    warn!("Failed to load list {}: {}", name, e);
                    Vec::new()
                }
            },
        };

        let size = self.pool.load(entries);
        self.history.clear();
        info!("Loaded {} entries from {}", size, source);
        self.source = source;
        size
    }

    /// Add an entry to the pool. Never affects a running spin.
    pub fn add_entry(&mut self, text: &str) -> bool {
        self.pool.add(text)
    }

    /// Remove the first pool entry equal to `entry`. History is untouched.
    pub fn remove_entry(&mut self, entry: &str) -> bool {
        let removed = self.pool.remove(entry);
        if !removed {
            debug!("Remove ignored, {:?} is not in the pool", entry);
        }
        removed
    }

    // --- Drawing ---

    /// Request a draw over the current eligible set.
    pub fn pick(&mut self) -> PickOutcome {
        if self.scheduler.is_spinning() {
            debug!("Pick ignored, spin already running");
            return PickOutcome::AlreadySpinning;
        }

        let eligible = self.eligible();
        if eligible.is_empty() {
            debug!("Pick ignored, nothing left to draw");
            return PickOutcome::NothingToDraw;
        }

        if self.scheduler.request_draw(eligible, self.spin_duration) {
            PickOutcome::Started
        } else {
            PickOutcome::AlreadySpinning
        }
    }

    /// Wait for the next spin event; `None` right away when not spinning.
    ///
    /// On settle the winner is appended to history and the sinks are
    /// notified before this returns, and the engine is back in `Idle`.
    /// Cancel safe: safe to use as a `tokio::select!` branch.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        let event = self.scheduler.next_event().await?;

        match event {
            SpinEvent::Tick { count } => {
                if let Err(e) = self.audio.tick() {
                    warn!("Audio tick failed: {:#}", e);
                }
                Some(EngineEvent::Tick { count })
            }
            SpinEvent::Countdown { remaining_secs } => {
                Some(EngineEvent::Countdown { remaining_secs })
            }
            SpinEvent::Settled { winner } => {
                self.history.append(winner.clone());
                let ordinal = self.history.len();
                info!("Drew {} ({})", winner, ordinal_label(ordinal));

                if let Err(e) = self.audio.settle(&winner) {
                    warn!("Audio settle failed: {:#}", e);
                }
                if let Err(e) = self.celebration.celebrate(&winner) {
                    warn!("Celebration failed: {:#}", e);
                }
                self.scheduler.finish();
                Some(EngineEvent::Settled { winner, ordinal })
            }
        }
    }

    /// Set the duration used by the next spin. Rejects values outside
    /// 3..=7 seconds. A running spin keeps its own duration.
    pub fn set_spin_duration(&mut self, secs: u32) -> bool {
        match SpinDuration::new(secs) {
            Some(duration) => {
                self.spin_duration = duration;
                true
            }
            None => {
                debug!("Spin duration {}s out of range, ignoring", secs);
                false
            }
        }
    }

    // --- Queries ---

    pub fn spin_duration(&self) -> SpinDuration {
        self.spin_duration
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn history(&self) -> &SelectionHistory {
        &self.history
    }

    pub fn draw_state(&self) -> &DrawState {
        self.scheduler.state()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.scheduler.remaining_secs()
    }

    pub fn is_spinning(&self) -> bool {
        self.scheduler.is_spinning()
    }

    /// Pool entries not yet drawn, computed fresh on every call.
    pub fn eligible(&self) -> Vec<Entry> {
        self.pool.eligible_against(&self.history)
    }

    pub fn active_source(&self) -> &Source {
        &self.source
    }

    /// Source names in display order, with "custom" last.
    pub fn sources(&self) -> Vec<String> {
        let mut names = self.loader.names();
        names.push(Source::Custom.name().to_string());
        names
    }

    pub fn snapshot(&self) -> Snapshot {
        let pool = self
            .pool
            .entries()
            .iter()
            .map(|entry| {
                let ordinal = self.history.ordinal_of(entry.as_str());
                PoolRow {
                    entry: entry.clone(),
                    ordinal,
                    ordinal_label: ordinal.map(ordinal_label),
                }
            })
            .collect();

        Snapshot {
            sources: self.sources(),
            source: self.source.name().to_string(),
            pool,
            history: self.history.records().to_vec(),
            draw_state: self.scheduler.state().clone(),
            remaining_secs: self.scheduler.remaining_secs(),
            spin_duration_secs: self.spin_duration.as_secs(),
            eligible_count: self.eligible().len(),
            at_capacity: self.pool.is_full(),
        }
    }
}

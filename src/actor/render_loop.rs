//! Render loop: dedicated thread that refreshes the display.
//!
//! Every tick the loop reads the latest committed snapshot, rebuilds the
//! canvas from it and presents it to the sink. Device failures are logged
//! and the next tick tries again. A stop request interrupts the wait
//! between ticks, blanks the device once, and ends the thread.

use crate::buffer::{Canvas, CommitGate};
use crate::config::DisplayConfig;
use crate::error::{ConfigError, LifecycleError};
use crate::render::{compose_frame, TextRasterizer};
use crate::sink::PixelSink;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RenderState {
    /// No thread is running.
    Stopped = 0,
    /// The thread is ticking.
    Running = 1,
    /// A stop was requested and the thread is finishing.
    Stopping = 2,
}

impl RenderState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Atomic cell holding a [`RenderState`], readable without any lock.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    const fn new() -> Self {
        Self(AtomicU8::new(RenderState::Stopped as u8))
    }

    /// Current state.
    #[inline]
    pub(crate) fn get(&self) -> RenderState {
        RenderState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: RenderState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Render statistics for debugging/profiling.
#[derive(Debug, Default)]
pub struct RenderStats {
    ticks: AtomicU64,
    frames: AtomicU64,
    failures: AtomicU64,
    last_generation: AtomicU64,
}

impl RenderStats {
    /// Ticks run since construction (blank frames at stop are not ticks).
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Frames the sink accepted.
    pub fn frames_presented(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Frames the sink rejected.
    pub fn device_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Generation of the last snapshot the sink accepted.
    pub fn last_generation(&self) -> u64 {
        self.last_generation.load(Ordering::Relaxed)
    }
}

/// What the render thread needs exclusive access to.
struct Parts {
    sink: Box<dyn PixelSink>,
    rasterizer: Box<dyn TextRasterizer>,
}

impl Parts {
    /// Present a blank canvas. Failure is only logged.
    fn present_blank(&mut self, canvas: &mut Canvas) {
        canvas.clear();
        if let Err(e) = self.sink.present_frame(canvas) {
            debug!(sink = self.sink.name(), error = %e, "Failed to clear display");
        }
    }
}

/// Marks the loop stopped when the render thread exits, panics included.
struct ExitGuard(Arc<StateCell>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.set(RenderState::Stopped);
    }
}

/// A running render thread.
struct Worker {
    handle: JoinHandle<()>,
    stop_tx: Sender<()>,
}

/// Owner of the render thread and the sink it drives.
pub struct RenderLoop {
    config: DisplayConfig,
    gate: Arc<CommitGate>,
    /// Locked by the render thread for its whole life, by the owner only
    /// while no thread runs.
    parts: Arc<Mutex<Parts>>,
    state: Arc<StateCell>,
    stats: Arc<RenderStats>,
    worker: Option<Worker>,
}

impl RenderLoop {
    /// Create a stopped loop rendering snapshots from `gate`.
    ///
    /// Fails when `config` does not pass [`DisplayConfig::validate`].
    pub fn new(
        config: DisplayConfig,
        gate: Arc<CommitGate>,
        sink: Box<dyn PixelSink>,
        rasterizer: Box<dyn TextRasterizer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            gate,
            parts: Arc::new(Mutex::new(Parts { sink, rasterizer })),
            state: Arc::new(StateCell::new()),
            stats: Arc::new(RenderStats::default()),
            worker: None,
        })
    }

    /// Shared state cell, readable while another thread drives the loop.
    pub(crate) fn state_cell(&self) -> Arc<StateCell> {
        Arc::clone(&self.state)
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    /// Shared statistics.
    pub fn stats(&self) -> Arc<RenderStats> {
        Arc::clone(&self.stats)
    }

    /// Spawn the render thread.
    ///
    /// A thread that already exited on its own (a panicking rasterizer) is
    /// reaped first, so the loop can be started again.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        if let Some(worker) = self.worker.take() {
            if !worker.handle.is_finished() {
                self.worker = Some(worker);
                return Err(LifecycleError::AlreadyRunning);
            }
            Self::reap(worker);
        }

        // Single slot: one pending stop request is all the loop needs.
        let (stop_tx, stop_rx) = bounded(1);
        let config = self.config.clone();
        let gate = Arc::clone(&self.gate);
        let parts = Arc::clone(&self.parts);
        let stats = Arc::clone(&self.stats);
        let guard = ExitGuard(Arc::clone(&self.state));

        // Set before spawning so a thread that dies at once still ends Stopped.
        self.state.set(RenderState::Running);
        let handle = thread::Builder::new()
            .name("oled-render".to_string())
            .spawn(move || {
                let _guard = guard;
                let mut parts = parts.lock().unwrap_or_else(PoisonError::into_inner);
                Self::run_loop(&config, &gate, &mut parts, &stats, &stop_rx);
            })
            .map_err(|e| {
                self.state.set(RenderState::Stopped);
                LifecycleError::Spawn(e)
            })?;

        self.worker = Some(Worker { handle, stop_tx });
        info!(
            refresh_rate = self.config.refresh_rate,
            rows = self.config.row_count(),
            "Render loop started"
        );
        Ok(())
    }

    /// Stop the render thread and wait for it to exit.
    ///
    /// The thread blanks the device before exiting. When no thread is
    /// running the blank frame is presented from the calling thread.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            let mut canvas = Canvas::new(self.config.width, self.config.height);
            self.lock_parts().present_blank(&mut canvas);
            return;
        };

        self.state.set(RenderState::Stopping);
        // A full slot already holds a stop request; a dropped receiver means
        // the thread is gone.
        let _ = worker.stop_tx.try_send(());
        Self::reap(worker);
        self.state.set(RenderState::Stopped);
        info!(ticks = self.stats.ticks(), "Render loop stopped");
    }

    fn reap(worker: Worker) {
        if worker.handle.join().is_err() {
            warn!("Render thread panicked");
        }
    }

    fn lock_parts(&self) -> MutexGuard<'_, Parts> {
        self.parts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Main render loop.
    fn run_loop(
        config: &DisplayConfig,
        gate: &CommitGate,
        parts: &mut Parts,
        stats: &RenderStats,
        stop_rx: &Receiver<()>,
    ) {
        let mut canvas = Canvas::new(config.width, config.height);
        let interval = config.tick();
        let mut next_tick = Instant::now();

        loop {
            // Check for shutdown
            match stop_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Disconnected) => break,
            }

            let snapshot = gate.read();
            compose_frame(&mut canvas, snapshot.rows(), config, parts.rasterizer.as_mut());
            stats.ticks.fetch_add(1, Ordering::Relaxed);

            match parts.sink.present_frame(&canvas) {
                Ok(()) => {
                    stats.frames.fetch_add(1, Ordering::Relaxed);
                    stats
                        .last_generation
                        .store(snapshot.generation(), Ordering::Relaxed);
                }
                Err(e) => {
                    stats.failures.fetch_add(1, Ordering::Relaxed);
                    debug!(sink = parts.sink.name(), error = %e, "Failed to send frame to display");
                }
            }

            next_tick += interval;
            let now = Instant::now();
            // Behind schedule: restart the cadence instead of bursting.
            if next_tick < now {
                next_tick = now + interval;
            }

            if Self::wait_for_stop(stop_rx, next_tick - now) {
                break;
            }
        }

        parts.present_blank(&mut canvas);
    }

    /// Sleep until `timeout` elapses or a stop request arrives.
    ///
    /// Returns `true` when the loop should exit.
    fn wait_for_stop(stop_rx: &Receiver<()>, timeout: Duration) -> bool {
        match stop_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

//! `RowDisplay`: the producer-facing display object.
//!
//! A display owns one staged [`RowBuffer`], one [`CommitGate`] and one
//! [`RenderLoop`]. The device is probed once at construction; if that fails
//! the display keeps working against a [`DetachedSink`] and every frame is
//! dropped with a debug log.
//!
//! All methods take `&self`, so a display can be shared between producer
//! threads through an `Arc`.

use crate::actor::{RenderLoop, RenderState, RenderStats, StateCell};
use crate::buffer::{CommitGate, RowBuffer, RowSpan, Snapshot};
use crate::config::DisplayConfig;
use crate::error::{ConfigError, DeviceError, LifecycleError, RowError};
use crate::render::{MonoFontRasterizer, TextRasterizer};
use crate::sink::{DetachedSink, PixelSink};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Text rows rendered onto a pixel display by a background loop.
pub struct RowDisplay {
    config: DisplayConfig,
    columns: usize,
    staged: Mutex<RowBuffer>,
    gate: Arc<CommitGate>,
    render: Mutex<RenderLoop>,
    state: Arc<StateCell>,
    stats: Arc<RenderStats>,
}

impl RowDisplay {
    /// Create a display, probing the device with `probe`.
    ///
    /// A failed probe is logged and replaced by a [`DetachedSink`]; only an
    /// invalid configuration is an error.
    pub fn open<S, P>(config: DisplayConfig, probe: P) -> Result<Self, ConfigError>
    where
        S: PixelSink + 'static,
        P: FnOnce(&DisplayConfig) -> Result<S, DeviceError>,
    {
        let rasterizer = MonoFontRasterizer::for_glyph_height(config.font_size);
        Self::with_rasterizer(config, probe, rasterizer)
    }

    /// Like [`open`](Self::open), drawing text with a custom rasterizer.
    pub fn with_rasterizer<S, P, R>(
        config: DisplayConfig,
        probe: P,
        rasterizer: R,
    ) -> Result<Self, ConfigError>
    where
        S: PixelSink + 'static,
        P: FnOnce(&DisplayConfig) -> Result<S, DeviceError>,
        R: TextRasterizer + 'static,
    {
        config.validate()?;

        let sink: Box<dyn PixelSink> = match probe(&config) {
            Ok(sink) => {
                debug!(sink = sink.name(), "Display initialized");
                Box::new(sink)
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize display");
                Box::new(DetachedSink)
            }
        };
        let columns = rasterizer
            .glyph_width()
            .filter(|&width| width > 0)
            .map_or_else(|| config.columns(), |width| (config.width / width) as usize);
        debug!(width = config.width, height = config.height, columns, "Display geometry");

        let row_count = config.row_count();
        let gate = Arc::new(CommitGate::new(row_count));
        let render = RenderLoop::new(config.clone(), Arc::clone(&gate), sink, Box::new(rasterizer))?;
        let state = render.state_cell();
        let stats = render.stats();

        Ok(Self {
            config,
            columns,
            staged: Mutex::new(RowBuffer::new(row_count)),
            gate,
            render: Mutex::new(render),
            state,
            stats,
        })
    }

    /// A display with no device attached.
    pub fn detached(config: DisplayConfig) -> Result<Self, ConfigError> {
        Self::open(config, |_| Ok(DetachedSink))
    }

    /// The configuration this display was built with.
    #[inline]
    pub const fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Number of text rows.
    #[inline]
    pub const fn row_count(&self) -> usize {
        self.config.row_count()
    }

    /// Characters that fit on one row with the rasterizer in use.
    #[inline]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Stage new text for one row. Not shown until [`commit`](Self::commit).
    pub fn write_row(&self, index: usize, text: impl Into<String>) -> Result<(), RowError> {
        self.staged().write_row(index, text).inspect_err(|e| {
            info!(error = %e, "Rejected row write");
        })
    }

    /// Stage clearing of the rows selected by `span`.
    pub fn clear_rows(&self, span: RowSpan) -> Result<(), RowError> {
        self.staged().clear_rows(span).inspect_err(|e| {
            info!(error = %e, "Rejected row clear");
        })
    }

    /// Publish the staged rows as the next frame.
    pub fn commit(&self) {
        let staged = self.staged();
        let generation = self.gate.publish(staged.rows());
        debug!(generation, rows = ?staged.rows(), "Committed rows");
    }

    /// Apply several row changes and commit them together.
    ///
    /// Other producers cannot interleave writes between the changes and the
    /// commit. Nothing is committed if `update` fails, but the changes made
    /// before the failure stay staged.
    pub fn batch<T>(
        &self,
        update: impl FnOnce(&mut RowBuffer) -> Result<T, RowError>,
    ) -> Result<T, RowError> {
        let mut staged = self.staged();
        let value = update(&mut *staged)?;
        let generation = self.gate.publish(staged.rows());
        debug!(generation, rows = ?staged.rows(), "Committed rows");
        Ok(value)
    }

    /// Copy of the staged rows.
    pub fn rows(&self) -> Vec<String> {
        self.staged().rows().to_vec()
    }

    /// The committed rows the render loop draws.
    pub fn snapshot(&self) -> Snapshot {
        self.gate.read()
    }

    /// Start the render loop.
    pub fn start(&self) -> Result<(), LifecycleError> {
        self.render().start()
    }

    /// Clear all rows, stop the render loop, and blank the device.
    ///
    /// Returns after the render thread has exited. Safe to call repeatedly.
    pub fn stop(&self) {
        {
            let mut staged = self.staged();
            // Clearing every row cannot fail.
            let _ = staged.clear_rows(RowSpan::All);
            self.gate.publish(staged.rows());
        }
        self.render().stop();
    }

    /// Current render loop state.
    #[inline]
    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    /// Render loop counters.
    #[inline]
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    fn staged(&self) -> MutexGuard<'_, RowBuffer> {
        self.staged.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self) -> MutexGuard<'_, RenderLoop> {
        self.render.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RowDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowDisplay")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

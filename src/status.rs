//! Printer status producer.
//!
//! Formatting helpers for the status lines and a [`StatusBoard`] that maps
//! printer events onto fixed rows. The board is meant to be called from
//! best-effort host callbacks: row errors are logged and swallowed.

use crate::buffer::{RowBuffer, RowEnd, RowSpan};
use crate::display::RowDisplay;
use crate::error::RowError;
use std::sync::Arc;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Marker appended to a message that was cut short.
const PLACEHOLDER: &str = " [...]";

/// Tools shown on the temperature row, in display order.
const TEMPERATURE_ORDER: [&str; 4] = ["bed", "tool0", "tool1", "tool2"];

/// Format a duration as `"{h}h {m}m"`, or `"{m}m"` below one hour.
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Format one temperature reading, e.g. `"B:60-"` or `"T0:180/"`.
///
/// The marker after the value is `_` when the heater is off, `-` within
/// 5 degrees of target, `/` while heating and `\` while cooling.
#[allow(clippy::cast_possible_truncation)]
pub fn format_temp(tool: &str, actual: f64, target: f64) -> String {
    let mut label: String = tool.chars().take(1).flat_map(char::to_uppercase).collect();
    if let Some(digit) = tool.chars().last().filter(char::is_ascii_digit) {
        if tool.chars().count() > 1 {
            label.push(digit);
        }
    }

    let marker = if target <= 0.0 {
        '_'
    } else if (target - actual).abs() < 5.0 {
        '-'
    } else if target > actual {
        '/'
    } else {
        '\\'
    };
    format!("{label}:{}{marker}", actual.trunc() as i64)
}

/// Message text of an `M117` (set LCD message) command, if `command` is one.
pub fn m117_text(command: &str) -> Option<&str> {
    let (code, rest) = command.split_once(' ').unwrap_or((command, ""));
    code.eq_ignore_ascii_case("M117").then_some(rest)
}

/// Split `word` into pieces at most `width` columns wide.
fn break_word(word: &str, width: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for grapheme in word.graphemes(true) {
        if !piece.is_empty() && piece.width() + grapheme.width() > width {
            pieces.push(std::mem::take(&mut piece));
        }
        piece.push_str(grapheme);
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Cut `text` to at most `width` columns.
fn truncate_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    for grapheme in text.graphemes(true) {
        if out.width() + grapheme.width() > width {
            break;
        }
        out.push_str(grapheme);
    }
    out
}

/// Greedy word wrap by display width.
///
/// Runs of whitespace collapse to one space. Words wider than a line are
/// broken. When the text needs more than `max_lines` lines, the last kept
/// line ends with `" [...]"`. Blank input yields no lines.
pub fn wrap_message(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_width = word.width();
        if word_width > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = break_word(word, width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
        } else if current.width() + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        let last = lines.pop().unwrap_or_default();
        let mut words: Vec<&str> = last.split(' ').collect();
        while !words.is_empty() && words.join(" ").width() + PLACEHOLDER.width() > width {
            words.pop();
        }
        let line = if words.is_empty() {
            truncate_to_width(PLACEHOLDER.trim_start(), width)
        } else {
            words.join(" ") + PLACEHOLDER
        };
        lines.push(line);
    }
    lines
}

/// A temperature reading for one heater.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolTemperature {
    /// Heater name as reported by the printer (`bed`, `tool0`, ...).
    pub tool: String,
    /// Measured temperature.
    pub actual: f64,
    /// Target temperature, 0 when off.
    pub target: f64,
}

impl ToolTemperature {
    /// Create a reading.
    pub fn new(tool: impl Into<String>, actual: f64, target: f64) -> Self {
        Self {
            tool: tool.into(),
            actual,
            target,
        }
    }
}

/// Maps printer events onto the rows of a display.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    display: Arc<RowDisplay>,
}

impl StatusBoard {
    /// Printer state and errors.
    pub const STATE_ROW: usize = 0;
    /// `M117` messages.
    pub const MESSAGE_ROW: usize = 1;
    /// Heater temperatures.
    pub const TEMPERATURE_ROW: usize = 2;
    /// Job progress.
    pub const PROGRESS_ROW: usize = 3;

    /// Drive `display`.
    pub const fn new(display: Arc<RowDisplay>) -> Self {
        Self { display }
    }

    /// The underlying display.
    pub const fn display(&self) -> &Arc<RowDisplay> {
        &self.display
    }

    /// Blank the display and show that the plugin is up.
    pub fn initialized(&self) {
        self.update(|rows| {
            rows.clear_rows(RowSpan::All)?;
            rows.write_row(Self::STATE_ROW, "Initialized")
        });
    }

    /// Show a new printer state. Going offline also clears the job rows.
    pub fn printer_state(&self, state: &str, offline: bool) {
        self.update(|rows| {
            rows.write_row(Self::STATE_ROW, state)?;
            if offline {
                rows.clear_rows(RowSpan::Range {
                    start: Self::MESSAGE_ROW,
                    end: RowEnd::Last,
                })?;
            }
            Ok(())
        });
    }

    /// Show a printer error.
    pub fn error(&self, message: &str) {
        self.update(|rows| rows.write_row(Self::STATE_ROW, format!("Error! {message}")));
    }

    /// Show heater temperatures, bed first.
    pub fn temperatures(&self, readings: &[ToolTemperature]) {
        let text = TEMPERATURE_ORDER
            .iter()
            .filter_map(|tool| readings.iter().find(|r| r.tool == *tool))
            .map(|r| format_temp(&r.tool, r.actual, r.target))
            .collect::<Vec<_>>()
            .join(" ");
        self.update(|rows| rows.write_row(Self::TEMPERATURE_ROW, text));
    }

    /// Show job progress; `None` means no job is running.
    #[allow(clippy::cast_possible_truncation)]
    pub fn progress(&self, completion: Option<f64>, seconds_left: Option<u64>) {
        let text = completion.map_or_else(String::new, |completion| {
            format!(
                "{}% {}",
                completion.trunc() as i64,
                format_seconds(seconds_left.unwrap_or(0))
            )
        });
        self.update(|rows| rows.write_row(Self::PROGRESS_ROW, text));
    }

    /// Handle a G-code line sent to the printer. Only `M117` is shown.
    pub fn gcode_sent(&self, command: &str) {
        let Some(message) = m117_text(command) else {
            return;
        };
        debug!(command, "Intercepted M117");

        let lines = wrap_message(message, self.display.columns(), 1);
        self.update(|rows| {
            if lines.is_empty() {
                return rows.write_row(Self::MESSAGE_ROW, "");
            }
            for (i, line) in lines.iter().enumerate() {
                rows.write_row(Self::MESSAGE_ROW + i, line.as_str())?;
            }
            Ok(())
        });
    }

    /// Blank every row and stop the display.
    pub fn shutdown(&self) {
        self.update(|rows| rows.clear_rows(RowSpan::All));
        self.display.stop();
    }

    /// Apply and commit a change, logging instead of failing.
    fn update(&self, change: impl FnOnce(&mut RowBuffer) -> Result<(), RowError>) {
        if let Err(e) = self.display.batch(change) {
            debug!(error = %e, "Display currently unavailable");
        }
    }
}

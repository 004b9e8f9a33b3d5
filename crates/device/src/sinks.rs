//! Headless sink implementations.
//!
//! The physical LED and display drivers are external collaborators;
//! these implementations log frame summaries through `tracing` so the
//! daemon runs (and is debuggable) on any host.

use rgb::RGB8;
use tracing::debug;

use revring_render::{LedRing, SinkError, TextPanel};

/// LED ring sink that logs lit-length and color changes.
#[derive(Debug)]
pub struct LoggingLedRing {
    count: usize,
    last: Option<(usize, RGB8)>,
}

impl LoggingLedRing {
    /// Create a logging ring with `count` pixels.
    pub fn new(count: usize) -> Self {
        Self { count, last: None }
    }
}

impl LedRing for LoggingLedRing {
    fn led_count(&self) -> usize {
        self.count
    }

    fn write(&mut self, pixels: &[RGB8]) -> Result<(), SinkError> {
        let lit = pixels
            .iter()
            .filter(|p| p.r > 0 || p.g > 0 || p.b > 0)
            .count();
        let head = pixels.first().copied().unwrap_or(RGB8::new(0, 0, 0));
        let summary = (lit, head);
        if self.last != Some(summary) {
            debug!(lit, total = self.count, r = head.r, g = head.g, b = head.b, "ring frame");
            self.last = Some(summary);
        }
        Ok(())
    }
}

/// Text panel sink that logs drawn lines.
#[derive(Debug, Default)]
pub struct LoggingTextPanel;

impl TextPanel for LoggingTextPanel {
    fn clear(&mut self) -> Result<(), SinkError> {
        debug!("panel cleared");
        Ok(())
    }

    fn draw_lines(&mut self, lines: &[String]) -> Result<(), SinkError> {
        debug!(?lines, "panel drawn");
        Ok(())
    }
}

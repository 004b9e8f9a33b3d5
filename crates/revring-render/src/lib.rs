//! LED ring and text panel rendering.
//!
//! The renderer converts a [`DisplayIntent`] into concrete writes
//! against two hardware sinks: an addressable pixel ring and a small
//! text panel. The sinks are traits; the electrical drivers behind
//! them live outside this core.
//!
//! Flash and idle-breathing cadence is derived from the scheduler's
//! tick counter — wall-clock time, never packet arrival — so the rate
//! stays stable when telemetry stutters or stops.

#![deny(static_mut_refs)]

use rgb::RGB8;
use thiserror::Error;

use revring_policy::DisplayIntent;

/// A hardware sink write failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The LED ring rejected a frame.
    #[error("led ring write failed: {0}")]
    Ring(String),
    /// The text panel rejected a draw.
    #[error("text panel write failed: {0}")]
    Panel(String),
}

/// Addressable ring of RGB pixels (index 0 at the start of the fill).
///
/// Implementations wrap the physical strip driver; writes must be
/// bounded-latency so a render never blows the tick budget.
pub trait LedRing {
    /// Number of pixels on the ring.
    fn led_count(&self) -> usize;

    /// Display one whole frame. `pixels.len()` equals `led_count()`.
    fn write(&mut self, pixels: &[RGB8]) -> Result<(), SinkError>;
}

/// Small text surface (an OLED or character display).
pub trait TextPanel {
    /// Blank the panel.
    fn clear(&mut self) -> Result<(), SinkError>;

    /// Draw the given lines, topmost first.
    fn draw_lines(&mut self, lines: &[String]) -> Result<(), SinkError>;
}

/// Renderer tunables, read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Global brightness scalar applied to every lit pixel, in [0, 1].
    pub brightness: f32,
    /// Shift-flash rate in full on/off cycles per second.
    pub flash_hz: f32,
    /// Scheduler tick rate, used to convert cadences into tick counts.
    pub tick_hz: u32,
    /// Breathe the ring while idle instead of going dark.
    pub idle_animation: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            brightness: 0.25,
            flash_hz: 5.0,
            tick_hz: 60,
            idle_animation: true,
        }
    }
}

/// Seconds per full idle breathing cycle.
const BREATHE_PERIOD_S: f32 = 2.0;
/// Idle pattern runs at half the configured brightness.
const IDLE_BRIGHTNESS_FACTOR: f32 = 0.5;

/// Converts display intents into sink writes.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    flash_half_period: u64,
    breathe_period: u64,
    last_lines: Option<Vec<String>>,
    panel_blanked: bool,
}

impl Renderer {
    /// Create a renderer with the given tunables.
    pub fn new(config: RenderConfig) -> Self {
        let tick_hz = config.tick_hz.max(1) as f32;
        let flash_hz = if config.flash_hz.is_finite() && config.flash_hz > 0.0 {
            config.flash_hz
        } else {
            5.0
        };
        // Half period: the ring toggles twice per flash cycle.
        let flash_half_period = ((tick_hz / (flash_hz * 2.0)).round() as u64).max(1);
        let breathe_period = ((tick_hz * BREATHE_PERIOD_S).round() as u64).max(2);

        Self {
            config,
            flash_half_period,
            breathe_period,
            last_lines: None,
            panel_blanked: false,
        }
    }

    /// Renderer with default tunables.
    pub fn with_defaults() -> Self {
        Self::new(RenderConfig::default())
    }

    /// Render one intent at the given scheduler tick.
    ///
    /// Writes a whole ring frame every call; the text panel is only
    /// touched when its content changes.
    pub fn render(
        &mut self,
        intent: &DisplayIntent,
        tick: u64,
        ring: &mut dyn LedRing,
        panel: &mut dyn TextPanel,
    ) -> Result<(), SinkError> {
        let frame = self.ring_frame(intent, tick, ring.led_count());
        let ring_result = ring.write(&frame);

        // A failed ring write must not starve the panel (and vice
        // versa); report the first failure after attempting both.
        let panel_result = self.update_panel(intent, panel);
        ring_result.and(panel_result)
    }

    /// Compute the pixel frame for an intent. Pure; exposed for tests.
    pub fn ring_frame(&self, intent: &DisplayIntent, tick: u64, led_count: usize) -> Vec<RGB8> {
        if intent.idle {
            return self.idle_frame(tick, led_count);
        }

        if intent.flashing {
            // Full ring on, then dark, at a rate tied to the tick
            // counter so it is independent of telemetry arrival.
            return if self.flash_on(tick) {
                full_frame(led_count, scale(intent.color, self.config.brightness))
            } else {
                dark_frame(led_count)
            };
        }

        let lit = lit_count(led_count, intent.fill_ratio);
        let color = scale(intent.color, self.config.brightness);
        let mut frame = dark_frame(led_count);
        for pixel in frame.iter_mut().take(lit) {
            *pixel = color;
        }
        frame
    }

    /// Whether the flash phase is "on" at this tick.
    pub fn flash_on(&self, tick: u64) -> bool {
        (tick / self.flash_half_period) % 2 == 0
    }

    fn idle_frame(&self, tick: u64, led_count: usize) -> Vec<RGB8> {
        if !self.config.idle_animation {
            return dark_frame(led_count);
        }
        let intensity = triangle_wave(tick, self.breathe_period);
        let factor = intensity * self.config.brightness * IDLE_BRIGHTNESS_FACTOR;
        full_frame(led_count, scale(RGB8::new(0, 150, 150), factor))
    }

    fn update_panel(
        &mut self,
        intent: &DisplayIntent,
        panel: &mut dyn TextPanel,
    ) -> Result<(), SinkError> {
        if intent.idle {
            if !self.panel_blanked {
                panel.clear()?;
                self.panel_blanked = true;
                self.last_lines = None;
            }
            return Ok(());
        }

        self.panel_blanked = false;
        if self.last_lines.as_deref() != Some(&intent.text_lines[..]) {
            panel.draw_lines(&intent.text_lines)?;
            self.last_lines = Some(intent.text_lines.clone());
        }
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Ratios for the boot sweep: fill up, then back down.
pub fn sweep_ratios(steps: usize) -> Vec<f32> {
    let steps = steps.max(1);
    let up = (0..=steps).map(|i| i as f32 / steps as f32);
    let down = (0..steps).rev().map(|i| i as f32 / steps as f32);
    up.chain(down).collect()
}

/// Number of lit pixels for a fill ratio. Monotonic in the ratio.
fn lit_count(led_count: usize, fill_ratio: f32) -> usize {
    let ratio = if fill_ratio.is_finite() {
        fill_ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((led_count as f32 * ratio).floor() as usize).min(led_count)
}

/// Scale a color by a factor in [0, 1].
fn scale(color: RGB8, factor: f32) -> RGB8 {
    let factor = if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let apply = |c: u8| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8;
    RGB8::new(apply(color.r), apply(color.g), apply(color.b))
}

fn dark_frame(led_count: usize) -> Vec<RGB8> {
    vec![RGB8::new(0, 0, 0); led_count]
}

fn full_frame(led_count: usize, color: RGB8) -> Vec<RGB8> {
    vec![color; led_count]
}

/// Symmetric 0→1→0 wave over `period` ticks.
fn triangle_wave(tick: u64, period: u64) -> f32 {
    let period = period.max(2);
    let phase = (tick % period) as f32 / period as f32;
    if phase < 0.5 { phase * 2.0 } else { (1.0 - phase) * 2.0 }
}

//! The scheduler loop.
//!
//! Single logical thread of control: once per tick, drain every
//! pending datagram, commit samples, evaluate staleness, compute the
//! display intent, render. State mutation always happens before intent
//! computation within a tick, and nothing downstream writes the state.

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use revring_adapters::ProtocolSelector;
use revring_policy::{DisplayIntent, ShiftPolicy};
use revring_render::{LedRing, Renderer, TextPanel, sweep_ratios};
use revring_telemetry::{TelemetryState, TelemetryView};

use crate::config::DeviceConfig;
use crate::source::{DatagramSource, MAX_DATAGRAM};

/// Steps in each direction of the boot sweep.
const SWEEP_STEPS: usize = 25;

/// The device loop: owns the telemetry state and every downstream
/// component, and is the only writer of the state.
pub struct ShiftLightLoop<R: LedRing, P: TextPanel> {
    selector: ProtocolSelector,
    state: TelemetryState,
    policy: ShiftPolicy,
    renderer: Renderer,
    sources: Vec<Box<dyn DatagramSource>>,
    ring: R,
    panel: P,
    tick_period: Duration,
    tick: u64,
    buf: Box<[u8; MAX_DATAGRAM]>,
}

impl<R: LedRing, P: TextPanel> ShiftLightLoop<R, P> {
    /// Assemble the loop from configuration, sources, and sinks.
    pub fn new(
        config: &DeviceConfig,
        sources: Vec<Box<dyn DatagramSource>>,
        ring: R,
        panel: P,
    ) -> Result<Self> {
        Ok(Self {
            selector: ProtocolSelector::new(config.profiles()?),
            state: TelemetryState::new(config.state_config()),
            policy: ShiftPolicy::new(config.policy_config()),
            renderer: Renderer::new(config.render_config()),
            sources,
            ring,
            panel,
            tick_period: config.tick_period(),
            tick: 0,
            buf: Box::new([0u8; MAX_DATAGRAM]),
        })
    }

    /// Run one tick at the given instant.
    ///
    /// Drains all pending datagrams first (backlog can never grow if
    /// the network outpaces the render rate), then updates state and
    /// renders exactly once. A failed render is logged and the loop
    /// carries on; telemetry ingestion never stops for a sink fault.
    pub fn step(&mut self, now: Instant) {
        let mut received = 0usize;
        let mut accepted = 0usize;

        for source in &mut self.sources {
            loop {
                match source.poll(self.buf.as_mut_slice()) {
                    Ok(Some(len)) => {
                        received += 1;
                        if let Some(sample) = self.selector.select_and_decode(&self.buf[..len])
                            && self.state.ingest(sample, now)
                        {
                            accepted += 1;
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        warn!(%error, "datagram source poll failed");
                        break;
                    }
                }
            }
        }

        if received > 0 {
            debug!(received, accepted, "drained telemetry datagrams");
        }

        self.state.tick(now);
        let intent = self.policy.compute_intent(&self.state.view());
        if let Err(error) = self.renderer.render(&intent, self.tick, &mut self.ring, &mut self.panel)
        {
            warn!(%error, "render failed; continuing");
        }
        self.tick = self.tick.wrapping_add(1);
    }

    /// Run the loop forever at the configured tick rate. Missed ticks
    /// are skipped, never bursted.
    pub async fn run(&mut self) -> Result<()> {
        let mut interval = tokio::time::interval(self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.step(Instant::now());
        }
    }

    /// Play the boot sweep: fill the ring up and back down once before
    /// entering the loop.
    pub async fn startup_sweep(&mut self) {
        for ratio in sweep_ratios(SWEEP_STEPS) {
            let intent = self.sweep_intent(ratio);
            if let Err(error) =
                self.renderer
                    .render(&intent, self.tick, &mut self.ring, &mut self.panel)
            {
                warn!(%error, "boot sweep render failed");
                return;
            }
            self.tick = self.tick.wrapping_add(1);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    fn sweep_intent(&self, ratio: f32) -> DisplayIntent {
        DisplayIntent {
            fill_ratio: ratio,
            color: self.policy.color_for(ratio),
            flashing: false,
            idle: false,
            text_lines: Vec::new(),
        }
    }

    /// Current telemetry snapshot (read-only, for observability and
    /// tests).
    pub fn telemetry_view(&self) -> TelemetryView {
        self.state.view()
    }

    /// Ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

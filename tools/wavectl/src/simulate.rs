use anyhow::Context;
use tracing::{debug, info, warn};
use wavegen_core::sim::Bench;
use wavegen_core::{ClockConfig, Engine, EngineConfig, Settings, StopPolicy};

use crate::cli::SimulateArgs;

#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub settings: Settings,
    pub divisor: u32,
    pub tick_rate_hz: f64,
    pub accepted: u32,
    pub rejected: u32,
    pub preview: Vec<u8>,
}

impl SimulateArgs {
    pub fn engine_config(&self) -> EngineConfig {
        let policy = if self.eager_stop { StopPolicy::Eager } else { StopPolicy::OnAccept };
        EngineConfig::default()
            .with_clock(ClockConfig { base_clock_hz: self.base_clock, ..ClockConfig::default() })
            .with_defaults(self.wave.into(), self.freq)
            .with_stop_policy(policy)
    }
}

pub fn run(args: &SimulateArgs) -> anyhow::Result<SimReport> {
    let engine = Engine::new(args.engine_config()).context("invalid simulation config")?;
    let mut bench = Bench::new(&engine);
    bench.start();

    let mut schedule = args.schedule.clone();
    schedule.sort_by_key(|s| s.at_ms);

    let mut now_ms = 0;
    let mut ticks = 0;
    for cmd in schedule.iter().filter(|s| s.at_ms <= args.millis) {
        ticks += bench.run_millis(cmd.at_ms - now_ms);
        now_ms = cmd.at_ms;

        match bench.send(cmd.text.as_bytes()) {
            Ok(s) => info!("{}ms: {:?} -> {} @ {}Hz", now_ms, cmd.text, s.waveform.name(), s.frequency_hz),
            Err(e) => warn!("{}ms: {:?} dropped: {}", now_ms, cmd.text, e),
        }
    }
    ticks += bench.run_millis(args.millis - now_ms);

    let settings = engine.settings();
    let clock = engine.config().clock;
    let divisor = clock.divisor(settings.frequency_hz as u32);
    debug!("timer updates: {}", bench.timer().update_count());

    let history: Vec<u8> = bench.bus().history().collect();
    let preview = history[history.len().saturating_sub(args.preview)..].to_vec();

    Ok(SimReport {
        ticks,
        elapsed_ms: args.millis,
        settings,
        divisor,
        tick_rate_hz: clock.tick_rate_hz(divisor),
        accepted: engine.stats().accepted(),
        rejected: engine.stats().rejected(),
        preview,
    })
}

//! Software stand-ins for the timer and the DAC port.
//!
//! [`SimTimer`] counts base-clock cycles the way an STM32 general-purpose timer does (preloaded
//! prescaler, auto-reload, update flag), and [`Bench`] wires it to an [`Engine`] so the interrupt
//! fires whenever the flag would raise the IRQ line.

use heapless::HistoryBuffer;

use crate::command::CommandError;
use crate::engine::Engine;
use crate::playback::Settings;
use crate::sample_clock::{OutputBus, SampleTimer};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimTimer {
    divisor: u32,
    active_divisor: u32,
    reload: u32,
    enabled: bool,
    interrupt_enabled: bool,
    pending: bool,
    // counts since the last update event
    phase: u64,
    disable_count: u32,
    update_count: u64,
}

impl SimTimer {
    #[inline(always)]
    fn period(&self) -> u64 {
        (self.active_divisor as u64 + 1) * (self.reload as u64 + 1)
    }

    /// Runs up to `counts` base-clock cycles, stopping early right after an update event.
    /// Returns the cycles consumed.
    pub fn advance(&mut self, counts: u64) -> u64 {
        if !self.enabled {
            return counts;
        }

        let remaining = self.period() - self.phase;
        if counts < remaining {
            self.phase += counts;
            return counts;
        }

        self.phase = 0;
        self.active_divisor = self.divisor;
        self.pending = true;
        self.update_count += 1;
        remaining
    }

    /// Whether the IRQ line is asserted.
    pub fn interrupt_line(&self) -> bool {
        self.pending && self.interrupt_enabled
    }

    /// Divisor currently shaping the tick rate (the preload only counts after an update).
    pub fn active_divisor(&self) -> u32 {
        self.active_divisor
    }

    pub fn reload(&self) -> u32 {
        self.reload
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    pub fn disable_count(&self) -> u32 {
        self.disable_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl SampleTimer for SimTimer {
    fn set_divisor(&mut self, divisor: u32) {
        self.divisor = divisor;
    }

    fn set_reload(&mut self, reload: u32) {
        self.reload = reload;
    }

    fn force_update(&mut self) {
        self.active_divisor = self.divisor;
        self.phase = 0;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.disable_count += 1;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
    }

    fn take_pending(&mut self) -> bool {
        core::mem::replace(&mut self.pending, false)
    }
}

pub const HISTORY_LEN: usize = 1024;

/// Records what would have been latched into the DAC.
pub struct SimBus {
    writes: u64,
    history: HistoryBuffer<u8, HISTORY_LEN>,
}

impl Default for SimBus {
    fn default() -> Self {
        Self { writes: 0, history: HistoryBuffer::new() }
    }
}

impl SimBus {
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn last(&self) -> Option<u8> {
        self.history.recent().copied()
    }

    /// The most recent samples, oldest first, at most [`HISTORY_LEN`].
    pub fn history(&self) -> impl Iterator<Item = u8> + '_ {
        self.history.oldest_ordered().copied()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl OutputBus for SimBus {
    fn write(&mut self, sample: u8) {
        self.writes += 1;
        self.history.write(sample);
    }
}

/// An engine running on simulated hardware.
pub struct Bench<'e> {
    engine: &'e Engine,
    timer: SimTimer,
    bus: SimBus,
    elapsed: u64,
}

impl<'e> Bench<'e> {
    pub fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            timer: SimTimer::default(),
            bus: SimBus::default(),
            elapsed: 0,
        }
    }

    pub fn start(&mut self) {
        self.engine.start(&mut self.timer);
    }

    /// Advances simulated time by `counts` base-clock cycles, servicing every interrupt.
    /// Returns the number of samples emitted.
    pub fn run_counts(&mut self, counts: u64) -> u64 {
        let before = self.bus.writes();
        let mut left = counts;
        while left > 0 {
            let used = self.timer.advance(left);
            left -= used;
            self.elapsed += used;
            self.service();
        }
        self.bus.writes() - before
    }

    pub fn run_millis(&mut self, millis: u64) -> u64 {
        let base = self.engine.config().clock.base_clock_hz as u64;
        self.run_counts(base * millis / 1000)
    }

    /// Runs until `ticks` more samples have been emitted. Gives up if the clock is stopped or
    /// its interrupt can never fire.
    pub fn run_ticks(&mut self, ticks: u64) -> u64 {
        let before = self.bus.writes();
        while self.bus.writes() - before < ticks && self.timer.is_enabled() && self.timer.interrupt_enabled() {
            let used = self.timer.advance(u64::MAX);
            self.elapsed += used;
            self.service();
        }
        self.bus.writes() - before
    }

    /// Delivers a command between two ticks, as the transport callback would.
    pub fn send(&mut self, bytes: &[u8]) -> Result<Settings, CommandError> {
        self.engine.handle_command(&mut self.timer, bytes)
    }

    #[inline(always)]
    fn service(&mut self) {
        if self.timer.interrupt_line() {
            self.engine.on_tick(&mut self.timer, &mut self.bus);
        }
    }

    pub fn timer(&self) -> &SimTimer {
        &self.timer
    }

    pub fn bus(&self) -> &SimBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SimBus {
        &mut self.bus
    }

    /// Simulated time in base-clock cycles.
    pub fn elapsed_counts(&self) -> u64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn run_ticks_gives_up_without_an_interrupt() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let mut bench = Bench::new(&engine);
        // counting, but nothing can ever raise the IRQ line
        bench.timer.set_reload(3);
        bench.timer.enable();

        assert_eq!(bench.run_ticks(1), 0);
        assert_eq!(bench.bus().writes(), 0);
    }
}

use crate::config::ClockConfig;

/// A periodic timer peripheral, modeled on a general-purpose STM32 timer.
///
/// The prescaler is preloaded: a new value only takes effect at the next update event,
/// which [`SampleTimer::force_update`] generates on demand.
pub trait SampleTimer {
    fn set_divisor(&mut self, divisor: u32);
    fn set_reload(&mut self, reload: u32);
    /// Reload the shadow registers and restart the count, without raising a tick.
    fn force_update(&mut self);
    fn enable(&mut self);
    fn disable(&mut self);
    fn is_enabled(&self) -> bool;
    fn enable_interrupt(&mut self);
    /// Clears the pending tick flag, returning whether it was set.
    fn take_pending(&mut self) -> bool;
}

/// An 8-bit parallel port wired to the DAC.
pub trait OutputBus {
    fn write(&mut self, sample: u8);
}

impl<T: SampleTimer + ?Sized> SampleTimer for &mut T {
    #[inline(always)]
    fn set_divisor(&mut self, divisor: u32) { (**self).set_divisor(divisor) }
    #[inline(always)]
    fn set_reload(&mut self, reload: u32) { (**self).set_reload(reload) }
    #[inline(always)]
    fn force_update(&mut self) { (**self).force_update() }
    #[inline(always)]
    fn enable(&mut self) { (**self).enable() }
    #[inline(always)]
    fn disable(&mut self) { (**self).disable() }
    #[inline(always)]
    fn is_enabled(&self) -> bool { (**self).is_enabled() }
    #[inline(always)]
    fn enable_interrupt(&mut self) { (**self).enable_interrupt() }
    #[inline(always)]
    fn take_pending(&mut self) -> bool { (**self).take_pending() }
}

impl<B: OutputBus + ?Sized> OutputBus for &mut B {
    #[inline(always)]
    fn write(&mut self, sample: u8) { (**self).write(sample) }
}

/// Drives a [`SampleTimer`] at `256 * frequency` ticks per second.
pub struct SampleClock<T: SampleTimer> {
    timer: T,
    config: ClockConfig,
}

impl<T: SampleTimer> SampleClock<T> {
    pub fn new(timer: T, config: ClockConfig) -> Self {
        Self { timer, config }
    }

    /// Programs the rate and lets the timer run with its interrupt enabled.
    pub fn start(&mut self, frequency_hz: u32) {
        self.timer.set_divisor(self.config.divisor(frequency_hz));
        self.timer.set_reload(self.config.reload());
        self.timer.force_update();
        self.timer.enable_interrupt();
        self.timer.enable();
    }

    /// Stop, load the new divisor, force the reload, resume.
    ///
    /// The forced update applies the divisor and restarts the tick phase in one step, so no tick
    /// is ever produced with a half-loaded prescaler.
    pub fn reprogram(&mut self, frequency_hz: u32) {
        self.timer.disable();
        self.timer.set_divisor(self.config.divisor(frequency_hz));
        self.timer.force_update();
        self.timer.enable();
    }

    #[inline(always)]
    pub fn stop(&mut self) {
        self.timer.disable();
    }

    #[inline(always)]
    pub fn resume(&mut self) {
        self.timer.enable();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_enabled()
    }
}

use thiserror::Error;

use crate::tables::{TABLE_LEN, Waveform};

/// How the timer derives sample ticks from the system clock.
///
/// The timer counts `base_clock_hz / (divisor + 1)` times per second and raises one update
/// event every `counts_per_tick` counts (auto-reload value `counts_per_tick - 1`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    pub base_clock_hz: u32,
    pub counts_per_tick: u32,
    pub max_divisor: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        // STM32F4 reference board: 60 MHz core clock, TIM2 reload of 3, 16-bit prescaler
        Self {
            base_clock_hz: 60_000_000,
            counts_per_tick: 4,
            max_divisor: 0xFFFF,
        }
    }
}

impl ClockConfig {
    /// Prescaler value for a waveform frequency: `base / (k * f * 256) - 1`.
    ///
    /// Callers must only pass frequencies accepted by [`EngineConfig::validate`]'s range.
    #[inline(always)]
    pub fn divisor(&self, frequency_hz: u32) -> u32 {
        self.base_clock_hz / (self.counts_per_tick * frequency_hz * TABLE_LEN as u32) - 1
    }

    #[inline(always)]
    pub fn reload(&self) -> u32 {
        self.counts_per_tick - 1
    }

    /// Sample ticks per second actually produced by `divisor`.
    pub fn tick_rate_hz(&self, divisor: u32) -> f64 {
        self.base_clock_hz as f64 / ((divisor as f64 + 1.0) * self.counts_per_tick as f64)
    }

    /// Base clock counts between two sample ticks at `divisor`.
    #[inline(always)]
    pub fn counts_per_sample(&self, divisor: u32) -> u64 {
        (divisor as u64 + 1) * self.counts_per_tick as u64
    }
}

/// When the command handler stops the sample clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StopPolicy {
    /// Only a fully validated command touches the clock.
    #[default]
    OnAccept,
    /// Stop as soon as any bytes arrive. A rejected command then resumes the clock at its old rate
    /// instead of leaving the output silent until the next valid command.
    Eager,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub clock: ClockConfig,
    pub default_waveform: Waveform,
    pub default_frequency_hz: u16,
    pub max_frequency_hz: u16,
    pub stop_policy: StopPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            default_waveform: Waveform::Sine,
            default_frequency_hz: 2,
            max_frequency_hz: 10_000,
            stop_policy: StopPolicy::OnAccept,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("counts per tick must be at least 1")]
    ZeroCountsPerTick,
    #[error("maximum frequency must be at least 1 Hz")]
    ZeroMaxFrequency,
    #[error("default frequency {0} Hz is outside 1..={1} Hz")]
    DefaultFrequency(u16, u16),
    #[error("a {base_clock_hz} Hz clock cannot reach {max_frequency_hz} Hz")]
    ClockTooSlow { base_clock_hz: u32, max_frequency_hz: u16 },
    #[error("1 Hz needs divisor {divisor}, timer holds at most {max_divisor}")]
    DivisorOverflow { divisor: u32, max_divisor: u32 },
}

impl EngineConfig {
    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    pub fn with_defaults(mut self, waveform: Waveform, frequency_hz: u16) -> Self {
        self.default_waveform = waveform;
        self.default_frequency_hz = frequency_hz;
        self
    }

    /// Checks that every frequency in `1..=max_frequency_hz` maps to a divisor the timer can hold,
    /// so that validated commands can never produce a zero or overflowing prescaler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let clock = &self.clock;
        if clock.counts_per_tick == 0 {
            return Err(ConfigError::ZeroCountsPerTick);
        }
        if self.max_frequency_hz == 0 {
            return Err(ConfigError::ZeroMaxFrequency);
        }
        if self.default_frequency_hz == 0 || self.default_frequency_hz > self.max_frequency_hz {
            return Err(ConfigError::DefaultFrequency(self.default_frequency_hz, self.max_frequency_hz));
        }

        let fastest = clock.counts_per_tick as u64 * self.max_frequency_hz as u64 * TABLE_LEN as u64;
        if (clock.base_clock_hz as u64) < fastest {
            return Err(ConfigError::ClockTooSlow {
                base_clock_hz: clock.base_clock_hz,
                max_frequency_hz: self.max_frequency_hz,
            });
        }

        let slowest = clock.divisor(1);
        if slowest > clock.max_divisor {
            return Err(ConfigError::DivisorOverflow { divisor: slowest, max_divisor: clock.max_divisor });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_divisors() {
        let clock = ClockConfig::default();
        assert_eq!(clock.divisor(2), 60_000_000 / (4 * 2 * 256) - 1);
        assert_eq!(clock.divisor(2), 29_295);
        assert_eq!(clock.divisor(440), 132);
        assert_eq!(clock.divisor(10_000), 4);
        assert_eq!(clock.reload(), 3);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn slow_clock_is_rejected() {
        let cfg = EngineConfig::default().with_clock(ClockConfig {
            base_clock_hz: 8_000_000,
            ..ClockConfig::default()
        });
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ClockTooSlow { base_clock_hz: 8_000_000, max_frequency_hz: 10_000 })
        );
    }

    #[test]
    fn fast_clock_overflows_prescaler() {
        let cfg = EngineConfig::default().with_clock(ClockConfig {
            base_clock_hz: 168_000_000,
            ..ClockConfig::default()
        });
        assert!(matches!(cfg.validate(), Err(ConfigError::DivisorOverflow { .. })));
    }

    #[test]
    fn bad_defaults_are_rejected() {
        let cfg = EngineConfig::default().with_defaults(Waveform::Square, 0);
        assert_eq!(cfg.validate(), Err(ConfigError::DefaultFrequency(0, 10_000)));

        let cfg = EngineConfig::default().with_clock(ClockConfig {
            counts_per_tick: 0,
            ..ClockConfig::default()
        });
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCountsPerTick));
    }
}

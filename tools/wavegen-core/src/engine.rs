use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{debug, info};

use crate::command::{Command, CommandError};
use crate::config::{ConfigError, EngineConfig, StopPolicy};
use crate::playback::{PlaybackSnapshot, PlaybackState, Settings};
use crate::sample_clock::{OutputBus, SampleClock, SampleTimer};
use crate::tables::WaveBank;

/// Verification counters. The host never sees these; they exist so a bench or a debugger can
/// tell a dropped command from one that never arrived.
#[derive(Debug, Default)]
pub struct EngineStats {
    accepted: AtomicU32,
    rejected: AtomicU32,
}

impl EngineStats {
    pub fn accepted(&self) -> u32 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    // single writer (the command handler), so no read-modify-write needed
    #[inline(always)]
    fn bump(counter: &AtomicU32) {
        counter.store(counter.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
    }
}

/// Everything the tick interrupt and the command handler share.
///
/// Both contexts hold `&Engine`; the hardware handles are passed in by whichever context
/// owns them at the time of the call.
#[derive(Debug)]
pub struct Engine {
    bank: WaveBank,
    state: PlaybackState,
    config: EngineConfig,
    stats: EngineStats,
    started: AtomicBool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let engine = Engine {
            bank: WaveBank::generate(),
            state: PlaybackState::new(Settings {
                waveform: config.default_waveform,
                frequency_hz: config.default_frequency_hz,
            }),
            config,
            stats: EngineStats::default(),
            started: AtomicBool::new(false),
        };

        Ok(engine)
    }

    /// Programs the timer for the current settings and lets it run.
    pub fn start<T: SampleTimer>(&self, timer: T) {
        let settings = self.state.settings();
        let divisor = self.config.clock.divisor(settings.frequency_hz as u32);
        info!(
            "sample clock starting: {} @ {}Hz (divisor {}, {:.1} ticks/s)",
            settings.waveform.name(),
            settings.frequency_hz,
            divisor,
            self.config.clock.tick_rate_hz(divisor)
        );

        SampleClock::new(timer, self.config.clock).start(settings.frequency_hz as u32);
        self.started.store(true, Ordering::Release);
    }

    /// Whether [`Engine::start`] has programmed the timer.
    #[inline(always)]
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Timer interrupt body: acknowledge, emit one sample, advance the cursor.
    #[inline(always)]
    pub fn on_tick<T: SampleTimer, B: OutputBus>(&self, mut timer: T, mut bus: B) {
        if !timer.take_pending() {
            return;
        }

        let waveform = self.state.waveform();
        let cursor = self.state.advance();
        bus.write(self.bank.table(waveform)[cursor as usize]);
    }

    /// Applies a command received from the host, or drops it.
    ///
    /// Before [`Engine::start`] an accepted command only replaces the settings and the timer is
    /// left alone; `start` then programs it for them. The result is for the caller's bookkeeping
    /// only; the protocol sends nothing back.
    pub fn handle_command<T: SampleTimer>(&self, timer: T, bytes: &[u8]) -> Result<Settings, CommandError> {
        let mut clock = SampleClock::new(timer, self.config.clock);
        let started = self.is_started();
        let eager = started && self.config.stop_policy == StopPolicy::Eager;
        let was_running = clock.is_running();

        if eager {
            clock.stop();
        }

        match self.decode(bytes) {
            Ok(settings) if !started => {
                self.state.replace(settings);

                EngineStats::bump(&self.stats.accepted);
                debug!("staged {} @ {}Hz until start", settings.waveform.name(), settings.frequency_hz);
                Ok(settings)
            }
            Ok(settings) => {
                // the tick routine must not run between these two steps
                clock.stop();
                self.state.replace(settings);
                clock.reprogram(settings.frequency_hz as u32);

                EngineStats::bump(&self.stats.accepted);
                debug!("applied {} @ {}Hz", settings.waveform.name(), settings.frequency_hz);
                Ok(settings)
            }
            Err(e) => {
                if eager && was_running {
                    clock.resume();
                }

                EngineStats::bump(&self.stats.rejected);
                debug!("dropped command ({} bytes): {}", bytes.len(), e);
                Err(e)
            }
        }
    }

    /// Parse and range-check without touching any state.
    pub fn decode(&self, bytes: &[u8]) -> Result<Settings, CommandError> {
        let command = Command::parse(bytes)?;
        let frequency_hz = command.validate(self.config.max_frequency_hz)?;
        Ok(Settings { waveform: command.waveform, frequency_hz })
    }

    #[inline(always)]
    pub fn settings(&self) -> Settings {
        self.state.settings()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn bank(&self) -> &WaveBank {
        &self.bank
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }
}

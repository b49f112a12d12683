use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use crate::tables::Waveform;

/// The part of the playback state a command replaces: waveform and frequency, always together.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub waveform: Waveform,
    pub frequency_hz: u16,
}

impl Settings {
    // waveform tag in bits 16..24, frequency in bits 0..16
    #[inline(always)]
    fn pack(self) -> u32 {
        ((self.waveform.tag() as u32) << 16) | self.frequency_hz as u32
    }

    #[inline(always)]
    fn unpack(word: u32) -> Self {
        let waveform = Waveform::from_tag((word >> 16) as u8).unwrap_or(Waveform::Sine);
        Settings { waveform, frequency_hz: word as u16 }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub settings: Settings,
    pub cursor: u8,
}

/// State shared between the tick interrupt and the command handler.
///
/// `settings` lives in one word so a reader can never see a waveform from one command paired
/// with the frequency of another. `cursor` has a single writer, the tick routine; it is a `u8`,
/// so wrapping at 256 is the integer's own overflow.
#[derive(Debug)]
pub struct PlaybackState {
    settings: AtomicU32,
    cursor: AtomicU8,
}

impl PlaybackState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: AtomicU32::new(settings.pack()),
            cursor: AtomicU8::new(0),
        }
    }

    #[inline(always)]
    pub fn settings(&self) -> Settings {
        Settings::unpack(self.settings.load(Ordering::Acquire))
    }

    #[inline(always)]
    pub fn waveform(&self) -> Waveform {
        self.settings().waveform
    }

    #[inline(always)]
    pub fn frequency_hz(&self) -> u16 {
        self.settings().frequency_hz
    }

    /// Only called with the sample clock stopped.
    #[inline(always)]
    pub(crate) fn replace(&self, settings: Settings) {
        self.settings.store(settings.pack(), Ordering::Release);
    }

    #[inline(always)]
    pub fn cursor(&self) -> u8 {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Returns the current cursor and moves it one step forward.
    ///
    /// Single writer: plain load and store, no read-modify-write.
    #[inline(always)]
    pub(crate) fn advance(&self) -> u8 {
        let cursor = self.cursor.load(Ordering::Relaxed);
        self.cursor.store(cursor.wrapping_add(1), Ordering::Relaxed);
        cursor
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot { settings: self.settings(), cursor: self.cursor() }
    }
}

use core::f64::consts::PI;

pub const TABLE_LEN: usize = 256;

/// One period of a waveform, unsigned 8-bit, centered on 128.
pub type WaveTable = [u8; TABLE_LEN];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Waveform {
    Sine = 1,
    /// Exposed as "triangle" on the wire, but the table is a rising ramp.
    Triangle = 2,
    Square = 3,
}

impl Waveform {
    pub const ALL: [Waveform; 3] = [Waveform::Sine, Waveform::Triangle, Waveform::Square];

    /// Maps a two byte wire token (`W1`, `W2`, `W3`) to a waveform.
    #[inline(always)]
    pub fn from_selector(token: [u8; 2]) -> Option<Self> {
        match &token {
            b"W1" => Some(Waveform::Sine),
            b"W2" => Some(Waveform::Triangle),
            b"W3" => Some(Waveform::Square),
            _ => None,
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            Waveform::Sine => "W1",
            Waveform::Triangle => "W2",
            Waveform::Square => "W3",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
        }
    }

    #[inline(always)]
    pub(crate) fn tag(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Waveform::Sine),
            2 => Some(Waveform::Triangle),
            3 => Some(Waveform::Square),
            _ => None,
        }
    }
}

/// The three lookup tables, generated once and never written again.
#[derive(Clone, PartialEq, Eq)]
pub struct WaveBank {
    sine: WaveTable,
    triangle: WaveTable,
    square: WaveTable,
}

impl WaveBank {
    pub fn generate() -> Self {
        let mut bank = WaveBank {
            sine: [0; TABLE_LEN],
            triangle: [0; TABLE_LEN],
            square: [0; TABLE_LEN],
        };

        for i in 0..TABLE_LEN {
            bank.sine[i] = sine_sample(i);
            bank.triangle[i] = i as u8;
            bank.square[i] = if i < TABLE_LEN / 2 { 255 } else { 0 };
        }

        bank
    }

    #[inline(always)]
    pub fn table(&self, waveform: Waveform) -> &WaveTable {
        match waveform {
            Waveform::Sine => &self.sine,
            Waveform::Triangle => &self.triangle,
            Waveform::Square => &self.square,
        }
    }
}

impl core::fmt::Debug for WaveBank {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        // 768 bytes of samples is noise in a log line
        f.debug_struct("WaveBank")
            .field("sine", &format_args!("[{}, {}, ..]", self.sine[0], self.sine[1]))
            .field("triangle", &format_args!("[{}, {}, ..]", self.triangle[0], self.triangle[1]))
            .field("square", &format_args!("[{}, {}, ..]", self.square[0], self.square[1]))
            .finish()
    }
}

fn sine_sample(i: usize) -> u8 {
    let phase = 2.0 * PI * i as f64 / TABLE_LEN as f64;
    let v = libm::round(128.0 + 127.0 * libm::sin(phase));
    v.clamp(0.0, 255.0) as u8
}

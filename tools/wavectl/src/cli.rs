use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use wavegen_core::{Command, Waveform};

#[derive(Parser, Debug)]
#[command(name = "wavectl")]
#[command(version, about = "wavegen DAC firmware tool", long_about = None)]
pub struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List USB serial ports that could be the board
    Ports,

    /// Send a raw command such as W1F440
    Send {
        command: String,

        #[command(flatten)]
        link: LinkArgs,

        /// Skip the local syntax and range check
        #[arg(long)]
        raw: bool,
    },

    /// Select a waveform and frequency
    Set {
        #[arg(short, long, value_enum)]
        wave: WaveArg,

        /// Output frequency in Hz
        #[arg(short, long)]
        freq: u32,

        #[command(flatten)]
        link: LinkArgs,
    },

    /// Run the engine on a simulated timer and print what the DAC would see
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct LinkArgs {
    /// Serial port (auto-detected if not specified)
    #[arg(short, long, env = "WAVECTL_PORT")]
    pub port: Option<String>,

    #[arg(short, long, default_value_t = 115_200)]
    pub baud: u32,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Waveform playing at power-up
    #[arg(short, long, value_enum, default_value_t = WaveArg::Sine)]
    pub wave: WaveArg,

    /// Frequency playing at power-up
    #[arg(short, long, default_value_t = 2)]
    pub freq: u16,

    /// Simulated run time
    #[arg(short, long, default_value_t = 1000)]
    pub millis: u64,

    /// Deliver a command mid-run, e.g. `W3F100@250` (repeatable)
    #[arg(long = "then", value_name = "CMD@MS")]
    pub schedule: Vec<Scheduled>,

    /// How many of the last samples to print
    #[arg(long, default_value_t = 16)]
    pub preview: usize,

    /// Timer input clock
    #[arg(long, default_value_t = 60_000_000)]
    pub base_clock: u32,

    /// Stop the clock on every received command, not just accepted ones
    #[arg(long)]
    pub eager_stop: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaveArg {
    Sine,
    Triangle,
    Square,
}

impl From<WaveArg> for Waveform {
    fn from(w: WaveArg) -> Self {
        match w {
            WaveArg::Sine => Waveform::Sine,
            WaveArg::Triangle => Waveform::Triangle,
            WaveArg::Square => Waveform::Square,
        }
    }
}

impl WaveArg {
    pub fn command(self, freq: u32) -> Command {
        Command { waveform: self.into(), frequency_hz: freq }
    }
}

/// A command to deliver at a point in simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled {
    pub at_ms: u64,
    pub text: String,
}

impl FromStr for Scheduled {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (text, at) = s
            .rsplit_once('@')
            .ok_or_else(|| format!("expected CMD@MS, got {s:?}"))?;
        let at_ms = at
            .trim()
            .parse()
            .map_err(|e| format!("bad time in {s:?}: {e}"))?;
        Ok(Scheduled { at_ms, text: text.to_string() })
    }
}

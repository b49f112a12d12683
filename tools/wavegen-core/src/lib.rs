//! Wavetable DAC engine.
//!
//! A timer interrupt streams 8-bit samples from one of three precomputed tables onto a
//! parallel output port, and a text command (`W1F440`) received from the host swaps the
//! table and the playback frequency without the interrupt ever seeing a half-applied change.
//!
//! The crate is `no_std` and hardware-agnostic: the timer and the port are reached through
//! the [`SampleTimer`] and [`OutputBus`] traits. [`sim`] provides a software model of both so
//! the engine can be driven on a host.
#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod config;
pub mod engine;
pub mod playback;
pub mod sample_clock;
pub mod sim;
pub mod tables;

pub use command::{Command, CommandError, MAX_COMMAND_LEN};
pub use config::{ClockConfig, ConfigError, EngineConfig, StopPolicy};
pub use engine::{Engine, EngineStats};
pub use playback::{PlaybackSnapshot, PlaybackState, Settings};
pub use sample_clock::{OutputBus, SampleClock, SampleTimer};
pub use tables::{TABLE_LEN, WaveBank, WaveTable, Waveform};

//! wavectl - host side of the wavegen DAC firmware
//!
//! - `send`/`set`: write a `<selector>F<frequency>` command to the board over USB serial
//! - `simulate`: run the same engine on a simulated timer and port
//! - `ports`: list candidate serial ports

pub mod cli;
pub mod port;
pub mod simulate;

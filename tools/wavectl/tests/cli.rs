use clap::Parser;
use wavectl::cli::{Cli, Commands, Scheduled, WaveArg};
use wavectl::simulate;
use wavegen_core::{Settings, Waveform};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("wavectl").chain(args.iter().copied())).expect("parse")
}

#[test]
fn set_encodes_wire_command() {
    let cli = parse(&["set", "--wave", "square", "--freq", "100", "--port", "/dev/ttyACM0"]);
    match cli.command {
        Commands::Set { wave, freq, link } => {
            assert_eq!(wave, WaveArg::Square);
            assert_eq!(wave.command(freq).encode().as_str(), "W3F100");
            assert_eq!(link.port.as_deref(), Some("/dev/ttyACM0"));
            assert_eq!(link.baud, 115_200);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn send_keeps_text_verbatim() {
    let cli = parse(&["-vv", "send", "W2F440", "--raw"]);
    assert_eq!(cli.verbose, 2);
    match cli.command {
        Commands::Send { command, raw, .. } => {
            assert_eq!(command, "W2F440");
            assert!(raw);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_wave_is_a_usage_error() {
    let args = ["wavectl", "set", "--wave", "sawtooth", "--freq", "10"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn scheduled_command_syntax() {
    assert_eq!("W3F100@250".parse::<Scheduled>(), Ok(Scheduled { at_ms: 250, text: "W3F100".into() }));
    // only the last @ separates the time
    assert_eq!("a@b@7".parse::<Scheduled>(), Ok(Scheduled { at_ms: 7, text: "a@b".into() }));
    assert!("W3F100".parse::<Scheduled>().is_err());
    assert!("W3F100@soon".parse::<Scheduled>().is_err());
}

#[test]
fn simulate_defaults_play_two_hertz_sine() {
    let cli = parse(&["simulate"]);
    let Commands::Simulate(args) = cli.command else { panic!("not simulate") };

    let report = simulate::run(&args).unwrap();
    assert_eq!(report.settings, Settings { waveform: Waveform::Sine, frequency_hz: 2 });
    assert_eq!(report.divisor, 29_295);
    assert_eq!(report.ticks, 512);
    assert_eq!(report.preview.len(), 16);
}

#[test]
fn simulate_applies_schedule_in_time_order() {
    let cli = parse(&[
        "simulate", "--then", "XYZ@750", "--then", "W3F100@500", "--preview", "4",
    ]);
    let Commands::Simulate(args) = cli.command else { panic!("not simulate") };

    let report = simulate::run(&args).unwrap();
    assert_eq!(report.settings, Settings { waveform: Waveform::Square, frequency_hz: 100 });
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 1);
    // 256 sine samples in the first half second, then 100 Hz with a fresh phase
    assert_eq!(report.ticks, 256 + 12_820);
    assert_eq!(report.preview.len(), 4);
    assert!(report.preview.iter().all(|&s| s == 0 || s == 255));
}

#[test]
fn simulate_rejects_unusable_clock() {
    let cli = parse(&["simulate", "--base-clock", "1000000"]);
    let Commands::Simulate(args) = cli.command else { panic!("not simulate") };
    assert!(simulate::run(&args).is_err());
}

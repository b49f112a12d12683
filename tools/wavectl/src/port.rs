use std::io::Write;
use std::time::Duration;

use anyhow::{Context, bail};
use dialoguer::Select;
use dialoguer::console::style;
use serialport::{SerialPort, SerialPortInfo, SerialPortType, available_ports};
use tracing::{debug, info};

use crate::cli::LinkArgs;

/// USB serial ports, filtered the same way on linux/windows/macos.
pub fn candidate_ports() -> anyhow::Result<Vec<SerialPortInfo>> {
    let ports = available_ports().context("failed to enumerate serial ports")?;

    Ok(ports
        .into_iter()
        .filter(|port| {
            matches!(port.port_type, SerialPortType::UsbPort(_))
                || port.port_name.contains("USB")
                || port.port_name.contains("ACM")
                || port.port_name.contains("COM")
                || port.port_name.contains("usb")
        })
        .collect())
}

pub fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "{} ({:04x}:{:04x}{})",
            port.port_name,
            usb.vid,
            usb.pid,
            usb.product.as_deref().map(|p| format!(" {p}")).unwrap_or_default()
        ),
        _ => port.port_name.clone(),
    }
}

pub fn select_port() -> anyhow::Result<String> {
    let ports = candidate_ports()?;

    match ports.as_slice() {
        [] => {
            println!("No USB serial ports found! Are you in the dialout group?");
            bail!("No USB serial ports found!")
        }
        [p] => {
            println!("Using {}", p.port_name);
            Ok(p.port_name.clone())
        }
        ports => {
            println!("Multiple USB serial ports found");

            let labels: Vec<String> = ports.iter().map(describe).collect();

            let selected = Select::new()
                .with_prompt("Select your USB serial port")
                .default(0)
                .items(&labels)
                .interact()
                .context("port selection aborted")?;

            Ok(ports[selected].port_name.clone())
        }
    }
}

pub fn open(link: &LinkArgs) -> anyhow::Result<Box<dyn SerialPort>> {
    let port_name = match &link.port {
        Some(name) => name.clone(),
        None => select_port()?,
    };

    debug!("opening {} at {} baud", port_name, link.baud);
    serialport::new(&port_name, link.baud)
        .timeout(Duration::from_millis(2000))
        .open()
        .with_context(|| format!("failed to open {port_name}"))
}

/// Writes one command. The firmware answers nothing, so there is nothing to wait for.
pub fn send(port: &mut dyn SerialPort, payload: &[u8]) -> anyhow::Result<()> {
    port.write_all(payload).context("write failed")?;
    port.flush().context("flush failed")?;

    info!("sent {:?}", String::from_utf8_lossy(payload));
    println!("{} {}", style("sent").green(), style(String::from_utf8_lossy(payload)).bold());
    Ok(())
}

extern crate microscan;

use anyhow::Result;
use microscan::BarcodeReader;
use microscan::configuration::entries;
use microscan::transport::SerialOptions;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // console output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry().with(console_layer).init();

    let serial_port = "/dev/ttyUSB0";
    info!("using port {}", serial_port);
    let mut reader = BarcodeReader::new(serial_port);
    let config = reader.connect(SerialOptions::default())?;

    let host = config.host_port_connection.clone().unwrap_or_default();
    println!(
        "host port {} baud, {:?} parity, {:?} data bits, {:?} stop bits",
        host.baud_rate, host.parity, host.data_bits, host.stop_bits
    );
    for entry in entries() {
        if let Some(setting) = config.get(entry.code) {
            let fragment = setting.encode()?;
            println!(
                "{:<32} {}",
                entry.name,
                String::from_utf8_lossy(&fragment)
            );
        }
    }

    reader.close()?;
    Ok(())
}

extern crate microscan;

use std::time::Duration;

use anyhow::Result;
use microscan::BarcodeReader;
use microscan::settings::{Trigger, TriggerMode};
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
    let mut config = reader.connect(SerialOptions::default())?;

    info!("switching to serial trigger mode");
    config.trigger = Some(Trigger {
        mode: TriggerMode::SerialData,
        ..Default::default()
    });
    reader.set_config(config);
    reader.write_config()?;

    info!("setting read timeout to 10s");
    reader.set_read_timeout(Duration::from_secs(10));

    info!("starting scan");
    match reader.read_barcode()? {
        barcode if barcode.is_empty() => println!("no barcode could be identified"),
        barcode => println!("{}", barcode),
    }

    reader.close()?;
    Ok(())
}

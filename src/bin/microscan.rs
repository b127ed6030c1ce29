use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use microscan::BarcodeReader;
use microscan::configuration::extract_fragments;
use microscan::settings::{DataBits, Parity, StopBits};
use microscan::transport::SerialOptions;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Read and write the configuration of a Microscan barcode reader"
)]
struct Args {
    /// serial port the reader is connected to
    #[arg(env = "MICROSCAN_PORT")]
    port: String,

    /// baud rate, the factory default is 9600
    #[arg(long)]
    baud: Option<u32>,

    /// parity, the factory default is even
    #[arg(long, value_enum)]
    parity: Option<ParityArg>,

    /// data bits, the factory default is 7
    #[arg(long, value_parser = clap::value_parser!(u8).range(7..=8))]
    data_bits: Option<u8>,

    /// stop bits, the factory default is 1
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    stop_bits: Option<u8>,

    /// milliseconds the reader gets to report its configuration
    #[arg(long, default_value_t = 2000)]
    config_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ParityArg {
    None,
    Even,
    Odd,
}

impl From<ParityArg> for Parity {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => Parity::None,
            ParityArg::Even => Parity::Even,
            ParityArg::Odd => Parity::Odd,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the reader configuration, one setting per line
    Dump,
    /// read one barcode
    Read,
    /// apply the settings in a file on top of the reader configuration and write it back
    Write { file: PathBuf },
    /// print every line the reader sends until interrupted
    Listen,
}

fn main() -> Result<()> {
    // console output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry().with(console_layer).init();

    let args = Args::parse();
    let overrides = SerialOptions {
        baud_rate: args.baud,
        parity: args.parity.map(Parity::from),
        data_bits: args.data_bits.map(|bits| match bits {
            8 => DataBits::Eight,
            _ => DataBits::Seven,
        }),
        stop_bits: args.stop_bits.map(|bits| match bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        }),
    };

    let mut reader = BarcodeReader::new(&args.port);
    reader.set_config_timeout(Duration::from_millis(args.config_timeout_ms));
    info!("using port {}", args.port);
    reader
        .connect(overrides)
        .with_context(|| format!("cannot connect to the reader on {}", args.port))?;

    let result = run(&mut reader, args.command);
    reader.close()?;
    result
}

fn run(reader: &mut BarcodeReader, command: Command) -> Result<()> {
    match command {
        Command::Dump => {
            let config = reader.config().context("no configuration was read")?;
            println!("{}", String::from_utf8_lossy(&config.to_wire(b"\n")?));
        }
        Command::Read => {
            let barcode = reader.read_barcode()?;
            if barcode.is_empty() {
                println!("no barcode could be identified");
            } else {
                println!("{}", barcode);
            }
        }
        Command::Write { file } => {
            let content =
                fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;
            let fragments = extract_fragments(&content);
            if fragments.is_empty() {
                bail!("no settings found in {}", file.display());
            }
            let mut config = reader.config().unwrap_or_default();
            config.apply_wire_batch(&fragments)?;
            reader.set_config(config);
            reader.write_config()?;
            info!("wrote {} setting(s) from {}", fragments.len(), file.display());
        }
        Command::Listen => loop {
            let line = reader.read_line()?;
            if !line.is_empty() {
                println!("{}", String::from_utf8_lossy(&line).trim_end());
            }
        },
    }
    Ok(())
}

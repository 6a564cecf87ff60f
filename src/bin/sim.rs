use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use quadadc::{ClockDivisor, Configuration, Device};

/// System clock period of the reference bench, in nanoseconds.
const CLOCK_PERIOD_NS: u64 = 50;

fn parse_code(text: &str) -> Result<u16, String> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|error| format!("{}: {}", text, error))
}

/// Simulate acquisition cycles of the quad ADC controller.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Sample width in bits
    #[clap(long, default_value_t = 12, value_parser = clap::value_parser!(u8).range(1..=16))]
    width: u8,
    /// Lead-in SCLK cycles discarded before the data bits
    #[clap(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=3))]
    null_cycles: u8,
    /// SCLK divider selector; SCLK period is 2 << select system clocks
    #[clap(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    clock_div: u8,
    /// Number of acquisition cycles to run
    #[clap(long, default_value_t = 1)]
    cycles: usize,
    /// Write a value change dump of the pins to this file
    #[clap(long)]
    vcd: Option<PathBuf>,
    /// Write the raw pin samples to this file
    #[clap(long)]
    dump: Option<PathBuf>,
    /// Codes returned by ADC channels 0 to 3, in hexadecimal
    #[clap(num_args = 4, required = true, value_parser = parse_code)]
    codes: Vec<u16>,
}

fn main() -> quadadc::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Configuration::new(args.width, args.null_cycles,
                                    ClockDivisor::from_select(args.clock_div))?;
    let mask = ((1u32 << config.width()) - 1) as u16;
    let codes = [0, 1, 2, 3].map(|index| args.codes[index] & mask);

    let mut device = Device::with_codes(config, codes);
    if args.vcd.is_some() || args.dump.is_some() {
        device.start_trace();
    }
    device.startup();

    println!("configuration: {:?} (ui_in = {:#010b})", config, config.bits());
    for cycle in 0..args.cycles {
        let acquisition = device.acquire()?;
        let serial = acquisition.bits.iter()
            .map(|&bit| if bit { '1' } else { '0' })
            .collect::<String>();
        println!("cycle {}: {} SCLK edges, {} clocks selected",
                 cycle, acquisition.sclk_rising_edges, acquisition.select_ticks);
        for (channel, word) in acquisition.words().iter().enumerate() {
            println!("  adc{}: {:#06x}", channel, word);
        }
        println!("  tx:   {}", serial);
    }

    if let Some(trace) = device.take_trace() {
        if let Some(path) = args.vcd.as_ref() {
            trace.write_vcd(BufWriter::new(File::create(path)?), CLOCK_PERIOD_NS)?;
            println!("saved {} clocks to {}", trace.len(), path.display());
        }
        if let Some(path) = args.dump.as_ref() {
            std::fs::write(path, trace.as_bytes())?;
            println!("saved {} bytes to {}", trace.as_bytes().len(), path.display());
        }
    }
    Ok(())
}

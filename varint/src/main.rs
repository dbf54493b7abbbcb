#![deny(clippy::all)]

use std::{
    io::{self, Cursor, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use varint_config::{LoadTomlConfiguration, LoggingConfig, VarintConfig};
use varint_protocol::{Codec, Uleb128, Uleb128Varint};

#[derive(Parser)]
#[command(name = "varint", version, about = "Encode and decode ULEB128 varints")]
struct Cli {
    /// Configuration file to use instead of ./varint.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the hex encoding of each value
    Encode {
        #[arg(required = true)]
        values: Vec<u128>,
        /// Print all encodings back to back on one line
        #[arg(long)]
        concat: bool,
    },
    /// Decode consecutive varints from hex input, printing offset, length and value
    Decode {
        /// Hex digits, whitespace is ignored
        #[arg(required = true)]
        hex: Vec<String>,
    },
}

fn init_logger(config: &LoggingConfig) -> anyhow::Result<()> {
    if !config.enabled {
        return Ok(());
    }
    let mut logger = simple_logger::SimpleLogger::new().with_level(config.level.into());

    if !config.timestamp {
        logger = logger.without_timestamps();
    }

    if config.env {
        logger = logger.env();
    }

    logger = logger.with_colors(config.color);
    logger = logger.with_threads(config.threads);
    logger.init().context("failed to install logger")
}

fn encode(values: &[u128], concat: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if concat {
        let mut buf: Vec<u8> = Vec::new();
        for &value in values {
            Uleb128::encode(value, &mut buf);
        }
        writeln!(out, "{}", hex::encode(buf))?;
        return Ok(());
    }

    for &value in values {
        let varint = Uleb128Varint::<Vec<u8>>::from_value(value)?;
        writeln!(out, "{value}\t{}", hex::encode(varint.as_bytes()))?;
    }
    Ok(())
}

fn decode(input: &[String], max_encoded_size: usize, out: &mut impl Write) -> anyhow::Result<()> {
    let digits: String = input
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect();
    let bytes = hex::decode(digits).context("input is not valid hex")?;
    log::debug!("decoding {} bytes", bytes.len());

    let mut cursor = Cursor::new(&bytes[..]);
    let mut varint = Uleb128Varint::<Vec<u8>>::new();
    loop {
        let offset = cursor.position();
        if offset >= bytes.len() as u64 {
            break;
        }
        varint
            .read_from_limited(&mut cursor, max_encoded_size)
            .with_context(|| format!("bad varint at offset {offset}"))?;
        let value: u128 = varint
            .get()
            .with_context(|| format!("varint at offset {offset} does not fit 128 bits"))?;
        writeln!(out, "{offset}\t{}\t{value}", varint.len())?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => VarintConfig::load_from(path)?,
        None => VarintConfig::load()?,
    };
    init_logger(&config.logging)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Encode { values, concat } => encode(&values, concat, &mut out),
        Command::Decode { hex } => decode(&hex, config.stream.max_encoded_size, &mut out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_decode(input: &str, max_encoded_size: usize) -> anyhow::Result<String> {
        let mut out: Vec<u8> = Vec::new();
        decode(&[input.to_string()], max_encoded_size, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn encodes_each_value() {
        let mut out: Vec<u8> = Vec::new();
        encode(&[0, 300, 16384], false, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0\t00\n300\tac02\n16384\t808001\n"
        );
    }

    #[test]
    fn encodes_concatenated() {
        let mut out: Vec<u8> = Vec::new();
        encode(&[127, 128], true, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7f8001\n");
    }

    #[test]
    fn decodes_consecutive_values() {
        assert_eq!(
            run_decode("ac02 7f 80 80 01", 10).unwrap(),
            "0\t2\t300\n2\t1\t127\n3\t3\t16384\n"
        );
    }

    #[test]
    fn decode_reports_truncation_and_limits() {
        assert!(run_decode("ac", 10).is_err());
        assert!(run_decode("808001", 2).is_err());
        assert!(run_decode("zz", 10).is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["varint", "decode", "ac02"]).unwrap();
        assert!(matches!(cli.command, Command::Decode { .. }));
        assert!(Cli::try_parse_from(["varint", "encode", "-1"]).is_err());
    }
}

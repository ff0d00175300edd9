use bin2ota_core::{
    boards::{self, BoardIter},
    compress::Lzss,
    transport::{CHUNK_SIZE, INTER_CHUNK_DELAY_MS},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::*;

use std::io::Write;

use crate::{
    encode::{encode, Compression},
    lzss::lzss,
    transport::{base64, json},
};

mod encode;
mod lzss;
mod output;
mod transport;

#[derive(Subcommand, Debug)]
enum Command {
    /// Frame a firmware binary into an OTA container
    #[command(arg_required_else_help = true)]
    Encode {
        /// Target board (MKR_WIFI_1010, ESP32, etc.)
        #[clap(value_parser = board_parser)]
        board: String,

        /// Input firmware binary
        input: String,

        /// Output OTA file
        output: String,

        /// The input is a raw image, leave the compression flag cleared
        #[clap(short, long, conflicts_with = "lzss")]
        uncompressed: bool,

        /// Compress the input with LZSS before framing it
        #[clap(short, long)]
        lzss: bool,
    },
    /// Encode an OTA file as base64
    #[command(arg_required_else_help = true)]
    Base64 {
        /// Input OTA file
        input: String,

        /// Output base64 file
        output: String,
    },
    /// Wrap an OTA file in the JSON document used for chunked transfer
    #[command(arg_required_else_help = true)]
    Json {
        /// Input OTA file
        input: String,

        /// Output JSON file
        output: String,

        /// Bytes per chunk sent to the device
        #[clap(short, long, default_value_t = CHUNK_SIZE)]
        chunk_size: u32,

        /// Delay between two chunks in milliseconds
        #[clap(short, long, default_value_t = INTER_CHUNK_DELAY_MS)]
        delay: u32,
    },
    /// Compress or decompress a file with LZSS
    #[command(arg_required_else_help = true)]
    Lzss {
        #[command(flatten)]
        mode: LzssMode,

        /// Input file
        input: String,

        /// Output file
        output: String,
    },
    /// List the supported boards
    Boards,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct LzssMode {
    /// Compress the input
    #[clap(long)]
    encode: bool,

    /// Decompress the input
    #[clap(long)]
    decode: bool,
}

fn board_parser(s: &str) -> Result<String, String> {
    boards::lookup(s)
        .map(|board| board.name.to_string())
        .map_err(|err| err.to_string())
}

#[derive(Parser, Debug, Default)]
#[clap(version, about, long_about = None, author = "Jonathan Nilsson")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Set the logging verbosity
    #[clap(short, long, value_enum, global = true, default_value_t = LogLevel::Info)]
    verbose: LogLevel,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(cli.verbose.into())
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let level = record.level();
            if level == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
        })
        .init();

    let command = match cli.command {
        Some(command) => command,
        None => return Ok(()),
    };

    match command {
        Command::Encode {
            board,
            input,
            output,
            uncompressed,
            lzss,
        } => {
            let board = BoardIter::find_by_name(&board)
                .expect("This already has been verified by board_parser");

            let compression = if lzss {
                Compression::With(&Lzss)
            } else if uncompressed {
                Compression::None
            } else {
                Compression::Precompressed
            };

            encode(&input, &output, board, compression)
        }
        Command::Base64 { input, output } => base64(&input, &output),
        Command::Json {
            input,
            output,
            chunk_size,
            delay,
        } => json(&input, &output, chunk_size, delay),
        Command::Lzss {
            mode,
            input,
            output,
        } => lzss(&input, &output, mode.decode && !mode.encode),
        Command::Boards => {
            for board in BoardIter::new() {
                match board.usb_ids() {
                    Some((vid, pid)) => println!(
                        "{:<20} {:#010x}  usb {:04x}:{:04x}",
                        board.name, board.magic, vid, pid
                    ),
                    None => println!("{:<20} {:#010x}", board.name, board.magic),
                }
            }
            Ok(())
        }
    }
}

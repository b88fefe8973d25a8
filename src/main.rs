//! Settlers -- recommends a setup placement for the seat to move.
//!
//! Reads an HDCS snapshot (from a file, or stdin when no file is given),
//! simulates the best options through the rest of the setup and prints them
//! ranked by expected share.
//!
//! Usage:
//!   settlers [OPTIONS] [FILE]
//!
//! Options:
//!   --x N            Options to simulate (default: 6)
//!   --max-window N   Branches kept per seat-turn (default: 20)
//!   --k F            Softmax margin (default: 2.5)
//!   --config FILE    JSON configuration file
//!   --random SEED    Use a random standard board instead of a snapshot
//!   --placeouts N    Placeouts listed per option (default: 3)
//!   --serial         Do not use the thread pool
//!   --json           Print the ranking as JSON

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use settlers::board::generate::random_board;
use settlers::board::state::BoardState;
use settlers::bot::assess_options;
use settlers::protocol::{assessments_json, format_assessments, parse_hdcs};
use settlers::search::NoExtension;
use settlers::{Config, PlacementError};

#[derive(Debug, Default)]
struct Args {
    x: Option<usize>,
    max_window: Option<usize>,
    k: Option<f64>,
    config: Option<PathBuf>,
    random: Option<u64>,
    placeouts: usize,
    serial: bool,
    json: bool,
    input: Option<PathBuf>,
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args.get(i).ok_or_else(|| format!("{} needs a value", flag))?;
    raw.parse()
        .map_err(|_| format!("invalid {} value '{}'", flag, raw))
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut parsed = Args {
        placeouts: 3,
        ..Default::default()
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--x" => {
                i += 1;
                parsed.x = Some(value(args, i, "--x")?);
            }
            "--max-window" => {
                i += 1;
                parsed.max_window = Some(value(args, i, "--max-window")?);
            }
            "--k" => {
                i += 1;
                parsed.k = Some(value(args, i, "--k")?);
            }
            "--config" => {
                i += 1;
                parsed.config = Some(value(args, i, "--config")?);
            }
            "--random" => {
                i += 1;
                parsed.random = Some(value(args, i, "--random")?);
            }
            "--placeouts" => {
                i += 1;
                parsed.placeouts = value(args, i, "--placeouts")?;
            }
            "--serial" => parsed.serial = true,
            "--json" => parsed.json = true,
            "--help" | "-h" => return Ok(None),
            other if other.starts_with("--") => {
                return Err(format!("Unknown argument: {}", other));
            }
            path => {
                if parsed.input.is_some() {
                    return Err(format!("Unexpected extra input: {}", path));
                }
                parsed.input = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }
    Ok(Some(parsed))
}

fn print_usage() {
    eprintln!("Usage: settlers [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --x N            Options to simulate (default: 6)");
    eprintln!("  --max-window N   Branches kept per seat-turn (default: 20)");
    eprintln!("  --k F            Softmax margin (default: 2.5)");
    eprintln!("  --config FILE    JSON configuration file");
    eprintln!("  --random SEED    Use a random standard board");
    eprintln!("  --placeouts N    Placeouts listed per option (default: 3)");
    eprintln!("  --serial         Do not use the thread pool");
    eprintln!("  --json           Print the ranking as JSON");
}

fn build_config(args: &Args) -> Result<Config, PlacementError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(x) = args.x {
        config.search.x = x;
    }
    if let Some(w) = args.max_window {
        config.search.max_window = w;
    }
    if let Some(k) = args.k {
        config.search.k = k;
    }
    if args.serial {
        config.search.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_board(args: &Args, config: &Config) -> Result<BoardState, PlacementError> {
    if let Some(seed) = args.random {
        return Ok(random_board(seed));
    }
    let json = match &args.input {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            PlacementError::MalformedBoard(format!("failed to read {}: {}", path.display(), e))
        })?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| PlacementError::MalformedBoard(format!("failed to read stdin: {}", e)))?;
            buf
        }
    };
    let doc = parse_hdcs(&json)?;
    let board = doc.to_board()?;
    doc.check_turn(&board, config);
    Ok(board)
}

fn run(args: &Args) -> Result<(), PlacementError> {
    let config = build_config(args)?;
    let board = load_board(args, &config)?;
    let assessed = assess_options(&board, &config, &NoExtension)?;
    if args.json {
        println!("{}", assessments_json(&assessed)?);
    } else {
        print!("{}", format_assessments(&assessed, args.placeouts));
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&parsed) {
        eprintln!("error: {}", e);
        process::exit(2);
    }
}

use clap::{Arg, Command};
use env_logger::Builder;
use log::LevelFilter;
use std::path::PathBuf;

use rain_garden_extract::{extract, run_extract};

fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let matches = Command::new("Rain Garden Extract")
        .version("1.0")
        .about("Extracts a core rain garden dataset from GI surface data")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .num_args(1)
                .help("Input GeoJSON feature collection"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .num_args(1)
                .help("Output GeoJSON path"),
        )
        .get_matches();

    let source = matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(extract::DEFAULT_SOURCE));

    let dest = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(extract::DEFAULT_DEST));

    match run_extract(&source, &dest) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

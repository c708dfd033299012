#![warn(clippy::all)]
//! Shared pieces of the groundcover command line tools

/// Reading colored point clouds from ASCII text files
pub mod ascii;

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use groundcover_core::cloud::PointCloud;

use crate::ascii::{read_ascii_cloud, Delimiter};

/// The input arguments every tool takes
pub fn input_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("INPUT")
            .short("i")
            .takes_value(true)
            .value_name("INPUT")
            .help("Input point cloud as ASCII text with one 'x y z r g b' point per line")
            .required(true),
        Arg::with_name("DELIMITER")
            .long("delimiter")
            .takes_value(true)
            .value_name("CHAR")
            .help("Field delimiter of the input file, a single character or 'tab'. Defaults to whitespace"),
    ]
}

/// Reads the cloud given by the arguments of [`input_args`]
pub fn load_input(matches: &ArgMatches) -> Result<PointCloud> {
    let input = matches
        .value_of("INPUT")
        .ok_or_else(|| anyhow!("No input file given"))?;
    let delimiter = match matches.value_of("DELIMITER") {
        Some(delimiter) => delimiter.parse().context("Invalid --delimiter")?,
        None => Delimiter::Whitespace,
    };
    read_ascii_cloud(input, delimiter)
}

/// Parses an optional numeric argument, falling back to `default` if it is absent
pub fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match matches.value_of(name) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", value, name)),
        None => Ok(default),
    }
}

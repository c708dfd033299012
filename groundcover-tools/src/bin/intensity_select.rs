#![warn(clippy::all)]

use std::time::Instant;

use anyhow::Result;
use clap::{App, Arg};
use groundcover_algorithms::{
    intensity::{
        select_by_neighbourhood_intensity, select_by_neighbourhood_intensity_par, IntensityOptions,
    },
    spatial::SpatialIndex,
};
use groundcover_tools::{input_args, load_input, parse_arg};
use log::info;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let matches = App::new("groundcover intensity selection")
        .version("0.1")
        .about("Selects all points that have a neighbour whose grayscale intensity lies strictly within a range")
        .args(&input_args())
        .arg(
            Arg::with_name("NEIGHBOURS")
                .short("k")
                .long("neighbours")
                .takes_value(true)
                .value_name("K")
                .help("Number of nearest neighbours to inspect per point, at least 3")
                .default_value("10"),
        )
        .arg(
            Arg::with_name("MIN")
                .long("min")
                .takes_value(true)
                .value_name("0-255")
                .help("Exclusive lower bound of the intensity")
                .default_value("0"),
        )
        .arg(
            Arg::with_name("MAX")
                .long("max")
                .takes_value(true)
                .value_name("0-255")
                .help("Exclusive upper bound of the intensity")
                .default_value("255"),
        )
        .arg(
            Arg::with_name("PARALLEL")
                .short("p")
                .long("parallel")
                .help("Run the neighbourhood queries on all cores"),
        )
        .get_matches();

    let defaults = IntensityOptions::default();
    let options = IntensityOptions {
        neighbours: parse_arg(&matches, "NEIGHBOURS", defaults.neighbours)?,
        min: parse_arg(&matches, "MIN", defaults.min)?,
        max: parse_arg(&matches, "MAX", defaults.max)?,
    };
    options.validate()?;

    let mut cloud = load_input(&matches)?;

    let t_start = Instant::now();
    let index = SpatialIndex::build(&cloud);
    info!(
        "Built spatial index over {} points in {:.2}s",
        index.len(),
        t_start.elapsed().as_secs_f64()
    );

    let t_start = Instant::now();
    let selected = if matches.is_present("PARALLEL") {
        select_by_neighbourhood_intensity_par(&mut cloud, &index, &options)?
    } else {
        select_by_neighbourhood_intensity(&mut cloud, &index, &options)?
    };
    info!("Selection took {:.2}s", t_start.elapsed().as_secs_f64());

    println!(
        "{} of {} points have a neighbour with an intensity in ({}, {})",
        selected,
        cloud.len(),
        options.min,
        options.max
    );
    Ok(())
}

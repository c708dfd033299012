#![warn(clippy::all)]

use anyhow::Result;
use clap::{App, Arg};
use groundcover_algorithms::{
    color_filter::{ChannelRange, ColorRange},
    methods::ColorFilterMethod,
};
use groundcover_core::{project::Project, state::PointFlag};
use groundcover_tools::{input_args, load_input, parse_arg};
use log::info;

fn bound_arg(name: &'static str, long: &'static str, help: &'static str) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .long(long)
        .takes_value(true)
        .value_name("0-255")
        .help(help)
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let matches = App::new("groundcover color filter")
        .version("0.1")
        .about("Selects all points whose color lies strictly within the given channel ranges")
        .args(&input_args())
        .arg(bound_arg("RED_MIN", "red-min", "Exclusive lower bound of the red channel [default: 0]"))
        .arg(bound_arg("RED_MAX", "red-max", "Exclusive upper bound of the red channel [default: 255]"))
        .arg(bound_arg("GREEN_MIN", "green-min", "Exclusive lower bound of the green channel [default: 0]"))
        .arg(bound_arg("GREEN_MAX", "green-max", "Exclusive upper bound of the green channel [default: 255]"))
        .arg(bound_arg("BLUE_MIN", "blue-min", "Exclusive lower bound of the blue channel [default: 0]"))
        .arg(bound_arg("BLUE_MAX", "blue-max", "Exclusive upper bound of the blue channel [default: 255]"))
        .arg(
            Arg::with_name("DELETE")
                .short("d")
                .long("delete")
                .help("Also mark the matched points as deleted"),
        )
        .get_matches();

    let range = ColorRange {
        red: ChannelRange::new(
            parse_arg(&matches, "RED_MIN", 0)?,
            parse_arg(&matches, "RED_MAX", 255)?,
        ),
        green: ChannelRange::new(
            parse_arg(&matches, "GREEN_MIN", 0)?,
            parse_arg(&matches, "GREEN_MAX", 255)?,
        ),
        blue: ChannelRange::new(
            parse_arg(&matches, "BLUE_MIN", 0)?,
            parse_arg(&matches, "BLUE_MAX", 255)?,
        ),
    };

    let mut project = Project::new();
    let target = project.add_cloud(load_input(&matches)?);
    let method = ColorFilterMethod {
        target: Some(target),
        range,
        delete_points: matches.is_present("DELETE"),
    };
    method.validate(&project)?;
    let found = method.run(&mut project)?;

    let cloud = project.cloud(target)?;
    info!("Filtered '{}'", cloud.name());
    println!("{} of {} points within the color range", found, cloud.len());
    if method.delete_points {
        println!(
            "{} points marked as deleted",
            cloud.count_flag(PointFlag::Deleted)
        );
    }
    Ok(())
}

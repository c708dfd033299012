#![warn(clippy::all)]

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use clap::{App, Arg};
use groundcover_algorithms::{
    classification::{ClassificationThresholds, GroundCover},
    methods::AreasDetectionMethod,
    pipeline::GroundCoverOptions,
};
use groundcover_core::project::Project;
use groundcover_tools::{input_args, load_input, parse_arg};
use log::info;

fn read_thresholds(path: &Path) -> Result<ClassificationThresholds> {
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid classification thresholds in {}", path.display()))
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let matches = App::new("groundcover areas detection")
        .version("0.1")
        .about("Classifies the points of a colored point cloud into snow, vegetation and road and estimates the area of each")
        .args(&input_args())
        .arg(
            Arg::with_name("MIN_DISTANCE")
                .short("m")
                .long("min-distance")
                .takes_value(true)
                .value_name("DISTANCE")
                .help("Minimal distance between the points of the simplified cloud")
                .default_value("0.1"),
        )
        .arg(
            Arg::with_name("RADIUS")
                .short("r")
                .long("radius")
                .takes_value(true)
                .value_name("RADIUS")
                .help("Neighbourhood radius of the plane fit residual")
                .default_value("1.0"),
        )
        .arg(
            Arg::with_name("THRESHOLDS")
                .short("t")
                .long("thresholds")
                .takes_value(true)
                .value_name("JSON")
                .help("JSON file overriding some or all classification thresholds"),
        )
        .get_matches();

    let defaults = GroundCoverOptions::default();
    let thresholds = match matches.value_of("THRESHOLDS") {
        Some(path) => read_thresholds(Path::new(path))?,
        None => defaults.thresholds,
    };
    let options = GroundCoverOptions {
        min_distance: parse_arg(&matches, "MIN_DISTANCE", defaults.min_distance)?,
        plane_fit_radius: parse_arg(&matches, "RADIUS", defaults.plane_fit_radius)?,
        thresholds,
    };
    info!("Running with {:?}", options);

    let mut project = Project::new();
    let target = project.add_cloud(load_input(&matches)?);
    let method: AreasDetectionMethod = AreasDetectionMethod {
        target: Some(target),
        options,
        ..Default::default()
    };
    method.validate(&project)?;
    let report = method.run(&mut project)?;

    let cloud = project.cloud(target)?;
    println!("groundcover areas report for {}", cloud.name());
    if let Some(bounds) = cloud.bounds() {
        let extent = bounds.extent();
        println!(
            "\tExtent:           {:.2} x {:.2} x {:.2}",
            extent.x, extent.y, extent.z
        );
    }
    println!("\tPoints:           {}", cloud.len());
    println!("\tVisible points:   {}", report.counts.visible);
    let categories = GroundCover::PRIORITY
        .iter()
        .chain(std::iter::once(&GroundCover::Unclassified));
    for category in categories {
        println!(
            "\t{:<17} {} points, {:.2}%",
            format!("{}:", category),
            report.counts.count(*category),
            report.ratios.ratio(*category)
        );
    }
    Ok(())
}

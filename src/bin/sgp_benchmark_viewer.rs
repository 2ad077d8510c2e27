use anyhow::Result;
use clap::{CommandFactory, Parser};
use env_logger;
use nalgebra::base::*;
use std::path::PathBuf;
use std::time::Instant;

use sgp_benchmark_viewer::benchmark::Benchmark;
use sgp_benchmark_viewer::render::{FrameParameters, HeadlessContext, SkeletonsRenderable};
use sgp_benchmark_viewer::skeleton3d::SkeletonFormat;

const VERSION_STRING: &str = "SGP 2016 Benchmark Viewer tool v1.0";

const HELP_STRING: &str = "SGP 2016 Benchmark Viewer\n\
=========================\n\n\
Viewer of the benchmark results.";

#[derive(Parser)]
#[command(about = HELP_STRING, disable_version_flag = true)]
struct Cli {
    /// print version string
    #[arg(short = 'v', long = "version")]
    version: bool,
    /// where the benchmark results had been stored. If not specified, this is the working directory.
    #[arg(short = 'd', long = "input_directory")]
    input_directory: Option<PathBuf>,
    /// stem of the input skeletons to compare (the basename of the input mesh used to compute the skeleton, from which we removed the extension part)
    #[arg(short = 's', long = "stem")]
    stem: Option<String>,
    /// format of the skeleton files to load (median, web)
    #[arg(short = 'f', long = "format", default_value = "median")]
    format: SkeletonFormat,
    /// also draw the links of the skeletons
    #[arg(long = "links")]
    links: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    if args.version {
        println!("{}", VERSION_STRING);
    }

    let stem = match args.stem {
        Some(stem) if !stem.is_empty() => stem,
        _ => {
            log::error!("no input stem. Please specify one input stem to launch the viewer");
            Cli::command().print_help()?;
            println!();
            std::process::exit(1);
        }
    };

    let input_directory = match args.input_directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let mut renderable = SkeletonsRenderable::new(HeadlessContext::new());
    renderable.set_show_links(args.links);

    println!("Loading benchmark");
    let now = Instant::now();
    let benchmark = Benchmark::load(&mut renderable, &stem, &input_directory, args.format)?;
    println!(
        "{} skeletons loaded in {}ms",
        benchmark.entries().len(),
        now.elapsed().as_millis()
    );
    println!("");

    println!("Uploading skeletons");
    let now = Instant::now();
    renderable.update_gpu_data()?;
    println!("Uploaded in {}ms", now.elapsed().as_millis());
    println!("");

    let light_position = benchmark
        .bounding_box(&renderable)
        .map(|(_, bb_max)| Vector3::new(bb_max[0] as f32, bb_max[1] as f32, bb_max[2] as f32))
        .unwrap_or_else(Vector3::zeros);
    let frame = FrameParameters {
        light_position,
        ..FrameParameters::default()
    };
    renderable.render(&frame)?;

    if let Some((bb_min, bb_max)) = benchmark.bounding_box(&renderable) {
        println!("Scene diagonal: {}", (bb_max - bb_min).norm());
    }
    for (i, entry) in benchmark.entries().iter().enumerate() {
        let storage = renderable.get(entry.handle)?;
        let skeleton = storage.skeleton();
        let radii = skeleton
            .compute_minmax_radii()
            .map(|(minr, maxr)| format!("radii [{}, {}]", minr, maxr))
            .unwrap_or_else(|| "no atom".to_string());
        println!(
            "{} {}: {} atoms, {} links, {} faces, {}",
            if storage.is_active() { "*" } else { " " },
            entry.label,
            skeleton.get_number_of_atoms(),
            skeleton.get_number_of_links(),
            skeleton.get_number_of_faces(),
            radii
        );
        log::debug!("entry {} loaded from {}", i, entry.path.display());
    }
    println!(
        "{} draw calls issued",
        renderable.context().draw_calls().len()
    );

    Ok(())
}

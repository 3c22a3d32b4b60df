//! Example: Extract a region from the Smith-Sandwell grid.
//!
//! Usage: cargo run --example extract_region -- <grid> <south> <north> <west> <east> [subsample]
//!
//! Longitudes above 180 select the [0, 360] convention.

use sstopo::{LonConvention, Region, TopoDataset};
use std::env;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sstopo=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 6 {
        eprintln!("Usage: {} <grid> <south> <north> <west> <east> [subsample]", args[0]);
        eprintln!("Example: {} data/topo_18.1.img 30 45 200 240 32", args[0]);
        std::process::exit(1);
    }

    let coord = |i: usize| -> f64 { args[i].parse().expect("Invalid coordinate") };
    let (south, north, west, east) = (coord(2), coord(3), coord(4), coord(5));
    let subsample = args.get(6).map(|s| s.parse::<usize>().expect("Invalid subsample"));

    let convention = if west > 180.0 || east > 180.0 {
        LonConvention::ZeroTo360
    } else {
        LonConvention::PlusMinus180
    };
    let region = Region::new(south, north, west, east).with_convention(convention);

    let topo = match TopoDataset::open(&args[1]) {
        Ok(topo) => topo,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let shape = topo.shape();
    println!(
        "Grid: {} x {} cells, lat {:.3}° to {:.3}°",
        shape.n_lat, shape.n_lon, shape.min_lat, shape.max_lat
    );

    let start = Instant::now();
    let result = match topo.extract_region(&region, subsample) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let (rows, cols) = result.dim();
    println!("Extracted {} x {} cells in {:.3}s", rows, cols, start.elapsed().as_secs_f64());

    let lat = result.latitude();
    let lon = result.longitude();
    println!(
        "Coverage: lat {:.4}° to {:.4}°, lon {:.4}° to {:.4}°",
        lat[0],
        lat[rows - 1],
        lon[0],
        lon[cols - 1]
    );

    let topo_values = result.topo();
    let min = topo_values.iter().copied().min().unwrap_or_default();
    let max = topo_values.iter().copied().max().unwrap_or_default();
    let mean = topo_values.iter().map(|&z| z as f64).sum::<f64>() / topo_values.len() as f64;
    println!("Elevation: min {} m, max {} m, mean {:.1} m", min, max, mean);
}

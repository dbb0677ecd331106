//! CVRP Solver - Command Line Interface
//!
//! Loads a TSPLIB-style `.vrp` instance, runs the GVNS metaheuristic, and
//! prints a final summary (plus an optional BKS gap and SVG plot).

use std::path::PathBuf;

use clap::Parser;

use cvrp_solver::gvns::{self, GvnsConfig};
use cvrp_solver::instance::{read_bks_sidecar, Instance};
use cvrp_solver::visualization::Visualizer;

#[derive(Parser)]
#[command(name = "cvrp-solver")]
#[command(author = "Etudiant M2 AI2D")]
#[command(version = "1.0")]
#[command(about = "A General Variable Neighborhood Search solver for the Capacitated Vehicle Routing Problem")]
struct Cli {
    /// Explicit .vrp instance path. Defaults to the first *.vrp file found
    /// (lexicographic order) under Instances/.
    #[arg(short, long)]
    instance: Option<PathBuf>,

    /// PRNG seed.
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Wall-clock budget in seconds.
    #[arg(short, long, default_value = "600")]
    time: f64,

    /// Iteration budget.
    #[arg(long, default_value = "2000")]
    iter: u64,

    /// Render an SVG (and, with --features resvg, a PNG) of the final solution.
    #[arg(short, long)]
    plot: bool,

    /// Dump the solved solution as JSON to this path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Raise log verbosity (info -> debug).
    #[arg(short, long)]
    verbose: bool,
}

fn find_default_instance() -> Option<PathBuf> {
    let dir = PathBuf::from("Instances");
    let mut entries: Vec<PathBuf> = std::fs::read_dir(&dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "vrp").unwrap_or(false))
        .collect();
    entries.sort();
    entries.into_iter().next()
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let instance_path = match cli.instance.clone().or_else(find_default_instance) {
        Some(path) => path,
        None => {
            log::error!("no --instance given and no *.vrp file found under Instances/");
            std::process::exit(1);
        }
    };

    log::info!("loading instance from {:?}", instance_path);
    let instance = match Instance::from_file(&instance_path) {
        Ok(instance) => instance,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "instance {} loaded: {} customers, capacity {}",
        instance.name,
        instance.num_customers(),
        instance.capacity
    );

    let bks = read_bks_sidecar(&instance_path);

    let config = GvnsConfig { max_iterations: cli.iter, max_seconds: cli.time, seed: cli.seed };
    let best = match gvns::solve(&instance, &config) {
        Ok(solution) => solution,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    println!("========== FINAL RESULTS ==========");
    println!("instance:  {}", instance.name);
    println!("cost:      {:.2}", best.cost());
    println!("vehicles:  {}", best.num_vehicles());
    if let Some(bks_cost) = bks {
        let gap = (best.cost() - bks_cost) / bks_cost * 100.0;
        println!("BKS:       {:.2}", bks_cost);
        println!("gap:       {:.2}%", gap);
    }
    println!("====================================");

    if let Some(out_path) = &cli.output {
        match serde_json::to_string_pretty(&best) {
            Ok(json) => {
                if let Err(e) = std::fs::write(out_path, json) {
                    log::error!("failed to write --output {:?}: {e}", out_path);
                } else {
                    log::info!("solution written to {:?}", out_path);
                }
            }
            Err(e) => log::error!("failed to serialize solution: {e}"),
        }
    }

    if cli.plot {
        let visualizer = Visualizer::new();
        let svg = visualizer.generate_svg(&instance, &best);
        let svg_path = instance_path.with_extension("svg");
        match visualizer.save_svg(&svg, &svg_path) {
            Ok(()) => log::info!("plot written to {:?}", svg_path),
            Err(e) => log::error!("failed to write plot {:?}: {e}", svg_path),
        }
        let png_path = instance_path.with_extension("png");
        if let Err(e) = visualizer.save_png(&svg, &png_path) {
            log::debug!("PNG rendering skipped: {e}");
        } else {
            log::info!("plot written to {:?}", png_path);
        }
    }
}

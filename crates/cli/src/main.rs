use std::path::Path;
use std::process;
use std::time::Instant;

use tourplan::config;
use tourplan::dense::make_dense_problem;
use tourplan::persistence::load_world;
use tourplan::problem::build_problem;
use tourplan::simplifier::simplify_problem;
use tourplan::solver::solve;
use tourplan::tsp::{cost_matrix_from_dense, little_tsp};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt().init();

    let config_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            error!("usage: tourplan <config.toml>");
            process::exit(1);
        }
    };

    let config = match config::load(Path::new(&config_path)) {
        Ok(config) => config,
        Err(err) => {
            error!("failed to load config {config_path}: {err}");
            process::exit(1);
        }
    };

    let world = match load_world(&config.world_path) {
        Ok(world) => world,
        Err(err) => {
            error!("failed to load world {:?}: {err}", config.world_path);
            process::exit(1);
        }
    };

    info!(stops = world.stops.len(), trips = world.trips.len(), "loaded world");
    let now = Instant::now();
    let problem = build_problem(&world);

    // TSP mode always needs a dense graph over a specific kept-stop set;
    // default it to the target stops themselves when the config doesn't name
    // one explicitly. Walk mode can search the full network directly.
    let keep_stop_ids = config.keep_stop_ids.clone().or_else(|| match config.mode {
        config::Mode::Tsp => Some(config.target_stop_ids.clone()),
        config::Mode::Walk => None,
    });

    let problem = match keep_stop_ids {
        Some(keep) => match simplify_problem(&problem, &keep) {
            Ok(simplified) => simplified,
            Err(err) => {
                error!("simplification rejected the network: {err}");
                process::exit(1);
            }
        },
        None => problem,
    };
    info!(elapsed = ?now.elapsed(), "built problem");

    match config.mode {
        config::Mode::Walk => {
            let outcome = solve(&problem, &config.target_stop_ids, config.min_transfer());
            if outcome.walks.is_empty() {
                println!("no feasible tour covering the requested targets");
                return;
            }
            println!("best duration: {}s", outcome.best_duration.as_seconds());
            for solution in &outcome.walks {
                let stop_names: Vec<&str> = solution.walk.iter().map(|&idx| problem.stop_id(idx)).collect();
                println!("  walk: {}", stop_names.join(" -> "));
                for departure in &solution.departure_times {
                    match departure {
                        Some(time) => println!("    departure: {}", time.to_hms_string()),
                        None => println!("    departure: anytime"),
                    }
                }
            }
        }
        config::Mode::Tsp => {
            let dense = make_dense_problem(&problem);
            let cost = cost_matrix_from_dense(&dense);
            let best = little_tsp(&cost);
            if best == tourplan::tsp::INFEASIBLE {
                println!("no feasible tour");
            } else {
                println!("best tour cost: {best}s");
            }
        }
    }
}

//! A General Variable Neighborhood Search (GVNS) solver for the Capacitated
//! Vehicle Routing Problem (CVRP).
//!
//! # Pipeline
//!
//! 1. [`instance::Instance::from_file`] parses a TSPLIB-style `.vrp` file into
//!    a read-only distance/demand oracle.
//! 2. [`heuristics::construction::build_initial_solution`] builds a
//!    deterministic feasible seed via nearest-neighbor.
//! 3. [`gvns::solve`] drives the outer search: clone, shake
//!    ([`shaking::shake`]), descend ([`heuristics::local_search::descend`]),
//!    accept on strict improvement.
//!
//! ```no_run
//! use cvrp_solver::instance::Instance;
//! use cvrp_solver::gvns::{self, GvnsConfig};
//!
//! let instance = Instance::from_file("instance.vrp").unwrap();
//! let config = GvnsConfig::default();
//! let best = gvns::solve(&instance, &config).unwrap();
//! println!("cost={:.2} vehicles={}", best.cost(), best.num_vehicles());
//! ```

pub mod error;
pub mod gvns;
pub mod heuristics;
pub mod instance;
pub mod shaking;
pub mod solution;
pub mod visualization;

pub use error::{Result, SolverError};
pub use instance::Instance;
pub use solution::Solution;

//! General Variable Neighborhood Search: the outer driver that alternates
//! randomized shaking with deterministic VND descent, accepting a candidate
//! only on strict improvement over the incumbent.
//!
//! Per-iteration state machine: Cloning -> Ruining -> Recreating -> Descending
//! -> {Accept, Reject}. Cancellation is cooperative: elapsed time is checked
//! only at the top of each outer iteration, never inside shaking or descent.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::Result;
use crate::heuristics::construction::build_initial_solution;
use crate::heuristics::local_search::{descend, EPS};
use crate::instance::Instance;
use crate::shaking::shake;
use crate::solution::Solution;

/// Ruin fraction used while the incumbent has not improved in a while.
const STAGNATION_RUIN_FRACTION: f64 = 0.30;
/// Normal-regime ruin fraction.
const NORMAL_RUIN_FRACTION: f64 = 0.10;
/// Number of consecutive non-improving iterations after which the ruin
/// fraction escalates.
const STAGNATION_THRESHOLD: u64 = 50;

pub struct GvnsConfig {
    pub max_iterations: u64,
    pub max_seconds: f64,
    pub seed: u64,
}

impl Default for GvnsConfig {
    fn default() -> Self {
        GvnsConfig { max_iterations: 2000, max_seconds: 600.0, seed: 42 }
    }
}

/// Run the GVNS search to completion (budget exhaustion or iteration cap) and
/// return the best solution found. Fails only if construction or a recreate
/// step hits an infeasible instance, which should already have been rejected
/// at instance-load time.
pub fn solve(instance: &Instance, config: &GvnsConfig) -> Result<Solution> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let seed_solution = build_initial_solution(instance)?;
    log::info!(
        "seed solution: cost={:.2} vehicles={}",
        seed_solution.cost,
        seed_solution.num_vehicles()
    );

    let mut incumbent = seed_solution.clone();
    let mut best = seed_solution;
    let mut stagnation: u64 = 0;
    let mut iter: u64 = 0;
    let mut escalated = false;
    let start = Instant::now();

    while iter < config.max_iterations && start.elapsed().as_secs_f64() < config.max_seconds {
        iter += 1;

        let mut candidate = incumbent.clone();
        let p = if stagnation > STAGNATION_THRESHOLD {
            if !escalated {
                log::debug!("stagnation escalation at iter {iter}: ruin fraction 0.10 -> 0.30");
                escalated = true;
            }
            STAGNATION_RUIN_FRACTION
        } else {
            if escalated {
                log::debug!("stagnation reset at iter {iter}: ruin fraction 0.30 -> 0.10");
                escalated = false;
            }
            NORMAL_RUIN_FRACTION
        };

        shake(instance, &mut candidate, p, &mut rng)?;
        descend(instance, &mut candidate);

        if candidate.cost < incumbent.cost - EPS {
            incumbent = candidate;
            stagnation = 0;
            if incumbent.cost < best.cost - EPS {
                best = incumbent.clone();
                log::info!("new best at iter {iter}: cost={:.2}", best.cost);
            }
        } else {
            stagnation += 1;
        }
    }

    if iter >= config.max_iterations {
        log::info!("iteration budget exhausted after {iter} iterations");
    } else {
        log::info!("time budget exhausted after {:.2}s", start.elapsed().as_secs_f64());
    }

    Ok(best)
}

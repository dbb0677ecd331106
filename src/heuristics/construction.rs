//! Deterministic nearest-neighbor construction of the initial CVRP solution.
//!
//! Builds a feasible solution from scratch: no randomness, no tie-breaking by
//! anything other than ascending customer id. This determinism is load-bearing
//! for the reproducibility law (same instance + seed + budgets -> same run).

use crate::error::{Result, SolverError};
use crate::instance::Instance;
use crate::solution::{Route, Solution};

/// Build the initial solution by repeatedly extending the current route with
/// the nearest unvisited customer whose demand fits the remaining capacity.
/// When no customer fits, the current route is closed and a new one started.
/// Fails with `InstanceInfeasible` only if the route is empty and still no
/// customer fits (i.e. the smallest-demand unvisited customer exceeds capacity,
/// which `Instance::from_file` should already have rejected).
pub fn build_initial_solution(instance: &Instance) -> Result<Solution> {
    let depot = instance.depot();

    // Dense indices are assigned by ascending node id, so iterating 0..dimension
    // in order already visits candidates in ascending-id order.
    let mut unvisited: Vec<usize> = instance.customers().collect();

    let mut routes = Vec::new();
    let mut route = Route::new();
    let mut current = depot;
    let mut remaining_capacity = instance.capacity;

    while !unvisited.is_empty() {
        let mut nearest: Option<(usize, f64)> = None;
        for &candidate in &unvisited {
            if instance.demand(candidate) > remaining_capacity {
                continue;
            }
            let d = instance.distance(current, candidate);
            match nearest {
                Some((_, best_d)) if d >= best_d => {}
                _ => nearest = Some((candidate, d)),
            }
        }

        match nearest {
            Some((candidate, _)) => {
                route.push(candidate, instance.demand(candidate));
                remaining_capacity -= instance.demand(candidate);
                current = candidate;
                unvisited.retain(|&c| c != candidate);
            }
            None => {
                if route.is_empty() {
                    let candidate = unvisited[0];
                    return Err(SolverError::InstanceInfeasible(format!(
                        "customer {} demand {} exceeds vehicle capacity {}",
                        instance.nodes[candidate].id,
                        instance.demand(candidate),
                        instance.capacity
                    )));
                }
                routes.push(std::mem::take(&mut route));
                current = depot;
                remaining_capacity = instance.capacity;
            }
        }
    }

    if !route.is_empty() {
        routes.push(route);
    }

    let mut solution = Solution { routes, cost: 0.0 };
    solution.recompute_cost(instance);
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{EdgeWeightType, Node};

    fn toy_instance() -> Instance {
        let nodes = vec![
            Node { id: 1, x: 0.0, y: 0.0, demand: 0 },
            Node { id: 2, x: 3.0, y: 4.0, demand: 5 },
            Node { id: 3, x: 10.0, y: 0.0, demand: 10 },
        ];
        let distance_matrix = vec![
            vec![0.0, 5.0, 10.0],
            vec![5.0, 0.0, 8.0],
            vec![10.0, 8.0, 0.0],
        ];
        Instance {
            name: "toy".to_string(),
            dimension: 3,
            capacity: 50,
            depot_idx: 0,
            edge_weight_type: EdgeWeightType::Euc2d,
            nodes,
            distance_matrix,
        }
    }

    #[test]
    fn sparse_3_produces_single_route_of_cost_25() {
        let instance = toy_instance();
        let solution = build_initial_solution(&instance).unwrap();
        assert_eq!(solution.routes.len(), 1);
        assert_eq!(solution.routes[0].customers.len(), 2);
        assert!((solution.cost - 25.0).abs() < 1e-3);
    }

    #[test]
    fn forced_two_routes_when_capacity_cannot_hold_both() {
        let nodes = vec![
            Node { id: 1, x: 0.0, y: 0.0, demand: 0 },
            Node { id: 2, x: 1.0, y: 0.0, demand: 6 },
            Node { id: 3, x: 2.0, y: 0.0, demand: 6 },
        ];
        let distance_matrix = vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ];
        let instance = Instance {
            name: "forced-two".to_string(),
            dimension: 3,
            capacity: 10,
            depot_idx: 0,
            edge_weight_type: EdgeWeightType::Euc2d,
            nodes,
            distance_matrix,
        };

        let solution = build_initial_solution(&instance).unwrap();
        assert_eq!(solution.routes.len(), 2);
        for route in &solution.routes {
            assert_eq!(route.customers.len(), 1);
        }
    }

    #[test]
    fn seed_round_trip_is_feasible_partition() {
        let instance = toy_instance();
        let solution = build_initial_solution(&instance).unwrap();
        assert!(solution.check_invariants(&instance, 1e-3).is_ok());
    }
}

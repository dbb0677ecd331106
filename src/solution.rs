//! Solution representation: routes, cached cost, and invariant checks.

use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// An ordered sequence of customer dense-indices; the depot is implicit at both ends.
/// `load` is a cache of `Σ demand[v]` for `v` in the route, maintained incrementally
/// by every mutating method so it never requires a full scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    pub customers: Vec<usize>,
    pub load: i64,
}

impl Route {
    pub fn new() -> Self {
        Route { customers: Vec::new(), load: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn push(&mut self, customer: usize, demand: i64) {
        self.customers.push(customer);
        self.load += demand;
    }

    pub fn insert(&mut self, pos: usize, customer: usize, demand: i64) {
        self.customers.insert(pos, customer);
        self.load += demand;
    }

    /// The node preceding `pos`, or the depot if `pos` is the first position.
    pub fn pred_at(&self, pos: usize, depot: usize) -> usize {
        if pos == 0 {
            depot
        } else {
            self.customers[pos - 1]
        }
    }

    /// The node following `pos`, or the depot if `pos` is the last position.
    pub fn succ_at(&self, pos: usize, depot: usize) -> usize {
        if pos + 1 >= self.customers.len() {
            depot
        } else {
            self.customers[pos + 1]
        }
    }
}

/// An unordered multiset of routes covering every customer exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub routes: Vec<Route>,
    pub cost: f64,
}

impl Solution {
    pub fn empty() -> Self {
        Solution { routes: Vec::new(), cost: 0.0 }
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    #[inline]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Cost of a single route: depot -> first, consecutive pairs, last -> depot.
    /// Zero for an empty route.
    pub fn route_cost(instance: &Instance, route: &Route) -> f64 {
        if route.is_empty() {
            return 0.0;
        }
        let depot = instance.depot();
        let mut cost = instance.distance(depot, route.customers[0]);
        for pair in route.customers.windows(2) {
            cost += instance.distance(pair[0], pair[1]);
        }
        cost += instance.distance(*route.customers.last().unwrap(), depot);
        cost
    }

    /// Authoritative recomputation of `cost` from scratch. Invoked at exactly two
    /// points in the core: right after the nearest-neighbor seed is built, and at
    /// the end of every shaking step. All other call sites must rely on the
    /// incremental deltas maintained by the move operators.
    pub fn recompute_cost(&mut self, instance: &Instance) {
        self.cost = self.routes.iter().map(|r| Self::route_cost(instance, r)).sum();
    }

    /// Remove any route left empty by a mutation. Every operator calls this
    /// after applying a move that could have emptied a route.
    pub fn prune_empty_routes(&mut self) {
        self.routes.retain(|r| !r.is_empty());
    }

    pub fn num_vehicles(&self) -> usize {
        self.routes.len()
    }

    /// Check the four solution invariants from the specification. Returns the
    /// first violation found, or `Ok(())` if the solution is sound.
    pub fn check_invariants(&self, instance: &Instance, epsilon: f64) -> Result<(), String> {
        use std::collections::HashSet;

        let mut seen: HashSet<usize> = HashSet::new();
        for route in &self.routes {
            if route.is_empty() {
                return Err("empty route present".to_string());
            }
            let mut load = 0i64;
            for &c in &route.customers {
                if !seen.insert(c) {
                    return Err(format!("customer {c} appears in more than one route"));
                }
                load += instance.demand(c);
            }
            if load != route.load {
                return Err(format!(
                    "route load cache out of sync: cached {} actual {}",
                    route.load, load
                ));
            }
            if load > instance.capacity {
                return Err(format!("route load {load} exceeds capacity {}", instance.capacity));
            }
        }

        let expected: HashSet<usize> = instance.customers().collect();
        if seen != expected {
            return Err("routes do not partition the customer set".to_string());
        }

        let ground_truth: f64 = self.routes.iter().map(|r| Self::route_cost(instance, r)).sum();
        if (ground_truth - self.cost).abs() > epsilon {
            return Err(format!(
                "cost cache out of sync: cached {} ground truth {}",
                self.cost, ground_truth
            ));
        }

        Ok(())
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution: cost={:.2} vehicles={}", self.cost, self.routes.len())?;
        for (i, route) in self.routes.iter().enumerate() {
            writeln!(f, "  route {i} (load {}): {:?}", route.load, route.customers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_instance() -> Instance {
        use crate::instance::{EdgeWeightType, Node};
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
    fn single_route_cost_matches_depot_bracketed_sum() {
        let instance = toy_instance();
        let mut route = Route::new();
        route.push(1, instance.demand(1));
        route.push(2, instance.demand(2));
        let cost = Solution::route_cost(&instance, &route);
        assert_eq!(cost, 5.0 + 8.0 + 10.0);
    }

    #[test]
    fn empty_route_has_zero_cost() {
        let instance = toy_instance();
        let route = Route::new();
        assert_eq!(Solution::route_cost(&instance, &route), 0.0);
    }

    #[test]
    fn check_invariants_detects_capacity_violation() {
        let instance = toy_instance();
        let mut route = Route::new();
        route.push(1, instance.demand(1));
        route.push(2, instance.demand(2));
        route.load = 1000; // corrupt the cache deliberately
        let mut solution = Solution::empty();
        solution.routes.push(route);
        solution.recompute_cost(&instance);
        assert!(solution.check_invariants(&instance, 1e-3).is_err());
    }
}

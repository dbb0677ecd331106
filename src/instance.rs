//! Instance parsing and representation for the Capacitated Vehicle Routing Problem.
//!
//! Handles the TSPLIB-style `.vrp` format: `NODE_COORD_SECTION`, `DEMAND_SECTION`,
//! `DEPOT_SECTION`, and the `EUC_2D` rounding rule. Node ids in the file may be
//! sparse; a dense index (0..N-1), assigned by ascending id, underlies the
//! distance matrix and every other per-node array.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// A customer or depot node, indexed by its position in the file's ascending-id order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Original node id as it appeared in the instance file.
    pub id: u64,
    pub x: f64,
    pub y: f64,
    /// Non-negative demand; zero for the depot.
    pub demand: i64,
}

/// Edge weight type recognized from `EDGE_WEIGHT_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeWeightType {
    Euc2d,
    Other,
}

/// A read-only CVRP instance: nodes, demands, capacity and the precomputed
/// distance matrix. Dense index `0..dimension` is assigned by ascending node id;
/// `depot_idx` is the dense index of the depot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub dimension: usize,
    pub capacity: i64,
    pub depot_idx: usize,
    pub edge_weight_type: EdgeWeightType,
    pub nodes: Vec<Node>,
    #[serde(skip)]
    pub distance_matrix: Vec<Vec<f64>>,
}

enum Section {
    None,
    Coords,
    Demands,
    Depot,
}

impl Instance {
    /// Parse an instance from a TSPLIB CVRP file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|_| SolverError::FileNotFound(path.to_path_buf()))?;
        let reader = BufReader::new(file);

        let mut name = String::new();
        let mut dimension: Option<usize> = None;
        let mut capacity: Option<i64> = None;
        let mut edge_weight_type = EdgeWeightType::Other;

        let mut coords: Vec<(u64, f64, f64)> = Vec::new();
        let mut demands: BTreeMap<u64, i64> = BTreeMap::new();
        let mut depot_id: Option<u64> = None;

        let mut section = Section::None;

        for line in reader.lines() {
            let line = line.map_err(|e| SolverError::ParseError(format!("read error: {e}")))?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if let Some(value) = line.strip_prefix("NAME") {
                name = value.trim_start_matches(':').trim().to_string();
                continue;
            }
            if let Some(value) = line.strip_prefix("DIMENSION") {
                let value = value.trim_start_matches(':').trim();
                dimension = Some(
                    value
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid DIMENSION: {value}")))?,
                );
                continue;
            }
            if let Some(value) = line.strip_prefix("CAPACITY") {
                let value = value.trim_start_matches(':').trim();
                capacity = Some(
                    value
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid CAPACITY: {value}")))?,
                );
                continue;
            }
            if let Some(value) = line.strip_prefix("EDGE_WEIGHT_TYPE") {
                let value = value.trim_start_matches(':').trim();
                edge_weight_type = if value == "EUC_2D" {
                    EdgeWeightType::Euc2d
                } else {
                    EdgeWeightType::Other
                };
                continue;
            }
            if line.starts_with("COMMENT") {
                continue;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                section = Section::Coords;
                continue;
            }
            if line.starts_with("DEMAND_SECTION") {
                section = Section::Demands;
                continue;
            }
            if line.starts_with("DEPOT_SECTION") {
                section = Section::Depot;
                continue;
            }

            match section {
                Section::Coords => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        return Err(SolverError::ParseError(format!(
                            "malformed NODE_COORD_SECTION line: {line}"
                        )));
                    }
                    let id: u64 = parts[0]
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid node id: {line}")))?;
                    let x: f64 = parts[1]
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid x coordinate: {line}")))?;
                    let y: f64 = parts[2]
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid y coordinate: {line}")))?;
                    coords.push((id, x, y));
                }
                Section::Demands => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 2 {
                        return Err(SolverError::ParseError(format!(
                            "malformed DEMAND_SECTION line: {line}"
                        )));
                    }
                    let id: u64 = parts[0]
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid node id: {line}")))?;
                    let demand: i64 = parts[1]
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid demand: {line}")))?;
                    demands.insert(id, demand);
                }
                Section::Depot => {
                    let value: i64 = line
                        .parse()
                        .map_err(|_| SolverError::ParseError(format!("invalid DEPOT_SECTION line: {line}")))?;
                    if value == -1 {
                        section = Section::None;
                    } else if depot_id.is_none() {
                        depot_id = Some(value as u64);
                    }
                    // Subsequent ids before the -1 terminator are ignored: first id wins.
                }
                Section::None => {}
            }
        }

        let dimension =
            dimension.ok_or_else(|| SolverError::ParseError("missing DIMENSION".to_string()))?;
        let capacity = capacity.ok_or_else(|| SolverError::ParseError("missing CAPACITY".to_string()))?;
        let depot_id = depot_id.ok_or_else(|| SolverError::ParseError("missing DEPOT_SECTION".to_string()))?;

        if coords.len() != dimension {
            return Err(SolverError::ParseError(format!(
                "DIMENSION={dimension} but NODE_COORD_SECTION has {} entries",
                coords.len()
            )));
        }

        // Dense index assigned by ascending node id.
        coords.sort_by_key(|(id, _, _)| *id);
        let id_to_idx: BTreeMap<u64, usize> =
            coords.iter().enumerate().map(|(idx, (id, _, _))| (*id, idx)).collect();

        let mut nodes = Vec::with_capacity(dimension);
        for (id, x, y) in &coords {
            let demand = *demands
                .get(id)
                .ok_or_else(|| SolverError::ParseError(format!("missing demand for node {id}")))?;
            nodes.push(Node { id: *id, x: *x, y: *y, demand });
        }

        let depot_idx = *id_to_idx
            .get(&depot_id)
            .ok_or_else(|| SolverError::ParseError(format!("depot id {depot_id} has no coordinates")))?;
        nodes[depot_idx].demand = 0;

        for node in &nodes {
            if node.id != depot_id && node.demand > capacity {
                return Err(SolverError::InstanceInfeasible(format!(
                    "customer {} demand {} exceeds capacity {}",
                    node.id, node.demand, capacity
                )));
            }
        }

        let distance_matrix = Self::compute_distance_matrix(&nodes, edge_weight_type);

        Ok(Instance {
            name,
            dimension,
            capacity,
            depot_idx,
            edge_weight_type,
            nodes,
            distance_matrix,
        })
    }

    fn compute_distance_matrix(nodes: &[Node], edge_weight_type: EdgeWeightType) -> Vec<Vec<f64>> {
        let n = nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = nodes[i].x - nodes[j].x;
                let dy = nodes[i].y - nodes[j].y;
                let raw = (dx * dx + dy * dy).sqrt();
                let d = match edge_weight_type {
                    EdgeWeightType::Euc2d => (raw + 0.5).floor(),
                    EdgeWeightType::Other => raw,
                };
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }
        matrix
    }

    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    #[inline]
    pub fn demand(&self, i: usize) -> i64 {
        self.nodes[i].demand
    }

    #[inline]
    pub fn depot(&self) -> usize {
        self.depot_idx
    }

    /// Dense indices of every customer (all nodes except the depot).
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.dimension).filter(move |&i| i != self.depot_idx)
    }

    pub fn num_customers(&self) -> usize {
        self.dimension - 1
    }
}

/// Read the Best-Known-Solution cost from a `.sol` sidecar, if present.
///
/// Replaces a `.vrp` path's extension with `.sol`. A line containing the token
/// `Cost` is parsed by taking its last whitespace-separated token as a float.
/// Absence of the file or any parse failure yields `None`, never an error.
pub fn read_bks_sidecar(vrp_path: &Path) -> Option<f64> {
    let sol_path: PathBuf = vrp_path.with_extension("sol");
    let file = File::open(sol_path).ok()?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.ok()?;
        if line.contains("Cost") {
            return line.split_whitespace().last()?.parse().ok();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile_path::TempVrp {
        tempfile_path::TempVrp::new(contents)
    }

    /// Minimal self-contained temp-file helper (no external tempfile crate needed).
    mod tempfile_path {
        use super::*;
        use std::fs;

        pub struct TempVrp {
            pub path: PathBuf,
        }

        impl TempVrp {
            pub fn new(contents: &str) -> Self {
                let mut path = std::env::temp_dir();
                let unique = format!(
                    "cvrp-solver-test-{}-{}.vrp",
                    std::process::id(),
                    contents.len()
                );
                path.push(unique);
                let mut f = fs::File::create(&path).unwrap();
                f.write_all(contents.as_bytes()).unwrap();
                TempVrp { path }
            }
        }

        impl Drop for TempVrp {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.path);
            }
        }
    }

    const SPARSE_3: &str = "\
NAME: sparse-3
DIMENSION: 3
CAPACITY: 50
EDGE_WEIGHT_TYPE: EUC_2D
NODE_COORD_SECTION
1 0 0
10 3 4
20 10 0
DEMAND_SECTION
1 0
10 5
20 10
DEPOT_SECTION
1
-1
EOF
";

    #[test]
    fn parses_sparse_ids_and_rounds_euc2d() {
        let fixture = write_fixture(SPARSE_3);
        let instance = Instance::from_file(&fixture.path).unwrap();

        assert_eq!(instance.dimension, 3);
        assert_eq!(instance.capacity, 50);

        let id_to_idx: BTreeMap<u64, usize> =
            instance.nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let depot = id_to_idx[&1];
        let ten = id_to_idx[&10];
        let twenty = id_to_idx[&20];

        assert_eq!(instance.depot(), depot);
        assert_eq!(instance.distance(depot, ten), 5.0);
        assert_eq!(instance.distance(depot, twenty), 10.0);
        assert!((instance.distance(ten, twenty) - 8.0).abs() < 1.0);
        assert_eq!(instance.demand(ten), 5);
        assert_eq!(instance.demand(twenty), 10);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = Instance::from_file("/nonexistent/path/does-not-exist.vrp").unwrap_err();
        assert!(matches!(err, SolverError::FileNotFound(_)));
    }

    #[test]
    fn demand_over_capacity_is_infeasible() {
        let fixture = write_fixture(
            "NAME: over\nDIMENSION: 2\nCAPACITY: 5\nEDGE_WEIGHT_TYPE: EUC_2D\n\
             NODE_COORD_SECTION\n1 0 0\n2 1 1\nDEMAND_SECTION\n1 0\n2 6\n\
             DEPOT_SECTION\n1\n-1\nEOF\n",
        );
        let err = Instance::from_file(&fixture.path).unwrap_err();
        assert!(matches!(err, SolverError::InstanceInfeasible(_)));
    }

    #[test]
    fn bks_sidecar_parses_cost_line() {
        let vrp_fixture = write_fixture(SPARSE_3);
        let sol_path = vrp_fixture.path.with_extension("sol");
        let mut f = File::create(&sol_path).unwrap();
        writeln!(f, "Some header").unwrap();
        writeln!(f, "Cost 521.0").unwrap();
        drop(f);

        assert_eq!(read_bks_sidecar(&vrp_fixture.path), Some(521.0));
        let _ = std::fs::remove_file(&sol_path);
    }

    #[test]
    fn bks_sidecar_missing_file_is_none() {
        assert_eq!(read_bks_sidecar(Path::new("/nonexistent/nope.vrp")), None);
    }
}

//! network::centrality — node-level centrality measures on adjacency matrices.
//!
//! Purpose
//! -------
//! Compute the six centrality families used to summarize a connectedness
//! network (betweenness, closeness, degree, eigenvector, Katz, clustering)
//! from a single `N×N` adjacency snapshot. The same functions serve the
//! per-window causal networks and the averaged, binarized network.
//!
//! Key behaviors
//! -------------
//! - Degree: in = column sums, out = row sums; total = in + out, or
//!   in + self-loops for symmetric matrices. Degree centrality divides the
//!   total by its attainable maximum, `N − 1` (symmetric) or `2(N − 1)`
//!   (directed), so it stays in `[0, 1]`.
//! - Closeness: Dijkstra (petgraph) with unit hop weights along out-edges;
//!   `(N − 1) / Σ finite distances`, 0 when nothing is reachable.
//! - Betweenness: layer-by-layer Brandes accumulation per source, BFS depth
//!   capped at [`BETWEENNESS_MAX_DEPTH`], normalized as
//!   `(b − N) · 2 / ((N − 1)(N − 2))`; all zeros when `N < 3`.
//! - Eigenvector: eigenvector of the eigenvalue with the largest real part,
//!   taken from the null space of `A − λI`, in absolute value, summing to 1.
//!   An edgeless network (every vector is an eigenvector of `λ = 0`) gets
//!   the uniform vector `1/N`.
//! - Katz: solution of `(I − αA) x = 1` with [`KATZ_ALPHA`], scaled by
//!   `sign(Σx) / ‖x‖₂`.
//! - Clustering: out-neighbor induced subgraph, edges counted with the
//!   trace adjustment for symmetric subgraphs, scaled by `2` for symmetric
//!   adjacency and `1` otherwise, over `deg (deg − 1)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Non-zero entries are edges; weights are ignored by the path-based
//!   measures (closeness, betweenness, clustering neighborhoods).
//! - All measures are pure functions of the matrix; no state is shared.
//!
//! Testing notes
//! -------------
//! - Unit tests cover complete graphs, stars, paths, isolated nodes, the
//!   Katz scaling invariance, and the eigenvector of a symmetric cycle, a
//!   directed path and the edgeless graph.

use crate::{
    network::{
        adjacency::{is_symmetric, validate_adjacency},
        errors::{NetworkError, NetworkResult},
    },
    numerical_stability::EIGEN_EPS,
};
use nalgebra::{DMatrix, DVector, linalg::Schur};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use petgraph::{algo::dijkstra, graph::DiGraph};

/// Katz attenuation factor. Must stay below `1 / ρ(A)` for a convergent
/// walk series.
pub const KATZ_ALPHA: f64 = 0.1;

/// BFS depth limit of the betweenness accumulation.
pub const BETWEENNESS_MAX_DEPTH: usize = 250;

const SCHUR_MAX_ITER: usize = 10_000;
const SVD_MAX_ITER: usize = 10_000;

/// Degrees — in, out and total degree per node.
#[derive(Debug, Clone, PartialEq)]
pub struct Degrees {
    pub in_degree: Array1<f64>,
    pub out_degree: Array1<f64>,
    pub total: Array1<f64>,
}

/// Centralities — every centrality measure for one adjacency snapshot.
///
/// All vectors have length `N` and follow the entity order of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Centralities {
    pub betweenness: Array1<f64>,
    pub closeness: Array1<f64>,
    pub degree_in: Array1<f64>,
    pub degree_out: Array1<f64>,
    pub degree_total: Array1<f64>,
    pub degree_centrality: Array1<f64>,
    pub eigenvector: Array1<f64>,
    pub katz: Array1<f64>,
    pub clustering: Array1<f64>,
}

impl Centralities {
    /// Compute every measure from the same matrix.
    ///
    /// Errors
    /// ------
    /// - Shape errors from [`validate_adjacency`].
    /// - `NetworkError::EigenDecompositionFailed` or
    ///   `NetworkError::SingularKatzSystem` on numerical breakdown.
    pub fn compute(adj: ArrayView2<f64>) -> NetworkResult<Self> {
        validate_adjacency(adj)?;
        let degrees = degrees(adj)?;
        Ok(Centralities {
            betweenness: betweenness_centrality(adj)?,
            closeness: closeness_centrality(adj)?,
            degree_centrality: degree_centrality(adj)?,
            degree_in: degrees.in_degree,
            degree_out: degrees.out_degree,
            degree_total: degrees.total,
            eigenvector: eigenvector_centrality(adj)?,
            katz: katz_centrality(adj)?,
            clustering: clustering_coefficients(adj)?,
        })
    }
}

/// In-degree (column sums), out-degree (row sums) and total degree.
pub fn degrees(adj: ArrayView2<f64>) -> NetworkResult<Degrees> {
    validate_adjacency(adj)?;
    let in_degree = adj.sum_axis(Axis(0));
    let out_degree = adj.sum_axis(Axis(1));
    let total = if is_symmetric(adj) {
        &in_degree + &adj.diag()
    } else {
        &in_degree + &out_degree
    };
    Ok(Degrees { in_degree, out_degree, total })
}

/// Total degree divided by its maximum attainable value.
pub fn degree_centrality(adj: ArrayView2<f64>) -> NetworkResult<Array1<f64>> {
    let n = validate_adjacency(adj)?;
    let total = degrees(adj)?.total;
    if n < 2 {
        return Ok(Array1::zeros(n));
    }
    let max_degree = if is_symmetric(adj) { (n - 1) as f64 } else { 2.0 * (n - 1) as f64 };
    Ok(total / max_degree)
}

/// Closeness from unit-weight shortest paths along out-edges.
pub fn closeness_centrality(adj: ArrayView2<f64>) -> NetworkResult<Array1<f64>> {
    let n = validate_adjacency(adj)?;
    let mut graph = DiGraph::<(), ()>::with_capacity(n, n * n);
    let nodes: Vec<_> = (0..n).map(|_| graph.add_node(())).collect();
    for ((i, j), &w) in adj.indexed_iter() {
        if w != 0.0 && i != j {
            graph.add_edge(nodes[i], nodes[j], ());
        }
    }

    let mut closeness = Array1::<f64>::zeros(n);
    for (i, &start) in nodes.iter().enumerate() {
        let distances = dijkstra(&graph, start, None, |_| 1_usize);
        let total: usize = distances.values().sum();
        if total > 0 {
            closeness[i] = (n - 1) as f64 / total as f64;
        }
    }
    Ok(closeness)
}

/// Brandes-style betweenness with layer-wise dependency accumulation.
pub fn betweenness_centrality(adj: ArrayView2<f64>) -> NetworkResult<Array1<f64>> {
    let n = validate_adjacency(adj)?;
    if n < 3 {
        return Ok(Array1::zeros(n));
    }
    let a = adj.mapv(|v| if v != 0.0 { 1.0 } else { 0.0 });
    let mut acc = Array1::<f64>::zeros(n);

    for source in 0..n {
        let mut paths = Array1::<f64>::zeros(n);
        paths[source] = 1.0;
        let mut fringe = a.row(source).to_owned();
        fringe[source] = 0.0;
        let mut layers: Vec<Array1<f64>> = Vec::new();

        while fringe.iter().any(|&f| f != 0.0) && layers.len() < BETWEENNESS_MAX_DEPTH {
            paths += &fringe;
            layers.push(fringe.mapv(|f| if f > 0.0 { 1.0 } else { 0.0 }));
            let reached = fringe.dot(&a);
            fringe = Array1::from_shape_fn(n, |k| if paths[k] == 0.0 { reached[k] } else { 0.0 });
        }

        let mut dependency = Array1::<f64>::ones(n);
        for d in (1..layers.len()).rev() {
            let w = Array1::from_shape_fn(n, |k| {
                if layers[d][k] > 0.0 { dependency[k] / paths[k] } else { 0.0 }
            });
            let pulled = a.dot(&w);
            for k in 0..n {
                dependency[k] += pulled[k] * layers[d - 1][k] * paths[k];
            }
        }
        acc += &dependency;
    }

    let scale = 2.0 / (((n - 1) * (n - 2)) as f64);
    Ok(acc.mapv(|b| (b - n as f64) * scale))
}

/// Eigenvector centrality from the dominant (largest real part) eigenvalue.
pub fn eigenvector_centrality(adj: ArrayView2<f64>) -> NetworkResult<Array1<f64>> {
    let n = validate_adjacency(adj)?;
    if adj.iter().all(|&v| v == 0.0) {
        return Ok(Array1::from_elem(n, 1.0 / n as f64));
    }
    let a = DMatrix::<f64>::from_fn(n, n, |i, j| adj[[i, j]]);

    let schur = Schur::try_new(a.clone(), EIGEN_EPS, SCHUR_MAX_ITER)
        .ok_or(NetworkError::EigenDecompositionFailed)?;
    let lambda = schur
        .complex_eigenvalues()
        .iter()
        .map(|z| z.re)
        .fold(f64::NEG_INFINITY, f64::max);
    if !lambda.is_finite() {
        return Err(NetworkError::EigenDecompositionFailed);
    }

    let shifted = a - DMatrix::<f64>::identity(n, n) * lambda;
    let svd = shifted
        .try_svd(false, true, EIGEN_EPS, SVD_MAX_ITER)
        .ok_or(NetworkError::EigenDecompositionFailed)?;
    let v_t = svd.v_t.ok_or(NetworkError::EigenDecompositionFailed)?;
    let (null_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, &s)| if s < best.1 { (i, s) } else { best });

    let magnitude = Array1::from_shape_fn(n, |k| v_t[(null_idx, k)].abs());
    let total = magnitude.sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(NetworkError::EigenDecompositionFailed);
    }
    Ok(magnitude / total)
}

/// Katz centrality with damping [`KATZ_ALPHA`].
pub fn katz_centrality(adj: ArrayView2<f64>) -> NetworkResult<Array1<f64>> {
    let n = validate_adjacency(adj)?;
    let system = DMatrix::<f64>::from_fn(n, n, |i, j| {
        let identity = if i == j { 1.0 } else { 0.0 };
        identity - KATZ_ALPHA * adj[[i, j]]
    });
    solve_sign_normalized(system, DVector::<f64>::from_element(n, 1.0))
}

fn solve_sign_normalized(system: DMatrix<f64>, rhs: DVector<f64>) -> NetworkResult<Array1<f64>> {
    let x = system.lu().solve(&rhs).ok_or(NetworkError::SingularKatzSystem)?;
    let norm = x.norm();
    if !(norm.is_finite() && norm > 0.0) {
        return Err(NetworkError::SingularKatzSystem);
    }
    let scale = x.sum().signum() * norm;
    Ok(Array1::from_iter(x.iter().map(|v| v / scale)))
}

/// Local clustering coefficient over out-neighborhoods.
pub fn clustering_coefficients(adj: ArrayView2<f64>) -> NetworkResult<Array1<f64>> {
    let n = validate_adjacency(adj)?;
    let coeff = if is_symmetric(adj) { 2.0 } else { 1.0 };
    let mut clustering = Array1::<f64>::zeros(n);

    for i in 0..n {
        let neighbors: Vec<usize> = (0..n).filter(|&j| adj[[i, j]] != 0.0).collect();
        let degree = neighbors.len();
        if degree < 2 {
            continue;
        }
        let sub = Array2::from_shape_fn((degree, degree), |(r, c)| adj[[neighbors[r], neighbors[c]]]);
        let sum = sub.sum();
        let edges = if is_symmetric(sub.view()) {
            let trace = sub.diag().sum();
            if trace == 0.0 { sum / 2.0 } else { (sum - trace) / 2.0 + trace }
        } else {
            sum
        };
        clustering[i] = coeff * edges / (degree * (degree - 1)) as f64;
    }
    Ok(clustering)
}

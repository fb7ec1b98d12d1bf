//! Per-axis linear system assembly.
//!
//! The unknowns of one axis are the coordinates of the movable cells followed
//! by the star centers. Each spring between two unknowns adds a graph
//! Laplacian stamp; a spring to a fixed cell adds to the diagonal and moves
//! the fixed coordinate into the right-hand side, so fixed cells never get a
//! row. The matrix is identical for both axes, only `b` differs, so it is
//! assembled once per run. Per-pass springs (centroid anchors, soft boundary
//! pull-back) are added to a copy of the diagonal.

use crate::geometry::Axis;
use crate::ids::CellId;
use crate::netlist::Netlist;
use crate::placement::net_model::{Endpoint, QuadraticModel};
use mplace_common::ArenaId;
use petgraph::unionfind::UnionFind;
use rayon::prelude::*;

/// Row count from which matrix-vector products run row-parallel.
const PARALLEL_ROWS: usize = 4096;

/// A square sparse matrix in compressed-row form.
///
/// Every row stores its diagonal entry, even when it is zero, so springs can
/// be added in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    dim: usize,
    row_ptr: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
    diag: Vec<usize>,
}

impl SparseMatrix {
    /// Builds a `dim × dim` matrix, summing duplicate `(row, col, value)` entries.
    pub fn from_triplets(
        dim: usize,
        triplets: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Self {
        let mut rows: Vec<Vec<(usize, f64)>> = (0..dim).map(|i| vec![(i, 0.0)]).collect();
        for (r, c, v) in triplets {
            rows[r].push((c, v));
        }

        let mut row_ptr = Vec::with_capacity(dim + 1);
        let mut cols = Vec::new();
        let mut values = Vec::new();
        let mut diag = Vec::with_capacity(dim);
        row_ptr.push(0);
        for (i, mut row) in rows.into_iter().enumerate() {
            row.sort_by_key(|&(c, _)| c);
            for (c, v) in row {
                if cols.len() > *row_ptr.last().unwrap_or(&0) && cols.last() == Some(&c) {
                    if let Some(last) = values.last_mut() {
                        *last += v;
                    }
                    continue;
                }
                if c == i {
                    diag.push(cols.len());
                }
                cols.push(c);
                values.push(v);
            }
            row_ptr.push(cols.len());
        }

        Self {
            dim,
            row_ptr,
            cols,
            values,
            diag,
        }
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Returns entry `(row, col)`, zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        match self.cols[span.clone()].binary_search(&col) {
            Ok(k) => self.values[span.start + k],
            Err(_) => 0.0,
        }
    }

    /// Returns the diagonal entry of `row`.
    pub fn diagonal(&self, row: usize) -> f64 {
        self.values[self.diag[row]]
    }

    /// Adds `value` to the diagonal entry of `row`.
    pub fn add_to_diagonal(&mut self, row: usize, value: f64) {
        self.values[self.diag[row]] += value;
    }

    /// Iterates over the stored `(col, value)` entries of `row`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        self.cols[span.clone()]
            .iter()
            .copied()
            .zip(self.values[span].iter().copied())
    }

    fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        self.row(row).map(|(c, v)| v * x[c]).sum()
    }

    /// Computes `out = A · x`.
    pub fn mul_vec(&self, x: &[f64], out: &mut [f64]) {
        if self.dim >= PARALLEL_ROWS {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, o)| *o = self.row_dot(i, x));
        } else {
            for (i, o) in out.iter_mut().enumerate() {
                *o = self.row_dot(i, x);
            }
        }
    }
}

/// Mapping between netlist entities and linear-system unknowns.
#[derive(Debug, Clone)]
pub struct VarMap {
    cell_var: Vec<Option<usize>>,
    var_cell: Vec<CellId>,
    star_count: usize,
}

impl VarMap {
    /// Numbers movable cells in ID order, then `star_count` star centers.
    pub fn new(netlist: &Netlist, star_count: usize) -> Self {
        let mut cell_var = vec![None; netlist.cell_count()];
        let mut var_cell = Vec::new();
        for cell in netlist.movable_cells() {
            cell_var[cell.index()] = Some(var_cell.len());
            var_cell.push(cell);
        }
        Self {
            cell_var,
            var_cell,
            star_count,
        }
    }

    /// Total number of unknowns per axis.
    pub fn len(&self) -> usize {
        self.var_cell.len() + self.star_count
    }

    /// Returns `true` if there are no unknowns.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of movable-cell unknowns; these come first.
    pub fn cell_vars(&self) -> usize {
        self.var_cell.len()
    }

    /// The unknown of a movable cell, `None` for fixed cells.
    pub fn cell_var(&self, cell: CellId) -> Option<usize> {
        self.cell_var.get(cell.index()).copied().flatten()
    }

    /// The cell behind unknown `var`, `None` for star centers.
    pub fn var_cell(&self, var: usize) -> Option<CellId> {
        self.var_cell.get(var).copied()
    }

    /// The unknown of star center `star`.
    pub fn star_var(&self, star: usize) -> usize {
        self.var_cell.len() + star
    }

    /// The unknown behind an endpoint, `None` if it is a fixed cell.
    pub fn endpoint_var(&self, endpoint: &Endpoint) -> Option<usize> {
        match *endpoint {
            Endpoint::Cell { cell, .. } => self.cell_var(cell),
            Endpoint::Star(star) => Some(self.star_var(star)),
        }
    }
}

/// A diagonal spring pulling unknown `var` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// The unknown being pulled.
    pub var: usize,
    /// Spring weight.
    pub weight: f64,
    /// Rest position.
    pub target: f64,
}

/// A connected group of unknowns.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Member unknowns in ascending order.
    pub vars: Vec<usize>,
    /// `true` if some spring ties the group to a fixed cell.
    pub anchored: bool,
}

impl Component {
    /// Returns `true` if the group is a single unknown with no springs at all.
    pub fn is_isolated(&self) -> bool {
        self.vars.len() == 1 && !self.anchored
    }
}

/// `A · p = b` for one axis.
#[derive(Debug, Clone)]
pub struct AxisSystem {
    /// Symmetric positive (semi-)definite system matrix.
    pub matrix: SparseMatrix,
    /// Right-hand side.
    pub rhs: Vec<f64>,
}

/// Holds the run-invariant part of both axis systems.
#[derive(Debug, Clone)]
pub struct SystemBuilder {
    vars: VarMap,
    base: SparseMatrix,
    rhs: [Vec<f64>; 2],
    components: Vec<Component>,
}

fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
    }
}

impl SystemBuilder {
    /// Stamps every spring of `model` into the Laplacian and both right-hand
    /// sides, and groups the unknowns into connected components.
    pub fn new(netlist: &Netlist, model: &QuadraticModel) -> Self {
        let vars = VarMap::new(netlist, model.stars.len());
        let n = vars.len();
        let mut triplets = Vec::with_capacity(model.edges.len() * 4);
        let mut rhs = [vec![0.0; n], vec![0.0; n]];
        let mut union = UnionFind::<usize>::new(n.max(1));
        let mut touches_fixed = vec![false; n];

        let offset_of = |e: &Endpoint, axis: Axis| match *e {
            Endpoint::Cell { offset, .. } => offset.along(axis),
            Endpoint::Star(_) => 0.0,
        };
        let fixed_of = |e: &Endpoint, axis: Axis| match *e {
            Endpoint::Cell { cell, offset } => netlist
                .cell(cell)
                .fixed_at
                .map(|at| at.along(axis) + offset.along(axis)),
            Endpoint::Star(_) => None,
        };

        for edge in &model.edges {
            let w = edge.weight;
            match (vars.endpoint_var(&edge.a), vars.endpoint_var(&edge.b)) {
                (Some(i), Some(j)) if i == j => {}
                (Some(i), Some(j)) => {
                    triplets.extend([(i, i, w), (j, j, w), (i, j, -w), (j, i, -w)]);
                    for axis in Axis::ALL {
                        let (oi, oj) = (offset_of(&edge.a, axis), offset_of(&edge.b, axis));
                        rhs[axis_slot(axis)][i] += w * (oj - oi);
                        rhs[axis_slot(axis)][j] += w * (oi - oj);
                    }
                    union.union(i, j);
                }
                (Some(i), None) | (None, Some(i)) => {
                    let (free, fixed) = if vars.endpoint_var(&edge.a).is_some() {
                        (&edge.a, &edge.b)
                    } else {
                        (&edge.b, &edge.a)
                    };
                    triplets.push((i, i, w));
                    for axis in Axis::ALL {
                        let target = fixed_of(fixed, axis).unwrap_or(0.0);
                        rhs[axis_slot(axis)][i] += w * (target - offset_of(free, axis));
                    }
                    touches_fixed[i] = true;
                }
                (None, None) => {}
            }
        }

        let base = SparseMatrix::from_triplets(n, triplets);
        let components = group_components(n, &union, &touches_fixed);
        Self {
            vars,
            base,
            rhs,
            components,
        }
    }

    /// The unknown numbering.
    pub fn vars(&self) -> &VarMap {
        &self.vars
    }

    /// The spring Laplacian without any per-pass springs.
    pub fn base_matrix(&self) -> &SparseMatrix {
        &self.base
    }

    /// All connected components of unknowns, ordered by their smallest member.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Components with no spring to a fixed cell.
    pub fn floating_components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| !c.anchored)
    }

    /// Index into [`components`](Self::components) of the group holding `var`.
    pub fn component_of(&self, var: usize) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.vars.binary_search(&var).is_ok())
    }

    /// Assembles the system for `axis` with extra diagonal `springs`.
    pub fn assemble(&self, axis: Axis, springs: &[Spring]) -> AxisSystem {
        let mut matrix = self.base.clone();
        let mut rhs = self.rhs[axis_slot(axis)].clone();
        for spring in springs {
            matrix.add_to_diagonal(spring.var, spring.weight);
            rhs[spring.var] += spring.weight * spring.target;
        }
        AxisSystem { matrix, rhs }
    }
}

fn group_components(n: usize, union: &UnionFind<usize>, touches_fixed: &[bool]) -> Vec<Component> {
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Component> = Vec::new();
    for var in 0..n {
        let root = union.find(var);
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            components.push(Component {
                vars: Vec::new(),
                anchored: false,
            });
            components.len() - 1
        });
        components[slot].vars.push(var);
        components[slot].anchored |= touches_fixed[var];
    }
    components
}

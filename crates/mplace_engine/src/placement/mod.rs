//! Iterative quadratic global placement.
//!
//! A run starts from a seeded random scatter of the movable cells, then
//! repeatedly minimizes the quadratic wirelength of the netlist, one linear
//! system per axis, until cell movement between passes falls below a
//! threshold or the pass budget runs out. An optional spreading step evens
//! out the clustered result at the end.

mod boundary;
mod controller;
mod cost;
pub(crate) mod net_model;
mod random;
mod solver;
mod spreading;
pub(crate) mod system;

use crate::geometry::{CoreRegion, Point};
use crate::ids::{CellId, PinId};
use crate::netlist::Netlist;
use crate::snapshot::SnapshotSink;
use crate::PlaceError;
use mplace_common::ArenaId;
use mplace_config::PlacementConfig;
use serde::{Deserialize, Serialize};

pub use boundary::BoundaryHandler;
pub use controller::{PassRecord, PlacementOutcome, Placer, PlacerState};
pub use cost::{net_hpwl, net_quadratic, quadratic_objective, total_hpwl};
pub use net_model::{translate, Edge, Endpoint, QuadraticModel, StarNode};
pub use solver::{ConjugateGradient, SolveError, SolveStats};
pub use spreading::{RankSpreader, Spreader};
pub use system::{AxisSystem, Component, SparseMatrix, Spring, SystemBuilder, VarMap};

/// Lower-left corner of every cell, indexed by cell ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    positions: Vec<Point>,
}

impl Placement {
    /// Places fixed cells at their locations and movable cells at the origin.
    pub fn from_netlist(netlist: &Netlist) -> Self {
        let positions = netlist
            .cells
            .iter()
            .map(|(_, c)| c.fixed_at.unwrap_or(Point::ZERO))
            .collect();
        Self { positions }
    }

    /// Returns the position of `cell`.
    pub fn get(&self, cell: CellId) -> Point {
        self.positions[cell.index()]
    }

    /// Sets the position of `cell`.
    pub fn set(&mut self, cell: CellId, at: Point) {
        self.positions[cell.index()] = at;
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the placement holds no cells.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates over `(cell, position)` in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, Point)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &p)| (CellId::from_raw(i as u32), p))
    }

    /// Absolute position of `pin`: its cell's corner plus the pin offset.
    pub fn pin_position(&self, netlist: &Netlist, pin: PinId) -> Point {
        let pin = netlist.pin(pin);
        let at = self.get(pin.cell);
        Point::new(at.x + pin.offset.x, at.y + pin.offset.y)
    }

    /// Largest Euclidean move of any movable cell between `self` and `other`.
    pub fn max_displacement(&self, netlist: &Netlist, other: &Placement) -> f64 {
        netlist
            .movable_cells()
            .map(|c| self.get(c).distance(other.get(c)))
            .fold(0.0, f64::max)
    }
}

/// Runs a complete placement with default spreading behavior.
///
/// Validates the inputs, drives a [`Placer`] to a terminal state, and
/// returns the outcome. Snapshots go to `snapshots` as they are taken.
pub fn place(
    netlist: &Netlist,
    core: CoreRegion,
    config: PlacementConfig,
    snapshots: &mut dyn SnapshotSink,
) -> Result<PlacementOutcome, PlaceError> {
    let mut placer = Placer::new(netlist, core, config)?;
    placer.run(snapshots)
}

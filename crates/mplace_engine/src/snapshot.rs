//! Point-in-time placement records handed to the reporting boundary.

use crate::geometry::CoreRegion;
use crate::ids::CellId;
use crate::placement::Placement;
use mplace_common::ContentHash;
use serde::{Deserialize, Serialize};

/// Which phase of a run produced a snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStage {
    /// The seeded random scatter, before any solve.
    Initial,
    /// After a quadratic pass.
    Quadratic,
    /// After the post-convergence spreading step.
    Spread,
}

/// One cell's lower-left corner.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct CellPosition {
    /// The cell.
    pub cell: CellId,
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// An immutable copy of every cell position at one iteration.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Pass index; `0` is the initial placement.
    pub iteration: u32,
    /// Producing phase.
    pub stage: SnapshotStage,
    /// The core rectangle, unchanged across a run.
    pub core: CoreRegion,
    /// All cells, fixed ones included, in ID order.
    pub cells: Vec<CellPosition>,
}

impl Snapshot {
    pub(crate) fn capture(
        iteration: u32,
        stage: SnapshotStage,
        core: CoreRegion,
        placement: &Placement,
    ) -> Self {
        let cells = placement
            .iter()
            .map(|(cell, at)| CellPosition {
                cell,
                x: at.x,
                y: at.y,
            })
            .collect();
        Self {
            iteration,
            stage,
            core,
            cells,
        }
    }

    /// Hash of the iteration index, stage and every coordinate, bit for bit.
    pub fn fingerprint(&self) -> ContentHash {
        let stage = match self.stage {
            SnapshotStage::Initial => 0.0,
            SnapshotStage::Quadratic => 1.0,
            SnapshotStage::Spread => 2.0,
        };
        let header = [
            self.iteration as f64,
            stage,
            self.core.width,
            self.core.height,
        ];
        ContentHash::from_f64s(
            header
                .into_iter()
                .chain(self.cells.iter().flat_map(|c| [c.x, c.y])),
        )
    }

    /// Position of `cell`, if present.
    pub fn position(&self, cell: CellId) -> Option<&CellPosition> {
        self.cells.iter().find(|c| c.cell == cell)
    }
}

/// Receives snapshots as a run produces them.
pub trait SnapshotSink {
    /// Takes ownership of a new snapshot.
    fn record(&mut self, snapshot: Snapshot);
}

impl SnapshotSink for Vec<Snapshot> {
    fn record(&mut self, snapshot: Snapshot) {
        self.push(snapshot);
    }
}

/// Forwards each snapshot to a closure.
pub struct SnapshotCallback<F>(pub F);

impl<F: FnMut(Snapshot)> SnapshotSink for SnapshotCallback<F> {
    fn record(&mut self, snapshot: Snapshot) {
        (self.0)(snapshot)
    }
}

/// Drops every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSnapshots;

impl SnapshotSink for DiscardSnapshots {
    fn record(&mut self, _snapshot: Snapshot) {}
}

//! Post-convergence spreading.
//!
//! A pure quadratic objective pulls connected cells onto each other. A
//! spreader runs once after the controller reaches a terminal state and
//! redistributes the clustered cells across the core.

use crate::geometry::{Axis, CoreRegion};
use crate::ids::CellId;
use crate::netlist::Netlist;
use crate::placement::Placement;

/// A pluggable post-processing stage applied to the final placement.
pub trait Spreader: Send {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Moves movable cells of `placement`; fixed cells must stay put.
    fn spread(&self, netlist: &Netlist, core: &CoreRegion, placement: &mut Placement);
}

/// Rank-preserving spreader.
///
/// Per axis, movable cells are ranked by coordinate and each is pulled
/// toward an evenly spaced slot for its rank: the cell of rank `r` out of
/// `n` targets its center at `(r + 0.5) / n` of the core extent. The new
/// coordinate blends the old one with the target by `strength`, so relative
/// order along each axis is preserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSpreader {
    strength: f64,
}

impl RankSpreader {
    /// Creates a spreader; `strength` is in `(0, 1]`, 1 snapping onto the slots.
    pub fn new(strength: f64) -> Self {
        Self { strength }
    }
}

impl Spreader for RankSpreader {
    fn name(&self) -> &str {
        "rank"
    }

    fn spread(&self, netlist: &Netlist, core: &CoreRegion, placement: &mut Placement) {
        let cells: Vec<CellId> = netlist.movable_cells().collect();
        let n = cells.len();
        if n == 0 {
            return;
        }
        for axis in Axis::ALL {
            let mut order = cells.clone();
            order.sort_by(|a, b| {
                placement
                    .get(*a)
                    .along(axis)
                    .total_cmp(&placement.get(*b).along(axis))
                    .then(a.cmp(b))
            });
            let extent = core.extent(axis);
            for (rank, &cell) in order.iter().enumerate() {
                let c = netlist.cell(cell);
                let size = match axis {
                    Axis::X => c.width,
                    Axis::Y => c.height,
                };
                let slot = (rank as f64 + 0.5) / n as f64 * extent - size / 2.0;
                let target = slot.clamp(0.0, (extent - size).max(0.0));
                let mut at = placement.get(cell);
                let current = at.along(axis);
                let moved = (1.0 - self.strength) * current + self.strength * target;
                match axis {
                    Axis::X => at.x = moved,
                    Axis::Y => at.y = moved,
                }
                placement.set(cell, at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::netlist::Cell;

    fn clustered() -> (Netlist, Placement) {
        let mut nl = Netlist::new();
        nl.add_cell(Cell::fixed("pad", 1.0, 1.0, Point::new(0.0, 0.0)));
        for i in 0..4 {
            nl.add_cell(Cell::movable(format!("c{i}"), 1.0, 1.0));
        }
        let mut placement = Placement::from_netlist(&nl);
        for (i, cell) in nl.movable_cells().collect::<Vec<_>>().into_iter().enumerate() {
            placement.set(cell, Point::new(5.0 + 0.01 * i as f64, 5.0 - 0.01 * i as f64));
        }
        (nl, placement)
    }

    #[test]
    fn full_strength_snaps_to_slots() {
        let (nl, mut placement) = clustered();
        RankSpreader::new(1.0).spread(&nl, &CoreRegion::new(8.0, 8.0), &mut placement);
        let xs: Vec<f64> = nl.movable_cells().map(|c| placement.get(c).x).collect();
        assert_eq!(xs, vec![0.5, 2.5, 4.5, 6.5]);
        // y order is reversed
        let ys: Vec<f64> = nl.movable_cells().map(|c| placement.get(c).y).collect();
        assert_eq!(ys, vec![6.5, 4.5, 2.5, 0.5]);
    }

    #[test]
    fn partial_strength_blends() {
        let (nl, mut placement) = clustered();
        let first = nl.movable_cells().next().unwrap();
        RankSpreader::new(0.5).spread(&nl, &CoreRegion::new(8.0, 8.0), &mut placement);
        assert!((placement.get(first).x - (5.0 + 0.5) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_cells_untouched() {
        let (nl, mut placement) = clustered();
        RankSpreader::new(1.0).spread(&nl, &CoreRegion::new(8.0, 8.0), &mut placement);
        let pad = nl.cell_named("pad").unwrap();
        assert_eq!(placement.get(pad), Point::ZERO);
    }
}

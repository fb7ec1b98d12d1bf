//! Core-boundary enforcement.
//!
//! In hard mode every movable cell is clamped into the core after each pass.
//! In soft mode cells may drift outside; each cell found outside after a
//! pass gets a spring pulling it back to the violated edge on the next pass,
//! and only reported placements are clamped.

use crate::geometry::{Axis, CoreRegion, Point};
use crate::ids::CellId;
use crate::netlist::Netlist;
use crate::placement::system::{Spring, VarMap};
use crate::placement::Placement;
use mplace_config::{BoundaryConfig, BoundaryMode};

/// Applies the configured boundary mode.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryHandler {
    mode: BoundaryMode,
    soft_weight: f64,
    core: CoreRegion,
}

impl BoundaryHandler {
    /// Creates a handler for `core`.
    pub fn new(config: &BoundaryConfig, core: CoreRegion) -> Self {
        Self {
            mode: config.mode,
            soft_weight: config.soft_weight,
            core,
        }
    }

    fn upper(&self, netlist: &Netlist, cell: CellId, axis: Axis) -> f64 {
        let c = netlist.cell(cell);
        let size = match axis {
            Axis::X => c.width,
            Axis::Y => c.height,
        };
        (self.core.extent(axis) - size).max(0.0)
    }

    /// Returns `at` moved to the nearest lower-left position keeping `cell`
    /// inside the core.
    pub fn clamp_point(&self, netlist: &Netlist, cell: CellId, at: Point) -> Point {
        Point::new(
            at.x.clamp(0.0, self.upper(netlist, cell, Axis::X)),
            at.y.clamp(0.0, self.upper(netlist, cell, Axis::Y)),
        )
    }

    /// Clamps every movable cell into the core and returns how many moved.
    pub fn clamp(&self, netlist: &Netlist, placement: &mut Placement) -> usize {
        let mut moved = 0;
        for cell in netlist.movable_cells() {
            let at = placement.get(cell);
            let clamped = self.clamp_point(netlist, cell, at);
            if clamped != at {
                placement.set(cell, clamped);
                moved += 1;
            }
        }
        moved
    }

    /// Returns a clamped copy of `placement`.
    pub fn clamped(&self, netlist: &Netlist, placement: &Placement) -> Placement {
        let mut copy = placement.clone();
        self.clamp(netlist, &mut copy);
        copy
    }

    /// Post-pass step: clamps in hard mode, leaves cells alone in soft mode.
    pub fn enforce(&self, netlist: &Netlist, placement: &mut Placement) {
        if self.mode == BoundaryMode::Hard {
            let moved = self.clamp(netlist, placement);
            if moved > 0 {
                log::trace!("clamped {moved} cells into the core");
            }
        }
    }

    /// Pull-back springs for cells currently outside the core on `axis`.
    ///
    /// Always empty in hard mode.
    pub fn soft_springs(
        &self,
        netlist: &Netlist,
        vars: &VarMap,
        placement: &Placement,
        axis: Axis,
    ) -> Vec<Spring> {
        if self.mode != BoundaryMode::Soft {
            return Vec::new();
        }
        let mut springs = Vec::new();
        for cell in netlist.movable_cells() {
            let Some(var) = vars.cell_var(cell) else {
                continue;
            };
            let pos = placement.get(cell).along(axis);
            let upper = self.upper(netlist, cell, axis);
            let target = if pos < 0.0 {
                0.0
            } else if pos > upper {
                upper
            } else {
                continue;
            };
            springs.push(Spring {
                var,
                weight: self.soft_weight,
                target,
            });
        }
        springs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Cell;

    fn setup() -> (Netlist, CellId, CellId) {
        let mut nl = Netlist::new();
        let pad = nl.add_cell(Cell::fixed("pad", 1.0, 1.0, Point::new(20.0, -3.0)));
        let a = nl.add_cell(Cell::movable("a", 2.0, 1.0));
        (nl, pad, a)
    }

    fn handler(mode: BoundaryMode) -> BoundaryHandler {
        let config = BoundaryConfig {
            mode,
            soft_weight: 5.0,
        };
        BoundaryHandler::new(&config, CoreRegion::new(10.0, 10.0))
    }

    #[test]
    fn hard_mode_clamps_movable_only() {
        let (nl, pad, a) = setup();
        let mut placement = Placement::from_netlist(&nl);
        placement.set(a, Point::new(9.5, -1.0));
        handler(BoundaryMode::Hard).enforce(&nl, &mut placement);
        assert_eq!(placement.get(a), Point::new(8.0, 0.0));
        assert_eq!(placement.get(pad), Point::new(20.0, -3.0));
    }

    #[test]
    fn soft_mode_leaves_cells_and_emits_springs() {
        let (nl, _, a) = setup();
        let vars = VarMap::new(&nl, 0);
        let mut placement = Placement::from_netlist(&nl);
        placement.set(a, Point::new(9.5, 4.0));
        let h = handler(BoundaryMode::Soft);
        h.enforce(&nl, &mut placement);
        assert_eq!(placement.get(a), Point::new(9.5, 4.0));

        let sx = h.soft_springs(&nl, &vars, &placement, Axis::X);
        assert_eq!(
            sx,
            vec![Spring {
                var: 0,
                weight: 5.0,
                target: 8.0
            }]
        );
        assert!(h.soft_springs(&nl, &vars, &placement, Axis::Y).is_empty());
        assert_eq!(h.clamped(&nl, &placement).get(a), Point::new(8.0, 4.0));
    }

    #[test]
    fn hard_mode_has_no_springs() {
        let (nl, _, a) = setup();
        let vars = VarMap::new(&nl, 0);
        let mut placement = Placement::from_netlist(&nl);
        placement.set(a, Point::new(-4.0, 0.0));
        assert!(handler(BoundaryMode::Hard)
            .soft_springs(&nl, &vars, &placement, Axis::X)
            .is_empty());
    }
}

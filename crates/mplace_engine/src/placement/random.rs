//! Seeded random initial placement.
//!
//! Scatters each movable cell uniformly over the positions where it fits
//! inside the core. Fixed cells keep their locations. The draw order is cell
//! ID order, x before y, so equal seeds give equal placements.

use crate::geometry::{CoreRegion, Point};
use crate::netlist::Netlist;
use crate::placement::Placement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds the initial placement for a run with the given seed.
pub(crate) fn random_placement(netlist: &Netlist, core: &CoreRegion, seed: u64) -> Placement {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut placement = Placement::from_netlist(netlist);

    for cell_id in netlist.movable_cells() {
        let cell = netlist.cell(cell_id);
        let max_x = (core.width - cell.width).max(0.0);
        let max_y = (core.height - cell.height).max(0.0);
        let x = rng.gen_range(0.0..=max_x);
        let y = rng.gen_range(0.0..=max_y);
        placement.set(cell_id, Point::new(x, y));
    }

    placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Cell;

    fn netlist() -> Netlist {
        let mut nl = Netlist::new();
        nl.add_cell(Cell::fixed("pad", 1.0, 1.0, Point::new(9.0, 9.0)));
        for i in 0..20 {
            nl.add_cell(Cell::movable(format!("c{i}"), 2.0, 1.0));
        }
        nl.add_cell(Cell::movable("full_width", 10.0, 1.0));
        nl
    }

    #[test]
    fn cells_fit_inside_core() {
        let nl = netlist();
        let core = CoreRegion::new(10.0, 10.0);
        let placement = random_placement(&nl, &core, 7);
        for cell_id in nl.movable_cells() {
            let cell = nl.cell(cell_id);
            let p = placement.get(cell_id);
            assert!(p.x >= 0.0 && p.x + cell.width <= core.width);
            assert!(p.y >= 0.0 && p.y + cell.height <= core.height);
        }
    }

    #[test]
    fn fixed_cells_untouched() {
        let nl = netlist();
        let placement = random_placement(&nl, &CoreRegion::new(10.0, 10.0), 7);
        let pad = nl.cell_named("pad").unwrap();
        assert_eq!(placement.get(pad), Point::new(9.0, 9.0));
    }

    #[test]
    fn same_seed_same_placement() {
        let nl = netlist();
        let core = CoreRegion::new(10.0, 10.0);
        assert_eq!(random_placement(&nl, &core, 42), random_placement(&nl, &core, 42));
        assert_ne!(random_placement(&nl, &core, 42), random_placement(&nl, &core, 43));
    }

    #[test]
    fn full_width_cell_pinned_to_left_edge() {
        let nl = netlist();
        let placement = random_placement(&nl, &CoreRegion::new(10.0, 10.0), 1);
        let wide = nl.cell_named("full_width").unwrap();
        assert_eq!(placement.get(wide).x, 0.0);
    }
}

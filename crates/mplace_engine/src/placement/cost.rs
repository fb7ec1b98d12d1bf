//! Placement quality metrics.
//!
//! The quadratic objective is what the solver minimizes. It is evaluated per
//! net as `w·n/(n−1)·Σ(p − mean)²` per axis, which equals the clique form
//! `w/(n−1)·Σ_{i<j}(p_i − p_j)²` and does not depend on whether a net was
//! decomposed as a clique or a star. Half-perimeter wirelength (HPWL) is the
//! conventional report metric.

use crate::geometry::{Axis, Point};
use crate::ids::NetId;
use crate::netlist::Netlist;
use crate::placement::Placement;

fn pin_positions(netlist: &Netlist, placement: &Placement, net: NetId) -> Vec<Point> {
    netlist
        .distinct_pins(net)
        .into_iter()
        .map(|p| placement.pin_position(netlist, p))
        .collect()
}

/// Quadratic wirelength of a single net; zero for nets under two pins.
pub fn net_quadratic(netlist: &Netlist, placement: &Placement, net: NetId) -> f64 {
    let points = pin_positions(netlist, placement, net);
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    let scale = netlist.net(net).weight * n as f64 / (n - 1) as f64;
    Axis::ALL
        .iter()
        .map(|&axis| {
            let mean = points.iter().map(|p| p.along(axis)).sum::<f64>() / n as f64;
            points
                .iter()
                .map(|p| (p.along(axis) - mean).powi(2))
                .sum::<f64>()
        })
        .sum::<f64>()
        * scale
}

/// Total quadratic objective over all nets.
pub fn quadratic_objective(netlist: &Netlist, placement: &Placement) -> f64 {
    netlist
        .nets
        .iter()
        .map(|(id, _)| net_quadratic(netlist, placement, id))
        .sum()
}

/// Half-perimeter of the bounding box of a net's pins.
pub fn net_hpwl(netlist: &Netlist, placement: &Placement, net: NetId) -> f64 {
    let points = pin_positions(netlist, placement, net);
    if points.len() < 2 {
        return 0.0;
    }
    Axis::ALL
        .iter()
        .map(|&axis| {
            let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.along(axis)), hi.max(p.along(axis)))
            });
            hi - lo
        })
        .sum()
}

/// Total weighted HPWL over all nets.
pub fn total_hpwl(netlist: &Netlist, placement: &Placement) -> f64 {
    netlist
        .nets
        .iter()
        .map(|(id, net)| net.weight * net_hpwl(netlist, placement, id))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Cell;

    fn three_pin() -> (Netlist, Placement, NetId) {
        let mut nl = Netlist::new();
        let mut pins = Vec::new();
        for (i, x) in [0.0, 1.0, 5.0].into_iter().enumerate() {
            let c = nl.add_cell(Cell::fixed(format!("c{i}"), 1.0, 1.0, Point::new(x, 2.0 * x)));
            pins.push(nl.add_pin(c, "A", Point::ZERO));
        }
        let net = nl.add_net("n", pins, 2.0);
        let placement = Placement::from_netlist(&nl);
        (nl, placement, net)
    }

    #[test]
    fn quadratic_matches_clique_form() {
        let (nl, placement, net) = three_pin();
        let xs = [0.0_f64, 1.0, 5.0];
        let mut clique = 0.0;
        for i in 0..3 {
            for j in i + 1..3 {
                let dx = xs[i] - xs[j];
                clique += dx * dx + (2.0 * dx) * (2.0 * dx);
            }
        }
        clique *= 2.0 / 2.0;
        assert!((net_quadratic(&nl, &placement, net) - clique).abs() < 1e-9);
        assert!((quadratic_objective(&nl, &placement) - clique).abs() < 1e-9);
    }

    #[test]
    fn hpwl_is_bounding_box_half_perimeter() {
        let (nl, placement, net) = three_pin();
        assert_eq!(net_hpwl(&nl, &placement, net), 5.0 + 10.0);
        assert_eq!(total_hpwl(&nl, &placement), 2.0 * 15.0);
    }

    #[test]
    fn pin_offsets_count() {
        let mut nl = Netlist::new();
        let a = nl.add_cell(Cell::fixed("a", 2.0, 1.0, Point::new(0.0, 0.0)));
        let b = nl.add_cell(Cell::fixed("b", 2.0, 1.0, Point::new(4.0, 0.0)));
        let pa = nl.add_pin(a, "Y", Point::new(2.0, 0.5));
        let pb = nl.add_pin(b, "A", Point::new(0.0, 0.5));
        nl.add_net("n", vec![pa, pb], 1.0);
        let placement = Placement::from_netlist(&nl);
        assert_eq!(total_hpwl(&nl, &placement), 2.0);
        assert_eq!(quadratic_objective(&nl, &placement), 4.0);
    }

    #[test]
    fn single_pin_net_costs_nothing() {
        let mut nl = Netlist::new();
        let a = nl.add_cell(Cell::movable("a", 1.0, 1.0));
        let p = nl.add_pin(a, "A", Point::ZERO);
        let net = nl.add_net("lonely", vec![p], 1.0);
        let placement = Placement::from_netlist(&nl);
        assert_eq!(net_quadratic(&nl, &placement, net), 0.0);
        assert_eq!(net_hpwl(&nl, &placement, net), 0.0);
    }
}

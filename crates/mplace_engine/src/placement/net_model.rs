//! Net-to-quadratic translation.
//!
//! Replaces every net by weighted pairwise springs whose summed squared
//! length approximates the net's squared wirelength. Two-pin nets become a
//! single spring. Wider nets become a clique (`n(n-1)/2` springs of weight
//! `w/(n-1)`) or a star through a synthetic center (`n` springs of weight
//! `w·n/(n-1)`). Both decompositions have the same optimum: eliminating the
//! star center reproduces the clique exactly.
//!
//! Springs connect cell endpoints, never pins. The pin offset rides along on
//! the endpoint as a constant so the matrix structure only depends on which
//! cells are connected.

use crate::codes;
use crate::geometry::Point;
use crate::ids::{CellId, NetId};
use crate::netlist::Netlist;
use mplace_config::{NetModel, RunConfig};
use mplace_diagnostics::{Diagnostic, DiagnosticSink};

/// One end of a quadratic spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// A pin on a cell: the cell plus the pin's offset from the cell origin.
    Cell {
        /// The owning cell.
        cell: CellId,
        /// Pin offset from the cell's lower-left corner.
        offset: Point,
    },
    /// The synthetic center of a star-decomposed net.
    Star(usize),
}

/// A weighted pairwise quadratic term `w · |a − b|²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// First endpoint.
    pub a: Endpoint,
    /// Second endpoint.
    pub b: Endpoint,
    /// Strictly positive spring weight.
    pub weight: f64,
}

/// A synthetic star center and the pins it joins.
#[derive(Debug, Clone, PartialEq)]
pub struct StarNode {
    /// The net this star replaces.
    pub net: NetId,
    /// Member pins as `(cell, offset)`.
    pub members: Vec<(CellId, Point)>,
}

/// The pairwise decomposition of a whole netlist.
#[derive(Debug, Clone, Default)]
pub struct QuadraticModel {
    /// All springs.
    pub edges: Vec<Edge>,
    /// Star centers, indexed by [`Endpoint::Star`].
    pub stars: Vec<StarNode>,
    /// Nets skipped as malformed (fewer than two distinct pins).
    pub skipped: Vec<NetId>,
}

/// Decides whether a net of `pin_count` distinct pins is decomposed as a star.
fn uses_star(run: &RunConfig, pin_count: usize) -> bool {
    if pin_count <= 2 {
        return false;
    }
    match run.net_model {
        NetModel::Star => true,
        NetModel::Clique => run.star_threshold > 0 && pin_count > run.star_threshold as usize,
    }
}

/// Translates every net of `netlist` into quadratic springs.
///
/// Nets with fewer than two distinct pins are skipped with a
/// [`MALFORMED_NET`](codes::MALFORMED_NET) warning. Springs that only touch
/// fixed cells, or join two pins of the same cell, are constant and dropped.
pub fn translate(netlist: &Netlist, run: &RunConfig, sink: &DiagnosticSink) -> QuadraticModel {
    let mut model = QuadraticModel::default();

    for (net_id, net) in netlist.nets.iter() {
        let pins = netlist.distinct_pins(net_id);
        if pins.len() < 2 {
            sink.emit(
                Diagnostic::new(
                    codes::MALFORMED_NET,
                    format!("net has {} distinct pin(s), skipped", pins.len()),
                )
                .with_subject(format!("net \"{}\"", net.name))
                .with_note("a net needs at least two distinct pins to contribute wirelength"),
            );
            model.skipped.push(net_id);
            continue;
        }

        let members: Vec<(CellId, Point)> = pins
            .iter()
            .map(|&p| {
                let pin = netlist.pin(p);
                (pin.cell, pin.offset)
            })
            .collect();

        let any_movable = members
            .iter()
            .any(|(cell, _)| !netlist.cell(*cell).is_fixed());
        if !any_movable {
            continue;
        }

        let n = members.len();
        if uses_star(run, n) {
            let star = model.stars.len();
            let weight = net.weight * n as f64 / (n - 1) as f64;
            for &(cell, offset) in &members {
                model.edges.push(Edge {
                    a: Endpoint::Cell { cell, offset },
                    b: Endpoint::Star(star),
                    weight,
                });
            }
            model.stars.push(StarNode {
                net: net_id,
                members,
            });
        } else {
            let weight = net.weight / (n - 1) as f64;
            for (i, &(cell_a, offset_a)) in members.iter().enumerate() {
                for &(cell_b, offset_b) in &members[i + 1..] {
                    if cell_a == cell_b {
                        continue;
                    }
                    if netlist.cell(cell_a).is_fixed() && netlist.cell(cell_b).is_fixed() {
                        continue;
                    }
                    model.edges.push(Edge {
                        a: Endpoint::Cell {
                            cell: cell_a,
                            offset: offset_a,
                        },
                        b: Endpoint::Cell {
                            cell: cell_b,
                            offset: offset_b,
                        },
                        weight,
                    });
                }
            }
        }
    }

    log::debug!(
        "translated {} nets into {} springs ({} star centers, {} skipped)",
        netlist.net_count(),
        model.edges.len(),
        model.stars.len(),
        model.skipped.len()
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Cell;

    fn fanout_netlist(fanout: usize) -> Netlist {
        let mut nl = Netlist::new();
        let mut pins = Vec::new();
        for i in 0..fanout {
            let c = nl.add_cell(Cell::movable(format!("u{i}"), 1.0, 1.0));
            pins.push(nl.add_pin(c, "A", Point::new(0.5, 0.5)));
        }
        nl.add_net("clk", pins, 1.0);
        nl
    }

    fn run(model: NetModel, star_threshold: u32) -> RunConfig {
        RunConfig {
            net_model: model,
            star_threshold,
            ..RunConfig::default()
        }
    }

    #[test]
    fn two_pin_net_single_edge() {
        let nl = fanout_netlist(2);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &run(NetModel::Clique, 0), &sink);
        assert_eq!(model.edges.len(), 1);
        assert_eq!(model.edges[0].weight, 1.0);
        assert!(model.stars.is_empty());
    }

    #[test]
    fn two_pin_net_never_star() {
        let nl = fanout_netlist(2);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &run(NetModel::Star, 0), &sink);
        assert_eq!(model.edges.len(), 1);
        assert!(model.stars.is_empty());
    }

    #[test]
    fn clique_edge_count_and_weight() {
        let nl = fanout_netlist(5);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &run(NetModel::Clique, 0), &sink);
        assert_eq!(model.edges.len(), 10);
        assert!(model.edges.iter().all(|e| e.weight == 0.25));
    }

    #[test]
    fn star_edge_count_and_weight() {
        let nl = fanout_netlist(5);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &run(NetModel::Star, 0), &sink);
        assert_eq!(model.edges.len(), 5);
        assert_eq!(model.stars.len(), 1);
        assert_eq!(model.stars[0].members.len(), 5);
        assert!(model.edges.iter().all(|e| e.weight == 1.25));
        assert!(model
            .edges
            .iter()
            .all(|e| matches!(e.b, Endpoint::Star(0))));
    }

    #[test]
    fn star_threshold_switches_wide_nets() {
        let nl = fanout_netlist(6);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &run(NetModel::Clique, 5), &sink);
        assert_eq!(model.stars.len(), 1);
        let model = translate(&nl, &run(NetModel::Clique, 6), &sink);
        assert!(model.stars.is_empty());
        assert_eq!(model.edges.len(), 15);
    }

    #[test]
    fn single_pin_net_skipped_with_warning() {
        let mut nl = Netlist::new();
        let c = nl.add_cell(Cell::movable("u0", 1.0, 1.0));
        let p = nl.add_pin(c, "A", Point::ZERO);
        nl.add_net("rst", vec![p, p], 1.0);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &RunConfig::default(), &sink);
        assert!(model.edges.is_empty());
        assert_eq!(model.skipped, vec![NetId::from_raw(0)]);
        assert!(sink.contains_code(codes::MALFORMED_NET));
        assert!(!sink.has_errors());
    }

    #[test]
    fn fixed_pairs_and_same_cell_pairs_dropped() {
        let mut nl = Netlist::new();
        let f0 = nl.add_cell(Cell::fixed("p0", 1.0, 1.0, Point::ZERO));
        let f1 = nl.add_cell(Cell::fixed("p1", 1.0, 1.0, Point::new(5.0, 5.0)));
        let m = nl.add_cell(Cell::movable("m", 2.0, 1.0));
        let pins = vec![
            nl.add_pin(f0, "P", Point::ZERO),
            nl.add_pin(f1, "P", Point::ZERO),
            nl.add_pin(m, "A", Point::ZERO),
            nl.add_pin(m, "B", Point::new(2.0, 0.0)),
        ];
        nl.add_net("n", pins, 3.0);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &RunConfig::default(), &sink);
        // 6 pairs minus (p0,p1) minus (m/A,m/B)
        assert_eq!(model.edges.len(), 4);
        assert!(model.edges.iter().all(|e| e.weight == 1.0));
    }

    #[test]
    fn all_fixed_net_contributes_nothing() {
        let mut nl = Netlist::new();
        let f0 = nl.add_cell(Cell::fixed("p0", 1.0, 1.0, Point::ZERO));
        let f1 = nl.add_cell(Cell::fixed("p1", 1.0, 1.0, Point::new(5.0, 5.0)));
        let f2 = nl.add_cell(Cell::fixed("p2", 1.0, 1.0, Point::new(1.0, 5.0)));
        let pins = vec![
            nl.add_pin(f0, "P", Point::ZERO),
            nl.add_pin(f1, "P", Point::ZERO),
            nl.add_pin(f2, "P", Point::ZERO),
        ];
        nl.add_net("rail", pins, 1.0);
        let sink = DiagnosticSink::new();
        let model = translate(&nl, &run(NetModel::Star, 0), &sink);
        assert!(model.edges.is_empty());
        assert!(model.stars.is_empty());
        assert!(model.skipped.is_empty());
    }
}

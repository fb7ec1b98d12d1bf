//! Name-based netlist description, deserializable from JSON or TOML.
//!
//! A [`NetlistDesc`] is what an external loader produces. Nets reference pins
//! as `"cell/pin"`; a bare `"cell"` reference attaches a fresh pin at the
//! cell center, which is convenient for netlists without pin geometry.

use crate::error::PlaceError;
use crate::geometry::Point;
use crate::ids::PinId;
use crate::netlist::{Cell, Netlist};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete netlist description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetlistDesc {
    /// Cell instances.
    #[serde(default)]
    pub cells: Vec<CellDesc>,
    /// Nets over cell pins.
    #[serde(default)]
    pub nets: Vec<NetDesc>,
}

/// One cell instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDesc {
    /// Unique instance name.
    pub name: String,
    /// Width of the cell.
    pub width: f64,
    /// Height of the cell.
    pub height: f64,
    /// Lower-left corner if the cell is fixed.
    #[serde(default)]
    pub fixed: Option<Point>,
    /// Named pins on the cell.
    #[serde(default)]
    pub pins: Vec<PinDesc>,
}

/// A pin on a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinDesc {
    /// Pin name, unique within the cell.
    pub name: String,
    /// Offset from the cell's lower-left corner.
    #[serde(default)]
    pub offset: Point,
}

/// A net over pin references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetDesc {
    /// Net name.
    pub name: String,
    /// Pin references, `"cell/pin"` or `"cell"`.
    pub pins: Vec<String>,
    /// Net weight; defaults to 1.0.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Netlist {
    /// Builds an indexed netlist from a name-based description.
    ///
    /// Fails with [`PlaceError::InvalidNetlist`] on unknown cell or pin
    /// references and duplicate pin names. Numeric checks are left to
    /// [`Netlist::validate`].
    pub fn from_desc(desc: &NetlistDesc) -> Result<Netlist, PlaceError> {
        let mut netlist = Netlist::new();
        let mut pin_by_path: HashMap<(String, String), PinId> = HashMap::new();

        for cell_desc in &desc.cells {
            let cell = match cell_desc.fixed {
                Some(at) => Cell::fixed(&cell_desc.name, cell_desc.width, cell_desc.height, at),
                None => Cell::movable(&cell_desc.name, cell_desc.width, cell_desc.height),
            };
            let cell_id = netlist.add_cell(cell);
            for pin in &cell_desc.pins {
                let key = (cell_desc.name.clone(), pin.name.clone());
                if pin_by_path.contains_key(&key) {
                    return Err(PlaceError::InvalidNetlist(format!(
                        "duplicate pin \"{}/{}\"",
                        cell_desc.name, pin.name
                    )));
                }
                let pin_id = netlist.add_pin(cell_id, &pin.name, pin.offset);
                pin_by_path.insert(key, pin_id);
            }
        }

        for net_desc in &desc.nets {
            let mut pins = Vec::with_capacity(net_desc.pins.len());
            for reference in &net_desc.pins {
                let pin = match reference.split_once('/') {
                    Some((cell, pin)) => pin_by_path
                        .get(&(cell.to_string(), pin.to_string()))
                        .copied()
                        .ok_or_else(|| {
                            PlaceError::InvalidNetlist(format!(
                                "net \"{}\" references unknown pin \"{reference}\"",
                                net_desc.name
                            ))
                        })?,
                    None => {
                        let cell = netlist.cell_named(reference).ok_or_else(|| {
                            PlaceError::InvalidNetlist(format!(
                                "net \"{}\" references unknown cell \"{reference}\"",
                                net_desc.name
                            ))
                        })?;
                        let center = netlist.cell(cell).center_offset();
                        netlist.add_pin(cell, &net_desc.name, center)
                    }
                };
                pins.push(pin);
            }
            netlist.add_net(&net_desc.name, pins, net_desc.weight.unwrap_or(1.0));
        }

        Ok(netlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CoreRegion;
    use crate::ids::CellId;

    const JSON: &str = r#"{
        "cells": [
            {"name": "inv0", "width": 1.0, "height": 2.0,
             "pins": [{"name": "A", "offset": {"x": 0.0, "y": 1.0}},
                      {"name": "Y", "offset": {"x": 1.0, "y": 1.0}}]},
            {"name": "inv1", "width": 1.0, "height": 2.0},
            {"name": "vdd", "width": 6.0, "height": 0.5, "fixed": {"x": 0.0, "y": 5.5}}
        ],
        "nets": [
            {"name": "n0", "pins": ["inv0/Y", "inv1"]},
            {"name": "clk", "pins": ["inv0/A", "vdd", "inv1"], "weight": 2.0}
        ]
    }"#;

    #[test]
    fn builds_from_json() {
        let desc: NetlistDesc = serde_json::from_str(JSON).unwrap();
        let nl = Netlist::from_desc(&desc).unwrap();
        assert_eq!(nl.cell_count(), 3);
        // two declared pins + one implicit pin per bare reference
        assert_eq!(nl.pin_count(), 2 + 3);
        assert_eq!(nl.net_count(), 2);
        assert!(nl.cell(CellId::from_raw(2)).is_fixed());
        assert!(nl.validate(&CoreRegion::new(6.0, 6.0)).is_ok());

        let clk = nl.net_by_name["clk"];
        assert_eq!(nl.net(clk).weight, 2.0);
        assert_eq!(nl.net(clk).pins.len(), 3);
    }

    #[test]
    fn bare_reference_uses_cell_center() {
        let desc: NetlistDesc = serde_json::from_str(JSON).unwrap();
        let nl = Netlist::from_desc(&desc).unwrap();
        let n0 = nl.net_by_name["n0"];
        let implicit = nl.pin(nl.net(n0).pins[1]);
        assert_eq!(implicit.offset, Point::new(0.5, 1.0));
        assert_eq!(implicit.name, "n0");
    }

    #[test]
    fn unknown_pin_reference_rejected() {
        let desc = NetlistDesc {
            cells: vec![CellDesc {
                name: "a".into(),
                width: 1.0,
                height: 1.0,
                fixed: None,
                pins: vec![],
            }],
            nets: vec![NetDesc {
                name: "n".into(),
                pins: vec!["a/Z".into(), "a".into()],
                weight: None,
            }],
        };
        let err = Netlist::from_desc(&desc).unwrap_err();
        assert!(matches!(err, PlaceError::InvalidNetlist(ref m) if m.contains("a/Z")));
    }

    #[test]
    fn unknown_cell_reference_rejected() {
        let desc = NetlistDesc {
            cells: vec![],
            nets: vec![NetDesc {
                name: "n".into(),
                pins: vec!["ghost".into()],
                weight: None,
            }],
        };
        assert!(Netlist::from_desc(&desc).is_err());
    }

    #[test]
    fn duplicate_pin_rejected() {
        let pin = PinDesc {
            name: "A".into(),
            offset: Point::ZERO,
        };
        let desc = NetlistDesc {
            cells: vec![CellDesc {
                name: "a".into(),
                width: 1.0,
                height: 1.0,
                fixed: None,
                pins: vec![pin.clone(), pin],
            }],
            nets: vec![],
        };
        assert!(Netlist::from_desc(&desc).is_err());
    }
}

//! Core netlist data structures.
//!
//! Defines the static placement graph: cells (with size and an optional fixed
//! location), pins (fixed offsets on their owning cell), and nets (sets of
//! pins with a weight). Connectivity is index based: cells list their pins,
//! pins name their cell and net, and nets list their pins. The [`Netlist`] is
//! never mutated once a placement run starts; movable positions live in a
//! separate [`Placement`](crate::placement::Placement).

use crate::error::PlaceError;
use crate::geometry::{CoreRegion, Point};
use crate::ids::{CellId, NetId, PinId};
use mplace_common::{Arena, ArenaId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The placement netlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// All cells in the netlist.
    pub cells: Arena<CellId, Cell>,
    /// All pins in the netlist.
    pub pins: Arena<PinId, Pin>,
    /// All nets in the netlist.
    pub nets: Arena<NetId, Net>,
    /// Auxiliary index: cell name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub cell_by_name: HashMap<String, CellId>,
    /// Auxiliary index: net name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub net_by_name: HashMap<String, NetId>,
}

/// A rectangular instance to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// The cell's ID (assigned by [`Netlist::add_cell`]).
    pub id: CellId,
    /// Unique instance name.
    pub name: String,
    /// Width of the cell.
    pub width: f64,
    /// Height of the cell.
    pub height: f64,
    /// Lower-left corner for fixed cells; `None` for movable cells.
    pub fixed_at: Option<Point>,
    /// Pins owned by this cell.
    pub pins: Vec<PinId>,
}

impl Cell {
    /// Creates a movable cell.
    pub fn movable(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: CellId::from_raw(0),
            name: name.into(),
            width,
            height,
            fixed_at: None,
            pins: Vec::new(),
        }
    }

    /// Creates a cell fixed with its lower-left corner at `at`.
    pub fn fixed(name: impl Into<String>, width: f64, height: f64, at: Point) -> Self {
        Self {
            fixed_at: Some(at),
            ..Self::movable(name, width, height)
        }
    }

    /// Returns `true` if the cell never moves.
    pub fn is_fixed(&self) -> bool {
        self.fixed_at.is_some()
    }

    /// Offset of the cell center from its lower-left corner.
    pub fn center_offset(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A connection point at a fixed offset from its cell's origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// The pin's ID (assigned by [`Netlist::add_pin`]).
    pub id: PinId,
    /// Pin name, unique within its cell.
    pub name: String,
    /// The owning cell.
    pub cell: CellId,
    /// Offset from the owning cell's lower-left corner.
    pub offset: Point,
    /// The net this pin belongs to, if connected.
    pub net: Option<NetId>,
}

/// A set of electrically connected pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    /// The net's ID (assigned by [`Netlist::add_net`]).
    pub id: NetId,
    /// Net name.
    pub name: String,
    /// Member pins.
    pub pins: Vec<PinId>,
    /// Strictly positive weight; 1.0 unless the net is critical.
    pub weight: f64,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell and returns its ID.
    pub fn add_cell(&mut self, mut cell: Cell) -> CellId {
        let id = self.cells.next_id();
        cell.id = id;
        cell.pins.clear();
        self.cell_by_name.insert(cell.name.clone(), id);
        self.cells.alloc(cell)
    }

    /// Adds a pin on `cell` at `offset` from its origin and returns its ID.
    pub fn add_pin(&mut self, cell: CellId, name: impl Into<String>, offset: Point) -> PinId {
        let id = self.pins.next_id();
        self.pins.alloc(Pin {
            id,
            name: name.into(),
            cell,
            offset,
            net: None,
        });
        if let Some(owner) = self.cells.get_mut(cell) {
            owner.pins.push(id);
        }
        id
    }

    /// Adds a net over `pins` with the given weight and returns its ID.
    ///
    /// Pins already attached to another net keep their first net; the
    /// conflict is reported by [`validate`](Self::validate).
    pub fn add_net(&mut self, name: impl Into<String>, pins: Vec<PinId>, weight: f64) -> NetId {
        let id = self.nets.next_id();
        for &pin in &pins {
            if let Some(p) = self.pins.get_mut(pin) {
                if p.net.is_none() {
                    p.net = Some(id);
                }
            }
        }
        let name = name.into();
        self.net_by_name.insert(name.clone(), id);
        self.nets.alloc(Net {
            id,
            name,
            pins,
            weight,
        })
    }

    /// Returns the cell with the given ID.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id]
    }

    /// Looks up a cell by name.
    pub fn cell_named(&self, name: &str) -> Option<CellId> {
        self.cell_by_name.get(name).copied()
    }

    /// Returns the number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Returns the number of pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Iterates over the IDs of movable cells in ID order.
    pub fn movable_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells
            .iter()
            .filter(|(_, c)| !c.is_fixed())
            .map(|(id, _)| id)
    }

    /// Returns the number of movable cells.
    pub fn movable_count(&self) -> usize {
        self.movable_cells().count()
    }

    /// Returns the net's pins with duplicates removed, in first-seen order.
    pub fn distinct_pins(&self, net: NetId) -> Vec<PinId> {
        let mut seen = HashSet::new();
        self.nets[net]
            .pins
            .iter()
            .copied()
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.cell_by_name = self
            .cells
            .iter()
            .map(|(id, c)| (c.name.clone(), id))
            .collect();
        self.net_by_name = self
            .nets
            .iter()
            .map(|(id, n)| (n.name.clone(), id))
            .collect();
    }

    /// Checks the structural invariants a placement run relies on.
    ///
    /// Rejects duplicate names, non-positive or non-finite sizes, movable
    /// cells larger than the core, non-finite fixed locations or pin offsets,
    /// dangling references, non-positive net weights, and pins shared by
    /// more than one net.
    pub fn validate(&self, core: &CoreRegion) -> Result<(), PlaceError> {
        let mut names = HashSet::new();
        for cell in self.cells.values() {
            if !names.insert(cell.name.as_str()) {
                return Err(invalid(format!("duplicate cell name \"{}\"", cell.name)));
            }
            let sized = cell.width.is_finite()
                && cell.height.is_finite()
                && cell.width > 0.0
                && cell.height > 0.0;
            if !sized {
                return Err(invalid(format!(
                    "cell \"{}\" has non-positive size {}x{}",
                    cell.name, cell.width, cell.height
                )));
            }
            match cell.fixed_at {
                Some(at) if !at.is_finite() => {
                    return Err(invalid(format!(
                        "fixed cell \"{}\" has a non-finite location",
                        cell.name
                    )));
                }
                None if cell.width > core.width || cell.height > core.height => {
                    return Err(invalid(format!(
                        "movable cell \"{}\" ({}x{}) does not fit in the {}x{} core",
                        cell.name, cell.width, cell.height, core.width, core.height
                    )));
                }
                _ => {}
            }
        }

        for pin in self.pins.values() {
            let Some(cell) = self.cells.get(pin.cell) else {
                return Err(invalid(format!(
                    "pin \"{}\" references unknown cell {}",
                    pin.name, pin.cell
                )));
            };
            if !pin.offset.is_finite() {
                return Err(invalid(format!(
                    "pin \"{}/{}\" has a non-finite offset",
                    cell.name, pin.name
                )));
            }
        }

        let mut net_names = HashSet::new();
        let mut owner: Vec<Option<NetId>> = vec![None; self.pins.len()];
        for (net_id, net) in self.nets.iter() {
            if !net_names.insert(net.name.as_str()) {
                return Err(invalid(format!("duplicate net name \"{}\"", net.name)));
            }
            if !(net.weight.is_finite() && net.weight > 0.0) {
                return Err(invalid(format!(
                    "net \"{}\" has non-positive weight {}",
                    net.name, net.weight
                )));
            }
            for pin in self.distinct_pins(net_id) {
                let Some(slot) = owner.get_mut(pin.index()) else {
                    return Err(invalid(format!(
                        "net \"{}\" references unknown pin {}",
                        net.name, pin
                    )));
                };
                if let Some(other) = *slot {
                    return Err(invalid(format!(
                        "pin {} belongs to both net \"{}\" and net \"{}\"",
                        pin, self.nets[other].name, net.name
                    )));
                }
                *slot = Some(net_id);
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> PlaceError {
    PlaceError::InvalidNetlist(message)
}

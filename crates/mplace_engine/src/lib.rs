//! Iterative quadratic global placement for standard-cell netlists.
//!
//! This crate takes a [`Netlist`] of rectangular cells connected by weighted
//! multi-pin nets, plus a rectangular [`CoreRegion`], and computes cell
//! positions that minimize total squared wirelength. Fixed cells (pads,
//! macros) anchor the solution; everything else moves.
//!
//! # Pipeline
//!
//! 1. **Translate**: each net becomes pairwise springs (clique or star)
//! 2. **Assemble**: springs become one sparse SPD system per axis
//! 3. **Solve**: warm-started conjugate gradient, x and y in parallel
//! 4. **Control**: clamp to the core, measure displacement, repeat until
//!    converged or out of passes, emitting snapshots along the way
//! 5. **Spread**: optional post-convergence redistribution
//!
//! # Usage
//!
//! ```ignore
//! use mplace_engine::{place, CoreRegion, Netlist, Snapshot};
//! use mplace_config::PlacementConfig;
//!
//! let mut snapshots: Vec<Snapshot> = Vec::new();
//! let core = CoreRegion::new(10.0, 10.0);
//! let outcome = place(&netlist, core, PlacementConfig::default(), &mut snapshots)?;
//! assert!(outcome.converged());
//! ```

#![warn(missing_docs)]

pub mod codes;
pub mod desc;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod netlist;
pub mod placement;
pub mod snapshot;

pub use desc::{CellDesc, NetDesc, NetlistDesc, PinDesc};
pub use error::PlaceError;
pub use geometry::{Axis, CoreRegion, Point};
pub use ids::{CellId, NetId, PinId};
pub use netlist::{Cell, Net, Netlist, Pin};
pub use placement::{
    place, PassRecord, Placement, PlacementOutcome, Placer, PlacerState, RankSpreader, Spreader,
};
pub use snapshot::{
    CellPosition, DiscardSnapshots, Snapshot, SnapshotCallback, SnapshotSink, SnapshotStage,
};

//! Opaque ID newtypes for netlist entities.
//!
//! [`CellId`], [`PinId`], and [`NetId`] are thin `u32` wrappers used as arena
//! indices into the [`Netlist`](crate::netlist::Netlist). They are `Copy`,
//! `Hash`, `Ord`, and `Serialize`/`Deserialize`.

mplace_common::define_id!(
    /// Opaque, copyable ID for a cell in the netlist.
    CellId
);

mplace_common::define_id!(
    /// Opaque, copyable ID for a pin in the netlist.
    PinId
);

mplace_common::define_id!(
    /// Opaque, copyable ID for a net in the netlist.
    NetId
);

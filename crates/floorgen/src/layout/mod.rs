//! Layouts and the operations the search applies to them.
//!
//! Purpose
//! - Hold one placement (shape instance + position) per node and keep each
//!   node's energy and validity vector current under single-node moves.
//!
//! Why this design
//! - Layouts are small value types; every perturbation returns a fresh copy so
//!   the annealer can keep or drop it without undo logic.
//! - Energy totals are integers and the energy is a pure function of them,
//!   so the incremental update can be checked against a full recompute
//!   exactly (`LayoutOps::check_consistency`).
//!
//! Split
//! - `types.rs` (validity vectors, energy data, configurations, layouts),
//!   `ops.rs` (energy, perturbations, greedy placement, difference metric),
//!   `constraints.rs` (optional layout-wide energy terms).

mod constraints;
mod ops;
mod types;

pub use constraints::{LayoutConstraint, MaxExtent};
pub use ops::LayoutOps;
pub use types::{Configuration, EnergyData, Layout, ValidityVector};

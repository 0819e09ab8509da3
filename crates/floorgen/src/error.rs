//! Error type shared by the whole crate.
//!
//! Precondition failures (bad polygons, bad map descriptions) are reported as
//! `InvalidPolygon` / `InvalidInput`. A greedy placement that cannot connect a
//! room to its neighbours is `Ungenerable`. `IncrementalDrift` is only raised
//! by the opt-in consistency check of the annealer.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    InvalidPolygon { reason: String },
    InvalidInput { reason: String },
    Ungenerable { node: usize },
    IncrementalDrift { node: usize, reason: String },
}

impl LayoutError {
    pub(crate) fn polygon(reason: impl Into<String>) -> Self {
        Self::InvalidPolygon {
            reason: reason.into(),
        }
    }

    pub(crate) fn input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPolygon { reason } => write!(f, "invalid polygon: {reason}"),
            Self::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            Self::Ungenerable { node } => write!(
                f,
                "ungenerable input: no shape of node {node} could be connected to its neighbours"
            ),
            Self::IncrementalDrift { node, reason } => {
                write!(f, "incremental update drifted at node {node}: {reason}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

pub type Result<T> = std::result::Result<T, LayoutError>;

//! Hard-failure boundary. Everything else in this crate is a soft
//! failure routed through [`crate::diagnostics::Sink`] and handled in
//! place (see spec §7 of the design notes: only allocation failures
//! and malformed input ever propagate out of the core).

use thiserror::Error;

/// Errors that cross the public API boundary of `hydration-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A percolation scratch buffer (BFS fronts, visited bitset, shadow
    /// lattice copy) could not be allocated.
    #[error("allocation failed for {what}")]
    Alloc { what: &'static str },

    /// `SimulationConfig` deserialization failed.
    #[error("malformed simulation configuration: {0}")]
    MalformedConfig(#[from] serde_json::Error),

    /// A caller handed in a lattice/config pair that cannot describe a
    /// valid simulation (e.g. zero-sized lattice, dimension mismatch
    /// between `Mic` and the parallel lattices).
    #[error("invalid simulation state: {0}")]
    InvalidState(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

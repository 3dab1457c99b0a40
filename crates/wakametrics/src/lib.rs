//! Top-level facade crate for wakametrics.
//!
//! Re-exports the metric model and the gateway library so users can depend on a single crate.

pub mod core {
    pub use wakametrics_core::*;
}

pub mod gateway {
    pub use wakametrics_gateway::*;
}

//! Down-gradient flow vectors on a coarse lattice

pub mod derive;
pub mod field;
pub mod smoothing;

pub use derive::{derive_flow_field, flow_vector, gradient_at};
pub use field::{FlowCell, FlowField, FlowSample, FlowVector, Lattice};
pub use smoothing::gaussian_smooth;

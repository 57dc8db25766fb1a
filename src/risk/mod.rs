//! Divergence-based rip-current risk zones

pub mod directional;
pub mod divergence;

pub use directional::{DirectionalRisk, DirectionalScore, directional_risk};
pub use divergence::{RiskCell, RiskClass, RiskZoneGrid, classify, classify_risk, divergence_at};

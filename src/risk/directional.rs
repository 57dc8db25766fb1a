use serde::Serialize;

use crate::config::RiskConfig;
use crate::flow::FlowField;
use crate::risk::RiskZoneGrid;

const MIN_SCORE: f64 = 0.001;

/// A normalised rip-current score at a lattice position.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct DirectionalScore {
    pub lon: f64,
    pub lat: f64,
    pub risk: f64,
}

/// Cells at risk of feeding an alongshore-east, alongshore-west or offshore
/// current, each list scaled so its strongest cell scores 1.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct DirectionalRisk {
    pub east: Vec<DirectionalScore>,
    pub west: Vec<DirectionalScore>,
    pub offshore: Vec<DirectionalScore>,
}

impl DirectionalRisk {
    pub fn is_empty(&self) -> bool {
        self.east.is_empty() && self.west.is_empty() && self.offshore.is_empty()
    }
}

fn push_score(scores: &mut Vec<DirectionalScore>, lon: f64, lat: f64, raw: f64) {
    if raw > MIN_SCORE {
        scores.push(DirectionalScore {
            lon,
            lat,
            risk: raw.min(1.0),
        });
    }
}

fn normalise(scores: &mut [DirectionalScore]) {
    let max = scores.iter().map(|s| s.risk).fold(0.0, f64::max);
    if max > 0.0 {
        scores.iter_mut().for_each(|s| s.risk /= max);
    }
}

/// Scores combine the flow direction, convergence (`-divergence`) and the
/// component along `config.offshore_direction`, weighted by magnitude and
/// `config.gain`. Undefined or indeterminate cells are skipped.
pub fn directional_risk(field: &FlowField, zones: &RiskZoneGrid, config: &RiskConfig) -> DirectionalRisk {
    let (offshore_x, offshore_y) = config.offshore_unit();
    let mut risk = DirectionalRisk::default();

    for (flow, zone) in field.cells().iter().zip(zones.cells()) {
        let (Some(vector), Some(divergence)) = (flow.sample.defined(), zone.divergence) else {
            continue;
        };

        let convergence = (-divergence).max(0.0);
        let offshore = (vector.dx * offshore_x + vector.dy * offshore_y).max(0.0);
        let weight = vector.magnitude * config.gain;

        let east = (vector.dx.max(0.0) * 0.4 + convergence * 0.3 + offshore * 0.3) * weight;
        let west = ((-vector.dx).max(0.0) * 0.4 + convergence * 0.3 + offshore * 0.3) * weight;
        let seaward = (offshore * 0.6 + convergence * 0.4) * weight;

        push_score(&mut risk.east, flow.lon, flow.lat, east);
        push_score(&mut risk.west, flow.lon, flow.lat, west);
        push_score(&mut risk.offshore, flow.lon, flow.lat, seaward);
    }

    normalise(&mut risk.east);
    normalise(&mut risk.west);
    normalise(&mut risk.offshore);

    log::debug!(
        "Directional risk cells: {} east, {} west, {} offshore",
        risk.east.len(),
        risk.west.len(),
        risk.offshore.len()
    );
    risk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowSample;
    use crate::risk::classify_risk;
    use crate::risk::divergence::tests::{field_3x3, vector};
    use approx::assert_relative_eq;

    #[test]
    fn test_eastward_flow_scores_east_only() {
        let field = field_3x3([[vector(1.0, 0.0, 0.01); 3]; 3]);
        let config = RiskConfig::default();
        let zones = classify_risk(&field, &config);

        let risk = directional_risk(&field, &zones, &config);

        // Only the centre has a divergence
        assert_eq!(risk.east.len(), 1);
        assert_relative_eq!(risk.east[0].risk, 1.0);
        assert_eq!((risk.east[0].lon, risk.east[0].lat), (1.0, 1.0));
        assert!(risk.west.is_empty());
        assert!(risk.offshore.is_empty());
    }

    #[test]
    fn test_offshore_flow() {
        // Southward flow with the default southward offshore direction
        let field = field_3x3([[vector(0.0, -1.0, 0.01); 3]; 3]);
        let config = RiskConfig::default();
        let zones = classify_risk(&field, &config);

        let risk = directional_risk(&field, &zones, &config);

        assert_eq!(risk.offshore.len(), 1);
        assert_eq!(risk.east.len(), 1);
        assert_eq!(risk.west.len(), 1);
        assert_relative_eq!(risk.offshore[0].risk, 1.0);
    }

    #[test]
    fn test_undefined_cells_are_skipped() {
        let mut samples = [[vector(1.0, 0.0, 1.0); 3]; 3];
        samples[1][1] = FlowSample::Undefined;
        let field = field_3x3(samples);
        let config = RiskConfig::default();
        let zones = classify_risk(&field, &config);

        assert!(directional_risk(&field, &zones, &config).is_empty());
    }

    #[test]
    fn test_weak_flow_is_dropped() {
        let field = field_3x3([[vector(1.0, 0.0, 1e-8); 3]; 3]);
        let config = RiskConfig::default();
        let zones = classify_risk(&field, &config);

        assert!(directional_risk(&field, &zones, &config).is_empty());
    }
}

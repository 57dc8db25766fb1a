use crate::depth::{DepthGrid, DepthStatistics};

/// Logs min/max/mean and the valid fraction of a depth grid.
pub fn log_depth_statistics(label: &str, depth: &DepthGrid) -> Option<DepthStatistics> {
    let stats = DepthStatistics::compute(depth);
    match &stats {
        Some(stats) => log::info!("{} depth: {}", label, stats),
        None => log::warn!("{} depth: no valid cells out of {}", label, depth.len()),
    }
    stats
}

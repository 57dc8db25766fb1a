//! Scene-level orchestration: bands in, depth/overlay/flow/risk products out.

pub mod batch_process;
pub mod processor;

pub use batch_process::{BatchProcessor, BatchSummary};
pub use processor::{SceneOutputs, SceneProcessor, SceneProducts, load_aoi, run_scene};

mod sink;
#[cfg(feature = "gui")]
mod viewer;

pub use sink::{FrameSink, FrameSnapshot, HeadlessSink, SharedFrameSink, SharedFrameState, SharedFrames};
#[cfg(feature = "gui")]
pub use viewer::run_viewer;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::render::RgbImage;

/// Display surface receiving finished frames.
pub trait FrameSink: Send {
    /// Open the surface. A blocking show returns only once the surface is closed by the user.
    fn show(&mut self, blocking: bool);

    /// Present one frame with an optional caption and a frames-per-second hint
    fn show_frame(&mut self, frame: &RgbImage, caption: Option<&str>, fps: u32);

    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Sink without a window; frames are only counted and logged.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    open: bool,
    frames: u64,
    last_caption: Option<String>,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_caption(&self) -> Option<&str> {
        self.last_caption.as_deref()
    }
}

impl FrameSink for HeadlessSink {
    fn show(&mut self, _blocking: bool) {
        self.open = true;
    }

    fn show_frame(&mut self, frame: &RgbImage, caption: Option<&str>, fps: u32) {
        self.frames += 1;
        self.last_caption = caption.map(str::to_string);
        tracing::debug!(
            "Frame {} ({}x{}, {} fps) {}",
            self.frames,
            frame.width(),
            frame.height(),
            fps,
            caption.unwrap_or("")
        );
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Latest frame handed from the simulation thread to a viewer
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub frame: RgbImage,
    pub caption: Option<String>,
    pub fps: u32,
    pub sequence: u64,
}

/// State shared between a [`SharedFrameSink`] and the viewer reading it
#[derive(Debug, Default)]
pub struct SharedFrames {
    pub latest: Option<FrameSnapshot>,
    /// Set by the producer when it is done sending frames
    pub producer_closed: bool,
    /// Set by the viewer when its window is gone
    pub viewer_closed: bool,
}

pub type SharedFrameState = Arc<Mutex<SharedFrames>>;

/// Publishes frames into shared memory, pacing the caller to the fps hint.
pub struct SharedFrameSink {
    shared: SharedFrameState,
    sequence: u64,
    pace: bool,
    open: bool,
}

impl SharedFrameSink {
    pub fn new(shared: SharedFrameState) -> Self {
        Self {
            shared,
            sequence: 0,
            pace: true,
            open: false,
        }
    }

    /// Skip the per-frame sleep
    pub fn without_pacing(mut self) -> Self {
        self.pace = false;
        self
    }

    fn viewer_closed(&self) -> bool {
        self.shared.lock().map(|s| s.viewer_closed).unwrap_or(true)
    }
}

impl FrameSink for SharedFrameSink {
    fn show(&mut self, blocking: bool) {
        self.open = true;
        if blocking {
            while !self.viewer_closed() {
                thread::sleep(Duration::from_millis(50));
            }
            self.open = false;
        }
    }

    fn show_frame(&mut self, frame: &RgbImage, caption: Option<&str>, fps: u32) {
        self.sequence += 1;
        if let Ok(mut shared) = self.shared.lock() {
            shared.latest = Some(FrameSnapshot {
                frame: frame.clone(),
                caption: caption.map(str::to_string),
                fps,
                sequence: self.sequence,
            });
        }
        if self.pace && fps > 0 {
            thread::sleep(Duration::from_secs_f64(1.0 / fps as f64));
        }
    }

    fn close(&mut self) {
        self.open = false;
        if let Ok(mut shared) = self.shared.lock() {
            shared.producer_closed = true;
        }
    }

    fn is_open(&self) -> bool {
        self.open && !self.viewer_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_sink_counts_frames() {
        let mut sink = HeadlessSink::new();
        assert!(!sink.is_open());
        sink.show(false);
        sink.show_frame(&RgbImage::new(2, 2), Some("t:0"), 10);
        sink.show_frame(&RgbImage::new(2, 2), None, 10);

        assert_eq!(sink.frames(), 2);
        assert_eq!(sink.last_caption(), None);
        sink.close();
        assert!(!sink.is_open());
    }

    #[test]
    fn test_shared_sink_publishes_latest() {
        let shared: SharedFrameState = Arc::new(Mutex::new(SharedFrames::default()));
        let mut sink = SharedFrameSink::new(Arc::clone(&shared)).without_pacing();
        sink.show(false);
        assert!(sink.is_open());

        sink.show_frame(&RgbImage::filled(1, 1, [1, 2, 3]), Some("t:1"), 5);
        sink.show_frame(&RgbImage::filled(1, 1, [4, 5, 6]), Some("t:2"), 5);

        {
            let state = shared.lock().unwrap();
            let latest = state.latest.as_ref().unwrap();
            assert_eq!(latest.sequence, 2);
            assert_eq!(latest.caption.as_deref(), Some("t:2"));
            assert_eq!(latest.frame.pixel(0, 0), [4, 5, 6]);
        }

        shared.lock().unwrap().viewer_closed = true;
        assert!(!sink.is_open());
        sink.show(true);
        sink.close();
        assert!(shared.lock().unwrap().producer_closed);
    }
}

//! Fake media source for unit tests. Tracks how many streams are live.

use crate::camera::CameraError;
use crate::capture::{MediaSource, MediaStream, StreamConstraints, VideoMetadata};
use image::RgbImage;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FakeSource {
    width: u32,
    height: u32,
    frame_w: Arc<AtomicU32>,
    frame_h: Arc<AtomicU32>,
    failing: Arc<AtomicBool>,
    metadata_ready: Arc<AtomicBool>,
    tracks: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
    last_constraints: Arc<Mutex<Option<StreamConstraints>>>,
}

impl FakeSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_w: Arc::new(AtomicU32::new(width)),
            frame_h: Arc::new(AtomicU32::new(height)),
            failing: Arc::new(AtomicBool::new(false)),
            metadata_ready: Arc::new(AtomicBool::new(true)),
            tracks: Arc::new(AtomicUsize::new(0)),
            acquisitions: Arc::new(AtomicUsize::new(0)),
            last_constraints: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_metadata_ready(&self, ready: bool) {
        self.metadata_ready.store(ready, Ordering::SeqCst);
    }

    pub fn set_frame_size(&self, width: u32, height: u32) {
        self.frame_w.store(width, Ordering::SeqCst);
        self.frame_h.store(height, Ordering::SeqCst);
    }

    /// Tracks currently live across every stream this source produced.
    pub fn active_tracks(&self) -> usize {
        self.tracks.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn last_constraints(&self) -> Option<StreamConstraints> {
        self.last_constraints.lock().unwrap().clone()
    }
}

impl MediaSource for FakeSource {
    type Stream = FakeStream;

    async fn acquire(&self, constraints: &StreamConstraints) -> Result<FakeStream, CameraError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        *self.last_constraints.lock().unwrap() = Some(constraints.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied("fake".into()));
        }
        self.tracks.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStream {
            source: self.clone(),
            live: true,
        })
    }
}

pub struct FakeStream {
    source: FakeSource,
    live: bool,
}

impl MediaStream for FakeStream {
    fn metadata(&self) -> Option<VideoMetadata> {
        self.source
            .metadata_ready
            .load(Ordering::SeqCst)
            .then_some(VideoMetadata {
                width: self.source.width,
                height: self.source.height,
            })
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CameraError> {
        if !self.live {
            return Err(CameraError::Released);
        }
        let w = self.source.frame_w.load(Ordering::SeqCst);
        let h = self.source.frame_h.load(Ordering::SeqCst);
        Ok(RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.source.tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.live)
    }
}

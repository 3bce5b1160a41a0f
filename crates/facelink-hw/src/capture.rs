//! Capture widget. Owns one camera session and yields one still image.
//!
//! ```text
//! Idle ──start──▶ Requesting ──metadata──▶ Streaming ──capture──▶ Captured
//!                     │                                              │
//!                     └──failure──▶ Errored ◀── (retry restarts) ────┘ retake
//! ```
//!
//! Any state can `close()`. The stream lives in a [`StreamGuard`], so it is
//! stopped on every exit path: capture, retake, close, failure and drop.

use crate::camera::CameraError;
use crate::frame::{self, FrameError, DEFAULT_JPEG_QUALITY};
use crate::preview::{ObjectUrl, PreviewStore};
use chrono::Utc;
use facelink_core::ImageFile;
use image::RgbImage;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// The single message shown for any device-access failure.
pub const CAMERA_ACCESS_ERROR: &str = "Unable to access camera. Please check permissions.";
pub const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";
pub const CAPTURE_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

/// What the widget asks the media source for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing_mode: FacingMode::User,
            audio: false,
        }
    }
}

/// Native pixel size reported by a stream once its metadata is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
}

/// An active camera feed.
pub trait MediaStream: Send {
    /// `None` until the stream knows its native frame size.
    fn metadata(&self) -> Option<VideoMetadata>;

    /// Snapshot the current frame at native size.
    fn grab_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Stop every track. Must tolerate repeated calls.
    fn stop(&mut self);

    fn active_tracks(&self) -> usize;
}

/// Host-provided camera access.
#[allow(async_fn_in_trait)]
pub trait MediaSource {
    type Stream: MediaStream;

    async fn acquire(&self, constraints: &StreamConstraints) -> Result<Self::Stream, CameraError>;
}

/// Exclusive owner of a stream; stops it when dropped.
pub struct StreamGuard<T: MediaStream> {
    stream: T,
}

impl<T: MediaStream> StreamGuard<T> {
    pub fn new(stream: T) -> Self {
        Self { stream }
    }
}

impl<T: MediaStream> Deref for StreamGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.stream
    }
}

impl<T: MediaStream> DerefMut for StreamGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.stream
    }
}

impl<T: MediaStream> Drop for StreamGuard<T> {
    fn drop(&mut self) {
        self.stream.stop();
        tracing::debug!("camera stream stopped");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Requesting,
    Streaming,
    Captured,
    Errored(String),
    Closed,
}

/// Notifications for whoever opened the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Captured(ImageFile),
    Closed,
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera is not streaming")]
    NotStreaming,
    #[error("capture widget is closed")]
    Closed,
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Identifies one acquisition attempt. A ticket from an earlier attempt is
/// stale and its result is discarded.
#[derive(Debug)]
#[must_use]
pub struct AcquireTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    pub constraints: StreamConstraints,
    /// JPEG quality, 1–100.
    pub jpeg_quality: u8,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

pub struct CaptureWidget<S: MediaSource> {
    source: S,
    options: CaptureOptions,
    previews: PreviewStore,
    state: CaptureState,
    stream: Option<StreamGuard<S::Stream>>,
    metadata: Option<VideoMetadata>,
    preview: Option<ObjectUrl>,
    generation: u64,
}

impl<S: MediaSource> CaptureWidget<S> {
    pub fn new(source: S, previews: PreviewStore, options: CaptureOptions) -> Self {
        Self {
            source,
            options,
            previews,
            state: CaptureState::Idle,
            stream: None,
            metadata: None,
            preview: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            CaptureState::Errored(msg) => Some(msg),
            _ => None,
        }
    }

    /// Native size of the bound stream, once known.
    pub fn metadata(&self) -> Option<VideoMetadata> {
        self.metadata
    }

    /// URL of the captured still, while in `Captured`.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(ObjectUrl::as_str)
    }

    pub fn active_tracks(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.active_tracks())
    }

    fn release_stream(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("capture: stream released");
        }
        self.metadata = None;
    }

    fn release_preview(&mut self) {
        if let Some(url) = self.preview.take() {
            url.revoke();
        }
    }

    /// Enter `Requesting` and hand out a ticket for the pending acquisition.
    pub fn begin_start(&mut self) -> Result<AcquireTicket, CaptureError> {
        if self.state == CaptureState::Closed {
            return Err(CaptureError::Closed);
        }
        self.release_stream();
        self.generation += 1;
        self.state = CaptureState::Requesting;
        tracing::debug!(generation = self.generation, "capture: requesting camera");
        Ok(AcquireTicket {
            generation: self.generation,
        })
    }

    /// Deliver the outcome of an acquisition. Returns `true` if the stream
    /// was bound; a stale or failed result leaves no stream behind.
    pub fn finish_start(
        &mut self,
        ticket: AcquireTicket,
        result: Result<S::Stream, CameraError>,
    ) -> bool {
        let result = result.map(StreamGuard::new);

        if ticket.generation != self.generation || self.state != CaptureState::Requesting {
            if result.is_ok() {
                tracing::warn!(
                    generation = ticket.generation,
                    "capture: releasing stream that arrived after the widget moved on"
                );
            }
            return false;
        }

        match result {
            Ok(guard) => {
                self.stream = Some(guard);
                self.metadata_loaded();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "capture: camera access failed");
                self.state = CaptureState::Errored(CAMERA_ACCESS_ERROR.to_string());
                false
            }
        }
    }

    /// Begin playback if the bound stream now reports its native size.
    pub fn metadata_loaded(&mut self) -> bool {
        if self.state != CaptureState::Requesting {
            return false;
        }
        let Some(meta) = self.stream.as_ref().and_then(|s| s.metadata()) else {
            return false;
        };
        self.metadata = Some(meta);
        self.state = CaptureState::Streaming;
        tracing::info!(width = meta.width, height = meta.height, "capture: streaming");
        true
    }

    /// Request the camera. Failures land in `Errored`; nothing is retried.
    pub async fn start_camera(&mut self) -> Result<(), CaptureError> {
        let ticket = self.begin_start()?;
        let result = self.source.acquire(&self.options.constraints).await;
        self.finish_start(ticket, result);
        Ok(())
    }

    /// Manual retry after a failure.
    pub async fn retry(&mut self) -> Result<(), CaptureError> {
        self.start_camera().await
    }

    /// Discard the still, revoke its preview and restart the camera.
    pub async fn retake_photo(&mut self) -> Result<(), CaptureError> {
        self.release_preview();
        self.start_camera().await
    }

    /// Snapshot the current frame into a JPEG file and release the camera.
    pub fn capture_photo(&mut self) -> Result<ImageFile, CaptureError> {
        if self.state != CaptureState::Streaming {
            return Err(CaptureError::NotStreaming);
        }
        let meta = self.metadata.ok_or(CaptureError::NotStreaming)?;
        let stream = self.stream.as_mut().ok_or(CaptureError::NotStreaming)?;

        let raster = stream.grab_frame()?;
        if raster.dimensions() != (meta.width, meta.height) {
            return Err(FrameError::SizeMismatch {
                expected_w: meta.width,
                expected_h: meta.height,
                actual_w: raster.width(),
                actual_h: raster.height(),
            }
            .into());
        }

        let bytes = frame::encode_jpeg(&raster, self.options.jpeg_quality)?;
        let file = ImageFile::new(CAPTURE_FILE_NAME, CAPTURE_MIME, bytes, Utc::now());

        self.release_preview();
        self.preview = Some(self.previews.create(file.bytes.clone(), CAPTURE_MIME));
        self.release_stream();
        self.state = CaptureState::Captured;

        tracing::info!(
            width = meta.width,
            height = meta.height,
            size = file.len(),
            "capture: photo taken"
        );
        Ok(file)
    }

    /// Release everything and report closure. Safe to call from any state,
    /// any number of times.
    pub fn close(&mut self) -> CaptureEvent {
        self.release_stream();
        self.release_preview();
        self.generation += 1;
        if self.state != CaptureState::Closed {
            tracing::debug!(from = ?self.state, "capture: closed");
        }
        self.state = CaptureState::Closed;
        CaptureEvent::Closed
    }
}

//! V4L2 camera capture via the `v4l` crate.

use crate::capture::{MediaSource, MediaStream, StreamConstraints, VideoMetadata};
use crate::frame;
use image::RgbImage;
use std::io;
use std::path::Path;
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("streaming not supported")]
    StreamingNotSupported,
    #[error("stream already released")]
    Released,
}

/// Info about a discovered V4L2 device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub driver: String,
    pub bus: String,
}

/// Negotiated pixel format for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// YUYV 4:2:2 packed (2 bytes/pixel).
    Yuyv,
    /// Motion-JPEG, one JPEG image per buffer.
    Mjpg,
}

fn map_open_error(device_path: &str, e: io::Error) -> CameraError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        CameraError::PermissionDenied(device_path.to_string())
    } else if e.to_string().contains("busy") || e.to_string().contains("EBUSY") {
        CameraError::DeviceBusy
    } else {
        CameraError::DeviceNotFound(format!("{device_path}: {e}"))
    }
}

/// Dequeue and drop `count` frames. Returns how many were actually read.
fn discard_frames(count: usize, mut dequeue: impl FnMut() -> io::Result<()>) -> usize {
    let mut discarded = 0;
    for _ in 0..count {
        match dequeue() {
            Ok(()) => discarded += 1,
            Err(e) => tracing::debug!(error = %e, "warmup frame failed"),
        }
    }
    discarded
}

/// V4L2 camera device handle. The device is closed when this is dropped.
pub struct Camera {
    device: Device,
    pub width: u32,
    pub height: u32,
    pub device_path: String,
    pub fourcc: FourCC,
    pixel_format: PixelFormat,
}

impl Camera {
    /// Open a V4L2 camera device by path (e.g., "/dev/video0") and negotiate
    /// a colour format as close as the driver allows to the ideal size.
    pub fn open(device_path: &str, constraints: &StreamConstraints) -> Result<Self, CameraError> {
        if !Path::new(device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path.to_string()));
        }

        let device = Device::with_path(device_path).map_err(|e| map_open_error(device_path, e))?;

        let caps = device.query_caps().map_err(|e| {
            CameraError::CaptureFailed(format!("failed to query capabilities: {e}"))
        })?;

        tracing::info!(
            device = device_path,
            driver = %caps.driver,
            card = %caps.card,
            facing_mode = ?constraints.facing_mode,
            "opened camera"
        );

        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            return Err(CameraError::StreamingNotSupported);
        }

        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;

        // Ideal size is a hint; the driver picks the nearest mode it supports.
        // Try YUYV first and fall back to MJPG, which most webcams need at 720p.
        fmt.width = constraints.ideal_width;
        fmt.height = constraints.ideal_height;
        fmt.fourcc = FourCC::new(b"YUYV");

        let mut negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        if negotiated.fourcc != FourCC::new(b"YUYV") {
            fmt.fourcc = FourCC::new(b"MJPG");
            negotiated = device.set_format(&fmt).map_err(|e| {
                CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
            })?;
        }

        let fourcc = negotiated.fourcc;
        let pixel_format = if fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv
        } else if fourcc == FourCC::new(b"MJPG") {
            PixelFormat::Mjpg
        } else {
            return Err(CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {fourcc:?} (need YUYV or MJPG)"
            )));
        };

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            fourcc = ?fourcc,
            "negotiated format"
        );

        Ok(Self {
            device,
            width: negotiated.width,
            height: negotiated.height,
            device_path: device_path.to_string(),
            fourcc,
            pixel_format,
        })
    }

    /// Capture one frame at the negotiated size. The first `warmup` frames of
    /// the same stream are discarded while auto-exposure settles.
    pub fn capture_rgb(&self, warmup: usize) -> Result<RgbImage, CameraError> {
        let mut stream =
            MmapStream::with_buffers(&self.device, BufType::VideoCapture, 4).map_err(|e| {
                CameraError::CaptureFailed(format!("failed to create mmap stream: {e}"))
            })?;

        if warmup > 0 {
            tracing::info!(count = warmup, "discarding warmup frames");
            discard_frames(warmup, || stream.next().map(|_| ()));
        }

        let (buf, meta) = stream
            .next()
            .map_err(|e| CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}")))?;

        let used = (meta.bytesused as usize).min(buf.len());
        let converted = match self.pixel_format {
            PixelFormat::Yuyv => frame::yuyv_to_rgb(buf, self.width, self.height),
            PixelFormat::Mjpg => frame::mjpg_to_rgb(&buf[..used], self.width, self.height),
        };
        converted.map_err(|e| CameraError::CaptureFailed(format!("frame conversion failed: {e}")))
    }

    /// List available V4L2 video capture devices.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        for i in 0..16 {
            let path = format!("/dev/video{i}");
            if !Path::new(&path).exists() {
                continue;
            }
            let Ok(dev) = Device::with_path(&path) else {
                continue;
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
                continue;
            }
            devices.push(DeviceInfo {
                path,
                name: caps.card.clone(),
                driver: caps.driver.clone(),
                bus: caps.bus.clone(),
            });
        }

        devices
    }
}

/// Media source backed by a V4L2 device path.
#[derive(Debug, Clone)]
pub struct V4lSource {
    device_path: String,
    warmup_frames: usize,
}

impl V4lSource {
    pub fn new(device_path: impl Into<String>, warmup_frames: usize) -> Self {
        Self {
            device_path: device_path.into(),
            warmup_frames,
        }
    }

    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl MediaSource for V4lSource {
    type Stream = V4lStream;

    async fn acquire(&self, constraints: &StreamConstraints) -> Result<V4lStream, CameraError> {
        let path = self.device_path.clone();
        let constraints = constraints.clone();
        let warmup = self.warmup_frames;

        // Opening blocks on ioctls; keep it off the event loop.
        let camera = tokio::task::spawn_blocking(move || Camera::open(&path, &constraints))
            .await
            .map_err(|e| CameraError::CaptureFailed(format!("camera task failed: {e}")))??;

        Ok(V4lStream {
            camera: Some(camera),
            warmup_frames: warmup,
        })
    }
}

/// An open V4L2 camera acting as a single-track video stream.
pub struct V4lStream {
    camera: Option<Camera>,
    warmup_frames: usize,
}

impl MediaStream for V4lStream {
    fn metadata(&self) -> Option<VideoMetadata> {
        self.camera.as_ref().map(|c| VideoMetadata {
            width: c.width,
            height: c.height,
        })
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CameraError> {
        self.camera
            .as_ref()
            .ok_or(CameraError::Released)?
            .capture_rgb(self.warmup_frames)
    }

    fn stop(&mut self) {
        if let Some(camera) = self.camera.take() {
            tracing::info!(device = %camera.device_path, "camera released");
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.camera.is_some())
    }
}

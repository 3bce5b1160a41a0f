//! facelink-hw — Camera capture and image acquisition.
//!
//! Provides V4L2-based camera access behind the `MediaSource` trait, the
//! capture widget that owns a camera session, and the acquisition widget
//! that unifies file picking, drag-and-drop and camera capture.

pub mod acquisition;
pub mod camera;
pub mod capture;
pub mod frame;
pub mod preview;

#[cfg(test)]
pub(crate) mod testing;

pub use acquisition::{AcquireError, FileAcquisition, PickerInput};
pub use camera::{Camera, CameraError, PixelFormat, V4lSource, V4lStream};
pub use capture::{
    CaptureError, CaptureEvent, CaptureOptions, CaptureState, CaptureWidget, MediaSource,
    MediaStream, StreamConstraints,
};
pub use preview::{ObjectUrl, PreviewStore};

//! File acquisition widget. Picker, drag-and-drop and camera capture all
//! end in a single "file selected" callback.

use crate::capture::{CaptureError, CaptureEvent, CaptureOptions, CaptureWidget, MediaSource};
use crate::preview::PreviewStore;
use facelink_core::{AcceptPattern, ImageFile};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("camera overlay is not open")]
    CameraNotOpen,
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// The hidden file input behind the "Choose File" button.
///
/// Like a browser file input, choosing exactly the current value again does
/// not produce a change notification until the value is reset.
#[derive(Debug, Clone)]
pub struct PickerInput {
    accept: AcceptPattern,
    multiple: bool,
    value: Vec<PathBuf>,
}

impl PickerInput {
    pub fn new(accept: AcceptPattern, multiple: bool) -> Self {
        Self {
            accept,
            multiple,
            value: Vec::new(),
        }
    }

    pub fn accept(&self) -> &AcceptPattern {
        &self.accept
    }

    pub fn value(&self) -> &[PathBuf] {
        &self.value
    }

    /// Apply a dialog choice. Returns the new value if it changed.
    pub fn choose(&mut self, paths: Vec<PathBuf>) -> Option<Vec<PathBuf>> {
        let mut chosen: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| self.accept.matches_path(p))
            .collect();
        if !self.multiple {
            chosen.truncate(1);
        }
        if chosen.is_empty() || chosen == self.value {
            return None;
        }
        self.value = chosen.clone();
        Some(chosen)
    }

    pub fn reset(&mut self) {
        self.value.clear();
    }
}

type SelectCallback = Box<dyn FnMut(&ImageFile) + Send>;

pub struct FileAcquisition<S: MediaSource + Clone> {
    source: S,
    previews: PreviewStore,
    capture_options: CaptureOptions,
    picker: PickerInput,
    selected: Option<ImageFile>,
    drag_over: bool,
    camera: Option<CaptureWidget<S>>,
    on_select: SelectCallback,
}

impl<S: MediaSource + Clone> FileAcquisition<S> {
    pub fn new(
        source: S,
        previews: PreviewStore,
        on_select: impl FnMut(&ImageFile) + Send + 'static,
    ) -> Self {
        Self {
            source,
            previews,
            capture_options: CaptureOptions::default(),
            picker: PickerInput::new(AcceptPattern::default(), false),
            selected: None,
            drag_over: false,
            camera: None,
            on_select: Box::new(on_select),
        }
    }

    pub fn with_accept(mut self, accept: AcceptPattern) -> Self {
        self.picker = PickerInput::new(accept, self.picker.multiple);
        self
    }

    /// Allows multi-select in the dialog. Only the first file is used.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.picker.multiple = multiple;
        self
    }

    pub fn with_capture_options(mut self, options: CaptureOptions) -> Self {
        self.capture_options = options;
        self
    }

    pub fn selected(&self) -> Option<&ImageFile> {
        self.selected.as_ref()
    }

    pub fn picker(&self) -> &PickerInput {
        &self.picker
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn camera(&self) -> Option<&CaptureWidget<S>> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut CaptureWidget<S>> {
        self.camera.as_mut()
    }

    fn select(&mut self, file: ImageFile) {
        tracing::debug!(name = %file.name, size = file.len(), "file selected");
        (self.on_select)(&file);
        self.selected = Some(file);
    }

    pub fn drag_over(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    /// Accept the first dropped file. Returns whether anything was selected.
    pub fn drop_files(&mut self, files: Vec<ImageFile>) -> bool {
        self.drag_over = false;
        match files.into_iter().next() {
            Some(file) => {
                self.select(file);
                true
            }
            None => false,
        }
    }

    /// Feed a dialog choice through the picker and read the first file.
    pub fn pick(&mut self, paths: Vec<PathBuf>) -> Result<bool, AcquireError> {
        let Some(chosen) = self.picker.choose(paths) else {
            return Ok(false);
        };
        let Some(path) = chosen.into_iter().next() else {
            return Ok(false);
        };
        match ImageFile::from_path(&path) {
            Ok(file) => {
                self.select(file);
                Ok(true)
            }
            Err(source) => {
                self.picker.reset();
                Err(AcquireError::Read { path, source })
            }
        }
    }

    /// Open the capture overlay (or return the one already open).
    pub fn open_camera(&mut self) -> &mut CaptureWidget<S> {
        let source = self.source.clone();
        let previews = self.previews.clone();
        let options = self.capture_options.clone();
        self.camera
            .get_or_insert_with(|| CaptureWidget::new(source, previews, options))
    }

    /// React to the overlay. A capture is adopted; either way the overlay closes.
    pub fn handle_capture_event(&mut self, event: CaptureEvent) {
        if let Some(mut camera) = self.camera.take() {
            camera.close();
        }
        if let CaptureEvent::Captured(file) = event {
            self.select(file);
        }
    }

    /// Take the photo in the open overlay and adopt it.
    pub fn capture_from_overlay(&mut self) -> Result<(), AcquireError> {
        let camera = self.camera.as_mut().ok_or(AcquireError::CameraNotOpen)?;
        let file = camera.capture_photo()?;
        self.handle_capture_event(CaptureEvent::Captured(file));
        Ok(())
    }

    /// Dismiss the overlay without taking a photo.
    pub fn close_camera(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            let event = camera.close();
            self.handle_capture_event(event);
        }
    }

    /// Forget the selection and reset the picker so the same file can be
    /// chosen again.
    pub fn clear(&mut self) {
        self.selected = None;
        self.picker.reset();
    }
}

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI configuration: optional TOML file, then `FACELINK_*` environment
/// variables on top.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL.
    pub api_url: String,
    /// V4L2 device path used for camera capture.
    pub camera_device: String,
    /// Ideal capture size; the driver picks the nearest supported mode.
    pub capture_width: u32,
    pub capture_height: u32,
    /// JPEG quality for captured stills (1–100).
    pub jpeg_quality: u8,
    /// Frames discarded after opening the camera (AGC/AE stabilization).
    pub warmup_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: facelink_client::DEFAULT_BASE_URL.to_string(),
            camera_device: "/dev/video0".to_string(),
            capture_width: 1280,
            capture_height: 720,
            jpeg_quality: facelink_hw::frame::DEFAULT_JPEG_QUALITY,
            warmup_frames: 4,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let base = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        Ok(base.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        let config = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply `FACELINK_*` overrides read through `var`.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("FACELINK_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = var("FACELINK_CAMERA_DEVICE") {
            self.camera_device = v;
        }
        self.capture_width = parsed(&var, "FACELINK_CAPTURE_WIDTH", self.capture_width);
        self.capture_height = parsed(&var, "FACELINK_CAPTURE_HEIGHT", self.capture_height);
        self.jpeg_quality = parsed(&var, "FACELINK_JPEG_QUALITY", self.jpeg_quality).clamp(1, 100);
        self.warmup_frames = parsed(&var, "FACELINK_WARMUP_FRAMES", self.warmup_frames);
        self
    }
}

fn parsed<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// `$FACELINK_CONFIG`, else `$XDG_CONFIG_HOME/facelink/config.toml`,
/// else `~/.config/facelink/config.toml`.
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("FACELINK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;
    Some(config_dir.join("facelink").join("config.toml"))
}

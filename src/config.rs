use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the Frame-Compositor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Output surface settings
    pub canvas: CanvasConfig,

    /// Selectable frame assets
    pub frames: FramesConfig,

    /// Download settings
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        self.frames.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Largest accepted canvas side, in pixels
pub const MAX_CANVAS_SIDE: u32 = 8192;

/// Output surface configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
        }
    }
}

impl CanvasConfig {
    fn validate(&self) -> Result<()> {
        let in_range = |side: u32| (1..=MAX_CANVAS_SIDE).contains(&side);
        if !in_range(self.width) || !in_range(self.height) {
            return Err(ConfigError::InvalidValue {
                key: "canvas.size".to_string(),
                value: format!("{}x{}", self.width, self.height)
            }.into());
        }

        Ok(())
    }
}

/// One selectable frame overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    /// Stable identifier used for selection
    pub id: String,

    /// Label shown next to the thumbnail
    pub label: String,

    /// File name, relative to `FramesConfig::assets_dir` unless absolute
    pub file: PathBuf,
}

impl FrameEntry {
    pub fn new<I: Into<String>, L: Into<String>, F: Into<PathBuf>>(id: I, label: L, file: F) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            file: file.into(),
        }
    }
}

/// Frame asset configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramesConfig {
    /// Directory that frame files are resolved against
    pub assets_dir: PathBuf,

    /// Id of the frame selected on startup
    pub default_frame: String,

    /// Frames in display order
    pub entries: Vec<FrameEntry>,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("images"),
            default_frame: "no_shadow".to_string(),
            entries: vec![
                FrameEntry::new("no_shadow", "No shadow", "frame_no_shadow.png"),
                FrameEntry::new("shadow_white", "White shadow", "frame_shadow_white.png"),
                FrameEntry::new("shadow_black", "Black shadow", "frame_shadow_black.png"),
            ],
        }
    }
}

impl FramesConfig {
    /// Resolve an entry's file against the assets directory
    pub fn resolve(&self, entry: &FrameEntry) -> PathBuf {
        if entry.file.is_absolute() {
            entry.file.clone()
        } else {
            self.assets_dir.join(&entry.file)
        }
    }

    /// Position of the default frame within `entries`
    pub fn default_index(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.id == self.default_frame)
    }

    fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ConfigError::MissingKey {
                key: "frames.entries".to_string()
            }.into());
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "frames.entries.id".to_string(),
                    value: entry.id.clone()
                }.into());
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    key: "frames.entries.id".to_string(),
                    value: format!("duplicate '{}'", entry.id)
                }.into());
            }
        }

        if self.default_index().is_none() {
            return Err(ConfigError::InvalidValue {
                key: "frames.default_frame".to_string(),
                value: self.default_frame.clone()
            }.into());
        }

        Ok(())
    }
}

/// Download configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suggested file name for the composited image
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "tensegrity-frame.png".to_string(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        let is_png = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);

        if !is_png || self.file_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(ConfigError::InvalidValue {
                key: "output.file_name".to_string(),
                value: self.file_name.clone()
            }.into());
        }

        Ok(())
    }
}

use thiserror::Error;

/// Main error type for the Frame-Compositor library
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Image decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Image encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Frame asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while turning raw bytes into a raster image
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid image data in {source_name}: {reason}")]
    InvalidImage { source_name: String, reason: String },

    #[error("Unrecognized image format in {source_name}")]
    UnrecognizedFormat { source_name: String },

    #[error("Image has no pixels: {source_name} ({width}x{height})")]
    EmptyImage {
        source_name: String,
        width: u32,
        height: u32,
    },

    #[error("Image too large: {source_name} ({width}x{height}, at most {max} per side)")]
    TooLarge {
        source_name: String,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("Failed to read image file: {path}")]
    ReadFailed { path: String },
}

/// Errors raised while producing the output image
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("PNG encoding failed: {reason}")]
    Failed { reason: String },

    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Nothing has been composited yet")]
    NothingProcessed,
}

/// Frame catalog errors
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Frame not found: {id}")]
    NotFound { id: String },

    #[error("Frame index {index} out of range (catalog has {len} frames)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Duplicate frame id: {id}")]
    Duplicate { id: String },

    #[error("Frame asset loading failed: {id} - {reason}")]
    LoadFailed { id: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CompositorError
pub type Result<T> = std::result::Result<T, CompositorError>;

impl CompositorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether this error came from an undecodable input image
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            Self::Decode(DecodeError::ReadFailed { .. }) => true,
            Self::Asset(AssetError::LoadFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Decode(DecodeError::UnrecognizedFormat { source_name }) => {
                format!("'{}' does not look like an image. Please choose a PNG, JPEG, GIF, WebP or BMP file.", source_name)
            }
            Self::Decode(DecodeError::TooLarge { source_name, max, .. }) => {
                format!("'{}' is too large. Please use an image at most {} pixels per side.", source_name, max)
            }
            Self::Decode(DecodeError::ReadFailed { path }) => {
                format!("Could not read image file '{}'. Please check the file exists.", path)
            }
            Self::Asset(AssetError::NotFound { id }) => {
                format!("Frame '{}' not found. Use --list-frames to see available frames.", id)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            Self::Encode(EncodeError::NothingProcessed) => {
                "Upload an image before downloading.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

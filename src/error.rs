//! Unified error type for photoblend.

use thiserror::Error;

/// Errors that can occur while staging inputs, blending, or managing sessions.
#[derive(Debug, Error)]
pub enum BlendError {
    /// A selected file is not an image.
    #[error("Unsupported file type: {0}. Please provide a valid image file (e.g., JPEG, PNG).")]
    UnsupportedFileType(String),

    /// A declared MIME type is not an image type.
    #[error("Invalid input type '{0}': expected an image MIME type")]
    InvalidInputType(String),

    /// An inline representation is not a parseable data URL.
    #[error("Malformed inline image data: {0}")]
    MalformedInlineData(String),

    /// A confirmed crop region has zero width or height.
    #[error("Empty crop selection: select an area with non-zero width and height")]
    EmptySelection,

    /// The source image could not be decoded or the crop could not be encoded.
    #[error("Rasterization unavailable: {0}")]
    RasterizationUnavailable(String),

    /// The model response contained no inline-image part.
    #[error("No image in the model response")]
    NoImageInResponse,

    /// Transport, authentication, or provider-side failure during generation.
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Registration attempted with an existing (case-insensitive) username.
    #[error("Username already exists. Please choose another one.")]
    UsernameTaken,

    /// Registration attempted with a too-short password.
    #[error("Password must be at least 4 characters long.")]
    WeakPassword,

    /// Login failed: unknown username or wrong password.
    #[error("Invalid username or password.")]
    InvalidCredentials,

    /// An operation requires a logged-in user.
    #[error("Not logged in. Run `photoblend login <username>` first.")]
    NotLoggedIn,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Image format conversion error.
    #[error("Image conversion error: {0}")]
    ImageConversion(String),

    /// No API key configured for the provider.
    #[error("No API key for {provider}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The provider name.
        provider: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl From<reqwest::Error> for BlendError {
    fn from(e: reqwest::Error) -> Self {
        Self::GenerationUnavailable(e.to_string())
    }
}

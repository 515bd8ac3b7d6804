//! Error types for resource resolution and raster decoding.

use thiserror::Error;

/// Failure to turn a resource key into bytes.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Nothing exists under the key.
    #[error("resource not found: {key}")]
    NotFound {
        /// Key that was requested.
        key: String,
    },

    /// The key is malformed or escapes the resource root.
    #[error("invalid resource key '{key}'")]
    InvalidKey {
        /// Key that was requested.
        key: String,
    },

    /// The resource exists but could not be read.
    #[error("failed to read resource {key}: {source}")]
    Io {
        /// Key that was requested.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading or sampling a raster.
///
/// `ResourceMissing`, `Decode` and `InvalidDimensions` occur during
/// initialization and are fatal for the owning dimension.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The raster key did not resolve to readable bytes.
    #[error("raster {key} could not be resolved: {source}")]
    ResourceMissing {
        /// Raster resource key.
        key: String,
        /// Resolver failure.
        #[source]
        source: ResourceError,
    },

    /// The bytes are not a decodable image.
    #[error("raster {key} could not be decoded: {source}")]
    Decode {
        /// Raster resource key.
        key: String,
        /// Decoder failure.
        #[source]
        source: image::ImageError,
    },

    /// The raster decoded but its width or height is odd.
    #[error("raster {key} has odd dimensions {width}x{height}")]
    InvalidDimensions {
        /// Raster resource key.
        key: String,
        /// Decoded width.
        width: u32,
        /// Decoded height.
        height: u32,
    },

    /// A nearest sample was requested outside the resident pixels.
    #[error("pixel ({x}, {z}) is not resident in raster {key}")]
    OutOfRange {
        /// Raster resource key.
        key: String,
        /// Requested pixel column.
        x: i32,
        /// Requested pixel row.
        z: i32,
    },

    /// Sampling or windowing was attempted before `initialize`.
    #[error("raster {key} has not been initialized")]
    NotLoaded {
        /// Raster resource key.
        key: String,
    },
}

impl RasterError {
    /// `true` for errors caused by the raster's bytes rather than its key.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::InvalidDimensions { .. })
    }
}

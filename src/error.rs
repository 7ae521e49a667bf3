//! Error type shared by every fallible operation in the crate.

use crate::{LimitExceeded, SurfaceFormat, TextureDimension};

/// Errors from image construction, layout computation and pixel access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    /// The surface format cannot back an image (e.g. [`SurfaceFormat::Undefined`]).
    #[error("unsupported image format {0:?}")]
    UnsupportedFormat(SurfaceFormat),

    /// Width/height/depth/array size do not fit the texture dimension.
    #[error("invalid width/height/depth/array size for {dimension:?}: {reason}")]
    InvalidDescription {
        /// Dimension of the rejected description.
        dimension: TextureDimension,
        /// Which constraint failed.
        reason: &'static str,
    },

    /// A cube texture whose array size is not a multiple of six.
    #[error("cube texture array size {0} is not a multiple of 6")]
    InvalidCubeArraySize(u32),

    /// More mip levels were requested than the dimensions allow.
    #[error("{requested} mip levels requested, at most {max} possible")]
    TooManyMipLevels {
        /// Requested level count.
        requested: u32,
        /// Length of the full chain.
        max: u32,
    },

    /// An array, z-slice or mip index is out of range.
    #[error("{what} index {index} out of range (count: {count})")]
    SubresourceOutOfRange {
        /// `"array"`, `"z slice"` or `"mip"`.
        what: &'static str,
        /// Offending index.
        index: u32,
        /// Number of valid entries.
        count: u32,
    },

    /// A flat pixel buffer index is out of range.
    #[error("pixel buffer index {index} out of range (count: {count})")]
    BufferIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of pixel buffers.
        count: usize,
    },

    /// Backing storage is smaller than the layout requires.
    #[error("buffer holds {actual} bytes, {required} required")]
    InsufficientData {
        /// Bytes the layout needs.
        required: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Row stride is smaller than `width * pixel_size`.
    #[error("row stride {stride} is smaller than the {min} bytes a row needs")]
    StrideTooSmall {
        /// Supplied stride.
        stride: usize,
        /// Minimum stride.
        min: usize,
    },

    /// Source and destination buffer strides differ.
    #[error("source buffer stride {source_stride} differs from destination {destination_stride}")]
    StrideMismatch {
        /// Source buffer stride in bytes.
        source_stride: usize,
        /// Destination buffer stride in bytes.
        destination_stride: usize,
    },

    /// Source and destination have different width or height.
    #[error(
        "dimension mismatch: {source_width}x{source_height} \
         vs {destination_width}x{destination_height}"
    )]
    DimensionMismatch {
        /// Source width.
        source_width: u32,
        /// Source height.
        source_height: u32,
        /// Destination width.
        destination_width: u32,
        /// Destination height.
        destination_height: u32,
    },

    /// Pixel sizes differ (format reinterpretation, typed access, copies).
    #[error("pixel size mismatch: expected {expected} bytes, got {actual}")]
    PixelSizeMismatch {
        /// Size the buffer format uses.
        expected: usize,
        /// Size supplied.
        actual: usize,
    },

    /// Formats differ in storage class (plain, packed or block-compressed),
    /// so their rows do not line up.
    #[error("{source_format:?} and {destination_format:?} do not share a storage layout")]
    FormatMismatch {
        /// Format of the bytes being read.
        source_format: SurfaceFormat,
        /// Format they would be read as.
        destination_format: SurfaceFormat,
    },

    /// Per-pixel access was attempted on a block-compressed or packed format.
    #[error("per-pixel access is not supported for {0:?}")]
    NotPixelAddressable(SurfaceFormat),

    /// Pixel coordinate outside the buffer.
    #[error("pixel ({x}, {y}) outside {width}x{height} buffer")]
    PixelOutOfBounds {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Buffer width.
        width: u32,
        /// Buffer height.
        height: u32,
    },

    /// A bulk pixel transfer does not fit in the rows after `y_offset`.
    #[error("{pixels} pixels starting at row {y_offset} do not fit a {width}x{height} buffer")]
    PixelRangeOutOfBounds {
        /// Number of pixels transferred.
        pixels: usize,
        /// First row.
        y_offset: u32,
        /// Buffer width.
        width: u32,
        /// Buffer height.
        height: u32,
    },

    /// Layout size does not fit in `usize`.
    #[error("image size overflows the address space")]
    SizeOverflow,

    /// An animated image needs at least one frame.
    #[error("animated image has no frames")]
    NoFrames,

    /// An animation frame does not fit inside the canvas.
    #[error("frame {index} ({width}x{height} at {x_offset},{y_offset}) exceeds the canvas")]
    FrameOutsideCanvas {
        /// Frame index.
        index: usize,
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
        /// Horizontal placement.
        x_offset: u32,
        /// Vertical placement.
        y_offset: u32,
    },

    /// The operation does not support this format.
    #[error("no conversion from {0:?}")]
    UnsupportedConversion(SurfaceFormat),

    /// The surface format has no DXGI counterpart.
    #[error("{0:?} has no DXGI equivalent")]
    NoDxgiEquivalent(SurfaceFormat),

    /// The DXGI code has no surface format counterpart.
    #[error("DXGI format {0} is not supported")]
    UnsupportedDxgiFormat(u32),

    /// A resource limit was exceeded.
    #[error(transparent)]
    Limit(#[from] LimitExceeded),
}

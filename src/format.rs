//! Texel formats and the per-format facts the layout code depends on.

use core::fmt;

/// Texel storage format.
///
/// Component names list the least significant component first, so
/// [`B5G6R5Unorm`](Self::B5G6R5Unorm) keeps blue in bits 0-4 and red in
/// bits 11-15, and [`R8G8B8A8Unorm`](Self::R8G8B8A8Unorm) stores red in the
/// first byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SurfaceFormat {
    /// No format. Never valid for an image.
    #[default]
    Undefined,

    // 8-bit channels
    R8Unorm,
    R8Snorm,
    R8Uint,
    A8Unorm,
    R8G8Unorm,
    R8G8B8Unorm,
    B8G8R8Unorm,
    R8G8B8A8Unorm,
    R8G8B8A8Srgb,
    R8G8B8A8Snorm,
    R8G8B8A8Uint,
    B8G8R8A8Unorm,
    B8G8R8A8Srgb,

    // 16-bit channels
    R16Unorm,
    R16Sfloat,
    R16G16Unorm,
    R16G16Sfloat,
    R16G16B16A16Unorm,
    R16G16B16A16Snorm,
    R16G16B16A16Sfloat,

    // 32-bit channels
    R32Uint,
    R32Sfloat,
    R32G32Sfloat,
    R32G32B32Sfloat,
    R32G32B32A32Sfloat,

    // Packed 16/32-bit words
    B5G6R5Unorm,
    B5G5R5A1Unorm,
    B4G4R4A4Unorm,
    R10G10B10A2Unorm,
    R11G11B10Ufloat,

    // Depth / stencil
    D16Unorm,
    D24UnormS8Uint,
    D32Sfloat,

    // 4:2:2 packed, two texels per 32-bit word
    R8G8B8G8Unorm,
    G8R8G8B8Unorm,

    // Block compressed (4x4 texel blocks)
    Bc1RgbUnorm,
    Bc1RgbaUnorm,
    Bc1RgbaSrgb,
    Bc2Unorm,
    Bc2Srgb,
    Bc3Unorm,
    Bc3Srgb,
    Bc4Unorm,
    Bc4Snorm,
    Bc5Unorm,
    Bc5Snorm,
    Bc6hUfloat,
    Bc6hSfloat,
    Bc7Unorm,
    Bc7Srgb,
}

impl SurfaceFormat {
    /// Bits per texel.
    ///
    /// Block-compressed formats report the average over a block:
    /// 4 for BC1/BC4, 8 for the 16-byte block formats.
    pub const fn size_in_bits(self) -> u32 {
        use SurfaceFormat::*;
        match self {
            Undefined => 0,
            Bc1RgbUnorm | Bc1RgbaUnorm | Bc1RgbaSrgb | Bc4Unorm | Bc4Snorm => 4,
            R8Unorm | R8Snorm | R8Uint | A8Unorm => 8,
            Bc2Unorm | Bc2Srgb | Bc3Unorm | Bc3Srgb | Bc5Unorm | Bc5Snorm | Bc6hUfloat
            | Bc6hSfloat | Bc7Unorm | Bc7Srgb => 8,
            R8G8Unorm | R16Unorm | R16Sfloat | B5G6R5Unorm | B5G5R5A1Unorm | B4G4R4A4Unorm
            | D16Unorm => 16,
            // Two texels share one 32-bit word.
            R8G8B8G8Unorm | G8R8G8B8Unorm => 16,
            R8G8B8Unorm | B8G8R8Unorm => 24,
            R8G8B8A8Unorm | R8G8B8A8Srgb | R8G8B8A8Snorm | R8G8B8A8Uint | B8G8R8A8Unorm
            | B8G8R8A8Srgb | R16G16Unorm | R16G16Sfloat | R32Uint | R32Sfloat
            | R10G10B10A2Unorm | R11G11B10Ufloat | D24UnormS8Uint | D32Sfloat => 32,
            R16G16B16A16Unorm | R16G16B16A16Snorm | R16G16B16A16Sfloat | R32G32Sfloat => 64,
            R32G32B32Sfloat => 96,
            R32G32B32A32Sfloat => 128,
        }
    }

    /// Bytes per texel (`size_in_bits() >> 3`). Zero for 4-bit block formats.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        (self.size_in_bits() >> 3) as usize
    }

    /// Whether an image can be created with this format.
    #[inline]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Whether the format stores 4x4 compressed blocks.
    #[inline]
    pub const fn is_compressed(self) -> bool {
        self.block_size_in_bytes().is_some()
    }

    /// Bytes per 4x4 block for block-compressed formats.
    pub const fn block_size_in_bytes(self) -> Option<usize> {
        use SurfaceFormat::*;
        match self {
            Bc1RgbUnorm | Bc1RgbaUnorm | Bc1RgbaSrgb | Bc4Unorm | Bc4Snorm => Some(8),
            Bc2Unorm | Bc2Srgb | Bc3Unorm | Bc3Srgb | Bc5Unorm | Bc5Snorm | Bc6hUfloat
            | Bc6hSfloat | Bc7Unorm | Bc7Srgb => Some(16),
            _ => None,
        }
    }

    /// Whether two horizontally adjacent texels share one 32-bit word.
    #[inline]
    pub const fn is_packed(self) -> bool {
        matches!(self, Self::R8G8B8G8Unorm | Self::G8R8G8B8Unorm)
    }

    /// Whether single texels can be addressed by byte offset.
    #[inline]
    pub const fn is_pixel_addressable(self) -> bool {
        self.is_valid() && !self.is_compressed() && !self.is_packed()
    }

    /// Whether color values are sRGB encoded.
    pub const fn is_srgb(self) -> bool {
        use SurfaceFormat::*;
        matches!(
            self,
            R8G8B8A8Srgb | B8G8R8A8Srgb | Bc1RgbaSrgb | Bc2Srgb | Bc3Srgb | Bc7Srgb
        )
    }

    /// Whether this is a depth or depth/stencil format.
    #[inline]
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::D16Unorm | Self::D24UnormS8Uint | Self::D32Sfloat)
    }

    /// Number of components stored per texel.
    pub const fn channel_count(self) -> u8 {
        use SurfaceFormat::*;
        match self {
            Undefined => 0,
            R8Unorm | R8Snorm | R8Uint | A8Unorm | R16Unorm | R16Sfloat | R32Uint | R32Sfloat
            | D16Unorm | D32Sfloat | Bc4Unorm | Bc4Snorm => 1,
            R8G8Unorm | R16G16Unorm | R16G16Sfloat | R32G32Sfloat | D24UnormS8Uint | Bc5Unorm
            | Bc5Snorm => 2,
            R8G8B8Unorm | B8G8R8Unorm | R32G32B32Sfloat | B5G6R5Unorm | R11G11B10Ufloat
            | R8G8B8G8Unorm | G8R8G8B8Unorm | Bc1RgbUnorm | Bc6hUfloat | Bc6hSfloat => 3,
            R8G8B8A8Unorm | R8G8B8A8Srgb | R8G8B8A8Snorm | R8G8B8A8Uint | B8G8R8A8Unorm
            | B8G8R8A8Srgb | R16G16B16A16Unorm | R16G16B16A16Snorm | R16G16B16A16Sfloat
            | R32G32B32A32Sfloat | B5G5R5A1Unorm | B4G4R4A4Unorm | R10G10B10A2Unorm
            | Bc1RgbaUnorm | Bc1RgbaSrgb | Bc2Unorm | Bc2Srgb | Bc3Unorm | Bc3Srgb | Bc7Unorm
            | Bc7Srgb => 4,
        }
    }

    /// The sRGB twin of a linear format, or the format itself.
    pub const fn to_srgb(self) -> Self {
        use SurfaceFormat::*;
        match self {
            R8G8B8A8Unorm => R8G8B8A8Srgb,
            B8G8R8A8Unorm => B8G8R8A8Srgb,
            Bc1RgbaUnorm => Bc1RgbaSrgb,
            Bc2Unorm => Bc2Srgb,
            Bc3Unorm => Bc3Srgb,
            Bc7Unorm => Bc7Srgb,
            other => other,
        }
    }

    /// Lines of storage needed for `height` texels (block rows for BCn).
    #[inline]
    pub const fn scanline_count(self, height: u32) -> u32 {
        if self.is_compressed() {
            let blocks = height.div_ceil(4);
            if blocks == 0 { 1 } else { blocks }
        } else {
            height
        }
    }

    /// Whether bytes stored as `self` have the same row and slice layout as
    /// `other`: equal texel size and the same plain/packed/block class.
    #[inline]
    pub const fn is_layout_compatible(self, other: Self) -> bool {
        self.size_in_bits() == other.size_in_bits()
            && self.is_compressed() == other.is_compressed()
            && self.is_packed() == other.is_packed()
    }
}

impl fmt::Display for SurfaceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(SurfaceFormat::R8Unorm.size_in_bytes(), 1);
        assert_eq!(SurfaceFormat::B8G8R8Unorm.size_in_bytes(), 3);
        assert_eq!(SurfaceFormat::R8G8B8A8Unorm.size_in_bytes(), 4);
        assert_eq!(SurfaceFormat::R16G16B16A16Sfloat.size_in_bytes(), 8);
        assert_eq!(SurfaceFormat::R32G32B32Sfloat.size_in_bytes(), 12);
        assert_eq!(SurfaceFormat::R32G32B32A32Sfloat.size_in_bytes(), 16);
        assert_eq!(SurfaceFormat::Bc1RgbaUnorm.size_in_bits(), 4);
        assert_eq!(SurfaceFormat::Bc1RgbaUnorm.size_in_bytes(), 0);
        assert_eq!(SurfaceFormat::Bc7Unorm.size_in_bytes(), 1);
    }

    #[test]
    fn block_sizes() {
        assert_eq!(SurfaceFormat::Bc1RgbUnorm.block_size_in_bytes(), Some(8));
        assert_eq!(SurfaceFormat::Bc4Snorm.block_size_in_bytes(), Some(8));
        assert_eq!(SurfaceFormat::Bc2Unorm.block_size_in_bytes(), Some(16));
        assert_eq!(SurfaceFormat::Bc3Unorm.block_size_in_bytes(), Some(16));
        assert_eq!(SurfaceFormat::Bc6hSfloat.block_size_in_bytes(), Some(16));
        assert_eq!(SurfaceFormat::R8G8B8A8Unorm.block_size_in_bytes(), None);
    }

    #[test]
    fn classification() {
        assert!(!SurfaceFormat::Undefined.is_valid());
        assert!(SurfaceFormat::R8Unorm.is_valid());
        assert!(SurfaceFormat::Bc5Unorm.is_compressed());
        assert!(!SurfaceFormat::B5G6R5Unorm.is_compressed());
        assert!(SurfaceFormat::R8G8B8G8Unorm.is_packed());
        assert!(!SurfaceFormat::R8G8B8G8Unorm.is_pixel_addressable());
        assert!(!SurfaceFormat::Bc1RgbaUnorm.is_pixel_addressable());
        assert!(SurfaceFormat::R32Sfloat.is_pixel_addressable());
        assert!(SurfaceFormat::B8G8R8A8Srgb.is_srgb());
        assert!(SurfaceFormat::D24UnormS8Uint.is_depth());
    }

    #[test]
    fn srgb_twins() {
        assert_eq!(
            SurfaceFormat::R8G8B8A8Unorm.to_srgb(),
            SurfaceFormat::R8G8B8A8Srgb
        );
        assert_eq!(SurfaceFormat::Bc7Unorm.to_srgb(), SurfaceFormat::Bc7Srgb);
        assert_eq!(SurfaceFormat::R16Unorm.to_srgb(), SurfaceFormat::R16Unorm);
    }

    #[test]
    fn scanlines() {
        assert_eq!(SurfaceFormat::Bc1RgbaUnorm.scanline_count(1), 1);
        assert_eq!(SurfaceFormat::Bc1RgbaUnorm.scanline_count(4), 1);
        assert_eq!(SurfaceFormat::Bc1RgbaUnorm.scanline_count(5), 2);
        assert_eq!(SurfaceFormat::R8Unorm.scanline_count(5), 5);
    }

    #[test]
    fn layout_compatibility() {
        use SurfaceFormat::*;
        assert!(R8G8B8A8Unorm.is_layout_compatible(B8G8R8A8Srgb));
        assert!(R8G8B8A8Unorm.is_layout_compatible(R32Sfloat));
        assert!(Bc7Unorm.is_layout_compatible(Bc3Srgb));
        assert!(Bc1RgbaUnorm.is_layout_compatible(Bc4Unorm));
        // Same bit count, different storage class.
        assert!(!R8Unorm.is_layout_compatible(Bc7Unorm));
        assert!(!R8G8Unorm.is_layout_compatible(R8G8B8G8Unorm));
        assert!(!R8Unorm.is_layout_compatible(R8G8Unorm));
    }

    #[test]
    fn channel_counts() {
        assert_eq!(SurfaceFormat::R8Unorm.channel_count(), 1);
        assert_eq!(SurfaceFormat::R8G8Unorm.channel_count(), 2);
        assert_eq!(SurfaceFormat::B5G6R5Unorm.channel_count(), 3);
        assert_eq!(SurfaceFormat::B8G8R8A8Unorm.channel_count(), 4);
    }
}

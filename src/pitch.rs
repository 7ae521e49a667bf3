//! Row and slice pitch computation.
//!
//! Produces the byte layout GPU upload paths expect: block-compressed formats
//! are measured in 4×4 blocks, 4:2:2 packed formats in texel pairs, and
//! everything else in bits per texel rounded up to whole bytes (or to whole
//! DWORDs in legacy mode).

use crate::{ImageError, SurfaceFormat};

/// Options that alter pitch computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct PitchFlags {
    /// Round each row up to a multiple of 4 bytes.
    pub legacy_dword: bool,
    /// Treat the format as this many bits per texel (24, 16 or 8).
    pub bpp_override: Option<BppOverride>,
}

/// Forced bits per texel, for legacy files that store e.g. 24-bit rows for a
/// 32-bit format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BppOverride {
    /// 24 bits per texel.
    Bpp24,
    /// 16 bits per texel.
    Bpp16,
    /// 8 bits per texel.
    Bpp8,
}

impl BppOverride {
    /// Bits per texel.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bpp24 => 24,
            Self::Bpp16 => 16,
            Self::Bpp8 => 8,
        }
    }
}

impl PitchFlags {
    /// Default pitch rules.
    pub fn none() -> Self {
        Self::default()
    }

    /// Enable or disable DWORD row alignment.
    pub fn with_legacy_dword(mut self, enabled: bool) -> Self {
        self.legacy_dword = enabled;
        self
    }

    /// Force a bit depth for non-block, non-packed formats.
    pub fn with_bpp_override(mut self, bpp: BppOverride) -> Self {
        self.bpp_override = Some(bpp);
        self
    }
}

/// Result of [`compute_pitch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pitch {
    /// Bytes per row (per block row for compressed formats).
    pub row: usize,
    /// Bytes per 2D slice.
    pub slice: usize,
    /// Blocks per row for compressed formats, texels otherwise.
    pub width_count: u32,
    /// Block rows for compressed formats, texel rows otherwise.
    pub height_count: u32,
}

/// Compute row and slice pitch for one `width × height` surface.
///
/// # Errors
///
/// [`ImageError::SizeOverflow`] if a pitch does not fit in `usize`.
pub fn compute_pitch(
    format: SurfaceFormat,
    width: u32,
    height: u32,
    flags: PitchFlags,
) -> Result<Pitch, ImageError> {
    if let Some(block_bytes) = format.block_size_in_bytes() {
        let width_count = width.div_ceil(4).max(1);
        let height_count = height.div_ceil(4).max(1);
        let row = (width_count as usize)
            .checked_mul(block_bytes)
            .ok_or(ImageError::SizeOverflow)?;
        let slice = row
            .checked_mul(height_count as usize)
            .ok_or(ImageError::SizeOverflow)?;
        return Ok(Pitch {
            row,
            slice,
            width_count,
            height_count,
        });
    }

    let row = if format.is_packed() {
        ((width as u64 + 1) >> 1) * 4
    } else {
        let bpp = match flags.bpp_override {
            Some(bpp) => bpp.bits(),
            None => format.size_in_bits(),
        } as u64;
        let bits = width as u64 * bpp;
        if flags.legacy_dword {
            bits.div_ceil(32) * 4
        } else {
            bits.div_ceil(8)
        }
    };
    let row = usize::try_from(row).map_err(|_| ImageError::SizeOverflow)?;
    let slice = row
        .checked_mul(height as usize)
        .ok_or(ImageError::SizeOverflow)?;
    Ok(Pitch {
        row,
        slice,
        width_count: width,
        height_count: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed() {
        let p = compute_pitch(SurfaceFormat::R8G8B8A8Unorm, 10, 5, PitchFlags::none()).unwrap();
        assert_eq!(
            p,
            Pitch {
                row: 40,
                slice: 200,
                width_count: 10,
                height_count: 5
            }
        );
    }

    #[test]
    fn odd_width_rounds_to_bytes() {
        let p = compute_pitch(SurfaceFormat::B8G8R8Unorm, 3, 2, PitchFlags::none()).unwrap();
        assert_eq!(p.row, 9);
        assert_eq!(p.slice, 18);
    }

    #[test]
    fn legacy_dword_alignment() {
        let flags = PitchFlags::none().with_legacy_dword(true);
        let p = compute_pitch(SurfaceFormat::B8G8R8Unorm, 3, 2, flags).unwrap();
        assert_eq!(p.row, 12);
        assert_eq!(p.slice, 24);
        let p = compute_pitch(SurfaceFormat::R8Unorm, 5, 1, flags).unwrap();
        assert_eq!(p.row, 8);
    }

    #[test]
    fn bpp_override() {
        let flags = PitchFlags::none().with_bpp_override(BppOverride::Bpp24);
        let p = compute_pitch(SurfaceFormat::R8G8B8A8Unorm, 4, 1, flags).unwrap();
        assert_eq!(p.row, 12);
        let flags = PitchFlags::none().with_bpp_override(BppOverride::Bpp16);
        let p = compute_pitch(SurfaceFormat::R8G8B8A8Unorm, 4, 1, flags).unwrap();
        assert_eq!(p.row, 8);
    }

    #[test]
    fn bc1_blocks() {
        let p = compute_pitch(SurfaceFormat::Bc1RgbaUnorm, 16, 16, PitchFlags::none()).unwrap();
        assert_eq!(
            p,
            Pitch {
                row: 32,
                slice: 128,
                width_count: 4,
                height_count: 4
            }
        );
    }

    #[test]
    fn small_block_surfaces_use_one_block() {
        let p = compute_pitch(SurfaceFormat::Bc3Unorm, 1, 1, PitchFlags::none()).unwrap();
        assert_eq!(p.row, 16);
        assert_eq!(p.slice, 16);
        assert_eq!((p.width_count, p.height_count), (1, 1));
        let p = compute_pitch(SurfaceFormat::Bc7Unorm, 5, 6, PitchFlags::none()).unwrap();
        assert_eq!((p.width_count, p.height_count), (2, 2));
        assert_eq!(p.slice, 64);
    }

    #[test]
    fn packed_pairs() {
        let p = compute_pitch(SurfaceFormat::R8G8B8G8Unorm, 5, 3, PitchFlags::none()).unwrap();
        assert_eq!(p.row, 12);
        assert_eq!(p.slice, 36);
    }

    #[test]
    fn block_formats_ignore_flags() {
        let flags = PitchFlags::none()
            .with_legacy_dword(true)
            .with_bpp_override(BppOverride::Bpp8);
        let p = compute_pitch(SurfaceFormat::Bc1RgbaUnorm, 8, 8, flags).unwrap();
        assert_eq!(p.row, 16);
    }

    #[test]
    fn zero_width_has_zero_pitch() {
        let p = compute_pitch(SurfaceFormat::R8Unorm, 0, 4, PitchFlags::none()).unwrap();
        assert_eq!(p.row, 0);
        assert_eq!(p.slice, 0);
    }

    #[test]
    fn overflow_is_reported() {
        // 16 * 2^32 * 2^32 bytes fits no target.
        let r = compute_pitch(
            SurfaceFormat::R32G32B32A32Sfloat,
            u32::MAX,
            u32::MAX,
            PitchFlags::none(),
        );
        assert_eq!(r, Err(ImageError::SizeOverflow));
    }
}

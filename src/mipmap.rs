//! Mip chain enumeration and per-level descriptions.

use crate::pitch::{PitchFlags, compute_pitch};
use crate::{ImageError, SurfaceFormat};

/// How many mip levels to allocate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MipMapCount {
    /// The full chain down to 1×1×1.
    #[default]
    Auto,
    /// Exactly this many levels.
    Count(u32),
}

impl MipMapCount {
    /// Raw level count as stored in a description; `0` means [`Auto`](Self::Auto).
    #[inline]
    pub fn as_raw(self) -> u32 {
        match self {
            Self::Auto => 0,
            Self::Count(n) => n,
        }
    }
}

impl From<u32> for MipMapCount {
    fn from(levels: u32) -> Self {
        if levels == 0 {
            Self::Auto
        } else {
            Self::Count(levels)
        }
    }
}

impl From<bool> for MipMapCount {
    /// `true` allocates the full chain, `false` a single level.
    fn from(mipmapped: bool) -> Self {
        if mipmapped { Self::Auto } else { Self::Count(1) }
    }
}

/// Length of the full mip chain for the given extent:
/// `floor(log2(max(width, height, depth))) + 1`.
#[inline]
pub const fn count_mip_levels(width: u32, height: u32, depth: u32) -> u32 {
    let mut max = width;
    if height > max {
        max = height;
    }
    if depth > max {
        max = depth;
    }
    if max == 0 {
        max = 1;
    }
    u32::BITS - max.leading_zeros()
}

/// Resolve a requested level count against the full chain.
///
/// # Errors
///
/// [`ImageError::TooManyMipLevels`] if more levels are requested than the
/// extent allows.
pub fn calculate_mip_levels(
    width: u32,
    height: u32,
    depth: u32,
    count: MipMapCount,
) -> Result<u32, ImageError> {
    let max = count_mip_levels(width, height, depth);
    match count {
        MipMapCount::Auto | MipMapCount::Count(0) => Ok(max),
        MipMapCount::Count(requested) if requested > max => {
            Err(ImageError::TooManyMipLevels { requested, max })
        }
        MipMapCount::Count(requested) => Ok(requested),
    }
}

/// Extent of `size` at mip `level` (halved with floor, minimum 1).
#[inline]
pub const fn mip_extent(size: u32, level: u32) -> u32 {
    let v = if level >= u32::BITS { 0 } else { size >> level };
    if v == 0 { 1 } else { v }
}

/// Iterator over the `(width, height, depth)` of each level, starting at
/// full resolution.
#[derive(Clone, Debug)]
pub struct MipChain {
    width: u32,
    height: u32,
    depth: u32,
    remaining: u32,
}

impl MipChain {
    /// Chain of `levels` levels starting at `width × height × depth`.
    pub fn new(width: u32, height: u32, depth: u32, levels: u32) -> Self {
        Self {
            width,
            height,
            depth,
            remaining: levels,
        }
    }
}

impl Iterator for MipChain {
    type Item = (u32, u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let level = (self.width, self.height, self.depth);
        self.width = (self.width / 2).max(1);
        self.height = (self.height / 2).max(1);
        self.depth = (self.depth / 2).max(1);
        Some(level)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for MipChain {}

/// Extent and pitch of one mip level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MipMapDescription {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in slices.
    pub depth: u32,
    /// Bytes per row (block row for compressed formats).
    pub row_pitch: usize,
    /// Bytes per z slice.
    pub slice_pitch: usize,
    /// Blocks per row for compressed formats, texels otherwise.
    pub width_packed: u32,
    /// Block rows for compressed formats, texel rows otherwise.
    pub height_packed: u32,
}

impl MipMapDescription {
    /// Describe one level of the given extent.
    pub fn new(
        format: SurfaceFormat,
        width: u32,
        height: u32,
        depth: u32,
        flags: PitchFlags,
    ) -> Result<Self, ImageError> {
        let pitch = compute_pitch(format, width, height, flags)?;
        Ok(Self {
            width,
            height,
            depth,
            row_pitch: pitch.row,
            slice_pitch: pitch.slice,
            width_packed: pitch.width_count,
            height_packed: pitch.height_count,
        })
    }

    /// Bytes for every z slice of the level.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.slice_pitch * self.depth as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn full_chain_length() {
        assert_eq!(count_mip_levels(1, 1, 1), 1);
        assert_eq!(count_mip_levels(2, 1, 1), 2);
        assert_eq!(count_mip_levels(4, 4, 1), 3);
        assert_eq!(count_mip_levels(256, 16, 1), 9);
        assert_eq!(count_mip_levels(255, 1, 1), 8);
        assert_eq!(count_mip_levels(4, 4, 32), 6);
        assert_eq!(count_mip_levels(u32::MAX, 1, 1), 32);
    }

    #[test]
    fn auto_and_zero_resolve_to_full_chain() {
        assert_eq!(calculate_mip_levels(16, 16, 1, MipMapCount::Auto).unwrap(), 5);
        assert_eq!(calculate_mip_levels(16, 16, 1, MipMapCount::Count(0)).unwrap(), 5);
        assert_eq!(calculate_mip_levels(16, 16, 1, MipMapCount::Count(3)).unwrap(), 3);
    }

    #[test]
    fn too_many_levels_rejected() {
        assert_eq!(
            calculate_mip_levels(4, 4, 1, MipMapCount::Count(4)),
            Err(ImageError::TooManyMipLevels {
                requested: 4,
                max: 3
            })
        );
    }

    #[test]
    fn count_conversions() {
        assert_eq!(MipMapCount::from(0), MipMapCount::Auto);
        assert_eq!(MipMapCount::from(7), MipMapCount::Count(7));
        assert_eq!(MipMapCount::from(true), MipMapCount::Auto);
        assert_eq!(MipMapCount::from(false), MipMapCount::Count(1));
        assert_eq!(MipMapCount::Auto.as_raw(), 0);
    }

    #[test]
    fn chain_halves_with_floor() {
        let levels: Vec<_> = MipChain::new(5, 3, 1, 3).collect();
        assert_eq!(levels, [(5, 3, 1), (2, 1, 1), (1, 1, 1)]);
        assert_eq!(MipChain::new(8, 8, 8, 4).len(), 4);
    }

    #[test]
    fn extent_at_level() {
        assert_eq!(mip_extent(16, 0), 16);
        assert_eq!(mip_extent(16, 2), 4);
        assert_eq!(mip_extent(16, 10), 1);
        assert_eq!(mip_extent(16, 40), 1);
    }

    #[test]
    fn compressed_level_description() {
        let d = MipMapDescription::new(SurfaceFormat::Bc1RgbaUnorm, 2, 2, 1, PitchFlags::none())
            .unwrap();
        assert_eq!(d.width_packed, 1);
        assert_eq!(d.height_packed, 1);
        assert_eq!(d.row_pitch, 8);
        assert_eq!(d.slice_pitch, 8);
        assert_eq!(d.size_in_bytes(), 8);
    }
}

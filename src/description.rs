//! Texture shape: dimension, extent, array size, mip count and format.

use core::fmt;

use crate::mipmap::{MipMapCount, calculate_mip_levels};
use crate::{ImageError, SurfaceFormat};

/// Texture kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// One row of texels per array slice.
    Texture1D,
    /// Plain 2D texture or 2D texture array.
    #[default]
    Texture2D,
    /// Volume texture; a single array slice with `depth` z slices.
    Texture3D,
    /// Cube map; array slices come in groups of six faces.
    TextureCube,
}

impl fmt::Display for TextureDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Texture1D => "Texture1D",
            Self::Texture2D => "Texture2D",
            Self::Texture3D => "Texture3D",
            Self::TextureCube => "TextureCube",
        })
    }
}

/// Full shape of an [`Image`](crate::Image).
///
/// `mip_levels == 0` requests the full chain; [`validate`](Self::validate)
/// resolves it to the actual count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageDescription {
    pub dimension: TextureDimension,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub array_size: u32,
    pub mip_levels: u32,
    pub format: SurfaceFormat,
}

impl ImageDescription {
    /// 1D texture (array).
    pub fn new_1d(
        width: u32,
        mip_map_count: MipMapCount,
        format: SurfaceFormat,
        array_size: u32,
    ) -> Self {
        Self {
            dimension: TextureDimension::Texture1D,
            width,
            height: 1,
            depth: 1,
            array_size,
            mip_levels: mip_map_count.as_raw(),
            format,
        }
    }

    /// 2D texture (array).
    pub fn new_2d(
        width: u32,
        height: u32,
        mip_map_count: MipMapCount,
        format: SurfaceFormat,
        array_size: u32,
    ) -> Self {
        Self {
            dimension: TextureDimension::Texture2D,
            width,
            height,
            depth: 1,
            array_size,
            mip_levels: mip_map_count.as_raw(),
            format,
        }
    }

    /// Cube map with square `size × size` faces; `cube_count` cubes of six faces each.
    pub fn new_cube(
        size: u32,
        mip_map_count: MipMapCount,
        format: SurfaceFormat,
        cube_count: u32,
    ) -> Self {
        Self {
            dimension: TextureDimension::TextureCube,
            width: size,
            height: size,
            depth: 1,
            array_size: cube_count.saturating_mul(6),
            mip_levels: mip_map_count.as_raw(),
            format,
        }
    }

    /// Volume texture.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        mip_map_count: MipMapCount,
        format: SurfaceFormat,
    ) -> Self {
        Self {
            dimension: TextureDimension::Texture3D,
            width,
            height,
            depth,
            array_size: 1,
            mip_levels: mip_map_count.as_raw(),
            format,
        }
    }

    /// Single-level, single-slice 2D description.
    pub fn default_2d(width: u32, height: u32, format: SurfaceFormat) -> Self {
        Self::new_2d(width, height, MipMapCount::Count(1), format, 1)
    }

    /// Check the invariants for the dimension and resolve `mip_levels`.
    ///
    /// Returns a copy whose `mip_levels` is the actual level count.
    ///
    /// # Errors
    ///
    /// - [`ImageError::UnsupportedFormat`] for an invalid format
    /// - [`ImageError::InvalidDescription`] for extents that do not fit the dimension
    /// - [`ImageError::InvalidCubeArraySize`] if a cube's array size is not a multiple of 6
    /// - [`ImageError::TooManyMipLevels`] if more levels are requested than the extent allows
    pub fn validate(&self) -> Result<Self, ImageError> {
        if !self.format.is_valid() {
            return Err(ImageError::UnsupportedFormat(self.format));
        }
        let invalid = |reason| ImageError::InvalidDescription {
            dimension: self.dimension,
            reason,
        };
        if self.width == 0 {
            return Err(invalid("width must be non-zero"));
        }
        match self.dimension {
            TextureDimension::Texture1D => {
                if self.height != 1 {
                    return Err(invalid("height must be 1"));
                }
                if self.depth != 1 {
                    return Err(invalid("depth must be 1"));
                }
                if self.array_size == 0 {
                    return Err(invalid("array size must be non-zero"));
                }
            }
            TextureDimension::Texture2D | TextureDimension::TextureCube => {
                if self.height == 0 {
                    return Err(invalid("height must be non-zero"));
                }
                if self.depth != 1 {
                    return Err(invalid("depth must be 1"));
                }
                if self.array_size == 0 {
                    return Err(invalid("array size must be non-zero"));
                }
                if self.dimension == TextureDimension::TextureCube && self.array_size % 6 != 0 {
                    return Err(ImageError::InvalidCubeArraySize(self.array_size));
                }
            }
            TextureDimension::Texture3D => {
                if self.height == 0 {
                    return Err(invalid("height must be non-zero"));
                }
                if self.depth == 0 {
                    return Err(invalid("depth must be non-zero"));
                }
                if self.array_size != 1 {
                    return Err(invalid("array size must be 1"));
                }
            }
        }
        let mip_levels = calculate_mip_levels(
            self.width,
            self.height,
            self.depth,
            MipMapCount::from(self.mip_levels),
        )?;
        Ok(Self { mip_levels, ..*self })
    }

    /// Bytes per row of the top level (`width * size_in_bytes`).
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.format.size_in_bytes()
    }

    /// Bytes of one top-level 2D slice (`row_stride * height`).
    #[inline]
    pub fn total_size_in_bytes(&self) -> usize {
        self.row_stride() * self.height as usize
    }

    /// Number of cube maps in a cube texture array, 0 for other dimensions.
    #[inline]
    pub fn cube_count(&self) -> u32 {
        match self.dimension {
            TextureDimension::TextureCube => self.array_size / 6,
            _ => 0,
        }
    }
}

impl fmt::Display for ImageDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dimension: {}, Width: {}, Height: {}, Depth: {}, \
             Format: {}, ArraySize: {}, MipLevels: {}",
            self.dimension,
            self.width,
            self.height,
            self.depth,
            self.format,
            self.array_size,
            self.mip_levels
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display_format() {
        let desc =
            ImageDescription::new_2d(4, 4, MipMapCount::Auto, SurfaceFormat::R8G8B8A8Unorm, 1)
                .validate()
                .unwrap();
        assert_eq!(
            format!("{desc}"),
            "Dimension: Texture2D, Width: 4, Height: 4, Depth: 1, \
             Format: R8G8B8A8Unorm, ArraySize: 1, MipLevels: 3"
        );
    }

    #[test]
    fn cube_requires_multiple_of_six() {
        let mut desc =
            ImageDescription::new_cube(8, MipMapCount::Count(1), SurfaceFormat::R8Unorm, 1);
        assert_eq!(desc.array_size, 6);
        assert!(desc.validate().is_ok());
        desc.array_size = 7;
        assert_eq!(desc.validate(), Err(ImageError::InvalidCubeArraySize(7)));
    }

    #[test]
    fn dimension_constraints() {
        let mut d1 = ImageDescription::new_1d(8, MipMapCount::Auto, SurfaceFormat::R8Unorm, 1);
        d1.height = 2;
        assert!(matches!(
            d1.validate(),
            Err(ImageError::InvalidDescription {
                dimension: TextureDimension::Texture1D,
                ..
            })
        ));

        let mut d3 = ImageDescription::new_3d(4, 4, 4, MipMapCount::Auto, SurfaceFormat::R8Unorm);
        assert_eq!(d3.validate().unwrap().mip_levels, 3);
        d3.array_size = 2;
        assert!(d3.validate().is_err());

        let d2 = ImageDescription::new_2d(0, 4, MipMapCount::Auto, SurfaceFormat::R8Unorm, 1);
        assert!(d2.validate().is_err());
        let d2 = ImageDescription::new_2d(4, 4, MipMapCount::Auto, SurfaceFormat::R8Unorm, 0);
        assert!(d2.validate().is_err());
    }

    #[test]
    fn undefined_format_rejected() {
        let d = ImageDescription::default_2d(4, 4, SurfaceFormat::Undefined);
        assert_eq!(
            d.validate(),
            Err(ImageError::UnsupportedFormat(SurfaceFormat::Undefined))
        );
    }

    #[test]
    fn mip_levels_resolved_and_bounded() {
        let d = ImageDescription::new_2d(16, 8, MipMapCount::Auto, SurfaceFormat::R8Unorm, 1);
        assert_eq!(d.mip_levels, 0);
        assert_eq!(d.validate().unwrap().mip_levels, 5);
        let d = ImageDescription::new_2d(16, 8, MipMapCount::Count(6), SurfaceFormat::R8Unorm, 1);
        assert!(matches!(
            d.validate(),
            Err(ImageError::TooManyMipLevels { requested: 6, max: 5 })
        ));
    }

    #[test]
    fn strides() {
        let d = ImageDescription::default_2d(10, 3, SurfaceFormat::B8G8R8A8Unorm);
        assert_eq!(d.row_stride(), 40);
        assert_eq!(d.total_size_in_bytes(), 120);
        assert_eq!(d.cube_count(), 0);
    }
}

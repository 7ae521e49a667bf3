//! Byte layout of every pixel buffer inside an image allocation.
//!
//! Buffers are stored array slice by array slice; inside a slice, mip level
//! by mip level; inside a level, z slice by z slice. All z slices of one level
//! are therefore contiguous, which is what a [`DataBox`](crate::DataBox)
//! exposes to upload paths.
//!
//! Lookup is O(1): `array * buffers_per_array + mip_to_z[mip] + z`.

use alloc::vec::Vec;

use crate::image::DATA_ALIGN;
use crate::mipmap::{MipChain, MipMapDescription};
use crate::pitch::{PitchFlags, compute_pitch};
use crate::{AnimatedImageDescription, ImageDescription, ImageError, TextureDimension};

/// Largest pixel data an [`Image`](crate::Image) can allocate, leaving room
/// for its alignment padding below `isize::MAX`.
const MAX_TOTAL_SIZE: usize = isize::MAX as usize - DATA_ALIGN;

/// Placement of one pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferLayout {
    /// Byte offset from the start of the image data.
    pub offset: usize,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Bytes per row (block row for compressed formats).
    pub row_pitch: usize,
    /// Bytes of the whole buffer.
    pub slice_pitch: usize,
    /// Mip level the buffer belongs to.
    pub mip_level: u32,
}

/// Offsets and pitches for every pixel buffer of an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageLayout {
    description: ImageDescription,
    flags: PitchFlags,
    mips: Vec<MipMapDescription>,
    /// First buffer index of each mip inside one array slice, followed by the
    /// number of buffers per array slice.
    mip_to_z: Vec<usize>,
    buffers: Vec<BufferLayout>,
    total_size: usize,
}

impl ImageLayout {
    /// Lay out all array slices, mip levels and z slices of `description`.
    ///
    /// The description is validated first; the stored copy has `mip_levels`
    /// resolved.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageDescription::validate`], or
    /// [`ImageError::SizeOverflow`] if the total size does not fit in `usize`.
    pub fn compute(description: &ImageDescription, flags: PitchFlags) -> Result<Self, ImageError> {
        let description = description.validate()?;
        let mips = MipChain::new(
            description.width,
            description.height,
            description.depth,
            description.mip_levels,
        )
        .map(|(w, h, d)| MipMapDescription::new(description.format, w, h, d, flags))
        .collect::<Result<Vec<_>, _>>()?;

        let mut mip_to_z = Vec::with_capacity(mips.len() + 1);
        let mut per_array = 0usize;
        let mut buffers_per_array = 0usize;
        for mip in &mips {
            mip_to_z.push(buffers_per_array);
            buffers_per_array += mip.depth as usize;
            per_array = mip
                .slice_pitch
                .checked_mul(mip.depth as usize)
                .and_then(|level| per_array.checked_add(level))
                .ok_or(ImageError::SizeOverflow)?;
        }
        mip_to_z.push(buffers_per_array);

        let total_size = per_array
            .checked_mul(description.array_size as usize)
            .filter(|&total| total <= MAX_TOTAL_SIZE)
            .ok_or(ImageError::SizeOverflow)?;
        let count = buffers_per_array
            .checked_mul(description.array_size as usize)
            .ok_or(ImageError::SizeOverflow)?;

        let mut buffers = Vec::with_capacity(count);
        let mut offset = 0usize;
        for _ in 0..description.array_size {
            for (level, mip) in mips.iter().enumerate() {
                for _ in 0..mip.depth {
                    buffers.push(BufferLayout {
                        offset,
                        width: mip.width,
                        height: mip.height,
                        row_pitch: mip.row_pitch,
                        slice_pitch: mip.slice_pitch,
                        mip_level: level as u32,
                    });
                    offset += mip.slice_pitch;
                }
            }
        }
        debug_assert_eq!(offset, total_size);

        log::trace!(
            "layout for {description}: {} buffers, {total_size} bytes",
            buffers.len()
        );
        Ok(Self {
            description,
            flags,
            mips,
            mip_to_z,
            buffers,
            total_size,
        })
    }

    /// Lay out an animation: one buffer per frame, sized to the frame and
    /// stored back to back.
    ///
    /// The canvas must be a single-level, single-slice 2D description.
    ///
    /// # Errors
    ///
    /// - [`ImageError::NoFrames`] for an empty frame list
    /// - [`ImageError::InvalidDescription`] for a canvas that is not a single 2D level
    /// - [`ImageError::FrameOutsideCanvas`] for frames that leave the canvas
    pub fn compute_frames(
        canvas: &ImageDescription,
        frames: &[AnimatedImageDescription],
        flags: PitchFlags,
    ) -> Result<Self, ImageError> {
        if frames.is_empty() {
            return Err(ImageError::NoFrames);
        }
        let mut canvas = ImageDescription {
            array_size: 1,
            ..*canvas
        };
        if canvas.dimension != TextureDimension::Texture2D {
            return Err(ImageError::InvalidDescription {
                dimension: canvas.dimension,
                reason: "animation canvas must be a 2D texture",
            });
        }
        if canvas.mip_levels > 1 {
            return Err(ImageError::InvalidDescription {
                dimension: canvas.dimension,
                reason: "animation canvas must have one mip level",
            });
        }
        canvas.mip_levels = 1;
        let canvas = canvas.validate()?;

        let mut buffers = Vec::with_capacity(frames.len());
        let mut offset = 0usize;
        for (index, frame) in frames.iter().enumerate() {
            if !frame.fits_in(canvas.width, canvas.height) {
                return Err(ImageError::FrameOutsideCanvas {
                    index,
                    width: frame.width,
                    height: frame.height,
                    x_offset: frame.x_offset,
                    y_offset: frame.y_offset,
                });
            }
            let pitch = compute_pitch(canvas.format, frame.width, frame.height, flags)?;
            buffers.push(BufferLayout {
                offset,
                width: frame.width,
                height: frame.height,
                row_pitch: pitch.row,
                slice_pitch: pitch.slice,
                mip_level: 0,
            });
            offset = offset
                .checked_add(pitch.slice)
                .ok_or(ImageError::SizeOverflow)?;
        }
        if offset > MAX_TOTAL_SIZE {
            return Err(ImageError::SizeOverflow);
        }
        let array_size = u32::try_from(frames.len()).map_err(|_| ImageError::SizeOverflow)?;
        let mips = alloc::vec![MipMapDescription::new(
            canvas.format,
            canvas.width,
            canvas.height,
            1,
            flags
        )?];

        log::trace!("layout for {} frames on {canvas}: {offset} bytes", frames.len());
        Ok(Self {
            description: ImageDescription {
                array_size,
                ..canvas
            },
            flags,
            mips,
            mip_to_z: alloc::vec![0, 1],
            buffers,
            total_size: offset,
        })
    }

    /// Validated description with resolved mip count.
    #[inline]
    pub fn description(&self) -> &ImageDescription {
        &self.description
    }

    /// Pitch options the layout was computed with.
    #[inline]
    pub fn flags(&self) -> PitchFlags {
        self.flags
    }

    /// Bytes needed for every pixel buffer.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// All buffers in storage order.
    #[inline]
    pub fn buffers(&self) -> &[BufferLayout] {
        &self.buffers
    }

    /// Per-level extents and pitches.
    #[inline]
    pub fn mip_levels(&self) -> &[MipMapDescription] {
        &self.mips
    }

    /// First buffer index of each mip level inside an array slice, with the
    /// buffer count per array slice as the final entry.
    #[inline]
    pub fn mip_to_z(&self) -> &[usize] {
        &self.mip_to_z
    }

    /// Number of buffers in one array slice (every z slice of every mip).
    #[inline]
    pub fn buffers_per_array(&self) -> usize {
        self.mip_to_z[self.mip_to_z.len() - 1]
    }

    /// Flat buffer index of `(array, z, mip)`.
    ///
    /// `z` is checked against the depth of the addressed level, not the top
    /// level.
    ///
    /// # Errors
    ///
    /// [`ImageError::SubresourceOutOfRange`] naming the first index out of range.
    pub fn index_of(&self, array: u32, z: u32, mip: u32) -> Result<usize, ImageError> {
        let levels = self.mips.len() as u32;
        if mip >= levels {
            return Err(ImageError::SubresourceOutOfRange {
                what: "mip",
                index: mip,
                count: levels,
            });
        }
        if array >= self.description.array_size {
            return Err(ImageError::SubresourceOutOfRange {
                what: "array",
                index: array,
                count: self.description.array_size,
            });
        }
        let depth = self.mips[mip as usize].depth;
        if z >= depth {
            return Err(ImageError::SubresourceOutOfRange {
                what: "z slice",
                index: z,
                count: depth,
            });
        }
        Ok(array as usize * self.buffers_per_array() + self.mip_to_z[mip as usize] + z as usize)
    }

    /// Flat buffer index of `(array_or_z, mip)`: a z slice for volume
    /// textures, an array slice otherwise.
    pub fn index_of_slice(&self, array_or_z: u32, mip: u32) -> Result<usize, ImageError> {
        if self.description.dimension == TextureDimension::Texture3D {
            self.index_of(0, array_or_z, mip)
        } else {
            self.index_of(array_or_z, 0, mip)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MipMapCount, SurfaceFormat};

    fn layout(desc: ImageDescription) -> ImageLayout {
        ImageLayout::compute(&desc, PitchFlags::none()).unwrap()
    }

    #[test]
    fn mip_chain_2d() {
        let l = layout(ImageDescription::new_2d(
            4,
            4,
            MipMapCount::Auto,
            SurfaceFormat::R8G8B8A8Unorm,
            1,
        ));
        assert_eq!(l.description().mip_levels, 3);
        assert_eq!(l.total_size(), 64 + 16 + 4);
        let offsets: Vec<_> = l.buffers().iter().map(|b| b.offset).collect();
        assert_eq!(offsets, [0, 64, 80]);
        assert_eq!(l.mip_to_z(), [0, 1, 2, 3]);
    }

    #[test]
    fn array_of_mips() {
        let l = layout(ImageDescription::new_2d(
            2,
            2,
            MipMapCount::Auto,
            SurfaceFormat::R8Unorm,
            3,
        ));
        // Each slice: 4 + 1 bytes, 2 buffers.
        assert_eq!(l.total_size(), 15);
        assert_eq!(l.buffers().len(), 6);
        assert_eq!(l.buffers_per_array(), 2);
        assert_eq!(l.index_of(2, 0, 1).unwrap(), 5);
        assert_eq!(l.buffers()[5].offset, 14);
        assert_eq!(l.buffers()[5].mip_level, 1);
    }

    #[test]
    fn volume_slices_shrink_per_mip() {
        let l = layout(ImageDescription::new_3d(
            4,
            4,
            4,
            MipMapCount::Auto,
            SurfaceFormat::R8Unorm,
        ));
        // depth 4 + 2 + 1 buffers
        assert_eq!(l.buffers().len(), 7);
        assert_eq!(l.mip_to_z(), [0, 4, 6, 7]);
        assert_eq!(l.index_of(0, 3, 0).unwrap(), 3);
        assert_eq!(l.index_of(0, 1, 1).unwrap(), 5);
        assert_eq!(l.index_of_slice(1, 1).unwrap(), 5);
        assert_eq!(l.total_size(), 64 + 8 + 1);
    }

    #[test]
    fn z_checked_against_level_depth() {
        let l = layout(ImageDescription::new_3d(
            4,
            4,
            4,
            MipMapCount::Auto,
            SurfaceFormat::R8Unorm,
        ));
        assert_eq!(
            l.index_of(0, 2, 1),
            Err(ImageError::SubresourceOutOfRange {
                what: "z slice",
                index: 2,
                count: 2
            })
        );
        assert!(l.index_of(0, 0, 3).is_err());
        assert!(l.index_of(1, 0, 0).is_err());
    }

    #[test]
    fn cube_faces() {
        let l = layout(ImageDescription::new_cube(
            4,
            MipMapCount::Count(1),
            SurfaceFormat::R8G8B8A8Unorm,
            1,
        ));
        assert_eq!(l.buffers().len(), 6);
        assert_eq!(l.index_of_slice(5, 0).unwrap(), 5);
        assert_eq!(l.buffers()[5].offset, 5 * 64);
    }

    #[test]
    fn compressed_levels() {
        let l = layout(ImageDescription::new_2d(
            8,
            8,
            MipMapCount::Auto,
            SurfaceFormat::Bc1RgbaUnorm,
            1,
        ));
        // 8x8 = 2x2 blocks, then 1 block for 4x4, 2x2 and 1x1.
        assert_eq!(l.total_size(), 32 + 8 + 8 + 8);
        assert_eq!(l.mip_levels()[3].width_packed, 1);
    }

    #[test]
    fn pitch_flags_apply_to_every_level() {
        let desc = ImageDescription::new_2d(3, 1, MipMapCount::Auto, SurfaceFormat::R8Unorm, 1);
        let l = ImageLayout::compute(&desc, PitchFlags::none().with_legacy_dword(true)).unwrap();
        assert_eq!(l.mip_levels()[0].row_pitch, 4);
        assert_eq!(l.mip_levels()[1].row_pitch, 4);
        assert_eq!(l.total_size(), 8);
    }

    #[test]
    fn frames_back_to_back() {
        let canvas = ImageDescription::default_2d(8, 8, SurfaceFormat::R8Unorm);
        let frames = [
            AnimatedImageDescription::new(8, 8),
            AnimatedImageDescription::new(2, 3).with_offset(6, 5),
        ];
        let l = ImageLayout::compute_frames(&canvas, &frames, PitchFlags::none()).unwrap();
        assert_eq!(l.description().array_size, 2);
        assert_eq!(l.total_size(), 64 + 6);
        assert_eq!(l.buffers()[1].offset, 64);
        assert_eq!(l.buffers()[1].width, 2);
        assert_eq!(l.index_of(1, 0, 0).unwrap(), 1);
    }

    #[test]
    fn frames_must_fit_canvas() {
        let canvas = ImageDescription::default_2d(8, 8, SurfaceFormat::R8Unorm);
        let frames = [AnimatedImageDescription::new(4, 4).with_offset(5, 0)];
        assert!(matches!(
            ImageLayout::compute_frames(&canvas, &frames, PitchFlags::none()),
            Err(ImageError::FrameOutsideCanvas { index: 0, .. })
        ));
        assert_eq!(
            ImageLayout::compute_frames(&canvas, &[], PitchFlags::none()),
            Err(ImageError::NoFrames)
        );
    }

    #[test]
    fn canvas_must_be_single_level_2d() {
        let canvas = ImageDescription::new_2d(8, 8, MipMapCount::Auto, SurfaceFormat::R8Unorm, 1);
        let frames = [AnimatedImageDescription::new(8, 8)];
        // Auto (0) is treated as one level for a canvas.
        assert!(ImageLayout::compute_frames(&canvas, &frames, PitchFlags::none()).is_ok());
        let canvas =
            ImageDescription::new_2d(8, 8, MipMapCount::Count(2), SurfaceFormat::R8Unorm, 1);
        assert!(ImageLayout::compute_frames(&canvas, &frames, PitchFlags::none()).is_err());
        let canvas =
            ImageDescription::new_3d(8, 8, 2, MipMapCount::Count(1), SurfaceFormat::R8Unorm);
        assert!(ImageLayout::compute_frames(&canvas, &frames, PitchFlags::none()).is_err());
    }

    #[test]
    fn total_past_isize_max_reported() {
        // 2^30 x 2^29 texels of 16 bytes: 2^63 bytes, one past isize::MAX.
        let desc = ImageDescription::new_2d(
            1 << 30,
            1 << 29,
            MipMapCount::Count(1),
            SurfaceFormat::R32G32B32A32Sfloat,
            1,
        );
        assert_eq!(
            ImageLayout::compute(&desc, PitchFlags::none()),
            Err(ImageError::SizeOverflow)
        );
    }

    #[test]
    fn overflow_reported() {
        let desc = ImageDescription::new_2d(
            u32::MAX,
            u32::MAX,
            MipMapCount::Count(1),
            SurfaceFormat::R32G32B32A32Sfloat,
            1,
        );
        assert_eq!(
            ImageLayout::compute(&desc, PitchFlags::none()),
            Err(ImageError::SizeOverflow)
        );
    }
}

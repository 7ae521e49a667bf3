//! The owning texture container.
//!
//! An [`Image`] owns one contiguous allocation holding every pixel buffer,
//! laid out by [`ImageLayout`]. Views ([`PixelBuffer`], [`PixelBufferMut`],
//! [`DataBox`]) borrow from it.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::array::{IterMut, PixelBufferArray};
use crate::buffer::BufferInfo;
use crate::layout::ImageLayout;
use crate::mipmap::{MipMapCount, MipMapDescription};
use crate::pitch::PitchFlags;
use crate::{
    AnimatedImageDescription, ImageDescription, ImageError, PixelBuffer, PixelBufferMut,
    ResourceLimits, SurfaceFormat,
};

/// Alignment of freshly allocated pixel data.
pub(crate) const DATA_ALIGN: usize = 16;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Construction options for [`Image`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ImageOptions {
    /// Pitch rules applied to every level.
    pub pitch_flags: PitchFlags,
    /// Caps checked before allocating.
    pub limits: ResourceLimits,
}

impl ImageOptions {
    /// Default pitch rules, no limits.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the pitch rules.
    pub fn with_pitch_flags(mut self, flags: PitchFlags) -> Self {
        self.pitch_flags = flags;
        self
    }

    /// Set the resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

// ---------------------------------------------------------------------------
// DataBox
// ---------------------------------------------------------------------------

/// One array slice × mip level in upload form: offset plus pitches, covering
/// every z slice of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataBox<'a> {
    /// Byte offset from the start of [`Image::data`].
    pub offset: usize,
    /// Bytes per row (block row for compressed formats).
    pub row_pitch: usize,
    /// Bytes per z slice.
    pub slice_pitch: usize,
    /// Bytes of every z slice of the level.
    pub data: &'a [u8],
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// Placement and metadata of one pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) info: BufferInfo,
}

/// CPU-side texture: all mip levels, array slices, cube faces and z slices
/// in one allocation.
///
/// # Example
///
/// ```
/// use zentexture::{Image, ImageDescription, MipMapCount, SurfaceFormat};
///
/// let image = Image::new(&ImageDescription::new_2d(
///     4,
///     4,
///     MipMapCount::Auto,
///     SurfaceFormat::R8G8B8A8Unorm,
///     1,
/// ))?;
/// assert_eq!(image.description().mip_levels, 3);
/// assert_eq!(image.total_size_in_bytes(), 64 + 16 + 4);
/// # Ok::<(), zentexture::ImageError>(())
/// ```
pub struct Image {
    data: Vec<u8>,
    /// Byte offset from `data` start to the first pixel buffer.
    offset: usize,
    layout: ImageLayout,
    slots: Vec<Slot>,
    animation: Option<Animation>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Animation {
    default_frame: Option<usize>,
}

impl Image {
    // --- Construction ---

    /// Allocate a zero-filled image, aligned to 16 bytes.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageLayout::compute`].
    pub fn new(description: &ImageDescription) -> Result<Self, ImageError> {
        Self::new_with_options(description, ImageOptions::none())
    }

    /// [`new`](Self::new) with pitch flags and limits.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageLayout::compute`], or [`ImageError::Limit`].
    pub fn new_with_options(
        description: &ImageDescription,
        options: ImageOptions,
    ) -> Result<Self, ImageError> {
        let layout = Self::checked_layout(description, options)?;
        let (data, offset) = allocate(layout.total_size())?;
        log::debug!(
            "allocated {} bytes for {}",
            layout.total_size(),
            layout.description()
        );
        Ok(Self::assemble(data, offset, layout, None))
    }

    /// Adopt caller storage; pixel data starts at `offset` into `data`.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageLayout::compute`], or
    /// [`ImageError::InsufficientData`] if `data` is too short.
    pub fn from_vec(
        description: &ImageDescription,
        data: Vec<u8>,
        offset: usize,
    ) -> Result<Self, ImageError> {
        Self::from_vec_with_options(description, data, offset, ImageOptions::none())
    }

    /// [`from_vec`](Self::from_vec) with pitch flags and limits.
    pub fn from_vec_with_options(
        description: &ImageDescription,
        data: Vec<u8>,
        offset: usize,
        options: ImageOptions,
    ) -> Result<Self, ImageError> {
        let layout = Self::checked_layout(description, options)?;
        let required = offset
            .checked_add(layout.total_size())
            .ok_or(ImageError::SizeOverflow)?;
        if data.len() < required {
            return Err(ImageError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        if data.len() > required {
            log::warn!(
                "adopted buffer has {} bytes past the image data",
                data.len() - required
            );
        }
        log::debug!(
            "adopted {} bytes at offset {offset} for {}",
            data.len(),
            layout.description()
        );
        Ok(Self::assemble(data, offset, layout, None))
    }

    /// Copy `bytes` into a fresh aligned allocation.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageLayout::compute`], or
    /// [`ImageError::InsufficientData`] if `bytes` is too short.
    pub fn from_bytes(description: &ImageDescription, bytes: &[u8]) -> Result<Self, ImageError> {
        Self::from_bytes_with_options(description, bytes, ImageOptions::none())
    }

    /// [`from_bytes`](Self::from_bytes) with pitch flags and limits.
    pub fn from_bytes_with_options(
        description: &ImageDescription,
        bytes: &[u8],
        options: ImageOptions,
    ) -> Result<Self, ImageError> {
        let layout = Self::checked_layout(description, options)?;
        let total = layout.total_size();
        if bytes.len() < total {
            return Err(ImageError::InsufficientData {
                required: total,
                actual: bytes.len(),
            });
        }
        let (mut data, offset) = allocate(total)?;
        data[offset..offset + total].copy_from_slice(&bytes[..total]);
        log::debug!("copied {total} bytes for {}", layout.description());
        Ok(Self::assemble(data, offset, layout, None))
    }

    /// 1D texture (array).
    pub fn new_1d(
        width: u32,
        mip_map_count: impl Into<MipMapCount>,
        format: SurfaceFormat,
        array_size: u32,
    ) -> Result<Self, ImageError> {
        Self::new(&ImageDescription::new_1d(
            width,
            mip_map_count.into(),
            format,
            array_size,
        ))
    }

    /// 2D texture (array).
    pub fn new_2d(
        width: u32,
        height: u32,
        mip_map_count: impl Into<MipMapCount>,
        format: SurfaceFormat,
        array_size: u32,
    ) -> Result<Self, ImageError> {
        Self::new(&ImageDescription::new_2d(
            width,
            height,
            mip_map_count.into(),
            format,
            array_size,
        ))
    }

    /// Cube map (array) of `cube_count` cubes.
    pub fn new_cube(
        size: u32,
        mip_map_count: impl Into<MipMapCount>,
        format: SurfaceFormat,
        cube_count: u32,
    ) -> Result<Self, ImageError> {
        Self::new(&ImageDescription::new_cube(
            size,
            mip_map_count.into(),
            format,
            cube_count,
        ))
    }

    /// Volume texture.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        mip_map_count: impl Into<MipMapCount>,
        format: SurfaceFormat,
    ) -> Result<Self, ImageError> {
        Self::new(&ImageDescription::new_3d(
            width,
            height,
            depth,
            mip_map_count.into(),
            format,
        ))
    }

    /// Multi-frame image on a single-level 2D canvas.
    ///
    /// Each frame becomes one zero-filled pixel buffer sized to the frame;
    /// the stored description has `array_size == frames.len()`.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageLayout::compute_frames`], or [`ImageError::Limit`].
    pub fn new_animated(
        canvas: &ImageDescription,
        frames: &[AnimatedImageDescription],
    ) -> Result<Self, ImageError> {
        Self::new_animated_with_options(canvas, frames, ImageOptions::none())
    }

    /// [`new_animated`](Self::new_animated) with pitch flags and limits.
    pub fn new_animated_with_options(
        canvas: &ImageDescription,
        frames: &[AnimatedImageDescription],
        options: ImageOptions,
    ) -> Result<Self, ImageError> {
        let limits = options.limits;
        limits.check_dimensions(canvas.width, canvas.height, 1)?;
        limits.check_frames(u32::try_from(frames.len()).unwrap_or(u32::MAX))?;
        limits.check_duration(frames.iter().map(|f| f.delay_ms() as u64).sum())?;
        let layout = ImageLayout::compute_frames(canvas, frames, options.pitch_flags)?;
        limits.check_memory(layout.total_size() as u64)?;
        let (data, offset) = allocate(layout.total_size())?;
        log::debug!(
            "allocated {} bytes for {} frames on {}",
            layout.total_size(),
            frames.len(),
            layout.description()
        );
        let animation = Animation {
            default_frame: None,
        };
        let mut image = Self::assemble(data, offset, layout, Some(animation));
        for (slot, frame) in image.slots.iter_mut().zip(frames) {
            slot.info.x_offset = frame.x_offset;
            slot.info.y_offset = frame.y_offset;
            slot.info.delay_numerator = frame.delay_numerator;
            slot.info.delay_denominator = frame.delay_denominator;
            slot.info.sequence_number = frame.sequence_number;
        }
        Ok(image)
    }

    fn checked_layout(
        description: &ImageDescription,
        options: ImageOptions,
    ) -> Result<ImageLayout, ImageError> {
        options.limits.check_description(description)?;
        let layout = ImageLayout::compute(description, options.pitch_flags)?;
        options.limits.check_memory(layout.total_size() as u64)?;
        if let Some(bpp) = options.pitch_flags.bpp_override
            && !description.format.is_compressed()
            && !description.format.is_packed()
            && bpp.bits() != description.format.size_in_bits()
        {
            log::warn!(
                "{} stored with {} bits per texel; typed pixel access will not match the rows",
                description.format,
                bpp.bits()
            );
        }
        Ok(layout)
    }

    fn assemble(
        data: Vec<u8>,
        offset: usize,
        layout: ImageLayout,
        animation: Option<Animation>,
    ) -> Self {
        let format = layout.description().format;
        let slots = layout
            .buffers()
            .iter()
            .map(|b| Slot {
                offset: b.offset,
                len: b.slice_pitch,
                info: BufferInfo {
                    width: b.width,
                    height: b.height,
                    format,
                    row_stride: b.row_pitch,
                    mip_level: b.mip_level,
                    x_offset: 0,
                    y_offset: 0,
                    delay_numerator: 0,
                    delay_denominator: 0,
                    sequence_number: 0,
                },
            })
            .collect();
        Self {
            data,
            offset,
            layout,
            slots,
            animation,
        }
    }

    // --- Queries ---

    /// Validated description with resolved mip count.
    #[inline]
    pub fn description(&self) -> &ImageDescription {
        self.layout.description()
    }

    /// Offsets and pitches of every buffer.
    #[inline]
    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    /// Bytes of pixel data (all buffers).
    #[inline]
    pub fn total_size_in_bytes(&self) -> usize {
        self.layout.total_size()
    }

    /// Offset of the pixel data inside the backing vector.
    #[inline]
    pub fn data_offset(&self) -> usize {
        self.offset
    }

    /// All pixel data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[self.offset..self.offset + self.layout.total_size()]
    }

    /// All pixel data, writable.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        let end = self.offset + self.layout.total_size();
        &mut self.data[self.offset..end]
    }

    /// Extent and pitch of mip `level`.
    ///
    /// # Errors
    ///
    /// [`ImageError::SubresourceOutOfRange`] past the last level.
    pub fn mip_map_description(&self, level: u32) -> Result<MipMapDescription, ImageError> {
        let mips = self.layout.mip_levels();
        mips.get(level as usize)
            .copied()
            .ok_or(ImageError::SubresourceOutOfRange {
                what: "mip",
                index: level,
                count: mips.len() as u32,
            })
    }

    /// Extents and pitches of every level.
    #[inline]
    pub fn mip_map_descriptions(&self) -> &[MipMapDescription] {
        self.layout.mip_levels()
    }

    /// Number of pixel buffers.
    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.slots.len()
    }

    /// Every pixel buffer.
    #[inline]
    pub fn pixel_buffers(&self) -> PixelBufferArray<'_> {
        PixelBufferArray::new(self)
    }

    /// Every pixel buffer, writable and disjoint.
    pub fn pixel_buffers_mut(&mut self) -> IterMut<'_> {
        let end = self.offset + self.layout.total_size();
        IterMut::new(&mut self.data[self.offset..end], &self.slots)
    }

    /// Buffer at flat storage `index`.
    ///
    /// # Errors
    ///
    /// [`ImageError::BufferIndexOutOfRange`].
    pub fn buffer(&self, index: usize) -> Result<PixelBuffer<'_>, ImageError> {
        self.check_index(index)?;
        Ok(self.view(index))
    }

    /// Writable buffer at flat storage `index`.
    pub fn buffer_mut(&mut self, index: usize) -> Result<PixelBufferMut<'_>, ImageError> {
        self.check_index(index)?;
        Ok(self.view_mut(index))
    }

    /// Buffer for `(array_or_z, mip)`: a z slice for volume textures, an
    /// array slice (or frame) otherwise.
    ///
    /// # Errors
    ///
    /// [`ImageError::SubresourceOutOfRange`].
    pub fn pixel_buffer(&self, array_or_z: u32, mip: u32) -> Result<PixelBuffer<'_>, ImageError> {
        let index = self.layout.index_of_slice(array_or_z, mip)?;
        Ok(self.view(index))
    }

    /// Buffer for `(array, z, mip)`; `z` is checked against the depth of `mip`.
    ///
    /// # Errors
    ///
    /// [`ImageError::SubresourceOutOfRange`].
    pub fn pixel_buffer_at(
        &self,
        array: u32,
        z: u32,
        mip: u32,
    ) -> Result<PixelBuffer<'_>, ImageError> {
        let index = self.layout.index_of(array, z, mip)?;
        Ok(self.view(index))
    }

    /// Writable form of [`pixel_buffer`](Self::pixel_buffer).
    pub fn pixel_buffer_mut(
        &mut self,
        array_or_z: u32,
        mip: u32,
    ) -> Result<PixelBufferMut<'_>, ImageError> {
        let index = self.layout.index_of_slice(array_or_z, mip)?;
        Ok(self.view_mut(index))
    }

    /// Writable form of [`pixel_buffer_at`](Self::pixel_buffer_at).
    pub fn pixel_buffer_at_mut(
        &mut self,
        array: u32,
        z: u32,
        mip: u32,
    ) -> Result<PixelBufferMut<'_>, ImageError> {
        let index = self.layout.index_of(array, z, mip)?;
        Ok(self.view_mut(index))
    }

    /// One [`DataBox`] per array slice × mip level (per frame for animated
    /// images), in storage order.
    pub fn data_boxes(&self) -> Vec<DataBox<'_>> {
        let per_array = self.layout.buffers_per_array();
        let mip_to_z = self.layout.mip_to_z();
        let data = self.data();
        let mut boxes =
            Vec::with_capacity(self.description().array_size as usize * (mip_to_z.len() - 1));
        for array in 0..self.description().array_size as usize {
            for level in mip_to_z.windows(2) {
                let first = &self.slots[array * per_array + level[0]];
                let last = &self.slots[array * per_array + level[1] - 1];
                let end = last.offset + last.len;
                boxes.push(DataBox {
                    offset: first.offset,
                    row_pitch: first.info.row_stride,
                    slice_pitch: first.len,
                    data: &data[first.offset..end],
                });
            }
        }
        boxes
    }

    /// Copy `src` into buffer `index` and adopt its extent and format.
    ///
    /// # Errors
    ///
    /// [`ImageError::BufferIndexOutOfRange`], or
    /// [`ImageError::StrideMismatch`] if the buffer strides differ.
    pub fn apply_pixel_buffer(
        &mut self,
        src: &PixelBuffer<'_>,
        index: usize,
    ) -> Result<(), ImageError> {
        self.check_index(index)?;
        let slot = self.slots[index];
        if src.buffer_stride() != slot.len {
            return Err(ImageError::StrideMismatch {
                source_stride: src.buffer_stride(),
                destination_stride: slot.len,
            });
        }
        let start = self.offset + slot.offset;
        self.data[start..start + slot.len].copy_from_slice(src.data());
        let info = &mut self.slots[index].info;
        info.width = src.width();
        info.height = src.height();
        info.format = src.format();
        info.row_stride = src.row_stride();
        log::trace!("buffer {index} replaced by {src:?}");
        Ok(())
    }

    /// Reinterpret buffer `index` as another format of the same pixel size.
    ///
    /// # Errors
    ///
    /// [`ImageError::BufferIndexOutOfRange`],
    /// [`ImageError::UnsupportedFormat`], or
    /// [`ImageError::PixelSizeMismatch`] if the sizes differ.
    pub fn reinterpret_format(
        &mut self,
        index: usize,
        format: SurfaceFormat,
    ) -> Result<(), ImageError> {
        self.check_index(index)?;
        if !format.is_valid() {
            return Err(ImageError::UnsupportedFormat(format));
        }
        let info = &mut self.slots[index].info;
        if info.format.size_in_bits() != format.size_in_bits() {
            return Err(ImageError::PixelSizeMismatch {
                expected: info.format.size_in_bytes(),
                actual: format.size_in_bytes(),
            });
        }
        if !info.format.is_layout_compatible(format) {
            return Err(ImageError::FormatMismatch {
                source_format: info.format,
                destination_format: format,
            });
        }
        info.format = format;
        Ok(())
    }

    /// Release the backing vector. Pixel data starts at
    /// [`data_offset`](Self::data_offset).
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    // --- Animation ---

    /// Whether the image was built with [`new_animated`](Self::new_animated).
    #[inline]
    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    /// Number of stored frames, including a default frame; 0 for still images.
    #[inline]
    pub fn frame_count(&self) -> usize {
        if self.is_animated() { self.slots.len() } else { 0 }
    }

    /// Mark frame `index` as the default image shown by decoders without
    /// animation support; it is excluded from the animation sequence.
    /// `None` clears the mark.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoFrames`] for still images, or
    /// [`ImageError::BufferIndexOutOfRange`].
    pub fn set_default_frame(&mut self, index: Option<usize>) -> Result<(), ImageError> {
        let count = self.slots.len();
        let animation = self.animation.as_mut().ok_or(ImageError::NoFrames)?;
        if let Some(index) = index
            && index >= count
        {
            return Err(ImageError::BufferIndexOutOfRange { index, count });
        }
        animation.default_frame = index;
        Ok(())
    }

    /// Index of the default frame.
    #[inline]
    pub fn default_frame_index(&self) -> Option<usize> {
        self.animation.and_then(|a| a.default_frame)
    }

    /// The default frame.
    pub fn default_frame(&self) -> Option<PixelBuffer<'_>> {
        self.default_frame_index().map(|index| self.view(index))
    }

    /// Frames of the animation sequence, skipping the default frame.
    pub fn animation_frames(&self) -> impl Iterator<Item = PixelBuffer<'_>> + '_ {
        let default = self.default_frame_index();
        let count = self.frame_count();
        (0..count)
            .filter(move |&i| Some(i) != default)
            .map(move |i| self.view(i))
    }

    /// Sum of the frame delays of the animation sequence.
    pub fn animation_duration_ms(&self) -> u64 {
        self.animation_frames().map(|f| f.delay_ms() as u64).sum()
    }

    // --- Internal ---

    fn check_index(&self, index: usize) -> Result<(), ImageError> {
        if index >= self.slots.len() {
            return Err(ImageError::BufferIndexOutOfRange {
                index,
                count: self.slots.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn view(&self, index: usize) -> PixelBuffer<'_> {
        let slot = &self.slots[index];
        let start = self.offset + slot.offset;
        PixelBuffer::from_parts(&self.data[start..start + slot.len], slot.info)
    }

    fn view_mut(&mut self, index: usize) -> PixelBufferMut<'_> {
        let slot = self.slots[index];
        let start = self.offset + slot.offset;
        PixelBufferMut::from_parts(&mut self.data[start..start + slot.len], slot.info)
    }
}

impl Clone for Image {
    /// Copies into a fresh aligned allocation.
    fn clone(&self) -> Self {
        let total = self.layout.total_size();
        let (data, offset) = match allocate(total) {
            Ok((mut data, offset)) => {
                data[offset..offset + total].copy_from_slice(self.data());
                (data, offset)
            }
            // Layouts are bounded well below this; keep the source placement.
            Err(_) => (self.data.clone(), self.offset),
        };
        Self {
            data,
            offset,
            layout: self.layout.clone(),
            slots: self.slots.clone(),
            animation: self.animation,
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.description();
        write!(
            f,
            "Image({:?} {}x{}x{}, {:?}, {} mips, {} slices)",
            d.dimension, d.width, d.height, d.depth, d.format, d.mip_levels, d.array_size
        )
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Zero-filled vector with room for `total` bytes at a [`DATA_ALIGN`] offset.
fn allocate(total: usize) -> Result<(Vec<u8>, usize), ImageError> {
    let len = total
        .checked_add(DATA_ALIGN - 1)
        .filter(|&len| len <= isize::MAX as usize)
        .ok_or(ImageError::SizeOverflow)?;
    let data = vec![0u8; len];
    let offset = align_offset(data.as_ptr(), DATA_ALIGN);
    Ok((data, offset))
}

/// Round `val` up to the next multiple of `align` (must be a power of 2).
const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Compute the byte offset needed to align `ptr` to `align`.
fn align_offset(ptr: *const u8, align: usize) -> usize {
    let addr = ptr as usize;
    align_up(addr, align) - addr
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

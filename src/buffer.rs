//! Borrowed views of single pixel buffers.
//!
//! A [`PixelBuffer`] covers one array slice × mip level × z slice of an
//! [`Image`](crate::Image), or one frame of an animated image. Views never
//! own memory; their lifetime is tied to the borrow of the image (or of the
//! caller's bytes for [`PixelBuffer::new`]).
//!
//! Per-texel access goes through [`bytemuck::Pod`] types whose size equals
//! the format's pixel size, e.g. `rgb::Rgba<u8>` for
//! [`SurfaceFormat::R8G8B8A8Unorm`] or `[u16; 4]` for 16-bit RGBA.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::mem::size_of;

use bytemuck::Pod;
use imgref::{ImgRef, ImgRefMut, ImgVec};
use rgb::Rgba;

use crate::animation::delay_ms;
use crate::flip::{FlipOptions, flip_into};
use crate::pitch::{PitchFlags, compute_pitch};
use crate::{Image, ImageDescription, ImageError, SurfaceFormat, convert};

// ---------------------------------------------------------------------------
// Shared metadata
// ---------------------------------------------------------------------------

/// Everything about a buffer except its bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BufferInfo {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) format: SurfaceFormat,
    pub(crate) row_stride: usize,
    pub(crate) mip_level: u32,
    pub(crate) x_offset: u32,
    pub(crate) y_offset: u32,
    pub(crate) delay_numerator: u16,
    pub(crate) delay_denominator: u16,
    pub(crate) sequence_number: u32,
}

impl BufferInfo {
    fn plain(width: u32, height: u32, format: SurfaceFormat, row_stride: usize) -> Self {
        Self {
            width,
            height,
            format,
            row_stride,
            mip_level: 0,
            x_offset: 0,
            y_offset: 0,
            delay_numerator: 0,
            delay_denominator: 0,
            sequence_number: 0,
        }
    }

    /// Storage rows: block rows for compressed formats, texel rows otherwise.
    #[inline]
    fn rows(&self) -> u32 {
        self.format.scanline_count(self.height)
    }

    /// Check that one row of texels fits in the row stride.
    ///
    /// Buffers laid out with a narrower [`BppOverride`](crate::BppOverride)
    /// than their format fail here.
    fn check_row_fits(&self) -> Result<(), ImageError> {
        let min = compute_pitch(self.format, self.width, self.height, PitchFlags::none())?.row;
        if self.row_stride < min {
            return Err(ImageError::StrideTooSmall {
                stride: self.row_stride,
                min,
            });
        }
        Ok(())
    }

    /// Validate a caller-supplied stride and return the bytes the view spans.
    fn required_len(&self) -> Result<usize, ImageError> {
        if !self.format.is_valid() {
            return Err(ImageError::UnsupportedFormat(self.format));
        }
        self.check_row_fits()?;
        self.row_stride
            .checked_mul(self.rows() as usize)
            .ok_or(ImageError::SizeOverflow)
    }

    /// Pixel size for typed access with `T`.
    fn typed_pixel_size<T>(&self) -> Result<usize, ImageError> {
        if !self.format.is_pixel_addressable() {
            return Err(ImageError::NotPixelAddressable(self.format));
        }
        let pixel_size = self.format.size_in_bytes();
        if size_of::<T>() != pixel_size {
            return Err(ImageError::PixelSizeMismatch {
                expected: pixel_size,
                actual: size_of::<T>(),
            });
        }
        self.check_row_fits()?;
        Ok(pixel_size)
    }

    /// Byte offset of texel `(x, y)`.
    fn pixel_offset<T>(&self, x: u32, y: u32) -> Result<usize, ImageError> {
        let pixel_size = self.typed_pixel_size::<T>()?;
        if x >= self.width || y >= self.height {
            return Err(ImageError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.row_stride + x as usize * pixel_size)
    }

    /// Check that `pixels` texels starting at row `y_offset` fit.
    fn check_range(&self, pixels: usize, y_offset: u32) -> Result<(), ImageError> {
        let available = (self.height as usize)
            .saturating_sub(y_offset as usize)
            .saturating_mul(self.width as usize);
        if y_offset > self.height || pixels > available {
            return Err(ImageError::PixelRangeOutOfBounds {
                pixels,
                y_offset,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Copy between a tightly packed byte run and strided rows.
///
/// `packed` holds whole rows of `row_len` bytes followed by a partial row.
/// `strided` starts at the first row to transfer.
fn strided_copy(
    packed_len: usize,
    row_len: usize,
    row_stride: usize,
    mut copy: impl FnMut(usize, usize, usize),
) {
    if packed_len == 0 {
        return;
    }
    if row_len == row_stride {
        copy(0, 0, packed_len);
        return;
    }
    let full_rows = packed_len / row_len;
    for row in 0..full_rows {
        copy(row * row_len, row * row_stride, row_len);
    }
    let rest = packed_len % row_len;
    if rest > 0 {
        copy(full_rows * row_len, full_rows * row_stride, rest);
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Read-only view of one pixel buffer.
#[derive(Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    info: BufferInfo,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap caller bytes as a single pixel buffer.
    ///
    /// `row_stride` is the byte distance between rows (block rows for
    /// compressed formats). Bytes past the last row are ignored.
    ///
    /// # Errors
    ///
    /// - [`ImageError::UnsupportedFormat`] for [`SurfaceFormat::Undefined`]
    /// - [`ImageError::StrideTooSmall`] if a row does not fit in `row_stride`
    /// - [`ImageError::InsufficientData`] if `data` is too short
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        format: SurfaceFormat,
        row_stride: usize,
    ) -> Result<Self, ImageError> {
        let info = BufferInfo::plain(width, height, format, row_stride);
        let required = info.required_len()?;
        if data.len() < required {
            return Err(ImageError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: &data[..required],
            info,
        })
    }

    pub(crate) fn from_parts(data: &'a [u8], info: BufferInfo) -> Self {
        Self { data, info }
    }

    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Texel format.
    #[inline]
    pub fn format(&self) -> SurfaceFormat {
        self.info.format
    }

    /// Bytes between row starts.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.info.row_stride
    }

    /// Bytes of the whole buffer.
    #[inline]
    pub fn buffer_stride(&self) -> usize {
        self.data.len()
    }

    /// Pixel size in bytes (0 for 4-bit block formats).
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.info.format.size_in_bytes()
    }

    /// Mip level this buffer belongs to.
    #[inline]
    pub fn mip_level(&self) -> u32 {
        self.info.mip_level
    }

    /// Horizontal placement of an animation frame on its canvas.
    #[inline]
    pub fn x_offset(&self) -> u32 {
        self.info.x_offset
    }

    /// Vertical placement of an animation frame on its canvas.
    #[inline]
    pub fn y_offset(&self) -> u32 {
        self.info.y_offset
    }

    /// Numerator of the frame delay in seconds.
    #[inline]
    pub fn delay_numerator(&self) -> u16 {
        self.info.delay_numerator
    }

    /// Denominator of the frame delay; 0 means 100.
    #[inline]
    pub fn delay_denominator(&self) -> u16 {
        self.info.delay_denominator
    }

    /// Position of the frame in the animation's chunk sequence.
    #[inline]
    pub fn sequence_number(&self) -> u32 {
        self.info.sequence_number
    }

    /// Frame delay in milliseconds; a zero denominator means 1/100 s units.
    #[inline]
    pub fn delay_ms(&self) -> u32 {
        delay_ms(self.info.delay_numerator, self.info.delay_denominator)
    }

    /// All bytes of the buffer.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes of storage row `y`, including padding up to the row stride.
    ///
    /// Rows are block rows for compressed formats.
    ///
    /// # Panics
    ///
    /// Panics if `y` is past the last storage row.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        let rows = self.info.rows();
        assert!(y < rows, "row index {y} out of bounds (rows: {rows})");
        let start = y as usize * self.info.row_stride;
        &self.data[start..start + self.info.row_stride]
    }

    /// Read the texel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// - [`ImageError::NotPixelAddressable`] for compressed and packed formats
    /// - [`ImageError::PixelSizeMismatch`] if `T` is not the pixel size
    /// - [`ImageError::PixelOutOfBounds`] outside the buffer
    pub fn get_pixel<T: Pod>(&self, x: u32, y: u32) -> Result<T, ImageError> {
        let offset = self.info.pixel_offset::<T>(x, y)?;
        Ok(bytemuck::pod_read_unaligned(
            &self.data[offset..offset + size_of::<T>()],
        ))
    }

    /// Copy every texel into a new tightly packed vector.
    pub fn get_pixels<T: Pod>(&self) -> Result<Vec<T>, ImageError> {
        self.info.typed_pixel_size::<T>()?;
        let len = self.info.width as usize * self.info.height as usize;
        let mut pixels = vec![<T as bytemuck::Zeroable>::zeroed(); len];
        self.read_pixels(&mut pixels, 0)?;
        Ok(pixels)
    }

    /// Fill `dst` with texels starting at the first texel of row `y_offset`.
    ///
    /// `dst` may end mid-row. A buffer without row padding is read with a
    /// single copy.
    ///
    /// # Errors
    ///
    /// As [`get_pixel`](Self::get_pixel), plus
    /// [`ImageError::PixelRangeOutOfBounds`] if `dst` reaches past the end.
    pub fn read_pixels<T: Pod>(&self, dst: &mut [T], y_offset: u32) -> Result<(), ImageError> {
        let pixel_size = self.info.typed_pixel_size::<T>()?;
        self.info.check_range(dst.len(), y_offset)?;
        let start = y_offset as usize * self.info.row_stride;
        let src = &self.data[start..];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(dst);
        let row_len = self.info.width as usize * pixel_size;
        strided_copy(bytes.len(), row_len, self.info.row_stride, |packed, strided, len| {
            bytes[packed..packed + len].copy_from_slice(&src[strided..strided + len]);
        });
        Ok(())
    }

    /// Copy into a buffer of the same extent and pixel size.
    ///
    /// Buffers with equal strides are copied in one go; otherwise row by row
    /// using the smaller row stride.
    ///
    /// # Errors
    ///
    /// - [`ImageError::DimensionMismatch`] for different extents
    /// - [`ImageError::PixelSizeMismatch`] for different texel sizes
    /// - [`ImageError::FormatMismatch`] across plain, packed and block formats
    /// - [`ImageError::StrideTooSmall`] for a row-by-row copy out of or into
    ///   rows narrower than the format needs
    pub fn copy_to(&self, dst: &mut PixelBufferMut<'_>) -> Result<(), ImageError> {
        if self.width() != dst.width() || self.height() != dst.height() {
            return Err(ImageError::DimensionMismatch {
                source_width: self.width(),
                source_height: self.height(),
                destination_width: dst.width(),
                destination_height: dst.height(),
            });
        }
        let src_bits = self.format().size_in_bits();
        let dst_bits = dst.format().size_in_bits();
        if src_bits != dst_bits {
            return Err(ImageError::PixelSizeMismatch {
                expected: dst.pixel_size(),
                actual: self.pixel_size(),
            });
        }
        if !self.format().is_layout_compatible(dst.format()) {
            return Err(ImageError::FormatMismatch {
                source_format: self.format(),
                destination_format: dst.format(),
            });
        }
        if self.buffer_stride() == dst.buffer_stride() && self.row_stride() == dst.row_stride() {
            dst.data.copy_from_slice(self.data);
            return Ok(());
        }
        self.info.check_row_fits()?;
        dst.info.check_row_fits()?;
        let row_len = self.row_stride().min(dst.row_stride());
        for y in 0..self.info.rows() {
            dst.row_mut(y)[..row_len].copy_from_slice(&self.row(y)[..row_len]);
        }
        Ok(())
    }

    /// Mirrored copy as a new single-level 2D [`Image`].
    ///
    /// # Errors
    ///
    /// [`ImageError::NotPixelAddressable`] for compressed and packed formats,
    /// [`ImageError::StrideTooSmall`] if rows are narrower than the format.
    pub fn flipped(&self, options: FlipOptions) -> Result<Image, ImageError> {
        if !self.format().is_pixel_addressable() {
            return Err(ImageError::NotPixelAddressable(self.format()));
        }
        let mut image = Image::new(&ImageDescription::default_2d(
            self.width(),
            self.height(),
            self.format(),
        ))?;
        let mut dst = image.pixel_buffer_mut(0, 0)?;
        flip_into(self, &mut dst, options)?;
        Ok(image)
    }

    /// Zero-copy typed view.
    ///
    /// Returns `None` if the format is not pixel addressable, `T` is not the
    /// pixel size, the row stride is not a whole number of pixels, or the
    /// bytes are not aligned for `T`.
    pub fn as_imgref<T: Pod>(&self) -> Option<ImgRef<'a, T>> {
        let pixel_size = self.info.typed_pixel_size::<T>().ok()?;
        if self.info.row_stride % pixel_size != 0 || self.info.height == 0 {
            return None;
        }
        let pixels: &'a [T] = bytemuck::try_cast_slice(self.data).ok()?;
        Some(ImgRef::new_stride(
            pixels,
            self.info.width as usize,
            self.info.height as usize,
            self.info.row_stride / pixel_size,
        ))
    }

    /// Convert to tightly packed 8-bit RGBA.
    ///
    /// # Errors
    ///
    /// [`ImageError::UnsupportedConversion`] for formats without an RGBA8
    /// expansion, [`ImageError::StrideTooSmall`] if rows are narrower than
    /// the format.
    pub fn to_rgba8(&self) -> Result<ImgVec<Rgba<u8>>, ImageError> {
        convert::check_rgba8_source(self.info.format)?;
        self.info.check_row_fits()?;
        let width = self.info.width as usize;
        let mut pixels = vec![Rgba::new(0, 0, 0, 0); width * self.info.height as usize];
        if width > 0 {
            for (y, out) in pixels.chunks_exact_mut(width).enumerate() {
                convert::row_to_rgba8(self.row(y as u32), self.info.format, out)?;
            }
        }
        Ok(ImgVec::new(pixels, width, self.info.height as usize))
    }

    /// Split into one tightly packed plane per channel, in storage order
    /// (B, G, R, A for [`SurfaceFormat::B8G8R8A8Unorm`]).
    ///
    /// # Errors
    ///
    /// [`ImageError::UnsupportedConversion`] unless every channel is one
    /// byte, [`ImageError::StrideTooSmall`] if rows are narrower than the
    /// format.
    pub fn components(&self) -> Result<Vec<ImgVec<u8>>, ImageError> {
        let format = self.info.format;
        let channels = format.channel_count() as usize;
        if channels == 0 || !format.is_pixel_addressable() || format.size_in_bytes() != channels {
            return Err(ImageError::UnsupportedConversion(format));
        }
        self.info.check_row_fits()?;
        let width = self.info.width as usize;
        let height = self.info.height as usize;
        let mut planes: Vec<Vec<u8>> = (0..channels)
            .map(|_| Vec::with_capacity(width * height))
            .collect();
        for y in 0..self.info.height {
            for texel in self.row(y)[..width * channels].chunks_exact(channels) {
                for (plane, &value) in planes.iter_mut().zip(texel) {
                    plane.push(value);
                }
            }
        }
        Ok(planes
            .into_iter()
            .map(|plane| ImgVec::new(plane, width, height))
            .collect())
    }
}

impl fmt::Debug for PixelBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, {:?}, mip {})",
            self.info.width, self.info.height, self.info.format, self.info.mip_level
        )
    }
}

// ---------------------------------------------------------------------------
// PixelBufferMut (borrowed, mutable)
// ---------------------------------------------------------------------------

/// Mutable view of one pixel buffer.
///
/// Same semantics as [`PixelBuffer`] but allows writing.
pub struct PixelBufferMut<'a> {
    data: &'a mut [u8],
    info: BufferInfo,
}

impl<'a> PixelBufferMut<'a> {
    /// Wrap caller bytes as a single writable pixel buffer.
    ///
    /// # Errors
    ///
    /// As [`PixelBuffer::new`].
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        format: SurfaceFormat,
        row_stride: usize,
    ) -> Result<Self, ImageError> {
        let info = BufferInfo::plain(width, height, format, row_stride);
        let required = info.required_len()?;
        if data.len() < required {
            return Err(ImageError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: &mut data[..required],
            info,
        })
    }

    pub(crate) fn from_parts(data: &'a mut [u8], info: BufferInfo) -> Self {
        Self { data, info }
    }

    /// Read-only view of the same buffer.
    #[inline]
    pub fn as_buffer(&self) -> PixelBuffer<'_> {
        PixelBuffer {
            data: &*self.data,
            info: self.info,
        }
    }

    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.info.height
    }

    /// Texel format.
    #[inline]
    pub fn format(&self) -> SurfaceFormat {
        self.info.format
    }

    /// Bytes between row starts.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.info.row_stride
    }

    /// Bytes of the whole buffer.
    #[inline]
    pub fn buffer_stride(&self) -> usize {
        self.data.len()
    }

    /// Pixel size in bytes.
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.info.format.size_in_bytes()
    }

    /// Mip level this buffer belongs to.
    #[inline]
    pub fn mip_level(&self) -> u32 {
        self.info.mip_level
    }

    /// All bytes of the buffer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &*self.data
    }

    /// All bytes of the buffer, writable.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Bytes of storage row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y` is past the last storage row.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        self.as_buffer().row(y)
    }

    /// Writable bytes of storage row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y` is past the last storage row.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let rows = self.info.rows();
        assert!(y < rows, "row index {y} out of bounds (rows: {rows})");
        let start = y as usize * self.info.row_stride;
        &mut self.data[start..start + self.info.row_stride]
    }

    /// Read the texel at `(x, y)`. See [`PixelBuffer::get_pixel`].
    pub fn get_pixel<T: Pod>(&self, x: u32, y: u32) -> Result<T, ImageError> {
        self.as_buffer().get_pixel(x, y)
    }

    /// Overwrite the texel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// As [`PixelBuffer::get_pixel`].
    pub fn set_pixel<T: Pod>(&mut self, x: u32, y: u32, value: T) -> Result<(), ImageError> {
        let offset = self.info.pixel_offset::<T>(x, y)?;
        self.data[offset..offset + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }

    /// Copy every texel into a new tightly packed vector.
    pub fn get_pixels<T: Pod>(&self) -> Result<Vec<T>, ImageError> {
        self.as_buffer().get_pixels()
    }

    /// See [`PixelBuffer::read_pixels`].
    pub fn read_pixels<T: Pod>(&self, dst: &mut [T], y_offset: u32) -> Result<(), ImageError> {
        self.as_buffer().read_pixels(dst, y_offset)
    }

    /// Write `src` starting at the first texel of row `y_offset`.
    ///
    /// `src` may end mid-row. A buffer without row padding is written with a
    /// single copy.
    ///
    /// # Errors
    ///
    /// As [`PixelBuffer::read_pixels`].
    pub fn set_pixels<T: Pod>(&mut self, src: &[T], y_offset: u32) -> Result<(), ImageError> {
        let pixel_size = self.info.typed_pixel_size::<T>()?;
        self.info.check_range(src.len(), y_offset)?;
        let start = y_offset as usize * self.info.row_stride;
        let dst = &mut self.data[start..];
        let bytes: &[u8] = bytemuck::cast_slice(src);
        let row_len = self.info.width as usize * pixel_size;
        strided_copy(bytes.len(), row_len, self.info.row_stride, |packed, strided, len| {
            dst[strided..strided + len].copy_from_slice(&bytes[packed..packed + len]);
        });
        Ok(())
    }

    /// Copy from a buffer of the same extent and pixel size.
    /// See [`PixelBuffer::copy_to`].
    pub fn copy_from(&mut self, src: &PixelBuffer<'_>) -> Result<(), ImageError> {
        src.copy_to(self)
    }

    /// Zero-copy mutable typed view. See [`PixelBuffer::as_imgref`].
    pub fn as_imgref_mut<T: Pod>(&mut self) -> Option<ImgRefMut<'_, T>> {
        let pixel_size = self.info.typed_pixel_size::<T>().ok()?;
        if self.info.row_stride % pixel_size != 0 || self.info.height == 0 {
            return None;
        }
        let pixels: &mut [T] = bytemuck::try_cast_slice_mut(&mut *self.data).ok()?;
        Some(ImgRefMut::new_stride(
            pixels,
            self.info.width as usize,
            self.info.height as usize,
            self.info.row_stride / pixel_size,
        ))
    }
}

impl fmt::Debug for PixelBufferMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBufferMut({}x{}, {:?}, mip {})",
            self.info.width, self.info.height, self.info.format, self.info.mip_level
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

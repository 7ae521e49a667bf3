//! Mirroring of single pixel buffers.

use crate::{ImageError, PixelBuffer, PixelBufferMut};

/// Axis (or axes) to mirror across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlipOptions {
    /// Mirror top-bottom.
    Vertical,
    /// Mirror left-right.
    Horizontal,
    /// Mirror both axes (a 180 degree rotation).
    Both,
}

impl FlipOptions {
    /// Whether rows swap places.
    pub fn flips_vertically(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    /// Whether texels swap places within a row.
    pub fn flips_horizontally(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }
}

/// Write a mirrored copy of `src` into `dst`.
///
/// Both buffers must have the same extent and pixel size; strides may differ.
pub(crate) fn flip_into(
    src: &PixelBuffer<'_>,
    dst: &mut PixelBufferMut<'_>,
    options: FlipOptions,
) -> Result<(), ImageError> {
    let format = src.format();
    if !format.is_pixel_addressable() {
        return Err(ImageError::NotPixelAddressable(format));
    }
    let pixel_size = format.size_in_bytes();
    if dst.format().size_in_bytes() != pixel_size {
        return Err(ImageError::PixelSizeMismatch {
            expected: dst.format().size_in_bytes(),
            actual: pixel_size,
        });
    }
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(ImageError::DimensionMismatch {
            source_width: src.width(),
            source_height: src.height(),
            destination_width: dst.width(),
            destination_height: dst.height(),
        });
    }

    let height = src.height();
    let row_len = src.width() as usize * pixel_size;
    for stride in [src.row_stride(), dst.row_stride()] {
        if stride < row_len {
            return Err(ImageError::StrideTooSmall {
                stride,
                min: row_len,
            });
        }
    }
    for y in 0..height {
        let source_y = if options.flips_vertically() {
            height - 1 - y
        } else {
            y
        };
        let from = &src.row(source_y)[..row_len];
        let to = &mut dst.row_mut(y)[..row_len];
        if options.flips_horizontally() {
            for (out, texel) in to
                .chunks_exact_mut(pixel_size)
                .zip(from.chunks_exact(pixel_size).rev())
            {
                out.copy_from_slice(texel);
            }
        } else {
            to.copy_from_slice(from);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SurfaceFormat;
    use alloc::vec;

    #[test]
    fn axes() {
        assert!(FlipOptions::Vertical.flips_vertically());
        assert!(!FlipOptions::Vertical.flips_horizontally());
        assert!(FlipOptions::Horizontal.flips_horizontally());
        assert!(!FlipOptions::Horizontal.flips_vertically());
        assert!(FlipOptions::Both.flips_vertically());
        assert!(FlipOptions::Both.flips_horizontally());
    }

    fn flip(options: FlipOptions) -> vec::Vec<u8> {
        // 3x2, one byte per texel, rows padded to 4 bytes.
        let src_bytes = [1u8, 2, 3, 0, 4, 5, 6, 0];
        let src = PixelBuffer::new(&src_bytes, 3, 2, SurfaceFormat::R8Unorm, 4).unwrap();
        let mut out = vec![0u8; 6];
        let mut dst = PixelBufferMut::new(&mut out, 3, 2, SurfaceFormat::R8Unorm, 3).unwrap();
        flip_into(&src, &mut dst, options).unwrap();
        out
    }

    #[test]
    fn vertical() {
        assert_eq!(flip(FlipOptions::Vertical), [4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn horizontal() {
        assert_eq!(flip(FlipOptions::Horizontal), [3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn both() {
        assert_eq!(flip(FlipOptions::Both), [6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn multi_byte_texels_stay_intact() {
        let src_bytes = [1u8, 2, 3, 4];
        let src = PixelBuffer::new(&src_bytes, 2, 1, SurfaceFormat::R8G8Unorm, 4).unwrap();
        let mut out = [0u8; 4];
        let mut dst = PixelBufferMut::new(&mut out, 2, 1, SurfaceFormat::R8G8Unorm, 4).unwrap();
        flip_into(&src, &mut dst, FlipOptions::Horizontal).unwrap();
        assert_eq!(out, [3, 4, 1, 2]);
    }

    #[test]
    fn compressed_rejected() {
        let bytes = [0u8; 8];
        let src = PixelBuffer::new(&bytes, 4, 4, SurfaceFormat::Bc1RgbaUnorm, 8).unwrap();
        let mut out = [0u8; 8];
        let mut dst = PixelBufferMut::new(&mut out, 4, 4, SurfaceFormat::Bc1RgbaUnorm, 8).unwrap();
        assert_eq!(
            flip_into(&src, &mut dst, FlipOptions::Vertical),
            Err(ImageError::NotPixelAddressable(SurfaceFormat::Bc1RgbaUnorm))
        );
    }
}

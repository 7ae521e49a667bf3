//! Scanline conversion to 8-bit RGBA.
//!
//! Packed 16-bit formats are widened with bit replication, so full-scale
//! channel values map to 255 and zero stays zero. Multi-byte texels are read
//! little-endian.

use rgb::Rgba;

use crate::{ImageError, SurfaceFormat};

/// Options for [`expand_scanline`] and [`copy_scanline`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct ScanlineFlags {
    /// Force alpha to fully opaque instead of reading it from the source.
    pub set_alpha: bool,
}

impl ScanlineFlags {
    /// No options.
    pub fn none() -> Self {
        Self::default()
    }

    /// Force opaque alpha.
    pub fn with_set_alpha(mut self, enabled: bool) -> Self {
        self.set_alpha = enabled;
        self
    }
}

/// Replicate the top bits of an `n`-bit channel into the low bits of a byte.
#[inline]
fn widen(value: u16, bits: u32) -> u8 {
    let v = (value as u32) << (8 - bits);
    (v | (v >> bits)) as u8
}

/// Expand a row of 16-bit packed texels to RGBA8.
///
/// Handles [`SurfaceFormat::B5G6R5Unorm`], [`SurfaceFormat::B5G5R5A1Unorm`]
/// and [`SurfaceFormat::B4G4R4A4Unorm`]. Converts
/// `min(src.len() / 2, dst.len())` texels and returns that count.
///
/// # Errors
///
/// [`ImageError::UnsupportedConversion`] for any other format.
pub fn expand_scanline(
    src: &[u8],
    format: SurfaceFormat,
    flags: ScanlineFlags,
    dst: &mut [Rgba<u8>],
) -> Result<usize, ImageError> {
    let expand: fn(u16, bool) -> Rgba<u8> = match format {
        SurfaceFormat::B5G6R5Unorm => |t, _| Rgba {
            r: widen(t >> 11, 5),
            g: widen((t >> 5) & 0x3f, 6),
            b: widen(t & 0x1f, 5),
            a: 255,
        },
        SurfaceFormat::B5G5R5A1Unorm => |t, set_alpha| Rgba {
            r: widen((t >> 10) & 0x1f, 5),
            g: widen((t >> 5) & 0x1f, 5),
            b: widen(t & 0x1f, 5),
            a: if set_alpha || t & 0x8000 != 0 { 255 } else { 0 },
        },
        SurfaceFormat::B4G4R4A4Unorm => |t, set_alpha| Rgba {
            r: ((t >> 8) & 0xf) as u8 * 17,
            g: ((t >> 4) & 0xf) as u8 * 17,
            b: (t & 0xf) as u8 * 17,
            a: if set_alpha { 255 } else { (t >> 12) as u8 * 17 },
        },
        other => return Err(ImageError::UnsupportedConversion(other)),
    };
    let mut count = 0;
    for (out, texel) in dst.iter_mut().zip(src.chunks_exact(2)) {
        *out = expand(u16::from_le_bytes([texel[0], texel[1]]), flags.set_alpha);
        count += 1;
    }
    Ok(count)
}

/// Copy a row in its own format, optionally forcing alpha to opaque.
///
/// Copies `min(src.len(), dst.len())` bytes. Formats without alpha are
/// copied unchanged.
///
/// # Errors
///
/// [`ImageError::UnsupportedConversion`] when `set_alpha` is requested for a
/// format whose alpha cannot be located (compressed and packed formats).
pub fn copy_scanline(
    src: &[u8],
    format: SurfaceFormat,
    flags: ScanlineFlags,
    dst: &mut [u8],
) -> Result<(), ImageError> {
    let len = src.len().min(dst.len());
    let dst = &mut dst[..len];
    dst.copy_from_slice(&src[..len]);
    if !flags.set_alpha {
        return Ok(());
    }
    use SurfaceFormat::*;
    match format {
        R8G8B8A8Unorm | R8G8B8A8Srgb | R8G8B8A8Uint | B8G8R8A8Unorm | B8G8R8A8Srgb => {
            for texel in dst.chunks_exact_mut(4) {
                texel[3] = 0xff;
            }
        }
        A8Unorm => dst.fill(0xff),
        R8G8B8A8Snorm => {
            for texel in dst.chunks_exact_mut(4) {
                texel[3] = 0x7f;
            }
        }
        R16G16B16A16Unorm => {
            for texel in dst.chunks_exact_mut(8) {
                texel[6..8].copy_from_slice(&u16::MAX.to_le_bytes());
            }
        }
        R16G16B16A16Snorm => {
            for texel in dst.chunks_exact_mut(8) {
                texel[6..8].copy_from_slice(&i16::MAX.to_le_bytes());
            }
        }
        // 1.0 in half precision.
        R16G16B16A16Sfloat => {
            for texel in dst.chunks_exact_mut(8) {
                texel[6..8].copy_from_slice(&0x3c00u16.to_le_bytes());
            }
        }
        R32G32B32A32Sfloat => {
            for texel in dst.chunks_exact_mut(16) {
                texel[12..16].copy_from_slice(&1.0f32.to_le_bytes());
            }
        }
        R10G10B10A2Unorm => {
            for texel in dst.chunks_exact_mut(4) {
                texel[3] |= 0xc0;
            }
        }
        B5G5R5A1Unorm => {
            for texel in dst.chunks_exact_mut(2) {
                texel[1] |= 0x80;
            }
        }
        B4G4R4A4Unorm => {
            for texel in dst.chunks_exact_mut(2) {
                texel[1] |= 0xf0;
            }
        }
        f if f.is_compressed() || f.is_packed() => {
            return Err(ImageError::UnsupportedConversion(f));
        }
        _ => {}
    }
    Ok(())
}

/// Whether [`row_to_rgba8`] accepts `format`.
pub(crate) fn check_rgba8_source(format: SurfaceFormat) -> Result<(), ImageError> {
    use SurfaceFormat::*;
    match format {
        R8G8B8A8Unorm | R8G8B8A8Srgb | R8G8B8A8Uint | B8G8R8A8Unorm | B8G8R8A8Srgb
        | R8G8B8Unorm | B8G8R8Unorm | R8Unorm | R8Uint | A8Unorm | R8G8Unorm | B5G6R5Unorm
        | B5G5R5A1Unorm | B4G4R4A4Unorm => Ok(()),
        other => Err(ImageError::UnsupportedConversion(other)),
    }
}

/// Convert one storage row (padding allowed) into `out.len()` RGBA8 texels.
pub(crate) fn row_to_rgba8(
    row: &[u8],
    format: SurfaceFormat,
    out: &mut [Rgba<u8>],
) -> Result<(), ImageError> {
    use SurfaceFormat::*;
    match format {
        R8G8B8A8Unorm | R8G8B8A8Srgb | R8G8B8A8Uint => {
            for (o, t) in out.iter_mut().zip(row.chunks_exact(4)) {
                *o = Rgba::new(t[0], t[1], t[2], t[3]);
            }
        }
        B8G8R8A8Unorm | B8G8R8A8Srgb => {
            for (o, t) in out.iter_mut().zip(row.chunks_exact(4)) {
                *o = Rgba::new(t[2], t[1], t[0], t[3]);
            }
        }
        R8G8B8Unorm => {
            for (o, t) in out.iter_mut().zip(row.chunks_exact(3)) {
                *o = Rgba::new(t[0], t[1], t[2], 255);
            }
        }
        B8G8R8Unorm => {
            for (o, t) in out.iter_mut().zip(row.chunks_exact(3)) {
                *o = Rgba::new(t[2], t[1], t[0], 255);
            }
        }
        R8G8Unorm => {
            for (o, t) in out.iter_mut().zip(row.chunks_exact(2)) {
                *o = Rgba::new(t[0], t[1], 0, 255);
            }
        }
        R8Unorm | R8Uint => {
            for (o, &r) in out.iter_mut().zip(row) {
                *o = Rgba::new(r, 0, 0, 255);
            }
        }
        A8Unorm => {
            for (o, &a) in out.iter_mut().zip(row) {
                *o = Rgba::new(0, 0, 0, a);
            }
        }
        B5G6R5Unorm | B5G5R5A1Unorm | B4G4R4A4Unorm => {
            expand_scanline(row, format, ScanlineFlags::none(), out)?;
        }
        other => return Err(ImageError::UnsupportedConversion(other)),
    }
    Ok(())
}

//! DXGI format codes, as stored in DDS `DX10` headers and passed to Direct3D.

use crate::{ImageError, SurfaceFormat};

/// DXGI format code.
///
/// Only the codes with a [`SurfaceFormat`] counterpart are listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
#[allow(non_camel_case_types)]
pub enum DxgiFormat {
    UNKNOWN = 0,
    R32G32B32A32_FLOAT = 2,
    R32G32B32_FLOAT = 6,
    R16G16B16A16_FLOAT = 10,
    R16G16B16A16_UNORM = 11,
    R16G16B16A16_SNORM = 13,
    R32G32_FLOAT = 16,
    R10G10B10A2_UNORM = 24,
    R11G11B10_FLOAT = 26,
    R8G8B8A8_UNORM = 28,
    R8G8B8A8_UNORM_SRGB = 29,
    R8G8B8A8_UINT = 30,
    R8G8B8A8_SNORM = 31,
    R16G16_FLOAT = 34,
    R16G16_UNORM = 35,
    D32_FLOAT = 40,
    R32_FLOAT = 41,
    R32_UINT = 42,
    D24_UNORM_S8_UINT = 45,
    R8G8_UNORM = 49,
    R16_FLOAT = 54,
    D16_UNORM = 55,
    R16_UNORM = 56,
    R8_UNORM = 61,
    R8_UINT = 62,
    R8_SNORM = 63,
    A8_UNORM = 65,
    R8G8_B8G8_UNORM = 68,
    G8R8_G8B8_UNORM = 69,
    BC1_UNORM = 71,
    BC1_UNORM_SRGB = 72,
    BC2_UNORM = 74,
    BC2_UNORM_SRGB = 75,
    BC3_UNORM = 77,
    BC3_UNORM_SRGB = 78,
    BC4_UNORM = 80,
    BC4_SNORM = 81,
    BC5_UNORM = 83,
    BC5_SNORM = 84,
    B5G6R5_UNORM = 85,
    B5G5R5A1_UNORM = 86,
    B8G8R8A8_UNORM = 87,
    B8G8R8A8_UNORM_SRGB = 91,
    BC6H_UF16 = 95,
    BC6H_SF16 = 96,
    BC7_UNORM = 98,
    BC7_UNORM_SRGB = 99,
    B4G4R4A4_UNORM = 115,
}

/// Pairs kept in one table so both directions stay in sync.
const TABLE: &[(SurfaceFormat, DxgiFormat)] = {
    use DxgiFormat as D;
    use SurfaceFormat as S;
    &[
        (S::Undefined, D::UNKNOWN),
        (S::R32G32B32A32Sfloat, D::R32G32B32A32_FLOAT),
        (S::R32G32B32Sfloat, D::R32G32B32_FLOAT),
        (S::R16G16B16A16Sfloat, D::R16G16B16A16_FLOAT),
        (S::R16G16B16A16Unorm, D::R16G16B16A16_UNORM),
        (S::R16G16B16A16Snorm, D::R16G16B16A16_SNORM),
        (S::R32G32Sfloat, D::R32G32_FLOAT),
        (S::R10G10B10A2Unorm, D::R10G10B10A2_UNORM),
        (S::R11G11B10Ufloat, D::R11G11B10_FLOAT),
        (S::R8G8B8A8Unorm, D::R8G8B8A8_UNORM),
        (S::R8G8B8A8Srgb, D::R8G8B8A8_UNORM_SRGB),
        (S::R8G8B8A8Uint, D::R8G8B8A8_UINT),
        (S::R8G8B8A8Snorm, D::R8G8B8A8_SNORM),
        (S::R16G16Sfloat, D::R16G16_FLOAT),
        (S::R16G16Unorm, D::R16G16_UNORM),
        (S::D32Sfloat, D::D32_FLOAT),
        (S::R32Sfloat, D::R32_FLOAT),
        (S::R32Uint, D::R32_UINT),
        (S::D24UnormS8Uint, D::D24_UNORM_S8_UINT),
        (S::R8G8Unorm, D::R8G8_UNORM),
        (S::R16Sfloat, D::R16_FLOAT),
        (S::D16Unorm, D::D16_UNORM),
        (S::R16Unorm, D::R16_UNORM),
        (S::R8Unorm, D::R8_UNORM),
        (S::R8Uint, D::R8_UINT),
        (S::R8Snorm, D::R8_SNORM),
        (S::A8Unorm, D::A8_UNORM),
        (S::R8G8B8G8Unorm, D::R8G8_B8G8_UNORM),
        (S::G8R8G8B8Unorm, D::G8R8_G8B8_UNORM),
        (S::Bc1RgbaUnorm, D::BC1_UNORM),
        (S::Bc1RgbaSrgb, D::BC1_UNORM_SRGB),
        (S::Bc2Unorm, D::BC2_UNORM),
        (S::Bc2Srgb, D::BC2_UNORM_SRGB),
        (S::Bc3Unorm, D::BC3_UNORM),
        (S::Bc3Srgb, D::BC3_UNORM_SRGB),
        (S::Bc4Unorm, D::BC4_UNORM),
        (S::Bc4Snorm, D::BC4_SNORM),
        (S::Bc5Unorm, D::BC5_UNORM),
        (S::Bc5Snorm, D::BC5_SNORM),
        (S::B5G6R5Unorm, D::B5G6R5_UNORM),
        (S::B5G5R5A1Unorm, D::B5G5R5A1_UNORM),
        (S::B8G8R8A8Unorm, D::B8G8R8A8_UNORM),
        (S::B8G8R8A8Srgb, D::B8G8R8A8_UNORM_SRGB),
        (S::Bc6hUfloat, D::BC6H_UF16),
        (S::Bc6hSfloat, D::BC6H_SF16),
        (S::Bc7Unorm, D::BC7_UNORM),
        (S::Bc7Srgb, D::BC7_UNORM_SRGB),
        (S::B4G4R4A4Unorm, D::B4G4R4A4_UNORM),
    ]
};

impl DxgiFormat {
    /// Parse a raw DXGI code, e.g. from a DDS `DX10` header.
    ///
    /// # Errors
    ///
    /// [`ImageError::UnsupportedDxgiFormat`] for codes without a
    /// [`SurfaceFormat`] counterpart.
    pub fn from_u32(code: u32) -> Result<Self, ImageError> {
        TABLE
            .iter()
            .map(|&(_, dxgi)| dxgi)
            .find(|&dxgi| dxgi as u32 == code)
            .ok_or(ImageError::UnsupportedDxgiFormat(code))
    }

    /// Raw DXGI code.
    #[inline]
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<SurfaceFormat> for DxgiFormat {
    type Error = ImageError;

    fn try_from(format: SurfaceFormat) -> Result<Self, Self::Error> {
        // BC1 without alpha shares the DXGI code of BC1 with 1-bit alpha.
        let format = match format {
            SurfaceFormat::Bc1RgbUnorm => SurfaceFormat::Bc1RgbaUnorm,
            other => other,
        };
        TABLE
            .iter()
            .find(|&&(surface, _)| surface == format)
            .map(|&(_, dxgi)| dxgi)
            .ok_or(ImageError::NoDxgiEquivalent(format))
    }
}

impl TryFrom<DxgiFormat> for SurfaceFormat {
    type Error = ImageError;

    fn try_from(format: DxgiFormat) -> Result<Self, Self::Error> {
        TABLE
            .iter()
            .find(|&&(_, dxgi)| dxgi == format)
            .map(|&(surface, _)| surface)
            .ok_or(ImageError::UnsupportedDxgiFormat(format as u32))
    }
}

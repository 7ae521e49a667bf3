//! Container file type detection.
//!
//! Identifies which image container a file or byte stream holds, from its
//! extension or its magic bytes. Decoding and encoding live elsewhere.

/// Image container file types.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFileType {
    Bmp,
    Png,
    Jpg,
    Gif,
    Dds,
    Ico,
    Tga,
    Tiff,
}

/// Trailing 18 bytes of a TGA 2.0 file.
const TGA_FOOTER_SIGNATURE: &[u8] = b"TRUEVISION-XFILE.\0";

impl ImageFileType {
    /// Detect the container from magic bytes. Returns `None` if unrecognized.
    ///
    /// TGA has no leading magic; only TGA 2.0 files are recognized, by their
    /// footer, so `data` must be the whole file.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // DDS: "DDS "
        if data.starts_with(b"DDS ") {
            return Some(ImageFileType::Dds);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFileType::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFileType::Jpg);
        }

        // GIF: "GIF87a" or "GIF89a"
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFileType::Gif);
        }

        // BMP: "BM" followed by the little-endian file size
        if data.len() >= 14 && data.starts_with(b"BM") {
            return Some(ImageFileType::Bmp);
        }

        // TIFF: "II*\0" or "MM\0*"
        if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            return Some(ImageFileType::Tiff);
        }

        // ICO: reserved 0, type 1, non-zero image count
        if data.len() >= 6 && data[..4] == [0x00, 0x00, 0x01, 0x00] && data[4..6] != [0, 0] {
            return Some(ImageFileType::Ico);
        }

        if data.ends_with(TGA_FOOTER_SIGNATURE) {
            return Some(ImageFileType::Tga);
        }

        None
    }

    /// Detect the container from a file extension without the dot
    /// (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        // Manual case-insensitive comparison without std.
        let mut buf = [0u8; 4];
        let ext_bytes = ext.as_bytes();
        if ext_bytes.len() > buf.len() {
            return None;
        }
        for (i, &b) in ext_bytes.iter().enumerate() {
            buf[i] = b.to_ascii_lowercase();
        }

        match &buf[..ext_bytes.len()] {
            b"bmp" | b"dib" => Some(ImageFileType::Bmp),
            b"png" => Some(ImageFileType::Png),
            b"jpg" | b"jpeg" | b"jpe" => Some(ImageFileType::Jpg),
            b"gif" => Some(ImageFileType::Gif),
            b"dds" => Some(ImageFileType::Dds),
            b"ico" => Some(ImageFileType::Ico),
            b"tga" => Some(ImageFileType::Tga),
            b"tif" | b"tiff" => Some(ImageFileType::Tiff),
            _ => None,
        }
    }

    /// Detect the container from the extension of a file name or path.
    ///
    /// Only the text after the last `.` of the final path component counts.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let (stem, ext) = file.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Self::from_extension(ext)
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFileType::Bmp => "image/bmp",
            ImageFileType::Png => "image/png",
            ImageFileType::Jpg => "image/jpeg",
            ImageFileType::Gif => "image/gif",
            ImageFileType::Dds => "image/vnd-ms.dds",
            ImageFileType::Ico => "image/vnd.microsoft.icon",
            ImageFileType::Tga => "image/x-tga",
            ImageFileType::Tiff => "image/tiff",
        }
    }

    /// Common file extensions; the first is the canonical one.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFileType::Bmp => &["bmp", "dib"],
            ImageFileType::Png => &["png"],
            ImageFileType::Jpg => &["jpg", "jpeg", "jpe"],
            ImageFileType::Gif => &["gif"],
            ImageFileType::Dds => &["dds"],
            ImageFileType::Ico => &["ico"],
            ImageFileType::Tga => &["tga"],
            ImageFileType::Tiff => &["tif", "tiff"],
        }
    }

    /// Whether the container can hold block-compressed texels, mip chains
    /// and array slices as stored by [`Image`](crate::Image).
    pub fn stores_gpu_layout(self) -> bool {
        matches!(self, ImageFileType::Dds)
    }
}

impl core::fmt::Display for ImageFileType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ImageFileType::Bmp => "BMP",
            ImageFileType::Png => "PNG",
            ImageFileType::Jpg => "JPEG",
            ImageFileType::Gif => "GIF",
            ImageFileType::Dds => "DDS",
            ImageFileType::Ico => "ICO",
            ImageFileType::Tga => "TGA",
            ImageFileType::Tiff => "TIFF",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn detect_dds() {
        assert_eq!(
            ImageFileType::detect(b"DDS \x7c\x00\x00\x00"),
            Some(ImageFileType::Dds)
        );
    }

    #[test]
    fn detect_png() {
        assert_eq!(
            ImageFileType::detect(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(ImageFileType::Png)
        );
    }

    #[test]
    fn detect_jpeg() {
        assert_eq!(
            ImageFileType::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFileType::Jpg)
        );
    }

    #[test]
    fn detect_gif() {
        assert_eq!(ImageFileType::detect(b"GIF87a\x01\x00"), Some(ImageFileType::Gif));
        assert_eq!(ImageFileType::detect(b"GIF88a"), None);
    }

    #[test]
    fn detect_bmp_needs_file_header() {
        let mut bmp = Vec::from(*b"BM");
        bmp.extend_from_slice(&[0u8; 12]);
        assert_eq!(ImageFileType::detect(&bmp), Some(ImageFileType::Bmp));
        assert_eq!(ImageFileType::detect(b"BM"), None);
    }

    #[test]
    fn detect_tiff_both_byte_orders() {
        assert_eq!(ImageFileType::detect(b"II*\0\x08\0\0\0"), Some(ImageFileType::Tiff));
        assert_eq!(ImageFileType::detect(b"MM\0*\0\0\0\x08"), Some(ImageFileType::Tiff));
    }

    #[test]
    fn detect_ico() {
        assert_eq!(
            ImageFileType::detect(&[0, 0, 1, 0, 1, 0]),
            Some(ImageFileType::Ico)
        );
        assert_eq!(ImageFileType::detect(&[0, 0, 1, 0, 0, 0]), None);
    }

    #[test]
    fn detect_tga_footer() {
        let mut tga = Vec::from([0u8; 18]);
        tga.extend_from_slice(&[0u8; 8]);
        tga.extend_from_slice(TGA_FOOTER_SIGNATURE);
        assert_eq!(ImageFileType::detect(&tga), Some(ImageFileType::Tga));
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(ImageFileType::detect(b"nope"), None);
        assert_eq!(ImageFileType::detect(&[]), None);
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(ImageFileType::from_extension("DDS"), Some(ImageFileType::Dds));
        assert_eq!(ImageFileType::from_extension("Jpeg"), Some(ImageFileType::Jpg));
        assert_eq!(ImageFileType::from_extension("tif"), Some(ImageFileType::Tiff));
        assert_eq!(ImageFileType::from_extension(""), None);
        assert_eq!(ImageFileType::from_extension("webp"), None);
        assert_eq!(ImageFileType::from_extension("targa"), None);
    }

    #[test]
    fn from_file_name_uses_last_extension() {
        assert_eq!(
            ImageFileType::from_file_name("textures/grass.albedo.DDS"),
            Some(ImageFileType::Dds)
        );
        assert_eq!(
            ImageFileType::from_file_name("C:\\art\\logo.png"),
            Some(ImageFileType::Png)
        );
        assert_eq!(ImageFileType::from_file_name("archive.d/readme"), None);
        assert_eq!(ImageFileType::from_file_name(".png"), None);
        assert_eq!(ImageFileType::from_file_name("noext"), None);
    }

    #[test]
    fn extensions_round_trip() {
        for ty in [
            ImageFileType::Bmp,
            ImageFileType::Png,
            ImageFileType::Jpg,
            ImageFileType::Gif,
            ImageFileType::Dds,
            ImageFileType::Ico,
            ImageFileType::Tga,
            ImageFileType::Tiff,
        ] {
            for ext in ty.extensions() {
                assert_eq!(ImageFileType::from_extension(ext), Some(ty));
            }
        }
    }

    #[test]
    fn mime_and_display() {
        assert_eq!(ImageFileType::Jpg.mime_type(), "image/jpeg");
        assert_eq!(ImageFileType::Tiff.mime_type(), "image/tiff");
        assert_eq!(alloc::format!("{}", ImageFileType::Dds), "DDS");
        assert!(ImageFileType::Dds.stores_gpu_layout());
        assert!(!ImageFileType::Png.stores_gpu_layout());
    }
}

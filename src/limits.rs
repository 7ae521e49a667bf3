//! Allocation limits for image construction.
//!
//! [`ResourceLimits`] caps what an [`Image`](crate::Image) constructor may
//! allocate. [`LimitExceeded`] is returned when a check fails. Checks run
//! before the backing storage is allocated.

use crate::ImageDescription;

/// Caps on image dimensions and allocation size.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use zentexture::ResourceLimits;
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(100_000_000)
///     .with_max_memory(512 * 1024 * 1024);
/// assert!(limits.has_any());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum texels in the top mip level (width × height × depth).
    pub max_pixels: Option<u64>,
    /// Maximum backing allocation in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Maximum width in texels.
    pub max_width: Option<u32>,
    /// Maximum height in texels.
    pub max_height: Option<u32>,
    /// Maximum depth of a volume texture.
    pub max_depth: Option<u32>,
    /// Maximum number of array slices (cube faces count individually).
    pub max_array_size: Option<u32>,
    /// Maximum number of animation frames.
    pub max_frames: Option<u32>,
    /// Maximum total animation duration in milliseconds.
    pub max_duration_ms: Option<u64>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum texels in the top mip level.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum backing allocation in bytes.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum width.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum height.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum volume depth.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set maximum array size.
    pub fn with_max_array_size(mut self, size: u32) -> Self {
        self.max_array_size = Some(size);
        self
    }

    /// Set maximum number of animation frames.
    pub fn with_max_frames(mut self, frames: u32) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Set maximum total animation duration in milliseconds.
    pub fn with_max_duration(mut self, ms: u64) -> Self {
        self.max_duration_ms = Some(ms);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_memory_bytes.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
            || self.max_depth.is_some()
            || self.max_array_size.is_some()
            || self.max_frames.is_some()
            || self.max_duration_ms.is_some()
    }

    // --- Validation methods ---

    /// Check dimensions against `max_width`, `max_height`, `max_depth` and
    /// `max_pixels`.
    pub fn check_dimensions(
        &self,
        width: u32,
        height: u32,
        depth: u32,
    ) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_depth
            && depth > max
        {
            return Err(LimitExceeded::Depth { actual: depth, max });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width as u64 * height as u64 * depth as u64;
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check an array size against `max_array_size`.
    pub fn check_array_size(&self, size: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_array_size
            && size > max
        {
            return Err(LimitExceeded::ArraySize { actual: size, max });
        }
        Ok(())
    }

    /// Check an allocation size against `max_memory_bytes`.
    pub fn check_memory(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_memory_bytes
            && bytes > max
        {
            return Err(LimitExceeded::Memory { actual: bytes, max });
        }
        Ok(())
    }

    /// Check frame count against `max_frames`.
    pub fn check_frames(&self, count: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_frames
            && count > max
        {
            return Err(LimitExceeded::Frames { actual: count, max });
        }
        Ok(())
    }

    /// Check animation duration against `max_duration_ms`.
    pub fn check_duration(&self, ms: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_duration_ms
            && ms > max
        {
            return Err(LimitExceeded::Duration { actual: ms, max });
        }
        Ok(())
    }

    /// Check an [`ImageDescription`] against the dimension and array limits.
    ///
    /// Checks: `max_width`, `max_height`, `max_depth`, `max_pixels`,
    /// `max_array_size`. Memory is checked separately once the layout is
    /// known.
    pub fn check_description(&self, description: &ImageDescription) -> Result<(), LimitExceeded> {
        self.check_dimensions(description.width, description.height, description.depth)?;
        self.check_array_size(description.array_size)
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LimitExceeded {
    /// Width exceeded `max_width`.
    #[error("width {actual} exceeds limit {max}")]
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Height exceeded `max_height`.
    #[error("height {actual} exceeds limit {max}")]
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Depth exceeded `max_depth`.
    #[error("depth {actual} exceeds limit {max}")]
    Depth {
        /// Actual depth.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Texel count exceeded `max_pixels`.
    #[error("pixel count {actual} exceeds limit {max}")]
    Pixels {
        /// Actual texel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Array size exceeded `max_array_size`.
    #[error("array size {actual} exceeds limit {max}")]
    ArraySize {
        /// Actual array size.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Allocation exceeded `max_memory_bytes`.
    #[error("memory {actual} bytes exceeds limit {max}")]
    Memory {
        /// Required bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Frame count exceeded `max_frames`.
    #[error("frame count {actual} exceeds limit {max}")]
    Frames {
        /// Actual frame count.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Animation duration exceeded `max_duration_ms`.
    #[error("duration {actual}ms exceeds limit {max}ms")]
    Duration {
        /// Actual duration in milliseconds.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MipMapCount, SurfaceFormat};

    #[test]
    fn default_has_no_limits() {
        let limits = ResourceLimits::none();
        assert!(!limits.has_any());
    }

    #[test]
    fn builder_sets_limits() {
        let limits = ResourceLimits::none()
            .with_max_pixels(1_000_000)
            .with_max_memory(512 * 1024 * 1024);
        assert!(limits.has_any());
        assert_eq!(limits.max_pixels, Some(1_000_000));
        assert_eq!(limits.max_memory_bytes, Some(512 * 1024 * 1024));
        assert!(limits.max_depth.is_none());
    }

    #[test]
    fn has_any_includes_animation_fields() {
        assert!(ResourceLimits::none().with_max_frames(10).has_any());
        assert!(ResourceLimits::none().with_max_duration(5000).has_any());
    }

    #[test]
    fn check_dimensions_pass() {
        let limits = ResourceLimits::none()
            .with_max_width(1920)
            .with_max_height(1080)
            .with_max_pixels(2_073_600);
        assert!(limits.check_dimensions(1920, 1080, 1).is_ok());
        assert!(limits.check_dimensions(100, 100, 1).is_ok());
    }

    #[test]
    fn check_dimensions_width_exceeded() {
        let limits = ResourceLimits::none().with_max_width(1920);
        let err = limits.check_dimensions(1921, 1080, 1).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Width {
                actual: 1921,
                max: 1920
            }
        );
    }

    #[test]
    fn check_dimensions_depth_counts_toward_pixels() {
        let limits = ResourceLimits::none().with_max_pixels(1_000_000);
        // 100×100×101 = 1,010,000 > 1,000,000
        let err = limits.check_dimensions(100, 100, 101).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Pixels {
                actual: 1_010_000,
                max: 1_000_000
            }
        );
        let err = ResourceLimits::none()
            .with_max_depth(64)
            .check_dimensions(4, 4, 65)
            .unwrap_err();
        assert!(matches!(err, LimitExceeded::Depth { actual: 65, max: 64 }));
    }

    #[test]
    fn check_memory_pass_and_fail() {
        let limits = ResourceLimits::none().with_max_memory(512 * 1024 * 1024);
        assert!(limits.check_memory(256 * 1024 * 1024).is_ok());
        let err = limits.check_memory(1024 * 1024 * 1024).unwrap_err();
        assert!(matches!(err, LimitExceeded::Memory { .. }));
    }

    #[test]
    fn check_frames_and_duration() {
        let limits = ResourceLimits::none()
            .with_max_frames(100)
            .with_max_duration(30_000);
        assert!(limits.check_frames(50).is_ok());
        assert_eq!(
            limits.check_frames(200).unwrap_err(),
            LimitExceeded::Frames {
                actual: 200,
                max: 100
            }
        );
        assert!(limits.check_duration(15_000).is_ok());
        assert!(matches!(
            limits.check_duration(60_000).unwrap_err(),
            LimitExceeded::Duration { .. }
        ));
    }

    #[test]
    fn check_description_array_size() {
        let limits = ResourceLimits::none().with_max_array_size(6);
        let cube =
            ImageDescription::new_cube(16, MipMapCount::Auto, SurfaceFormat::R8G8B8A8Unorm, 1);
        assert!(limits.check_description(&cube).is_ok());
        let cubes =
            ImageDescription::new_cube(16, MipMapCount::Auto, SurfaceFormat::R8G8B8A8Unorm, 2);
        assert_eq!(
            limits.check_description(&cubes).unwrap_err(),
            LimitExceeded::ArraySize { actual: 12, max: 6 }
        );
    }

    #[test]
    fn limit_exceeded_display() {
        use alloc::format;
        let err = LimitExceeded::Width {
            actual: 5000,
            max: 4096,
        };
        assert_eq!(format!("{err}"), "width 5000 exceeds limit 4096");

        let err = LimitExceeded::Duration {
            actual: 60_000,
            max: 30_000,
        };
        assert_eq!(format!("{err}"), "duration 60000ms exceeds limit 30000ms");
    }

    #[test]
    fn limit_exceeded_is_error() {
        fn assert_error<E: core::error::Error>(_: &E) {}
        let err = LimitExceeded::Depth { actual: 9, max: 8 };
        assert_error(&err);
    }
}

//! CPU-side texture images for zen* tooling.
//!
//! An [`Image`] holds every subresource of a texture (mip levels, array
//! slices, cube faces, volume z slices, or animation frames) in one
//! contiguous allocation, laid out the way GPU upload paths expect:
//!
//! - [`ImageDescription`] / [`TextureDimension`] / [`MipMapCount`]: what to allocate
//! - [`SurfaceFormat`] / [`DxgiFormat`]: texel formats and their DXGI codes
//! - [`compute_pitch`] / [`PitchFlags`]: row and slice pitch rules
//! - [`ImageLayout`]: offsets of every pixel buffer, O(1) subresource lookup
//! - [`PixelBuffer`] / [`PixelBufferMut`] / [`PixelBufferArray`]: borrowed views
//! - [`DataBox`]: per-level upload descriptors
//! - [`expand_scanline`] / [`copy_scanline`]: row conversion helpers
//! - [`ImageFileType`]: container detection from names and magic bytes
//! - [`ResourceLimits`]: caps checked before allocating
//!
//! Container codecs (DDS, PNG, ...) build on these types; this crate does no
//! file I/O.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod animation;
mod array;
mod buffer;
mod convert;
mod description;
mod dxgi;
mod error;
mod file_type;
mod flip;
mod format;
mod image;
mod layout;
mod limits;
mod mipmap;
mod pitch;

pub use animation::AnimatedImageDescription;
pub use array::{Iter, IterMut, PixelBufferArray};
pub use buffer::{PixelBuffer, PixelBufferMut};
pub use convert::{ScanlineFlags, copy_scanline, expand_scanline};
pub use description::{ImageDescription, TextureDimension};
pub use dxgi::DxgiFormat;
pub use error::ImageError;
pub use file_type::ImageFileType;
pub use flip::FlipOptions;
pub use format::SurfaceFormat;
pub use image::{DataBox, Image, ImageOptions};
pub use layout::{BufferLayout, ImageLayout};
pub use limits::{LimitExceeded, ResourceLimits};
pub use mipmap::{
    MipChain, MipMapCount, MipMapDescription, calculate_mip_levels, count_mip_levels, mip_extent,
};
pub use pitch::{BppOverride, Pitch, PitchFlags, compute_pitch};

// Re-exports for users of the typed pixel views.
pub use bytemuck::Pod;
pub use imgref::{Img, ImgRef, ImgRefMut, ImgVec};
pub use rgb;
pub use rgb::{Rgb, Rgba};

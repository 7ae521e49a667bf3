//! Indexed and iterated access to every pixel buffer of an image.

use core::iter::FusedIterator;
use core::slice;

use crate::image::Slot;
use crate::{Image, ImageError, PixelBuffer, PixelBufferMut};

/// All pixel buffers of an [`Image`], in storage order.
///
/// Storage order is array slice, then mip level, then z slice; for animated
/// images it is frame order.
#[derive(Clone, Copy, Debug)]
pub struct PixelBufferArray<'a> {
    image: &'a Image,
}

impl<'a> PixelBufferArray<'a> {
    pub(crate) fn new(image: &'a Image) -> Self {
        Self { image }
    }

    /// Number of pixel buffers.
    #[inline]
    pub fn len(&self) -> usize {
        self.image.buffer_count()
    }

    /// Whether there are no pixel buffers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buffer at a flat storage index.
    pub fn get(&self, index: usize) -> Option<PixelBuffer<'a>> {
        (index < self.len()).then(|| self.image.view(index))
    }

    /// Buffer for `(array_or_z, mip)`: a z slice for volume textures, an
    /// array slice (or frame) otherwise.
    ///
    /// # Errors
    ///
    /// [`ImageError::SubresourceOutOfRange`] for an index past its level.
    pub fn at(&self, array_or_z: u32, mip: u32) -> Result<PixelBuffer<'a>, ImageError> {
        let index = self.image.layout().index_of_slice(array_or_z, mip)?;
        Ok(self.image.view(index))
    }

    /// Buffer for `(array, z, mip)`.
    ///
    /// # Errors
    ///
    /// [`ImageError::SubresourceOutOfRange`] for an index past its level.
    pub fn at_subresource(
        &self,
        array: u32,
        z: u32,
        mip: u32,
    ) -> Result<PixelBuffer<'a>, ImageError> {
        let index = self.image.layout().index_of(array, z, mip)?;
        Ok(self.image.view(index))
    }

    /// Iterate in storage order.
    pub fn iter(&self) -> Iter<'a> {
        Iter {
            image: self.image,
            front: 0,
            back: self.len(),
        }
    }
}

impl<'a> IntoIterator for PixelBufferArray<'a> {
    type Item = PixelBuffer<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &PixelBufferArray<'a> {
    type Item = PixelBuffer<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`PixelBuffer`]s in storage order.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    image: &'a Image,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = PixelBuffer<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let buffer = self.image.view(self.front);
        self.front += 1;
        Some(buffer)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.image.view(self.back))
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

/// Iterator over disjoint [`PixelBufferMut`]s in storage order.
///
/// Returned by [`Image::pixel_buffers_mut`].
#[derive(Debug)]
pub struct IterMut<'a> {
    rest: &'a mut [u8],
    consumed: usize,
    slots: slice::Iter<'a, Slot>,
}

impl<'a> IterMut<'a> {
    pub(crate) fn new(data: &'a mut [u8], slots: &'a [Slot]) -> Self {
        Self {
            rest: data,
            consumed: 0,
            slots: slots.iter(),
        }
    }
}

impl<'a> Iterator for IterMut<'a> {
    type Item = PixelBufferMut<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        // Slots are sorted by offset and never overlap.
        let rest = core::mem::take(&mut self.rest);
        let (_, rest) = rest.split_at_mut(slot.offset - self.consumed);
        let (buffer, rest) = rest.split_at_mut(slot.len);
        self.rest = rest;
        self.consumed = slot.offset + slot.len;
        Some(PixelBufferMut::from_parts(buffer, slot.info))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl ExactSizeIterator for IterMut<'_> {}
impl FusedIterator for IterMut<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageDescription, MipMapCount, SurfaceFormat};
    use alloc::vec::Vec;

    fn array_image() -> Image {
        Image::new(&ImageDescription::new_2d(
            4,
            4,
            MipMapCount::Auto,
            SurfaceFormat::R8Unorm,
            2,
        ))
        .unwrap()
    }

    #[test]
    fn len_and_get() {
        let image = array_image();
        let buffers = image.pixel_buffers();
        assert_eq!(buffers.len(), 6);
        assert!(!buffers.is_empty());
        assert_eq!(buffers.get(3).unwrap().width(), 4);
        assert_eq!(buffers.get(5).unwrap().width(), 1);
        assert!(buffers.get(6).is_none());
    }

    #[test]
    fn at_and_at_subresource_agree() {
        let image = array_image();
        let buffers = image.pixel_buffers();
        let a = buffers.at(1, 1).unwrap();
        let b = buffers.at_subresource(1, 0, 1).unwrap();
        assert_eq!(a.data().as_ptr(), b.data().as_ptr());
        assert_eq!(a.mip_level(), 1);
        assert!(matches!(
            buffers.at(2, 0),
            Err(ImageError::SubresourceOutOfRange { what: "array", .. })
        ));
    }

    #[test]
    fn iteration_follows_storage_order() {
        let image = array_image();
        let widths: Vec<u32> = image.pixel_buffers().iter().map(|b| b.width()).collect();
        assert_eq!(widths, [4, 2, 1, 4, 2, 1]);
        let last = image.pixel_buffers().iter().next_back().unwrap();
        assert_eq!(last.width(), 1);
        assert_eq!(image.pixel_buffers().iter().len(), 6);
        let mut count = 0;
        for _ in &image.pixel_buffers() {
            count += 1;
        }
        assert_eq!(count, 6);
    }

    #[test]
    fn mutable_buffers_are_disjoint() {
        let mut image = array_image();
        for (i, mut buffer) in image.pixel_buffers_mut().enumerate() {
            buffer.data_mut().fill(i as u8 + 1);
        }
        let data = image.data();
        assert_eq!(data.len(), 2 * (16 + 4 + 1));
        assert!(data[..16].iter().all(|&b| b == 1));
        assert!(data[16..20].iter().all(|&b| b == 2));
        assert_eq!(data[20], 3);
        assert!(data[21..37].iter().all(|&b| b == 4));
        assert_eq!(data[41], 6);
    }
}

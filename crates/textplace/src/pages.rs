//! Page-filtered iteration over extracted placements.

use std::iter::FusedIterator;
use std::slice;

use textplace_core::TextPlacement;

/// Placements whose page lies in a half-open range.
///
/// Created by [`TextPlacementReader::pages`](crate::TextPlacementReader::pages).
/// Placements are stored in page order, so the range is a contiguous slice.
#[derive(Debug, Clone)]
pub struct PageRange<'a> {
    inner: slice::Iter<'a, TextPlacement>,
}

impl<'a> PageRange<'a> {
    /// Select the placements of `placements` on pages `start..end`.
    ///
    /// `end = None` runs to the last page. An inverted range is empty.
    pub(crate) fn new(placements: &'a [TextPlacement], start: usize, end: Option<usize>) -> Self {
        let lo = placements.partition_point(|p| p.page < start);
        let hi = match end {
            Some(end) => placements.partition_point(|p| p.page < end).max(lo),
            None => placements.len(),
        };
        Self {
            inner: placements[lo..hi].iter(),
        }
    }

    /// The selected placements as a slice.
    pub fn as_slice(&self) -> &'a [TextPlacement] {
        self.inner.as_slice()
    }
}

impl<'a> Iterator for PageRange<'a> {
    type Item = &'a TextPlacement;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for PageRange<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl ExactSizeIterator for PageRange<'_> {}

impl FusedIterator for PageRange<'_> {}

//! Frame iteration over the sample region
//!
//! The header's frame count cannot be trusted: a capture may be cut off while
//! the simulator is still writing it. Frames are therefore discovered by
//! comparing each frame's end offset against the capture length.

use crate::types::Frame;

/// Lazy, forward-only sequence of complete frames.
///
/// Frame `i` covers `[buf_offset + i * buf_len, buf_offset + (i + 1) * buf_len)`.
/// Iteration ends at the first frame that would extend past the capture.
#[derive(Debug, Clone)]
pub struct FrameIterator<'a> {
    data: &'a [u8],
    buf_offset: usize,
    buf_len: usize,
    index: usize,
}

impl<'a> FrameIterator<'a> {
    pub fn new(data: &'a [u8], buf_offset: usize, buf_len: usize) -> Self {
        Self { data, buf_offset, buf_len, index: 0 }
    }

    /// Restart from frame 0.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Index of the next frame to be produced.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte range of frame `index`, if it lies entirely within the capture.
    fn frame_bounds(&self, index: usize) -> Option<(usize, usize)> {
        if self.buf_len == 0 {
            return None;
        }
        let start = index.checked_mul(self.buf_len)?.checked_add(self.buf_offset)?;
        let end = start.checked_add(self.buf_len)?;
        (end <= self.data.len()).then_some((start, end))
    }

    /// Random access to frame `index`.
    pub fn get(&self, index: usize) -> Option<Frame<'a>> {
        let (start, end) = self.frame_bounds(index)?;
        Some(Frame::new(index, start, &self.data[start..end]))
    }

    /// Number of complete frames in the capture.
    pub fn total(&self) -> usize {
        if self.buf_len == 0 {
            return 0;
        }
        self.data.len().saturating_sub(self.buf_offset) / self.buf_len
    }
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.get(self.index)?;
        self.index += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FrameIterator<'_> {}

impl std::iter::FusedIterator for FrameIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_exact_length_yields_k_frames(
            buf_offset in 0usize..256,
            buf_len in 1usize..64,
            k in 0usize..32
        ) {
            let data = vec![0u8; buf_offset + k * buf_len];
            let frames = FrameIterator::new(&data, buf_offset, buf_len);
            prop_assert_eq!(frames.len(), k);
            prop_assert_eq!(frames.count(), k);
        }

        #[test]
        fn prop_partial_trailing_frame_is_not_yielded(
            buf_offset in 0usize..256,
            buf_len in 2usize..64,
            k in 0usize..32,
            extra in 1usize..64
        ) {
            let extra = extra % buf_len;
            prop_assume!(extra > 0);
            let data = vec![0u8; buf_offset + k * buf_len + extra];
            prop_assert_eq!(FrameIterator::new(&data, buf_offset, buf_len).count(), k);
        }

        #[test]
        fn prop_frames_tile_the_sample_region(
            buf_len in 1usize..32,
            k in 1usize..16
        ) {
            let buf_offset = 10;
            let data: Vec<u8> = (0..buf_offset + k * buf_len).map(|i| i as u8).collect();

            for (i, frame) in FrameIterator::new(&data, buf_offset, buf_len).enumerate() {
                prop_assert_eq!(frame.index, i);
                prop_assert_eq!(frame.offset, buf_offset + i * buf_len);
                prop_assert_eq!(frame.len(), buf_len);
                prop_assert_eq!(frame.data(), &data[frame.offset..frame.offset + buf_len]);
            }
        }
    }

    #[test]
    fn one_byte_past_exact_length_still_yields_k() {
        let data = vec![0u8; 100 + 3 * 12 + 1];
        assert_eq!(FrameIterator::new(&data, 100, 12).count(), 3);
    }

    #[test]
    fn zero_buf_len_yields_nothing() {
        let data = vec![0u8; 64];
        let mut frames = FrameIterator::new(&data, 0, 0);
        assert_eq!(frames.total(), 0);
        assert!(frames.next().is_none());
    }

    #[test]
    fn buf_offset_past_end_yields_nothing() {
        let data = vec![0u8; 16];
        assert_eq!(FrameIterator::new(&data, 32, 4).count(), 0);
    }

    #[test]
    fn reset_restarts_the_sequence() {
        let data = vec![0u8; 8 + 2 * 4];
        let mut frames = FrameIterator::new(&data, 8, 4);

        assert_eq!(frames.by_ref().count(), 2);
        assert!(frames.next().is_none());
        assert_eq!(frames.index(), 2);

        frames.reset();
        assert_eq!(frames.index(), 0);
        assert_eq!(frames.next().map(|f| f.index), Some(0));
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn random_access_matches_iteration() {
        let data: Vec<u8> = (0..40u8).collect();
        let frames = FrameIterator::new(&data, 4, 6);
        let third = frames.get(2).expect("third frame should exist");
        assert_eq!(third.data(), &[16, 17, 18, 19, 20, 21]);
        assert!(frames.get(6).is_none());
    }

    #[test]
    fn huge_index_does_not_overflow() {
        let data = vec![0u8; 16];
        let frames = FrameIterator::new(&data, 4, usize::MAX / 2);
        assert!(frames.get(4).is_none());
    }
}

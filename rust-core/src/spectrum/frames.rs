//! Frame segmentation
//!
//! Slices one channel into overlapping fixed-length frames without copying

use crate::config::AnalysisConfig;
use crate::error::Result;

/// Iterator over the frames of one channel, in ascending frame order
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    samples: &'a [f64],
    frame_size: usize,
    hop: usize,
    next: usize,
    count: usize,
}

impl<'a> Frames<'a> {
    /// Total number of frames, independent of iteration progress
    pub fn frame_count(&self) -> usize {
        self.count
    }

    /// Frame `index` without advancing the iterator
    pub fn get(&self, index: usize) -> Option<&'a [f64]> {
        if index >= self.count {
            return None;
        }
        let start = index * self.hop;
        Some(&self.samples[start..start + self.frame_size])
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.get(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Split `samples` into frames of `config.frame_size()` starting every `config.hop()`
///
/// Trailing samples that do not fill a complete frame are dropped.
///
/// # Errors
/// `InsufficientData` if the channel is shorter than one frame
pub fn segment<'a>(samples: &'a [f64], config: &AnalysisConfig) -> Result<Frames<'a>> {
    let count = config.frame_count(samples.len())?;

    Ok(Frames {
        samples,
        frame_size: config.frame_size(),
        hop: config.hop(),
        next: 0,
        count,
    })
}

//! Per-frame spectrum sampling and the bounded rolling history of frames.

use std::collections::VecDeque;
use std::sync::Arc;

/// One captured row of byte magnitudes, one per frequency bin.
///
/// Cheap to clone; the samples are shared and never mutated after capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyFrame(Arc<[u8]>);

impl FrequencyFrame {
    pub fn new(bins: impl Into<Arc<[u8]>>) -> Self {
        Self(bins.into())
    }

    /// All-zero frame of `bins` samples
    pub fn silent(bins: usize) -> Self {
        Self(vec![0u8; bins].into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for FrequencyFrame {
    fn from(bins: Vec<u8>) -> Self {
        Self::new(bins)
    }
}

/// Anything that can hand out the current magnitude array without blocking
pub trait FrequencySource {
    /// Latest magnitudes, or None when nothing can be read right now
    fn frequency_data(&mut self) -> Option<FrequencyFrame>;
}

/// A missing source (no audio device) never has data
impl<S: FrequencySource> FrequencySource for Option<S> {
    fn frequency_data(&mut self) -> Option<FrequencyFrame> {
        self.as_mut()?.frequency_data()
    }
}

/// Pulls one frame per render frame, falling back to the previous frame
pub struct SpectrumSampler {
    last: FrequencyFrame,
    stale_frames: u64,
}

impl SpectrumSampler {
    /// Create a sampler whose fallback before the first capture is silence
    pub fn new(bins: usize) -> Self {
        Self {
            last: FrequencyFrame::silent(bins),
            stale_frames: 0,
        }
    }

    /// Current magnitudes from `source`, or the previous frame unchanged
    pub fn sample<S: FrequencySource + ?Sized>(&mut self, source: &mut S) -> FrequencyFrame {
        match source.frequency_data() {
            Some(frame) => {
                self.last = frame;
                self.stale_frames = 0;
            }
            None => {
                self.stale_frames += 1;
                log::trace!("No spectrum data, reusing previous frame ({} stale)", self.stale_frames);
            }
        }
        self.last.clone()
    }

    /// Number of consecutive samples that reused the previous frame
    pub fn stale_frames(&self) -> u64 {
        self.stale_frames
    }
}

/// Fixed-depth FIFO of frames; index 0 is the newest
#[derive(Debug, Clone)]
pub struct History {
    rows: VecDeque<FrequencyFrame>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert `frame` as the newest row, evicting the oldest beyond capacity
    pub fn push(&mut self, frame: FrequencyFrame) {
        self.rows.push_front(frame);
        self.rows.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Row `r` (0 = newest)
    pub fn get(&self, r: usize) -> Option<&FrequencyFrame> {
        self.rows.get(r)
    }

    /// Rows from newest to oldest
    pub fn rows(&self) -> impl Iterator<Item = &FrequencyFrame> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source replaying a fixed script, one entry per call
    struct Scripted(VecDeque<Option<FrequencyFrame>>);

    impl FrequencySource for Scripted {
        fn frequency_data(&mut self) -> Option<FrequencyFrame> {
            self.0.pop_front().flatten()
        }
    }

    fn frame(v: u8) -> FrequencyFrame {
        FrequencyFrame::from(vec![v; 4])
    }

    #[test]
    fn test_sampler_starts_silent() {
        let mut sampler = SpectrumSampler::new(4);
        let mut source = Scripted(VecDeque::from([None]));

        assert_eq!(sampler.sample(&mut source), FrequencyFrame::silent(4));
        assert_eq!(sampler.stale_frames(), 1);
    }

    #[test]
    fn test_sampler_reuses_previous_frame_when_source_is_empty() {
        let mut sampler = SpectrumSampler::new(4);
        let mut source = Scripted(VecDeque::from([Some(frame(7)), None, None, Some(frame(9))]));

        assert_eq!(sampler.sample(&mut source), frame(7));
        assert_eq!(sampler.sample(&mut source), frame(7));
        assert_eq!(sampler.sample(&mut source), frame(7));
        assert_eq!(sampler.stale_frames(), 2);
        assert_eq!(sampler.sample(&mut source), frame(9));
        assert_eq!(sampler.stale_frames(), 0);
    }

    #[test]
    fn test_absent_source_is_always_stale() {
        let mut sampler = SpectrumSampler::new(4);
        let mut source: Option<Scripted> = None;

        assert_eq!(sampler.sample(&mut source), FrequencyFrame::silent(4));

        let mut present = Some(Scripted(VecDeque::from([Some(frame(3))])));
        assert_eq!(sampler.sample(&mut present), frame(3));
    }

    #[test]
    fn test_history_newest_first() {
        let mut history = History::new(3);
        history.push(frame(1));
        history.push(frame(2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some(&frame(2)));
        assert_eq!(history.get(1), Some(&frame(1)));
    }

    #[test]
    fn test_history_never_exceeds_capacity() {
        let capacity = 40;
        let mut history = History::new(capacity);

        for v in 0..=capacity as u8 {
            history.push(frame(v));
            assert!(history.len() <= capacity);
        }

        // After H + 1 pushes the first frame is gone
        assert_eq!(history.len(), capacity);
        assert!(history.rows().all(|f| *f != frame(0)));
        assert_eq!(history.get(capacity - 1), Some(&frame(1)));
        assert_eq!(history.get(0), Some(&frame(capacity as u8)));
    }
}

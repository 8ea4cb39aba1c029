//! Byte spectrum analysis of the playback signal.
//!
//! Produces one magnitude per bin in 0..=255: Blackman window, forward FFT,
//! `|X| / N`, exponential smoothing over time, decibel conversion, then a
//! linear map of `[min_decibels, max_decibels]` onto the byte range.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::params::AnalyserConfig;
use crate::spectrum::FrequencyFrame;

/// Bounded ring of the most recent mono output samples
#[derive(Debug)]
pub struct AnalysisTap {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl AnalysisTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one sample, dropping the oldest beyond capacity
    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy the samples (oldest first) into `out`, left-padded with silence
    pub fn snapshot_into(&self, out: &mut [f32]) {
        let missing = out.len().saturating_sub(self.samples.len());
        out[..missing].fill(0.0);

        let skip = self.samples.len().saturating_sub(out.len());
        for (dst, &src) in out[missing..].iter_mut().zip(self.samples.iter().skip(skip)) {
            *dst = src;
        }
    }
}

/// Spectrum analyser with temporal smoothing state
pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    config: AnalyserConfig,
}

impl Analyser {
    pub fn new(config: AnalyserConfig) -> Self {
        let size = config.fft_size;
        let mut planner = FftPlanner::new();

        Self {
            fft: planner.plan_fft_forward(size),
            window: (0..size).map(|i| blackman_window(i, size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; config.bin_count()],
            config,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    /// Analyse exactly `fft_size` time-domain samples (oldest first)
    pub fn analyse(&mut self, samples: &[f32]) -> FrequencyFrame {
        debug_assert_eq!(samples.len(), self.fft_size());
        let size = self.fft_size();

        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing;
        let min_db = self.config.min_decibels;
        let scale = 255.0 / (self.config.max_decibels - min_db);

        let bins = self
            .buffer
            .iter()
            .take(self.smoothed.len())
            .zip(self.smoothed.iter_mut())
            .map(|(x, smoothed)| {
                let magnitude = x.norm() / size as f32;
                let next = tau * *smoothed + (1.0 - tau) * magnitude;
                *smoothed = if next.is_finite() { next } else { 0.0 };

                let db = 20.0 * smoothed.log10();
                (scale * (db - min_db)).floor().clamp(0.0, 255.0) as u8
            })
            .collect::<Vec<u8>>();

        FrequencyFrame::from(bins)
    }

    /// Forget the smoothing history (used when the track changes)
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

/// Blackman window (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bin: usize, size: usize) -> Vec<f32> {
        (0..size)
            .map(|n| (2.0 * PI * bin as f32 * n as f32 / size as f32).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 64;

        // Zero at the start, one at the center
        assert!(blackman_window(0, size).abs() < 1e-6);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_is_all_zero() {
        let mut analyser = Analyser::new(AnalyserConfig::default());
        let frame = analyser.analyse(&vec![0.0; analyser.fft_size()]);

        assert_eq!(frame.len(), 32);
        assert!(frame.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let mut analyser = Analyser::new(AnalyserConfig::default());
        let samples = tone(6, analyser.fft_size());

        let mut frame = analyser.analyse(&samples);
        for _ in 0..20 {
            frame = analyser.analyse(&samples);
        }

        // The main lobe spans neighbouring bins; far bins stay quiet
        let bins = frame.as_slice();
        assert_eq!(bins[6], 255);
        assert!(bins.iter().all(|&b| b <= bins[6]));
        assert!(bins[20] < bins[6]);
        assert!(bins[0] < bins[6]);
    }

    #[test]
    fn test_smoothing_decays_after_signal_stops() {
        let mut analyser = Analyser::new(AnalyserConfig::default());
        let size = analyser.fft_size();
        for _ in 0..10 {
            analyser.analyse(&tone(4, size));
        }

        let loud = analyser.analyse(&vec![0.0; size]).as_slice()[4];
        let mut quiet = loud;
        for _ in 0..30 {
            quiet = analyser.analyse(&vec![0.0; size]).as_slice()[4];
        }
        assert!(quiet < loud);

        analyser.reset();
        assert_eq!(analyser.analyse(&vec![0.0; size]).as_slice()[4], 0);
    }

    #[test]
    fn test_tap_keeps_latest_samples() {
        let mut tap = AnalysisTap::new(4);
        for s in 1..=6 {
            tap.push(s as f32);
        }
        assert_eq!(tap.len(), 4);

        let mut out = [0.0; 4];
        tap.snapshot_into(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_tap_pads_with_silence() {
        let mut tap = AnalysisTap::new(4);
        tap.push(1.0);
        tap.push(2.0);

        let mut out = [9.0; 4];
        tap.snapshot_into(&mut out);
        assert_eq!(out, [0.0, 0.0, 1.0, 2.0]);
    }
}

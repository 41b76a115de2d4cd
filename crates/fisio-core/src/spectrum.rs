//! Spectral Analyzer — single-sided amplitude spectrum and tremor band
//!
//! Computes the single-sided amplitude spectrum of the joint-angle series
//! after DC removal: `amplitude[k] = 2/N · |FFT(x)[k]|` for k in
//! [0, N/2), with frequency bins `k · fs / N`. The dominant spectral peak
//! (excluding the DC bin) drives the tremor assessment: oscillation
//! faster than 4 Hz falls inside the pathological 4–8 Hz tremor band.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::spectrum::SpectrumAnalyzer;
//!
//! // 5 Hz sine at 50 Hz for 4 seconds
//! let signal: Vec<f64> = (0..200)
//!     .map(|i| (2.0 * std::f64::consts::PI * 5.0 * i as f64 / 50.0).sin())
//!     .collect();
//! let mut analyzer = SpectrumAnalyzer::new();
//! let spectrum = analyzer.analyze(&signal, 50.0).unwrap();
//! let (freq, _) = spectrum.peak().unwrap();
//! assert!((freq - 5.0).abs() <= 50.0 / 200.0);
//! assert!(spectrum.tremor_flag());
//! ```

use rustfft::{num_complex::Complex64, FftPlanner};
use serde::{Deserialize, Serialize};

/// Tremor band in Hz: oscillation in this range is flagged pathological.
pub const TREMOR_BAND_HZ: (f64, f64) = (4.0, 8.0);

/// Single-sided amplitude spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplitudeSpectrum {
    /// Frequency bins in Hz, `k · fs / N` for k in [0, N/2).
    pub freq_hz: Vec<f64>,
    /// Amplitude per bin, `2/N · |X[k]|`.
    pub amplitude: Vec<f64>,
}

impl AmplitudeSpectrum {
    /// Dominant peak `(frequency, amplitude)`, excluding the DC bin.
    ///
    /// `None` when the spectrum has fewer than 2 bins.
    pub fn peak(&self) -> Option<(f64, f64)> {
        let (idx, amp) = self
            .amplitude
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        Some((self.freq_hz[idx], *amp))
    }

    /// Peak frequency in Hz, 0 when no peak is resolvable.
    pub fn peak_frequency(&self) -> f64 {
        self.peak().map(|(f, _)| f).unwrap_or(0.0)
    }

    /// Tremor flagged when the dominant peak exceeds the lower edge of
    /// the tremor band.
    pub fn tremor_flag(&self) -> bool {
        self.peak_frequency() > TREMOR_BAND_HZ.0
    }

    /// Energy in the 4-8 Hz tremor band as a fraction of total spectral
    /// energy (DC excluded). 0 for degenerate spectra.
    pub fn tremor_band_fraction(&self) -> f64 {
        let mut band = 0.0;
        let mut total = 0.0;
        for (f, a) in self.freq_hz.iter().zip(self.amplitude.iter()).skip(1) {
            let e = a * a;
            total += e;
            if *f >= TREMOR_BAND_HZ.0 && *f <= TREMOR_BAND_HZ.1 {
                band += e;
            }
        }
        if total > 0.0 {
            band / total
        } else {
            0.0
        }
    }
}

/// FFT-based spectrum analyzer with a cached planner.
pub struct SpectrumAnalyzer {
    planner: FftPlanner<f64>,
}

impl std::fmt::Debug for SpectrumAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyzer").finish()
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Compute the single-sided amplitude spectrum.
    ///
    /// The mean is subtracted before transforming so the DC bin carries
    /// no offset. An empty signal returns `None` (the "no spectrum"
    /// sentinel), never an error.
    pub fn analyze(&mut self, signal: &[f64], sample_rate: f64) -> Option<AmplitudeSpectrum> {
        let n = signal.len();
        if n == 0 {
            return None;
        }

        let mean = signal.iter().sum::<f64>() / n as f64;
        let mut buffer: Vec<Complex64> = signal
            .iter()
            .map(|&x| Complex64::new(x - mean, 0.0))
            .collect();

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let half = n / 2;
        let scale = 2.0 / n as f64;
        let freq_hz = (0..half).map(|k| k as f64 * sample_rate / n as f64).collect();
        let amplitude = buffer[..half].iter().map(|c| scale * c.norm()).collect();

        Some(AmplitudeSpectrum { freq_hz, amplitude })
    }
}

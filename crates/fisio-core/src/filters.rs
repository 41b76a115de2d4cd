//! Smoothing filters for the signal conditioner
//!
//! Two smoothing stages are provided: a boxcar moving-average convolution
//! (interactive dashboard path) and a Butterworth low-pass applied
//! forward-backward for zero phase distortion (scientific-report path).
//! The IIR filter is built from cascaded biquad sections for numerical
//! stability, designed via analog prototype poles and the bilinear
//! transform.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::filters::{ButterworthLowpass, filtfilt};
//!
//! // 4th-order Butterworth at 6 Hz, 50 Hz sample rate
//! let lpf = ButterworthLowpass::design(4, 6.0, 50.0);
//! let input = vec![1.0; 100];
//! let output = filtfilt(&lpf, &input);
//! assert_eq!(output.len(), input.len());
//! // DC passes through unchanged
//! assert!((output[50] - 1.0).abs() < 1e-6);
//! ```

use num_complex::Complex64;
use std::f64::consts::PI;

/// A single biquad (second-order section) filter.
///
/// Transfer function: H(z) = (b0 + b1·z⁻¹ + b2·z⁻²) / (1 + a1·z⁻¹ + a2·z⁻²)
///
/// Direct Form II Transposed for better numerical properties.
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Numerator coefficients [b0, b1, b2]
    b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 normalized to 1)
    a: [f64; 2],
    /// State variables
    state: [f64; 2],
}

impl Biquad {
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self {
            b,
            a,
            state: [0.0; 2],
        }
    }

    /// Process a single sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.state[0];
        self.state[0] = self.b[1] * input - self.a[0] * output + self.state[1];
        self.state[1] = self.b[2] * input - self.a[1] * output;
        output
    }

    /// Reset the filter state.
    pub fn reset(&mut self) {
        self.state = [0.0; 2];
    }

    /// Check stability (poles inside the unit circle).
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }
}

/// Butterworth low-pass filter as a cascade of biquad sections.
#[derive(Debug, Clone)]
pub struct ButterworthLowpass {
    sections: Vec<Biquad>,
    order: usize,
}

impl ButterworthLowpass {
    /// Design a Butterworth low-pass filter.
    ///
    /// Maximally flat passband, monotonic rolloff. The analog prototype
    /// poles are placed on the s-plane unit circle, scaled by the
    /// pre-warped cutoff, and mapped to z via the bilinear transform.
    ///
    /// # Arguments
    /// * `order` - Filter order (1-20)
    /// * `cutoff_hz` - Cutoff frequency in Hz (-3 dB point)
    /// * `sample_rate` - Sample rate in Hz
    pub fn design(order: usize, cutoff_hz: f64, sample_rate: f64) -> Self {
        assert!(order > 0 && order <= 20, "Order must be 1-20");
        assert!(cutoff_hz > 0.0 && cutoff_hz < sample_rate / 2.0);

        // Pre-warp the cutoff frequency
        let wc = 2.0 * sample_rate * (PI * cutoff_hz / sample_rate).tan();
        let k = 2.0 * sample_rate;

        let poles = butterworth_poles(order);
        let mut sections = Vec::new();
        let mut i = 0;
        while i < poles.len() {
            if poles[i].im.abs() < 1e-10 {
                // Real pole, first-order section
                let p = poles[i].re * wc;
                let alpha = k - p;
                let beta = k + p;
                sections.push(Biquad::new(
                    [-p / alpha, -p / alpha, 0.0],
                    [-beta / alpha, 0.0],
                ));
                i += 1;
            } else {
                // Complex conjugate pair, second-order section
                let p = poles[i] * wc;
                sections.push(bilinear_2pole_lowpass(p, k));
                i += 2; // Skip conjugate
            }
        }

        Self { sections, order }
    }

    /// Process a block of samples through the cascade (single pass).
    pub fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input
            .iter()
            .map(|&x| {
                self.sections
                    .iter_mut()
                    .fold(x, |acc, section| section.process(acc))
            })
            .collect()
    }

    /// Reset all section states.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of biquad sections.
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// All sections stable.
    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(|s| s.is_stable())
    }
}

/// Analog Butterworth prototype poles on the s-plane unit circle.
fn butterworth_poles(order: usize) -> Vec<Complex64> {
    let mut poles = Vec::with_capacity(order);
    for k in 0..order {
        let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
        poles.push(Complex64::new(theta.cos(), theta.sin()));
    }
    poles
}

/// Bilinear transform of a complex conjugate pole pair, lowpass mapping.
fn bilinear_2pole_lowpass(p: Complex64, k: f64) -> Biquad {
    let p_mag_sq = p.re * p.re + p.im * p.im;
    let k2 = k * k;
    let d = k2 - 2.0 * k * p.re + p_mag_sq;

    let b = [p_mag_sq / d, 2.0 * p_mag_sq / d, p_mag_sq / d];
    let a = [
        2.0 * (p_mag_sq - k2) / d,
        (k2 + 2.0 * k * p.re + p_mag_sq) / d,
    ];
    Biquad::new(b, a)
}

/// Zero-phase forward-backward filtering.
///
/// Runs the cascade forward over the input, then backward, cancelling the
/// phase response. The signal is extended at both ends by odd reflection
/// before filtering to suppress edge transients; the extension is
/// stripped from the result. Output length equals input length.
pub fn filtfilt(filter: &ButterworthLowpass, input: &[f64]) -> Vec<f64> {
    let n = input.len();
    if n == 0 {
        return Vec::new();
    }

    // Odd reflection padding, 3 transient lengths like scipy's default
    let pad = (3 * (2 * filter.num_sections() + 1)).min(n - 1);
    let mut extended = Vec::with_capacity(n + 2 * pad);
    for i in (1..=pad).rev() {
        extended.push(2.0 * input[0] - input[i]);
    }
    extended.extend_from_slice(input);
    for i in 1..=pad {
        extended.push(2.0 * input[n - 1] - input[n - 1 - i]);
    }

    let mut fwd = filter.clone();
    fwd.reset();
    let mut y = fwd.process_block(&extended);

    y.reverse();
    let mut bwd = filter.clone();
    bwd.reset();
    let mut y = bwd.process_block(&y);
    y.reverse();

    y[pad..pad + n].to_vec()
}

/// Boxcar moving-average convolution in "same" mode.
///
/// Convolves the signal with a length-`window` averaging kernel and
/// keeps the centered portion, so output length equals input length.
/// Inputs shorter than the window are returned unchanged.
pub fn moving_average_same(input: &[f64], window: usize) -> Vec<f64> {
    let n = input.len();
    let w = window.max(1);
    if n < w {
        return input.to_vec();
    }

    let scale = 1.0 / w as f64;
    let offset = (w - 1) / 2;
    let mut output = Vec::with_capacity(n);
    for i in 0..n {
        let mut acc = 0.0;
        for j in 0..w {
            let idx = i as isize + offset as isize - j as isize;
            if idx >= 0 && (idx as usize) < n {
                acc += input[idx as usize];
            }
        }
        output.push(acc * scale);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biquad_unity() {
        let mut bq = Biquad::new([1.0, 0.0, 0.0], [0.0, 0.0]);
        assert!((bq.process(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_butterworth_design() {
        let lpf = ButterworthLowpass::design(4, 6.0, 50.0);
        assert_eq!(lpf.order(), 4);
        assert_eq!(lpf.num_sections(), 2); // 4th order = 2 biquads
        assert!(lpf.is_stable());
    }

    #[test]
    fn test_butterworth_dc_gain() {
        // DC must pass with unity gain
        let mut lpf = ButterworthLowpass::design(4, 6.0, 50.0);
        let out = lpf.process_block(&vec![1.0; 500]);
        assert!((out[499] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_butterworth_attenuates_high_freq() {
        // 20 Hz tone at fs = 50 Hz is far above the 6 Hz cutoff
        let mut lpf = ButterworthLowpass::design(4, 6.0, 50.0);
        let input: Vec<f64> = (0..500)
            .map(|i| (2.0 * PI * 20.0 * i as f64 / 50.0).sin())
            .collect();
        let out = lpf.process_block(&input);
        let peak = out[250..].iter().fold(0.0f64, |m, &x| m.max(x.abs()));
        assert!(peak < 0.01, "stopband leak: {peak}");
    }

    #[test]
    fn test_filtfilt_preserves_length_and_dc() {
        let lpf = ButterworthLowpass::design(4, 6.0, 50.0);
        let input = vec![3.0; 120];
        let out = filtfilt(&lpf, &input);
        assert_eq!(out.len(), input.len());
        for &y in &out {
            assert!((y - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_filtfilt_zero_phase() {
        // A slow 1 Hz tone should come through with no delay: the
        // forward-backward output peaks where the input peaks.
        let lpf = ButterworthLowpass::design(4, 6.0, 50.0);
        let input: Vec<f64> = (0..200)
            .map(|i| (2.0 * PI * 1.0 * i as f64 / 50.0).sin())
            .collect();
        let out = filtfilt(&lpf, &input);
        let in_peak = input[..50]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        let out_peak = out[..50]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0;
        assert!(
            (in_peak as i64 - out_peak as i64).abs() <= 1,
            "phase shift: in {in_peak} out {out_peak}"
        );
    }

    #[test]
    fn test_filtfilt_empty() {
        let lpf = ButterworthLowpass::design(4, 6.0, 50.0);
        assert!(filtfilt(&lpf, &[]).is_empty());
    }

    #[test]
    fn test_moving_average_constant() {
        let out = moving_average_same(&[2.0; 30], 10);
        assert_eq!(out.len(), 30);
        // Interior points see the full window
        assert!((out[15] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_short_input_passthrough() {
        let input = vec![1.0, 2.0, 3.0];
        assert_eq!(moving_average_same(&input, 10), input);
    }

    #[test]
    fn test_moving_average_smooths_step() {
        let mut input = vec![0.0; 20];
        input.extend(vec![1.0; 20]);
        let out = moving_average_same(&input, 4);
        // The step edge is spread over the window
        assert!(out[19] > 0.0 && out[19] < 1.0);
        assert!((out[10] - 0.0).abs() < 1e-12);
        assert!((out[30] - 1.0).abs() < 1e-12);
    }
}

//! Numerical differentiation and integration
//!
//! Central-difference derivatives and composite Simpson integration over
//! uniformly sampled series. These are the primitives behind angular
//! velocity, acceleration, jerk, and the session energy integral.
//! All functions are deterministic pure functions of their inputs.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::calculus::{central_difference, simpson};
//!
//! // d/dt of t² sampled at dt = 1 is 2t at interior points
//! let y = vec![0.0, 1.0, 4.0, 9.0, 16.0];
//! let dy = central_difference(&y, 1.0);
//! assert!((dy[2] - 4.0).abs() < 1e-12);
//!
//! // ∫1 dt over [0, 4]
//! let area = simpson(&[1.0; 5], 1.0);
//! assert!((area - 4.0).abs() < 1e-12);
//! ```

/// Central-difference derivative over a uniform step `h`.
///
/// Interior points use the symmetric difference `(y[i+1] - y[i-1]) / (2h)`;
/// the two boundary points use one-sided differences. Series shorter than
/// 3 samples return all zeros of the same length.
pub fn central_difference(y: &[f64], h: f64) -> Vec<f64> {
    let n = y.len();
    let mut dy = vec![0.0; n];
    if n < 3 {
        return dy;
    }
    for i in 1..n - 1 {
        dy[i] = (y[i + 1] - y[i - 1]) / (2.0 * h);
    }
    dy[0] = (y[1] - y[0]) / h;
    dy[n - 1] = (y[n - 1] - y[n - 2]) / h;
    dy
}

/// Composite Simpson integration over a uniform step `h`.
///
/// `(h/3) · (y[0] + y[N-1] + 4·Σ odd + 2·Σ even)`. Series shorter than
/// 3 samples fall back to the rectangle rule `Σy · h`.
pub fn simpson(y: &[f64], h: f64) -> f64 {
    if y.len() < 3 {
        return y.iter().sum::<f64>() * h;
    }
    let n = y.len();
    let mut odd = 0.0;
    let mut even = 0.0;
    for (i, &v) in y.iter().enumerate().take(n - 1).skip(1) {
        if i % 2 == 1 {
            odd += v;
        } else {
            even += v;
        }
    }
    (h / 3.0) * (y[0] + y[n - 1] + 4.0 * odd + 2.0 * even)
}

/// Trapezoid-rule cumulative integral, same length as the input.
///
/// `out[0] = y0`; `out[i] = out[i-1] + h·(y[i-1] + y[i])/2`. Inverse of
/// [`central_difference`] up to boundary effects, used to verify the
/// derivative operators.
pub fn cumulative_trapezoid(y: &[f64], h: f64, y0: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(y.len());
    let mut acc = y0;
    out.push(acc);
    for i in 1..y.len() {
        acc += h * (y[i - 1] + y[i]) / 2.0;
        out.push(acc);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_difference_linear() {
        // Derivative of 3t is exactly 3 everywhere, boundaries included
        let h = 0.1;
        let y: Vec<f64> = (0..20).map(|i| 3.0 * i as f64 * h).collect();
        let dy = central_difference(&y, h);
        for d in dy {
            assert!((d - 3.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_central_difference_constant() {
        let dy = central_difference(&[5.0; 10], 0.02);
        assert!(dy.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_central_difference_short_series() {
        assert_eq!(central_difference(&[1.0, 2.0], 1.0), vec![0.0, 0.0]);
        assert_eq!(central_difference(&[], 1.0), Vec::<f64>::new());
    }

    #[test]
    fn test_simpson_quadratic_exact() {
        // Simpson is exact for polynomials up to cubic: ∫t² over [0, 2] = 8/3
        let h = 0.5;
        let y: Vec<f64> = (0..5).map(|i| (i as f64 * h).powi(2)).collect();
        let area = simpson(&y, h);
        assert!((area - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_simpson_rectangle_fallback() {
        assert!((simpson(&[2.0, 3.0], 0.5) - 2.5).abs() < 1e-12);
        assert_eq!(simpson(&[], 0.5), 0.0);
    }

    #[test]
    fn test_derivative_integral_round_trip() {
        // Reconstruct a smooth series from its central-difference derivative
        let h = 0.01;
        let y: Vec<f64> = (0..200)
            .map(|i| (2.0 * std::f64::consts::PI * 0.5 * i as f64 * h).sin())
            .collect();
        let dy = central_difference(&y, h);
        let rec = cumulative_trapezoid(&dy, h, y[0]);
        for (a, b) in y.iter().zip(rec.iter()) {
            assert!((a - b).abs() < 1e-3, "round trip error {}", (a - b).abs());
        }
    }
}

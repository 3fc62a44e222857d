//! Discrete Fourier transform.
//!
//! Convention matches numpy: the forward transform is unnormalised,
//! the inverse divides by `N`.

use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

/// Naive O(N^2) forward transform `F_k = sum_n f_n e^(-2 pi i k n / N)`.
pub fn dft(signal: &[Complex<f64>]) -> Vec<Complex<f64>> {
    transform(signal, -1.0)
}

/// Naive O(N^2) inverse transform `f_n = (1/N) sum_k F_k e^(2 pi i k n / N)`.
pub fn idft(spectrum: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let n = spectrum.len() as f64;
    transform(spectrum, 1.0)
        .into_iter()
        .map(|value| value / n)
        .collect()
}

pub fn dft_real(signal: &[f64]) -> Vec<Complex<f64>> {
    let complex: Vec<Complex<f64>> = signal.iter().map(|&v| Complex::new(v, 0.0)).collect();
    dft(&complex)
}

fn transform(input: &[Complex<f64>], sign: f64) -> Vec<Complex<f64>> {
    let n = input.len();
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(j, &value)| {
                    // k * j mod n keeps the angle small for long inputs
                    let phase = ((k * j) % n) as f64;
                    let angle = sign * 2.0 * PI * phase / n as f64;
                    value * Complex::from_polar(1.0, angle)
                })
                .sum::<Complex<f64>>()
        })
        .collect()
}

/// Forward FFT through rustfft, same convention as [`dft`].
pub fn fft(signal: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut buffer = signal.to_vec();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(buffer.len()).process(&mut buffer);
    buffer
}

/// Inverse FFT through rustfft, normalised by `1/N` like [`idft`].
pub fn ifft(spectrum: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut buffer = spectrum.to_vec();
    if buffer.is_empty() {
        return buffer;
    }
    let n = buffer.len() as f64;
    let mut planner = FftPlanner::new();
    planner.plan_fft_inverse(buffer.len()).process(&mut buffer);
    for value in &mut buffer {
        *value /= n;
    }
    buffer
}

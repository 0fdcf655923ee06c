//! Envelope cross-correlation between two independently recorded audio chunks.

use realfft::RealFftPlanner;
use realfft::num_complex::Complex;

use crate::foundation::error::{TalkcutError, TalkcutResult};

/// Result of [`estimate_lag`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LagEstimate {
    /// Lag in samples. Positive when the reference content appears later in the probe.
    pub lag_samples: i64,
    /// Lag in seconds.
    pub lag_sec: f64,
    /// Peak correlation divided by the mean absolute correlation over all lags.
    pub confidence: f64,
}

/// Decode little-endian signed 16-bit PCM into samples. A trailing odd byte is ignored.
pub fn samples_from_s16le(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(2)
        .map(|b| f64::from(i16::from_le_bytes([b[0], b[1]])))
        .collect()
}

/// Centered moving average of `|x|` over `window` samples. Output has the input's length.
///
/// Samples outside the signal count as zero, so the edges taper.
pub fn envelope(samples: &[f64], window: usize) -> Vec<f64> {
    let n = samples.len();
    let window = window.max(1);
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0;
    for s in samples {
        acc += s.abs();
        prefix.push(acc);
    }

    let half = (window - 1) / 2;
    let scale = 1.0 / window as f64;
    (0..n)
        .map(|i| {
            let hi = (i + half + 1).min(n);
            let lo = (i + half + 1).saturating_sub(window);
            (prefix[hi] - prefix[lo]) * scale
        })
        .collect()
}

/// Full-mode cross-correlation of `a` against `b`.
///
/// Index `k` of the output corresponds to lag `k - (b.len() - 1)`, where the value at lag `m` is
/// `sum_n a[n + m] * b[n]`. The output length is `a.len() + b.len() - 1`.
pub fn cross_correlate(a: &[f64], b: &[f64]) -> TalkcutResult<Vec<f64>> {
    if a.is_empty() || b.is_empty() {
        return Err(TalkcutError::validation(
            "cross-correlation requires two non-empty signals",
        ));
    }
    let out_len = a.len() + b.len() - 1;
    let n = out_len.next_power_of_two();

    let mut planner = RealFftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut spec_a = forward.make_output_vec();
    let mut spec_b = forward.make_output_vec();
    let mut buf = forward.make_input_vec();

    buf[..a.len()].copy_from_slice(a);
    forward
        .process(&mut buf, &mut spec_a)
        .map_err(|e| anyhow::anyhow!("forward fft failed: {e}"))?;

    buf.iter_mut().for_each(|v| *v = 0.0);
    buf[..b.len()].copy_from_slice(b);
    forward
        .process(&mut buf, &mut spec_b)
        .map_err(|e| anyhow::anyhow!("forward fft failed: {e}"))?;

    let mut product: Vec<Complex<f64>> = spec_a
        .iter()
        .zip(&spec_b)
        .map(|(x, y)| *x * y.conj())
        .collect();
    // DC and Nyquist bins of a real signal's spectrum are purely real.
    if let Some(first) = product.first_mut() {
        first.im = 0.0;
    }
    if let Some(last) = product.last_mut() {
        last.im = 0.0;
    }

    let mut circular = inverse.make_output_vec();
    inverse
        .process(&mut product, &mut circular)
        .map_err(|e| anyhow::anyhow!("inverse fft failed: {e}"))?;

    let norm = 1.0 / n as f64;
    let neg = b.len() - 1;
    Ok((0..out_len)
        .map(|k| {
            let idx = if k < neg { n - (neg - k) } else { k - neg };
            circular[idx] * norm
        })
        .collect())
}

/// Estimate how far `probe` is shifted relative to `reference`.
///
/// Both chunks are reduced to amplitude envelopes over `window_sec` before correlating. The first
/// maximum wins when several lags share the peak value.
pub fn estimate_lag(
    reference: &[f64],
    probe: &[f64],
    sample_rate: u32,
    window_sec: f64,
) -> TalkcutResult<LagEstimate> {
    if sample_rate == 0 {
        return Err(TalkcutError::validation("sample rate must be > 0"));
    }
    let window = ((f64::from(sample_rate) * window_sec) as usize).max(1);
    let ref_env = envelope(reference, window);
    let probe_env = envelope(probe, window);
    let corr = cross_correlate(&probe_env, &ref_env)?;

    let mut peak_idx = 0usize;
    let mut peak = f64::NEG_INFINITY;
    let mut abs_sum = 0.0;
    for (i, &v) in corr.iter().enumerate() {
        abs_sum += v.abs();
        if v > peak {
            peak = v;
            peak_idx = i;
        }
    }
    let mean_abs = abs_sum / corr.len() as f64;
    let confidence = if mean_abs > 0.0 { peak / mean_abs } else { 0.0 };

    let lag_samples = peak_idx as i64 - (ref_env.len() as i64 - 1);
    Ok(LagEstimate {
        lag_samples,
        lag_sec: lag_samples as f64 / f64::from(sample_rate),
        confidence,
    })
}

/// Convert a chunk-relative lag into the offset between the two sources.
///
/// Positive means the probe source started recording later than the reference source.
pub fn resolve_offset(reference_start_sec: f64, probe_start_sec: f64, lag_sec: f64) -> f64 {
    reference_start_sec - (probe_start_sec + lag_sec)
}

#[cfg(test)]
#[path = "../../tests/unit/sync/correlate.rs"]
mod tests;

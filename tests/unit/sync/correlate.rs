use super::*;

/// Sparse bursts of alternating-sign samples at the given offsets.
fn bursts(len: usize, starts: &[usize], width: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    for &s in starts {
        for i in s..(s + width).min(len) {
            out[i] = if i % 2 == 0 { 3000.0 } else { -3000.0 };
        }
    }
    out
}

#[test]
fn pcm_decoding_is_little_endian() {
    let bytes = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0x7f];
    assert_eq!(samples_from_s16le(&bytes), vec![1.0, -1.0, -32768.0]);
}

#[test]
fn envelope_is_centered_and_same_length() {
    let x = [0.0, 0.0, 4.0, 0.0, 0.0];
    let env = envelope(&x, 3);
    assert_eq!(env.len(), 5);
    let third = 4.0 / 3.0;
    assert_eq!(env[0], 0.0);
    assert!((env[1] - third).abs() < 1e-12);
    assert!((env[2] - third).abs() < 1e-12);
    assert!((env[3] - third).abs() < 1e-12);
    assert_eq!(env[4], 0.0);
}

#[test]
fn envelope_uses_absolute_values() {
    let env = envelope(&[-2.0, 2.0], 1);
    assert_eq!(env, vec![2.0, 2.0]);
}

#[test]
fn cross_correlation_matches_direct_sum() {
    let a = [1.0, 2.0, 3.0, 0.5];
    let b = [0.0, 1.0, 0.5];
    let corr = cross_correlate(&a, &b).unwrap();
    assert_eq!(corr.len(), a.len() + b.len() - 1);
    for (k, got) in corr.iter().enumerate() {
        let lag = k as i64 - (b.len() as i64 - 1);
        let mut want = 0.0;
        for (n, bv) in b.iter().enumerate() {
            let idx = n as i64 + lag;
            if idx >= 0 && (idx as usize) < a.len() {
                want += a[idx as usize] * bv;
            }
        }
        assert!((got - want).abs() < 1e-9, "lag {lag}: {got} != {want}");
    }
}

#[test]
fn cross_correlation_rejects_empty_input() {
    assert!(cross_correlate(&[], &[1.0]).is_err());
}

#[test]
fn shifted_identical_envelopes_recover_the_lag() {
    let base = envelope(&bursts(600, &[40, 130, 310, 420], 20), 5);
    let shift = 37usize;
    let mut shifted = vec![0.0; shift];
    shifted.extend_from_slice(&base);
    let corr = cross_correlate(&shifted, &base).unwrap();
    let peak = corr
        .iter()
        .enumerate()
        .fold((0usize, f64::NEG_INFINITY), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
    let lag = peak.0 as i64 - (base.len() as i64 - 1);
    assert_eq!(lag, shift as i64);
}

#[test]
fn estimate_lag_finds_delayed_source_with_high_confidence() {
    // Camera track at 1 kHz; the external recorder started 0.5 s after the camera.
    let camera = bursts(
        3500,
        &[180, 610, 1050, 1230, 1400, 1710, 1880, 2330, 2790, 3120],
        30,
    );
    let external: Vec<f64> = camera[500..].to_vec();

    let reference = &camera[1000..2000];
    let probe = &external[..2500];
    let est = estimate_lag(reference, probe, 1000, 0.01).unwrap();

    assert!((est.lag_samples - 500).abs() <= 1, "lag {}", est.lag_samples);
    assert!(est.confidence > 5.0, "confidence {}", est.confidence);

    let offset = resolve_offset(1.0, 0.0, est.lag_sec);
    assert!((offset - 0.5).abs() <= 0.001, "offset {offset}");
}

#[test]
fn silent_inputs_give_zero_confidence() {
    let est = estimate_lag(&[0.0; 100], &[0.0; 150], 8000, 0.1).unwrap();
    assert_eq!(est.confidence, 0.0);
}

#[test]
fn zero_sample_rate_is_rejected() {
    assert!(estimate_lag(&[1.0], &[1.0], 0, 0.1).is_err());
}

#[test]
fn offset_sign_convention() {
    assert!(resolve_offset(30.0, 0.0, 28.0) > 0.0);
    assert!(resolve_offset(30.0, 0.0, 31.5) < 0.0);
}

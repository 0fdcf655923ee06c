use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::error::TalkcutResult;
use crate::media::tool::{Invocation, ToolRunner};
use crate::silence::segment::Silence;

static SILENCE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"silence_start:\s*(-?[\d.]+)").expect("silence_start pattern is valid")
});

static SILENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"silence_end:\s*(-?[\d.]+)\s*\|\s*silence_duration:\s*(-?[\d.]+)")
        .expect("silence_end pattern is valid")
});

/// Detector thresholds passed to the encoder's `silencedetect` filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectParams {
    /// Noise floor in dB (negative).
    pub noise_db: f64,
    /// Shortest silence the detector reports, in seconds.
    pub min_detect_sec: f64,
}

/// Extract silence triples from `silencedetect` diagnostic output.
///
/// A `silence_start` with no matching `silence_end` (trailing silence cut off by end of input) is
/// dropped. Negative starts reported for leading silence are clamped to zero.
pub fn parse_silencedetect(stderr: &str) -> Vec<Silence> {
    let mut out = Vec::new();
    let mut pending: Option<f64> = None;

    for line in stderr.lines() {
        if let Some(caps) = SILENCE_START.captures(line) {
            pending = caps[1].parse::<f64>().ok().map(|v| v.max(0.0));
        }
        if let Some(caps) = SILENCE_END.captures(line) {
            let (Ok(end), Ok(duration)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
                continue;
            };
            if let Some(start) = pending.take() {
                out.push(Silence {
                    start,
                    end,
                    duration,
                });
            }
        }
    }
    out
}

/// Run `silencedetect` over the audio of `input` and parse the reported silences.
#[tracing::instrument(skip(runner))]
pub fn detect_silences(
    runner: &mut dyn ToolRunner,
    input: &Path,
    params: DetectParams,
) -> TalkcutResult<Vec<Silence>> {
    let inv = Invocation::ffmpeg()
        .input(input)
        .arg("-af")
        .arg(format!(
            "silencedetect=noise={}dB:d={}",
            params.noise_db, params.min_detect_sec
        ))
        .args(["-f", "null", "-"]);
    let out = runner.run_checked(&inv)?;
    let silences = parse_silencedetect(&out.stderr);
    tracing::info!(count = silences.len(), "silences detected");
    Ok(silences)
}

#[cfg(test)]
#[path = "../../tests/unit/silence/detect.rs"]
mod tests;

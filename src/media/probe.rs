use std::path::Path;

use crate::foundation::error::{TalkcutError, TalkcutResult};
use crate::media::tool::{Invocation, ToolRunner};

/// Extensions treated as video payloads; anything else is a still image.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];

/// Return `true` when `path` has a video file extension.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[derive(Clone, Debug, PartialEq)]
/// Stream parameters of a media file.
pub struct MediaInfo {
    /// Frame width; 1920 when there is no video stream.
    pub width: u32,
    /// Frame height; 1080 when there is no video stream.
    pub height: u32,
    /// Frame rate; 30 when unknown.
    pub fps: f64,
    /// Audio sample rate; 44100 when there is no audio stream.
    pub sample_rate: u32,
    /// Audio channel count; 2 when there is no audio stream.
    pub channels: u16,
    /// Container duration in seconds; 0 when unknown.
    pub duration: f64,
    /// Whether a video stream exists.
    pub has_video: bool,
    /// Whether an audio stream exists.
    pub has_audio: bool,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

fn parse_rate(text: &str) -> Option<f64> {
    let rate = match text.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => text.trim().parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Decode `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(json: &[u8]) -> TalkcutResult<MediaInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| TalkcutError::serde(format!("ffprobe json parse failed: {e}")))?;
    let stream = |kind: &str| {
        parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };
    let video = stream("video");
    let audio = stream("audio");

    Ok(MediaInfo {
        width: video.and_then(|v| v.width).unwrap_or(1920),
        height: video.and_then(|v| v.height).unwrap_or(1080),
        fps: video
            .and_then(|v| v.r_frame_rate.as_deref())
            .and_then(parse_rate)
            .unwrap_or(30.0),
        sample_rate: audio
            .and_then(|a| a.sample_rate.as_deref())
            .and_then(|r| r.parse().ok())
            .unwrap_or(44_100),
        channels: audio.and_then(|a| a.channels).unwrap_or(2),
        duration: parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.trim().parse().ok())
            .unwrap_or(0.0),
        has_video: video.is_some(),
        has_audio: audio.is_some(),
    })
}

/// Probe stream parameters of `path` through `ffprobe`.
pub fn probe_media(runner: &mut dyn ToolRunner, path: &Path) -> TalkcutResult<MediaInfo> {
    let inv = Invocation::ffprobe()
        .args(["-print_format", "json", "-show_streams", "-show_format"])
        .arg(path);
    let out = runner.run_checked(&inv)?;
    parse_probe_json(&out.stdout)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;

//! Pipeline configuration, loaded from `talkcut.json` in the project directory.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{TalkcutError, TalkcutResult};
use crate::plan::resolve::TimingPolicy;
use crate::transcript::index::MatchConfig;
use crate::transcript::remote::TranscribeConfig;

/// Configuration file name inside a project directory.
pub const CONFIG_FILE_NAME: &str = "talkcut.json";

/// Silence detection and jump-cut settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SilenceConfig {
    /// Detector noise floor in dB.
    pub noise_db: f64,
    /// Shortest silence the detector reports.
    pub min_detect_sec: f64,
    /// Only silences longer than this are cut.
    pub min_silence_sec: f64,
    /// Air kept around each cut.
    pub padding_sec: f64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            noise_db: -30.0,
            min_detect_sec: 0.8,
            min_silence_sec: 1.5,
            padding_sec: 0.3,
        }
    }
}

/// Audio offset detection settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Where the reference chunk starts in the camera recording.
    pub reference_start_sec: f64,
    /// Reference chunk length.
    pub reference_duration_sec: f64,
    /// Probe chunk length, read from the start of the external recording.
    pub probe_duration_sec: f64,
    /// Analysis sample rate.
    pub sample_rate: u32,
    /// Envelope smoothing window.
    pub envelope_window_sec: f64,
    /// Confidence below which the offset is flagged.
    pub confidence_threshold: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reference_start_sec: 30.0,
            reference_duration_sec: 60.0,
            probe_duration_sec: 90.0,
            sample_rate: 8000,
            envelope_window_sec: 0.1,
            confidence_threshold: 5.0,
        }
    }
}

/// Encoder settings shared by every stage that re-encodes video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset.
    pub preset: String,
    /// AAC bitrate for re-encoded audio.
    pub audio_bitrate: String,
    /// MP4 track timescale shared by all concatenated parts.
    pub timescale: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            crf: 18,
            preset: "fast".to_string(),
            audio_bitrate: "192k".to_string(),
            timescale: 15360,
        }
    }
}

/// Overlay look and timing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Logo and media fade length.
    pub fade_sec: f64,
    /// Logo box size in pixels.
    pub logo_size_px: u32,
    /// Logo distance from the bottom-right corner.
    pub logo_padding_px: u32,
    /// Font file for text cards.
    pub font: String,
    /// Text card font size.
    pub font_size: u32,
    /// Duration policy.
    #[serde(flatten)]
    pub timing: TimingPolicy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fade_sec: 0.3,
            logo_size_px: 120,
            logo_padding_px: 40,
            font: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            font_size: 64,
            timing: TimingPolicy::default(),
        }
    }
}

/// Complete pipeline configuration. Every section falls back to its defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fuzzy-match policy.
    pub matching: MatchConfig,
    /// Jump-cut settings.
    pub silence: SilenceConfig,
    /// Offset detection settings.
    pub sync: SyncConfig,
    /// Encoder settings.
    pub encode: EncodeConfig,
    /// Overlay settings.
    pub overlay: OverlayConfig,
    /// Remote transcription settings.
    pub transcribe: TranscribeConfig,
}

impl PipelineConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TalkcutResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| TalkcutError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `<project>/talkcut.json`, or defaults when the file does not exist.
    pub fn load_or_default(project_dir: &Path) -> TalkcutResult<Self> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let f = File::open(&path).map_err(|e| {
            TalkcutError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> TalkcutResult<()> {
        let m = &self.matching;
        for (name, v) in [
            ("matching.word_threshold", m.word_threshold),
            ("matching.phrase_threshold", m.phrase_threshold),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(TalkcutError::validation(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        if m.range_slack_sec < 0.0 {
            return Err(TalkcutError::validation(
                "matching.range_slack_sec must be >= 0",
            ));
        }

        let s = &self.silence;
        if s.padding_sec < 0.0 || s.min_silence_sec < 0.0 || s.min_detect_sec <= 0.0 {
            return Err(TalkcutError::validation(
                "silence padding and durations must be non-negative (min_detect_sec > 0)",
            ));
        }

        let y = &self.sync;
        if y.sample_rate == 0 {
            return Err(TalkcutError::validation("sync.sample_rate must be > 0"));
        }
        if y.reference_duration_sec <= 0.0 || y.probe_duration_sec <= 0.0 {
            return Err(TalkcutError::validation(
                "sync chunk durations must be > 0",
            ));
        }
        if y.envelope_window_sec <= 0.0 {
            return Err(TalkcutError::validation(
                "sync.envelope_window_sec must be > 0",
            ));
        }

        if self.encode.crf > 51 {
            return Err(TalkcutError::validation("encode.crf must be within 0..=51"));
        }

        let o = &self.overlay;
        if o.fade_sec < 0.0 || o.logo_size_px == 0 || o.font_size == 0 {
            return Err(TalkcutError::validation(
                "overlay fade must be >= 0 and sizes > 0",
            ));
        }
        let t = &o.timing;
        if t.text_pad_before_sec < 0.0
            || t.text_pad_after_sec < 0.0
            || t.text_min_duration_sec < 0.0
            || t.image_min_duration_sec < 0.0
        {
            return Err(TalkcutError::validation(
                "overlay timing values must be >= 0",
            ));
        }

        if self.transcribe.timeout_sec == 0 || self.transcribe.merge_max_sec <= 0.0 {
            return Err(TalkcutError::validation(
                "transcribe.timeout_sec and merge_max_sec must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

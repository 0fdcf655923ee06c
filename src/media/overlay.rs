//! Single-pass `filter_complex` construction for logos, full-screen media and text cards.

use std::path::{Path, PathBuf};

use crate::annotate::record::AnnotationKind;
use crate::config::OverlayConfig;
use crate::media::probe::{MediaInfo, is_video_file};
use crate::plan::segment_plan::PlanStep;

/// Vertical gap between stacked logos, in pixels.
const LOGO_STACK_GAP_PX: u32 = 10;

/// An extra encoder input referenced by the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayInput {
    /// File path.
    pub path: PathBuf,
    /// Still images are looped so time-based filters see a continuous stream.
    pub looped: bool,
}

/// A text file the graph reads through `drawtext=textfile=`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCardFile {
    /// Where the file must be written before encoding.
    pub path: PathBuf,
    /// File contents, already escaped for `drawtext`.
    pub contents: String,
}

/// A built overlay graph. Input `0` is always the base video.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayGraph {
    inputs: Vec<OverlayInput>,
    filters: Vec<String>,
    text_files: Vec<TextCardFile>,
    output_label: String,
}

fn secs(t: f64) -> String {
    format!("{t:.3}")
}

fn enable(start: f64, end: f64) -> String {
    format!("enable='between(t,{},{})'", secs(start), secs(end))
}

/// Escape text for a `drawtext` text file.
pub fn escape_drawtext_file(text: &str) -> String {
    text.replace('\\', "\\\\").replace('%', "\\%")
}

/// Escape a value placed between single quotes in a filter option.
///
/// Quotes are consumed by the graph parser, so `:` is still escaped for the option parser and a
/// literal `'` closes the quote, is escaped for both levels, and reopens it.
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "'\\\\\\''")
}

impl OverlayGraph {
    /// Build the graph for every overlay step of a plan.
    ///
    /// Logos are deduplicated by file; each media step gets its own input. Text card files are
    /// placed under `cards_dir`.
    pub fn build<'a>(
        steps: impl IntoIterator<Item = &'a PlanStep>,
        style: &OverlayConfig,
        base: &MediaInfo,
        payload_dir: &Path,
        cards_dir: &Path,
    ) -> Self {
        let mut g = Self {
            output_label: "0:v".to_string(),
            ..Self::default()
        };
        for (i, step) in steps.into_iter().enumerate() {
            let Some(payload) = step.payload.as_deref() else {
                continue;
            };
            match step.overlay_kind {
                Some(AnnotationKind::Logo) => g.push_logo(i, step, payload_dir.join(payload), style),
                Some(AnnotationKind::Media) => {
                    g.push_media(i, step, payload_dir.join(payload), base)
                }
                Some(AnnotationKind::Text) => {
                    let path = cards_dir.join(format!("card_{i:03}.txt"));
                    g.push_text(i, step, payload, path, style)
                }
                Some(AnnotationKind::Insert) | None => {}
            }
        }
        g
    }

    fn input_index(&mut self, path: PathBuf, dedupe: bool) -> usize {
        if dedupe && let Some(pos) = self.inputs.iter().position(|i| i.path == path) {
            return pos + 1;
        }
        let looped = !is_video_file(&path);
        self.inputs.push(OverlayInput { path, looped });
        self.inputs.len()
    }

    fn chain_to(&mut self, filter: String, next: String) {
        self.filters
            .push(format!("[{}]{filter}[{next}]", self.output_label));
        self.output_label = next;
    }

    fn push_logo(&mut self, i: usize, step: &PlanStep, path: PathBuf, style: &OverlayConfig) {
        let idx = self.input_index(path, true);
        let (start, end) = (step.output.start, step.output.end);
        let size = style.logo_size_px;
        let pad = style.logo_padding_px;
        let fade = style.fade_sec;
        let fade_out = (end - fade).max(start);

        self.filters.push(format!(
            "[{idx}:v]scale={size}:{size}:force_original_aspect_ratio=decrease,format=rgba,\
             fade=t=in:st={}:d={fade}:alpha=1,fade=t=out:st={}:d={fade}:alpha=1[s{i}]",
            secs(start),
            secs(fade_out),
        ));
        let y = if step.stack_level == 0 {
            format!("H-{size}-{pad}")
        } else {
            format!("H-{size}-{pad}-{}", (size + LOGO_STACK_GAP_PX) * step.stack_level)
        };
        self.chain_to(
            format!(
                "[s{i}]overlay=W-{size}-{pad}:{y}:shortest=1:{}",
                enable(start, end)
            ),
            format!("v{i}"),
        );
    }

    fn push_media(&mut self, i: usize, step: &PlanStep, path: PathBuf, base: &MediaInfo) {
        let is_video = is_video_file(&path);
        let idx = self.input_index(path, false);
        let (start, end) = (step.output.start, step.output.end);
        let (w, h) = (base.width, base.height);
        // Looped stills never end, so the overlay stops with the base stream instead.
        let (tail, eof) = if is_video {
            (format!("setpts=PTS-STARTPTS+{}/TB", secs(start)), "eof_action=pass")
        } else {
            ("format=rgba".to_string(), "shortest=1")
        };
        self.filters.push(format!(
            "[{idx}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,{tail}[m{i}]"
        ));
        self.chain_to(
            format!("[m{i}]overlay=0:0:{eof}:{}", enable(start, end)),
            format!("v{i}"),
        );
    }

    fn push_text(
        &mut self,
        i: usize,
        step: &PlanStep,
        text: &str,
        path: PathBuf,
        style: &OverlayConfig,
    ) {
        let gate = enable(step.output.start, step.output.end);
        let filter = format!(
            "drawbox=x=0:y=0:w=iw:h=ih:color=black:t=fill:{gate},\
             drawtext=fontfile='{}':textfile='{}':fontcolor=white:fontsize={}:\
             x=(w-text_w)/2:y=(h-text_h)/2:{gate}",
            escape_filter_value(&style.font),
            escape_filter_value(&path.to_string_lossy()),
            style.font_size,
        );
        self.text_files.push(TextCardFile {
            path,
            contents: escape_drawtext_file(text),
        });
        self.chain_to(filter, format!("v{i}"));
    }

    /// Return `true` when no overlay was added.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Extra inputs, in `-i` order after the base video.
    pub fn inputs(&self) -> &[OverlayInput] {
        &self.inputs
    }

    /// Text files to write before encoding.
    pub fn text_files(&self) -> &[TextCardFile] {
        &self.text_files
    }

    /// Label of the final video stream, for `-map`.
    pub fn output_label(&self) -> &str {
        &self.output_label
    }

    /// The `filter_complex` argument.
    pub fn filter_complex(&self) -> String {
        self.filters.join(";")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/overlay.rs"]
mod tests;

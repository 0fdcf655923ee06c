use crate::annotate::record::AnnotationKind;
use crate::foundation::core::TimeInterval;
use crate::foundation::error::{TalkcutError, TalkcutResult};
use crate::plan::resolve::ResolvedEvent;

/// Boundary tolerance used when checking contiguity.
const CONTIGUITY_EPS: f64 = 1e-6;

/// What a plan step does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// A span of the base video copied to the output.
    BaseCut,
    /// An external clip spliced into the output.
    Insert,
    /// A time-gated overlay on the base stream.
    Overlay,
}

/// One step of a [`SegmentPlan`].
#[derive(Clone, Debug, PartialEq)]
pub struct PlanStep {
    /// Step kind.
    pub kind: StepKind,
    /// Span read from the step's own source: base video for cuts and overlays, the clip for
    /// inserts.
    pub source: TimeInterval,
    /// Placement on the output timeline.
    pub output: TimeInterval,
    /// Payload file name or display text. `None` for base cuts.
    pub payload: Option<String>,
    /// Overlay kind, for overlay steps.
    pub overlay_kind: Option<AnnotationKind>,
    /// Rendering order among overlapping overlays.
    pub stack_level: u32,
    /// Marker line the step came from, if any.
    pub line: Option<usize>,
}

impl PlanStep {
    fn base_cut(source: TimeInterval, out_start: f64) -> Self {
        Self {
            kind: StepKind::BaseCut,
            source,
            output: TimeInterval::clamped(out_start, out_start + source.duration()),
            payload: None,
            overlay_kind: None,
            stack_level: 0,
            line: None,
        }
    }

    /// Return `true` for steps that occupy output time (base cuts and inserts).
    pub fn is_sequential(&self) -> bool {
        matches!(self.kind, StepKind::BaseCut | StepKind::Insert)
    }
}

/// Ordered assembly plan.
///
/// Sequential steps (base cuts and inserts) tile the output timeline without gaps or overlap.
/// Overlay steps may overlap freely and carry a stack level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentPlan {
    steps: Vec<PlanStep>,
}

impl SegmentPlan {
    /// Build a plan for a base video of `total_duration` seconds.
    ///
    /// Inserts are sorted by cut point (stable, so equal cut points keep parse order); base cuts
    /// are synthesized between consecutive cut points. Overlays are appended in the given order.
    pub fn build(total_duration: f64, inserts: &[ResolvedEvent], overlays: &[ResolvedEvent]) -> Self {
        let total = total_duration.max(0.0);
        let mut sorted: Vec<&ResolvedEvent> = inserts.iter().collect();
        sorted.sort_by(|a, b| a.window.start.total_cmp(&b.window.start));

        let mut steps = Vec::new();
        let mut prev_cut = 0.0f64;
        let mut out_t = 0.0f64;
        for ins in sorted {
            let cut_at = ins.window.start.clamp(prev_cut, total);
            if cut_at > prev_cut {
                let step = PlanStep::base_cut(TimeInterval::clamped(prev_cut, cut_at), out_t);
                out_t = step.output.end;
                steps.push(step);
            }
            let length = ins.window.duration();
            steps.push(PlanStep {
                kind: StepKind::Insert,
                source: TimeInterval::clamped(0.0, length),
                output: TimeInterval::clamped(out_t, out_t + length),
                payload: Some(ins.payload.clone()),
                overlay_kind: None,
                stack_level: 0,
                line: Some(ins.line),
            });
            out_t += length;
            prev_cut = cut_at;
        }
        if prev_cut < total {
            steps.push(PlanStep::base_cut(TimeInterval::clamped(prev_cut, total), out_t));
        }

        steps.extend(overlays.iter().map(|ov| PlanStep {
            kind: StepKind::Overlay,
            source: ov.window,
            output: ov.window,
            payload: Some(ov.payload.clone()),
            overlay_kind: Some(ov.kind),
            stack_level: ov.stack_level,
            line: Some(ov.line),
        }));
        Self { steps }
    }

    /// Build a jump-cut plan: one base cut per kept voice segment, packed end to end.
    pub fn from_voice_segments(segments: &[TimeInterval]) -> Self {
        let mut steps = Vec::with_capacity(segments.len());
        let mut out_t = 0.0;
        for seg in segments {
            let step = PlanStep::base_cut(*seg, out_t);
            out_t = step.output.end;
            steps.push(step);
        }
        Self { steps }
    }

    /// All steps in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Base cuts and inserts, in output order.
    pub fn sequential(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|s| s.is_sequential())
    }

    /// Overlay steps, in parse order.
    pub fn overlays(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|s| s.kind == StepKind::Overlay)
    }

    /// Length of the output timeline.
    pub fn output_duration(&self) -> f64 {
        self.sequential().map(|s| s.output.end).fold(0.0, f64::max)
    }

    /// Check that sequential steps start at zero and tile the output timeline.
    pub fn validate(&self) -> TalkcutResult<()> {
        let mut expected = 0.0f64;
        for (i, step) in self.sequential().enumerate() {
            if (step.output.start - expected).abs() > CONTIGUITY_EPS {
                return Err(TalkcutError::validation(format!(
                    "plan step {i} starts at {:.3}s, expected {:.3}s",
                    step.output.start, expected
                )));
            }
            if (step.output.duration() - step.source.duration()).abs() > CONTIGUITY_EPS {
                return Err(TalkcutError::validation(format!(
                    "plan step {i} output length differs from its source span"
                )));
            }
            expected = step.output.end;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/segment_plan.rs"]
mod tests;

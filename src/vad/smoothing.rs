/// Hysteresis over raw speech decisions.
///
/// Interior runs shorter than their class minimum are flipped and merged
/// into their neighbours; runs touching either end of the sequence are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSmoother {
    pub min_speech_frames: usize,
    pub min_silence_frames: usize,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    speech: bool,
    len: usize,
}

impl IntervalSmoother {
    pub fn new(min_speech_frames: usize, min_silence_frames: usize) -> Self {
        Self {
            min_speech_frames,
            min_silence_frames,
        }
    }

    fn minimum(&self, speech: bool) -> usize {
        if speech {
            self.min_speech_frames
        } else {
            self.min_silence_frames
        }
    }

    pub fn smooth(&self, decisions: Vec<bool>) -> Vec<bool> {
        let mut stack: Vec<Run> = Vec::new();
        let mut flipped = 0usize;

        for run in runs(&decisions) {
            // The top of the stack becomes interior once `run` follows it.
            if stack.len() >= 2 {
                let top = stack[stack.len() - 1];
                if top.len < self.minimum(top.speech) {
                    stack.pop();
                    if let Some(left) = stack.last_mut() {
                        left.len += top.len + run.len;
                    }
                    flipped += 1;
                    continue;
                }
            }
            stack.push(run);
        }

        if flipped > 0 {
            tracing::trace!(flipped, runs = stack.len(), "vad: smoothed short runs");
        }

        let mut out = decisions;
        out.clear();
        for run in stack {
            out.extend(std::iter::repeat(run.speech).take(run.len));
        }
        out
    }
}

fn runs(decisions: &[bool]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for &speech in decisions {
        match runs.last_mut() {
            Some(run) if run.speech == speech => run.len += 1,
            _ => runs.push(Run { speech, len: 1 }),
        }
    }
    runs
}

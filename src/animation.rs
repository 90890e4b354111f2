//! Scripted bob animation: a repeating sawtooth timer drives four fixed
//! checkpoints that raise and lower the figure's body and head.

/// Seconds before the local timer folds back toward zero.
const CYCLE_LENGTH: f32 = 1.5;

const BODY_RAISE_AT: f32 = 0.25;
const BODY_LOWER_AT: f32 = 1.0;
const HEAD_RAISE_AT: f32 = 0.5;
const HEAD_LOWER_AT: f32 = 0.75;

/// Flags consumed by the transform recipes each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub body_raised: bool,
    pub head_raised: bool,
}

/// Round to the nearest hundredth through an integer cast, so every
/// sample lands exactly on a two-decimal value.
fn round_hundredths(value: f32) -> f32 {
    ((value * 100.0 + 0.5) as i32) as f32 / 100.0
}

/// Repeating local timer derived from wall-clock seconds. Once the timer
/// runs past [`CYCLE_LENGTH`] the excess is folded into an accumulating
/// offset, so the next sample restarts near zero.
#[derive(Debug, Default)]
pub struct SawtoothClock {
    timer: f32,
    offset: f32,
}

impl SawtoothClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, wall_seconds: f32) -> f32 {
        if self.timer > CYCLE_LENGTH {
            self.offset += self.timer;
            self.timer = 0.0;
        }
        self.timer = round_hundredths(wall_seconds) - self.offset;
        self.timer
    }
}

/// The four-checkpoint script. A checkpoint fires when the timer crosses
/// its value going upward; the chain fires at most one checkpoint per
/// sample, and each flag carries a latch so a checkpoint cannot fire
/// twice before a no-checkpoint sample re-arms the cycle.
#[derive(Debug, Default)]
pub struct CheckpointScript {
    state: AnimationState,
    body_latched: bool,
    head_latched: bool,
    previous: f32,
}

impl CheckpointScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn advance(&mut self, timer: f32) -> AnimationState {
        let crossed = |checkpoint: f32| self.previous < checkpoint && timer >= checkpoint;

        if crossed(BODY_RAISE_AT) {
            if !self.body_latched {
                self.state.body_raised = true;
                self.body_latched = true;
            }
        } else if crossed(BODY_LOWER_AT) {
            if !self.body_latched {
                self.state.body_raised = false;
                self.body_latched = true;
            }
        } else if crossed(HEAD_RAISE_AT) {
            if !self.head_latched {
                self.state.head_raised = true;
                self.head_latched = true;
            }
        } else if crossed(HEAD_LOWER_AT) {
            if !self.head_latched {
                self.state.head_raised = false;
                self.head_latched = true;
            }
        } else {
            self.body_latched = false;
            self.head_latched = false;
        }

        self.previous = timer;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &mut CheckpointScript, samples: &[f32]) -> Vec<AnimationState> {
        samples.iter().map(|&t| script.advance(t)).collect()
    }

    #[test]
    fn checkpoints_fire_in_order() {
        let mut script = CheckpointScript::new();
        let states = run(
            &mut script,
            &[0.1, 0.25, 0.3, 0.5, 0.6, 0.75, 0.9, 1.0],
        );

        // body up at 0.25, head up at 0.5, head down at 0.75, body down at 1.0
        assert!(!states[0].body_raised && !states[0].head_raised);
        assert!(states[1].body_raised);
        assert!(states[2].body_raised && !states[2].head_raised);
        assert!(states[3].head_raised);
        assert!(states[4].head_raised);
        assert!(!states[5].head_raised);
        assert!(states[6].body_raised);
        assert!(!states[7].body_raised);
    }

    #[test]
    fn checkpoint_does_not_fire_twice_before_rearm() {
        // Raising latches the cycle, so the lower checkpoint crossed on
        // the very next sample is ignored.
        let mut script = CheckpointScript::new();
        script.advance(0.3);
        assert!(script.state().body_raised);
        script.advance(1.0);
        assert!(script.state().body_raised);

        // With a no-checkpoint sample in between, the same crossing fires.
        let mut script = CheckpointScript::new();
        script.advance(0.3);
        script.advance(0.35);
        script.advance(1.0);
        assert!(!script.state().body_raised);
    }

    #[test]
    fn skipped_sample_still_crosses() {
        // No frame lands exactly on 0.25, but the crossing fires anyway.
        let mut script = CheckpointScript::new();
        script.advance(0.2);
        script.advance(0.31);
        assert!(script.state().body_raised);
    }

    #[test]
    fn wraparound_folds_excess_into_offset() {
        let mut clock = SawtoothClock::new();
        assert!((clock.sample(0.4) - 0.4).abs() < 1e-6);
        assert!((clock.sample(1.52) - 1.52).abs() < 1e-6);
        // Past the cycle length: 1.52 moves into the offset and the next
        // sample restarts near zero.
        let restarted = clock.sample(1.6);
        assert!((restarted - 0.08).abs() < 1e-6);
    }

    #[test]
    fn wraparound_rearms_the_script() {
        let mut clock = SawtoothClock::new();
        let mut script = CheckpointScript::new();
        for &wall in &[0.1, 0.25, 0.3, 0.5, 0.6, 0.75, 0.9, 1.0, 1.1, 1.52] {
            script.advance(clock.sample(wall));
        }
        assert!(!script.state().body_raised && !script.state().head_raised);
        // The clock folds 1.52 into its offset; the second cycle behaves
        // like the first.
        script.advance(clock.sample(1.6));
        script.advance(clock.sample(1.8));
        assert!(script.state().body_raised);
    }

    #[test]
    fn rounds_to_hundredths() {
        assert_eq!(round_hundredths(0.2549), 0.25);
        assert_eq!(round_hundredths(0.256), 0.26);
        assert_eq!(round_hundredths(1.004), 1.0);
    }
}

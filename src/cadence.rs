use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::model::Mode;

/// Canonical word length used for all WPM arithmetic.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Base interval used when the requested rate is not a positive number.
pub const FALLBACK_BASE_INTERVAL: f64 = 0.1;

pub const BURST_PROBABILITY: f64 = 0.10;
pub const BURST_RANGE: (f64, f64) = (0.3, 0.6);

pub const THINKING_PAUSE_PROBABILITY: f64 = 0.03;
pub const THINKING_PAUSE_RANGE: (f64, f64) = (2.0, 5.0);

/// Seconds per character at `wpm`.
pub fn base_interval(wpm: f64) -> f64 {
    if wpm.is_finite() && wpm > 0.0 {
        60.0 / (wpm * CHARS_PER_WORD)
    } else {
        FALLBACK_BASE_INTERVAL
    }
}

/// Observed typing rate for `characters` typed over `elapsed_secs`.
pub fn words_per_minute(characters: usize, elapsed_secs: f64) -> f64 {
    if elapsed_secs > 0.0 {
        (characters as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharContext {
    SentenceEnd,
    Clause,
    Space,
    Newline,
    Other,
}

impl CharContext {
    pub fn of(c: char) -> Self {
        match c {
            '.' | '!' | '?' => CharContext::SentenceEnd,
            ',' | ';' | ':' => CharContext::Clause,
            ' ' => CharContext::Space,
            '\n' => CharContext::Newline,
            _ => CharContext::Other,
        }
    }

    pub fn multiplier_range(self) -> (f64, f64) {
        match self {
            CharContext::SentenceEnd => (3.0, 6.0),
            CharContext::Clause => (1.5, 2.5),
            CharContext::Space => (1.0, 1.5),
            CharContext::Newline => (2.0, 4.0),
            CharContext::Other => (0.8, 1.2),
        }
    }
}

/// How the delay after one character was put together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadencePlan {
    pub base_interval: f64,
    pub context_multiplier: f64,
    pub burst: Option<f64>,
    pub thinking_pause: Option<f64>,
}

impl CadencePlan {
    pub fn multiplier(&self) -> f64 {
        self.context_multiplier * self.burst.unwrap_or(1.0) * self.thinking_pause.unwrap_or(1.0)
    }

    pub fn delay(&self) -> f64 {
        self.base_interval * self.multiplier()
    }
}

fn uniform((low, high): (f64, f64)) -> Uniform<f64> {
    Uniform::new_inclusive(low, high)
}

/// Per-character delay policy for one run.
///
/// Natural mode layers three independent draws: a context multiplier, a 10% chance of a
/// speed burst and a 3% chance of a thinking pause. Competition mode never touches the RNG.
#[derive(Debug, Clone)]
pub struct CadenceModel {
    mode: Mode,
    base_interval: f64,
    sentence_end: Uniform<f64>,
    clause: Uniform<f64>,
    space: Uniform<f64>,
    newline: Uniform<f64>,
    other: Uniform<f64>,
    burst: Uniform<f64>,
    thinking_pause: Uniform<f64>,
}

impl CadenceModel {
    pub fn new(wpm: f64, mode: Mode) -> Self {
        Self {
            mode,
            base_interval: base_interval(wpm),
            sentence_end: uniform(CharContext::SentenceEnd.multiplier_range()),
            clause: uniform(CharContext::Clause.multiplier_range()),
            space: uniform(CharContext::Space.multiplier_range()),
            newline: uniform(CharContext::Newline.multiplier_range()),
            other: uniform(CharContext::Other.multiplier_range()),
            burst: uniform(BURST_RANGE),
            thinking_pause: uniform(THINKING_PAUSE_RANGE),
        }
    }

    pub fn base_interval(&self) -> f64 {
        self.base_interval
    }

    fn context_distribution(&self, context: CharContext) -> &Uniform<f64> {
        match context {
            CharContext::SentenceEnd => &self.sentence_end,
            CharContext::Clause => &self.clause,
            CharContext::Space => &self.space,
            CharContext::Newline => &self.newline,
            CharContext::Other => &self.other,
        }
    }

    pub fn plan(&self, c: char, rng: &mut impl Rng) -> CadencePlan {
        let mut plan = CadencePlan {
            base_interval: self.base_interval,
            context_multiplier: 1.0,
            burst: None,
            thinking_pause: None,
        };

        if self.mode == Mode::Competition {
            return plan;
        }

        plan.context_multiplier = self.context_distribution(CharContext::of(c)).sample(rng);

        if rng.gen::<f64>() < BURST_PROBABILITY {
            plan.burst = Some(self.burst.sample(rng));
        }

        if rng.gen::<f64>() < THINKING_PAUSE_PROBABILITY {
            plan.thinking_pause = Some(self.thinking_pause.sample(rng));
        }

        plan
    }

    pub fn delay(&self, c: char, rng: &mut impl Rng) -> f64 {
        self.plan(c, rng).delay()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-12;

    #[test]
    fn base_interval_assumes_five_chars_per_word() {
        assert!((base_interval(60.0) - 0.2).abs() < EPS);
        assert!((base_interval(120.0) - 0.1).abs() < EPS);
        assert!((base_interval(10.0) - 1.2).abs() < EPS);
    }

    #[test]
    fn base_interval_decreases_with_rate() {
        let mut prev = f64::INFINITY;
        for wpm in (10..=500).step_by(7) {
            let b = base_interval(wpm as f64);
            assert!(b < prev, "not decreasing at {wpm}");
            prev = b;
        }
    }

    #[test]
    fn non_positive_rate_uses_fallback() {
        assert_eq!(base_interval(0.0), FALLBACK_BASE_INTERVAL);
        assert_eq!(base_interval(-30.0), FALLBACK_BASE_INTERVAL);
        assert_eq!(base_interval(f64::NAN), FALLBACK_BASE_INTERVAL);
    }

    #[test]
    fn classifies_contexts() {
        assert_eq!(CharContext::of('?'), CharContext::SentenceEnd);
        assert_eq!(CharContext::of(';'), CharContext::Clause);
        assert_eq!(CharContext::of(' '), CharContext::Space);
        assert_eq!(CharContext::of('\n'), CharContext::Newline);
        assert_eq!(CharContext::of('x'), CharContext::Other);
        assert_eq!(CharContext::of('-'), CharContext::Other);
    }

    #[test]
    fn competition_never_varies() {
        let model = CadenceModel::new(73.0, Mode::Competition);
        let mut rng = StdRng::seed_from_u64(11);
        let expected = base_interval(73.0);
        for c in "Hello, world.\nDone? yes!".chars() {
            let plan = model.plan(c, &mut rng);
            assert_eq!(plan.delay(), expected);
            assert_eq!(plan.burst, None);
            assert_eq!(plan.thinking_pause, None);
        }
    }

    #[test]
    fn natural_context_multiplier_stays_in_range() {
        let model = CadenceModel::new(50.0, Mode::Natural);
        let mut rng = StdRng::seed_from_u64(99);
        for c in ['.', '!', ',', ':', ' ', '\n', 'a', 'Z', '7'] {
            let (low, high) = CharContext::of(c).multiplier_range();
            for _ in 0..500 {
                let plan = model.plan(c, &mut rng);
                assert!(
                    plan.context_multiplier >= low && plan.context_multiplier <= high,
                    "{c:?}: {} outside [{low}, {high}]",
                    plan.context_multiplier
                );

                let min = low * BURST_RANGE.0;
                let max = high * THINKING_PAUSE_RANGE.1;
                let delay = plan.delay();
                assert!(delay >= model.base_interval() * min - EPS);
                assert!(delay <= model.base_interval() * max + EPS);
            }
        }
    }

    #[test]
    fn burst_and_pause_fire_at_roughly_their_rates() {
        let model = CadenceModel::new(50.0, Mode::Natural);
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 20_000;
        let mut bursts = 0;
        let mut pauses = 0;
        for _ in 0..n {
            let plan = model.plan('e', &mut rng);
            if let Some(b) = plan.burst {
                assert!((BURST_RANGE.0..=BURST_RANGE.1).contains(&b));
                bursts += 1;
            }
            if let Some(p) = plan.thinking_pause {
                assert!((THINKING_PAUSE_RANGE.0..=THINKING_PAUSE_RANGE.1).contains(&p));
                pauses += 1;
            }
        }
        let burst_rate = bursts as f64 / n as f64;
        let pause_rate = pauses as f64 / n as f64;
        assert!((0.08..0.12).contains(&burst_rate), "burst rate {burst_rate}");
        assert!((0.02..0.04).contains(&pause_rate), "pause rate {pause_rate}");
    }

    #[test]
    fn layers_compose_in_order_when_every_draw_is_zero() {
        // An all-zero source hits the low end of every range and triggers both layers.
        let model = CadenceModel::new(60.0, Mode::Natural);
        let mut rng = StepRng::new(0, 0);
        let plan = model.plan('.', &mut rng);
        assert!((plan.context_multiplier - 3.0).abs() < EPS);
        assert_eq!(plan.burst, Some(BURST_RANGE.0));
        assert_eq!(plan.thinking_pause, Some(THINKING_PAUSE_RANGE.0));
        assert!((plan.delay() - 0.2 * 3.0 * 0.3 * 2.0).abs() < EPS);
    }

    #[test]
    fn wpm_from_characters_and_time() {
        assert!((words_per_minute(300, 60.0) - 60.0).abs() < EPS);
        assert_eq!(words_per_minute(10, 0.0), 0.0);
    }
}

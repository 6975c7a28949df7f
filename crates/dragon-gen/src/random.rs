/// Injectable source of uniform randomness.
///
/// Every random decision the generator makes goes through [`RandomSource::next_unit`], so a test
/// can script the exact sequence of draws and force a particular branch (e.g. the "no GPS fix"
/// case) instead of fishing for it with a seeded generator.
use rand::{rngs::StdRng, Rng, SeedableRng};

pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform float in `[lo, hi]`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_unit() * (hi - lo)
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform integer in `[lo, hi]`.
    fn int_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        let span = (hi - lo) as f64 + 1.0;
        let offset = (self.next_unit() * span) as u32;
        lo + offset.min(hi - lo)
    }

    /// Uniformly chosen element. Panics on an empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = (self.next_unit() * items.len() as f64) as usize;
        &items[idx.min(items.len() - 1)]
    }
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Reproducible sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::VecDeque;

    use super::*;

    /// Replays a fixed script of draws, then repeats `fallback` forever.
    pub(crate) struct Scripted {
        pub draws: VecDeque<f64>,
        pub fallback: f64,
    }

    impl Scripted {
        pub fn new(draws: &[f64], fallback: f64) -> Self {
            Self {
                draws: draws.iter().copied().collect(),
                fallback,
            }
        }

        pub fn constant(value: f64) -> Self {
            Self::new(&[], value)
        }
    }

    impl RandomSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            self.draws.pop_front().unwrap_or(self.fallback)
        }
    }

    #[test]
    fn test_helpers_stay_in_range() {
        let mut src = Scripted::new(&[0.0, 0.999_999, 0.5], 0.25);
        assert_eq!(src.uniform(25.0, 49.0), 25.0);
        assert!(src.uniform(25.0, 49.0) <= 49.0);
        assert_eq!(src.uniform(-5.0, 5.0), 0.0);
        assert_eq!(src.int_inclusive(100, 103), 101);

        let mut low = Scripted::constant(0.0);
        assert_eq!(low.int_inclusive(100, 103), 100);
        assert!(low.chance(0.1));
        let mut high = Scripted::constant(0.999_999_999);
        assert_eq!(high.int_inclusive(100, 103), 103);
        assert_eq!(*high.pick(&["a", "b", "c"]), "c");
        assert!(!high.chance(0.5));
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = RngSource::seeded(7);
        let mut b = RngSource::seeded(7);
        for _ in 0..32 {
            let (x, y) = (a.next_unit(), b.next_unit());
            assert_eq!(x, y);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(38.123_456_7, 4), 38.1235);
        assert_eq!(round_to(-104.987_654_3, 6), -104.987_654);
        assert_eq!(round_to(12.25, 1), 12.3);
        assert_eq!(round_to(0.0, 6), 0.0);
    }
}

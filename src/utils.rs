use rand::{Rng, RngCore};

// --- Helper Functions ---

// Uniform random source the simulation draws from. Any `rand` generator qualifies;
// tests substitute a scripted sequence.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    // Uniform integer in `[0, n)`. `n` must be non-zero.
    fn next_below(&mut self, n: usize) -> usize;
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    #[inline]
    fn next_below(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

// Biased towards short lengths while still reaching `max` occasionally.
pub fn squared_draw<R: RandomSource + ?Sized>(rng: &mut R, max: f64) -> f64 {
    let root = rng.next_f64() * max.sqrt();
    root * root
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRandom;

//! Random alias generation

use rand::{distr::Alphanumeric, rngs::StdRng, Rng, SeedableRng};
use std::sync::Mutex;

/// Length of aliases generated for save requests without one
pub const ALIAS_LENGTH: usize = 6;

/// Produces random alphanumeric aliases
///
/// Seeded once when constructed and then shared by every request, so
/// successive calls draw from one stream instead of reseeding each time.
/// Collisions are not checked here; the storage layer rejects them.
pub struct AliasGenerator {
    rng: Mutex<StdRng>,
}

impl AliasGenerator {
    /// Generator seeded from the operating system's entropy source
    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic generator for tests
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Returns `length` characters drawn uniformly from `[a-zA-Z0-9]`
    pub fn generate(&self, length: usize) -> String {
        // A poisoned lock only means another request panicked mid-draw; the
        // rng state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        (&mut *rng)
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }
}

impl Default for AliasGenerator {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

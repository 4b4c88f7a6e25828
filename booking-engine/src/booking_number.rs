//! Human-readable booking number generation
//!
//! Format: `BK-<YYYYMMDD>-<5-digit random>`. Uniqueness is checked against
//! the repository and regenerated on collision a bounded number of times,
//! instead of trusting randomness alone.

use thiserror::Error;

use crate::repository::{BookingRepository, RepositoryError};

/// 5-digit random suffix space (00000-99999)
const SUFFIX_SPACE: u32 = 100_000;

#[derive(Debug, Error)]
pub enum BookingNumberError {
    #[error("could not allocate a unique booking number after {0} attempts")]
    Exhausted(u32),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct BookingNumberGenerator {
    max_attempts: u32,
}

impl BookingNumberGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub async fn generate(
        &self,
        repo: &dyn BookingRepository,
    ) -> Result<String, BookingNumberError> {
        for _ in 0..self.max_attempts {
            let candidate = Self::candidate();
            if !repo.booking_number_exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::warn!(candidate, "booking number collision, regenerating");
        }
        Err(BookingNumberError::Exhausted(self.max_attempts))
    }

    fn candidate() -> String {
        use rand::Rng;
        let date = chrono::Utc::now().format("%Y%m%d");
        // ThreadRng is !Send; keep it out of any await scope.
        let suffix = rand::thread_rng().gen_range(0..SUFFIX_SPACE);
        format!("BK-{date}-{suffix:05}")
    }
}

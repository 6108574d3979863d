//! Deterministic synthetic status, the terminal tier of the chain.
//!
//! The RNG is seeded from the SHA-256 digest of the username, so a given
//! name always yields the same rank, online flag, and experience, in any
//! process. Rank weights are skewed heavily toward the bottom of the
//! ladder to resemble a real player population.

use async_trait::async_trait;
use clanwatch_core::hashing::sha256_digest;
use clanwatch_core::rank::{base_experience, next_threshold, Rank};
use clanwatch_core::roster::PlayerStatus;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::source::{Lookup, SourceError, SourceKind, StatusSource};

/// Relative likelihood of each rank.
pub const RANK_WEIGHTS: [(Rank, f64); 30] = [
    (Rank::Recruit, 5.0),
    (Rank::Private, 15.0),
    (Rank::Gefreiter, 12.0),
    (Rank::Corporal, 10.0),
    (Rank::MasterCorporal, 8.0),
    (Rank::Sergeant, 7.0),
    (Rank::StaffSergeant, 6.0),
    (Rank::SergeantFirstClass, 5.0),
    (Rank::MasterSergeant, 4.0),
    (Rank::FirstSergeant, 3.0),
    (Rank::SergeantMajor, 3.0),
    (Rank::WarrantOfficer1, 2.0),
    (Rank::ChiefWarrantOfficer2, 2.0),
    (Rank::ChiefWarrantOfficer3, 2.0),
    (Rank::ChiefWarrantOfficer4, 1.0),
    (Rank::ChiefWarrantOfficer5, 1.0),
    (Rank::SecondLieutenant, 1.0),
    (Rank::FirstLieutenant, 1.0),
    (Rank::Captain, 1.0),
    (Rank::Major, 1.0),
    (Rank::LieutenantColonel, 0.5),
    (Rank::Colonel, 0.3),
    (Rank::Brigadier, 0.2),
    (Rank::MajorGeneral, 0.1),
    (Rank::LieutenantGeneral, 0.05),
    (Rank::General, 0.02),
    (Rank::Marshal, 0.01),
    (Rank::FieldMarshal, 0.005),
    (Rank::Commander, 0.002),
    (Rank::Generalissimo, 0.001),
];

/// Probability that a synthetic player is reported online.
pub const ONLINE_PROBABILITY: f64 = 0.3;

/// Upper bound on experience above the chosen rank's threshold.
pub const MAX_EXPERIENCE_OFFSET: u64 = 2_000;

/// Generates stable fake statuses when no real source answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticFallback;

impl SyntheticFallback {
    pub fn new() -> Self {
        Self
    }

    /// Synthetic status for `username`. Pure function of the name.
    ///
    /// The experience offset is drawn uniformly from a range that ends
    /// below the next rank's threshold, so the figure always agrees with
    /// the chosen rank.
    pub fn generate(&self, username: &str) -> PlayerStatus {
        let mut rng = StdRng::from_seed(sha256_digest(username.as_bytes()));

        let rank = RANK_WEIGHTS
            .choose_weighted(&mut rng, |entry| entry.1)
            .map(|entry| entry.0)
            .unwrap_or(Rank::Private);

        let is_online = rng.random::<f64>() < ONLINE_PROBABILITY;

        let base = base_experience(rank);
        let band = next_threshold(rank)
            .map(|next| next - base - 1)
            .unwrap_or(MAX_EXPERIENCE_OFFSET);
        let offset = rng.random_range(0..=MAX_EXPERIENCE_OFFSET.min(band));

        PlayerStatus::new(username, rank, is_online, Some(base + offset))
    }
}

#[async_trait]
impl StatusSource for SyntheticFallback {
    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    async fn fetch_status(&self, username: &str) -> Result<Lookup, SourceError> {
        Ok(Lookup::Found(self.generate(username)))
    }
}

//! Random selection of recommendations from a candidate pool.

use domain::RecommendedMovie;
use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffle `pool` uniformly and keep the first `limit` titles.
///
/// A pool smaller than `limit` is returned whole; nothing is padded.
pub fn sample_recommendations<R: Rng + ?Sized>(
    mut pool: Vec<String>,
    limit: usize,
    rng: &mut R,
) -> Vec<RecommendedMovie> {
    pool.shuffle(rng);
    pool.truncate(limit);
    pool.into_iter()
        .map(|title| RecommendedMovie { title })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Movie {i}")).collect()
    }

    #[test]
    fn test_small_pool_is_returned_whole() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample_recommendations(pool(3), 5, &mut rng);

        assert_eq!(picked.len(), 3);
        let titles: HashSet<_> = picked.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, HashSet::from(["Movie 0", "Movie 1", "Movie 2"]));
    }

    #[test]
    fn test_large_pool_is_truncated_to_limit() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates = pool(60);
        let picked = sample_recommendations(candidates.clone(), 5, &mut rng);

        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|m| candidates.contains(&m.title)));
    }

    #[test]
    fn test_empty_pool_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sample_recommendations(Vec::new(), 5, &mut rng).is_empty());
    }

    #[test]
    fn test_repeated_sampling_varies() {
        let mut rng = StdRng::seed_from_u64(42);
        let subsets: HashSet<Vec<String>> = (0..20)
            .map(|_| {
                sample_recommendations(pool(60), 5, &mut rng)
                    .into_iter()
                    .map(|m| m.title)
                    .collect()
            })
            .collect();

        assert!(subsets.len() > 1, "sampling should not be deterministic ordering");
    }

    #[test]
    fn test_every_title_can_be_picked() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            for movie in sample_recommendations(pool(10), 5, &mut rng) {
                seen.insert(movie.title);
            }
        }
        assert_eq!(seen.len(), 10);
    }
}

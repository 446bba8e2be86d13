//! @acp:module "Combo Pairs"
//! @acp:summary "First/second-down pairs drawn from two different play categories"
//! @acp:domain engine
//! @acp:layer logic

use std::collections::HashSet;

use rand::seq::IndexedRandom;

use super::random::RandomSource;
use super::sampler::sample;
use super::types::{Play, PlayCategory};

/// Draw up to `pairs` first/second-down pairs from `pool`.
///
/// The first category is picked at random among categories that still have
/// plays. The second is picked at random from the other categories; when it
/// has nothing left, the second call comes from any category other than the
/// first play's. A pair may come back with a single play when the pool runs
/// dry, and fewer pairs are returned once no category has plays left.
pub fn select_pairs<R: RandomSource + ?Sized>(
    pool: &[Play],
    pairs: usize,
    used_concepts: HashSet<String>,
    rng: &mut R,
) -> Vec<Vec<Play>> {
    let mut used = used_concepts;
    let mut taken: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(pairs);

    for _ in 0..pairs {
        let open: Vec<&Play> = pool.iter().filter(|p| !taken.contains(&p.id)).collect();
        let present: Vec<PlayCategory> = PlayCategory::ALL
            .into_iter()
            .filter(|c| open.iter().any(|p| p.is_category(*c)))
            .collect();
        let Some(&first_category) = present.choose(rng) else {
            break;
        };

        let firsts = in_category(&open, |c| c == first_category);
        let outcome = sample(&firsts, 1, used, rng);
        used = outcome.used_concepts;
        let Some(first) = outcome.selected.into_iter().next() else {
            break;
        };
        taken.insert(first.id.clone());

        let others: Vec<PlayCategory> = PlayCategory::ALL
            .into_iter()
            .filter(|c| *c != first_category)
            .collect();
        let mut seconds = Vec::new();
        if let Some(&second_category) = others.choose(rng) {
            seconds = in_category(&open, |c| c == second_category);
        }
        if seconds.is_empty() {
            tracing::debug!(
                first = %first_category,
                "second category empty, drawing from any other category"
            );
            seconds = in_category(&open, |c| c != first_category);
        }

        let outcome = sample(&seconds, 1, used, rng);
        used = outcome.used_concepts;
        let mut pair = vec![first];
        if let Some(second) = outcome.selected.into_iter().next() {
            taken.insert(second.id.clone());
            pair.push(second);
        }
        result.push(pair);
    }

    result
}

fn in_category(open: &[&Play], keep: impl Fn(PlayCategory) -> bool) -> Vec<Play> {
    open.iter()
        .filter(|p| p.category.map(&keep).unwrap_or(false))
        .map(|p| (*p).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<Play> {
        let mut plays = Vec::new();
        for (i, category) in PlayCategory::ALL.iter().enumerate() {
            for j in 0..3 {
                plays.push(Play::new(
                    format!("{}-{}", category, j),
                    *category,
                    format!("c{}{}", i, j),
                ));
            }
        }
        plays
    }

    #[test]
    fn test_pairs_use_two_categories() {
        let plays = pool();
        for seed in 0..30 {
            let pairs = select_pairs(&plays, 2, HashSet::new(), &mut StdRng::seed_from_u64(seed));
            assert_eq!(pairs.len(), 2);
            for pair in &pairs {
                assert_eq!(pair.len(), 2);
                assert_ne!(pair[0].category, pair[1].category);
            }
        }
    }

    #[test]
    fn test_fallback_to_any_other_category() {
        // Only two categories exist, so the random second pick is usually empty
        let plays = vec![
            Play::new("r1", PlayCategory::RunGame, "Duo"),
            Play::new("r2", PlayCategory::RunGame, "Power"),
            Play::new("s1", PlayCategory::Screen, "Bubble"),
            Play::new("s2", PlayCategory::Screen, "Tunnel"),
        ];
        for seed in 0..30 {
            let pairs = select_pairs(&plays, 2, HashSet::new(), &mut StdRng::seed_from_u64(seed));
            assert_eq!(pairs.len(), 2);
            for pair in &pairs {
                assert_eq!(pair.len(), 2, "seed {}", seed);
                assert_ne!(pair[0].category, pair[1].category);
            }
        }
    }

    #[test]
    fn test_single_category_pool_yields_singles() {
        let plays = vec![
            Play::new("r1", PlayCategory::RunGame, "Duo"),
            Play::new("r2", PlayCategory::RunGame, "Power"),
        ];
        let pairs = select_pairs(&plays, 2, HashSet::new(), &mut StdRng::seed_from_u64(2));
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.len() == 1));
    }

    #[test]
    fn test_empty_pool() {
        let pairs = select_pairs(&[], 3, HashSet::new(), &mut StdRng::seed_from_u64(0));
        assert!(pairs.is_empty());
    }
}

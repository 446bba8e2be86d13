//! @acp:module "Weighted Allocator"
//! @acp:summary "Split a slot count across weighted buckets with proportional rounding"
//! @acp:domain engine
//! @acp:layer logic

use std::collections::BTreeMap;

use super::types::{sanitize_percentage, Distribution};

/// Split `target` slots across the buckets of `distribution`.
///
/// Each bucket gets `round(pct / 100 * target)` (half-up). Rounding drift is
/// corrected against the largest buckets first without going negative. A
/// distribution summing below 100 leaves its remainder unallocated, so the
/// counts then add up to `round(sum / 100 * target)` instead of `target`.
///
/// Zero-count buckets are kept in the result; callers skip them.
pub fn allocate(target: usize, distribution: &Distribution) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    if target == 0 || distribution.is_empty() {
        return counts;
    }

    let total_pct = distribution.total();
    let goal = if total_pct >= 100.0 {
        target
    } else {
        round_half_up(total_pct * target as f64 / 100.0).min(target)
    };

    for (bucket, pct) in distribution.iter() {
        let share = sanitize_percentage(*pct) * target as f64 / 100.0;
        counts.insert(bucket.clone(), round_half_up(share));
    }

    // Largest percentage first, bucket name breaks ties
    let mut order: Vec<(&String, f64)> = distribution
        .iter()
        .map(|(name, pct)| (name, sanitize_percentage(*pct)))
        .collect();
    order.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let assigned: usize = counts.values().sum();
    if assigned < goal {
        if let Some((largest, _)) = order.first() {
            if let Some(count) = counts.get_mut(*largest) {
                *count += goal - assigned;
            }
        }
    } else if assigned > goal {
        let mut excess = assigned - goal;
        for (bucket, _) in &order {
            if excess == 0 {
                break;
            }
            if let Some(count) = counts.get_mut(*bucket) {
                let take = excess.min(*count);
                *count -= take;
                excess -= take;
            }
        }
    }

    tracing::debug!(slots = target, goal, ?counts, "allocated buckets");
    counts
}

fn round_half_up(value: f64) -> usize {
    if value <= 0.0 {
        0
    } else {
        (value + 0.5).floor() as usize
    }
}

//! Applying exclusion rules to weight grids.

use naiad_io::ExcludeRule;
use tracing::debug;

use crate::masks::MaskedTargets;

/// Zeroes the weight of every cell matched by any rule, for every
/// variable.
///
/// Observations from an excluded segment/period are never trusted, even
/// if a measurement exists; the underlying filled values stay untouched.
/// Returns the number of weights changed from nonzero to zero.
pub fn apply_exclude_rules(targets: &mut MaskedTargets, rules: &[ExcludeRule]) -> usize {
    let seg_ids = targets.axes().seg_ids().to_vec();
    let dates = targets.axes().dates().to_vec();
    let mut n_zeroed = 0usize;

    for (rule_idx, rule) in rules.iter().enumerate() {
        let mut n_rule = 0usize;
        for (i, &seg_id) in seg_ids.iter().enumerate() {
            for (j, &date) in dates.iter().enumerate() {
                if !rule.matches(seg_id, date) {
                    continue;
                }
                for weights in targets.weights.values_mut() {
                    if weights[(i, j)] != 0.0 {
                        weights[(i, j)] = 0.0;
                        n_rule += 1;
                    }
                }
            }
        }
        debug!(rule = rule_idx, n_zeroed = n_rule, "applied exclusion rule");
        n_zeroed += n_rule;
    }

    n_zeroed
}

// ABOUTME: Integer space distribution among siblings under min/max bounds.
// ABOUTME: Proportional scaling with iterative clamping, insertion room-making and sash resizes.

/// One child's extent along its parent's axis plus its bounds on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub size: u32,
    pub min: u32,
    pub max: u32,
}

impl Slot {
    pub fn new(size: u32, min: u32, max: u32) -> Self {
        Self {
            size,
            min,
            max: max.max(min),
        }
    }

    fn clamp(&self, value: u64) -> u64 {
        value.clamp(u64::from(self.min), u64::from(self.max))
    }
}

/// How a branch absorbs a change of its own extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Scale every child by its current share.
    #[default]
    Proportional,
    /// Grow or shrink the last child first, then walk backwards.
    LastFirst,
}

pub fn min_sum(slots: &[Slot]) -> u64 {
    slots.iter().map(|s| u64::from(s.min)).sum()
}

pub fn max_sum(slots: &[Slot]) -> u64 {
    slots.iter().map(|s| u64::from(s.max)).sum()
}

pub fn size_sum(slots: &[Slot]) -> u64 {
    slots.iter().map(|s| u64::from(s.size)).sum()
}

/// Resize `slots` so their sizes add up to `total`.
///
/// When `total` is below the sum of minimums every slot sits at its minimum and
/// the sum overflows `total`. When it is above the sum of maximums every slot
/// sits at its maximum and the last slot takes the remaining slack.
pub fn distribute(slots: &mut [Slot], total: u32, policy: Policy) {
    if slots.is_empty() || saturate_bounds(slots, u64::from(total)) {
        return;
    }

    match policy {
        Policy::Proportional => scale(slots, u64::from(total)),
        Policy::LastFirst => {
            for slot in slots.iter_mut() {
                slot.size = slot.clamp(u64::from(slot.size)) as u32;
            }
        }
    }
    absorb_from_end(slots, u64::from(total));
}

/// Make room for the slot at `index`, whose `size` holds the requested extent.
///
/// The new slot keeps as much of its request as its bounds and the siblings'
/// minimums allow; siblings shrink proportionally to fill the rest.
pub fn insert(slots: &mut [Slot], index: usize, total: u32) {
    let total = u64::from(total);
    if saturate_bounds(slots, total) {
        return;
    }

    let new = slots[index];
    let others_min = min_sum(slots) - u64::from(new.min);
    let others_max = max_sum(slots) - u64::from(new.max);

    let upper = u64::from(new.max).min(total - others_min);
    let lower = u64::from(new.min).max(total.saturating_sub(others_max));
    let size = u64::from(new.size).min(upper).max(lower);
    slots[index].size = size as u32;

    let mut others: Vec<Slot> = slots
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, s)| *s)
        .collect();
    distribute(&mut others, (total - size) as u32, Policy::Proportional);

    let mut others = others.into_iter();
    for (i, slot) in slots.iter_mut().enumerate() {
        if i != index {
            if let Some(resized) = others.next() {
                *slot = resized;
            }
        }
    }
}

/// Move the sash after (or, for the last slot, before) `index` by `delta`.
///
/// Returns false and leaves everything untouched if either slot would leave
/// its bounds.
pub fn resize(slots: &mut [Slot], index: usize, delta: i64) -> bool {
    if delta == 0 || index >= slots.len() || slots.len() < 2 {
        return false;
    }
    let neighbor = if index + 1 < slots.len() { index + 1 } else { index - 1 };

    let target = i64::from(slots[index].size) + delta;
    let other = i64::from(slots[neighbor].size) - delta;
    let fits = |slot: &Slot, value: i64| value >= i64::from(slot.min) && value <= i64::from(slot.max);
    if !fits(&slots[index], target) || !fits(&slots[neighbor], other) {
        return false;
    }

    slots[index].size = target as u32;
    slots[neighbor].size = other as u32;
    true
}

/// Handle the cases where bounds alone decide the outcome. Returns true if done.
fn saturate_bounds(slots: &mut [Slot], total: u64) -> bool {
    if total <= min_sum(slots) {
        for slot in slots.iter_mut() {
            slot.size = slot.min;
        }
        return true;
    }

    let max_sum = max_sum(slots);
    if total >= max_sum {
        for slot in slots.iter_mut() {
            slot.size = slot.max;
        }
        if let Some(last) = slots.last_mut() {
            last.size = last.size.saturating_add((total - max_sum) as u32);
        }
        return true;
    }

    false
}

/// Proportional scaling with the flexbox freeze loop.
fn scale(slots: &mut [Slot], total: u64) {
    let mut weights: Vec<u64> = slots.iter().map(|s| u64::from(s.size)).collect();
    if weights.iter().all(|w| *w == 0) {
        weights.iter_mut().for_each(|w| *w = 1);
    }

    let mut frozen: Vec<Option<u64>> = vec![None; slots.len()];
    loop {
        let used: u64 = frozen.iter().flatten().sum();
        let remaining = total.saturating_sub(used);
        let free: Vec<usize> = (0..slots.len()).filter(|i| frozen[*i].is_none()).collect();
        if free.is_empty() {
            break;
        }

        let free_weights: Vec<u64> = free.iter().map(|i| weights[*i]).collect();
        let targets = apportion(remaining, &free_weights);

        let mut violation: i128 = 0;
        let mut clamped = Vec::with_capacity(free.len());
        for (&i, &target) in free.iter().zip(&targets) {
            let value = slots[i].clamp(target);
            violation += i128::from(value) - i128::from(target);
            clamped.push((i, target, value));
        }

        if clamped.iter().all(|(_, target, value)| target == value) {
            for (i, target, _) in clamped {
                frozen[i] = Some(target);
            }
            break;
        }

        for (i, target, value) in clamped {
            let freeze = match violation.signum() {
                1 => value > target,
                -1 => value < target,
                _ => value != target,
            };
            if freeze {
                frozen[i] = Some(value);
            }
        }
    }

    for (slot, size) in slots.iter_mut().zip(frozen) {
        if let Some(size) = size {
            slot.size = size as u32;
        }
    }
}

/// Split `amount` by `weights` using largest-remainder rounding.
fn apportion(amount: u64, weights: &[u64]) -> Vec<u64> {
    let weight_sum: u64 = weights.iter().sum();
    if weights.is_empty() {
        return Vec::new();
    }
    if weight_sum == 0 {
        return apportion(amount, &vec![1; weights.len()]);
    }

    let mut shares: Vec<u64> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(u64, usize)> = Vec::with_capacity(weights.len());
    for (i, weight) in weights.iter().enumerate() {
        let scaled = u128::from(amount) * u128::from(*weight);
        shares.push((scaled / u128::from(weight_sum)) as u64);
        remainders.push(((scaled % u128::from(weight_sum)) as u64, i));
    }

    let leftover = amount - shares.iter().sum::<u64>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, i) in remainders.into_iter().take(leftover as usize) {
        shares[i] += 1;
    }
    shares
}

/// Push any difference between the sizes and `total` onto the slots, last first.
fn absorb_from_end(slots: &mut [Slot], total: u64) {
    let mut sum = size_sum(slots);
    for slot in slots.iter_mut().rev() {
        if sum == total {
            return;
        }
        let current = u64::from(slot.size);
        let wanted = if sum < total {
            current + (total - sum)
        } else {
            current.saturating_sub(sum - total)
        };
        let next = slot.clamp(wanted);
        sum = sum - current + next;
        slot.size = next as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use sash_core::UNBOUNDED;

    fn sizes(slots: &[Slot]) -> Vec<u32> {
        slots.iter().map(|s| s.size).collect()
    }

    fn free(size: u32) -> Slot {
        Slot::new(size, 0, UNBOUNDED)
    }

    #[test]
    fn proportional_scale_keeps_ratios() {
        let mut slots = vec![free(200), free(600)];
        distribute(&mut slots, 400, Policy::Proportional);
        assert_eq!(sizes(&slots), vec![100, 300]);
    }

    #[test]
    fn zero_sizes_split_evenly() {
        let mut slots = vec![free(0), free(0), free(0)];
        distribute(&mut slots, 100, Policy::Proportional);
        assert_eq!(sizes(&slots), vec![34, 33, 33]);
    }

    #[test]
    fn minimums_are_respected_when_scaling_down() {
        let mut slots = vec![Slot::new(100, 80, UNBOUNDED), free(300)];
        distribute(&mut slots, 200, Policy::Proportional);
        assert_eq!(sizes(&slots), vec![80, 120]);
    }

    #[test]
    fn maximums_are_respected_when_scaling_up() {
        let mut slots = vec![Slot::new(100, 0, 150), free(100)];
        distribute(&mut slots, 400, Policy::Proportional);
        assert_eq!(sizes(&slots), vec![150, 250]);
    }

    #[test]
    fn overflow_clamps_to_minimums() {
        let mut slots = vec![Slot::new(300, 50, UNBOUNDED), Slot::new(300, 70, UNBOUNDED)];
        distribute(&mut slots, 100, Policy::Proportional);
        assert_eq!(sizes(&slots), vec![50, 70]);
    }

    #[test]
    fn slack_beyond_maximums_goes_to_last() {
        let mut slots = vec![Slot::new(10, 0, 100), Slot::new(10, 0, 100)];
        distribute(&mut slots, 300, Policy::Proportional);
        assert_eq!(sizes(&slots), vec![100, 200]);
    }

    #[test]
    fn last_first_policy_only_touches_the_tail() {
        let mut slots = vec![free(200), free(200), Slot::new(200, 150, UNBOUNDED)];
        distribute(&mut slots, 500, Policy::LastFirst);
        assert_eq!(sizes(&slots), vec![200, 150, 150]);

        distribute(&mut slots, 700, Policy::LastFirst);
        assert_eq!(sizes(&slots), vec![200, 150, 350]);
    }

    #[test]
    fn insert_takes_space_from_siblings() {
        let mut slots = vec![Slot::new(200, 50, UNBOUNDED), Slot::new(600, 50, UNBOUNDED)];
        insert(&mut slots, 0, 600);
        assert_eq!(sizes(&slots), vec![200, 400]);
    }

    #[test]
    fn insert_shrinks_siblings_proportionally() {
        let mut slots = vec![free(300), free(100), free(200)];
        insert(&mut slots, 1, 800);
        assert_eq!(sizes(&slots), vec![420, 100, 280]);
    }

    #[test]
    fn insert_request_is_capped_by_sibling_minimums() {
        let mut slots = vec![Slot::new(400, 50, UNBOUNDED), Slot::new(800, 50, UNBOUNDED)];
        insert(&mut slots, 1, 400);
        assert_eq!(sizes(&slots), vec![50, 350]);
    }

    #[test]
    fn resize_moves_the_next_sash() {
        let mut slots = vec![free(200), free(200), free(200)];
        assert!(resize(&mut slots, 0, 50));
        assert_eq!(sizes(&slots), vec![250, 150, 200]);

        assert!(resize(&mut slots, 2, -100));
        assert_eq!(sizes(&slots), vec![250, 250, 100]);
    }

    #[test]
    fn resize_rejects_bound_violations() {
        let mut slots = vec![Slot::new(200, 0, 220), Slot::new(200, 150, UNBOUNDED)];
        assert!(!resize(&mut slots, 0, 30));
        assert!(!resize(&mut slots, 1, -60));
        assert_eq!(sizes(&slots), vec![200, 200]);
    }

    fn slot_strategy() -> impl Strategy<Value = Slot> {
        (0u32..2000, 0u32..200, prop::option::of(200u32..2000))
            .prop_map(|(size, min, max)| Slot::new(size, min, max.unwrap_or(UNBOUNDED)))
    }

    proptest! {
        #[test]
        fn distribute_fills_total_within_bounds(
            mut slots in prop::collection::vec(slot_strategy(), 1..8),
            total in 0u32..10_000,
        ) {
            distribute(&mut slots, total, Policy::Proportional);
            let min_total = min_sum(&slots);
            if u64::from(total) >= min_total {
                prop_assert_eq!(size_sum(&slots), u64::from(total));
            }
            let last = slots.len() - 1;
            for (i, slot) in slots.iter().enumerate() {
                prop_assert!(slot.size >= slot.min);
                if i != last {
                    prop_assert!(slot.size <= slot.max);
                }
            }
        }

        #[test]
        fn distribute_is_idempotent(
            mut slots in prop::collection::vec(slot_strategy(), 1..8),
            total in 0u32..10_000,
            proportional in any::<bool>(),
        ) {
            let policy = if proportional { Policy::Proportional } else { Policy::LastFirst };
            distribute(&mut slots, total, policy);
            let first = sizes(&slots);
            distribute(&mut slots, total, policy);
            prop_assert_eq!(first, sizes(&slots));
        }
    }
}

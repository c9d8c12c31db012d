pub(crate) const DEFAULT_SEED: u32 = 0x5eed_1234;

pub(crate) fn next_random_u32(state: &mut u32) -> u32 {
    let mut next = state.wrapping_add(0x6d2b79f5);
    *state = next;
    next = (next ^ (next >> 15)).wrapping_mul(next | 1);
    next ^= next.wrapping_add((next ^ (next >> 7)).wrapping_mul(next | 61));
    next ^ (next >> 14)
}

/// Uniform value in `0..bound`; a zero bound yields zero.
pub(crate) fn next_random_bounded(state: &mut u32, bound: u32) -> u32 {
    if bound == 0 {
        return 0;
    }
    next_random_bounded_with(state, bound, next_random_u32)
}

pub(crate) fn next_random_bounded_with<F>(state: &mut u32, bound: u32, mut next: F) -> u32
where
    F: FnMut(&mut u32) -> u32,
{
    let threshold = (u64::from(u32::MAX) + 1) / u64::from(bound) * u64::from(bound);
    let mut candidate = next(state);
    while u64::from(candidate) >= threshold {
        candidate = next(state);
    }
    candidate % bound
}

/// Inclusive range draw used by the random variable operand.
pub(crate) fn next_random_in_range(state: &mut u32, min: i64, max: i64) -> i64 {
    let span = max.saturating_sub(min).saturating_add(1);
    if span <= 0 {
        return min;
    }
    let bound = u32::try_from(span).unwrap_or(u32::MAX);
    min.saturating_add(i64::from(next_random_bounded(state, bound)))
}

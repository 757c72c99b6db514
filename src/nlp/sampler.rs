//! Deterministic, evenly spread sampling over an ordered collection.

use std::collections::HashSet;

/// Indices of up to `cap` items spread across `0..len`, in ascending order.
///
/// The cursor advances by `len / cap` and is truncated, never rounded, so the
/// same inputs always select the same indices.
pub fn spread_indices(len: usize, cap: usize) -> Vec<usize> {
    if len <= cap {
        return (0..len).collect();
    }
    let step = len as f64 / cap as f64;
    let mut cursor = 0.0_f64;
    let mut used = HashSet::with_capacity(cap);
    let mut picked = Vec::with_capacity(cap);
    for _ in 0..cap {
        let mut pos = (cursor.floor() as usize).min(len - 1);
        while used.contains(&pos) && pos < len - 1 {
            pos += 1;
        }
        used.insert(pos);
        picked.push(pos);
        cursor += step;
    }
    picked
}

/// Up to `cap` items covering the whole slice rather than a prefix.
pub fn evenly_sample<T: Clone>(items: &[T], cap: usize) -> Vec<T> {
    spread_indices(items.len(), cap)
        .into_iter()
        .map(|idx| items[idx].clone())
        .collect()
}

//! Mutual-nearest-neighbour pairing.
//!
//! Given a list of candidates, every candidate finds its nearest
//! compatible neighbour; two candidates are paired when each is the
//! other's nearest. Both the flat formation engine and the nested bloc
//! model pair this way.
//!
//! Ordering rules, which make the result deterministic:
//!
//! - the nearest neighbour is the first candidate (in input order) at the
//!   strictly smallest distance;
//! - candidates at zero distance are never neighbours, so identical
//!   positions do not pair;
//! - pairs are reported in input order of their first element, and each
//!   candidate appears in at most one pair.

/// Index of each candidate's nearest compatible neighbour.
///
/// `distance` must be symmetric; non-finite distances are ignored.
pub fn nearest_neighbours<T, D, C>(items: &[T], distance: D, compatible: C) -> Vec<Option<usize>>
where
    D: Fn(&T, &T) -> f64,
    C: Fn(&T, &T) -> bool,
{
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut best: Option<(usize, f64)> = None;
            for (j, other) in items.iter().enumerate() {
                if i == j || !compatible(item, other) {
                    continue;
                }
                let d = distance(item, other);
                if !d.is_finite() || d <= 0.0 {
                    continue;
                }
                if best.is_none_or(|(_, b)| d < b) {
                    best = Some((j, d));
                }
            }
            best.map(|(j, _)| j)
        })
        .collect()
}

/// Pairs of mutual nearest neighbours, as `(i, j)` index pairs with `i < j`.
pub fn mutual_pairs<T, D, C>(items: &[T], distance: D, compatible: C) -> Vec<(usize, usize)>
where
    D: Fn(&T, &T) -> f64,
    C: Fn(&T, &T) -> bool,
{
    let nearest = nearest_neighbours(items, distance, compatible);
    let mut matched = vec![false; items.len()];
    let mut pairs = Vec::new();

    for (i, candidate) in nearest.iter().enumerate() {
        let Some(j) = *candidate else { continue };
        if j <= i {
            continue;
        }
        let reciprocal = nearest.get(j).copied().flatten() == Some(i);
        let free =
            !matched.get(i).copied().unwrap_or(true) && !matched.get(j).copied().unwrap_or(true);
        if reciprocal && free {
            if let Some(slot) = matched.get_mut(i) {
                *slot = true;
            }
            if let Some(slot) = matched.get_mut(j) {
                *slot = true;
            }
            pairs.push((i, j));
        }
    }
    pairs
}

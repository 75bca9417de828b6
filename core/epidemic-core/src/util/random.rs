use rand::Rng;

/// Single Bernoulli trial: a uniform draw in [0, 1) against `prob`.
/// Probabilities above 1 therefore always hit.
#[inline]
pub fn hit<R: Rng>(rng: &mut R, prob: f64) -> bool {
    rng.gen::<f64>() < prob
}

/// Cumulative-band selection over a weight slice: one uniform draw walks the
/// bands in order; `None` when the draw lands past the last band (weights
/// summing below 1 leave a "stay" remainder).
pub fn pick_weighted<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let mut r = rng.gen::<f64>();
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        if r < w {
            return Some(i);
        }
        r -= w;
    }
    None
}

//! Utilities.
use candle_core::{DType, Result, Tensor, D};
use candle_nn::ops::log_softmax;
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

/// Log-probabilities of `actions` under the categorical distributions given by `logits`.
///
/// * `logits` - Unnormalized scores, shape `(batch_size, n_actions)`.
/// * `actions` - Action indices of dtype `u32`, shape `(batch_size,)`.
///
/// Returns a tensor of shape `(batch_size,)`. The normalization uses
/// log-sum-exp, so large logits do not overflow.
pub fn categorical_log_prob(logits: &Tensor, actions: &Tensor) -> Result<Tensor> {
    let log_probs = log_softmax(logits, D::Minus1)?;
    log_probs
        .gather(&actions.unsqueeze(D::Minus1)?, D::Minus1)?
        .squeeze(D::Minus1)
}

/// Draws an index with probability `exp(log_probs[i])`.
///
/// Returns `None` if the weights are not a valid distribution (NaN, all zero).
pub fn sample_categorical<R: Rng>(log_probs: &[f32], rng: &mut R) -> Option<usize> {
    let probs = log_probs.iter().map(|lp| lp.exp()).collect::<Vec<_>>();
    let dist = WeightedIndex::new(&probs).ok()?;
    Some(dist.sample(rng))
}

/// Returns `true` if no element of `t` is NaN or infinite.
pub fn is_finite(t: &Tensor) -> Result<bool> {
    Ok(t
        .flatten_all()?
        .to_dtype(DType::F32)?
        .to_vec1::<f32>()?
        .iter()
        .all(|x| x.is_finite()))
}

/// Index of the largest element; the first one on ties.
pub fn argmax(xs: &[f32]) -> usize {
    xs.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(i_max, x_max), (i, &x)| {
            if x > x_max {
                (i, x)
            } else {
                (i_max, x_max)
            }
        })
        .0
}

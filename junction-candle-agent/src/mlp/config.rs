use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation_out: bool,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `units` - Widths of the hidden layers, may be empty for a single linear layer.
    /// * `activation_out` - If `true`, ReLU is applied to the output of the final layer.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize, activation_out: bool) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation_out,
        }
    }

    /// `(in, out)` dimensions of each linear layer.
    pub(super) fn layer_dims(&self) -> Vec<(usize, usize)> {
        let dims = std::iter::once(self.in_dim)
            .chain(self.units.iter().copied())
            .chain(std::iter::once(self.out_dim))
            .collect::<Vec<_>>();
        dims.windows(2).map(|w| (w[0], w[1])).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_dims() {
        let config = MlpConfig::new(4, vec![128], 2, false);
        assert_eq!(config.layer_dims(), vec![(4, 128), (128, 2)]);

        let config = MlpConfig::new(4, vec![], 128, true);
        assert_eq!(config.layer_dims(), vec![(4, 128)]);
    }
}

//! Positional encoding for the frontend output.
//!
//! The frontend accepts any [`PositionEncoder`]; [`SinusoidalPositionEncoder`]
//! is the fixed sin/cos variant used by wav2vec2 ASR fine-tuning setups.

use candle_core::{DType, Device, Tensor};

use crate::{Error, Result};

/// Injects sequence-order information into embeddings.
///
/// Implementations receive the padding mask (1.0 = valid, 0.0 = padding,
/// `None` = no padding) and decide how padded positions are handled.
pub trait PositionEncoder {
    /// Embedding dimension this encoder operates on. Checked against the
    /// frontend's `model_dim` at load time.
    fn dim(&self) -> usize;

    /// Encode positions into `seqs` (`[B, T, dim]`), returning a tensor of
    /// the same shape.
    fn forward(&self, seqs: &Tensor, padding_mask: Option<&Tensor>) -> Result<Tensor>;
}

// ---------------------------------------------------------------------------
// Sinusoidal encoder
// ---------------------------------------------------------------------------

/// Fixed sinusoidal position encoder.
///
/// Adds the classic interleaved sin/cos table to the input. Padded positions
/// receive no positional term, so they pass through unchanged.
///
/// No learnable parameters — the table is computed on-the-fly.
#[derive(Debug)]
pub struct SinusoidalPositionEncoder {
    dim: usize,
}

impl SinusoidalPositionEncoder {
    /// Create an encoder over `dim`-dimensional embeddings.
    ///
    /// Fails with a configuration error if `dim` is odd, since the sin/cos
    /// pairs cover two channels per frequency.
    pub fn new(dim: usize) -> Result<Self> {
        if dim % 2 != 0 {
            return Err(Error::Config(format!(
                "`dim` of `SinusoidalPositionEncoder` must be even, but is {dim} instead"
            )));
        }

        Ok(Self { dim })
    }

    /// Compute the positional table for sequence length `size`.
    ///
    /// Returns `[1, size, dim]` with `[sin0, cos0, sin1, cos1, ...]` per
    /// position.
    pub fn compute(&self, size: usize, dtype: DType, device: &Device) -> Result<Tensor> {
        let d = self.dim;
        let half_d = d / 2;

        // div_term = exp(arange(0, d, 2) * -(ln(10000) / d))
        let div_term: Vec<f32> = (0..half_d)
            .map(|i| (-(2.0 * i as f64) * (10000.0_f64).ln() / d as f64).exp() as f32)
            .collect();
        let div_term = Tensor::from_vec(div_term, (1, half_d), device)?;

        // position = arange(0, size)
        let position: Vec<f32> = (0..size).map(|i| i as f32).collect();
        let position = Tensor::from_vec(position, (size, 1), device)?;

        // args = position * div_term → [size, half_d]
        let args = position.broadcast_mul(&div_term)?;

        // Interleave sin/cos: [size, half_d, 2] → [size, d]
        let sin_pos = args.sin()?.unsqueeze(2)?;
        let cos_pos = args.cos()?.unsqueeze(2)?;
        let interleaved = Tensor::cat(&[&sin_pos, &cos_pos], 2)?;
        let pe = interleaved.reshape((size, d))?;

        Ok(pe.unsqueeze(0)?.to_dtype(dtype)?)
    }
}

impl PositionEncoder for SinusoidalPositionEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn forward(&self, seqs: &Tensor, padding_mask: Option<&Tensor>) -> Result<Tensor> {
        let (_batch, time, _dim) = seqs.dims3()?;

        let pe = self.compute(time, seqs.dtype(), seqs.device())?; // [1, T, dim]

        let out = match padding_mask {
            // Zero the positional term at padded positions:
            // [1, T, dim] * [B, T, 1] → [B, T, dim]
            Some(mask) => {
                let gate = mask.unsqueeze(2)?.to_dtype(seqs.dtype())?;
                seqs.broadcast_add(&pe.broadcast_mul(&gate)?)?
            }
            None => seqs.broadcast_add(&pe)?,
        };

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn odd_dim_is_rejected() {
        let err = SinusoidalPositionEncoder::new(7).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn table_shape_and_position_zero() {
        let enc = SinusoidalPositionEncoder::new(16).unwrap();
        let pe = enc.compute(5, DType::F32, &Device::Cpu).unwrap();
        assert_eq!(pe.dims(), &[1, 5, 16]);

        // Position 0: sin(0) = 0 on even channels, cos(0) = 1 on odd.
        let first: Vec<f32> = pe
            .squeeze(0)
            .unwrap()
            .narrow(0, 0, 1)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1()
            .unwrap();
        assert!(first[0].abs() < 1e-6, "sin(0) should be 0");
        assert!((first[1] - 1.0).abs() < 1e-6, "cos(0) should be 1");
    }

    #[test]
    fn forward_preserves_shape() {
        let device = Device::Cpu;
        let enc = SinusoidalPositionEncoder::new(8).unwrap();
        let x = Tensor::randn(0.0_f32, 1.0, (2, 6, 8), &device).unwrap();
        let out = enc.forward(&x, None).unwrap();
        assert_eq!(out.dims(), &[2, 6, 8]);
    }

    #[test]
    fn padded_positions_pass_through_unchanged() {
        let device = Device::Cpu;
        let enc = SinusoidalPositionEncoder::new(4).unwrap();

        let x = Tensor::ones((1, 4, 4), DType::F32, &device).unwrap();
        // Positions 2 and 3 are padding.
        let mask = Tensor::from_vec(vec![1.0f32, 1.0, 0.0, 0.0], (1, 4), &device).unwrap();

        let out = enc.forward(&x, Some(&mask)).unwrap();
        let rows: Vec<Vec<Vec<f32>>> = out.to_vec3().unwrap();

        // Padded rows keep the raw input values.
        assert_eq!(rows[0][2], vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(rows[0][3], vec![1.0, 1.0, 1.0, 1.0]);
        // Position 1 got a nonzero sin term on channel 0.
        assert!((rows[0][1][0] - 1.0).abs() > 1e-3);
    }
}

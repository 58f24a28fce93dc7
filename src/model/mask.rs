//! Padding-mask derivation.
//!
//! Converts per-item sequence lengths into a `[B, T]` float mask with 1.0
//! at valid positions and 0.0 at padding (the convention every consumer in
//! this crate follows). Absent lengths mean no padding and produce no mask.

use candle_core::Tensor;

use crate::Result;

/// Derive a padding mask for `seqs` from per-item valid lengths.
///
/// - `seqs`: `[B, T, D]`
/// - `seq_lens`: one entry per batch item, each `<= T`
///
/// Returns `None` when `seq_lens` is `None` (all positions valid), otherwise
/// a `[B, T]` mask in the dtype of `seqs` where positions at or beyond an
/// item's length are 0.0. Lengths larger than `T` are clamped.
pub fn to_padding_mask(seqs: &Tensor, seq_lens: Option<&[usize]>) -> Result<Option<Tensor>> {
    let Some(seq_lens) = seq_lens else {
        return Ok(None);
    };

    let (batch, time, _dim) = seqs.dims3()?;

    let mut data = vec![0.0f32; batch * time];
    for (row, &len) in data.chunks_mut(time).zip(seq_lens.iter()) {
        for slot in &mut row[..len.min(time)] {
            *slot = 1.0;
        }
    }

    let mask = Tensor::from_vec(data, (batch, time), seqs.device())?.to_dtype(seqs.dtype())?;

    Ok(Some(mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn absent_lengths_yield_no_mask() {
        let seqs = Tensor::zeros((2, 4, 8), DType::F32, &Device::Cpu).unwrap();
        let mask = to_padding_mask(&seqs, None).unwrap();
        assert!(mask.is_none());
    }

    #[test]
    fn positions_at_and_beyond_length_are_padding() {
        let seqs = Tensor::zeros((2, 5, 8), DType::F32, &Device::Cpu).unwrap();
        let mask = to_padding_mask(&seqs, Some(&[5, 2])).unwrap().unwrap();
        assert_eq!(mask.dims(), &[2, 5]);

        let rows: Vec<Vec<f32>> = mask.to_vec2().unwrap();
        assert_eq!(rows[0], vec![1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(rows[1], vec![1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_length_marks_whole_row() {
        let seqs = Tensor::zeros((1, 3, 4), DType::F32, &Device::Cpu).unwrap();
        let mask = to_padding_mask(&seqs, Some(&[0])).unwrap().unwrap();
        let rows: Vec<Vec<f32>> = mask.to_vec2().unwrap();
        assert_eq!(rows[0], vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn overlong_length_is_clamped() {
        let seqs = Tensor::zeros((1, 3, 4), DType::F32, &Device::Cpu).unwrap();
        let mask = to_padding_mask(&seqs, Some(&[7])).unwrap().unwrap();
        let rows: Vec<Vec<f32>> = mask.to_vec2().unwrap();
        assert_eq!(rows[0], vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn mask_follows_sequence_dtype() {
        let seqs = Tensor::zeros((1, 2, 4), DType::F64, &Device::Cpu).unwrap();
        let mask = to_padding_mask(&seqs, Some(&[1])).unwrap().unwrap();
        assert_eq!(mask.dtype(), DType::F64);
    }
}

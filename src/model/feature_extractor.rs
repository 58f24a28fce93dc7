//! Sequence feature extraction.
//!
//! The frontend accepts any [`SequenceFeatureExtractor`];
//! [`ConvFeatureExtractor`] is the wav2vec2 temporal convolution stack that
//! turns raw 16 kHz waveform into ~49 Hz feature frames.

use candle_core::{Module, Tensor};
use candle_nn::VarBuilder;

use crate::Result;

/// Converts a raw sequence into model-ready feature vectors.
///
/// Extractors may change the time dimension (striding, pooling) and must
/// report the matching per-item lengths alongside the output.
pub trait SequenceFeatureExtractor {
    /// Feature dimension of the output. The frontend projects this to its
    /// `model_dim` when the two differ.
    fn out_dim(&self) -> usize;

    /// Extract features from `seqs`, returning `(features, feature_lens)`.
    ///
    /// `feature_lens` is `None` exactly when `seq_lens` is `None`.
    fn forward(
        &self,
        seqs: &Tensor,
        seq_lens: Option<&[usize]>,
    ) -> Result<(Tensor, Option<Vec<usize>>)>;
}

// ---------------------------------------------------------------------------
// Convolutional extractor
// ---------------------------------------------------------------------------

/// One temporal convolution layer of the extractor stack.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConvLayerConfig {
    /// Output channels.
    pub dim: usize,
    /// Kernel width in samples/frames.
    pub kernel: usize,
    /// Temporal stride.
    pub stride: usize,
}

/// Configuration for [`ConvFeatureExtractor`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConvFeatureExtractorConfig {
    /// Convolution layers applied in order to the raw waveform.
    pub layers: Vec<ConvLayerConfig>,
}

impl Default for ConvFeatureExtractorConfig {
    /// The wav2vec2 BASE stack: 512 channels throughout, 320x total
    /// downsampling (49 feature frames per second of 16 kHz audio).
    fn default() -> Self {
        let layer = |kernel, stride| ConvLayerConfig {
            dim: 512,
            kernel,
            stride,
        };

        Self {
            layers: vec![
                layer(10, 5),
                layer(3, 2),
                layer(3, 2),
                layer(3, 2),
                layer(3, 2),
                layer(2, 2),
                layer(2, 2),
            ],
        }
    }
}

/// wav2vec2-style convolutional feature extractor.
///
/// A stack of bias-free strided 1-D convolutions with GELU, mapping raw
/// waveform `[B, S]` to feature frames `[B, T, out_dim]`.
///
/// ## Weight key paths
///
/// ```text
/// layers.{i}.weight — Conv1d [dim, in_dim, kernel]
/// ```
pub struct ConvFeatureExtractor {
    convs: Vec<candle_nn::Conv1d>,
    layer_configs: Vec<ConvLayerConfig>,
    out_dim: usize,
}

impl ConvFeatureExtractor {
    /// Load weights from safetensors. The `vb` should be scoped to the
    /// feature-extractor namespace.
    pub fn load(config: &ConvFeatureExtractorConfig, vb: VarBuilder) -> Result<Self> {
        let mut convs = Vec::with_capacity(config.layers.len());
        let mut in_dim = 1;

        for (i, layer) in config.layers.iter().enumerate() {
            let conv_config = candle_nn::Conv1dConfig {
                stride: layer.stride,
                ..Default::default()
            };
            let conv = candle_nn::conv1d_no_bias(
                in_dim,
                layer.dim,
                layer.kernel,
                conv_config,
                vb.pp(format!("layers.{i}")),
            )?;
            convs.push(conv);
            in_dim = layer.dim;
        }

        tracing::debug!(
            num_layers = config.layers.len(),
            out_dim = in_dim,
            "loaded conv feature extractor"
        );

        Ok(Self {
            convs,
            layer_configs: config.layers.clone(),
            out_dim: in_dim,
        })
    }

    /// Number of output frames produced for an input of `len` samples.
    pub fn output_len(&self, mut len: usize) -> usize {
        for layer in &self.layer_configs {
            len = if len < layer.kernel {
                0
            } else {
                (len - layer.kernel) / layer.stride + 1
            };
        }
        len
    }
}

impl SequenceFeatureExtractor for ConvFeatureExtractor {
    fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Forward pass: `[B, S]` waveform → `[B, T, out_dim]` frames.
    fn forward(
        &self,
        seqs: &Tensor,
        seq_lens: Option<&[usize]>,
    ) -> Result<(Tensor, Option<Vec<usize>>)> {
        // [B, S] → [B, 1, S]
        let mut x = seqs.unsqueeze(1)?;

        for conv in &self.convs {
            x = conv.forward(&x)?.gelu()?;
        }

        // [B, C, T] → [B, T, C]
        let x = x.transpose(1, 2)?.contiguous()?;

        let lens = seq_lens.map(|lens| lens.iter().map(|&len| self.output_len(len)).collect());

        Ok((x, lens))
    }
}

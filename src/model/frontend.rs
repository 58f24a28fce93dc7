//! Transformer encoder front-end for pretrained wav2vec2 models.
//!
//! Produces normalized, projected, positionally encoded embeddings ready
//! for the encoder stack, plus the padding mask for variable-length
//! batches. Every stage except the post-extraction LayerNorm is optional
//! and decided once at load time; absent stages are skipped on each call.
//!
//! ```text
//! [feature extractor] → padding mask ← lengths
//! → LayerNorm(feature_dim)
//! → [Linear(feature_dim, model_dim)]   iff feature_dim != model_dim
//! → [Dropout]
//! → [position encoder]
//! → [LayerNorm(model_dim)]
//! → [Dropout]
//! ```
//!
//! ## Weight key paths
//!
//! ```text
//! post_extract_layer_norm.{weight,bias} — LayerNorm(feature_dim)
//! post_extract_proj.{weight,bias}       — Linear(feature_dim, model_dim)
//! layer_norm.{weight,bias}              — LayerNorm(model_dim)
//! ```

use candle_core::{Module, Tensor};
use candle_nn::{Dropout, LayerNorm, Linear, VarBuilder};

use crate::config::FrontendConfig;
use crate::model::feature_extractor::SequenceFeatureExtractor;
use crate::model::incremental_state::IncrementalStateBag;
use crate::model::mask::to_padding_mask;
use crate::model::position_encoder::PositionEncoder;
use crate::{Error, Result};

/// Pretrained wav2vec2 Transformer encoder front-end.
pub struct Wav2Vec2Frontend {
    model_dim: usize,
    feature_extractor: Option<Box<dyn SequenceFeatureExtractor>>,
    post_extract_layer_norm: LayerNorm,
    post_extract_proj: Option<Linear>,
    post_extract_dropout: Option<Dropout>,
    pos_encoder: Option<Box<dyn PositionEncoder>>,
    layer_norm: Option<LayerNorm>,
    dropout: Option<Dropout>,
}

impl std::fmt::Debug for Wav2Vec2Frontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wav2Vec2Frontend")
            .field("model_dim", &self.model_dim)
            .finish_non_exhaustive()
    }
}

impl Wav2Vec2Frontend {
    /// Wire the pipeline stages from `config` and the supplied collaborators.
    ///
    /// If `feature_extractor` is `None`, inputs are assumed to arrive
    /// already extracted with a feature dimension of `model_dim`, and no
    /// projection is created. A `pos_encoder` whose `dim()` differs from
    /// `model_dim` fails with [`Error::Config`].
    ///
    /// `vb` carries the device and dtype placement for every sub-stage.
    pub fn load(
        config: &FrontendConfig,
        feature_extractor: Option<Box<dyn SequenceFeatureExtractor>>,
        pos_encoder: Option<Box<dyn PositionEncoder>>,
        vb: VarBuilder,
    ) -> Result<Self> {
        let model_dim = config.model_dim;

        let feature_dim = match &feature_extractor {
            Some(extractor) => extractor.out_dim(),
            None => model_dim,
        };

        let post_extract_layer_norm = candle_nn::layer_norm(
            feature_dim,
            config.norm_eps,
            vb.pp("post_extract_layer_norm"),
        )?;

        let post_extract_proj = if feature_dim != model_dim {
            Some(candle_nn::linear(
                feature_dim,
                model_dim,
                vb.pp("post_extract_proj"),
            )?)
        } else {
            None
        };

        let post_extract_dropout = if config.post_extract_dropout_p > 0.0 {
            Some(Dropout::new(config.post_extract_dropout_p as f32))
        } else {
            None
        };

        if let Some(encoder) = &pos_encoder {
            if encoder.dim() != model_dim {
                return Err(Error::Config(format!(
                    "`dim` of `pos_encoder` and `model_dim` must be equal, but are {} and {} instead",
                    encoder.dim(),
                    model_dim,
                )));
            }
        }

        let layer_norm = if config.layer_norm {
            Some(candle_nn::layer_norm(
                model_dim,
                config.norm_eps,
                vb.pp("layer_norm"),
            )?)
        } else {
            None
        };

        let dropout = if config.dropout_p > 0.0 {
            Some(Dropout::new(config.dropout_p as f32))
        } else {
            None
        };

        tracing::debug!(
            model_dim,
            feature_dim,
            has_extractor = feature_extractor.is_some(),
            has_proj = post_extract_proj.is_some(),
            has_pos_encoder = pos_encoder.is_some(),
            "loaded wav2vec2 frontend"
        );

        Ok(Self {
            model_dim,
            feature_extractor,
            post_extract_layer_norm,
            post_extract_proj,
            post_extract_dropout,
            pos_encoder,
            layer_norm,
            dropout,
        })
    }

    /// Output embedding dimension.
    pub fn model_dim(&self) -> usize {
        self.model_dim
    }

    /// Forward pass.
    ///
    /// - `seqs`: `[B, S]` raw waveform when a feature extractor is present,
    ///   otherwise `[B, T, model_dim]` extracted features
    /// - `seq_lens`: per-item valid lengths, one entry per batch item;
    ///   `None` means every position is valid
    /// - `state_bag`: must be `None` — this frontend never supports
    ///   incremental evaluation and fails with [`Error::Unsupported`]
    ///   before touching any tensor
    /// - `train`: enables the dropout stages
    ///
    /// Returns `([B, T, model_dim], padding_mask)` where the mask is `[B, T]`
    /// over the post-extraction time dimension, or `None` when `seq_lens`
    /// was `None`.
    pub fn forward(
        &self,
        seqs: &Tensor,
        seq_lens: Option<&[usize]>,
        state_bag: Option<&IncrementalStateBag>,
        train: bool,
    ) -> Result<(Tensor, Option<Tensor>)> {
        if state_bag.is_some() {
            return Err(Error::Unsupported(
                "`Wav2Vec2Frontend` does not support incremental evaluation".to_string(),
            ));
        }

        let (seqs, seq_lens) = match &self.feature_extractor {
            Some(extractor) => extractor.forward(seqs, seq_lens)?,
            None => (seqs.clone(), seq_lens.map(<[usize]>::to_vec)),
        };

        let padding_mask = to_padding_mask(&seqs, seq_lens.as_deref())?;

        let mut seqs = self.post_extract_layer_norm.forward(&seqs)?;

        if let Some(proj) = &self.post_extract_proj {
            seqs = proj.forward(&seqs)?;
        }

        if let Some(dropout) = &self.post_extract_dropout {
            seqs = dropout.forward(&seqs, train)?;
        }

        if let Some(encoder) = &self.pos_encoder {
            seqs = encoder.forward(&seqs, padding_mask.as_ref())?;
        }

        if let Some(norm) = &self.layer_norm {
            seqs = norm.forward(&seqs)?;
        }

        if let Some(dropout) = &self.dropout {
            seqs = dropout.forward(&seqs, train)?;
        }

        Ok((seqs, padding_mask))
    }
}

//! Pretrained wav2vec2 Transformer encoder front-end in pure Rust.
//!
//! A candle-based implementation of the embedding pipeline that wav2vec2
//! models run before their Transformer encoder stack: feature extraction,
//! normalization, projection to the model dimension, and positional
//! encoding, with a padding mask derived from per-item sequence lengths.
//!
//! ## Pipeline
//!
//! ```text
//! waveform [B, S] → ConvFeatureExtractor (optional) → [B, T, feature_dim]
//!                                                          ↓
//!                              padding mask [B, T] ← sequence lengths
//!                                                          ↓
//!                 LayerNorm(feature_dim)                (always)
//!                 Linear(feature_dim → model_dim)       (iff dims differ)
//!                 Dropout                               (optional)
//!                 position encoder                      (optional)
//!                 LayerNorm(model_dim)                  (optional)
//!                 Dropout                               (optional)
//!                                                          ↓
//!                             [B, T, model_dim] + padding mask
//! ```
//!
//! Incremental (cached autoregressive) evaluation is not supported; the
//! frontend rejects any call that passes an
//! [`IncrementalStateBag`](model::incremental_state::IncrementalStateBag).
//!
//! ## Modules
//!
//! - [`config`] — frontend hyperparameters (wav2vec2 BASE defaults)
//! - [`model`] — the frontend pipeline and its pluggable collaborators

pub mod config;
pub mod model;

mod error;

pub use error::{Error, Result};

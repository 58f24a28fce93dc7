//! Model components for the wav2vec2 front-end.
//!
//! ## Components
//!
//! - [`frontend`] — the conditional embedding pipeline
//! - [`feature_extractor`] — waveform → feature conversion (trait + conv stack)
//! - [`position_encoder`] — positional information injection (trait + sinusoidal)
//! - [`mask`] — padding-mask derivation from sequence lengths
//! - [`incremental_state`] — opaque cached-state bag, rejected by the frontend

pub mod feature_extractor;
pub mod frontend;
pub mod incremental_state;
pub mod mask;
pub mod position_encoder;

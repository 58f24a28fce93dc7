//! Frontend configuration.
//!
//! Defaults match the wav2vec2 BASE checkpoint.

use std::path::Path;

use crate::Result;

/// Configuration for [`Wav2Vec2Frontend`](crate::model::frontend::Wav2Vec2Frontend).
///
/// Which pipeline stages exist is decided once at load time from these
/// values together with the supplied feature extractor and position
/// encoder; see the frontend docs for the stage order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FrontendConfig {
    /// Output embedding dimension fed to the encoder stack.
    #[serde(default = "default_model_dim")]
    pub model_dim: usize,

    /// Dropout probability on extracted features, applied after the
    /// projection and before positional encoding. Zero disables the stage.
    #[serde(default = "default_post_extract_dropout_p")]
    pub post_extract_dropout_p: f64,

    /// If `true`, applies a final LayerNorm over `model_dim` after
    /// positional encoding.
    #[serde(default = "default_layer_norm")]
    pub layer_norm: bool,

    /// Dropout probability on the final embeddings. Zero disables the stage.
    #[serde(default = "default_dropout_p")]
    pub dropout_p: f64,

    /// Epsilon added to the LayerNorm denominators for numerical stability.
    #[serde(default = "default_norm_eps")]
    pub norm_eps: f64,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            model_dim: default_model_dim(),
            post_extract_dropout_p: default_post_extract_dropout_p(),
            layer_norm: default_layer_norm(),
            dropout_p: default_dropout_p(),
            norm_eps: default_norm_eps(),
        }
    }
}

impl FrontendConfig {
    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

fn default_model_dim() -> usize {
    768
}
fn default_post_extract_dropout_p() -> f64 {
    0.0
}
fn default_layer_norm() -> bool {
    false
}
fn default_dropout_p() -> f64 {
    0.1
}
fn default_norm_eps() -> f64 {
    1e-5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_base_checkpoint() {
        let config = FrontendConfig::default();
        assert_eq!(config.model_dim, 768);
        assert_eq!(config.post_extract_dropout_p, 0.0);
        assert!(!config.layer_norm);
        assert_eq!(config.dropout_p, 0.1);
        assert_eq!(config.norm_eps, 1e-5);
    }

    #[test]
    fn deserialize_from_json() {
        let json = r#"{"model_dim": 1024, "layer_norm": true}"#;
        let config: FrontendConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.model_dim, 1024);
        assert!(config.layer_norm);
        // Unspecified fields should use defaults.
        assert_eq!(config.dropout_p, 0.1);
        assert_eq!(config.norm_eps, 1e-5);
    }
}

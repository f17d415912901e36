//! Embedding model wrapper for fastembed.
//!
//! Provides a high-level interface for generating embeddings:
//! - Lazy model loading with configurable cache directory
//! - Model download with timeout on first use
//! - Batch embedding generation
//! - A process-wide shared handle for concurrent callers

use fastembed::{InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;

/// Default download timeout for model files (5 minutes)
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Error type for encoder operations
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    /// Model could not be resolved locally or downloaded. Fatal: callers
    /// must not serve recommendations without a loaded encoder.
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    /// Empty or whitespace-only input text. Recoverable per request.
    #[error("Cannot embed empty text")]
    EmptyInput,

    /// Unspecified library-level failure. Carries the model identifier and
    /// input length so the failure can be diagnosed; never retried here.
    #[error("Embedding failed (model {model}, input {len} chars): {message}")]
    Encoding {
        model: String,
        len: usize,
        message: String,
    },
}

/// Trait for text encoders.
///
/// Implemented by [`EmbeddingModel`]; tests substitute lightweight stubs so
/// ranking logic can be exercised without a model download.
pub trait Encoder: Send + Sync {
    /// Embed a single text. Must reject empty input with
    /// [`EncoderError::EmptyInput`].
    fn embed(&self, text: &str) -> Result<Vec<f32>, EncoderError>;

    /// Embed multiple texts, index-aligned with the input.
    ///
    /// Batching is an optimization only: `embed_batch(xs)[i]` equals
    /// `embed(xs[i])` within floating-point tolerance.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncoderError>;

    /// Embedding dimension of this encoder. Every vector it produces has
    /// exactly this length.
    fn dimensions(&self) -> usize;

    /// Model name/identifier
    fn name(&self) -> &str;
}

/// Wrapper around fastembed's TextEmbedding model.
/// Uses a Mutex because fastembed's embed() requires &mut self.
pub struct EmbeddingModel {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimensions: usize,
}

impl EmbeddingModel {
    /// Create a new embedding model with the given name.
    ///
    /// The model will be downloaded on first use if not cached.
    /// Models are cached in the `models/` subdirectory of `cache_dir`.
    ///
    /// # Arguments
    /// * `model_name` - Name of the model (e.g., "multilingual-e5-large")
    /// * `cache_dir` - Directory to cache downloaded models
    /// * `download_timeout` - Optional timeout for model download
    pub fn new(
        model_name: &str,
        cache_dir: PathBuf,
        download_timeout: Option<Duration>,
    ) -> Result<Self, EncoderError> {
        let model_enum = Self::parse_model_name(model_name)?;
        let _timeout = download_timeout.unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT);

        // Ensure cache directory exists
        let models_dir = cache_dir.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            EncoderError::ModelLoad(format!("Failed to create models directory: {}", e))
        })?;

        let options = InitOptions::new(model_enum)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| EncoderError::ModelLoad(e.to_string()))?;

        // Get model dimensions by embedding a test string
        let dimensions = Self::probe_dimensions(&mut model, model_name)?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
            dimensions,
        })
    }

    /// Parse model name string to fastembed enum.
    ///
    /// Only multilingual families are accepted: catalog descriptions and
    /// queries are expected in mixed scripts (CJK included).
    fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EncoderError> {
        match name.to_lowercase().as_str() {
            "multilingual-e5-small" | "multilinguale5small" => {
                Ok(fastembed::EmbeddingModel::MultilingualE5Small)
            }
            "multilingual-e5-base" | "multilinguale5base" => {
                Ok(fastembed::EmbeddingModel::MultilingualE5Base)
            }
            "multilingual-e5-large" | "multilinguale5large" => {
                Ok(fastembed::EmbeddingModel::MultilingualE5Large)
            }
            "paraphrase-multilingual-minilm-l12-v2" | "paraphrasemlminilml12v2" => {
                Ok(fastembed::EmbeddingModel::ParaphraseMLMiniLML12V2)
            }
            "paraphrase-multilingual-mpnet-base-v2" | "paraphrasemlmpnetbasev2" => {
                Ok(fastembed::EmbeddingModel::ParaphraseMLMpnetBaseV2)
            }
            _ => Err(EncoderError::InvalidModel(format!(
                "Unknown model: {}. Supported models: multilingual-e5-small, multilingual-e5-base, multilingual-e5-large, paraphrase-multilingual-MiniLM-L12-v2, paraphrase-multilingual-mpnet-base-v2",
                name
            ))),
        }
    }

    /// Probe the model to determine embedding dimensions.
    fn probe_dimensions(model: &mut TextEmbedding, name: &str) -> Result<usize, EncoderError> {
        let test_embeddings = model.embed(vec!["test"], None).map_err(|e| {
            EncoderError::ModelLoad(format!("Failed to probe dimensions of {}: {}", name, e))
        })?;

        test_embeddings
            .first()
            .map(|v| v.len())
            .ok_or_else(|| EncoderError::ModelLoad("Model returned no embedding".to_string()))
    }
}

impl Encoder for EmbeddingModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        if text.trim().is_empty() {
            return Err(EncoderError::EmptyInput);
        }

        let mut model = self.model.lock().map_err(|e| EncoderError::Encoding {
            model: self.model_name.clone(),
            len: text.len(),
            message: format!("Failed to acquire model lock: {}", e),
        })?;

        let embeddings = model
            .embed(vec![text], None)
            .map_err(|e| EncoderError::Encoding {
                model: self.model_name.clone(),
                len: text.len(),
                message: e.to_string(),
            })?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EncoderError::Encoding {
                model: self.model_name.clone(),
                len: text.len(),
                message: "No embedding returned".to_string(),
            })
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncoderError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EncoderError::EmptyInput);
        }

        let total_len: usize = texts.iter().map(|t| t.len()).sum();
        let mut model = self.model.lock().map_err(|e| EncoderError::Encoding {
            model: self.model_name.clone(),
            len: total_len,
            message: format!("Failed to acquire model lock: {}", e),
        })?;

        model
            .embed(texts.to_vec(), None)
            .map_err(|e| EncoderError::Encoding {
                model: self.model_name.clone(),
                len: total_len,
                message: e.to_string(),
            })
    }
}

/// Process-wide shared encoder handle.
///
/// Uses Mutex<Option<_>> instead of OnceLock because get_or_try_init is
/// unstable, and because a model change must be able to replace the handle.
static SHARED: Mutex<Option<Arc<EmbeddingModel>>> = Mutex::new(None);

/// Get the shared encoder, loading it on first call.
///
/// The load happens at most once for a given model: concurrent first callers
/// serialize on the slot lock and all observe the same handle. Calling again
/// with the same configured model returns the cached handle without
/// reloading; a different model name replaces the handle (model upgrade).
pub fn shared(config: &Config) -> Result<Arc<EmbeddingModel>, EncoderError> {
    let mut guard = SHARED.lock().map_err(|e| EncoderError::Encoding {
        model: config.model.clone(),
        len: 0,
        message: format!("Lock poisoned: {}", e),
    })?;

    if let Some(existing) = guard.as_ref() {
        if existing.name() == config.model {
            return Ok(existing.clone());
        }
        log::warn!(
            "Replacing shared encoder '{}' with '{}'",
            existing.name(),
            config.model
        );
    }

    log::info!("Loading embedding model '{}'", config.model);
    let timeout = Duration::from_secs(config.download_timeout_secs);
    let model = Arc::new(EmbeddingModel::new(
        &config.model,
        PathBuf::from(&config.cache_dir),
        Some(timeout),
    )?);
    log::info!(
        "Model '{}' loaded ({} dimensions)",
        model.name(),
        model.dimensions()
    );

    *guard = Some(model.clone());
    Ok(model)
}

/// Drop the shared encoder. The next call to [`shared`] reloads it.
pub fn reset() {
    if let Ok(mut guard) = SHARED.lock() {
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_model_name() {
        let temp_dir = std::env::temp_dir().join("roomrec-embed-invalid");
        let result = EmbeddingModel::new("nonexistent-model", temp_dir, None);
        assert!(matches!(result, Err(EncoderError::InvalidModel(_))));
    }

    #[test]
    fn test_parse_model_name_case_insensitive() {
        assert!(EmbeddingModel::parse_model_name("Multilingual-E5-Large").is_ok());
        assert!(EmbeddingModel::parse_model_name("multilingual-e5-small").is_ok());
        assert!(EmbeddingModel::parse_model_name("bge-large-en-v1.5").is_err());
    }

    // Integration tests require model download - run with --ignored
    #[test]
    #[ignore = "requires model download"]
    fn test_model_creation() {
        let temp_dir = std::env::temp_dir().join("roomrec-embed-test");
        let model = EmbeddingModel::new("multilingual-e5-small", temp_dir.clone(), None);
        assert!(model.is_ok());

        let model = model.unwrap();
        assert_eq!(model.name(), "multilingual-e5-small");
        assert_eq!(model.dimensions(), 384); // e5-small produces 384-dim embeddings

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embedding_generation() {
        let temp_dir = std::env::temp_dir().join("roomrec-embed-test-gen");
        let model = EmbeddingModel::new("multilingual-e5-small", temp_dir.clone(), None).unwrap();

        let embedding = model.embed("傳統榻榻米房間，配有私人溫泉。").unwrap();
        assert_eq!(embedding.len(), 384);

        // Check that values are normalized (L2 norm ~= 1)
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embed_deterministic() {
        let temp_dir = std::env::temp_dir().join("roomrec-embed-test-det");
        let model = EmbeddingModel::new("multilingual-e5-small", temp_dir.clone(), None).unwrap();

        let a = model.embed("private hot spring cottage").unwrap();
        let b = model.embed("private hot spring cottage").unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5);
        }

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_batch_matches_single() {
        let temp_dir = std::env::temp_dir().join("roomrec-embed-test-batch");
        let model = EmbeddingModel::new("multilingual-e5-small", temp_dir.clone(), None).unwrap();

        let texts = vec![
            "面海陽台，擁有絕佳視野。".to_string(),
            "economy dorm bed with shared kitchen".to_string(),
        ];
        let batch = model.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 2);

        for (i, text) in texts.iter().enumerate() {
            let single = model.embed(text).unwrap();
            assert_eq!(single.len(), batch[i].len());
            for (x, y) in single.iter().zip(batch[i].iter()) {
                assert!((x - y).abs() < 1e-4);
            }
        }

        let _ = std::fs::remove_dir_all(&temp_dir);
    }
}

//! Sentence-transformer embeddings on candle.
//!
//! Loads a BERT-family sentence encoder (by default
//! `sentence-transformers/all-MiniLM-L6-v2`) from a local directory or the
//! HuggingFace hub, mean-pools the last hidden state over the attention
//! mask and L2-normalizes the result.

use std::fmt::Display;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::api::sync::ApiBuilder;
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use super::Embedder;
use crate::error::{Error, Result};
use crate::options::EmbedOptions;

/// Model used when none is configured.
pub const MINILM_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Longest input in tokens; longer texts are truncated.
const MAX_SEQ_LEN: usize = 256;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

fn model_error(err: impl Display) -> Error {
    Error::Embedding(err.to_string())
}

/// Device for inference. `force_cpu` pins the CPU; otherwise the first
/// CUDA device is used when candle was built with CUDA support.
pub fn select_device(force_cpu: bool) -> Result<Device> {
    if force_cpu {
        return Ok(Device::Cpu);
    }
    let device = Device::cuda_if_available(0).map_err(model_error)?;
    if device.is_cpu() {
        log::info!("No accelerator available, running on CPU");
    }
    Ok(device)
}

/// Sentence encoder producing one mean-pooled vector per text.
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimensions: usize,
}

impl MiniLmEmbedder {
    /// Load the model named by `options.model`, or [`MINILM_MODEL_ID`].
    pub fn new(options: &EmbedOptions) -> Result<Self> {
        let model_id = options.model.as_deref().unwrap_or(MINILM_MODEL_ID);
        Self::from_pretrained(model_id, options)
    }

    /// Load from a local model directory or a HuggingFace model ID.
    pub fn from_pretrained(model_id: &str, options: &EmbedOptions) -> Result<Self> {
        let path = Path::new(model_id);
        if path.is_dir() {
            log::info!("Loading embedding model from {}", path.display());
            return Self::from_dir(path, options);
        }

        let api = ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(model_error)?;
        let repo = api.model(model_id.to_string());

        log::info!("Fetching embedding model {}", model_id);
        let config = repo.get(CONFIG_FILE).map_err(model_error)?;
        let tokenizer = repo.get(TOKENIZER_FILE).map_err(model_error)?;
        let weights = repo.get(WEIGHTS_FILE).map_err(model_error)?;

        Self::from_files(&config, &tokenizer, &weights, options)
    }

    /// Load from a directory holding `config.json`, `tokenizer.json` and
    /// `model.safetensors`.
    pub fn from_dir(dir: &Path, options: &EmbedOptions) -> Result<Self> {
        let files = [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE].map(|name| dir.join(name));
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(Error::Embedding(format!(
                "{} not found; expected {}, {} and {}",
                missing.display(),
                CONFIG_FILE,
                TOKENIZER_FILE,
                WEIGHTS_FILE
            )));
        }
        let [config, tokenizer, weights] = files;
        Self::from_files(&config, &tokenizer, &weights, options)
    }

    fn from_files(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
        options: &EmbedOptions,
    ) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(config_path)?)?;
        let dimensions = raw
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| Error::Embedding("config.json has no hidden_size".to_string()))?
            as usize;
        let config: BertConfig = serde_json::from_value(raw)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(model_error)?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(model_error)?;

        let device = select_device(options.force_cpu)?;
        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(model_error)?
        };
        // Exported sentence-transformers weights have no "bert." prefix.
        let model = BertModel::load(vb.pp("bert"), &config)
            .or_else(|_| BertModel::load(vb, &config))
            .map_err(model_error)?;

        log::debug!("Embedding model ready: {} dimensions on {:?}", dimensions, device);
        Ok(Self {
            model,
            tokenizer,
            device,
            dimensions,
        })
    }

    /// Device the model runs on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    fn stack(&self, encodings: &[Encoding], field: fn(&Encoding) -> &[u32]) -> Result<Tensor> {
        let rows = encodings
            .iter()
            .map(|e| Tensor::new(field(e), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()
            .map_err(model_error)?;
        Tensor::stack(&rows, 0).map_err(model_error)
    }
}

impl Embedder for MiniLmEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(model_error)?;
        let input_ids = self.stack(&encodings, Encoding::get_ids)?;
        let type_ids = self.stack(&encodings, Encoding::get_type_ids)?;
        let mask = self.stack(&encodings, Encoding::get_attention_mask)?;

        let hidden = self
            .model
            .forward(&input_ids, &type_ids, Some(&mask))
            .map_err(model_error)?;
        let pooled = mean_pool(&hidden, &mask)
            .and_then(|t| l2_normalize(&t))
            .map_err(model_error)?;
        pooled.to_vec2::<f32>().map_err(model_error)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Average of token states `[batch, seq, hidden]` over unmasked positions.
fn mean_pool(hidden: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
    let mask = mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    // Every row keeps at least its [CLS] token, so counts are non-zero.
    let counts = mask.sum(1)?;
    summed.broadcast_div(&counts)
}

fn l2_normalize(t: &Tensor) -> candle_core::Result<Tensor> {
    let norm = t.sqr()?.sum_keepdim(1)?.sqrt()?;
    t.broadcast_div(&norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::cosine_similarity;

    #[test]
    fn test_force_cpu_selects_cpu() {
        assert!(select_device(true).unwrap().is_cpu());
    }

    #[test]
    fn test_mean_pool_ignores_padding() {
        let device = Device::Cpu;
        // batch 1, seq 3, hidden 2; the last position is padding
        let hidden = Tensor::new(&[[[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]]], &device).unwrap();
        let mask = Tensor::new(&[[1u32, 1, 0]], &device).unwrap();
        let pooled = mean_pool(&hidden, &mask).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(pooled, [[2.0, 3.0]]);
    }

    #[test]
    fn test_l2_normalize_rows() {
        let device = Device::Cpu;
        let t = Tensor::new(&[[3.0f32, 4.0], [0.0, 2.0]], &device).unwrap();
        let rows = l2_normalize(&t).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(rows, [[0.6, 0.8], [0.0, 1.0]]);
    }

    #[test]
    fn test_from_dir_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = MiniLmEmbedder::from_dir(dir.path(), &EmbedOptions::default());
        assert!(matches!(result, Err(Error::Embedding(msg)) if msg.contains(CONFIG_FILE)));
    }

    #[test]
    #[ignore = "downloads all-MiniLM-L6-v2"]
    fn test_semantic_neighbours() {
        let embedder = MiniLmEmbedder::new(&EmbedOptions::default()).unwrap();
        assert_eq!(embedder.dimensions(), 384);
        assert!(embedder.device().is_cpu());

        let v = embedder
            .embed(&[
                "Where can we swim in the sea?",
                "The coast has several sandy beaches with lifeguards.",
                "Quarterly revenue grew by four percent.",
            ])
            .unwrap();
        assert!(cosine_similarity(&v[0], &v[1]) > cosine_similarity(&v[0], &v[2]));
    }
}

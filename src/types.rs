use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

pub type ModelId = String;
pub type SamplerId = String;

pub const MIN_STEPS: u32 = 10;
pub const MAX_STEPS: u32 = 50;
pub const MIN_CFG_SCALE: f32 = 1.0;
pub const MAX_CFG_SCALE: f32 = 20.0;
pub const DIMENSIONS: [u32; 4] = [512, 768, 1024, 1280];
pub const BATCH_SIZES: [u32; 4] = [1, 2, 4, 8];
pub const BATCH_COUNTS: [u32; 4] = [1, 2, 3, 4];

const DEFAULT_PROMPT: &str = "A beautiful landscape with snow-capped mountains, a serene lake, and pine trees under a dramatic sky";
const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low quality, distortion, poorly drawn, ugly, bad anatomy";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Checkpoint,
    Lora,
    Embedding,
    Controlnet,
    Upscaler,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Sampler {
    pub id: SamplerId,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationType {
    #[default]
    TextToImage,
    ImageToImage,
    Inpainting,
    TextToVideo,
    ImageToVideo,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    pub model: ModelId,
    pub sampler: SamplerId,
    pub steps: u32,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    /// `None` draws a fresh seed for every request.
    pub seed: Option<u32>,
    pub batch_size: u32,
    pub batch_count: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            negative_prompt: Some(DEFAULT_NEGATIVE_PROMPT.to_string()),
            model: crate::registry::DEFAULT_MODEL_ID.to_string(),
            sampler: crate::registry::DEFAULT_SAMPLER_ID.to_string(),
            steps: 30,
            cfg_scale: 7.0,
            width: 768,
            height: 768,
            seed: None,
            batch_size: 2,
            batch_count: 1,
        }
    }
}

impl GenerationParams {
    /// Checks the numeric ranges and enumerated values. Registry membership of
    /// `model` and `sampler` is checked by the generation workflow.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.prompt.trim().is_empty() {
            return Err(GenerationError::InvalidParams("prompt is empty".to_string()));
        }
        if !(MIN_STEPS..=MAX_STEPS).contains(&self.steps) {
            return Err(GenerationError::InvalidParams(format!(
                "steps must be between {} and {}, got {}",
                MIN_STEPS, MAX_STEPS, self.steps
            )));
        }
        if !self.cfg_scale.is_finite() || !(MIN_CFG_SCALE..=MAX_CFG_SCALE).contains(&self.cfg_scale) {
            return Err(GenerationError::InvalidParams(format!(
                "cfg scale must be between {:.1} and {:.1}, got {}",
                MIN_CFG_SCALE, MAX_CFG_SCALE, self.cfg_scale
            )));
        }
        for (label, value) in [("width", self.width), ("height", self.height)] {
            if !DIMENSIONS.contains(&value) {
                return Err(GenerationError::InvalidParams(format!(
                    "{} must be one of {:?}, got {}",
                    label, DIMENSIONS, value
                )));
            }
        }
        if !BATCH_SIZES.contains(&self.batch_size) {
            return Err(GenerationError::InvalidParams(format!(
                "batch size must be one of {:?}, got {}",
                BATCH_SIZES, self.batch_size
            )));
        }
        if !BATCH_COUNTS.contains(&self.batch_count) {
            return Err(GenerationError::InvalidParams(format!(
                "batch count must be one of {:?}, got {}",
                BATCH_COUNTS, self.batch_count
            )));
        }
        Ok(())
    }

    /// Pins a freshly drawn seed.
    pub fn randomize_seed(&mut self) {
        self.seed = Some(random_seed());
    }

    /// Switches between "randomize per request" and a fixed seed.
    pub fn toggle_seed_lock(&mut self) {
        self.seed = match self.seed {
            None => Some(random_seed()),
            Some(_) => None,
        };
    }

    /// Copy of these params with the seed sentinel replaced by a concrete value.
    pub fn with_effective_seed(&self) -> Self {
        let mut resolved = self.clone();
        resolved.seed = Some(self.seed.unwrap_or_else(random_seed));
        resolved
    }
}

/// Uniform over the full `u32` range.
pub fn random_seed() -> u32 {
    rand::random::<u32>()
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub id: String,
    pub images: Vec<String>,
    pub params: GenerationParams,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub dark_mode: bool,
    pub generation_type: GenerationType,
    pub is_connected: bool,
    pub is_generating: bool,
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_error: Option<String>,
}

impl SessionState {
    pub fn new(server_url: String, dark_mode: bool) -> Self {
        Self {
            dark_mode,
            generation_type: GenerationType::default(),
            is_connected: false,
            is_generating: false,
            server_url,
            connection_error: None,
        }
    }
}

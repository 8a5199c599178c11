use crate::types::{Model, ModelType, Sampler};

pub const DEFAULT_MODEL_ID: &str = "model1";
pub const DEFAULT_SAMPLER_ID: &str = "euler_a";

struct ModelEntry {
    id: &'static str,
    name: &'static str,
    model_type: ModelType,
    preview: &'static str,
    description: &'static str,
    is_favorite: bool,
}

const MODELS: [ModelEntry; 5] = [
    ModelEntry {
        id: "model1",
        name: "Stable Diffusion XL",
        model_type: ModelType::Checkpoint,
        preview: "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?q=80&w=2064&auto=format&fit=crop&ixlib=rb-4.0.3",
        description: "State-of-the-art text to image model with enhanced detail and composition",
        is_favorite: true,
    },
    ModelEntry {
        id: "model2",
        name: "Stable Diffusion 1.5",
        model_type: ModelType::Checkpoint,
        preview: "https://images.unsplash.com/photo-1633168846771-8a00384e9def?q=80&w=2160&auto=format&fit=crop&ixlib=rb-4.0.3",
        description: "Reliable text to image model with good general capabilities",
        is_favorite: false,
    },
    ModelEntry {
        id: "model3",
        name: "Dreamshaper",
        model_type: ModelType::Checkpoint,
        preview: "https://images.unsplash.com/photo-1549244433-a82b2117f247?q=80&w=1974&auto=format&fit=crop&ixlib=rb-4.0.3",
        description: "Creative model focused on artistic and dreamlike imagery",
        is_favorite: false,
    },
    ModelEntry {
        id: "lora1",
        name: "Realistic Vision",
        model_type: ModelType::Lora,
        preview: "https://images.unsplash.com/photo-1603048588665-711bd5aec2d7?q=80&w=1780&auto=format&fit=crop&ixlib=rb-4.0.3",
        description: "LoRA for enhancing photorealism in generated images",
        is_favorite: true,
    },
    ModelEntry {
        id: "lora2",
        name: "AnimeFigure LoRA",
        model_type: ModelType::Lora,
        preview: "https://images.unsplash.com/photo-1560448075-bb485b067938?q=80&w=2070&auto=format&fit=crop&ixlib=rb-4.0.3",
        description: "Specialized in creating anime figure aesthetics",
        is_favorite: false,
    },
];

const SAMPLERS: [(&str, &str, &str); 5] = [
    ("euler_a", "Euler Ancestral", "Good general-purpose sampler with a balance of speed and quality"),
    ("dpm_2", "DPM++ 2M Karras", "High quality results with good details, slower than Euler"),
    ("ddim", "DDIM", "Fast sampler, good for initial tests"),
    ("dpm_sde", "DPM++ SDE Karras", "Excellent for detailed images, slower performance"),
    ("lcm", "LCM", "Lightning fast, fewer steps, good for iteration"),
];

impl ModelEntry {
    fn to_model(&self) -> Model {
        Model {
            id: self.id.to_string(),
            name: self.name.to_string(),
            model_type: self.model_type,
            preview: Some(self.preview.to_string()),
            description: Some(self.description.to_string()),
            is_favorite: self.is_favorite,
            last_used: None,
            tags: Vec::new(),
        }
    }
}

pub fn list_models() -> Vec<Model> {
    MODELS.iter().map(ModelEntry::to_model).collect()
}

pub fn list_samplers() -> Vec<Sampler> {
    SAMPLERS
        .iter()
        .map(|(id, name, description)| Sampler {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        })
        .collect()
}

pub fn find_model(id: &str) -> Option<Model> {
    MODELS.iter().find(|entry| entry.id == id).map(ModelEntry::to_model)
}

pub fn find_sampler(id: &str) -> Option<Sampler> {
    list_samplers().into_iter().find(|sampler| sampler.id == id)
}

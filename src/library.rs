use std::collections::VecDeque;

use chrono::Utc;

use crate::types::Model;

pub const RECENT_CAPACITY: usize = 10;

/// Recently used models plus the favorites set.
///
/// Stored entries never carry their own favorite flag; `is_favorite` is filled
/// in from favorites membership whenever a list is read.
#[derive(Clone, Debug, Default)]
pub struct ModelLibrary {
    recent: VecDeque<Model>,
    favorites: Vec<Model>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent first. Re-adding an id moves it to the front.
    pub fn add_recent(&mut self, model: Model) {
        let mut model = model;
        model.is_favorite = false;
        model.last_used = Some(Utc::now());
        self.recent.retain(|entry| entry.id != model.id);
        self.recent.push_front(model);
        self.recent.truncate(RECENT_CAPACITY);
    }

    /// Returns the new membership. Turning a favorite on requires the model to be
    /// in the recent list; otherwise nothing changes.
    pub fn toggle_favorite(&mut self, model_id: &str) -> bool {
        if let Some(index) = self.favorites.iter().position(|entry| entry.id == model_id) {
            self.favorites.remove(index);
            return false;
        }
        match self.recent.iter().find(|entry| entry.id == model_id) {
            Some(model) => {
                self.favorites.push(model.clone());
                true
            }
            None => false,
        }
    }

    pub fn is_favorite(&self, model_id: &str) -> bool {
        self.favorites.iter().any(|entry| entry.id == model_id)
    }

    pub fn recent(&self) -> Vec<Model> {
        self.recent
            .iter()
            .map(|model| self.with_favorite_flag(model))
            .collect()
    }

    pub fn favorites(&self) -> Vec<Model> {
        self.favorites
            .iter()
            .map(|model| Model {
                is_favorite: true,
                ..model.clone()
            })
            .collect()
    }

    fn with_favorite_flag(&self, model: &Model) -> Model {
        Model {
            is_favorite: self.is_favorite(&model.id),
            ..model.clone()
        }
    }
}

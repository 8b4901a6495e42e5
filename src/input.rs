use log::debug;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::model::{Cuisine, Diet};

/// Sent as the ingredient text when an image is submitted without a hint
pub const IMAGE_HINT_FALLBACK: &str = "Dish from uploaded food image";

pub const DEFAULT_SERVINGS: u32 = 2;

/// How the user describes what they have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryMode {
    /// Typed, comma separated ingredients
    #[default]
    Text,
    /// A photo of the food, optionally with a hint
    Image,
}

/// Display-only reference to a selected image
///
/// Only lives as long as the selection. It is not part of the request; the
/// image is read and encoded separately at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    uri: String,
}

impl ImagePreview {
    fn new(path: &Path) -> Self {
        let absolute = match std::env::current_dir() {
            Ok(cwd) if path.is_relative() => cwd.join(path),
            _ => path.to_path_buf(),
        };
        ImagePreview {
            uri: format!("file://{}", absolute.display()),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn revoke(self) {
        debug!("Revoked image preview {}", self.uri);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    path: PathBuf,
    preview: ImagePreview,
}

impl SelectedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preview(&self) -> &ImagePreview {
        &self.preview
    }
}

/// State of the recipe form
///
/// Values for both modes are kept while the user switches between them;
/// only the active mode's values are validated and sent.
#[derive(Debug, Clone)]
pub struct InputCollector {
    mode: EntryMode,
    ingredients: String,
    image: Option<SelectedImage>,
    image_hint: String,
    cuisine: Cuisine,
    diet: Diet,
    servings: u32,
}

impl Default for InputCollector {
    fn default() -> Self {
        Self {
            mode: EntryMode::Text,
            ingredients: String::new(),
            image: None,
            image_hint: String::new(),
            cuisine: Cuisine::Any,
            diet: Diet::Any,
            servings: DEFAULT_SERVINGS,
        }
    }
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: EntryMode) {
        self.mode = mode;
    }

    pub fn ingredients(&self) -> &str {
        &self.ingredients
    }

    pub fn set_ingredients(&mut self, ingredients: impl Into<String>) {
        self.ingredients = ingredients.into();
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// Select an image file, replacing (and revoking the preview of) any
    /// previous selection
    pub fn select_image(&mut self, path: impl Into<PathBuf>) -> &ImagePreview {
        let path = path.into();
        let preview = ImagePreview::new(&path);
        if let Some(previous) = self.image.take() {
            previous.preview.revoke();
        }
        &self.image.insert(SelectedImage { path, preview }).preview
    }

    pub fn clear_image(&mut self) {
        if let Some(previous) = self.image.take() {
            previous.preview.revoke();
        }
    }

    pub fn image_hint(&self) -> &str {
        &self.image_hint
    }

    pub fn set_image_hint(&mut self, hint: impl Into<String>) {
        self.image_hint = hint.into();
    }

    pub fn cuisine(&self) -> Cuisine {
        self.cuisine
    }

    pub fn set_cuisine(&mut self, cuisine: Cuisine) {
        self.cuisine = cuisine;
    }

    pub fn diet(&self) -> Diet {
        self.diet
    }

    pub fn set_diet(&mut self, diet: Diet) {
        self.diet = diet;
    }

    pub fn servings(&self) -> u32 {
        self.servings
    }

    /// Servings are at least one
    pub fn set_servings(&mut self, servings: u32) {
        self.servings = servings.max(1);
    }

    /// Check that the active mode has what it needs
    ///
    /// # Errors
    /// - `MissingIngredients` in text mode when the ingredients are blank
    /// - `MissingImage` in image mode when no image is selected
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.mode {
            EntryMode::Text if self.ingredients.trim().is_empty() => {
                Err(ValidationError::MissingIngredients)
            }
            EntryMode::Image if self.image.is_none() => Err(ValidationError::MissingImage),
            _ => Ok(()),
        }
    }

    /// The `ingredients` text that goes into the request
    pub fn payload_ingredients(&self) -> &str {
        match self.mode {
            EntryMode::Text => &self.ingredients,
            EntryMode::Image if self.image_hint.trim().is_empty() => IMAGE_HINT_FALLBACK,
            EntryMode::Image => &self.image_hint,
        }
    }

    /// The image to encode, only in image mode
    pub fn image_to_send(&self) -> Option<&Path> {
        match self.mode {
            EntryMode::Image => self.image.as_ref().map(|i| i.path.as_path()),
            EntryMode::Text => None,
        }
    }
}

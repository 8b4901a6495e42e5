use log::debug;

use crate::model::Recipe;

/// Pages of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/recipe`
    Form,
    /// `/recipe/result`
    Result,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Form => "/recipe",
            Route::Result => "/recipe/result",
        }
    }

    /// `/` and unknown paths land on the form
    pub fn from_path(path: &str) -> Route {
        match path.trim_end_matches('/') {
            "/recipe/result" => Route::Result,
            _ => Route::Form,
        }
    }
}

/// Current page plus the state carried by the last transition
///
/// The recipe only travels with the transition into the result page; it is
/// never persisted here.
#[derive(Debug)]
pub struct Navigator {
    current: Route,
    transition: Option<Recipe>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: Route::Form,
            transition: None,
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Route {
        self.current
    }

    /// Move to the result page carrying `recipe`
    pub fn navigate_to_result(&mut self, recipe: Recipe) {
        debug!("Navigating to {} with '{}'", Route::Result.path(), recipe.title);
        self.current = Route::Result;
        self.transition = Some(recipe);
    }

    /// Load a path directly, as a bookmark or typed URL would; no state
    /// comes along
    pub fn open(&mut self, path: &str) {
        self.current = Route::from_path(path);
        self.transition = None;
    }

    /// Hand the transition state to the page being shown
    pub fn take_result(&mut self) -> Option<Recipe> {
        self.transition.take()
    }

    pub fn back_to_form(&mut self) {
        debug!("Navigating to {}", Route::Form.path());
        self.current = Route::Form;
        self.transition = None;
    }
}

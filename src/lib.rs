pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod image;
pub mod input;
pub mod model;
pub mod navigation;
pub mod orchestrator;
pub mod presenter;
pub mod store;

pub use app::{AppState, FormPage, Notice, NoticeKind, ResultPage, SubmitOutcome};
pub use crate::config::AppConfig;
pub use error::{RecipeError, ValidationError};
pub use export::{DocumentExporter, PdfExporter};
pub use input::{EntryMode, InputCollector};
pub use model::{Amount, Cuisine, Diet, Ingredient, Nutrition, Recipe, RequestPayload};
pub use navigation::{Navigator, Route};
pub use orchestrator::{HttpRecipeService, RecipeOrchestrator, RecipeService};
pub use presenter::{format_nutrition_value, RecipeView, ResultPresenter, ResultView};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

/// Build the form page for a configuration: resolves the endpoint once and
/// applies the configured form defaults
pub fn form_page_from_config(
    config: &AppConfig,
) -> Result<FormPage<HttpRecipeService>, RecipeError> {
    let service = HttpRecipeService::new(config.resolve_base_url(), config.request_timeout())?;

    let mut input = InputCollector::new();
    input.set_cuisine(config.defaults.cuisine);
    input.set_diet(config.defaults.diet);
    input.set_servings(config.defaults.servings);

    Ok(FormPage::with_input(RecipeOrchestrator::new(service), input))
}

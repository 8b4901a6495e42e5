//! The two pages of the application and the state they share.

use log::{debug, warn};
use std::sync::Arc;

use crate::error::RecipeError;
use crate::export::DocumentExporter;
use crate::input::InputCollector;
use crate::navigation::Navigator;
use crate::orchestrator::{RecipeOrchestrator, RecipeService};
use crate::presenter::{ExportOutcome, ResultPresenter, ResultView};
use crate::store::{load_dark_mode, store_dark_mode, KeyValueStore};

pub const GENERATION_FAILED: &str = "Failed to generate recipe. Please try again.";
pub const NETWORK_FAILED: &str = "Something went wrong. Check backend / network.";
pub const ALREADY_GENERATING: &str = "A recipe is already being generated. Please wait.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A message for the user; never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// What the user is told about a failed action
    pub fn for_error(err: &RecipeError) -> Self {
        match err {
            RecipeError::Validation(e) => Notice::error(e.to_string()),
            RecipeError::RequestInFlight => Notice::error(ALREADY_GENERATING),
            RecipeError::Generation(_) => Notice::error(GENERATION_FAILED),
            e if e.is_transport() => Notice::error(NETWORK_FAILED),
            e => Notice::error(e.to_string()),
        }
    }
}

/// State shared by both pages: the theme flag and the store behind it
pub struct AppState {
    store: Arc<dyn KeyValueStore>,
    dark_mode: bool,
}

impl AppState {
    /// Read the saved theme; an unreadable store falls back to light mode
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let dark_mode = match load_dark_mode(store.as_ref()).await {
            Ok(dark) => dark,
            Err(e) => {
                warn!("Could not read theme preference: {}", e);
                false
            }
        };
        Self { store, dark_mode }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Label of the theme toggle, naming the theme it switches to
    pub fn theme_toggle_label(&self) -> &'static str {
        if self.dark_mode {
            "Light"
        } else {
            "Dark"
        }
    }

    /// Flip the theme and persist it; returns the new value
    pub async fn toggle_theme(&mut self) -> Result<bool, RecipeError> {
        self.dark_mode = !self.dark_mode;
        store_dark_mode(self.store.as_ref(), self.dark_mode).await?;
        debug!("Dark mode is now {}", self.dark_mode);
        Ok(self.dark_mode)
    }
}

/// Result of pressing "Generate Recipe"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The recipe is on its way to the result page
    Navigated,
    /// Stayed on the form
    Notice(Notice),
}

/// The input page: form state plus the orchestrator it submits through
pub struct FormPage<S> {
    input: InputCollector,
    orchestrator: RecipeOrchestrator<S>,
}

impl<S: RecipeService> FormPage<S> {
    pub fn new(orchestrator: RecipeOrchestrator<S>) -> Self {
        Self::with_input(orchestrator, InputCollector::new())
    }

    pub fn with_input(orchestrator: RecipeOrchestrator<S>, input: InputCollector) -> Self {
        Self {
            input,
            orchestrator,
        }
    }

    pub fn input(&self) -> &InputCollector {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputCollector {
        &mut self.input
    }

    /// The generate button is disabled while a request is outstanding
    pub fn can_submit(&self) -> bool {
        !self.orchestrator.is_busy()
    }

    /// Submit the form; on success the navigator moves to the result page,
    /// otherwise the form and its values stay as they were
    pub async fn generate(&self, navigator: &mut Navigator) -> SubmitOutcome {
        match self.orchestrator.submit(&self.input).await {
            Ok(recipe) => {
                navigator.navigate_to_result(recipe);
                SubmitOutcome::Navigated
            }
            Err(e) => SubmitOutcome::Notice(Notice::for_error(&e)),
        }
    }
}

/// The result page, built from whatever the navigation carried
pub struct ResultPage {
    presenter: ResultPresenter,
}

impl ResultPage {
    pub fn open(navigator: &mut Navigator) -> Self {
        Self {
            presenter: ResultPresenter::new(navigator.take_result()),
        }
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn view(&self) -> ResultView {
        self.presenter.view()
    }

    pub async fn save(&self, state: &AppState) -> Notice {
        match self.presenter.save(state.store()).await {
            Ok(notice) => notice,
            Err(e) => Notice::for_error(&e),
        }
    }

    pub async fn save_and_export(
        &self,
        state: &AppState,
        exporter: &dyn DocumentExporter,
    ) -> ExportOutcome {
        match self.presenter.export_document(state.store(), exporter).await {
            Ok(outcome) => outcome,
            Err(e) => ExportOutcome {
                notice: Notice::for_error(&e),
                path: None,
            },
        }
    }

    /// "Try Again" / "Generate Another"
    pub fn back_to_form(&self, navigator: &mut Navigator) {
        navigator.back_to_form();
    }
}

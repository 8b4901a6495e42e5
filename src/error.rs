use thiserror::Error;

/// Input that fails local validation before any request is sent
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Text mode with blank ingredients
    #[error("Please enter some ingredients.")]
    MissingIngredients,

    /// Image mode without a selected image
    #[error("Please upload or capture a food image.")]
    MissingImage,
}

/// Errors that can occur while generating, saving or exporting a recipe
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Required input missing; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A submission is already waiting for the service
    #[error("A recipe request is already in flight")]
    RequestInFlight,

    /// The selected image could not be read or encoded
    #[error("Failed to encode image: {0}")]
    ImageEncoding(String),

    /// Connection refused, timeout or other transport failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status and no error body
    #[error("Service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a recipe
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The service reported that it could not generate a recipe
    #[error("Recipe generation failed: {0}")]
    Generation(String),

    /// No recipe was handed to the result page
    #[error("No recipe data found")]
    MissingRecipe,

    /// Reading or writing the preference store failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Producing the exported document failed
    #[error("Export failed: {0}")]
    Export(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl RecipeError {
    /// True for failures of the network exchange itself, as opposed to the
    /// service declining to generate a recipe
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RecipeError::Transport(_)
                | RecipeError::Status { .. }
                | RecipeError::MalformedResponse(_)
                | RecipeError::ImageEncoding(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::MissingIngredients.to_string(),
            "Please enter some ingredients."
        );
        assert_eq!(
            ValidationError::MissingImage.to_string(),
            "Please upload or capture a food image."
        );
    }

    #[test]
    fn test_validation_converts_transparently() {
        let err: RecipeError = ValidationError::MissingImage.into();
        assert_eq!(err.to_string(), "Please upload or capture a food image.");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_classification() {
        assert!(RecipeError::MalformedResponse("x".to_string()).is_transport());
        assert!(RecipeError::Status {
            status: 502,
            body: String::new()
        }
        .is_transport());
        assert!(!RecipeError::Generation("model unavailable".to_string()).is_transport());
    }
}

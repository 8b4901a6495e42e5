use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::RecipeError;
use crate::image::encode_image_file;
use crate::input::InputCollector;
use crate::model::{Recipe, RequestPayload};

pub const RECIPE_PATH: &str = "/api/recipe";

/// Remote recipe generation service
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Generate one recipe for the payload
    async fn generate(&self, payload: &RequestPayload) -> Result<Recipe, RecipeError>;
}

/// `RecipeService` over HTTP: `POST {base_url}/api/recipe`
pub struct HttpRecipeService {
    client: Client,
    base_url: String,
}

impl HttpRecipeService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RecipeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RECIPE_PATH)
    }
}

#[async_trait]
impl RecipeService for HttpRecipeService {
    async fn generate(&self, payload: &RequestPayload) -> Result<Recipe, RecipeError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Service answered {} with {} bytes", status, body.len());

        parse_response(status.as_u16(), &body)
    }
}

/// Interpret a response body
///
/// An error indicator in the body wins over the status code, since the
/// service reports generation failures as `{"error": ...}` with a 500.
pub fn parse_response(status: u16, body: &str) -> Result<Recipe, RecipeError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if (200..300).contains(&status) => {
            return Err(RecipeError::MalformedResponse(e.to_string()));
        }
        Err(_) => {
            return Err(RecipeError::Status {
                status,
                body: body.to_string(),
            });
        }
    };

    if let Some(message) = error_indicator(&value) {
        return Err(RecipeError::Generation(message));
    }

    if !(200..300).contains(&status) {
        return Err(RecipeError::Status {
            status,
            body: body.to_string(),
        });
    }

    if !value.is_object() {
        return Err(RecipeError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| RecipeError::MalformedResponse(e.to_string()))
}

/// The error message if the body flags a failed generation
fn error_indicator(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    let message = match error {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Some(match value.get("details").and_then(Value::as_str) {
        Some(details) => format!("{} ({})", message, details),
        None => message,
    })
}

/// Marks a submission as outstanding until dropped
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Turns collected input into a request and the service's answer into a
/// recipe, one submission at a time
pub struct RecipeOrchestrator<S> {
    service: S,
    in_flight: AtomicBool,
}

impl<S: RecipeService> RecipeOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Whether a submission is waiting for the service; the submit action
    /// should be disabled while this is true
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlight<'_>, RecipeError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| RecipeError::RequestInFlight)
    }

    /// Validate, encode, build the payload and ask the service
    ///
    /// # Errors
    /// - `Validation` before anything is sent
    /// - `RequestInFlight` when another submission is pending
    /// - `ImageEncoding`, `Transport`, `Status`, `MalformedResponse` for
    ///   failures of the exchange
    /// - `Generation` when the service reports it could not make a recipe
    pub async fn submit(&self, input: &InputCollector) -> Result<Recipe, RecipeError> {
        input.validate()?;
        let _guard = self.begin()?;

        let payload = build_payload(input).await?;
        debug!(
            "Submitting recipe request: ingredients={:?} cuisine={} diet={} servings={} image={}",
            payload.ingredients,
            payload.cuisine,
            payload.diet,
            payload.servings,
            payload
                .image_base64
                .as_ref()
                .map(|i| format!("{} chars", i.len()))
                .unwrap_or_else(|| "none".to_string())
        );

        match self.service.generate(&payload).await {
            Ok(recipe) => {
                info!("Received recipe '{}'", recipe.title);
                Ok(recipe)
            }
            Err(e) => {
                error!("Recipe request failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Assemble the request; the image, if any, is encoded first
pub async fn build_payload(input: &InputCollector) -> Result<RequestPayload, RecipeError> {
    let image_base64 = match input.image_to_send() {
        Some(path) => Some(encode_image_file(path).await?),
        None => None,
    };

    Ok(RequestPayload {
        ingredients: input.payload_ingredients().to_string(),
        cuisine: input.cuisine(),
        diet: input.diet(),
        servings: input.servings(),
        image_base64,
    })
}

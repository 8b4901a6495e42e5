mod pdf;

pub use pdf::{render_pdf, PdfExporter};

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::RecipeError;
use crate::presenter::RecipeView;

/// Turns a rendered recipe into a downloadable document
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    /// Short name for logs (e.g., "pdf")
    fn format_name(&self) -> &str;

    /// Write the document and return where it went
    async fn export(&self, view: &RecipeView) -> Result<PathBuf, RecipeError>;
}

/// `{title}-recipe.pdf`, with path separators and control characters in the
/// title replaced
pub fn document_file_name(title: &str) -> String {
    let title = title.trim();
    let title = if title.is_empty() { "recipe" } else { title };
    let safe: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    format!("{}-recipe.pdf", safe)
}

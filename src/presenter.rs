use log::{error, info};
use std::fmt;
use std::path::PathBuf;

use crate::app::Notice;
use crate::error::RecipeError;
use crate::export::DocumentExporter;
use crate::model::{Amount, Recipe};
use crate::store::{save_recipe, KeyValueStore};

pub const EMPTY_MESSAGE: &str = "No recipe data found.";
pub const TRY_AGAIN_LABEL: &str = "Try Again";

/// Numbers get one decimal and a gram suffix; strings were formatted by
/// the service and pass through
pub fn format_nutrition_value(value: &Amount) -> String {
    match value {
        Amount::Number(n) => format!("{:.1} g", n),
        Amount::Text(s) => s.clone(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub name: String,
    /// Quantity and unit, e.g. "1.5 cup"
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionFact {
    pub label: &'static str,
    pub value: String,
}

/// Layout unit shared by the terminal and document renderings
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Text(String),
    Blank,
}

/// Display-ready form of a recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeView {
    pub title: String,
    pub description: String,
    /// Servings and cooking time, when the service sent them
    pub summary: Option<String>,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<String>,
    pub nutrition: Vec<NutritionFact>,
}

impl RecipeView {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        let mut summary = Vec::new();
        if let Some(servings) = recipe.servings {
            summary.push(format!("Serves {}", servings));
        }
        if let Some(minutes) = recipe.estimated_time_minutes {
            summary.push(format!("About {} min", minutes));
        }

        let ingredients = recipe
            .ingredients
            .iter()
            .map(|item| {
                let quantity = item
                    .quantity
                    .as_ref()
                    .map(Amount::to_string)
                    .unwrap_or_default();
                IngredientLine {
                    name: item.name.clone(),
                    amount: format!("{} {}", quantity, item.unit).trim().to_string(),
                }
            })
            .collect();

        let nutrition = recipe
            .nutrition
            .as_ref()
            .map(|n| {
                [
                    ("Calories", n.calories.as_ref().map(|v| format!("{} kcal", v))),
                    ("Protein", n.protein.as_ref().map(format_nutrition_value)),
                    ("Carbs", n.carbs.as_ref().map(format_nutrition_value)),
                    ("Fats", n.fat.as_ref().map(format_nutrition_value)),
                ]
                .into_iter()
                .filter_map(|(label, value)| value.map(|value| NutritionFact { label, value }))
                .collect()
            })
            .unwrap_or_default();

        RecipeView {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            summary: (!summary.is_empty()).then(|| summary.join(" | ")),
            ingredients,
            steps: recipe.steps.clone(),
            nutrition,
        }
    }

    /// Sections in display order; empty sections are left out
    pub fn blocks(&self) -> Vec<Block> {
        let mut blocks = vec![Block::Title(self.title.clone())];
        if !self.description.is_empty() {
            blocks.push(Block::Text(self.description.clone()));
        }
        if let Some(summary) = &self.summary {
            blocks.push(Block::Text(summary.clone()));
        }

        if !self.ingredients.is_empty() {
            blocks.push(Block::Blank);
            blocks.push(Block::Heading("Ingredients".to_string()));
            blocks.extend(self.ingredients.iter().map(|item| {
                if item.amount.is_empty() {
                    Block::Text(format!("- {}", item.name))
                } else {
                    Block::Text(format!("- {}: {}", item.name, item.amount))
                }
            }));
        }

        if !self.steps.is_empty() {
            blocks.push(Block::Blank);
            blocks.push(Block::Heading("Steps to Cook".to_string()));
            blocks.extend(
                self.steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| Block::Text(format!("{}. {}", i + 1, step))),
            );
        }

        if !self.nutrition.is_empty() {
            blocks.push(Block::Blank);
            blocks.push(Block::Heading("Nutrition Facts (approx.)".to_string()));
            blocks.extend(
                self.nutrition
                    .iter()
                    .map(|fact| Block::Text(format!("{}: {}", fact.label, fact.value))),
            );
        }

        blocks
    }
}

impl fmt::Display for RecipeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.blocks() {
            match block {
                Block::Title(title) => {
                    writeln!(f, "{}", title)?;
                    writeln!(f, "{}", "=".repeat(title.chars().count().max(1)))?;
                }
                Block::Heading(heading) => {
                    writeln!(f, "{}", heading)?;
                    writeln!(f, "{}", "-".repeat(heading.chars().count()))?;
                }
                Block::Text(text) => writeln!(f, "{}", text)?,
                Block::Blank => writeln!(f)?,
            }
        }
        Ok(())
    }
}

/// What the result page shows
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Reached without a recipe; the only action goes back to the form
    Empty {
        message: &'static str,
        action: &'static str,
    },
    Recipe(RecipeView),
}

/// Outcome of the combined save and export action
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub notice: Notice,
    /// The written document, if the export succeeded
    pub path: Option<PathBuf>,
}

/// Shows the recipe handed over by the form page and offers save/export
#[derive(Debug, Clone, Default)]
pub struct ResultPresenter {
    recipe: Option<Recipe>,
}

impl ResultPresenter {
    pub fn new(recipe: Option<Recipe>) -> Self {
        Self { recipe }
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        self.recipe.as_ref()
    }

    pub fn view(&self) -> ResultView {
        match &self.recipe {
            Some(recipe) => ResultView::Recipe(RecipeView::from_recipe(recipe)),
            None => ResultView::Empty {
                message: EMPTY_MESSAGE,
                action: TRY_AGAIN_LABEL,
            },
        }
    }

    fn require_recipe(&self) -> Result<&Recipe, RecipeError> {
        self.recipe.as_ref().ok_or(RecipeError::MissingRecipe)
    }

    /// Append the recipe to the saved list
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<Notice, RecipeError> {
        let recipe = self.require_recipe()?;
        save_recipe(store, recipe).await?;
        info!("Saved recipe '{}'", recipe.title);
        Ok(Notice::info("Recipe Saved Successfully!"))
    }

    /// Save the recipe, then wait for the exporter to write the document
    ///
    /// A failed export still leaves the recipe saved and is reported in
    /// the returned notice rather than as an error.
    pub async fn export_document(
        &self,
        store: &dyn KeyValueStore,
        exporter: &dyn DocumentExporter,
    ) -> Result<ExportOutcome, RecipeError> {
        let recipe = self.require_recipe()?;
        save_recipe(store, recipe).await?;

        let view = RecipeView::from_recipe(recipe);
        match exporter.export(&view).await {
            Ok(path) => {
                info!(
                    "Exported '{}' as {} to {}",
                    recipe.title,
                    exporter.format_name(),
                    path.display()
                );
                Ok(ExportOutcome {
                    notice: Notice::info("Recipe Saved & PDF Exported Successfully!"),
                    path: Some(path),
                })
            }
            Err(e) => {
                error!("Export of '{}' failed: {}", recipe.title, e);
                Ok(ExportOutcome {
                    notice: Notice::error(format!("Recipe saved, but PDF export failed: {}", e)),
                    path: None,
                })
            }
        }
    }
}

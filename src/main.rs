use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use recipe_lab::store::saved_recipes;
use recipe_lab::{
    form_page_from_config, AppConfig, AppState, Cuisine, Diet, EntryMode, JsonFileStore,
    Navigator, Notice, NoticeKind, PdfExporter, RecipeView, ResultPage, ResultView,
    SubmitOutcome,
};

#[derive(Debug, Parser)]
#[command(name = "recipe-lab")]
#[command(about = "Turn your ingredients or a food photo into a recipe")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a recipe
    Generate(GenerateArgs),
    /// List saved recipes
    Saved {
        /// Print every saved recipe in full
        #[arg(long)]
        full: bool,
    },
    /// Show or toggle the dark mode preference
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeAction,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ThemeAction {
    Show,
    Toggle,
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    /// Ingredients, comma separated
    #[arg(long, conflicts_with = "image")]
    ingredients: Option<String>,
    /// Photo of the food
    #[arg(long)]
    image: Option<PathBuf>,
    /// What is in the photo (helps the model)
    #[arg(long, requires = "image")]
    hint: Option<String>,
    #[arg(long)]
    cuisine: Option<Cuisine>,
    #[arg(long)]
    diet: Option<Diet>,
    #[arg(long)]
    servings: Option<u32>,
    /// Save the recipe after generating it
    #[arg(long)]
    save: bool,
    /// Save the recipe and export it as a PDF
    #[arg(long)]
    export: bool,
    /// Directory for the exported PDF
    #[arg(long)]
    out: Option<PathBuf>,
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Info => println!("{}", notice.message),
        NoticeKind::Error => eprintln!("{}", notice.message),
    }
}

async fn generate(
    args: GenerateArgs,
    config: &AppConfig,
    state: &AppState,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut page = form_page_from_config(config)?;
    let input = page.input_mut();

    match args.image {
        Some(image) => {
            input.set_mode(EntryMode::Image);
            input.select_image(image);
            input.set_image_hint(args.hint.unwrap_or_default());
        }
        None => input.set_ingredients(args.ingredients.unwrap_or_default()),
    }
    if let Some(cuisine) = args.cuisine {
        input.set_cuisine(cuisine);
    }
    if let Some(diet) = args.diet {
        input.set_diet(diet);
    }
    if let Some(servings) = args.servings {
        input.set_servings(servings);
    }

    info!("Using recipe service at {}", config.resolve_base_url());
    println!("Cooking your recipe...");

    let mut navigator = Navigator::new();
    if let SubmitOutcome::Notice(notice) = page.generate(&mut navigator).await {
        print_notice(&notice);
        return Ok(false);
    }

    let result = ResultPage::open(&mut navigator);
    match result.view() {
        ResultView::Recipe(view) => println!("\n{}", view),
        ResultView::Empty { message, .. } => {
            eprintln!("{}", message);
            return Ok(false);
        }
    }

    if args.export {
        let output_dir = args.out.unwrap_or_else(|| config.export.output_dir.clone());
        let outcome = result
            .save_and_export(state, &PdfExporter::new(output_dir))
            .await;
        print_notice(&outcome.notice);
        if let Some(path) = outcome.path {
            println!("{}", path.display());
        }
        Ok(outcome.notice.kind == NoticeKind::Info)
    } else if args.save {
        let notice = result.save(state).await;
        print_notice(&notice);
        Ok(notice.kind == NoticeKind::Info)
    } else {
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = CliArgs::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let store = Arc::new(JsonFileStore::new(&config.storage.path));
    let mut state = AppState::load(store).await;

    let ok = match args.command {
        Command::Generate(generate_args) => generate(generate_args, &config, &state).await?,
        Command::Saved { full } => {
            let recipes = saved_recipes(state.store()).await?;
            if recipes.is_empty() {
                println!("No saved recipes yet.");
            }
            for (i, recipe) in recipes.iter().enumerate() {
                if full {
                    println!("{}", RecipeView::from_recipe(recipe));
                } else {
                    println!("{:>3}. {}", i + 1, recipe.title);
                }
            }
            true
        }
        Command::Theme { action } => {
            if let ThemeAction::Toggle = action {
                state.toggle_theme().await?;
            }
            println!(
                "{} mode",
                if state.dark_mode() { "Dark" } else { "Light" }
            );
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;

use crate::error::RecipeError;
use crate::model::Recipe;

pub const DARK_MODE_KEY: &str = "recipe_dark_mode";
pub const SAVED_RECIPES_KEY: &str = "saved_recipes";
/// Older releases saved exported recipes under this key
pub const LEGACY_SAVED_RECIPES_KEY: &str = "savedRecipes";

/// String-keyed, string-valued preference storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RecipeError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RecipeError>;
    async fn remove(&self, key: &str) -> Result<(), RecipeError>;
}

/// Store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, RecipeError> {
        self.entries
            .lock()
            .map_err(|_| RecipeError::Storage("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RecipeError> {
        Ok(self.entries()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RecipeError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), RecipeError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Store kept as one JSON object in a file
///
/// Every write reads the whole file and writes it back; concurrent writers
/// race and the last one wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, RecipeError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                RecipeError::Storage(format!("{} is not a valid store: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(RecipeError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), RecipeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                RecipeError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, bytes).await.map_err(|e| {
            RecipeError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RecipeError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RecipeError> {
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), RecipeError> {
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }
}

/// Read the dark mode flag; anything but `"true"` is light mode
pub async fn load_dark_mode(store: &dyn KeyValueStore) -> Result<bool, RecipeError> {
    Ok(store.get(DARK_MODE_KEY).await?.as_deref() == Some("true"))
}

pub async fn store_dark_mode(store: &dyn KeyValueStore, dark: bool) -> Result<(), RecipeError> {
    store
        .set(DARK_MODE_KEY, if dark { "true" } else { "false" })
        .await
}

async fn read_recipe_list(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Vec<Recipe>>, RecipeError> {
    match store.get(key).await? {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

/// All saved recipes, oldest first
///
/// Recipes found under the legacy key are moved after the canonical entries
/// and the legacy key is removed.
pub async fn saved_recipes(store: &dyn KeyValueStore) -> Result<Vec<Recipe>, RecipeError> {
    let mut recipes = read_recipe_list(store, SAVED_RECIPES_KEY)
        .await?
        .unwrap_or_default();

    if let Some(legacy) = read_recipe_list(store, LEGACY_SAVED_RECIPES_KEY).await? {
        info!(
            "Migrating {} saved recipe(s) from '{}' to '{}'",
            legacy.len(),
            LEGACY_SAVED_RECIPES_KEY,
            SAVED_RECIPES_KEY
        );
        recipes.extend(legacy);
        store
            .set(SAVED_RECIPES_KEY, &serde_json::to_string(&recipes)?)
            .await?;
        store.remove(LEGACY_SAVED_RECIPES_KEY).await?;
    }

    Ok(recipes)
}

/// Append a copy of `recipe` to the saved list; no dedupe, no limit
pub async fn save_recipe(store: &dyn KeyValueStore, recipe: &Recipe) -> Result<usize, RecipeError> {
    let mut recipes = saved_recipes(store).await?;
    recipes.push(recipe.clone());
    store
        .set(SAVED_RECIPES_KEY, &serde_json::to_string(&recipes)?)
        .await?;
    debug!("Saved '{}' ({} saved recipes)", recipe.title, recipes.len());
    Ok(recipes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Ingredient, Nutrition};

    fn sample_recipe(title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            description: "Quick and easy".to_string(),
            servings: Some(2),
            estimated_time_minutes: None,
            ingredients: vec![Ingredient {
                name: "rice".to_string(),
                quantity: Some(Amount::Number(1.5)),
                unit: "cup".to_string(),
            }],
            steps: vec!["Boil".to_string(), "Serve".to_string()],
            nutrition: Some(Nutrition {
                calories: Some(Amount::Number(320.0)),
                protein: Some(Amount::Text("N/A".to_string())),
                carbs: None,
                fat: Some(Amount::Number(4.25)),
            }),
        }
    }

    #[tokio::test]
    async fn test_dark_mode_round_trip() {
        let store = MemoryStore::new();
        assert!(!load_dark_mode(&store).await.unwrap());

        store_dark_mode(&store, true).await.unwrap();
        assert_eq!(
            store.get(DARK_MODE_KEY).await.unwrap().as_deref(),
            Some("true")
        );
        assert!(load_dark_mode(&store).await.unwrap());

        store_dark_mode(&store, false).await.unwrap();
        assert!(!load_dark_mode(&store).await.unwrap());
    }

    #[tokio::test]
    async fn test_unexpected_dark_mode_value_is_light() {
        let store = MemoryStore::new();
        store.set(DARK_MODE_KEY, "yes").await.unwrap();
        assert!(!load_dark_mode(&store).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_then_read_back() {
        let store = MemoryStore::new();
        let first = sample_recipe("First");
        let second = sample_recipe("Second");

        assert_eq!(save_recipe(&store, &first).await.unwrap(), 1);
        assert_eq!(save_recipe(&store, &second).await.unwrap(), 2);
        // Saving again appends a duplicate
        assert_eq!(save_recipe(&store, &second).await.unwrap(), 3);

        let saved = saved_recipes(&store).await.unwrap();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[0], first);
        assert_eq!(saved.last().unwrap(), &second);
    }

    #[tokio::test]
    async fn test_legacy_key_is_migrated() {
        let store = MemoryStore::new();
        let current = sample_recipe("Current");
        let legacy = sample_recipe("Legacy");
        store
            .set(SAVED_RECIPES_KEY, &serde_json::to_string(&vec![&current]).unwrap())
            .await
            .unwrap();
        store
            .set(
                LEGACY_SAVED_RECIPES_KEY,
                &serde_json::to_string(&vec![&legacy]).unwrap(),
            )
            .await
            .unwrap();

        let saved = saved_recipes(&store).await.unwrap();
        assert_eq!(saved, vec![current, legacy]);
        assert!(store.get(LEGACY_SAVED_RECIPES_KEY).await.unwrap().is_none());

        // Migration happens once
        assert_eq!(saved_recipes(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_list_is_an_error() {
        let store = MemoryStore::new();
        store.set(SAVED_RECIPES_KEY, "{not json").await.unwrap();
        assert!(matches!(
            saved_recipes(&store).await,
            Err(RecipeError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::new(&path);
        assert!(store.get("missing").await.unwrap().is_none());

        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.remove("a").await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert!(reopened.get("a").await.unwrap().is_none());
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_json_file_store_saved_recipes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        let recipe = sample_recipe("Kept");

        save_recipe(&store, &recipe).await.unwrap();

        let reopened = JsonFileStore::new(store.path());
        let saved = saved_recipes(&reopened).await.unwrap();
        assert_eq!(saved.last().unwrap(), &recipe);
    }

    #[tokio::test]
    async fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("x").await,
            Err(RecipeError::Storage(_))
        ));
    }
}

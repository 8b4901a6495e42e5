use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Cuisine options offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cuisine {
    #[default]
    Any,
    Indian,
    Italian,
    Chinese,
    Mexican,
    Continental,
}

impl Cuisine {
    pub const ALL: [Cuisine; 6] = [
        Cuisine::Any,
        Cuisine::Indian,
        Cuisine::Italian,
        Cuisine::Chinese,
        Cuisine::Mexican,
        Cuisine::Continental,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cuisine::Any => "Any",
            Cuisine::Indian => "Indian",
            Cuisine::Italian => "Italian",
            Cuisine::Chinese => "Chinese",
            Cuisine::Mexican => "Mexican",
            Cuisine::Continental => "Continental",
        }
    }
}

/// Diet options offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Diet {
    #[default]
    Any,
    Vegetarian,
    Vegan,
    #[serde(rename = "Non-Veg")]
    NonVeg,
    #[serde(rename = "High Protein")]
    HighProtein,
    #[serde(rename = "Low Carb")]
    LowCarb,
}

impl Diet {
    pub const ALL: [Diet; 6] = [
        Diet::Any,
        Diet::Vegetarian,
        Diet::Vegan,
        Diet::NonVeg,
        Diet::HighProtein,
        Diet::LowCarb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Any => "Any",
            Diet::Vegetarian => "Vegetarian",
            Diet::Vegan => "Vegan",
            Diet::NonVeg => "Non-Veg",
            Diet::HighProtein => "High Protein",
            Diet::LowCarb => "Low Carb",
        }
    }
}

/// Lowercase and drop separators so "High Protein", "high-protein" and
/// "high_protein" all compare equal
fn option_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Cuisine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = option_key(s);
        Cuisine::ALL
            .into_iter()
            .find(|c| option_key(c.as_str()) == key)
            .ok_or_else(|| {
                let names: Vec<&str> = Cuisine::ALL.iter().map(|c| c.as_str()).collect();
                format!("Unknown cuisine '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

impl FromStr for Diet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = option_key(s);
        Diet::ALL
            .into_iter()
            .find(|d| option_key(d.as_str()) == key)
            .ok_or_else(|| {
                let names: Vec<&str> = Diet::ALL.iter().map(|d| d.as_str()).collect();
                format!("Unknown diet '{}'. Expected one of: {}", s, names.join(", "))
            })
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/recipe`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub ingredients: String,
    pub cuisine: Cuisine,
    pub diet: Diet,
    pub servings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
}

/// A number or a string the service already formatted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Amount::Number(n)
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A whole number sent as a number or as text such as "20" or "20 min";
/// anything else is dropped instead of failing the recipe
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.round() as u64)
        }),
        Some(Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    };
    Ok(count.and_then(|n| u32::try_from(n).ok()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Amount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
}

/// Nutrition facts; the generation prompt asks for per-serving values with
/// `_g` suffixed keys, so those are accepted too
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<Amount>,
    #[serde(default, alias = "protein_g", skip_serializing_if = "Option::is_none")]
    pub protein: Option<Amount>,
    #[serde(default, alias = "carbs_g", skip_serializing_if = "Option::is_none")]
    pub carbs: Option<Amount>,
    #[serde(default, alias = "fat_g", skip_serializing_if = "Option::is_none")]
    pub fat: Option<Amount>,
}

/// A generated recipe as returned by the service
///
/// Missing or `null` sections decode as empty so a partial answer still
/// renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub servings: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_time_minutes: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<String>,
    #[serde(
        default,
        alias = "nutrition_per_serving",
        skip_serializing_if = "Option::is_none"
    )]
    pub nutrition: Option<Nutrition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_option_names_on_the_wire() {
        assert_eq!(serde_json::to_value(Diet::NonVeg).unwrap(), json!("Non-Veg"));
        assert_eq!(
            serde_json::to_value(Diet::HighProtein).unwrap(),
            json!("High Protein")
        );
        assert_eq!(
            serde_json::to_value(Cuisine::Continental).unwrap(),
            json!("Continental")
        );
    }

    #[test]
    fn test_parse_options_leniently() {
        assert_eq!("high-protein".parse::<Diet>().unwrap(), Diet::HighProtein);
        assert_eq!("Non-Veg".parse::<Diet>().unwrap(), Diet::NonVeg);
        assert_eq!("low_carb".parse::<Diet>().unwrap(), Diet::LowCarb);
        assert_eq!("indian".parse::<Cuisine>().unwrap(), Cuisine::Indian);

        let err = "Klingon".parse::<Cuisine>().unwrap_err();
        assert!(err.contains("Unknown cuisine"));
        assert!(err.contains("Continental"));
    }

    #[test]
    fn test_payload_without_image_omits_field() {
        let payload = RequestPayload {
            ingredients: "rice, dal".to_string(),
            cuisine: Cuisine::Indian,
            diet: Diet::Vegetarian,
            servings: 3,
            image_base64: None,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "ingredients": "rice, dal",
                "cuisine": "Indian",
                "diet": "Vegetarian",
                "servings": 3
            })
        );
    }

    #[test]
    fn test_payload_with_image_uses_camel_case() {
        let payload = RequestPayload {
            ingredients: "plate of food".to_string(),
            cuisine: Cuisine::Any,
            diet: Diet::Any,
            servings: 2,
            image_base64: Some("data:image/png;base64,AAAA".to_string()),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["imageBase64"], json!("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::Number(2.0).to_string(), "2");
        assert_eq!(Amount::Number(0.5).to_string(), "0.5");
        assert_eq!(Amount::Text("a pinch".to_string()).to_string(), "a pinch");
    }

    #[test]
    fn test_recipe_with_missing_sections() {
        let recipe: Recipe = serde_json::from_value(json!({"title": "Toast"})).unwrap();
        assert_eq!(recipe.title, "Toast");
        assert!(recipe.description.is_empty());
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.steps.is_empty());
        assert!(recipe.nutrition.is_none());
    }

    #[test]
    fn test_recipe_in_generator_prompt_shape() {
        let recipe: Recipe = serde_json::from_value(json!({
            "title": "Dal Rice",
            "servings": 3,
            "estimated_time_minutes": 35,
            "ingredients": [
                {"name": "rice", "quantity": 1.5, "unit": "cup"},
                {"name": "salt", "quantity": "to taste", "unit": ""}
            ],
            "steps": ["Rinse the rice", "Cook the dal"],
            "nutrition_per_serving": {
                "calories": 420,
                "protein_g": 14.2,
                "carbs_g": 70,
                "fat_g": "6 g"
            }
        }))
        .unwrap();

        assert_eq!(recipe.servings, Some(3));
        assert_eq!(recipe.estimated_time_minutes, Some(35));
        assert_eq!(recipe.ingredients[0].quantity, Some(Amount::Number(1.5)));
        assert_eq!(
            recipe.ingredients[1].quantity,
            Some(Amount::Text("to taste".to_string()))
        );

        let nutrition = recipe.nutrition.unwrap();
        assert_eq!(nutrition.protein, Some(Amount::Number(14.2)));
        assert_eq!(nutrition.carbs, Some(Amount::Number(70.0)));
        assert_eq!(nutrition.fat, Some(Amount::Text("6 g".to_string())));
    }

    #[test]
    fn test_null_sections_decode_as_empty() {
        let recipe: Recipe = serde_json::from_value(json!({
            "title": "Scrambled Eggs",
            "description": null,
            "ingredients": [{"name": "eggs", "quantity": 2, "unit": null}],
            "steps": null,
            "nutrition": null
        }))
        .unwrap();

        assert!(recipe.description.is_empty());
        assert_eq!(recipe.ingredients[0].unit, "");
        assert!(recipe.steps.is_empty());
        assert!(recipe.nutrition.is_none());
    }

    #[test]
    fn test_counts_are_read_leniently() {
        let recipe: Recipe = serde_json::from_value(json!({
            "title": "Soup",
            "servings": "4",
            "estimated_time_minutes": "20 min"
        }))
        .unwrap();
        assert_eq!(recipe.servings, Some(4));
        assert_eq!(recipe.estimated_time_minutes, Some(20));

        let recipe: Recipe = serde_json::from_value(json!({
            "title": "Soup",
            "servings": 2.0,
            "estimated_time_minutes": "a while"
        }))
        .unwrap();
        assert_eq!(recipe.servings, Some(2));
        assert_eq!(recipe.estimated_time_minutes, None);

        let recipe: Recipe = serde_json::from_value(json!({
            "title": "Soup",
            "servings": -3,
            "estimated_time_minutes": true
        }))
        .unwrap();
        assert_eq!(recipe.servings, None);
        assert_eq!(recipe.estimated_time_minutes, None);
    }
}

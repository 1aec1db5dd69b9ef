//! Product and ingredient-analysis models.
//! 商品与配料分析模型。

mod recommendation;

pub use recommendation::{worst_classification, IngredientRecommendation, SafetyClassification};

use serde::{Deserialize, Serialize};

use crate::ids::Barcode;

/// Structured product information returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub barcode: Option<Barcode>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub images: Vec<ImageRef>,
}

impl Product {
    /// Total number of ingredient entries, nested sub-ingredients included.
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.iter().map(Ingredient::count).sum()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown product")
    }
}

/// One entry of a product's ingredient list.
///
/// Labels such as `chocolate (sugar, cocoa butter)` nest their components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub vegan: Option<bool>,
    #[serde(default)]
    pub vegetarian: Option<bool>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vegan: None,
            vegetarian: None,
            ingredients: Vec::new(),
        }
    }

    fn count(&self) -> usize {
        1 + self.ingredients.iter().map(Ingredient::count).sum::<usize>()
    }
}

/// Reference to a product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// Publicly reachable image URL.
    Url { url: String },
    /// Image stored by the backend, addressed by its storage key.
    Stored { key: String },
}

/// Result of the barcode lookup: product details plus, once the backend has
/// matched the ingredients against the user's preferences, the per-ingredient
/// verdicts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub product: Product,
    pub recommendations: Option<Vec<IngredientRecommendation>>,
}

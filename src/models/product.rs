use serde::{Deserialize, Serialize};

/// Skin type classification produced by the vision analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
    Normal,
}

/// Skin concerns a product can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinConcern {
    Acne,
    Wrinkles,
    DarkSpots,
    Redness,
    Dullness,
    LargePores,
    Dehydration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    FaceCream,
    HandCream,
}

/// A catalog product. Loaded once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: f64,
    pub suitable_skin_types: Vec<SkinType>,
    pub targets_concerns: Vec<SkinConcern>,
    pub key_ingredients: Vec<String>,
    pub benefits: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

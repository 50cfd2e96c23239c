use crate::models::{Product, ProductCategory, SkinAnalysis, SkinConcern, SkinType};

/// The static, in-memory product catalog.
///
/// Built once at startup and shared read-only across requests. Products keep
/// their insertion order; filtering preserves it.
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The built-in product line
    pub fn builtin() -> Self {
        Self::new(builtin_products())
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Returns the face creams applicable to the analyzed skin.
    ///
    /// A product qualifies when its category is recommendable, its suitable
    /// skin types contain the analyzed type, and it targets at least one of
    /// the analyzed concerns.
    pub fn filter(&self, analysis: &SkinAnalysis) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| {
                p.category == ProductCategory::FaceCream
                    && p.suitable_skin_types.contains(&analysis.skin_type)
                    && p.targets_concerns
                        .iter()
                        .any(|c| analysis.concerns.contains(c))
            })
            .collect()
    }
}

fn product(
    id: &str,
    name: &str,
    description: &str,
    category: ProductCategory,
    price: f64,
    suitable_skin_types: &[SkinType],
    targets_concerns: &[SkinConcern],
    key_ingredients: &[&str],
    benefits: &[&str],
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        price,
        suitable_skin_types: suitable_skin_types.to_vec(),
        targets_concerns: targets_concerns.to_vec(),
        key_ingredients: key_ingredients.iter().map(|s| s.to_string()).collect(),
        benefits: benefits.iter().map(|s| s.to_string()).collect(),
        image_url: None,
    }
}

fn builtin_products() -> Vec<Product> {
    use ProductCategory::{FaceCream, HandCream};
    use SkinConcern::*;
    use SkinType::*;

    vec![
        product(
            "prod_001",
            "HydraGlow Intensive Moisturizer",
            "Deep hydration face cream with hyaluronic acid and ceramides",
            FaceCream,
            45.99,
            &[Dry, Normal, Sensitive],
            &[Dehydration, Wrinkles, Dullness],
            &["Hyaluronic Acid", "Ceramides", "Vitamin E"],
            &[
                "24-hour hydration",
                "Reduces fine lines",
                "Strengthens skin barrier",
            ],
        ),
        product(
            "prod_002",
            "ClearBalance Oil Control Cream",
            "Lightweight mattifying cream for oily and acne-prone skin",
            FaceCream,
            38.99,
            &[Oily, Combination],
            &[Acne, LargePores, Redness],
            &["Salicylic Acid", "Niacinamide", "Tea Tree Extract"],
            &["Controls excess oil", "Minimizes pores", "Prevents breakouts"],
        ),
        product(
            "prod_003",
            "AgeLess Retinol Night Cream",
            "Anti-aging night cream with retinol and peptides",
            FaceCream,
            62.99,
            &[Normal, Dry, Combination],
            &[Wrinkles, DarkSpots, Dullness],
            &["Retinol", "Peptides", "Vitamin C"],
            &[
                "Reduces wrinkles",
                "Evens skin tone",
                "Boosts collagen production",
            ],
        ),
        product(
            "prod_004",
            "SensiCalm Soothing Cream",
            "Gentle cream for sensitive and reactive skin",
            FaceCream,
            42.99,
            &[Sensitive, Dry],
            &[Redness, Dehydration],
            &["Centella Asiatica", "Allantoin", "Colloidal Oatmeal"],
            &[
                "Calms irritation",
                "Reduces redness",
                "Strengthens sensitive skin",
            ],
        ),
        product(
            "prod_005",
            "BrightGlow Vitamin C Cream",
            "Brightening cream with stable vitamin C",
            FaceCream,
            48.99,
            &[Normal, Combination, Dry],
            &[DarkSpots, Dullness],
            &["Vitamin C", "Kojic Acid", "Alpha Arbutin"],
            &[
                "Brightens complexion",
                "Fades dark spots",
                "Antioxidant protection",
            ],
        ),
        product(
            "prod_006",
            "SilkTouch Luxury Hand Cream",
            "Rich hand cream with shea butter and glycerin",
            HandCream,
            22.99,
            &[Dry, Normal],
            &[Dehydration],
            &["Shea Butter", "Glycerin", "Vitamin E"],
            &["Intense moisture", "Non-greasy formula", "Quick absorption"],
        ),
    ]
}

pub mod analytics;
pub mod product;
pub mod recommendation;

pub use analytics::{AnalyticsResponse, DailyCount, ProductStats};
pub use product::{Product, ProductCategory, SkinConcern, SkinType};
pub use recommendation::{
    AgeCategory, MatchBreakdown, ProductRecommendation, RecommendationResponse, RoutineAdvice,
    SkinAnalysis,
};

pub mod analytics;
pub mod llm;
pub mod providers;
pub mod recommendation;
pub mod staging;

pub use llm::LlmService;
pub use recommendation::RecommendationService;
pub use staging::ImageStager;

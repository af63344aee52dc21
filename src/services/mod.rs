pub mod ai_service;
pub mod anthropic; // Anthropic Messages API
pub mod openrouter; // OpenRouter AI service
pub mod nutrition_parser;
pub mod estimator;

pub use ai_service::AIService;
pub use anthropic::AnthropicService;
pub use openrouter::OpenRouterService;
pub use estimator::CalorieEstimator;

//! Gemini `generateContent` integration used for AI recipes.

mod client;
mod error;
mod types;

pub use client::{GeminiClient, RECIPE_TEMPERATURE};
pub use error::{ApiError, ApiErrorResponse, GeminiError};
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    PromptFeedback,
};

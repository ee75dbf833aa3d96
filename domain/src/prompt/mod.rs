//! Prompt domain
//!
//! Templates for the prompts sent at each stage of a consultation.

mod template;

pub use template::PromptTemplate;

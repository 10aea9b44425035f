//! Resume / job-description analysis: term extraction, matching, scoring and
//! suggestions.

pub mod handlers;
pub mod matcher;
pub mod models;
pub mod pipeline;
pub mod scorer;
pub mod suggestions;
pub mod terms;
pub mod vocabulary;

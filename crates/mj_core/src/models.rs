use async_trait::async_trait;
use std::fmt;

use crate::Result;

/// A generative text service reached with a single prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send one prompt and return the raw text of the first candidate.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

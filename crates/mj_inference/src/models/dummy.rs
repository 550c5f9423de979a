use async_trait::async_trait;
use mj_core::{Error, Result, TextGenerator};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Config;

enum Reply {
    /// Wrap the first prompt line in the fragment the newspaper expects.
    Echo,
    Fixed(String),
    Fail(String),
}

/// Offline generator for development and tests.
pub struct DummyModel {
    reply: Reply,
    calls: AtomicUsize,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel")
            .field("calls", &self.calls.load(Ordering::Relaxed))
            .finish()
    }
}

impl DummyModel {
    pub async fn new(_config: Option<Config>) -> Result<Self> {
        Ok(Self::with_reply(Reply::Echo))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn responding(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fixed(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextGenerator for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &self.reply {
            Reply::Echo => {
                let headline = prompt.lines().next().unwrap_or_default();
                Ok(format!("<div class=\"ai-newspaper\"><p>{}</p></div>", headline))
            }
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(Error::Inference(message.clone())),
        }
    }
}

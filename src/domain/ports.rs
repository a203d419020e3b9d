use crate::domain::range::CellRange;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Row-major cell values of the input tab.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn read_values(&self) -> Result<Vec<Vec<String>>>;
}

/// One update call per invocation; no transaction spans calls.
#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn write_range(&self, range: &CellRange, values: Vec<Vec<String>>) -> Result<()>;
}

/// Decides how many lookups run together and what happens between batches.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    fn batch_size(&self) -> usize;

    /// Called after `completed_batch` (1-based) when another batch follows.
    async fn pause(&self, completed_batch: usize);
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A single exclusive browser session.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Types `text` into the input named `field_name` and presses Enter.
    async fn submit_text(&mut self, field_name: &str, text: &str) -> Result<()>;

    async fn click(&mut self, element_id: &str) -> Result<()>;

    async fn wait_for_class(&mut self, class_name: &str, timeout: Duration) -> Result<()>;

    /// Text of every `li` inside elements carrying `class_name`, in document order.
    async fn list_item_texts(&mut self, class_name: &str) -> Result<Vec<String>>;

    async fn close(&mut self) -> Result<()>;
}

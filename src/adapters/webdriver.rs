use crate::config::EcoregionConfig;
use crate::domain::ports::{BrowserLauncher, BrowserSession};
use crate::utils::error::{EnrichError, Result};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;

/// WebDriver Enter key.
const ENTER: char = '\u{E007}';

/// Starts a fresh Chrome session through a running WebDriver server
/// (chromedriver, selenium) for each lookup.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverLauncher {
    pub fn new(config: &EcoregionConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
        }
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let args: Vec<&str> = if self.headless {
            vec!["--headless=new", "--disable-gpu"]
        } else {
            Vec::new()
        };

        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );
        caps
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let mut builder = ClientBuilder::rustls();
        builder.capabilities(self.capabilities());

        let client = builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| EnrichError::browser(format!("failed to start session: {e}")))?;

        tracing::debug!("🌐 Browser session started via {}", self.webdriver_url);
        Ok(Box::new(WebDriverSession { client }))
    }
}

pub struct WebDriverSession {
    client: Client,
}

fn cmd_error(e: CmdError) -> EnrichError {
    EnrichError::browser(e.to_string())
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(cmd_error)
    }

    async fn submit_text(&mut self, field_name: &str, text: &str) -> Result<()> {
        let selector = format!("[name='{field_name}']");
        let field = self
            .client
            .find(Locator::Css(&selector))
            .await
            .map_err(cmd_error)?;
        field
            .send_keys(&format!("{text}{ENTER}"))
            .await
            .map_err(cmd_error)
    }

    async fn click(&mut self, element_id: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Id(element_id))
            .await
            .map_err(cmd_error)?;
        element.click().await.map_err(cmd_error)?;
        Ok(())
    }

    async fn wait_for_class(&mut self, class_name: &str, timeout: Duration) -> Result<()> {
        let selector = format!(".{class_name}");
        let waited = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(&selector))
            .await;

        match waited {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(EnrichError::TimeoutError {
                what: selector,
                timeout_ms: timeout.as_millis() as u64,
            }),
            Err(e) => Err(cmd_error(e)),
        }
    }

    async fn list_item_texts(&mut self, class_name: &str) -> Result<Vec<String>> {
        let selector = format!(".{class_name} li");
        let elements = self
            .client
            .find_all(Locator::Css(&selector))
            .await
            .map_err(cmd_error)?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(element.text().await.map_err(cmd_error)?);
        }
        Ok(texts)
    }

    async fn close(&mut self) -> Result<()> {
        self.client.clone().close().await.map_err(cmd_error)
    }
}

use crate::config::EcoregionConfig;
use crate::domain::model::{Ecoregions, Lookup};
use crate::domain::ports::{BrowserLauncher, BrowserSession};
use crate::utils::error::Result;
use std::sync::Arc;

/// Classifies an address by driving the ecoregion locator page.
/// Every lookup gets its own browser session, closed before returning.
pub struct EcoregionLookup {
    launcher: Arc<dyn BrowserLauncher>,
    config: EcoregionConfig,
}

impl EcoregionLookup {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: EcoregionConfig) -> Self {
        Self { launcher, config }
    }

    pub async fn lookup(&self, address: &str) -> Lookup<Ecoregions> {
        if address.trim().is_empty() {
            return Lookup::Skipped;
        }

        let mut session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("⚠️ Could not open browser session for \"{}\": {}", address, e);
                return Lookup::Failed(e.to_string());
            }
        };

        let outcome = self.query(session.as_mut(), address).await;

        // 無論成功與否都要關閉瀏覽器
        if let Err(e) = session.close().await {
            tracing::warn!("⚠️ Failed to close browser session: {}", e);
        }

        match outcome {
            Ok(regions) if regions.is_empty() => Lookup::NotFound,
            Ok(regions) => Lookup::Resolved(regions),
            Err(e) => {
                tracing::warn!("⚠️ Ecoregion lookup failed for \"{}\": {}", address, e);
                Lookup::Failed(e.to_string())
            }
        }
    }

    async fn query(&self, session: &mut dyn BrowserSession, address: &str) -> Result<Ecoregions> {
        session.goto(&self.config.locator_url).await?;
        session.submit_text(&self.config.input_name, address).await?;
        tokio::time::sleep(self.config.settle_delay()).await;
        session.click(&self.config.map_id).await?;
        session
            .wait_for_class(&self.config.results_class, self.config.wait_timeout())
            .await?;

        let items = session.list_item_texts(&self.config.results_class).await?;
        // 第一個項目是標題
        Ok(items.into_iter().skip(1).collect())
    }
}

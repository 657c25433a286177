use crate::{config::ScrapingConfig, orchestrator::ScrapeOrchestrator, requests::RequestClient};

pub struct ScrapingContext {
    pub scraping_config: ScrapingConfig,
    pub request_client: RequestClient,
}

impl ScrapingContext {
    pub fn new() -> anyhow::Result<Self> {
        let scraping_config = ScrapingConfig::new()?;
        Self::from_config(scraping_config)
    }

    pub fn from_config(scraping_config: ScrapingConfig) -> anyhow::Result<Self> {
        let request_client = RequestClient::new(&scraping_config)?;
        Ok(ScrapingContext {
            scraping_config,
            request_client,
        })
    }

    pub fn orchestrator(&self) -> ScrapeOrchestrator<'_, RequestClient> {
        ScrapeOrchestrator::new(&self.request_client, &self.scraping_config)
    }
}

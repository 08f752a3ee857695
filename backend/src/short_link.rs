use std::future::Future;

use reqwest::Client;

use crate::error::UpstreamError;

/// Follows a shortened map link to the URL it redirects to.
pub trait LinkExpander: Send + Sync {
    fn expand(&self, url: &str) -> impl Future<Output = Result<String, UpstreamError>> + Send;
}

/// Expands links with a plain GET; `reqwest` follows the redirect chain.
#[derive(Clone)]
pub struct HttpLinkExpander {
    client: Client,
}

impl HttpLinkExpander {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl LinkExpander for HttpLinkExpander {
    async fn expand(&self, url: &str) -> Result<String, UpstreamError> {
        let response = self.client.get(url).send().await?;
        Ok(response.url().to_string())
    }
}

//! LiveSplit status proxy — forwards the local LiveSplit HTTP status
//! endpoint to the dashboard; any failure reports `{"connected": false}`.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

const STATUS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct LiveSplitProxy {
    client: reqwest::Client,
    url: String,
}

impl LiveSplitProxy {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Current LiveSplit status, or the disconnected marker. Never fails;
    /// LiveSplit not running is the normal case outside practice sessions.
    pub async fn status(&self) -> Value {
        match self.fetch().await {
            Ok(status) => status,
            Err(err) => {
                debug!("livesplit status unavailable: {err}");
                json!({ "connected": false })
            }
        }
    }

    async fn fetch(&self) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.url)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await?
            .json::<Value>()
            .await
    }
}

use ledger_core::{PeerChain, PeerClient, PeerError};
use std::time::Duration;

/// Fetches `GET http://{peer}/chain` with a per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpPeerClient {
    http: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, address: &str) -> Result<PeerChain, PeerError> {
        let url = format!("http://{address}/chain");
        let res = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                PeerError::Timeout(address.to_string())
            } else {
                PeerError::Unreachable(address.to_string(), e.to_string())
            }
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(PeerError::BadStatus(address.to_string(), status.as_u16()));
        }

        res.json::<PeerChain>().await.map_err(|e| {
            if e.is_timeout() {
                PeerError::Timeout(address.to_string())
            } else {
                PeerError::Malformed(address.to_string(), e.to_string())
            }
        })
    }
}

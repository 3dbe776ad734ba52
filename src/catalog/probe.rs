use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

/// Result of checking whether an image location currently resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Unverified,
}

impl Verification {
    pub fn is_verified(self) -> bool {
        self == Verification::Verified
    }
}

/// Capability to check a candidate URL without transferring its body.
pub trait ExistenceProbe: Send + Sync {
    fn probe(&self, url: &Url) -> Verification;
}

/// `HEAD` for http(s), path existence for `file://`, unverified for anything else.
pub struct DefaultProbe {
    client: Client,
}

impl DefaultProbe {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ExistenceProbe for DefaultProbe {
    fn probe(&self, url: &Url) -> Verification {
        let found = match url.scheme() {
            "http" | "https" => match self.client.head(url.as_str()).send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        debug!("Probe {} returned {}", url, response.status());
                    }
                    response.status().is_success()
                }
                Err(e) => {
                    debug!("Probe {} failed: {}", url, e);
                    false
                }
            },
            "file" => url.to_file_path().map(|p| p.is_file()).unwrap_or(false),
            _ => false,
        };

        if found {
            Verification::Verified
        } else {
            Verification::Unverified
        }
    }
}

/// Used when probing is turned off.
pub struct DisabledProbe;

impl ExistenceProbe for DisabledProbe {
    fn probe(&self, _url: &Url) -> Verification {
        Verification::Unverified
    }
}

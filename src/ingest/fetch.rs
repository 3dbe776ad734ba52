use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::LoadError;

/// Reads a dataset from an `http(s)://` or `file://` location.
///
/// Any transport failure or non-success status is fatal for the load.
pub fn fetch_text(client: &Client, url: &Url, what: &'static str) -> Result<String, LoadError> {
    debug!("Fetching {} from {}", what, url);

    match url.scheme() {
        "http" | "https" => {
            let response = client
                .get(url.as_str())
                .send()
                .map_err(|source| LoadError::Fetch {
                    what,
                    url: url.to_string(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status { what, status });
            }

            response.text().map_err(|source| LoadError::Fetch {
                what,
                url: url.to_string(),
                source,
            })
        }
        "file" => {
            let path = url.to_file_path().map_err(|_| LoadError::UnsupportedScheme {
                what,
                url: url.to_string(),
            })?;
            // Lossy, matching how HTTP bodies are decoded.
            let bytes = std::fs::read(&path).map_err(|source| LoadError::Read {
                what,
                path,
                source,
            })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Err(LoadError::UnsupportedScheme {
            what,
            url: url.to_string(),
        }),
    }
}

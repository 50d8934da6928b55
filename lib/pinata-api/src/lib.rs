use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error as ThisError;

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("pinata api returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Client for Pinata's pinning API, authenticated with the
/// `pinata_api_key`/`pinata_secret_api_key` header pair.
#[derive(Debug, Clone)]
pub struct Pinata {
    client: reqwest::Client,
    api_url: String,
    gateway_url: String,
    api_key: String,
    secret_api_key: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct PinResult {
    pub ipfs_hash: String,
    pub pin_size: Option<u64>,
    pub timestamp: Option<String>,
}

impl Pinata {
    pub fn new(client: reqwest::Client, api_key: String, secret_api_key: String) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_owned(),
            gateway_url: DEFAULT_GATEWAY_URL.to_owned(),
            api_key,
            secret_api_key,
        }
    }

    pub fn with_gateway(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = gateway_url.into();
        self
    }

    /// Public gateway URL for a pinned CID.
    pub fn gateway_url(&self, ipfs_hash: &str) -> String {
        format!("{}/ipfs/{}", self.gateway_url.trim_end_matches('/'), ipfs_hash)
    }

    /// Pin a file. One attempt, no retry; errors carry Pinata's response body.
    pub async fn pin_file(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<PinResult, Error> {
        tracing::debug!("pinning file {:?} ({} bytes)", file_name, bytes.len());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .multipart(form)
            .send()
            .await?;
        Self::parse(resp).await
    }

    /// Pin a JSON document, posted as the pin content itself.
    pub async fn pin_json<T: serde::Serialize>(&self, content: &T) -> Result<PinResult, Error> {
        let resp = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .json(content)
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn parse(resp: reqwest::Response) -> Result<PinResult, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }
        Ok(resp.json::<PinResult>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pin_result() {
        let json = r#"{
            "IpfsHash": "QmYwAPJzv5CZsnAzt8auVZRn1pfejgLAvDvTbEqDSKvlSA",
            "PinSize": 12345,
            "Timestamp": "2024-01-01T00:00:00.000Z"
        }"#;
        let result: PinResult = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.ipfs_hash,
            "QmYwAPJzv5CZsnAzt8auVZRn1pfejgLAvDvTbEqDSKvlSA"
        );
        assert_eq!(result.pin_size, Some(12345));
    }

    #[test]
    fn test_gateway_url() {
        let pinata = Pinata::new(reqwest::Client::new(), "k".into(), "s".into());
        assert_eq!(
            pinata.gateway_url("QmHash"),
            "https://gateway.pinata.cloud/ipfs/QmHash"
        );
        let pinata = pinata.with_gateway("https://my.gateway/");
        assert_eq!(pinata.gateway_url("QmHash"), "https://my.gateway/ipfs/QmHash");
    }
}

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::FetchError;
use crate::schema::DivisionId;

/// Supplies the raw JSON document for one division.
pub trait DivisionSource {
    fn fetch(&self, division_id: DivisionId) -> Result<Value, FetchError>;
}

/// Fetches division documents from the votes API over one reused connection pool.
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn division_url(&self, division_id: DivisionId) -> String {
        format!(
            "{}/division/{division_id}.json",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl DivisionSource for HttpSource {
    fn fetch(&self, division_id: DivisionId) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(self.division_url(division_id))
            .send()
            .map_err(|err| FetchError::Transport {
                division_id,
                message: err.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(division_id));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                division_id,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().map_err(|err| FetchError::Body {
            division_id,
            message: err.to_string(),
        })
    }
}

//! Calculation-service adapter.
//!
//! Submits one model variant per request and hands back the raw per-element
//! response. The service is a black box; errors carry no more structure than
//! callers need to log them, and a sweep degrades the failing combination
//! instead of aborting.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::model::NetworkModel;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("failed to encode model: {0}")]
    Encode(serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("calculation rejected: HTTP {0}")]
    Status(StatusCode),

    #[error("malformed calculation response: {0}")]
    Decode(serde_json::Error),
}

pub struct CalcClient {
    client: reqwest::Client,
    calc_url: String,
}

impl CalcClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            calc_url: format!("{}/api/v1/general/tkzf/calc", base_url.trim_end_matches('/')),
        }
    }

    /// Submits one model variant and returns the raw per-element response.
    ///
    /// The service sometimes double-encodes the payload (a JSON string
    /// containing JSON); one extra layer is unwrapped here.
    pub async fn calculate(&self, model: &NetworkModel) -> Result<Value, CalcError> {
        let body = serde_json::to_string(model).map_err(CalcError::Encode)?;
        let part = Part::text(body)
            .file_name("model.json")
            .mime_str("application/json")?;
        let form = Form::new().part("upload_file", part);

        let resp = self.client.post(&self.calc_url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CalcError::Status(status));
        }

        let text = resp.text().await?;
        let mut value: Value = serde_json::from_str(&text).map_err(CalcError::Decode)?;
        if let Value::String(inner) = value {
            debug!("unwrapping double-encoded calculation response");
            value = serde_json::from_str(&inner).map_err(CalcError::Decode)?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_model() -> NetworkModel {
        serde_json::from_value(json!({
            "elements": {
                "b1": {
                    "Type": "breaker",
                    "Name": "Feeder A",
                    "states": [{"AisClosed": true, "BisClosed": true, "CisClosed": true}]
                }
            }
        }))
        .unwrap()
    }

    fn calc_client(uri: &str) -> CalcClient {
        CalcClient::new(reqwest::Client::new(), uri)
    }

    #[tokio::test]
    async fn uploads_model_as_multipart_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/general/tkzf/calc"))
            .and(body_string_contains("upload_file"))
            .and(body_string_contains(r#""Name":"Feeder A""#))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"b1": {"I": [[3.0, 4.0]]}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resp = calc_client(&server.uri()).calculate(&sample_model()).await.unwrap();
        assert_eq!(resp["b1"]["I"][0][0], json!(3.0));
    }

    #[tokio::test]
    async fn unwraps_double_encoded_response() {
        let server = MockServer::start().await;
        let inner = json!({"b1": {"I": [[3.0, 4.0]]}}).to_string();
        Mock::given(method("POST"))
            .and(path("/api/v1/general/tkzf/calc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(inner)))
            .mount(&server)
            .await;

        let resp = calc_client(&server.uri()).calculate(&sample_model()).await.unwrap();
        assert_eq!(resp["b1"]["I"][0][1], json!(4.0));
    }

    #[tokio::test]
    async fn error_status_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/general/tkzf/calc"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = calc_client(&server.uri()).calculate(&sample_model()).await.unwrap_err();
        assert!(matches!(err, CalcError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
    }

    #[tokio::test]
    async fn unparseable_body_maps_to_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/general/tkzf/calc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = calc_client(&server.uri()).calculate(&sample_model()).await.unwrap_err();
        assert!(matches!(err, CalcError::Decode(_)));
    }
}

//! The outbound half of the gateway: serializing a tensor into the remote
//! service's JSON `infer` payload, POSTing it, and decoding the scores that
//! come back

use crate::classes::ClassIndex;
use crate::config::{TENSOR_DATATYPE, TENSOR_NAME};
use crate::tensor::ImageTensor;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// One named input tensor on the wire
#[derive(Debug, Serialize)]
pub struct TensorInput {
    pub name: String,
    pub shape: Vec<usize>,
    pub datatype: String,
    pub data: Vec<f32>,
}

/// The request body: a single-element `inputs` array
#[derive(Debug, Serialize)]
pub struct InferenceRequest {
    pub inputs: Vec<TensorInput>,
}

impl InferenceRequest {
    pub fn from_tensor(tensor: &ImageTensor) -> Self {
        InferenceRequest {
            inputs: vec![TensorInput {
                name: TENSOR_NAME.into(),
                shape: ImageTensor::shape().to_vec(),
                datatype: TENSOR_DATATYPE.into(),
                data: tensor.data().to_vec(),
            }],
        }
    }
}

/// One named output tensor; only `data` is consulted
#[derive(Debug, Deserialize)]
pub struct TensorOutput {
    #[serde(default)]
    pub name: String,
    pub data: Vec<f32>,
}

/// The response body: an `outputs` array, first element wins
#[derive(Debug, Deserialize)]
pub struct InferenceResponse {
    pub outputs: Vec<TensorOutput>,
}

/// How the outbound call can fail. No retries in any case
#[derive(Debug)]
pub enum PredictError {
    /// The deadline elapsed before the service answered
    Timeout,

    /// Connection-level failure or an unparseable body
    Transport(reqwest::Error),

    /// The service answered with a non-200 status
    BadStatus(u16),
}

impl std::fmt::Display for PredictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictError::Timeout => write!(f, "inference request timed out"),
            PredictError::Transport(err) => write!(f, "inference transport failure: {err}"),
            PredictError::BadStatus(code) => {
                write!(f, "inference request failed with status code {code}")
            }
        }
    }
}

impl std::error::Error for PredictError {}

impl From<reqwest::Error> for PredictError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PredictError::Timeout
        } else {
            PredictError::Transport(err)
        }
    }
}

/// HTTP client for one fixed inference endpoint
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: String,
}

impl InferenceClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(InferenceClient { http, endpoint })
    }

    /// POST the tensor to the endpoint and decode the response body.
    ///
    /// A non-200 status is logged and reported as [`PredictError::BadStatus`];
    /// there is no retry and no distinction between 4xx and 5xx.
    pub async fn predict(&self, tensor: &ImageTensor) -> Result<InferenceResponse, PredictError> {
        let body = InferenceRequest::from_tensor(tensor);
        let response = self.http.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if status.as_u16() != 200 {
            warn!("inference request failed with status code {status}");
            return Err(PredictError::BadStatus(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Pick the label of the highest-scoring class in the response's first output.
/// Ties go to the lowest index
pub fn decode_label(response: &InferenceResponse, classes: &ClassIndex) -> Result<String> {
    let output = response
        .outputs
        .first()
        .ok_or_else(|| anyhow!("inference response carried no outputs"))?;

    let (max_index, _) = output
        .data
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((i, score)),
        })
        .ok_or_else(|| anyhow!("inference response output was empty"))?;

    classes
        .label(max_index)
        .map(|label| label.to_string())
        .ok_or_else(|| anyhow!("class id {max_index} not present in the class index"))
}

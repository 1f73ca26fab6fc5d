//! Per-model adapters over the shared REST client.
//!
//! Each remote model expects a slightly different submission body; the
//! status contract is the same for all of them. [`HttpJobBackend`] pairs an
//! [`InferenceApi`] with a [`ModelKind`] that decides the body shape.

use std::str::FromStr;

use async_trait::async_trait;
use genbatch_core::job::JobRequest;
use serde_json::{json, Map, Value};

use crate::api::{InferenceApi, InferenceError};
use crate::backend::JobBackend;
use crate::messages::StatusReport;

// ---------------------------------------------------------------------------
// ModelKind
// ---------------------------------------------------------------------------

/// Image-edit models: several source images in, still images out.
pub const KIND_IMAGE_EDIT: &str = "image_edit";
/// Video models: a first-frame image (plus optional references) in, a clip out.
pub const KIND_VIDEO: &str = "video";

/// Family of remote model, selecting the submission body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    ImageEdit,
    Video,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::ImageEdit => KIND_IMAGE_EDIT,
            ModelKind::Video => KIND_VIDEO,
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            KIND_IMAGE_EDIT => Ok(ModelKind::ImageEdit),
            KIND_VIDEO => Ok(ModelKind::Video),
            other => Err(format!(
                "Invalid model kind '{other}'. Must be one of: {KIND_IMAGE_EDIT}, {KIND_VIDEO}"
            )),
        }
    }
}

/// Build the submission body for `request` under the given model.
pub fn build_submit_body(kind: ModelKind, model: &str, request: &JobRequest) -> Value {
    let mut body = Map::new();
    body.insert("model".into(), json!(model));
    body.insert("prompt".into(), json!(request.prompt));

    match kind {
        ModelKind::ImageEdit => {
            body.insert("images".into(), json!(request.inputs));
            body.insert("size".into(), json!(request.shape.resolution));
        }
        ModelKind::Video => {
            // Inputs are never empty: JobRequest::new rejects that.
            if let Some((first, rest)) = request.inputs.split_first() {
                body.insert("image".into(), json!(first));
                if !rest.is_empty() {
                    body.insert("reference_images".into(), json!(rest));
                }
            }
            body.insert("resolution".into(), json!(request.shape.resolution));
            if let Some(duration) = request.shape.duration_secs {
                body.insert("duration".into(), json!(duration));
            }
        }
    }

    if let Some(ratio) = &request.shape.aspect_ratio {
        body.insert("aspect_ratio".into(), json!(ratio));
    }

    Value::Object(body)
}

// ---------------------------------------------------------------------------
// HttpJobBackend
// ---------------------------------------------------------------------------

/// Connection settings for one generation backend.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_url: String,
    pub api_key: String,
    /// Remote model identifier sent in every submission.
    pub model: String,
    pub kind: ModelKind,
}

/// [`JobBackend`] over the generation service's REST API.
pub struct HttpJobBackend {
    api: InferenceApi,
    model: String,
    kind: ModelKind,
}

impl HttpJobBackend {
    pub fn new(api: InferenceApi, model: String, kind: ModelKind) -> Self {
        Self { api, model, kind }
    }

    /// Build a backend with its own HTTP client from explicit settings.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let api = InferenceApi::new(config.api_url.clone(), config.api_key.clone())?;
        Ok(Self::new(api, config.model.clone(), config.kind))
    }
}

#[async_trait]
impl JobBackend for HttpJobBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn submit(&self, request: &JobRequest) -> Result<String, InferenceError> {
        let body = build_submit_body(self.kind, &self.model, request);
        self.api.submit_job(&body).await
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusReport, InferenceError> {
        let raw = self.api.job_status(job_id).await?;
        Ok(StatusReport::from(raw))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! HTTP implementation of the control plane client

use std::time::Duration;

use actstream_models::{
    ApiErrorBody, DescribeDbClustersRequest, DescribeDbClustersResponse,
    StartActivityStreamRequest, StartActivityStreamResponse, StopActivityStreamRequest,
    StopActivityStreamResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::control_plane::{routes, ControlPlane, ControlPlaneError};

/// Control plane client speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpControlPlane {
    http: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpControlPlane {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ControlPlaneError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ControlPlaneError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<Req, Resp>(&self, route: &str, body: &Req) -> Result<Resp, ControlPlaneError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, route);
        tracing::debug!(%url, "Calling control plane");

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ControlPlaneError::Transport(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Resp>()
                .await
                .map_err(|e| ControlPlaneError::InvalidResponse(e.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ControlPlaneError::Transport(format!("Failed to read error body: {}", e)))?;

        let body = serde_json::from_slice::<ApiErrorBody>(&bytes).unwrap_or_else(|_| ApiErrorBody {
            code: "Unknown".to_string(),
            message: String::from_utf8_lossy(&bytes).into_owned(),
        });

        tracing::debug!(status = status.as_u16(), code = %body.code, "Control plane rejected request");
        Err(ControlPlaneError::from_api_body(status.as_u16(), body))
    }
}

#[async_trait]
impl ControlPlane for HttpControlPlane {
    async fn start_activity_stream(
        &self,
        request: StartActivityStreamRequest,
    ) -> Result<StartActivityStreamResponse, ControlPlaneError> {
        self.post(routes::START_ACTIVITY_STREAM, &request).await
    }

    async fn stop_activity_stream(
        &self,
        request: StopActivityStreamRequest,
    ) -> Result<StopActivityStreamResponse, ControlPlaneError> {
        self.post(routes::STOP_ACTIVITY_STREAM, &request).await
    }

    async fn describe_db_clusters(
        &self,
        request: DescribeDbClustersRequest,
    ) -> Result<DescribeDbClustersResponse, ControlPlaneError> {
        self.post(routes::DESCRIBE_DB_CLUSTERS, &request).await
    }
}

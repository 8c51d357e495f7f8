//! QPS Envelopes
//!
//! Generic `ServiceRequest` / `ServiceResponse` wrappers used by the QPS REST
//! endpoints (`/qps/rest/...`), plus a helper that walks their pagination.
//! Record schemas are left to the caller.

use crate::api::pagination::{Page, Paginator};
use crate::client::{ApiClient, RequestContext};
use crate::error::{ApiError, Result};
use bytes::Bytes;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// `responseCode` of a successful QPS call
pub const RESPONSE_SUCCESS: &str = "SUCCESS";

/// Top-level QPS request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QpsRequest {
    #[serde(rename = "ServiceRequest")]
    pub service_request: ServiceRequest,
}

/// Body of a QPS request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,

    /// Endpoint-specific payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Paging preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "startFromId", skip_serializing_if = "Option::is_none")]
    pub start_from_id: Option<String>,

    #[serde(rename = "limitResults", skip_serializing_if = "Option::is_none")]
    pub limit_results: Option<String>,
}

/// Search filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(rename = "Criteria")]
    pub criteria: Vec<Criteria>,
}

/// One filter criterion, e.g. `address EQUALS 10.0.0.1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl Criteria {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// `field EQUALS value`
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, "EQUALS", value)
    }
}

impl QpsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter criterion
    pub fn criterion(mut self, criteria: Criteria) -> Self {
        self.service_request
            .filters
            .get_or_insert_with(Filters::default)
            .criteria
            .push(criteria);
        self
    }

    /// Set the endpoint-specific `data` payload
    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.service_request.data = Some(data);
        self
    }

    /// Set paging preferences
    pub fn page(mut self, start_from_id: impl Into<String>, limit_results: u32) -> Self {
        self.service_request.preferences = Some(Preferences {
            start_from_id: Some(start_from_id.into()),
            limit_results: Some(limit_results.to_string()),
        });
        self
    }

    /// Serialize to the JSON body the QPS endpoints expect
    pub fn to_body(&self) -> Result<Bytes> {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .map_err(|e| ApiError::InvalidArgument(format!("cannot serialize QPS request: {}", e)))
    }
}

/// Top-level QPS response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QpsResponse<T> {
    #[serde(rename = "ServiceResponse")]
    pub service_response: ServiceResponse<T>,
}

/// Body of a QPS response; `T` is the shape of `data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(rename = "responseCode")]
    pub response_code: String,

    #[serde(rename = "responseErrorDetails", default, skip_serializing_if = "Option::is_none")]
    pub response_error_details: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    #[serde(
        rename = "hasMoreRecords",
        default,
        deserialize_with = "lenient_bool"
    )]
    pub has_more_records: bool,

    #[serde(
        rename = "lastId",
        default,
        deserialize_with = "lenient_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn is_success(&self) -> bool {
        self.response_code == RESPONSE_SUCCESS
    }
}

impl<T> Page for QpsResponse<Vec<T>> {
    type Item = T;

    /// QPS continues from `lastId + 1` while `hasMoreRecords` is true
    fn next_cursor(&self) -> Option<String> {
        let response = &self.service_response;
        if !response.has_more_records {
            return None;
        }
        match response.last_id {
            Some(last_id) => Some(last_id.saturating_add(1).to_string()),
            None => {
                tracing::warn!("hasMoreRecords set without lastId, stopping pagination");
                None
            }
        }
    }

    fn into_items(self) -> Vec<T> {
        self.service_response.data.unwrap_or_default()
    }
}

/// POST a QPS search repeatedly, following `lastId`, and collect every record
///
/// The client must be configured for JSON responses. A non-`SUCCESS`
/// `responseCode` on any page aborts the walk.
pub async fn search_all<T: DeserializeOwned>(
    client: &ApiClient,
    ctx: &RequestContext,
    path: &str,
    request: &QpsRequest,
    limit_results: u32,
) -> Result<Vec<T>> {
    Paginator::new("0")
        .collect(|page| {
            let body = request.clone().page(page.cursor, limit_results).to_body();
            async move {
                let response: QpsResponse<Vec<T>> = client.post(ctx, path, Some(body?)).await?;
                if !response.service_response.is_success() {
                    let details = response
                        .service_response
                        .response_error_details
                        .as_ref()
                        .map(|d| d.to_string())
                        .unwrap_or_default();
                    return Err(ApiError::Service {
                        response_code: response.service_response.response_code,
                        details,
                    });
                }
                Ok(response)
            }
        })
        .await
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    match Option::<Id>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Id::Number(n)) => Ok(Some(n)),
        Some(Id::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Id::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

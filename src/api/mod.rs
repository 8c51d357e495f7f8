//! API Module
//!
//! Helpers for the Qualys endpoint families: QPS envelopes, pagination and
//! query strings.

pub mod pagination;
pub mod qps;
pub mod query;

pub use pagination::{Page, PageRequest, Paginator};
pub use qps::{
    search_all, Criteria, Filters, Preferences, QpsRequest, QpsResponse, ServiceRequest,
    ServiceResponse,
};
pub use query::QueryParams;

//! Content Types
//!
//! The two wire formats the client speaks and how response bodies are decoded.

use crate::error::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MIME_JSON: &str = "application/json";
const MIME_XML: &str = "application/xml";

/// Supported request/response body formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`
    Json,

    /// `application/xml`
    Xml,
}

impl ContentType {
    /// MIME string sent in `Content-Type` and `Accept` headers
    pub fn as_mime(&self) -> &'static str {
        match self {
            ContentType::Json => MIME_JSON,
            ContentType::Xml => MIME_XML,
        }
    }

    /// Decode a response body into `R` according to this format
    pub fn decode<R: DeserializeOwned>(&self, body: &[u8]) -> Result<R> {
        match self {
            ContentType::Json => serde_json::from_slice(body).map_err(|e| ApiError::Decode {
                content_type: *self,
                message: e.to_string(),
            }),
            ContentType::Xml => quick_xml::de::from_reader(body).map_err(|e| ApiError::Decode {
                content_type: *self,
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

impl FromStr for ContentType {
    type Err = ApiError;

    /// Accepts the full MIME string (parameters such as `charset` are ignored)
    /// or the short names `json` / `xml`.
    fn from_str(s: &str) -> Result<Self> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            MIME_JSON | "json" => Ok(ContentType::Json),
            MIME_XML | "xml" | "text/xml" => Ok(ContentType::Xml),
            _ => Err(ApiError::UnsupportedContentType(s.to_string())),
        }
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_mime())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Scan {
        #[serde(rename = "REF")]
        reference: String,
        #[serde(rename = "TITLE")]
        title: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct ScanList {
        #[serde(rename = "SCAN", default)]
        scans: Vec<Scan>,
    }

    #[test]
    fn test_mime_strings() {
        assert_eq!(ContentType::Json.as_mime(), "application/json");
        assert_eq!(ContentType::Xml.to_string(), "application/xml");
    }

    #[test]
    fn test_parse_content_type() {
        assert_eq!("application/json".parse::<ContentType>().unwrap(), ContentType::Json);
        assert_eq!(
            "application/xml; charset=UTF-8".parse::<ContentType>().unwrap(),
            ContentType::Xml
        );
        assert_eq!("XML".parse::<ContentType>().unwrap(), ContentType::Xml);

        let err = "text/csv".parse::<ContentType>().unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedContentType(ref s) if s == "text/csv"));
    }

    #[test]
    fn test_decode_json() {
        let value: serde_json::Value = ContentType::Json.decode(br#"{"count": 3}"#).unwrap();
        assert_eq!(value["count"], 3);
    }

    #[test]
    fn test_decode_xml() {
        let body = br#"<?xml version="1.0" encoding="UTF-8"?>
            <SCAN_LIST>
                <SCAN><REF>scan/1</REF><TITLE>Weekly</TITLE></SCAN>
                <SCAN><REF>scan/2</REF><TITLE>Adhoc</TITLE></SCAN>
            </SCAN_LIST>"#;

        let list: ScanList = ContentType::Xml.decode(body).unwrap();
        assert_eq!(list.scans.len(), 2);
        assert_eq!(list.scans[1].reference, "scan/2");
        assert_eq!(list.scans[0].title, "Weekly");
    }

    #[test]
    fn test_decode_failure_reports_format() {
        let err = ContentType::Json
            .decode::<serde_json::Value>(b"<not json>")
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Decode {
                content_type: ContentType::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_serde_as_mime_string() {
        let json = serde_json::to_string(&ContentType::Xml).unwrap();
        assert_eq!(json, "\"application/xml\"");

        let parsed: ContentType = serde_json::from_str("\"application/json\"").unwrap();
        assert_eq!(parsed, ContentType::Json);
        assert!(serde_json::from_str::<ContentType>("\"text/plain\"").is_err());
    }
}

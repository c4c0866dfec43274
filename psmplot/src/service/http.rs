//! A [`SpectrumService`] backed by a running scoring engine's HTTP API.
//!
//! | operation          | request                           |
//! |--------------------|-----------------------------------|
//! | `fetch_spectrum`   | `GET /spectrum/{scan}?deisotope=&max_peaks=` |
//! | `fetch_candidates` | `POST /spectrum/{scan}`           |
//! | `fetch_alignment`  | `POST /spectrum/{scan}/peptide`   |
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{AlignmentRequest, SearchConfig, ServiceError, SpectrumQuery, SpectrumService};
use crate::alignment::AlignmentRecord;
use crate::candidate::Candidate;
use crate::spectrum::Spectrum;

/// The scoring engine's message when a scan number is unknown
const MISSING_SCAN_MESSAGE: &str = "Cannot find scan id";

#[derive(Debug, Clone)]
pub struct HttpSpectrumService {
    client: Client,
    base_url: Url,
}

impl HttpSpectrumService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let client = Client::builder().gzip(true).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ServiceError> {
        let invalid = |reason: String| ServiceError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !base_url.scheme().starts_with("http") {
            return Err(invalid("only http(s) services are supported".into()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, scan_id: usize, suffix: Option<&str>) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ServiceError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be used as a base".into(),
            })?;
            segments.pop_if_empty().push("spectrum").push(&scan_id.to_string());
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    fn decode<T: DeserializeOwned>(scan_id: usize, response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        let body = response.text()?;
        decode_body(scan_id, status, &body)
    }
}

/// Interpret a response body, turning failed requests into the matching [`ServiceError`]
fn decode_body<T: DeserializeOwned>(
    scan_id: usize,
    status: StatusCode,
    body: &str,
) -> Result<T, ServiceError> {
    if !status.is_success() {
        if body.contains(MISSING_SCAN_MESSAGE) {
            return Err(ServiceError::ScanNotFound(scan_id));
        }
        return Err(ServiceError::Status {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

impl SpectrumService for HttpSpectrumService {
    #[instrument(level = "debug", skip(self))]
    fn fetch_spectrum(
        &self,
        scan_id: usize,
        query: &SpectrumQuery,
    ) -> Result<Spectrum, ServiceError> {
        let url = self.endpoint(scan_id, None)?;
        debug!("GET {url}");
        let response = self.client.get(url).query(query).send()?;
        Self::decode(scan_id, response)
    }

    #[instrument(level = "debug", skip(self))]
    fn fetch_candidates(
        &self,
        scan_id: usize,
        config: &SearchConfig,
    ) -> Result<Vec<Candidate>, ServiceError> {
        let url = self.endpoint(scan_id, None)?;
        debug!("POST {url}");
        let response = self.client.post(url).json(config).send()?;
        Self::decode(scan_id, response)
    }

    #[instrument(level = "debug", skip(self, request), fields(sequence = request.sequence.as_str()))]
    fn fetch_alignment(
        &self,
        scan_id: usize,
        request: &AlignmentRequest,
    ) -> Result<Vec<AlignmentRecord>, ServiceError> {
        let url = self.endpoint(scan_id, Some("peptide"))?;
        debug!("POST {url}");
        let response = self.client.post(url).json(request).send()?;
        Self::decode(scan_id, response)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_endpoints() -> Result<(), ServiceError> {
        let service = HttpSpectrumService::new("http://localhost:3000")?;
        assert_eq!(
            service.endpoint(30091, None)?.as_str(),
            "http://localhost:3000/spectrum/30091"
        );

        let service = HttpSpectrumService::new("http://example.org/engine/")?;
        assert_eq!(service.base_url().path(), "/engine/");
        assert_eq!(
            service.endpoint(7, Some("peptide"))?.as_str(),
            "http://example.org/engine/spectrum/7/peptide"
        );
        Ok(())
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            HttpSpectrumService::new("not a url"),
            Err(ServiceError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpSpectrumService::new("file:///tmp/spectra"),
            Err(ServiceError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_decode_failures() {
        let missing = decode_body::<Spectrum>(5, StatusCode::BAD_REQUEST, "Cannot find scan id");
        assert!(matches!(missing, Err(ServiceError::ScanNotFound(5))));

        let not_ms2 = decode_body::<Spectrum>(5, StatusCode::BAD_REQUEST, "Not an MS2 scan");
        assert!(matches!(
            not_ms2,
            Err(ServiceError::Status { status: 400, ref message }) if message == "Not an MS2 scan"
        ));

        let unavailable =
            decode_body::<Vec<Candidate>>(5, StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(
            unavailable,
            Err(ServiceError::Status { status: 503, .. })
        ));

        let truncated = decode_body::<Spectrum>(1, StatusCode::OK, r#"{"scan_id": 1}"#);
        assert!(matches!(truncated, Err(ServiceError::Malformed(_))));
    }

    #[test]
    fn test_decode_success() -> Result<(), ServiceError> {
        let candidates: Vec<Candidate> = decode_body(5, StatusCode::OK, "[]")?;
        assert!(candidates.is_empty());
        Ok(())
    }
}

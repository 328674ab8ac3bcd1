//! Construction of host HTTP responses from canned responses.

use super::mock_response::MockResponse;
use crate::error::MockError;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::http::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};
use std::convert::Infallible;
use tracing::warn;

/// Turns a `MockResponse` into whatever response type the host HTTP stack expects.
pub trait ResponseFactory {
    type Output;

    fn create(&self, response: &MockResponse) -> Result<Self::Output, MockError>;
}

/// Builds `hyper` responses. A response without a status code answers `200 OK`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperResponseFactory;

impl HyperResponseFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build_full(&self, response: &MockResponse) -> Result<Response<Full<Bytes>>, MockError> {
        let status = match response.code() {
            Some(code) => {
                StatusCode::from_u16(code).map_err(|_| MockError::InvalidStatusCode(code))?
            }
            None => StatusCode::OK,
        };

        let payload = response
            .body()
            .map(|body| Bytes::from(body.to_owned()))
            .unwrap_or_default();

        let mut built = Response::new(Full::new(payload));
        *built.status_mut() = status;

        for (name, value) in response.headers() {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    built.headers_mut().insert(name, value);
                }
                _ => warn!("Skipping invalid mock response header '{}'", name),
            }
        }

        Ok(built)
    }

    pub fn build_boxed(
        &self,
        response: &MockResponse,
    ) -> Result<Response<BoxBody<Bytes, hyper::Error>>, MockError> {
        let full = self.build_full(response)?;
        Ok(full.map(|body| BoxBody::new(body.map_err(|never: Infallible| match never {}))))
    }
}

impl ResponseFactory for HyperResponseFactory {
    type Output = Response<Full<Bytes>>;

    fn create(&self, response: &MockResponse) -> Result<Self::Output, MockError> {
        self.build_full(response)
    }
}

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::error::AppError;
use crate::http::transport::DirectRequest;

/// Parse and validate a request URL. No scheme guessing: what the user typed
/// is what gets sent.
pub fn parse_url(raw: &str) -> Result<Url, AppError> {
    Url::parse(raw.trim()).map_err(|source| AppError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

pub fn build_headers(request: &DirectRequest) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    if let Some(map) = &request.headers {
        for (key, value) in map {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| AppError::InvalidHeader(key.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| AppError::InvalidHeader(key.clone()))?;
            headers.insert(name, value);
        }
    }

    // A JSON body without an explicit content type is labelled as JSON.
    if let Some(body) = &request.body {
        if !headers.contains_key(CONTENT_TYPE) && serde_json::from_str::<Value>(body).is_ok() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
            );
        }
    }
    Ok(headers)
}

pub fn build_request(client: &Client, request: &DirectRequest) -> Result<RequestBuilder, AppError> {
    let url = parse_url(&request.url)?;
    let mut builder = client
        .request(request.method.into(), url)
        .headers(build_headers(request)?);

    if let Some(params) = &request.parameters {
        builder = builder.query(params);
    }
    if let Some(body) = &request.body {
        builder = builder.body(body.clone());
    }
    Ok(builder)
}

//! Replayable request descriptions
//!
//! A request that fails with 401 may be sent again after a token refresh, so
//! its parameters are kept as owned data rather than a consumed
//! `reqwest::RequestBuilder`.

use super::error::ClientError;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Request body kinds the client knows how to replay
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<MultipartField>),
}

/// One field of a multipart form
#[derive(Debug, Clone)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        data: Bytes,
    },
}

impl MultipartField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self::File {
            name: name.into(),
            file_name: file_name.into(),
            mime,
            data: data.into(),
        }
    }
}

/// A single API call: target, headers, body and handling flags
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Resolve with JSON `null` instead of parsing the response body
    pub skip_json_parse: bool,
    /// Send without a bearer credential and never refresh on 401
    pub skip_auth: bool,
    /// Leave `Content-Type` unset, e.g. for multipart uploads
    pub skip_content_type: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            skip_json_parse: false,
            skip_auth: false,
            skip_content_type: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body; also skips the JSON content type
    pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self.skip_content_type = true;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub const fn skip_json_parse(mut self) -> Self {
        self.skip_json_parse = true;
        self
    }

    pub const fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub const fn skip_content_type(mut self) -> Self {
        self.skip_content_type = true;
        self
    }

    /// Path with exactly one leading slash
    pub fn normalized_path(&self) -> String {
        if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        }
    }

    /// Build a fresh multipart form from the stored fields
    pub(crate) fn build_form(fields: &[MultipartField]) -> Result<Form, ClientError> {
        fields.iter().try_fold(Form::new(), |form, field| {
            Ok(match field {
                MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
                MultipartField::File {
                    name,
                    file_name,
                    mime,
                    data,
                } => {
                    let length = data.len() as u64;
                    let mut part = Part::stream_with_length(data.clone(), length)
                        .file_name(file_name.clone());
                    if let Some(mime) = mime {
                        part = part.mime_str(mime)?;
                    }
                    form.part(name.clone(), part)
                }
            })
        })
    }
}

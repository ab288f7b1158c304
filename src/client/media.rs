use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;

use super::{ClientError, PublerClient, Query, RequestOptions, Result};

const MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("webm", "video/webm"),
    ("pdf", "application/pdf"),
];

const FALLBACK_MIME: &str = "application/octet-stream";

/// MIME type for a file, judged by its extension (case-insensitive).
pub fn mime_for_path(path: impl AsRef<Path>) -> &'static str {
    let Some(extension) = path.as_ref().extension().and_then(|e| e.to_str()) else {
        return FALLBACK_MIME;
    };
    let extension = extension.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME)
}

/// A file to upload to the media library.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub in_library: Option<bool>,
    pub direct_upload: Option<bool>,
}

impl MediaUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            in_library: None,
            direct_upload: None,
        }
    }

    /// Read `path` into memory, naming the upload after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(bytes, file_name))
    }

    pub fn in_library(mut self, value: Option<bool>) -> Self {
        self.in_library = value;
        self
    }

    pub fn direct_upload(mut self, value: Option<bool>) -> Self {
        self.direct_upload = value;
        self
    }

    fn into_form(self) -> Result<Form> {
        let mime = mime_for_path(&self.file_name);
        let part = Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(mime)?;

        let mut form = Form::new().part("file", part);
        if let Some(in_library) = self.in_library {
            form = form.text("in_library", in_library.to_string());
        }
        if let Some(direct_upload) = self.direct_upload {
            form = form.text("direct_upload", direct_upload.to_string());
        }
        Ok(form)
    }
}

/// Filters for [`PublerClient::list_media`].
#[derive(Debug, Clone, Default)]
pub struct ListMediaParams {
    pub page: Option<u32>,
    pub types: Vec<String>,
    pub ids: Vec<String>,
    pub search: Option<String>,
}

impl ListMediaParams {
    fn to_query(&self) -> Query {
        let non_empty = |items: &Vec<String>| (!items.is_empty()).then(|| items.clone());
        Query::new()
            .with_opt("page", self.page)
            .with_opt("types", non_empty(&self.types))
            .with_opt("ids", non_empty(&self.ids))
            .with_opt(
                "search",
                self.search.clone().filter(|search| !search.is_empty()),
            )
    }
}

impl PublerClient {
    pub async fn upload_media(&self, upload: MediaUpload) -> Result<Value> {
        let form = upload.into_form()?;
        self.request(Method::POST, "/media", RequestOptions::new().multipart(form))
            .await
    }

    pub async fn list_media(&self, params: &ListMediaParams) -> Result<Value> {
        self.request(
            Method::GET,
            "/media",
            RequestOptions::new().query(params.to_query()),
        )
        .await
    }
}

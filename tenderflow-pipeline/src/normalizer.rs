use std::time::Duration;

use reqwest::multipart::{Form, Part};
use url::Url;

use crate::config::StirlingConfig;
use crate::error::PipelineError;

const PDF_CONTENT_TYPE: &str = "application/pdf";
const API_KEY_HEADER: &str = "X-API-KEY";

/// Raw file bytes with enough metadata to build a conversion request.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Converts an uploaded document (bytes or remote URL) to plain text via the
/// Stirling conversion service.
///
/// Non-PDF sources are first converted to PDF, the canonical intermediate
/// format, then run through text extraction. No retries happen here; a
/// caller that wants retries re-invokes the whole operation.
pub struct DocumentNormalizer {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl DocumentNormalizer {
    pub fn new(config: &StirlingConfig) -> Result<Self, PipelineError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    /// Fetch a remote document and extract its text.
    pub async fn extract_from_url(&self, raw_url: &str) -> Result<String, PipelineError> {
        let trimmed = raw_url.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::invalid_input("No URL provided for parsing"));
        }

        let parsed = Url::parse(trimmed)
            .map_err(|_| PipelineError::InvalidUrl(trimmed.to_string()))?;

        let response = self
            .http_client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Fetch(format!(
                "Failed to fetch file from URL: {}",
                status_text(response.status())
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let filename = filename_from_url(&parsed);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?
            .to_vec();

        self.extract_from_file(FilePayload {
            bytes,
            filename,
            content_type,
        })
        .await
    }

    /// Extract text from an in-memory file, converting to PDF first when the
    /// source is not already in the canonical format.
    pub async fn extract_from_file(&self, file: FilePayload) -> Result<String, PipelineError> {
        if file.bytes.is_empty() {
            return Err(PipelineError::invalid_input("No file provided for parsing"));
        }

        tracing::debug!(filename = %file.filename, content_type = %file.content_type, "normalizing document");

        let (pdf_bytes, pdf_name) = if file.content_type == PDF_CONTENT_TYPE {
            (file.bytes, file.filename)
        } else {
            self.convert_to_pdf(file).await?
        };

        self.extract_text(pdf_bytes, pdf_name).await
    }

    async fn convert_to_pdf(&self, file: FilePayload) -> Result<(Vec<u8>, String), PipelineError> {
        tracing::debug!(filename = %file.filename, "converting non-PDF source to PDF");

        let mut part = Part::bytes(file.bytes).file_name(file.filename.clone());
        if !file.content_type.is_empty() {
            part = part
                .mime_str(&file.content_type)
                .map_err(|e| PipelineError::invalid_input(e.to_string()))?;
        }
        // The multipart form sets its own content-type with the boundary
        // parameter; adding the header manually would break it.
        let form = Form::new()
            .part("fileInput", part)
            .text("outputFormat", "txt");

        let response = self
            .http_client
            .post(format!("{}/api/v1/convert/file/pdf", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Conversion(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Conversion(format!(
                "Failed to convert document to PDF: {}",
                status_text(response.status())
            )));
        }

        let pdf_bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Conversion(e.to_string()))?
            .to_vec();

        Ok((pdf_bytes, pdf_filename(&file.filename)))
    }

    async fn extract_text(
        &self,
        pdf_bytes: Vec<u8>,
        pdf_name: String,
    ) -> Result<String, PipelineError> {
        let part = Part::bytes(pdf_bytes)
            .file_name(pdf_name)
            .mime_str(PDF_CONTENT_TYPE)
            .map_err(|e| PipelineError::invalid_input(e.to_string()))?;
        let form = Form::new().part("fileInput", part);

        let response = self
            .http_client
            .post(format!("{}/api/v1/convert/pdf/text", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Extraction(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Extraction(format!(
                "Failed to parse file: {}",
                status_text(response.status())
            )));
        }

        // The extraction endpoint returns the text body directly, not JSON.
        response
            .text()
            .await
            .map_err(|e| PipelineError::Extraction(e.to_string()))
    }
}

fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| reason.to_string())
        .unwrap_or_else(|| status.as_u16().to_string())
}

/// Derive a filename from the last non-empty URL path segment.
fn filename_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("remote-file");

    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Swap a source filename's extension for `.pdf`.
fn pdf_filename(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{}.pdf", stem),
        _ => format!("{}.pdf", filename),
    }
}

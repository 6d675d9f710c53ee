//! API handlers for the paper comparator server
//!
//! Provides:
//! - The upload form page
//! - Health check
//! - The comparison endpoint (multipart in, JSON out)

use axum::{
    extract::{Multipart, State},
    response::Html,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use paper_insights::wordcloud::PNG_MIME_TYPE;
use paper_insights::{
    compare, ComparisonReport, ComparisonRequest, KeywordFrequencies, KpiLine, UploadedPdf,
};
use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Multipart field names of the comparison form
pub const API_KEY_FIELD: &str = "api_key";
pub const FIRST_PAPER_FIELD: &str = "paper1";
pub const SECOND_PAPER_FIELD: &str = "paper2";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "paper-compare-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// KPI section of the response
#[derive(Serialize)]
pub struct KpiResponse {
    pub raw: String,
    pub lines: Vec<KpiLine>,
}

/// One encoded keyword cloud
#[derive(Serialize)]
pub struct WordCloudResponse {
    pub title: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Base64-encoded PNG
    pub data: String,
}

/// The downloadable report
#[derive(Serialize)]
pub struct ReportResponse {
    pub file_name: String,
    pub mime_type: String,
    /// Base64-encoded DOCX
    pub data: String,
}

/// Comparison response, sections in display order
#[derive(Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub kpi: KpiResponse,
    pub highlights: Vec<String>,
    pub keywords: Vec<KeywordFrequencies>,
    pub wordclouds: Vec<WordCloudResponse>,
    pub report: ReportResponse,
}

impl From<ComparisonReport> for CompareResponse {
    fn from(report: ComparisonReport) -> Self {
        let papers = report.papers;

        Self {
            success: true,
            kpi: KpiResponse {
                raw: report.kpi,
                lines: report.kpi_lines,
            },
            highlights: papers.iter().map(|p| p.highlights.clone()).collect(),
            keywords: papers.iter().map(|p| p.keywords.clone()).collect(),
            wordclouds: papers
                .iter()
                .map(|p| WordCloudResponse {
                    title: p.wordcloud.title.clone(),
                    mime_type: PNG_MIME_TYPE,
                    width: p.wordcloud.width,
                    height: p.wordcloud.height,
                    data: STANDARD.encode(&p.wordcloud.png),
                })
                .collect(),
            report: ReportResponse {
                file_name: report.report.file_name,
                mime_type: report.report.mime_type,
                data: STANDARD.encode(&report.report.data),
            },
        }
    }
}

/// Handler: POST /api/compare
///
/// Reads the `api_key`, `paper1` and `paper2` form fields and runs one
/// comparison. Missing fields are left to validation so the user sees the
/// usual missing-inputs message.
pub async fn handle_compare(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CompareResponse>, ServerError> {
    let request = read_comparison_form(multipart).await?;
    info!(
        "Comparison requested: paper1={:?}, paper2={:?}",
        request.first.as_ref().map(|p| p.file_name.as_str()),
        request.second.as_ref().map(|p| p.file_name.as_str())
    );

    let report = compare(&state.config, &state.http, request).await?;
    Ok(Json(report.into()))
}

async fn read_comparison_form(mut multipart: Multipart) -> Result<ComparisonRequest, ServerError> {
    let mut request = ComparisonRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            API_KEY_FIELD => {
                let key = field.text().await?;
                request.credential = Some(SecretString::from(key));
            }
            FIRST_PAPER_FIELD | SECOND_PAPER_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                debug!("Field '{}': '{}' ({} bytes)", name, file_name, data.len());

                // Browsers send an empty part for an untouched file input
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }

                let upload = UploadedPdf::new(file_name, data).with_content_type(content_type);
                if name == FIRST_PAPER_FIELD {
                    request.first = Some(upload);
                } else {
                    request.second = Some(upload);
                }
            }
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    Ok(request)
}

//! Research paper comparison
//!
//! This crate takes two uploaded PDF papers and produces a KPI comparison,
//! per-paper highlights and keyword clouds, and a downloadable DOCX report.
//! The HTTP front end lives in `paper-compare-server`.

pub mod config;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod kpi;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod request;
pub mod wordcloud;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

pub use config::ComparatorConfig;
pub use error::{ComparisonError, ErrorKind, MISSING_INPUTS_MESSAGE};
pub use keywords::KeywordFrequencies;
pub use kpi::KpiLine;
pub use llm::{ChatClient, ChatRequest, OpenAiClient};
pub use pipeline::{compare, Comparator, ComparisonReport, PaperInsights};
pub use report::ReportDocument;
pub use request::{ComparisonRequest, UploadedPdf};
pub use wordcloud::WordCloudImage;

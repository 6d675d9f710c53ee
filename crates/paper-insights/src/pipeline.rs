//! Comparison orchestration
//!
//! A comparison goes through two phases once triggered:
//!
//! 1. **Validating**: [`ComparisonRequest::validate`] checks that both papers
//!    and a credential are present. Nothing else happens if it fails.
//! 2. **Running**: [`Comparator::run`] executes every step in a fixed order
//!    and returns either the complete [`ComparisonReport`] or the first error.
//!
//! Extraction and rendering are CPU-bound and run on the blocking pool; the
//! three chat-completion calls are issued one after another (KPI, paper 1,
//! paper 2).

use serde::Serialize;
use tracing::{debug, info};

use crate::config::ComparatorConfig;
use crate::error::ComparisonError;
use crate::extract::extract_text;
use crate::keywords::{extract_keywords, KeywordFrequencies};
use crate::kpi::{kpi_lines, KpiLine};
use crate::llm::{ChatClient, ChatRequest, OpenAiClient};
use crate::prompts::{highlights_prompt, kpi_prompt};
use crate::report::{assemble_report, ReportDocument};
use crate::request::{ComparisonRequest, UploadedPdf, ValidatedRequest};
use crate::wordcloud::{render_wordcloud, WordCloudImage};

/// Per-paper results
#[derive(Debug, Clone, Serialize)]
pub struct PaperInsights {
    /// 1 or 2
    pub paper: u8,
    pub file_name: String,
    pub highlights: String,
    pub keywords: KeywordFrequencies,
    pub wordcloud: WordCloudImage,
}

/// Everything a successful comparison produces, in display order
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Raw KPI answer, trimmed
    pub kpi: String,
    pub kpi_lines: Vec<KpiLine>,
    pub papers: [PaperInsights; 2],
    pub report: ReportDocument,
}

/// Runs comparisons against one chat client
pub struct Comparator<'a, C: ChatClient + ?Sized> {
    config: &'a ComparatorConfig,
    client: &'a C,
}

impl<'a, C: ChatClient + ?Sized> Comparator<'a, C> {
    pub fn new(config: &'a ComparatorConfig, client: &'a C) -> Self {
        Self { config, client }
    }

    /// Ask for the seven-item KPI comparison of two extracted texts
    pub async fn kpi_report(&self, text1: &str, text2: &str) -> Result<String, ComparisonError> {
        let prompt = kpi_prompt(text1, text2);
        let answer = self
            .client
            .complete(ChatRequest {
                model: &self.config.model,
                prompt: &prompt,
                max_tokens: self.config.kpi_max_tokens,
            })
            .await?;
        Ok(answer.trim().to_string())
    }

    /// Ask for three bullet-point highlights of one extracted text
    pub async fn highlights(&self, text: &str) -> Result<String, ComparisonError> {
        let prompt = highlights_prompt(text);
        let answer = self
            .client
            .complete(ChatRequest {
                model: &self.config.model,
                prompt: &prompt,
                max_tokens: self.config.highlights_max_tokens,
            })
            .await?;
        Ok(answer.trim().to_string())
    }

    /// Run every step of a comparison. No partial result is returned.
    pub async fn run(
        &self,
        first: &UploadedPdf,
        second: &UploadedPdf,
    ) -> Result<ComparisonReport, ComparisonError> {
        let limit = self.config.text_char_limit;

        info!("Extracting text from '{}' and '{}'", first.file_name, second.file_name);
        let text1 = extract_in_background(first.clone(), limit).await?;
        let text2 = extract_in_background(second.clone(), limit).await?;

        info!("Requesting KPI comparison (model={})", self.config.model);
        let kpi = self.kpi_report(&text1, &text2).await?;

        info!("Requesting highlights for both papers");
        let highlights1 = self.highlights(&text1).await?;
        let highlights2 = self.highlights(&text2).await?;

        let keywords1 = extract_keywords(&text1, self.config.keyword_limit);
        let keywords2 = extract_keywords(&text2, self.config.keyword_limit);
        debug!(
            "Keywords: paper 1 has {}, paper 2 has {}",
            keywords1.len(),
            keywords2.len()
        );

        info!("Rendering keyword clouds");
        let cloud1 = render_in_background(keywords1.clone(), "Paper 1 Keywords").await?;
        let cloud2 = render_in_background(keywords2.clone(), "Paper 2 Keywords").await?;

        let report = assemble_report(&kpi, &highlights1, &highlights2)?;
        info!("Comparison complete");

        Ok(ComparisonReport {
            kpi_lines: kpi_lines(&kpi),
            kpi,
            papers: [
                PaperInsights {
                    paper: 1,
                    file_name: first.file_name.clone(),
                    highlights: highlights1,
                    keywords: keywords1,
                    wordcloud: cloud1,
                },
                PaperInsights {
                    paper: 2,
                    file_name: second.file_name.clone(),
                    highlights: highlights2,
                    keywords: keywords2,
                    wordcloud: cloud2,
                },
            ],
            report,
        })
    }
}

/// Validate `request`, then run it against the OpenAI-compatible endpoint
/// named in `config`, authenticated with the request's own credential.
pub async fn compare(
    config: &ComparatorConfig,
    http: &reqwest::Client,
    request: ComparisonRequest,
) -> Result<ComparisonReport, ComparisonError> {
    let ValidatedRequest {
        credential,
        first,
        second,
    } = request.validate()?;

    let client = OpenAiClient::new(http.clone(), &config.api_base_url, credential);
    Comparator::new(config, &client).run(&first, &second).await
}

async fn extract_in_background(upload: UploadedPdf, limit: usize) -> Result<String, ComparisonError> {
    tokio::task::spawn_blocking(move || extract_text(Some(&upload), limit))
        .await
        .map_err(|e| ComparisonError::Extraction(format!("Text extraction task failed: {}", e)))?
}

async fn render_in_background(
    keywords: KeywordFrequencies,
    title: &'static str,
) -> Result<WordCloudImage, ComparisonError> {
    tokio::task::spawn_blocking(move || render_wordcloud(&keywords, title))
        .await
        .map_err(|e| ComparisonError::Rendering(format!("Word-cloud task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MISSING_INPUTS_MESSAGE;
    use crate::fixtures::{sample_pdf, MockProvider, MOCK_KPI_ANSWER};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::Mutex;

    const PAPER_ONE: &str = "Graph neural networks propagate messages between nodes. \
                             Message passing networks aggregate neighbor features.";
    const PAPER_TWO: &str = "Convolutional networks learn image filters. \
                             Residual connections stabilize training of deep networks.";

    /// Records every prompt; fails the call with index `fail_at` if set
    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<(String, u32)>>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn complete(&self, request: ChatRequest<'_>) -> Result<String, ComparisonError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((request.prompt.to_string(), request.max_tokens));
            if self.fail_at == Some(index) {
                return Err(ComparisonError::RemoteCall("Rate limit reached".into()));
            }
            Ok(format!("  answer {}\nScore: {}  \n", index, index))
        }
    }

    fn papers() -> (UploadedPdf, UploadedPdf) {
        (
            UploadedPdf::new("one.pdf", sample_pdf(&[PAPER_ONE])),
            UploadedPdf::new("two.pdf", sample_pdf(&[PAPER_TWO])),
        )
    }

    #[tokio::test]
    async fn test_run_issues_kpi_then_two_highlight_calls() {
        let config = ComparatorConfig::default();
        let client = RecordingClient::default();
        let (first, second) = papers();

        let report = Comparator::new(&config, &client)
            .run(&first, &second)
            .await
            .unwrap();

        let calls = client.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].0.contains("KPI format"));
        assert!(calls[0].0.contains("Graph"));
        assert!(calls[0].0.contains("Convolutional"));
        assert_eq!(calls[0].1, 1000);
        assert!(calls[1].0.starts_with("Give 3 important"));
        assert!(calls[1].0.contains("Graph"));
        assert_eq!(calls[1].1, 200);
        assert!(calls[2].0.contains("Convolutional"));
        assert_eq!(calls[2].1, 200);

        assert_eq!(report.kpi, "answer 0\nScore: 0");
        assert_eq!(report.papers[0].highlights, "answer 1\nScore: 1");
        assert_eq!(report.papers[1].highlights, "answer 2\nScore: 2");
        assert_eq!(report.kpi_lines.len(), 2);
        assert_eq!(report.papers[0].keywords.get("networks"), Some(2));
        assert_eq!(report.papers[1].wordcloud.title, "Paper 2 Keywords");
        assert!(!report.report.data.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_aborts_run() {
        let config = ComparatorConfig::default();
        let client = RecordingClient {
            fail_at: Some(1),
            ..Default::default()
        };
        let (first, second) = papers();

        let err = Comparator::new(&config, &client)
            .run(&first, &second)
            .await
            .unwrap_err();

        assert_eq!(err, ComparisonError::RemoteCall("Rate limit reached".into()));
        assert_eq!(err.user_message(), "Error: Rate limit reached");
        // The second highlight call is never made
        assert_eq!(client.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_pdf_fails_before_remote_calls() {
        let config = ComparatorConfig::default();
        let client = RecordingClient::default();
        let first = UploadedPdf::new("broken.pdf", b"not a pdf at all".to_vec());
        let (_, second) = papers();

        let err = Comparator::new(&config, &client)
            .run(&first, &second)
            .await
            .unwrap_err();

        assert!(matches!(err, ComparisonError::Extraction(_)));
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_paper_without_keywords_fails_rendering() {
        let config = ComparatorConfig::default();
        let client = RecordingClient::default();
        let first = UploadedPdf::new("short.pdf", sample_pdf(&["a b c to be or not"]));
        let (_, second) = papers();

        let err = Comparator::new(&config, &client)
            .run(&first, &second)
            .await
            .unwrap_err();

        assert!(matches!(err, ComparisonError::Rendering(_)));
        assert_eq!(client.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_compare_validation_makes_no_remote_call() {
        let provider = MockProvider::start().await;
        let config = ComparatorConfig::default().with_api_base_url(&provider.base_url);
        let (first, _) = papers();

        let request = ComparisonRequest::new(
            Some(SecretString::from("sk-test".to_string())),
            Some(first),
            None,
        );
        let err = compare(&config, &reqwest::Client::new(), request)
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), MISSING_INPUTS_MESSAGE);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_compare_against_provider() {
        let provider = MockProvider::start().await;
        let config = ComparatorConfig::default().with_api_base_url(&provider.base_url);
        let (first, second) = papers();

        let request = ComparisonRequest::new(
            Some(SecretString::from("sk-live".to_string())),
            Some(first),
            Some(second),
        );
        let report = compare(&config, &reqwest::Client::new(), request)
            .await
            .unwrap();

        assert_eq!(report.kpi, MOCK_KPI_ANSWER.trim());
        assert_eq!(
            report.papers[0].highlights,
            "- Introduces the method\n- Reports strong results\n- Releases code"
        );

        let calls = provider.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls
            .iter()
            .all(|c| c.authorization.as_deref() == Some("Bearer sk-live")));
        assert_eq!(calls[0].max_tokens(), 1000);
        assert_eq!(calls[1].max_tokens(), 200);
        assert_eq!(calls[2].max_tokens(), 200);
    }
}

//! Request-scoped inputs collected from the form

use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ComparisonError;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// One uploaded file, held in memory for the duration of a request
#[derive(Debug, Clone)]
pub struct UploadedPdf {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedPdf {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: Some(PDF_MIME_TYPE.to_string()),
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// True when the declared type or the file extension says PDF
    pub fn is_declared_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(PDF_MIME_TYPE))
            .unwrap_or(false);
        let by_name = self.file_name.to_lowercase().ends_with(".pdf");
        by_type || by_name
    }
}

/// Everything the user submitted with one click of the compare button
#[derive(Debug, Default)]
pub struct ComparisonRequest {
    pub credential: Option<SecretString>,
    pub first: Option<UploadedPdf>,
    pub second: Option<UploadedPdf>,
}

/// A request that passed validation: both papers and a credential present
#[derive(Debug)]
pub struct ValidatedRequest {
    pub credential: SecretString,
    pub first: UploadedPdf,
    pub second: UploadedPdf,
}

impl ComparisonRequest {
    pub fn new(
        credential: Option<SecretString>,
        first: Option<UploadedPdf>,
        second: Option<UploadedPdf>,
    ) -> Self {
        Self {
            credential,
            first,
            second,
        }
    }

    /// Check the all-or-nothing precondition.
    ///
    /// Fails with the missing-inputs message when either paper is absent or
    /// the credential is empty. Uploads that are not PDFs are rejected too.
    pub fn validate(self) -> Result<ValidatedRequest, ComparisonError> {
        let credential = self
            .credential
            .filter(|key| !key.expose_secret().is_empty());

        let (Some(credential), Some(first), Some(second)) = (credential, self.first, self.second)
        else {
            return Err(ComparisonError::missing_inputs());
        };

        for (label, upload) in [("First paper", &first), ("Second paper", &second)] {
            if !upload.is_declared_pdf() {
                return Err(ComparisonError::Validation(format!(
                    "{} '{}' must be a PDF file.",
                    label, upload.file_name
                )));
            }
        }

        Ok(ValidatedRequest {
            credential,
            first,
            second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MISSING_INPUTS_MESSAGE;

    fn key(value: &str) -> Option<SecretString> {
        Some(SecretString::from(value.to_string()))
    }

    fn pdf(name: &str) -> Option<UploadedPdf> {
        Some(UploadedPdf::new(name, b"%PDF-1.5".to_vec()))
    }

    #[test]
    fn test_complete_request_validates() {
        let validated = ComparisonRequest::new(key("sk-test"), pdf("a.pdf"), pdf("b.pdf"))
            .validate()
            .unwrap();
        assert_eq!(validated.first.file_name, "a.pdf");
        assert_eq!(validated.second.file_name, "b.pdf");
        assert_eq!(validated.credential.expose_secret(), "sk-test");
    }

    #[test]
    fn test_missing_second_paper() {
        let err = ComparisonRequest::new(key("sk-test"), pdf("a.pdf"), None)
            .validate()
            .unwrap_err();
        assert_eq!(err, ComparisonError::Validation(MISSING_INPUTS_MESSAGE.into()));
    }

    #[test]
    fn test_missing_both_papers() {
        let err = ComparisonRequest::new(key("sk-test"), None, None)
            .validate()
            .unwrap_err();
        assert_eq!(err.user_message(), MISSING_INPUTS_MESSAGE);
    }

    #[test]
    fn test_empty_credential_is_missing() {
        let err = ComparisonRequest::new(key(""), pdf("a.pdf"), pdf("b.pdf"))
            .validate()
            .unwrap_err();
        assert_eq!(err.user_message(), MISSING_INPUTS_MESSAGE);

        let err = ComparisonRequest::new(None, pdf("a.pdf"), pdf("b.pdf"))
            .validate()
            .unwrap_err();
        assert_eq!(err.user_message(), MISSING_INPUTS_MESSAGE);
    }

    #[test]
    fn test_non_pdf_upload_rejected() {
        let text_file = UploadedPdf::new("notes.txt", b"hello".to_vec())
            .with_content_type(Some("text/plain".into()));
        let err = ComparisonRequest::new(key("sk-test"), pdf("a.pdf"), Some(text_file))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ComparisonError::Validation(ref msg) if msg.contains("notes.txt")));
    }

    #[test]
    fn test_pdf_detected_by_extension_or_type() {
        let by_name = UploadedPdf::new("Paper.PDF", Bytes::new()).with_content_type(None);
        assert!(by_name.is_declared_pdf());

        let by_type = UploadedPdf::new("upload", Bytes::new());
        assert!(by_type.is_declared_pdf());
    }
}

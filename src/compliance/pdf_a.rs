//! PDF/A validator.
//!
//! A thin layer over [`PdfAChecker`] that turns the first violation into a
//! [`ValidationResult`] instead of an error.

use super::checker::PdfAChecker;
use super::types::{PdfALevel, ValidationResult};
use crate::config::CheckerConfig;
use crate::document::PdfDocument;
use crate::error::{Error, Result};

/// PDF/A compliance validator.
///
/// This validator checks documents against PDF/A (ISO 19005-1 to 19005-4)
/// and reports the first violation together with any warnings.
///
/// # Example
///
/// ```
/// use pdfa_oxide::compliance::{PdfALevel, PdfAValidator};
/// use pdfa_oxide::document::PdfDocument;
///
/// let document = PdfDocument::default();
/// // A document without a catalog cannot be checked at all.
/// assert!(PdfAValidator::new().validate(&document, PdfALevel::A2b).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PdfAValidator {
    /// Whether to include warnings in validation
    include_warnings: bool,
    /// Checker configuration
    config: CheckerConfig,
}

impl Default for PdfAValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfAValidator {
    /// Create a new PDF/A validator with default settings.
    pub fn new() -> Self {
        Self {
            include_warnings: true,
            config: CheckerConfig::default(),
        }
    }

    /// Configure whether to include warnings in the validation result.
    pub fn include_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    /// Use an explicit checker configuration.
    pub fn with_config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate a document against the specified PDF/A level.
    ///
    /// A rule violation is reported in the result. Errors that prevent the
    /// check from finishing (a malformed content stream, a dangling page tree
    /// reference, a missing catalog) are returned as `Err`.
    pub fn validate(&self, document: &PdfDocument, level: PdfALevel) -> Result<ValidationResult> {
        let checker = PdfAChecker::with_config(level, self.config.clone());
        let mut session = checker.new_session(document);
        let outcome = checker.check_document(&mut session);

        let mut result = ValidationResult::new(level);
        result.detected_level = session.detected_level();
        result.stats = session.stats().clone();
        result.stats.objects_checked = result.stats.objects_checked.max(session.checked().object_count());

        match outcome {
            Ok(()) => {},
            Err(Error::Conformance(err)) => {
                log::debug!("{} violation: {}", level, err);
                result.error = Some(err);
            },
            Err(e) => return Err(e),
        }
        result.warnings = session.into_warnings();
        Ok(self.finalize_result(result))
    }

    /// Finalize the validation result.
    fn finalize_result(&self, mut result: ValidationResult) -> ValidationResult {
        result.is_compliant = !result.has_errors();

        // Remove warnings if not requested
        if !self.include_warnings {
            result.warnings.clear();
        }

        result
    }
}

/// Quick validation function for common use cases.
///
/// ```
/// use pdfa_oxide::compliance::{validate_pdf_a, PdfALevel};
/// use pdfa_oxide::document::PdfDocument;
///
/// assert!(validate_pdf_a(&PdfDocument::default(), PdfALevel::A1b).is_err());
/// ```
pub fn validate_pdf_a(document: &PdfDocument, level: PdfALevel) -> Result<ValidationResult> {
    PdfAValidator::new().validate(document, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::testing::document_with_catalog;
    use crate::compliance::types::{ComplianceWarning, ErrorCode, WarningCode};

    #[test]
    fn test_validator_builder() {
        let validator = PdfAValidator::new()
            .include_warnings(false)
            .with_config(CheckerConfig::new().with_full_check(true));
        assert!(!validator.include_warnings);
        assert!(validator.config.full_check);
    }

    #[test]
    fn test_validation_result_finalization() {
        let validator = PdfAValidator::new();
        let finalized = validator.finalize_result(ValidationResult::new(PdfALevel::A2b));
        assert!(finalized.is_compliant);
    }

    #[test]
    fn test_validation_result_finalization_without_warnings() {
        let validator = PdfAValidator::new().include_warnings(false);
        let mut result = ValidationResult::new(PdfALevel::A2b);
        result.warnings.push(ComplianceWarning::new(WarningCode::MissingLanguage, "no Lang"));

        let finalized = validator.finalize_result(result);
        assert!(finalized.warnings.is_empty());
    }

    #[test]
    fn test_violation_becomes_result() {
        // No Metadata stream.
        let doc = document_with_catalog(Vec::new());
        let result = validate_pdf_a(&doc, PdfALevel::A1b).unwrap();
        assert!(!result.is_compliant);
        assert_eq!(result.error.map(|e| e.code), Some(ErrorCode::MissingXmpMetadata));
    }
}

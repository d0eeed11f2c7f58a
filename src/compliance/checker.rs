//! Conformance checker core.
//!
//! [`PdfAChecker`] is immutable: it holds the level, the policy table for that
//! level and the configuration. All mutable state lives in the
//! [`ValidationSession`] passed to every call, so one checker can serve any
//! number of documents, including from several threads at once.
//!
//! The first violation aborts the check with
//! [`Error::Conformance`](crate::error::Error::Conformance).

use super::events::ValidationEvent;
use super::policy::ConformancePolicy;
use super::session::ValidationSession;
use super::types::{ComplianceWarning, ConformanceError, ErrorCode, PdfALevel, PdfAPart};
use crate::config::CheckerConfig;
use crate::document::PdfDocument;
use crate::error::{Error, Result};

/// Shorthand for returning a violation.
pub(crate) fn fail<T>(err: ConformanceError) -> Result<T> {
    Err(Error::Conformance(err))
}

/// PDF/A conformance checker for one level.
#[derive(Debug, Clone)]
pub struct PdfAChecker {
    level: PdfALevel,
    policy: &'static ConformancePolicy,
    config: CheckerConfig,
}

impl PdfAChecker {
    /// Create a checker with the default configuration.
    pub fn new(level: PdfALevel) -> Self {
        Self::with_config(level, CheckerConfig::default())
    }

    /// Create a checker with an explicit configuration.
    pub fn with_config(level: PdfALevel, config: CheckerConfig) -> Self {
        Self {
            level,
            policy: ConformancePolicy::for_level(level),
            config,
        }
    }

    /// Target level.
    pub fn level(&self) -> PdfALevel {
        self.level
    }

    /// Rule table in use.
    pub fn policy(&self) -> &'static ConformancePolicy {
        self.policy
    }

    /// Configuration in use.
    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Start a fresh session for `doc`.
    pub fn new_session<'d>(&self, doc: &'d PdfDocument) -> ValidationSession<'d> {
        ValidationSession::with_config(doc, &self.config)
    }

    /// Check a whole document in a fresh session and return its warnings.
    pub fn check(&self, doc: &PdfDocument) -> Result<Vec<ComplianceWarning>> {
        let mut session = self.new_session(doc);
        self.check_document(&mut session)?;
        Ok(session.into_warnings())
    }

    /// Check the document of `session` in a fixed order.
    pub fn check_document(&self, session: &mut ValidationSession<'_>) -> Result<()> {
        let doc = session.document();
        let catalog = doc.catalog()?;
        log::debug!("Checking document against {}", self.level);

        // Output intent first: every color decision depends on it.
        session.output_intent = self.resolve_output_intent(session, catalog.get("OutputIntents"))?;
        self.check_output_intents(session, catalog.get("OutputIntents"))?;

        self.check_metadata(session, catalog)?;
        self.check_catalog(session, catalog)?;
        self.check_trailer(session)?;
        self.check_version(session, catalog)?;
        self.check_structure(session, catalog)?;
        self.check_acro_form(session, catalog)?;
        self.check_outlines(session, catalog)?;

        for page in doc.pages()? {
            self.check_page(session, &page)?;
        }

        if let Some(action) = catalog.get("OpenAction") {
            self.check_open_action(session, action)?;
        }

        if !self.policy.page_scope_color_usage {
            let usage = session.usage.document().clone();
            self.finalize_color_usage(session, &usage)?;
        }

        log::debug!(
            "Document conforms to {} ({} objects, {} pages)",
            self.level,
            session.stats.objects_checked,
            session.stats.pages_checked
        );
        Ok(())
    }

    /// Route a validation event to its check.
    pub fn check_event(&self, session: &mut ValidationSession<'_>, event: ValidationEvent<'_>) -> Result<()> {
        log::trace!("event {}", event.kind());
        match event {
            ValidationEvent::Document => self.check_document(session),
            ValidationEvent::Page(page) => self.check_page(session, page),
            ValidationEvent::ContentStreamObject { stream, resources } => {
                self.walk_content_stream(session, stream, resources)
            },
            ValidationEvent::FillColor {
                operator,
                operands,
                resources,
            }
            | ValidationEvent::StrokeColor {
                operator,
                operands,
                resources,
            } => self.check_color_operator(session, operator, operands, resources),
            ValidationEvent::ExtGState(state) => self.check_ext_gstate(session, state),
            ValidationEvent::InlineImage { dict, data, resources } => {
                self.check_inline_image(session, dict, data, resources)
            },
            ValidationEvent::RenderingIntent(intent) => self.check_rendering_intent(intent),
            ValidationEvent::FontGlyphs { font, codes } => self.check_glyphs(session, font, codes),
            ValidationEvent::XrefTable => self.check_xref(session),
            ValidationEvent::Signature(sig) => self.check_signature(session, sig),
            ValidationEvent::SignatureType(sub_filter) => self.check_signature_type(sub_filter),
            ValidationEvent::Crypto(_) => fail(
                ConformanceError::new(ErrorCode::EncryptionNotAllowed).with_clause(self.clause("6.1.3", "6.1.3")),
            ),
            ValidationEvent::Text { font } => self.check_text(session, font),
            ValidationEvent::CanvasStack(op) => self.check_canvas_stack(session, op),
            ValidationEvent::PageObject { page_ref, dict } => self.check_page_object(session, page_ref, dict),
            ValidationEvent::PdfObject(obj) => self.check_object(session, obj),
        }
    }

    /// Clause reference for the active part. Parts 3 and 4 follow the
    /// numbering of part 2 for the rules that carry a clause.
    pub(crate) fn clause(&self, part1: &str, later: &str) -> String {
        let number = match self.level.part() {
            PdfAPart::Part1 => part1,
            _ => later,
        };
        format!("ISO 19005-{} {}", self.level.xmp_part(), number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PdfAChecker>();
    }

    #[test]
    fn test_checker_uses_level_policy() {
        let checker = PdfAChecker::new(PdfALevel::A2u);
        assert_eq!(checker.level(), PdfALevel::A2u);
        assert!(checker.policy().require_unicode);
        assert!(!checker.config().full_check);
    }

    #[test]
    fn test_clause_labels() {
        assert_eq!(PdfAChecker::new(PdfALevel::A1b).clause("6.1.3", "6.1.4"), "ISO 19005-1 6.1.3");
        assert_eq!(PdfAChecker::new(PdfALevel::A3b).clause("6.1.3", "6.1.4"), "ISO 19005-3 6.1.4");
    }

    #[test]
    fn test_document_without_catalog_is_not_a_violation() {
        let doc = PdfDocument::default();
        let err = PdfAChecker::new(PdfALevel::A1b).check(&doc).unwrap_err();
        assert!(!err.is_conformance());
    }
}

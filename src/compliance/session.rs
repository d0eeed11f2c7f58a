//! Per-document validation state.

use super::color::{OutputIntentColor, SeparationRegistry, UsageTracker};
use super::types::{ComplianceWarning, PdfALevel, ValidationStats};
use crate::config::CheckerConfig;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::object::ObjectRef;
use std::collections::HashSet;

/// Identity sets of nodes that were already checked.
///
/// Two passes keep separate sets: generic object checks (limits, filters,
/// file specifications) and semantic traversal (resources, fonts, forms,
/// annotations). An object visited by one pass still gets the other.
#[derive(Debug, Default)]
pub struct CheckedObjects {
    objects: HashSet<ObjectRef>,
    nodes: HashSet<ObjectRef>,
}

impl CheckedObjects {
    /// Mark an object as checked by the generic pass; `false` if it already was.
    pub fn mark_object(&mut self, obj_ref: ObjectRef) -> bool {
        self.objects.insert(obj_ref)
    }

    /// Whether the generic pass has checked an object.
    pub fn is_object_checked(&self, obj_ref: ObjectRef) -> bool {
        self.objects.contains(&obj_ref)
    }

    /// Mark a node as traversed; `false` if it already was.
    pub fn mark_node(&mut self, obj_ref: ObjectRef) -> bool {
        self.nodes.insert(obj_ref)
    }

    /// Whether a node has been traversed.
    pub fn is_node_checked(&self, obj_ref: ObjectRef) -> bool {
        self.nodes.contains(&obj_ref)
    }

    /// Number of objects checked by the generic pass.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

/// The output intent in effect for a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputIntent {
    /// Color model of the destination profile
    pub color: OutputIntentColor,
    /// Decoded destination profile
    pub profile: Option<Vec<u8>>,
}

/// ICC-based transparency blending space of the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendingSpace {
    /// Number of components
    pub components: u32,
    /// Decoded ICC profile
    pub profile: Vec<u8>,
}

/// State of one document check.
///
/// Created fresh for every document and passed by `&mut` through the whole
/// traversal. Never reused across documents and never shared between threads.
#[derive(Debug)]
pub struct ValidationSession<'d> {
    doc: &'d PdfDocument,
    full_check: bool,
    pub(crate) max_nesting: u32,
    pub(crate) checked: CheckedObjects,
    pub(crate) usage: UsageTracker,
    pub(crate) separations: SeparationRegistry,
    pub(crate) gs_depth: usize,
    pub(crate) nesting: u32,
    pub(crate) output_intent: OutputIntent,
    pub(crate) page_intent: OutputIntent,
    pub(crate) page_blending: Option<BlendingSpace>,
    pub(crate) current_page: Option<(usize, ObjectRef)>,
    pub(crate) detected_level: Option<PdfALevel>,
    pub(crate) stats: ValidationStats,
    warnings: Vec<ComplianceWarning>,
}

impl<'d> ValidationSession<'d> {
    /// Create a session with the default configuration.
    pub fn new(doc: &'d PdfDocument) -> Self {
        Self::with_config(doc, &CheckerConfig::default())
    }

    /// Create a session for `doc`.
    pub fn with_config(doc: &'d PdfDocument, config: &CheckerConfig) -> Self {
        Self {
            doc,
            full_check: config.full_check,
            max_nesting: config.max_resolve_depth,
            checked: CheckedObjects::default(),
            usage: UsageTracker::default(),
            separations: SeparationRegistry::default(),
            gs_depth: 0,
            nesting: 0,
            output_intent: OutputIntent::default(),
            page_intent: OutputIntent::default(),
            page_blending: None,
            current_page: None,
            detected_level: None,
            stats: ValidationStats::default(),
            warnings: Vec::new(),
        }
    }

    /// The document under check.
    pub fn document(&self) -> &'d PdfDocument {
        self.doc
    }

    /// Whether flushed streams are re-walked.
    pub fn full_check(&self) -> bool {
        self.full_check
    }

    /// Checked-object registry.
    pub fn checked(&self) -> &CheckedObjects {
        &self.checked
    }

    /// Color and transparency usage recorded so far.
    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Separation registry.
    pub fn separations(&self) -> &SeparationRegistry {
        &self.separations
    }

    /// Document output intent.
    pub fn output_intent(&self) -> &OutputIntent {
        &self.output_intent
    }

    /// Current `q` nesting depth.
    pub fn gs_depth(&self) -> usize {
        self.gs_depth
    }

    /// PDF/A level claimed by the XMP metadata.
    pub fn detected_level(&self) -> Option<PdfALevel> {
        self.detected_level
    }

    /// Statistics so far.
    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    /// Warnings so far.
    pub fn warnings(&self) -> &[ComplianceWarning] {
        &self.warnings
    }

    /// Consume the session, keeping its warnings.
    pub fn into_warnings(self) -> Vec<ComplianceWarning> {
        self.warnings
    }

    /// Record an advisory warning.
    pub fn warn(&mut self, warning: ComplianceWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Location string for the current page, if any.
    pub(crate) fn location(&self) -> Option<String> {
        self.current_page.map(|(index, _)| format!("page {}", index + 1))
    }

    /// Start traversing a node. Returns `false` when the node was traversed
    /// before, in which case its recorded usage is replayed instead.
    pub(crate) fn begin_node(&mut self, node: Option<ObjectRef>) -> bool {
        match node {
            None => true,
            Some(r) if self.checked.mark_node(r) => {
                self.usage.enter(r);
                true
            },
            Some(r) => {
                log::trace!("node {} already checked", r);
                self.usage.replay(r);
                false
            },
        }
    }

    /// Finish a node started with [`begin_node`](Self::begin_node).
    pub(crate) fn end_node(&mut self, node: Option<ObjectRef>) {
        if node.is_some() {
            self.usage.leave();
        }
    }

    /// Enter one level of nested traversal (form, pattern, glyph, nested
    /// color space).
    pub(crate) fn descend(&mut self) -> Result<()> {
        if self.nesting >= self.max_nesting {
            return Err(Error::RecursionLimitExceeded(self.max_nesting));
        }
        self.nesting += 1;
        Ok(())
    }

    /// Leave a level entered with [`descend`](Self::descend).
    pub(crate) fn ascend(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }
}

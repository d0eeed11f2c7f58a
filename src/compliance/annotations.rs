//! Annotations and actions.
//!
//! See ISO 19005-1, 6.5 and 6.6 and ISO 19005-2, 6.3 and 6.5.

use super::checker::{fail, PdfAChecker};
use super::session::ValidationSession;
use super::types::{ConformanceError, ErrorCode};
use crate::error::Result;
use crate::object::{dict_name, Dictionary, Object, ObjectRef};
use bitflags::bitflags;
use std::collections::HashSet;

bitflags! {
    /// Annotation flags.
    ///
    /// Per ISO 32000-1:2008 Table 165 (Annotation flags).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnnotationFlags: u32 {
        /// Bit 1: Do not display an unknown annotation type
        const INVISIBLE = 1 << 0;
        /// Bit 2: Do not display or print
        const HIDDEN = 1 << 1;
        /// Bit 3: Print when the page is printed
        const PRINT = 1 << 2;
        /// Bit 4: Do not scale with the page magnification
        const NO_ZOOM = 1 << 3;
        /// Bit 5: Do not rotate with the page
        const NO_ROTATE = 1 << 4;
        /// Bit 6: Do not display on screen
        const NO_VIEW = 1 << 5;
        /// Bit 7: Do not allow interaction
        const READ_ONLY = 1 << 6;
    }
}

/// Flags that shall be clear on every annotation, with their display names.
const HIDING_FLAGS: [(AnnotationFlags, &str); 3] = [
    (AnnotationFlags::INVISIBLE, "Invisible"),
    (AnnotationFlags::HIDDEN, "Hidden"),
    (AnnotationFlags::NO_VIEW, "NoView"),
];

/// Whether a `Rect` has zero width and height.
fn is_degenerate_rect(rect: Option<&Object>) -> bool {
    let values: Vec<f64> = match rect.and_then(Object::as_array) {
        Some(items) => items.iter().filter_map(Object::as_number).collect(),
        None => return false,
    };
    values.len() == 4 && values[0] == values[2] && values[1] == values[3]
}

impl PdfAChecker {
    /// One annotation of a page.
    pub(crate) fn check_annotation(
        &self,
        session: &mut ValidationSession<'_>,
        annot_ref: Option<ObjectRef>,
        annot: &Dictionary,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        let subtype = dict_name(annot, "Subtype").unwrap_or("(none)");
        session.stats.annotations_checked += 1;

        if self.policy().forbidden_annotations.contains(subtype) {
            return fail(
                ConformanceError::new(ErrorCode::AnnotationTypeNotAllowed)
                    .with_param(subtype)
                    .at_location(session.location())
                    .with_clause(self.clause("6.5.2", "6.3.1")),
            );
        }

        let flags = doc
            .get(annot, "F")?
            .and_then(Object::as_integer)
            .map(|bits| AnnotationFlags::from_bits_truncate(bits as u32))
            .unwrap_or_default();
        if subtype != "Popup" && !flags.contains(AnnotationFlags::PRINT) {
            return fail(
                ConformanceError::new(ErrorCode::AnnotationNotPrinted)
                    .with_param(subtype)
                    .with_clause(self.clause("6.5.3", "6.3.2")),
            );
        }
        for (flag, name) in HIDING_FLAGS {
            if flags.contains(flag) {
                return fail(
                    ConformanceError::new(ErrorCode::AnnotationHidden)
                        .with_param(subtype)
                        .with_param(name)
                        .with_clause(self.clause("6.5.3", "6.3.2")),
                );
            }
        }

        if let Some(alpha) = doc.get(annot, "CA")?.and_then(Object::as_number) {
            if alpha != 1.0 {
                self.note_transparency(session, &format!("annotation CA value {}", alpha))?;
            }
        }

        if subtype == "Widget" {
            if self.policy().forbid_widget_additional_actions && annot.contains_key("AA") {
                return fail(
                    ConformanceError::new(ErrorCode::WidgetAdditionalActions)
                        .with_clause(self.clause("6.6.2", "6.4.1")),
                );
            }
            if self.policy().forbid_widget_action && annot.contains_key("A") {
                return fail(ConformanceError::new(ErrorCode::WidgetAction).with_clause(self.clause("6.6.1", "6.4.1")));
            }
        }
        if let Some(action) = annot.get("A") {
            self.check_action(session, action)?;
        }

        self.check_appearance(session, annot, subtype, resources)?;

        match annot_ref {
            Some(r) => self.check_object(session, &Object::Reference(r)),
            None => {
                for value in annot.values() {
                    self.check_object(session, value)?;
                }
                Ok(())
            },
        }
    }

    fn check_appearance(
        &self,
        session: &mut ValidationSession<'_>,
        annot: &Dictionary,
        subtype: &str,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        let appearance = match doc.get(annot, "AP")?.and_then(Object::as_dict) {
            Some(appearance) => appearance,
            None => {
                let exempt =
                    self.policy().appearance_exempt.contains(subtype) || is_degenerate_rect(doc.get(annot, "Rect")?);
                if self.policy().require_appearance_streams && !exempt {
                    return fail(
                        ConformanceError::new(ErrorCode::MissingAppearanceStream)
                            .with_param(subtype)
                            .with_clause(self.clause("6.5.3", "6.3.3")),
                    );
                }
                return Ok(());
            },
        };

        if self.policy().require_appearance_streams && appearance.keys().any(|key| key != "N") {
            return fail(
                ConformanceError::new(ErrorCode::AppearanceDictionaryInvalid).with_clause(self.clause("6.5.3", "6.3.3")),
            );
        }

        let normal = match appearance.get("N") {
            Some(normal) => normal,
            None => return Ok(()),
        };
        // A stream, or a dictionary of appearance states.
        match doc.resolve(normal)? {
            Object::Stream { .. } => self.check_appearance_stream(session, normal, resources),
            Object::Dictionary(states) => {
                for state in states.values() {
                    self.check_appearance_stream(session, state, resources)?;
                }
                Ok(())
            },
            _ => Ok(()),
        }
    }

    /// Appearance streams are forms, with or without a `Subtype` entry.
    fn check_appearance_stream(
        &self,
        session: &mut ValidationSession<'_>,
        stream: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let node = stream.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = match session.document().resolve(stream) {
            Ok(Object::Stream { dict, .. }) => self.check_form(session, stream, dict, resources),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        session.end_node(node);
        result
    }

    /// An action and the chain of actions it triggers through `Next`.
    pub(crate) fn check_action(&self, session: &mut ValidationSession<'_>, action: &Object) -> Result<()> {
        let doc = session.document();
        let mut pending: Vec<&Object> = vec![action];
        let mut visited: HashSet<ObjectRef> = HashSet::new();

        while let Some(current) = pending.pop() {
            if let Some(r) = current.as_reference() {
                if !visited.insert(r) {
                    continue;
                }
            }
            let dict = match doc.resolve_dict(current)? {
                Some(dict) => dict,
                None => continue,
            };

            let kind = dict_name(dict, "S").unwrap_or("(none)");
            if self.policy().forbidden_actions.contains(kind) {
                return fail(
                    ConformanceError::new(ErrorCode::ActionNotAllowed)
                        .with_param(kind)
                        .with_clause(self.clause("6.6.1", "6.5.1")),
                );
            }
            if kind == "Named" {
                let name = doc.get(dict, "N")?.and_then(Object::as_name).unwrap_or("(none)");
                if !self.policy().allowed_named_actions.contains(name) {
                    return fail(
                        ConformanceError::new(ErrorCode::NamedActionNotAllowed)
                            .with_param(name)
                            .with_clause(self.clause("6.6.1", "6.5.1")),
                    );
                }
            }
            log::trace!("action {} allowed", kind);

            if let Some(next) = dict.get("Next") {
                match doc.resolve(next)? {
                    Object::Array(items) => pending.extend(items.iter().rev()),
                    _ => pending.push(next),
                }
            }
        }
        Ok(())
    }
}

//! Content stream walker.
//!
//! Decodes a content stream, runs every operand through the object checks and
//! turns the operators the rules care about into validation events.

use super::checker::{fail, PdfAChecker};
use super::events::{CanvasOp, ValidationEvent};
use super::resources::lookup_resource;
use super::session::ValidationSession;
use super::types::{ComplianceWarning, ConformanceError, ErrorCode, WarningCode};
use crate::content::{is_known_operator, parse_content_stream, ContentOperation};
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object};

/// Bytes of every string operand of a text-showing operator.
fn shown_codes(operator: &str, operands: &[Object]) -> Vec<u8> {
    let strings: Vec<&Object> = match operator {
        "Tj" | "'" => operands.last().into_iter().collect(),
        "\"" => operands.get(2).into_iter().collect(),
        "TJ" => match operands.last() {
            Some(Object::Array(items)) => items.iter().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    strings.into_iter().filter_map(Object::as_string).flatten().copied().collect()
}

fn undefined_resource(name: &str, category: &str) -> ConformanceError {
    ConformanceError::new(ErrorCode::UndefinedResource)
        .with_param(name)
        .with_param(category)
}

impl PdfAChecker {
    /// Walk one content stream painted with `resources`.
    pub(crate) fn walk_content_stream(
        &self,
        session: &mut ValidationSession<'_>,
        stream: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        if let Some(r) = stream.as_reference() {
            if doc.is_flushed(r) && !session.full_check() {
                log::debug!("skipping flushed content stream {}", r);
                return Ok(());
            }
        }

        self.check_object(session, stream)?;
        let data = match doc.resolve(stream)?.decode_stream_data() {
            Ok(data) => data,
            Err(Error::UnsupportedFilter(filter)) => {
                let mut warning = ComplianceWarning::new(
                    WarningCode::UndecodableStream,
                    format!("content stream with filter {} was not inspected", filter),
                );
                if let Some(location) = session.location() {
                    warning = warning.with_location(location);
                }
                session.warn(warning);
                return Ok(());
            },
            Err(e) => return Err(e),
        };

        let operations = parse_content_stream(&data)?;
        session.stats.content_streams_checked += 1;
        log::trace!("content stream: {} operations", operations.len());

        let mut font: Option<&Dictionary> = None;
        let mut compatibility = 0usize;
        for op in &operations {
            match op {
                ContentOperation::InlineImage { dict, data, .. } => {
                    let event = ValidationEvent::InlineImage {
                        dict,
                        data: data.as_slice(),
                        resources,
                    };
                    self.check_event(session, event)?;
                },
                ContentOperation::Operator { name, operands, .. } => {
                    for operand in operands {
                        self.check_object(session, operand)?;
                    }
                    match name.as_str() {
                        "BX" => compatibility += 1,
                        "EX" => compatibility = compatibility.saturating_sub(1),
                        "Tf" => {
                            font = self.select_font(session, operands, resources)?;
                            continue;
                        },
                        _ => {},
                    }
                    self.dispatch_operator(session, name, operands, resources, font, compatibility > 0)?;
                },
            }
        }
        Ok(())
    }

    /// `Tf`: look up and check the font, which stays selected for the rest
    /// of the stream.
    fn select_font<'d: 'a, 'a>(
        &self,
        session: &mut ValidationSession<'d>,
        operands: &[Object],
        resources: Option<&'a Dictionary>,
    ) -> Result<Option<&'a Dictionary>> {
        let name = match operands.first().and_then(Object::as_name) {
            Some(name) => name,
            None => return Ok(None),
        };
        let doc = session.document();
        match lookup_resource(doc, resources, "Font", name)? {
            Some(font) => {
                self.check_font(session, font)?;
                doc.resolve_dict(font)
            },
            None => fail(undefined_resource(name, "Font")),
        }
    }

    fn dispatch_operator(
        &self,
        session: &mut ValidationSession<'_>,
        operator: &str,
        operands: &[Object],
        resources: Option<&Dictionary>,
        font: Option<&Dictionary>,
        in_compatibility_section: bool,
    ) -> Result<()> {
        let doc = session.document();
        match operator {
            "q" => self.check_event(session, ValidationEvent::CanvasStack(CanvasOp::Save)),
            "Q" => self.check_event(session, ValidationEvent::CanvasStack(CanvasOp::Restore)),
            "cs" | "sc" | "scn" | "g" | "rg" | "k" => self.check_event(
                session,
                ValidationEvent::FillColor {
                    operator,
                    operands,
                    resources,
                },
            ),
            "CS" | "SC" | "SCN" | "G" | "RG" | "K" => self.check_event(
                session,
                ValidationEvent::StrokeColor {
                    operator,
                    operands,
                    resources,
                },
            ),
            "gs" => match operands.first().and_then(Object::as_name) {
                Some(name) => match lookup_resource(doc, resources, "ExtGState", name)? {
                    Some(state) => self.check_event(session, ValidationEvent::ExtGState(state)),
                    None => fail(undefined_resource(name, "ExtGState")),
                },
                None => Ok(()),
            },
            "ri" => match operands.first().and_then(Object::as_name) {
                Some(intent) => self.check_event(session, ValidationEvent::RenderingIntent(intent)),
                None => Ok(()),
            },
            "Tj" | "TJ" | "'" | "\"" => {
                self.check_event(session, ValidationEvent::Text { font })?;
                match font {
                    Some(font) => {
                        let codes = shown_codes(operator, operands);
                        let event = ValidationEvent::FontGlyphs {
                            font,
                            codes: codes.as_slice(),
                        };
                        self.check_event(session, event)
                    },
                    None => Ok(()),
                }
            },
            "sh" => match operands.first().and_then(Object::as_name) {
                Some(name) => match lookup_resource(doc, resources, "Shading", name)? {
                    Some(shading) => self.check_shading(session, shading, resources),
                    None => fail(undefined_resource(name, "Shading")),
                },
                None => Ok(()),
            },
            "Do" => match operands.first().and_then(Object::as_name) {
                Some(name) => match lookup_resource(doc, resources, "XObject", name)? {
                    Some(xobject) => self.check_xobject(session, xobject, resources),
                    None => fail(undefined_resource(name, "XObject")),
                },
                None => Ok(()),
            },
            other if !is_known_operator(other) && !in_compatibility_section => fail(
                ConformanceError::new(ErrorCode::UndefinedOperator)
                    .with_param(other)
                    .at_location(session.location())
                    .with_clause(self.clause("6.2.10", "6.2.2")),
            ),
            _ => Ok(()),
        }
    }
}

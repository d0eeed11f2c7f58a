//! Resource dictionaries: XObjects (images, forms), patterns, shadings and
//! inline images.

use super::checker::{fail, PdfAChecker};
use super::jpx;
use super::session::ValidationSession;
use super::types::{ConformanceError, ErrorCode};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::object::{dict_name, filter_names, Dictionary, Object};

/// Look up a named resource of one category (`ColorSpace`, `Font`, ...).
///
/// The entry is returned as written, so indirect resources keep their
/// reference.
pub(crate) fn lookup_resource<'a>(
    doc: &'a PdfDocument,
    resources: Option<&'a Dictionary>,
    category: &str,
    name: &str,
) -> Result<Option<&'a Object>> {
    let resources = match resources {
        Some(resources) => resources,
        None => return Ok(None),
    };
    Ok(doc
        .get(resources, category)?
        .and_then(Object::as_dict)
        .and_then(|entries| entries.get(name)))
}

fn resource_category<'a>(doc: &'a PdfDocument, resources: &'a Dictionary, name: &str) -> Result<Option<&'a Dictionary>> {
    Ok(doc.get(resources, name)?.and_then(Object::as_dict))
}

/// Full name of an inline image filter abbreviation.
pub fn expand_filter_name(name: &str) -> &str {
    match name {
        "AHx" => "ASCIIHexDecode",
        "A85" => "ASCII85Decode",
        "LZW" => "LZWDecode",
        "Fl" => "FlateDecode",
        "RL" => "RunLengthDecode",
        "CCF" => "CCITTFaxDecode",
        "DCT" => "DCTDecode",
        other => other,
    }
}

/// Expand inline image color space abbreviations, including inside an
/// `Indexed` array.
fn expand_inline_color_space(cs: &Object) -> Object {
    match cs {
        Object::Name(name) => Object::name(match name.as_str() {
            "G" => "DeviceGray",
            "RGB" => "DeviceRGB",
            "CMYK" => "DeviceCMYK",
            "I" => "Indexed",
            other => other,
        }),
        Object::Array(items) => Object::Array(items.iter().map(expand_inline_color_space).collect()),
        other => other.clone(),
    }
}

/// Look up an inline image entry by its full or abbreviated key.
fn inline_entry<'a>(dict: &'a Dictionary, full: &str, abbreviated: &str) -> Option<&'a Object> {
    dict.get(full).or_else(|| dict.get(abbreviated))
}

impl PdfAChecker {
    /// Every entry of a resource dictionary.
    pub(crate) fn check_resources(&self, session: &mut ValidationSession<'_>, resources: Option<&Dictionary>) -> Result<()> {
        let resources = match resources {
            Some(resources) => resources,
            None => return Ok(()),
        };
        let doc = session.document();
        let category = |name: &str| resource_category(doc, resources, name);

        if let Some(spaces) = category("ColorSpace")? {
            for cs in spaces.values() {
                self.check_color_space(session, cs, Some(resources))?;
            }
        }
        if let Some(states) = category("ExtGState")? {
            for state in states.values() {
                self.check_ext_gstate(session, state)?;
            }
        }
        if let Some(shadings) = category("Shading")? {
            for shading in shadings.values() {
                self.check_shading(session, shading, Some(resources))?;
            }
        }
        if let Some(patterns) = category("Pattern")? {
            for pattern in patterns.values() {
                self.check_pattern(session, pattern, Some(resources))?;
            }
        }
        if let Some(fonts) = category("Font")? {
            for font in fonts.values() {
                self.check_font(session, font)?;
            }
        }
        if let Some(xobjects) = category("XObject")? {
            for xobject in xobjects.values() {
                self.check_xobject(session, xobject, Some(resources))?;
            }
        }
        Ok(())
    }

    /// An image, form or PostScript XObject.
    pub(crate) fn check_xobject(
        &self,
        session: &mut ValidationSession<'_>,
        xobject: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let node = xobject.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = self.check_xobject_node(session, xobject, resources);
        session.end_node(node);
        result
    }

    fn check_xobject_node(
        &self,
        session: &mut ValidationSession<'_>,
        xobject: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let resolved = session.document().resolve(xobject)?;
        let dict = match resolved {
            Object::Stream { dict, .. } => dict,
            _ => return Ok(()),
        };
        match dict_name(dict, "Subtype") {
            Some("Image") => self.check_image(session, resolved, dict, resources),
            Some("Form") => self.check_form(session, xobject, dict, resources),
            Some("PS") => fail(ConformanceError::new(ErrorCode::PostScriptNotAllowed).with_clause(self.clause("6.2.7", "6.2.9"))),
            _ => Ok(()),
        }
    }

    fn check_image(
        &self,
        session: &mut ValidationSession<'_>,
        image: &Object,
        dict: &Dictionary,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        for key in ["Alternates", "OPI"] {
            if dict.contains_key(key) {
                return fail(
                    ConformanceError::new(ErrorCode::ImageEntryNotAllowed)
                        .with_param(key)
                        .with_clause(self.clause("6.2.4", "6.2.8")),
                );
            }
        }
        if doc.get(dict, "Interpolate")?.and_then(Object::as_bool) == Some(true) {
            return fail(ConformanceError::new(ErrorCode::ImageInterpolation).with_clause(self.clause("6.2.4", "6.2.8")));
        }

        let has_smask = doc.get(dict, "SMask")?.is_some_and(|m| m.as_name() != Some("None"));
        let smask_in_data = doc.get(dict, "SMaskInData")?.and_then(Object::as_integer).unwrap_or(0) > 0;
        if has_smask || smask_in_data {
            self.note_transparency(session, "image soft mask")?;
        }

        let is_mask = doc.get(dict, "ImageMask")?.and_then(Object::as_bool) == Some(true);
        if !is_mask {
            if let Some(cs) = dict.get("ColorSpace") {
                self.check_color_space(session, cs, resources)?;
            }
        }
        if let Some(intent) = doc.get(dict, "Intent")?.and_then(Object::as_name) {
            self.check_rendering_intent(intent)?;
        }

        let filters = match dict.get("Filter") {
            Some(filter) => filter_names(doc.resolve(filter)?),
            None => Vec::new(),
        };
        if self.policy().check_jpx && filters.iter().any(|f| f == "JPXDecode") {
            let data = image.stream_data().unwrap_or_default();
            let checked = jpx::inspect(data).and_then(|info| match info {
                Some(info) => jpx::validate(&info),
                None => Ok(()),
            });
            if let Err(reason) = checked {
                return fail(ConformanceError::new(ErrorCode::InvalidJpx).with_param(reason));
            }
        }

        self.check_object(session, image)?;
        session.stats.images_checked += 1;
        Ok(())
    }

    pub(crate) fn check_form(
        &self,
        session: &mut ValidationSession<'_>,
        form: &Object,
        dict: &Dictionary,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        if dict.contains_key("Ref") {
            return fail(ConformanceError::new(ErrorCode::ReferenceXObjectNotAllowed).with_clause(self.clause("6.2.6", "6.2.9")));
        }
        if dict.contains_key("PS") || dict_name(dict, "Subtype2") == Some("PS") {
            return fail(ConformanceError::new(ErrorCode::PostScriptNotAllowed).with_clause(self.clause("6.2.5", "6.2.9")));
        }
        if dict.contains_key("OPI") {
            return fail(ConformanceError::new(ErrorCode::ImageEntryNotAllowed).with_param("OPI"));
        }

        if let Some(group) = doc.get(dict, "Group")?.and_then(Object::as_dict) {
            if dict_name(group, "S") == Some("Transparency") {
                self.note_transparency(session, "transparency group")?;
            }
            if let Some(cs) = group.get("CS") {
                self.check_color_space(session, cs, resources)?;
            }
        }

        let own = match dict.get("Resources") {
            Some(res) => doc.resolve_dict(res)?,
            None => None,
        };
        let form_resources = own.or(resources);

        session.descend()?;
        let result = self
            .check_resources(session, own)
            .and_then(|_| self.walk_content_stream(session, form, form_resources));
        session.ascend();
        result
    }

    /// A tiling pattern (walked like a form) or a shading pattern.
    pub(crate) fn check_pattern(
        &self,
        session: &mut ValidationSession<'_>,
        pattern: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let node = pattern.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = self.check_pattern_node(session, pattern, resources);
        session.end_node(node);
        result
    }

    fn check_pattern_node(
        &self,
        session: &mut ValidationSession<'_>,
        pattern: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        let resolved = doc.resolve(pattern)?;
        let dict = match resolved.as_dict() {
            Some(dict) => dict,
            None => return Ok(()),
        };

        if resolved.is_stream() {
            let own = match dict.get("Resources") {
                Some(res) => doc.resolve_dict(res)?,
                None => None,
            };
            session.descend()?;
            let result = self
                .check_resources(session, own)
                .and_then(|_| self.walk_content_stream(session, pattern, own.or(resources)));
            session.ascend();
            return result;
        }

        if let Some(shading) = dict.get("Shading") {
            self.check_shading(session, shading, resources)?;
        }
        if let Some(state) = dict.get("ExtGState") {
            self.check_ext_gstate(session, state)?;
        }
        Ok(())
    }

    /// A shading dictionary or stream.
    pub(crate) fn check_shading(
        &self,
        session: &mut ValidationSession<'_>,
        shading: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let node = shading.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = match session.document().resolve_dict(shading) {
            Ok(Some(dict)) => match dict.get("ColorSpace") {
                Some(cs) => self.check_color_space(session, cs, resources),
                None => Ok(()),
            },
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        session.end_node(node);
        result
    }

    /// An inline image (`BI` ... `ID` ... `EI`).
    pub(crate) fn check_inline_image(
        &self,
        session: &mut ValidationSession<'_>,
        dict: &Dictionary,
        data: &[u8],
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        log::trace!("inline image with {} entries, {} bytes", dict.len(), data.len());

        if let Some(filter) = inline_entry(dict, "Filter", "F") {
            for name in filter_names(filter) {
                let full = expand_filter_name(&name);
                if self.policy().forbidden_inline_filters.contains(full) {
                    return fail(
                        ConformanceError::new(ErrorCode::InlineImageFilterNotAllowed)
                            .with_param(full)
                            .with_clause(self.clause("6.1.10", "6.1.7.2")),
                    );
                }
            }
        }
        if inline_entry(dict, "Interpolate", "I").and_then(Object::as_bool) == Some(true) {
            return fail(ConformanceError::new(ErrorCode::ImageInterpolation).with_clause(self.clause("6.2.4", "6.2.8")));
        }

        let is_mask = inline_entry(dict, "ImageMask", "IM").and_then(Object::as_bool) == Some(true);
        if !is_mask {
            if let Some(cs) = inline_entry(dict, "ColorSpace", "CS") {
                let cs = expand_inline_color_space(cs);
                self.check_color_space(session, &cs, resources)?;
            }
        }
        if let Some(intent) = inline_entry(dict, "Intent", "Intent").and_then(Object::as_name) {
            self.check_rendering_intent(intent)?;
        }

        for value in dict.values() {
            self.check_object(session, value)?;
        }
        session.stats.images_checked += 1;
        Ok(())
    }
}

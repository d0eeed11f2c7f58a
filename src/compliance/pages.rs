//! Page checks: page dictionary entries, page boundaries, resources,
//! annotations, content streams and the page's transparency and color usage.

use super::checker::{fail, PdfAChecker};
use super::color::{OutputIntentColor, UsageKinds};
use super::colorspaces::read_output_intent;
use super::events::ValidationEvent;
use super::policy::TransparencyRule;
use super::session::{BlendingSpace, OutputIntent, ValidationSession};
use super::types::{ConformanceError, ErrorCode};
use crate::document::Page;
use crate::error::Result;
use crate::object::{dict_name, Dictionary, Object, ObjectRef};

/// The ICC profile of a `[/ICCBased stream]` color space, with its `N`.
fn icc_blending_space(session: &ValidationSession<'_>, cs: &Object) -> Result<Option<BlendingSpace>> {
    let doc = session.document();
    let items = match doc.resolve(cs)? {
        Object::Array(items) if items.len() == 2 && items[0].as_name() == Some("ICCBased") => items,
        _ => return Ok(None),
    };
    let stream = doc.resolve(&items[1])?;
    let components = stream
        .as_dict()
        .and_then(|d| d.get("N"))
        .and_then(Object::as_integer)
        .and_then(|n| u32::try_from(n).ok());
    match components {
        Some(components @ (3 | 4)) if stream.is_stream() => Ok(Some(BlendingSpace {
            components,
            profile: stream.decode_stream_data()?,
        })),
        _ => Ok(None),
    }
}

impl PdfAChecker {
    /// One page, from its dictionary entries down to its content streams.
    pub(crate) fn check_page(&self, session: &mut ValidationSession<'_>, page: &Page<'_>) -> Result<()> {
        let doc = session.document();
        log::debug!("Checking page {}", page.index() + 1);

        session.usage.begin_page(page.obj_ref);
        session.gs_depth = 0;
        session.current_page = Some((page.index(), page.obj_ref));

        if self.policy().page_output_intents {
            let intents = page.dict.get("OutputIntents");
            session.page_intent = read_output_intent(doc, intents)?;
            self.check_output_intents(session, intents)?;
        }

        self.check_event(
            session,
            ValidationEvent::PageObject {
                page_ref: page.obj_ref,
                dict: page.dict,
            },
        )?;
        if let Some(media_box) = page.media_box() {
            self.check_page_size(media_box)?;
        }

        let resources = page.resources();
        self.check_resources(session, resources)?;

        for (annot_ref, annot) in page.annotations(doc)? {
            self.check_annotation(session, annot_ref, annot, resources)?;
        }

        for (stream_ref, stream) in page.content_streams(doc)? {
            // Walk through the reference so flushed streams are recognised.
            let reference = stream_ref.map(Object::Reference);
            let stream = reference.as_ref().unwrap_or(stream);
            self.check_event(session, ValidationEvent::ContentStreamObject { stream, resources })?;
        }

        self.check_page_transparency(session, page)?;

        if self.policy().page_scope_color_usage {
            let usage = session.usage.page(page.obj_ref).cloned().unwrap_or_default();
            self.finalize_color_usage(session, &usage)?;
        }

        session.usage.end_page();
        session.page_intent = OutputIntent::default();
        session.page_blending = None;
        session.current_page = None;
        session.stats.pages_checked += 1;
        Ok(())
    }

    /// Entries of a page dictionary and its transparency group.
    pub(crate) fn check_page_object(
        &self,
        session: &mut ValidationSession<'_>,
        page_ref: ObjectRef,
        dict: &Dictionary,
    ) -> Result<()> {
        let doc = session.document();
        for &key in &self.policy().forbidden_page_entries {
            if dict.contains_key(key) {
                return fail(
                    ConformanceError::new(ErrorCode::ForbiddenPageEntry)
                        .with_param(key)
                        .with_location(session.location().unwrap_or_else(|| format!("object {}", page_ref)))
                        .with_clause(self.clause("6.6.2", "6.10")),
                );
            }
        }

        if let Some(group) = doc.get(dict, "Group")?.and_then(Object::as_dict) {
            if dict_name(group, "S") == Some("Transparency") {
                self.note_transparency(session, "page transparency group")?;
            }
            if let Some(cs) = group.get("CS") {
                self.check_color_space(session, cs, None)?;
                session.page_blending = icc_blending_space(session, cs)?;
            }
        }
        Ok(())
    }

    /// Width and height of the media box within the implementation limits.
    fn check_page_size(&self, media_box: [f64; 4]) -> Result<()> {
        let (min, max) = match self.policy().limits.page_size {
            Some(bounds) => bounds,
            None => return Ok(()),
        };
        let width = (media_box[2] - media_box[0]).abs();
        let height = (media_box[3] - media_box[1]).abs();
        if width < min || width > max || height < min || height > max {
            return fail(
                ConformanceError::new(ErrorCode::PageSizeOutOfRange)
                    .with_param(width)
                    .with_param(height)
                    .with_param(min)
                    .with_param(max)
                    .with_clause(self.clause("6.1.12", "6.1.13")),
            );
        }
        Ok(())
    }

    /// A page that uses transparency needs a color space to blend in.
    fn check_page_transparency(&self, session: &ValidationSession<'_>, page: &Page<'_>) -> Result<()> {
        let uses_transparency = session
            .usage
            .page(page.obj_ref)
            .is_some_and(|usage| usage.kinds().contains(UsageKinds::TRANSPARENCY));
        if !uses_transparency {
            return Ok(());
        }

        let doc = session.document();
        let group_cs = doc
            .get(page.dict, "Group")?
            .and_then(Object::as_dict)
            .is_some_and(|group| group.contains_key("CS"));
        let document_intent = session.output_intent.color.is_some();
        let page_intent = session.page_intent.color.is_some();

        let justified = match self.policy().transparency {
            // Rejected as soon as it was recorded.
            TransparencyRule::Forbidden => true,
            TransparencyRule::NeedsIntentOrGroupSpace => document_intent || group_cs,
            TransparencyRule::NeedsIntentOrBlendingSpace => {
                document_intent || page_intent || session.page_blending.is_some()
            },
        };
        if !justified {
            return fail(
                ConformanceError::new(ErrorCode::TransparencyWithoutBlendingSpace)
                    .at_location(session.location())
                    .with_clause(self.clause("6.4", "6.2.10")),
            );
        }

        if self.policy().forbid_intent_as_cmyk_blending_profile {
            if let Some(blending) = session.page_blending.as_ref().filter(|b| b.components == 4) {
                let matches_intent = [&session.page_intent, &session.output_intent]
                    .into_iter()
                    .filter(|intent| intent.color == OutputIntentColor::Cmyk)
                    .any(|intent| intent.profile.as_ref() == Some(&blending.profile));
                if matches_intent {
                    return fail(
                        ConformanceError::new(ErrorCode::BlendingProfileMatchesIntent)
                            .at_location(session.location())
                            .with_clause(self.clause("6.4", "6.2.10")),
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::icc::test_profile;
    use crate::compliance::testing::{code_of, dict, dict_obj, document_with_page};
    use crate::compliance::types::{PdfALevel, ValidationStats};
    use crate::document::PdfDocument;

    fn contents(data: &[u8]) -> Object {
        Object::stream(Dictionary::new(), data.to_vec())
    }

    fn check_pages(level: PdfALevel, doc: &PdfDocument) -> Result<ValidationStats> {
        let checker = PdfAChecker::new(level);
        let mut session = checker.new_session(doc);
        for page in doc.pages()? {
            checker.check_page(&mut session, &page)?;
        }
        Ok(session.stats().clone())
    }

    fn icc_group(cs: &[u8; 4], n: i64) -> Object {
        let profile = Object::stream(dict(vec![("N", Object::Integer(n))]), test_profile(cs, 4));
        dict_obj(vec![
            ("S", Object::name("Transparency")),
            ("CS", Object::Array(vec![Object::name("ICCBased"), profile])),
        ])
    }

    #[test]
    fn test_page_walk_counts() {
        let annot = dict_obj(vec![
            ("Subtype", Object::name("Link")),
            ("F", Object::Integer(4)),
            ("Rect", Object::Array(vec![Object::Integer(0); 4])),
        ]);
        let doc = document_with_page(
            Vec::new(),
            vec![
                ("Contents", Object::Array(vec![contents(b"q Q"), contents(b"0 0 m")])),
                ("Annots", Object::Array(vec![annot])),
            ],
        );
        let stats = check_pages(PdfALevel::A1b, &doc).unwrap();
        assert_eq!(stats.pages_checked, 1);
        assert_eq!(stats.content_streams_checked, 2);
        assert_eq!(stats.annotations_checked, 1);
    }

    #[test]
    fn test_forbidden_page_entries() {
        let doc = document_with_page(Vec::new(), vec![("AA", dict_obj(Vec::new()))]);
        let err = check_pages(PdfALevel::A1b, &doc).unwrap_err();
        let err = err.as_conformance().unwrap();
        assert_eq!(err.code, ErrorCode::ForbiddenPageEntry);
        assert_eq!(err.location.as_deref(), Some("page 1"));

        let doc = document_with_page(Vec::new(), vec![("PresSteps", dict_obj(Vec::new()))]);
        assert!(check_pages(PdfALevel::A1b, &doc).is_ok());
        assert_eq!(code_of(check_pages(PdfALevel::A2b, &doc)), Some(ErrorCode::ForbiddenPageEntry));
    }

    #[test]
    fn test_page_size_bounds() {
        let tiny = Object::Array(vec![Object::Integer(0), Object::Integer(0), Object::Integer(2), Object::Integer(2)]);
        let doc = document_with_page(Vec::new(), vec![("MediaBox", tiny)]);
        let err = check_pages(PdfALevel::A2b, &doc).unwrap_err();
        assert_eq!(err.as_conformance().unwrap().message(), "page size 2 x 2 is outside the range 3 to 14400 units");
        assert!(check_pages(PdfALevel::A4, &doc).is_ok());
    }

    #[test]
    fn test_transparent_page_needs_blending_space() {
        let faded = dict(vec![("ExtGState", dict_obj(vec![("GS0", dict_obj(vec![("ca", Object::Real(0.5))]))]))]);
        let doc = document_with_page(
            Vec::new(),
            vec![("Resources", Object::Dictionary(faded)), ("Contents", contents(b"/GS0 gs"))],
        );
        assert_eq!(code_of(check_pages(PdfALevel::A1b, &doc)), Some(ErrorCode::TransparencyNotAllowed));
        assert_eq!(code_of(check_pages(PdfALevel::A2b, &doc)), Some(ErrorCode::TransparencyWithoutBlendingSpace));
        assert_eq!(code_of(check_pages(PdfALevel::A4, &doc)), Some(ErrorCode::TransparencyWithoutBlendingSpace));
    }

    #[test]
    fn test_group_color_space_justifies_transparency() {
        let doc = document_with_page(Vec::new(), vec![("Group", icc_group(b"RGB ", 3)), ("Contents", contents(b""))]);
        assert!(check_pages(PdfALevel::A2b, &doc).is_ok());
        assert!(check_pages(PdfALevel::A4, &doc).is_ok());
    }

    #[test]
    fn test_blending_space_justifies_device_color_in_part_4() {
        let doc = document_with_page(
            Vec::new(),
            vec![("Group", icc_group(b"CMYK", 4)), ("Contents", contents(b"0 0 0 1 k"))],
        );
        assert!(check_pages(PdfALevel::A4, &doc).is_ok());

        let doc = document_with_page(
            Vec::new(),
            vec![("Group", icc_group(b"CMYK", 4)), ("Contents", contents(b"1 0 0 rg"))],
        );
        let err = check_pages(PdfALevel::A4, &doc).unwrap_err();
        let err = err.as_conformance().unwrap();
        assert_eq!(err.code, ErrorCode::DeviceRgbWithoutProfile);
        assert_eq!(err.location.as_deref(), Some("page 1"));
    }

    #[test]
    fn test_page_output_intent_in_part_4() {
        let profile = Object::stream(dict(vec![("N", Object::Integer(3))]), test_profile(b"RGB ", 4));
        let intent = dict_obj(vec![
            ("S", Object::name("GTS_PDFA1")),
            ("DestOutputProfile", profile),
        ]);
        let doc = document_with_page(
            Vec::new(),
            vec![("OutputIntents", Object::Array(vec![intent])), ("Contents", contents(b"1 0 0 rg"))],
        );
        assert!(check_pages(PdfALevel::A4, &doc).is_ok());
    }

    fn intent_entry(data: Vec<u8>, n: i64) -> Object {
        dict_obj(vec![
            ("S", Object::name("GTS_PDFA1")),
            ("DestOutputProfile", Object::stream(dict(vec![("N", Object::Integer(n))]), data)),
        ])
    }

    fn group_with_profile(data: Vec<u8>, n: i64) -> Object {
        dict_obj(vec![
            ("S", Object::name("Transparency")),
            (
                "CS",
                Object::Array(vec![
                    Object::name("ICCBased"),
                    Object::stream(dict(vec![("N", Object::Integer(n))]), data),
                ]),
            ),
        ])
    }

    fn check_pages_with_intent(level: PdfALevel, doc: &PdfDocument, intent: OutputIntent) -> Result<()> {
        let checker = PdfAChecker::new(level);
        let mut session = checker.new_session(doc);
        session.output_intent = intent;
        for page in doc.pages()? {
            checker.check_page(&mut session, &page)?;
        }
        Ok(())
    }

    #[test]
    fn test_blending_profile_equal_to_intent() {
        let cmyk = test_profile(b"CMYK", 4);
        let doc = document_with_page(
            Vec::new(),
            vec![
                ("OutputIntents", Object::Array(vec![intent_entry(cmyk.clone(), 4)])),
                ("Group", group_with_profile(cmyk, 4)),
                ("Contents", contents(b"")),
            ],
        );
        assert_eq!(code_of(check_pages(PdfALevel::A4, &doc)), Some(ErrorCode::BlendingProfileMatchesIntent));
        assert!(check_pages(PdfALevel::A3b, &doc).is_ok());

        // Three-channel blending spaces may reuse the intent profile.
        let rgb = test_profile(b"RGB ", 4);
        let doc = document_with_page(
            Vec::new(),
            vec![
                ("OutputIntents", Object::Array(vec![intent_entry(rgb.clone(), 3)])),
                ("Group", group_with_profile(rgb, 3)),
                ("Contents", contents(b"")),
            ],
        );
        assert!(check_pages(PdfALevel::A4, &doc).is_ok());
    }

    #[test]
    fn test_blending_profile_equal_to_document_intent_under_page_intent() {
        let cmyk = test_profile(b"CMYK", 4);
        let document_intent = OutputIntent {
            color: OutputIntentColor::Cmyk,
            profile: Some(cmyk.clone()),
        };
        let doc = document_with_page(
            Vec::new(),
            vec![
                ("OutputIntents", Object::Array(vec![intent_entry(test_profile(b"RGB ", 4), 3)])),
                ("Group", group_with_profile(cmyk, 4)),
                ("Contents", contents(b"")),
            ],
        );
        let err = check_pages_with_intent(PdfALevel::A4, &doc, document_intent.clone()).unwrap_err();
        let err = err.as_conformance().unwrap();
        assert_eq!(err.code, ErrorCode::BlendingProfileMatchesIntent);
        assert_eq!(err.location.as_deref(), Some("page 1"));

        let other = OutputIntent {
            color: OutputIntentColor::Cmyk,
            profile: Some(test_profile(b"CMYK", 2)),
        };
        assert!(check_pages_with_intent(PdfALevel::A4, &doc, other).is_ok());
    }
}

//! Document-level checks: catalog, trailer, version, logical structure,
//! interactive forms, outlines, open action and signatures.

use super::checker::{fail, PdfAChecker};
use super::events::ValidationEvent;
use super::session::ValidationSession;
use super::types::{ComplianceWarning, ConformanceError, ErrorCode, WarningCode};
use crate::error::Result;
use crate::object::{dict_name, Dictionary, Object, ObjectRef};
use std::collections::HashSet;

/// Signature SubFilters that identify CAdES-based signatures and time stamps.
const CADES_SUB_FILTERS: [&str; 2] = ["ETSI.CAdES.detached", "ETSI.RFC3161"];

impl PdfAChecker {
    /// Catalog entries, name trees, optional content and language.
    pub(crate) fn check_catalog(&self, session: &mut ValidationSession<'_>, catalog: &Dictionary) -> Result<()> {
        let doc = session.document();

        for &key in &self.policy().forbidden_catalog_entries {
            if catalog.contains_key(key) {
                return fail(
                    ConformanceError::new(ErrorCode::ForbiddenCatalogEntry)
                        .with_param(key)
                        .with_clause(self.clause("6.1.13", "6.1.2")),
                );
            }
        }
        if doc.get(catalog, "NeedsRendering")?.and_then(Object::as_bool) == Some(true) {
            return fail(ConformanceError::new(ErrorCode::ForbiddenCatalogEntry).with_param("NeedsRendering"));
        }

        if let Some(names) = doc.get(catalog, "Names")?.and_then(Object::as_dict) {
            for &tree in &self.policy().forbidden_name_trees {
                if names.contains_key(tree) {
                    return fail(ConformanceError::new(ErrorCode::ForbiddenNameTree).with_param(tree));
                }
            }
        }

        if self.policy().check_optional_content {
            if let Some(properties) = doc.get(catalog, "OCProperties")?.and_then(Object::as_dict) {
                self.check_optional_content(session, properties)?;
            }
        }

        if !catalog.contains_key("Lang") {
            session.warn(ComplianceWarning::new(
                WarningCode::MissingLanguage,
                "document catalog has no Lang entry",
            ));
        }
        Ok(())
    }

    fn check_optional_content(&self, session: &ValidationSession<'_>, properties: &Dictionary) -> Result<()> {
        let doc = session.document();
        let mut configs = Vec::new();
        if let Some(default) = doc.get(properties, "D")?.and_then(Object::as_dict) {
            configs.push(default);
        }
        if let Some(Object::Array(items)) = doc.get(properties, "Configs")? {
            for item in items {
                if let Some(config) = doc.resolve_dict(item)? {
                    configs.push(config);
                }
            }
        }

        for config in configs {
            if !config.contains_key("Name") {
                return fail(
                    ConformanceError::new(ErrorCode::OptionalContentConfigName).with_clause(self.clause("6.1.13", "6.9")),
                );
            }
            if config.contains_key("AS") {
                return fail(
                    ConformanceError::new(ErrorCode::OptionalContentAutoState).with_clause(self.clause("6.1.13", "6.9")),
                );
            }
        }
        Ok(())
    }

    /// Trailer entries, then the cross-reference table.
    pub(crate) fn check_trailer(&self, session: &mut ValidationSession<'_>) -> Result<()> {
        let doc = session.document();
        let trailer = doc.trailer();

        if !trailer.contains_key("ID") {
            return fail(ConformanceError::new(ErrorCode::MissingTrailerId).with_clause(self.clause("6.1.3", "6.1.3")));
        }
        if let Some(encrypt) = doc.get(trailer, "Encrypt")?.and_then(Object::as_dict) {
            self.check_event(session, ValidationEvent::Crypto(encrypt))?;
        }
        if let Some(allowed) = &self.policy().info_allowed_keys {
            if let Some(info) = doc.get(trailer, "Info")?.and_then(Object::as_dict) {
                if let Some(key) = info.keys().find(|k| !allowed.contains(k.as_str())) {
                    return fail(ConformanceError::new(ErrorCode::InfoDictionaryKeyForbidden).with_param(key));
                }
            }
        }

        self.check_event(session, ValidationEvent::XrefTable)
    }

    /// Effective PDF version: the header version, raised by the catalog
    /// `Version` entry.
    pub(crate) fn check_version(&self, session: &ValidationSession<'_>, catalog: &Dictionary) -> Result<()> {
        let doc = session.document();
        let mut version = doc.version();
        if let Some(declared) = doc.get(catalog, "Version")?.and_then(Object::as_name) {
            if let Some(parsed) = parse_version(declared) {
                version = version.max(parsed);
            }
        }
        let required = self.policy().required_major_version;
        if version.0 != required {
            return fail(
                ConformanceError::new(ErrorCode::InvalidHeaderVersion)
                    .with_param(format!("{}.{}", version.0, version.1))
                    .with_param(required)
                    .with_clause(self.clause("6.1.2", "6.1.2")),
            );
        }
        Ok(())
    }

    /// Mark information and structure tree (level A).
    pub(crate) fn check_structure(&self, session: &ValidationSession<'_>, catalog: &Dictionary) -> Result<()> {
        if !self.policy().require_structure {
            return Ok(());
        }
        let doc = session.document();
        let marked = doc
            .get(catalog, "MarkInfo")?
            .and_then(Object::as_dict)
            .and_then(|mark_info| mark_info.get("Marked"))
            .and_then(Object::as_bool)
            .unwrap_or(false);
        if !marked {
            return fail(ConformanceError::new(ErrorCode::MissingMarkInfo).with_clause(self.clause("6.8.2.2", "6.7.2.2")));
        }
        if doc.get(catalog, "StructTreeRoot")?.and_then(Object::as_dict).is_none() {
            return fail(ConformanceError::new(ErrorCode::MissingStructTreeRoot).with_clause(self.clause("6.8.3.3", "6.7.3.3")));
        }
        Ok(())
    }

    /// Interactive form dictionary and its field tree.
    pub(crate) fn check_acro_form(&self, session: &mut ValidationSession<'_>, catalog: &Dictionary) -> Result<()> {
        let doc = session.document();
        let form = match doc.get(catalog, "AcroForm")?.and_then(Object::as_dict) {
            Some(form) => form,
            None => return Ok(()),
        };

        if doc.get(form, "NeedAppearances")?.and_then(Object::as_bool) == Some(true) {
            return fail(
                ConformanceError::new(ErrorCode::ForbiddenFormEntry)
                    .with_param("NeedAppearances set to true")
                    .with_clause(self.clause("6.9", "6.4.1")),
            );
        }
        if form.contains_key("XFA") {
            return fail(ConformanceError::new(ErrorCode::ForbiddenFormEntry).with_param("XFA"));
        }

        let mut pending: Vec<&Object> = match doc.get(form, "Fields")? {
            Some(Object::Array(fields)) => fields.iter().rev().collect(),
            _ => return Ok(()),
        };
        let mut visited: HashSet<ObjectRef> = HashSet::new();
        while let Some(field_obj) = pending.pop() {
            if let Some(r) = field_obj.as_reference() {
                if !visited.insert(r) {
                    continue;
                }
            }
            let field = match doc.resolve_dict(field_obj)? {
                Some(field) => field,
                None => continue,
            };
            self.check_field(session, field)?;
            if let Some(Object::Array(kids)) = doc.get(field, "Kids")? {
                pending.extend(kids.iter().rev());
            }
        }
        Ok(())
    }

    fn check_field(&self, session: &mut ValidationSession<'_>, field: &Dictionary) -> Result<()> {
        let doc = session.document();
        if self.policy().forbid_widget_additional_actions && field.contains_key("AA") {
            return fail(
                ConformanceError::new(ErrorCode::WidgetAdditionalActions).with_clause(self.clause("6.6.2", "6.4.1")),
            );
        }
        if let Some(action) = field.get("A") {
            if self.policy().forbid_widget_action {
                return fail(ConformanceError::new(ErrorCode::WidgetAction).with_clause(self.clause("6.6.1", "6.4.1")));
            }
            self.check_action(session, action)?;
        }

        if dict_name(field, "FT") == Some("Sig") {
            if let Some(signature) = doc.get(field, "V")?.and_then(Object::as_dict) {
                self.check_event(session, ValidationEvent::Signature(signature))?;
                if let Some(sub_filter) = dict_name(signature, "SubFilter") {
                    self.check_event(session, ValidationEvent::SignatureType(sub_filter))?;
                }
            }
        }
        Ok(())
    }

    /// Outline items: each item's action, following `First` and `Next`.
    pub(crate) fn check_outlines(&self, session: &mut ValidationSession<'_>, catalog: &Dictionary) -> Result<()> {
        let doc = session.document();
        let root = match doc.get(catalog, "Outlines")?.and_then(Object::as_dict) {
            Some(root) => root,
            None => return Ok(()),
        };

        let mut pending: Vec<&Object> = root.get("First").into_iter().collect();
        let mut visited: HashSet<ObjectRef> = HashSet::new();
        while let Some(item_obj) = pending.pop() {
            if let Some(r) = item_obj.as_reference() {
                if !visited.insert(r) {
                    continue;
                }
            }
            let item = match doc.resolve_dict(item_obj)? {
                Some(item) => item,
                None => continue,
            };
            if let Some(action) = item.get("A") {
                self.check_action(session, action)?;
            }
            pending.extend(item.get("Next"));
            pending.extend(item.get("First"));
        }
        Ok(())
    }

    /// `OpenAction`: a dictionary is an action, an array a destination.
    pub(crate) fn check_open_action(&self, session: &mut ValidationSession<'_>, action: &Object) -> Result<()> {
        match session.document().resolve(action)? {
            Object::Dictionary(_) => self.check_action(session, action),
            _ => Ok(()),
        }
    }

    /// Signature dictionary entries.
    pub(crate) fn check_signature(&self, session: &ValidationSession<'_>, signature: &Dictionary) -> Result<()> {
        if !self.policy().check_signatures {
            return Ok(());
        }
        let doc = session.document();

        let byte_range_ok = match doc.get(signature, "ByteRange")? {
            Some(Object::Array(items)) => {
                items.len() == 4
                    && items.iter().all(|v| v.as_integer().is_some())
                    && items[0].as_integer() == Some(0)
            },
            _ => false,
        };
        if !byte_range_ok {
            return fail(ConformanceError::new(ErrorCode::InvalidByteRange).with_clause(self.clause("6.1.12", "6.4.3")));
        }
        if signature.contains_key("Reference") {
            return fail(ConformanceError::new(ErrorCode::SignatureReferenceNotAllowed));
        }
        if let Some(sub_filter) = dict_name(signature, "SubFilter") {
            if !self.policy().allowed_sub_filters.contains(sub_filter) {
                return fail(ConformanceError::new(ErrorCode::SignatureSubFilterNotAllowed).with_param(sub_filter));
            }
        }
        Ok(())
    }

    /// Signature type named by a SubFilter.
    pub(crate) fn check_signature_type(&self, sub_filter: &str) -> Result<()> {
        if self.policy().require_cades && !CADES_SUB_FILTERS.contains(&sub_filter) {
            return fail(ConformanceError::new(ErrorCode::SignatureTypeNotAllowed).with_param(sub_filter));
        }
        Ok(())
    }
}

/// Parse a `major.minor` version name.
fn parse_version(name: &str) -> Option<(u8, u8)> {
    let (major, minor) = name.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::testing::{code_of, dict, dict_obj, document_with_catalog};
    use crate::compliance::types::PdfALevel;

    fn run(level: PdfALevel, doc: &crate::document::PdfDocument, f: impl Fn(&PdfAChecker, &mut ValidationSession<'_>, &Dictionary) -> Result<()>) -> Result<()> {
        let checker = PdfAChecker::new(level);
        let mut session = checker.new_session(doc);
        let catalog = doc.catalog()?;
        f(&checker, &mut session, catalog)
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.7"), Some((1, 7)));
        assert_eq!(parse_version("2.0"), Some((2, 0)));
        assert_eq!(parse_version("x"), None);
    }

    #[test]
    fn test_forbidden_catalog_entries() {
        let doc = document_with_catalog(vec![("AA", dict_obj(vec![]))]);
        assert_eq!(
            code_of(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_catalog(s, cat))),
            Some(ErrorCode::ForbiddenCatalogEntry)
        );

        let doc = document_with_catalog(vec![("OCProperties", dict_obj(vec![]))]);
        assert_eq!(
            code_of(run(PdfALevel::A1b, &doc, |c, s, cat| c.check_catalog(s, cat))),
            Some(ErrorCode::ForbiddenCatalogEntry)
        );
        assert!(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_catalog(s, cat)).is_ok());
    }

    #[test]
    fn test_embedded_files_name_tree_in_part_one() {
        let names = dict_obj(vec![("EmbeddedFiles", dict_obj(vec![]))]);
        let doc = document_with_catalog(vec![("Names", names)]);
        assert_eq!(
            code_of(run(PdfALevel::A1b, &doc, |c, s, cat| c.check_catalog(s, cat))),
            Some(ErrorCode::ForbiddenNameTree)
        );
        assert!(run(PdfALevel::A3b, &doc, |c, s, cat| c.check_catalog(s, cat)).is_ok());
    }

    #[test]
    fn test_optional_content_configurations() {
        let unnamed = dict_obj(vec![("Order", Object::Array(vec![]))]);
        let doc = document_with_catalog(vec![("OCProperties", dict_obj(vec![("D", unnamed)]))]);
        assert_eq!(
            code_of(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_catalog(s, cat))),
            Some(ErrorCode::OptionalContentConfigName)
        );

        let auto_state = dict_obj(vec![("Name", Object::string("View")), ("AS", Object::Array(vec![]))]);
        let properties = dict_obj(vec![
            ("D", dict_obj(vec![("Name", Object::string("Default"))])),
            ("Configs", Object::Array(vec![auto_state])),
        ]);
        let doc = document_with_catalog(vec![("OCProperties", properties)]);
        assert_eq!(
            code_of(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_catalog(s, cat))),
            Some(ErrorCode::OptionalContentAutoState)
        );
    }

    #[test]
    fn test_missing_language_is_a_warning() {
        let doc = document_with_catalog(vec![]);
        let checker = PdfAChecker::new(PdfALevel::A2b);
        let mut session = checker.new_session(&doc);
        checker.check_catalog(&mut session, doc.catalog().unwrap()).unwrap();
        assert_eq!(session.warnings()[0].code, WarningCode::MissingLanguage);
    }

    #[test]
    fn test_trailer_requires_id() {
        let mut doc = document_with_catalog(vec![]);
        doc.trailer_mut().shift_remove("ID");
        assert_eq!(
            code_of(run(PdfALevel::A1b, &doc, |c, s, _| c.check_trailer(s))),
            Some(ErrorCode::MissingTrailerId)
        );
    }

    #[test]
    fn test_encryption_rejected() {
        let mut doc = document_with_catalog(vec![]);
        doc.trailer_mut().insert("Encrypt".to_string(), dict_obj(vec![("Filter", Object::name("Standard"))]));
        assert_eq!(
            code_of(run(PdfALevel::A2u, &doc, |c, s, _| c.check_trailer(s))),
            Some(ErrorCode::EncryptionNotAllowed)
        );
    }

    #[test]
    fn test_info_dictionary_in_part_four() {
        let mut doc = document_with_catalog(vec![("Version", Object::name("2.0"))]);
        doc.trailer_mut().insert(
            "Info".to_string(),
            dict_obj(vec![("ModDate", Object::string("D:20240101")), ("Title", Object::string("x"))]),
        );
        assert_eq!(
            code_of(run(PdfALevel::A4, &doc, |c, s, _| c.check_trailer(s))),
            Some(ErrorCode::InfoDictionaryKeyForbidden)
        );
        assert!(run(PdfALevel::A2b, &doc, |c, s, _| c.check_trailer(s)).is_ok());
    }

    #[test]
    fn test_version_rules() {
        let doc = document_with_catalog(vec![]);
        assert!(run(PdfALevel::A1b, &doc, |c, s, cat| c.check_version(s, cat)).is_ok());
        assert_eq!(
            code_of(run(PdfALevel::A4, &doc, |c, s, cat| c.check_version(s, cat))),
            Some(ErrorCode::InvalidHeaderVersion)
        );

        let doc = document_with_catalog(vec![("Version", Object::name("2.0"))]);
        assert!(run(PdfALevel::A4f, &doc, |c, s, cat| c.check_version(s, cat)).is_ok());
        assert_eq!(
            code_of(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_version(s, cat))),
            Some(ErrorCode::InvalidHeaderVersion)
        );
    }

    #[test]
    fn test_structure_required_for_level_a() {
        let doc = document_with_catalog(vec![]);
        assert!(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_structure(s, cat)).is_ok());
        assert_eq!(
            code_of(run(PdfALevel::A2a, &doc, |c, s, cat| c.check_structure(s, cat))),
            Some(ErrorCode::MissingMarkInfo)
        );

        let doc = document_with_catalog(vec![("MarkInfo", dict_obj(vec![("Marked", Object::Boolean(true))]))]);
        assert_eq!(
            code_of(run(PdfALevel::A1a, &doc, |c, s, cat| c.check_structure(s, cat))),
            Some(ErrorCode::MissingStructTreeRoot)
        );
    }

    #[test]
    fn test_need_appearances() {
        let form = dict_obj(vec![("NeedAppearances", Object::Boolean(true))]);
        let doc = document_with_catalog(vec![("AcroForm", form)]);
        assert_eq!(
            code_of(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_acro_form(s, cat))),
            Some(ErrorCode::ForbiddenFormEntry)
        );
    }

    #[test]
    fn test_field_additional_actions_in_nested_kids() {
        let kid = dict_obj(vec![("AA", dict_obj(vec![]))]);
        let parent = dict_obj(vec![("T", Object::string("group")), ("Kids", Object::Array(vec![kid]))]);
        let form = dict_obj(vec![("Fields", Object::Array(vec![parent]))]);
        let doc = document_with_catalog(vec![("AcroForm", form)]);
        assert_eq!(
            code_of(run(PdfALevel::A3b, &doc, |c, s, cat| c.check_acro_form(s, cat))),
            Some(ErrorCode::WidgetAdditionalActions)
        );
    }

    #[test]
    fn test_field_tree_cycle_terminates() {
        let mut doc = document_with_catalog(vec![]);
        let field_ref = ObjectRef::new(5, 0);
        doc.set_object(field_ref, dict_obj(vec![("Kids", Object::Array(vec![Object::Reference(field_ref)]))]));
        let form = dict_obj(vec![("Fields", Object::Array(vec![Object::Reference(field_ref)]))]);
        doc.set_object(ObjectRef::new(1, 0), Object::Dictionary(dict(vec![("Type", Object::name("Catalog")), ("AcroForm", form)])));
        assert!(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_acro_form(s, cat)).is_ok());
    }

    fn signature(sub_filter: &str, byte_range: Vec<i64>) -> Object {
        dict_obj(vec![
            ("Type", Object::name("Sig")),
            ("SubFilter", Object::name(sub_filter)),
            ("ByteRange", Object::Array(byte_range.into_iter().map(Object::Integer).collect())),
        ])
    }

    fn signed_document(sig: Object) -> crate::document::PdfDocument {
        let field = dict_obj(vec![("FT", Object::name("Sig")), ("V", sig)]);
        let form = dict_obj(vec![("Fields", Object::Array(vec![field]))]);
        document_with_catalog(vec![("AcroForm", form)])
    }

    #[test]
    fn test_signature_checks() {
        let doc = signed_document(signature("adbe.pkcs7.detached", vec![0, 10, 20, 30]));
        assert!(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_acro_form(s, cat)).is_ok());
        assert_eq!(
            code_of(run(PdfALevel::A4, &doc, |c, s, cat| c.check_acro_form(s, cat))),
            Some(ErrorCode::SignatureTypeNotAllowed)
        );

        let doc = signed_document(signature("adbe.pkcs7.detached", vec![5, 10, 20, 30]));
        assert_eq!(
            code_of(run(PdfALevel::A2b, &doc, |c, s, cat| c.check_acro_form(s, cat))),
            Some(ErrorCode::InvalidByteRange)
        );

        let doc = signed_document(signature("adbe.x509.rsa_sha1", vec![0, 10, 20, 30]));
        assert_eq!(
            code_of(run(PdfALevel::A3b, &doc, |c, s, cat| c.check_acro_form(s, cat))),
            Some(ErrorCode::SignatureSubFilterNotAllowed)
        );
        assert!(run(PdfALevel::A1b, &doc, |c, s, cat| c.check_acro_form(s, cat)).is_ok());
    }

    #[test]
    fn test_outline_actions() {
        let mut doc = document_with_catalog(vec![]);
        let first = ObjectRef::new(7, 0);
        let second = ObjectRef::new(8, 0);
        doc.set_object(first, dict_obj(vec![("Next", Object::Reference(second))]));
        doc.set_object(
            second,
            dict_obj(vec![
                ("A", dict_obj(vec![("S", Object::name("JavaScript"))])),
                ("Prev", Object::Reference(first)),
            ]),
        );
        let outlines = dict_obj(vec![("First", Object::Reference(first))]);
        doc.set_object(ObjectRef::new(1, 0), Object::Dictionary(dict(vec![("Outlines", outlines)])));
        assert_eq!(
            code_of(run(PdfALevel::A1b, &doc, |c, s, cat| c.check_outlines(s, cat))),
            Some(ErrorCode::ActionNotAllowed)
        );
    }

    #[test]
    fn test_open_action_destination_is_not_an_action() {
        let doc = document_with_catalog(vec![]);
        let checker = PdfAChecker::new(PdfALevel::A1b);
        let mut session = checker.new_session(&doc);
        let destination = Object::Array(vec![Object::Reference(ObjectRef::new(3, 0)), Object::name("Fit")]);
        assert!(checker.check_open_action(&mut session, &destination).is_ok());
        let launch = dict_obj(vec![("S", Object::name("Launch"))]);
        assert_eq!(code_of(checker.check_open_action(&mut session, &launch)), Some(ErrorCode::ActionNotAllowed));
    }
}

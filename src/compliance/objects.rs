//! Generic object checks: implementation limits, stream filters and keys,
//! file specifications.
//!
//! Indirect objects reached while checking are queued rather than recursed
//! into, so long reference chains (page trees, outline lists) cannot overflow
//! the stack; the checked-object set stops cycles.

use super::checker::{fail, PdfAChecker};
use super::session::ValidationSession;
use super::types::{ConformanceError, ErrorCode};
use crate::error::{Error, Result};
use crate::object::{dict_name, filter_names, Dictionary, Object, ObjectRef};

/// Filters defined by ISO 32000-1:2008, Table 6.
const STANDARD_FILTERS: [&str; 10] = [
    "ASCIIHexDecode",
    "ASCII85Decode",
    "LZWDecode",
    "FlateDecode",
    "RunLengthDecode",
    "CCITTFaxDecode",
    "JBIG2Decode",
    "DCTDecode",
    "JPXDecode",
    "Crypt",
];

/// Stream keys that point at external file data.
const EXTERNAL_STREAM_KEYS: [&str; 3] = ["F", "FFilter", "FDecodeParms"];

impl PdfAChecker {
    /// Check one object and every indirect object reachable from it.
    ///
    /// Each indirect object is checked at most once per session.
    pub fn check_object(&self, session: &mut ValidationSession<'_>, obj: &Object) -> Result<()> {
        let doc = session.document();
        let mut pending = Vec::new();
        self.check_value(session, obj, &mut pending)?;

        while let Some(obj_ref) = pending.pop() {
            if !session.checked.mark_object(obj_ref) {
                continue;
            }
            session.stats.objects_checked += 1;
            let target = match doc.load_object(obj_ref) {
                Ok(target) => target,
                // A reference to a missing object is a reference to null.
                Err(Error::ObjectNotFound(..)) => continue,
                Err(e) => return Err(e),
            };
            self.check_value(session, target, &mut pending)
                .map_err(|e| locate(e, obj_ref))?;
        }
        Ok(())
    }

    fn check_value(
        &self,
        session: &mut ValidationSession<'_>,
        obj: &Object,
        pending: &mut Vec<ObjectRef>,
    ) -> Result<()> {
        let limits = &self.policy().limits;
        match obj {
            Object::Null | Object::Boolean(_) => Ok(()),
            Object::Integer(i) => match limits.integer_range {
                Some((min, max)) if *i < min || *i > max => {
                    fail(ConformanceError::new(ErrorCode::IntegerOutOfRange).with_param(i))
                },
                _ => Ok(()),
            },
            Object::Real(r) => match limits.max_real {
                Some(max) if r.abs() > max => fail(ConformanceError::new(ErrorCode::RealOutOfRange).with_param(r)),
                _ => Ok(()),
            },
            Object::String(bytes) => match limits.max_string_len {
                Some(max) if bytes.len() > max => fail(
                    ConformanceError::new(ErrorCode::StringTooLong)
                        .with_param(bytes.len())
                        .with_param(max),
                ),
                _ => Ok(()),
            },
            Object::Name(name) => match limits.max_name_len {
                Some(max) if name.len() > max => fail(
                    ConformanceError::new(ErrorCode::NameTooLong)
                        .with_param(name.len())
                        .with_param(max),
                ),
                _ => Ok(()),
            },
            Object::Array(items) => {
                if let Some(max) = limits.max_array_len {
                    if items.len() > max {
                        return fail(
                            ConformanceError::new(ErrorCode::ArrayCapacityExceeded)
                                .with_param(items.len())
                                .with_param(max)
                                .with_clause(self.clause("6.1.12", "6.1.13")),
                        );
                    }
                }
                for item in items {
                    self.check_value(session, item, pending)?;
                }
                Ok(())
            },
            Object::Dictionary(dict) => self.check_dictionary(session, dict, pending),
            Object::Stream { dict, .. } => {
                self.check_dictionary(session, dict, pending)?;
                self.check_stream_dictionary(session, dict)
            },
            Object::Reference(r) => {
                if !session.checked.is_object_checked(*r) {
                    pending.push(*r);
                }
                Ok(())
            },
        }
    }

    fn check_dictionary(
        &self,
        session: &mut ValidationSession<'_>,
        dict: &Dictionary,
        pending: &mut Vec<ObjectRef>,
    ) -> Result<()> {
        if let Some(max) = self.policy().limits.max_dict_entries {
            if dict.len() > max {
                return fail(
                    ConformanceError::new(ErrorCode::DictionaryCapacityExceeded)
                        .with_param(dict.len())
                        .with_param(max)
                        .with_clause(self.clause("6.1.12", "6.1.13")),
                );
            }
        }
        if dict_name(dict, "Type") == Some("Filespec") {
            self.check_file_spec(session, dict)?;
        }
        let max_name_len = self.policy().limits.max_name_len;
        for (key, value) in dict {
            if let Some(max) = max_name_len.filter(|&max| key.len() > max) {
                return fail(
                    ConformanceError::new(ErrorCode::NameTooLong)
                        .with_param(key.len())
                        .with_param(max),
                );
            }
            self.check_value(session, value, pending)?;
        }
        Ok(())
    }

    /// Filter and external-data restrictions of a stream dictionary.
    pub(crate) fn check_stream_dictionary(&self, session: &ValidationSession<'_>, dict: &Dictionary) -> Result<()> {
        let doc = session.document();
        for key in EXTERNAL_STREAM_KEYS {
            if dict.contains_key(key) {
                return fail(
                    ConformanceError::new(ErrorCode::ExternalStreamNotAllowed)
                        .with_param(key)
                        .with_clause(self.clause("6.1.7", "6.1.7.1")),
                );
            }
        }

        let filters = match dict.get("Filter") {
            Some(filter) => filter_names(doc.resolve(filter)?),
            None => return Ok(()),
        };
        for (index, filter) in filters.iter().enumerate() {
            if self.policy().forbidden_filters.contains(filter.as_str())
                || !STANDARD_FILTERS.contains(&filter.as_str())
            {
                return fail(
                    ConformanceError::new(ErrorCode::FilterNotAllowed)
                        .with_param(filter)
                        .with_clause(self.clause("6.1.10", "6.1.7.2")),
                );
            }
            if filter == "Crypt" && self.policy().crypt_identity_only {
                let name = crypt_filter_name(session, dict, index)?;
                if name != "Identity" {
                    return fail(ConformanceError::new(ErrorCode::CryptFilterNotIdentity).with_param(name));
                }
            }
        }
        Ok(())
    }

    /// File specification rules. Applies to dictionaries of type `Filespec`.
    pub(crate) fn check_file_spec(&self, session: &ValidationSession<'_>, spec: &Dictionary) -> Result<()> {
        let doc = session.document();
        let rule = self.policy().file_spec;
        let embedded = match spec.get("EF") {
            Some(ef) => doc.resolve_dict(ef)?,
            None => None,
        };

        if embedded.is_some() && rule.forbid_embedded_files {
            return fail(ConformanceError::new(ErrorCode::EmbeddedFileNotAllowed).with_clause(self.clause("6.1.11", "6.8")));
        }
        if rule.require_f_and_uf {
            for key in ["F", "UF"] {
                if !spec.contains_key(key) {
                    return fail(ConformanceError::new(ErrorCode::FileSpecMissingEntry).with_param(key));
                }
            }
        }
        if rule.require_af_relationship && embedded.is_some() && !spec.contains_key("AFRelationship") {
            return fail(ConformanceError::new(ErrorCode::FileSpecMissingEntry).with_param("AFRelationship"));
        }

        let embedded = match embedded {
            Some(ef) => ef,
            None => return Ok(()),
        };
        for stream in embedded.values() {
            let stream_dict = match doc.resolve_dict(stream)? {
                Some(d) => d,
                None => continue,
            };
            if rule.require_mime_subtype && dict_name(stream_dict, "Subtype").is_none() {
                return fail(ConformanceError::new(ErrorCode::EmbeddedFileMissingSubtype));
            }
            if rule.require_mod_date {
                let params = match stream_dict.get("Params") {
                    Some(p) => doc.resolve_dict(p)?,
                    None => None,
                };
                if !params.is_some_and(|p| p.contains_key("ModDate")) {
                    return fail(ConformanceError::new(ErrorCode::EmbeddedFileMissingModDate));
                }
            }
        }
        Ok(())
    }

    /// The cross-reference table: object count ceiling, then every object.
    pub(crate) fn check_xref(&self, session: &mut ValidationSession<'_>) -> Result<()> {
        let doc = session.document();
        if let Some(max) = self.policy().limits.max_indirect_objects {
            if doc.object_count() > max {
                return fail(
                    ConformanceError::new(ErrorCode::TooManyIndirectObjects)
                        .with_param(doc.object_count())
                        .with_param(max),
                );
            }
        }
        for (obj_ref, _) in doc.objects() {
            self.check_object(session, &Object::Reference(*obj_ref))?;
        }
        Ok(())
    }
}

/// Name of the crypt filter at `index` (`Identity` when unnamed).
fn crypt_filter_name(session: &ValidationSession<'_>, dict: &Dictionary, index: usize) -> Result<String> {
    let doc = session.document();
    let parms = match dict.get("DecodeParms") {
        Some(p) => doc.resolve(p)?,
        None => return Ok("Identity".to_string()),
    };
    let parms = match parms {
        Object::Array(items) => match items.get(index) {
            Some(item) => doc.resolve(item)?,
            None => return Ok("Identity".to_string()),
        },
        other => other,
    };
    Ok(parms
        .as_dict()
        .and_then(|d| dict_name(d, "Name"))
        .unwrap_or("Identity")
        .to_string())
}

/// Attach the object reference to a violation that has no location yet.
fn locate(err: Error, obj_ref: ObjectRef) -> Error {
    match err {
        Error::Conformance(c) if c.location.is_none() => {
            Error::Conformance(c.with_location(format!("object {}", obj_ref)))
        },
        other => other,
    }
}

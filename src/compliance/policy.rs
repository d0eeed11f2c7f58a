//! Conformance policies.
//!
//! Every rule that differs between PDF/A parts or sub-levels is a field of
//! [`ConformancePolicy`]. [`pdf_a1`] is the base table; each later part copies
//! its predecessor and overrides what changed. Sub-level letters are applied on
//! top. Tables are built once per level.

use super::types::{PdfALevel, PdfAPart};
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// How transparency is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyRule {
    /// Any transparency is a violation (PDF/A-1).
    Forbidden,
    /// A transparent page needs a document output intent or a page group `CS`.
    NeedsIntentOrGroupSpace,
    /// A transparent page needs a document or page output intent, or an ICC
    /// blending color space.
    NeedsIntentOrBlendingSpace,
}

/// Encodings accepted for non-symbolic TrueType fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrueTypeEncodingRule {
    /// `MacRomanEncoding` or `WinAnsiEncoding` is required.
    StandardRequired,
    /// A standard encoding, or no `Encoding` entry at all.
    StandardOrAbsent,
}

/// Numeric implementation limits. `None` means unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericLimits {
    /// Maximum array length
    pub max_array_len: Option<usize>,
    /// Maximum dictionary entries
    pub max_dict_entries: Option<usize>,
    /// Maximum string length in bytes
    pub max_string_len: Option<usize>,
    /// Maximum name length in bytes
    pub max_name_len: Option<usize>,
    /// Inclusive integer range
    pub integer_range: Option<(i64, i64)>,
    /// Maximum absolute value of a real number
    pub max_real: Option<f64>,
    /// Maximum number of indirect objects
    pub max_indirect_objects: Option<usize>,
    /// Maximum `q` nesting depth
    pub max_gs_depth: Option<usize>,
    /// Maximum DeviceN colorants
    pub max_devicen_components: Option<usize>,
    /// Inclusive page size range in default user space units
    pub page_size: Option<(f64, f64)>,
}

/// File specification requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileSpecRule {
    /// `EF` is forbidden
    pub forbid_embedded_files: bool,
    /// `F` and `UF` are required
    pub require_f_and_uf: bool,
    /// `AFRelationship` is required
    pub require_af_relationship: bool,
    /// Embedded file streams need a MIME `Subtype`
    pub require_mime_subtype: bool,
    /// Embedded file streams need `Params/ModDate`
    pub require_mod_date: bool,
}

/// The rule table for one conformance level.
#[derive(Debug, Clone)]
pub struct ConformancePolicy {
    /// Level the table was built for
    pub level: PdfALevel,
    /// Numeric limits
    pub limits: NumericLimits,
    /// Annotation subtypes that are not allowed
    pub forbidden_annotations: HashSet<&'static str>,
    /// Action types that are not allowed
    pub forbidden_actions: HashSet<&'static str>,
    /// Named actions that are allowed
    pub allowed_named_actions: HashSet<&'static str>,
    /// Blend modes that are allowed
    pub allowed_blend_modes: HashSet<&'static str>,
    /// Stream filters that are not allowed
    pub forbidden_filters: HashSet<&'static str>,
    /// Inline image filters that are not allowed (full names)
    pub forbidden_inline_filters: HashSet<&'static str>,
    /// Crypt filters must be `Identity`
    pub crypt_identity_only: bool,
    /// Catalog keys that are not allowed
    pub forbidden_catalog_entries: Vec<&'static str>,
    /// Name trees that are not allowed
    pub forbidden_name_trees: Vec<&'static str>,
    /// Page dictionary keys that are not allowed
    pub forbidden_page_entries: Vec<&'static str>,
    /// `OCProperties` configurations are checked
    pub check_optional_content: bool,
    /// Non-symbolic TrueType encoding rule
    pub truetype_encoding: TrueTypeEncodingRule,
    /// Symbolic TrueType fonts may not have `Encoding`
    pub symbolic_truetype_forbids_encoding: bool,
    /// Annotations need appearance dictionaries
    pub require_appearance_streams: bool,
    /// Subtypes exempt from the appearance requirement
    pub appearance_exempt: HashSet<&'static str>,
    /// Widget annotations and fields may not have `AA`
    pub forbid_widget_additional_actions: bool,
    /// Widget annotations may not have `A`
    pub forbid_widget_action: bool,
    /// File specification rule
    pub file_spec: FileSpecRule,
    /// Metadata stream may not be filtered
    pub forbid_metadata_filter: bool,
    /// `pdfaid:rev` is required
    pub require_xmp_rev: bool,
    /// `xmpMM:History` is required
    pub require_xmp_history: bool,
    /// Transparency rule
    pub transparency: TransparencyRule,
    /// A four-channel ICC blending space may not equal any CMYK output
    /// intent profile in scope, document or page
    pub forbid_intent_as_cmyk_blending_profile: bool,
    /// ICC blending spaces justify device color
    pub blending_space_justifies_color: bool,
    /// Device color usage is evaluated per page
    pub page_scope_color_usage: bool,
    /// Pages may carry their own output intents
    pub page_output_intents: bool,
    /// `Default*` color spaces justify device color
    pub honor_default_color_spaces: bool,
    /// Highest ICC major version
    pub icc_max_major_version: u8,
    /// Required PDF major version
    pub required_major_version: u8,
    /// Keys allowed in the Info dictionary (`None`: unrestricted)
    pub info_allowed_keys: Option<HashSet<&'static str>>,
    /// Graphics state keys that are not allowed
    pub forbidden_ext_gstate_keys: Vec<&'static str>,
    /// Signature dictionaries are checked
    pub check_signatures: bool,
    /// Allowed signature SubFilters
    pub allowed_sub_filters: HashSet<&'static str>,
    /// Only CAdES signatures are allowed
    pub require_cades: bool,
    /// JPEG2000 images are inspected
    pub check_jpx: bool,
    /// Logical structure is required
    pub require_structure: bool,
    /// Unicode mapping is required
    pub require_unicode: bool,
}

const STANDARD_BLEND_MODES: [&str; 17] = [
    "Normal",
    "Compatible",
    "Multiply",
    "Screen",
    "Overlay",
    "Darken",
    "Lighten",
    "ColorDodge",
    "ColorBurn",
    "HardLight",
    "SoftLight",
    "Difference",
    "Exclusion",
    "Hue",
    "Saturation",
    "Color",
    "Luminosity",
];

fn set(items: &[&'static str]) -> HashSet<&'static str> {
    items.iter().copied().collect()
}

/// PDF/A-1 (ISO 19005-1), the base table.
pub fn pdf_a1() -> ConformancePolicy {
    ConformancePolicy {
        level: PdfALevel::A1b,
        limits: NumericLimits {
            max_array_len: Some(8191),
            max_dict_entries: Some(4095),
            max_string_len: Some(65535),
            max_name_len: Some(127),
            integer_range: Some((-2_147_483_648, 2_147_483_647)),
            max_real: Some(32767.0),
            max_indirect_objects: Some(8_388_607),
            max_gs_depth: Some(28),
            max_devicen_components: Some(8),
            page_size: Some((3.0, 14400.0)),
        },
        forbidden_annotations: set(&[
            "Sound",
            "Movie",
            "FileAttachment",
            "3D",
            "Screen",
            "Polygon",
            "PolyLine",
            "Caret",
            "Watermark",
            "RichMedia",
            "Redact",
            "Projection",
        ]),
        forbidden_actions: set(&[
            "Launch",
            "Sound",
            "Movie",
            "ResetForm",
            "ImportData",
            "JavaScript",
            "Hide",
            "SetOCGState",
            "Rendition",
            "Trans",
            "GoTo3DView",
        ]),
        allowed_named_actions: set(&["NextPage", "PrevPage", "FirstPage", "LastPage"]),
        allowed_blend_modes: set(&["Normal", "Compatible"]),
        forbidden_filters: set(&["LZWDecode", "JPXDecode", "Crypt"]),
        forbidden_inline_filters: set(&["LZWDecode", "JPXDecode", "Crypt"]),
        crypt_identity_only: false,
        forbidden_catalog_entries: vec!["AA", "OCProperties", "Requirements", "AlternatePresentations"],
        forbidden_name_trees: vec!["JavaScript", "EmbeddedFiles"],
        forbidden_page_entries: vec!["AA"],
        check_optional_content: false,
        truetype_encoding: TrueTypeEncodingRule::StandardRequired,
        symbolic_truetype_forbids_encoding: true,
        require_appearance_streams: false,
        appearance_exempt: set(&["Popup", "Link"]),
        forbid_widget_additional_actions: true,
        forbid_widget_action: true,
        file_spec: FileSpecRule {
            forbid_embedded_files: true,
            ..FileSpecRule::default()
        },
        forbid_metadata_filter: true,
        require_xmp_rev: false,
        require_xmp_history: false,
        transparency: TransparencyRule::Forbidden,
        forbid_intent_as_cmyk_blending_profile: false,
        blending_space_justifies_color: false,
        page_scope_color_usage: false,
        page_output_intents: false,
        honor_default_color_spaces: false,
        icc_max_major_version: 2,
        required_major_version: 1,
        info_allowed_keys: None,
        forbidden_ext_gstate_keys: vec!["TR"],
        check_signatures: false,
        allowed_sub_filters: HashSet::new(),
        require_cades: false,
        check_jpx: false,
        require_structure: false,
        require_unicode: false,
    }
}

/// PDF/A-2 (ISO 19005-2): transparency, JPEG2000, optional content.
pub fn pdf_a2() -> ConformancePolicy {
    let mut policy = pdf_a1();
    policy.level = PdfALevel::A2b;
    policy.limits.max_array_len = None;
    policy.limits.max_dict_entries = None;
    policy.limits.max_string_len = Some(32767);
    policy.limits.max_real = Some(3.403e38);
    policy.limits.max_devicen_components = Some(32);
    policy.forbidden_annotations = set(&["Sound", "Movie", "3D", "Screen", "RichMedia", "Projection"]);
    policy.allowed_blend_modes = set(&STANDARD_BLEND_MODES);
    policy.forbidden_filters = set(&["LZWDecode"]);
    policy.crypt_identity_only = true;
    policy.forbidden_catalog_entries = vec!["AA", "Requirements", "AlternatePresentations"];
    policy.forbidden_name_trees = vec!["JavaScript"];
    policy.forbidden_page_entries = vec!["AA", "PresSteps"];
    policy.check_optional_content = true;
    policy.require_appearance_streams = true;
    policy.forbid_widget_action = false;
    policy.file_spec = FileSpecRule {
        require_f_and_uf: true,
        ..FileSpecRule::default()
    };
    policy.forbid_metadata_filter = false;
    policy.transparency = TransparencyRule::NeedsIntentOrGroupSpace;
    policy.honor_default_color_spaces = true;
    policy.icc_max_major_version = 4;
    policy.forbidden_ext_gstate_keys = vec!["TR", "HTP"];
    policy.check_signatures = true;
    policy.allowed_sub_filters = set(&["adbe.pkcs7.detached", "ETSI.CAdES.detached"]);
    policy.check_jpx = true;
    policy
}

/// PDF/A-3 (ISO 19005-3): arbitrary embedded files with relationships.
pub fn pdf_a3() -> ConformancePolicy {
    let mut policy = pdf_a2();
    policy.level = PdfALevel::A3b;
    policy.file_spec.require_af_relationship = true;
    policy.file_spec.require_mime_subtype = true;
    policy
}

/// PDF/A-4 (ISO 19005-4): PDF 2.0 based, implementation limits lifted.
pub fn pdf_a4() -> ConformancePolicy {
    let mut policy = pdf_a3();
    policy.level = PdfALevel::A4;
    policy.limits = NumericLimits {
        max_array_len: None,
        max_dict_entries: None,
        max_string_len: None,
        max_name_len: None,
        integer_range: None,
        max_real: None,
        max_indirect_objects: None,
        max_gs_depth: None,
        max_devicen_components: None,
        page_size: None,
    };
    policy.forbidden_annotations = set(&["Sound", "Movie", "Screen", "3D", "RichMedia"]);
    policy.truetype_encoding = TrueTypeEncodingRule::StandardOrAbsent;
    policy.symbolic_truetype_forbids_encoding = false;
    policy.file_spec.require_mod_date = true;
    policy.require_xmp_rev = true;
    policy.require_xmp_history = true;
    policy.transparency = TransparencyRule::NeedsIntentOrBlendingSpace;
    policy.forbid_intent_as_cmyk_blending_profile = true;
    policy.blending_space_justifies_color = true;
    policy.page_scope_color_usage = true;
    policy.page_output_intents = true;
    policy.required_major_version = 2;
    policy.info_allowed_keys = Some(set(&["ModDate"]));
    policy.allowed_sub_filters.insert("ETSI.RFC3161");
    policy.require_cades = true;
    policy
}

/// Build the table for one level: part table plus sub-level adjustments.
fn build(level: PdfALevel) -> ConformancePolicy {
    let mut policy = match level.part() {
        PdfAPart::Part1 => pdf_a1(),
        PdfAPart::Part2 => pdf_a2(),
        PdfAPart::Part3 => pdf_a3(),
        PdfAPart::Part4 => pdf_a4(),
    };
    policy.level = level;
    policy.require_structure = level.requires_structure();
    policy.require_unicode = level.requires_unicode();
    match level {
        PdfALevel::A4e => {
            policy.forbidden_annotations.remove("3D");
            policy.forbidden_annotations.remove("RichMedia");
        },
        PdfALevel::A4f => {
            policy.file_spec.require_af_relationship = true;
        },
        _ => {},
    }
    policy
}

lazy_static! {
    static ref POLICIES: HashMap<PdfALevel, ConformancePolicy> =
        PdfALevel::ALL.iter().map(|&level| (level, build(level))).collect();
}

impl ConformancePolicy {
    /// The shared table for `level`.
    pub fn for_level(level: PdfALevel) -> &'static ConformancePolicy {
        // Every level is inserted when the map is built.
        &POLICIES[&level]
    }

    /// PDF/A part of the table.
    pub fn part(&self) -> PdfAPart {
        self.level.part()
    }

    /// Whether a blend mode may be used.
    pub fn is_blend_mode_allowed(&self, mode: &str) -> bool {
        self.allowed_blend_modes.contains(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_parts_relax_limits() {
        let a1 = ConformancePolicy::for_level(PdfALevel::A1b);
        let a2 = ConformancePolicy::for_level(PdfALevel::A2b);
        let a4 = ConformancePolicy::for_level(PdfALevel::A4);

        assert_eq!(a1.limits.max_array_len, Some(8191));
        assert_eq!(a2.limits.max_array_len, None);
        assert_eq!(a1.limits.max_string_len, Some(65535));
        assert_eq!(a2.limits.max_string_len, Some(32767));
        assert_eq!(a2.limits.max_gs_depth, Some(28));
        assert_eq!(a4.limits.max_gs_depth, None);
        assert_eq!(a1.limits.max_devicen_components, Some(8));
        assert_eq!(a2.limits.max_devicen_components, Some(32));
    }

    #[test]
    fn test_filters_per_part() {
        let a1 = ConformancePolicy::for_level(PdfALevel::A1a);
        let a2 = ConformancePolicy::for_level(PdfALevel::A2u);
        assert!(a1.forbidden_filters.contains("JPXDecode"));
        assert!(!a2.forbidden_filters.contains("JPXDecode"));
        assert!(a2.forbidden_filters.contains("LZWDecode"));
        assert!(a2.forbidden_inline_filters.contains("JPXDecode"));
        assert!(a2.crypt_identity_only);
    }

    #[test]
    fn test_sub_level_adjustments() {
        assert!(ConformancePolicy::for_level(PdfALevel::A2a).require_structure);
        assert!(!ConformancePolicy::for_level(PdfALevel::A2b).require_structure);
        assert!(ConformancePolicy::for_level(PdfALevel::A3u).require_unicode);
        assert!(ConformancePolicy::for_level(PdfALevel::A4).forbidden_annotations.contains("3D"));
        assert!(!ConformancePolicy::for_level(PdfALevel::A4e).forbidden_annotations.contains("3D"));
    }

    #[test]
    fn test_transparency_rules() {
        assert_eq!(pdf_a1().transparency, TransparencyRule::Forbidden);
        assert_eq!(pdf_a3().transparency, TransparencyRule::NeedsIntentOrGroupSpace);
        assert_eq!(pdf_a4().transparency, TransparencyRule::NeedsIntentOrBlendingSpace);
        assert!(pdf_a4().is_blend_mode_allowed("Luminosity"));
        assert!(!pdf_a1().is_blend_mode_allowed("Multiply"));
    }

    #[test]
    fn test_every_level_has_a_table() {
        for level in PdfALevel::ALL {
            assert_eq!(ConformancePolicy::for_level(level).level, level);
        }
    }
}

//! PDF/A compliance types and data structures.

use std::fmt;
use std::str::FromStr;

/// PDF/A conformance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PdfALevel {
    /// PDF/A-1a: Full conformance with logical structure
    A1a,
    /// PDF/A-1b: Basic conformance (visual preservation)
    A1b,
    /// PDF/A-2a: PDF 1.7 based, full conformance
    A2a,
    /// PDF/A-2b: PDF 1.7 based, basic conformance
    A2b,
    /// PDF/A-2u: PDF/A-2b plus Unicode mapping
    A2u,
    /// PDF/A-3a: PDF/A-2a plus embedded files
    A3a,
    /// PDF/A-3b: PDF/A-2b plus embedded files
    A3b,
    /// PDF/A-3u: PDF/A-3b plus Unicode mapping
    A3u,
    /// PDF/A-4: PDF 2.0 based
    A4,
    /// PDF/A-4e: PDF/A-4 for engineering documents (3D, RichMedia)
    A4e,
    /// PDF/A-4f: PDF/A-4 with arbitrary embedded files
    A4f,
}

impl PdfALevel {
    /// All levels, in order.
    pub const ALL: [PdfALevel; 11] = [
        PdfALevel::A1a,
        PdfALevel::A1b,
        PdfALevel::A2a,
        PdfALevel::A2b,
        PdfALevel::A2u,
        PdfALevel::A3a,
        PdfALevel::A3b,
        PdfALevel::A3u,
        PdfALevel::A4,
        PdfALevel::A4e,
        PdfALevel::A4f,
    ];

    /// Get the PDF/A part (1, 2, 3 or 4).
    pub fn part(&self) -> PdfAPart {
        match self {
            PdfALevel::A1a | PdfALevel::A1b => PdfAPart::Part1,
            PdfALevel::A2a | PdfALevel::A2b | PdfALevel::A2u => PdfAPart::Part2,
            PdfALevel::A3a | PdfALevel::A3b | PdfALevel::A3u => PdfAPart::Part3,
            PdfALevel::A4 | PdfALevel::A4e | PdfALevel::A4f => PdfAPart::Part4,
        }
    }

    /// Get the conformance level letter (`None` for plain PDF/A-4).
    pub fn conformance(&self) -> Option<char> {
        match self {
            PdfALevel::A1a | PdfALevel::A2a | PdfALevel::A3a => Some('A'),
            PdfALevel::A1b | PdfALevel::A2b | PdfALevel::A3b => Some('B'),
            PdfALevel::A2u | PdfALevel::A3u => Some('U'),
            PdfALevel::A4 => None,
            PdfALevel::A4e => Some('E'),
            PdfALevel::A4f => Some('F'),
        }
    }

    /// Check if this level requires logical structure (Tagged PDF).
    pub fn requires_structure(&self) -> bool {
        matches!(self, PdfALevel::A1a | PdfALevel::A2a | PdfALevel::A3a)
    }

    /// Check if this level requires Unicode mapping.
    pub fn requires_unicode(&self) -> bool {
        matches!(
            self,
            PdfALevel::A1a | PdfALevel::A2a | PdfALevel::A2u | PdfALevel::A3a | PdfALevel::A3u
        )
    }

    /// Get the XMP pdfaid:part value.
    pub fn xmp_part(&self) -> &'static str {
        match self.part() {
            PdfAPart::Part1 => "1",
            PdfAPart::Part2 => "2",
            PdfAPart::Part3 => "3",
            PdfAPart::Part4 => "4",
        }
    }

    /// Get the XMP pdfaid:conformance value.
    pub fn xmp_conformance(&self) -> Option<&'static str> {
        self.conformance().map(|c| match c {
            'A' => "A",
            'B' => "B",
            'U' => "U",
            'E' => "E",
            _ => "F",
        })
    }

    /// Parse from XMP pdfaid:part and pdfaid:conformance values.
    pub fn from_xmp(part: &str, conformance: Option<&str>) -> Option<Self> {
        let conformance = conformance.map(str::to_uppercase);
        match (part.trim(), conformance.as_deref()) {
            ("1", Some("A")) => Some(PdfALevel::A1a),
            ("1", Some("B")) => Some(PdfALevel::A1b),
            ("2", Some("A")) => Some(PdfALevel::A2a),
            ("2", Some("B")) => Some(PdfALevel::A2b),
            ("2", Some("U")) => Some(PdfALevel::A2u),
            ("3", Some("A")) => Some(PdfALevel::A3a),
            ("3", Some("B")) => Some(PdfALevel::A3b),
            ("3", Some("U")) => Some(PdfALevel::A3u),
            ("4", None) => Some(PdfALevel::A4),
            ("4", Some("E")) => Some(PdfALevel::A4e),
            ("4", Some("F")) => Some(PdfALevel::A4f),
            _ => None,
        }
    }
}

impl fmt::Display for PdfALevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PdfALevel::A1a => "PDF/A-1a",
            PdfALevel::A1b => "PDF/A-1b",
            PdfALevel::A2a => "PDF/A-2a",
            PdfALevel::A2b => "PDF/A-2b",
            PdfALevel::A2u => "PDF/A-2u",
            PdfALevel::A3a => "PDF/A-3a",
            PdfALevel::A3b => "PDF/A-3b",
            PdfALevel::A3u => "PDF/A-3u",
            PdfALevel::A4 => "PDF/A-4",
            PdfALevel::A4e => "PDF/A-4e",
            PdfALevel::A4f => "PDF/A-4f",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PdfALevel {
    type Err = String;

    /// Accepts `2b`, `A2b`, `PDF/A-2b` (case-insensitive).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let short = lower
            .strip_prefix("pdf/a-")
            .or_else(|| lower.strip_prefix("pdfa-"))
            .or_else(|| lower.strip_prefix('a'))
            .unwrap_or(&lower);
        let mut chars = short.chars();
        let part = chars.next().map(String::from).unwrap_or_default();
        let letter: String = chars.collect();
        let letter = if letter.is_empty() { None } else { Some(letter.as_str()) };
        PdfALevel::from_xmp(&part, letter).ok_or_else(|| format!("unknown PDF/A level '{}'", s))
    }
}

/// PDF/A part (version).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PdfAPart {
    /// PDF/A-1 (based on PDF 1.4)
    Part1,
    /// PDF/A-2 (based on PDF 1.7)
    Part2,
    /// PDF/A-3 (based on PDF 1.7, with embedded files)
    Part3,
    /// PDF/A-4 (based on PDF 2.0)
    Part4,
}

impl fmt::Display for PdfAPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfAPart::Part1 => write!(f, "PDF/A-1"),
            PdfAPart::Part2 => write!(f, "PDF/A-2"),
            PdfAPart::Part3 => write!(f, "PDF/A-3"),
            PdfAPart::Part4 => write!(f, "PDF/A-4"),
        }
    }
}

/// Result of PDF/A validation.
///
/// Checking stops at the first violation, so `error` holds at most one entry.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the document is compliant with the target level.
    pub is_compliant: bool,
    /// The level validated against.
    pub level: PdfALevel,
    /// Detected PDF/A level from XMP metadata (if any).
    pub detected_level: Option<PdfALevel>,
    /// The first violation found.
    pub error: Option<ConformanceError>,
    /// Compliance warnings (non-fatal issues).
    pub warnings: Vec<ComplianceWarning>,
    /// Summary statistics.
    pub stats: ValidationStats,
}

impl ValidationResult {
    /// Create a new validation result for a specific level.
    pub fn new(level: PdfALevel) -> Self {
        Self {
            is_compliant: false,
            level,
            detected_level: None,
            error: None,
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Check if there is an error.
    pub fn has_errors(&self) -> bool {
        self.error.is_some()
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validation statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationStats {
    /// Number of indirect objects checked.
    pub objects_checked: usize,
    /// Number of content streams walked.
    pub content_streams_checked: usize,
    /// Number of fonts checked.
    pub fonts_checked: usize,
    /// Number of images checked (including inline images).
    pub images_checked: usize,
    /// Number of annotations checked.
    pub annotations_checked: usize,
    /// Number of pages checked.
    pub pages_checked: usize,
}

/// A rule violation.
///
/// The message is produced from the code's template by substituting `%0`,
/// `%1`, ... with the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConformanceError {
    /// Error code.
    pub code: ErrorCode,
    /// Substitution parameters for the template.
    pub params: Vec<String>,
    /// Location in the document (if applicable).
    pub location: Option<String>,
    /// Clause reference in the standard.
    pub clause: Option<String>,
}

impl ConformanceError {
    /// Create a new conformance error.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            params: Vec::new(),
            location: None,
            clause: None,
        }
    }

    /// Append a substitution parameter.
    pub fn with_param(mut self, param: impl fmt::Display) -> Self {
        self.params.push(param.to_string());
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the location when one is known.
    pub fn at_location(mut self, location: Option<String>) -> Self {
        if location.is_some() {
            self.location = location;
        }
        self
    }

    /// Set the clause reference.
    pub fn with_clause(mut self, clause: impl Into<String>) -> Self {
        self.clause = Some(clause.into());
        self
    }

    /// The human-readable message with parameters substituted.
    pub fn message(&self) -> String {
        let mut message = self.code.template().to_string();
        // Highest index first so %1 is not clobbered by %10.
        for (i, param) in self.params.iter().enumerate().rev() {
            message = message.replace(&format!("%{}", i), param);
        }
        message
    }
}

impl fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message())?;
        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }
        if let Some(ref clause) = self.clause {
            write!(f, " [{}]", clause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConformanceError {}

macro_rules! error_codes {
    ($( $(#[$doc:meta])* $variant:ident => ($code:literal, $template:literal), )*) => {
        /// Error codes for PDF/A violations.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $( $(#[$doc])* $variant, )*
        }

        impl ErrorCode {
            /// Stable code string (e.g. `COLOR-003`).
            pub fn code(&self) -> &'static str {
                match self {
                    $( ErrorCode::$variant => $code, )*
                }
            }

            /// Message template with `%0`, `%1`, ... placeholders.
            pub fn template(&self) -> &'static str {
                match self {
                    $( ErrorCode::$variant => $template, )*
                }
            }
        }
    };
}

error_codes! {
    // Structure errors
    /// Trailer has no file identifier
    MissingTrailerId => ("STRUCT-001", "file trailer dictionary shall contain the ID keyword"),
    /// Forbidden key in the document catalog
    ForbiddenCatalogEntry => ("STRUCT-002", "document catalog shall not contain the %0 key"),
    /// Forbidden name tree in the Names dictionary
    ForbiddenNameTree => ("STRUCT-003", "name dictionary shall not contain the %0 key"),
    /// Optional content configuration without a name
    OptionalContentConfigName => ("STRUCT-004", "optional content configuration dictionary shall contain the Name key"),
    /// Optional content configuration with AS
    OptionalContentAutoState => ("STRUCT-005", "optional content configuration dictionary shall not contain the AS key"),
    /// Header version not allowed for the level
    InvalidHeaderVersion => ("STRUCT-006", "file version %0 is not allowed, expected %1.x"),
    /// Missing MarkInfo / Marked (level A)
    MissingMarkInfo => ("STRUCT-007", "document catalog shall contain a MarkInfo dictionary with Marked set to true"),
    /// Missing structure tree (level A)
    MissingStructTreeRoot => ("STRUCT-008", "document catalog shall contain a StructTreeRoot"),
    /// Key not allowed in the document information dictionary
    InfoDictionaryKeyForbidden => ("STRUCT-009", "document information dictionary shall not contain the %0 key"),
    /// Forbidden key in a page dictionary
    ForbiddenPageEntry => ("STRUCT-010", "page dictionary shall not contain the %0 key"),
    /// Page boundaries outside the allowed range
    PageSizeOutOfRange => ("STRUCT-011", "page size %0 x %1 is outside the range %2 to %3 units"),
    /// Forbidden entry in the interactive form dictionary
    ForbiddenFormEntry => ("STRUCT-012", "interactive form dictionary shall not contain %0"),

    // Implementation limits
    /// Array longer than allowed
    ArrayCapacityExceeded => ("LIMIT-001", "array has %0 elements, maximum is %1"),
    /// Dictionary with too many entries
    DictionaryCapacityExceeded => ("LIMIT-002", "dictionary has %0 entries, maximum is %1"),
    /// String longer than allowed
    StringTooLong => ("LIMIT-003", "string is %0 bytes long, maximum is %1"),
    /// Name longer than allowed
    NameTooLong => ("LIMIT-004", "name is %0 bytes long, maximum is %1"),
    /// Integer outside the allowed range
    IntegerOutOfRange => ("LIMIT-005", "integer %0 is outside the allowed range"),
    /// Real outside the allowed range
    RealOutOfRange => ("LIMIT-006", "real number %0 is outside the allowed range"),
    /// Too many indirect objects
    TooManyIndirectObjects => ("LIMIT-007", "document has %0 indirect objects, maximum is %1"),
    /// q/Q nesting too deep
    GraphicsStateNestingExceeded => ("LIMIT-008", "graphics state nesting depth exceeds %0"),
    /// DeviceN with too many colorants
    DeviceNComponentsExceeded => ("LIMIT-009", "DeviceN color space has %0 components, maximum is %1"),

    // Color errors
    /// DeviceGray without any output intent
    DeviceGrayWithoutIntent => ("COLOR-001", "single-channel color used without an output intent"),
    /// DeviceRGB and DeviceCMYK both used without justification
    RgbAndCmykUsed => ("COLOR-002", "three-channel and four-channel color both used without a justifying profile"),
    /// DeviceRGB without an RGB output intent
    DeviceRgbWithoutProfile => ("COLOR-003", "three-channel color used without a justifying profile"),
    /// DeviceCMYK without a CMYK output intent
    DeviceCmykWithoutProfile => ("COLOR-004", "four-channel color used without a justifying profile"),
    /// Malformed ICC profile
    InvalidIccProfile => ("COLOR-005", "ICC profile is invalid: %0"),
    /// ICC profile version newer than allowed
    IccProfileVersionMismatch => ("COLOR-006", "ICC profile version %0 is newer than the allowed version %1"),
    /// Component count disagrees with the profile
    IccComponentMismatch => ("COLOR-007", "color space %0 shall have %1 components"),
    /// Several different destination profiles
    OutputIntentProfilesDiffer => ("COLOR-008", "all output intents shall reference the same destination profile"),
    /// Output intent without a profile
    OutputIntentMissingProfile => ("COLOR-009", "PDF/A output intent shall contain a DestOutputProfile"),
    /// Separation redefined inconsistently
    SeparationMismatch => ("COLOR-010", "separation %0 is redefined with a different alternate space or tint transform"),
    /// Named resource not found
    UndefinedColorSpace => ("COLOR-011", "color space %0 is not defined in the resources"),
    /// Unrecognised or malformed color space
    InvalidColorSpace => ("COLOR-012", "color space %0 is invalid"),
    /// Rendering intent outside the standard four
    InvalidRenderingIntent => ("COLOR-013", "rendering intent %0 is not allowed"),

    // Transparency
    /// Transparency in a level that forbids it
    TransparencyNotAllowed => ("TRANSP-001", "transparency is not allowed: %0"),
    /// Transparent page without a blending space or intent
    TransparencyWithoutBlendingSpace => ("TRANSP-002", "page uses transparency without an output intent or a transparency group color space"),
    /// ICC blending profile equal to the output intent profile
    BlendingProfileMatchesIntent => ("TRANSP-003", "ICC blending color space shall not be the output intent profile"),
    /// Unknown blend mode
    BlendModeNotAllowed => ("TRANSP-004", "blend mode %0 is not allowed"),

    // Filters and streams
    /// Filter not allowed on a stream
    FilterNotAllowed => ("FILTER-001", "filter %0 is not allowed"),
    /// Filter not allowed on an inline image
    InlineImageFilterNotAllowed => ("FILTER-002", "disallowed filter used in inline image: %0"),
    /// External stream key
    ExternalStreamNotAllowed => ("FILTER-003", "stream dictionary shall not contain the %0 key"),
    /// Crypt filter other than Identity
    CryptFilterNotIdentity => ("FILTER-004", "crypt filter %0 is not allowed, only Identity"),

    // Fonts
    /// Font program missing
    FontNotEmbedded => ("FONT-001", "font %0 is not embedded"),
    /// Non-symbolic TrueType with a non-standard encoding
    FontInvalidEncoding => ("FONT-002", "non-symbolic TrueType font %0 shall use MacRomanEncoding or WinAnsiEncoding"),
    /// Symbolic TrueType with an Encoding entry
    SymbolicFontWithEncoding => ("FONT-003", "symbolic TrueType font %0 shall not contain an Encoding entry"),
    /// CIDFontType2 without CIDToGIDMap
    MissingCidToGidMap => ("FONT-004", "CIDFontType2 font %0 shall contain a CIDToGIDMap entry"),
    /// No Unicode mapping
    FontMissingToUnicode => ("FONT-005", "font %0 shall have a ToUnicode CMap or a standard encoding"),
    /// Character code outside the font widths
    GlyphOutOfRange => ("FONT-006", "character code %0 is not defined by font %1"),
    /// Font without a descriptor
    MissingFontDescriptor => ("FONT-007", "font %0 shall contain a FontDescriptor"),

    // Annotations
    /// Subtype not allowed
    AnnotationTypeNotAllowed => ("ANNOT-001", "annotation subtype %0 is not allowed"),
    /// Print flag not set
    AnnotationNotPrinted => ("ANNOT-002", "annotation %0 shall have the Print flag set"),
    /// Hidden/Invisible/NoView set
    AnnotationHidden => ("ANNOT-003", "annotation %0 shall not have the %1 flag set"),
    /// No appearance dictionary
    MissingAppearanceStream => ("ANNOT-004", "annotation %0 shall contain an appearance dictionary"),
    /// Appearance dictionary with keys other than N
    AppearanceDictionaryInvalid => ("ANNOT-005", "appearance dictionary shall contain only the N key"),
    /// Widget or field with AA
    WidgetAdditionalActions => ("ANNOT-006", "widget annotation shall not include an additional-action entry"),
    /// Widget with A
    WidgetAction => ("ANNOT-007", "widget annotation shall not include an action entry"),

    // Actions
    /// Action type not allowed
    ActionNotAllowed => ("ACTION-001", "action type %0 is not allowed"),
    /// Named action not allowed
    NamedActionNotAllowed => ("ACTION-002", "named action %0 is not allowed"),

    // Metadata
    /// Catalog has no Metadata stream
    MissingXmpMetadata => ("XMP-001", "document catalog shall contain a Metadata stream"),
    /// Metadata stream dictionary is wrong
    InvalidMetadataStream => ("XMP-002", "metadata stream is invalid: %0"),
    /// XMP is not well-formed XML
    MalformedXmp => ("XMP-003", "XMP packet is not well-formed: %0"),
    /// No pdfaid schema
    MissingPdfaIdentification => ("XMP-004", "XMP metadata shall contain the PDF/A identification schema"),
    /// pdfaid value mismatch
    InvalidPdfaIdentification => ("XMP-005", "pdfaid:%0 value %1 does not match %2"),
    /// Required XMP property missing
    MissingXmpProperty => ("XMP-006", "XMP metadata shall contain %0"),
    /// XMP property with an invalid value
    InvalidXmpProperty => ("XMP-007", "XMP property %0 has invalid value %1"),

    // Embedded files
    /// EF not allowed
    EmbeddedFileNotAllowed => ("FILE-001", "file specification shall not contain the EF key"),
    /// Required file specification entry missing
    FileSpecMissingEntry => ("FILE-002", "file specification shall contain the %0 key"),
    /// Embedded file stream without MIME type
    EmbeddedFileMissingSubtype => ("FILE-003", "embedded file stream shall contain a MIME Subtype"),
    /// Embedded file stream without ModDate
    EmbeddedFileMissingModDate => ("FILE-004", "embedded file stream shall contain a Params dictionary with ModDate"),

    // Signatures and security
    /// Encrypt dictionary present
    EncryptionNotAllowed => ("SIG-001", "document shall not be encrypted"),
    /// Malformed ByteRange
    InvalidByteRange => ("SIG-002", "signature ByteRange shall be four integers starting at 0"),
    /// Reference key in a signature
    SignatureReferenceNotAllowed => ("SIG-003", "signature dictionary shall not contain the Reference key"),
    /// SubFilter not allowed
    SignatureSubFilterNotAllowed => ("SIG-004", "signature SubFilter %0 is not allowed"),
    /// Signature type not allowed
    SignatureTypeNotAllowed => ("SIG-005", "signature type %0 is not allowed"),

    // Content
    /// PostScript XObject or key
    PostScriptNotAllowed => ("CONTENT-001", "PostScript XObjects are not allowed"),
    /// Reference XObject
    ReferenceXObjectNotAllowed => ("CONTENT-002", "reference XObjects are not allowed"),
    /// Alternates / OPI on images or forms
    ImageEntryNotAllowed => ("CONTENT-003", "XObject dictionary shall not contain the %0 key"),
    /// Interpolate true
    ImageInterpolation => ("CONTENT-004", "image Interpolate flag shall be false"),
    /// Undefined operator
    UndefinedOperator => ("CONTENT-005", "content stream operator %0 is not defined"),
    /// Named resource not found
    UndefinedResource => ("CONTENT-006", "%1 resource %0 is not defined"),
    /// Text shown without Tf
    TextWithoutFont => ("CONTENT-007", "text shown without a selected font"),
    /// Graphics state parameter not allowed
    ExtGStateKeyNotAllowed => ("CONTENT-008", "graphics state parameter %0 is not allowed"),
    /// Malformed JPEG2000 data
    InvalidJpx => ("CONTENT-009", "JPEG2000 image is invalid: %0"),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compliance warning (non-fatal issue).
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceWarning {
    /// Warning code.
    pub code: WarningCode,
    /// Human-readable message.
    pub message: String,
    /// Location in the document (if applicable).
    pub location: Option<String>,
}

impl ComplianceWarning {
    /// Create a new compliance warning.
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ComplianceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

/// Warning codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// Catalog has no Lang entry
    MissingLanguage,
    /// DeviceN colorant missing from, or disagreeing with, its Colorants entry
    ColorantMismatch,
    /// Stream skipped because its filter cannot be decoded
    UndecodableStream,
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            WarningCode::MissingLanguage => "WARN-001",
            WarningCode::ColorantMismatch => "WARN-002",
            WarningCode::UndecodableStream => "WARN-003",
        };
        write!(f, "{}", code)
    }
}

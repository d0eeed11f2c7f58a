//! Color space classification and color/transparency usage tracking.
//!
//! Device color usage is recorded while the document is traversed and judged
//! only once a scope is complete (the whole document for PDF/A-1 to 3, each
//! page for PDF/A-4), because an output intent or a `Default*` color space
//! seen later can still justify it.

use crate::document::PdfDocument;
use crate::error::Result;
use crate::object::{Object, ObjectRef};
use bitflags::bitflags;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Owner used for usage that happens outside any page or indirect node.
pub const DOCUMENT_OWNER: ObjectRef = ObjectRef { id: 0, gen: 65535 };

bitflags! {
    /// Kinds of usage a node can contribute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UsageKinds: u8 {
        /// DeviceRGB (three-channel) color
        const RGB = 0b0001;
        /// DeviceCMYK (four-channel) color
        const CMYK = 0b0010;
        /// DeviceGray (single-channel) color
        const GRAY = 0b0100;
        /// Member of a transparency group / uses transparency
        const TRANSPARENCY = 0b1000;
    }
}

/// Color space families (ISO 32000-1:2008, 8.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpaceFamily {
    /// DeviceGray
    DeviceGray,
    /// DeviceRGB
    DeviceRgb,
    /// DeviceCMYK
    DeviceCmyk,
    /// CalGray
    CalGray,
    /// CalRGB
    CalRgb,
    /// Lab
    Lab,
    /// ICCBased
    IccBased,
    /// Indexed
    Indexed,
    /// Separation
    Separation,
    /// DeviceN
    DeviceN,
    /// Pattern
    Pattern,
}

impl ColorSpaceFamily {
    /// Family for a color space name (full names only).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DeviceGray" => Some(ColorSpaceFamily::DeviceGray),
            "DeviceRGB" => Some(ColorSpaceFamily::DeviceRgb),
            "DeviceCMYK" => Some(ColorSpaceFamily::DeviceCmyk),
            "CalGray" => Some(ColorSpaceFamily::CalGray),
            "CalRGB" => Some(ColorSpaceFamily::CalRgb),
            "Lab" => Some(ColorSpaceFamily::Lab),
            "ICCBased" => Some(ColorSpaceFamily::IccBased),
            "Indexed" => Some(ColorSpaceFamily::Indexed),
            "Separation" => Some(ColorSpaceFamily::Separation),
            "DeviceN" => Some(ColorSpaceFamily::DeviceN),
            "Pattern" => Some(ColorSpaceFamily::Pattern),
            _ => None,
        }
    }

    /// Family of a (resolved) color space object: a name or an array whose
    /// first element names the family.
    pub fn of(doc: &PdfDocument, cs: &Object) -> Result<Option<Self>> {
        Ok(match doc.resolve(cs)? {
            Object::Name(name) => Self::from_name(name),
            Object::Array(items) => match items.first() {
                Some(first) => doc.resolve(first)?.as_name().and_then(Self::from_name),
                None => None,
            },
            _ => None,
        })
    }

    /// Device usage this family represents on its own.
    pub fn device_usage(self) -> UsageKinds {
        match self {
            ColorSpaceFamily::DeviceGray => UsageKinds::GRAY,
            ColorSpaceFamily::DeviceRgb => UsageKinds::RGB,
            ColorSpaceFamily::DeviceCmyk => UsageKinds::CMYK,
            _ => UsageKinds::empty(),
        }
    }

    /// Name of the `Default*` resource that replaces this device family.
    pub fn default_resource_name(self) -> Option<&'static str> {
        match self {
            ColorSpaceFamily::DeviceGray => Some("DefaultGray"),
            ColorSpaceFamily::DeviceRgb => Some("DefaultRGB"),
            ColorSpaceFamily::DeviceCmyk => Some("DefaultCMYK"),
            _ => None,
        }
    }
}

/// Output intent color model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputIntentColor {
    /// RGB destination profile
    Rgb,
    /// CMYK destination profile
    Cmyk,
    /// Gray destination profile
    Gray,
    /// No output intent
    #[default]
    None,
}

impl OutputIntentColor {
    /// Label for a profile with `n` components.
    pub fn from_components(n: u32) -> Self {
        match n {
            1 => OutputIntentColor::Gray,
            3 => OutputIntentColor::Rgb,
            4 => OutputIntentColor::Cmyk,
            _ => OutputIntentColor::None,
        }
    }

    /// Whether any intent is present.
    pub fn is_some(self) -> bool {
        self != OutputIntentColor::None
    }
}

/// Usage record of one scope: owning nodes per usage kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorUsage {
    rgb: BTreeSet<ObjectRef>,
    cmyk: BTreeSet<ObjectRef>,
    gray: BTreeSet<ObjectRef>,
    transparency: BTreeSet<ObjectRef>,
}

impl ColorUsage {
    fn insert(&mut self, kinds: UsageKinds, owner: ObjectRef) {
        if kinds.contains(UsageKinds::RGB) {
            self.rgb.insert(owner);
        }
        if kinds.contains(UsageKinds::CMYK) {
            self.cmyk.insert(owner);
        }
        if kinds.contains(UsageKinds::GRAY) {
            self.gray.insert(owner);
        }
        if kinds.contains(UsageKinds::TRANSPARENCY) {
            self.transparency.insert(owner);
        }
    }

    /// Nodes that used DeviceRGB.
    pub fn rgb(&self) -> &BTreeSet<ObjectRef> {
        &self.rgb
    }

    /// Nodes that used DeviceCMYK.
    pub fn cmyk(&self) -> &BTreeSet<ObjectRef> {
        &self.cmyk
    }

    /// Nodes that used DeviceGray.
    pub fn gray(&self) -> &BTreeSet<ObjectRef> {
        &self.gray
    }

    /// Nodes that use transparency.
    pub fn transparency(&self) -> &BTreeSet<ObjectRef> {
        &self.transparency
    }

    /// Kinds with at least one recorded owner.
    pub fn kinds(&self) -> UsageKinds {
        let mut kinds = UsageKinds::empty();
        kinds.set(UsageKinds::RGB, !self.rgb.is_empty());
        kinds.set(UsageKinds::CMYK, !self.cmyk.is_empty());
        kinds.set(UsageKinds::GRAY, !self.gray.is_empty());
        kinds.set(UsageKinds::TRANSPARENCY, !self.transparency.is_empty());
        kinds
    }
}

/// Per-session usage tracker with a document scope and one scope per page.
///
/// Usage is attributed to every indirect node currently being checked (the
/// owner stack), so a node that is reached again later (a shared form, image
/// or color space) can replay its usage into the current page without being
/// traversed twice.
#[derive(Debug, Default)]
pub struct UsageTracker {
    document: ColorUsage,
    pages: BTreeMap<ObjectRef, ColorUsage>,
    current_page: Option<ObjectRef>,
    node_kinds: HashMap<ObjectRef, UsageKinds>,
    owners: Vec<ObjectRef>,
}

impl UsageTracker {
    /// Start a page scope.
    pub fn begin_page(&mut self, page: ObjectRef) {
        self.current_page = Some(page);
        self.owners.clear();
        self.owners.push(page);
        self.pages.entry(page).or_default();
    }

    /// Leave the page scope.
    pub fn end_page(&mut self) {
        self.current_page = None;
        self.owners.clear();
    }

    /// Push an indirect node that is about to be checked.
    pub fn enter(&mut self, node: ObjectRef) {
        self.owners.push(node);
    }

    /// Pop the node pushed by [`enter`](Self::enter).
    pub fn leave(&mut self) {
        self.owners.pop();
    }

    /// Record usage for the innermost owner and all its ancestors.
    pub fn record(&mut self, kinds: UsageKinds) {
        if kinds.is_empty() {
            return;
        }
        let owner = self
            .owners
            .last()
            .copied()
            .or(self.current_page)
            .unwrap_or(DOCUMENT_OWNER);
        for node in &self.owners {
            *self.node_kinds.entry(*node).or_insert(UsageKinds::empty()) |= kinds;
        }
        self.document.insert(kinds, owner);
        if let Some(page) = self.current_page {
            self.pages.entry(page).or_default().insert(kinds, owner);
        }
    }

    /// Replay the usage of an already checked node into the current scope.
    pub fn replay(&mut self, node: ObjectRef) {
        if let Some(kinds) = self.node_kinds.get(&node).copied() {
            self.owners.push(node);
            self.record(kinds);
            self.owners.pop();
        }
    }

    /// Usage accumulated by a node (including nodes it reached).
    pub fn kinds_of(&self, node: ObjectRef) -> UsageKinds {
        self.node_kinds.get(&node).copied().unwrap_or(UsageKinds::empty())
    }

    /// Document scope.
    pub fn document(&self) -> &ColorUsage {
        &self.document
    }

    /// Scope of one page.
    pub fn page(&self, page: ObjectRef) -> Option<&ColorUsage> {
        self.pages.get(&page)
    }
}

/// A separation's first definition.
#[derive(Debug, Clone)]
struct SeparationEntry {
    alternate: Object,
    tint_transform: Object,
}

/// Registry of Separation color spaces by colorant name.
///
/// All Separation spaces with the same name shall have the same alternate
/// space and tint transform.
#[derive(Debug, Default)]
pub struct SeparationRegistry {
    entries: HashMap<String, SeparationEntry>,
}

impl SeparationRegistry {
    /// Register a separation; returns `false` if it contradicts an earlier one.
    pub fn register(&mut self, doc: &PdfDocument, name: &str, alternate: &Object, tint_transform: &Object) -> Result<bool> {
        match self.entries.get(name) {
            Some(entry) => Ok(objects_equal(doc, &entry.alternate, alternate, 0)?
                && objects_equal(doc, &entry.tint_transform, tint_transform, 0)?),
            None => {
                self.entries.insert(
                    name.to_string(),
                    SeparationEntry {
                        alternate: alternate.clone(),
                        tint_transform: tint_transform.clone(),
                    },
                );
                Ok(true)
            },
        }
    }

    /// Number of distinct colorant names seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no separation was registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const MAX_COMPARE_DEPTH: u32 = 32;

/// Structural equality with references resolved. Equal references are equal
/// without being resolved.
pub fn objects_equal(doc: &PdfDocument, a: &Object, b: &Object, depth: u32) -> Result<bool> {
    if a == b {
        return Ok(true);
    }
    if depth >= MAX_COMPARE_DEPTH {
        return Ok(false);
    }
    let a = doc.resolve(a)?;
    let b = doc.resolve(b)?;
    match (a, b) {
        (Object::Array(x), Object::Array(y)) => {
            if x.len() != y.len() {
                return Ok(false);
            }
            for (p, q) in x.iter().zip(y) {
                if !objects_equal(doc, p, q, depth + 1)? {
                    return Ok(false);
                }
            }
            Ok(true)
        },
        (Object::Dictionary(x), Object::Dictionary(y)) => dicts_equal(doc, x, y, depth),
        (Object::Stream { dict: x, data: dx }, Object::Stream { dict: y, data: dy }) => {
            Ok(dx == dy && dicts_equal(doc, x, y, depth)?)
        },
        (Object::Integer(i), Object::Real(r)) | (Object::Real(r), Object::Integer(i)) => Ok(*i as f64 == *r),
        (x, y) => Ok(x == y),
    }
}

fn dicts_equal(
    doc: &PdfDocument,
    x: &crate::object::Dictionary,
    y: &crate::object::Dictionary,
    depth: u32,
) -> Result<bool> {
    if x.len() != y.len() {
        return Ok(false);
    }
    for (key, value) in x {
        match y.get(key) {
            Some(other) if objects_equal(doc, value, other, depth + 1)? => {},
            _ => return Ok(false),
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Dictionary;

    fn r(id: u32) -> ObjectRef {
        ObjectRef::new(id, 0)
    }

    #[test]
    fn test_record_attributes_to_owner_and_ancestors() {
        let mut tracker = UsageTracker::default();
        tracker.begin_page(r(10));
        tracker.enter(r(20));
        tracker.enter(r(30));
        tracker.record(UsageKinds::CMYK);
        tracker.leave();
        tracker.leave();

        assert!(tracker.document().cmyk().contains(&r(30)));
        assert_eq!(tracker.kinds_of(r(20)), UsageKinds::CMYK);
        assert_eq!(tracker.kinds_of(r(10)), UsageKinds::CMYK);
        assert!(tracker.page(r(10)).unwrap().cmyk().contains(&r(30)));
    }

    #[test]
    fn test_replay_into_second_page() {
        let mut tracker = UsageTracker::default();
        tracker.begin_page(r(1));
        tracker.enter(r(5));
        tracker.record(UsageKinds::RGB | UsageKinds::TRANSPARENCY);
        tracker.leave();
        tracker.end_page();

        tracker.begin_page(r(2));
        tracker.replay(r(5));
        let page = tracker.page(r(2)).unwrap();
        assert_eq!(page.kinds(), UsageKinds::RGB | UsageKinds::TRANSPARENCY);
        assert!(page.rgb().contains(&r(5)));
    }

    #[test]
    fn test_usage_outside_pages_goes_to_document() {
        let mut tracker = UsageTracker::default();
        tracker.record(UsageKinds::GRAY);
        assert!(tracker.document().gray().contains(&DOCUMENT_OWNER));
    }

    #[test]
    fn test_family_classification() {
        let doc = PdfDocument::default();
        let icc = Object::Array(vec![Object::name("ICCBased"), Object::Reference(r(4))]);
        assert_eq!(ColorSpaceFamily::of(&doc, &icc).unwrap(), Some(ColorSpaceFamily::IccBased));
        assert_eq!(
            ColorSpaceFamily::of(&doc, &Object::name("DeviceCMYK")).unwrap(),
            Some(ColorSpaceFamily::DeviceCmyk)
        );
        assert_eq!(ColorSpaceFamily::of(&doc, &Object::name("Bogus")).unwrap(), None);
        assert_eq!(ColorSpaceFamily::DeviceRgb.default_resource_name(), Some("DefaultRGB"));
    }

    #[test]
    fn test_separation_registry() {
        let mut doc = PdfDocument::default();
        let mut func = Dictionary::new();
        func.insert("FunctionType".to_string(), Object::Integer(2));
        let f1 = doc.add_object(Object::Dictionary(func.clone()));
        let f2 = doc.add_object(Object::Dictionary(func));

        let mut registry = SeparationRegistry::default();
        let cmyk = Object::name("DeviceCMYK");
        assert!(registry.register(&doc, "Spot", &cmyk, &Object::Reference(f1)).unwrap());
        // Different reference, identical function.
        assert!(registry.register(&doc, "Spot", &cmyk, &Object::Reference(f2)).unwrap());
        assert!(!registry
            .register(&doc, "Spot", &Object::name("DeviceRGB"), &Object::Reference(f1))
            .unwrap());
        assert_eq!(registry.len(), 1);
    }
}

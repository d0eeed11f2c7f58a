//! In-memory PDF document model.
//!
//! The checker consumes documents through this read-only view: an arena of
//! indirect objects keyed by [`ObjectRef`], the trailer, the header version and
//! the page tree. Producing this model from bytes is the job of a PDF reader;
//! here documents are assembled programmatically or loaded from JSON fixtures
//! (see [`crate::fixture`]).

use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use std::collections::{BTreeMap, HashSet};

/// Maximum number of reference hops followed when resolving an object.
pub const MAX_RESOLVE_DEPTH: u32 = 32;

/// A PDF document held as an object arena.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    version: (u8, u8),
    objects: BTreeMap<ObjectRef, Object>,
    trailer: Dictionary,
    flushed: HashSet<ObjectRef>,
    next_id: u32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new((1, 7))
    }
}

impl PdfDocument {
    /// Create an empty document with the given header version.
    pub fn new(version: (u8, u8)) -> Self {
        Self {
            version,
            objects: BTreeMap::new(),
            trailer: Dictionary::new(),
            flushed: HashSet::new(),
            next_id: 1,
        }
    }

    /// PDF header version (major, minor).
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Add an indirect object and return its reference.
    pub fn add_object(&mut self, obj: Object) -> ObjectRef {
        let obj_ref = ObjectRef::new(self.next_id, 0);
        self.next_id += 1;
        self.objects.insert(obj_ref, obj);
        obj_ref
    }

    /// Insert or replace an indirect object under a fixed reference.
    pub fn set_object(&mut self, obj_ref: ObjectRef, obj: Object) {
        self.next_id = self.next_id.max(obj_ref.id + 1);
        self.objects.insert(obj_ref, obj);
    }

    /// Load an indirect object.
    pub fn load_object(&self, obj_ref: ObjectRef) -> Result<&Object> {
        self.objects
            .get(&obj_ref)
            .ok_or(Error::ObjectNotFound(obj_ref.id, obj_ref.gen))
    }

    /// Number of indirect objects in the document.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Iterate over all indirect objects in reference order.
    pub fn objects(&self) -> impl Iterator<Item = (&ObjectRef, &Object)> {
        self.objects.iter()
    }

    /// Follow references until a direct object is reached.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        let mut current = obj;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match current {
                Object::Reference(r) => current = self.load_object(*r)?,
                other => return Ok(other),
            }
        }
        match obj {
            Object::Reference(r) => Err(Error::CircularReference(*r)),
            _ => Err(Error::RecursionLimitExceeded(MAX_RESOLVE_DEPTH)),
        }
    }

    /// Resolve an object and view it as a dictionary (streams included).
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Result<Option<&'a Dictionary>> {
        Ok(self.resolve(obj)?.as_dict())
    }

    /// Resolve a dictionary entry, returning `None` when the key is absent.
    pub fn get<'a>(&'a self, dict: &'a Dictionary, key: &str) -> Result<Option<&'a Object>> {
        dict.get(key).map(|obj| self.resolve(obj)).transpose()
    }

    /// The trailer dictionary.
    pub fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    /// Mutable access to the trailer dictionary.
    pub fn trailer_mut(&mut self) -> &mut Dictionary {
        &mut self.trailer
    }

    /// Reference to the document catalog (`/Root` in the trailer).
    pub fn catalog_ref(&self) -> Result<ObjectRef> {
        self.trailer
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidPdf("Trailer has no /Root reference".to_string()))
    }

    /// The document catalog dictionary.
    pub fn catalog(&self) -> Result<&Dictionary> {
        let catalog_ref = self.catalog_ref()?;
        self.load_object(catalog_ref)?
            .as_dict()
            .ok_or_else(|| Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: "catalog of another type".to_string(),
            })
    }

    /// Mark an object as already written out by an earlier pass.
    pub fn mark_flushed(&mut self, obj_ref: ObjectRef) {
        self.flushed.insert(obj_ref);
    }

    /// Whether an object was written out (and checked) by an earlier pass.
    pub fn is_flushed(&self, obj_ref: ObjectRef) -> bool {
        self.flushed.contains(&obj_ref)
    }

    /// Enumerate pages in document order.
    ///
    /// `Resources` and `MediaBox` are inherited from ancestor page-tree nodes.
    /// A page tree that loops back on itself is reported as a circular
    /// reference.
    pub fn pages(&self) -> Result<Vec<Page<'_>>> {
        let catalog = self.catalog()?;
        let root = match catalog.get("Pages").and_then(Object::as_reference) {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };

        let mut pages = Vec::new();
        let mut visited = HashSet::new();
        self.collect_pages(root, None, None, &mut visited, &mut pages)?;
        Ok(pages)
    }

    fn collect_pages<'a>(
        &'a self,
        node_ref: ObjectRef,
        inherited_resources: Option<&'a Dictionary>,
        inherited_media_box: Option<&'a Object>,
        visited: &mut HashSet<ObjectRef>,
        pages: &mut Vec<Page<'a>>,
    ) -> Result<()> {
        if !visited.insert(node_ref) {
            return Err(Error::CircularReference(node_ref));
        }
        let node = self.load_object(node_ref)?.as_dict().ok_or_else(|| Error::InvalidObjectType {
            expected: "Dictionary".to_string(),
            found: format!("page tree node {}", node_ref),
        })?;

        let resources = match node.get("Resources") {
            Some(obj) => self.resolve_dict(obj)?,
            None => inherited_resources,
        };
        let media_box = match node.get("MediaBox") {
            Some(obj) => Some(self.resolve(obj)?),
            None => inherited_media_box,
        };

        match node.get("Kids").map(|k| self.resolve(k)).transpose()? {
            Some(Object::Array(kids)) if node.get("Type").and_then(Object::as_name) != Some("Page") => {
                for kid in kids {
                    if let Some(kid_ref) = kid.as_reference() {
                        self.collect_pages(kid_ref, resources, media_box, visited, pages)?;
                    }
                }
            },
            _ => pages.push(Page {
                obj_ref: node_ref,
                dict: node,
                resources,
                media_box,
                index: pages.len(),
            }),
        }
        Ok(())
    }
}

/// One page of a document with its inherited attributes resolved.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// Reference of the page object
    pub obj_ref: ObjectRef,
    /// The page dictionary
    pub dict: &'a Dictionary,
    resources: Option<&'a Dictionary>,
    media_box: Option<&'a Object>,
    index: usize,
}

impl<'a> Page<'a> {
    /// Zero-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Effective resource dictionary (own or inherited).
    pub fn resources(&self) -> Option<&'a Dictionary> {
        self.resources
    }

    /// Effective media box as `[llx, lly, urx, ury]`.
    pub fn media_box(&self) -> Option<[f64; 4]> {
        let arr = self.media_box?.as_array()?;
        if arr.len() != 4 {
            return None;
        }
        let mut rect = [0.0; 4];
        for (slot, value) in rect.iter_mut().zip(arr) {
            *slot = value.as_number()?;
        }
        Some(rect)
    }

    /// Annotation dictionaries with their references (direct annotations have none).
    pub fn annotations(&self, doc: &'a PdfDocument) -> Result<Vec<(Option<ObjectRef>, &'a Dictionary)>> {
        let annots = match doc.get(self.dict, "Annots")? {
            Some(Object::Array(arr)) => arr,
            _ => return Ok(Vec::new()),
        };
        let mut out = Vec::with_capacity(annots.len());
        for annot in annots {
            if let Some(dict) = doc.resolve_dict(annot)? {
                out.push((annot.as_reference(), dict));
            }
        }
        Ok(out)
    }

    /// Content streams of the page: a single stream or an array of streams.
    pub fn content_streams(&self, doc: &'a PdfDocument) -> Result<Vec<(Option<ObjectRef>, &'a Object)>> {
        let contents = match self.dict.get("Contents") {
            Some(obj) => obj,
            None => return Ok(Vec::new()),
        };
        let items: Vec<&'a Object> = match doc.resolve(contents)? {
            Object::Array(arr) => arr.iter().collect(),
            _ => vec![contents],
        };
        let mut streams = Vec::with_capacity(items.len());
        for item in items {
            let resolved = doc.resolve(item)?;
            if resolved.is_stream() {
                streams.push((item.as_reference(), resolved));
            }
        }
        Ok(streams)
    }
}

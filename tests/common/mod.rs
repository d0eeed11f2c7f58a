//! Document builders shared by the integration tests.

#![allow(dead_code)]

use pdfa_oxide::document::PdfDocument;
use pdfa_oxide::object::{Dictionary, Object, ObjectRef};

pub const CATALOG: ObjectRef = ObjectRef { id: 1, gen: 0 };
pub const PAGES: ObjectRef = ObjectRef { id: 2, gen: 0 };
pub const PAGE: ObjectRef = ObjectRef { id: 3, gen: 0 };
pub const CONTENT: ObjectRef = ObjectRef { id: 4, gen: 0 };

pub fn dict(entries: Vec<(&str, Object)>) -> Dictionary {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn dict_obj(entries: Vec<(&str, Object)>) -> Object {
    Object::Dictionary(dict(entries))
}

/// A 128-byte ICC header for an output profile.
pub fn icc_profile(color_space: &[u8; 4], major: u8) -> Vec<u8> {
    let mut data = vec![0u8; 128];
    data[0..4].copy_from_slice(&128u32.to_be_bytes());
    data[8] = major;
    data[12..16].copy_from_slice(b"prtr");
    data[16..20].copy_from_slice(color_space);
    data[36..40].copy_from_slice(b"acsp");
    data
}

/// XMP packet with a PDF/A identification.
pub fn xmp_packet(part: &str, conformance: Option<&str>) -> String {
    xmp_packet_with(part, conformance, "")
}

/// XMP packet with a PDF/A identification and extra properties.
pub fn xmp_packet_with(part: &str, conformance: Option<&str>, extra: &str) -> String {
    let conformance = conformance
        .map(|c| format!("<pdfaid:conformance>{}</pdfaid:conformance>", c))
        .unwrap_or_default();
    format!(
        r#"<?xpacket begin="" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/" xmlns:xmpMM="http://ns.adobe.com/xap/1.0/mm/">
      <pdfaid:part>{}</pdfaid:part>
      {}
      {}
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
        part, conformance, extra
    )
}

/// PDF/A-4 identification: revision year and a one-event history.
pub fn xmp_packet_a4() -> String {
    xmp_packet_with(
        "4",
        None,
        r#"<pdfaid:rev>2020</pdfaid:rev>
      <xmpMM:History>
        <rdf:Seq>
          <rdf:li rdf:parseType="Resource">
            <stEvt:action xmlns:stEvt="http://ns.adobe.com/xap/1.0/sType/ResourceEvent#">created</stEvt:action>
          </rdf:li>
        </rdf:Seq>
      </xmpMM:History>"#,
    )
}

/// Builds a one-page document piece by piece.
pub struct DocumentBuilder {
    version: (u8, u8),
    catalog: Dictionary,
    page: Dictionary,
    content: Vec<u8>,
    extra: Vec<(ObjectRef, Object)>,
}

impl DocumentBuilder {
    /// A level "B" skeleton: metadata, trailer ID, one page and an empty
    /// content stream. No output intent.
    pub fn new(version: (u8, u8), part: &str) -> Self {
        Self::with_metadata(version, xmp_packet(part, Some("B")))
    }

    /// Same skeleton around a caller-supplied XMP packet.
    pub fn with_metadata(version: (u8, u8), packet: String) -> Self {
        let metadata = Object::stream(
            dict(vec![("Type", Object::name("Metadata")), ("Subtype", Object::name("XML"))]),
            packet.into_bytes(),
        );
        let catalog = dict(vec![
            ("Type", Object::name("Catalog")),
            ("Pages", Object::Reference(PAGES)),
            ("Metadata", metadata),
            ("Lang", Object::string("en-US")),
        ]);
        let page = dict(vec![
            ("Type", Object::name("Page")),
            ("Parent", Object::Reference(PAGES)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(CONTENT)),
        ]);
        Self {
            version,
            catalog,
            page,
            content: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn pdf_a1b() -> Self {
        Self::new((1, 4), "1")
    }

    pub fn pdf_a2b() -> Self {
        Self::new((1, 7), "2")
    }

    /// PDF 2.0 header, part 4 without a conformance letter.
    pub fn pdf_a4() -> Self {
        Self::with_metadata((2, 0), xmp_packet_a4())
    }

    /// Add a GTS_PDFA1 output intent with a profile of `color_space`.
    pub fn output_intent(mut self, color_space: &[u8; 4], components: i64) -> Self {
        let profile = Object::stream(dict(vec![("N", Object::Integer(components))]), icc_profile(color_space, 2));
        let intent = dict_obj(vec![
            ("Type", Object::name("OutputIntent")),
            ("S", Object::name("GTS_PDFA1")),
            ("OutputConditionIdentifier", Object::string("Custom")),
            ("DestOutputProfile", profile),
        ]);
        self.catalog.insert("OutputIntents".to_string(), Object::Array(vec![intent]));
        self
    }

    pub fn catalog_entry(mut self, key: &str, value: Object) -> Self {
        self.catalog.insert(key.to_string(), value);
        self
    }

    pub fn without_catalog_entry(mut self, key: &str) -> Self {
        self.catalog.shift_remove(key);
        self
    }

    pub fn page_entry(mut self, key: &str, value: Object) -> Self {
        self.page.insert(key.to_string(), value);
        self
    }

    pub fn content(mut self, data: &[u8]) -> Self {
        self.content = data.to_vec();
        self
    }

    pub fn object(mut self, obj_ref: ObjectRef, obj: Object) -> Self {
        self.extra.push((obj_ref, obj));
        self
    }

    pub fn build(self) -> PdfDocument {
        let mut doc = PdfDocument::new(self.version);
        doc.set_object(CATALOG, Object::Dictionary(self.catalog));
        doc.set_object(
            PAGES,
            dict_obj(vec![
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(vec![Object::Reference(PAGE)])),
                ("Count", Object::Integer(1)),
            ]),
        );
        doc.set_object(PAGE, Object::Dictionary(self.page));
        doc.set_object(CONTENT, Object::stream(Dictionary::new(), self.content));
        for (obj_ref, obj) in self.extra {
            doc.set_object(obj_ref, obj);
        }
        doc.trailer_mut().insert("Root".to_string(), Object::Reference(CATALOG));
        doc.trailer_mut().insert(
            "ID".to_string(),
            Object::Array(vec![Object::string("0123456789"), Object::string("0123456789")]),
        );
        doc
    }
}

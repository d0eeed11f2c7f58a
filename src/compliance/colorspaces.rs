//! Output intents, color spaces, color operators and device color usage.

use super::checker::{fail, PdfAChecker};
use super::color::{objects_equal, ColorSpaceFamily, ColorUsage, OutputIntentColor, UsageKinds};
use super::icc::IccHeader;
use super::resources::lookup_resource;
use super::session::{OutputIntent, ValidationSession};
use super::types::{ComplianceWarning, ConformanceError, ErrorCode, WarningCode};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::object::{dict_name, Dictionary, Object, ObjectRef};
use std::collections::BTreeSet;

/// Element `index` of a color space array.
fn color_space_operand<'a>(items: &'a [Object], index: usize, family: &str) -> Result<&'a Object> {
    match items.get(index) {
        Some(item) => Ok(item),
        None => fail(
            ConformanceError::new(ErrorCode::InvalidColorSpace)
                .with_param(format!("{} with {} elements", family, items.len())),
        ),
    }
}

fn warn_colorant(session: &mut ValidationSession<'_>, message: String) {
    let warning = ComplianceWarning::new(WarningCode::ColorantMismatch, message);
    let warning = match session.location() {
        Some(location) => warning.with_location(location),
        None => warning,
    };
    session.warn(warning);
}

/// Output intent subtype that identifies the PDF/A intent.
pub const PDFA_OUTPUT_INTENT: &str = "GTS_PDFA1";

/// Read the PDF/A output intent from an `OutputIntents` array.
///
/// The first `GTS_PDFA1` entry with a destination profile wins. The color
/// model comes from the profile stream's `N`, or from its header.
pub fn read_output_intent(doc: &PdfDocument, intents: Option<&Object>) -> Result<OutputIntent> {
    let items = match intents.map(|obj| doc.resolve(obj)).transpose()? {
        Some(Object::Array(items)) => items,
        _ => return Ok(OutputIntent::default()),
    };
    for item in items {
        let dict = match doc.resolve_dict(item)? {
            Some(dict) => dict,
            None => continue,
        };
        if dict_name(dict, "S") != Some(PDFA_OUTPUT_INTENT) {
            continue;
        }
        let profile = match doc.get(dict, "DestOutputProfile")? {
            Some(profile) if profile.is_stream() => profile,
            _ => continue,
        };
        let data = profile.decode_stream_data()?;
        let components = profile
            .as_dict()
            .and_then(|d| d.get("N"))
            .and_then(Object::as_integer)
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| IccHeader::parse(&data).ok().and_then(|h| h.components()));
        return Ok(OutputIntent {
            color: components.map(OutputIntentColor::from_components).unwrap_or_default(),
            profile: Some(data),
        });
    }
    Ok(OutputIntent::default())
}

impl PdfAChecker {
    pub(crate) fn resolve_output_intent(
        &self,
        session: &ValidationSession<'_>,
        intents: Option<&Object>,
    ) -> Result<OutputIntent> {
        let intent = read_output_intent(session.document(), intents)?;
        log::debug!("Output intent: {:?}", intent.color);
        Ok(intent)
    }

    /// Consistency of an `OutputIntents` array (document or page).
    pub(crate) fn check_output_intents(&self, session: &ValidationSession<'_>, intents: Option<&Object>) -> Result<()> {
        let doc = session.document();
        let items = match intents.map(|obj| doc.resolve(obj)).transpose()? {
            Some(Object::Array(items)) => items,
            _ => return Ok(()),
        };
        let clause = self.clause("6.2.2", "6.2.3");

        let mut first_profile: Option<&Object> = None;
        for item in items {
            let dict = match doc.resolve_dict(item)? {
                Some(dict) => dict,
                None => continue,
            };
            let profile = dict.get("DestOutputProfile");
            if dict_name(dict, "S") == Some(PDFA_OUTPUT_INTENT) {
                match profile {
                    Some(p) => self.check_destination_profile(session, p)?,
                    None => {
                        return fail(ConformanceError::new(ErrorCode::OutputIntentMissingProfile).with_clause(clause))
                    },
                }
            }
            if let Some(profile) = profile {
                match first_profile {
                    None => first_profile = Some(profile),
                    Some(first) if !objects_equal(doc, first, profile, 0)? => {
                        return fail(ConformanceError::new(ErrorCode::OutputIntentProfilesDiffer).with_clause(clause))
                    },
                    Some(_) => {},
                }
            }
        }
        Ok(())
    }

    fn check_destination_profile(&self, session: &ValidationSession<'_>, profile: &Object) -> Result<()> {
        let stream = session.document().resolve(profile)?;
        if !stream.is_stream() {
            return fail(ConformanceError::new(ErrorCode::InvalidIccProfile).with_param("DestOutputProfile is not a stream"));
        }
        let data = stream.decode_stream_data()?;
        let header = match IccHeader::parse(&data) {
            Ok(header) => header,
            Err(reason) => return fail(ConformanceError::new(ErrorCode::InvalidIccProfile).with_param(reason)),
        };
        if !header.is_output_class() {
            return fail(
                ConformanceError::new(ErrorCode::InvalidIccProfile)
                    .with_param("destination profile shall be an output or monitor profile"),
            );
        }
        self.check_icc_version(&header)
    }

    fn check_icc_version(&self, header: &IccHeader) -> Result<()> {
        let max = self.policy().icc_max_major_version;
        if header.major_version > max {
            return fail(
                ConformanceError::new(ErrorCode::IccProfileVersionMismatch)
                    .with_param(format!("{}.{}", header.major_version, header.minor_version))
                    .with_param(max),
            );
        }
        Ok(())
    }

    /// Check a color space object (name, array, or a reference to either).
    ///
    /// Indirect color spaces are checked once; later uses replay their
    /// recorded device usage.
    pub(crate) fn check_color_space(
        &self,
        session: &mut ValidationSession<'_>,
        cs: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let node = cs.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = session.descend().and_then(|_| {
            let result = self.check_color_space_value(session, cs, resources);
            session.ascend();
            result
        });
        session.end_node(node);
        result
    }

    fn check_color_space_value(
        &self,
        session: &mut ValidationSession<'_>,
        cs: &Object,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        let items = match doc.resolve(cs)? {
            Object::Name(name) => return self.check_color_space_name(session, name, resources),
            Object::Array(items) => items,
            other => {
                return fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param(other.type_name()))
            },
        };

        let family = match items.first().map(|f| doc.resolve(f)).transpose()?.and_then(Object::as_name) {
            Some(family) => family,
            None => return fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param("array without a family name")),
        };
        let operand = |index: usize| color_space_operand(items, index, family);

        match family {
            "DeviceGray" | "DeviceRGB" | "DeviceCMYK" | "Pattern" if items.len() == 1 => {
                self.check_color_space_name(session, family, resources)
            },
            "CalGray" | "CalRGB" | "Lab" => Ok(()),
            "ICCBased" => self.check_icc_based(session, operand(1)?),
            "Indexed" | "I" => self.check_color_space(session, operand(1)?, resources),
            "Pattern" => self.check_color_space(session, operand(1)?, resources),
            "Separation" => {
                let name = doc.resolve(operand(1)?)?.as_name().unwrap_or_default();
                let alternate = operand(2)?;
                let tint_transform = operand(3)?;
                self.check_separation(session, name, alternate, tint_transform)?;
                self.check_color_space(session, alternate, resources)
            },
            "DeviceN" => self.check_device_n(session, items, resources),
            other => fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param(other)),
        }
    }

    fn check_color_space_name(
        &self,
        session: &mut ValidationSession<'_>,
        name: &str,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        match ColorSpaceFamily::from_name(name) {
            Some(ColorSpaceFamily::Pattern) => Ok(()),
            Some(family) if !family.device_usage().is_empty() => self.record_device_color(session, family, resources),
            Some(_) => fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param(name)),
            None => match lookup_resource(session.document(), resources, "ColorSpace", name)? {
                Some(cs) => self.check_color_space(session, cs, resources),
                None => fail(
                    ConformanceError::new(ErrorCode::UndefinedColorSpace)
                        .with_param(name)
                        .at_location(session.location()),
                ),
            },
        }
    }

    /// Record use of a device family, unless a `Default*` color space in
    /// `resources` replaces it.
    pub(crate) fn record_device_color(
        &self,
        session: &mut ValidationSession<'_>,
        family: ColorSpaceFamily,
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        if self.policy().honor_default_color_spaces {
            if let Some(default_name) = family.default_resource_name() {
                if let Some(default_cs) = lookup_resource(session.document(), resources, "ColorSpace", default_name)? {
                    log::trace!("{:?} replaced by {}", family, default_name);
                    return self.check_color_space(session, default_cs, None);
                }
            }
        }
        session.usage.record(family.device_usage());
        Ok(())
    }

    fn check_icc_based(&self, session: &mut ValidationSession<'_>, stream: &Object) -> Result<()> {
        let doc = session.document();
        let resolved = doc.resolve(stream)?;
        let dict = match resolved {
            Object::Stream { dict, .. } => dict,
            _ => return fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param("ICCBased without a profile stream")),
        };
        let n = match dict.get("N").and_then(Object::as_integer) {
            Some(n @ (1 | 3 | 4)) => n as u32,
            other => {
                return fail(
                    ConformanceError::new(ErrorCode::InvalidColorSpace)
                        .with_param(format!("ICCBased with N {}", other.unwrap_or(0))),
                )
            },
        };

        let data = resolved.decode_stream_data()?;
        let header = match IccHeader::parse(&data) {
            Ok(header) => header,
            Err(reason) => return fail(ConformanceError::new(ErrorCode::InvalidIccProfile).with_param(reason)),
        };
        if header.components() != Some(n) {
            return fail(
                ConformanceError::new(ErrorCode::IccComponentMismatch)
                    .with_param(format!("ICCBased ({})", header.color_space_name()))
                    .with_param(header.components().unwrap_or(0))
                    .with_clause(self.clause("6.2.3.2", "6.2.4.2")),
            );
        }
        self.check_icc_version(&header)?;

        if let Some(alternate) = dict.get("Alternate") {
            self.check_color_space(session, alternate, None)?;
        }
        Ok(())
    }

    fn check_separation(
        &self,
        session: &mut ValidationSession<'_>,
        name: &str,
        alternate: &Object,
        tint_transform: &Object,
    ) -> Result<()> {
        let doc = session.document();
        if !session.separations.register(doc, name, alternate, tint_transform)? {
            return fail(
                ConformanceError::new(ErrorCode::SeparationMismatch)
                    .with_param(name)
                    .with_clause(self.clause("6.2.3.4", "6.2.4.4")),
            );
        }
        Ok(())
    }

    fn check_device_n(
        &self,
        session: &mut ValidationSession<'_>,
        items: &[Object],
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        let doc = session.document();
        let names = match items.get(1).map(|n| doc.resolve(n)).transpose()? {
            Some(Object::Array(names)) => names,
            _ => return fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param("DeviceN without colorant names")),
        };
        if let Some(max) = self.policy().limits.max_devicen_components {
            if names.len() > max {
                return fail(
                    ConformanceError::new(ErrorCode::DeviceNComponentsExceeded)
                        .with_param(names.len())
                        .with_param(max),
                );
            }
        }
        let alternate = match items.get(2) {
            Some(alternate) => alternate,
            None => return fail(ConformanceError::new(ErrorCode::InvalidColorSpace).with_param("DeviceN without alternate space")),
        };
        self.check_color_space(session, alternate, resources)?;

        let attributes = match items.get(4) {
            Some(attributes) => doc.resolve_dict(attributes)?,
            None => None,
        };
        let colorants = match attributes {
            Some(attributes) => doc.get(attributes, "Colorants")?.and_then(Object::as_dict),
            None => None,
        };
        if let Some(colorants) = colorants {
            let tint_transform = items.get(3);
            for (name, colorant) in colorants {
                self.check_color_space(session, colorant, None)?;
                let separation = match doc.resolve(colorant)? {
                    Object::Array(parts) if parts.first().and_then(Object::as_name) == Some("Separation") => parts,
                    _ => continue,
                };
                let same_alternate = match separation.get(2) {
                    Some(other) => objects_equal(doc, other, alternate, 0)?,
                    None => false,
                };
                let same_tint = match (separation.get(3), tint_transform) {
                    (Some(other), Some(tint)) => objects_equal(doc, other, tint, 0)?,
                    _ => false,
                };
                if !(same_alternate && same_tint) {
                    warn_colorant(
                        session,
                        format!("colorant {} differs from its DeviceN alternate space or tint transform", name),
                    );
                }
            }
        }

        let is_nchannel = attributes.and_then(|a| dict_name(a, "Subtype")) == Some("NChannel");
        if is_nchannel {
            for name in names.iter().filter_map(Object::as_name) {
                if name != "None" && !colorants.is_some_and(|c| c.contains_key(name)) {
                    warn_colorant(session, format!("NChannel colorant {} is not listed in Colorants", name));
                }
            }
        }
        Ok(())
    }

    /// Color operators: `cs`/`CS` select a space, `g`, `rg`, `k` (and their
    /// stroking forms) use a device space, `scn`/`SCN` may name a pattern.
    pub(crate) fn check_color_operator(
        &self,
        session: &mut ValidationSession<'_>,
        operator: &str,
        operands: &[Object],
        resources: Option<&Dictionary>,
    ) -> Result<()> {
        match operator {
            "cs" | "CS" => match operands.last() {
                Some(cs @ Object::Name(_)) => self.check_color_space(session, cs, resources),
                _ => Ok(()),
            },
            "g" | "G" => self.record_device_color(session, ColorSpaceFamily::DeviceGray, resources),
            "rg" | "RG" => self.record_device_color(session, ColorSpaceFamily::DeviceRgb, resources),
            "k" | "K" => self.record_device_color(session, ColorSpaceFamily::DeviceCmyk, resources),
            "sc" | "scn" | "SC" | "SCN" => match operands.last().and_then(Object::as_name) {
                Some(name) => match lookup_resource(session.document(), resources, "Pattern", name)? {
                    Some(pattern) => self.check_pattern(session, pattern, resources),
                    None => fail(
                        ConformanceError::new(ErrorCode::UndefinedResource)
                            .with_param(name)
                            .with_param("Pattern"),
                    ),
                },
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Judge the device color usage of a completed scope.
    ///
    /// Any output intent justifies DeviceGray. DeviceRGB needs an RGB intent
    /// and DeviceCMYK a CMYK one; in PDF/A-4 an ICC blending space of the
    /// matching model also justifies them.
    pub(crate) fn finalize_color_usage(&self, session: &ValidationSession<'_>, usage: &ColorUsage) -> Result<()> {
        let intent = if session.page_intent.color.is_some() {
            session.page_intent.color
        } else {
            session.output_intent.color
        };
        let blending = if self.policy().blending_space_justifies_color {
            session.page_blending.as_ref().map(|b| b.components)
        } else {
            None
        };
        let rgb_ok = intent == OutputIntentColor::Rgb || blending == Some(3);
        let cmyk_ok = intent == OutputIntentColor::Cmyk || blending == Some(4);

        let kinds = usage.kinds();
        let clause = self.clause("6.2.3.3", "6.2.4.3");
        let located = |err: ConformanceError, owners: &BTreeSet<ObjectRef>| {
            let location = session
                .location()
                .or_else(|| owners.iter().next().map(|r| format!("object {}", r)));
            match location {
                Some(location) => err.with_location(location).with_clause(clause.clone()),
                None => err.with_clause(clause.clone()),
            }
        };

        if kinds.contains(UsageKinds::GRAY) && !intent.is_some() {
            return fail(located(ConformanceError::new(ErrorCode::DeviceGrayWithoutIntent), usage.gray()));
        }
        let rgb = kinds.contains(UsageKinds::RGB);
        let cmyk = kinds.contains(UsageKinds::CMYK);
        if rgb && cmyk && !rgb_ok && !cmyk_ok {
            return fail(located(ConformanceError::new(ErrorCode::RgbAndCmykUsed), usage.rgb()));
        }
        if rgb && !rgb_ok {
            return fail(located(ConformanceError::new(ErrorCode::DeviceRgbWithoutProfile), usage.rgb()));
        }
        if cmyk && !cmyk_ok {
            return fail(located(ConformanceError::new(ErrorCode::DeviceCmykWithoutProfile), usage.cmyk()));
        }
        Ok(())
    }
}

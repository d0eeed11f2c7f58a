//! Graphics state: parameter dictionaries, rendering intents, `q`/`Q` nesting
//! and transparency.

use super::checker::{fail, PdfAChecker};
use super::color::UsageKinds;
use super::events::CanvasOp;
use super::policy::TransparencyRule;
use super::session::ValidationSession;
use super::types::{ConformanceError, ErrorCode};
use crate::error::Result;
use crate::object::{Dictionary, Object};

/// Rendering intents defined by ISO 32000-1:2008, 8.6.5.8.
pub const RENDERING_INTENTS: [&str; 4] = ["Perceptual", "RelativeColorimetric", "Saturation", "AbsoluteColorimetric"];

impl PdfAChecker {
    /// Record that the current scope uses transparency, or reject it when
    /// the level forbids transparency altogether.
    pub(crate) fn note_transparency(&self, session: &mut ValidationSession<'_>, what: &str) -> Result<()> {
        if self.policy().transparency == TransparencyRule::Forbidden {
            let err = ConformanceError::new(ErrorCode::TransparencyNotAllowed)
                .with_param(what)
                .with_clause(self.clause("6.4", "6.2.10"));
            return fail(err.at_location(session.location()));
        }
        log::trace!("transparency: {}", what);
        session.usage.record(UsageKinds::TRANSPARENCY);
        Ok(())
    }

    /// Graphics state parameter dictionary (or a reference to one).
    pub(crate) fn check_ext_gstate(&self, session: &mut ValidationSession<'_>, state: &Object) -> Result<()> {
        let node = state.as_reference();
        if !session.begin_node(node) {
            return Ok(());
        }
        let result = match session.document().resolve_dict(state) {
            Ok(Some(dict)) => self.check_ext_gstate_dict(session, dict),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        session.end_node(node);
        result
    }

    fn check_ext_gstate_dict(&self, session: &mut ValidationSession<'_>, dict: &Dictionary) -> Result<()> {
        let doc = session.document();

        for &key in &self.policy().forbidden_ext_gstate_keys {
            if dict.contains_key(key) {
                return fail(
                    ConformanceError::new(ErrorCode::ExtGStateKeyNotAllowed)
                        .with_param(key)
                        .with_clause(self.clause("6.2.8", "6.2.5")),
                );
            }
        }
        if let Some(tr2) = doc.get(dict, "TR2")? {
            if tr2.as_name() != Some("Default") {
                return fail(ConformanceError::new(ErrorCode::ExtGStateKeyNotAllowed).with_param("TR2"));
            }
        }

        if let Some(smask) = doc.get(dict, "SMask")? {
            if smask.as_name() != Some("None") {
                self.note_transparency(session, "soft mask in graphics state")?;
            }
        }
        for key in ["CA", "ca"] {
            if let Some(alpha) = doc.get(dict, key)?.and_then(Object::as_number) {
                if alpha != 1.0 {
                    self.note_transparency(session, &format!("{} value {}", key, alpha))?;
                }
            }
        }
        if let Some(blend) = doc.get(dict, "BM")? {
            let modes: Vec<&str> = match blend {
                Object::Name(name) => vec![name.as_str()],
                Object::Array(items) => items.iter().filter_map(Object::as_name).collect(),
                _ => Vec::new(),
            };
            for mode in modes {
                if !self.policy().is_blend_mode_allowed(mode) {
                    return fail(
                        ConformanceError::new(ErrorCode::BlendModeNotAllowed)
                            .with_param(mode)
                            .with_clause(self.clause("6.4", "6.2.10.6")),
                    );
                }
                if mode != "Normal" && mode != "Compatible" {
                    self.note_transparency(session, &format!("blend mode {}", mode))?;
                }
            }
        }

        if let Some(intent) = doc.get(dict, "RI")?.and_then(Object::as_name) {
            self.check_rendering_intent(intent)?;
        }
        Ok(())
    }

    /// Rendering intent names.
    pub(crate) fn check_rendering_intent(&self, intent: &str) -> Result<()> {
        if !RENDERING_INTENTS.contains(&intent) {
            return fail(
                ConformanceError::new(ErrorCode::InvalidRenderingIntent)
                    .with_param(intent)
                    .with_clause(self.clause("6.2.9", "6.2.6")),
            );
        }
        Ok(())
    }

    /// `q` / `Q` nesting.
    pub(crate) fn check_canvas_stack(&self, session: &mut ValidationSession<'_>, op: CanvasOp) -> Result<()> {
        match op {
            CanvasOp::Save => {
                let depth = session.gs_depth + 1;
                if let Some(max) = self.policy().limits.max_gs_depth {
                    if depth > max {
                        return fail(
                            ConformanceError::new(ErrorCode::GraphicsStateNestingExceeded)
                                .with_param(max)
                                .at_location(session.location()),
                        );
                    }
                }
                session.gs_depth = depth;
            },
            CanvasOp::Restore => session.gs_depth = session.gs_depth.saturating_sub(1),
        }
        Ok(())
    }
}

//! Emitter: entities + background → a self-contained HTML fragment.
//!
//! Produces position-anchored wrappers that round-trip through the parser.
//! Entity content is emitted verbatim — never re-escaped or re-parsed — so
//! whatever the generator produced survives editing byte-for-byte.

use crate::model::{CanvasMeta, Entity, EntityOrigin};
use crate::parser::ParseConfig;
use std::fmt::Write;

/// Emit the current arrangement as a renderable fragment.
///
/// Active entities become absolutely positioned wrappers inside a fixed
/// container shell; inactive entities are omitted entirely; the background
/// remainder is appended verbatim.
#[must_use]
pub fn emit_fragment(
    entities: &[Entity],
    background: &str,
    meta: &CanvasMeta,
    cfg: &ParseConfig,
) -> String {
    let mut out = String::with_capacity(1024 + background.len());

    let _ = writeln!(
        out,
        "<div class=\"{}\" style=\"position: relative; width: {}px; height: {}px;\">",
        cfg.canvas_class,
        format_px(meta.width),
        format_px(meta.height)
    );

    for entity in entities.iter().filter(|e| e.active) {
        emit_entity(&mut out, entity, cfg);
    }

    if !background.trim().is_empty() {
        out.push_str(background.trim_matches('\n'));
        out.push('\n');
    }

    out.push_str("</div>\n");
    out
}

fn emit_entity(out: &mut String, entity: &Entity, cfg: &ParseConfig) {
    let _ = write!(
        out,
        "  <div id=\"{}\" {}=\"true\"",
        entity.id.as_str(),
        cfg.marker_attr
    );

    if entity.origin == EntityOrigin::Added {
        let _ = write!(out, " {}=\"added\"", cfg.origin_attr);
    }
    if !entity.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", entity.classes.join(" "));
    }

    let _ = write!(
        out,
        " style=\"position: absolute; left: {}px; top: {}px; width: {}px; height: {}px; z-index: {};\">",
        format_px(entity.position.x),
        format_px(entity.position.y),
        format_px(entity.size.width),
        format_px(entity.size.height),
        entity.z_index
    );

    out.push_str(entity.content.as_str());
    out.push_str("</div>\n");
}

/// Format a pixel value without a trailing `.0` for whole numbers.
fn format_px(v: f32) -> String {
    if (v - v.round()).abs() < f32::EPSILON {
        format!("{}", v.round() as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityId;
    use crate::model::{Markup, Point, Size};

    fn entity(name: &str, x: f32, y: f32, content: &str) -> Entity {
        let mut e = Entity::new(
            EntityId::intern(name),
            Markup::from(content),
            EntityOrigin::Generated,
        );
        e.position = Point::new(x, y);
        e.size = Size::new(200.0, 40.0);
        e
    }

    #[test]
    fn wraps_entities_in_container_shell() {
        let cfg = ParseConfig::default();
        let out = emit_fragment(
            &[entity("a", 10.0, 20.0, "<p>hi</p>")],
            "",
            &CanvasMeta::default(),
            &cfg,
        );
        assert!(out.starts_with("<div class=\"wire-canvas\""));
        assert!(out.contains("left: 10px; top: 20px;"));
        assert!(out.contains("<p>hi</p>"));
        assert!(out.trim_end().ends_with("</div>"));
    }

    #[test]
    fn content_is_emitted_verbatim() {
        let cfg = ParseConfig::default();
        let gnarly = r#"<b onclick="alert('&amp;')" style="x:  y">  <i>raw</i> </b>"#;
        let out = emit_fragment(
            &[entity("a", 0.0, 0.0, gnarly)],
            "",
            &CanvasMeta::default(),
            &cfg,
        );
        assert!(out.contains(gnarly), "content must never be escaped or reformatted");
    }

    #[test]
    fn inactive_entities_are_omitted() {
        let cfg = ParseConfig::default();
        let mut dead = entity("gone", 0.0, 0.0, "<p>secret</p>");
        dead.active = false;
        let out = emit_fragment(
            &[entity("kept", 0.0, 0.0, "<p>kept</p>"), dead],
            "",
            &CanvasMeta::default(),
            &cfg,
        );
        assert!(out.contains("kept"));
        assert!(!out.contains("secret"));
        assert!(!out.contains("gone"));
    }

    #[test]
    fn added_entities_carry_origin_attr() {
        let cfg = ParseConfig::default();
        let mut e = entity("btn", 0.0, 0.0, "<button>Go</button>");
        e.origin = EntityOrigin::Added;
        let out = emit_fragment(&[e], "", &CanvasMeta::default(), &cfg);
        assert!(out.contains("data-origin=\"added\""));
    }

    #[test]
    fn background_is_appended_verbatim() {
        let cfg = ParseConfig::default();
        let out = emit_fragment(
            &[],
            "<footer>(c) wirebot</footer>",
            &CanvasMeta::default(),
            &cfg,
        );
        assert!(out.contains("<footer>(c) wirebot</footer>"));
    }

    #[test]
    fn px_formatting_trims_whole_numbers() {
        assert_eq!(format_px(10.0), "10");
        assert_eq!(format_px(10.5), "10.5");
        assert_eq!(format_px(0.0), "0");
    }
}

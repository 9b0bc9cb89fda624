//! Lint diagnostics for parsed wireframe documents.
//!
//! Reports layout issues without modifying anything. Hosts surface these
//! next to the canvas (badges, side panel) to nudge users toward cleanups
//! like running auto-arrange.

use crate::id::EntityId;
use crate::model::{CanvasMeta, Entity};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed — likely a mistake.
    Warning,
    /// Informational — layout suggestion.
    Info,
}

/// A single lint diagnostic for an entity.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The entity this diagnostic refers to.
    pub entity: EntityId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "overlap", "offscreen").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over the entities and return diagnostics.
#[must_use]
pub fn lint_fragment(entities: &[Entity], meta: &CanvasMeta) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_overlaps(entities, &mut diags);
    lint_offscreen(entities, meta, &mut diags);
    lint_empty_content(entities, &mut diags);
    lint_derived_ids(entities, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// Info when two active entities overlap — auto-arrange would resolve it.
fn lint_overlaps(entities: &[Entity], diags: &mut Vec<LintDiagnostic>) {
    let active: Vec<&Entity> = entities.iter().filter(|e| e.active).collect();
    for (i, a) in active.iter().enumerate() {
        for b in &active[i + 1..] {
            if a.bounds().intersects(&b.bounds()) {
                diags.push(LintDiagnostic {
                    entity: a.id,
                    message: format!(
                        "`{}` overlaps `{}` — auto-arrange will restack them.",
                        a.id.as_str(),
                        b.id.as_str()
                    ),
                    severity: LintSeverity::Info,
                    rule: "overlap",
                });
            }
        }
    }
}

/// Warn when an entity extends beyond the canvas.
fn lint_offscreen(entities: &[Entity], meta: &CanvasMeta, diags: &mut Vec<LintDiagnostic>) {
    for e in entities.iter().filter(|e| e.active) {
        let b = e.bounds();
        if b.x + b.width > meta.width || b.y + b.height > meta.height {
            diags.push(LintDiagnostic {
                entity: e.id,
                message: format!(
                    "`{}` extends beyond the {}x{} canvas.",
                    e.id.as_str(),
                    meta.width,
                    meta.height
                ),
                severity: LintSeverity::Warning,
                rule: "offscreen",
            });
        }
    }
}

/// Warn on entities whose captured markup is empty.
fn lint_empty_content(entities: &[Entity], diags: &mut Vec<LintDiagnostic>) {
    for e in entities {
        if e.content.is_empty() {
            diags.push(LintDiagnostic {
                entity: e.id,
                message: format!("`{}` has no content.", e.id.as_str()),
                severity: LintSeverity::Warning,
                rule: "empty-content",
            });
        }
    }
}

/// Info on parser-derived `elem_<n>` ids — the source element had no `id`
/// attribute, so exports lose the semantic hook.
fn lint_derived_ids(entities: &[Entity], diags: &mut Vec<LintDiagnostic>) {
    for e in entities {
        if is_derived_id(e.id.as_str()) {
            diags.push(LintDiagnostic {
                entity: e.id,
                message: format!(
                    "`{}` has an auto-derived id — give the source element an explicit id.",
                    e.id.as_str()
                ),
                severity: LintSeverity::Info,
                rule: "derived-id",
            });
        }
    }
}

/// Check if an id matches the parser's `elem_<n>` pattern.
fn is_derived_id(id: &str) -> bool {
    id.strip_prefix("elem_")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseConfig, parse_fragment};

    fn lint_html(html: &str) -> Vec<LintDiagnostic> {
        let parsed = parse_fragment(html, &[], &ParseConfig::default());
        lint_fragment(&parsed.entities, &CanvasMeta::default())
    }

    #[test]
    fn lint_overlapping_entities() {
        let html = r#"
<div id="a" data-draggable style="left: 0px; top: 0px; width: 100px; height: 100px;">x</div>
<div id="b" data-draggable style="left: 50px; top: 50px; width: 100px; height: 100px;">y</div>
"#;
        let diags = lint_html(html);
        assert!(
            diags.iter().any(|d| d.rule == "overlap"),
            "expected overlap diagnostic"
        );
    }

    #[test]
    fn lint_offscreen_entity() {
        let html = r#"<div id="big" data-draggable style="left: 700px; top: 0px; width: 400px; height: 40px;">x</div>"#;
        let diags = lint_html(html);
        assert!(
            diags
                .iter()
                .any(|d| d.rule == "offscreen" && d.severity == LintSeverity::Warning),
            "expected offscreen warning"
        );
    }

    #[test]
    fn lint_empty_content() {
        let html = r#"<div id="hollow" data-draggable style="left: 0px; top: 0px;"></div>"#;
        let diags = lint_html(html);
        assert!(
            diags.iter().any(|d| d.rule == "empty-content"),
            "expected empty-content diagnostic"
        );
    }

    #[test]
    fn lint_derived_id() {
        let html = r#"<div data-draggable style="left: 0px; top: 0px;">x</div>"#;
        let diags = lint_html(html);
        assert!(
            diags.iter().any(|d| d.rule == "derived-id"),
            "expected derived-id diagnostic"
        );
    }

    #[test]
    fn lint_clean_document_no_diags() {
        let html = r#"
<div id="hero" data-draggable style="left: 0px; top: 0px; width: 200px; height: 40px;">x</div>
<div id="body_copy" data-draggable style="left: 0px; top: 60px; width: 200px; height: 40px;">y</div>
"#;
        let diags = lint_html(html);
        assert!(diags.is_empty(), "clean document should have no diagnostics");
    }
}

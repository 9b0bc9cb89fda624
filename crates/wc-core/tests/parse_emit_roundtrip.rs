//! Integration tests: parse → emit → re-parse round-trip.
//!
//! Verifies that geometry and content survive converting a fragment into
//! entities and back, and that deleted entities vanish from the output.

use pretty_assertions::assert_eq;
use wc_core::emitter::emit_fragment;
use wc_core::id::EntityId;
use wc_core::model::{CanvasMeta, Markup};
use wc_core::parser::{ParseConfig, parse_fragment};
use wc_core::store::GeometryStore;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn cfg() -> ParseConfig {
    ParseConfig::default()
}

/// Parse, emit, re-parse, and compare entity counts, ids, and geometry.
fn assert_roundtrip_preserves(input: &str) {
    let config = cfg();
    let meta = CanvasMeta::default();

    let first = parse_fragment(input, &[], &config);
    let emitted = emit_fragment(&first.entities, &first.background, &meta, &config);
    let second = parse_fragment(&emitted, &[], &config);

    assert_eq!(
        first.entities.len(),
        second.entities.len(),
        "entity count mismatch after round-trip.\nOriginal:\n{input}\nEmitted:\n{emitted}"
    );

    for (a, b) in first.entities.iter().zip(&second.entities) {
        assert_eq!(a.id, b.id, "entity id changed after round-trip");
        assert_eq!(
            a.position, b.position,
            "position changed for {} after round-trip.\nEmitted:\n{emitted}",
            a.id
        );
        assert_eq!(a.size, b.size, "size changed for {} after round-trip", a.id);
        assert_eq!(
            a.content, b.content,
            "content changed for {} after round-trip",
            a.id
        );
    }
}

// ─── Fixture-based tests ─────────────────────────────────────────────────

#[test]
fn roundtrip_minimal_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/minimal.html"));
}

#[test]
fn roundtrip_hero_section_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/hero_section.html"));
}

#[test]
fn roundtrip_landing_page_fixture() {
    assert_roundtrip_preserves(include_str!("fixtures/landing_page.html"));
}

#[test]
fn roundtrip_empty_fragment() {
    assert_roundtrip_preserves("");
}

// ─── Spec-shaped properties ──────────────────────────────────────────────

#[test]
fn roundtrip_three_positioned_divs() {
    // The canonical shape: marked divs with distinct absolute positions.
    let input = r#"
<div id="a" data-draggable style="position: absolute; left: 10px; top: 5px; width: 100px; height: 40px;">A</div>
<div id="b" data-draggable style="position: absolute; left: 20px; top: 90px; width: 100px; height: 40px;">B</div>
<div id="c" data-draggable style="position: absolute; left: 30px; top: 180px; width: 100px; height: 40px;">C</div>
"#;
    let config = cfg();
    let first = parse_fragment(input, &[], &config);
    assert_eq!(first.entities.len(), 3);

    let emitted = emit_fragment(
        &first.entities,
        &first.background,
        &CanvasMeta::default(),
        &config,
    );
    let second = parse_fragment(&emitted, &[], &config);

    assert_eq!(second.entities.len(), 3);
    for (a, b) in first.entities.iter().zip(&second.entities) {
        assert_eq!(a.position, b.position);
    }
}

#[test]
fn deleted_entity_leaves_no_trace() {
    let input = include_str!("fixtures/hero_section.html");
    let config = cfg();
    let meta = CanvasMeta::default();

    let parsed = parse_fragment(input, &[], &config);
    let original_count = parsed.entities.len();
    let background = parsed.background.clone();

    let mut store = GeometryStore::from_entities(parsed.entities);
    store.remove(EntityId::intern("cta"));

    let emitted = emit_fragment(store.all(), &background, &meta, &config);
    assert!(
        !emitted.contains("Start free"),
        "removed entity content must not appear in output"
    );
    assert!(!emitted.contains("id=\"cta\""));

    let reparsed = parse_fragment(&emitted, &[], &config);
    assert_eq!(reparsed.entities.len(), original_count - 1);
}

#[test]
fn deactivated_entity_is_omitted_but_not_renumbered() {
    let input = include_str!("fixtures/hero_section.html");
    let config = cfg();

    let parsed = parse_fragment(input, &[], &config);
    let mut store = GeometryStore::from_entities(parsed.entities);
    let headline = EntityId::intern("headline");
    store.get_mut(headline).unwrap().active = false;

    // Soft-deleted: still in the store under its id...
    assert!(store.get(headline).is_some());

    // ...but gone from the serialized output.
    let emitted = emit_fragment(store.all(), &parsed.background, &CanvasMeta::default(), &config);
    assert!(!emitted.contains("id=\"headline\""));
}

#[test]
fn background_markup_survives_roundtrip() {
    let input = include_str!("fixtures/landing_page.html");
    let config = cfg();

    let first = parse_fragment(input, &[], &config);
    assert!(first.background.contains("<footer>"));

    let emitted = emit_fragment(
        &first.entities,
        &first.background,
        &CanvasMeta::default(),
        &config,
    );
    let second = parse_fragment(&emitted, &[], &config);
    assert!(second.background.contains("<footer>"));
    assert!(second.background.contains("(c) wireframe generator"));
}

#[test]
fn content_bytes_are_preserved_exactly() {
    let input = include_str!("fixtures/minimal.html");
    let config = cfg();
    let parsed = parse_fragment(input, &[], &config);

    assert_eq!(
        parsed.entities[0].content,
        Markup::from("<h1>Welcome</h1><p>Ship faster.</p>")
    );
}

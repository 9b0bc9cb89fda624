//! Fragment parser: generated HTML → positioned entities + background.
//!
//! Built on `winnow` 0.7 combinators mixed with manual `&str` advancement.
//! The scanner is deliberately lenient: anything it cannot understand is
//! passed through as inert background markup rather than reported as an
//! error, so a malformed fragment degrades to zero entities and never
//! fails the caller.

use crate::id::EntityId;
use crate::model::*;
use smallvec::SmallVec;
use std::collections::HashSet;
use winnow::combinator::delimited;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Elements that never carry content and close themselves.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

// ─── Configuration ───────────────────────────────────────────────────────

/// Markers and fallbacks that drive entity extraction.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Attribute that explicitly marks an element as draggable.
    pub marker_attr: String,
    /// Attribute carrying the entity origin (`added` for palette drops).
    pub origin_attr: String,
    /// Class on the emitter's container shell; a sole top-level element
    /// with this class is unwrapped before scanning.
    pub canvas_class: String,
    /// Structural classes that match even without the marker attribute.
    pub structural_classes: Vec<String>,
    /// Size applied when no usable box is available.
    pub fallback_size: Size,
    /// Vertical spacing for the deterministic index-based position fallback.
    pub stack_offset: f32,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            marker_attr: "data-draggable".into(),
            origin_attr: "data-origin".into(),
            canvas_class: "wire-canvas".into(),
            structural_classes: vec![
                "wire-section".into(),
                "wire-group".into(),
                "wire-nav".into(),
            ],
            fallback_size: FALLBACK_SIZE,
            stack_offset: STACK_OFFSET,
        }
    }
}

/// A scanned source element as exposed to `Measure` implementations.
#[derive(Debug)]
pub struct RawElement<'a> {
    pub tag: &'a str,
    pub attrs: &'a [(String, String)],
    /// Index among matched elements, in source order.
    pub index: usize,
}

/// Geometry source for elements without inline positions — typically a live
/// view that can report rendered boxes. Headless callers pass no measurer
/// and get the deterministic index fallback instead.
pub trait Measure {
    fn bounds_of(&self, element: &RawElement<'_>) -> Option<Bounds>;
}

/// Result of parsing one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFragment {
    /// Positioned entities, in source order.
    pub entities: Vec<Entity>,
    /// Everything that did not become an entity, verbatim.
    pub background: String,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Parse a fragment with no live measurements (headless).
pub fn parse_fragment(html: &str, palette: &[PaletteItem], cfg: &ParseConfig) -> ParsedFragment {
    parse_fragment_with(html, palette, cfg, None)
}

/// Parse a fragment, optionally consulting `measure` for elements that
/// carry no inline position. Never fails: unparsable input degrades to
/// zero entities with the whole fragment kept as background.
pub fn parse_fragment_with(
    html: &str,
    palette: &[PaletteItem],
    cfg: &ParseConfig,
    measure: Option<&dyn Measure>,
) -> ParsedFragment {
    let mut nodes = scan_nodes(html);

    // Unwrap the emitter's container shell so serialize → parse is closed.
    if let Some(inner) = canvas_shell_inner(&nodes, cfg) {
        nodes = scan_nodes(&inner);
    }

    let mut entities: Vec<Entity> = Vec::new();
    let mut background = String::new();
    let mut seen: HashSet<EntityId> = HashSet::new();

    for node in &nodes {
        match node {
            ScanNode::Text(text) => background.push_str(text),
            ScanNode::Element(el) => {
                if is_marked(el, cfg) {
                    let index = entities.len();
                    entities.push(build_entity(el, index, cfg, measure, &mut seen));
                } else {
                    background.push_str(&el.raw);
                }
            }
        }
    }

    if entities.is_empty() && !html.trim().is_empty() {
        log::debug!(
            "fragment produced no entities; {} bytes kept as background",
            background.len()
        );
    }

    for item in palette {
        let entity = palette_entity(item, &entities, cfg, &mut seen);
        entities.push(entity);
    }

    ParsedFragment {
        entities,
        background,
    }
}

// ─── Entity construction ─────────────────────────────────────────────────

fn is_marked(el: &ScannedElement, cfg: &ParseConfig) -> bool {
    if attr(&el.attrs, &cfg.marker_attr).is_some() {
        return true;
    }
    class_list(&el.attrs)
        .iter()
        .any(|c| cfg.structural_classes.iter().any(|s| s == c))
}

fn build_entity(
    el: &ScannedElement,
    index: usize,
    cfg: &ParseConfig,
    measure: Option<&dyn Measure>,
    seen: &mut HashSet<EntityId>,
) -> Entity {
    let style = parse_inline_style(attr(&el.attrs, "style").unwrap_or(""));
    let raw_el = RawElement {
        tag: &el.tag,
        attrs: &el.attrs,
        index,
    };
    let measured = measure.and_then(|m| m.bounds_of(&raw_el));

    // Position: inline left/top → measured box → deterministic index stack.
    let position = match (style.left, style.top) {
        (Some(x), Some(y)) => Point::new(x, y),
        _ => measured
            .map(|b| Point::new(b.x, b.y))
            .unwrap_or_else(|| Point::new(0.0, index as f32 * cfg.stack_offset)),
    }
    .clamped();

    // Size: inline → measured → fallback; zero-sized boxes fall through.
    let width = style
        .width
        .filter(|w| *w > 0.0)
        .or_else(|| measured.map(|b| b.width).filter(|w| *w > 0.0))
        .unwrap_or(cfg.fallback_size.width);
    let height = style
        .height
        .filter(|h| *h > 0.0)
        .or_else(|| measured.map(|b| b.height).filter(|h| *h > 0.0))
        .unwrap_or(cfg.fallback_size.height);

    let origin = match attr(&el.attrs, &cfg.origin_attr) {
        Some("added") => EntityOrigin::Added,
        _ => EntityOrigin::Generated,
    };

    let z_index = style.z_index.unwrap_or(match origin {
        EntityOrigin::Generated => index as i32,
        EntityOrigin::Added => ADDED_Z_BASE + index as i32,
    });

    let base = attr(&el.attrs, "id")
        .map(str::to_string)
        .unwrap_or_else(|| format!("elem_{index}"));
    let id = claim_id(&base, seen);

    let mut entity = Entity::new(id, Markup::new(el.inner.clone()), origin);
    entity.position = position;
    entity.size = Size::new(width, height);
    entity.z_index = z_index;
    entity.classes = class_list(&el.attrs);
    entity
}

fn palette_entity(
    item: &PaletteItem,
    existing: &[Entity],
    cfg: &ParseConfig,
    seen: &mut HashSet<EntityId>,
) -> Entity {
    let index = existing.len();
    let base = if item.id.is_empty() {
        format!("added_{index}")
    } else {
        item.id.clone()
    };
    let id = claim_id(&base, seen);

    // Hinted position, or stacked below everything parsed so far.
    let position = item.position.unwrap_or_else(|| {
        let bottom = existing
            .iter()
            .map(|e| e.position.y + e.size.height)
            .fold(0.0f32, f32::max);
        Point::new(0.0, if existing.is_empty() { 0.0 } else { bottom + ARRANGE_GAP })
    });

    let mut entity = Entity::new(id, Markup::new(item.html.clone()), EntityOrigin::Added);
    entity.position = position.clamped();
    entity.size = Size::new(
        item.width.filter(|w| *w > 0.0).unwrap_or(cfg.fallback_size.width),
        item.height.filter(|h| *h > 0.0).unwrap_or(cfg.fallback_size.height),
    );
    entity.z_index = ADDED_Z_BASE + index as i32;
    entity
}

/// Intern `base`, suffixing `_2`, `_3`, … until the id is unused. Keeps the
/// unique-id invariant for any input, deterministically.
fn claim_id(base: &str, seen: &mut HashSet<EntityId>) -> EntityId {
    let mut candidate = base.to_string();
    let mut k = 2u32;
    loop {
        let id = EntityId::intern(&candidate);
        if seen.insert(id) {
            return id;
        }
        candidate = format!("{base}_{k}");
        k += 1;
    }
}

// ─── Attribute helpers ───────────────────────────────────────────────────

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn class_list(attrs: &[(String, String)]) -> SmallVec<[String; 2]> {
    attr(attrs, "class")
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

// ─── Inline style extraction ─────────────────────────────────────────────

#[derive(Debug, Default)]
struct StyleProps {
    left: Option<f32>,
    top: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    z_index: Option<i32>,
}

fn parse_inline_style(style: &str) -> StyleProps {
    let mut props = StyleProps::default();
    for decl in style.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => props.left = parse_px(value),
            "top" => props.top = parse_px(value),
            "width" => props.width = parse_px(value),
            "height" => props.height = parse_px(value),
            "z-index" => props.z_index = parse_px(value).map(|v| v as i32),
            _ => {}
        }
    }
    props
}

/// Parse `10`, `10.5`, `10px`. Anything else (`%`, `em`, `auto`) is ignored.
fn parse_px(value: &str) -> Option<f32> {
    let mut input = value;
    let n = parse_number(&mut input).ok()?;
    let rest = input.trim();
    if rest.is_empty() || rest.eq_ignore_ascii_case("px") {
        Some(n)
    } else {
        None
    }
}

fn parse_number(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f32>()
        .map_err(|_| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

// ─── Tag scanner ─────────────────────────────────────────────────────────

#[derive(Debug)]
enum ScanNode {
    Element(ScannedElement),
    Text(String),
}

#[derive(Debug)]
struct ScannedElement {
    tag: String,
    attrs: Vec<(String, String)>,
    /// Inner markup between the tags, verbatim.
    inner: String,
    /// The whole element span including its tags, verbatim.
    raw: String,
}

/// Split a fragment into top-level elements and interleaved text. Comments,
/// stray close tags, and unparsable tag soup all become text.
fn scan_nodes(input: &str) -> Vec<ScanNode> {
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    fn flush(text: &mut String, nodes: &mut Vec<ScanNode>) {
        if !text.is_empty() {
            nodes.push(ScanNode::Text(std::mem::take(text)));
        }
    }

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            text.push_str(rest);
            break;
        };
        text.push_str(&rest[..lt]);
        rest = &rest[lt..];

        if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(end) => {
                    text.push_str(&rest[..end + 3]);
                    rest = &rest[end + 3..];
                }
                None => {
                    text.push_str(rest);
                    rest = "";
                }
            }
            continue;
        }

        if rest.starts_with("</") {
            // Stray close tag at top level — keep it as text.
            match rest.find('>') {
                Some(end) => {
                    text.push_str(&rest[..end + 1]);
                    rest = &rest[end + 1..];
                }
                None => {
                    text.push_str(rest);
                    rest = "";
                }
            }
            continue;
        }

        let mut probe = rest;
        let parsed = parse_open_tag(&mut probe);
        let Ok((tag, attrs, self_closing)) = parsed else {
            // Not a tag we can read; treat the '<' as literal text.
            text.push('<');
            rest = &rest[1..];
            continue;
        };

        let open_len = rest.len() - probe.len();
        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            flush(&mut text, &mut nodes);
            nodes.push(ScanNode::Element(ScannedElement {
                tag,
                attrs,
                inner: String::new(),
                raw: rest[..open_len].to_string(),
            }));
            rest = probe;
            continue;
        }

        match find_matching_close(probe, &tag) {
            Some((inner_len, consumed)) => {
                flush(&mut text, &mut nodes);
                nodes.push(ScanNode::Element(ScannedElement {
                    inner: probe[..inner_len].to_string(),
                    raw: rest[..open_len + consumed].to_string(),
                    tag,
                    attrs,
                }));
                rest = &probe[consumed..];
            }
            None => {
                // Unclosed element: take everything to the end of input.
                log::debug!("unclosed <{tag}> — consuming remainder of fragment");
                flush(&mut text, &mut nodes);
                nodes.push(ScanNode::Element(ScannedElement {
                    inner: probe.to_string(),
                    raw: rest.to_string(),
                    tag,
                    attrs,
                }));
                rest = "";
            }
        }
    }

    flush(&mut text, &mut nodes);
    nodes
}

/// Parse `<tag attr="v" ...>` or `<tag ... />`. Attribute names are
/// lowercased; values may be double-quoted, single-quoted, unquoted, or
/// absent (boolean attributes).
fn parse_open_tag(input: &mut &str) -> ModalResult<(String, Vec<(String, String)>, bool)> {
    let _ = '<'.parse_next(input)?;
    let tag: &str =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)?;
    let tag = tag.to_ascii_lowercase();
    let mut attrs = Vec::new();

    loop {
        *input = input.trim_start();
        if let Some(rest) = input.strip_prefix("/>") {
            *input = rest;
            return Ok((tag, attrs, true));
        }
        if let Some(rest) = input.strip_prefix('>') {
            *input = rest;
            return Ok((tag, attrs, false));
        }
        if input.is_empty() {
            return Err(winnow::error::ErrMode::Backtrack(ContextError::new()));
        }

        let name: &str = take_while(1.., |c: char| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
        })
        .parse_next(input)?;
        let name = name.to_ascii_lowercase();

        *input = input.trim_start();
        let value = if let Some(rest) = input.strip_prefix('=') {
            *input = rest.trim_start();
            if input.starts_with('"') {
                delimited('"', take_till(0.., '"'), '"')
                    .map(str::to_string)
                    .parse_next(input)?
            } else if input.starts_with('\'') {
                delimited('\'', take_till(0.., '\''), '\'')
                    .map(str::to_string)
                    .parse_next(input)?
            } else {
                take_while(0.., |c: char| !c.is_whitespace() && c != '>')
                    .map(str::to_string)
                    .parse_next(input)?
            }
        } else {
            String::new()
        };

        attrs.push((name, value));
    }
}

/// Find the close tag matching an already-consumed `<tag ...>`, tracking
/// nesting of the same tag name. Returns `(inner_len, consumed_len)` where
/// `consumed_len` includes the close tag itself.
fn find_matching_close(rest: &str, tag: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut pos = 0usize;

    loop {
        let lt = rest[pos..].find('<')? + pos;
        let after = &rest[lt + 1..];

        if let Some(close_body) = after.strip_prefix('/') {
            if tag_name_at(close_body, tag) {
                depth -= 1;
                let gt = rest[lt..].find('>')? + lt;
                if depth == 0 {
                    return Some((lt, gt + 1));
                }
                pos = gt + 1;
                continue;
            }
        } else if tag_name_at(after, tag) {
            // A nested open of the same tag — unless it self-closes.
            let gt = rest[lt..].find('>').map(|g| g + lt)?;
            if !rest[..gt].ends_with('/') {
                depth += 1;
            }
            pos = gt + 1;
            continue;
        }

        pos = lt + 1;
    }
}

/// True if `s` starts with `tag` followed by a tag-name boundary.
fn tag_name_at(s: &str, tag: &str) -> bool {
    let b = s.as_bytes();
    let t = tag.as_bytes();
    if b.len() < t.len() || !b[..t.len()].eq_ignore_ascii_case(t) {
        return false;
    }
    matches!(
        b.get(t.len()),
        None | Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')
    )
}

/// If the fragment is exactly one element carrying the canvas class (the
/// emitter's shell) and nothing but whitespace around it, return its inner.
fn canvas_shell_inner(nodes: &[ScanNode], cfg: &ParseConfig) -> Option<String> {
    let mut elements = nodes.iter().filter_map(|n| match n {
        ScanNode::Element(e) => Some(e),
        ScanNode::Text(_) => None,
    });
    let shell = elements.next()?;
    if elements.next().is_some() {
        return None;
    }
    let stray_text = nodes
        .iter()
        .any(|n| matches!(n, ScanNode::Text(t) if !t.trim().is_empty()));
    if stray_text {
        return None;
    }
    if class_list(&shell.attrs).iter().any(|c| c == &cfg.canvas_class) {
        Some(shell.inner.clone())
    } else {
        None
    }
}

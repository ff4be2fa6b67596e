//! SVG serialization of animation frames.
//!
//! The writer is string-based and deterministic: the same frame always produces the same
//! bytes, so settled output can be compared in tests.

use crate::animation::Frame;
use crate::settings::DEFAULT_SVG_ID;
use crate::theme::FONT_FAMILY;
use canopy_core::geom::Point;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Value of the root `id` attribute.
    pub diagram_id: Option<String>,
    /// Emit `data-identity`/`data-depth` on nodes and links for host-side hit mapping.
    pub data_attributes: bool,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            data_attributes: true,
        }
    }
}

/// Turns free text into an XML id. Letters, digits, `_`, `:` and `.` are kept; any other
/// run becomes a single `-`. Ids that would not start with a letter get a `c-` prefix.
pub fn sanitize_svg_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    let mut gap = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | '.') {
            if gap && !out.is_empty() {
                out.push('-');
            }
            gap = false;
            out.push(ch);
        } else {
            gap = true;
        }
    }
    match out.chars().next() {
        None => DEFAULT_SVG_ID.to_string(),
        Some(first) if first.is_ascii_alphabetic() => out,
        Some(_) => format!("c-{out}"),
    }
}

pub(crate) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

pub(crate) fn fmt_into(out: &mut String, v: f64) {
    if !v.is_finite() {
        out.push('0');
        return;
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == -0.0 {
        v = 0.0;
    }

    let _ = write!(out, "{v}");
}

/// Path coordinates are rounded to three fractional digits.
pub(crate) fn fmt_path_into(out: &mut String, v: f64) {
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }

    let k = (v * 1000.0 + 0.5).floor() as i64;
    if k == 0 {
        out.push('0');
        return;
    }
    if k < 0 {
        out.push('-');
    }
    let abs = k.unsigned_abs();
    let _ = write!(out, "{}", abs / 1000);
    let frac = abs % 1000;
    if frac != 0 {
        let digits = format!("{frac:03}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
}

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

/// Horizontal cubic link from `child` to `parent`, both in layout space.
///
/// Layout `x` is the screen vertical, so each point is emitted as `(y, x)`.
pub fn diagonal(child: Point, parent: Point) -> String {
    let mid = (child.y + parent.y) / 2.0;
    let mut d = String::with_capacity(64);
    d.push('M');
    d.push(' ');
    push_pair(&mut d, child.y, child.x);
    d.push_str(" C ");
    push_pair(&mut d, mid, child.x);
    d.push_str(", ");
    push_pair(&mut d, mid, parent.x);
    d.push_str(", ");
    push_pair(&mut d, parent.y, parent.x);
    d
}

fn push_pair(out: &mut String, a: f64, b: f64) {
    fmt_path_into(out, a);
    out.push(' ');
    fmt_path_into(out, b);
}

pub fn render_frame_svg(frame: &Frame<'_>, options: &SvgRenderOptions) -> String {
    let id = options.diagram_id.as_deref().unwrap_or("canopy");
    let mut out = String::with_capacity(512 + frame.nodes.len() * 320);

    let max_height = frame
        .canvas
        .max_height
        .map(|h| format!("max-height:{}px;", fmt(h)))
        .unwrap_or_default();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}" class="canopy-tree canopy-{theme}" width="100%" viewBox="0 0 {w} {h}" preserveAspectRatio="xMidYMid meet" style="max-width:100%;height:auto;display:block;overflow:hidden;{max_height}" role="graphics-document document" aria-roledescription="tree">"#,
        id = escape_xml(id),
        theme = if frame.theme.is_dark() { "dark" } else { "light" },
        w = fmt(frame.canvas.width),
        h = fmt(frame.canvas.height),
    );
    let _ = write!(
        &mut out,
        r#"<g class="canopy-root" transform="translate({}, {})">"#,
        fmt(frame.translate.x),
        fmt(frame.translate.y)
    );

    out.push_str(r#"<g class="links">"#);
    for link in &frame.links {
        out.push_str(r#"<path class="link""#);
        if options.data_attributes {
            let _ = write!(
                &mut out,
                r#" data-identity="{}" data-parent="{}""#,
                link.link.identity, link.link.parent_identity
            );
        }
        let paint = &link.link.paint;
        let _ = write!(
            &mut out,
            r#" d="{}" style="fill:none;stroke:{};stroke-width:{}em;stroke-opacity:{}"/>"#,
            diagonal(link.target, link.source),
            paint.stroke,
            fmt(paint.stroke_width_em),
            fmt(paint.opacity)
        );
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for n in &frame.nodes {
        let node = n.node;
        let _ = write!(
            &mut out,
            r#"<g class="node {}{}""#,
            node.class.css_class(),
            if node.highlighted { " highlighted" } else { "" }
        );
        if options.data_attributes {
            let _ = write!(
                &mut out,
                r#" data-identity="{}" data-depth="{}""#,
                node.identity, node.depth
            );
        }
        let _ = write!(
            &mut out,
            r#" transform="translate({}, {})" style="cursor:pointer">"#,
            fmt(n.position.y),
            fmt(n.position.x)
        );
        let _ = write!(
            &mut out,
            r#"<circle r="{}" style="fill:{};stroke:{};stroke-width:{}em"/>"#,
            fmt(n.radius),
            node.paint.fill,
            node.paint.stroke,
            fmt(node.paint.stroke_width_em)
        );
        let label = &node.label;
        let _ = write!(
            &mut out,
            r#"<text dy=".35em" x="{}" text-anchor="{}" style="fill:{};fill-opacity:{};font-size:{}em;font-weight:{};font-family:{}">"#,
            fmt(label.offset),
            label.anchor.as_str(),
            label.fill,
            fmt(n.opacity),
            fmt(label.font_size_em),
            label.font_weight,
            escape_xml(FONT_FAMILY)
        );
        escape_xml_into(&mut out, &node.name);
        out.push_str("</text></g>");
    }
    out.push_str("</g></g></svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::geom::point;

    #[test]
    fn fmt_trims_float_noise() {
        assert_eq!(fmt(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(fmt(2.0000000001), "2");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn path_numbers_use_three_digits() {
        let mut s = String::new();
        fmt_path_into(&mut s, 1.23456);
        s.push(' ');
        fmt_path_into(&mut s, -20.5);
        s.push(' ');
        fmt_path_into(&mut s, 0.0001);
        assert_eq!(s, "1.235 -20.5 0");
    }

    #[test]
    fn diagonal_swaps_axes() {
        let d = diagonal(point(20.0, 288.0), point(0.0, 0.0));
        assert_eq!(d, "M 288 20 C 144 20, 144 0, 0 0");
    }

    #[test]
    fn escapes_markup_in_names() {
        assert_eq!(escape_xml(r#"A & <B> "c""#), "A &amp; &lt;B&gt; &quot;c&quot;");
    }

    #[test]
    fn sanitizes_ids() {
        assert_eq!(sanitize_svg_id("my tree"), "my-tree");
        assert_eq!(sanitize_svg_id("  "), "canopy");
        assert_eq!(sanitize_svg_id("1st"), "c-1st");
        assert_eq!(sanitize_svg_id("--"), "canopy");
        assert_eq!(sanitize_svg_id(" -osint  //  tools- "), "osint-tools");
        assert_eq!(sanitize_svg_id("_x"), "c-_x");
        assert_eq!(sanitize_svg_id("a.b:c_d"), "a.b:c_d");
        assert_eq!(sanitize_svg_id("Überblick"), "berblick");
    }
}

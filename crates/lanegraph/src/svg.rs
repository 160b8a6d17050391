//! Minimal SVG serialization of a [`RenderOutput`].
//!
//! Connectors are written before circles so commit points paint on top.

use crate::model::{PathPrimitive, PointPrimitive, RenderOutput};
use crate::path::fmt;
use std::fmt::Write as _;

#[derive(Debug, Clone, Default)]
pub struct SvgRenderOptions {
    /// Optional root `<svg id="...">`.
    pub diagram_id: Option<String>,
    /// Optional CSS color painted behind the graph.
    pub background: Option<String>,
}

pub(crate) fn escape_xml_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => Some("&amp;"),
            b'<' => Some("&lt;"),
            b'>' => Some("&gt;"),
            b'"' => Some("&quot;"),
            b'\'' => Some("&#39;"),
            _ => None,
        };
        let Some(esc) = esc else {
            continue;
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

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_xml_into(&mut out, text);
    out
}

fn write_path(out: &mut String, p: &PathPrimitive) {
    let _ = write!(
        out,
        r#"<path id="{id}" d="{d}" stroke="{stroke}" stroke-width="{sw}" fill="none"/>"#,
        id = escape_attr(&p.key),
        d = escape_attr(&p.d),
        stroke = escape_attr(&p.stroke),
        sw = fmt(p.stroke_width),
    );
}

fn write_point(out: &mut String, p: &PointPrimitive) {
    let _ = write!(
        out,
        r#"<circle id="{id}" cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" stroke-width="{sw}" stroke="{stroke}"/>"#,
        id = escape_attr(&p.key),
        cx = fmt(p.cx),
        cy = fmt(p.cy),
        r = fmt(p.r),
        fill = escape_attr(&p.fill),
        sw = fmt(p.stroke_width),
        stroke = escape_attr(&p.stroke),
    );
}

pub fn render_svg(output: &RenderOutput, options: &SvgRenderOptions) -> String {
    let mut out = String::new();
    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg""#);
    if let Some(id) = options.diagram_id.as_deref() {
        let _ = write!(out, r#" id="{}""#, escape_attr(id));
    }
    let _ = write!(
        out,
        r#" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt(output.width),
        h = fmt(output.height),
    );
    if let Some(bg) = options.background.as_deref() {
        let _ = write!(
            out,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            escape_attr(bg)
        );
    }
    for p in &output.paths {
        write_path(&mut out, p);
    }
    for p in &output.points {
        write_point(&mut out, p);
    }
    out.push_str("</svg>");
    out
}

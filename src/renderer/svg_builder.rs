//! SVG builder — accumulates SVG elements and produces the final string.

use super::constants::*;

// ═══════════════════════════════════════════════════════════════════════
// SvgBuilder
// ═══════════════════════════════════════════════════════════════════════

pub(super) struct SvgBuilder {
    pub(super) elements: Vec<String>,
    width: f64,
    height: f64,
}

/// Text attributes beyond position and content.
#[derive(Clone, Copy)]
pub(super) struct TextStyle<'a> {
    pub size: f64,
    pub weight: &'a str,
    pub fill: &'a str,
    pub anchor: &'a str,
    pub family: &'a str,
}

impl<'a> TextStyle<'a> {
    pub(super) fn new(size: f64, fill: &'a str) -> Self {
        Self {
            size,
            weight: "normal",
            fill,
            anchor: "middle",
            family: TEXT_FONT,
        }
    }

    pub(super) fn weight(mut self, weight: &'a str) -> Self {
        self.weight = weight;
        self
    }

    pub(super) fn anchor(mut self, anchor: &'a str) -> Self {
        self.anchor = anchor;
        self
    }

    pub(super) fn family(mut self, family: &'a str) -> Self {
        self.family = family;
        self
    }
}

impl SvgBuilder {
    pub(super) fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    pub(super) fn build(self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub(super) fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}" stroke-linecap="round"/>"#,
            x1, y1, x2, y2, color, width
        ));
    }

    pub(super) fn rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: &str,
        stroke: &str,
        radius: f64,
    ) {
        self.elements.push(format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{:.1}" fill="{}" stroke="{}" stroke-width="1"/>"#,
            x, y, w, h, radius, fill, stroke
        ));
    }

    pub(super) fn background(&mut self, fill: &str) {
        self.elements.push(format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width, self.height, fill
        ));
    }

    pub(super) fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.elements.push(format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            cx, cy, r, fill
        ));
    }

    pub(super) fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle) {
        self.elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="{:.0}" font-weight="{}" fill="{}" text-anchor="{}">{}</text>"#,
            x,
            y,
            style.family,
            style.size,
            style.weight,
            style.fill,
            style.anchor,
            escape(content)
        ));
    }

    /// Unfilled stroked path.
    pub(super) fn path(&mut self, d: &str, stroke: &str, stroke_width: f64) {
        self.elements.push(format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}"/>"#,
            d, stroke, stroke_width
        ));
    }

    pub(super) fn open_group(&mut self, class: &str, dx: f64, dy: f64) {
        self.elements.push(format!(
            r#"<g class="{}" transform="translate({:.1},{:.1})">"#,
            class, dx, dy
        ));
    }

    pub(super) fn close_group(&mut self) {
        self.elements.push("</g>".to_string());
    }
}

pub(super) fn escape(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ═══════════════════════════════════════════════════════════════════════
// Empty SVG fallback
// ═══════════════════════════════════════════════════════════════════════

pub(super) fn empty_svg(message: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 400 100\">\
         <text x=\"200\" y=\"50\" text-anchor=\"middle\" font-size=\"14\" fill=\"gray\">{}</text>\
         </svg>",
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_escaped() {
        let mut svg = SvgBuilder::new(100.0, 50.0);
        svg.text(10.0, 20.0, "Tom & <Jerry>", TextStyle::new(12.0, "black"));
        let out = svg.build();
        assert!(out.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(out.starts_with("<svg"));
        assert!(out.trim_end().ends_with("</svg>"));
    }
}

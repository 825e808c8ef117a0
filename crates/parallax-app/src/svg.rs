//! SVG rendering of the homepage: the starfield behind a centered title.

use std::fmt::Write;

use glam::UVec2;
use parallax_starfield::star::PULSE_PERIOD;
use parallax_starfield::{GradientDef, StarSprite};

/// Render a complete SVG document for one frame.
///
/// Every gradient is emitted in `<defs>` before the first circle that
/// references it. Hidden sprites stay in the document with `display:none`.
pub fn render_page(
    palette: &[GradientDef],
    sprites: impl IntoIterator<Item = StarSprite>,
    viewport: UVec2,
    title: &str,
) -> String {
    let mut out = String::with_capacity(64 * 1024);
    let (w, h) = (viewport.x, viewport.y);

    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = writeln!(
        out,
        "<style>@keyframes pulse{{50%{{opacity:.5}}}}\
         .animate-pulse{{animation:pulse {PULSE_PERIOD}s cubic-bezier(.4,0,.6,1) infinite}}\
         .title{{font-family:serif;font-size:36px;font-weight:bold;fill:#fff}}</style>"
    );
    let _ = writeln!(out, r##"<rect width="100%" height="100%" fill="#000"/>"##);

    out.push_str("<defs>\n");
    for gradient in palette {
        write_gradient(&mut out, gradient);
    }
    out.push_str("</defs>\n<g>\n");
    for sprite in sprites {
        write_star(&mut out, &sprite);
    }
    out.push_str("</g>\n");

    let _ = writeln!(
        out,
        r#"<text class="title" x="50%" y="50%" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
        escape_text(title)
    );
    out.push_str("</svg>\n");
    out
}

fn write_gradient(out: &mut String, gradient: &GradientDef) {
    let _ = writeln!(
        out,
        r#"<radialGradient id="{}" cx="{}" cy="{}" r="{}" spreadMethod="pad"><stop offset="{}" stop-color="{}" stop-opacity="{}"/><stop offset="{}" stop-color="{}" stop-opacity="{}"/></radialGradient>"#,
        gradient.id,
        gradient.center[0],
        gradient.center[1],
        gradient.radius,
        gradient.inner.offset,
        gradient.inner.hex(),
        gradient.inner.opacity,
        gradient.outer.offset,
        gradient.outer.hex(),
        gradient.outer.opacity,
    );
}

fn write_star(out: &mut String, sprite: &StarSprite) {
    let display = if sprite.visible { "" } else { "display:none;" };
    let _ = writeln!(
        out,
        r#"<circle class="animate-pulse" cx="{:.2}" cy="{:.2}" r="{}" fill="url(#{})" style="{display}animation-delay:{:.3}s"/>"#,
        sprite.position.x, sprite.position.y, sprite.radius, sprite.fill, sprite.phase,
    );
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

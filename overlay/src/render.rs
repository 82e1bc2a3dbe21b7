//! Raster compositing: bakes strokes and text boxes onto rendered pages.
//!
//! This module receives read-only views of notation state and produces
//! pixels — it does not mutate any application state. The export pipeline
//! uses it to flatten each page; coordinates arrive as page fractions and are
//! scaled to the raster's own dimensions here, so the same data composites
//! correctly at any render scale.
//!
//! Text rasterization needs a font; when none is available the boxes are
//! still drawn and only the glyphs are skipped.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::{Rgba, RgbaImage};

use crate::consts::{STROKE_WIDTH_PX, TEXT_COLOR, TEXT_PADDING_PX, TEXT_SIZE_PX};
use crate::doc::{NotationContent, Stroke};

/// Distance between stamps along a segment, in pixels. Small enough that a
/// 2px-wide line has no gaps at any angle.
const STAMP_STEP_PX: f32 = 0.5;

/// Bake one page's markup onto its raster.
///
/// Draws every stroke whose page matches, in its stored color, then every
/// matching annotation as an unfilled rectangle with its text wrapped to the
/// box width. Other pages' markup is never touched.
pub fn composite_page(
    page: &mut RgbaImage,
    content: &NotationContent,
    page_number: u32,
    font: Option<&FontArc>,
) {
    for stroke in content.strokes.iter().filter(|s| s.page_number == page_number) {
        draw_stroke(page, stroke, STROKE_WIDTH_PX);
    }

    let text_color = Rgba(TEXT_COLOR);
    let (w, h) = (page.width() as f32, page.height() as f32);
    for annotation in content.annotations.iter().filter(|a| a.page_number == page_number) {
        let bx = annotation.x as f32 * w;
        let by = annotation.y as f32 * h;
        let bw = annotation.width as f32 * w;
        let bh = annotation.height as f32 * h;
        draw_rect_outline(page, bx, by, bw, bh, STROKE_WIDTH_PX, text_color);

        if let Some(font) = font
            && !annotation.text.is_empty()
        {
            draw_text_block(
                page,
                font,
                &annotation.text,
                TEXT_SIZE_PX,
                (bx + TEXT_PADDING_PX, by + TEXT_PADDING_PX),
                bw - 2.0 * TEXT_PADDING_PX,
                text_color,
            );
        }
    }
}

// =============================================================
// Colors
// =============================================================

/// Parse a `#rrggbb` CSS color. Anything unparseable falls back to opaque
/// black, the default draw color.
#[must_use]
pub fn parse_color(css: &str) -> Rgba<u8> {
    let hex = css.strip_prefix('#').unwrap_or(css);
    if hex.len() == 6
        && let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        )
    {
        return Rgba([r, g, b, 0xff]);
    }
    Rgba([0x00, 0x00, 0x00, 0xff])
}

// =============================================================
// Strokes and outlines
// =============================================================

/// Draw a committed stroke, scaling its fractional points to the raster's
/// dimensions.
pub fn draw_stroke(img: &mut RgbaImage, stroke: &Stroke, line_width: f32) {
    let color = parse_color(&stroke.color);
    let w = img.width() as f32;
    let h = img.height() as f32;
    let pixels: Vec<(f32, f32)> = stroke
        .points
        .iter()
        .map(|p| (p.x as f32 * w, p.y as f32 * h))
        .collect();
    for pair in pixels.windows(2) {
        draw_segment(img, pair[0], pair[1], line_width, color);
    }
}

/// Draw an unfilled rectangle outline with the given edge thickness.
/// Coordinates are raster pixels.
pub fn draw_rect_outline(
    img: &mut RgbaImage,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    line_width: f32,
    color: Rgba<u8>,
) {
    let corners = [
        (x, y),
        (x + width, y),
        (x + width, y + height),
        (x, y + height),
        (x, y),
    ];
    for pair in corners.windows(2) {
        draw_segment(img, pair[0], pair[1], line_width, color);
    }
}

/// Draw one line segment by stamping squares along its length.
fn draw_segment(img: &mut RgbaImage, a: (f32, f32), b: (f32, f32), width: f32, color: Rgba<u8>) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = dx.hypot(dy);
    let steps = (len / STAMP_STEP_PX).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp(img, a.0 + dx * t, a.1 + dy * t, width, color);
    }
}

/// Fill a square of side `width` centered at (x, y), clipped to the image.
fn stamp(img: &mut RgbaImage, x: f32, y: f32, width: f32, color: Rgba<u8>) {
    let half = width * 0.5;
    let x0 = (x - half).floor().max(0.0) as u32;
    let y0 = (y - half).floor().max(0.0) as u32;
    let x1 = ((x + half).ceil().max(0.0) as u32).min(img.width());
    let y1 = ((y + half).ceil().max(0.0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

// =============================================================
// Text
// =============================================================

/// Greedy word wrap against a caller-supplied measure function.
///
/// Words that fit extend the current line; words that do not start a new
/// one; words wider than the whole line are broken mid-word. Hard newlines
/// in the input are preserved.
pub fn wrap_text(text: &str, max_w: f32, measure: &dyn Fn(&str) -> f32) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let words: Vec<&str> = raw_line.split_whitespace().collect();
        if words.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in words {
            if current.is_empty() {
                if measure(word) <= max_w {
                    current.push_str(word);
                } else {
                    let mut chunks = break_long_word(word, max_w, measure);
                    if let Some(last) = chunks.pop() {
                        out.extend(chunks);
                        current = last;
                    }
                }
                continue;
            }

            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_w {
                current = candidate;
            } else {
                out.push(std::mem::take(&mut current));
                if measure(word) <= max_w {
                    current = word.to_owned();
                } else {
                    let mut chunks = break_long_word(word, max_w, measure);
                    if let Some(last) = chunks.pop() {
                        out.extend(chunks);
                        current = last;
                    }
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn break_long_word(word: &str, max_w: f32, measure: &dyn Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut candidate = current.clone();
        candidate.push(ch);
        if !current.is_empty() && measure(&candidate) > max_w {
            lines.push(current);
            current = ch.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Advance width of one line of text at the given size.
fn line_advance(font: &FontArc, size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(size);
    let mut width = 0.0f32;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

/// Rasterize wrapped text with its top-left corner at `origin`, clipped to
/// the image bounds.
pub fn draw_text_block(
    img: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    size: f32,
    origin: (f32, f32),
    max_w: f32,
    color: Rgba<u8>,
) {
    let lines = wrap_text(text, max_w.max(1.0), &|s| line_advance(font, size, s));
    let scaled = font.as_scaled(size);
    let ascent = scaled.ascent();
    let line_height = scaled.height();

    for (line_idx, line) in lines.iter().enumerate() {
        let baseline = origin.1 + ascent + line_idx as f32 * line_height;
        let mut caret = origin.0;
        let mut last: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(size, point(caret, baseline));
            caret += scaled.h_advance(id);
            last = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    blend(img, px, py, color, coverage);
                });
            }
        }
    }
}

/// Alpha-blend a coverage sample over the existing pixel.
fn blend(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if coverage <= 0.0 || x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    let under = img.get_pixel(x, y).0;
    let mut over = under;
    for i in 0..3 {
        over[i] = (color.0[i] as f32 * coverage + under[i] as f32 * (1.0 - coverage))
            .round()
            .clamp(0.0, 255.0) as u8;
    }
    over[3] = under[3].max((255.0 * coverage).round() as u8);
    img.put_pixel(x, y, Rgba(over));
}

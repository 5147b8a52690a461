use std::convert::Infallible;
use std::f64::consts::TAU;

use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
    FontTransform,
};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{Color, IndirectFontRef, Line, Mm, PdfLayerReference, Point, Polygon, Pt, Rgb, TextMatrix};

// ---------------------------------------------------------------------------
// plotters → printpdf bridge
// ---------------------------------------------------------------------------

/// Average Helvetica advance width as a fraction of the font size.
const CHAR_WIDTH: f64 = 0.55;
/// Cap height above the baseline as a fraction of the font size.
const ASCENT: f64 = 0.72;
/// Segments used to approximate a circle.
const CIRCLE_SEGMENTS: usize = 24;

type DrawResult = Result<(), DrawingErrorKind<Infallible>>;

/// A `plotters` drawing backend that emits vector paths and text into
/// one layer of a PDF page. One backend unit is one PDF point.
#[derive(Clone)]
pub struct PdfBackend {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    size: (u32, u32),
}

impl PdfBackend {
    pub fn new(layer: PdfLayerReference, font: IndirectFontRef, size: (u32, u32)) -> Self {
        PdfBackend { layer, font, size }
    }

    /// Flip from top-left pixel space to bottom-left PDF space.
    fn point(&self, (x, y): BackendCoord) -> Point {
        self.point_f(x as f64, y as f64)
    }

    fn point_f(&self, x: f64, y: f64) -> Point {
        Point::new(
            Mm::from(Pt(x as f32)),
            Mm::from(Pt((self.size.1 as f64 - y) as f32)),
        )
    }

    /// Set the stroke pen; `false` means the colour is fully transparent.
    fn stroke_with(&self, color: BackendColor, width: u32) -> bool {
        if color.alpha <= 0.0 {
            return false;
        }
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(width.max(1) as f32);
        true
    }

    fn fill_with(&self, color: BackendColor) -> bool {
        if color.alpha <= 0.0 {
            return false;
        }
        self.layer.set_fill_color(pdf_color(color));
        true
    }

    fn polyline(&self, points: Vec<Point>, closed: bool) {
        if points.len() < 2 {
            return;
        }
        self.layer.add_line(Line {
            points: points.into_iter().map(|p| (p, false)).collect(),
            is_closed: closed,
        });
    }

    fn filled(&self, points: Vec<Point>) {
        if points.len() < 3 {
            return;
        }
        self.layer.add_polygon(Polygon {
            rings: vec![points.into_iter().map(|p| (p, false)).collect()],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }
}

/// Blend `color` over a white page; PDF transparency needs extra graphics
/// state that a chart never requires.
fn pdf_color(color: BackendColor) -> Color {
    let alpha = color.alpha.clamp(0.0, 1.0);
    let blend = |c: u8| ((c as f64 / 255.0) * alpha + (1.0 - alpha)) as f32;
    let (r, g, b) = color.rgb;
    Color::Rgb(Rgb::new(blend(r), blend(g), blend(b), None))
}

/// Approximate extent of `text` set in Helvetica at `size` points.
pub fn text_extent(text: &str, size: f64) -> (f64, f64) {
    (text.chars().count() as f64 * CHAR_WIDTH * size, size)
}

impl DrawingBackend for PdfBackend {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> DrawResult {
        Ok(())
    }

    fn present(&mut self) -> DrawResult {
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> DrawResult {
        if self.fill_with(color) {
            let (x, y) = point;
            self.filled(vec![
                self.point((x, y)),
                self.point((x + 1, y)),
                self.point((x + 1, y + 1)),
                self.point((x, y + 1)),
            ]);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> DrawResult {
        if self.stroke_with(style.color(), style.stroke_width()) {
            self.polyline(vec![self.point(from), self.point(to)], false);
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        let (x0, y0) = upper_left;
        let (x1, y1) = bottom_right;
        let corners = vec![
            self.point((x0, y0)),
            self.point((x1, y0)),
            self.point((x1, y1)),
            self.point((x0, y1)),
        ];
        if fill {
            if self.fill_with(style.color()) {
                self.filled(corners);
            }
        } else if self.stroke_with(style.color(), style.stroke_width()) {
            self.polyline(corners, true);
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> DrawResult {
        if self.stroke_with(style.color(), style.stroke_width()) {
            let points = path.into_iter().map(|p| self.point(p)).collect();
            self.polyline(points, false);
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> DrawResult {
        if self.fill_with(style.color()) {
            let points = vert.into_iter().map(|p| self.point(p)).collect();
            self.filled(points);
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        let (cx, cy) = (center.0 as f64, center.1 as f64);
        let r = radius as f64;
        let points: Vec<Point> = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let a = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                self.point_f(cx + r * a.cos(), cy + r * a.sin())
            })
            .collect();
        if fill {
            if self.fill_with(style.color()) {
                self.filled(points);
            }
        } else if self.stroke_with(style.color(), style.stroke_width()) {
            self.polyline(points, true);
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> DrawResult {
        if text.is_empty() || !self.fill_with(style.color()) {
            return Ok(());
        }
        let size = style.size();
        let (width, _) = text_extent(text, size);
        let anchor = style.anchor();

        // Offsets along the writing direction and from the glyph tops down
        // to the baseline.
        let along = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let down = match anchor.v_pos {
            VPos::Top => ASCENT * size,
            VPos::Center => ASCENT * size / 2.0,
            VPos::Bottom => 0.0,
        };

        // Unit writing direction and glyph "down" in pixel space, plus the
        // counter-clockwise PDF rotation.
        let ((dx, dy), (nx, ny), angle) = match style.transform() {
            FontTransform::None => ((1.0, 0.0), (0.0, 1.0), 0.0),
            FontTransform::Rotate90 => ((0.0, 1.0), (-1.0, 0.0), 270.0),
            FontTransform::Rotate180 => ((-1.0, 0.0), (0.0, -1.0), 180.0),
            FontTransform::Rotate270 => ((0.0, -1.0), (1.0, 0.0), 90.0),
        };
        let x = pos.0 as f64 + along * dx + down * nx;
        let y = pos.1 as f64 + along * dy + down * ny;

        self.layer.begin_text_section();
        self.layer.set_font(&self.font, size as f32);
        self.layer.set_text_matrix(TextMatrix::TranslateRotate(
            Pt(x as f32),
            Pt((self.size.1 as f64 - y) as f32),
            angle,
        ));
        self.layer.write_text(text, &self.font);
        self.layer.end_text_section();
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let (w, h) = text_extent(text, style.size());
        Ok((w.ceil() as u32, h.ceil() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_extent_scales_with_length_and_size() {
        let (w, h) = text_extent("Flux", 10.0);
        assert!((w - 22.0).abs() < 1e-9);
        assert_eq!(h, 10.0);
        assert_eq!(text_extent("", 12.0).0, 0.0);
    }

    #[test]
    fn transparent_colors_fade_to_white() {
        let faded = pdf_color(BackendColor { alpha: 0.0, rgb: (0, 0, 0) });
        let solid = pdf_color(BackendColor { alpha: 1.0, rgb: (255, 0, 0) });
        match (faded, solid) {
            (Color::Rgb(f), Color::Rgb(s)) => {
                assert_eq!((f.r, f.g, f.b), (1.0, 1.0, 1.0));
                assert_eq!((s.r, s.g, s.b), (1.0, 0.0, 0.0));
            }
            _ => panic!("expected RGB colours"),
        }
    }
}

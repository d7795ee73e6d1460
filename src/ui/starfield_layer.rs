use std::time::Instant;

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::starfield::{Meteor, Star, Starfield};

/// Paints the starfield into the frame background. Positions are viewport
/// percentages, so the layer scales with whatever area it is given.
pub struct StarfieldLayer<'a> {
    field: &'a Starfield,
    now: Instant,
    /// Cell size in pixels, used to turn meteor trail widths into cells.
    cell: (u16, u16),
}

impl<'a> StarfieldLayer<'a> {
    pub fn new(field: &'a Starfield, now: Instant, cell: (u16, u16)) -> Self {
        Self { field, now, cell }
    }
}

const SKY: Color = Color::Rgb(4, 6, 18);

fn shade(brightness: f64) -> Color {
    let b = brightness.clamp(0.0, 1.0);
    let v = (40.0 + 215.0 * b) as u8;
    Color::Rgb(v, v, v.saturating_add(10))
}

/// Glyph for a star of `size` px at its current brightness.
pub(super) fn star_glyph(size: f64, brightness: f64) -> char {
    match (size, brightness) {
        (_, b) if b < 0.25 => '.',
        (s, _) if s < 1.4 => '·',
        (s, b) if s < 2.2 || b < 0.6 => '•',
        _ => '✦',
    }
}

fn to_cell(area: Rect, x_pct: f64, y_pct: f64) -> Option<(u16, u16)> {
    if !(0.0..100.0).contains(&x_pct) || !(0.0..100.0).contains(&y_pct) {
        return None;
    }
    let col = (x_pct / 100.0 * f64::from(area.width)) as u16;
    let row = (y_pct / 100.0 * f64::from(area.height)) as u16;
    Some((area.x + col, area.y + row))
}

impl StarfieldLayer<'_> {
    fn paint_star(&self, star: &Star, t: f64, area: Rect, buf: &mut Buffer) {
        let Some(pos) = to_cell(area, star.x, star.y) else {
            return;
        };
        let brightness = star.opacity_at(t);
        if let Some(cell) = buf.cell_mut(pos) {
            cell.set_char(star_glyph(star.size, brightness))
                .set_fg(shade(brightness));
        }
    }

    fn paint_meteor(&self, meteor: &Meteor, area: Rect, buf: &mut Buffer) {
        let opacity = meteor.opacity_at(self.now);
        if opacity <= 0.0 || area.width == 0 || area.height == 0 {
            return;
        }
        let (hx, hy) = meteor.head_at(self.now);

        // Direction of travel in cell units.
        let sx = f64::from(area.width) / 100.0;
        let sy = f64::from(area.height) / 100.0;
        let dx = (meteor.end_x - meteor.start_x) * sx;
        let dy = (meteor.end_y - meteor.start_y) * sy;
        let len = dx.hypot(dy);
        if len <= f64::EPSILON {
            return;
        }
        let (ux, uy) = (dx / len, dy / len);
        let trail = (meteor.width / f64::from(self.cell.0.max(1))).ceil().max(1.0) as usize;

        let head_col = hx * sx;
        let head_row = hy * sy;
        for i in 0..=trail {
            let col = head_col - ux * i as f64;
            let row = head_row - uy * i as f64;
            if col < 0.0 || row < 0.0 {
                break;
            }
            let (col, row) = (col as u16, row as u16);
            if col >= area.width || row >= area.height {
                continue;
            }
            let fade = opacity * (1.0 - i as f64 / (trail + 1) as f64);
            let glyph = if i == 0 { '✶' } else if fade > 0.5 { '•' } else { '·' };
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_char(glyph).set_fg(shade(fade));
            }
        }
    }
}

impl Widget for StarfieldLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ').set_bg(SKY);
                }
            }
        }

        let t = self.field.elapsed_secs(self.now);
        for star in self.field.stars() {
            self.paint_star(star, t, area, buf);
        }
        for meteor in self.field.meteors().active() {
            self.paint_meteor(meteor, area, buf);
        }
    }
}

/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use sr3d_core::{ScreenPoint, ScreenTriangle, TriangleBatch};
use std::io::Write;

const EMPTY_CHAR: char = ' ';
const FILL_CHAR: char = ':';
const EDGE_CHAR: char = '#';
const NORMAL_CHAR: char = '+';

/// Paints screen-space triangle batches into a character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            char_buffer: vec![EMPTY_CHAR; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.char_buffer = vec![EMPTY_CHAR; width * height];
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(EMPTY_CHAR);
    }

    /// Character at a cell, `None` outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.char_buffer[y * self.width + x])
        } else {
            None
        }
    }

    pub fn render_batch(&mut self, batch: &TriangleBatch) {
        for triangle in batch.triangles() {
            self.fill_triangle(triangle);
        }
        // Outlines go on top so neighbouring fills stay distinguishable
        for triangle in batch.triangles() {
            let [a, b, c] = *triangle.points();
            self.draw_line(a, b, EDGE_CHAR);
            self.draw_line(b, c, EDGE_CHAR);
            self.draw_line(c, a, EDGE_CHAR);
        }
        for line in batch.debug_lines() {
            self.draw_line(line.start, line.end, NORMAL_CHAR);
        }
    }

    fn plot(&mut self, x: i32, y: i32, character: char) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.char_buffer[y as usize * self.width + x as usize] = character;
        }
    }

    fn fill_triangle(&mut self, triangle: &ScreenTriangle) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let [v0, v1, v2] = (*triangle.points()).map(|p| (p.x as f32, p.y as f32));

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);

                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.plot(x, y, FILL_CHAR);
                    }
                }
            }
        }
    }

    /// Bresenham line, clipped to the grid first
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, character: char) {
        let Some((from, to)) = clip_segment(from, to, self.width, self.height) else {
            return;
        };

        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - x).abs();
        let dy = -(to.y - y).abs();
        let sx = if x < to.x { 1 } else { -1 };
        let sy = if y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x, y, character);
            if x == to.x && y == to.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];

                let color = match c {
                    FILL_CHAR => Color::DarkGrey,
                    EDGE_CHAR => Color::Cyan,
                    NORMAL_CHAR => Color::Yellow,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Liang-Barsky clip of a segment to `[0, width) x [0, height)`
fn clip_segment(
    from: ScreenPoint,
    to: ScreenPoint,
    width: usize,
    height: usize,
) -> Option<(ScreenPoint, ScreenPoint)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (dx, dy) = (to.x as f64 - x0, to.y as f64 - y0);
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| {
        ScreenPoint::new(
            (x0 + t * dx).round().clamp(0.0, max_x) as i32,
            (y0 + t * dy).round().clamp(0.0, max_y) as i32,
        )
    };
    Some((at(t0), at(t1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(points: [(i32, i32); 3]) -> ScreenTriangle {
        ScreenTriangle(points.map(|(x, y)| ScreenPoint::new(x, y)))
    }

    #[test]
    fn test_fill_covers_interior() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.fill_triangle(&triangle([(0, 9), (19, 9), (10, 0)]));

        assert_eq!(renderer.cell(10, 7), Some(FILL_CHAR));
        assert_eq!(renderer.cell(0, 0), Some(EMPTY_CHAR));
        assert_eq!(renderer.cell(19, 0), Some(EMPTY_CHAR));
    }

    #[test]
    fn test_degenerate_triangle_fills_nothing() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.fill_triangle(&triangle([(0, 0), (5, 5), (10, 10)]));

        assert!(renderer.char_buffer.iter().all(|&c| c == EMPTY_CHAR));
    }

    #[test]
    fn test_line_endpoints_are_plotted() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.draw_line(ScreenPoint::new(1, 1), ScreenPoint::new(8, 5), EDGE_CHAR);

        assert_eq!(renderer.cell(1, 1), Some(EDGE_CHAR));
        assert_eq!(renderer.cell(8, 5), Some(EDGE_CHAR));
        let plotted = renderer.char_buffer.iter().filter(|&&c| c == EDGE_CHAR).count();
        assert_eq!(plotted, 8);
    }

    #[test]
    fn test_offscreen_segments_are_clipped() {
        assert!(clip_segment(ScreenPoint::new(-50, -5), ScreenPoint::new(-1, -40), 10, 10).is_none());

        let (a, b) = clip_segment(
            ScreenPoint::new(-1_000_000, 5),
            ScreenPoint::new(1_000_000, 5),
            10,
            10,
        )
        .unwrap();
        assert_eq!(a, ScreenPoint::new(0, 5));
        assert_eq!(b, ScreenPoint::new(9, 5));
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let mut renderer = AsciiRenderer::new(3, 2);
        renderer.plot(1, 1, EDGE_CHAR);
        renderer.plot(7, 7, EDGE_CHAR);

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('#'));
        assert_eq!(renderer.cell(7, 7), None);
    }
}

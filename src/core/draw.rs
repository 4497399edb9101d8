use super::surface::Surface;

/// Number of straight segments used to approximate circles and ellipses
pub const CURVE_SEGMENTS: u32 = 100;

impl Surface {
    /// Draw line using Bresenham's algorithm, both endpoints inclusive
    pub fn plot_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, colour: u32) {
        let (mut x, mut y) = (x0, y0);

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel(x, y, colour);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                if x == x1 {
                    break;
                }
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                if y == y1 {
                    break;
                }
                err += dx;
                y += sy;
            }
        }
    }

    /// Circle outline as a closed polyline
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, colour: u32) {
        self.draw_ellipse(cx, cy, radius, radius, colour);
    }

    /// Ellipse outline as a closed polyline sampled at uniform angles
    pub fn draw_ellipse(&mut self, cx: i32, cy: i32, radius_x: i32, radius_y: i32, colour: u32) {
        let point = |n: u32| {
            let angle = std::f32::consts::TAU * n as f32 / CURVE_SEGMENTS as f32;
            (
                cx + (angle.sin() * radius_x as f32) as i32,
                cy + (angle.cos() * radius_y as f32) as i32,
            )
        };

        let (mut last_x, mut last_y) = point(0);
        for n in 1..=CURVE_SEGMENTS {
            let (px, py) = point(n);
            self.plot_line(last_x, last_y, px, py, colour);
            last_x = px;
            last_y = py;
        }
    }

    /// Filled circle built from concentric outlines
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, colour: u32) {
        for r in 1..radius {
            self.draw_circle(cx, cy, r, colour);
        }
    }
}

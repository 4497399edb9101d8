use glam::Vec2;

use crate::core::{DisplayContext, Surface};

/// Bouncing filled circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub colour: u32,
}

impl Sprite {
    /// Move by `velocity * dt` and reflect off the edges of `bounds`
    pub fn advance(&mut self, dt: f32, bounds: Vec2) {
        self.position += self.velocity * dt;

        for axis in 0..2 {
            let (low, high) = (self.radius, bounds[axis] - self.radius);
            if high <= low {
                self.position[axis] = bounds[axis] / 2.0;
                continue;
            }
            if self.position[axis] < low {
                self.position[axis] = low + (low - self.position[axis]).min(high - low);
                self.velocity[axis] = self.velocity[axis].abs();
            } else if self.position[axis] > high {
                self.position[axis] = high - (self.position[axis] - high).min(high - low);
                self.velocity[axis] = -self.velocity[axis].abs();
            }
        }
    }
}

/// Screen saver shown while nobody is using the kiosk
pub struct Attract {
    sprites: Vec<Sprite>,
    bounds: Vec2,
}

impl Attract {
    /// Spread `count` sprites across the middle of the screen with
    /// different headings
    pub fn new(display: DisplayContext, count: usize, speed: f32, palette: &[u32]) -> Self {
        let bounds = Vec2::new(display.width as f32, display.height as f32);
        let radius = bounds.min_element() / 12.0;
        let sprites = (0..count)
            .map(|i| {
                let across = (i + 1) as f32 / (count + 1) as f32;
                let heading = 0.7 + i as f32 * 1.3;
                Sprite {
                    position: Vec2::new(bounds.x * across, bounds.y / 2.0),
                    velocity: Vec2::from_angle(heading) * speed,
                    radius,
                    colour: palette.get(i % palette.len().max(1)).copied().unwrap_or(0xffffffff),
                }
            })
            .collect();
        Self { sprites, bounds }
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn update(&mut self, dt: f32) {
        for sprite in &mut self.sprites {
            sprite.advance(dt, self.bounds);
        }
    }

    /// Clear the surface and draw every sprite
    pub fn draw(&self, surface: &mut Surface) {
        surface.clear();
        for sprite in &self.sprites {
            surface.fill_circle(
                sprite.position.x.round() as i32,
                sprite.position.y.round() as i32,
                sprite.radius.round() as i32,
                sprite.colour,
            );
        }
    }
}

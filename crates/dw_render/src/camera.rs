use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Pixel-space projection: (0, 0) top-left, y down, `width`x`height`
    /// logical pixels spanning the surface.
    pub fn screen(width: f32, height: f32) -> Self {
        let proj = Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0);
        Self {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

/// Player-following scroll offset. World positions minus `offset` give
/// screen positions; there is no zoom or parallax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCamera {
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl ScrollCamera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport,
        }
    }

    /// Centres the viewport on `target`.
    pub fn follow(&mut self, target: Vec2) {
        self.offset = target - self.viewport * 0.5;
    }

    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_centres_target() {
        let mut camera = ScrollCamera::new(Vec2::new(1280.0, 720.0));
        camera.follow(Vec2::new(1000.0, 500.0));
        assert_eq!(camera.offset, Vec2::new(360.0, 140.0));
        assert_eq!(
            camera.to_screen(Vec2::new(1000.0, 500.0)),
            Vec2::new(640.0, 360.0)
        );
        assert_eq!(camera.to_world(Vec2::new(640.0, 360.0)), Vec2::new(1000.0, 500.0));
    }

    #[test]
    fn screen_projection_maps_corners() {
        let uniform = CameraUniform::screen(200.0, 100.0);
        let m = Mat4::from_cols_array_2d(&uniform.view_proj);
        let top_left = m.project_point3(glam::Vec3::new(0.0, 0.0, 0.0));
        let bottom_right = m.project_point3(glam::Vec3::new(200.0, 100.0, 0.0));
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }
}

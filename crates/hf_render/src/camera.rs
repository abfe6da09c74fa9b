use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Screen-space camera. Units are playfield pixels with the origin at the
/// top-left corner and y growing downward, matching tile map rows.
pub struct Camera2D {
    /// Top-left corner of the visible region.
    pub position: Vec2,
    pub zoom: f32,
    /// Logical playfield size. Independent of the surface size, so the
    /// playfield stretches to fill the window.
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn visible_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) / self.zoom
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let size = self.visible_size();
        let proj = Mat4::orthographic_rh(
            self.position.x,
            self.position.x + size.x,
            self.position.y + size.y,
            self.position.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }

    /// Maps a physical pointer position on a `surface` sized window into
    /// playfield pixels.
    pub fn surface_to_playfield(&self, pointer: Vec2, surface: (u32, u32)) -> Vec2 {
        let surface = Vec2::new(surface.0.max(1) as f32, surface.1.max(1) as f32);
        self.position + pointer / surface * self.visible_size()
    }
}

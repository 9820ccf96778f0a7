use glam::Vec2;

use crate::geometry::IntRect;

/// One corner of a [`VertexQuad`], laid out for direct upload to a vertex
/// buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Screen/world-space position.
    pub position: [f32; 2],
    /// Texture coordinates in atlas pixels (not normalised).
    pub tex_coords: [f32; 2],
}

// ── VertexQuad ─────────────────────────────────────────────────────────────────

/// Four independent vertices describing one textured rectangle.
///
/// Sits between a raw vertex array and a sprite: it keeps the sprite-like
/// conveniences (position, scale, texture rect, mirroring) but stores plain
/// vertices so any number of quads can be appended into one draw call.
///
/// Vertex order is clockwise from the top-left corner:
///
/// ```text
/// 0──1
/// │  │
/// 3──2
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexQuad {
    vertices: [QuadVertex; 4],
    scale: f32,
}

impl Default for VertexQuad {
    /// Quad at the origin with an empty texture rect and a scale of 1.
    fn default() -> Self {
        Self::new(Vec2::ZERO, IntRect::default(), 1.0)
    }
}

impl VertexQuad {
    pub fn new(position: Vec2, texture_rect: IntRect, scale: f32) -> Self {
        let mut quad = Self { vertices: [QuadVertex::default(); 4], scale };
        quad.vertices[0].position = position.to_array();
        quad.set_texture_rect(texture_rect);
        quad
    }

    /// Shift every vertex by `offset`.
    pub fn move_by(&mut self, offset: Vec2) {
        for vertex in &mut self.vertices {
            vertex.position[0] += offset.x;
            vertex.position[1] += offset.y;
        }
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.move_by(position - self.position());
    }

    /// Top-left corner.
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.vertices[0].position)
    }

    /// Change the scale in place. The top-left corner stays where it is and
    /// the texture coordinates are untouched.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        let rect = self.texture_rect();
        self.resize(rect.width, rect.height);
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Screen-space width and height.
    pub fn size(&self) -> Vec2 {
        Vec2::from_array(self.vertices[2].position) - self.position()
    }

    pub fn set_texture_rect(&mut self, texture_rect: IntRect) {
        self.set_texture_rect_flipped(texture_rect, false, false);
    }

    /// Point the quad at `texture_rect` and resize it to
    /// `texture_rect.size * scale`.
    ///
    /// `flip_x` / `flip_y` mirror the texture coordinates across the vertical /
    /// horizontal axis; screen-space vertices are not affected. Both together
    /// rotate the image by 180°.
    pub fn set_texture_rect_flipped(&mut self, texture_rect: IntRect, flip_x: bool, flip_y: bool) {
        self.resize(texture_rect.width, texture_rect.height);

        let left = texture_rect.left as f32;
        let top = texture_rect.top as f32;
        let right = texture_rect.right() as f32;
        let bottom = texture_rect.bottom() as f32;

        let (x0, x1) = if flip_x { (right, left) } else { (left, right) };
        let (y0, y1) = if flip_y { (bottom, top) } else { (top, bottom) };

        self.vertices[0].tex_coords = [x0, y0];
        self.vertices[1].tex_coords = [x1, y0];
        self.vertices[2].tex_coords = [x1, y1];
        self.vertices[3].tex_coords = [x0, y1];
    }

    /// The rectangle spanned by the texture coordinates.
    ///
    /// Exact inverse of [`set_texture_rect`](Self::set_texture_rect). For
    /// mirrored quads the same (unmirrored) rectangle comes back.
    pub fn texture_rect(&self) -> IntRect {
        let [ax, ay] = self.vertices[0].tex_coords;
        let [bx, by] = self.vertices[2].tex_coords;
        IntRect::new(
            ax.min(bx).round() as i32,
            ay.min(by).round() as i32,
            (bx - ax).abs().round() as i32,
            (by - ay).abs().round() as i32,
        )
    }

    /// Mirror the current texture coordinates. Calling it twice with the same
    /// arguments restores the original mapping.
    pub fn flip_texture(&mut self, flip_x: bool, flip_y: bool) {
        let v = &mut self.vertices;
        if flip_x {
            swap_x(v, 0, 1);
            swap_x(v, 3, 2);
        }
        if flip_y {
            swap_y(v, 0, 3);
            swap_y(v, 1, 2);
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[QuadVertex; 4] {
        &self.vertices
    }

    /// Append this quad as two triangles (0,1,2) and (0,2,3) to a shared
    /// vertex + index buffer.
    pub fn append_to(&self, vertices: &mut Vec<QuadVertex>, indices: &mut Vec<u32>) {
        let base = vertices.len() as u32;
        vertices.extend_from_slice(&self.vertices);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Rebuild vertices 1–3 from the top-left anchor.
    fn resize(&mut self, width: i32, height: i32) {
        let [x, y] = self.vertices[0].position;
        let w = width as f32 * self.scale;
        let h = height as f32 * self.scale;
        self.vertices[1].position = [x + w, y];
        self.vertices[2].position = [x + w, y + h];
        self.vertices[3].position = [x, y + h];
    }
}

fn swap_x(v: &mut [QuadVertex; 4], a: usize, b: usize) {
    let tmp = v[a].tex_coords[0];
    v[a].tex_coords[0] = v[b].tex_coords[0];
    v[b].tex_coords[0] = tmp;
}

fn swap_y(v: &mut [QuadVertex; 4], a: usize, b: usize) {
    let tmp = v[a].tex_coords[1];
    v[a].tex_coords[1] = v[b].tex_coords[1];
    v[b].tex_coords[1] = tmp;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

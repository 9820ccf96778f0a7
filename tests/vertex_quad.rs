use glam::Vec2;
use tileforge::geometry::IntRect;
use tileforge::resources::VertexQuad;

#[test]
fn texture_rect_round_trips() {
    let mut quad = VertexQuad::default();
    for rect in [IntRect::new(0, 0, 16, 16), IntRect::new(32, 48, 7, 3), IntRect::new(1000, 5, 24, 64)] {
        quad.set_texture_rect(rect);
        assert_eq!(quad.texture_rect(), rect);
    }
}

#[test]
fn screen_size_is_texture_size_times_scale() {
    let quad = VertexQuad::new(Vec2::new(2.0, 3.0), IntRect::new(0, 0, 16, 8), 0.5);
    assert_eq!(quad.size(), Vec2::new(8.0, 4.0));
    assert_eq!(quad.position(), Vec2::new(2.0, 3.0));
}

#[test]
fn flips_keep_size_and_screen_vertices() {
    let rect = IntRect::new(16, 32, 16, 8);
    let mut quad = VertexQuad::new(Vec2::ZERO, rect, 1.0);
    let positions: Vec<_> = quad.vertices().iter().map(|v| v.position).collect();

    for (flip_x, flip_y) in [(true, false), (false, true), (true, true)] {
        quad.set_texture_rect_flipped(rect, flip_x, flip_y);
        assert_eq!(quad.texture_rect(), rect);
        let after: Vec<_> = quad.vertices().iter().map(|v| v.position).collect();
        assert_eq!(after, positions);
    }
}

#[test]
fn horizontal_flip_swaps_left_and_right() {
    let mut quad = VertexQuad::default();
    quad.set_texture_rect_flipped(IntRect::new(0, 0, 16, 16), true, false);
    let v = quad.vertices();
    assert_eq!(v[0].tex_coords, [16.0, 0.0]);
    assert_eq!(v[1].tex_coords, [0.0, 0.0]);
}

#[test]
fn both_flips_rotate_half_a_turn() {
    let mut quad = VertexQuad::default();
    quad.set_texture_rect_flipped(IntRect::new(0, 0, 16, 16), true, true);
    let v = quad.vertices();
    assert_eq!(v[0].tex_coords, [16.0, 16.0]);
    assert_eq!(v[2].tex_coords, [0.0, 0.0]);
}

#[test]
fn set_scale_keeps_anchor_and_texture() {
    let rect = IntRect::new(8, 8, 16, 16);
    let mut quad = VertexQuad::new(Vec2::new(10.0, 10.0), rect, 1.0);
    quad.set_scale(2.0);
    assert_eq!(quad.position(), Vec2::new(10.0, 10.0));
    assert_eq!(quad.size(), Vec2::new(32.0, 32.0));
    assert_eq!(quad.texture_rect(), rect);
}

#[test]
fn set_position_moves_all_corners() {
    let mut quad = VertexQuad::new(Vec2::ZERO, IntRect::new(0, 0, 4, 4), 1.0);
    quad.set_position(Vec2::new(10.0, -2.0));
    assert_eq!(quad.vertices()[2].position, [14.0, 2.0]);
    quad.move_by(Vec2::new(1.0, 1.0));
    assert_eq!(quad.position(), Vec2::new(11.0, -1.0));
}

use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::geometry::{vec2, vec3, Vec2f, Vec3f};
use crate::shader::Shader;

/// Barycentric coordinates of point `p` with respect to the screen-space
/// triangle `pts`, via the cross product of the two edge/point difference
/// vectors. A near-zero screen area (|u.z| < 1) marks the triangle as
/// degenerate and yields the (-1, 1, 1) sentinel, which fails the inside
/// test for every pixel.
pub fn barycentric(pts: &[Vec3f; 3], p: Vec2f) -> Vec3f {
    let u = vec3(
        pts[2].x() - pts[0].x(),
        pts[1].x() - pts[0].x(),
        pts[0].x() - p.x(),
    )
    .cross(vec3(
        pts[2].y() - pts[0].y(),
        pts[1].y() - pts[0].y(),
        pts[0].y() - p.y(),
    ));
    if u.z().abs() < 1.0 {
        return vec3(-1.0, 1.0, 1.0);
    }
    return vec3(
        1.0 - (u.x() + u.y()) / u.z(),
        u.y() / u.z(),
        u.x() / u.z(),
    );
}

/// Rasterizes one triangle: scans the bounding box of the projected points,
/// depth-tests each covered pixel and lets the shader color it. Color and
/// depth are only ever written together; a discarded fragment leaves the
/// depth buffer untouched even though it passed the test.
pub fn triangle<S: Shader>(
    pts: &[Vec3f; 3],
    shader: &S,
    frame: &mut Framebuffer,
    depth: &mut DepthBuffer,
) {
    debug_assert_eq!(frame.width(), depth.width());
    debug_assert_eq!(frame.height(), depth.height());

    // Integer bounding box, clamped to the buffer extents since the
    // projected points can land anywhere.
    let min_x = pts.iter().map(|p| p.x()).fold(f32::MAX, f32::min);
    let min_y = pts.iter().map(|p| p.y()).fold(f32::MAX, f32::min);
    let max_x = pts.iter().map(|p| p.x()).fold(f32::MIN, f32::max);
    let max_y = pts.iter().map(|p| p.y()).fold(f32::MIN, f32::max);
    let x_low = (min_x.floor() as i64).max(0);
    let y_low = (min_y.floor() as i64).max(0);
    let x_high = (max_x.ceil() as i64).min(frame.width() as i64 - 1);
    let y_high = (max_y.ceil() as i64).min(frame.height() as i64 - 1);

    for x in x_low..=x_high {
        for y in y_low..=y_high {
            let bar = barycentric(pts, vec2(x as f32, y as f32));
            // Any negative weight puts the pixel outside the triangle;
            // weights exactly at zero (edge pixels) are kept.
            if bar.x() < 0.0 || bar.y() < 0.0 || bar.z() < 0.0 {
                continue;
            }
            let z = bar.x() * pts[0].z() + bar.y() * pts[1].z() + bar.z() * pts[2].z();
            if z <= depth.get(x as u32, y as u32) {
                continue;
            }
            if let Some(color) = shader.fragment(bar) {
                depth.set(x as u32, y as u32, z);
                frame.set_pixel(x as u32, y as u32, color);
            }
        }
    }
}

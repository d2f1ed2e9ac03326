use crate::geometry::{Mat4, Vec3f};

/// Resolution of the depth buffer after the viewport mapping: NDC z in
/// [-1, 1] lands in [0, DEPTH].
pub const DEPTH: f32 = 255.0;

/// The four matrices of the pipeline, composed on demand. Everything starts
/// as identity; accumulation happens at the call site, e.g.
/// `ctx.model = rotation_xy(angle) * ctx.model`.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub viewport: Mat4,
}

impl Default for TransformContext {
    fn default() -> Self {
        return TransformContext {
            model: Mat4::identity(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            viewport: Mat4::identity(),
        };
    }
}

impl TransformContext {
    pub fn new() -> Self {
        return Default::default();
    }

    /// The single matrix the rasterizer-facing code applies to vertices.
    pub fn matrix(&self) -> Mat4 {
        return self.viewport * self.projection * self.view * self.model;
    }
}

/// Rotation by `angle_deg` degrees in the XY plane.
pub fn rotation_xy(angle_deg: f32) -> Mat4 {
    let radians = angle_deg.to_radians();
    let mut m = Mat4::identity();
    m[0][0] = radians.cos();
    m[0][1] = -radians.sin();
    m[1][0] = radians.sin();
    m[1][1] = radians.cos();
    return m;
}

/// Look-at view matrix: re-expresses world coordinates in the camera basis.
/// The translation column is -center.
pub fn look_at(eye: Vec3f, center: Vec3f, up: Vec3f) -> Mat4 {
    let z = (eye - center).normalized();
    let x = up.cross(z).normalized();
    let y = z.cross(x).normalized();
    let mut m = Mat4::identity();
    for i in 0..3 {
        m[0][i] = x[i];
        m[1][i] = y[i];
        m[2][i] = z[i];
        m[i][3] = -center[i];
    }
    return m;
}

/// View transform for the full-perspective path: re-homes the camera to the
/// origin, looking down -z from `eye`.
pub fn translate_view(eye: Vec3f) -> Mat4 {
    let mut m = Mat4::identity();
    for i in 0..3 {
        m[i][3] = -eye[i];
    }
    return m;
}

/// Simple perspective form: the homogenous divide after this matrix gives
/// foreshortening proportional to `coeff`. 0 keeps the projection orthographic.
pub fn projection_from_coeff(coeff: f32) -> Mat4 {
    let mut m = Mat4::identity();
    m[3][2] = coeff;
    return m;
}

/// Full perspective form: a perspective-to-orthographic squash built from the
/// near/far planes, composed with an orthographic scale built from the field
/// of view and aspect ratio. The camera looks down -z; the near plane maps to
/// NDC z = 1 and the far plane to z = -1, so larger depth is nearer.
pub fn perspective(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let n = -near;
    let f = -far;
    let mut squash = Mat4::zeros();
    squash[0][0] = n;
    squash[1][1] = n;
    squash[2][2] = n + f;
    squash[2][3] = -n * f;
    squash[3][2] = 1.0;

    let t = (fov_deg.to_radians() / 2.0).tan() * near;
    let r = t * aspect;
    let mut ortho = Mat4::identity();
    ortho[0][0] = 1.0 / r;
    ortho[1][1] = 1.0 / t;
    ortho[2][2] = 2.0 / (n - f);
    ortho[2][3] = -(n + f) / (n - f);

    return ortho * squash;
}

/// Maps NDC [-1, 1] to the pixel rectangle (x, y, x + w, y + h) and NDC z to
/// [0, DEPTH].
pub fn viewport(x: i32, y: i32, w: i32, h: i32) -> Mat4 {
    let mut m = Mat4::identity();
    m[0][3] = x as f32 + w as f32 / 2.0;
    m[1][3] = y as f32 + h as f32 / 2.0;
    m[2][3] = DEPTH / 2.0;
    m[0][0] = w as f32 / 2.0;
    m[1][1] = h as f32 / 2.0;
    m[2][2] = DEPTH / 2.0;
    return m;
}

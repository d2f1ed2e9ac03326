use image::Rgb;

use crate::framebuffer::{blend, DepthBuffer, BLACK, WHITE};
use crate::geometry::{
    from_hom_point, from_hom_vector, to_hom_point, to_hom_vector, Mat4, Vec2f, Vec3f,
};
use crate::model::Model;
use crate::transform::{TransformContext, DEPTH};

/// Additive bias for the light-space depth comparison, avoiding
/// self-shadowing speckle on surfaces that shadow themselves.
const SHADOW_BIAS: f32 = 1.0;

/// Ambient floor and diffuse/specular weights of the shadowed strategy.
const AMBIENT: f32 = 20.0;
const DIFFUSE_WEIGHT: f32 = 1.2;
const SPECULAR_WEIGHT: f32 = 0.6;

/// The two-stage contract the rasterizer drives. `vertex` is called once per
/// vertex of a face and returns its screen-space position, stashing whatever
/// varying data the fragment stage needs; `fragment` is called per covered
/// pixel with barycentric weights and either produces a color or discards
/// the fragment with None.
pub trait Shader {
    fn vertex(&mut self, face: usize, nth: usize) -> Vec3f;
    fn fragment(&self, bar: Vec3f) -> Option<Rgb<u8>>;
}

/// Barycentric interpolation of a per-vertex attribute.
fn interpolate2(values: &[Vec2f; 3], bar: Vec3f) -> Vec2f {
    return values[0] * bar[0] + values[1] * bar[1] + values[2] * bar[2];
}

fn interpolate3(values: &[Vec3f; 3], bar: Vec3f) -> Vec3f {
    return values[0] * bar[0] + values[1] * bar[1] + values[2] * bar[2];
}

/// Object space to screen space through the composed pipeline matrix.
fn to_screen(matrix: Mat4, v: Vec3f) -> Vec3f {
    return from_hom_point(matrix * to_hom_point(v));
}

/// Uniform white shading scaled by a single per-face diffuse intensity.
pub struct FlatShader<'a> {
    model: &'a Model,
    mvpv: Mat4,
    light_dir: Vec3f,
    // Varying.
    intensity: f32,
}

impl<'a> FlatShader<'a> {
    pub fn new(model: &'a Model, ctx: &TransformContext, light_dir: Vec3f) -> Self {
        return FlatShader {
            model,
            mvpv: ctx.matrix(),
            light_dir: light_dir.normalized(),
            intensity: 0.0,
        };
    }
}

impl Shader for FlatShader<'_> {
    fn vertex(&mut self, face: usize, nth: usize) -> Vec3f {
        if nth == 0 {
            let a = self.model.vertex(face, 0);
            let b = self.model.vertex(face, 1);
            let c = self.model.vertex(face, 2);
            let face_normal = (b - a).cross(c - a).normalized();
            self.intensity = face_normal.dot(self.light_dir).max(0.0);
        }
        return to_screen(self.mvpv, self.model.vertex(face, nth));
    }

    fn fragment(&self, _bar: Vec3f) -> Option<Rgb<u8>> {
        return Some(blend(WHITE, BLACK, self.intensity));
    }
}

/// Gouraud shading with a diffuse texture: per-vertex intensities,
/// interpolated across the face.
pub struct DiffuseShader<'a> {
    model: &'a Model,
    mvpv: Mat4,
    light_dir: Vec3f,
    // Varyings.
    varying_intensity: Vec3f,
    varying_uv: [Vec2f; 3],
}

impl<'a> DiffuseShader<'a> {
    pub fn new(model: &'a Model, ctx: &TransformContext, light_dir: Vec3f) -> Self {
        return DiffuseShader {
            model,
            mvpv: ctx.matrix(),
            light_dir: light_dir.normalized(),
            varying_intensity: Vec3f::zeros(),
            varying_uv: [Vec2f::zeros(); 3],
        };
    }
}

impl Shader for DiffuseShader<'_> {
    fn vertex(&mut self, face: usize, nth: usize) -> Vec3f {
        self.varying_intensity[nth] = self.model.normal(face, nth).dot(self.light_dir).max(0.0);
        self.varying_uv[nth] = self.model.uv(face, nth);
        return to_screen(self.mvpv, self.model.vertex(face, nth));
    }

    fn fragment(&self, bar: Vec3f) -> Option<Rgb<u8>> {
        let intensity = bar.dot(self.varying_intensity);
        let uv = interpolate2(&self.varying_uv, bar);
        return Some(blend(self.model.diffuse(uv), BLACK, intensity));
    }
}

/// Per-fragment normal from the normal map; normal and light are carried
/// through the projection-model-view transform like the reference does.
pub struct NormalMapShader<'a> {
    model: &'a Model,
    mvpv: Mat4,
    m: Mat4,   // projection * view * model
    mit: Mat4, // its inverse transpose, applied to normals
    light_dir: Vec3f,
    // Varying.
    varying_uv: [Vec2f; 3],
}

impl<'a> NormalMapShader<'a> {
    pub fn new(
        model: &'a Model,
        ctx: &TransformContext,
        light_dir: Vec3f,
    ) -> Result<Self, crate::error::RenderError> {
        let m = ctx.projection * ctx.view * ctx.model;
        let mit = m
            .try_inverse_transpose()
            .ok_or(crate::error::RenderError::DegenerateTransform)?;
        return Ok(NormalMapShader {
            model,
            mvpv: ctx.matrix(),
            m,
            mit,
            light_dir: light_dir.normalized(),
            varying_uv: [Vec2f::zeros(); 3],
        });
    }
}

impl Shader for NormalMapShader<'_> {
    fn vertex(&mut self, face: usize, nth: usize) -> Vec3f {
        self.varying_uv[nth] = self.model.uv(face, nth);
        return to_screen(self.mvpv, self.model.vertex(face, nth));
    }

    fn fragment(&self, bar: Vec3f) -> Option<Rgb<u8>> {
        let uv = interpolate2(&self.varying_uv, bar);
        let n = from_hom_vector(self.mit * to_hom_vector(self.model.normal_at_uv(uv))).normalized();
        let l = from_hom_vector(self.m * to_hom_vector(self.light_dir)).normalized();
        let intensity = n.dot(l).max(0.0);
        return Some(blend(self.model.diffuse(uv), BLACK, intensity));
    }
}

/// Depth pass of the shadow pipeline: paints the light's-eye view as a
/// grayscale of depth while the rasterizer fills the shadow depth buffer.
pub struct DepthShader<'a> {
    model: &'a Model,
    light_mvpv: Mat4,
    // Varying.
    varying_z: Vec3f,
}

impl<'a> DepthShader<'a> {
    pub fn new(model: &'a Model, light_mvpv: Mat4) -> Self {
        return DepthShader {
            model,
            light_mvpv,
            varying_z: Vec3f::zeros(),
        };
    }
}

impl Shader for DepthShader<'_> {
    fn vertex(&mut self, face: usize, nth: usize) -> Vec3f {
        let screen = to_screen(self.light_mvpv, self.model.vertex(face, nth));
        self.varying_z[nth] = screen.z();
        return screen;
    }

    fn fragment(&self, bar: Vec3f) -> Option<Rgb<u8>> {
        let z = bar.dot(self.varying_z);
        return Some(blend(WHITE, BLACK, z / DEPTH));
    }
}

/// Lit pass of the shadow pipeline: normal-mapped diffuse plus a reflected
/// specular term, dimmed where the shadow buffer says the light is occluded.
pub struct ShadowedShader<'a> {
    model: &'a Model,
    mvpv: Mat4,
    m: Mat4,
    mit: Mat4,
    /// Maps a camera-space screen pixel to its light-space screen pixel.
    mshadow: Mat4,
    light_dir: Vec3f,
    shadow_buffer: &'a DepthBuffer,
    // Varyings.
    varying_uv: [Vec2f; 3],
    varying_screen: [Vec3f; 3],
}

impl<'a> ShadowedShader<'a> {
    pub fn new(
        model: &'a Model,
        ctx: &TransformContext,
        mshadow: Mat4,
        light_dir: Vec3f,
        shadow_buffer: &'a DepthBuffer,
    ) -> Result<Self, crate::error::RenderError> {
        let m = ctx.projection * ctx.view * ctx.model;
        let mit = m
            .try_inverse_transpose()
            .ok_or(crate::error::RenderError::DegenerateTransform)?;
        return Ok(ShadowedShader {
            model,
            mvpv: ctx.matrix(),
            m,
            mit,
            mshadow,
            light_dir: light_dir.normalized(),
            shadow_buffer,
            varying_uv: [Vec2f::zeros(); 3],
            varying_screen: [Vec3f::zeros(); 3],
        });
    }

    /// Shadow factor for an interpolated camera-space screen position: 1.0
    /// in the light, 0.3 behind an occluder.
    fn shadow_factor(&self, screen: Vec3f) -> f32 {
        let sp = from_hom_point(self.mshadow * to_hom_point(screen));
        let x = (sp.x().round() as i64).clamp(0, self.shadow_buffer.width() as i64 - 1) as u32;
        let y = (sp.y().round() as i64).clamp(0, self.shadow_buffer.height() as i64 - 1) as u32;
        if self.shadow_buffer.get(x, y) < sp.z() + SHADOW_BIAS {
            return 1.0;
        }
        return 0.3;
    }
}

impl Shader for ShadowedShader<'_> {
    fn vertex(&mut self, face: usize, nth: usize) -> Vec3f {
        let screen = to_screen(self.mvpv, self.model.vertex(face, nth));
        self.varying_uv[nth] = self.model.uv(face, nth);
        self.varying_screen[nth] = screen;
        return screen;
    }

    fn fragment(&self, bar: Vec3f) -> Option<Rgb<u8>> {
        let shadow = self.shadow_factor(interpolate3(&self.varying_screen, bar));
        let uv = interpolate2(&self.varying_uv, bar);
        let n = from_hom_vector(self.mit * to_hom_vector(self.model.normal_at_uv(uv))).normalized();
        let l = from_hom_vector(self.m * to_hom_vector(self.light_dir)).normalized();
        let reflected = (n * (2.0 * n.dot(l)) - l).normalized();
        let spec = reflected.z().max(0.0).powf(self.model.specular(uv));
        let diff = n.dot(l).max(0.0);
        let color = self.model.diffuse(uv);
        let mut channels = [0u8; 3];
        for i in 0..3 {
            let lit = AMBIENT
                + color.0[i] as f32 * shadow * (DIFFUSE_WEIGHT * diff + SPECULAR_WEIGHT * spec);
            channels[i] = lit.min(255.0) as u8;
        }
        return Some(Rgb(channels));
    }
}

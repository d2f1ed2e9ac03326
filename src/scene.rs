use log::debug;

use crate::error::RenderError;
use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::geometry::{vec3, Vec3f};
use crate::model::Model;
use crate::rasterizer::triangle;
use crate::shader::{
    DepthShader, DiffuseShader, FlatShader, NormalMapShader, Shader, ShadowedShader,
};
use crate::transform::{
    look_at, perspective, projection_from_coeff, rotation_xy, translate_view, viewport,
    TransformContext,
};

/// Vertical field of view of the perspective pipelines, in degrees.
const FOV_DEG: f32 = 45.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 10.0;

/// Camera, light and output settings shared by every pipeline.
#[derive(Debug, Clone, Copy)]
pub struct SceneParams {
    pub eye: Vec3f,
    pub center: Vec3f,
    pub up: Vec3f,
    pub light_dir: Vec3f,
    pub width: u32,
    pub height: u32,
    /// Rotation of the model around the z axis, in degrees.
    pub model_angle: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        return SceneParams {
            eye: vec3(1.0, 1.0, 3.0),
            center: vec3(0.0, 0.0, 0.0),
            up: vec3(0.0, 1.0, 0.0),
            light_dir: vec3(1.0, 1.0, 1.0),
            width: 800,
            height: 800,
            model_angle: 0.0,
        };
    }
}

impl SceneParams {
    /// The camera-side transform chain every pipeline starts from.
    fn camera_context(&self) -> TransformContext {
        let mut ctx = TransformContext::new();
        ctx.model = rotation_xy(self.model_angle);
        ctx.view = look_at(self.eye, self.center, self.up);
        ctx.viewport = viewport(
            self.width as i32 / 8,
            self.height as i32 / 8,
            self.width as i32 * 3 / 4,
            self.height as i32 * 3 / 4,
        );
        return ctx;
    }
}

/// Renders `model` with the named pipeline. Available pipelines are `flat`,
/// `diffuse`, `normal_map` and `shadow`.
pub fn render(model: &Model, pipeline: &str, params: &SceneParams) -> Result<Framebuffer, RenderError> {
    let mut frame = Framebuffer::new(params.width, params.height);
    let mut depth = DepthBuffer::new(params.width, params.height);
    let mut ctx = params.camera_context();
    match pipeline {
        "flat" => {
            // The fov projection assumes the camera sits at the origin, so
            // the view is a plain translation rather than the look-at form.
            ctx.view = translate_view(params.eye);
            ctx.projection = perspective(
                FOV_DEG,
                params.width as f32 / params.height as f32,
                NEAR,
                FAR,
            );
            let mut shader = FlatShader::new(model, &ctx, params.light_dir);
            draw_model(model, &mut shader, &mut frame, &mut depth);
        }
        "diffuse" => {
            ctx.projection =
                projection_from_coeff(-1.0 / (params.eye - params.center).norm());
            let mut shader = DiffuseShader::new(model, &ctx, params.light_dir);
            draw_model(model, &mut shader, &mut frame, &mut depth);
        }
        "normal_map" => {
            ctx.projection =
                projection_from_coeff(-1.0 / (params.eye - params.center).norm());
            let mut shader = NormalMapShader::new(model, &ctx, params.light_dir)?;
            draw_model(model, &mut shader, &mut frame, &mut depth);
        }
        "shadow" => {
            ctx.projection =
                projection_from_coeff(-1.0 / (params.eye - params.center).norm());
            render_shadowed(model, params, &ctx, &mut frame, &mut depth)?;
        }
        other => {
            return Err(RenderError::UnknownPipeline(other.to_string()));
        }
    }
    return Ok(frame);
}

/// Runs every face of the model through the shader and rasterizer.
fn draw_model<S: Shader>(
    model: &Model,
    shader: &mut S,
    frame: &mut Framebuffer,
    depth: &mut DepthBuffer,
) {
    for face in 0..model.nfaces() {
        let mut pts = [Vec3f::zeros(); 3];
        for nth in 0..3 {
            pts[nth] = shader.vertex(face, nth);
        }
        triangle(&pts, &*shader, frame, depth);
    }
}

/// The two-pass shadow pipeline. Pass one renders the scene from the light
/// to fill a light-space depth buffer; pass two renders from the camera and
/// consults that buffer through the camera-to-light screen-space matrix.
fn render_shadowed(
    model: &Model,
    params: &SceneParams,
    camera_ctx: &TransformContext,
    frame: &mut Framebuffer,
    depth: &mut DepthBuffer,
) -> Result<(), RenderError> {
    let mut light_ctx = TransformContext::new();
    light_ctx.model = camera_ctx.model;
    light_ctx.view = look_at(params.light_dir.normalized(), params.center, params.up);
    // The light pass is orthographic, coeff zero leaves w untouched.
    light_ctx.projection = projection_from_coeff(0.0);
    light_ctx.viewport = camera_ctx.viewport;

    let mut shadow_frame = Framebuffer::new(params.width, params.height);
    let mut shadow_buffer = DepthBuffer::new(params.width, params.height);
    let mut depth_shader = DepthShader::new(model, light_ctx.matrix());
    draw_model(model, &mut depth_shader, &mut shadow_frame, &mut shadow_buffer);
    debug!("light-space depth pass complete");

    let camera_matrix = camera_ctx.matrix();
    let camera_inverse = camera_matrix
        .try_inverse()
        .ok_or(RenderError::DegenerateTransform)?;
    let mshadow = light_ctx.matrix() * camera_inverse;

    let mut shader = ShadowedShader::new(
        model,
        camera_ctx,
        mshadow,
        params.light_dir,
        &shadow_buffer,
    )?;
    draw_model(model, &mut shader, frame, depth);
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::quad_model;
    use image::Rgb;

    fn lit_pixels(frame: &Framebuffer) -> usize {
        let mut count = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.get_pixel(x, y) != Rgb([0, 0, 0]) {
                    count += 1;
                }
            }
        }
        return count;
    }

    fn head_on_params() -> SceneParams {
        let mut params = SceneParams::default();
        params.eye = vec3(0.0, 0.0, 3.0);
        params.light_dir = vec3(0.0, 0.0, 1.0);
        params.width = 64;
        params.height = 64;
        return params;
    }

    #[test]
    fn flat_pipeline_covers_part_of_the_frame() {
        let model = quad_model();
        let frame = render(&model, "flat", &head_on_params()).unwrap();
        let lit = lit_pixels(&frame);
        assert!(lit > 0);
        assert!(lit < (64 * 64) as usize);
    }

    #[test]
    fn diffuse_pipeline_covers_part_of_the_frame() {
        let model = quad_model();
        let frame = render(&model, "diffuse", &head_on_params()).unwrap();
        assert!(lit_pixels(&frame) > 0);
    }

    #[test]
    fn normal_map_pipeline_covers_part_of_the_frame() {
        let model = quad_model();
        let frame = render(&model, "normal_map", &head_on_params()).unwrap();
        assert!(lit_pixels(&frame) > 0);
    }

    #[test]
    fn shadow_pipeline_covers_part_of_the_frame() {
        let model = quad_model();
        let frame = render(&model, "shadow", &head_on_params()).unwrap();
        assert!(lit_pixels(&frame) > 0);
    }

    #[test]
    fn unknown_pipeline_is_an_error() {
        let model = quad_model();
        let err = render(&model, "wireframe", &SceneParams::default()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownPipeline(name) if name == "wireframe"));
    }

    #[test]
    fn corners_stay_background() {
        // The viewport leaves a margin around the model, so the frame
        // corners are never touched.
        let model = quad_model();
        let frame = render(&model, "diffuse", &head_on_params()).unwrap();
        assert_eq!(frame.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(frame.get_pixel(63, 63), Rgb([0, 0, 0]));
    }
}

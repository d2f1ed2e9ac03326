use std::time;

use log::info;

use crate::error::RenderError;
use crate::model::Model;
use crate::scene::{render, SceneParams};

/// Execution context assembled from the command line.
pub struct Params {
    pub width: u32,
    pub height: u32,
    /// Asset path prefix, e.g. `obj/african_head` picks up
    /// `obj/african_head.obj` and its texture maps.
    pub asset_path: String,
    pub pipeline: String,
    pub output_path: String,
    pub model_angle: f32,
}

/// Loads the model, renders it with the selected pipeline and writes the
/// output image.
pub fn run(params: Params) -> Result<(), RenderError> {
    let model = Model::load(&params.asset_path)?;
    info!(
        "loaded `{}`: {} vertices, {} faces",
        params.asset_path,
        model.nverts(),
        model.nfaces()
    );

    let scene_params = SceneParams {
        width: params.width,
        height: params.height,
        model_angle: params.model_angle,
        ..Default::default()
    };

    let time_begin = time::Instant::now();
    let frame = render(&model, &params.pipeline, &scene_params)?;
    info!(
        "pipeline `{}` rendered in {:.3}s",
        params.pipeline,
        time_begin.elapsed().as_secs_f32()
    );

    frame.save(&params.output_path)?;
    info!("wrote {}", params.output_path);
    return Ok(());
}

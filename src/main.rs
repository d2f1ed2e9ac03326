mod app;
mod error;
mod framebuffer;
mod geometry;
mod model;
mod rasterizer;
mod scene;
mod shader;
mod transform;

use std::env;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 800;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Default values.
    let mut asset_path = String::from("obj/african_head");
    let mut pipeline = String::from("diffuse");
    let mut output_path = String::from("output.tga");
    let mut model_angle: f32 = 0.0;

    let args: Vec<String> = env::args().collect();
    for i in 1..args.len() {
        match args[i].as_str() {
            "-p" => { asset_path = args[i + 1].clone(); }
            "-s" => { pipeline = args[i + 1].clone(); }
            "-o" => { output_path = args[i + 1].clone(); }
            "-a" => { model_angle = args[i + 1].parse()?; }
            _ => ()
        }
    }

    let params = app::Params {
        width: WIDTH,
        height: HEIGHT,
        asset_path,
        pipeline,
        output_path,
        model_angle,
    };

    app::run(params)?;

    return Ok(());
}

use thiserror::Error;

/// Everything that can go wrong while setting up or running the pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read `{path}`: {source}")]
    AssetIo {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse obj model: {0}")]
    ObjParse(#[from] obj::ObjError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unknown shader pipeline `{0}`")]
    UnknownPipeline(String),
    #[error("transform matrix is singular and cannot be inverted")]
    DegenerateTransform,
}

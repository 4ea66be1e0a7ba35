pub mod batch;
pub mod camera;
pub mod canvas;
pub mod gpu_context;
pub mod quad_pipeline;
pub mod vertex;

pub use batch::QuadBatch;
pub use camera::{CameraUniform, ScrollCamera};
pub use canvas::{DrawCommand, DrawList, RenderTarget};
pub use gpu_context::GpuContext;
pub use quad_pipeline::QuadPipeline;
pub use vertex::ColorVertex;

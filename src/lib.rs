pub mod bitmap;
pub mod error;
pub mod gate;
pub mod model;
pub mod validator;
pub mod vision;

/// 파이프라인 설정
pub mod config;

pub use bitmap::Bitmap;
pub use error::{VisionError, VisionResult};
pub use gate::{AnalysisGate, AnalysisGuard};
pub use vision::{ChartExtractor, ExtractionResult};

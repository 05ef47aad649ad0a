pub mod bbox;
pub mod confidence;
pub mod config;
pub mod errors;
pub mod layer;
pub mod layout;
pub mod pipeline;
pub mod tensor;
pub mod thresholds;

// Re-export commonly used types for convenience
pub use bbox::{NetworkGeometry, PixelBox};
pub use confidence::{ClassScore, best_class};
pub use config::DecoderConfig;
pub use errors::{LayoutError, TensorError};
pub use pipeline::{Detection, DetectionDecoder, decode};
pub use tensor::{DataType, TensorBuffer, TensorDescriptor, TensorView};
pub use thresholds::ThresholdTable;

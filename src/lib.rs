pub mod classifier;
pub mod config;
pub mod error;
pub mod handler;
pub mod labels;
pub mod linear;
pub mod registry;
pub mod server;
pub mod table;
pub mod types;
pub mod upload;

pub use classifier::Classifier;
pub use error::{ApiError, ClassifyError, FileParseError, LoadError, PredictionError};
pub use handler::{ClassificationRequestHandler, ColumnAmbiguityWarning, PredictionResult};
pub use labels::{Label, LabelMap};
pub use registry::{ClassifierKind, Registry};
pub use server::{AppState, build_router};
pub use table::Table;

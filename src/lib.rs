pub mod config;
pub mod error;
pub mod features;
pub mod form;
pub mod page;
pub mod predict;
pub mod server;
pub mod telemetry;

pub use error::{FormError, PredictError};
pub use features::{Field, OceanProximity};
pub use form::{FeatureRecord, FormEvent, FormPolicy, FormStateController, PredictionResult};
pub use predict::PredictionClient;

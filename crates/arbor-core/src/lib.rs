pub mod edit;
pub mod error;
pub mod id;
pub mod model;
pub mod sample;

pub use edit::Walk;
pub use error::EditError;
pub use id::NodeId;
pub use model::*;
pub use sample::sample_forest;

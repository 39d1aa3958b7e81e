pub mod error;
pub mod optimizer;
pub mod shrink;

pub use error::OptimizeError;
pub use optimizer::Optimizer;
pub use shrink::ShrinkClient;

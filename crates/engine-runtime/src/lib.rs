pub mod driver;
pub mod error;
pub mod optimize;
pub mod paths;
pub mod reconcile;
pub mod worklist;

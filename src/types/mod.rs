pub mod batch;
pub mod errors;
pub mod health;
pub mod ids;
pub mod report;
pub mod resource;
pub mod violation;

pub use batch::*;
pub use errors::*;
pub use health::*;
pub use ids::*;
pub use report::*;
pub use resource::*;
pub use violation::*;

pub mod error;
pub mod input;
pub mod schema;
pub mod state;
pub mod utils;

pub use error::PlannerError;
pub use input::{InputKind, RequestInput};

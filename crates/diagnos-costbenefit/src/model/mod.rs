//! Search graph and bookkeeping: nodes, paths, targets and the model.

mod node;
mod path;
mod search_model;
mod target;

pub use node::Node;
pub use path::Path;
pub use search_model::{SearchModel, TargetId};
pub use target::Target;

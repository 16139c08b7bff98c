//! Application layer: collaborators that drive the tree engine
//!
//! Presentation state lives here, outside the engine, keyed by node id.

pub mod error;
pub mod render;
pub mod script;
pub mod session;
pub mod view;

pub use error::{ApplicationError, ApplicationResult};
pub use render::TreeRender;
pub use script::{Command, Outcome};
pub use session::Session;
pub use view::{Mode, NodeState, ViewNode, ViewState};

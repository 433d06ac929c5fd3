pub mod offer;
pub mod partner;
pub mod registry;
pub mod state;
pub mod verification;
pub mod view;

pub use offer::*;
pub use partner::*;
pub use registry::*;
pub use state::*;
pub use verification::*;
pub use view::*;

//! Generation - initial level layout and procedural platforms

mod level;
mod platforms;

pub use level::*;
pub use platforms::*;

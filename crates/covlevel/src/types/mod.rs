mod context;
mod level;
mod variable;

pub use context::LocaleCoverageContext;
pub use level::{CoverageLevel, UnknownLevel};
pub use variable::VariableKind;

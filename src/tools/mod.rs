//! Tool infrastructure: catalog, option records, structural validation.

pub mod catalog;
pub mod options;
pub mod validation;

pub use catalog::{
    ParamDef, ParamType, ToolCategory, ToolDescriptor, ToolKind, ToolRegistry, ToolSummary,
};
pub use options::ToolOptions;
pub use validation::{InputRule, InputValidator, ValidationOutcome};

//! Expression language support.

pub mod functions;

pub use functions::{BuiltinFunctions, FunctionDef, FunctionTable};

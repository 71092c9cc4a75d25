#![allow(missing_docs)]

pub mod split;

pub use splitter_core::transform::{FunctionTransform, OutputBuffer, Transform};

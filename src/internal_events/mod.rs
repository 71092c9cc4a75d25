#![allow(missing_docs)]

mod codecs;
mod process;
mod split;
mod template;

pub use self::{codecs::*, process::*, split::*, template::*};

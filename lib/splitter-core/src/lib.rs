//! The splitter core library
//!
//! Holds the event data model shared by every transform and the traits a
//! transform implements to plug into a pipeline.

#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(unused_allocation)]
#![deny(unused_extern_crates)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![allow(clippy::module_name_repetitions)]

pub mod event;
pub mod internal_event;
pub mod transform;

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::internal_event::emit($event)
    };
}

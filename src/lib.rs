#![deny(unreachable_pub)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![allow(clippy::match_wild_err_arm)]
#![allow(clippy::type_complexity)]
#![deny(clippy::clone_on_ref_ptr)]
#![deny(clippy::trivially_copy_pass_by_ref)]

//! Splits one event into many along a delimited string or an array field.
#[macro_use]
extern crate tracing;
#[macro_use]
extern crate splitter_core;

pub mod app;
pub mod cli;

#[allow(unreachable_pub)]
pub mod config;
pub mod internal_events;
pub mod template;
#[cfg(test)]
pub mod test_util;
pub mod trace;
#[allow(unreachable_pub)]
pub mod transforms;

pub use splitter_core::{event, Error, Result};

pub fn splitter_version() -> impl std::fmt::Display {
    env!("CARGO_PKG_VERSION")
}

/// Returns a string containing full version information of the current build.
pub fn get_version() -> String {
    let pkg_version = splitter_version();
    let build = if cfg!(debug_assertions) { " debug" } else { "" };

    format!("{pkg_version}{build}")
}

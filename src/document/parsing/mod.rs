//! Document parsing utilities
//!
//! This module contains specialized parsing functions for the elements the
//! structure walk maps: runs, headings, lists and tables.

pub(crate) mod formatting;
pub(crate) mod heading;
pub(crate) mod list;
pub(crate) mod runs;
pub(crate) mod table;

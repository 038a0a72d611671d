//! Survey input schema
//!
//! This module defines the raw, untyped shape of one survey response and the
//! mapping from survey question headers to the fields the pipeline consumes.
//! Reading the delimited file itself is handled by [`SurveyReader`].

mod columns;
mod reader;

pub use columns::*;
pub use reader::*;

//! Library pieces of the `adr-assess` command line tool.

pub mod logging;
pub mod output;

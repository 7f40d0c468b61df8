//! Library side of the `dtt` command line tool.

pub mod commands;
pub mod logging;

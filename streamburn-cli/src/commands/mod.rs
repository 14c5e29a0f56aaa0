//! Command implementations.
//!
//! Each subcommand is implemented in its own module for clean separation.

pub(crate) mod flash;
pub(crate) mod ports;

pub(crate) use flash::cmd_flash;
pub(crate) use ports::cmd_list_ports;

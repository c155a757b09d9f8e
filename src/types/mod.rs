//! Core type definitions: validated ports, port lists and target expansion.
//!
//! Parsing happens here, before any probe runs, so malformed input fails the
//! whole invocation instead of producing a partial scan.

mod port;
mod target;

pub use port::{parse_ports, Port, PortError, PortRange, PortSpec};
pub use target::{
    expand_cidr, expand_linear_range, parse_url_list, resolve_host, validate_range_prefix,
    RangeError, MAX_CIDR_HOSTS, RANGE_SEPARATOR,
};

//! Target expansion: CIDR blocks, linear host ranges, URL lists and
//! hostname resolution.
//!
//! Expansion is pure and happens before any probing starts, so a malformed
//! range aborts the invocation up front instead of producing a partial scan.

use crate::error::{ScanError, ScanResult};
use ipnetwork::IpNetwork;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Largest block [`expand_cidr`] or [`expand_linear_range`] will
/// materialize (a /16 for IPv4).
pub const MAX_CIDR_HOSTS: u128 = 65536;

/// Separator a linear range prefix must end with, e.g. `192.168.1.`.
pub const RANGE_SEPARATOR: char = '.';

/// Error type for range expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid CIDR notation: '{0}'")]
    InvalidCidr(String),
    #[error("CIDR block too large: {0} addresses (max: {max})", max = MAX_CIDR_HOSTS)]
    CidrTooLarge(u128),
    #[error("range too large: {0} hosts (max: {max})", max = MAX_CIDR_HOSTS)]
    RangeTooLarge(u128),
    #[error("start ({start}) is greater than end ({end})")]
    Inverted { start: u32, end: u32 },
    #[error("base network '{0}' must end with '{sep}', e.g. 192.168.1.", sep = RANGE_SEPARATOR)]
    MissingSeparator(String),
}

/// Number of addresses covered by a block with `host_bits` free bits.
fn block_size(host_bits: u32) -> u128 {
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

/// Expand a CIDR block into every usable host address, ascending.
///
/// Host bits in the literal are ignored (`192.168.1.5/24` is the
/// `192.168.1.0/24` block). Network and broadcast addresses are excluded for
/// IPv4 prefixes shorter than /31; for IPv6 prefixes shorter than /127 the
/// subnet-router anycast (network) address is excluded.
pub fn expand_cidr(cidr: &str) -> Result<Vec<IpAddr>, RangeError> {
    let cidr = cidr.trim();
    let network: IpNetwork = cidr
        .parse()
        .map_err(|_| RangeError::InvalidCidr(cidr.to_string()))?;

    match network {
        IpNetwork::V4(net) => {
            let size = block_size(32 - u32::from(net.prefix()));
            if size > MAX_CIDR_HOSTS {
                return Err(RangeError::CidrTooLarge(size));
            }

            let first = u32::from(net.network());
            let last = first | !u32::from(net.mask());
            let (first, last) = if net.prefix() < 31 {
                (first + 1, last - 1)
            } else {
                (first, last)
            };

            Ok((first..=last)
                .map(|n| IpAddr::V4(Ipv4Addr::from(n)))
                .collect())
        }
        IpNetwork::V6(net) => {
            let size = block_size(128 - u32::from(net.prefix()));
            if size > MAX_CIDR_HOSTS {
                return Err(RangeError::CidrTooLarge(size));
            }

            let first = u128::from(net.network());
            let last = first | !u128::from(net.mask());
            let first = if net.prefix() < 127 { first + 1 } else { first };

            Ok((first..=last)
                .map(|n| IpAddr::V6(Ipv6Addr::from(n)))
                .collect())
        }
    }
}

/// Expand `prefix + i` for every `i` in `start..=end`, ascending.
///
/// An inverted range is rejected rather than swapped: `--start 50 --end 1`
/// is far more likely a typo than a request.
pub fn expand_linear_range(prefix: &str, start: u32, end: u32) -> Result<Vec<String>, RangeError> {
    if start > end {
        return Err(RangeError::Inverted { start, end });
    }
    let count = u128::from(end - start) + 1;
    if count > MAX_CIDR_HOSTS {
        return Err(RangeError::RangeTooLarge(count));
    }
    Ok((start..=end).map(|i| format!("{prefix}{i}")).collect())
}

/// Check the linear range prefix policy (must end with [`RANGE_SEPARATOR`]).
pub fn validate_range_prefix(prefix: &str) -> Result<(), RangeError> {
    if prefix.ends_with(RANGE_SEPARATOR) {
        Ok(())
    } else {
        Err(RangeError::MissingSeparator(prefix.to_string()))
    }
}

/// Split a comma-separated URL list, dropping blank entries.
pub fn parse_url_list(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a host to a single IP address, preferring IPv4.
///
/// Literal addresses are returned as-is. Names go through one lookup with
/// the system resolver configuration (hosts file included).
pub async fn resolve_host(host: &str) -> ScanResult<IpAddr> {
    let host = host.trim();
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    if host.is_empty() {
        return Err(ScanError::ResolutionFailed {
            host: String::new(),
            reason: "empty hostname".to_string(),
        });
    }

    let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        tracing::debug!("system resolver configuration unavailable ({e}), using defaults");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    });

    let response = resolver
        .lookup_ip(host)
        .await
        .map_err(|e| ScanError::ResolutionFailed {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

    let ips: Vec<IpAddr> = response.iter().collect();
    ips.iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| ips.first())
        .copied()
        .ok_or_else(|| ScanError::ResolutionFailed {
            host: host.to_string(),
            reason: "no addresses found".to_string(),
        })
}

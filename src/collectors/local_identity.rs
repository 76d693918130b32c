//! Local machine identity
//!
//! Reads the hostname, resolves it to the primary IPv4 address and builds a
//! platform descriptor. Unlike the network probes, failures here are fatal and
//! propagate to the caller.

use log::debug;
use std::net::{IpAddr, ToSocketAddrs};
use sysinfo::System;

use crate::collectors::errors::{ProbeError, ProbeResult};
use crate::models::LocalInfo;

/// Reads hostname, local IP and platform string for this machine
pub fn read_local_info() -> ProbeResult<LocalInfo> {
    let hostname = System::host_name().ok_or(ProbeError::HostnameUnavailable)?;
    let local_ip = resolve_ipv4(&hostname)?;
    let platform = platform_descriptor();

    debug!(
        "Local identity: hostname={}, local_ip={}, platform={}",
        hostname, local_ip, platform
    );

    Ok(LocalInfo {
        hostname,
        local_ip: local_ip.to_string(),
        platform,
    })
}

/// Resolves a host name to its first IPv4 address
///
/// Literal IPv4 addresses are returned as-is without a lookup.
pub fn resolve_ipv4(host: &str) -> ProbeResult<IpAddr> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        if addr.is_ipv4() {
            return Ok(addr);
        }
    }

    let addrs = (host, 0)
        .to_socket_addrs()
        .map_err(|source| ProbeError::Resolution {
            host: host.to_string(),
            source,
        })?;

    addrs
        .map(|addr| addr.ip())
        .find(IpAddr::is_ipv4)
        .ok_or_else(|| ProbeError::NoIpv4Address {
            host: host.to_string(),
        })
}

/// Builds a descriptor of the form `<system>-<kernel version>-<arch>`
pub fn platform_descriptor() -> String {
    let kernel = System::kernel_version().unwrap_or_else(|| "unknown".to_string());
    format_platform(system_name(), &kernel, std::env::consts::ARCH)
}

/// Kernel family name (`Linux`, `Darwin`, `Windows`), not the distribution name
pub fn system_name() -> &'static str {
    match std::env::consts::OS {
        "linux" | "android" => "Linux",
        "macos" | "ios" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "netbsd" => "NetBSD",
        "openbsd" => "OpenBSD",
        other => other,
    }
}

fn format_platform(system: &str, kernel: &str, arch: &str) -> String {
    let kernel = kernel.trim().replace([' ', '/'], "_");
    format!("{}-{}-{}", system, kernel, arch)
}

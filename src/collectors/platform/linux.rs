use log::debug;

pub const REQUIRED_PRIVILEGES: &str = "root or CAP_NET_RAW";

const CAP_NET_RAW: u32 = 13;

pub fn has_raw_socket_privileges() -> bool {
    if nix::unistd::geteuid().is_root() {
        return true;
    }

    let has_cap = std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| effective_capabilities(&status))
        .is_some_and(|caps| caps & (1u64 << CAP_NET_RAW) != 0);
    debug!("Not running as root; CAP_NET_RAW effective: {}", has_cap);
    has_cap
}

/// Extracts the `CapEff` bitmask from the contents of `/proc/<pid>/status`
fn effective_capabilities(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("CapEff:"))
        .and_then(|mask| u64::from_str_radix(mask.trim(), 16).ok())
}

// Platform-specific privilege checks
// Raw ICMP sockets need elevated privileges on most systems. The checks here
// only produce hints for the log; the probe is attempted either way.

/// Linux privilege check
/// Raw sockets require root or the CAP_NET_RAW capability
#[cfg(target_os = "linux")]
pub mod linux;

/// macOS privilege check
/// Raw sockets require an effective uid of root
#[cfg(target_os = "macos")]
pub mod macos;

/// Whether the current process is likely allowed to open raw ICMP sockets
///
/// Returns `None` when the platform offers no cheap way to tell.
pub fn has_raw_socket_privileges() -> Option<bool> {
    #[cfg(target_os = "linux")]
    {
        Some(linux::has_raw_socket_privileges())
    }

    #[cfg(target_os = "macos")]
    {
        Some(macos::has_raw_socket_privileges())
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// Hint shown in the log when raw-socket privileges are missing
pub fn required_privileges() -> &'static str {
    #[cfg(target_os = "linux")]
    {
        linux::REQUIRED_PRIVILEGES
    }

    #[cfg(target_os = "macos")]
    {
        macos::REQUIRED_PRIVILEGES
    }

    #[cfg(target_os = "windows")]
    {
        "Administrator"
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        "raw socket access"
    }
}

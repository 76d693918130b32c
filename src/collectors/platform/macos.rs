pub const REQUIRED_PRIVILEGES: &str = "root (sudo)";

pub fn has_raw_socket_privileges() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

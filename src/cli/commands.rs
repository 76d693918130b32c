use clap::Parser;

/// Main CLI structure for the network-hub application
/// The report takes no options; clap still provides --help and --version
#[derive(Parser, Debug)]
#[command(author = "Kaipo Chen")]
#[command(version)] // Automatically uses version from Cargo.toml
#[command(about = "Network Information Hub - one-shot report of local identity, public IP, latency, throughput and data usage")]
#[command(long_about = "Prints a single network report: hostname, local IP and platform; public IP, ISP \
and location; ICMP latency to 8.8.8.8; download/upload throughput from a speed-test server; and \
cumulative bytes sent/received across all interfaces. Probes that fail print a warning line instead \
of data. The speed test usually takes around 30 seconds.\n\n\
Raw ICMP sockets need elevated privileges (root or CAP_NET_RAW on Linux); without them the ping \
section reports a failure.\n\n\
Set RUST_LOG=debug to see why a probe failed.")]
pub struct Cli {}

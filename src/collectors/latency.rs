//! ICMP round-trip latency probe
//!
//! Sends a single echo request and waits for the matching echo reply. A raw
//! IPv4 socket is tried first; when the OS refuses it for lack of privileges
//! the echo is retried over an unprivileged ICMP datagram socket (Linux with a
//! permissive `net.ipv4.ping_group_range`, macOS). If both fail the
//! result is `Unavailable` like any other failure.

use log::{debug, info, warn};
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::TransportChannelType::Layer4;
use pnet::transport::TransportProtocol::Ipv4;
use pnet::transport::{icmp_packet_iter, transport_channel};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{Duration, Instant};

use crate::collectors::errors::{ProbeError, ProbeResult};
use crate::collectors::local_identity::resolve_ipv4;
use crate::collectors::platform;
use crate::models::{LatencyResult, ProbeOutcome};
use crate::report::formatting::seconds_to_millis;

/// ICMP header (8 bytes) plus a short payload
const ECHO_REQUEST_LEN: usize = 16;
const ECHO_PAYLOAD: &[u8; 8] = b"nhubping";
const CHANNEL_BUFFER_SIZE: usize = 1024;
const ECHO_SEQUENCE: u16 = 1;
const RECEIVE_BUFFER_LEN: usize = 1500;

/// Measures the round trip to `target`, returning the error cause
pub async fn try_check_latency(target: &str, timeout: Duration) -> ProbeResult<LatencyResult> {
    let target = target.to_string();
    let elapsed = tokio::task::spawn_blocking(move || ping_once(&target, timeout)).await??;

    let milliseconds = seconds_to_millis(elapsed.as_secs_f64());
    info!("ICMP echo round trip: {} ms", milliseconds);
    Ok(LatencyResult { milliseconds })
}

/// Measures the round trip to `target`, collapsing any failure into `Unavailable`
pub async fn check_latency(target: &str, timeout: Duration) -> ProbeOutcome<LatencyResult> {
    ProbeOutcome::from_result("latency", try_check_latency(target, timeout).await)
}

fn ping_once(target: &str, timeout: Duration) -> ProbeResult<Duration> {
    let address = match resolve_ipv4(target)? {
        IpAddr::V4(address) => address,
        IpAddr::V6(_) => {
            return Err(ProbeError::NoIpv4Address {
                host: target.to_string(),
            });
        }
    };

    let identifier = (std::process::id() & 0xffff) as u16;
    match send_echo_raw(address, timeout, identifier, ECHO_SEQUENCE) {
        Err(ProbeError::IcmpSocket(e)) if is_permission_error(&e) => {
            debug!(
                "Raw ICMP socket refused ({}); retrying with an unprivileged datagram socket",
                e
            );
            let result = send_echo_datagram(address, timeout, identifier, ECHO_SEQUENCE);
            if result.is_err() && platform::has_raw_socket_privileges() == Some(false) {
                warn!(
                    "ICMP probing requires {} or unprivileged ICMP sockets",
                    platform::required_privileges()
                );
            }
            result
        }
        other => other,
    }
}

/// Whether a socket error means the raw socket was refused for lack of privileges
fn is_permission_error(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::PermissionDenied
}

/// Builds a checksummed echo request
fn build_echo_request(identifier: u16, sequence: u16) -> ProbeResult<[u8; ECHO_REQUEST_LEN]> {
    let mut buffer = [0u8; ECHO_REQUEST_LEN];
    let mut request =
        MutableEchoRequestPacket::new(&mut buffer[..]).ok_or(ProbeError::IcmpPacket)?;
    request.set_icmp_type(IcmpTypes::EchoRequest);
    request.set_identifier(identifier);
    request.set_sequence_number(sequence);
    request.set_payload(ECHO_PAYLOAD);
    let checksum = icmp::checksum(&IcmpPacket::new(request.packet()).ok_or(ProbeError::IcmpPacket)?);
    request.set_checksum(checksum);
    Ok(buffer)
}

fn timeout_error(target: Ipv4Addr, timeout: Duration) -> ProbeError {
    ProbeError::IcmpTimeout {
        target: target.to_string(),
        timeout,
    }
}

/// Time left before `timeout` elapses, or a timeout error once it has
fn remaining(started: Instant, target: Ipv4Addr, timeout: Duration) -> ProbeResult<Duration> {
    timeout
        .checked_sub(started.elapsed())
        .filter(|remaining| !remaining.is_zero())
        .ok_or_else(|| timeout_error(target, timeout))
}

fn send_echo_raw(
    target: Ipv4Addr,
    timeout: Duration,
    identifier: u16,
    sequence: u16,
) -> ProbeResult<Duration> {
    let (mut tx, mut rx) = transport_channel(
        CHANNEL_BUFFER_SIZE,
        Layer4(Ipv4(IpNextHeaderProtocols::Icmp)),
    )
    .map_err(ProbeError::IcmpSocket)?;

    let buffer = build_echo_request(identifier, sequence)?;
    let request = IcmpPacket::new(&buffer).ok_or(ProbeError::IcmpPacket)?;

    let started = Instant::now();
    tx.send_to(request, IpAddr::V4(target))
        .map_err(ProbeError::IcmpSocket)?;
    debug!(
        "Sent ICMP echo request to {} over raw socket (id={}, seq={})",
        target, identifier, sequence
    );

    let mut replies = icmp_packet_iter(&mut rx);
    loop {
        let remaining = remaining(started, target, timeout)?;

        let Some((packet, source)) = replies
            .next_with_timeout(remaining)
            .map_err(ProbeError::IcmpSocket)?
        else {
            return Err(timeout_error(target, timeout));
        };

        if source == IpAddr::V4(target) && is_matching_reply(&packet, Some(identifier), sequence) {
            return Ok(started.elapsed());
        }
        debug!("Ignoring unrelated ICMP packet from {}", source);
    }
}

fn send_echo_datagram(
    target: Ipv4Addr,
    timeout: Duration,
    identifier: u16,
    sequence: u16,
) -> ProbeResult<Duration> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::ICMPV4))
        .map_err(ProbeError::IcmpSocket)?;
    let socket: UdpSocket = socket.into();

    let buffer = build_echo_request(identifier, sequence)?;
    let destination = SocketAddr::V4(SocketAddrV4::new(target, 0));

    let started = Instant::now();
    socket
        .send_to(&buffer, destination)
        .map_err(ProbeError::IcmpSocket)?;
    debug!(
        "Sent ICMP echo request to {} over datagram socket (seq={})",
        target, sequence
    );

    let mut received = [0u8; RECEIVE_BUFFER_LEN];
    loop {
        let remaining = remaining(started, target, timeout)?;
        socket
            .set_read_timeout(Some(remaining))
            .map_err(ProbeError::IcmpSocket)?;

        let (len, source) = match socket.recv_from(&mut received) {
            Ok(reply) => reply,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(timeout_error(target, timeout));
            }
            Err(e) => return Err(ProbeError::IcmpSocket(e)),
        };

        // Linux rewrites the identifier to the socket's port, so only the
        // sequence number is compared on this path
        let matched = source.ip() == IpAddr::V4(target)
            && IcmpPacket::new(strip_ipv4_header(&received[..len]))
                .is_some_and(|packet| is_matching_reply(&packet, None, sequence));
        if matched {
            return Ok(started.elapsed());
        }
        debug!("Ignoring unrelated ICMP datagram from {}", source);
    }
}

/// Skips the IPv4 header some platforms (macOS) prepend to ICMP datagrams
fn strip_ipv4_header(data: &[u8]) -> &[u8] {
    match data.first() {
        Some(first) if first >> 4 == 4 => {
            let header_len = usize::from(first & 0x0f) * 4;
            data.get(header_len..).unwrap_or(&[])
        }
        _ => data,
    }
}

/// Whether a received ICMP packet is the echo reply to our request
///
/// `identifier` is `None` when the kernel owns it.
fn is_matching_reply(packet: &IcmpPacket, identifier: Option<u16>, sequence: u16) -> bool {
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }
    EchoReplyPacket::new(packet.packet()).is_some_and(|reply| {
        identifier.is_none_or(|id| reply.get_identifier() == id)
            && reply.get_sequence_number() == sequence
    })
}

//! Service manager readiness notification (`sd_notify(READY=1)`).

const READY: &[u8] = b"READY=1";

/// Tells the service manager listening on `$NOTIFY_SOCKET` that the server
/// is ready to accept requests.
///
/// Returns `false` if no service manager asked for a notification.
///
/// # Errors
///
/// Returns error if the socket could not be written to.
pub fn ready() -> std::io::Result<bool> {
    match std::env::var("NOTIFY_SOCKET") {
        Ok(socket) if !socket.is_empty() => ready_at(&socket).map(|()| true),
        _ => Ok(false),
    }
}

/// Sends the readiness notification to `socket`.
///
/// A leading `@` denotes a Linux abstract socket.
///
/// # Errors
///
/// Returns error if the socket could not be written to.
#[cfg(unix)]
pub fn ready_at(socket: &str) -> std::io::Result<()> {
    use std::os::unix::net::UnixDatagram;

    let sock = UnixDatagram::unbound()?;

    if let Some(name) = socket.strip_prefix('@') {
        send_abstract(&sock, name)?;
    } else {
        sock.send_to(READY, socket)?;
    }

    log::debug!("sent readiness notification to {socket}");

    Ok(())
}

/// Sends the readiness notification to `socket`.
///
/// # Errors
///
/// Always returns error, there are no notification sockets on this platform.
#[cfg(not(unix))]
pub fn ready_at(_socket: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "readiness notification requires unix sockets",
    ))
}

#[cfg(target_os = "linux")]
fn send_abstract(sock: &std::os::unix::net::UnixDatagram, name: &str) -> std::io::Result<()> {
    use std::os::linux::net::SocketAddrExt;
    use std::os::unix::net::SocketAddr;

    let addr = SocketAddr::from_abstract_name(name.as_bytes())?;
    sock.send_to_addr(READY, &addr)?;
    Ok(())
}

#[cfg(all(unix, not(target_os = "linux")))]
fn send_abstract(_sock: &std::os::unix::net::UnixDatagram, _name: &str) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "abstract sockets are only available on Linux",
    ))
}

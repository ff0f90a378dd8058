use core::cell::Cell;

use embassy_net::{
    dns::{DnsQueryType, Error as DNSError},
    tcp::{self, ConnectError, TcpSocket},
    IpAddress, Stack,
};
use embassy_time::{with_deadline, Duration, Instant};
use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use open_mqtt_charger::config::BrokerAddress;
use open_mqtt_charger::constants::SOCKET_TIMEOUT_SECS;

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    DNSQueryFailed(DNSError),
    DNSLookupFailed,
    #[allow(dead_code)]
    SocketConnectionError(ConnectError),
}

#[derive(Debug)]
pub enum IoError {
    #[allow(dead_code)]
    Tcp(tcp::Error),
    Idle,
}

impl embedded_io_async::Error for IoError {
    fn kind(&self) -> ErrorKind {
        match self {
            IoError::Tcp(e) => embedded_io_async::Error::kind(e),
            IoError::Idle => ErrorKind::TimedOut,
        }
    }
}

/// Bounds how long the session waits for the start of the next inbound packet.
///
/// The deadline applies to one read only. Once a packet has begun arriving its
/// remaining bytes are read without a deadline, so a packet is never cut in half.
#[derive(Default)]
pub struct IdleDeadline {
    deadline: Cell<Option<Instant>>,
    timed_out: Cell<bool>,
}

impl IdleDeadline {
    pub fn arm(&self, until: Instant) {
        self.deadline.set(Some(until));
        self.timed_out.set(false);
    }

    pub fn disarm(&self) {
        self.deadline.set(None);
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out.get()
    }

    fn take(&self) -> Option<Instant> {
        self.deadline.take()
    }
}

/// Broker socket shared with the session's idle deadline.
pub struct Transport<'a> {
    socket: TcpSocket<'a>,
    idle: &'a IdleDeadline,
}

impl ErrorType for Transport<'_> {
    type Error = IoError;
}

impl Read for Transport<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        match self.idle.take() {
            // nothing is consumed from the socket until the read completes
            Some(deadline) => match with_deadline(deadline, self.socket.read(buf)).await {
                Ok(read) => read.map_err(IoError::Tcp),
                Err(_) => {
                    self.idle.timed_out.set(true);
                    Err(IoError::Idle)
                }
            },
            None => self.socket.read(buf).await.map_err(IoError::Tcp),
        }
    }
}

impl Write for Transport<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        self.socket.write(buf).await.map_err(IoError::Tcp)
    }

    async fn flush(&mut self) -> Result<(), IoError> {
        self.socket.flush().await.map_err(IoError::Tcp)
    }
}

async fn resolve(stack: Stack<'static>, address: BrokerAddress) -> Result<IpAddress, Error> {
    match address {
        BrokerAddress::Ip(ip) => Ok(IpAddress::Ipv4(ip)),
        BrokerAddress::Hostname(hostname) => stack
            .dns_query(hostname, DnsQueryType::A)
            .await
            .map_err(Error::DNSQueryFailed)?
            .first()
            .copied()
            .ok_or(Error::DNSLookupFailed),
    }
}

/// Plain TCP session to the broker.
pub async fn open<'a>(
    stack: Stack<'static>,
    rx_buffer: &'a mut [u8],
    tx_buffer: &'a mut [u8],
    idle: &'a IdleDeadline,
    address: BrokerAddress,
    port: u16,
) -> Result<Transport<'a>, Error> {
    let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)));

    let addr = resolve(stack, address).await?;

    log::info!("Connecting TCP socket to {}:{}", addr, port);
    socket
        .connect((addr, port))
        .await
        .map_err(Error::SocketConnectionError)?;
    log::info!("TCP connected");

    Ok(Transport { socket, idle })
}

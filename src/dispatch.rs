use std::io;
use std::net::UdpSocket;

/// The bytes handed to the transport in one send call: a single record, or
/// several records coalesced into one datagram the way a firewall flushes its
/// internal log buffer in a single network write.
#[derive(Debug)]
pub enum DispatchBatch<'a> {
    Single(&'a str),
    Coalesced(&'a [String]),
}

impl DispatchBatch<'_> {
    /// Materialize the payload. Records are joined by `\n` in input order and
    /// the payload always ends with a trailing `\n`, so the receiver can split
    /// a coalesced datagram back into the original records.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            DispatchBatch::Single(record) => format!("{record}\n").into_bytes(),
            DispatchBatch::Coalesced(records) => {
                let mut payload = records.join("\n");
                payload.push('\n');
                payload.into_bytes()
            }
        }
    }
}

/// Fire-and-forget UDP sender. One socket per scenario run, released when the
/// dispatcher is dropped. "Success" only means the local transport layer
/// accepted the datagram: no acknowledgment is ever received, and a datagram
/// lost in transit is indistinguishable from one dropped by the peer.
#[derive(Debug)]
pub struct Dispatcher {
    socket: UdpSocket,
    target: String,
}

impl Dispatcher {
    pub fn new(target: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Dispatcher {
            socket,
            target: target.to_string(),
        })
    }

    /// Transmit one record as one datagram. One-shot: repetition is the
    /// caller's responsibility.
    pub fn send_one(&self, record: &str) -> io::Result<usize> {
        self.send(&DispatchBatch::Single(record))
    }

    /// Transmit all records as a single datagram. Failure is all-or-nothing
    /// for the batch.
    pub fn send_coalesced(&self, records: &[String]) -> io::Result<usize> {
        self.send(&DispatchBatch::Coalesced(records))
    }

    fn send(&self, batch: &DispatchBatch) -> io::Result<usize> {
        self.socket.send_to(&batch.payload(), self.target.as_str())
    }
}

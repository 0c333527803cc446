use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while demultiplexing a transport stream or decoding ARIB text.
#[derive(Debug)]
pub enum Error {
    /// A packet was not exactly 188 bytes.
    BadPacketSize(usize),
    /// The packet source yielded fewer than 188 bytes before EOF and did not complete.
    ShortPacket(usize),
    /// Encountered when a [`crate::SliceReader`] reads out of bounds.
    /// The [`usize`] parameter is the number of bytes the read needed.
    PacketOverrun(usize),
    /// A PID's reassembly buffer exceeded [`crate::demux::Config::max_section_buffer`].
    SectionTooLong(u16),
    /// A PSI section's common header did not span the expected 3 bytes.
    BadCommonHeader,
    /// A PSI section's declared length overruns the reassembled buffer.
    TruncatedSection,
    /// An EIT modified-julian-date/BCD field decoded to an impossible calendar date or time.
    BadTime,
    /// An underlying `std::io::Read` failed while `Demux::run` was draining a packet source.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadPacketSize(size) => {
                write!(f, "expected a 188-byte transport stream packet, got {}", size)
            }
            Error::ShortPacket(size) => {
                write!(f, "packet source ended after {} bytes, short of a full 188-byte packet", size)
            }
            Error::PacketOverrun(needed) => write!(
                f,
                "attempted to read {} bytes past the end of the buffer",
                needed
            ),
            Error::SectionTooLong(pid) => {
                write!(f, "reassembly buffer for PID {:#06x} exceeded the configured cap", pid)
            }
            Error::BadCommonHeader => write!(f, "PSI common header did not span 3 bytes"),
            Error::TruncatedSection => {
                write!(f, "PSI section's declared length overruns the reassembled buffer")
            }
            Error::BadTime => write!(f, "invalid modified-julian-date/BCD time field"),
            Error::Io(e) => write!(f, "i/o error reading packet source: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

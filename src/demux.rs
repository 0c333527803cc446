//! Packet reassembly and PID dispatch.

use crate::dispatch::{DispatchTable, Section, SectionParserObject};
use crate::error::{Error, Result};
use crate::packet::decode_packet;
use log::warn;
use std::collections::HashMap;
use std::io::Read;

/// Tunable knobs for the demultiplexer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-PID reassembly buffer cap. A PID whose in-progress buffer would grow past
    /// this surfaces [`Error::SectionTooLong`] and its buffer is dropped. Default of
    /// 64 KiB is sufficient for any legal section plus slack.
    pub max_section_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_section_buffer: 64 * 1024,
        }
    }
}

/// Owns the PID-keyed reassembly state and dispatch table for one transport stream.
///
/// Single-threaded and synchronous: packet decoding, reassembly, and section parsing
/// form a straight-line pipeline. `Demux` is the only mutator of its reassembly buffers
/// and dispatch table.
pub struct Demux {
    config: Config,
    dispatch: DispatchTable,
    buffers: HashMap<u16, Vec<u8>>,
}

impl Default for Demux {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Demux {
    /// Create a demultiplexer with the given configuration and a freshly-seeded dispatch table.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dispatch: DispatchTable::default(),
            buffers: HashMap::new(),
        }
    }

    /// Feed one 188-byte packet. Returns the section completed by this packet, if any.
    ///
    /// On a payload-unit-start packet, any existing buffer for the PID is dispatched
    /// (if the PID is registered) and then replaced by this packet's payload; otherwise
    /// the payload is appended to an existing buffer, or the packet is dropped silently
    /// if no buffer exists yet.
    pub fn feed_packet(&mut self, packet: &[u8; 188]) -> Result<Option<Section>> {
        let parsed = decode_packet(packet)?;
        let pid = parsed.header.pid();
        let payload = match parsed.payload {
            Some(p) => p,
            None => return Ok(None),
        };

        if parsed.header.pusi() {
            let completed = match self.buffers.remove(&pid) {
                Some(buffer) => self.dispatch_section(pid, &buffer)?,
                None => None,
            };
            self.buffers.insert(pid, payload.to_vec());
            self.enforce_cap(pid)?;
            Ok(completed)
        } else if let Some(buffer) = self.buffers.get_mut(&pid) {
            buffer.extend_from_slice(payload);
            self.enforce_cap(pid)?;
            Ok(None)
        } else {
            warn!("Discarding continuation packet on PID with no pending buffer: {:x}", pid);
            Ok(None)
        }
    }

    fn enforce_cap(&mut self, pid: u16) -> Result<()> {
        let over_cap = self
            .buffers
            .get(&pid)
            .map(|b| b.len() > self.config.max_section_buffer)
            .unwrap_or(false);
        if over_cap {
            self.buffers.remove(&pid);
            warn!("Reassembly buffer for PID {:x} exceeded the configured cap", pid);
            return Err(Error::SectionTooLong(pid));
        }
        Ok(())
    }

    fn dispatch_section(&mut self, pid: u16, section_bytes: &[u8]) -> Result<Option<Section>> {
        let parser = match self.dispatch.get(pid) {
            Some(p) => p,
            None => {
                warn!("Discarding section on unregistered PID: {:x}", pid);
                return Ok(None);
            }
        };
        let mut new_pmt_pids = Vec::new();
        let section = parser.parse(section_bytes, &mut new_pmt_pids)?;
        self.dispatch.register_pmt_pids(new_pmt_pids);
        Ok(Some(section))
    }

    /// Drain a packet source to completion, invoking `sink` for each completed section.
    ///
    /// Packets are read in a bounded loop per packet rather than relying on a single
    /// `read` call returning exactly 188 bytes, since real readers (files, sockets) may
    /// return short reads at any boundary. A short read that never completes a packet
    /// before EOF is fatal (`ShortPacket`); clean EOF with zero bytes read ends the
    /// stream.
    pub fn run<R: Read>(&mut self, mut source: R, mut sink: impl FnMut(Section)) -> Result<()> {
        loop {
            let mut packet = [0u8; 188];
            let mut filled = 0;
            loop {
                if filled == packet.len() {
                    break;
                }
                let n = source.read(&mut packet[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            if filled == 0 {
                return Ok(());
            }
            if filled != packet.len() {
                return Err(Error::ShortPacket(filled));
            }
            if let Some(section) = self.feed_packet(&packet)? {
                sink(section);
            }
        }
    }
}

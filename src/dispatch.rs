//! PID-to-parser dispatch table.

use crate::error::Result;
use crate::psi::eit::Eit;
use crate::psi::pat::Pat;
use crate::psi::pmt::Pmt;
use enum_dispatch::enum_dispatch;
use std::collections::{HashMap, HashSet};

/// Output of any registered section parser, handed to the demultiplexer's sink.
#[derive(Debug)]
pub enum Section {
    /// A parsed Program Association Table section.
    Pat(Pat),
    /// A parsed Program Map Table section.
    Pmt(Pmt),
    /// A parsed Event Information Table section.
    Eit(Eit),
}

/// Shared behavior of every concrete section parser, dispatched statically per PID
/// over a fully-reassembled section buffer.
#[enum_dispatch]
pub(crate) trait SectionParserObject {
    fn parse(&self, section_bytes: &[u8], new_pmt_pids: &mut Vec<u16>) -> Result<Section>;
}

struct PatParser;
struct PmtParser;
struct EitParser;

impl SectionParserObject for PatParser {
    fn parse(&self, section_bytes: &[u8], new_pmt_pids: &mut Vec<u16>) -> Result<Section> {
        Pat::parse(section_bytes, new_pmt_pids).map(Section::Pat)
    }
}

impl SectionParserObject for PmtParser {
    fn parse(&self, section_bytes: &[u8], _new_pmt_pids: &mut Vec<u16>) -> Result<Section> {
        Pmt::parse(section_bytes).map(Section::Pmt)
    }
}

impl SectionParserObject for EitParser {
    fn parse(&self, section_bytes: &[u8], _new_pmt_pids: &mut Vec<u16>) -> Result<Section> {
        Eit::parse(section_bytes).map(Section::Eit)
    }
}

#[enum_dispatch(SectionParserObject)]
pub(crate) enum ParserKind {
    Pat(PatParser),
    Pmt(PmtParser),
    Eit(EitParser),
}

/// PID-keyed mapping from a packet identifier to the section parser registered for it.
///
/// Seeded at construction with the well-known PIDs: 0x0000 (PAT) and 0x0012/0x0026/0x0027
/// (EIT variants). Extended dynamically as PATs announce PMT PIDs; registrations are
/// idempotent (a PID already present is left untouched).
pub(crate) struct DispatchTable {
    parsers: HashMap<u16, ParserKind>,
    known_pmt_pids: HashSet<u16>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        let mut parsers = HashMap::new();
        parsers.insert(0x0000, ParserKind::Pat(PatParser));
        parsers.insert(0x0012, ParserKind::Eit(EitParser));
        parsers.insert(0x0026, ParserKind::Eit(EitParser));
        parsers.insert(0x0027, ParserKind::Eit(EitParser));
        Self {
            parsers,
            known_pmt_pids: HashSet::new(),
        }
    }
}

impl DispatchTable {
    pub(crate) fn get(&self, pid: u16) -> Option<&ParserKind> {
        self.parsers.get(&pid)
    }

    /// Register newly-announced PMT PIDs from a just-parsed PAT. No-op for PIDs already
    /// registered.
    pub(crate) fn register_pmt_pids(&mut self, pids: impl IntoIterator<Item = u16>) {
        for pid in pids {
            if self.known_pmt_pids.insert(pid) {
                self.parsers.entry(pid).or_insert(ParserKind::Pmt(PmtParser));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_well_known_pids() {
        let table = DispatchTable::default();
        assert!(matches!(table.get(0x0000), Some(ParserKind::Pat(_))));
        assert!(matches!(table.get(0x0012), Some(ParserKind::Eit(_))));
        assert!(matches!(table.get(0x0026), Some(ParserKind::Eit(_))));
        assert!(matches!(table.get(0x0027), Some(ParserKind::Eit(_))));
        assert!(table.get(0x0100).is_none());
    }

    #[test]
    fn registers_pmt_pids_idempotently() {
        let mut table = DispatchTable::default();
        table.register_pmt_pids([0x0100]);
        assert!(matches!(table.get(0x0100), Some(ParserKind::Pmt(_))));
        // Registering again is a no-op, not an error or a replacement.
        table.register_pmt_pids([0x0100]);
        assert!(matches!(table.get(0x0100), Some(ParserKind::Pmt(_))));
    }
}

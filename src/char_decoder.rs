//! ARIB STD-B24 8-bit character decoding: an ISO/IEC 2022-based graphic-set state
//! machine over the GL/GR invocation areas, delegating byte runs to
//! [`encoding_rs::ISO_2022_JP`].

use log::warn;

/// Which of the four designation slots (G0..G3) is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicSetIndex {
    /// Designation slot G0.
    G0,
    /// Designation slot G1.
    G1,
    /// Designation slot G2.
    G2,
    /// Designation slot G3.
    G3,
}

/// A graphic set designated into one of G0..G3, identified by its ISO-2022 final byte.
///
/// `Unrecognised` covers the mosaic/proportional/compatibility-kanji/additional-symbol
/// final bytes: recognised as valid designations but not decoded — runs in these sets
/// produce the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicSet {
    /// Two-byte kanji set (JIS X 0208-compatible), final byte `0x42`.
    Kanji,
    /// Single-byte alphanumeric set, final byte `0x4A`.
    Alnum,
    /// Single-byte hiragana set, final byte `0x30`.
    Hiragana,
    /// Single-byte katakana set, final byte `0x31`.
    Katakana,
    /// Any other designated final byte (mosaics, DRCS, compatibility kanji, ...), not decoded.
    Unrecognised(u8),
}

impl GraphicSet {
    fn from_final_byte(b: u8) -> Self {
        match b {
            0x42 => GraphicSet::Kanji,
            0x4A => GraphicSet::Alnum,
            0x30 => GraphicSet::Hiragana,
            0x31 => GraphicSet::Katakana,
            other => {
                warn!("Unrecognised graphic set final byte: {:#x}", other);
                GraphicSet::Unrecognised(other)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Area {
    Gl,
    Gr,
}

/// Stateful ARIB 8-bit character decoder.
///
/// Carries four graphic-set designation slots and two invocation areas. Not safe to
/// share across concurrent decode calls — each `decode` call mutates the decoder's
/// locking-shift and designation state for use by the next call, exactly as a real
/// broadcast byte stream would expect.
#[derive(Debug, Clone)]
pub struct CharDecoder {
    g: [GraphicSet; 4],
    gl: GraphicSetIndex,
    gr: GraphicSetIndex,
    pending_single_shift: Option<GraphicSetIndex>,
}

impl Default for CharDecoder {
    fn default() -> Self {
        Self {
            g: [
                GraphicSet::Kanji,
                GraphicSet::Alnum,
                GraphicSet::Hiragana,
                GraphicSet::Katakana,
            ],
            gl: GraphicSetIndex::G0,
            gr: GraphicSetIndex::G2,
            pending_single_shift: None,
        }
    }
}

fn designate_slot(designator_byte: u8) -> GraphicSetIndex {
    match designator_byte {
        0x28 => GraphicSetIndex::G0,
        0x29 => GraphicSetIndex::G1,
        0x2A => GraphicSetIndex::G2,
        0x2B => GraphicSetIndex::G3,
        _ => GraphicSetIndex::G0,
    }
}

impl CharDecoder {
    /// Create a decoder in its initial state: GL locked to G0 (KANJI), GR locked to G2
    /// (HIRAGANA), no pending single shift.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one byte stream, advancing this decoder's persistent state.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut out = String::new();
        let mut run: Vec<u8> = Vec::new();
        let mut run_area: Option<Area> = None;

        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            let masked = b & 0x7F;
            match masked {
                0x00..=0x1F => {
                    self.flush_run(&mut run, &mut run_area, &mut out);
                    if masked == 0x1B {
                        let consumed = self.handle_escape(&bytes[i + 1..]);
                        i += 1 + consumed;
                    } else {
                        self.handle_control(masked);
                        i += 1;
                    }
                }
                0x20 | 0x7F => {
                    self.flush_run(&mut run, &mut run_area, &mut out);
                    i += 1;
                }
                _ => {
                    let area = if b & 0x80 == 0 { Area::Gl } else { Area::Gr };
                    if run_area != Some(area) {
                        self.flush_run(&mut run, &mut run_area, &mut out);
                        run_area = Some(area);
                    }
                    run.push(masked);
                    i += 1;
                }
            }
        }
        self.flush_run(&mut run, &mut run_area, &mut out);
        out
    }

    fn flush_run(&mut self, run: &mut Vec<u8>, run_area: &mut Option<Area>, out: &mut String) {
        if let Some(area) = run_area.take() {
            if !run.is_empty() {
                let slot = self.pending_single_shift.take().unwrap_or(match area {
                    Area::Gl => self.gl,
                    Area::Gr => self.gr,
                });
                out.push_str(&transcode(self.g[slot_index(slot)], run));
            }
            run.clear();
        }
    }

    fn handle_control(&mut self, b: u8) {
        match b {
            0x0F => self.gl = GraphicSetIndex::G0, // LS0
            0x0E => self.gl = GraphicSetIndex::G1, // LS1
            0x19 => self.pending_single_shift = Some(GraphicSetIndex::G2), // SS2
            0x1D => self.pending_single_shift = Some(GraphicSetIndex::G3), // SS3
            _ => {}
        }
    }

    fn designate(&mut self, slot: GraphicSetIndex, set: GraphicSet) {
        self.g[slot_index(slot)] = set;
    }

    /// Dispatch the byte(s) following an ESC (0x1B). Returns the number of bytes
    /// consumed from `rest`, not counting the ESC byte itself.
    fn handle_escape(&mut self, rest: &[u8]) -> usize {
        let b0 = match rest.first() {
            Some(b) => *b,
            None => return 0,
        };
        match b0 {
            0x6E => {
                self.gl = GraphicSetIndex::G2; // LS2
                1
            }
            0x6F => {
                self.gl = GraphicSetIndex::G3; // LS3
                1
            }
            0x7E => {
                self.gr = GraphicSetIndex::G1; // LS1R
                1
            }
            0x7D => {
                self.gr = GraphicSetIndex::G2; // LS2R
                1
            }
            0x7C => {
                self.gr = GraphicSetIndex::G3; // LS3R
                1
            }
            0x28 | 0x29 | 0x2A | 0x2B => self.handle_designate(designate_slot(b0), &rest[1..]) + 1,
            0x24 => self.handle_dbyte(&rest[1..]) + 1,
            _ => 1,
        }
    }

    /// `ESC <designator> ...`: designate `slot` with the next final byte, or skip a DRCS
    /// designation byte when the final byte is 0x20. Returns bytes consumed after the
    /// designator byte.
    fn handle_designate(&mut self, slot: GraphicSetIndex, rest: &[u8]) -> usize {
        let final_byte = match rest.first() {
            Some(b) => *b,
            None => return 0,
        };
        if final_byte == 0x20 {
            match rest.get(1) {
                Some(&drcs_byte) => {
                    self.designate(slot, GraphicSet::Unrecognised(drcs_byte));
                    2
                }
                None => 1,
            }
        } else {
            self.designate(slot, GraphicSet::from_final_byte(final_byte));
            1
        }
    }

    /// `ESC 0x24 ...` (two-byte set designation). Returns bytes consumed after the 0x24.
    fn handle_dbyte(&mut self, rest: &[u8]) -> usize {
        let b1 = match rest.first() {
            Some(b) => *b,
            None => return 0,
        };
        match b1 {
            0x28 | 0x29 | 0x2A | 0x2B => self.handle_designate(designate_slot(b1), &rest[1..]) + 1,
            0x20 => match rest.get(1) {
                Some(&drcs_byte) => {
                    self.designate(GraphicSetIndex::G0, GraphicSet::Unrecognised(drcs_byte));
                    2
                }
                None => 1,
            },
            _ => {
                self.designate(GraphicSetIndex::G0, GraphicSet::from_final_byte(b1));
                1
            }
        }
    }
}

fn slot_index(slot: GraphicSetIndex) -> usize {
    match slot {
        GraphicSetIndex::G0 => 0,
        GraphicSetIndex::G1 => 1,
        GraphicSetIndex::G2 => 2,
        GraphicSetIndex::G3 => 3,
    }
}

fn decode_via_iso2022(prefix: &[u8], body: &[u8]) -> String {
    let mut buf = Vec::with_capacity(prefix.len() + body.len());
    buf.extend_from_slice(prefix);
    buf.extend_from_slice(body);
    let (cow, _encoding, _had_errors) = encoding_rs::ISO_2022_JP.decode(&buf);
    cow.into_owned()
}

fn transcode(set: GraphicSet, run: &[u8]) -> String {
    match set {
        GraphicSet::Kanji => decode_via_iso2022(&[0x1B, 0x24, 0x42], run),
        GraphicSet::Alnum => decode_via_iso2022(&[0x1B, 0x28, 0x42], run),
        GraphicSet::Hiragana => {
            let mut buf = Vec::with_capacity(run.len() * 2);
            for &b in run {
                buf.push(0x24);
                buf.push(b);
            }
            decode_via_iso2022(&[0x1B, 0x24, 0x42], &buf)
        }
        GraphicSet::Katakana => {
            let mut buf = Vec::with_capacity(run.len() * 2);
            for &b in run {
                buf.push(0x25);
                buf.push(b);
            }
            decode_via_iso2022(&[0x1B, 0x24, 0x42], &buf)
        }
        GraphicSet::Unrecognised(_) => String::new(),
    }
}

/// Decode one standalone ARIB text field (e.g. an EIT event-name/text byte string) with
/// a freshly-initialised decoder.
pub fn decode_arib_text(bytes: &[u8]) -> String {
    CharDecoder::default().decode(bytes)
}

//! Descriptor loop parsing, generic plus the two EIT-specific shapes this system decodes.

use crate::char_decoder::decode_arib_text;
use crate::error::{Error, Result};
use crate::slice_reader::SliceReader;
use log::warn;
use smallvec::SmallVec;

/// Short event descriptor tag (ISO/IEC 13818-1 private descriptor space, ARIB STD-B10).
pub const SHORT_EVENT_DESCRIPTOR_TAG: u8 = 0x4D;
/// Extended event descriptor tag.
pub const EXTENDED_EVENT_DESCRIPTOR_TAG: u8 = 0x4E;

/// Opaque descriptor: a tag, declared length, and the raw payload bytes.
#[derive(Debug)]
pub struct Descriptor {
    /// Descriptor tag byte.
    pub tag: u8,
    /// Raw descriptor payload, excluding the tag and length bytes.
    pub data: SmallVec<[u8; 8]>,
}

impl Descriptor {
    /// Read one `tag, length, data` descriptor from `reader`, consuming exactly
    /// `2 + length` bytes.
    pub(crate) fn new_from_reader(reader: &mut SliceReader) -> Result<Self> {
        let tag_len = reader.read_array_ref::<2>()?;
        let tag = tag_len[0];
        let len = tag_len[1] as usize;
        let mut data = SmallVec::<[u8; 8]>::new();
        data.extend_from_slice(reader.read(len)?);
        Ok(Self { tag, data })
    }
}

/// A short-event descriptor's one article: name and text, already run through the ARIB
/// character decoder.
#[derive(Debug)]
pub struct ShortEventDescriptor {
    /// ISO 639-2 language code.
    pub language_code: [u8; 3],
    /// Decoded event title.
    pub event_name: String,
    /// Decoded short summary text.
    pub text: String,
}

impl ShortEventDescriptor {
    fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = SliceReader::new(data);
        let language_code = *reader.read_array_ref::<3>()?;
        let name_len = reader.read_u8()? as usize;
        let event_name = decode_arib_text(reader.read(name_len)?);
        let text_len = reader.read_u8()? as usize;
        let text = decode_arib_text(reader.read(text_len)?);
        Ok(Self {
            language_code,
            event_name,
            text,
        })
    }
}

/// One `(item_description, item)` pair inside an extended event descriptor.
#[derive(Debug)]
pub struct ExtendedEventItem {
    /// Decoded item heading (e.g. "Cast", "Director").
    pub description: String,
    /// Decoded item body.
    pub item: String,
}

/// Extended event descriptor: a chunk (possibly one of several for the same event) of
/// additional item/text pairs plus overflow text.
#[derive(Debug)]
pub struct ExtendedEventDescriptor {
    /// This descriptor's index among the event's extended-event descriptor chunks.
    pub descriptor_number: u8,
    /// Index of the final chunk; `descriptor_number == last_descriptor_number` on the last one.
    pub last_descriptor_number: u8,
    /// ISO 639-2 language code.
    pub language_code: [u8; 3],
    /// Heading/body pairs carried by this chunk.
    pub items: Vec<ExtendedEventItem>,
    /// Decoded overflow text.
    pub text: String,
}

impl ExtendedEventDescriptor {
    fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = SliceReader::new(data);
        let numbers = reader.read_u8()?;
        let descriptor_number = numbers >> 4;
        let last_descriptor_number = numbers & 0x0F;
        let language_code = *reader.read_array_ref::<3>()?;
        let item_length = reader.read_u8()? as usize;
        let mut item_reader = reader
            .new_sub_reader(item_length)
            .map_err(|_| Error::TruncatedSection)?;
        let mut items = Vec::new();
        while item_reader.remaining_len() > 0 {
            let description_len = item_reader.read_u8()? as usize;
            let description = decode_arib_text(item_reader.read(description_len)?);
            let item_len = item_reader.read_u8()? as usize;
            let item = decode_arib_text(item_reader.read(item_len)?);
            items.push(ExtendedEventItem { description, item });
        }
        let text_len = reader.read_u8()? as usize;
        let text = decode_arib_text(reader.read(text_len)?);
        Ok(Self {
            descriptor_number,
            last_descriptor_number,
            language_code,
            items,
            text,
        })
    }
}

/// Typed view of a descriptor found inside an EIT event's descriptor loop.
///
/// All other tags are parsed as [`EitDescriptor::Other`]'s opaque body.
#[derive(Debug)]
pub enum EitDescriptor {
    /// Tag `0x4D`: one language's event title and short summary.
    ShortEvent(ShortEventDescriptor),
    /// Tag `0x4E`: one chunk of a (possibly multi-descriptor) extended event description.
    ExtendedEvent(ExtendedEventDescriptor),
    /// Any other tag, left undecoded.
    Other(Descriptor),
}

impl EitDescriptor {
    pub(crate) fn new_from_reader(reader: &mut SliceReader) -> Result<Self> {
        let raw = Descriptor::new_from_reader(reader)?;
        Ok(match raw.tag {
            SHORT_EVENT_DESCRIPTOR_TAG => {
                EitDescriptor::ShortEvent(ShortEventDescriptor::parse(&raw.data)?)
            }
            EXTENDED_EVENT_DESCRIPTOR_TAG => {
                EitDescriptor::ExtendedEvent(ExtendedEventDescriptor::parse(&raw.data)?)
            }
            other_tag => {
                warn!("Unhandled descriptor tag: {:#x}", other_tag);
                EitDescriptor::Other(raw)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_consumes_declared_length() {
        let mut bytes = vec![0x00u8, 5];
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        bytes.extend_from_slice(&[0x00, 0]); // next descriptor: tag 0x00 len 0
        let mut reader = SliceReader::new(&bytes);
        let first = EitDescriptor::new_from_reader(&mut reader).unwrap();
        assert!(matches!(first, EitDescriptor::Other(_)));
        assert_eq!(reader.remaining_len(), 2);
    }

    #[test]
    fn short_event_descriptor_populates_one_article() {
        // Switch GL to G1 (ALNUM) first via ESC 0x28 0x4A so the name bytes decode as
        // plain ASCII rather than the default two-byte KANJI set (see char_decoder.rs).
        let mut data = vec![b'j', b'p', b'n'];
        let mut name = vec![0x0Eu8]; // LS1: GL := G1 (ALNUM)
        name.extend_from_slice(b"ABC");
        data.push(name.len() as u8);
        data.extend_from_slice(&name);
        data.push(0);
        let sed = ShortEventDescriptor::parse(&data).unwrap();
        assert_eq!(&sed.language_code, b"jpn");
        assert_eq!(sed.event_name, "ABC");
        assert_eq!(sed.text, "");
    }

    #[test]
    fn extended_event_oversized_item_length_is_truncated_section() {
        let mut data = vec![0x10]; // descriptor_number=1, last_descriptor_number=0
        data.extend_from_slice(b"jpn");
        data.push(0x0A); // item_length declares 10 bytes that aren't there
        match ExtendedEventDescriptor::parse(&data) {
            Err(Error::TruncatedSection) => {}
            other => panic!("expected TruncatedSection, got {:?}", other),
        }
    }
}

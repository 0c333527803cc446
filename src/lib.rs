//! Demultiplexer and character decoder for ARIB/ISDB digital broadcast transport
//! streams.
//!
//! # Usage
//! Simply add this crate as a dependency in your `Cargo.toml`.
//!
//! ```toml
//! [dependencies]
//! arib-si = "~0.1.0"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use arib_si::Demux;
//! use std::fs::File;
//!
//! let file = File::open("stream.ts").expect("unable to open");
//! let mut demux = Demux::default();
//! demux
//!     .run(file, |section| println!("{:?}", section))
//!     .expect("parse error");
//! ```

#![allow(unused)]
#![deny(missing_docs, unsafe_code, warnings)]

mod char_decoder;
pub use char_decoder::{decode_arib_text, CharDecoder, GraphicSet, GraphicSetIndex};

mod demux;
pub use demux::{Config, Demux};

mod dispatch;
pub use dispatch::Section;

mod error;
pub use error::{Error, Result};

mod packet;
pub use packet::{
    decode_packet, AdaptationFieldHeader, Packet, PacketHeader, TransportScramblingControl,
};

mod psi;
pub use psi::descriptor::{
    Descriptor, EitDescriptor, ExtendedEventDescriptor, ExtendedEventItem, ShortEventDescriptor,
};
pub use psi::eit::{Eit, EitEvent};
pub use psi::pat::{Pat, PatEntry};
pub use psi::pmt::{ElementaryStreamInfo, ElementaryStreamInfoHeader, Pmt, PmtHeader};
pub use psi::{PsiHeader, PsiTableSyntax};

mod slice_reader;
pub use slice_reader::SliceReader;

mod time;
pub use time::{decode_duration, decode_start_time};

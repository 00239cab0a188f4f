//! Message header and complete message, with the RFC 6733 wire form.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Version    |                 Message Length                |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! | Command Flags |                  Command Code                 |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Application-ID                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Hop-by-Hop Identifier                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      End-to-End Identifier                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  AVPs ...
//! +-+-+-+-+-+-+-+-+-+-+-+-
//! ```

use crate::avp::Avp;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

/// Protocol version carried in every header.
pub const DIAMETER_VERSION: u8 = 1;
/// Fixed header size.
pub const HEADER_SIZE: usize = 20;

/// Command flag bits.
pub mod cmd_flags {
    /// Request bit.
    pub const REQUEST: u8 = 0x80;
    /// Proxiable bit.
    pub const PROXIABLE: u8 = 0x40;
    /// Error bit.
    pub const ERROR: u8 = 0x20;
    /// Potentially re-transmitted bit.
    pub const RETRANSMIT: u8 = 0x10;
}

/// Resolved message header.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    pub version: u8,
    pub application_id: u32,
    pub command_code: u32,
    pub request: bool,
    pub proxiable: bool,
    pub error: bool,
    pub retransmit: bool,
    pub hop_by_hop: u32,
    pub end_to_end: u32,
}

impl MessageHeader {
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.request {
            flags |= cmd_flags::REQUEST;
        }
        if self.proxiable {
            flags |= cmd_flags::PROXIABLE;
        }
        if self.error {
            flags |= cmd_flags::ERROR;
        }
        if self.retransmit {
            flags |= cmd_flags::RETRANSMIT;
        }
        flags
    }
}

/// A complete message: header plus top-level AVPs in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub header: MessageHeader,
    pub avps: Vec<Avp>,
}

impl Message {
    pub fn new(header: MessageHeader) -> Self {
        Message {
            header,
            avps: Vec::new(),
        }
    }

    pub fn add(&mut self, avp: Avp) {
        self.avps.push(avp);
    }

    /// Total wire length, header included.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.avps.iter().map(Avp::encoded_len).sum::<usize>()
    }

    pub fn encode_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let length = self.encoded_len();
        w.write_u8(self.header.version)?;
        w.write_u8(((length >> 16) & 0xff) as u8)?;
        w.write_u16::<BigEndian>((length & 0xffff) as u16)?;
        w.write_u8(self.header.flags())?;
        w.write_u8(((self.header.command_code >> 16) & 0xff) as u8)?;
        w.write_u16::<BigEndian>((self.header.command_code & 0xffff) as u16)?;
        w.write_u32::<BigEndian>(self.header.application_id)?;
        w.write_u32::<BigEndian>(self.header.hop_by_hop)?;
        w.write_u32::<BigEndian>(self.header.end_to_end)?;
        for avp in &self.avps {
            avp.encode_to(w)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_to(&mut out)?;
        Ok(out)
    }
}

//! Typed AVP and its RFC 6733 wire form.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           AVP Code                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V M P r r r r r|                  AVP Length                   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        Vendor-ID (opt)                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Data ...
//! +-+-+-+-+-+-+-+-+
//! ```

use byteorder::{BigEndian, WriteBytesExt};
use chrono::{DateTime, Utc};
use std::io::{self, Write};

/// AVP flag bits.
pub mod avp_flags {
    /// Vendor-Specific bit.
    pub const VENDOR: u8 = 0x80;
    /// Mandatory bit.
    pub const MANDATORY: u8 = 0x40;
    /// Protected bit.
    pub const PROTECTED: u8 = 0x20;
}

/// AVP header size without vendor id.
pub const AVP_HEADER_SIZE: usize = 8;
/// AVP header size with vendor id.
pub const AVP_HEADER_SIZE_VENDOR: usize = 12;

/// Offset between the Unix epoch and the 1900 NTP epoch used by Time AVPs.
const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// Typed AVP payload. Scalars carry their final binary-ready representation;
/// `Grouped` carries ordered child AVPs.
#[derive(Debug, Clone, PartialEq)]
pub enum AvpValue {
    OctetString(Vec<u8>),
    Integer32(i32),
    Integer64(i64),
    Unsigned32(u32),
    Unsigned64(u64),
    Float32(f32),
    Float64(f64),
    Time(DateTime<Utc>),
    Grouped(Vec<Avp>),
}

impl AvpValue {
    /// Payload length on the wire, before padding.
    pub fn encoded_len(&self) -> usize {
        match self {
            AvpValue::OctetString(b) => b.len(),
            AvpValue::Integer32(_) | AvpValue::Unsigned32(_) | AvpValue::Float32(_) => 4,
            AvpValue::Integer64(_) | AvpValue::Unsigned64(_) | AvpValue::Float64(_) => 8,
            AvpValue::Time(_) => 4,
            AvpValue::Grouped(children) => children.iter().map(Avp::encoded_len).sum(),
        }
    }

    pub fn encode_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self {
            AvpValue::OctetString(b) => w.write_all(b),
            AvpValue::Integer32(v) => w.write_i32::<BigEndian>(*v),
            AvpValue::Integer64(v) => w.write_i64::<BigEndian>(*v),
            AvpValue::Unsigned32(v) => w.write_u32::<BigEndian>(*v),
            AvpValue::Unsigned64(v) => w.write_u64::<BigEndian>(*v),
            AvpValue::Float32(v) => w.write_f32::<BigEndian>(*v),
            AvpValue::Float64(v) => w.write_f64::<BigEndian>(*v),
            AvpValue::Time(t) => {
                let seconds = t.timestamp().wrapping_add(NTP_UNIX_OFFSET);
                w.write_u32::<BigEndian>(seconds as u32)
            }
            AvpValue::Grouped(children) => {
                for child in children {
                    child.encode_to(w)?;
                }
                Ok(())
            }
        }
    }
}

/// One Attribute-Value-Pair of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Avp {
    pub code: u32,
    /// Owning vendor; 0 means no vendor id on the wire.
    pub vendor_id: u32,
    pub mandatory: bool,
    pub protected: bool,
    pub value: AvpValue,
}

impl Avp {
    pub fn new(code: u32, value: AvpValue) -> Self {
        Avp {
            code,
            vendor_id: 0,
            mandatory: true,
            protected: false,
            value,
        }
    }

    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.vendor_id != 0 {
            flags |= avp_flags::VENDOR;
        }
        if self.mandatory {
            flags |= avp_flags::MANDATORY;
        }
        if self.protected {
            flags |= avp_flags::PROTECTED;
        }
        flags
    }

    fn header_len(&self) -> usize {
        if self.vendor_id != 0 {
            AVP_HEADER_SIZE_VENDOR
        } else {
            AVP_HEADER_SIZE
        }
    }

    /// Wire length including header and 4-byte padding.
    pub fn encoded_len(&self) -> usize {
        let total = self.header_len() + self.value.encoded_len();
        (total + 3) & !3
    }

    pub fn encode_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let data_len = self.value.encoded_len();
        let avp_len = self.header_len() + data_len;

        w.write_u32::<BigEndian>(self.code)?;
        w.write_u8(self.flags())?;
        w.write_u8(((avp_len >> 16) & 0xff) as u8)?;
        w.write_u16::<BigEndian>((avp_len & 0xffff) as u16)?;
        if self.vendor_id != 0 {
            w.write_u32::<BigEndian>(self.vendor_id)?;
        }
        self.value.encode_to(w)?;

        let padding = (4 - (data_len % 4)) % 4;
        for _ in 0..padding {
            w.write_u8(0)?;
        }
        Ok(())
    }
}

//! Format built messages for display (tree view, hex dump).

use crate::avp::{Avp, AvpValue};
use crate::message::Message;
use std::fmt::Write;

/// Render a message as an indented tree: header line, then one line per AVP.
pub fn format_message(message: &Message) -> String {
    let h = &message.header;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "message application={} command={} flags=0x{:02x} hopByHop=0x{:08x} endToEnd=0x{:08x}",
        h.application_id,
        h.command_code,
        h.flags(),
        h.hop_by_hop,
        h.end_to_end
    );
    for avp in &message.avps {
        format_avp(&mut out, avp, 1);
    }
    out
}

fn format_avp(out: &mut String, avp: &Avp, depth: usize) {
    let indent = "  ".repeat(depth);
    let vendor = if avp.vendor_id != 0 {
        format!(" vendor={}", avp.vendor_id)
    } else {
        String::new()
    };
    match &avp.value {
        AvpValue::Grouped(children) => {
            let _ = writeln!(
                out,
                "{}avp code={}{} flags=0x{:02x} grouped ({} children)",
                indent,
                avp.code,
                vendor,
                avp.flags(),
                children.len()
            );
            for child in children {
                format_avp(out, child, depth + 1);
            }
        }
        value => {
            let _ = writeln!(
                out,
                "{}avp code={}{} flags=0x{:02x} {}",
                indent,
                avp.code,
                vendor,
                avp.flags(),
                format_scalar(value)
            );
        }
    }
}

fn format_scalar(value: &AvpValue) -> String {
    match value {
        AvpValue::OctetString(b) => match std::str::from_utf8(b) {
            Ok(s) if s.chars().all(|c| !c.is_control()) => format!("\"{}\"", s),
            _ => format!("0x{}", hex::encode(b)),
        },
        AvpValue::Integer32(v) => v.to_string(),
        AvpValue::Integer64(v) => v.to_string(),
        AvpValue::Unsigned32(v) => v.to_string(),
        AvpValue::Unsigned64(v) => v.to_string(),
        AvpValue::Float32(v) => v.to_string(),
        AvpValue::Float64(v) => v.to_string(),
        AvpValue::Time(t) => t.to_rfc3339(),
        AvpValue::Grouped(_) => String::new(),
    }
}

/// Classic 16-bytes-per-row hex dump with an ASCII gutter.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", row * 16);
        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02x} ", b);
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push(' ');
        for b in chunk {
            out.push(if b.is_ascii_graphic() || *b == b' ' {
                *b as char
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}

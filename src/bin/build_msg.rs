//! Build a message document against the base-protocol dictionary and print
//! the resolved tree plus the wire bytes.
//!
//! Usage: `build_msg <document-file>` (reads stdin when no file is given).

use anyhow::{Context, Result};
use diamsg::dump::{format_message, hex_dump};
use diamsg::{
    Application, AvpDef, AvpPolicy, CommandDef, Dictionary, IdProvider, MessageBuilder, TypeDef,
    VendorDef,
};
use std::io::Read;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let source = match std::env::args().nth(1) {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let root = diamsg::parse(&source).map_err(anyhow::Error::msg)?;

    let dict = base_dictionary();
    let ids = IdProvider::new();
    let builder = MessageBuilder::new(&dict, &ids);
    let message = builder.build_message(&root, Some(true))?;

    print!("{}", format_message(&message));
    let bytes = message.to_bytes().context("encoding message")?;
    println!();
    print!("{}", hex_dump(&bytes));
    Ok(())
}

/// A working subset of the RFC 6733 base protocol.
fn base_dictionary() -> Dictionary {
    let mut d = Dictionary::new();
    d.add_application(Application { id: 0, name: "Diameter Common Messages".to_string() });

    for (code, name) in [
        (257, "Capabilities-Exchange"),
        (280, "Device-Watchdog"),
        (282, "Disconnect-Peer"),
    ] {
        d.add_command(0, CommandDef { code, name: name.to_string() });
    }

    d.add_vendor(0, VendorDef { code: 10415, name: "3GPP".to_string() });

    for (name, parent) in [
        ("OctetString", None),
        ("UTF8String", Some("OctetString")),
        ("DiameterIdentity", Some("UTF8String")),
        ("DiameterURI", Some("UTF8String")),
        ("Address", Some("OctetString")),
        ("Integer32", None),
        ("Integer64", None),
        ("Unsigned32", None),
        ("Unsigned64", None),
        ("Float32", None),
        ("Float64", None),
        ("Time", None),
        ("Enumerated", Some("Integer32")),
        ("AppId", Some("Unsigned32")),
        ("VendorId", Some("Unsigned32")),
    ] {
        d.add_type(0, TypeDef::new(name, parent));
    }

    d.add_avp(0, AvpDef::new(263, "Session-Id", Some("UTF8String")));
    d.add_avp(0, AvpDef::new(264, "Origin-Host", Some("DiameterIdentity")));
    d.add_avp(0, AvpDef::new(296, "Origin-Realm", Some("DiameterIdentity")));
    d.add_avp(0, AvpDef::new(257, "Host-IP-Address", Some("Address")));
    d.add_avp(0, AvpDef::new(266, "Vendor-Id", Some("VendorId")));
    d.add_avp(0, AvpDef::new(269, "Product-Name", Some("UTF8String")).with_mandatory(AvpPolicy::MustNot));
    d.add_avp(0, AvpDef::new(267, "Firmware-Revision", Some("Unsigned32")).with_mandatory(AvpPolicy::MustNot));
    d.add_avp(0, AvpDef::new(265, "Supported-Vendor-Id", Some("VendorId")));
    d.add_avp(0, AvpDef::new(258, "Auth-Application-Id", Some("AppId")));
    d.add_avp(0, AvpDef::new(259, "Acct-Application-Id", Some("AppId")));
    d.add_avp(
        0,
        AvpDef::new(268, "Result-Code", Some("Enumerated"))
            .with_enum("DIAMETER_SUCCESS", 2001)
            .with_enum("DIAMETER_COMMAND_UNSUPPORTED", 3001)
            .with_enum("DIAMETER_UNABLE_TO_DELIVER", 3002)
            .with_enum("DIAMETER_UNABLE_TO_COMPLY", 5012),
    );
    d.add_avp(
        0,
        AvpDef::new(273, "Disconnect-Cause", Some("Enumerated"))
            .with_enum("REBOOTING", 0)
            .with_enum("BUSY", 1)
            .with_enum("DO_NOT_WANT_TO_TALK_TO_YOU", 2),
    );
    d
}

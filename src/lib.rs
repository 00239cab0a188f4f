//! # diamsg — Declarative Diameter Message DSL
//!
//! Build wire-ready Diameter messages from a declarative, human-readable
//! description: symbolic command/AVP/enum names are resolved against a
//! protocol dictionary, string values are coerced into typed binary
//! payloads, and grouped AVPs nest recursively.
//!
//! ## Document structure
//!
//! - **header**: application id, command code, flags, correlation ids
//! - **avp**: code, optional vendor/type/flags, a value or child AVPs
//!
//! References accept three notations: a plain numeric code, a symbolic
//! dictionary name, or a qualified `label:code` token (the code wins; a
//! mismatching label is only warned about).
//!
//! ## Example document
//!
//! ```text
//! message {
//!     header applicationId="0" command="280" request="true";
//!     avp code="264" value="host.example.com";
//!     avp code="Subscription-Id" {
//!         avp code="450" type="Unsigned32" value="0";
//!     }
//! }
//! ```
//!
//! ## Usage
//!
//! Populate a [`Dictionary`], parse a document with [`parse`], then build:
//!
//! ```text
//! let builder = MessageBuilder::new(&dict, &ids);
//! let message = builder.build_message(&root, Some(true))?;
//! let bytes = message.to_bytes()?;
//! ```

pub mod avp;
pub mod builder;
pub mod dictionary;
pub mod dump;
pub mod encode;
pub mod error;
pub mod id;
pub mod message;
pub mod parser;
pub mod resolve;
pub mod tree;

pub use avp::{Avp, AvpValue};
pub use builder::{MessageBuilder, MAX_AVP_DEPTH};
pub use dictionary::{Application, AvpDef, AvpPolicy, CommandDef, Dictionary, TypeDef, VendorDef};
pub use error::BuildError;
pub use id::IdProvider;
pub use message::{Message, MessageHeader};
pub use parser::parse;
pub use tree::Node;

//! Source Address Validation (SAV) rule decoding for IPFIX.
//!
//! SAV-capable routers export their validation rules as IPFIX (RFC 7011)
//! records whose rule entries sit in an RFC 6313 `subTemplateList`. This
//! crate decodes those lists from raw bytes:
//!
//! - [`varlen`]: RFC 7011 variable-length prefix
//! - [`template`]: sub-templates 901-904, record layouts, list header
//! - [`rule`]: [`SavRule`] and single-record decoding
//! - [`list`]: whole-list decoding with configurable trailing-byte handling
//! - [`descriptor`]: the outer SAV record wrapping the list
//! - [`diagnostics`]: non-fatal events delivered to a caller-owned sink
//! - [`config`]: TOML configuration for policy and IE numbers
//!
//! Transport, IPFIX template bookkeeping and output rendering are left to the
//! collector that calls into this crate.
//!
//! # Example
//!
//! ```
//! use sav_ipfix::{ListDecoder, TrailingBytesPolicy, CollectingSink};
//!
//! // allOf, template 904, one IPv6 prefix-to-interface rule
//! let mut content = vec![0x03, 0x03, 0x88];
//! content.extend_from_slice(&[0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
//! content.push(32);
//! content.extend_from_slice(&12u32.to_be_bytes());
//!
//! let decoder = ListDecoder::new(TrailingBytesPolicy::Strict).with_sink(CollectingSink::new());
//! let list = decoder.decode(&content, content.len() as u16, 1).unwrap();
//! assert_eq!(list.rules[0].to_string(), "interface=12 prefix=2001:db8::/32 mode=1");
//! ```

pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod list;
pub mod rule;
pub mod template;
pub mod varlen;

pub use config::{DecoderConfig, InfoElementIds, TrailingBytesPolicy};
pub use descriptor::{DescriptorDecoder, PolicyAction, RuleType, SavDescriptor, TargetType};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, NullSink, TracingSink};
pub use error::{ErrorKind, Result, SavError};
pub use list::{DecodedList, ListDecoder, decode_sav_sub_template_list, decode_varlen_prefixed_list};
pub use rule::{Prefix, SavRule, ValidationMode, decode_sav_rule, format_sav_rule};
pub use template::{
    Field, HEADER_LEN, RecordLayout, SavTemplate, Semantic, SubTemplateHeader, lookup_layout,
    read_header,
};
pub use varlen::{decode_varlen, encoded_len};

//! SAV sub-templates and the RFC 6313 subTemplateList header.
//!
//! Four sub-template ids describe SAV rule entries. They share two physical
//! sizes (9 bytes for IPv4, 21 bytes for IPv6) and differ in field order:
//!
//! | id  | meaning                | field order                       |
//! |-----|------------------------|-----------------------------------|
//! | 901 | IPv4 interface->prefix | interface_id, ipv4, prefix_len    |
//! | 902 | IPv6 interface->prefix | interface_id, ipv6, prefix_len    |
//! | 903 | IPv4 prefix->interface | ipv4, prefix_len, interface_id    |
//! | 904 | IPv6 prefix->interface | ipv6, prefix_len, interface_id    |

use crate::error::{Result, SavError};
use byteorder::{BigEndian, ByteOrder};
use std::fmt;

/// Size of the subTemplateList header (semantic + template id).
pub const HEADER_LEN: usize = 3;

/// SAV rule sub-template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SavTemplate {
    Ipv4InterfaceToPrefix = 901,
    Ipv6InterfaceToPrefix = 902,
    Ipv4PrefixToInterface = 903,
    Ipv6PrefixToInterface = 904,
}

impl SavTemplate {
    /// All SAV sub-templates in id order.
    pub const ALL: [SavTemplate; 4] = [
        SavTemplate::Ipv4InterfaceToPrefix,
        SavTemplate::Ipv6InterfaceToPrefix,
        SavTemplate::Ipv4PrefixToInterface,
        SavTemplate::Ipv6PrefixToInterface,
    ];

    /// Resolves a wire template id.
    ///
    /// # Errors
    ///
    /// Returns [`SavError::UnsupportedTemplate`] for ids outside 901-904.
    pub fn from_id(id: u16) -> Result<Self> {
        match id {
            901 => Ok(SavTemplate::Ipv4InterfaceToPrefix),
            902 => Ok(SavTemplate::Ipv6InterfaceToPrefix),
            903 => Ok(SavTemplate::Ipv4PrefixToInterface),
            904 => Ok(SavTemplate::Ipv6PrefixToInterface),
            other => Err(SavError::UnsupportedTemplate(other)),
        }
    }

    /// Returns the wire template id.
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Returns the record layout for this sub-template.
    pub fn layout(self) -> &'static RecordLayout {
        match self {
            SavTemplate::Ipv4InterfaceToPrefix => &IPV4_INTERFACE_TO_PREFIX,
            SavTemplate::Ipv6InterfaceToPrefix => &IPV6_INTERFACE_TO_PREFIX,
            SavTemplate::Ipv4PrefixToInterface => &IPV4_PREFIX_TO_INTERFACE,
            SavTemplate::Ipv6PrefixToInterface => &IPV6_PREFIX_TO_INTERFACE,
        }
    }

    /// Returns true for the IPv6 layouts (902, 904).
    pub const fn is_ipv6(self) -> bool {
        matches!(
            self,
            SavTemplate::Ipv6InterfaceToPrefix | SavTemplate::Ipv6PrefixToInterface
        )
    }

    /// Returns true if the interface id leads the record (901, 902).
    pub const fn is_interface_first(self) -> bool {
        matches!(
            self,
            SavTemplate::Ipv4InterfaceToPrefix | SavTemplate::Ipv6InterfaceToPrefix
        )
    }

    /// Short name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            SavTemplate::Ipv4InterfaceToPrefix => "ipv4_interface_to_prefix",
            SavTemplate::Ipv6InterfaceToPrefix => "ipv6_interface_to_prefix",
            SavTemplate::Ipv4PrefixToInterface => "ipv4_prefix_to_interface",
            SavTemplate::Ipv6PrefixToInterface => "ipv6_prefix_to_interface",
        }
    }
}

impl fmt::Display for SavTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl TryFrom<u16> for SavTemplate {
    type Error = SavError;

    fn try_from(id: u16) -> Result<Self> {
        SavTemplate::from_id(id)
    }
}

impl From<SavTemplate> for u16 {
    fn from(template: SavTemplate) -> Self {
        template.id()
    }
}

/// A field of a SAV rule record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// ingressInterface (IE 10), u32.
    InterfaceId,
    /// sourceIPv4Address (IE 8).
    Ipv4Prefix,
    /// sourceIPv6Address (IE 27).
    Ipv6Prefix,
    /// sourceIPv4PrefixLength (IE 9) or sourceIPv6PrefixLength (IE 29), u8.
    PrefixLen,
}

impl Field {
    /// Width of the field on the wire.
    pub const fn width(self) -> usize {
        match self {
            Field::InterfaceId => 4,
            Field::Ipv4Prefix => 4,
            Field::Ipv6Prefix => 16,
            Field::PrefixLen => 1,
        }
    }
}

/// Physical layout of one SAV rule record.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordLayout {
    template: SavTemplate,
    fields: [Field; 3],
}

impl RecordLayout {
    /// The sub-template this layout belongs to.
    pub const fn template(&self) -> SavTemplate {
        self.template
    }

    /// Fields in wire order.
    pub const fn fields(&self) -> &[Field; 3] {
        &self.fields
    }

    /// Total record size in bytes.
    pub const fn record_size(&self) -> usize {
        self.fields[0].width() + self.fields[1].width() + self.fields[2].width()
    }
}

static IPV4_INTERFACE_TO_PREFIX: RecordLayout = RecordLayout {
    template: SavTemplate::Ipv4InterfaceToPrefix,
    fields: [Field::InterfaceId, Field::Ipv4Prefix, Field::PrefixLen],
};

static IPV6_INTERFACE_TO_PREFIX: RecordLayout = RecordLayout {
    template: SavTemplate::Ipv6InterfaceToPrefix,
    fields: [Field::InterfaceId, Field::Ipv6Prefix, Field::PrefixLen],
};

static IPV4_PREFIX_TO_INTERFACE: RecordLayout = RecordLayout {
    template: SavTemplate::Ipv4PrefixToInterface,
    fields: [Field::Ipv4Prefix, Field::PrefixLen, Field::InterfaceId],
};

static IPV6_PREFIX_TO_INTERFACE: RecordLayout = RecordLayout {
    template: SavTemplate::Ipv6PrefixToInterface,
    fields: [Field::Ipv6Prefix, Field::PrefixLen, Field::InterfaceId],
};

/// Looks up the record layout for a wire template id.
///
/// # Errors
///
/// Returns [`SavError::UnsupportedTemplate`] for ids outside 901-904.
pub fn lookup_layout(template_id: u16) -> Result<&'static RecordLayout> {
    SavTemplate::from_id(template_id).map(SavTemplate::layout)
}

/// RFC 6313 list semantic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    NoneOf,
    ExactlyOneOf,
    OneOrMoreOf,
    AllOf,
    Ordered,
    Undefined,
    /// Value not assigned by RFC 6313, kept as received.
    Unassigned(u8),
}

impl Semantic {
    pub const fn value(self) -> u8 {
        match self {
            Semantic::NoneOf => 0x00,
            Semantic::ExactlyOneOf => 0x01,
            Semantic::OneOrMoreOf => 0x02,
            Semantic::AllOf => 0x03,
            Semantic::Ordered => 0x04,
            Semantic::Undefined => 0xff,
            Semantic::Unassigned(v) => v,
        }
    }
}

impl From<u8> for Semantic {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Semantic::NoneOf,
            0x01 => Semantic::ExactlyOneOf,
            0x02 => Semantic::OneOrMoreOf,
            0x03 => Semantic::AllOf,
            0x04 => Semantic::Ordered,
            0xff => Semantic::Undefined,
            other => Semantic::Unassigned(other),
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Semantic::NoneOf => write!(f, "noneOf"),
            Semantic::ExactlyOneOf => write!(f, "exactlyOneOf"),
            Semantic::OneOrMoreOf => write!(f, "oneOrMoreOf"),
            Semantic::AllOf => write!(f, "allOf"),
            Semantic::Ordered => write!(f, "ordered"),
            Semantic::Undefined => write!(f, "undefined"),
            Semantic::Unassigned(v) => write!(f, "unassigned(0x{:02x})", v),
        }
    }
}

/// Decoded subTemplateList header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTemplateHeader {
    pub semantic: Semantic,
    pub template: SavTemplate,
}

impl SubTemplateHeader {
    /// Wire template id.
    pub const fn template_id(&self) -> u16 {
        self.template.id()
    }
}

/// Reads the semantic byte and template id from the start of a
/// varlen-stripped subTemplateList.
///
/// # Errors
///
/// - [`SavError::InsufficientData`] if fewer than 3 bytes are available.
/// - [`SavError::UnsupportedTemplate`] if the template id is not 901-904.
pub fn read_header(content: &[u8]) -> Result<SubTemplateHeader> {
    if content.len() < HEADER_LEN {
        return Err(SavError::insufficient(HEADER_LEN, content.len()));
    }

    let semantic = Semantic::from(content[0]);
    let template = SavTemplate::from_id(BigEndian::read_u16(&content[1..HEADER_LEN]))?;

    Ok(SubTemplateHeader { semantic, template })
}

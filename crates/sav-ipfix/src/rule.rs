//! Decoded SAV rules and the single-record decoder.

use crate::error::{Result, SavError};
use crate::template::{Field, RecordLayout, SavTemplate};
use byteorder::{BigEndian, ReadBytesExt};
use std::fmt;
use std::io::{Cursor, Read};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Address bytes of a SAV rule.
///
/// The variant is chosen by the record layout that produced the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    /// IPv4 address in host byte order.
    V4(u32),
    /// IPv6 address as the 16 octets received on the wire.
    V6([u8; 16]),
}

impl Prefix {
    pub const fn is_ipv4(&self) -> bool {
        matches!(self, Prefix::V4(_))
    }

    pub const fn is_ipv6(&self) -> bool {
        matches!(self, Prefix::V6(_))
    }

    /// Maximum prefix length for the address family.
    pub const fn max_len(&self) -> u8 {
        match self {
            Prefix::V4(_) => 32,
            Prefix::V6(_) => 128,
        }
    }

    /// Converts to a standard library address.
    pub fn addr(&self) -> IpAddr {
        match *self {
            Prefix::V4(host_order) => IpAddr::V4(Ipv4Addr::from(host_order)),
            Prefix::V6(octets) => IpAddr::V6(Ipv6Addr::from(octets)),
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.addr().fmt(f)
    }
}

/// SAV validation mode carried by the enclosing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValidationMode {
    /// ACL-based.
    InterfaceToPrefix = 0,
    /// uRPF.
    PrefixToInterface = 1,
    /// BGP AS path.
    PrefixToAs = 2,
    /// BGP peer.
    InterfaceToAs = 3,
}

impl ValidationMode {
    /// Mode implied by a sub-template when the enclosing record carries none.
    pub const fn for_template(template: SavTemplate) -> Self {
        if template.is_interface_first() {
            ValidationMode::InterfaceToPrefix
        } else {
            ValidationMode::PrefixToInterface
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValidationMode::InterfaceToPrefix => "interface-to-prefix",
            ValidationMode::PrefixToInterface => "prefix-to-interface",
            ValidationMode::PrefixToAs => "prefix-to-as",
            ValidationMode::InterfaceToAs => "interface-to-as",
        }
    }
}

impl TryFrom<u8> for ValidationMode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0 => Ok(ValidationMode::InterfaceToPrefix),
            1 => Ok(ValidationMode::PrefixToInterface),
            2 => Ok(ValidationMode::PrefixToAs),
            3 => Ok(ValidationMode::InterfaceToAs),
            other => Err(other),
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded SAV rule.
///
/// `prefix_len` is stored exactly as received; use
/// [`SavRule::prefix_len_in_range`] to apply an address-family check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SavRule {
    pub interface_id: u32,
    pub prefix: Prefix,
    pub prefix_len: u8,
    pub validation_mode: u8,
}

impl SavRule {
    /// Returns the rule with `validation_mode` replaced.
    pub const fn with_validation_mode(mut self, validation_mode: u8) -> Self {
        self.validation_mode = validation_mode;
        self
    }

    /// Returns the validation mode if it is one of the known values.
    pub fn mode(&self) -> Option<ValidationMode> {
        ValidationMode::try_from(self.validation_mode).ok()
    }

    /// Returns true if `prefix_len` fits the address family (0-32 / 0-128).
    pub const fn prefix_len_in_range(&self) -> bool {
        self.prefix_len <= self.prefix.max_len()
    }
}

impl fmt::Display for SavRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interface={} prefix={}/{} mode={}",
            self.interface_id, self.prefix, self.prefix_len, self.validation_mode
        )
    }
}

/// Decodes one record laid out as `layout`. `record` must hold at least
/// `layout.record_size()` bytes; anything beyond is ignored.
pub(crate) fn decode_record(
    record: &[u8],
    layout: &RecordLayout,
    validation_mode: u8,
) -> Result<SavRule> {
    let size = layout.record_size();
    let truncated = || SavError::insufficient(size, record.len());

    let mut cursor = Cursor::new(record.get(..size).ok_or_else(truncated)?);
    let mut interface_id = 0;
    let mut prefix_len = 0;
    let mut prefix = if layout.template().is_ipv6() {
        Prefix::V6([0; 16])
    } else {
        Prefix::V4(0)
    };

    for field in layout.fields() {
        match field {
            Field::InterfaceId => {
                interface_id = cursor.read_u32::<BigEndian>().map_err(|_| truncated())?;
            }
            Field::Ipv4Prefix => {
                prefix = Prefix::V4(cursor.read_u32::<BigEndian>().map_err(|_| truncated())?);
            }
            Field::Ipv6Prefix => {
                let mut octets = [0u8; 16];
                cursor.read_exact(&mut octets).map_err(|_| truncated())?;
                prefix = Prefix::V6(octets);
            }
            Field::PrefixLen => {
                prefix_len = cursor.read_u8().map_err(|_| truncated())?;
            }
        }
    }

    Ok(SavRule {
        interface_id,
        prefix,
        prefix_len,
        validation_mode,
    })
}

/// Decodes a single SAV rule record.
///
/// `record` must be exactly the record size of `template_id` (9 bytes for
/// 901/903, 21 bytes for 902/904). The returned rule has `validation_mode`
/// 0; use [`SavRule::with_validation_mode`] to stamp the parent value.
///
/// # Errors
///
/// - [`SavError::UnsupportedTemplate`] for ids outside 901-904.
/// - [`SavError::InvalidArgument`] for an empty or oversized record.
/// - [`SavError::InsufficientData`] for a short record.
///
/// # Examples
///
/// ```
/// use sav_ipfix::decode_sav_rule;
///
/// let record = [0, 0, 0, 1, 192, 168, 0, 1, 24];
/// let rule = decode_sav_rule(&record, 901).unwrap();
/// assert_eq!(rule.interface_id, 1);
/// assert_eq!(rule.to_string(), "interface=1 prefix=192.168.0.1/24 mode=0");
/// ```
pub fn decode_sav_rule(record: &[u8], template_id: u16) -> Result<SavRule> {
    let layout = SavTemplate::from_id(template_id)?.layout();
    let size = layout.record_size();

    if record.is_empty() {
        return Err(SavError::invalid_argument("empty SAV rule record"));
    }
    if record.len() > size {
        return Err(SavError::invalid_argument(format!(
            "SAV rule record for template {} is {} bytes, expected {}",
            template_id,
            record.len(),
            size
        )));
    }

    decode_record(record, layout, 0)
}

/// Renders a rule as `interface=<id> prefix=<addr>/<len> mode=<mode>`.
///
/// Templates 901/903 render the address dotted-quad, 902/904 colon-hex.
/// The address text always follows the rule's own prefix variant; a
/// template id from the other family is only noted at debug level.
pub fn format_sav_rule(rule: &SavRule, template_id: u16) -> String {
    match SavTemplate::from_id(template_id) {
        Ok(template) if template.is_ipv6() != rule.prefix.is_ipv6() => {
            tracing::debug!(
                template_id,
                interface_id = rule.interface_id,
                "SAV rule address family differs from template"
            );
        }
        Err(_) => {
            tracing::debug!(template_id, "Formatting SAV rule for unknown template");
        }
        Ok(_) => {}
    }

    rule.to_string()
}

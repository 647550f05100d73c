//! Outer SAV record.
//!
//! An SAV data record wraps the rule list in a descriptor:
//!
//! - savRuleType (u8): allowlist / blocklist
//! - savTargetType (u8): interface-based / prefix-based
//! - savMatchedContentList (subTemplateList)
//! - savPolicyAction (u8): permit / discard / rate-limit / redirect
//!
//! Field values arrive already split out by the IPFIX collector library as
//! `(information element id, bytes)` pairs, with varlen prefixes stripped.
//! The element ids come from [`InfoElementIds`].

use crate::config::{DecoderConfig, InfoElementIds};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{Result, SavError};
use crate::list::{DecodedList, ListDecoder};
use crate::rule::ValidationMode;
use crate::template::read_header;
use std::fmt;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Value not known to this decoder, kept as received.
            Unknown(u8),
        }

        impl $name {
            pub const fn value(self) -> u8 {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unknown(v) => v,
                }
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($name::$variant => f.write_str($text),)+
                    $name::Unknown(v) => write!(f, "unknown({})", v),
                }
            }
        }
    };
}

wire_enum! {
    /// savRuleType
    RuleType {
        Allowlist = 0 => "allowlist",
        Blocklist = 1 => "blocklist",
    }
}

wire_enum! {
    /// savTargetType
    TargetType {
        InterfaceBased = 0 => "interface-based",
        PrefixBased = 1 => "prefix-based",
    }
}

wire_enum! {
    /// savPolicyAction
    PolicyAction {
        Permit = 0 => "permit",
        Discard = 1 => "discard",
        RateLimit = 2 => "rate-limit",
        Redirect = 3 => "redirect",
    }
}

/// A decoded outer SAV record with its rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavDescriptor {
    pub rule_type: RuleType,
    pub target_type: TargetType,
    pub policy_action: PolicyAction,
    /// Mode stamped on every rule, explicit or implied by the sub-template.
    pub validation_mode: u8,
    pub match_count: Option<u8>,
    pub list: DecodedList,
}

/// Decodes outer SAV records using configured information element ids.
#[derive(Debug, Clone)]
pub struct DescriptorDecoder<S = TracingSink> {
    ids: InfoElementIds,
    list: ListDecoder<S>,
}

impl DescriptorDecoder<TracingSink> {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            ids: config.info_elements.clone(),
            list: ListDecoder::from_config(config),
        }
    }
}

impl<S: DiagnosticSink> DescriptorDecoder<S> {
    /// Replaces the diagnostic sink.
    pub fn with_sink<T: DiagnosticSink>(self, sink: T) -> DescriptorDecoder<T> {
        DescriptorDecoder {
            ids: self.ids,
            list: self.list.with_sink(sink),
        }
    }

    pub fn sink(&self) -> &S {
        self.list.sink()
    }

    /// Decodes one outer record from its field values.
    ///
    /// Fields with ids not configured for SAV are ignored. If an id appears
    /// more than once the first occurrence is used.
    ///
    /// # Errors
    ///
    /// - [`SavError::MissingField`] if a required field is absent.
    /// - [`SavError::InvalidField`] if a scalar field is not 1 byte, or the
    ///   list is longer than 65535 bytes.
    /// - Any error from [`ListDecoder::decode`].
    pub fn decode(&self, fields: &[(u16, &[u8])]) -> Result<SavDescriptor> {
        let rule_type = self.scalar(fields, self.ids.rule_type, "savRuleType")?;
        let target_type = self.scalar(fields, self.ids.target_type, "savTargetType")?;
        let policy_action = self.scalar(fields, self.ids.policy_action, "savPolicyAction")?;

        let content = find(fields, self.ids.matched_content)
            .ok_or(SavError::MissingField("savMatchedContentList"))?;
        let content_len = u16::try_from(content.len()).map_err(|_| SavError::InvalidField {
            field: "savMatchedContentList",
            len: content.len(),
        })?;

        let validation_mode = match self.optional_scalar(
            fields,
            self.ids.validation_mode,
            "savValidationMode",
        )? {
            Some(mode) => mode,
            // header errors resurface from the list decode below
            None => read_header(content)
                .map(|header| ValidationMode::for_template(header.template).value())
                .unwrap_or_default(),
        };

        let match_count = self.optional_scalar(fields, self.ids.match_count, "savMatchCount")?;
        let list = self.list.decode(content, content_len, validation_mode)?;

        if let Some(declared) = match_count {
            if usize::from(declared) != list.len() {
                self.list.sink().report(&Diagnostic::MatchCountMismatch {
                    declared,
                    decoded: list.len(),
                });
            }
        }

        Ok(SavDescriptor {
            rule_type: RuleType::from(rule_type),
            target_type: TargetType::from(target_type),
            policy_action: PolicyAction::from(policy_action),
            validation_mode,
            match_count,
            list,
        })
    }

    fn scalar(&self, fields: &[(u16, &[u8])], ie: u16, name: &'static str) -> Result<u8> {
        self.optional_scalar(fields, Some(ie), name)?
            .ok_or(SavError::MissingField(name))
    }

    fn optional_scalar(
        &self,
        fields: &[(u16, &[u8])],
        ie: Option<u16>,
        name: &'static str,
    ) -> Result<Option<u8>> {
        let Some(value) = ie.and_then(|ie| find(fields, ie)) else {
            return Ok(None);
        };

        match value {
            [byte] => Ok(Some(*byte)),
            other => Err(SavError::InvalidField {
                field: name,
                len: other.len(),
            }),
        }
    }
}

fn find<'a>(fields: &[(u16, &'a [u8])], ie: u16) -> Option<&'a [u8]> {
    fields
        .iter()
        .find(|(id, _)| *id == ie)
        .map(|(_, value)| *value)
}

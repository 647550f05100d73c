//! subTemplateList iteration.
//!
//! The decoder receives list content with the RFC 7011 varlen prefix already
//! stripped, as handed over by an IPFIX collector library:
//!
//! ```text
//! [semantic:1][template_id:2][record]*N
//! ```
//!
//! [`ListDecoder::decode_prefixed`] covers callers that still hold the varlen
//! prefix. A decode either returns every rule of the list or an error; partial
//! lists are never returned.

use crate::config::{DecoderConfig, TrailingBytesPolicy};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{Result, SavError};
use crate::rule::{SavRule, decode_record};
use crate::template::{HEADER_LEN, SubTemplateHeader, lookup_layout, read_header};
use crate::varlen::decode_varlen;
use tracing::instrument;

/// Rules decoded from one subTemplateList.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedList {
    pub header: SubTemplateHeader,
    pub rules: Vec<SavRule>,
}

impl DecodedList {
    /// Sub-template id that tagged the list.
    pub const fn template_id(&self) -> u16 {
        self.header.template_id()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Splits into the rule sequence and the template id.
    pub fn into_parts(self) -> (Vec<SavRule>, u16) {
        let template_id = self.template_id();
        (self.rules, template_id)
    }
}

/// Configurable subTemplateList decoder.
///
/// Holds no per-call state; one decoder can serve any number of threads.
#[derive(Debug, Clone)]
pub struct ListDecoder<S = TracingSink> {
    policy: TrailingBytesPolicy,
    sink: S,
}

impl Default for ListDecoder<TracingSink> {
    fn default() -> Self {
        Self::new(TrailingBytesPolicy::default())
    }
}

impl ListDecoder<TracingSink> {
    /// Creates a decoder reporting diagnostics through `tracing`.
    pub fn new(policy: TrailingBytesPolicy) -> Self {
        Self {
            policy,
            sink: TracingSink,
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(config.trailing_bytes)
    }
}

impl<S: DiagnosticSink> ListDecoder<S> {
    /// Replaces the diagnostic sink.
    pub fn with_sink<T: DiagnosticSink>(self, sink: T) -> ListDecoder<T> {
        ListDecoder {
            policy: self.policy,
            sink,
        }
    }

    pub fn policy(&self) -> TrailingBytesPolicy {
        self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decodes a varlen-stripped subTemplateList.
    ///
    /// `content_len` is the declared list length including the 3-byte
    /// header. Bytes beyond it are ignored; a buffer shorter than it fails.
    /// Every rule is stamped with `validation_mode`.
    ///
    /// # Errors
    ///
    /// - [`SavError::InvalidArgument`] for an empty buffer.
    /// - [`SavError::InsufficientData`] if the buffer is shorter than
    ///   `content_len` or `content_len` cannot hold the header.
    /// - [`SavError::UnsupportedTemplate`] for template ids outside 901-904.
    /// - [`SavError::TrailingBytes`] under [`TrailingBytesPolicy::Strict`]
    ///   when the records do not fill the content exactly.
    #[instrument(level = "trace", skip(self, content), fields(len = content.len()))]
    pub fn decode(
        &self,
        content: &[u8],
        content_len: u16,
        validation_mode: u8,
    ) -> Result<DecodedList> {
        if content.is_empty() {
            return Err(SavError::invalid_argument("empty subTemplateList"));
        }

        let declared = usize::from(content_len);
        let content = content
            .get(..declared)
            .ok_or_else(|| SavError::insufficient(declared, content.len()))?;

        let header = read_header(content)?;
        let rules = self.decode_records(&content[HEADER_LEN..], header, validation_mode)?;

        Ok(DecodedList { header, rules })
    }

    /// Decodes a subTemplateList that still starts with its varlen prefix.
    pub fn decode_prefixed(&self, buf: &[u8], validation_mode: u8) -> Result<DecodedList> {
        if buf.is_empty() {
            return Err(SavError::invalid_argument("empty subTemplateList"));
        }

        let mut cursor = buf;
        let content_len = decode_varlen(&mut cursor)?;
        self.decode(cursor, content_len, validation_mode)
    }

    fn decode_records(
        &self,
        payload: &[u8],
        header: SubTemplateHeader,
        validation_mode: u8,
    ) -> Result<Vec<SavRule>> {
        let layout = lookup_layout(header.template_id())?;
        let record_size = layout.record_size();
        let count = payload.len() / record_size;
        let remainder = payload.len() % record_size;

        if remainder != 0 {
            if self.policy == TrailingBytesPolicy::Strict {
                return Err(SavError::TrailingBytes {
                    remainder,
                    record_size,
                });
            }

            if count == 0 {
                self.sink.report(&Diagnostic::EmptyList {
                    template: header.template,
                    content_len: payload.len(),
                });
                return Ok(Vec::new());
            }
        }

        let mut rules = Vec::with_capacity(count);
        for record in payload.chunks_exact(record_size) {
            rules.push(decode_record(record, layout, validation_mode)?);
        }

        if remainder != 0 {
            self.sink.report(&Diagnostic::TrailingBytes {
                template: header.template,
                remainder,
                record_size,
                decoded: rules.len(),
            });
        }

        self.sink.report(&Diagnostic::ListDecoded {
            semantic: header.semantic,
            template: header.template,
            count: rules.len(),
        });

        Ok(rules)
    }
}

/// Decodes a varlen-stripped subTemplateList with the default lenient
/// decoder.
///
/// # Examples
///
/// ```
/// use sav_ipfix::decode_sav_sub_template_list;
///
/// let content = [
///     0x03, 0x03, 0x85, // allOf, template 901
///     0, 0, 0, 1, 192, 0, 2, 0, 24,
/// ];
/// let list = decode_sav_sub_template_list(&content, content.len() as u16, 0).unwrap();
/// assert_eq!(list.template_id(), 901);
/// assert_eq!(list.rules[0].to_string(), "interface=1 prefix=192.0.2.0/24 mode=0");
/// ```
pub fn decode_sav_sub_template_list(
    content: &[u8],
    content_len: u16,
    validation_mode: u8,
) -> Result<DecodedList> {
    ListDecoder::default().decode(content, content_len, validation_mode)
}

/// Decodes a subTemplateList still carrying its varlen prefix with the
/// default lenient decoder.
pub fn decode_varlen_prefixed_list(buf: &[u8], validation_mode: u8) -> Result<DecodedList> {
    ListDecoder::default().decode_prefixed(buf, validation_mode)
}

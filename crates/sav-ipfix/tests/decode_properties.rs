//! Integration tests for SAV subTemplateList decoding
//!
//! Builds wire buffers for every sub-template and checks the decoder end to
//! end through the public API.

use pretty_assertions::assert_eq;
use sav_ipfix::{
    CollectingSink, DecoderConfig, DescriptorDecoder, Diagnostic, ErrorKind, ListDecoder, Prefix,
    SavError, SavRule, SavTemplate, TrailingBytesPolicy, decode_sav_rule,
    decode_sav_sub_template_list, decode_varlen, decode_varlen_prefixed_list, format_sav_rule,
};
use std::sync::Once;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Encodes one rule in the wire order of `template`.
fn encode_rule(template: SavTemplate, iface: u32, prefix: &Prefix, plen: u8) -> Vec<u8> {
    let prefix_bytes = match prefix {
        Prefix::V4(addr) => addr.to_be_bytes().to_vec(),
        Prefix::V6(octets) => octets.to_vec(),
    };

    let mut out = Vec::new();
    if template.is_interface_first() {
        out.extend_from_slice(&iface.to_be_bytes());
        out.extend_from_slice(&prefix_bytes);
        out.push(plen);
    } else {
        out.extend_from_slice(&prefix_bytes);
        out.push(plen);
        out.extend_from_slice(&iface.to_be_bytes());
    }
    out
}

fn sample_prefix(template: SavTemplate, i: u32) -> Prefix {
    if template.is_ipv6() {
        let mut octets = [0u8; 16];
        octets[0] = 0x20;
        octets[1] = 0x01;
        octets[2] = 0x0d;
        octets[3] = 0xb8;
        octets[12..].copy_from_slice(&i.to_be_bytes());
        Prefix::V6(octets)
    } else {
        Prefix::V4(0x0a00_0000 | i)
    }
}

fn build_list(template: SavTemplate, count: u32) -> Vec<u8> {
    let mut buf = vec![0x03];
    buf.extend_from_slice(&template.id().to_be_bytes());
    for i in 0..count {
        let plen = if template.is_ipv6() { 64 } else { 24 };
        buf.extend_from_slice(&encode_rule(
            template,
            i + 1,
            &sample_prefix(template, i),
            plen,
        ));
    }
    buf
}

#[test]
fn test_record_count_for_every_template() {
    init_tracing();

    for template in SavTemplate::ALL {
        for k in [0u32, 1, 5, 100] {
            let buf = build_list(template, k);
            let record_size = template.layout().record_size();
            assert_eq!(buf.len(), 3 + k as usize * record_size);

            let list = decode_sav_sub_template_list(&buf, buf.len() as u16, 0).unwrap();
            assert_eq!(list.len(), k as usize, "template {} k={}", template, k);
            assert_eq!(list.template_id(), template.id());

            for (i, rule) in list.rules.iter().enumerate() {
                assert_eq!(rule.interface_id, i as u32 + 1);
                assert_eq!(rule.prefix, sample_prefix(template, i as u32));
            }
        }
    }
}

#[test]
fn test_decoding_is_idempotent() {
    let buf = build_list(SavTemplate::Ipv6PrefixToInterface, 5);
    let first = decode_sav_sub_template_list(&buf, buf.len() as u16, 3).unwrap();
    let second = decode_sav_sub_template_list(&buf, buf.len() as u16, 3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_field_order_901_vs_903() {
    let list_901 = [
        0x03, 0x03, 0x85, 0x00, 0x00, 0x00, 0x01, 0xc0, 0xa8, 0x00, 0x01, 24,
    ];
    let list_903 = [
        0x03, 0x03, 0x87, 0xc0, 0xa8, 0x00, 0x01, 24, 0x00, 0x00, 0x00, 0x01,
    ];

    let a = decode_sav_sub_template_list(&list_901, 12, 0).unwrap();
    let b = decode_sav_sub_template_list(&list_903, 12, 0).unwrap();

    let expected = SavRule {
        interface_id: 1,
        prefix: Prefix::V4(0xc0a8_0001),
        prefix_len: 24,
        validation_mode: 0,
    };
    assert_eq!(a.rules, vec![expected]);
    assert_eq!(b.rules, vec![expected]);
    assert_eq!(a.rules[0].prefix.to_string(), "192.168.0.1");
}

#[test]
fn test_varlen_boundary() {
    let short = [254u8];
    let mut cursor = &short[..];
    assert_eq!(decode_varlen(&mut cursor).unwrap(), 254);

    let long = [255u8, 0x01, 0x02];
    let mut cursor = &long[..];
    assert_eq!(decode_varlen(&mut cursor).unwrap(), 0x0102);
}

#[test]
fn test_unknown_template_rejected() {
    let mut buf = vec![0x03];
    buf.extend_from_slice(&999u16.to_be_bytes());
    buf.extend_from_slice(&[0u8; 9]);

    let err = decode_sav_sub_template_list(&buf, buf.len() as u16, 0).unwrap_err();
    assert!(matches!(err, SavError::UnsupportedTemplate(999)));
    assert_eq!(err.kind(), ErrorKind::UnsupportedTemplate);
}

#[test]
fn test_truncated_list() {
    let buf = build_list(SavTemplate::Ipv4InterfaceToPrefix, 1);

    // declared 9 content bytes after the header, only 5 present
    let err = decode_sav_sub_template_list(&buf[..8], 12, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);

    let err = decode_sav_rule(&buf[3..8], 901).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[test]
fn test_ipv6_octets_are_opaque() {
    let mut octets = [0u8; 16];
    octets[0] = 0xfe;
    octets[1] = 0x80;
    octets[14] = 0xab;
    octets[15] = 0xcd;

    let mut buf = vec![0x03, 0x03, 0x86];
    buf.extend_from_slice(&encode_rule(
        SavTemplate::Ipv6InterfaceToPrefix,
        4,
        &Prefix::V6(octets),
        10,
    ));

    let list = decode_sav_sub_template_list(&buf, buf.len() as u16, 0).unwrap();
    assert_eq!(list.rules[0].prefix, Prefix::V6(octets));
    assert_eq!(
        format_sav_rule(&list.rules[0], 902),
        "interface=4 prefix=fe80::abcd/10 mode=0"
    );
}

#[test]
fn test_prefixed_buffer_matches_stripped() {
    let content = build_list(SavTemplate::Ipv4PrefixToInterface, 3);
    let mut prefixed = vec![content.len() as u8];
    prefixed.extend_from_slice(&content);

    let stripped = decode_sav_sub_template_list(&content, content.len() as u16, 1).unwrap();
    let from_prefixed = decode_varlen_prefixed_list(&prefixed, 1).unwrap();
    assert_eq!(stripped, from_prefixed);
}

#[test]
fn test_strict_policy_from_config() {
    init_tracing();

    let config = DecoderConfig::from_toml_str(r#"trailing_bytes = "strict""#).unwrap();
    let mut buf = build_list(SavTemplate::Ipv6InterfaceToPrefix, 2);
    buf.extend_from_slice(&[0u8; 20]);

    let strict = ListDecoder::from_config(&config).with_sink(CollectingSink::new());
    let err = strict.decode(&buf, buf.len() as u16, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TrailingBytes);
    assert!(strict.sink().events().is_empty());

    let lenient = ListDecoder::new(TrailingBytesPolicy::Lenient).with_sink(CollectingSink::new());
    let list = lenient.decode(&buf, buf.len() as u16, 0).unwrap();
    assert_eq!(list.len(), 2);
    assert!(lenient.sink().events().contains(&Diagnostic::TrailingBytes {
        template: SavTemplate::Ipv6InterfaceToPrefix,
        remainder: 20,
        record_size: 21,
        decoded: 2,
    }));
}

#[test]
fn test_failed_decode_does_not_affect_next_call() {
    let decoder = ListDecoder::default().with_sink(CollectingSink::new());
    let good = build_list(SavTemplate::Ipv4InterfaceToPrefix, 2);

    assert!(decoder.decode(&good[..4], good.len() as u16, 0).is_err());
    let list = decoder.decode(&good, good.len() as u16, 0).unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn test_descriptor_end_to_end() {
    init_tracing();

    let content = build_list(SavTemplate::Ipv4InterfaceToPrefix, 3);
    let fields: [(u16, &[u8]); 4] = [
        (500, &[0]),
        (501, &[0]),
        (502, content.as_slice()),
        (503, &[1]),
    ];

    let descriptor = DescriptorDecoder::new(&DecoderConfig::default())
        .with_sink(CollectingSink::new())
        .decode(&fields)
        .unwrap();

    assert_eq!(descriptor.list.len(), 3);
    assert_eq!(descriptor.policy_action.to_string(), "discard");
    assert!(descriptor.list.rules.iter().all(|r| r.validation_mode == 0));
    assert_eq!(
        descriptor.list.rules[2].to_string(),
        "interface=3 prefix=10.0.0.2/24 mode=0"
    );
}

#[test]
fn test_decoder_shared_across_threads() {
    let decoder = std::sync::Arc::new(ListDecoder::default());
    let buf = std::sync::Arc::new(build_list(SavTemplate::Ipv6PrefixToInterface, 10));

    let handles: Vec<_> = (0..4)
        .map(|mode| {
            let decoder = decoder.clone();
            let buf = buf.clone();
            std::thread::spawn(move || decoder.decode(&buf, buf.len() as u16, mode).unwrap())
        })
        .collect();

    for (mode, handle) in handles.into_iter().enumerate() {
        let list = handle.join().unwrap();
        assert_eq!(list.len(), 10);
        assert!(list.rules.iter().all(|r| usize::from(r.validation_mode) == mode));
    }
}

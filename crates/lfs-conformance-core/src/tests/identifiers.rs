// crates/lfs-conformance-core/src/tests/identifiers.rs
// ============================================================================
// Module: Identifier Source Tests
// Description: Unit tests for identifier synthesis and newline parsing.
// Purpose: Pin determinism, hash chaining, and line-handling rules.
// Dependencies: lfs-conformance-core identifiers module, sha2
// ============================================================================

//! ## Overview
//! Verifies synthesized identifiers are reproducible, chained through a
//! running SHA-256 state, and that newline parsing trims and preserves order.

use std::collections::BTreeSet;
use std::io::Cursor;

use sha2::Digest;
use sha2::Sha256;

use crate::identifiers::ContentId;
use crate::identifiers::DEFAULT_IDENTIFIER_COUNT;
use crate::identifiers::IdentifierSource;
use crate::identifiers::hex_encode;
use crate::identifiers::parse_identifiers;
use crate::identifiers::synthesize_identifiers;

fn is_lower_hex(value: &str) -> bool {
    value.bytes().all(|byte| byte.is_ascii_digit() || (b'a' ..= b'f').contains(&byte))
}

#[test]
fn synthesis_is_deterministic_for_a_count() {
    let first = synthesize_identifiers(DEFAULT_IDENTIFIER_COUNT);
    let second = synthesize_identifiers(DEFAULT_IDENTIFIER_COUNT);
    assert_eq!(first, second);
}

#[test]
fn synthesis_produces_count_identifiers_per_list() {
    let set = synthesize_identifiers(DEFAULT_IDENTIFIER_COUNT);
    assert_eq!(set.present().len(), DEFAULT_IDENTIFIER_COUNT);
    assert_eq!(set.missing().len(), DEFAULT_IDENTIFIER_COUNT);
}

#[test]
fn synthesized_identifiers_are_sha256_hex() {
    let set = synthesize_identifiers(DEFAULT_IDENTIFIER_COUNT);
    for id in set.present().iter().chain(set.missing()) {
        assert_eq!(id.as_str().len(), 64, "{id}");
        assert!(is_lower_hex(id.as_str()), "{id}");
    }
}

#[test]
fn synthesized_lists_are_disjoint_and_unique() {
    let set = synthesize_identifiers(DEFAULT_IDENTIFIER_COUNT);
    let all: BTreeSet<&ContentId> = set.present().iter().chain(set.missing()).collect();
    assert_eq!(all.len(), DEFAULT_IDENTIFIER_COUNT * 2);
}

#[test]
fn synthesis_chains_one_byte_per_identifier() {
    let set = synthesize_identifiers(1);
    let first = &set.present()[0];
    let byte = (0 ..= u8::MAX)
        .find(|byte| hex_encode(&Sha256::digest([*byte])) == first.as_str())
        .expect("first identifier is the digest of a single byte");
    let second = &set.missing()[0];
    let chained = (0 ..= u8::MAX)
        .any(|next| hex_encode(&Sha256::digest([byte, next])) == second.as_str());
    assert!(chained, "second identifier extends the running hash by one byte");
}

#[test]
fn synthesis_matches_pinned_digests_for_default_count() {
    let set = synthesize_identifiers(DEFAULT_IDENTIFIER_COUNT);
    assert_eq!(
        set.present()[0].as_str(),
        "ca41841c5c98e34f4a3ae83d9220940395301a9616f69d6672b04ea322f28eb0"
    );
    assert_eq!(
        set.missing()[0].as_str(),
        "74dc2fe1ad7fe55ef44cf3eb85cb897a450cae3b5cdcda160dc08496745284f5"
    );
    assert_eq!(
        set.present()[49].as_str(),
        "18a4c5423a26ac126afcf0b5207700293c6b8a9a66de198fe0a98e412dccdff4"
    );
    assert_eq!(
        set.missing()[49].as_str(),
        "35f26e2de87cea4a3de044e5424af97e7b21e754c3c5c0492303c38dc0b6931a"
    );
}

#[test]
fn synthesis_matches_pinned_digests_for_small_count() {
    let set = synthesize_identifiers(2);
    let present: Vec<&str> = set.present().iter().map(ContentId::as_str).collect();
    let missing: Vec<&str> = set.missing().iter().map(ContentId::as_str).collect();
    assert_eq!(
        present,
        [
            "5a0ec31daa84fa27666da56af259b9351086bba0b9ab4aa6007e3e6fb1866b47",
            "de51041c6fe4f3fe3f3912903081d2e440987381f00b9e5e0db1b5429c17a131",
        ]
    );
    assert_eq!(
        missing,
        [
            "3865d5ebbfc18b440130996be95a63f683a72e02e1401e7a85883d4978764728",
            "ac2ed3048b049f3ef804c8ea0cd5d0b9533b3117dc5c005e680838be4b59bd79",
        ]
    );
}

#[test]
fn synthesis_of_zero_is_empty() {
    let set = synthesize_identifiers(0);
    assert!(set.present().is_empty());
    assert!(set.missing().is_empty());
}

#[test]
fn parse_trims_and_preserves_order() {
    let input = "  aaa\t\nbbb  \r\nccc\n";
    let ids = parse_identifiers(Cursor::new(input)).expect("parse");
    let values: Vec<&str> = ids.iter().map(ContentId::as_str).collect();
    assert_eq!(values, ["aaa", "bbb", "ccc"]);
}

#[test]
fn parse_keeps_blank_lines_as_empty_identifiers() {
    let ids = parse_identifiers(Cursor::new("aaa\n\n  \nbbb\n")).expect("parse");
    let values: Vec<&str> = ids.iter().map(ContentId::as_str).collect();
    assert_eq!(values, ["aaa", "", "", "bbb"]);
}

#[test]
fn parse_keeps_non_blank_unterminated_last_line() {
    let ids = parse_identifiers(Cursor::new("aaa\nbbb")).expect("parse");
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1].as_str(), "bbb");
}

#[test]
fn parse_drops_blank_unterminated_tail() {
    let ids = parse_identifiers(Cursor::new("aaa\n   ")).expect("parse");
    assert_eq!(ids.len(), 1);
}

#[test]
fn parse_empty_input_yields_nothing() {
    let ids = parse_identifiers(Cursor::new("")).expect("parse");
    assert!(ids.is_empty());
}

#[test]
fn parse_rejects_invalid_utf8() {
    let bytes: &[u8] = &[0xff, 0xfe, b'\n'];
    assert!(parse_identifiers(Cursor::new(bytes)).is_err());
}

#[test]
fn only_synthetic_sources_require_setup() {
    let synthetic = IdentifierSource::Synthetic {
        count: 2,
    };
    let files = IdentifierSource::Files {
        present: "present.txt".into(),
        missing: "missing.txt".into(),
    };
    assert!(synthetic.requires_setup());
    assert!(!files.requires_setup());
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use umlpress::{encode, Framing, RenderHost, TokenEncoder};

const FIXTURES: [&str; 4] =
    ["sequence_hello.puml", "class_diagram.puml", "cyrillic_labels.puml", "activity_long.puml"];

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join("plantuml")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path:?}: {err}"))
}

// Written against the wire format alone (substitution, padding, inflate) so it does not
// share code with the crate's own decoder.
fn reference_decode(token: &str, framing: Framing) -> Vec<u8> {
    let payload = token.strip_prefix("~1").unwrap_or_else(|| panic!("{token} lacks ~1"));
    let mut standard = payload.replace('-', "+").replace('_', "/");
    while standard.len() % 4 != 0 {
        standard.push('=');
    }
    let compressed = STANDARD.decode(standard).expect("standard base64");

    let mut out = Vec::new();
    let inflated = match framing {
        Framing::Raw => DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut out),
        Framing::Zlib => ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut out),
    };
    inflated.expect("inflate");
    out
}

#[test]
fn fixtures_round_trip_through_reference_decoder() {
    for framing in [Framing::Raw, Framing::Zlib] {
        let encoder = TokenEncoder::new(framing);
        for name in FIXTURES {
            let source = read_fixture(name);
            let token = encoder.encode(&source).unwrap_or_else(|err| {
                panic!("expected {name} to encode with {framing} framing, got error: {err}")
            });
            assert_eq!(
                reference_decode(token.as_str(), framing),
                source.as_bytes(),
                "{name} did not round-trip with {framing} framing"
            );
        }
    }
}

#[test]
fn fixtures_decode_with_crate_decoder() {
    for name in FIXTURES {
        let source = read_fixture(name);
        let token = encode(&source).expect("encode");
        assert_eq!(umlpress::decode(token.as_str()).expect("decode"), source, "{name}");
    }
}

#[test]
fn cyrillic_fixture_is_encoded_as_utf8_bytes() {
    let source = read_fixture("cyrillic_labels.puml");
    assert!(source.len() > source.chars().count(), "fixture should contain multi-byte text");

    let token = encode(&source).expect("encode");
    let bytes = reference_decode(token.as_str(), Framing::Raw);
    assert_eq!(String::from_utf8(bytes).expect("utf-8"), source);
}

#[test]
fn compression_shrinks_repetitive_diagrams() {
    let source = read_fixture("activity_long.puml").repeat(8);
    let token = encode(&source).expect("encode");
    assert!(
        token.as_str().len() < source.len(),
        "token ({}) should be shorter than source ({})",
        token.as_str().len(),
        source.len()
    );
}

#[test]
fn batch_encoding_matches_single_encoding() {
    let sources = FIXTURES.iter().map(|name| read_fixture(name)).collect::<Vec<_>>();
    let batch = TokenEncoder::default().encode_all(&sources);
    for (source, token) in sources.iter().zip(batch) {
        assert_eq!(token.expect("batch encode"), encode(source).expect("encode"));
    }
}

#[test]
fn render_urls_embed_token_verbatim() {
    let source = read_fixture("sequence_hello.puml");
    let token = encode(&source).expect("encode");
    let urls = RenderHost::default().urls(&token);

    assert_eq!(urls.image_url, format!("https://www.plantuml.com/plantuml/png/{token}"));
    assert_eq!(urls.svg_url, format!("https://www.plantuml.com/plantuml/svg/{token}"));
    assert_eq!(urls.image_url.rsplit('/').next(), Some(token.as_str()));
}

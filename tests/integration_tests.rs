//! Integration tests for Inscrypt
//!
//! Every failure is a tagged error: a wrong password or a wrong layer order
//! never comes back as silently wrong plaintext.

mod common;

use std::fs;

use common::{config, png_cover, wav_cover, y4m_cover};
use inscrypt::{
    capacity, embed, embed_with_options, extract, extract_with_options, required_bits,
    CancelToken, Codebook, ConfigSource, ContentKind, EmbedState, EmbeddedArtifact, ErrorKind,
    ExtractState, InscryptError, PipelineOptions, SecretPayload, Settings,
};
use tempfile::TempDir;

/// Text secret, one cipher layer, both ways of supplying the configuration.
#[test]
fn test_hello_single_layer_image() {
    let cover = png_cover(32, 32);
    let cfg = config("aes-256-gcm", "sha256", "image-lsb");
    assert!(capacity(&cover, &cfg).unwrap() >= 64);

    let (artifact, codebook) =
        embed(&cover, &SecretPayload::text("hello"), "correct-horse", &cfg).unwrap();
    codebook.verify().unwrap();

    let manual = extract(&artifact, "correct-horse", ConfigSource::Manual(&cfg)).unwrap();
    assert_eq!(manual.as_text().unwrap(), "hello");
    assert_eq!(manual.kind(), ContentKind::Text);

    let json = codebook.to_json().unwrap();
    let replayed =
        extract(&artifact, "correct-horse", ConfigSource::Codebook(json.as_bytes())).unwrap();
    assert_eq!(replayed.as_text().unwrap(), "hello");
}

/// Three stacked layers round-trip on every media category.
#[test]
fn test_hello_three_layers_all_media() {
    let covers = [
        (png_cover(40, 40), "image-lsb2"),
        (wav_cover(8000), "audio-lsb"),
        (y4m_cover(32, 16, 4), "video-lsb"),
    ];

    for (cover, technique) in covers {
        let cfg = config(
            "aes-256-gcm,chacha20-poly1305,xchacha20-poly1305",
            "blake2b",
            technique,
        );
        let (artifact, _) =
            embed(&cover, &SecretPayload::text("hello"), "correct-horse", &cfg).unwrap();
        assert_eq!(artifact.category(), cover.category());

        let secret = extract(&artifact, "correct-horse", ConfigSource::Manual(&cfg)).unwrap();
        assert_eq!(secret.as_text().unwrap(), "hello", "technique {}", technique);
    }
}

/// Artifacts survive being written out and sniffed back from raw bytes.
#[test]
fn test_artifact_redetected_from_bytes() {
    let cover = wav_cover(4000);
    let cfg = config("aes-128-gcm", "sha3-256", "audio-parity");

    let (artifact, _) = embed(&cover, &SecretPayload::text("on the wire"), "pw", &cfg).unwrap();
    assert_eq!(artifact.extension(), "wav");

    let reread = EmbeddedArtifact::detect(artifact.into_bytes()).unwrap();
    let secret = extract(&reread, "pw", ConfigSource::Manual(&cfg)).unwrap();
    assert_eq!(secret.as_text().unwrap(), "on the wire");
}

/// File secrets keep their name and exact bytes.
#[test]
fn test_file_secret_roundtrip() {
    let cover = png_cover(64, 64);
    let cfg = config("xchacha20-poly1305,aes-256-gcm-siv", "shake256", "image-lsb");
    let data: Vec<u8> = (0..700u32).map(|i| (i * 31 % 251) as u8).collect();

    let (artifact, _) = embed(
        &cover,
        &SecretPayload::file("notes.bin", data.clone()),
        "s3cret",
        &cfg,
    )
    .unwrap();

    let secret = extract(&artifact, "s3cret", ConfigSource::Manual(&cfg)).unwrap();
    assert_eq!(secret.kind(), ContentKind::File);
    assert_eq!(secret.name(), Some("notes.bin"));
    assert_eq!(secret.as_bytes(), data.as_slice());
}

/// Repetitive text is compressed before encryption.
#[test]
fn test_compressible_secret_needs_fewer_bits() {
    let cfg = config("aes-256-gcm", "sha256", "image-lsb");
    let long = "all work and no play ".repeat(200);

    let bits = required_bits(&SecretPayload::text(&long), &cfg).unwrap();
    assert!(bits < long.len() as u64 * 8);

    let cover = png_cover(64, 64);
    let (artifact, _) = embed(&cover, &SecretPayload::text(&long), "pw", &cfg).unwrap();
    let secret = extract(&artifact, "pw", ConfigSource::Manual(&cfg)).unwrap();
    assert_eq!(secret.as_text().unwrap(), long);
}

/// Any permutation other than the original order fails authentication.
#[test]
fn test_layer_order_sensitivity() {
    let cover = png_cover(48, 48);
    let cfg = config(
        "aes-256-gcm,chacha20-poly1305,xchacha20-poly1305",
        "sha512",
        "image-lsb",
    );
    let (artifact, _) = embed(&cover, &SecretPayload::text("order"), "pw", &cfg).unwrap();

    let permutations = [
        "aes-256-gcm,xchacha20-poly1305,chacha20-poly1305",
        "chacha20-poly1305,aes-256-gcm,xchacha20-poly1305",
        "chacha20-poly1305,xchacha20-poly1305,aes-256-gcm",
        "xchacha20-poly1305,aes-256-gcm,chacha20-poly1305",
        "xchacha20-poly1305,chacha20-poly1305,aes-256-gcm",
    ];
    for order in permutations {
        let wrong = config(order, "sha512", "image-lsb");
        let err = extract(&artifact, "pw", ConfigSource::Manual(&wrong)).unwrap_err();
        assert!(
            matches!(err, InscryptError::AuthenticationFailure { .. }),
            "order {} gave {:?}",
            order,
            err
        );
    }
}

/// A different hash derives different keys.
#[test]
fn test_wrong_hash_fails() {
    let cover = wav_cover(4000);
    let cfg = config("chacha20-poly1305", "sha256", "audio-lsb");
    let (artifact, _) = embed(&cover, &SecretPayload::text("hash"), "pw", &cfg).unwrap();

    let wrong = config("chacha20-poly1305", "sha384", "audio-lsb");
    let err = extract(&artifact, "pw", ConfigSource::Manual(&wrong)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
}

/// A wrong password is an error, never garbage.
#[test]
fn test_wrong_password() {
    let cover = y4m_cover(16, 16, 4);
    let cfg = config("aes-256-gcm,chacha20-poly1305", "blake2s", "video-lsb");
    let (artifact, _) =
        embed(&cover, &SecretPayload::text("hello"), "correct-horse", &cfg).unwrap();

    let err = extract(&artifact, "battery-staple", ConfigSource::Manual(&cfg)).unwrap_err();
    match err {
        InscryptError::AuthenticationFailure { layer } => assert_eq!(layer, 1),
        other => panic!("expected authentication failure, got {:?}", other),
    }
}

/// Exact fit succeeds; one carrier bit fewer fails.
#[test]
fn test_capacity_boundary() {
    let cfg = config("aes-256-gcm,xchacha20-poly1305", "sha256", "audio-lsb");
    let secret = SecretPayload::text("boundary check");
    let needed = required_bits(&secret, &cfg).unwrap();

    let exact = wav_cover(needed as usize + 88);
    assert_eq!(capacity(&exact, &cfg).unwrap(), needed);
    let (artifact, _) = embed(&exact, &secret, "pw", &cfg).unwrap();
    let recovered = extract(&artifact, "pw", ConfigSource::Manual(&cfg)).unwrap();
    assert_eq!(recovered.as_text().unwrap(), "boundary check");

    let short = wav_cover(needed as usize + 87);
    match embed(&short, &secret, "pw", &cfg).unwrap_err() {
        InscryptError::CapacityExceeded {
            needed: n,
            capacity: c,
        } => {
            assert_eq!(n, needed);
            assert_eq!(c, needed - 1);
        }
        other => panic!("expected capacity error, got {:?}", other),
    }
}

/// Every hash family, including the XOF and legacy ones, drives a round trip.
#[test]
fn test_extended_hash_families_roundtrip() {
    let cover = wav_cover(4000);
    for hash in ["sha1", "sha224", "sha3-384", "keccak", "cshake256", "whirlpool"] {
        let cfg = config("aes-256-gcm,xchacha20-poly1305", hash, "audio-lsb");
        let (artifact, codebook) =
            embed(&cover, &SecretPayload::text("hashes"), "pw", &cfg).unwrap();

        let json = codebook.to_json().unwrap();
        let secret = extract(&artifact, "pw", ConfigSource::Codebook(json.as_bytes())).unwrap();
        assert_eq!(secret.as_text().unwrap(), "hashes", "hash {}", hash);
    }
}

/// Y4M dimensions large enough to overflow a frame size are rejected.
#[test]
fn test_oversized_y4m_header_rejected() {
    let cfg = config("aes-256-gcm", "sha256", "video-lsb");
    let header = b"YUV4MPEG2 W8589934592 H8589934592 Cmono\nFRAME\n".to_vec();
    let cover = inscrypt::CoverMedium::detect(header.clone()).unwrap();

    let err = capacity(&cover, &cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);

    let artifact = EmbeddedArtifact::detect(header).unwrap();
    let err = extract(&artifact, "pw", ConfigSource::Manual(&cfg)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
}

/// A technique from another media family is rejected up front.
#[test]
fn test_technique_cover_mismatch() {
    let cover = png_cover(16, 16);
    let cfg = config("aes-256-gcm", "sha256", "audio-lsb");

    let err = embed(&cover, &SecretPayload::text("x"), "pw", &cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
}

#[test]
fn test_invalid_configuration() {
    let cover = png_cover(16, 16);
    let cfg = config("aes-256-gcm", "sha256", "image-lsb");

    let err = embed(&cover, &SecretPayload::text("x"), "", &cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    let too_many = inscrypt::PipelineConfig::parse(
        "aes-256-gcm,aes-256-gcm,aes-256-gcm,aes-256-gcm,aes-256-gcm,aes-256-gcm",
        "sha256",
        "image-lsb",
    );
    assert!(too_many.is_err());

    assert!(inscrypt::PipelineConfig::parse("rot13", "sha256", "image-lsb").is_err());
}

/// Codebooks reproduce the configuration they were built from.
#[test]
fn test_codebook_roundtrip() {
    let cfg = config(
        "aes-128-gcm,aes-256-gcm-siv,chacha20-poly1305,xchacha20-poly1305",
        "shake128",
        "audio-parity",
    );
    let codebook = Codebook::build_at(&cfg, 1_700_000_000).unwrap();
    let json = codebook.to_json().unwrap();

    assert_eq!(Codebook::load(json.as_bytes()).unwrap(), cfg);
    assert_eq!(Codebook::parse(json.as_bytes()).unwrap(), codebook);
}

/// Flipping any byte of a codebook makes it unusable.
#[test]
fn test_codebook_tampering_rejected() {
    let cover = png_cover(32, 32);
    let cfg = config("aes-256-gcm,chacha20-poly1305", "sha256", "image-lsb");
    let (artifact, codebook) = embed(&cover, &SecretPayload::text("hello"), "pw", &cfg).unwrap();
    let json = codebook.to_json().unwrap().into_bytes();

    for i in (0..json.len()).step_by(7) {
        let mut tampered = json.clone();
        tampered[i] ^= 0x20;
        let err = extract(&artifact, "pw", ConfigSource::Codebook(&tampered)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptCodebook, "byte {}", i);
    }
}

/// The state trace records every stage in order, starting from `Idle`.
#[test]
fn test_state_traces() {
    let cover = png_cover(24, 24);
    let cfg = config("aes-256-gcm", "sha256", "image-lsb");
    let options = PipelineOptions {
        timestamp: Some(42),
        ..Default::default()
    };

    let embedded =
        embed_with_options(&cover, &SecretPayload::text("trace"), "pw", &cfg, &options).unwrap();
    assert_eq!(
        embedded.trace,
        vec![
            EmbedState::Idle,
            EmbedState::Validated,
            EmbedState::Framed,
            EmbedState::Encrypted,
            EmbedState::Embedded,
            EmbedState::Done,
        ]
    );
    assert_eq!(embedded.codebook.timestamp, 42);

    let extracted = extract_with_options(
        &embedded.artifact,
        "pw",
        ConfigSource::Manual(&cfg),
        &PipelineOptions::default(),
    )
    .unwrap();
    assert_eq!(
        extracted.trace,
        vec![
            ExtractState::Idle,
            ExtractState::Extracted,
            ExtractState::Decrypted,
            ExtractState::Unframed,
            ExtractState::Done,
        ]
    );
}

#[test]
fn test_cancelled_request() {
    let cover = png_cover(24, 24);
    let cfg = config("aes-256-gcm", "sha256", "image-lsb");
    let token = CancelToken::new();
    token.cancel();
    let options = PipelineOptions {
        cancel: Some(token),
        ..Default::default()
    };

    let err = embed_with_options(&cover, &SecretPayload::text("x"), "pw", &cfg, &options)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

/// Covers written to disk and read back work the way the CLI uses them.
#[test]
fn test_file_based_flow() {
    let dir = TempDir::new().unwrap();
    let cover_path = dir.path().join("cover.png");
    fs::write(&cover_path, png_cover(32, 32).bytes()).unwrap();

    let cover = inscrypt::CoverMedium::detect(fs::read(&cover_path).unwrap()).unwrap();
    let cfg = config("aes-256-gcm,chacha20-poly1305", "sha256", "image-lsb");
    let (artifact, codebook) = embed(&cover, &SecretPayload::text("on disk"), "pw", &cfg).unwrap();

    let out_path = dir.path().join(format!("cover.inscrypt.{}", artifact.extension()));
    let book_path = dir.path().join("cover.codebook.json");
    fs::write(&out_path, artifact.bytes()).unwrap();
    fs::write(&book_path, codebook.to_json().unwrap()).unwrap();

    let reread = EmbeddedArtifact::detect(fs::read(&out_path).unwrap()).unwrap();
    let raw = fs::read(&book_path).unwrap();
    let secret = extract(&reread, "pw", ConfigSource::Codebook(&raw)).unwrap();
    assert_eq!(secret.as_text().unwrap(), "on disk");
}

/// Settings defaults drive the pipeline when no flags are given.
#[test]
fn test_settings_defaults_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let mut settings = Settings::default();
    settings.defaults.ciphers = vec!["chacha20".to_string(), "aes-256-gcm".to_string()];
    settings.defaults.image_technique = "lsb2".to_string();
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);

    let cfg = loaded.pipeline_for(inscrypt::MediaCategory::Image).unwrap();
    assert_eq!(cfg, config("chacha20-poly1305,aes-256-gcm", "sha256", "image-lsb2"));

    let cover = png_cover(32, 32);
    let (artifact, _) = embed(&cover, &SecretPayload::text("defaults"), "pw", &cfg).unwrap();
    let secret = extract(&artifact, "pw", ConfigSource::Manual(&cfg)).unwrap();
    assert_eq!(secret.as_text().unwrap(), "defaults");
}

use super::*;

#[test]
fn test_sign_and_verify() {
    let keypair = Ed25519KeyPair::from_seed(&[7u8; 32]);
    let message = b"precommit";
    let signature = keypair.sign(message);

    assert_eq!(keypair.public_key().len(), PUBLIC_KEY_LEN);
    assert_eq!(signature.len(), SIGNATURE_LEN);
    assert!(verify_signature(&keypair.public_key(), message, &signature));
    assert!(!verify_signature(&keypair.public_key(), b"prevote", &signature));
}

#[test]
fn test_wrong_key_fails() {
    let signer = Ed25519KeyPair::from_seed(&[1u8; 32]);
    let other = Ed25519KeyPair::from_seed(&[2u8; 32]);
    let signature = signer.sign(b"block");
    assert!(!verify_signature(&other.public_key(), b"block", &signature));
}

#[test]
fn test_deterministic_from_seed() {
    let a = Ed25519KeyPair::from_seed(&[3u8; 32]);
    let b = Ed25519KeyPair::from_seed(&[3u8; 32]);
    assert_eq!(a.public_key(), b.public_key());
    assert_eq!(a.sign(b"x"), b.sign(b"x"));
}

#[test]
fn test_malformed_inputs_never_panic() {
    let keypair = Ed25519KeyPair::from_seed(&[9u8; 32]);
    let signature = keypair.sign(b"m");
    assert!(!verify_signature(&[], b"m", &signature));
    assert!(!verify_signature(&[0u8; 31], b"m", &signature));
    assert!(!verify_signature(&keypair.public_key(), b"m", &[]));
    assert!(!verify_signature(&keypair.public_key(), b"m", &signature[..63]));
    assert!(!verify_signature(&[0xffu8; 32], b"m", &signature));
}

#[test]
fn test_debug_shows_public_key_only() {
    let keypair = Ed25519KeyPair::from_seed(&[5u8; 32]);
    let shown = format!("{:?}", keypair);
    assert!(shown.contains(&hex::encode(keypair.public_key())));
    assert!(!shown.contains(&hex::encode([5u8; 32])));
}

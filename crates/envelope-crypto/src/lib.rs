//! Narrow crypto interface the envelope engine builds on: PEM/X.509
//! loading, RSA PKCS#1 v1.5 sign/verify/key-wrap, AES-128-CBC, and hashing.
//! Nothing here knows about TLV framing — that belongs to `envelope-core`.

pub mod aes;
pub mod cert;
pub mod hash;
pub mod identity;
pub mod keys;

pub use aes::{aes_cbc_decrypt, aes_cbc_encrypt};
pub use cert::{
    certificate_der, certificate_from_der, certificate_signature, issuer_rfc4514,
    load_cert_and_key_from_pem, load_cert_from_pem, load_private_key_from_pem,
    public_key_algorithm, serial_number, subject_rfc4514, PublicKeyAlgorithm,
};
pub use hash::{compute_hash, fingerprint, FingerprintAlgorithm};
pub use identity::{RecipientIdentity, SignerIdentity};
pub use keys::{
    encode_public_key, public_key, rsa_modulus_bits, rsa_sign_pkcs1v15, rsa_unwrap_key,
    rsa_verify_pkcs1v15, rsa_wrap_key, KeyMaterial, PrivateKeyMaterial,
};

pub use rand_core;
pub use rsa;
pub use x509_cert;

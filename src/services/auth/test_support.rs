//! 테스트 공용 키

use jsonwebtoken::Algorithm;
use once_cell::sync::Lazy;
use rsa::RsaPrivateKey;

use crate::services::auth::signing_key::{HmacSigningKey, RsaSigningKey, RSA_KEY_BITS};

// 2048비트 생성은 느리므로 테스트 바이너리당 한 번만 만든다
static TEST_RSA_PRIVATE_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::new(&mut rsa::rand_core::OsRng, RSA_KEY_BITS).expect("generate test RSA key")
});

static OTHER_RSA_PRIVATE_KEY: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::new(&mut rsa::rand_core::OsRng, RSA_KEY_BITS).expect("generate test RSA key")
});

pub fn test_rsa_private_key() -> &'static RsaPrivateKey {
    &TEST_RSA_PRIVATE_KEY
}

pub fn test_rsa_key(algorithm: Algorithm) -> RsaSigningKey {
    RsaSigningKey::new(algorithm, &TEST_RSA_PRIVATE_KEY).expect("build test RSA key")
}

pub fn other_rsa_key(algorithm: Algorithm) -> RsaSigningKey {
    RsaSigningKey::new(algorithm, &OTHER_RSA_PRIVATE_KEY).expect("build test RSA key")
}

pub fn test_hmac_key(algorithm: Algorithm, secret: &[u8]) -> HmacSigningKey {
    HmacSigningKey::new(algorithm, secret).expect("build test HMAC key")
}

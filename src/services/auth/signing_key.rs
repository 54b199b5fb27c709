//! JWT 서명 키
//!
//! 서명/검증 프로토콜이 의존하는 서명 키 기능([`JwtSigningKey`])과
//! HMAC, RSA 구현을 제공합니다. 알고리즘은 전역 레지스트리가 아니라
//! 키 자체가 선언하며, 검증 시 토큰 헤더의 알고리즘은 항상 이 값에 고정됩니다.
//!
//! # 지원 알고리즘
//!
//! - `HS256`, `HS384`, `HS512` - 공유 비밀 ([`HmacSigningKey`])
//! - `RS256`, `RS384`, `RS512`, `PS256`, `PS384`, `PS512` - RSA ([`RsaSigningKey`])
//!
//! # RSA 키 파일
//!
//! `OAUTH2_JWT_SIGNING_PRIVATE_KEY_FILE` 경로에 키가 없으면 2048비트 키를
//! 생성하여 PKCS#1 PEM으로 저장합니다. 직접 만들려면:
//!
//! ```bash
//! openssl genrsa -out jwt/private.pem 2048
//! ```
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use oauth2_token::config::OAuth2Config;
//! use oauth2_token::services::auth::{init_signing_key, jwks};
//!
//! let key = init_signing_key(&OAuth2Config::from_env())?;
//! println!("{}", jwks(&[key]));
//! ```

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

use crate::config::OAuth2Config;
use crate::errors::{ErrorContext, TokenError, TokenResult};

/// 새로 생성하는 RSA 키 크기
pub const RSA_KEY_BITS: usize = 2048;

/// 토큰 서명 키 기능
///
/// 구현체는 키 회전을 스스로 관리하며, 서명/검증 호출마다 새로 조회됩니다.
/// `verify_key()`는 `signing_method()` 아래에서 `sign_key()`와 정확히 대응해야 합니다.
pub trait JwtSigningKey: Send + Sync {
    /// 공유 비밀 키 여부
    fn is_symmetric(&self) -> bool;

    /// 서명 알고리즘. 같은 키에 대해 항상 같은 값을 반환해야 합니다.
    fn signing_method(&self) -> Algorithm;

    /// 서명 재료
    fn sign_key(&self) -> TokenResult<EncodingKey>;

    /// 검증 재료 (대칭 키는 서명 재료와 같은 비밀)
    fn verify_key(&self) -> TokenResult<DecodingKey>;

    /// JWK `kid`
    fn key_id(&self) -> Option<&str> {
        None
    }

    /// 공개 JWK. 대칭 키는 `None`.
    fn to_jwk(&self) -> Option<serde_json::Value> {
        None
    }

    /// 서명 직전 헤더에 메타데이터를 붙입니다. 클레임은 건드릴 수 없습니다.
    fn pre_process_token(&self, _header: &mut Header) {}
}

/// 알고리즘 식별자 문자열 (`RS256` 등)
pub fn algorithm_name(algorithm: Algorithm) -> String {
    format!("{:?}", algorithm)
}

/// HMAC 서명 키
pub struct HmacSigningKey {
    algorithm: Algorithm,
    secret: Vec<u8>,
}

impl HmacSigningKey {
    /// HMAC 비밀 값으로 서명 키를 만듭니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::KeyError` - HS 계열이 아닌 알고리즘이거나 비밀 값이 비어 있는 경우
    pub fn new(algorithm: Algorithm, secret: &[u8]) -> TokenResult<Self> {
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(TokenError::KeyError(format!(
                "{} is not an HMAC algorithm",
                algorithm_name(algorithm)
            )));
        }
        if secret.is_empty() {
            return Err(TokenError::KeyError("HMAC secret must not be empty".to_string()));
        }

        Ok(Self {
            algorithm,
            secret: secret.to_vec(),
        })
    }
}

impl JwtSigningKey for HmacSigningKey {
    fn is_symmetric(&self) -> bool {
        true
    }

    fn signing_method(&self) -> Algorithm {
        self.algorithm
    }

    fn sign_key(&self) -> TokenResult<EncodingKey> {
        Ok(EncodingKey::from_secret(&self.secret))
    }

    fn verify_key(&self) -> TokenResult<DecodingKey> {
        Ok(DecodingKey::from_secret(&self.secret))
    }
}

/// RSA 서명 키
///
/// `kid`는 공개키의 RFC 7638 JWK thumbprint (SHA-256, base64url) 입니다.
pub struct RsaSigningKey {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: String,
    n: String,
    e: String,
}

impl RsaSigningKey {
    /// RSA 개인키로 서명/검증 키와 JWK 지문(`kid`)을 준비합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::KeyError` - RS/PS 계열이 아닌 알고리즘이거나 키 인코딩 실패
    pub fn new(algorithm: Algorithm, private_key: &RsaPrivateKey) -> TokenResult<Self> {
        if !matches!(
            algorithm,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ) {
            return Err(TokenError::KeyError(format!(
                "{} is not an RSA algorithm",
                algorithm_name(algorithm)
            )));
        }

        let der = private_key
            .to_pkcs1_der()
            .context("Failed to encode RSA private key")?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

        let public_key = private_key.to_public_key();
        let n = general_purpose::URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = general_purpose::URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());
        let decoding_key =
            DecodingKey::from_rsa_components(&n, &e).context("Failed to build RSA verify key")?;

        // 멤버 순서는 RFC 7638 규정 (사전순, 공백 없음)
        let thumbprint_input = format!(r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#, e, n);
        let key_id = general_purpose::URL_SAFE_NO_PAD
            .encode(Sha256::digest(thumbprint_input.as_bytes()));

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            key_id,
            n,
            e,
        })
    }

    /// PKCS#1 또는 PKCS#8 PEM에서 키를 읽습니다.
    pub fn from_pem(algorithm: Algorithm, pem: &str) -> TokenResult<Self> {
        let private_key = parse_rsa_private_key(pem)?;
        Self::new(algorithm, &private_key)
    }
}

impl JwtSigningKey for RsaSigningKey {
    fn is_symmetric(&self) -> bool {
        false
    }

    fn signing_method(&self) -> Algorithm {
        self.algorithm
    }

    fn sign_key(&self) -> TokenResult<EncodingKey> {
        Ok(self.encoding_key.clone())
    }

    fn verify_key(&self) -> TokenResult<DecodingKey> {
        Ok(self.decoding_key.clone())
    }

    fn key_id(&self) -> Option<&str> {
        Some(&self.key_id)
    }

    fn to_jwk(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "kty": "RSA",
            "use": "sig",
            "alg": algorithm_name(self.algorithm),
            "kid": self.key_id,
            "n": self.n,
            "e": self.e,
        }))
    }

    fn pre_process_token(&self, header: &mut Header) {
        header.kid = Some(self.key_id.clone());
    }
}

fn parse_rsa_private_key(pem: &str) -> TokenResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .context("Failed to parse RSA private key")
}

/// 설정에 지정된 알고리즘으로 서명 키를 초기화합니다.
///
/// # Errors
///
/// * `TokenError::Config` - 알 수 없는 알고리즘, HMAC 비밀 누락 또는 디코딩 실패
/// * `TokenError::KeyError` - 키 파일 읽기/생성 실패, 지원하지 않는 알고리즘 계열
pub fn init_signing_key(config: &OAuth2Config) -> TokenResult<Arc<dyn JwtSigningKey>> {
    let algorithm = Algorithm::from_str(&config.jwt_signing_algorithm).map_err(|_| {
        TokenError::Config(format!(
            "unknown JWT signing algorithm: {}",
            config.jwt_signing_algorithm
        ))
    })?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            let encoded = config.jwt_secret.as_deref().ok_or_else(|| {
                TokenError::Config(format!(
                    "OAUTH2_JWT_SECRET is required for {}",
                    algorithm_name(algorithm)
                ))
            })?;
            let secret = general_purpose::URL_SAFE_NO_PAD
                .decode(encoded.trim().trim_end_matches('='))
                .map_err(|e| TokenError::Config(format!("invalid OAUTH2_JWT_SECRET: {}", e)))?;
            Ok(Arc::new(HmacSigningKey::new(algorithm, &secret)?))
        }
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => {
            let private_key = load_or_create_rsa_key(&config.jwt_signing_private_key_file)?;
            let key = RsaSigningKey::new(algorithm, &private_key)?;
            log::info!("🔑 JWT signing key ready (alg: {}, kid: {})", algorithm_name(algorithm), key.key_id);
            Ok(Arc::new(key))
        }
        other => Err(TokenError::KeyError(format!(
            "unsupported JWT signing algorithm: {}",
            algorithm_name(other)
        ))),
    }
}

/// RSA 개인키를 읽거나, 파일이 없으면 새로 생성해 저장합니다.
pub fn load_or_create_rsa_key(path: &str) -> TokenResult<RsaPrivateKey> {
    if Path::new(path).exists() {
        log::info!("🔑 Loading existing JWT RSA key: {}", path);
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read private key file '{}'", path))?;
        return parse_rsa_private_key(&pem);
    }

    log::info!("🔑 JWT key not found. Generating new RSA key ({} bits)...", RSA_KEY_BITS);

    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create key directory for '{}'", path))?;
    }

    let private_key = RsaPrivateKey::new(&mut rsa::rand_core::OsRng, RSA_KEY_BITS)
        .context("Failed to generate RSA key")?;

    let pem = private_key
        .to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
        .context("Failed to encode RSA private key")?;
    std::fs::write(path, pem.as_bytes())
        .with_context(|| format!("Failed to write private key file '{}'", path))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions of '{}'", path))?;
    }

    log::info!("📁 Private key saved: {}", path);

    Ok(private_key)
}

/// JWKS(JSON Web Key Set) 문서를 생성합니다. 대칭 키는 포함되지 않습니다.
pub fn jwks(keys: &[Arc<dyn JwtSigningKey>]) -> serde_json::Value {
    let keys: Vec<serde_json::Value> = keys.iter().filter_map(|key| key.to_jwk()).collect();
    serde_json::json!({ "keys": keys })
}

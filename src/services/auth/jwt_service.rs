//! JWT 서명/검증 프로토콜
//!
//! 클레임 값을 압축 직렬화(compact serialization) 토큰 문자열로 서명하고,
//! 토큰 문자열을 검증하여 클레임 값으로 되돌립니다.
//!
//! # 검증 단계
//!
//! ```text
//! Received → Decoded → AlgorithmChecked → SignatureChecked → TimeChecked → ShapeBound → Valid
//!     │          │             │                  │                │             │
//!     └──────────┴─────────────┴──────────────────┴────────────────┴─────────────┴──→ Rejected(TokenError)
//! ```
//!
//! 1. 구조 디코딩 - 세 개의 세그먼트와 헤더 JSON (`MalformedToken`)
//! 2. 알고리즘 고정 - 헤더 `alg`와 키의 `signing_method()` 비교 (`AlgorithmMismatch`)
//! 3. 서명 검증 - 키의 `verify_key()` 사용 (`InvalidSignature`)
//! 4. 시간 검증 - `exp`, `nbf` ± 60초 (`Expired`, `NotYetValid`)
//! 5. 형태 바인딩 - 클레임 구조체로 역직렬화 (`InvalidClaims`)
//!
//! 어느 단계든 실패하면 즉시 종료하며 부분 결과는 반환하지 않습니다.
//! 알고리즘 비교가 서명 검증보다 먼저 수행되므로, 다른(더 약한) 알고리즘으로
//! 서명된 토큰은 서명 내용과 무관하게 거부됩니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use oauth2_token::domain::models::token::Token;
//! use oauth2_token::services::auth::{parse_token, sign_token};
//!
//! let mut token = Token::access(42);
//! let signed = sign_token(&mut token, key.as_ref())?;
//! let parsed = parse_token(&signed, key.as_ref())?;
//! assert_eq!(parsed.grant_id, 42);
//! ```

use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::models::token::{Claims, OIDCToken, Token};
use crate::errors::{TokenError, TokenResult};
use crate::services::auth::signing_key::{JwtSigningKey, algorithm_name};

/// `exp`/`nbf` 검증 시 허용하는 시계 오차 (초)
pub const DEFAULT_LEEWAY: i64 = 60;

/// 클레임의 `iat`를 현재 시간으로 찍고 서명합니다.
///
/// 입력 클레임의 `iat`는 호출자가 지정한 값과 무관하게 덮어씁니다.
///
/// # Errors
///
/// * `TokenError::SigningFailure` - 서명 재료가 없거나 사용할 수 없는 경우
pub fn sign_token<C: Claims>(claims: &mut C, key: &dyn JwtSigningKey) -> TokenResult<String> {
    claims.registered_claims_mut().issued_at = Some(Utc::now().timestamp());

    let algorithm = key.signing_method();
    let mut header = Header::new(algorithm);
    key.pre_process_token(&mut header);
    header.alg = algorithm;

    let encoding_key = key
        .sign_key()
        .map_err(|e| TokenError::SigningFailure(e.to_string()))?;

    encode(&header, &*claims, &encoding_key).map_err(|e| TokenError::SigningFailure(e.to_string()))
}

/// 액세스/리프레시 토큰 문자열을 검증합니다.
pub fn parse_token(raw: &str, key: &dyn JwtSigningKey) -> TokenResult<Token> {
    parse_claims_at(raw, key, Utc::now())
}

/// id_token 문자열을 검증합니다.
pub fn parse_id_token(raw: &str, key: &dyn JwtSigningKey) -> TokenResult<OIDCToken> {
    parse_claims_at(raw, key, Utc::now())
}

/// 주어진 시각을 기준으로 토큰 문자열을 검증하고 클레임 구조체로 바인딩합니다.
pub fn parse_claims_at<C: Claims>(
    raw: &str,
    key: &dyn JwtSigningKey,
    now: DateTime<Utc>,
) -> TokenResult<C> {
    let segments = Segments::split(raw)?;

    let expected = key.signing_method();
    let found = Algorithm::from_str(&segments.header.alg).ok();
    if found != Some(expected) {
        return Err(TokenError::AlgorithmMismatch {
            expected: algorithm_name(expected),
            found: segments.header.alg,
        });
    }

    let decoding_key = key.verify_key()?;
    let verified = jsonwebtoken::crypto::verify(
        segments.signature,
        segments.message.as_bytes(),
        &decoding_key,
        expected,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey => {
            TokenError::KeyError(e.to_string())
        }
        _ => TokenError::InvalidSignature,
    })?;
    if !verified {
        return Err(TokenError::InvalidSignature);
    }

    let payload: serde_json::Value = decode_segment(segments.payload)
        .map_err(|e| TokenError::MalformedToken(format!("claims segment: {}", e)))?;

    check_time_claims(&payload, now.timestamp(), DEFAULT_LEEWAY)?;

    serde_json::from_value(payload).map_err(|e| TokenError::InvalidClaims(e.to_string()))
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

struct Segments<'a> {
    header: RawHeader,
    /// `header.payload`
    message: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> Segments<'a> {
    fn split(raw: &'a str) -> TokenResult<Self> {
        let parts: Vec<&str> = raw.split('.').collect();
        let &[header, payload, signature] = parts.as_slice() else {
            return Err(TokenError::MalformedToken(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        };
        if header.is_empty() || payload.is_empty() {
            return Err(TokenError::MalformedToken("empty segment".to_string()));
        }

        let decoded: RawHeader = decode_segment(header)
            .map_err(|e| TokenError::MalformedToken(format!("header segment: {}", e)))?;

        Ok(Self {
            header: decoded,
            message: &raw[..header.len() + 1 + payload.len()],
            payload,
            signature,
        })
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

fn check_time_claims(payload: &serde_json::Value, now: i64, leeway: i64) -> TokenResult<()> {
    let claims = payload
        .as_object()
        .ok_or_else(|| TokenError::InvalidClaims("claims must be a JSON object".to_string()))?;

    let numeric = |name: &str| -> TokenResult<Option<i64>> {
        match claims.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| TokenError::InvalidClaims(format!("{} must be an integer", name))),
        }
    };

    if let Some(exp) = numeric("exp")? {
        if exp < now - leeway {
            return Err(TokenError::Expired);
        }
    }
    if let Some(nbf) = numeric("nbf")? {
        if nbf > now + leeway {
            return Err(TokenError::NotYetValid);
        }
    }

    Ok(())
}

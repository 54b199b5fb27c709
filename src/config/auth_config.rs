//! # OAuth2 Token Configuration Module
//!
//! 토큰 수명, 서명 알고리즘, 서명 키 파일 등 OAuth2 토큰 발급 관련 설정을
//! 관리하는 모듈입니다. 모든 값은 환경 변수에서 읽으며, 누락되거나 잘못된
//! 값은 경고 로그와 함께 기본값으로 대체됩니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! export OAUTH2_ACCESS_TOKEN_EXPIRATION_TIME="3600"     # 초
//! export OAUTH2_REFRESH_TOKEN_EXPIRATION_TIME="730"     # 시간
//! export OAUTH2_INVALIDATE_REFRESH_TOKENS="false"
//! export OAUTH2_JWT_SIGNING_ALGORITHM="RS256"
//! export OAUTH2_JWT_SIGNING_PRIVATE_KEY_FILE="jwt/private.pem"
//! export OAUTH2_JWT_SECRET="base64url-encoded-secret"   # HS256/384/512 전용
//! export OAUTH2_JWT_ISSUER="https://git.example.com/"
//! export OAUTH2_MAX_TOKEN_LENGTH="32767"
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use oauth2_token::config::OAuth2Config;
//!
//! let config = OAuth2Config::from_env();
//! println!("access token lifetime: {}s", config.access_token_expiration_time);
//! ```

use std::env;
use std::str::FromStr;

/// 기본 액세스 토큰 수명 (초)
pub const DEFAULT_ACCESS_TOKEN_EXPIRATION_TIME: i64 = 3600;
/// 기본 리프레시 토큰 수명 (시간)
pub const DEFAULT_REFRESH_TOKEN_EXPIRATION_TIME: i64 = 730;
/// 허용되는 최대 액세스 토큰 수명 (초, 100년)
pub const MAX_ACCESS_TOKEN_EXPIRATION_TIME: i64 = 100 * 365 * 24 * 3600;
/// 허용되는 최대 리프레시 토큰 수명 (시간, 100년)
pub const MAX_REFRESH_TOKEN_EXPIRATION_TIME: i64 = 100 * 365 * 24;
/// 기본 서명 알고리즘
pub const DEFAULT_JWT_SIGNING_ALGORITHM: &str = "RS256";
/// 기본 서명 키 파일 경로
pub const DEFAULT_JWT_SIGNING_PRIVATE_KEY_FILE: &str = "jwt/private.pem";
/// 기본 발급자
pub const DEFAULT_JWT_ISSUER: &str = "http://localhost:3000/";
/// 허용되는 최대 토큰 문자열 길이
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = i16::MAX as usize;

/// OAuth2 토큰 발급 설정
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth2Config {
    /// 액세스 토큰 수명 (초)
    pub access_token_expiration_time: i64,
    /// 리프레시 토큰 수명 (시간)
    pub refresh_token_expiration_time: i64,
    /// 리프레시 토큰 재사용 시 거부 여부 (회전 카운터 비교)
    pub invalidate_refresh_tokens: bool,
    /// JWT 서명 알고리즘 이름 (예: `RS256`, `HS256`)
    pub jwt_signing_algorithm: String,
    /// 비대칭 서명 키 PEM 파일 경로
    pub jwt_signing_private_key_file: String,
    /// HMAC 계열 알고리즘용 비밀 값 (base64url)
    pub jwt_secret: Option<String>,
    /// `iss` 클레임 값
    pub issuer: String,
    /// 검증 대상 토큰 문자열의 최대 길이
    pub max_token_length: usize,
}

impl Default for OAuth2Config {
    fn default() -> Self {
        Self {
            access_token_expiration_time: DEFAULT_ACCESS_TOKEN_EXPIRATION_TIME,
            refresh_token_expiration_time: DEFAULT_REFRESH_TOKEN_EXPIRATION_TIME,
            invalidate_refresh_tokens: false,
            jwt_signing_algorithm: DEFAULT_JWT_SIGNING_ALGORITHM.to_string(),
            jwt_signing_private_key_file: DEFAULT_JWT_SIGNING_PRIVATE_KEY_FILE.to_string(),
            jwt_secret: None,
            issuer: DEFAULT_JWT_ISSUER.to_string(),
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }
}

impl OAuth2Config {
    /// 프로세스 환경 변수에서 설정을 읽습니다.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수에서 설정을 읽습니다.
    ///
    /// `from_env`와 동일한 규칙을 따르며, 테스트에서 프로세스 환경을
    /// 건드리지 않고 설정을 구성할 때 사용합니다.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = lookup("OAUTH2_JWT_SECRET").filter(|s| !s.trim().is_empty());

        Self {
            access_token_expiration_time: parse_lifetime_or(
                &lookup,
                "OAUTH2_ACCESS_TOKEN_EXPIRATION_TIME",
                defaults.access_token_expiration_time,
                MAX_ACCESS_TOKEN_EXPIRATION_TIME,
            ),
            refresh_token_expiration_time: parse_lifetime_or(
                &lookup,
                "OAUTH2_REFRESH_TOKEN_EXPIRATION_TIME",
                defaults.refresh_token_expiration_time,
                MAX_REFRESH_TOKEN_EXPIRATION_TIME,
            ),
            invalidate_refresh_tokens: parse_or(
                &lookup,
                "OAUTH2_INVALIDATE_REFRESH_TOKENS",
                defaults.invalidate_refresh_tokens,
            ),
            jwt_signing_algorithm: lookup("OAUTH2_JWT_SIGNING_ALGORITHM")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or(defaults.jwt_signing_algorithm),
            jwt_signing_private_key_file: lookup("OAUTH2_JWT_SIGNING_PRIVATE_KEY_FILE")
                .unwrap_or(defaults.jwt_signing_private_key_file),
            jwt_secret,
            issuer: lookup("OAUTH2_JWT_ISSUER").unwrap_or(defaults.issuer),
            max_token_length: parse_or(&lookup, "OAUTH2_MAX_TOKEN_LENGTH", defaults.max_token_length),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            log::warn!("{} 파싱 실패: {}. 기본값 {:?} 사용", key, e, default);
            default
        }),
        None => default,
    }
}

/// 수명 값은 `1..=max` 범위만 허용합니다.
fn parse_lifetime_or<F>(lookup: &F, key: &str, default: i64, max: i64) -> i64
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default);
    if (1..=max).contains(&value) {
        value
    } else {
        log::warn!("{} 범위 초과: {} (1..={}). 기본값 {} 사용", key, value, max, default);
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = OAuth2Config::from_lookup(lookup_from(&[]));
        assert_eq!(config, OAuth2Config::default());
        assert_eq!(config.access_token_expiration_time, 3600);
        assert_eq!(config.refresh_token_expiration_time, 730);
        assert_eq!(config.jwt_signing_algorithm, "RS256");
        assert_eq!(config.max_token_length, 32767);
        assert!(!config.invalidate_refresh_tokens);
    }

    #[test]
    fn test_values_are_read() {
        let config = OAuth2Config::from_lookup(lookup_from(&[
            ("OAUTH2_ACCESS_TOKEN_EXPIRATION_TIME", "600"),
            ("OAUTH2_REFRESH_TOKEN_EXPIRATION_TIME", "24"),
            ("OAUTH2_INVALIDATE_REFRESH_TOKENS", "true"),
            ("OAUTH2_JWT_SIGNING_ALGORITHM", " hs512 "),
            ("OAUTH2_JWT_SECRET", "c2VjcmV0"),
            ("OAUTH2_JWT_ISSUER", "https://git.example.com/"),
        ]));

        assert_eq!(config.access_token_expiration_time, 600);
        assert_eq!(config.refresh_token_expiration_time, 24);
        assert!(config.invalidate_refresh_tokens);
        assert_eq!(config.jwt_signing_algorithm, "HS512");
        assert_eq!(config.jwt_secret.as_deref(), Some("c2VjcmV0"));
        assert_eq!(config.issuer, "https://git.example.com/");
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_default() {
        let config = OAuth2Config::from_lookup(lookup_from(&[
            ("OAUTH2_ACCESS_TOKEN_EXPIRATION_TIME", "soon"),
            ("OAUTH2_INVALIDATE_REFRESH_TOKENS", "maybe"),
            ("OAUTH2_JWT_SECRET", "   "),
        ]));

        assert_eq!(config.access_token_expiration_time, DEFAULT_ACCESS_TOKEN_EXPIRATION_TIME);
        assert!(!config.invalidate_refresh_tokens);
        assert_eq!(config.jwt_secret, None);
    }

    #[test]
    fn test_out_of_range_lifetimes_fall_back_to_default() {
        let config = OAuth2Config::from_lookup(lookup_from(&[
            ("OAUTH2_ACCESS_TOKEN_EXPIRATION_TIME", "0"),
            ("OAUTH2_REFRESH_TOKEN_EXPIRATION_TIME", "9223372036854775"),
        ]));
        assert_eq!(config.access_token_expiration_time, DEFAULT_ACCESS_TOKEN_EXPIRATION_TIME);
        assert_eq!(config.refresh_token_expiration_time, DEFAULT_REFRESH_TOKEN_EXPIRATION_TIME);

        let config = OAuth2Config::from_lookup(lookup_from(&[
            ("OAUTH2_ACCESS_TOKEN_EXPIRATION_TIME", "-5"),
            ("OAUTH2_REFRESH_TOKEN_EXPIRATION_TIME", "876000"),
        ]));
        assert_eq!(config.access_token_expiration_time, DEFAULT_ACCESS_TOKEN_EXPIRATION_TIME);
        assert_eq!(config.refresh_token_expiration_time, MAX_REFRESH_TOKEN_EXPIRATION_TIME);
    }
}

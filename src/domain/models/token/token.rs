//! OAuth2 액세스/리프레시 토큰 클레임 및 토큰 응답
//!
//! 그랜트 참조(`gnt`), 토큰 종류(`tt`), 회전 카운터(`cnt`)를 포함하는
//! 베어러 토큰의 클레임과, 클라이언트에게 전달되는 토큰 응답을 정의합니다.
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::OAuth2Config;
use crate::domain::models::token::claims::{Claims, RegisteredClaims};
use crate::errors::{TokenError, TokenResult};

/// 토큰 종류
///
/// 와이어 형식에서는 정수(`0` = 액세스, `1` = 리프레시)로 표현됩니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TokenKind {
    /// API 접근용 단기 토큰
    #[default]
    AccessToken,
    /// 액세스 토큰 갱신용 장기 토큰
    RefreshToken,
}

impl TokenKind {
    /// 로그와 에러 메시지에 쓰이는 이름 (`access_token`, `refresh_token`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::AccessToken => "access_token",
            TokenKind::RefreshToken => "refresh_token",
        }
    }

    /// 토큰 종류별 수명 정책
    ///
    /// 액세스 토큰은 초 단위, 리프레시 토큰은 시간 단위 설정을 사용합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::Config` - 수명이 0 이하이거나 표현 가능한 범위를 벗어난 경우
    pub fn lifetime(&self, config: &OAuth2Config) -> TokenResult<Duration> {
        let lifetime = match self {
            TokenKind::AccessToken => Duration::try_seconds(config.access_token_expiration_time),
            TokenKind::RefreshToken => Duration::try_hours(config.refresh_token_expiration_time),
        };

        lifetime
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| TokenError::Config(format!("invalid {} lifetime", self)))
    }
}

impl TryFrom<u8> for TokenKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TokenKind::AccessToken),
            1 => Ok(TokenKind::RefreshToken),
            other => Err(format!("unknown token kind: {}", other)),
        }
    }
}

impl From<TokenKind> for u8 {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::AccessToken => 0,
            TokenKind::RefreshToken => 1,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 액세스/리프레시 토큰 클레임
///
/// ## 클레임 구성
///
/// - `gnt`: 토큰이 발급된 OAuth2 그랜트 ID
/// - `tt`: 토큰 종류
/// - `cnt`: 리프레시 토큰 회전 카운터 (0이면 생략)
/// - 표준 등록 클레임 (`iss`, `sub`, `aud`, `exp`, `nbf`, `iat`, `jti`)
///
/// 액세스 토큰의 `cnt` 부재 여부는 여기서 검사하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "gnt")]
    pub grant_id: i64,
    #[serde(rename = "tt")]
    pub kind: TokenKind,
    #[serde(rename = "cnt", default, skip_serializing_if = "is_zero")]
    pub counter: i64,
    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl Token {
    /// 카운터 없는 액세스 토큰
    pub fn access(grant_id: i64) -> Self {
        Self {
            grant_id,
            kind: TokenKind::AccessToken,
            ..Default::default()
        }
    }

    /// 회전 카운터를 가진 리프레시 토큰
    pub fn refresh(grant_id: i64, counter: i64) -> Self {
        Self {
            grant_id,
            kind: TokenKind::RefreshToken,
            counter,
            ..Default::default()
        }
    }
}

impl Claims for Token {
    fn registered_claims(&self) -> &RegisteredClaims {
        &self.registered
    }

    fn registered_claims_mut(&mut self) -> &mut RegisteredClaims {
        &mut self.registered
    }
}

/// 토큰 응답 구조체
///
/// OAuth 2.0 표준의 토큰 엔드포인트 응답 형식을 따릅니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// 액세스 토큰
    pub access_token: String,
    /// 항상 `Bearer`
    pub token_type: String,
    /// 액세스 토큰 만료 시간 (초)
    pub expires_in: i64,
    /// 리프레시 토큰
    pub refresh_token: String,
    /// OpenID Connect id_token (openid 스코프 요청 시)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_token_omits_counter() {
        let json = serde_json::to_value(Token::access(42)).unwrap();
        assert_eq!(json, json!({ "gnt": 42, "tt": 0 }));
    }

    #[test]
    fn test_refresh_token_carries_counter() {
        let json = serde_json::to_value(Token::refresh(7, 3)).unwrap();
        assert_eq!(json, json!({ "gnt": 7, "tt": 1, "cnt": 3 }));
    }

    #[test]
    fn test_registered_claims_are_flattened() {
        let mut token = Token::access(1);
        token.registered.expires_at = Some(1_700_000_000);
        token.registered.issuer = Some("https://git.example.com/".to_string());

        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["exp"], 1_700_000_000);
        assert_eq!(json["iss"], "https://git.example.com/");

        let back: Token = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = serde_json::from_value::<Token>(json!({ "gnt": 1, "tt": 5 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_grant_is_rejected() {
        let result = serde_json::from_value::<Token>(json!({ "tt": 0, "nonce": "n" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_lifetime_policy() {
        let config = OAuth2Config::default();
        assert_eq!(TokenKind::AccessToken.lifetime(&config), Ok(Duration::seconds(3600)));
        assert_eq!(TokenKind::RefreshToken.lifetime(&config), Ok(Duration::hours(730)));
    }

    #[test]
    fn test_lifetime_out_of_range_is_config_error() {
        let config = OAuth2Config {
            access_token_expiration_time: 0,
            refresh_token_expiration_time: 9_223_372_036_854_775,
            ..Default::default()
        };
        assert!(matches!(
            TokenKind::AccessToken.lifetime(&config),
            Err(TokenError::Config(_))
        ));
        assert!(matches!(
            TokenKind::RefreshToken.lifetime(&config),
            Err(TokenError::Config(_))
        ));
    }
}

//! OAuth2 토큰 발급/검증 서비스
//!
//! 서명/검증 프로토콜 위에서 토큰 종류별 수명 정책, 발급자/만료/`jti` 스탬핑,
//! 토큰 종류 확인, 리프레시 토큰 회전 카운터 비교를 담당합니다.
//! 그랜트 저장소는 외부에 있으며, 그랜트 ID와 현재 카운터는 호출자가 전달합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::OAuth2Config;
use crate::domain::models::token::{Audience, OIDCToken, Token, TokenKind, TokenPair};
use crate::errors::{TokenError, TokenResult};
use crate::services::auth::jwt_service::{parse_id_token, parse_token, sign_token};
use crate::services::auth::signing_key::{JwtSigningKey, init_signing_key};

/// OAuth2 토큰 관리 서비스
///
/// 서명 키는 읽기 전용으로 공유되므로 여러 스레드에서 동시에 사용할 수 있습니다.
#[derive(Clone)]
pub struct TokenService {
    key: Arc<dyn JwtSigningKey>,
    config: OAuth2Config,
}

impl TokenService {
    /// 이미 준비된 서명 키와 설정으로 서비스를 만듭니다.
    pub fn new(key: Arc<dyn JwtSigningKey>, config: OAuth2Config) -> Self {
        Self { key, config }
    }

    /// 설정에 지정된 서명 키로 서비스를 구성합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::Config`, `TokenError::KeyError` - 서명 키 초기화 실패
    pub fn from_config(config: OAuth2Config) -> TokenResult<Self> {
        let key = init_signing_key(&config)?;
        Ok(Self::new(key, config))
    }

    /// 발급과 검증에 쓰이는 서명 키 (JWKS 공개용)
    pub fn signing_key(&self) -> &Arc<dyn JwtSigningKey> {
        &self.key
    }

    fn expires_at(&self, kind: TokenKind, now: DateTime<Utc>) -> TokenResult<i64> {
        let lifetime = kind.lifetime(&self.config)?;
        now.checked_add_signed(lifetime)
            .map(|exp| exp.timestamp())
            .ok_or_else(|| TokenError::Config(format!("{} lifetime overflows expiry", kind)))
    }

    fn check_length(&self, raw: &str) -> TokenResult<()> {
        if raw.len() > self.config.max_token_length {
            log::debug!("Rejected token: length {} exceeds limit", raw.len());
            return Err(TokenError::MalformedToken(format!(
                "token exceeds {} bytes",
                self.config.max_token_length
            )));
        }
        Ok(())
    }

    fn new_token(&self, grant_id: i64, kind: TokenKind, counter: i64) -> TokenResult<Token> {
        if grant_id == 0 {
            return Err(TokenError::InvalidClaims("grant id must not be zero".to_string()));
        }

        let now = Utc::now();
        let mut token = match kind {
            TokenKind::AccessToken => Token::access(grant_id),
            TokenKind::RefreshToken => Token::refresh(grant_id, counter),
        };
        token.registered.issuer = Some(self.config.issuer.clone());
        token.registered.expires_at = Some(self.expires_at(kind, now)?);
        token.registered.not_before = Some(now.timestamp());
        token.registered.id = Some(Uuid::new_v4().to_string());

        Ok(token)
    }

    /// 그랜트에 대한 액세스 토큰을 발급합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::InvalidClaims` - 그랜트 ID가 0인 경우
    /// * `TokenError::Config` - 설정된 수명으로 만료 시각을 계산할 수 없는 경우
    /// * `TokenError::SigningFailure` - 서명 실패
    pub fn issue_access_token(&self, grant_id: i64) -> TokenResult<String> {
        let mut token = self.new_token(grant_id, TokenKind::AccessToken, 0)?;
        sign_token(&mut token, self.key.as_ref())
    }

    /// 그랜트의 현재 카운터를 담은 리프레시 토큰을 발급합니다.
    pub fn issue_refresh_token(&self, grant_id: i64, counter: i64) -> TokenResult<String> {
        let mut token = self.new_token(grant_id, TokenKind::RefreshToken, counter)?;
        sign_token(&mut token, self.key.as_ref())
    }

    /// id_token에 발급자와 만료 시간을 찍고 서명합니다.
    ///
    /// 프로필/이메일/그룹 클레임은 호출자가 허용된 스코프에 따라 미리 채워야 합니다.
    pub fn issue_id_token(&self, mut id_token: OIDCToken) -> TokenResult<String> {
        id_token.registered.issuer = Some(self.config.issuer.clone());
        id_token.registered.expires_at = Some(self.expires_at(TokenKind::AccessToken, Utc::now())?);
        sign_token(&mut id_token, self.key.as_ref())
    }

    /// 토큰 응답 (액세스 + 리프레시 + 선택적 id_token)
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pair = token_service.issue_token_pair(grant.id, grant.counter, None)?;
    /// println!("Expires in: {} seconds", pair.expires_in);
    /// ```
    pub fn issue_token_pair(
        &self,
        grant_id: i64,
        counter: i64,
        id_token: Option<OIDCToken>,
    ) -> TokenResult<TokenPair> {
        let access_token = self.issue_access_token(grant_id)?;
        let refresh_token = self.issue_refresh_token(grant_id, counter)?;
        let id_token = id_token
            .map(|token| self.issue_id_token(token))
            .transpose()?;

        Ok(TokenPair {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: TokenKind::AccessToken.lifetime(&self.config)?.num_seconds(),
            refresh_token,
            id_token,
        })
    }

    /// 토큰 문자열을 검증하고 종류를 확인합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::MalformedToken` - 최대 길이 초과 또는 구조 오류
    /// * `TokenError::UnexpectedTokenKind` - 다른 종류의 토큰
    /// * 그 외 검증 단계의 모든 에러
    pub fn verify_token(&self, raw: &str, expected_kind: TokenKind) -> TokenResult<Token> {
        self.check_length(raw)?;

        let token = parse_token(raw, self.key.as_ref()).inspect_err(|e| {
            log::debug!("Rejected {}: {}", expected_kind, e);
        })?;

        if token.kind != expected_kind {
            log::debug!(
                "Rejected token for grant {}: expected {}, found {}",
                token.grant_id,
                expected_kind,
                token.kind
            );
            return Err(TokenError::UnexpectedTokenKind {
                expected: expected_kind.to_string(),
                found: token.kind.to_string(),
            });
        }

        Ok(token)
    }

    /// 리프레시 토큰을 검증하고, 회전이 켜져 있으면 카운터를 비교합니다.
    ///
    /// `current_counter`는 그랜트 저장소에 기록된 현재 값입니다. 카운터 증가와
    /// 저장은 호출자의 몫입니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::RefreshTokenReused` - 이미 교체된 리프레시 토큰
    pub fn verify_refresh_token(&self, raw: &str, current_counter: i64) -> TokenResult<Token> {
        let token = self.verify_token(raw, TokenKind::RefreshToken)?;

        if self.config.invalidate_refresh_tokens && token.counter != current_counter {
            log::warn!(
                "⚠️ Refresh token reuse detected for grant {} (token: {}, current: {})",
                token.grant_id,
                token.counter,
                current_counter
            );
            return Err(TokenError::RefreshTokenReused);
        }

        Ok(token)
    }

    /// id_token을 검증하고 대상(client id)을 확인합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::MalformedToken` - 최대 길이 초과 또는 구조 오류
    /// * `TokenError::InvalidClaims` - `aud`에 `client_id`가 없는 경우
    pub fn verify_id_token(&self, raw: &str, client_id: &str) -> TokenResult<OIDCToken> {
        self.check_length(raw)?;

        let id_token = parse_id_token(raw, self.key.as_ref()).inspect_err(|e| {
            log::debug!("Rejected id_token for {}: {}", client_id, e);
        })?;

        let audience_matches = id_token
            .registered
            .audience
            .as_ref()
            .is_some_and(|aud: &Audience| aud.contains(client_id));
        if !audience_matches {
            log::debug!("Rejected id_token: audience does not contain {}", client_id);
            return Err(TokenError::InvalidClaims(format!(
                "id_token audience does not contain {}",
                client_id
            )));
        }

        Ok(id_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::test_support::{test_hmac_key, test_rsa_key};
    use jsonwebtoken::Algorithm;

    fn hmac_service(config: OAuth2Config) -> TokenService {
        TokenService::new(Arc::new(test_hmac_key(Algorithm::HS256, b"service-secret")), config)
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let service = hmac_service(OAuth2Config::default());
        let raw = service.issue_access_token(42).unwrap();

        let token = service.verify_token(&raw, TokenKind::AccessToken).unwrap();
        assert_eq!(token.grant_id, 42);
        assert_eq!(token.counter, 0);
        assert_eq!(token.registered.issuer.as_deref(), Some("http://localhost:3000/"));
        assert!(token.registered.id.is_some());

        let lifetime = token.registered.expires_at.unwrap() - token.registered.issued_at.unwrap();
        assert!((3599..=3601).contains(&lifetime));
    }

    #[test]
    fn test_zero_grant_is_rejected() {
        let service = hmac_service(OAuth2Config::default());
        assert!(matches!(
            service.issue_access_token(0),
            Err(TokenError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_kind_is_checked() {
        let service = hmac_service(OAuth2Config::default());
        let refresh = service.issue_refresh_token(5, 1).unwrap();

        let result = service.verify_token(&refresh, TokenKind::AccessToken);
        assert_eq!(
            result,
            Err(TokenError::UnexpectedTokenKind {
                expected: "access_token".to_string(),
                found: "refresh_token".to_string(),
            })
        );
    }

    #[test]
    fn test_refresh_token_counter_rotation() {
        let service = hmac_service(OAuth2Config {
            invalidate_refresh_tokens: true,
            ..Default::default()
        });
        let raw = service.issue_refresh_token(5, 2).unwrap();

        let token = service.verify_refresh_token(&raw, 2).unwrap();
        assert_eq!(token.counter, 2);
        assert_eq!(
            service.verify_refresh_token(&raw, 3),
            Err(TokenError::RefreshTokenReused)
        );
    }

    #[test]
    fn test_counter_not_compared_when_rotation_disabled() {
        let service = hmac_service(OAuth2Config::default());
        let raw = service.issue_refresh_token(5, 2).unwrap();
        assert!(service.verify_refresh_token(&raw, 9).is_ok());
    }

    #[test]
    fn test_overlong_token_is_rejected() {
        let service = hmac_service(OAuth2Config {
            max_token_length: 16,
            ..Default::default()
        });
        let raw = service.issue_access_token(1).unwrap();
        assert!(matches!(
            service.verify_token(&raw, TokenKind::AccessToken),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_token_pair_with_id_token() {
        let service = TokenService::new(Arc::new(test_rsa_key(Algorithm::RS256)), OAuth2Config::default());
        let id_token = OIDCToken::new("7", "client-a", "n-1").with_email("a@b.com", true);

        let pair = service.issue_token_pair(11, 0, Some(id_token)).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);

        let access = service.verify_token(&pair.access_token, TokenKind::AccessToken).unwrap();
        let refresh = service.verify_refresh_token(&pair.refresh_token, 0).unwrap();
        assert_eq!(access.grant_id, refresh.grant_id);

        let id_token = service
            .verify_id_token(pair.id_token.as_deref().unwrap(), "client-a")
            .unwrap();
        assert_eq!(id_token.email, "a@b.com");
        assert_eq!(id_token.registered.subject.as_deref(), Some("7"));
        assert!(service.verify_id_token(pair.id_token.as_deref().unwrap(), "client-b").is_err());

        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("id_token").is_some());
    }

    #[test]
    fn test_token_pair_without_id_token_omits_field() {
        let service = hmac_service(OAuth2Config::default());
        let pair = service.issue_token_pair(11, 0, None).unwrap();
        let json = serde_json::to_value(&pair).unwrap();
        assert!(json.get("id_token").is_none());
    }

    #[test]
    fn test_id_token_is_not_accepted_as_access_token() {
        let service = hmac_service(OAuth2Config::default());
        let raw = service
            .issue_id_token(OIDCToken::new("7", "client-a", ""))
            .unwrap();
        assert!(matches!(
            service.verify_token(&raw, TokenKind::AccessToken),
            Err(TokenError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_overlong_id_token_is_rejected() {
        let service = hmac_service(OAuth2Config {
            max_token_length: 16,
            ..Default::default()
        });
        let raw = service
            .issue_id_token(OIDCToken::new("7", "client-a", ""))
            .unwrap();
        assert!(matches!(
            service.verify_id_token(&raw, "client-a"),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_oversized_lifetime_fails_issuance_without_panic() {
        let service = hmac_service(OAuth2Config {
            refresh_token_expiration_time: 9_223_372_036_854_775,
            ..Default::default()
        });
        assert!(matches!(
            service.issue_refresh_token(1, 1),
            Err(TokenError::Config(_))
        ));
        assert!(service.issue_access_token(1).is_ok());
        assert!(matches!(
            service.issue_token_pair(1, 1, None),
            Err(TokenError::Config(_))
        ));
    }

    #[test]
    fn test_lifetime_beyond_calendar_range_fails_issuance() {
        // 100만 년: Duration으로는 표현되지만 현재 시각에 더하면 범위를 벗어남
        let service = hmac_service(OAuth2Config {
            refresh_token_expiration_time: 1_000_000 * 365 * 24,
            ..Default::default()
        });
        assert!(matches!(
            service.issue_refresh_token(1, 1),
            Err(TokenError::Config(_))
        ));
    }
}

//! OAuth2 토큰 도구
//!
//! 환경 설정으로 서명 키를 초기화하고 토큰을 발급하거나 검증합니다.
//!
//! ```bash
//! oauth2_token issue <grant_id> [counter]
//! oauth2_token verify <access|refresh> <token> [current_counter]
//! oauth2_token jwks
//! ```

use std::process::ExitCode;

use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use oauth2_token::config::OAuth2Config;
use oauth2_token::domain::models::token::TokenKind;
use oauth2_token::errors::{TokenError, TokenResult};
use oauth2_token::services::auth::{TokenService, jwks};

const USAGE: &str = "usage:
  oauth2_token issue <grant_id> [counter]
  oauth2_token verify <access|refresh> <token> [current_counter]
  oauth2_token jwks";

fn main() -> ExitCode {
    load_env_file();
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{} ({})", e, e.oauth2_error_code());
            eprintln!("{}", USAGE);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> TokenResult<String> {
    let service = TokenService::from_config(OAuth2Config::from_env())?;

    match args.first().map(String::as_str) {
        Some("issue") => {
            let grant_id = parse_i64(required(args, 1, "grant_id")?, "grant_id")?;
            let counter = args
                .get(2)
                .map(|raw| parse_i64(raw, "counter"))
                .transpose()?
                .unwrap_or(0);

            let pair = service.issue_token_pair(grant_id, counter, None)?;
            info!("✅ Issued token pair for grant {}", grant_id);
            to_json(&pair)
        }
        Some("verify") => {
            let raw = required(args, 2, "token")?;

            let token = match args.get(1).map(String::as_str) {
                Some("access") => service.verify_token(raw, TokenKind::AccessToken)?,
                Some("refresh") => {
                    let current = args
                        .get(3)
                        .map(|raw| parse_i64(raw, "current_counter"))
                        .transpose()?
                        .unwrap_or(0);
                    service.verify_refresh_token(raw, current)?
                }
                other => {
                    return Err(TokenError::Config(format!("unknown token kind: {:?}", other)));
                }
            };
            to_json(&token)
        }
        Some("jwks") => to_json(&jwks(&[service.signing_key().clone()])),
        other => Err(TokenError::Config(format!("unknown command: {:?}", other))),
    }
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> TokenResult<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| TokenError::Config(format!("missing <{}>", name)))
}

fn parse_i64(raw: &str, name: &str) -> TokenResult<i64> {
    raw.parse()
        .map_err(|e| TokenError::Config(format!("invalid <{}>: {}", name, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> TokenResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| TokenError::Config(e.to_string()))
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => {
            dotenv::from_filename(".env.prod").ok();
        }
        "dev" => {
            dotenv::from_filename(".env.dev").ok();
        }
        _ => {
            dotenv().ok();
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// `RUST_LOG` 환경변수로 레벨을 바꿀 수 있으며 기본값은 info 입니다.
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
}

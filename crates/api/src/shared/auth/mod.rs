use actix_web::HttpRequest;
use carepush_domain::ID;
use carepush_infra::CarePushContext;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::CarePushError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    exp: usize,     // Expiration time (as UTC timestamp)
    iat: usize,     // Issued at (as UTC timestamp)
    user_id: ID,    // Subject (whom token refers to)
}

fn parse_authtoken_header(token_header_value: &str) -> String {
    token_header_value
        .replace("Bearer", "")
        .replace("bearer", "")
        .trim()
        .to_string()
}

fn decode_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let claims =
        decode::<Claims>(token, &decoding_key, &Validation::new(Algorithm::HS256))?.claims;

    Ok(claims)
}

/// Resolves the authenticated user from the `Authorization: Bearer` header.
/// Token issuance belongs to the auth service; this guard only verifies the
/// signature and extracts the user.
pub fn protect_route(req: &HttpRequest, ctx: &CarePushContext) -> Result<ID, CarePushError> {
    let token = match req.headers().get("authorization") {
        Some(token) => token,
        None => {
            return Err(CarePushError::Unauthorized(
                "Missing authorization header".into(),
            ))
        }
    };
    let token = match token.to_str() {
        Ok(token) => parse_authtoken_header(token),
        Err(_) => {
            return Err(CarePushError::Unauthorized(
                "Malformed authorization header".into(),
            ))
        }
    };
    match decode_token(&ctx.config.api_secret, &token) {
        Ok(claims) => Ok(claims.user_id),
        Err(_) => Err(CarePushError::Unauthorized(
            "Unable to find user from credentials".into(),
        )),
    }
}

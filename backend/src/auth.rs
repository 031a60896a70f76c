use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpRequest,
};
use chrono::Utc;
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::user::User;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::ApiError;

/// JWT payload: `{ id, email, iat, exp }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity the middleware attaches to every authenticated request
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
}

/// Issues and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expires_in_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_secs,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now + self.expires_in_secs,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            log::error!("Failed to sign token for {}: {}", user.email, e);
            ApiError::internal_error("Failed to issue token")
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected bearer token: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers().get("Authorization").and_then(|auth_header| {
        auth_header.to_str().ok().and_then(|header_str| {
            header_str
                .strip_prefix("Bearer ")
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        })
    })
}

/// Reads the identity inserted by [`AuthMiddleware`]
pub fn authenticated_user(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
}

/// Rejects requests without a valid bearer JWT with 401
pub struct AuthMiddleware {
    pub tokens: Arc<TokenService>,
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let tokens = self.tokens.clone();

        Box::pin(async move {
            let Some(token) = bearer_token(&req) else {
                log::debug!("No bearer token on {} {}", req.method(), req.path());
                return Err(ApiError::unauthorized("Authentication required").into());
            };

            let claims = match tokens.verify(&token) {
                Ok(claims) => claims,
                Err(e) => {
                    log::warn!("Authentication failed for {} {}: {}", req.method(), req.path(), e);
                    return Err(e.into());
                }
            };

            req.extensions_mut().insert(AuthenticatedUser {
                id: claims.id,
                email: claims.email,
            });
            service.call(req).await
        })
    }
}

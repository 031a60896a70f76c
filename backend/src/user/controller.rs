use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use shared::dto::auth::{GoogleAuthResponse, GoogleCallbackQuery, LoginRequest, SignupRequest, TokenResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::user::rate_limit::{login_key, LoginRateLimiter, RedisLoginRateLimiter};
use crate::user::repository::UserRepositoryImpl;
use crate::user::usecase::{AuthUseCase, AuthUseCaseImpl};

pub type ProdAuthUseCase = AuthUseCaseImpl<UserRepositoryImpl>;

pub async fn signup_handler_impl<A>(
    body: web::Json<SignupRequest>,
    usecase: web::Data<A>,
) -> Result<HttpResponse, ApiError>
where
    A: AuthUseCase + 'static,
{
    body.validate()?;
    let token = usecase.signup(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(TokenResponse { token }))
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid email or password", body = ApiError),
        (status = 409, description = "User already exists", body = ApiError)
    ),
    tag = "auth"
)]
#[post("/signup")]
pub async fn signup_handler(
    body: web::Json<SignupRequest>,
    usecase: web::Data<ProdAuthUseCase>,
) -> Result<HttpResponse, ApiError> {
    signup_handler_impl(body, usecase).await
}

pub async fn login_handler_impl<A, L>(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    usecase: web::Data<A>,
    limiter: web::Data<L>,
) -> Result<HttpResponse, ApiError>
where
    A: AuthUseCase + 'static,
    L: LoginRateLimiter + 'static,
{
    // 10 attempts per 5 minutes per IP+email
    let ip = req
        .peer_addr()
        .map(|peer| peer.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if !limiter.allow(&login_key(&ip, &body.email)).await {
        log::warn!("Login rate limit hit for {} from {}", body.email, ip);
        return Err(ApiError::too_many_requests(
            "Too many login attempts. Please try again later.",
        ));
    }

    body.validate()?;
    let token = usecase.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 429, description = "Too many attempts", body = ApiError)
    ),
    tag = "auth"
)]
#[post("/login")]
pub async fn login_handler(
    req: HttpRequest,
    body: web::Json<LoginRequest>,
    usecase: web::Data<ProdAuthUseCase>,
    limiter: web::Data<RedisLoginRateLimiter>,
) -> Result<HttpResponse, ApiError> {
    login_handler_impl(req, body, usecase, limiter).await
}

pub async fn google_redirect_handler_impl<A>(usecase: web::Data<A>) -> Result<HttpResponse, ApiError>
where
    A: AuthUseCase + 'static,
{
    let state = uuid::Uuid::new_v4().to_string();
    let location = usecase.google_authorization_url(&state)?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish())
}

#[utoipa::path(
    get,
    path = "/auth/google",
    responses((status = 302, description = "Redirect to the Google consent screen")),
    tag = "auth"
)]
#[get("/google")]
pub async fn google_redirect_handler(usecase: web::Data<ProdAuthUseCase>) -> Result<HttpResponse, ApiError> {
    google_redirect_handler_impl(usecase).await
}

pub async fn google_callback_handler_impl<A>(
    query: web::Query<GoogleCallbackQuery>,
    usecase: web::Data<A>,
) -> Result<HttpResponse, ApiError>
where
    A: AuthUseCase + 'static,
{
    let query = query.into_inner();
    if let Some(error) = query.error {
        log::info!("Google sign-in cancelled: {}", error);
        return Err(ApiError::unauthorized("Google sign-in was not completed"));
    }
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing authorization code"))?;

    let response = usecase.google_sign_in(&code).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/auth/google/callback",
    params(("code" = Option<String>, Query, description = "Authorization code from Google")),
    responses(
        (status = 200, description = "Signed in with Google", body = GoogleAuthResponse),
        (status = 400, description = "Missing authorization code", body = ApiError),
        (status = 502, description = "Google rejected the exchange", body = ApiError)
    ),
    tag = "auth"
)]
#[get("/google/callback")]
pub async fn google_callback_handler(
    query: web::Query<GoogleCallbackQuery>,
    usecase: web::Data<ProdAuthUseCase>,
) -> Result<HttpResponse, ApiError> {
    google_callback_handler_impl(query, usecase).await
}

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use shared::dto::common::MessageResponse;
use shared::dto::profile::{RequestPhoneVerificationRequest, UpdateProfileRequest, UserDto, VerifyPhoneRequest};

use crate::auth::authenticated_user;
use crate::error::ApiError;
use crate::profile::upload::{read_file_field, UploadKind};
use crate::profile::usecase::{ProfileUseCase, ProfileUseCaseImpl};
use crate::user::repository::UserRepositoryImpl;

pub type ProdProfileUseCase = ProfileUseCaseImpl<UserRepositoryImpl>;

pub async fn get_profile_handler_impl<P>(req: HttpRequest, usecase: web::Data<P>) -> Result<HttpResponse, ApiError>
where
    P: ProfileUseCase + 'static,
{
    let caller = authenticated_user(&req)?;
    let user = usecase.get_profile(&caller.id).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(&user)))
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Caller's profile", body = UserDto),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[get("")]
pub async fn get_profile_handler(
    req: HttpRequest,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    get_profile_handler_impl(req, usecase).await
}

pub async fn update_profile_handler_impl<P>(
    req: HttpRequest,
    body: web::Json<UpdateProfileRequest>,
    usecase: web::Data<P>,
) -> Result<HttpResponse, ApiError>
where
    P: ProfileUseCase + 'static,
{
    let caller = authenticated_user(&req)?;
    let user = usecase.update_profile(&caller.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(&user)))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserDto),
        (status = 400, description = "Invalid field", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[put("")]
pub async fn update_profile_handler(
    req: HttpRequest,
    body: web::Json<UpdateProfileRequest>,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    update_profile_handler_impl(req, body, usecase).await
}

pub async fn delete_profile_handler_impl<P>(req: HttpRequest, usecase: web::Data<P>) -> Result<HttpResponse, ApiError>
where
    P: ProfileUseCase + 'static,
{
    let caller = authenticated_user(&req)?;
    usecase.delete_profile(&caller.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    delete,
    path = "/profile",
    responses(
        (status = 204, description = "Account and its media deleted"),
        (status = 404, description = "User not found", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[delete("")]
pub async fn delete_profile_handler(
    req: HttpRequest,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    delete_profile_handler_impl(req, usecase).await
}

pub async fn upload_handler_impl<P>(
    req: HttpRequest,
    kind: UploadKind,
    payload: Multipart,
    usecase: web::Data<P>,
) -> Result<HttpResponse, ApiError>
where
    P: ProfileUseCase + 'static,
{
    let caller = authenticated_user(&req)?;
    let file = read_file_field(payload).await?;
    let user = usecase.upload_media(&caller.id, kind, file).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(&user)))
}

#[utoipa::path(
    post,
    path = "/profile/profile-picture",
    request_body(content = String, content_type = "multipart/form-data", description = "Field `file`: jpg, jpeg or png up to 5 MB"),
    responses(
        (status = 200, description = "Updated profile", body = UserDto),
        (status = 400, description = "Missing, oversized or unsupported file", body = ApiError),
        (status = 502, description = "Media host failed", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[post("/profile-picture")]
pub async fn upload_profile_picture_handler(
    req: HttpRequest,
    payload: Multipart,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    upload_handler_impl(req, UploadKind::ProfilePicture, payload, usecase).await
}

#[utoipa::path(
    post,
    path = "/profile/portfolio",
    request_body(content = String, content_type = "multipart/form-data", description = "Field `file`: jpg, jpeg, png or pdf up to 5 MB"),
    responses(
        (status = 200, description = "Updated profile", body = UserDto),
        (status = 400, description = "Missing, oversized or unsupported file", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[post("/portfolio")]
pub async fn upload_portfolio_handler(
    req: HttpRequest,
    payload: Multipart,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    upload_handler_impl(req, UploadKind::Portfolio, payload, usecase).await
}

#[utoipa::path(
    post,
    path = "/profile/document/{side}",
    params(("side" = String, Path, description = "`front` or `back`")),
    request_body(content = String, content_type = "multipart/form-data", description = "Field `file`: jpg, jpeg or png up to 5 MB"),
    responses(
        (status = 200, description = "Updated profile", body = UserDto),
        (status = 400, description = "Unknown side or invalid file", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[post("/document/{side}")]
pub async fn upload_document_handler(
    req: HttpRequest,
    path: web::Path<String>,
    payload: Multipart,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    let kind = UploadKind::document_side(&path.into_inner())?;
    upload_handler_impl(req, kind, payload, usecase).await
}

pub async fn request_phone_verification_handler_impl<P>(
    req: HttpRequest,
    body: web::Json<RequestPhoneVerificationRequest>,
    usecase: web::Data<P>,
) -> Result<HttpResponse, ApiError>
where
    P: ProfileUseCase + 'static,
{
    let caller = authenticated_user(&req)?;
    usecase.request_phone_verification(&caller.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Verification code sent to your phone number")))
}

#[utoipa::path(
    post,
    path = "/profile/request-phone-verification",
    request_body = RequestPhoneVerificationRequest,
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "Invalid phone number", body = ApiError),
        (status = 502, description = "SMS gateway failed", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[post("/request-phone-verification")]
pub async fn request_phone_verification_handler(
    req: HttpRequest,
    body: web::Json<RequestPhoneVerificationRequest>,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    request_phone_verification_handler_impl(req, body, usecase).await
}

pub async fn verify_phone_handler_impl<P>(
    req: HttpRequest,
    body: web::Json<VerifyPhoneRequest>,
    usecase: web::Data<P>,
) -> Result<HttpResponse, ApiError>
where
    P: ProfileUseCase + 'static,
{
    let caller = authenticated_user(&req)?;
    let user = usecase.verify_phone(&caller.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(&user)))
}

#[utoipa::path(
    post,
    path = "/profile/verify-phone",
    request_body = VerifyPhoneRequest,
    responses(
        (status = 200, description = "Phone verified", body = UserDto),
        (status = 400, description = "Invalid, expired or missing OTP", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "profile"
)]
#[post("/verify-phone")]
pub async fn verify_phone_handler(
    req: HttpRequest,
    body: web::Json<VerifyPhoneRequest>,
    usecase: web::Data<ProdProfileUseCase>,
) -> Result<HttpResponse, ApiError> {
    verify_phone_handler_impl(req, body, usecase).await
}

use actix_web::{get, patch, post, web, HttpRequest, HttpResponse};
use shared::dto::registration::{
    ParticipantDto, RegisterRequest, RegistrationDto, UpdateStatusRequest, UserTournamentDto,
};
use validator::Validate;

use crate::auth::authenticated_user;
use crate::db::{document_id, REGISTRATION_COLLECTION, TOURNAMENT_COLLECTION};
use crate::error::ApiError;
use crate::registration::repository::{RegistrationRepository, RegistrationRepositoryImpl};
use crate::registration::usecase::{RegistrationUseCase, RegistrationUseCaseImpl};
use crate::tournament::repository::{TournamentRepository, TournamentRepositoryImpl};
use crate::user::repository::{UserRepository, UserRepositoryImpl};

fn usecase<RR, TR, UR>(
    registrations: &web::Data<RR>,
    tournaments: &web::Data<TR>,
    users: &web::Data<UR>,
) -> RegistrationUseCaseImpl<RR, TR, UR>
where
    RR: RegistrationRepository + Clone + 'static,
    TR: TournamentRepository + Clone + 'static,
    UR: UserRepository + Clone + 'static,
{
    RegistrationUseCaseImpl {
        registrations: registrations.get_ref().clone(),
        tournaments: tournaments.get_ref().clone(),
        users: users.get_ref().clone(),
    }
}

pub async fn register_handler_impl<RR, TR, UR>(
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
    registrations: web::Data<RR>,
    tournaments: web::Data<TR>,
    users: web::Data<UR>,
) -> Result<HttpResponse, ApiError>
where
    RR: RegistrationRepository + Clone + 'static,
    TR: TournamentRepository + Clone + 'static,
    UR: UserRepository + Clone + 'static,
{
    let caller = authenticated_user(&req)?;
    body.validate()?;

    let mut request = body.into_inner();
    request.tournament_id = document_id(TOURNAMENT_COLLECTION, &request.tournament_id);

    let registration = usecase(&registrations, &tournaments, &users)
        .register(&caller.id, request)
        .await?;
    Ok(HttpResponse::Created().json(RegistrationDto::from(&registration)))
}

#[utoipa::path(
    post,
    path = "/tournament-registrations",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegistrationDto),
        (status = 401, description = "Missing or invalid token", body = ApiError),
        (status = 404, description = "Tournament or user not found", body = ApiError),
        (status = 409, description = "Already registered or tournament full", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "registrations"
)]
#[post("")]
pub async fn register_handler(
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
    registrations: web::Data<RegistrationRepositoryImpl>,
    tournaments: web::Data<TournamentRepositoryImpl>,
    users: web::Data<UserRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    register_handler_impl(req, body, registrations, tournaments, users).await
}

pub async fn my_tournaments_handler_impl<RR, TR, UR>(
    req: HttpRequest,
    registrations: web::Data<RR>,
    tournaments: web::Data<TR>,
    users: web::Data<UR>,
) -> Result<HttpResponse, ApiError>
where
    RR: RegistrationRepository + Clone + 'static,
    TR: TournamentRepository + Clone + 'static,
    UR: UserRepository + Clone + 'static,
{
    let caller = authenticated_user(&req)?;
    let entries = usecase(&registrations, &tournaments, &users)
        .list_for_user(&caller.id)
        .await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[utoipa::path(
    get,
    path = "/tournament-registrations/my-tournaments",
    responses(
        (status = 200, description = "Tournaments the caller registered for", body = [UserTournamentDto]),
        (status = 401, description = "Missing or invalid token", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "registrations"
)]
#[get("/my-tournaments")]
pub async fn my_tournaments_handler(
    req: HttpRequest,
    registrations: web::Data<RegistrationRepositoryImpl>,
    tournaments: web::Data<TournamentRepositoryImpl>,
    users: web::Data<UserRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    my_tournaments_handler_impl(req, registrations, tournaments, users).await
}

pub async fn participants_handler_impl<RR, TR, UR>(
    path: web::Path<String>,
    registrations: web::Data<RR>,
    tournaments: web::Data<TR>,
    users: web::Data<UR>,
) -> Result<HttpResponse, ApiError>
where
    RR: RegistrationRepository + Clone + 'static,
    TR: TournamentRepository + Clone + 'static,
    UR: UserRepository + Clone + 'static,
{
    let tournament_id = document_id(TOURNAMENT_COLLECTION, &path.into_inner());
    let participants = usecase(&registrations, &tournaments, &users)
        .list_participants(&tournament_id)
        .await?;
    Ok(HttpResponse::Ok().json(participants))
}

/// Registered without the auth scope, so the full path is spelled out
#[utoipa::path(
    get,
    path = "/tournament-registrations/tournament/{tournament_id}/participants",
    params(("tournament_id" = String, Path, description = "Tournament key or full id")),
    responses((status = 200, description = "Participants of the tournament", body = [ParticipantDto])),
    tag = "registrations"
)]
#[get("/tournament-registrations/tournament/{tournament_id}/participants")]
pub async fn participants_handler(
    path: web::Path<String>,
    registrations: web::Data<RegistrationRepositoryImpl>,
    tournaments: web::Data<TournamentRepositoryImpl>,
    users: web::Data<UserRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    participants_handler_impl(path, registrations, tournaments, users).await
}

pub async fn update_status_handler_impl<RR, TR, UR>(
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
    registrations: web::Data<RR>,
    tournaments: web::Data<TR>,
    users: web::Data<UR>,
) -> Result<HttpResponse, ApiError>
where
    RR: RegistrationRepository + Clone + 'static,
    TR: TournamentRepository + Clone + 'static,
    UR: UserRepository + Clone + 'static,
{
    let registration_id = document_id(REGISTRATION_COLLECTION, &path.into_inner());
    let registration = usecase(&registrations, &tournaments, &users)
        .update_status(&registration_id, &body.status)
        .await?;
    Ok(HttpResponse::Ok().json(RegistrationDto::from(&registration)))
}

#[utoipa::path(
    patch,
    path = "/tournament-registrations/{registration_id}/status",
    params(("registration_id" = String, Path, description = "Registration key or full id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = RegistrationDto),
        (status = 400, description = "Unknown status", body = ApiError),
        (status = 404, description = "Registration not found", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "registrations"
)]
#[patch("/{registration_id}/status")]
pub async fn update_status_handler(
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
    registrations: web::Data<RegistrationRepositoryImpl>,
    tournaments: web::Data<TournamentRepositoryImpl>,
    users: web::Data<UserRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    update_status_handler_impl(path, body, registrations, tournaments, users).await
}

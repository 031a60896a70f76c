use actix_web::{get, post, web, HttpResponse};
use shared::dto::tournament::{CreateTournamentRequest, TournamentDto};

use crate::db::{document_id, TOURNAMENT_COLLECTION};
use crate::error::ApiError;
use crate::tournament::repository::{TournamentRepository, TournamentRepositoryImpl};
use crate::tournament::usecase::{TournamentUseCase, TournamentUseCaseImpl};

pub async fn create_tournament_handler_impl<R>(
    body: web::Json<CreateTournamentRequest>,
    repo: web::Data<R>,
) -> Result<HttpResponse, ApiError>
where
    R: TournamentRepository + Clone + 'static,
{
    let usecase = TournamentUseCaseImpl { repo: repo.get_ref().clone() };
    let tournament = usecase.create_tournament(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(TournamentDto::from(&tournament)))
}

#[utoipa::path(
    post,
    path = "/tournaments",
    request_body = CreateTournamentRequest,
    responses(
        (status = 201, description = "Tournament created", body = TournamentDto),
        (status = 400, description = "Invalid tournament", body = ApiError)
    ),
    tag = "tournaments"
)]
#[post("")]
pub async fn create_tournament_handler(
    body: web::Json<CreateTournamentRequest>,
    repo: web::Data<TournamentRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    create_tournament_handler_impl::<TournamentRepositoryImpl>(body, repo).await
}

pub async fn get_tournament_handler_impl<R>(
    path: web::Path<String>,
    repo: web::Data<R>,
) -> Result<HttpResponse, ApiError>
where
    R: TournamentRepository + Clone + 'static,
{
    let usecase = TournamentUseCaseImpl { repo: repo.get_ref().clone() };
    let id = document_id(TOURNAMENT_COLLECTION, &path.into_inner());
    let tournament = usecase.get_tournament(&id).await?;
    Ok(HttpResponse::Ok().json(TournamentDto::from(&tournament)))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}",
    params(("id" = String, Path, description = "Tournament key or full id")),
    responses(
        (status = 200, description = "Tournament", body = TournamentDto),
        (status = 404, description = "Tournament not found", body = ApiError)
    ),
    tag = "tournaments"
)]
#[get("/{id}")]
pub async fn get_tournament_handler(
    path: web::Path<String>,
    repo: web::Data<TournamentRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    get_tournament_handler_impl::<TournamentRepositoryImpl>(path, repo).await
}

pub async fn list_tournaments_handler_impl<R>(repo: web::Data<R>) -> Result<HttpResponse, ApiError>
where
    R: TournamentRepository + Clone + 'static,
{
    let usecase = TournamentUseCaseImpl { repo: repo.get_ref().clone() };
    let tournaments = usecase.list_tournaments().await?;
    let dtos: Vec<TournamentDto> = tournaments.iter().map(TournamentDto::from).collect();
    Ok(HttpResponse::Ok().json(dtos))
}

#[utoipa::path(
    get,
    path = "/tournaments",
    responses((status = 200, description = "All tournaments", body = [TournamentDto])),
    tag = "tournaments"
)]
#[get("")]
pub async fn list_tournaments_handler(
    repo: web::Data<TournamentRepositoryImpl>,
) -> Result<HttpResponse, ApiError> {
    list_tournaments_handler_impl::<TournamentRepositoryImpl>(repo).await
}

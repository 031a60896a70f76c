use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared::dto::tournament::CreateTournamentRequest;

use crate::test_support::{tournament, MockTournamentRepository};
use crate::tournament::controller::{
    create_tournament_handler_impl, get_tournament_handler_impl, list_tournaments_handler_impl,
};
use crate::tournament::error::TournamentError;
use crate::tournament::usecase::{TournamentUseCase, TournamentUseCaseImpl};

fn request(start: &str, end: &str, fee: f64) -> CreateTournamentRequest {
    CreateTournamentRequest {
        name: "Spring Open".to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
        description: Some("Best of three".to_string()),
        participant_limit: 16,
        entry_fee: fee,
    }
}

#[tokio::test]
async fn test_create_tournament_assigns_id_and_keeps_fields() {
    let repo = MockTournamentRepository::default();
    let usecase = TournamentUseCaseImpl { repo: repo.clone() };

    let created = usecase
        .create_tournament(request("2025-01-01", "2025-01-02", 49.99))
        .await
        .unwrap();

    assert!(created.id.starts_with("tournament/"));
    assert_eq!(created.entry_fee, 49.99);
    assert_eq!(created.participant_limit, 16);
    assert!(created.is_active);
    assert_eq!(repo.tournaments.lock().await.len(), 1);
}

#[tokio::test]
async fn test_create_tournament_rejects_bad_dates() {
    let usecase = TournamentUseCaseImpl { repo: MockTournamentRepository::default() };

    let garbled = usecase.create_tournament(request("soon", "2025-01-02", 0.0)).await;
    assert!(matches!(garbled, Err(TournamentError::Validation(_))));

    let backwards = usecase.create_tournament(request("2025-02-01", "2025-01-01", 0.0)).await;
    assert!(matches!(backwards, Err(TournamentError::Validation(_))));
}

#[tokio::test]
async fn test_create_tournament_rejects_fraction_of_a_cent() {
    let repo = MockTournamentRepository::default();
    let usecase = TournamentUseCaseImpl { repo: repo.clone() };

    let result = usecase.create_tournament(request("2025-01-01", "2025-01-02", 0.004)).await;
    assert!(matches!(result, Err(TournamentError::Validation(_))));
    assert!(repo.tournaments.lock().await.is_empty());
}

#[actix_web::test]
async fn test_create_endpoint_rejects_sub_cent_fee() {
    let repo = MockTournamentRepository::default();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(repo.clone()))
            .route("/tournaments", web::post().to(create_tournament_handler_impl::<MockTournamentRepository>)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/tournaments")
        .set_json(json!({
            "name": "Penny Cup",
            "startDate": "2025-01-01",
            "endDate": "2025-01-02",
            "entryFee": 0.004
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert!(repo.tournaments.lock().await.is_empty());
}

#[tokio::test]
async fn test_get_tournament_not_found() {
    let usecase = TournamentUseCaseImpl { repo: MockTournamentRepository::default() };
    assert_eq!(usecase.get_tournament("tournament/missing").await, Err(TournamentError::NotFound));
}

#[actix_web::test]
async fn test_create_endpoint_returns_plain_numeric_fee() {
    let repo = MockTournamentRepository::default();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(repo.clone()))
            .route("/tournaments", web::post().to(create_tournament_handler_impl::<MockTournamentRepository>)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/tournaments")
        .set_json(json!({
            "name": "Spring Open",
            "startDate": "2025-01-01",
            "endDate": "2025-01-02",
            "participantLimit": 8,
            "entryFee": 49.99
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["entryFee"], json!(49.99));
    assert_eq!(body["participantLimit"], json!(8));
    assert_eq!(body["isActive"], json!(true));
    assert!(body["id"].as_str().unwrap().starts_with("tournament/"));
}

#[actix_web::test]
async fn test_create_endpoint_rejects_end_before_start() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(MockTournamentRepository::default()))
            .route("/tournaments", web::post().to(create_tournament_handler_impl::<MockTournamentRepository>)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/tournaments")
        .set_json(json!({
            "name": "Backwards Cup",
            "startDate": "2025-03-01",
            "endDate": "2025-02-01"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_get_endpoint_accepts_bare_key() {
    let repo = MockTournamentRepository::with(vec![tournament("tournament/abc", 4, 10.0)]);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(repo))
            .route("/tournaments/{id}", web::get().to(get_tournament_handler_impl::<MockTournamentRepository>)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/tournaments/abc").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], "tournament/abc");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/tournaments/nope").to_request()).await;
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Tournament not found");
}

#[actix_web::test]
async fn test_list_endpoint_returns_every_tournament() {
    let repo = MockTournamentRepository::with(vec![
        tournament("tournament/1", 0, 0.0),
        tournament("tournament/2", 2, 5.5),
    ]);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(repo))
            .route("/tournaments", web::get().to(list_tournaments_handler_impl::<MockTournamentRepository>)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/tournaments").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert_eq!(body.len(), 2);
    assert_eq!(body[1]["entryFee"], json!(5.5));
}

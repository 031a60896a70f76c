use std::sync::Arc;

use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use serde_json::json;
use shared::dto::registration::RegisterRequest;
use shared::models::registration::{Registration, RegistrationStatus};

use crate::auth::{AuthMiddleware, TokenService};
use crate::error::ApiError;
use crate::registration::controller::{
    my_tournaments_handler_impl, participants_handler_impl, register_handler_impl, update_status_handler_impl,
};
use crate::registration::error::RegistrationError;
use crate::registration::repository::{InsertOutcome, RegistrationRepository};
use crate::registration::usecase::{RegistrationUseCase, RegistrationUseCaseImpl};
use crate::test_support::{
    tournament, user, MockRegistrationRepository, MockTournamentRepository, MockUserRepository,
};

type TestUseCase = RegistrationUseCaseImpl<MockRegistrationRepository, MockTournamentRepository, MockUserRepository>;

fn join(tournament_id: &str, has_paid: Option<bool>) -> RegisterRequest {
    RegisterRequest {
        tournament_id: tournament_id.to_string(),
        has_paid,
        payment_details: None,
    }
}

fn setup(limit: i64, fee: f64, user_ids: &[&str]) -> TestUseCase {
    let users = user_ids
        .iter()
        .enumerate()
        .map(|(i, id)| user(id, &format!("player{}@example.com", i)))
        .collect();
    RegistrationUseCaseImpl {
        registrations: MockRegistrationRepository::default(),
        tournaments: MockTournamentRepository::with(vec![tournament("tournament/cup", limit, fee)]),
        users: MockUserRepository::with(users),
    }
}

fn existing(user_id: &str, status: RegistrationStatus) -> Registration {
    let mut r = Registration::new_for_db(user_id.to_string(), "tournament/cup".to_string(), status, false, None);
    r.id = format!("tournament_registration/{}", user_id.replace('/', "-"));
    r
}

#[tokio::test]
async fn test_free_tournament_approves_immediately() {
    let usecase = setup(0, 0.0, &["user/a"]);
    let registration = usecase.register("user/a", join("tournament/cup", None)).await.unwrap();

    assert_eq!(registration.status, RegistrationStatus::Approved);
    assert!(!registration.has_paid);
    assert_eq!(registration.tournament_id, "tournament/cup");
}

#[tokio::test]
async fn test_paid_tournament_status_follows_payment() {
    let usecase = setup(0, 25.0, &["user/a", "user/b"]);

    let unpaid = usecase.register("user/a", join("tournament/cup", None)).await.unwrap();
    assert_eq!(unpaid.status, RegistrationStatus::Pending);

    let paid = usecase.register("user/b", join("tournament/cup", Some(true))).await.unwrap();
    assert_eq!(paid.status, RegistrationStatus::Approved);
    assert!(paid.has_paid);
}

#[tokio::test]
async fn test_payment_details_are_stored_verbatim() {
    let usecase = setup(0, 25.0, &["user/a"]);
    let details = json!({"provider": "card", "ref": "ch_123"});
    let request = RegisterRequest {
        tournament_id: "tournament/cup".to_string(),
        has_paid: Some(true),
        payment_details: Some(details.clone()),
    };

    let registration = usecase.register("user/a", request).await.unwrap();
    assert_eq!(registration.payment_details, Some(details));
}

#[tokio::test]
async fn test_second_registration_is_a_conflict() {
    let usecase = setup(0, 0.0, &["user/a"]);
    usecase.register("user/a", join("tournament/cup", None)).await.unwrap();

    let again = usecase.register("user/a", join("tournament/cup", None)).await;
    assert_eq!(again, Err(RegistrationError::AlreadyRegistered));
    assert_eq!(usecase.registrations.all().await.len(), 1);
}

#[tokio::test]
async fn test_last_seat_goes_to_first_caller() {
    let usecase = setup(1, 0.0, &["user/a", "user/b"]);

    let first = usecase.register("user/a", join("tournament/cup", None)).await.unwrap();
    assert_eq!(first.status, RegistrationStatus::Approved);

    let second = usecase.register("user/b", join("tournament/cup", None)).await;
    assert_eq!(second, Err(RegistrationError::ParticipantLimitReached));

    let api: ApiError = second.unwrap_err().into();
    assert_eq!(api.status_code, 409);
    assert!(api.message.contains("participant limit"));
}

#[tokio::test]
async fn test_capacity_holds_over_many_callers() {
    let ids: Vec<String> = (0..10).map(|i| format!("user/{}", i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let usecase = setup(3, 0.0, &refs);

    let mut accepted = 0;
    for id in &ids {
        if usecase.register(id, join("tournament/cup", None)).await.is_ok() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 3);
    assert_eq!(usecase.registrations.count_active("tournament/cup").await.unwrap(), 3);
}

#[tokio::test]
async fn test_rejected_registrations_free_their_seat() {
    let usecase = setup(1, 0.0, &["user/a", "user/b"]);
    usecase
        .registrations
        .registrations
        .lock()
        .await
        .push(existing("user/a", RegistrationStatus::Rejected));

    let registration = usecase.register("user/b", join("tournament/cup", None)).await.unwrap();
    assert_eq!(registration.status, RegistrationStatus::Approved);
}

#[tokio::test]
async fn test_lost_race_surfaces_as_conflict() {
    let usecase = setup(2, 0.0, &["user/a"]);
    *usecase.registrations.forced_outcome.lock().await = Some(InsertOutcome::CapacityReached);

    let result = usecase.register("user/a", join("tournament/cup", None)).await;
    assert_eq!(result, Err(RegistrationError::ParticipantLimitReached));

    *usecase.registrations.forced_outcome.lock().await = Some(InsertOutcome::Duplicate);
    let result = usecase.register("user/a", join("tournament/cup", None)).await;
    assert_eq!(result, Err(RegistrationError::AlreadyRegistered));
}

#[tokio::test]
async fn test_missing_tournament_reported_before_missing_user() {
    let usecase = setup(0, 0.0, &[]);

    let result = usecase.register("user/ghost", join("tournament/none", None)).await;
    assert_eq!(result, Err(RegistrationError::TournamentNotFound));

    let result = usecase.register("user/ghost", join("tournament/cup", None)).await;
    assert_eq!(result, Err(RegistrationError::UserNotFound));
}

#[tokio::test]
async fn test_update_status_stores_exact_value() {
    let usecase = setup(0, 25.0, &["user/a"]);
    let pending = usecase.register("user/a", join("tournament/cup", None)).await.unwrap();

    let updated = usecase.update_status(&pending.id, "approved").await.unwrap();
    assert_eq!(updated.status, RegistrationStatus::Approved);

    let rejected = usecase.update_status(&pending.id, "rejected").await.unwrap();
    assert_eq!(rejected.status, RegistrationStatus::Rejected);
}

#[tokio::test]
async fn test_update_status_errors() {
    let usecase = setup(0, 0.0, &["user/a"]);
    let registration = usecase.register("user/a", join("tournament/cup", None)).await.unwrap();

    let missing = usecase.update_status("tournament_registration/nope", "approved").await;
    assert_eq!(missing, Err(RegistrationError::RegistrationNotFound));

    let invalid = usecase.update_status(&registration.id, "cancelled").await;
    assert!(matches!(invalid, Err(RegistrationError::InvalidStatus(_))));

    let api: ApiError = invalid.unwrap_err().into();
    assert_eq!(api.status_code, 400);
}

#[tokio::test]
async fn test_list_for_user_annotates_each_tournament() {
    let usecase = RegistrationUseCaseImpl {
        registrations: MockRegistrationRepository::default(),
        tournaments: MockTournamentRepository::with(vec![
            tournament("tournament/free", 0, 0.0),
            tournament("tournament/paid", 0, 10.0),
            tournament("tournament/other", 0, 0.0),
        ]),
        users: MockUserRepository::with(vec![user("user/a", "a@example.com")]),
    };
    usecase.register("user/a", join("tournament/free", None)).await.unwrap();
    usecase.register("user/a", join("tournament/paid", None)).await.unwrap();

    let mut entries = usecase.list_for_user("user/a").await.unwrap();
    entries.sort_by(|a, b| a.tournament.id.cmp(&b.tournament.id));

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].tournament.id, "tournament/free");
    assert_eq!(entries[0].registration_status, Some(RegistrationStatus::Approved));
    assert_eq!(entries[1].tournament.id, "tournament/paid");
    assert_eq!(entries[1].registration_status, Some(RegistrationStatus::Pending));

    assert!(usecase.list_for_user("user/nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_participants_never_expose_passwords() {
    let usecase = setup(0, 0.0, &["user/a", "user/b"]);
    usecase.register("user/a", join("tournament/cup", None)).await.unwrap();
    usecase.register("user/b", join("tournament/cup", Some(true))).await.unwrap();

    let participants = usecase.list_participants("tournament/cup").await.unwrap();
    assert_eq!(participants.len(), 2);

    let body = serde_json::to_value(&participants).unwrap();
    for entry in body.as_array().unwrap() {
        assert!(entry.get("password").is_none());
        assert_eq!(entry["registrationStatus"], "approved");
    }

    assert!(usecase.list_participants("tournament/unknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_participants_skip_deleted_users() {
    let usecase = setup(0, 0.0, &["user/a"]);
    usecase
        .registrations
        .registrations
        .lock()
        .await
        .push(existing("user/gone", RegistrationStatus::Approved));
    usecase.register("user/a", join("tournament/cup", None)).await.unwrap();

    let participants = usecase.list_participants("tournament/cup").await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].user.id, "user/a");
}

fn token_for(tokens: &TokenService, id: &str, email: &str) -> String {
    tokens.issue(&user(id, email)).unwrap()
}

#[actix_web::test]
async fn test_register_endpoint_uses_token_identity() {
    let tokens = Arc::new(TokenService::new("registration-test-secret", 3600));
    let registrations = MockRegistrationRepository::default();
    let tournaments = MockTournamentRepository::with(vec![tournament("tournament/cup", 1, 0.0)]);
    let users = MockUserRepository::with(vec![
        user("user/a", "a@example.com"),
        user("user/b", "b@example.com"),
    ]);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(registrations.clone()))
            .app_data(web::Data::new(tournaments))
            .app_data(web::Data::new(users))
            .service(
                web::scope("/tournament-registrations")
                    .wrap(AuthMiddleware { tokens: tokens.clone() })
                    .route(
                        "",
                        web::post().to(register_handler_impl::<
                            MockRegistrationRepository,
                            MockTournamentRepository,
                            MockUserRepository,
                        >),
                    )
                    .route(
                        "/my-tournaments",
                        web::get().to(my_tournaments_handler_impl::<
                            MockRegistrationRepository,
                            MockTournamentRepository,
                            MockUserRepository,
                        >),
                    ),
            ),
    )
    .await;

    let token_a = token_for(&tokens, "user/a", "a@example.com");
    let req = test::TestRequest::post()
        .uri("/tournament-registrations")
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .set_json(json!({"tournamentId": "cup"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["userId"], "user/a");
    assert_eq!(body["tournamentId"], "tournament/cup");
    assert_eq!(body["status"], "approved");

    let token_b = token_for(&tokens, "user/b", "b@example.com");
    let req = test::TestRequest::post()
        .uri("/tournament-registrations")
        .insert_header(("Authorization", format!("Bearer {}", token_b)))
        .set_json(json!({"tournamentId": "tournament/cup"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "CONFLICT");

    let req = test::TestRequest::get()
        .uri("/tournament-registrations/my-tournaments")
        .insert_header(("Authorization", format!("Bearer {}", token_a)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["id"], "tournament/cup");
    assert_eq!(body[0]["registrationStatus"], "approved");

    assert_eq!(registrations.all().await.len(), 1);
}

#[actix_web::test]
async fn test_register_endpoint_requires_tournament_id() {
    let tokens = Arc::new(TokenService::new("registration-test-secret", 3600));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(MockRegistrationRepository::default()))
            .app_data(web::Data::new(MockTournamentRepository::default()))
            .app_data(web::Data::new(MockUserRepository::with(vec![user("user/a", "a@example.com")])))
            .service(
                web::scope("/tournament-registrations")
                    .wrap(AuthMiddleware { tokens: tokens.clone() })
                    .route(
                        "",
                        web::post().to(register_handler_impl::<
                            MockRegistrationRepository,
                            MockTournamentRepository,
                            MockUserRepository,
                        >),
                    ),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/tournament-registrations")
        .insert_header(("Authorization", format!("Bearer {}", token_for(&tokens, "user/a", "a@example.com"))))
        .set_json(json!({"tournamentId": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_status_and_participant_endpoints() {
    let registrations = MockRegistrationRepository::default();
    let usecase = RegistrationUseCaseImpl {
        registrations: registrations.clone(),
        tournaments: MockTournamentRepository::with(vec![tournament("tournament/cup", 0, 30.0)]),
        users: MockUserRepository::with(vec![user("user/a", "a@example.com")]),
    };
    let pending = usecase.register("user/a", join("tournament/cup", None)).await.unwrap();
    let key = pending.id.trim_start_matches("tournament_registration/").to_string();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(registrations))
            .app_data(web::Data::new(usecase.tournaments.clone()))
            .app_data(web::Data::new(usecase.users.clone()))
            .route(
                "/tournament-registrations/{registration_id}/status",
                web::patch().to(update_status_handler_impl::<
                    MockRegistrationRepository,
                    MockTournamentRepository,
                    MockUserRepository,
                >),
            )
            .route(
                "/tournament-registrations/tournament/{tournament_id}/participants",
                web::get().to(participants_handler_impl::<
                    MockRegistrationRepository,
                    MockTournamentRepository,
                    MockUserRepository,
                >),
            ),
    )
    .await;

    let req = test::TestRequest::patch()
        .uri(&format!("/tournament-registrations/{}/status", key))
        .set_json(json!({"status": "Approved"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::patch()
        .uri(&format!("/tournament-registrations/{}/status", key))
        .set_json(json!({"status": "approved"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "approved");

    let req = test::TestRequest::patch()
        .uri("/tournament-registrations/missing/status")
        .set_json(json!({"status": "approved"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri("/tournament-registrations/tournament/cup/participants")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Vec<serde_json::Value> = test::read_body_json(resp).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["email"], "a@example.com");
    assert_eq!(body[0]["registrationStatus"], "approved");
    assert!(body[0].get("password").is_none());
}

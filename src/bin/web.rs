//! Single binary web server: REST API over the draw engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use club_tournament_web::{
    clear_match_result, generate_draw, mark_match_retirement, record_match_result,
    swap_players_in_bracket, swap_players_in_group, update_group_match, Category, CategoryId,
    DrawConfig, GroupMatchUpdate, SetScore, SlotSide,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-category entry: draw state + last activity time (for auto-cleanup).
struct CategoryEntry {
    category: Category,
    last_activity: Instant,
}

/// In-memory state: many categories by ID (sessioned). Entries are removed
/// after 12h inactivity.
type AppState = Data<RwLock<HashMap<CategoryId, CategoryEntry>>>;

/// Inactivity threshold: categories not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegistrationBody {
    name: String,
    #[serde(default)]
    seed: Option<u32>,
}

#[derive(Deserialize)]
struct CreateCategoryBody {
    name: String,
    #[serde(default)]
    registrations: Vec<RegistrationBody>,
    #[serde(default)]
    config: Option<DrawConfig>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner_id: Uuid,
    score: Vec<SetScore>,
}

#[derive(Deserialize)]
struct RetirementBody {
    retired_player_id: Uuid,
    winner_id: Uuid,
}

#[derive(Deserialize)]
struct BracketSwapBody {
    match1_id: Uuid,
    slot1: SlotSide,
    match2_id: Uuid,
    slot2: SlotSide,
}

#[derive(Deserialize)]
struct GroupSwapBody {
    group_id: Uuid,
    player1_id: Uuid,
    player2_id: Uuid,
}

/// Path segment: category id (e.g. /api/categories/{id})
#[derive(Deserialize)]
struct CategoryPath {
    id: CategoryId,
}

/// Path segments: category id and match id (e.g. /api/categories/{id}/matches/{match_id})
#[derive(Deserialize)]
struct CategoryMatchPath {
    id: CategoryId,
    match_id: Uuid,
}

/// Path segments: category id and registration id.
#[derive(Deserialize)]
struct CategoryRegistrationPath {
    id: CategoryId,
    registration_id: Uuid,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "club-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new category (returns it with id; client stores id for subsequent requests).
#[post("/api/categories")]
async fn api_create_category(state: AppState, body: Json<CreateCategoryBody>) -> HttpResponse {
    let mut category = Category::new(body.name.trim());
    if let Some(config) = body.config {
        category.config = config;
    }
    for r in &body.registrations {
        if let Err(e) = category.add_registration(r.name.trim(), r.seed) {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
        }
    }
    let id = category.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        id,
        CategoryEntry {
            category,
            last_activity: Instant::now(),
        },
    );
    match g.get(&id) {
        Some(entry) => HttpResponse::Ok().json(&entry.category),
        None => HttpResponse::InternalServerError().body("state error"),
    }
}

/// Get a category by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/categories/{id}")]
async fn api_get_category(state: AppState, path: Path<CategoryPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.category)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    }
}

/// Add a registration (only before the draw is generated for seeds to matter).
#[post("/api/categories/{id}/registrations")]
async fn api_add_registration(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<RegistrationBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match c.add_registration(body.name.trim(), body.seed) {
        Ok(_) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Remove a registration by id (only valid before the draw is generated).
#[delete("/api/categories/{id}/registrations/{registration_id}")]
async fn api_remove_registration(
    state: AppState,
    path: Path<CategoryRegistrationPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match c.remove_registration(path.registration_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Generate (or regenerate) the draw. An optional body replaces the stored
/// draw configuration first. Destroys all previous brackets and groups.
#[post("/api/categories/{id}/draw")]
async fn api_generate_draw(
    state: AppState,
    path: Path<CategoryPath>,
    body: Option<Json<DrawConfig>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    if let Some(config) = body {
        c.config = *config;
    }
    match generate_draw(c, &mut rand::thread_rng()) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Record a match result and advance winner and loser.
#[post("/api/categories/{id}/matches/{match_id}/result")]
async fn api_record_result(
    state: AppState,
    path: Path<CategoryMatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match record_match_result(c, path.match_id, body.winner_id, body.score.clone()) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Clear a match result, unwinding everything it propagated.
#[delete("/api/categories/{id}/matches/{match_id}/result")]
async fn api_clear_result(state: AppState, path: Path<CategoryMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match clear_match_result(c, path.match_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Record a mid-match retirement; the named winner advances.
#[post("/api/categories/{id}/matches/{match_id}/retirement")]
async fn api_mark_retirement(
    state: AppState,
    path: Path<CategoryMatchPath>,
    body: Json<RetirementBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match mark_match_retirement(c, path.match_id, body.retired_player_id, body.winner_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Update a group match; its group's standings recompute afterwards.
#[put("/api/categories/{id}/group-matches/{match_id}")]
async fn api_update_group_match(
    state: AppState,
    path: Path<CategoryMatchPath>,
    body: Json<GroupMatchUpdate>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match update_group_match(c, path.match_id, body.into_inner()) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Exchange two players between bracket slots (admin correction).
#[post("/api/categories/{id}/swaps/bracket")]
async fn api_swap_in_bracket(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<BracketSwapBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match swap_players_in_bracket(c, body.match1_id, body.slot1, body.match2_id, body.slot2) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Exchange two players within a group (admin correction).
#[post("/api/categories/{id}/swaps/group")]
async fn api_swap_in_group(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<GroupSwapBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No category" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.category;
    match swap_players_in_group(c, body.group_id, body.player1_id, body.player2_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<CategoryId, CategoryEntry>::new()));

    // Background task: every 30 minutes, remove categories inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive categor{} (no activity for 12h)",
                    removed,
                    if removed == 1 { "y" } else { "ies" }
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_create_category)
            .service(api_get_category)
            .service(api_add_registration)
            .service(api_remove_registration)
            .service(api_generate_draw)
            .service(api_record_result)
            .service(api_clear_result)
            .service(api_mark_retirement)
            .service(api_update_group_match)
            .service(api_swap_in_bracket)
            .service(api_swap_in_group)
    })
    .bind(bind)?
    .run()
    .await
}

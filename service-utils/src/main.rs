//! Demo server wiring the route adapters and payload middleware together.

use actix_web::{web, App, HttpResponse, HttpServer};
use color_eyre::eyre::{eyre, Context, Result};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use service_utils::inbound::http::JsonKind;
use service_utils::{
    get_date_from_uuid, logic_error, route_async, route_nextable_async, standarlize,
    transform_body, validate_body, validate_query, FieldRules, RouteRequest, ServiceOutcome,
    ServiceSettings, Trace,
};

#[derive(Deserialize)]
struct UuidQuery {
    uuid: String,
}

async fn uuid_time(req: RouteRequest) -> ServiceOutcome<Value> {
    let UuidQuery { uuid } = req.query()?;
    let Some(date) = get_date_from_uuid(&uuid) else {
        return Err(
            logic_error("Invalid UUID", "UUID carries no usable timestamp", 422, 1, [uuid])
                .into(),
        );
    };
    Ok(json!({ "uuid": uuid, "createdAt": date.to_rfc3339() }))
}

async fn slug(req: RouteRequest) -> ServiceOutcome<Value> {
    let body: Value = req.json()?;
    let text = body.get("text").and_then(Value::as_str).unwrap_or_default();
    Ok(json!({ "slug": standarlize(text).replace(' ', "-") }))
}

/// Serves the well-known greeting directly; other names fall through.
async fn cached_greeting(req: RouteRequest) -> ServiceOutcome<Option<Value>> {
    Ok(req
        .match_info("name")
        .filter(|name| *name == "world")
        .map(|_| json!({ "greeting": "hello, world", "cached": true })))
}

async fn greeting(path: web::Path<String>) -> HttpResponse {
    let greeting = format!("hello, {}", path.into_inner());
    HttpResponse::Ok().json(json!({ "greeting": greeting, "cached": false }))
}

fn trim_text(mut body: Value) -> Result<Value, &'static str> {
    if !body.is_object() {
        return Err("body must be an object");
    }
    if let Some(Value::String(inner)) = body.get_mut("text") {
        *inner = inner.trim().to_owned();
    }
    Ok(body)
}

fn init_tracing(json_logs: bool) {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    let result = if json_logs {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings =
        ServiceSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    init_tracing(settings.json_logs());

    let bind_addr = settings.bind_addr().to_owned();
    info!(%bind_addr, "starting server");

    HttpServer::new(|| {
        let api = web::scope("/api/v1")
            .service(
                web::resource("/uuid-time")
                    .wrap(validate_query(FieldRules::new().required("uuid")))
                    .get(route_async(uuid_time)),
            )
            .service(
                web::resource("/slug")
                    .wrap(transform_body(trim_text))
                    .wrap(validate_body(
                        FieldRules::new().required("text").kind("text", JsonKind::String),
                    ))
                    .post(route_async(slug)),
            )
            .service(
                web::resource("/greetings/{name}")
                    .wrap(route_nextable_async(cached_greeting))
                    .get(greeting),
            );

        App::new().wrap(Trace).service(api)
    })
    .bind(bind_addr.as_str())
    .wrap_err_with(|| format!("failed to bind {bind_addr}"))?
    .run()
    .await
    .wrap_err("server terminated with an error")
}

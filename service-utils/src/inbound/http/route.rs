//! Adapters turning async service functions into actix-web routes.
//!
//! A service function receives a [`RouteRequest`] and resolves to a
//! [`ServiceOutcome`]. The adapters guarantee exactly one terminal response
//! per request: the outcome is handed to a single-use [`ServiceCallback`]
//! derived from the request by a [`CallbackProvider`].
//!
//! - [`route_async`] is an ordinary handler for `web::to`.
//! - [`route_nextable_async`] is middleware. Its service function may resolve
//!   to `Ok(None)` to defer to the next service in the chain.
//!
//! A body that cannot be read (too large, broken stream) is reported through
//! the same callback as a handler failure, carrying the matching status.

use std::future::Future;
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::web::{Bytes, Query};
use actix_web::{Error, HttpRequest, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use super::envelope::{
    CallbackProvider, EnvelopeProvider, ServiceCallback, ServiceError, ServiceOutcome,
    UnexpectedError,
};
use super::body::{buffer_body, BodyReadError, DEFAULT_BODY_LIMIT};
use crate::domain::TraceId;

/// Request data handed to a service function.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    request: HttpRequest,
    body: Bytes,
}

impl RouteRequest {
    /// Bundle a request with its buffered body.
    pub fn new(request: HttpRequest, body: Bytes) -> Self {
        Self { request, body }
    }

    /// The underlying request head.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserialise the JSON body. Malformed bodies map to a 400 failure.
    pub fn json<T: DeserializeOwned>(&self) -> ServiceOutcome<T> {
        serde_json::from_slice(&self.body).map_err(|err| {
            UnexpectedError::new(format!("invalid JSON body: {err}"))
                .with_http_code(400)
                .into()
        })
    }

    /// Deserialise the query string. Malformed queries map to a 400 failure.
    pub fn query<T: DeserializeOwned>(&self) -> ServiceOutcome<T> {
        Query::<T>::from_query(self.request.query_string())
            .map(Query::into_inner)
            .map_err(|err| {
                UnexpectedError::new(format!("invalid query string: {err}"))
                    .with_http_code(400)
                    .into()
            })
    }

    /// Dynamic path segment captured by the router.
    pub fn match_info(&self, name: &str) -> Option<&str> {
        self.request.match_info().get(name)
    }
}

fn body_failure(err: &BodyReadError) -> ServiceError {
    UnexpectedError::new(err.to_string())
        .with_http_code(err.status().as_u16())
        .into()
}

fn log_failure(err: &ServiceError) {
    let trace_id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
    match err {
        ServiceError::Unexpected(inner) => {
            error!(%trace_id, error = %inner, "route handler failed");
        }
        ServiceError::Logic(inner) => {
            debug!(
                %trace_id,
                code = inner.code(),
                http_code = inner.http_code(),
                "route handler raised logic error"
            );
        }
    }
}

/// Adapt a service function into an actix-web handler using the standard
/// envelope.
///
/// # Examples
/// ```
/// use actix_web::{web, App};
/// use service_utils::inbound::http::{route_async, RouteRequest, ServiceOutcome};
///
/// async fn ping(_req: RouteRequest) -> ServiceOutcome<&'static str> {
///     Ok("pong")
/// }
///
/// let _app = App::new().route("/ping", web::get().to(route_async(ping)));
/// ```
pub fn route_async<H, Fut, T>(
    handler: H,
) -> impl Fn(HttpRequest, Result<Bytes, Error>) -> LocalBoxFuture<'static, HttpResponse>
       + Clone
       + 'static
where
    H: Fn(RouteRequest) -> Fut + Clone + 'static,
    Fut: Future<Output = ServiceOutcome<T>> + 'static,
    T: Serialize + 'static,
{
    route_async_with(handler, EnvelopeProvider)
}

/// [`route_async`] with a custom [`CallbackProvider`].
pub fn route_async_with<H, Fut, T, P>(
    handler: H,
    provider: P,
) -> impl Fn(HttpRequest, Result<Bytes, Error>) -> LocalBoxFuture<'static, HttpResponse>
       + Clone
       + 'static
where
    H: Fn(RouteRequest) -> Fut + Clone + 'static,
    Fut: Future<Output = ServiceOutcome<T>> + 'static,
    T: Serialize + 'static,
    P: CallbackProvider + Clone,
{
    move |request: HttpRequest,
          body: Result<Bytes, Error>|
          -> LocalBoxFuture<'static, HttpResponse> {
        let handler = handler.clone();
        let callback = provider.provide(&request);
        Box::pin(async move {
            let outcome = match body {
                Ok(body) => handler(RouteRequest::new(request, body)).await,
                Err(err) => Err(ServiceError::from(err)),
            };
            if let Err(err) = &outcome {
                log_failure(err);
            }
            callback.send(outcome)
        })
    }
}

/// Middleware running a service function that may defer to the next service.
///
/// # Examples
/// ```
/// use actix_web::{web, App, HttpResponse};
/// use service_utils::inbound::http::{route_nextable_async, RouteRequest, ServiceOutcome};
///
/// async fn cached(req: RouteRequest) -> ServiceOutcome<Option<String>> {
///     Ok(req.match_info("key").filter(|key| *key == "hot").map(str::to_owned))
/// }
///
/// let _app = App::new().service(
///     web::resource("/items/{key}")
///         .wrap(route_nextable_async(cached))
///         .to(HttpResponse::Ok),
/// );
/// ```
pub fn route_nextable_async<H>(handler: H) -> NextableRoute<H, EnvelopeProvider> {
    route_nextable_async_with(handler, EnvelopeProvider)
}

/// [`route_nextable_async`] with a custom [`CallbackProvider`].
pub fn route_nextable_async_with<H, P>(handler: H, provider: P) -> NextableRoute<H, P> {
    NextableRoute {
        handler: Rc::new(handler),
        provider: Rc::new(provider),
        body_limit: DEFAULT_BODY_LIMIT,
    }
}

/// Middleware factory produced by [`route_nextable_async`].
pub struct NextableRoute<H, P> {
    handler: Rc<H>,
    provider: Rc<P>,
    body_limit: usize,
}

impl<H, P> NextableRoute<H, P> {
    /// Buffer at most `limit` body bytes before answering `413`.
    #[must_use]
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

impl<H, P> Clone for NextableRoute<H, P> {
    fn clone(&self) -> Self {
        Self {
            handler: Rc::clone(&self.handler),
            provider: Rc::clone(&self.provider),
            body_limit: self.body_limit,
        }
    }
}

impl<S, B, H, Fut, T, P> Transform<S, ServiceRequest> for NextableRoute<H, P>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    H: Fn(RouteRequest) -> Fut + 'static,
    Fut: Future<Output = ServiceOutcome<Option<T>>> + 'static,
    T: Serialize + 'static,
    P: CallbackProvider,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = NextableRouteMiddleware<S, H, P>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(NextableRouteMiddleware {
            service: Rc::new(service),
            handler: Rc::clone(&self.handler),
            provider: Rc::clone(&self.provider),
            body_limit: self.body_limit,
        }))
    }
}

/// Service wrapper produced by [`NextableRoute`].
pub struct NextableRouteMiddleware<S, H, P> {
    service: Rc<S>,
    handler: Rc<H>,
    provider: Rc<P>,
    body_limit: usize,
}

impl<S, B, H, Fut, T, P> Service<ServiceRequest> for NextableRouteMiddleware<S, H, P>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    H: Fn(RouteRequest) -> Fut + 'static,
    Fut: Future<Output = ServiceOutcome<Option<T>>> + 'static,
    T: Serialize + 'static,
    P: CallbackProvider,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let handler = Rc::clone(&self.handler);
        let provider = Rc::clone(&self.provider);
        let body_limit = self.body_limit;

        Box::pin(async move {
            let outcome = match buffer_body(&mut req, body_limit).await {
                Ok(body) => handler(RouteRequest::new(req.request().clone(), body)).await,
                Err(err) => Err(body_failure(&err)),
            };
            if let Ok(None) = outcome {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            if let Err(err) = &outcome {
                log_failure(err);
            }
            let callback = provider.provide(req.request());
            let response = callback.send(outcome);
            Ok(req.into_response(response).map_into_right_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::logic_error;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use serde_json::{json, Value};

    async fn echo_name(req: RouteRequest) -> ServiceOutcome<Value> {
        #[derive(serde::Deserialize)]
        struct Body {
            name: String,
        }
        let body: Body = req.json()?;
        Ok(json!({ "hello": body.name }))
    }

    async fn always_forbidden(_req: RouteRequest) -> ServiceOutcome<Value> {
        Err(logic_error("Forbidden", "not yours", 403, 12, ["order", "7"]).into())
    }

    #[actix_web::test]
    async fn route_async_sends_success_envelope() {
        let app = test::init_service(
            App::new().route("/echo", web::post().to(route_async(echo_name))),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .set_json(json!({"name": "Ada"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"hello": "Ada"}));
    }

    #[actix_web::test]
    async fn route_async_maps_bad_json_to_400() {
        let app = test::init_service(
            App::new().route("/echo", web::post().to(route_async(echo_name))),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["err"]["code"], json!(400));
    }

    #[actix_web::test]
    async fn route_async_sends_logic_error_envelope() {
        let app = test::init_service(
            App::new().route("/orders", web::get().to(route_async(always_forbidden))),
        )
        .await;
        let req = test::TestRequest::get().uri("/orders").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["err"]["pars"], json!(["order", "7"]));
        assert_eq!(body["err"]["code"], json!(12));
    }

    #[actix_web::test]
    async fn route_request_reads_query_and_path() {
        #[derive(serde::Deserialize)]
        struct Paging {
            page: u32,
        }

        async fn handler(req: RouteRequest) -> ServiceOutcome<Value> {
            let paging: Paging = req.query()?;
            Ok(json!({
                "page": paging.page,
                "id": req.match_info("id"),
            }))
        }

        let app = test::init_service(
            App::new().route("/items/{id}", web::get().to(route_async(handler))),
        )
        .await;
        let req = test::TestRequest::get().uri("/items/9?page=2").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"page": 2, "id": "9"}));

        let req = test::TestRequest::get().uri("/items/9?page=x").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    fn oversized_json() -> Value {
        json!({ "name": "x".repeat(300 * 1024) })
    }

    #[actix_web::test]
    async fn route_async_reports_oversized_body_through_envelope() {
        let app = test::init_service(
            App::new().route("/echo", web::post().to(route_async(echo_name))),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .set_json(oversized_json())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["err"]["httpCode"], json!(413));
        assert_eq!(body["err"]["code"], json!(413));
    }

    #[actix_web::test]
    async fn nextable_route_reports_oversized_body_through_envelope() {
        async fn never_answers(_req: RouteRequest) -> ServiceOutcome<Option<Value>> {
            Ok(None)
        }

        let app = test::init_service(
            App::new().service(
                web::resource("/orders")
                    .wrap(route_nextable_async(never_answers).with_body_limit(16))
                    .post(HttpResponse::Ok),
            ),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({"sku": "a-rather-long-sku-value"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["err"]["code"], json!(413));
    }
}

use std::{any::Any, path::Path, sync::Arc};

use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{CONTENT_TYPE, HOST, LOCATION, STRICT_TRANSPORT_SECURITY},
        uri::Authority,
        HeaderName, HeaderValue, Response, StatusCode,
    },
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use log::{error, warn};
use tower_http::{
    catch_panic::{CatchPanicLayer, ResponseForPanic},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
};
use tower_oidc_tenant_gate::{
    claims::DefaultClaims, error::StartupError, error_handler::SignInRedirectErrorHandler,
    server::OidcTenantGate,
};

const HSTS_MAX_AGE: &str = "max-age=2592000";
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Body of the error page shown outside Development.
pub const ERROR_PAGE: &str = "An error occurred while processing your request.";

/// The request pipeline, outermost first:
///
/// 1. error page for panicking handlers
/// 2. HSTS and HTTPS redirection, outside Development only
/// 3. the tenant gate
/// 4. `/` and the static files under `wwwroot`
pub fn app(
    gate: &OidcTenantGate,
    sign_in_url: Option<&str>,
    is_development: bool,
    wwwroot: impl AsRef<Path>,
) -> Result<Router, StartupError> {
    let auth_layer = match sign_in_url {
        Some(sign_in_url) => gate.into_layer_with_error_handler(Arc::new(
            SignInRedirectErrorHandler::new(sign_in_url)?,
        )),
        None => gate.into_layer(),
    };

    let mut app = Router::new()
        .route("/", get(index))
        .fallback_service(ServeDir::new(wwwroot))
        .layer(auth_layer);
    if !is_development {
        app = app
            .layer(middleware::from_fn(https_redirection))
            .layer(SetResponseHeaderLayer::overriding(
                STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(HSTS_MAX_AGE),
            ));
    }
    Ok(app.layer(CatchPanicLayer::custom(ErrorPage::new(is_development))))
}

async fn index(Extension(claims): Extension<DefaultClaims>) -> String {
    format!(
        "Hello, {}! You signed in from tenant {}.",
        claims.display_name().unwrap_or("stranger"),
        claims.tid.as_deref().unwrap_or("unknown")
    )
}

/// Sends plain HTTP requests to the same host and path over HTTPS with
/// `307 Temporary Redirect`.
///
/// A TLS terminating proxy in front of the app reports the original scheme in
/// `X-Forwarded-Proto`.
async fn https_redirection(request: Request, next: Next) -> Response<Body> {
    let is_https = request.uri().scheme_str() == Some("https")
        || request
            .headers()
            .get(X_FORWARDED_PROTO)
            .is_some_and(|proto| proto.as_bytes().eq_ignore_ascii_case(b"https"));
    if is_https {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .and_then(|host| host.parse::<Authority>().ok());
    let Some(host) = host else {
        warn!("Failed to determine the host for the https redirect");
        return next.run(request).await;
    };
    let path = request
        .uri()
        .path_and_query()
        .map_or("/", |path_and_query| path_and_query.as_str());

    match HeaderValue::from_str(&format!("https://{}{}", host.host(), path)) {
        Ok(location) => (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response(),
        Err(_) => next.run(request).await,
    }
}

/// Renders a panicking request as `500 Internal Server Error`.
///
/// Development shows the panic message; elsewhere the client only gets
/// [ERROR_PAGE].
#[derive(Clone, Copy, Debug)]
pub struct ErrorPage {
    is_development: bool,
}

impl ErrorPage {
    pub fn new(is_development: bool) -> Self {
        Self { is_development }
    }
}

impl ResponseForPanic for ErrorPage {
    type ResponseBody = String;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<String> {
        let details = err
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| err.downcast_ref::<&str>().copied())
            .unwrap_or("unknown panic");
        error!("Unhandled panic while processing request: {}", details);

        let body = if self.is_development {
            format!("Unhandled panic while processing request: {}", details)
        } else {
            ERROR_PAGE.to_owned()
        };
        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

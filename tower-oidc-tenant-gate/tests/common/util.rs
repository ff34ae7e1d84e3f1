use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use bytes::Bytes;
use http::{header::AUTHORIZATION, HeaderName, Request, Response, StatusCode};
use http_body_util::Full;
use tower::BoxError;
use tower_oidc_tenant_gate::{claims::DefaultClaims, error::AuthError, error_handler::ErrorHandler};

pub async fn echo(req: Request<Full<Bytes>>) -> Result<Response<Full<Bytes>>, BoxError> {
    let b = req.into_body();
    let mut response = Response::new(b);
    *response.status_mut() = StatusCode::OK;
    Ok(response)
}

/// Answers with the signed-in account's tenant id and counts its calls.
#[derive(Clone, Default)]
pub struct TenantEcho {
    pub calls: Arc<AtomicUsize>,
}

impl TenantEcho {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn call(
        self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Full<Bytes>>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let tid = req
            .extensions()
            .get::<DefaultClaims>()
            .and_then(|claims| claims.tid.clone())
            .unwrap_or_default();
        Ok(Response::new(Full::new(Bytes::from(tid))))
    }
}

pub fn request_with_headers(headers: Vec<(HeaderName, &str)>) -> Request<Full<Bytes>> {
    let mut request = Request::get("/");
    let request_headers = request.headers_mut().unwrap();
    headers.into_iter().for_each(|(name, value)| {
        request_headers.insert(name, value.parse().unwrap());
    });
    request.body(Full::<Bytes>::default()).unwrap()
}

pub fn request_with_token(token: &str) -> Request<Full<Bytes>> {
    request_with_headers(vec![(AUTHORIZATION, &format!("Bearer {}", token))])
}

pub struct DetailedErrorHandler {}

impl ErrorHandler<Full<Bytes>> for DetailedErrorHandler {
    fn map_error(&self, error: AuthError) -> Response<Full<Bytes>> {
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(Full::new(error.to_string().into()))
            .unwrap()
    }
}

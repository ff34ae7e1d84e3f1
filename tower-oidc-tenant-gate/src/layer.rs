use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use http::{Request, Response};
use pin_project::pin_project;
use serde::de::DeserializeOwned;
use tower::{Layer, Service};

use crate::{error_handler::ErrorHandler, server::OidcTenantGate};

pub struct OidcTenantGateLayer<ResBody, Claims> {
    gate: OidcTenantGate<Claims>,
    error_handler: Arc<dyn ErrorHandler<ResBody>>,
}

impl<ResBody, Claims> Clone for OidcTenantGateLayer<ResBody, Claims>
where
    Claims: Clone,
{
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            error_handler: self.error_handler.clone(),
        }
    }
}

impl<S, ResBody, Claims> Layer<S> for OidcTenantGateLayer<ResBody, Claims>
where
    Claims: Clone,
{
    type Service = OidcTenantGateService<S, ResBody, Claims>;

    fn layer(&self, inner: S) -> Self::Service {
        OidcTenantGateService {
            inner,
            gate: self.gate.clone(),
            error_handler: self.error_handler.clone(),
        }
    }
}

impl<ResBody, Claims> OidcTenantGateLayer<ResBody, Claims> {
    pub(crate) fn new(
        gate: OidcTenantGate<Claims>,
        error_handler: Arc<dyn ErrorHandler<ResBody>>,
    ) -> Self {
        OidcTenantGateLayer {
            gate,
            error_handler,
        }
    }
}

pub struct OidcTenantGateService<S, ResBody, Claims> {
    inner: S,
    gate: OidcTenantGate<Claims>,
    error_handler: Arc<dyn ErrorHandler<ResBody>>,
}

impl<S, ResBody, Claims> Clone for OidcTenantGateService<S, ResBody, Claims>
where
    S: Clone,
    Claims: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            gate: self.gate.clone(),
            error_handler: self.error_handler.clone(),
        }
    }
}

impl<S, ReqBody, ResBody, Claims> Service<Request<ReqBody>>
    for OidcTenantGateService<S, ResBody, Claims>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    Claims: Clone + DeserializeOwned + Send + Sync + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future, ResBody>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        match self.gate.authorize_request(request) {
            Ok(request) => ResponseFuture::Authorized {
                fut: self.inner.call(request),
            },
            Err(error) => ResponseFuture::Unauthorized {
                response: Some(self.error_handler.map_error(error)),
            },
        }
    }
}

#[pin_project(project = ResponseFutureProj)]
pub enum ResponseFuture<F, ResBody> {
    Authorized {
        #[pin]
        fut: F,
    },
    Unauthorized {
        response: Option<Response<ResBody>>,
    },
}

impl<F, ResBody, E> Future for ResponseFuture<F, ResBody>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::Authorized { fut } => fut.poll(cx),
            ResponseFutureProj::Unauthorized { response } => Poll::Ready(Ok(response
                .take()
                .expect("ResponseFuture polled after completion"))),
        }
    }
}

//! Tower service adapter
//!
//! [`FileServer`] implements `tower::Service`, so it mounts unchanged under
//! hyper, axum, or any tower-based router. Framework glue stays a thin
//! shim: forward the request, return the response.

use crate::FileServer;
use http::{Request, Response};
use limpet_core::{Body, Error};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::Service;

impl<B> Service<Request<B>> for FileServer
where
    B: Send + 'static,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let server = self.clone();
        Box::pin(async move { server.serve(req).await })
    }
}

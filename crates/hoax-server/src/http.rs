//! hyper 1.x HTTP/1 listener around [`Router`].

use crate::routes::{ApiRequest, ApiResponse, Router};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

type HttpBody = Full<Bytes>;

/// Largest request body read before answering 413.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "hoax server listening");
    serve_listener(listener, router, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Serve connections from `listener` until `shutdown` resolves.
pub async fn serve_listener(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                tracing::info!("shutdown requested; stopping listener");
                return Ok(());
            }
        };
        let router = router.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(router.clone(), req));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                tracing::warn!(%peer, error = %e, "connection error");
            }
        });
    }
}

async fn handle_request(
    router: Router,
    req: Request<Incoming>,
) -> Result<Response<HttpBody>, Infallible> {
    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let cookie = req
        .headers()
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = match Limited::new(req.into_body(), MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            tracing::debug!(limit = MAX_BODY_BYTES, "request body too large");
            return Ok(to_hyper(ApiResponse {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                body: serde_json::json!({
                    "error": "payload_too_large",
                    "message": format!("request body exceeds {MAX_BODY_BYTES} bytes"),
                }),
                set_cookie: None,
            }));
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            return Ok(plain(StatusCode::BAD_REQUEST, "failed to read body"));
        }
    };

    let mut api_req = ApiRequest::new(method, &target).with_body(body);
    api_req.cookie = cookie;

    // The store is synchronous SQLite; keep it off the async workers.
    let resp = tokio::task::spawn_blocking(move || {
        let resp = router.handle(&api_req);
        tracing::info!(
            method = %api_req.method,
            path = %api_req.path,
            status = resp.status.as_u16(),
            "request"
        );
        resp
    })
    .await;

    Ok(match resp {
        Ok(resp) => to_hyper(resp),
        Err(e) => {
            tracing::warn!(error = %e, "request handler panicked");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    })
}

fn to_hyper(resp: ApiResponse) -> Response<HttpBody> {
    let body = serde_json::to_vec(&resp.body).unwrap_or_default();
    let mut builder = Response::builder()
        .status(resp.status)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = resp.set_cookie {
        builder = builder.header(SET_COOKIE, cookie);
    }
    builder
        .body(Full::from(Bytes::from(body)))
        .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "internal error"))
}

fn plain(status: StatusCode, msg: &'static str) -> Response<HttpBody> {
    let mut resp = Response::new(Full::from(Bytes::from_static(msg.as_bytes())));
    *resp.status_mut() = status;
    resp
}

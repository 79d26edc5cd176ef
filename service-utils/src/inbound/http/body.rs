//! Bounded request body buffering for middleware.
//!
//! Middleware that inspects the body must hand it back untouched when it
//! cannot read all of it, so the reader never drops bytes: on overflow or a
//! stream error, whatever was buffered is chained in front of the unread
//! remainder and re-installed on the request.

use actix_http::BoxedPayloadStream;
use actix_web::dev::{self, ServiceRequest};
use actix_web::error::PayloadError;
use actix_web::http::StatusCode;
use actix_web::HttpMessage;
use actix_web::web::{Bytes, BytesMut};
use futures_util::stream::{self, StreamExt};

/// Body size middleware buffer before giving up, matching actix-web's
/// default extractor limit.
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;

/// Why a body could not be buffered.
#[derive(Debug, thiserror::Error)]
pub(crate) enum BodyReadError {
    #[error("request body exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("failed to read request body: {0}")]
    Stream(#[from] PayloadError),
}

impl BodyReadError {
    /// Status a client should see when the body is required.
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Stream(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Re-inject a buffered body into a request.
pub(crate) fn bytes_to_payload(buf: Bytes) -> dev::Payload {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(buf);
    dev::Payload::from(payload)
}

fn chain_payload(head: Bytes, rest: dev::Payload) -> dev::Payload {
    let stream: BoxedPayloadStream =
        Box::pin(stream::once(async move { Ok::<_, PayloadError>(head) }).chain(rest));
    dev::Payload::from(stream)
}

/// Buffer the whole body of `req`, up to `limit` bytes.
///
/// On success the body is re-installed so downstream extractors can read it
/// again. On failure the request keeps every byte, read or not.
pub(crate) async fn buffer_body(
    req: &mut ServiceRequest,
    limit: usize,
) -> Result<Bytes, BodyReadError> {
    let mut payload = req.take_payload();
    let mut buf = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        match chunk {
            Ok(chunk) => {
                let overflow = buf.len() + chunk.len() > limit;
                buf.extend_from_slice(&chunk);
                if overflow {
                    req.set_payload(chain_payload(buf.freeze(), payload));
                    return Err(BodyReadError::TooLarge { limit });
                }
            }
            Err(error) => {
                req.set_payload(chain_payload(buf.freeze(), payload));
                return Err(error.into());
            }
        }
    }

    let bytes = buf.freeze();
    req.set_payload(bytes_to_payload(bytes.clone()));
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn body_within_limit_is_returned_and_restored() {
        let mut req = TestRequest::post()
            .set_payload("hello")
            .to_srv_request();

        let body = buffer_body(&mut req, 16).await.expect("body fits");
        assert_eq!(body, Bytes::from_static(b"hello"));

        let again = req.extract::<Bytes>().await.expect("body restored");
        assert_eq!(again, body);
    }

    #[rstest]
    #[actix_web::test]
    async fn oversized_body_is_left_intact() {
        let raw = vec![b'x'; 64];
        let mut req = TestRequest::post()
            .set_payload(raw.clone())
            .to_srv_request();

        let err = buffer_body(&mut req, 8).await.expect_err("body too large");
        assert!(matches!(err, BodyReadError::TooLarge { limit: 8 }));
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let restored = req.extract::<Bytes>().await.expect("body restored");
        assert_eq!(restored.as_ref(), raw.as_slice());
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_body_buffers_to_nothing() {
        let mut req = TestRequest::post().to_srv_request();
        let body = buffer_body(&mut req, 8).await.expect("empty body");
        assert!(body.is_empty());
    }
}

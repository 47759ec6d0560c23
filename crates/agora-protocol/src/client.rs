//! Client side of one request/response exchange.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::codec::{self, DEFAULT_MAX_MESSAGE_BYTES};
use crate::error::ProtocolError;
use crate::message::{Request, RequestType, Response};
use crate::stream::Stream;

/// Send one request on `stream` and read its response.
///
/// A fresh UUID v4 `requestID` is generated per call. The stream is left
/// open; the caller decides when to close it. No retries.
pub async fn send_request<S>(
    stream: &mut S,
    request_type: RequestType,
    session_token: &str,
    payload: Map<String, Value>,
) -> Result<Response, ProtocolError>
where
    S: Stream + ?Sized,
{
    send_request_with_limit(
        stream,
        request_type,
        session_token,
        payload,
        DEFAULT_MAX_MESSAGE_BYTES,
    )
    .await
}

/// [`send_request`] with an explicit cap on the response size.
pub async fn send_request_with_limit<S>(
    stream: &mut S,
    request_type: RequestType,
    session_token: &str,
    payload: Map<String, Value>,
    max_response_bytes: usize,
) -> Result<Response, ProtocolError>
where
    S: Stream + ?Sized,
{
    let request = Request {
        request_type,
        session_token: session_token.to_string(),
        request_id: Uuid::new_v4().to_string(),
        payload,
    };
    tracing::debug!(request_id = %request.request_id, kind = %request.request_type, "sending request");
    codec::write_message(stream, &request).await?;

    let response: Response = codec::read_message(stream, max_response_bytes).await?;
    // Decode failures on the far side are answered with an empty id.
    if !response.request_id.is_empty() && response.request_id != request.request_id {
        return Err(ProtocolError::RequestIdMismatch {
            expected: request.request_id,
            got: response.request_id,
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    use crate::error::CodecError;
    use crate::message::ResponseStatus;

    #[tokio::test]
    async fn sends_uuid_request_id_and_reads_matching_response() {
        let (mut client, server) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            let mut reader = BufReader::new(server);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let req: Request = serde_json::from_str(&line).unwrap();
            assert_eq!(req.request_type, RequestType::ToolInvoke);
            assert_eq!(req.session_token, "tok");
            assert!(Uuid::parse_str(&req.request_id).is_ok());
            let resp = Response::ok(req.request_id, json!({"pong": true}));
            let mut server = reader.into_inner();
            codec::write_message(&mut server, &resp).await.unwrap();
            server.shutdown().await.unwrap();
        });

        let payload = json!({"toolName": "ping"}).as_object().cloned().unwrap();
        let resp = send_request(&mut client, RequestType::ToolInvoke, "tok", payload)
            .await
            .unwrap();
        assert_eq!(resp.status, ResponseStatus::Ok);
        assert_eq!(resp.result, Some(json!({"pong": true})));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_request_id_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            codec::write_message(&mut server, &Response::ok("someone-else", json!(null)))
                .await
                .unwrap();
        });
        let err = send_request(&mut client, RequestType::AgentCard, "tok", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::RequestIdMismatch { .. }));
    }

    #[tokio::test]
    async fn closed_stream_surfaces_codec_error() {
        let (mut client, server) = tokio::io::duplex(4096);
        drop(server);
        let err = send_request(&mut client, RequestType::AgentCard, "tok", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Codec(CodecError::Io(_)) | ProtocolError::Codec(CodecError::Closed)
        ));
    }
}

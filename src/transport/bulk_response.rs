use crate::domain::{BulkResponse, MessageStatusCode, RemoteMessage, RemoteMessages};

const ACCEPTED_TOKEN: &str = "MESSAGE";
const SEGMENT_SEPARATOR: char = ';';
const MESSAGE_SEPARATOR: char = ',';
const TRIPLE_SEPARATOR: char = ':';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("ERROR;0;Unexpected response format")]
    UnexpectedFormat,
}

/// Decoded reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkReply {
    /// `MESSAGE;...;<package id>;<local:remote:status,...>`
    Accepted(BulkResponse),
    /// Gateway-reported failure, kept verbatim.
    Rejected(String),
}

/// Decode a 2xx reply body from the bulk endpoint.
///
/// Segments 1 and 2 of an accepted reply are not interpreted.
pub fn decode_bulk_response(body: &str) -> Result<BulkReply, TransportError> {
    let segments = body.split(SEGMENT_SEPARATOR).collect::<Vec<_>>();
    if segments.len() < 3 {
        return Err(TransportError::UnexpectedFormat);
    }
    if segments[0] != ACCEPTED_TOKEN {
        return Ok(BulkReply::Rejected(body.to_owned()));
    }

    let (Some(package_id), Some(triples)) = (segments.get(3), segments.get(4)) else {
        return Err(TransportError::UnexpectedFormat);
    };

    let mut messages = RemoteMessages::new();
    for item in triples.split(MESSAGE_SEPARATOR) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        messages.insert(decode_triple(item)?);
    }

    Ok(BulkReply::Accepted(BulkResponse {
        remote_package_id: (*package_id).to_owned(),
        messages,
    }))
}

fn decode_triple(item: &str) -> Result<RemoteMessage, TransportError> {
    let mut parts = item.split(TRIPLE_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(remote), Some(status)) => Ok(RemoteMessage {
            local_message_id: local.to_owned(),
            remote_message_id: remote.to_owned(),
            message_status: MessageStatusCode::new(status),
        }),
        _ => Err(TransportError::UnexpectedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(body: &str) -> BulkResponse {
        match decode_bulk_response(body).unwrap() {
            BulkReply::Accepted(response) => response,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn decodes_package_id_and_message_triples() {
        let response = accepted("MESSAGE;X;Y;PKG123;1:9001:3,2:9002:1");
        assert_eq!(response.remote_package_id, "PKG123");
        assert_eq!(response.messages.len(), 2);
        assert_eq!(
            response.messages.get("1"),
            Some(&RemoteMessage {
                local_message_id: "1".to_owned(),
                remote_message_id: "9001".to_owned(),
                message_status: MessageStatusCode::new("3"),
            })
        );
        assert_eq!(
            response.messages.get("2").unwrap().message_status.as_str(),
            "1"
        );
    }

    #[test]
    fn keeps_reply_order() {
        let response = accepted("MESSAGE;0;ok;77;9:1:3,3:2:3,5:3:5");
        let ids = response
            .messages
            .iter()
            .map(|m| m.local_message_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["9", "3", "5"]);
    }

    #[test]
    fn non_message_token_is_passed_through_verbatim() {
        let body = "ERROR;14;Invalid connection_id or password";
        assert_eq!(
            decode_bulk_response(body).unwrap(),
            BulkReply::Rejected(body.to_owned())
        );
    }

    #[test]
    fn fewer_than_three_segments_is_unexpected_format() {
        assert_eq!(
            decode_bulk_response("MESSAGE;1"),
            Err(TransportError::UnexpectedFormat)
        );
        assert_eq!(
            decode_bulk_response(""),
            Err(TransportError::UnexpectedFormat)
        );
        assert_eq!(
            TransportError::UnexpectedFormat.to_string(),
            "ERROR;0;Unexpected response format"
        );
    }

    #[test]
    fn accepted_reply_missing_results_is_unexpected_format() {
        assert_eq!(
            decode_bulk_response("MESSAGE;0;ok"),
            Err(TransportError::UnexpectedFormat)
        );
        assert_eq!(
            decode_bulk_response("MESSAGE;0;ok;PKG"),
            Err(TransportError::UnexpectedFormat)
        );
    }

    #[test]
    fn truncated_triple_is_unexpected_format() {
        assert_eq!(
            decode_bulk_response("MESSAGE;0;ok;PKG;1:9001"),
            Err(TransportError::UnexpectedFormat)
        );
    }

    #[test]
    fn package_id_is_kept_verbatim() {
        let response = accepted("MESSAGE;0;ok; PKG ;1:9:3");
        assert_eq!(response.remote_package_id, " PKG ");
        assert_eq!(response.messages.get("1").unwrap().remote_message_id, "9");
    }

    #[test]
    fn empty_result_list_yields_no_messages() {
        let response = accepted("MESSAGE;0;ok;PKG;");
        assert_eq!(response.remote_package_id, "PKG");
        assert!(response.messages.is_empty());

        let response = accepted("MESSAGE;0;ok;PKG;1:9001:3,\r\n");
        assert_eq!(response.messages.len(), 1);
    }
}

//! Amazon SNS and SQS backends.
//!
//! - `awssns:///<topic-arn>` publishes to an SNS topic.
//! - `awssqs://<queue-host>/<account>/<queue>` sends to the SQS queue at
//!   `https://<queue-host>/<account>/<queue>`.
//!
//! Credentials come from the AWS default provider chain. The query string
//! may set `region` and `endpoint` (for LocalStack and similar). Routing
//! attributes travel as `String` message attributes; the envelope is the
//! message body as-is.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sqs::Client as SqsClient;
use tracing::debug;

use super::{Topic, TopicError, TopicMessage, TopicUrl};

const ATTRIBUTE_TYPE: &str = "String";

async fn load_aws_config(url: &TopicUrl<'_>) -> aws_config::SdkConfig {
    let mut builder = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = url.param("region") {
        builder = builder.region(aws_config::Region::new(region.to_string()));
    }
    if let Some(endpoint) = url.param("endpoint") {
        builder = builder.endpoint_url(endpoint);
    }
    builder.load().await
}

/// Topic ARN from an `awssns:///<arn>` URL.
pub fn topic_arn(url: &TopicUrl<'_>) -> Result<String, TopicError> {
    let arn = url.name.trim_start_matches('/');
    if !arn.starts_with("arn:") {
        return Err(TopicError::InvalidUrl(format!(
            "awssns://{}: expected a topic ARN",
            url.name
        )));
    }
    Ok(arn.to_string())
}

/// Queue URL from an `awssqs://<host>/<path>` URL.
pub fn queue_url(url: &TopicUrl<'_>) -> Result<String, TopicError> {
    match url.name.split_once('/') {
        Some((host, path)) if !host.is_empty() && !path.is_empty() => {
            Ok(format!("https://{}", url.name))
        }
        _ => Err(TopicError::InvalidUrl(format!(
            "awssqs://{}: expected <host>/<account>/<queue>",
            url.name
        ))),
    }
}

fn body_text(message: &TopicMessage) -> Result<String, TopicError> {
    String::from_utf8(message.body.to_vec())
        .map_err(|e| TopicError::Send(format!("message body is not UTF-8: {e}")))
}

// Both services reject attributes with empty values.
fn non_empty(message: &TopicMessage) -> impl Iterator<Item = (&String, &String)> {
    message.attributes.iter().filter(|(_, v)| !v.is_empty())
}

fn sns_attributes(
    message: &TopicMessage,
) -> Result<HashMap<String, aws_sdk_sns::types::MessageAttributeValue>, TopicError> {
    use aws_sdk_sns::types::MessageAttributeValue;

    non_empty(message)
        .map(|(key, value)| {
            MessageAttributeValue::builder()
                .data_type(ATTRIBUTE_TYPE)
                .string_value(value)
                .build()
                .map(|attr| (key.clone(), attr))
                .map_err(|e| TopicError::Send(format!("Failed to build attribute: {e}")))
        })
        .collect()
}

fn sqs_attributes(
    message: &TopicMessage,
) -> Result<HashMap<String, aws_sdk_sqs::types::MessageAttributeValue>, TopicError> {
    use aws_sdk_sqs::types::MessageAttributeValue;

    non_empty(message)
        .map(|(key, value)| {
            MessageAttributeValue::builder()
                .data_type(ATTRIBUTE_TYPE)
                .string_value(value)
                .build()
                .map(|attr| (key.clone(), attr))
                .map_err(|e| TopicError::Send(format!("Failed to build attribute: {e}")))
        })
        .collect()
}

pub struct SnsTopic {
    client: SnsClient,
    topic_arn: String,
}

impl SnsTopic {
    pub async fn connect(url: &TopicUrl<'_>) -> Result<Self, TopicError> {
        let topic_arn = topic_arn(url)?;
        let config = load_aws_config(url).await;
        debug!(topic_arn = %topic_arn, region = ?config.region(), "Created SNS client");
        Ok(Self {
            client: SnsClient::new(&config),
            topic_arn,
        })
    }
}

#[async_trait]
impl Topic for SnsTopic {
    fn kind(&self) -> &'static str {
        "awssns"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        let body = body_text(&message)?;
        let attributes = sns_attributes(&message)?;
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(body)
            .set_message_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| TopicError::Send(format!("Failed to publish to SNS: {e}")))?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        Ok(())
    }
}

pub struct SqsTopic {
    client: SqsClient,
    queue_url: String,
}

impl SqsTopic {
    pub async fn connect(url: &TopicUrl<'_>) -> Result<Self, TopicError> {
        let queue_url = queue_url(url)?;
        let config = load_aws_config(url).await;
        debug!(queue_url = %queue_url, region = ?config.region(), "Created SQS client");
        Ok(Self {
            client: SqsClient::new(&config),
            queue_url,
        })
    }
}

#[async_trait]
impl Topic for SqsTopic {
    fn kind(&self) -> &'static str {
        "awssqs"
    }

    async fn send(&self, message: TopicMessage) -> Result<(), TopicError> {
        let body = body_text(&message)?;
        let attributes = sqs_attributes(&message)?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .set_message_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| TopicError::Send(format!("Failed to send to SQS: {e}")))?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TopicError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;
    use pubsub_notifier_core::event::RoutingAttributes;

    use super::*;
    use crate::topic::parse_topic_url;

    fn message() -> TopicMessage {
        TopicMessage {
            body: Bytes::from_static(br#"{"action":"upload"}"#),
            attributes: RoutingAttributes::from([
                ("action".to_string(), "upload".to_string()),
                ("status".to_string(), "1".to_string()),
                ("ip".to_string(), String::new()),
            ]),
        }
    }

    #[test]
    fn topic_arn_drops_leading_slash_and_query() {
        let url = parse_topic_url(
            "awssns:///arn:aws:sns:us-east-2:123456789012:events?region=us-east-2",
        )
        .unwrap();
        assert_eq!(
            topic_arn(&url).unwrap(),
            "arn:aws:sns:us-east-2:123456789012:events"
        );
        assert_eq!(url.param("region"), Some("us-east-2"));
    }

    #[test]
    fn topic_arn_must_be_an_arn() {
        let url = parse_topic_url("awssns://events").unwrap();
        assert!(matches!(topic_arn(&url), Err(TopicError::InvalidUrl(_))));
    }

    #[test]
    fn queue_url_is_https() {
        let url = parse_topic_url(
            "awssqs://sqs.us-east-2.amazonaws.com/123456789012/events?region=us-east-2",
        )
        .unwrap();
        assert_eq!(
            queue_url(&url).unwrap(),
            "https://sqs.us-east-2.amazonaws.com/123456789012/events"
        );
    }

    #[test]
    fn queue_url_needs_a_path() {
        for raw in ["awssqs://events", "awssqs:///events"] {
            let url = parse_topic_url(raw).unwrap();
            assert!(
                matches!(queue_url(&url), Err(TopicError::InvalidUrl(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn empty_attributes_are_skipped() {
        let sns = sns_attributes(&message()).unwrap();
        assert_eq!(sns.len(), 2);
        assert_eq!(sns["status"].string_value(), Some("1"));
        assert_eq!(sns["action"].data_type(), ATTRIBUTE_TYPE);
        assert!(!sns.contains_key("ip"));

        let sqs = sqs_attributes(&message()).unwrap();
        assert_eq!(sqs.len(), 2);
        assert_eq!(sqs["action"].string_value(), Some("upload"));
    }

    #[test]
    fn non_utf8_body_is_a_send_error() {
        let message = TopicMessage {
            body: Bytes::from_static(&[0xff, 0xfe]),
            attributes: RoutingAttributes::new(),
        };
        assert!(matches!(body_text(&message), Err(TopicError::Send(_))));
    }
}

use std::time::Duration;

use mockito::{Matcher, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use rs_aws_query::sdb::{GetAttributes, ListDomainsResponse, PutAttributes, ReplaceableAttribute};
use rs_aws_query::{AwsError, Client, ClientConfig, Credential, RetryPolicy};

const FORM: &str = "application/x-www-form-urlencoded; charset=utf-8";

const LIST_DOMAINS_XML: &str = r#"<ListDomainsResponse xmlns="http://sdb.amazonaws.com/doc/2009-04-15/">
  <ListDomainsResult>
    <DomainName>weather</DomainName>
    <DomainName>sports</DomainName>
  </ListDomainsResult>
  <ResponseMetadata>
    <RequestId>eb13162f-1b95-4511-8b12-489b86acfd28</RequestId>
    <BoxUsage>0.0000071759</BoxUsage>
  </ResponseMetadata>
</ListDomainsResponse>"#;

fn test_credential() -> Credential {
    Credential::new("test-access-key-id", "test-secret-access-key")
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::ZERO)
        .with_max_jitter(Duration::ZERO)
}

fn test_client(endpoint: String, max_retries: u32) -> Client {
    let config = ClientConfig::default()
        .with_endpoint(endpoint)
        .with_retry(fast_retry(max_retries));
    Client::with_config(test_credential(), config).expect("failed to build client")
}

#[tokio::test]
async fn list_domains_success() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("content-type", FORM)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "ListDomains".into()),
            Matcher::UrlEncoded("MaxNumberOfDomains".into(), "10".into()),
            Matcher::UrlEncoded("AWSAccessKeyId".into(), "test-access-key-id".into()),
            Matcher::UrlEncoded("SignatureMethod".into(), "HmacSHA256".into()),
            Matcher::UrlEncoded("SignatureVersion".into(), "2".into()),
            Matcher::UrlEncoded("Version".into(), "2009-04-15".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(LIST_DOMAINS_XML)
        .create_async()
        .await;

    let client = test_client(server.url(), 0);
    let resp = client
        .list_domains(Some(10), None)
        .await
        .expect("list_domains should succeed");

    assert_eq!(resp.result.domain_names, vec!["weather", "sports"]);
    assert_eq!(resp.metadata.request_id, "eb13162f-1b95-4511-8b12-489b86acfd28");
    assert!((resp.metadata.box_usage - 0.0000071759).abs() < 1e-12);

    mock.assert_async().await;
}

#[tokio::test]
async fn body_is_sorted_with_signature_last() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::Regex(
            "^AWSAccessKeyId=test-access-key-id&Action=ListDomains&SignatureMethod=HmacSHA256\
             &SignatureVersion=2&Timestamp=[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}%3A[0-9]{2}%3A[0-9]{2}Z\
             &Version=2009-04-15&Signature=[A-Za-z0-9%]+$"
                .into(),
        ))
        .with_status(200)
        .with_body(LIST_DOMAINS_XML)
        .create_async()
        .await;

    let client = test_client(server.url(), 0);
    client.list_domains(None, None).await.expect("list_domains should succeed");

    mock.assert_async().await;
}

#[tokio::test]
async fn send_hand_built_request() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::UrlEncoded("Action".into(), "ListDomains".into()))
        .with_status(200)
        .with_body(LIST_DOMAINS_XML)
        .create_async()
        .await;

    let client = test_client(server.url(), 0);
    let mut request = client.new_request("sdb.amazonaws.com", "2009-04-15");
    request.add("Action", "ListDomains");
    let resp: ListDomainsResponse = client.send(request).await.expect("send should succeed");
    assert_eq!(resp.result.domain_names.len(), 2);

    mock.assert_async().await;
}

#[tokio::test]
async fn put_and_get_attributes() {
    let mut server = Server::new_async().await;

    let put = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "PutAttributes".into()),
            Matcher::UrlEncoded("DomainName".into(), "weather".into()),
            Matcher::UrlEncoded("Attribute.0.Name".into(), "temp".into()),
            Matcher::UrlEncoded("Attribute.0.Value".into(), "65 degrees".into()),
            Matcher::UrlEncoded("Attribute.0.Replace".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            "<PutAttributesResponse><ResponseMetadata><RequestId>put-1</RequestId>\
             <BoxUsage>0.0000219907</BoxUsage></ResponseMetadata></PutAttributesResponse>",
        )
        .create_async()
        .await;

    let get = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "GetAttributes".into()),
            Matcher::UrlEncoded("ConsistentRead".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            "<GetAttributesResponse><GetAttributesResult>\
             <Attribute><Name>temp</Name><Value>65 degrees</Value></Attribute>\
             </GetAttributesResult><ResponseMetadata><RequestId>get-1</RequestId>\
             <BoxUsage>0.0000093382</BoxUsage></ResponseMetadata></GetAttributesResponse>",
        )
        .create_async()
        .await;

    let client = test_client(server.url(), 0);

    let put_resp = client
        .put_attributes(&PutAttributes {
            domain_name: "weather".into(),
            item_name: "sf".into(),
            attributes: vec![ReplaceableAttribute::new("temp", "65 degrees").replacing()],
            ..Default::default()
        })
        .await
        .expect("put_attributes should succeed");
    assert_eq!(put_resp.metadata.request_id, "put-1");

    let get_resp = client
        .get_attributes(&GetAttributes {
            domain_name: "weather".into(),
            item_name: "sf".into(),
            consistent_read: true,
            ..Default::default()
        })
        .await
        .expect("get_attributes should succeed");
    assert_eq!(get_resp.result.attributes[0].value, "65 degrees");

    put.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn describe_instances_success() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "DescribeInstances".into()),
            Matcher::UrlEncoded("Version".into(), "2011-11-01".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"<DescribeInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2011-11-01/">
  <requestId>req-ec2</requestId>
  <reservationSet>
    <item>
      <reservationId>r-1</reservationId>
      <instancesSet>
        <item>
          <instanceId>i-1</instanceId>
          <instanceState><code>16</code><name>running</name></instanceState>
          <dnsName>ec2-1.compute-1.amazonaws.com</dnsName>
          <ipAddress>203.0.113.1</ipAddress>
        </item>
      </instancesSet>
    </item>
  </reservationSet>
</DescribeInstancesResponse>"#,
        )
        .create_async()
        .await;

    let client = test_client(server.url(), 0);
    let resp = client
        .describe_instances()
        .await
        .expect("describe_instances should succeed");

    assert_eq!(resp.request_id, "req-ec2");
    let instance = resp.instances().next().expect("one instance");
    assert_eq!(instance.instance_id, "i-1");
    assert_eq!(instance.state_name(), "running");

    mock.assert_async().await;
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(403)
        .with_body(
            "<Response><Errors><Error><Code>AuthFailure</Code><Message>bad</Message></Error>\
             </Errors><RequestID>req-403</RequestID></Response>",
        )
        .expect(1)
        .create_async()
        .await;

    let client = test_client(server.url(), 3);
    let err = client.list_domains(None, None).await.unwrap_err();

    match &err {
        AwsError::Api(api) => {
            assert_eq!(api.request_id, "req-403");
            assert_eq!(api.errors[0].code, "AuthFailure");
        }
        other => panic!("expected AwsError::Api, got: {:?}", other),
    }
    assert!(err.to_string().contains(r#"AuthFailure: "bad""#));

    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_is_retried_then_decoded() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(503)
        .with_body(
            "<Response><Errors><Error><Code>ServiceUnavailable</Code>\
             <Message>Service AmazonSimpleDB is currently unavailable.</Message></Error>\
             </Errors><RequestID>req-503</RequestID></Response>",
        )
        .expect(3)
        .create_async()
        .await;

    let client = test_client(server.url(), 2);
    let err = client.list_domains(None, None).await.unwrap_err();

    assert_eq!(err.error_code(), Some("ServiceUnavailable"));
    assert_eq!(err.request_id(), Some("req-503"));
    assert!(err.is_retryable());

    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_success_body_is_parse_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("<ListDomainsResponse><ListDomainsResult>")
        .expect(1)
        .create_async()
        .await;

    let client = test_client(server.url(), 3);
    let err = client.list_domains(None, None).await.unwrap_err();
    assert!(matches!(err, AwsError::Deserialize(_)), "{err:?}");

    mock.assert_async().await;
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let client = test_client("http://127.0.0.1:1/".to_string(), 1);
    let err = client.list_domains(None, None).await.unwrap_err();
    assert!(err.is_transport(), "{err:?}");
}

#[tokio::test]
async fn invalid_domain_fails_before_request() {
    let server = Server::new_async().await;
    let client = test_client(server.url(), 0);

    match client.create_domain("x").await {
        Err(AwsError::Validation(msg)) => assert!(msg.contains("Invalid domain name")),
        other => panic!("expected AwsError::Validation, got: {:?}", other),
    }
}

/// Answers the first connection with a 503 and leaves every later one hanging.
async fn unavailable_then_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let body = "<Response><Errors><Error><Code>ServiceUnavailable</Code>\
                    <Message>busy</Message></Error></Errors>\
                    <RequestID>req-held</RequestID></Response>";
        let mut silent = Vec::new();
        let mut answered = false;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            if answered {
                silent.push(socket);
                continue;
            }
            answered = true;
            let reply = format!(
                "HTTP/1.1 503 Service Unavailable\r\nContent-Type: text/xml\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/")
}

#[tokio::test]
async fn server_error_survives_later_timeout() {
    let endpoint = unavailable_then_silent().await;
    let retry = RetryPolicy::default()
        .with_max_retries(1)
        .with_base_delay(Duration::from_millis(50))
        .with_max_jitter(Duration::ZERO);
    let config = ClientConfig::default()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_millis(400))
        .with_retry(retry);
    let client = Client::with_config(test_credential(), config).expect("failed to build client");

    let err = client.list_domains(None, None).await.unwrap_err();

    match &err {
        AwsError::Api(api) => {
            assert_eq!(api.request_id, "req-held");
            assert_eq!(api.errors[0].code, "ServiceUnavailable");
        }
        other => panic!("expected AwsError::Api, got: {:?}", other),
    }
}

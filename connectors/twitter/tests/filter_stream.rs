//! HTTP client behaviour against a mock filter endpoint.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tweet_tap::{
    Credentials, DisconnectHandle, Listener, StreamClient, StreamEnd, StreamListener,
    TrackerConfig, Tracklist, TwitterError, TwitterStreamClient, track,
};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILTER_PATH: &str = "/1.1/statuses/filter.json";

fn test_config(server: &MockServer, limit: u64) -> TrackerConfig {
    TrackerConfig {
        credentials: Credentials::new("ck", "cs", "at", "ats"),
        stream_url: server.uri(),
        limit,
        ..Default::default()
    }
}

async fn mount_body(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path(FILTER_PATH))
        .and(header_exists("Authorization"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("track=%23Brexit%2C%23brexit%2C%23br"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_prints_first_records_then_disconnects() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        "{\"id\":1}\r\n\r\n{\"id\":2}\r\n{\"id\":3}\r\n\r\n{\"id\":4}\r\n{\"id\":5}\r\n",
    )
    .await;

    let config = test_config(&server, 3);
    let mut client = TwitterStreamClient::new(&config).unwrap();
    let mut out = Vec::new();

    let report = track(&mut client, &config, &mut out).await.unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n"
    );
    assert_eq!(report.emitted, 3);
    assert_eq!(report.summary.delivered, 4);
    assert_eq!(report.summary.end, StreamEnd::Disconnected);
    assert!(client.disconnect_handle().is_requested());
}

#[tokio::test]
async fn test_server_close_before_limit() {
    let server = MockServer::start().await;
    mount_body(&server, "first\r\n\r\nsecond\r\ntruncated").await;

    let config = test_config(&server, 10);
    let mut client = TwitterStreamClient::new(&config).unwrap();
    let mut out = Vec::new();

    let report = track(&mut client, &config, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "first\nsecond\n");
    assert_eq!(report.emitted, 2);
    assert_eq!(report.summary.end, StreamEnd::Closed);
    assert!(!client.disconnect_handle().is_requested());
}

#[tokio::test]
async fn test_http_420_goes_to_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FILTER_PATH))
        .respond_with(ResponseTemplate::new(420).set_body_string("Enhance Your Calm"))
        .mount(&server)
        .await;

    let config = test_config(&server, 3);
    let mut client = TwitterStreamClient::new(&config).unwrap();
    let mut out = Vec::new();

    let report = track(&mut client, &config, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "420\n");
    assert_eq!(report.emitted, 0);
    assert_eq!(report.summary.delivered, 0);
    assert_eq!(report.summary.end, StreamEnd::Rejected(420));
}

#[tokio::test]
async fn test_unauthorized_goes_to_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FILTER_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = test_config(&server, 3);
    let mut client = TwitterStreamClient::new(&config).unwrap();
    let mut out = Vec::new();

    let report = track(&mut client, &config, &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "401\n");
    assert_eq!(report.summary.end, StreamEnd::Rejected(401));
}

#[tokio::test]
async fn test_oauth_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FILTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("x\r\n"))
        .mount(&server)
        .await;

    let config = test_config(&server, 5);
    let mut client = TwitterStreamClient::new(&config).unwrap();
    track(&mut client, &config, Vec::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let auth = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_consumer_key=\"ck\""));
    assert!(auth.contains("oauth_token=\"at\""));
    assert!(auth.contains("oauth_signature="));
}

#[tokio::test]
async fn test_custom_tracklist_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FILTER_PATH))
        .and(body_string_contains("track=%23rust%2Ctokio"))
        .respond_with(ResponseTemplate::new(200).set_body_string("r\r\n"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server, 1);
    config.tracklist = Tracklist::parse("#rust tokio");
    let mut client = TwitterStreamClient::new(&config).unwrap();

    let report = track(&mut client, &config, Vec::new()).await.unwrap();
    assert_eq!(report.emitted, 1);
}

#[tokio::test]
async fn test_disconnect_before_open_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FILTER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("a\r\nb\r\n"))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server, 10);
    let mut client = TwitterStreamClient::new(&config).unwrap();
    client.disconnect();

    let mut listener = Listener::new(Vec::new(), DisconnectHandle::new(), 10);
    let summary = client
        .open(&config.credentials, &config.tracklist, &mut listener)
        .await
        .unwrap();

    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.end, StreamEnd::Disconnected);
    assert!(listener.into_inner().is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_an_error() {
    // Reserve a port, then free it so nothing is listening there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let config = TrackerConfig {
        credentials: Credentials::new("ck", "cs", "at", "ats"),
        stream_url: format!("http://127.0.0.1:{port}"),
        limit: 1,
        ..Default::default()
    };
    let mut client = TwitterStreamClient::new(&config).unwrap();
    let mut listener = Listener::new(Vec::new(), client.disconnect_handle(), 1);
    let err = client
        .open(&config.credentials, &config.tracklist, &mut listener)
        .await
        .unwrap_err();

    assert!(matches!(err, TwitterError::Http(_)));
    assert_eq!(listener.count(), 0);
    assert!(listener.into_inner().is_empty());
}

/// Serve one connection that promises a longer body than it sends, then
/// hangs up.
async fn serve_truncated_body(listener: TcpListener, body: &'static str) {
    let (mut socket, _) = listener.accept().await.unwrap();

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        request.extend_from_slice(&buf[..n]);
        if n == 0 || request.ends_with(b"%23br") {
            break;
        }
    }

    let response = format!("HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n{body}");
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.flush().await.unwrap();
}

#[tokio::test]
async fn test_body_error_goes_to_on_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_truncated_body(listener, "r1\r\nr2\r\n"));

    let config = TrackerConfig {
        credentials: Credentials::new("ck", "cs", "at", "ats"),
        stream_url: format!("http://{addr}"),
        limit: 10,
        ..Default::default()
    };
    let mut client = TwitterStreamClient::new(&config).unwrap();
    let mut out = Vec::new();

    let report = track(&mut client, &config, &mut out).await.unwrap();
    server.await.unwrap();

    let StreamEnd::Interrupted(message) = &report.summary.end else {
        panic!("expected an interrupted stream, got {:?}", report.summary.end);
    };
    assert!(!message.is_empty());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("r1\nr2\n{message}\n")
    );
    assert_eq!(report.emitted, 2);
    assert_eq!(report.summary.delivered, 2);
    assert!(!client.disconnect_handle().is_requested());
}

#[test]
fn listener_is_object_safe() {
    fn accepts(_: &mut dyn StreamListener) {}
    let mut listener = Listener::new(Vec::new(), DisconnectHandle::new(), 1);
    accepts(&mut listener);
}

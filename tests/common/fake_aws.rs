//! Minimal HTTP endpoint standing in for an AWS service.
//!
//! Every connection carries one request and is closed after the reply, so
//! the number of recorded requests equals the number of attempts the SDK
//! made.

use std::sync::{Arc, Mutex};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

/// A request as seen on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    /// DynamoDB operation name, e.g. `PutItem`.
    pub fn dynamodb_operation(&self) -> Option<&str> {
        self.header("x-amz-target")?.rsplit('.').next()
    }
}

#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl FakeResponse {
    pub fn dynamodb(body: &str) -> Self {
        Self {
            status: 200,
            headers: vec![(
                "Content-Type".into(),
                "application/x-amz-json-1.0".into(),
            )],
            body: body.to_string(),
        }
    }

    pub fn dynamodb_error(status: u16, code: &str, message: &str) -> Self {
        Self {
            status,
            headers: vec![
                (
                    "Content-Type".into(),
                    "application/x-amz-json-1.0".into(),
                ),
                ("x-amzn-ErrorType".into(), code.to_string()),
            ],
            body: format!(
                r#"{{"__type":"com.amazonaws.dynamodb.v20120810#{code}","message":"{message}"}}"#
            ),
        }
    }

    pub fn s3_error(status: u16, code: &str, message: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/xml".into())],
            body: format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <Error><Code>{code}</Code><Message>{message}</Message></Error>"
            ),
        }
    }
}

type Responder = dyn Fn(&RecordedRequest) -> FakeResponse + Send + Sync;

pub struct FakeAws {
    pub endpoint: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: JoinHandle<()>,
}

impl FakeAws {
    pub async fn start(
        responder: impl Fn(&RecordedRequest) -> FakeResponse + Send + Sync + 'static,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let recorded = requests.clone();
        let server = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let responder = responder.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(&mut stream, &recorded, responder.as_ref()).await;
                });
            }
        });

        Self {
            endpoint,
            requests,
            server,
        }
    }

    /// Answers every request with a clone of `response`.
    pub async fn always(response: FakeResponse) -> Self {
        Self::start(move |_| response.clone()).await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stops accepting connections; later requests fail to connect.
    pub async fn stop(&self) {
        self.server.abort();
        while !self.server.is_finished() {
            tokio::task::yield_now().await;
        }
    }
}

impl Drop for FakeAws {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle_connection(
    stream: &mut TcpStream,
    recorded: &Mutex<Vec<RecordedRequest>>,
    responder: &Responder,
) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = RecordedRequest {
        head,
        body: String::from_utf8_lossy(&buf[head_end..]).to_string(),
    };
    let response = responder(&request);
    recorded.lock().unwrap().push(request);

    let mut reply = format!(
        "HTTP/1.1 {} Fake\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.body.len()
    );
    for (name, value) in &response.headers {
        reply.push_str(&format!("{name}: {value}\r\n"));
    }
    reply.push_str("\r\n");
    reply.push_str(&response.body);

    stream.write_all(reply.as_bytes()).await.ok()?;
    stream.shutdown().await.ok()?;
    Some(())
}

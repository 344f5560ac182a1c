#![allow(dead_code)]

use pollenchat_core::llm::prompt_from;
use pollenchat_core::{
    ChatError, ChatSession, ChatStore, CompletionClient, CompletionOptions, Message,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Completion client that replays canned results and records the prompts it saw.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ChatError>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, ChatError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Hold every call until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait::async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ChatError> {
        options.validate()?;
        let prompt = prompt_from(messages)?.to_string();
        self.prompts.lock().unwrap().push(prompt);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok("default reply".to_string()))
    }
}

pub fn exhausted(message: &str) -> ChatError {
    ChatError::RetryExhausted {
        attempts: 3,
        message: message.to_string(),
        status: Some(503),
    }
}

pub fn session_with(client: ScriptedClient) -> ChatSession {
    ChatSession::new(ChatStore::in_memory(), Box::new(client))
}

#[derive(Clone)]
pub enum Reply {
    Respond { status: u16, body: &'static str },
    /// Accept the connection and never answer.
    Hang,
}

pub fn ok(body: &'static str) -> Reply {
    Reply::Respond { status: 200, body }
}

pub fn status(status: u16) -> Reply {
    Reply::Respond {
        status,
        body: "upstream broke",
    }
}

/// Minimal HTTP/1.1 server answering each connection with the next scripted reply.
pub struct ScriptedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn new(script: Vec<Reply>) -> Self {
        let script = Arc::new(script);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let counter = Arc::new(AtomicUsize::new(0));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local listener should bind");
        let addr = listener.local_addr().expect("local address");

        let handle = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                loop {
                    let (socket, _) = match listener.accept().await {
                        Ok(pair) => pair,
                        Err(_) => break,
                    };
                    let index = counter.fetch_add(1, Ordering::SeqCst);
                    let reply = script
                        .get(index)
                        .or_else(|| script.last())
                        .cloned()
                        .unwrap_or(Reply::Hang);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        serve_one(socket, reply, requests).await;
                    });
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle,
        }
    }

    /// Raw request heads, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Request target (path + query) of the n-th request.
    pub fn target(&self, n: usize) -> String {
        let requests = self.requests();
        let head = &requests[n];
        let line = head.lines().next().unwrap_or_default();
        line.split_whitespace().nth(1).unwrap_or_default().to_string()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(mut socket: TcpStream, reply: Reply, requests: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    requests
        .lock()
        .unwrap()
        .push(String::from_utf8_lossy(&buf).to_string());

    match reply {
        Reply::Respond { status, body } => {
            let reason = match status {
                200 => "OK",
                500 => "Internal Server Error",
                503 => "Service Unavailable",
                _ => "Status",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        Reply::Hang => {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        }
    }
}

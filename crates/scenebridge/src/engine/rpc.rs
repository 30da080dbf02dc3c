//! Engine adapter for the Blender-side JSON bridge.
//!
//! The bridge speaks newline-delimited JSON over TCP: one request object per
//! line, one reply object per line. Exactly one command is in flight at a
//! time; the connection is dropped and re-established after any transport
//! fault so a later retry starts clean.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::{Engine, EngineError};

/// Default timeout for a single bridge command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bridge error codes that indicate a retry of the same call may succeed.
const TRANSIENT_CODES: &[&str] = &["busy", "locked", "engine_starting"];

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    op: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn open(addr: &str, limit: Duration) -> Result<Self, EngineError> {
        let stream = timeout(limit, TcpStream::connect(addr))
            .await
            .map_err(|_| EngineError::transient(format!("engine connect timed out ({addr})")))?
            .map_err(|err| EngineError::transient(format!("engine unreachable ({addr}): {err}")))?;

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    async fn round_trip(&mut self, line: &str, limit: Duration) -> Result<String, EngineError> {
        let write = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await
        };
        timeout(limit, write)
            .await
            .map_err(|_| EngineError::transient("engine write timed out"))?
            .map_err(|err| EngineError::transient(format!("engine write failed: {err}")))?;

        let mut reply = String::new();
        let read = timeout(limit, self.reader.read_line(&mut reply))
            .await
            .map_err(|_| EngineError::transient("engine reply timed out"))?
            .map_err(|err| EngineError::transient(format!("engine read failed: {err}")))?;
        if read == 0 {
            return Err(EngineError::transient("engine closed the connection"));
        }
        Ok(reply)
    }
}

/// [`Engine`] implementation backed by the TCP bridge.
pub struct RpcEngine {
    addr: String,
    limit: Duration,
    conn: Mutex<Option<Connection>>,
}

impl RpcEngine {
    pub fn new(addr: impl Into<String>) -> Self {
        Self::with_timeout(addr, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(addr: impl Into<String>, limit: Duration) -> Self {
        Self {
            addr: addr.into(),
            limit,
            conn: Mutex::new(None),
        }
    }

    async fn command(&self, op: &str, params: Value) -> Result<Value, EngineError> {
        let request = BridgeRequest { op, params };
        let line = serde_json::to_string(&request)
            .map_err(|err| EngineError::permanent(format!("unencodable command: {err}")))?;

        let mut guard = self.conn.lock().await;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => Connection::open(&self.addr, self.limit).await?,
        };

        let reply_line = match conn.round_trip(&line, self.limit).await {
            Ok(reply) => reply,
            Err(err) => {
                // Connection stays dropped; the next command reconnects.
                tracing::warn!("bridge command '{op}' failed in transit: {err}");
                return Err(err);
            }
        };
        *guard = Some(conn);
        drop(guard);

        let reply: BridgeReply = serde_json::from_str(&reply_line)
            .map_err(|err| EngineError::permanent(format!("malformed bridge reply: {err}")))?;

        if reply.ok {
            return Ok(reply.data);
        }

        let message = reply.error.unwrap_or_else(|| "engine rejected command".to_string());
        let transient = reply
            .code
            .as_deref()
            .is_some_and(|code| TRANSIENT_CODES.contains(&code));
        if transient {
            Err(EngineError::transient(message))
        } else {
            Err(EngineError::permanent(message))
        }
    }
}

#[async_trait::async_trait]
impl Engine for RpcEngine {
    async fn create_object(&self, params: Value) -> Result<Value, EngineError> {
        self.command("object.create", params).await
    }

    async fn delete_object(&self, name: &str) -> Result<Value, EngineError> {
        self.command("object.delete", json!({ "name": name })).await
    }

    async fn transform_object(&self, name: &str, params: Value) -> Result<Value, EngineError> {
        let mut payload = params;
        if let Some(map) = payload.as_object_mut() {
            map.insert("name".to_string(), Value::String(name.to_string()));
        }
        self.command("object.transform", payload).await
    }

    async fn list_objects(&self) -> Result<Value, EngineError> {
        self.command("scene.list", json!({})).await
    }

    async fn object_info(&self, name: &str) -> Result<Value, EngineError> {
        self.command("scene.object_info", json!({ "name": name })).await
    }

    async fn set_material(&self, object: &str, params: Value) -> Result<Value, EngineError> {
        let mut payload = params;
        if let Some(map) = payload.as_object_mut() {
            map.insert("object".to_string(), Value::String(object.to_string()));
        }
        self.command("material.set", payload).await
    }

    async fn create_light(&self, params: Value) -> Result<Value, EngineError> {
        self.command("light.create", params).await
    }

    async fn set_camera(&self, params: Value) -> Result<Value, EngineError> {
        self.command("camera.set", params).await
    }

    async fn start_render(&self, params: Value) -> Result<Value, EngineError> {
        self.command("render.start", params).await
    }

    async fn render_status(&self, job_id: &str) -> Result<Value, EngineError> {
        self.command("render.status", json!({ "job_id": job_id })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    async fn serve_one_reply(reply: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut lines = BufReader::new(read_half);
            let mut request = String::new();
            lines.read_line(&mut request).await.unwrap();
            write_half.write_all(reply.as_bytes()).await.unwrap();
            write_half.write_all(b"\n").await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn success_reply_passes_data_through() {
        let addr = serve_one_reply(r#"{"ok": true, "data": {"name": "Cube"}}"#).await;
        let engine = RpcEngine::new(addr);
        let data = engine.object_info("Cube").await.unwrap();
        assert_eq!(data["name"], "Cube");
    }

    #[tokio::test]
    async fn busy_code_is_transient() {
        let addr =
            serve_one_reply(r#"{"ok": false, "error": "scene locked", "code": "busy"}"#).await;
        let engine = RpcEngine::new(addr);
        let err = engine.list_objects().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.message, "scene locked");
    }

    #[tokio::test]
    async fn rejection_without_code_is_permanent() {
        let addr = serve_one_reply(r#"{"ok": false, "error": "object 'X' not found"}"#).await;
        let engine = RpcEngine::new(addr);
        let err = engine.delete_object("X").await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn unreachable_engine_is_transient() {
        let engine = RpcEngine::with_timeout("127.0.0.1:1", Duration::from_millis(200));
        let err = engine.list_objects().await.unwrap_err();
        assert!(err.is_transient());
    }
}

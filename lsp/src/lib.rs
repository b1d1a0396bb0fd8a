//! Language server that feeds editor activity to the heartbeat pipeline.
//!
//! JSON-RPC framing and the LSP lifecycle come from tower-lsp; this crate
//! only maps `initialize`, `textDocument/didChange` and
//! `textDocument/didSave` onto the [`Tracker`].

mod server;
mod uri;

use std::sync::Arc;

use hackatime_engine::Tracker;
use tokio::io::{AsyncRead, AsyncWrite};
use tower_lsp::{LspService, Server};

pub use server::HeartbeatServer;
pub use uri::file_uri_to_path;

/// Serve LSP over `input`/`output` until the editor exits or closes the stream.
pub async fn serve<I, O>(tracker: Arc<Tracker>, input: I, output: O)
where
    I: AsyncRead + Unpin,
    O: AsyncWrite,
{
    let (service, socket) = LspService::new(|_client| HeartbeatServer::new(tracker));
    Server::new(input, output, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackatime_engine::TrackerConfig;
    use serde_json::{Value, json};
    use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::sync::mpsc;

    async fn send(writer: &mut (impl AsyncWrite + Unpin), msg: &Value) {
        let body = msg.to_string();
        let frame = format!("Content-Length: {}\r\n\r\n{body}", body.len());
        writer.write_all(frame.as_bytes()).await.unwrap();
    }

    async fn recv(reader: &mut (impl AsyncBufRead + Unpin)) -> Value {
        let mut len = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                len = value.trim().parse().unwrap();
            }
        }
        let mut body = vec![0; len];
        reader.read_exact(&mut body).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn stdio_session_round_trip() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let tracker = Arc::new(Tracker::with_dispatch(TrackerConfig::default(), tx));

        let (client, server_io) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);
        let server = tokio::spawn(serve(tracker, server_read, server_write));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut client_read = BufReader::new(client_read);

        send(
            &mut client_write,
            &json!({"jsonrpc": "2.0", "id": 1, "method": "shutdown"}),
        )
        .await;
        let early = recv(&mut client_read).await;
        assert_eq!(early["id"], 1);
        assert_eq!(early["error"]["code"], -32002);

        send(
            &mut client_write,
            &json!({"jsonrpc": "2.0", "id": 2, "method": "initialize", "params": {"capabilities": {}}}),
        )
        .await;
        let init = recv(&mut client_read).await;
        assert_eq!(init["id"], 2);
        assert_eq!(init["result"]["capabilities"]["textDocumentSync"]["change"], 2);

        send(
            &mut client_write,
            &json!({"jsonrpc": "2.0", "id": 3, "method": "shutdown"}),
        )
        .await;
        let shutdown = recv(&mut client_read).await;
        assert_eq!(shutdown["id"], 3);
        assert!(shutdown["result"].is_null());

        send(&mut client_write, &json!({"jsonrpc": "2.0", "method": "exit"})).await;
        drop(client_write);
        drop(client_read);
        server.await.unwrap();
    }
}

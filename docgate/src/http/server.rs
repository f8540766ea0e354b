use std::io::{BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::async_task;
use crate::errors::GatewayResult;
use crate::http::{RawRequest, Response, Status};
use crate::router::Router;

/// The blocking HTTP server: one accept loop, one thread per connection,
/// one request per connection.
pub struct HttpServer {
    listener: TcpListener,
    router: Arc<Router>,
}

impl HttpServer {
    /// Binds the listener without accepting yet, so callers can learn the
    /// actual address before starting the loop (useful with port 0).
    pub fn bind(addr: &str, router: Arc<Router>) -> GatewayResult<HttpServer> {
        let listener = TcpListener::bind(addr)?;
        Ok(HttpServer { listener, router })
    }

    pub fn local_addr(&self) -> GatewayResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop. Blocks the calling thread until the listener
    /// fails; each accepted connection is served on its own thread.
    pub fn run(self) -> GatewayResult<()> {
        log::info!(
            "Gateway listening on {}",
            self.local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "<unknown>".to_string())
        );
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = self.router.clone();
                    async_task(move || handle_connection(stream, router));
                }
                Err(err) => log::warn!("Failed to accept connection: {}", err),
            }
        }
        Ok(())
    }
}

/// Binds and runs in one call.
pub fn serve(addr: &str, router: Arc<Router>) -> GatewayResult<()> {
    HttpServer::bind(addr, router)?.run()
}

fn handle_connection(stream: TcpStream, router: Arc<Router>) {
    let request_id = Uuid::new_v4();
    let mut reader = BufReader::new(&stream);

    let response = match RawRequest::parse(&mut reader) {
        Ok(request) => {
            log::info!("[{}] {} {}", request_id, request.method(), request.path());
            router.dispatch(request)
        }
        Err(err) => {
            log::warn!("[{}] Malformed request: {}", request_id, err);
            let mut response = Response::new();
            response.set_status(Status::BadRequest);
            response.append_body(b"malformed request\n");
            response
        }
    };

    let mut writer = BufWriter::new(&stream);
    if let Err(err) = response.write_to(&mut writer).and_then(|_| writer.flush()) {
        log::warn!("[{}] Failed to write response: {}", request_id, err);
    }
}

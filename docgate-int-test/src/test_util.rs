use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};

use docgate::errors::GatewayResult;
use docgate::gateway::Gateway;
use docgate::gateway_config::GatewayConfig;
use docgate::store::InMemoryStore;

/// A gateway connected to a fresh in-memory store, served on an ephemeral
/// local port.
pub struct TestGateway {
    pub gateway: Gateway,
    pub addr: SocketAddr,
}

/// Starts a gateway over a fresh in-memory store and serves it on an
/// ephemeral port. The accept loop runs on a detached thread for the rest
/// of the test process.
pub fn start_gateway() -> GatewayResult<TestGateway> {
    let config = GatewayConfig::default().with_database("testdb");
    let gateway = Gateway::connect(config, InMemoryStore::new())?;

    let server = gateway.bind("127.0.0.1:0")?;
    let addr = server.local_addr()?;
    std::thread::spawn(move || {
        let _ = server.run();
    });

    Ok(TestGateway { gateway, addr })
}

/// A minimal HTTP exchange: status code plus body text.
pub struct Exchange {
    pub status: u16,
    pub body: String,
}

/// Performs one HTTP/1.1 request against the test server and reads the
/// full response.
pub fn http_request(addr: SocketAddr, method: &str, target: &str, body: Option<&str>) -> Exchange {
    let mut stream = TcpStream::connect(addr).expect("connect to test gateway");

    let mut wire = format!("{} {} HTTP/1.1\r\nhost: localhost\r\n", method, target);
    match body {
        Some(body) => {
            wire.push_str(&format!("content-length: {}\r\n\r\n{}", body.len(), body));
        }
        None => wire.push_str("\r\n"),
    }
    stream
        .write_all(wire.as_bytes())
        .expect("write request to test gateway");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .expect("read response from test gateway");

    let status: u16 = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("response has a status code");
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();

    Exchange { status, body }
}

pub fn http_get(addr: SocketAddr, target: &str) -> Exchange {
    http_request(addr, "GET", target, None)
}

pub fn http_post(addr: SocketAddr, target: &str, body: &str) -> Exchange {
    http_request(addr, "POST", target, Some(body))
}

pub fn http_put(addr: SocketAddr, target: &str, body: &str) -> Exchange {
    http_request(addr, "PUT", target, Some(body))
}

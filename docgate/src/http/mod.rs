//! Minimal HTTP/1.1 transport: request parsing, response writing, and the
//! blocking accept loop. Raw HTTP, no framework; the gateway only needs
//! one request per connection, a body, headers, and a status line.

mod request;
mod response;
mod server;

pub use request::*;
pub use response::*;
pub use server::*;

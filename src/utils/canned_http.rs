use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use url::Url;

/// Serves one fixed response on a local port for `connections` requests.
/// Bodies are left out for `HEAD`.
pub fn serve(status: &'static str, body: &'static str, connections: usize) -> Result<Url> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let base = Url::parse(&format!("http://{}/", listener.local_addr()?))?;

    thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            let Ok(mut stream) = stream else { continue };

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let head = request.starts_with(b"HEAD");
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                if head { "" } else { body }
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    Ok(base)
}

/// Client that talks to the local server directly, ignoring proxy settings.
pub fn client() -> Result<Client> {
    Ok(Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()?)
}

//! Local stand-ins for the probe service and for SOCKS5 proxies.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A probe server answering every request with a fixed status and body.
pub struct ProbeServer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl ProbeServer {
    pub async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    if read_request_head(&mut stream).await.is_ok() {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let response = format!(
                            "HTTP/1.1 {} Probe\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                });
            }
        });

        Self { addr, hits }
    }

    pub fn url(&self) -> String {
        format!("http://{}/prepare?version=5&returnpc=true", self.addr)
    }

    /// Same as `url` but addressed by hostname.
    pub fn url_by_name(&self) -> String {
        format!("http://localhost:{}/prepare?version=5&returnpc=true", self.addr.port())
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn read_request_head(stream: &mut TcpStream) -> io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

/// A minimal SOCKS5 relay supporting CONNECT, optionally requiring
/// username/password authentication.
pub struct Socks5Server {
    pub addr: SocketAddr,
    address_types: Arc<Mutex<Vec<u8>>>,
}

impl Socks5Server {
    pub async fn start(credentials: Option<(&'static str, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let address_types = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&address_types);
        tokio::spawn(async move {
            loop {
                let Ok((mut client, _)) = listener.accept().await else {
                    return;
                };
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let _ = relay(&mut client, credentials, &recorded).await;
                });
            }
        });

        Self {
            addr,
            address_types,
        }
    }

    /// ATYP bytes of the CONNECT requests received so far.
    pub fn address_types(&self) -> Vec<u8> {
        self.address_types.lock().clone()
    }

    pub fn host(&self) -> String {
        self.addr.to_string()
    }
}

async fn relay(
    client: &mut TcpStream,
    credentials: Option<(&'static str, &'static str)>,
    address_types: &Mutex<Vec<u8>>,
) -> io::Result<()> {
    let mut head = [0u8; 2];
    client.read_exact(&mut head).await?;
    let mut methods = vec![0u8; head[1] as usize];
    client.read_exact(&mut methods).await?;

    let method = if credentials.is_some() { 0x02 } else { 0x00 };
    if !methods.contains(&method) {
        client.write_all(&[0x05, 0xff]).await?;
        return Ok(());
    }
    client.write_all(&[0x05, method]).await?;

    if let Some((user, password)) = credentials {
        let mut ver_len = [0u8; 2];
        client.read_exact(&mut ver_len).await?;
        let mut got_user = vec![0u8; ver_len[1] as usize];
        client.read_exact(&mut got_user).await?;
        let mut pass_len = [0u8; 1];
        client.read_exact(&mut pass_len).await?;
        let mut got_password = vec![0u8; pass_len[0] as usize];
        client.read_exact(&mut got_password).await?;

        let ok = got_user == user.as_bytes() && got_password == password.as_bytes();
        client.write_all(&[0x01, if ok { 0x00 } else { 0x01 }]).await?;
        if !ok {
            return Ok(());
        }
    }

    let mut request = [0u8; 4];
    client.read_exact(&mut request).await?;
    address_types.lock().push(request[3]);
    let host = match request[3] {
        0x01 => {
            let mut ip = [0u8; 4];
            client.read_exact(&mut ip).await?;
            Ipv4Addr::from(ip).to_string()
        }
        0x03 => {
            let mut len = [0u8; 1];
            client.read_exact(&mut len).await?;
            let mut name = vec![0u8; len[0] as usize];
            client.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).into_owned()
        }
        0x04 => {
            let mut ip = [0u8; 16];
            client.read_exact(&mut ip).await?;
            format!("[{}]", Ipv6Addr::from(ip))
        }
        _ => return Ok(()),
    };
    let mut port = [0u8; 2];
    client.read_exact(&mut port).await?;
    let port = u16::from_be_bytes(port);

    let mut upstream = match TcpStream::connect(format!("{}:{}", host, port)).await {
        Ok(upstream) => upstream,
        Err(_) => {
            // host unreachable
            client
                .write_all(&[0x05, 0x04, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
                .await?;
            return Ok(());
        }
    };
    client
        .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
        .await?;

    tokio::io::copy_bidirectional(client, &mut upstream).await?;
    Ok(())
}

/// An address with nothing listening on it.
pub fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

use std::{
    fs,
    io::{self, Write},
    net::{Ipv4Addr, SocketAddr},
    path::Path,
    sync::{Arc, Mutex},
};

use fshare::{args::OpenErrorPolicy, router, target::Target, Server};
use reqwest::StatusCode;
use tempfile::TempDir;
use tracing::Level;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

async fn start(path: &Path) -> SocketAddr {
    let target = Target::classify(path).unwrap();
    let server = Server::bind(
        (Ipv4Addr::LOCALHOST, 0).into(),
        router(&target, OpenErrorPolicy::Respond),
    )
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve(std::future::pending()));
    addr
}

/// Sends one GET and returns the log lines that mention its target.
async fn logged_for(addr: SocketAddr, target: &str, captured: &Captured) -> Vec<String> {
    let res = reqwest::get(format!("http://{addr}{target}")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let _ = res.bytes().await.unwrap();

    captured
        .lines()
        .into_iter()
        .filter(|line| line.contains(&format!("GET {target} from ")))
        .collect()
}

// current_thread runtime, so the server tasks see the thread-local subscriber
#[tokio::test]
async fn one_line_per_request_in_both_modes() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();
    let file = dir.path().join("report.pdf");
    fs::write(&file, b"%PDF").unwrap();

    let dir_addr = start(dir.path()).await;
    let lines = logged_for(dir_addr, "/a.txt?x=1&y=two", &captured).await;
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("GET /a.txt?x=1&y=two from 127.0.0.1:"));

    let file_addr = start(&file).await;
    let lines = logged_for(file_addr, "/whatever?download=1", &captured).await;
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("GET /whatever?download=1 from 127.0.0.1:"));
}

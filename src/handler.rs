use std::{
    fmt::Write as _,
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use axum::{
    body::Body,
    extract::State,
    handler::Handler,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode, Uri,
    },
    response::{Html, IntoResponse, Response},
    Router,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tower_http::services::ServeDir;

use crate::{args::OpenErrorPolicy, target::Target};

const OCTET_STREAM: &str = "application/octet-stream";

/// Characters escaped in listing links, on top of controls.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Catch-all router for the shared target.
pub fn router(target: &Target, policy: OpenErrorPolicy) -> Router {
    match target {
        Target::Directory(root) => directory(root),
        Target::File(path) => file(path, policy),
    }
}

/// Static serving of a whole tree, with a generated listing for
/// directories that have no `index.html`.
fn directory(root: &Path) -> Router {
    let root: Arc<Path> = Arc::from(root);
    let listing = list_directory.with_state(Arc::clone(&root));
    Router::new().fallback_service(ServeDir::new(&*root).fallback(listing))
}

fn file(path: &Path, policy: OpenErrorPolicy) -> Router {
    let shared = SharedFile {
        disposition: disposition(path),
        path: Arc::from(path),
        policy,
    };
    Router::new().fallback(serve_file).with_state(shared)
}

#[derive(Debug, Clone)]
struct SharedFile {
    path: Arc<Path>,
    disposition: HeaderValue,
    policy: OpenErrorPolicy,
}

/// `filename=<base name>`, with control characters replaced so the value is
/// always a legal header. Names that are not a plain token get quoted.
fn disposition(path: &Path) -> HeaderValue {
    let name: String = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();

    let value = if name.chars().all(is_token_char) {
        format!("filename={name}")
    } else {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("filename=\"{escaped}\"")
    };

    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// RFC 7230 `tchar`.
const fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

/// Same response for every method and path.
async fn serve_file(State(shared): State<SharedFile>) -> Response {
    let file = match File::open(&shared.path).await {
        Ok(file) => file,
        Err(e) => return open_failed(&shared, &e),
    };

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM)),
        (CONTENT_DISPOSITION, shared.disposition.clone()),
    ];
    // the body stream owns the handle, it is closed once the copy ends
    (headers, Body::from_stream(ReaderStream::new(file))).into_response()
}

fn open_failed(shared: &SharedFile, e: &io::Error) -> Response {
    tracing::error!("cannot open file: {}: {e}", shared.path.display());

    match shared.policy {
        OpenErrorPolicy::Exit => std::process::exit(1),
        OpenErrorPolicy::Respond if e.kind() == io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND.into_response()
        }
        OpenErrorPolicy::Respond => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Reached when `ServeDir` finds nothing to send, either a missing entry or
/// a directory lacking `index.html`.
async fn list_directory(State(root): State<Arc<Path>>, uri: Uri) -> Response {
    let Some(rel) = relative_path(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let dir = root.join(&rel);

    match fs::metadata(&dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return StatusCode::NOT_FOUND.into_response(),
    }

    match read_entries(&dir).await {
        Ok(entries) => Html(listing_html(uri.path(), &entries)).into_response(),
        Err(e) => {
            tracing::warn!("cannot list {}: {e}", dir.display());
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Decodes a request path into a path relative to the shared root. Anything
/// that could step outside the root is refused.
fn relative_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let mut rel = PathBuf::new();

    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(rel)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    name: String,
    is_dir: bool,
}

async fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        // follow symlinks, like ServeDir does when the link is opened
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort();
    Ok(entries)
}

fn listing_html(request_path: &str, entries: &[Entry]) -> String {
    let title = escape_html(&percent_decode_str(request_path).decode_utf8_lossy());
    let mut html = String::with_capacity(128 + entries.len() * 64);

    let _ = write!(
        html,
        "<!doctype html>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<h1>{title}</h1>\n<pre>\n"
    );
    for entry in entries {
        let slash = if entry.is_dir { "/" } else { "" };
        let href = utf8_percent_encode(&entry.name, LINK);
        let name = escape_html(&entry.name);
        // the `./` keeps a name like `a:b` from reading as a scheme
        let _ = writeln!(html, "<a href=\"./{href}{slash}\">{name}{slash}</a>");
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

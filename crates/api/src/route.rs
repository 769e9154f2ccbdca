use partcat_common::PartId;

/// A request target the catalog service knows how to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    /// CORS preflight for any path.
    Preflight,
    ListParts,
    CreatePart,
    GetPart(PartId),
    UpdatePart(PartId),
    PatchPart(PartId),
    DeletePart(PartId),
    GetVersion(PartId, u32),
    ListVersions(PartId),
    Search(String),
}

/// Why a request did not resolve to a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("no such resource")]
    NotFound,
    #[error("method {0} not allowed here")]
    MethodNotAllowed(String),
    #[error("version must be a positive integer, got {0:?}")]
    BadVersion(String),
}

impl Route {
    /// Resolve `method` and a request target (path plus optional query).
    pub fn parse(method: &str, target: &str) -> Result<Self, RouteError> {
        let method = method.to_ascii_uppercase();
        if method == "OPTIONS" {
            return Ok(Self::Preflight);
        }
        // HEAD is answered like GET; the listener drops the body.
        let method = if method == "HEAD" { "GET".to_owned() } else { method };

        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(percent_decode)
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let refuse = || -> Result<Self, RouteError> {
            Err(RouteError::MethodNotAllowed(method.clone()))
        };

        match segments.as_slice() {
            ["health"] => match method.as_str() {
                "GET" => Ok(Self::Health),
                _ => refuse(),
            },
            ["parts"] => match method.as_str() {
                "GET" => Ok(Self::ListParts),
                "POST" => Ok(Self::CreatePart),
                _ => refuse(),
            },
            ["search"] | ["parts", "search"] if method == "GET" => {
                Ok(Self::Search(query_param(query, "name").unwrap_or_default()))
            }
            ["search"] => refuse(),
            ["parts", id] => {
                let id = PartId::from(*id);
                match method.as_str() {
                    "GET" => Ok(Self::GetPart(id)),
                    "PUT" => Ok(Self::UpdatePart(id)),
                    "PATCH" => Ok(Self::PatchPart(id)),
                    "DELETE" => Ok(Self::DeletePart(id)),
                    _ => refuse(),
                }
            }
            ["parts", id, "versions"] => match method.as_str() {
                "GET" => Ok(Self::ListVersions(PartId::from(*id))),
                _ => refuse(),
            },
            ["parts", id, "version", version] => match method.as_str() {
                "GET" => Ok(Self::GetVersion(PartId::from(*id), parse_version(version)?)),
                _ => refuse(),
            },
            _ => Err(RouteError::NotFound),
        }
    }
}

fn parse_version(raw: &str) -> Result<u32, RouteError> {
    match raw.parse::<u32>() {
        Ok(version) if version > 0 => Ok(version),
        _ => Err(RouteError::BadVersion(raw.to_owned())),
    }
}

/// First value of `key` in a URL query string, decoded.
pub fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k) == key).then(|| percent_decode(v))
        })
        .next()
}

/// Decode `%XX` escapes and `+` as space. Malformed escapes pass through
/// unchanged; invalid UTF-8 is replaced.
pub fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                match (hex_value(bytes.get(i + 1)), hex_value(bytes.get(i + 2))) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: Option<&u8>) -> Option<u8> {
    match byte? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

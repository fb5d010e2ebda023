use std::fmt;

pub type RequestId = u64;
pub type CycleId = u64;

/// Which leg of an interaction cycle a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Primary,
    RedirectFollow,
}

/// HTTP method of an interaction. Always held in lower case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "" | "get" => Method::Get,
            "post" => Method::Post,
            _ => Method::Other(lower),
        }
    }

    pub fn is_get(&self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Other(m) => m,
        }
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::Get
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

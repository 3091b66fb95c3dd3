use std::str::FromStr;

use crate::error::InvalidArgument;

/// HTTP Version, as carried by a message (`1.1`, not `HTTP/1.1`)
/// SPEC: RFC 9110 - 2.5. Protocol Version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpVersion {
    major: u8,
    minor: u8,
}

impl HttpVersion {
    pub const HTTP_1_0: Self = Self { major: 1, minor: 0 };
    pub const HTTP_1_1: Self = Self { major: 1, minor: 1 };
    pub const HTTP_2: Self = Self { major: 2, minor: 0 };

    pub const fn as_str(&self) -> &'static str {
        match (self.major, self.minor) {
            (1, 0) => "1.0",
            (1, 1) => "1.1",
            _ => "2",
        }
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

impl FromStr for HttpVersion {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "1.0" => Self::HTTP_1_0,
            "1.1" => Self::HTTP_1_1,
            "2" => Self::HTTP_2,
            _ => return Err(InvalidArgument::ProtocolVersion(s.to_owned())),
        })
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

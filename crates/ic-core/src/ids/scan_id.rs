use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Scan session identifier.
///
/// Generated on the client (UUID v4) and used by the backend to address the
/// server-side scan job.
///
/// 扫描会话标识符，由客户端生成。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    /// Fresh random identifier.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an identifier issued elsewhere, e.g. a scan resumed by id.
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ScanId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ScanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ScanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scan_ids_are_unique_uuids() {
        let a = ScanId::new();
        let b = ScanId::new();

        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_scan_id_from_str() {
        let id: ScanId = "3f1c2a9e-0000-4000-8000-000000000001".into();
        assert_eq!(id.as_str(), "3f1c2a9e-0000-4000-8000-000000000001");
        assert_eq!(id.to_string(), "3f1c2a9e-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_scan_id_serializes_as_plain_string() {
        let id = ScanId::from("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}

/// Normalize a compose service name so it can be used as a resource name.
///
/// Underscores are not allowed in resource names and become dashes.
pub fn normalize_service_name(name: &str) -> String {
    name.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_underscores() {
        assert_eq!(normalize_service_name("web_app"), "web-app");
        assert_eq!(normalize_service_name("my__db_1"), "my--db-1");
    }

    #[test]
    fn test_normalize_keeps_valid_names() {
        assert_eq!(normalize_service_name("web-app"), "web-app");
        assert_eq!(normalize_service_name("logs"), "logs");
        assert_eq!(normalize_service_name("/srv/Data"), "/srv/Data");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["web-app", "Web_App", "DB_1", "a.b_C", ""] {
            let once = normalize_service_name(name);
            assert_eq!(normalize_service_name(&once), once);
        }
    }
}

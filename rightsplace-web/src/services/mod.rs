pub mod account_service;
pub mod audit;
pub mod auth_service;
pub mod case_service;
pub mod report_service;
pub mod token_service;

/// Escapes LIKE wildcards so the value matches literally.
pub fn like_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// `%value%` with the value itself taken literally.
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", like_escape(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_escape("50%_off"), "50\\%\\_off");
        assert_eq!(like_escape("Port Harcourt"), "Port Harcourt");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}

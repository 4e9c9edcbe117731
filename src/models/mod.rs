use serde_json::{Map, Value};
use uuid::Uuid;

pub mod job;
pub mod search;

// Re-exports for convenience
pub use job::*;
pub use search::*;

/// Untyped key/value record produced by extraction, before validation.
pub type FieldMap = Map<String, Value>;

// Helper function to generate record identifiers
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 32);
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

//! HTTP endpoint handlers for the directory API

pub mod companies;
pub mod repos;

use crate::error::{Error, Result};

/// Parse a path id, rejecting non-numeric input before any store access
pub fn parse_entity_id(raw: &str) -> Result<i32> {
    raw.parse::<i32>()
        .map_err(|_| Error::BadRequest(format!("invalid id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_id() {
        assert_eq!(parse_entity_id("42").unwrap(), 42);
        assert!(parse_entity_id("abc").is_err());
        assert!(parse_entity_id("").is_err());
        assert!(parse_entity_id("4.2").is_err());
        assert!(matches!(
            parse_entity_id("abc"),
            Err(Error::BadRequest(_))
        ));
    }
}

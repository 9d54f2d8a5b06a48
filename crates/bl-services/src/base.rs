//! Helpers shared by the services

use bl_contracts::Contract;
use bl_core::error::BlError;
use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};

/// Turns an empty lookup into `NotFound`
pub fn found<T: Entity>(entity: Option<T>, id: Id) -> BlResult<T> {
    entity.ok_or_else(|| BlError::not_found::<T>(id))
}

/// Runs a contract, surfacing its errors as `InvalidArgument`
pub fn validate_with<T, C: Contract<T>>(contract: &C, entity: &T) -> BlResult<()> {
    contract.validate(entity).map_err(|errors| {
        tracing::warn!(errors = %errors, "validation failed");
        BlError::InvalidArgument(errors)
    })
}

/// Trims an optional text field, treating blank as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_contracts::ProjectContract;
    use bl_models::{Project, Sprint};

    #[test]
    fn test_found() {
        let err = found::<Sprint>(None, 9).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(found(Some(Project::new("p")), 1).unwrap().name, "p");
    }

    #[test]
    fn test_validate_with() {
        let err = validate_with(&ProjectContract, &Project::new("")).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(validate_with(&ProjectContract, &Project::new("Apollo")).is_ok());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}

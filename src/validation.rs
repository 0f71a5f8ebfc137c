use crate::db::StoreError;

/// Minimum length of a recipe's instructions, in characters.
pub const MIN_INSTRUCTIONS_LEN: usize = 50;

/// Runs on every write of the instructions field, before the value reaches
/// the active model. A rejected write leaves the previous value in place.
pub fn validate_instructions(instructions: &str) -> Result<(), StoreError> {
    if instructions.chars().count() < MIN_INSTRUCTIONS_LEN {
        return Err(StoreError::Validation {
            field: "instructions",
            min: MIN_INSTRUCTIONS_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_instructions_length() {
        assert!(validate_instructions("Boil water.").is_err());
        assert!(
            validate_instructions(
                "Boil water for 10 minutes, add pasta, stir every two minutes."
            )
            .is_ok()
        );
        assert!(validate_instructions(&"a".repeat(49)).is_err());
        assert!(validate_instructions(&"a".repeat(50)).is_ok());
        assert!(validate_instructions("").is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 50 multi-byte characters, more than 50 bytes either way.
        assert!(validate_instructions(&"é".repeat(50)).is_ok());
        assert!(validate_instructions(&"é".repeat(49)).is_err());
    }

    #[test]
    fn test_error_names_field_and_minimum() {
        let err = validate_instructions("too short").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("instructions"));
        assert!(msg.contains("50"));
    }
}

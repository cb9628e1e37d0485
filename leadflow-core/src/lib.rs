//! LeadFlow Core - Entity Types
//!
//! Pure data structures shared by the API layer, the migration tooling and
//! the test utilities. No I/O lives here.

pub mod dates;
pub mod entities;
pub mod enums;
pub mod error;
pub mod relations;

pub use dates::{parse_due_date, parse_timestamp};
pub use entities::*;
pub use enums::*;
pub use error::{DomainError, DomainResult, ValidationError};
pub use relations::{KeyedTable, OnDelete, ParentRef, KEYED_TABLES};

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier. Every table is keyed by a UUID once the key migration
/// has been applied.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Calendar date used for task due dates.
pub type DueDate = NaiveDate;

/// Inclusive bounds for task progress.
pub const PROGRESS_MIN: i32 = 0;
pub const PROGRESS_MAX: i32 = 100;

/// Validate a task progress percentage.
pub fn validate_progress(progress: i32) -> Result<i32, ValidationError> {
    if (PROGRESS_MIN..=PROGRESS_MAX).contains(&progress) {
        Ok(progress)
    } else {
        Err(ValidationError::OutOfRange {
            field: "progress".to_string(),
            min: PROGRESS_MIN as i64,
            max: PROGRESS_MAX as i64,
            value: progress as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_progress_bounds() {
        assert_eq!(validate_progress(0), Ok(0));
        assert_eq!(validate_progress(100), Ok(100));
        assert!(validate_progress(-1).is_err());
        assert!(validate_progress(101).is_err());
    }

    proptest! {
        #[test]
        fn prop_progress_accepts_exactly_the_percentage_range(p in -1000i32..1000) {
            let accepted = validate_progress(p).is_ok();
            prop_assert_eq!(accepted, (0..=100).contains(&p));
        }
    }
}

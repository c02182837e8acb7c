use std::collections::HashMap;

use super::{Category, Severity};
use crate::error::{GuardError, Result};

/// Built-in category → severity table.
const BUILTIN: &[(Category, Severity)] = &[
    (Category::NoAuthentication, Severity::High),
    (Category::InsecureHttpMethods, Severity::High),
    (Category::NoHttps, Severity::High),
    (Category::UnsafeVerbForIntent, Severity::Medium),
    (Category::UntypedQueryParameter, Severity::Low),
];

/// Severity assigned to each finding category.
///
/// Every category a detector can emit must have an entry; a missing entry
/// is a defect and surfaces as [`GuardError::Configuration`].
#[derive(Debug, Clone)]
pub struct SeverityCatalogue {
    entries: HashMap<Category, Severity>,
}

impl SeverityCatalogue {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().copied())
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Category, Severity)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn severity_of(&self, category: Category) -> Result<Severity> {
        self.entries.get(&category).copied().ok_or_else(|| {
            GuardError::Configuration(format!(
                "no severity is defined for category {}",
                category.tag()
            ))
        })
    }
}

impl Default for SeverityCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_category() {
        let catalogue = SeverityCatalogue::builtin();
        for category in Category::ALL {
            assert!(catalogue.severity_of(category).is_ok(), "{category:?}");
        }
    }

    #[test]
    fn builtin_severities() {
        let catalogue = SeverityCatalogue::builtin();
        assert_eq!(
            catalogue.severity_of(Category::NoHttps).unwrap(),
            Severity::High
        );
        assert_eq!(
            catalogue.severity_of(Category::UnsafeVerbForIntent).unwrap(),
            Severity::Medium
        );
        assert_eq!(
            catalogue.severity_of(Category::UntypedQueryParameter).unwrap(),
            Severity::Low
        );
    }

    #[test]
    fn missing_entry_is_configuration_error() {
        let catalogue =
            SeverityCatalogue::from_entries([(Category::NoAuthentication, Severity::High)]);
        let err = catalogue.severity_of(Category::NoHttps).unwrap_err();
        assert!(matches!(err, GuardError::Configuration(_)));
    }
}

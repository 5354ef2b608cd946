//! Field validation for create and update payloads.
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. structural decode (handled upstream by the JSON extractor)
//! 2. constraints on every present field
//! 3. for create only, presence of the mandatory fields
//!
//! The offending field name is carried on [`ValidationError`] for logging;
//! callers map the whole class to [`crate::Error::InvalidParameters`] so the
//! wire body stays `{"error":"invalid parameters"}`.

use crate::types::{CompanyPatch, CompanyType, CreateCompany, NewCompany, UpdateCompany};

/// Maximum company name length, in characters.
pub const NAME_MAX_CHARS: usize = 15;

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 3000;

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// String exceeds its maximum character count.
    TooLong(usize),
    /// Numeric value below zero.
    Negative,
    /// Value is not in the closed company-type set.
    UnknownCompanyType,
    /// Mandatory field is absent.
    Required,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong(max) => write!(f, "longer than {max} characters"),
            Self::Negative => write!(f, "must not be negative"),
            Self::UnknownCompanyType => write!(f, "not an allowed company type"),
            Self::Required => write!(f, "is required"),
        }
    }
}

/// A single-field validation failure, first offender only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {failure}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// What went wrong with it.
    pub failure: ValidationFailure,
}

impl ValidationError {
    fn new(field: &'static str, failure: ValidationFailure) -> Self {
        Self { field, failure }
    }
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationError::new(
            "name",
            ValidationFailure::TooLong(NAME_MAX_CHARS),
        ));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::new(
            "description",
            ValidationFailure::TooLong(DESCRIPTION_MAX_CHARS),
        ));
    }
    Ok(())
}

fn check_amount(amount: i64) -> Result<(), ValidationError> {
    if amount < 0 {
        return Err(ValidationError::new(
            "amountOfEmployees",
            ValidationFailure::Negative,
        ));
    }
    Ok(())
}

fn check_company_type(raw: &str) -> Result<CompanyType, ValidationError> {
    CompanyType::from_str(raw).ok_or_else(|| {
        ValidationError::new("companyType", ValidationFailure::UnknownCompanyType)
    })
}

/// Validate a create payload and resolve it into the insert shape.
///
/// Absent `description` becomes the empty string and absent `registered`
/// becomes false; the remaining fields are mandatory.
pub fn validate_create(request: &CreateCompany) -> Result<NewCompany, ValidationError> {
    if let Some(name) = request.name.as_deref() {
        check_name(name)?;
    }
    if let Some(description) = request.description.as_deref() {
        check_description(description)?;
    }
    if let Some(amount) = request.amount_of_employees {
        check_amount(amount)?;
    }
    let company_type = request
        .company_type
        .as_deref()
        .map(check_company_type)
        .transpose()?;

    let name = request
        .name
        .clone()
        .ok_or_else(|| ValidationError::new("name", ValidationFailure::Required))?;
    let amount_of_employees = request.amount_of_employees.ok_or_else(|| {
        ValidationError::new("amountOfEmployees", ValidationFailure::Required)
    })?;
    let company_type = company_type
        .ok_or_else(|| ValidationError::new("companyType", ValidationFailure::Required))?;

    Ok(NewCompany {
        name,
        description: request.description.clone().unwrap_or_default(),
        amount_of_employees,
        registered: request.registered.unwrap_or(false),
        company_type,
    })
}

/// Validate an update payload and resolve it into a field-level merge.
///
/// Every field is optional; only present fields are checked.
pub fn validate_update(request: &UpdateCompany) -> Result<CompanyPatch, ValidationError> {
    if let Some(name) = request.name.as_deref() {
        check_name(name)?;
    }
    if let Some(description) = request.description.as_deref() {
        check_description(description)?;
    }
    if let Some(amount) = request.amount_of_employees {
        check_amount(amount)?;
    }
    let company_type = request
        .company_type
        .as_deref()
        .map(check_company_type)
        .transpose()?;

    Ok(CompanyPatch {
        name: request.name.clone(),
        description: request.description.clone(),
        amount_of_employees: request.amount_of_employees,
        registered: request.registered,
        company_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full_create() -> CreateCompany {
        CreateCompany {
            name: Some("example".to_string()),
            description: Some("a company".to_string()),
            amount_of_employees: Some(2),
            registered: Some(false),
            company_type: Some("Non Profit".to_string()),
        }
    }

    #[test]
    fn test_create_resolves_defaults() {
        let request = CreateCompany {
            description: None,
            registered: None,
            ..full_create()
        };

        let resolved = validate_create(&request).unwrap();
        assert_eq!(resolved.description, "");
        assert!(!resolved.registered);
        assert_eq!(resolved.company_type, CompanyType::NonProfit);
    }

    #[test]
    fn test_create_missing_required_fields() {
        let mut request = full_create();
        request.name = None;
        let err = validate_create(&request).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.failure, ValidationFailure::Required);

        let mut request = full_create();
        request.amount_of_employees = None;
        let err = validate_create(&request).unwrap_err();
        assert_eq!(err.field, "amountOfEmployees");
        assert_eq!(err.failure, ValidationFailure::Required);

        let mut request = full_create();
        request.company_type = None;
        let err = validate_create(&request).unwrap_err();
        assert_eq!(err.field, "companyType");
        assert_eq!(err.failure, ValidationFailure::Required);
    }

    #[test]
    fn test_create_constraint_violations() {
        let mut request = full_create();
        request.name = Some("a".repeat(16));
        assert_eq!(validate_create(&request).unwrap_err().field, "name");

        let mut request = full_create();
        request.description = Some("d".repeat(3001));
        assert_eq!(validate_create(&request).unwrap_err().field, "description");

        let mut request = full_create();
        request.amount_of_employees = Some(-1);
        let err = validate_create(&request).unwrap_err();
        assert_eq!(err.field, "amountOfEmployees");
        assert_eq!(err.failure, ValidationFailure::Negative);

        let mut request = full_create();
        request.company_type = Some("LLC".to_string());
        assert_eq!(validate_create(&request).unwrap_err().field, "companyType");
    }

    #[test]
    fn test_constraints_checked_before_required() {
        // Bad name and missing companyType at once: the constraint on the
        // present field is reported first.
        let request = CreateCompany {
            name: Some("way too long a name".to_string()),
            company_type: None,
            ..full_create()
        };

        let err = validate_create(&request).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.failure, ValidationFailure::TooLong(NAME_MAX_CHARS));
    }

    #[test]
    fn test_update_empty_patch_is_valid() {
        let patch = validate_update(&UpdateCompany::default()).unwrap();
        assert_eq!(patch, CompanyPatch::default());
    }

    #[test]
    fn test_update_parses_company_type() {
        let request = UpdateCompany {
            company_type: Some("Cooperative".to_string()),
            ..Default::default()
        };
        let patch = validate_update(&request).unwrap();
        assert_eq!(patch.company_type, Some(CompanyType::Cooperative));

        let request = UpdateCompany {
            company_type: Some("cooperative".to_string()),
            ..Default::default()
        };
        let err = validate_update(&request).unwrap_err();
        assert_eq!(err.field, "companyType");
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        // 15 multi-byte characters fit even though the byte length exceeds 15.
        let request = UpdateCompany {
            name: Some("ö".repeat(15)),
            ..Default::default()
        };
        assert!(validate_update(&request).is_ok());
    }

    proptest! {
        #[test]
        fn prop_name_length_boundary(len in 0usize..40) {
            let request = UpdateCompany {
                name: Some("x".repeat(len)),
                ..Default::default()
            };
            let result = validate_update(&request);
            prop_assert_eq!(result.is_ok(), len <= NAME_MAX_CHARS);
        }

        #[test]
        fn prop_amount_sign_boundary(amount in -1000i64..1000) {
            let request = UpdateCompany {
                amount_of_employees: Some(amount),
                ..Default::default()
            };
            let result = validate_update(&request);
            prop_assert_eq!(result.is_ok(), amount >= 0);
        }
    }
}

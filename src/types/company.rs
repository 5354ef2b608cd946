//! Company entity and request shapes.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a company.
///
/// Wraps a UUID and implements `Ord` so stores can key BTreeMaps on it.
/// Generated by the storage backend at creation, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Create a new CompanyId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a new CompanyId from a UUID string.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Generate a new random CompanyId (for testing).
    #[cfg(test)]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CompanyId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Legal form of a company. Closed set; anything else is rejected at
/// validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyType {
    /// Corporations.
    Corporations,
    /// Non Profit.
    #[serde(rename = "Non Profit")]
    NonProfit,
    /// Cooperative.
    Cooperative,
    /// Sole Proprietorship.
    #[serde(rename = "Sole Proprietorship")]
    SoleProprietorship,
}

impl CompanyType {
    /// Every allowed value, in declaration order.
    pub const ALL: [CompanyType; 4] = [
        Self::Corporations,
        Self::NonProfit,
        Self::Cooperative,
        Self::SoleProprietorship,
    ];

    /// Parse a company type from its wire string. Case-sensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Corporations" => Some(Self::Corporations),
            "Non Profit" => Some(Self::NonProfit),
            "Cooperative" => Some(Self::Cooperative),
            "Sole Proprietorship" => Some(Self::SoleProprietorship),
            _ => None,
        }
    }

    /// The wire string for this company type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corporations => "Corporations",
            Self::NonProfit => "Non Profit",
            Self::Cooperative => "Cooperative",
            Self::SoleProprietorship => "Sole Proprietorship",
        }
    }
}

impl fmt::Display for CompanyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The company resource as exposed over HTTP.
///
/// Internal bookkeeping columns (`created_at`, `modified_at`, `deleted_at`)
/// never leave the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Server-generated identifier.
    pub id: CompanyId,
    /// Unique among non-deleted companies, at most 15 characters.
    pub name: String,
    /// Free-form description, at most 3000 characters.
    pub description: String,
    /// Head count, never negative.
    pub amount_of_employees: i64,
    /// Whether the company is registered.
    pub registered: bool,
    /// Legal form.
    pub company_type: CompanyType,
}

/// Body of `POST /api/v1/company` before validation.
///
/// Every field is optional at the decode stage so that missing required
/// fields are reported by the validation engine, not as a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompany {
    /// Company name (required).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description (optional, defaults to empty).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Head count (required).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_of_employees: Option<i64>,
    /// Registration flag (optional, defaults to false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<bool>,
    /// Legal form as its wire string (required).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
}

/// Body of `PATCH /api/v1/company/:company_id` before validation.
///
/// Absence means "leave unchanged"; presence means "set to this value".
/// The distinction is carried by `Option`, never by a zero value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    /// New name, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New head count, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_of_employees: Option<i64>,
    /// New registration flag, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<bool>,
    /// New legal form as its wire string, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
}

/// A validated, fully-resolved insert shape produced by
/// [`crate::validation::validate_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    /// Company name.
    pub name: String,
    /// Description; empty string when the request omitted it.
    pub description: String,
    /// Head count.
    pub amount_of_employees: i64,
    /// Registration flag; false when the request omitted it.
    pub registered: bool,
    /// Legal form.
    pub company_type: CompanyType,
}

/// A validated field-level merge produced by
/// [`crate::validation::validate_update`].
///
/// Stores apply each present field and leave absent fields untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    /// New name, if supplied.
    pub name: Option<String>,
    /// New description, if supplied.
    pub description: Option<String>,
    /// New head count, if supplied.
    pub amount_of_employees: Option<i64>,
    /// New registration flag, if supplied.
    pub registered: Option<bool>,
    /// New legal form, if supplied.
    pub company_type: Option<CompanyType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_type_roundtrip() {
        for ct in CompanyType::ALL {
            assert_eq!(CompanyType::from_str(ct.as_str()), Some(ct));
        }
    }

    #[test]
    fn test_company_type_rejects_unknown_and_wrong_case() {
        assert_eq!(CompanyType::from_str("LLC"), None);
        assert_eq!(CompanyType::from_str("corporations"), None);
        assert_eq!(CompanyType::from_str("non profit"), None);
        assert_eq!(CompanyType::from_str(""), None);
    }

    #[test]
    fn test_company_serializes_camel_case() {
        let company = Company {
            id: CompanyId::new(Uuid::from_u128(7)),
            name: "example".to_string(),
            description: String::new(),
            amount_of_employees: 2,
            registered: false,
            company_type: CompanyType::NonProfit,
        };

        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["amountOfEmployees"], 2);
        assert_eq!(json["companyType"], "Non Profit");
        assert_eq!(json["name"], "example");
    }

    #[test]
    fn test_update_request_absent_fields_stay_absent() {
        let request: UpdateCompany = serde_json::from_str(r#"{"registered":true}"#).unwrap();
        assert_eq!(request.registered, Some(true));
        assert!(request.name.is_none());
        assert!(request.amount_of_employees.is_none());
        assert!(request.company_type.is_none());
    }
}

//! Core types for the company registry.

pub mod company;

pub use company::{
    Company, CompanyId, CompanyPatch, CompanyType, CreateCompany, NewCompany, UpdateCompany,
};

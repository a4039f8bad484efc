//! CRM opportunities.
//!
//! [`Opportunity`] holds a sales opportunity in memory and writes it through
//! SeaORM. Saving validates the record, links its account and fans out
//! permission grants when the record is shared. Deleting is a soft delete.

pub mod account;
pub mod error;
pub mod opportunity;
pub mod params;
pub mod permission;
pub mod scope;
pub mod validation;

pub use account::{AccountCandidate, AccountLinkResolver, AccountResolver};
pub use entity::{Access, AssetKind};
pub use error::{CrmError, CrmResult};
pub use opportunity::{Grant, Opportunity};
pub use params::{AccountParams, OpportunityForm, OpportunityParams};
pub use permission::{AssetRef, PermissionSource};
pub use validation::{ErrorCode, Field, FieldError, ValidationErrors};

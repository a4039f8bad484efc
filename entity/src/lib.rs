pub mod access;
pub mod account;
pub mod account_opportunity;
pub mod campaign;
pub mod contact;
pub mod contact_opportunity;
pub mod lead;
pub mod opportunity;
pub mod permission;
pub mod users;

pub use access::Access;
pub use permission::AssetKind;

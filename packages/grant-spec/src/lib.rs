pub mod grantable_trait;
pub mod grants;


pub use crate::grantable_trait::{dedupe_grants, GrantIdentity, Grantable};
pub use crate::grants::{Authorization, Grant, GrantRequest, RevokeRequest};

use itertools::Itertools;

use crate::grants::{Grant, GrantRequest};

/// Two grants with the same identity on the same network are the same grant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantIdentity {
    pub granter: String,
    pub grantee: String,
    pub msg_type_url: String,
}

pub trait Grantable {
    fn granter(&self) -> &str;
    fn grantee(&self) -> &str;
    fn msg_type_url(&self) -> String;

    fn identity(&self) -> GrantIdentity {
        GrantIdentity {
            granter: self.granter().to_string(),
            grantee: self.grantee().to_string(),
            msg_type_url: self.msg_type_url(),
        }
    }
}

impl Grantable for Grant {
    fn granter(&self) -> &str {
        &self.granter
    }
    fn grantee(&self) -> &str {
        &self.grantee
    }
    fn msg_type_url(&self) -> String {
        self.authorization.msg_type_url()
    }
}

impl Grantable for GrantRequest {
    fn granter(&self) -> &str {
        &self.granter
    }
    fn grantee(&self) -> &str {
        &self.grantee
    }
    fn msg_type_url(&self) -> String {
        self.authorization.msg_type_url()
    }
}

/// Drops every grant whose identity was already seen, keeping the first one
pub fn dedupe_grants<T: Grantable>(grants: Vec<T>) -> Vec<T> {
    grants.into_iter().unique_by(|g| g.identity()).collect()
}

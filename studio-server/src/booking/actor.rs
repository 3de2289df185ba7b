//! 操作者上下文
//!
//! Every booking operation takes an explicit [`Actor`] instead of reading
//! ambient session state: the tenant, the caller's member identity (when the
//! caller is a member) and the role travel together through the call. The
//! axum extractor in `api/` builds this from request headers; tests build it
//! directly.

use super::error::{BookingError, BookingResult};

/// 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "member" => Some(Role::Member),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

/// 操作者：租户 + 身份 + 角色
#[derive(Debug, Clone)]
pub struct Actor {
    pub tenant_id: i64,
    /// Set when the caller is (or acts as) a specific member
    pub member_id: Option<i64>,
    pub role: Role,
}

impl Actor {
    pub fn member(tenant_id: i64, member_id: i64) -> Self {
        Self {
            tenant_id,
            member_id: Some(member_id),
            role: Role::Member,
        }
    }

    pub fn admin(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            member_id: None,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::SuperAdmin)
    }

    /// Admin-only operations gate on this
    pub fn require_admin(&self) -> BookingResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(BookingError::Unauthorized)
        }
    }

    /// Member self-service operations need a concrete member identity
    pub fn require_member(&self) -> BookingResult<i64> {
        self.member_id.ok_or(BookingError::Unauthorized)
    }
}

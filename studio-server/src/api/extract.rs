//! 请求上下文提取
//!
//! The fronting proxy authenticates callers and forwards identity assertions
//! as headers; this module materializes them into capability contexts:
//!
//! | Header | 说明 |
//! |--------|------|
//! | `x-studio` | 租户 domain prefix（必填，除超管接口外） |
//! | `x-role` | `member` / `admin` / `super_admin`（缺省 `member`） |
//! | `x-member-id` | 会员 id（会员自助接口必填） |
//!
//! Tenant resolution happens here so no handler ever sees a request for an
//! unknown or deactivated studio.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::booking::{Actor, Role};
use crate::core::ServerState;
use crate::db::repository::tenant;
use crate::utils::AppError;

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

impl FromRequestParts<ServerState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let prefix = header(parts, "x-studio")
            .ok_or_else(|| AppError::invalid("Missing x-studio header"))?
            .to_owned();

        let studio = tenant::find_by_prefix(&state.pool, &prefix)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Studio '{prefix}' not found")))?;
        if !studio.is_active {
            return Err(AppError::forbidden(format!(
                "Studio '{prefix}' is deactivated"
            )));
        }

        let role = match header(parts, "x-role") {
            Some(raw) => Role::parse(raw)
                .ok_or_else(|| AppError::invalid(format!("Unknown role '{raw}'")))?,
            None => Role::Member,
        };
        let member_id = match header(parts, "x-member-id") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| AppError::invalid("x-member-id must be an integer"))?,
            ),
            None => None,
        };

        Ok(Actor {
            tenant_id: studio.id,
            member_id,
            role,
        })
    }
}

/// 超管上下文：跨租户接口（租户目录）专用
pub struct SuperAdmin;

impl<S: Send + Sync> FromRequestParts<S> for SuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match header(parts, "x-role") {
            Some("super_admin") => Ok(SuperAdmin),
            _ => Err(AppError::forbidden("Super admin role required")),
        }
    }
}

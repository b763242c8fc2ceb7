//! Route Table Module Index
//!
//! Organizes the front-end route table into access tiers. Each tier module only declares
//! data; the guard is the single place where the flags are interpreted.
//!
//! The three modules map directly to the access levels of the attendance application.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::Route;

/// Routes reachable without a session (home) or only without one (login, register).
pub mod public;

/// Routes requiring a session token, with or without a student role.
pub mod authenticated;

/// Teacher-only management routes nested under `/admin`.
pub mod admin;

/// RouteTableError
///
/// Violations detected while building a `RouteTable`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route path `{0}` must start with '/'")]
    MissingLeadingSlash(String),
    #[error("route path `{0}` is declared more than once")]
    DuplicatePath(String),
    #[error("route name `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("route `{0}` declares an empty role")]
    EmptyRole(String),
}

/// RouteTable
///
/// The validated, immutable list of front-end routes, kept in declaration order.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Builds a table, rejecting malformed paths, duplicates and empty role requirements.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteTableError> {
        let mut paths = HashSet::new();
        let mut names = HashSet::new();

        for route in &routes {
            if !route.path.starts_with('/') {
                return Err(RouteTableError::MissingLeadingSlash(route.path.clone()));
            }
            if !paths.insert(route.path.as_str()) {
                return Err(RouteTableError::DuplicatePath(route.path.clone()));
            }
            if !names.insert(route.name.as_str()) {
                return Err(RouteTableError::DuplicateName(route.name.clone()));
            }
            if route.access.role.as_deref() == Some("") {
                return Err(RouteTableError::EmptyRole(route.path.clone()));
            }
        }

        Ok(Self { routes })
    }

    /// The attendance application's route table.
    pub fn standard() -> Result<Self, RouteTableError> {
        let mut routes = public::public_routes();
        routes.extend(authenticated::authenticated_routes());
        routes.extend(admin::admin_routes());
        Self::new(routes)
    }

    /// Exact path lookup.
    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.path == path)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

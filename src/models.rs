use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Route Table Schemas ---

/// Page
///
/// Identifies the view component rendered for a route. Several routes may render the
/// same page (the student and teacher record listings share `AttendanceRecords`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Page {
    Home,
    Login,
    Register,
    AttendancePage,
    AttendanceRecords,
    StudentRegister,
    ClassManagement,
    AttendanceRules,
}

impl Page {
    /// The component name used as the `data-page` attribute of the mount point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Login => "Login",
            Page::Register => "Register",
            Page::AttendancePage => "AttendancePage",
            Page::AttendanceRecords => "AttendanceRecords",
            Page::StudentRegister => "StudentRegister",
            Page::ClassManagement => "ClassManagement",
            Page::AttendanceRules => "AttendanceRules",
        }
    }
}

/// AccessFlags
///
/// The access-control metadata attached to a route. A route with all flags unset is
/// reachable by anyone, in any session state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AccessFlags {
    /// Navigation requires a session token.
    #[serde(default)]
    pub requires_auth: bool,
    /// Navigation requires the absence of a session token (login, register).
    #[serde(default)]
    pub requires_guest: bool,
    /// Navigation requires this exact role string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub role: Option<String>,
}

impl AccessFlags {
    /// No restrictions.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Self::default()
        }
    }

    pub fn guest() -> Self {
        Self {
            requires_guest: true,
            ..Self::default()
        }
    }

    /// Requires authentication and the given role.
    pub fn role(role: impl Into<String>) -> Self {
        Self {
            requires_auth: true,
            requires_guest: false,
            role: Some(role.into()),
        }
    }
}

/// Route
///
/// A single entry of the route table: URL path, route name, rendered page and access
/// metadata. Routes are immutable once the table is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Route {
    pub path: String,
    pub name: String,
    pub page: Page,
    #[serde(rename = "meta")]
    pub access: AccessFlags,
}

impl Route {
    pub fn new(path: &str, name: &str, page: Page, access: AccessFlags) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            page,
            access,
        }
    }
}

// --- Session & Navigation ---

/// SessionContext
///
/// The session values the guard observes: the opaque auth token and the user role.
/// Empty strings are normalized to `None`, so an empty token counts as logged out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionContext {
    #[ts(optional)]
    pub token: Option<String>,
    #[ts(optional)]
    pub role: Option<String>,
}

impl SessionContext {
    pub fn new(token: Option<String>, role: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            role: role.filter(|r| !r.is_empty()),
        }
    }

    /// An anonymous visitor.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// NavigationOutcome
///
/// The three possible results of running the guard against a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationOutcome {
    Proceed,
    RedirectToLogin,
    RedirectToHome,
}

impl NavigationOutcome {
    /// Path the client must be sent to, or `None` when navigation proceeds.
    pub fn redirect_location(&self) -> Option<&'static str> {
        match self {
            NavigationOutcome::Proceed => None,
            NavigationOutcome::RedirectToLogin => Some("/login"),
            NavigationOutcome::RedirectToHome => Some("/"),
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// ResolveRequest
///
/// Input payload for `POST /nav/resolve`. The session is passed explicitly so callers can
/// ask "where would this navigation land" without holding cookies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolveRequest {
    #[schema(example = "/admin/classes")]
    pub path: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    #[schema(example = "teacher")]
    pub role: Option<String>,
}

/// LoginSession
///
/// Input payload for `POST /session`: the body the attendance back-end returns from its
/// login endpoint, forwarded as-is by the login page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginSession {
    pub access_token: String,
    #[serde(default)]
    #[schema(example = "bearer")]
    pub token_type: Option<String>,
    #[schema(example = "student")]
    pub user_role: String,
}

// --- Response Payloads (Output Schemas) ---

/// ResolveResponse
///
/// Output of `POST /nav/resolve`. `route` is the matched route name (absent for unmatched
/// paths) and `location` the redirect target, absent when the navigation proceeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    pub route: Option<String>,
    pub outcome: NavigationOutcome,
    pub location: Option<String>,
}

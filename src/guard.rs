use crate::{
    models::{AccessFlags, NavigationOutcome, Route, SessionContext},
    routes::RouteTable,
};

/// evaluate
///
/// The navigation guard. Decides whether a navigation to a route with the given access
/// flags proceeds, given the current session. Pure: no storage access, no side effects.
///
/// Decision order, first match wins:
/// 1. `requires_auth` without a token redirects to `/login`.
/// 2. `requires_guest` with a token redirects to `/`.
/// 3. A declared role not equal to the session role redirects to `/`. A missing session
///    role is a mismatch. An empty declared role counts as no role.
/// 4. Otherwise the navigation proceeds.
pub fn evaluate(access: &AccessFlags, session: &SessionContext) -> NavigationOutcome {
    let authenticated = session.is_authenticated();

    if access.requires_auth && !authenticated {
        return NavigationOutcome::RedirectToLogin;
    }

    if access.requires_guest && authenticated {
        return NavigationOutcome::RedirectToHome;
    }

    if let Some(required) = access.role.as_deref().filter(|role| !role.is_empty()) {
        if session.role.as_deref() != Some(required) {
            return NavigationOutcome::RedirectToHome;
        }
    }

    NavigationOutcome::Proceed
}

/// Resolution
///
/// The outcome of resolving a path against the route table: the matched route, if any,
/// and the guard's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub route: Option<&'a Route>,
    pub outcome: NavigationOutcome,
}

/// resolve
///
/// Looks `path` up in the table and runs the guard on the match. Unmatched paths resolve
/// to a redirect home. Any query or fragment is ignored, as is a single trailing slash
/// (`/records/?page=2` matches `/records`).
pub fn resolve<'a>(table: &'a RouteTable, path: &str, session: &SessionContext) -> Resolution<'a> {
    let path = route_path(path);
    let route = table.find(path).or_else(|| {
        path.strip_suffix('/')
            .filter(|trimmed| !trimmed.is_empty())
            .and_then(|trimmed| table.find(trimmed))
    });

    let outcome = match route {
        Some(route) => evaluate(&route.access, session),
        None => NavigationOutcome::RedirectToHome,
    };

    tracing::debug!(
        path = %path,
        route = route.map(|r| r.name.as_str()).unwrap_or("<unmatched>"),
        authenticated = session.is_authenticated(),
        role = session.role.as_deref().unwrap_or("<none>"),
        outcome = ?outcome,
        "Navigation guard evaluated"
    );

    Resolution { route, outcome }
}

/// route_path
///
/// The path part of a navigation target, without its query string or fragment.
pub fn route_path(location: &str) -> &str {
    location
        .split_once(['?', '#'])
        .map_or(location, |(path, _)| path)
}

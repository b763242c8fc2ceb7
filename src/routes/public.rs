use crate::models::{AccessFlags, Page, Route};

/// Public Route Module
///
/// Declares the routes any visitor can request. The home page carries no flags at all,
/// so it is the landing target of every guard redirect except the login redirect.
///
/// Guest Mandate:
/// The login and registration pages are marked `requiresGuest`. A visitor who already
/// holds a session token is sent back to `/` instead of seeing them again.
pub fn public_routes() -> Vec<Route> {
    vec![
        // GET /
        // Landing page. No flags: always proceeds, regardless of session state.
        Route::new("/", "Home", Page::Home, AccessFlags::open()),
        // GET /login
        // Login form. Posts credentials to the back-end through the /api proxy.
        Route::new("/login", "Login", Page::Login, AccessFlags::guest()),
        // GET /register
        // Account registration form.
        Route::new("/register", "Register", Page::Register, AccessFlags::guest()),
    ]
}

use crate::models::{AccessFlags, Page, Route};

/// Authenticated Route Module
///
/// Declares the routes that require a session token. Visitors without one are redirected
/// to `/login` before any role check runs.
pub fn authenticated_routes() -> Vec<Route> {
    vec![
        // GET /attendance
        // Face-recognition check-in page, available to any signed-in user.
        Route::new(
            "/attendance",
            "Attendance",
            Page::AttendancePage,
            AccessFlags::authenticated(),
        ),
        // GET /records
        // The signed-in user's own attendance history.
        Route::new(
            "/records",
            "Records",
            Page::AttendanceRecords,
            AccessFlags::authenticated(),
        ),
        // GET /student-register
        // Face enrollment for students. Any other role is sent back to `/`.
        Route::new(
            "/student-register",
            "StudentRegister",
            Page::StudentRegister,
            AccessFlags::role("student"),
        ),
    ]
}

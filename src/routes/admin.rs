use crate::models::{AccessFlags, Page, Route};

/// The role string the back-end issues to teaching staff.
pub const TEACHER_ROLE: &str = "teacher";

/// Admin Route Module
///
/// Declares the management pages under `/admin`. Every entry requires both a session
/// token and the exact role `teacher`; a student token lands back on `/`.
pub fn admin_routes() -> Vec<Route> {
    vec![
        // GET /admin/attendance-records
        // Attendance records across all of the teacher's classes. Reuses the records page.
        Route::new(
            "/admin/attendance-records",
            "TeacherAttendanceRecords",
            Page::AttendanceRecords,
            AccessFlags::role(TEACHER_ROLE),
        ),
        // GET /admin/classes
        // Class creation and roster management.
        Route::new(
            "/admin/classes",
            "ClassManagement",
            Page::ClassManagement,
            AccessFlags::role(TEACHER_ROLE),
        ),
        // GET /admin/attendance-rules
        // Check-in windows and lateness thresholds per class.
        Route::new(
            "/admin/attendance-rules",
            "AttendanceRules",
            Page::AttendanceRules,
            AccessFlags::role(TEACHER_ROLE),
        ),
    ]
}

use crate::api::attendance::{AttendanceWithStudent, CheckInReq, CreateAbsence, UpdateAttendance};
use crate::api::leave_request::{
    CreateLeave, LeaveDecision, LeaveFilter, LeaveListResponse, LeaveWithUser, UpdateLeaveStatus,
};
use crate::api::master_data::{DepartmentPayload, LocationPayload, SakaPayload};
use crate::api::reports::{
    AttendanceSummary, DashboardStats, MonthlyTrend, StudentStatRow, StudentStatsResponse,
};
use crate::api::users::{CreateUser, UpdateProfile, UpdateUser, UserListResponse, UserWithNames};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::department::Department;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::location::Location;
use crate::model::role::Role;
use crate::model::saka::Saka;
use crate::model::user::User;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Internship Tracking API",
        version = "1.0.0",
        description = r#"
## Internship Attendance Tracking System

This API powers an **internship tracking** system for managing student attendance during work placements.

### 🔹 Key Features
- **Attendance Tracking**
  - Daily check-in with photo, check-out, late detection after 09:00 local time
- **Leave Management**
  - Students request sick or personal leave; admins approve or reject
- **User Management**
  - Admin CRUD over students, teachers, and admins plus self-service profiles
- **Master Data**
  - Departments, locations, and sakas used to classify students
- **Reports**
  - Dashboard counters, monthly summaries, trends, and per-student totals

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Administrative operations require the **ADMIN** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

### 🚀 Usage
Use this API to build:
- Admin dashboards
- Student self-service check-in apps
- Placement attendance reports

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_history,
        crate::api::attendance::record_absence,
        crate::api::attendance::update_attendance,
        crate::api::attendance::monthly_report,
        crate::api::attendance::student_history,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::list_leaves,
        crate::api::leave_request::update_leave_status,
        crate::api::leave_request::delete_leave,

        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::users::get_profile,
        crate::api::users::update_profile,

        crate::api::master_data::create_department,
        crate::api::master_data::list_departments,
        crate::api::master_data::update_department,
        crate::api::master_data::delete_department,
        crate::api::master_data::create_location,
        crate::api::master_data::list_locations,
        crate::api::master_data::update_location,
        crate::api::master_data::delete_location,
        crate::api::master_data::create_saka,
        crate::api::master_data::list_sakas,
        crate::api::master_data::update_saka,
        crate::api::master_data::delete_saka,

        crate::api::reports::dashboard,
        crate::api::reports::attendance_summary,
        crate::api::reports::monthly_trends,
        crate::api::reports::student_stats
    ),
    components(
        schemas(
            Role,
            User,
            Attendance,
            AttendanceStatus,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            Department,
            Location,
            Saka,
            CheckInReq,
            CreateAbsence,
            UpdateAttendance,
            AttendanceWithStudent,
            CreateLeave,
            LeaveDecision,
            UpdateLeaveStatus,
            LeaveFilter,
            LeaveWithUser,
            LeaveListResponse,
            CreateUser,
            UpdateUser,
            UpdateProfile,
            UserWithNames,
            UserListResponse,
            DepartmentPayload,
            LocationPayload,
            SakaPayload,
            DashboardStats,
            AttendanceSummary,
            MonthlyTrend,
            StudentStatRow,
            StudentStatsResponse
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Users", description = "User management APIs"),
        (name = "Master Data", description = "Department, location and saka lookup APIs"),
        (name = "Reports", description = "Aggregate reporting APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

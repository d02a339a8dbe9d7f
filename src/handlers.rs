use crate::{
    AppState,
    auth::{Role, Session, require_role},
    error::{ApiError, MSG_EXAM_NOT_FOUND, MSG_MISSING_EXAM_ID, PageError, json_utf8},
    models::{ExamData, ErrorBody},
    templates,
};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{Html, IntoResponse},
};
use serde::Deserialize;

/// How many rows the dashboard shows in each "recent" table.
pub const DASHBOARD_RECENT_LIMIT: i64 = 10;

// --- Query Structs ---

/// ExamQuery
///
/// Query string of `get_exam_data.php`. Kept as a raw string so that a missing,
/// empty or malformed id all map to the same 400 response instead of axum's
/// default rejection.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExamQuery {
    /// Identifier of the exam to fetch.
    pub exam_id: Option<String>,
}

impl ExamQuery {
    pub fn exam_id(&self) -> Option<i64> {
        self.exam_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
    }
}

/// StudentFilter
///
/// Optional search term on the teacher's student list.
#[derive(Deserialize, Default)]
pub struct StudentFilter {
    pub search: Option<String>,
}

// --- Handlers ---

/// admin_dashboard
///
/// [Admin Page] Site-wide counters plus the most recent courses and users.
///
/// Non-admins are redirected to the login page before any query runs. A failing
/// course listing is logged and shown as an empty table.
pub async fn admin_dashboard(
    session: Session,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let admin = require_role(&session, Role::Admin)
        .map_err(|_| PageError::Redirect(state.config.login_url.clone()))?;

    let stats = state.repo.get_dashboard_stats().await?;

    let courses = state
        .repo
        .get_recent_courses(DASHBOARD_RECENT_LIMIT)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("failed to load recent courses: {}", e);
            vec![]
        });

    let users = state.repo.get_recent_users(DASHBOARD_RECENT_LIMIT).await?;

    Ok(Html(templates::render_admin_dashboard(
        admin, &stats, &courses, &users,
    )))
}

/// teacher_students
///
/// [Teacher Page] The teacher's own courses and the student list.
///
/// Courses are scoped by `teacher_id` in the query. A failing course listing
/// degrades to an empty list. The query string is only looked at after the gate;
/// an unparseable one is treated as no search.
pub async fn teacher_students(
    session: Session,
    State(state): State<AppState>,
    filter: Result<Query<StudentFilter>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let teacher = require_role(&session, Role::Teacher)
        .map_err(|_| PageError::Redirect(state.config.login_url.clone()))?;

    let filter = match filter {
        Ok(Query(filter)) => filter,
        Err(e) => {
            tracing::debug!("ignoring malformed student filter: {}", e);
            StudentFilter::default()
        }
    };

    let courses = state
        .repo
        .get_teacher_courses(teacher.id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(teacher_id = teacher.id, "failed to load teacher courses: {}", e);
            vec![]
        });

    let students = state.repo.get_students(filter.search.clone()).await?;

    Ok(Html(templates::render_student_list(
        teacher,
        &courses,
        &students,
        filter.search.as_deref(),
    )))
}

/// get_exam_data
///
/// [Teacher API] Returns an exam with its questions decoded from the stored JSON.
///
/// Order of checks: role gate (403), `exam_id` (400), ownership (403), existence
/// (404). The ownership check runs before the lookup, so a teacher cannot tell
/// another teacher's exam apart from a missing one. A query string that fails to
/// parse is reported only after the gate, as a missing `exam_id`.
#[utoipa::path(
    get,
    path = "/get_exam_data.php",
    params(ExamQuery),
    responses(
        (status = 200, description = "Exam with decoded questions", body = ExamData),
        (status = 400, description = "Missing exam_id", body = ErrorBody),
        (status = 403, description = "No teacher session, or exam owned by another teacher", body = ErrorBody),
        (status = 404, description = "Exam not found", body = ErrorBody)
    )
)]
pub async fn get_exam_data(
    session: Session,
    State(state): State<AppState>,
    query: Result<Query<ExamQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let teacher = require_role(&session, Role::Teacher).map_err(|_| ApiError::Forbidden)?;

    let exam_id = query
        .ok()
        .and_then(|Query(query)| query.exam_id())
        .ok_or(ApiError::MissingParameter(MSG_MISSING_EXAM_ID))?;

    let owned = state.repo.count_owned_exams(exam_id, teacher.id).await?;
    if owned == 0 {
        tracing::info!(exam_id, teacher_id = teacher.id, "exam access denied");
        return Err(ApiError::Forbidden);
    }

    let exam = state
        .repo
        .get_exam(exam_id)
        .await?
        .ok_or(ApiError::NotFound(MSG_EXAM_NOT_FOUND))?;

    Ok((json_utf8(), Json(ExamData::from(exam))))
}

use crate::error::RepositoryError;
use crate::models::{Course, CourseOverview, DashboardStats, ExamRow, Student, User};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository
///
/// Persistence contract used by the handlers. Ownership rules live in the queries
/// themselves (`teacher_id = $n`), so a handler can only ever see rows scoped to the
/// requesting teacher.
///
/// `Send + Sync` lets the trait object be shared as `Arc<dyn Repository>` across
/// axum's tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Session ---
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;

    // --- Admin dashboard ---
    async fn get_dashboard_stats(&self) -> RepoResult<DashboardStats>;
    async fn get_recent_courses(&self, limit: i64) -> RepoResult<Vec<Course>>;
    async fn get_recent_users(&self, limit: i64) -> RepoResult<Vec<User>>;

    // --- Teacher pages ---
    // Courses owned by `teacher_id` with their module/material/file counts.
    async fn get_teacher_courses(&self, teacher_id: i64) -> RepoResult<Vec<CourseOverview>>;
    async fn get_students(&self, search: Option<String>) -> RepoResult<Vec<Student>>;

    // --- Exams ---
    // Number of exams with `exam_id` whose course belongs to `teacher_id` (0 or 1).
    async fn count_owned_exams(&self, exam_id: i64, teacher_id: i64) -> RepoResult<i64>;
    async fn get_exam(&self, exam_id: i64) -> RepoResult<Option<ExamRow>>;
}

/// contains_pattern
///
/// Builds a `%term%` ILIKE pattern in which `%`, `_` and `\` of the user's term
/// match literally (paired with `ESCAPE '\'`).
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// RepositoryState
///
/// The shared handle to the persistence layer stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL through a sqlx connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, role, name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// get_dashboard_stats
    ///
    /// All counters in a single round trip using scalar subqueries.
    async fn get_dashboard_stats(&self) -> RepoResult<DashboardStats> {
        let (total_users, teachers, students, courses, exams) =
            sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM users WHERE role = 'teacher'),
                    (SELECT COUNT(*) FROM users WHERE role = 'student'),
                    (SELECT COUNT(*) FROM courses),
                    (SELECT COUNT(*) FROM course_exams)
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(DashboardStats {
            total_users,
            teachers,
            students,
            courses,
            exams,
        })
    }

    async fn get_recent_courses(&self, limit: i64) -> RepoResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT c.id, c.teacher_id, c.title, c.category, c.created_at, u.name AS teacher_name
            FROM courses c
            LEFT JOIN users u ON u.id = c.teacher_id
            ORDER BY c.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn get_recent_users(&self, limit: i64) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, role, name, email, created_at FROM users ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// get_teacher_courses
    ///
    /// Counts are taken with DISTINCT because the three LEFT JOINs fan out rows.
    async fn get_teacher_courses(&self, teacher_id: i64) -> RepoResult<Vec<CourseOverview>> {
        let courses = sqlx::query_as::<_, CourseOverview>(
            r#"
            SELECT
                c.id, c.title, c.category, c.created_at,
                COUNT(DISTINCT m.id) AS module_count,
                COUNT(DISTINCT mm.id) AS material_count,
                COUNT(DISTINCT f.id) AS file_count
            FROM courses c
            LEFT JOIN course_modules m ON m.course_id = c.id
            LEFT JOIN module_materials mm ON mm.module_id = m.id
            LEFT JOIN uploaded_files f ON f.material_id = mm.id
            WHERE c.teacher_id = $1
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    /// get_students
    ///
    /// The optional search term is bound, never interpolated.
    async fn get_students(&self, search: Option<String>) -> RepoResult<Vec<Student>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT id, name, email, created_at FROM users WHERE role = 'student'",
        );

        if let Some(s) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = contains_pattern(s.trim());
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR email ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\')");
        }

        builder.push(" ORDER BY name ASC");

        let students = builder
            .build_query_as::<Student>()
            .fetch_all(&self.pool)
            .await?;
        Ok(students)
    }

    async fn count_owned_exams(&self, exam_id: i64, teacher_id: i64) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM course_exams e
            JOIN courses c ON c.id = e.course_id
            WHERE e.id = $1 AND c.teacher_id = $2
            "#,
        )
        .bind(exam_id)
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn get_exam(&self, exam_id: i64) -> RepoResult<Option<ExamRow>> {
        let exam = sqlx::query_as::<_, ExamRow>(
            "SELECT id, course_id, title, questions, created_at FROM course_exams WHERE id = $1",
        )
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exam)
    }
}

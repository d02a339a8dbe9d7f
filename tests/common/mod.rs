#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use edu_portal::{
    AppState,
    auth::{Role, Session, SessionUser},
    config::AppConfig,
    error::RepositoryError,
    models::{Course, CourseOverview, DashboardStats, ExamRow, Student, User},
    repository::{RepoResult, Repository},
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

// --- Fixture ids ---

pub const ADMIN_ID: i64 = 1;
pub const TEACHER_ID: i64 = 2;
pub const OTHER_TEACHER_ID: i64 = 3;
pub const STUDENT_ID: i64 = 4;
pub const UNKNOWN_ROLE_ID: i64 = 5;

pub const OWNED_EXAM_ID: i64 = 5;
pub const FOREIGN_EXAM_ID: i64 = 6;
pub const BROKEN_EXAM_ID: i64 = 7;

// --- MOCK REPOSITORY IMPLEMENTATION ---

/// In-memory repository. Records the name of every method called so tests can
/// assert that a rejected request never reached the guarded query.
pub struct MockRepo {
    pub users: HashMap<i64, User>,
    // course id -> teacher id
    pub course_owners: HashMap<i64, i64>,
    pub exams: HashMap<i64, ExamRow>,
    pub students: Vec<Student>,
    pub teacher_courses: Vec<CourseOverview>,
    pub recent_courses: Vec<Course>,
    pub stats: DashboardStats,
    pub fail_course_listing: bool,
    pub fail_everything: bool,
    // Answer the ownership check with 1 even if get_exam finds nothing (deleted in between).
    pub exam_vanishes: bool,
    pub calls: Mutex<Vec<&'static str>>,
}

fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap()
}

fn user(id: i64, role: &str, name: &str) -> User {
    User {
        id,
        role: role.to_string(),
        name: name.to_string(),
        email: format!("user{}@school.example", id),
        created_at: ts(),
    }
}

fn exam(id: i64, course_id: i64, questions: &str) -> ExamRow {
    ExamRow {
        id,
        course_id,
        title: format!("Экзамен {}", id),
        questions: questions.to_string(),
        created_at: ts(),
    }
}

impl Default for MockRepo {
    fn default() -> Self {
        let users = [
            user(ADMIN_ID, "admin", "Админ"),
            user(TEACHER_ID, "teacher", "Иван Петров"),
            user(OTHER_TEACHER_ID, "teacher", "Мария Сидорова"),
            user(STUDENT_ID, "student", "Пётр <Студент>"),
            user(UNKNOWN_ROLE_ID, "janitor", "Someone"),
        ]
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

        let exams = [
            exam(
                OWNED_EXAM_ID,
                10,
                r#"[{"question":"Сколько будет 2+2?","answers":["3","4"],"correct":1}]"#,
            ),
            exam(FOREIGN_EXAM_ID, 11, r#"[{"question":"Чужой вопрос"}]"#),
            exam(BROKEN_EXAM_ID, 10, "not json at all"),
        ]
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

        MockRepo {
            users,
            course_owners: HashMap::from([(10, TEACHER_ID), (11, OTHER_TEACHER_ID)]),
            exams,
            students: vec![Student {
                id: STUDENT_ID,
                name: "Пётр <Студент>".to_string(),
                email: "user4@school.example".to_string(),
                created_at: ts(),
            }],
            teacher_courses: vec![CourseOverview {
                id: 10,
                title: "Алгебра".to_string(),
                category: "Математика".to_string(),
                created_at: ts(),
                module_count: 3,
                material_count: 7,
                file_count: 2,
            }],
            recent_courses: vec![Course {
                id: 10,
                teacher_id: TEACHER_ID,
                title: "Алгебра".to_string(),
                category: "Математика".to_string(),
                created_at: ts(),
                teacher_name: Some("Иван Петров".to_string()),
            }],
            stats: DashboardStats {
                total_users: 5,
                teachers: 2,
                students: 1,
                courses: 2,
                exams: 3,
            },
            fail_course_listing: false,
            fail_everything: false,
            exam_vanishes: false,
            calls: Mutex::new(vec![]),
        }
    }
}

impl MockRepo {
    fn record(&self, name: &'static str) -> RepoResult<()> {
        self.calls.lock().unwrap().push(name);
        if self.fail_everything {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| *c == name)
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        self.record("get_user")?;
        Ok(self.users.get(&id).cloned())
    }

    async fn get_dashboard_stats(&self) -> RepoResult<DashboardStats> {
        self.record("get_dashboard_stats")?;
        Ok(self.stats.clone())
    }

    async fn get_recent_courses(&self, limit: i64) -> RepoResult<Vec<Course>> {
        self.record("get_recent_courses")?;
        if self.fail_course_listing {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        }
        Ok(self
            .recent_courses
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_recent_users(&self, limit: i64) -> RepoResult<Vec<User>> {
        self.record("get_recent_users")?;
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users.into_iter().take(limit as usize).collect())
    }

    async fn get_teacher_courses(&self, teacher_id: i64) -> RepoResult<Vec<CourseOverview>> {
        self.record("get_teacher_courses")?;
        if self.fail_course_listing {
            return Err(RepositoryError::Database(sqlx::Error::RowNotFound));
        }
        Ok(self
            .teacher_courses
            .iter()
            .filter(|c| self.course_owners.get(&c.id) == Some(&teacher_id))
            .cloned()
            .collect())
    }

    async fn get_students(&self, search: Option<String>) -> RepoResult<Vec<Student>> {
        self.record("get_students")?;
        let needle = search.unwrap_or_default().to_lowercase();
        Ok(self
            .students
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn count_owned_exams(&self, exam_id: i64, teacher_id: i64) -> RepoResult<i64> {
        self.record("count_owned_exams")?;
        if self.exam_vanishes {
            return Ok(1);
        }
        let owned = self
            .exams
            .get(&exam_id)
            .and_then(|e| self.course_owners.get(&e.course_id))
            .is_some_and(|owner| *owner == teacher_id);
        Ok(owned as i64)
    }

    async fn get_exam(&self, exam_id: i64) -> RepoResult<Option<ExamRow>> {
        self.record("get_exam")?;
        if self.exam_vanishes {
            return Ok(None);
        }
        Ok(self.exams.get(&exam_id).cloned())
    }
}

// --- TEST UTILITIES ---

pub fn test_state(repo: Arc<MockRepo>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

pub fn session(id: i64, role: Role, name: &str) -> Session {
    Session(Some(SessionUser {
        id,
        role,
        name: name.to_string(),
    }))
}

pub fn teacher_session() -> Session {
    session(TEACHER_ID, Role::Teacher, "Иван Петров")
}

pub fn admin_session() -> Session {
    session(ADMIN_ID, Role::Admin, "Админ")
}

pub fn student_session() -> Session {
    session(STUDENT_ID, Role::Student, "Пётр <Студент>")
}

pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

//! Server-rendered HTML for the admin and teacher pages.
//!
//! Pages are built from small `format!` fragments. Every value coming from the
//! database goes through `escape_html` before it is placed in markup.

use std::fmt::Write;

use crate::auth::SessionUser;
use crate::models::{Course, CourseOverview, DashboardStats, Student, User};

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

fn header(user: &SessionUser) -> String {
    format!(
        r#"<header><span class="user">{name}</span> <span class="role">({role})</span> <a href="/logout.php">Выход</a></header>"#,
        name = escape_html(&user.name),
        role = user.role,
    )
}

pub fn render_error_page(message: &str) -> String {
    page("Ошибка", &format!("<p class=\"error\">{}</p>", escape_html(message)))
}

/// render_admin_dashboard
///
/// Counters, the latest courses with their teacher, and the latest registered users.
pub fn render_admin_dashboard(
    admin: &SessionUser,
    stats: &DashboardStats,
    courses: &[Course],
    users: &[User],
) -> String {
    let mut body = header(admin);

    let _ = write!(
        body,
        r#"
<h1>Панель администратора</h1>
<ul class="stats">
<li>Пользователей: {}</li>
<li>Преподавателей: {}</li>
<li>Студентов: {}</li>
<li>Курсов: {}</li>
<li>Экзаменов: {}</li>
</ul>
<h2>Последние курсы</h2>
"#,
        stats.total_users, stats.teachers, stats.students, stats.courses, stats.exams
    );

    if courses.is_empty() {
        body.push_str("<p class=\"empty\">Курсов пока нет</p>\n");
    } else {
        body.push_str("<table class=\"courses\">\n<tr><th>ID</th><th>Название</th><th>Категория</th><th>Преподаватель</th><th>Создан</th></tr>\n");
        for course in courses {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                course.id,
                escape_html(&course.title),
                escape_html(&course.category),
                escape_html(course.teacher_name.as_deref().unwrap_or("—")),
                course.created_at.format("%d.%m.%Y"),
            );
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Новые пользователи</h2>\n");
    if users.is_empty() {
        body.push_str("<p class=\"empty\">Пользователей нет</p>\n");
    } else {
        body.push_str("<table class=\"users\">\n<tr><th>ID</th><th>Имя</th><th>Email</th><th>Роль</th></tr>\n");
        for user in users {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                user.id,
                escape_html(&user.name),
                escape_html(&user.email),
                escape_html(&user.role),
            );
        }
        body.push_str("</table>\n");
    }

    page("Панель администратора", &body)
}

/// render_student_list
///
/// The teacher's own courses followed by the (optionally filtered) student list.
pub fn render_student_list(
    teacher: &SessionUser,
    courses: &[CourseOverview],
    students: &[Student],
    search: Option<&str>,
) -> String {
    let mut body = header(teacher);
    body.push_str("\n<h1>Студенты</h1>\n<h2>Мои курсы</h2>\n");

    if courses.is_empty() {
        body.push_str("<p class=\"empty\">У вас пока нет курсов</p>\n");
    } else {
        body.push_str("<ul class=\"courses\">\n");
        for course in courses {
            let _ = writeln!(
                body,
                "<li data-course-id=\"{}\">{} <small>{}</small> (модулей: {}, материалов: {}, файлов: {})</li>",
                course.id,
                escape_html(&course.title),
                escape_html(&course.category),
                course.module_count,
                course.material_count,
                course.file_count,
            );
        }
        body.push_str("</ul>\n");
    }

    let _ = writeln!(
        body,
        r#"<form method="get" action="/teacher/students.php"><input type="search" name="search" value="{}"><button type="submit">Найти</button></form>"#,
        escape_html(search.unwrap_or_default()),
    );

    if students.is_empty() {
        body.push_str("<p class=\"empty\">Студенты не найдены</p>\n");
    } else {
        body.push_str("<table class=\"students\">\n<tr><th>ID</th><th>Имя</th><th>Email</th><th>Зарегистрирован</th></tr>\n");
        for student in students {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                student.id,
                escape_html(&student.name),
                escape_html(&student.email),
                student.created_at.format("%d.%m.%Y"),
            );
        }
        body.push_str("</table>\n");
    }

    page("Список студентов", &body)
}

//! Demonstration data: five client projects, two of them broken down into
//! dependent sub-tasks.

use chrono::NaiveDate;

use crate::io::file::Snapshot;
use crate::model::{
    parse_dependency_list, GanttTask, Project, ProjectStatus, Role, User,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn user(id: &str, name: &str, role: Role, email: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        role,
        email: email.into(),
        avatar_url: format!("https://i.pravatar.cc/150?img={id}"),
    }
}

#[allow(clippy::too_many_arguments)]
fn project(
    id: &str,
    name: &str,
    client: &str,
    start: NaiveDate,
    end: NaiveDate,
    status: ProjectStatus,
    developers: &[&str],
    description: &str,
) -> Project {
    Project {
        id: id.into(),
        code: format!("PRJ-2023-00{id}"),
        name: name.into(),
        client: client.into(),
        start_date: start,
        end_date: end,
        status,
        designer_ids: vec!["3".into()],
        developer_ids: developers.iter().map(|d| d.to_string()).collect(),
        created_by: "2".into(),
        description: Some(description.into()),
    }
}

fn sub_task(
    id: &str,
    name: &str,
    start: NaiveDate,
    end: NaiveDate,
    progress: u8,
    deps: &str,
    assignee: &str,
) -> GanttTask {
    let project = id.split('.').next().unwrap_or(id);
    let mut task = GanttTask::new(id, name, start, end, project);
    task.progress = progress;
    task.dependencies = parse_dependency_list(deps);
    task.assignee = Some(assignee.into());
    task
}

/// Build the sample snapshot. The signed-in user is the admin.
pub fn sample_data() -> Snapshot {
    let users = vec![
        user("1", "Admin Kim", Role::Admin, "admin@example.com"),
        user("2", "Manager Lee", Role::User, "manager@example.com"),
        user("3", "Designer Park", Role::User, "designer@example.com"),
        user("4", "Developer Choi", Role::User, "developer@example.com"),
        user("5", "Tester Jung", Role::User, "tester@example.com"),
    ];

    let projects = vec![
        project(
            "1",
            "Website Renewal",
            "Acom Technology",
            date(2023, 6, 1),
            date(2023, 8, 15),
            ProjectStatus::Completed,
            &["4"],
            "Company website redesign with new CMS integration",
        ),
        project(
            "2",
            "Mobile App Development",
            "BizStep",
            date(2023, 7, 15),
            date(2023, 10, 30),
            ProjectStatus::Development,
            &["4"],
            "iOS and Android app for client customer management",
        ),
        project(
            "3",
            "Data Dashboard Development",
            "DigitalHub",
            date(2023, 8, 1),
            date(2023, 9, 15),
            ProjectStatus::Testing,
            &["4", "5"],
            "Analytics dashboard for tracking marketing performance",
        ),
        project(
            "4",
            "ERP System Upgrade",
            "Logix Enterprise",
            date(2023, 9, 1),
            date(2023, 12, 15),
            ProjectStatus::Design,
            &["4"],
            "Upgrade existing ERP to latest version with custom modules",
        ),
        project(
            "5",
            "CRM Integration",
            "ServiceFirst",
            date(2023, 10, 1),
            date(2024, 1, 31),
            ProjectStatus::Planning,
            &["4", "5"],
            "New CRM system with existing tools integration",
        ),
    ];

    let mut website = GanttTask::for_project(&projects[0]);
    website.progress = 100;
    website.assignee = Some("Admin Kim".into());
    let mut mobile = GanttTask::for_project(&projects[1]);
    mobile.progress = 65;
    mobile.assignee = Some("Admin Kim".into());

    let tasks = vec![
        website,
        sub_task("1.1", "Requirements Analysis", date(2023, 6, 1), date(2023, 6, 10), 100, "", "Manager Lee"),
        sub_task("1.2", "UI/UX Design", date(2023, 6, 11), date(2023, 7, 10), 100, "1.1", "Designer Park"),
        sub_task("1.3", "Frontend Development", date(2023, 7, 11), date(2023, 8, 5), 100, "1.2", "Developer Choi"),
        sub_task("1.4", "Test & Release", date(2023, 8, 6), date(2023, 8, 15), 100, "1.3", "Tester Jung"),
        mobile,
        sub_task("2.1", "Planning", date(2023, 7, 15), date(2023, 7, 25), 100, "", "Manager Lee"),
        sub_task("2.2", "UI/UX Design", date(2023, 7, 26), date(2023, 8, 20), 100, "2.1", "Designer Park"),
        sub_task("2.3", "iOS Development", date(2023, 8, 21), date(2023, 10, 10), 70, "2.2", "Developer Choi"),
        sub_task("2.4", "Android Development", date(2023, 8, 21), date(2023, 10, 10), 60, "2.2", "Developer Choi"),
        sub_task("2.5", "Test & Release", date(2023, 10, 11), date(2023, 10, 30), 0, "2.3,2.4", "Tester Jung"),
    ];

    Snapshot {
        projects,
        tasks,
        users,
        current_user: Some("1".into()),
    }
}

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const PROJECT_COLUMNS: &str = "id, name, description, project_goal, project_value, website, \
     status, priority, project_type, start_date, end_date, owner_id, created_at, updated_at";

const TASK_COLUMNS: &str = "id, project_id, parent_id, assignee_id, title, description, \
     status, priority, category, due_date, time_estimate, created_at, updated_at";

const EVENT_COLUMNS: &str =
    "id, project_id, title, description, date, event_type, created_at, updated_at";

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "cairn")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("cairn.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: CreateUserInput) -> Result<User> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, name, email, created_at) VALUES (?, ?, ?, ?)",
            (id.to_string(), &input.name, &input.email, now.to_rfc3339()),
        )?;

        Ok(User {
            id,
            name: input.name,
            email: input.email,
            created_at: now,
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, name, email, created_at FROM users WHERE id = ?")?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(User {
                id: parse_uuid(row.get::<_, String>(0)?),
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: parse_datetime(row.get::<_, String>(3)?),
            })),
            None => Ok(None),
        }
    }

    pub fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, name, email, created_at FROM users ORDER BY email")?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    email: row.get(2)?,
                    created_at: parse_datetime(row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    // ============================================================
    // Project operations
    // ============================================================

    /// Create a project and its initial timeline events in one transaction.
    ///
    /// The event batch is all-or-nothing: if any insert fails, the project
    /// row rolls back with it.
    pub fn create_project(&self, input: CreateProjectInput) -> Result<ProjectWithTimeline> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.status.unwrap_or(ProjectStatus::Planning);
        let priority = input.priority.unwrap_or(Priority::Medium);
        let project_type = input.project_type.unwrap_or(ProjectType::Development);

        tx.execute(
            &format!("INSERT INTO projects ({PROJECT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            rusqlite::params![
                id.to_string(),
                &input.name,
                &input.description,
                &input.project_goal,
                input.project_value,
                &input.website,
                status.as_str(),
                priority.as_str(),
                project_type.as_str(),
                input.start_date.map(|d| d.to_rfc3339()),
                input.end_date.map(|d| d.to_rfc3339()),
                input.owner_id.map(|u| u.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        let mut timeline_events = Vec::new();
        for event in &input.timeline_events {
            let event_id = Uuid::new_v4();
            tx.execute(
                &format!("INSERT INTO timeline_events ({EVENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"),
                rusqlite::params![
                    event_id.to_string(),
                    id.to_string(),
                    &event.title,
                    &event.description,
                    event.date.to_rfc3339(),
                    &event.event_type,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;

            timeline_events.push(TimelineEvent {
                id: event_id,
                project_id: id,
                title: event.title.clone(),
                description: event.description.clone(),
                date: event.date,
                event_type: event.event_type.clone(),
                created_at: now,
                updated_at: now,
            });
        }

        tx.commit()?;

        let owner = match input.owner_id {
            Some(owner_id) => user_summary(&conn, owner_id)?,
            None => None,
        };

        timeline_events.sort_by_key(|e| e.date);

        Ok(ProjectWithTimeline {
            project: Project {
                id,
                name: input.name,
                description: input.description,
                project_goal: input.project_goal,
                project_value: input.project_value,
                website: input.website,
                status,
                priority,
                project_type,
                start_date: input.start_date,
                end_date: input.end_date,
                owner_id: input.owner_id,
                created_at: now,
                updated_at: now,
            },
            owner,
            timeline_events,
        })
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?"))?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(project_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_project_with_timeline(&self, id: Uuid) -> Result<Option<ProjectWithTimeline>> {
        let project = match self.get_project(id)? {
            Some(p) => p,
            None => return Ok(None),
        };

        let timeline_events = self.get_events_by_project(id)?;
        let owner = match project.owner_id {
            Some(owner_id) => {
                let conn = self.conn.lock().expect("database lock poisoned");
                user_summary(&conn, owner_id)?
            }
            None => None,
        };

        Ok(Some(ProjectWithTimeline {
            project,
            owner,
            timeline_events,
        }))
    }

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))?;

        let projects = stmt
            .query_map([], |row| project_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// All projects, newest first, each with its owner and its events in
    /// ascending date order.
    pub fn get_all_projects_with_timeline(&self) -> Result<Vec<ProjectWithTimeline>> {
        let projects = self.get_all_projects()?;

        let mut result = Vec::with_capacity(projects.len());
        for project in projects {
            let timeline_events = self.get_events_by_project(project.id)?;
            let owner = match project.owner_id {
                Some(owner_id) => {
                    let conn = self.conn.lock().expect("database lock poisoned");
                    user_summary(&conn, owner_id)?
                }
                None => None,
            };
            result.push(ProjectWithTimeline {
                project,
                owner,
                timeline_events,
            });
        }

        Ok(result)
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<Option<Project>> {
        let Some(existing) = self.get_project(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let project_goal = input.project_goal.or(existing.project_goal);
        let project_value = input.project_value.or(existing.project_value);
        let website = input.website.or(existing.website);
        let status = input.status.unwrap_or(existing.status);
        let priority = input.priority.unwrap_or(existing.priority);
        let project_type = input.project_type.unwrap_or(existing.project_type);
        let start_date = input.start_date.or(existing.start_date);
        let end_date = input.end_date.or(existing.end_date);

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, project_goal = ?, project_value = ?, \
             website = ?, status = ?, priority = ?, project_type = ?, start_date = ?, end_date = ?, \
             updated_at = ? WHERE id = ?",
            rusqlite::params![
                &name,
                &description,
                &project_goal,
                project_value,
                &website,
                status.as_str(),
                priority.as_str(),
                project_type.as_str(),
                start_date.map(|d| d.to_rfc3339()),
                end_date.map(|d| d.to_rfc3339()),
                now.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            project_goal,
            project_value,
            website,
            status,
            priority,
            project_type,
            start_date,
            end_date,
            owner_id: existing.owner_id,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn create_task(&self, project_id: Uuid, input: CreateTaskInput) -> Result<Task> {
        // Verify project exists
        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.status.unwrap_or(TaskStatus::Todo);
        let priority = input.priority.unwrap_or(Priority::Medium);

        conn.execute(
            &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            rusqlite::params![
                id.to_string(),
                project_id.to_string(),
                input.parent_id.map(|u| u.to_string()),
                input.assignee_id.map(|u| u.to_string()),
                &input.title,
                &input.description,
                status.as_str(),
                priority.as_str(),
                &input.category,
                input.due_date.map(|d| d.to_rfc3339()),
                input.time_estimate,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Task {
            id,
            project_id,
            parent_id: input.parent_id,
            assignee_id: input.assignee_id,
            title: input.title,
            description: input.description,
            status,
            priority,
            category: input.category,
            due_date: input.due_date,
            time_estimate: input.time_estimate,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(task_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ? ORDER BY created_at DESC"
        ))?;

        let tasks = stmt
            .query_map([project_id.to_string()], |row| task_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<Option<Task>> {
        let Some(existing) = self.get_task(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);
        let priority = input.priority.unwrap_or(existing.priority);
        let assignee_id = input.assignee_id.or(existing.assignee_id);
        let category = input.category.or(existing.category);
        let due_date = input.due_date.or(existing.due_date);
        let time_estimate = input.time_estimate.or(existing.time_estimate);

        conn.execute(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, \
             assignee_id = ?, category = ?, due_date = ?, time_estimate = ?, updated_at = ? \
             WHERE id = ?",
            rusqlite::params![
                &title,
                &description,
                status.as_str(),
                priority.as_str(),
                assignee_id.map(|u| u.to_string()),
                &category,
                due_date.map(|d| d.to_rfc3339()),
                time_estimate,
                now.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(Task {
            id,
            project_id: existing.project_id,
            parent_id: existing.parent_id,
            assignee_id,
            title,
            description,
            status,
            priority,
            category,
            due_date,
            time_estimate,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Timeline event operations
    // ============================================================

    pub fn create_event(
        &self,
        project_id: Uuid,
        input: CreateTimelineEventInput,
    ) -> Result<TimelineEvent> {
        // Verify project exists
        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            &format!("INSERT INTO timeline_events ({EVENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"),
            rusqlite::params![
                id.to_string(),
                project_id.to_string(),
                &input.title,
                &input.description,
                input.date.to_rfc3339(),
                &input.event_type,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(TimelineEvent {
            id,
            project_id,
            title: input.title,
            description: input.description,
            date: input.date,
            event_type: input.event_type,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_event(&self, id: Uuid) -> Result<Option<TimelineEvent>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM timeline_events WHERE id = ?"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(event_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_events_by_project(&self, project_id: Uuid) -> Result<Vec<TimelineEvent>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM timeline_events WHERE project_id = ? ORDER BY date"
        ))?;

        let events = stmt
            .query_map([project_id.to_string()], |row| event_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    pub fn update_event(
        &self,
        id: Uuid,
        input: UpdateTimelineEventInput,
    ) -> Result<Option<TimelineEvent>> {
        let Some(existing) = self.get_event(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let description = input.description.or(existing.description);
        let date = input.date.unwrap_or(existing.date);
        let event_type = input.event_type.unwrap_or(existing.event_type);

        conn.execute(
            "UPDATE timeline_events SET title = ?, description = ?, date = ?, event_type = ?, \
             updated_at = ? WHERE id = ?",
            rusqlite::params![
                &title,
                &description,
                date.to_rfc3339(),
                &event_type,
                now.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(TimelineEvent {
            id,
            project_id: existing.project_id,
            title,
            description,
            date,
            event_type,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_event(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "DELETE FROM timeline_events WHERE id = ?",
            [id.to_string()],
        )?;
        Ok(rows > 0)
    }

    /// All timeline events joined with their parent project and its owner,
    /// as consumed by the dashboard aggregation queries.
    pub fn get_events_with_projects(&self) -> Result<Vec<EventWithProject>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT e.id, e.project_id, e.title, e.description, e.date, e.event_type, \
                    e.created_at, e.updated_at, \
                    p.name, p.status, p.priority, p.project_type, \
                    u.id, u.name, u.email \
             FROM timeline_events e \
             JOIN projects p ON p.id = e.project_id \
             LEFT JOIN users u ON u.id = p.owner_id \
             ORDER BY e.date",
        )?;

        let entries = stmt
            .query_map([], |row| {
                let event = event_from_row(row)?;
                let project_id = event.project_id;
                let owner = match row.get::<_, Option<String>>(12)? {
                    Some(owner_id) => Some(UserSummary {
                        id: parse_uuid(owner_id),
                        name: row.get(13)?,
                        email: row.get(14)?,
                    }),
                    None => None,
                };

                Ok(EventWithProject {
                    event,
                    project: ProjectSummary {
                        id: project_id,
                        name: row.get(8)?,
                        status: ProjectStatus::from_str(&row.get::<_, String>(9)?)
                            .unwrap_or(ProjectStatus::Planning),
                        priority: Priority::from_str(&row.get::<_, String>(10)?)
                            .unwrap_or(Priority::Medium),
                        project_type: ProjectType::from_str(&row.get::<_, String>(11)?)
                            .unwrap_or(ProjectType::Development),
                        owner,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn user_summary(conn: &Connection, id: Uuid) -> Result<Option<UserSummary>> {
    let mut stmt = conn.prepare("SELECT id, name, email FROM users WHERE id = ?")?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(UserSummary {
            id: parse_uuid(row.get::<_, String>(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
        })),
        None => Ok(None),
    }
}

fn project_from_row(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        project_goal: row.get(3)?,
        project_value: row.get(4)?,
        website: row.get(5)?,
        status: ProjectStatus::from_str(&row.get::<_, String>(6)?)
            .unwrap_or(ProjectStatus::Planning),
        priority: Priority::from_str(&row.get::<_, String>(7)?).unwrap_or(Priority::Medium),
        project_type: ProjectType::from_str(&row.get::<_, String>(8)?)
            .unwrap_or(ProjectType::Development),
        start_date: row.get::<_, Option<String>>(9)?.map(parse_datetime),
        end_date: row.get::<_, Option<String>>(10)?.map(parse_datetime),
        owner_id: row.get::<_, Option<String>>(11)?.map(parse_uuid),
        created_at: parse_datetime(row.get::<_, String>(12)?),
        updated_at: parse_datetime(row.get::<_, String>(13)?),
    })
}

fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get::<_, String>(0)?),
        project_id: parse_uuid(row.get::<_, String>(1)?),
        parent_id: row.get::<_, Option<String>>(2)?.map(parse_uuid),
        assignee_id: row.get::<_, Option<String>>(3)?.map(parse_uuid),
        title: row.get(4)?,
        description: row.get(5)?,
        status: TaskStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(TaskStatus::Todo),
        priority: Priority::from_str(&row.get::<_, String>(7)?).unwrap_or(Priority::Medium),
        category: row.get(8)?,
        due_date: row.get::<_, Option<String>>(9)?.map(parse_datetime),
        time_estimate: row.get(10)?,
        created_at: parse_datetime(row.get::<_, String>(11)?),
        updated_at: parse_datetime(row.get::<_, String>(12)?),
    })
}

fn event_from_row(row: &rusqlite::Row) -> rusqlite::Result<TimelineEvent> {
    Ok(TimelineEvent {
        id: parse_uuid(row.get::<_, String>(0)?),
        project_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        date: parse_datetime(row.get::<_, String>(4)?),
        event_type: row.get(5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

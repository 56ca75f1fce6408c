use cairn::db::Database;
use cairn::models::*;
use chrono::{Duration, TimeZone, Utc};
use speculate2::speculate;
use uuid::Uuid;

fn create_test_project(db: &Database) -> ProjectWithTimeline {
    db.create_project(CreateProjectInput {
        name: "Test Project".to_string(),
        description: None,
        project_goal: None,
        project_value: None,
        website: None,
        status: None,
        priority: None,
        project_type: None,
        start_date: None,
        end_date: None,
        owner_id: None,
        timeline_events: Vec::new(),
    })
    .expect("Failed to create project")
}

fn event_input(title: &str, days_from_epoch: i64) -> CreateTimelineEventInput {
    CreateTimelineEventInput {
        title: title.to_string(),
        description: None,
        date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(days_from_epoch),
        event_type: "milestone".to_string(),
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "users" {
        it "creates and fetches a user" {
            let user = db.create_user(CreateUserInput {
                name: Some("Ada".to_string()),
                email: "ada@example.com".to_string(),
            }).expect("Failed to create user");

            let found = db.get_user(user.id).expect("Query failed").expect("User missing");
            assert_eq!(found.email, "ada@example.com");
            assert_eq!(found.name, Some("Ada".to_string()));
        }

        it "rejects duplicate emails" {
            db.create_user(CreateUserInput {
                name: None,
                email: "dup@example.com".to_string(),
            }).expect("Failed to create user");

            let result = db.create_user(CreateUserInput {
                name: None,
                email: "dup@example.com".to_string(),
            });
            assert!(result.is_err());
        }

        it "lists users ordered by email" {
            db.create_user(CreateUserInput { name: None, email: "zoe@example.com".to_string() }).unwrap();
            db.create_user(CreateUserInput { name: None, email: "abe@example.com".to_string() }).unwrap();

            let users = db.get_all_users().expect("Query failed");
            let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
            assert_eq!(emails, vec!["abe@example.com", "zoe@example.com"]);
        }
    }

    describe "projects" {
        describe "create_project" {
            it "applies default status, priority and type" {
                let created = create_test_project(&db);

                assert_eq!(created.project.status, ProjectStatus::Planning);
                assert_eq!(created.project.priority, Priority::Medium);
                assert_eq!(created.project.project_type, ProjectType::Development);
                assert!(created.timeline_events.is_empty());
                assert!(created.owner.is_none());
            }

            it "persists the timeline event batch with the project" {
                let created = db.create_project(CreateProjectInput {
                    name: "With Events".to_string(),
                    description: None,
                    project_goal: None,
                    project_value: None,
                    website: None,
                    status: Some(ProjectStatus::InProgress),
                    priority: Some(Priority::High),
                    project_type: Some(ProjectType::Research),
                    start_date: None,
                    end_date: None,
                    owner_id: None,
                    timeline_events: vec![event_input("Kickoff", 0), event_input("Launch", 14)],
                }).expect("Failed to create project");

                assert_eq!(created.timeline_events.len(), 2);

                let stored = db.get_events_by_project(created.project.id).expect("Query failed");
                assert_eq!(stored.len(), 2);
                assert_eq!(stored[0].title, "Kickoff");
                assert_eq!(stored[1].title, "Launch");
                assert_eq!(stored[0].event_type, "milestone");
            }

            it "joins the owner summary when an owner is set" {
                let owner = db.create_user(CreateUserInput {
                    name: Some("Owner".to_string()),
                    email: "owner@example.com".to_string(),
                }).unwrap();

                let created = db.create_project(CreateProjectInput {
                    name: "Owned".to_string(),
                    description: None,
                    project_goal: None,
                    project_value: None,
                    website: None,
                    status: None,
                    priority: None,
                    project_type: None,
                    start_date: None,
                    end_date: None,
                    owner_id: Some(owner.id),
                    timeline_events: Vec::new(),
                }).expect("Failed to create project");

                let summary = created.owner.expect("Owner summary missing");
                assert_eq!(summary.id, owner.id);
                assert_eq!(summary.email, "owner@example.com");
            }

            it "rolls back the whole batch when any write fails" {
                // A nonexistent owner violates the foreign key, failing the
                // project insert after the transaction has started.
                let result = db.create_project(CreateProjectInput {
                    name: "Doomed".to_string(),
                    description: None,
                    project_goal: None,
                    project_value: None,
                    website: None,
                    status: None,
                    priority: None,
                    project_type: None,
                    start_date: None,
                    end_date: None,
                    owner_id: Some(Uuid::new_v4()),
                    timeline_events: vec![event_input("Orphan", 0)],
                });

                assert!(result.is_err());
                assert!(db.get_all_projects().expect("Query failed").is_empty());
                assert!(db.get_events_with_projects().expect("Query failed").is_empty());
            }
        }

        describe "get_project" {
            it "returns None for a non-existent project" {
                let result = db.get_project(Uuid::new_v4()).expect("Query failed");
                assert!(result.is_none());
            }

            it "returns the project by id" {
                let created = create_test_project(&db);
                let found = db.get_project(created.project.id).expect("Query failed");
                assert_eq!(found.expect("Project missing").name, "Test Project");
            }
        }

        describe "get_all_projects" {
            it "returns empty list when no projects exist" {
                assert!(db.get_all_projects().expect("Query failed").is_empty());
            }
        }

        describe "update_project" {
            it "applies a partial update and leaves other fields" {
                let created = create_test_project(&db);

                let updated = db.update_project(created.project.id, UpdateProjectInput {
                    status: Some(ProjectStatus::Completed),
                    ..Default::default()
                }).expect("Update failed").expect("Project missing");

                assert_eq!(updated.status, ProjectStatus::Completed);
                assert_eq!(updated.name, "Test Project");
                assert_eq!(updated.priority, Priority::Medium);
            }

            it "returns None for a non-existent project" {
                let result = db.update_project(Uuid::new_v4(), UpdateProjectInput::default())
                    .expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_project" {
            it "cascades to tasks and timeline events" {
                let created = db.create_project(CreateProjectInput {
                    name: "Cascade".to_string(),
                    description: None,
                    project_goal: None,
                    project_value: None,
                    website: None,
                    status: None,
                    priority: None,
                    project_type: None,
                    start_date: None,
                    end_date: None,
                    owner_id: None,
                    timeline_events: vec![event_input("Kickoff", 0)],
                }).expect("Failed to create project");

                db.create_task(created.project.id, CreateTaskInput {
                    title: "Task".to_string(),
                    description: None,
                    status: None,
                    priority: None,
                    assignee_id: None,
                    parent_id: None,
                    category: None,
                    due_date: None,
                    time_estimate: None,
                }).expect("Failed to create task");

                assert!(db.delete_project(created.project.id).expect("Delete failed"));
                assert!(db.get_events_with_projects().expect("Query failed").is_empty());
                assert!(db.get_tasks_by_project(created.project.id).expect("Query failed").is_empty());
            }

            it "returns false for a non-existent project" {
                assert!(!db.delete_project(Uuid::new_v4()).expect("Delete failed"));
            }
        }
    }

    describe "tasks" {
        it "creates a task with defaults" {
            let project = create_test_project(&db);

            let task = db.create_task(project.project.id, CreateTaskInput {
                title: "Write docs".to_string(),
                description: None,
                status: None,
                priority: None,
                assignee_id: None,
                parent_id: None,
                category: None,
                due_date: None,
                time_estimate: None,
            }).expect("Failed to create task");

            assert_eq!(task.status, TaskStatus::Todo);
            assert_eq!(task.priority, Priority::Medium);
        }

        it "refuses tasks on a non-existent project" {
            let result = db.create_task(Uuid::new_v4(), CreateTaskInput {
                title: "Nowhere".to_string(),
                description: None,
                status: None,
                priority: None,
                assignee_id: None,
                parent_id: None,
                category: None,
                due_date: None,
                time_estimate: None,
            });
            assert!(result.is_err());
        }

        it "applies a partial update" {
            let project = create_test_project(&db);
            let task = db.create_task(project.project.id, CreateTaskInput {
                title: "Initial".to_string(),
                description: Some("desc".to_string()),
                status: None,
                priority: None,
                assignee_id: None,
                parent_id: None,
                category: None,
                due_date: None,
                time_estimate: Some(4.0),
            }).expect("Failed to create task");

            let updated = db.update_task(task.id, UpdateTaskInput {
                status: Some(TaskStatus::InProgress),
                ..Default::default()
            }).expect("Update failed").expect("Task missing");

            assert_eq!(updated.status, TaskStatus::InProgress);
            assert_eq!(updated.title, "Initial");
            assert_eq!(updated.description, Some("desc".to_string()));
            assert_eq!(updated.time_estimate, Some(4.0));
        }

        it "deletes a task" {
            let project = create_test_project(&db);
            let task = db.create_task(project.project.id, CreateTaskInput {
                title: "Short lived".to_string(),
                description: None,
                status: None,
                priority: None,
                assignee_id: None,
                parent_id: None,
                category: None,
                due_date: None,
                time_estimate: None,
            }).expect("Failed to create task");

            assert!(db.delete_task(task.id).expect("Delete failed"));
            assert!(db.get_task(task.id).expect("Query failed").is_none());
        }
    }

    describe "timeline_events" {
        it "lists project events ascending by date" {
            let project = create_test_project(&db);
            db.create_event(project.project.id, event_input("Later", 10)).unwrap();
            db.create_event(project.project.id, event_input("Sooner", 2)).unwrap();

            let events = db.get_events_by_project(project.project.id).expect("Query failed");
            let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
            assert_eq!(titles, vec!["Sooner", "Later"]);
        }

        it "round-trips the event date through storage" {
            let project = create_test_project(&db);
            let input = event_input("Precise", 5);
            let created = db.create_event(project.project.id, input.clone()).unwrap();

            let fetched = db.get_event(created.id).expect("Query failed").expect("Event missing");
            assert_eq!(fetched.date, input.date);
        }

        it "applies a partial update" {
            let project = create_test_project(&db);
            let created = db.create_event(project.project.id, event_input("Original", 0)).unwrap();

            let updated = db.update_event(created.id, UpdateTimelineEventInput {
                title: Some("Renamed".to_string()),
                ..Default::default()
            }).expect("Update failed").expect("Event missing");

            assert_eq!(updated.title, "Renamed");
            assert_eq!(updated.date, created.date);
            assert_eq!(updated.event_type, "milestone");
        }

        it "deletes an event" {
            let project = create_test_project(&db);
            let created = db.create_event(project.project.id, event_input("Gone", 0)).unwrap();

            assert!(db.delete_event(created.id).expect("Delete failed"));
            assert!(db.get_event(created.id).expect("Query failed").is_none());
        }

        it "joins project and owner fields for aggregation" {
            let owner = db.create_user(CreateUserInput {
                name: Some("Owner".to_string()),
                email: "owner@example.com".to_string(),
            }).unwrap();

            let project = db.create_project(CreateProjectInput {
                name: "Joined".to_string(),
                description: None,
                project_goal: None,
                project_value: None,
                website: None,
                status: Some(ProjectStatus::InProgress),
                priority: Some(Priority::Urgent),
                project_type: Some(ProjectType::Design),
                start_date: None,
                end_date: None,
                owner_id: Some(owner.id),
                timeline_events: vec![event_input("Kickoff", 0)],
            }).expect("Failed to create project");

            let entries = db.get_events_with_projects().expect("Query failed");
            assert_eq!(entries.len(), 1);

            let entry = &entries[0];
            assert_eq!(entry.event.title, "Kickoff");
            assert_eq!(entry.project.id, project.project.id);
            assert_eq!(entry.project.name, "Joined");
            assert_eq!(entry.project.status, ProjectStatus::InProgress);
            assert_eq!(entry.project.priority, Priority::Urgent);
            assert_eq!(entry.project.project_type, ProjectType::Design);
            assert_eq!(entry.project.owner.as_ref().map(|o| o.id), Some(owner.id));
        }
    }
}

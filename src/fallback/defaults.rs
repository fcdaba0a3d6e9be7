//! Built-in demo dataset served when the record store is unavailable or empty.

use crate::entities::{
    ChartType, CheckChart, Group, PlatformCounts, PlatformHandles, Profile, Stage, Student,
    StudentStatus, Task, Topic,
};

struct DemoStudent {
    id: i64,
    first_name: &'static str,
    last_name: &'static str,
    honors: bool,
    group_id: &'static str,
    points: i64,
    daily_goal: &'static str,
    project: &'static str,
}

const DEMO_STUDENTS: [DemoStudent; 6] = [
    DemoStudent {
        id: 1,
        first_name: "Emma",
        last_name: "Johnson",
        honors: true,
        group_id: "1",
        points: 120,
        daily_goal: "Publish one short video",
        project: "A podcast about local history",
    },
    DemoStudent {
        id: 2,
        first_name: "Liam",
        last_name: "Chen",
        honors: false,
        group_id: "1",
        points: 85,
        daily_goal: "Write the intro script",
        project: "Cooking tutorials for teens",
    },
    DemoStudent {
        id: 3,
        first_name: "Sofia",
        last_name: "Martinez",
        honors: true,
        group_id: "2",
        points: 140,
        daily_goal: "Edit yesterday's footage",
        project: "Science experiments at home",
    },
    DemoStudent {
        id: 4,
        first_name: "Noah",
        last_name: "Williams",
        honors: false,
        group_id: "2",
        points: 60,
        daily_goal: "",
        project: "Skateboarding trick breakdowns",
    },
    DemoStudent {
        id: 5,
        first_name: "Ava",
        last_name: "Brown",
        honors: false,
        group_id: "3",
        points: 95,
        daily_goal: "Reach out to two collaborators",
        project: "Book reviews in sixty seconds",
    },
    DemoStudent {
        id: 6,
        first_name: "Ethan",
        last_name: "Davis",
        honors: true,
        group_id: "3",
        points: 110,
        daily_goal: "Draft a thumbnail set",
        project: "Coding games from scratch",
    },
];

pub fn demo_students() -> Vec<Student> {
    DEMO_STUDENTS
        .iter()
        .map(|s| Student {
            id: s.id,
            first_name: s.first_name.to_string(),
            last_name: s.last_name.to_string(),
            email: crate::entities::student::default_email(s.first_name, s.last_name),
            honors: s.honors,
            group_id: Some(s.group_id.to_string()),
            status: StudentStatus::Active,
            points: s.points,
            created_at: None,
            password: String::new(),
        })
        .collect()
}

pub fn demo_profiles() -> Vec<Profile> {
    DEMO_STUDENTS
        .iter()
        .map(|s| {
            let handle = format!("{}{}", s.first_name, s.last_name).to_lowercase();
            Profile {
                daily_goal: s.daily_goal.to_string(),
                project_oneliner: s.project.to_string(),
                goals: PlatformCounts {
                    x: 100,
                    youtube: 50,
                    tiktok: 200,
                    instagram: 150,
                },
                platforms: PlatformHandles {
                    x: format!("@{}", handle),
                    youtube: handle.clone(),
                    tiktok: format!("@{}", handle),
                    instagram: handle,
                },
                ..Profile::empty(s.id)
            }
        })
        .collect()
}

pub fn demo_groups() -> Vec<Group> {
    [
        ("1", "Red House", "#FF0000", "Courage and initiative"),
        ("2", "Blue House", "#0000FF", "Curiosity and craft"),
        ("3", "Green House", "#00AA00", "Persistence and growth"),
    ]
    .into_iter()
    .map(|(id, name, color, description)| Group {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        description: description.to_string(),
        created_at: None,
    })
    .collect()
}

fn task(id: &str, name: &str, points: i64, order: i64) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        points,
        instructions: None,
        order,
        active: true,
    }
}

pub fn demo_chart(chart_type: ChartType) -> CheckChart {
    let prefix = match chart_type {
        ChartType::Honors => "h",
        ChartType::Nonhonors => "n",
    };
    let bonus = match chart_type {
        ChartType::Honors => 5,
        ChartType::Nonhonors => 0,
    };
    let id = |suffix: &str| format!("{}-{}", prefix, suffix);

    let mut research = Topic {
        id: id("t1"),
        name: "Research".to_string(),
        order: 1,
        tasks: vec![
            task(&id("k1"), "Pick a niche", 10, 1),
            task(&id("k2"), "Study three creators", 10 + bonus, 2),
        ],
    };
    if chart_type == ChartType::Honors {
        research
            .tasks
            .push(task(&id("k3"), "Write a competitor analysis", 20, 3));
    }

    CheckChart {
        chart_type,
        stages: vec![
            Stage {
                id: id("s1"),
                name: "Foundations".to_string(),
                order: 1,
                topics: vec![
                    research,
                    Topic {
                        id: id("t2"),
                        name: "Setup".to_string(),
                        order: 2,
                        tasks: vec![task(&id("k4"), "Create channel accounts", 10, 1)],
                    },
                ],
            },
            Stage {
                id: id("s2"),
                name: "Publishing".to_string(),
                order: 2,
                topics: vec![Topic {
                    id: id("t3"),
                    name: "First posts".to_string(),
                    order: 1,
                    tasks: vec![
                        task(&id("k5"), "Publish first video", 25, 1),
                        task(&id("k6"), "Reply to ten comments", 15 + bonus, 2),
                    ],
                }],
            },
        ],
    }
}

/// The logical sheets the service keeps in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Students,
    Profiles,
    GoalHistory,
    Groups,
    CheckChart,
    StudentCheckProgress,
}

impl Sheet {
    pub const ALL: [Sheet; 6] = [
        Sheet::Students,
        Sheet::Profiles,
        Sheet::GoalHistory,
        Sheet::Groups,
        Sheet::CheckChart,
        Sheet::StudentCheckProgress,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Sheet::Students => "Students",
            Sheet::Profiles => "Profiles",
            Sheet::GoalHistory => "GoalHistory",
            Sheet::Groups => "Groups",
            Sheet::CheckChart => "CheckChart",
            Sheet::StudentCheckProgress => "StudentCheckProgress",
        }
    }

    /// Cache keys for a sheet all start with this prefix.
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            Sheet::Students => "students:",
            Sheet::Profiles => "profiles:",
            Sheet::GoalHistory => "goal_history:",
            Sheet::Groups => "groups:",
            Sheet::CheckChart => "check_chart:",
            Sheet::StudentCheckProgress => "check_progress:",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Sheet::Students => &[
                "id",
                "firstName",
                "lastName",
                "email",
                "password",
                "honors",
                "groupId",
                "status",
                "points",
                "createdAt",
            ],
            Sheet::Profiles => &[
                "studentId",
                "dailyGoal",
                "sessionGoal",
                "projectOneliner",
                "brainliftCompleted",
                "lastBrainliftDate",
                "dailyGoalCompleted",
                "lastDailyGoalDate",
                "goalX",
                "goalYoutube",
                "goalTiktok",
                "goalInstagram",
                "platformX",
                "platformYoutube",
                "platformTiktok",
                "platformInstagram",
            ],
            Sheet::GoalHistory => &[
                "studentId",
                "date",
                "dailyGoal",
                "goalStatus",
                "brainliftCompleted",
                "dailyGoalCompleted",
                "audienceX",
                "audienceYoutube",
                "audienceTiktok",
                "audienceInstagram",
                "timestamp",
            ],
            Sheet::Groups => &["id", "name", "color", "description", "createdAt"],
            Sheet::CheckChart => &[
                "chartType",
                "stageId",
                "stageName",
                "stageOrder",
                "topicId",
                "topicName",
                "topicOrder",
                "taskId",
                "taskName",
                "points",
                "instructions",
                "order",
                "active",
            ],
            Sheet::StudentCheckProgress => &[
                "studentId",
                "chartType",
                "taskId",
                "completed",
                "completedDate",
                "completedBy",
                "points",
            ],
        }
    }

    pub fn header_row(&self) -> Vec<String> {
        self.headers().iter().map(|h| h.to_string()).collect()
    }
}

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorResponse;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "House Points API",
        description = "Students, houses, daily goals and check charts"
    ),
    paths(
        routes::health::route::health,
        routes::auth::route::login,
        routes::auth::route::me,
        routes::students::route::list_students,
        routes::students::route::add_student,
        routes::students::route::get_student,
        routes::students::route::update_student,
        routes::students::route::delete_student,
        routes::students::route::update_assignment,
        routes::students::route::reset_session,
        routes::students::route::sync_now,
        routes::groups::route::list_groups,
        routes::groups::route::create_group,
        routes::groups::route::update_group,
        routes::groups::route::delete_group,
        routes::groups::route::assign_students,
        routes::profile::route::get_profile,
        routes::profile::route::update_profile,
        routes::goals::route::check_goals,
        routes::goals::route::complete_goal,
        routes::goals::route::complete_goal_query,
        routes::goals::route::get_daily_goal,
        routes::goals::route::set_daily_goal,
        routes::goals::route::update_daily_goal,
        routes::goals::route::delete_daily_goal,
        routes::goals::route::goal_history,
        routes::goals::route::record_audience,
        routes::goals::route::live_audience,
        routes::leaderboard::route::get_leaderboard,
        routes::check_chart::route::get_chart,
        routes::check_chart::route::replace_chart,
        routes::check_chart::route::get_progress,
        routes::check_chart::route::set_progress,
        routes::check_chart::route::remove_progress,
        routes::check_chart::route::student_summary,
    ),
    components(schemas(ErrorResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health"),
        (name = "Authentication"),
        (name = "Students"),
        (name = "Groups"),
        (name = "Profile"),
        (name = "Goals"),
        (name = "Leaderboard"),
        (name = "Check Chart")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/goals/complete"));
        assert!(doc.paths.paths.contains_key("/api/admin/groups/assign-students"));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}

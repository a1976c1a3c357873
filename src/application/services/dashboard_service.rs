//! Role-specific dashboard data.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::entities::{Profile, Role};
use crate::domain::repositories::{
    CourseCounts, CourseFilter, CourseRepository, CourseSummary, ProfileRepository, RoleCounts,
};
use crate::error::AppError;

/// Dashboard payload, tagged by the caller's role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Admin {
        courses: CourseCounts,
        profiles: RoleCounts,
    },
    Staff {
        courses: Vec<CourseSummary>,
    },
    Student {
        courses: Vec<CourseSummary>,
    },
}

pub struct DashboardService<
    C: CourseRepository + ?Sized = dyn CourseRepository,
    P: ProfileRepository + ?Sized = dyn ProfileRepository,
> {
    courses: Arc<C>,
    profiles: Arc<P>,
}

impl<C, P> DashboardService<C, P>
where
    C: CourseRepository + ?Sized,
    P: ProfileRepository + ?Sized,
{
    pub fn new(courses: Arc<C>, profiles: Arc<P>) -> Self {
        Self { courses, profiles }
    }

    /// Builds the dashboard for `actor`.
    ///
    /// - admin: course totals and profile totals by role
    /// - staff: courses taught by the caller
    /// - student: published courses with section counts
    pub async fn for_profile(&self, actor: &Profile) -> Result<Dashboard, AppError> {
        let dashboard = match actor.role {
            Role::Admin => {
                let (courses, profiles) =
                    tokio::try_join!(self.courses.counts(), self.profiles.count_by_role())?;
                Dashboard::Admin { courses, profiles }
            }
            Role::Staff => Dashboard::Staff {
                courses: self
                    .courses
                    .list(CourseFilter::by_instructor(actor.id))
                    .await?,
            },
            Role::Student => Dashboard::Student {
                courses: self.courses.list(CourseFilter::published()).await?,
            },
        };

        Ok(dashboard)
    }
}

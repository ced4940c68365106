/// Registered user of the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
}

/// Course users can enroll into.
///
/// `enrollments_count` is only populated by listings that aggregate
/// enrollments; everywhere else it stays `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub enrollments_count: Option<i64>,
}

impl Course {
    /// Attaches an aggregated enrollment count to the course.
    pub fn with_enrollments_count(self, count: i64) -> Self {
        Self {
            enrollments_count: Some(count),
            ..self
        }
    }
}

/// Link between a user and a course. Unique per `(user_id, course_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
}

/// Closed set of values a domain operation can succeed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    User(User),
    Course(Course),
    Enrollment(Enrollment),
    List(Vec<Entity>),
}

impl From<User> for Entity {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl From<Course> for Entity {
    fn from(value: Course) -> Self {
        Self::Course(value)
    }
}

impl From<Enrollment> for Entity {
    fn from(value: Enrollment) -> Self {
        Self::Enrollment(value)
    }
}

impl<T: Into<Entity>> From<Vec<T>> for Entity {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

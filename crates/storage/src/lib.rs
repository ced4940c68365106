use std::{str::FromStr, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    SqlitePool,
};
use thiserror::Error;

use course_api_core::{Course, Enrollment, EntityStore, StoreError, StoreResult, User};

const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

/// Top-level database handle that owns the SQLite connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Establishes a new SQLite connection pool for the provided connection string.
    ///
    /// In-memory databases are pinned to a single connection that is never
    /// recycled, otherwise every pooled connection would see its own empty database.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let in_memory = is_in_memory(database_url);
        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(StorageError::Connect)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(StorageError::Connect)?;

        Ok(Self { pool })
    }

    /// Applies migrations located under `migrations/`.
    pub async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;
        Ok(())
    }

    /// Returns a handle to interact with the users table.
    pub fn users(&self) -> UserRepository {
        UserRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle to interact with the courses table.
    pub fn courses(&self) -> CourseRepository {
        CourseRepository {
            pool: self.pool.clone(),
        }
    }

    /// Returns a handle to interact with the enrollments table.
    pub fn enrollments(&self) -> EnrollmentRepository {
        EnrollmentRepository {
            pool: self.pool.clone(),
        }
    }

    /// Exposes the inner pool when lower level access is required.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// General storage level errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to connect to sqlite: {0}")]
    Connect(sqlx::Error),
    #[error("failed to run database migrations: {0}")]
    Migration(MigrateError),
}

/// Classifies constraint failures so the domain can turn them into validation messages.
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|code| code.into_owned());
            match code.as_deref() {
                Some(SQLITE_CONSTRAINT_UNIQUE) | Some(SQLITE_CONSTRAINT_PRIMARYKEY) => {
                    StoreError::UniqueViolation
                }
                Some(SQLITE_CONSTRAINT_FOREIGNKEY) => StoreError::ForeignKeyViolation,
                _ => StoreError::backend(sqlx::Error::Database(db_err)),
            }
        }
        other => StoreError::backend(other),
    }
}

/// Repository responsible for the `users` table.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(row.map(UserRow::into_domain))
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(row.map(UserRow::into_domain))
    }

    /// Inserts a user. Fails with [`StoreError::UniqueViolation`] when the email is taken.
    pub async fn insert(&self, email: &str) -> StoreResult<User> {
        let now = to_rfc3339(Utc::now());
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, created_at, updated_at) VALUES (?, ?, ?) \
             RETURNING id, email",
        )
        .bind(email)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;
        Ok(row.into_domain())
    }

    /// Deletes the user; enrollments go with it through `ON DELETE CASCADE`.
    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

/// Repository responsible for the `courses` table.
#[derive(Clone)]
pub struct CourseRepository {
    pool: SqlitePool,
}

impl CourseRepository {
    pub async fn find(&self, id: i64) -> StoreResult<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>("SELECT id, name FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;
        Ok(row.map(CourseRow::into_domain))
    }

    pub async fn insert(&self, name: &str) -> StoreResult<Course> {
        let now = to_rfc3339(Utc::now());
        let row = sqlx::query_as::<_, CourseRow>(
            "INSERT INTO courses (name, created_at, updated_at) VALUES (?, ?, ?) \
             RETURNING id, name",
        )
        .bind(name)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;
        Ok(row.into_domain())
    }

    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }

    /// Lists all courses joined with the number of enrollments referencing each.
    pub async fn list_with_counts(&self) -> StoreResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseWithCountRow>(
            r#"
SELECT c.id,
       c.name,
       COUNT(e.id) AS enrollments_count
  FROM courses AS c
  LEFT JOIN enrollments AS e
    ON e.course_id = c.id
 GROUP BY c.id, c.name
 ORDER BY c.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(CourseWithCountRow::into_domain).collect())
    }

    /// Lists the courses the user is enrolled in.
    pub async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
SELECT c.id,
       c.name
  FROM courses AS c
 INNER JOIN enrollments AS e
    ON e.course_id = c.id
 WHERE e.user_id = ?
 ORDER BY c.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows.into_iter().map(CourseRow::into_domain).collect())
    }
}

/// Repository responsible for the `enrollments` table.
#[derive(Clone)]
pub struct EnrollmentRepository {
    pool: SqlitePool,
}

impl EnrollmentRepository {
    pub async fn find(&self, course_id: i64, user_id: i64) -> StoreResult<Option<Enrollment>> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            "SELECT id, user_id, course_id FROM enrollments WHERE course_id = ? AND user_id = ?",
        )
        .bind(course_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;
        Ok(row.map(EnrollmentRow::into_domain))
    }

    /// Inserts an enrollment.
    ///
    /// Fails with [`StoreError::UniqueViolation`] for a duplicate pair and
    /// [`StoreError::ForeignKeyViolation`] when the user or course is missing.
    pub async fn insert(&self, course_id: i64, user_id: i64) -> StoreResult<Enrollment> {
        let now = to_rfc3339(Utc::now());
        let row = sqlx::query_as::<_, EnrollmentRow>(
            "INSERT INTO enrollments (user_id, course_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, user_id, course_id",
        )
        .bind(user_id)
        .bind(course_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;
        Ok(row.into_domain())
    }

    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
}

impl UserRow {
    fn into_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: i64,
    name: String,
}

impl CourseRow {
    fn into_domain(self) -> Course {
        Course {
            id: self.id,
            name: self.name,
            enrollments_count: None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseWithCountRow {
    id: i64,
    name: String,
    enrollments_count: i64,
}

impl CourseWithCountRow {
    fn into_domain(self) -> Course {
        Course {
            id: self.id,
            name: self.name,
            enrollments_count: None,
        }
        .with_enrollments_count(self.enrollments_count)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: i64,
    user_id: i64,
    course_id: i64,
}

impl EnrollmentRow {
    fn into_domain(self) -> Enrollment {
        Enrollment {
            id: self.id,
            user_id: self.user_id,
            course_id: self.course_id,
        }
    }
}

impl EntityStore for Database {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.users().find(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.users().find_by_email(email).await
    }

    async fn insert_user(&self, email: &str) -> StoreResult<User> {
        self.users().insert(email).await
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        self.users().delete(id).await
    }

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        self.courses().find(id).await
    }

    async fn insert_course(&self, name: &str) -> StoreResult<Course> {
        self.courses().insert(name).await
    }

    async fn delete_course(&self, id: i64) -> StoreResult<bool> {
        self.courses().delete(id).await
    }

    async fn list_courses_with_counts(&self) -> StoreResult<Vec<Course>> {
        self.courses().list_with_counts().await
    }

    async fn list_courses_for_user(&self, user_id: i64) -> StoreResult<Vec<Course>> {
        self.courses().list_for_user(user_id).await
    }

    async fn find_enrollment(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<Enrollment>> {
        self.enrollments().find(course_id, user_id).await
    }

    async fn insert_enrollment(&self, course_id: i64, user_id: i64) -> StoreResult<Enrollment> {
        self.enrollments().insert(course_id, user_id).await
    }

    async fn delete_enrollment(&self, id: i64) -> StoreResult<bool> {
        self.enrollments().delete(id).await
    }
}

fn to_rfc3339(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

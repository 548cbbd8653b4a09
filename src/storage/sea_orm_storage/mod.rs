//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assessments;
mod courses;
mod groups;
mod responses;
mod users;

use crate::config::AppConfig;
use crate::errors::{PeerAssessError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PeerAssessError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PeerAssessError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PeerAssessError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PeerAssessError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    assessments::{
        entities::{
            AssessmentWithContext, Criterion, ResponseSummary, ResponseWithEvaluatees, ResultRow,
            StudentAssessmentRow, TeacherAssessmentRow,
        },
        requests::{CreateAssessmentRequest, ScoreInput},
        responses::{EvaluateeAverage, GivenScore, RosterEntry},
    },
    courses::{entities::Course, requests::CreateCourseRequest, responses::CourseListItem},
    groups::{entities::Group, requests::CreateGroupRequest},
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 课程模块
    async fn create_course(
        &self,
        course: CreateCourseRequest,
        teacher_id: i64,
        code: &str,
    ) -> Result<Course> {
        self.create_course_impl(course, teacher_id, code).await
    }

    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(course_id).await
    }

    async fn list_courses_for_teacher(&self, teacher_id: i64) -> Result<Vec<CourseListItem>> {
        self.list_courses_for_teacher_impl(teacher_id).await
    }

    async fn list_courses_for_student(&self, student_id: i64) -> Result<Vec<CourseListItem>> {
        self.list_courses_for_student_impl(student_id).await
    }

    async fn list_all_courses(&self) -> Result<Vec<CourseListItem>> {
        self.list_all_courses_impl().await
    }

    async fn delete_course(&self, course_id: i64) -> Result<bool> {
        self.delete_course_impl(course_id).await
    }

    async fn enroll_course_students(&self, course_id: i64, student_ids: &[i64]) -> Result<u64> {
        self.enroll_course_students_impl(course_id, student_ids)
            .await
    }

    async fn count_course_students(&self, course_id: i64) -> Result<u64> {
        self.count_course_students_impl(course_id).await
    }

    async fn list_course_teachers(&self, course_id: i64) -> Result<Vec<User>> {
        self.list_course_teachers_impl(course_id).await
    }

    // 成员关系模块
    async fn is_group_member(&self, group_id: i64, user_id: i64) -> Result<bool> {
        self.is_group_member_impl(group_id, user_id).await
    }

    async fn is_course_teacher(&self, course_id: i64, teacher_id: i64) -> Result<bool> {
        self.is_course_teacher_impl(course_id, teacher_id).await
    }

    async fn is_course_student(&self, course_id: i64, student_id: i64) -> Result<bool> {
        self.is_course_student_impl(course_id, student_id).await
    }

    // 小组模块
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group> {
        self.create_group_impl(group).await
    }

    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>> {
        self.get_group_by_id_impl(group_id).await
    }

    async fn list_groups_by_course(&self, course_id: i64) -> Result<Vec<Group>> {
        self.list_groups_by_course_impl(course_id).await
    }

    async fn list_group_students(&self, group_id: i64) -> Result<Vec<User>> {
        self.list_group_students_impl(group_id).await
    }

    async fn delete_group(&self, group_id: i64) -> Result<bool> {
        self.delete_group_impl(group_id).await
    }

    // 互评任务模块
    async fn create_assessments(
        &self,
        teacher_id: i64,
        req: &CreateAssessmentRequest,
    ) -> Result<Vec<i64>> {
        self.create_assessments_impl(teacher_id, req).await
    }

    async fn get_assessment_with_context(&self, id: i64) -> Result<Option<AssessmentWithContext>> {
        self.get_assessment_with_context_impl(id).await
    }

    async fn list_criteria(&self, assessment_id: i64) -> Result<Vec<Criterion>> {
        self.list_criteria_impl(assessment_id).await
    }

    async fn list_teacher_assessments(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherAssessmentRow>> {
        self.list_teacher_assessments_impl(teacher_id).await
    }

    async fn list_student_assessments(
        &self,
        student_id: i64,
    ) -> Result<Vec<StudentAssessmentRow>> {
        self.list_student_assessments_impl(student_id).await
    }

    // 互评回复模块
    async fn get_response(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<Option<ResponseSummary>> {
        self.get_response_impl(assessment_id, student_id).await
    }

    async fn list_given_scores(&self, response_id: i64) -> Result<Vec<GivenScore>> {
        self.list_given_scores_impl(response_id).await
    }

    async fn submit_response(
        &self,
        assessment_id: i64,
        student_id: i64,
        feedback: Option<String>,
        scores: &[ScoreInput],
    ) -> Result<(i64, Vec<EvaluateeAverage>)> {
        self.submit_response_impl(assessment_id, student_id, feedback, scores)
            .await
    }

    async fn list_assessment_results(&self, assessment_id: i64) -> Result<Vec<ResultRow>> {
        self.list_assessment_results_impl(assessment_id).await
    }

    async fn list_submitted_responses(
        &self,
        assessment_id: i64,
    ) -> Result<Vec<ResponseWithEvaluatees>> {
        self.list_submitted_responses_impl(assessment_id).await
    }

    async fn list_group_roster(
        &self,
        group_id: i64,
        assessment_id: i64,
    ) -> Result<Vec<RosterEntry>> {
        self.list_group_roster_impl(group_id, assessment_id).await
    }
}

use std::sync::Arc;

use crate::models::{
    assessments::{
        entities::{
            AssessmentWithContext, Criterion, ResponseSummary, ResponseWithEvaluatees, ResultRow,
            StudentAssessmentRow, TeacherAssessmentRow,
        },
        requests::{CreateAssessmentRequest, ScoreInput},
        responses::{EvaluateeAverage, GivenScore, RosterEntry},
    },
    courses::{
        entities::Course,
        requests::CreateCourseRequest,
        responses::CourseListItem,
    },
    groups::{entities::Group, requests::CreateGroupRequest},
    users::{
        entities::User,
        requests::{CreateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出用户
    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse>;
    // 统计用户总数
    async fn count_users(&self) -> Result<u64>;

    /// 课程管理方法
    // 创建课程，创建者同时写入 course_teachers
    async fn create_course(
        &self,
        course: CreateCourseRequest,
        teacher_id: i64,
        code: &str,
    ) -> Result<Course>;
    // 通过ID获取课程信息
    async fn get_course_by_id(&self, course_id: i64) -> Result<Option<Course>>;
    // 列出教师任教的课程
    async fn list_courses_for_teacher(&self, teacher_id: i64) -> Result<Vec<CourseListItem>>;
    // 列出学生选修的课程
    async fn list_courses_for_student(&self, student_id: i64) -> Result<Vec<CourseListItem>>;
    // 列出全部课程（管理员）
    async fn list_all_courses(&self) -> Result<Vec<CourseListItem>>;
    // 删除课程
    async fn delete_course(&self, course_id: i64) -> Result<bool>;
    // 批量选课，返回新增的人数
    async fn enroll_course_students(&self, course_id: i64, student_ids: &[i64]) -> Result<u64>;
    // 统计课程选课人数
    async fn count_course_students(&self, course_id: i64) -> Result<u64>;
    // 列出课程教师
    async fn list_course_teachers(&self, course_id: i64) -> Result<Vec<User>>;

    /// 成员关系判定（所有授权决策的依据，admin 在服务层无条件放行）
    // 用户是否为小组成员
    async fn is_group_member(&self, group_id: i64, user_id: i64) -> Result<bool>;
    // 教师是否任教该课程
    async fn is_course_teacher(&self, course_id: i64, teacher_id: i64) -> Result<bool>;
    // 学生是否选修该课程
    async fn is_course_student(&self, course_id: i64, student_id: i64) -> Result<bool>;

    /// 小组管理方法
    // 创建小组（含初始成员，单事务）
    async fn create_group(&self, group: CreateGroupRequest) -> Result<Group>;
    // 通过ID获取小组信息
    async fn get_group_by_id(&self, group_id: i64) -> Result<Option<Group>>;
    // 列出课程下的小组
    async fn list_groups_by_course(&self, course_id: i64) -> Result<Vec<Group>>;
    // 列出小组成员
    async fn list_group_students(&self, group_id: i64) -> Result<Vec<User>>;
    // 删除小组
    async fn delete_group(&self, group_id: i64) -> Result<bool>;

    /// 互评任务方法
    // 为每个目标小组创建一份任务及其维度，整体单事务，返回创建的任务ID
    async fn create_assessments(
        &self,
        teacher_id: i64,
        req: &CreateAssessmentRequest,
    ) -> Result<Vec<i64>>;
    // 获取任务及课程/小组名称
    async fn get_assessment_with_context(&self, id: i64) -> Result<Option<AssessmentWithContext>>;
    // 列出任务的评分维度
    async fn list_criteria(&self, assessment_id: i64) -> Result<Vec<Criterion>>;
    // 教师创建的任务及提交统计（待完成/已完成由服务层派生）
    async fn list_teacher_assessments(&self, teacher_id: i64)
    -> Result<Vec<TeacherAssessmentRow>>;
    // 学生所在小组的任务及本人回复状态
    async fn list_student_assessments(&self, student_id: i64)
    -> Result<Vec<StudentAssessmentRow>>;

    /// 互评回复方法
    // 获取某学生对某任务的回复
    async fn get_response(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<Option<ResponseSummary>>;
    // 列出回复中已给出的分数
    async fn list_given_scores(&self, response_id: i64) -> Result<Vec<GivenScore>>;
    // 提交回复：覆盖旧回复并整体替换其评分结果，单事务
    async fn submit_response(
        &self,
        assessment_id: i64,
        student_id: i64,
        feedback: Option<String>,
        scores: &[ScoreInput],
    ) -> Result<(i64, Vec<EvaluateeAverage>)>;
    // 任务下全部评分结果行（聚合引擎的输入矩阵）
    async fn list_assessment_results(&self, assessment_id: i64) -> Result<Vec<ResultRow>>;
    // 任务下已提交的回复及评价对象
    async fn list_submitted_responses(
        &self,
        assessment_id: i64,
    ) -> Result<Vec<ResponseWithEvaluatees>>;
    // 小组名册及提交状态
    async fn list_group_roster(
        &self,
        group_id: i64,
        assessment_id: i64,
    ) -> Result<Vec<RosterEntry>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

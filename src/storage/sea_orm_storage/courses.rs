//! 课程存储操作

use std::collections::{HashMap, HashSet};

use super::SeaOrmStorage;
use crate::entity::course_students::{
    ActiveModel as CourseStudentActiveModel, Column as CourseStudentColumn,
    Entity as CourseStudents,
};
use crate::entity::course_teachers::{
    ActiveModel as CourseTeacherActiveModel, Column as CourseTeacherColumn,
    Entity as CourseTeachers,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::groups::{Column as GroupColumn, Entity as Groups};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{PeerAssessError, Result};
use crate::models::{
    courses::{entities::Course, requests::CreateCourseRequest, responses::CourseListItem},
    users::entities::User,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课程（课程行 + 创建者的任教关联，单事务）
    pub async fn create_course_impl(
        &self,
        req: CreateCourseRequest,
        teacher_id: i64,
        code: &str,
    ) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            name: Set(req.name),
            code: Set(code.to_string()),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let course = model
            .insert(&txn)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("创建课程失败: {e}")))?;

        let link = CourseTeacherActiveModel {
            course_id: Set(course.id),
            teacher_id: Set(teacher_id),
            ..Default::default()
        };

        link.insert(&txn)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("关联课程教师失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(course.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 列出教师任教的课程
    pub async fn list_courses_for_teacher_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<CourseListItem>> {
        let course_ids: Vec<i64> = CourseTeachers::find()
            .filter(CourseTeacherColumn::TeacherId.eq(teacher_id))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询任教课程失败: {e}")))?
            .into_iter()
            .map(|m| m.course_id)
            .collect();

        self.list_courses_by_ids(course_ids).await
    }

    /// 列出学生选修的课程
    pub async fn list_courses_for_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<CourseListItem>> {
        let course_ids: Vec<i64> = CourseStudents::find()
            .filter(CourseStudentColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询选修课程失败: {e}")))?
            .into_iter()
            .map(|m| m.course_id)
            .collect();

        self.list_courses_by_ids(course_ids).await
    }

    /// 列出全部课程
    pub async fn list_all_courses_impl(&self) -> Result<Vec<CourseListItem>> {
        let course_ids: Vec<i64> = Courses::find()
            .select_only()
            .column(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询课程列表失败: {e}")))?;

        self.list_courses_by_ids(course_ids).await
    }

    /// 按 ID 集合组装课程列表项（含学生数与小组数）
    async fn list_courses_by_ids(&self, course_ids: Vec<i64>) -> Result<Vec<CourseListItem>> {
        if course_ids.is_empty() {
            return Ok(vec![]);
        }

        let courses = Courses::find()
            .filter(Column::Id.is_in(course_ids.clone()))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询课程列表失败: {e}")))?;

        // 批量统计选课人数
        let students = CourseStudents::find()
            .filter(CourseStudentColumn::CourseId.is_in(course_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("统计选课人数失败: {e}")))?;
        let mut students_count: HashMap<i64, i64> = HashMap::new();
        for cs in &students {
            *students_count.entry(cs.course_id).or_insert(0) += 1;
        }

        // 批量统计小组数
        let groups = Groups::find()
            .filter(GroupColumn::CourseId.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("统计小组数失败: {e}")))?;
        let mut groups_count: HashMap<i64, i64> = HashMap::new();
        for g in &groups {
            *groups_count.entry(g.course_id).or_insert(0) += 1;
        }

        Ok(courses
            .into_iter()
            .map(|c| CourseListItem {
                id: c.id,
                name: c.name,
                code: c.code,
                description: c.description,
                students_count: students_count.get(&c.id).copied().unwrap_or(0),
                groups_count: groups_count.get(&c.id).copied().unwrap_or(0),
            })
            .collect())
    }

    /// 删除课程
    pub async fn delete_course_impl(&self, course_id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(course_id)
            .exec(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 批量选课（去重后单事务插入）
    pub async fn enroll_course_students_impl(
        &self,
        course_id: i64,
        student_ids: &[i64],
    ) -> Result<u64> {
        if student_ids.is_empty() {
            return Ok(0);
        }

        // 已选课的学生不重复插入
        let existing: HashSet<i64> = CourseStudents::find()
            .filter(CourseStudentColumn::CourseId.eq(course_id))
            .filter(CourseStudentColumn::StudentId.is_in(student_ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询选课记录失败: {e}")))?
            .into_iter()
            .map(|m| m.student_id)
            .collect();

        let fresh: Vec<i64> = student_ids
            .iter()
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter(|id| !existing.contains(id))
            .collect();

        if fresh.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("开启事务失败: {e}")))?;

        let count = fresh.len() as u64;
        let models: Vec<CourseStudentActiveModel> = fresh
            .into_iter()
            .map(|student_id| CourseStudentActiveModel {
                course_id: Set(course_id),
                student_id: Set(student_id),
                ..Default::default()
            })
            .collect();

        CourseStudents::insert_many(models)
            .exec(&txn)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("批量选课失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(count)
    }

    /// 统计课程选课人数
    pub async fn count_course_students_impl(&self, course_id: i64) -> Result<u64> {
        CourseStudents::find()
            .filter(CourseStudentColumn::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("统计选课人数失败: {e}")))
    }

    /// 列出课程教师
    pub async fn list_course_teachers_impl(&self, course_id: i64) -> Result<Vec<User>> {
        let teacher_ids: Vec<i64> = CourseTeachers::find()
            .filter(CourseTeacherColumn::CourseId.eq(course_id))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询课程教师失败: {e}")))?
            .into_iter()
            .map(|m| m.teacher_id)
            .collect();

        if teacher_ids.is_empty() {
            return Ok(vec![]);
        }

        let users = Users::find()
            .filter(UserColumn::Id.is_in(teacher_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询教师信息失败: {e}")))?;

        Ok(users.into_iter().map(|m| m.into_user()).collect())
    }

    /// 教师是否任教该课程
    pub async fn is_course_teacher_impl(&self, course_id: i64, teacher_id: i64) -> Result<bool> {
        let count = CourseTeachers::find()
            .filter(CourseTeacherColumn::CourseId.eq(course_id))
            .filter(CourseTeacherColumn::TeacherId.eq(teacher_id))
            .count(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询任教关系失败: {e}")))?;

        Ok(count > 0)
    }

    /// 学生是否选修该课程
    pub async fn is_course_student_impl(&self, course_id: i64, student_id: i64) -> Result<bool> {
        let count = CourseStudents::find()
            .filter(CourseStudentColumn::CourseId.eq(course_id))
            .filter(CourseStudentColumn::StudentId.eq(student_id))
            .count(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询选课关系失败: {e}")))?;

        Ok(count > 0)
    }
}

//! 互评任务存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::assessment_criteria::{
    ActiveModel as CriterionActiveModel, Column as CriterionColumn, Entity as AssessmentCriteria,
};
use crate::entity::assessments::{ActiveModel, Column, Entity as Assessments};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::group_students::{Column as GroupStudentColumn, Entity as GroupStudents};
use crate::entity::groups::{Column as GroupColumn, Entity as Groups};
use crate::entity::responses::{Column as ResponseColumn, Entity as Responses};
use crate::errors::{PeerAssessError, Result};
use crate::models::assessments::{
    entities::{
        AssessmentWithContext, Criterion, ResponseSummary, StudentAssessmentRow,
        TeacherAssessmentRow,
    },
    requests::CreateAssessmentRequest,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建互评任务：每个目标小组一行任务加其全部维度，整体单事务
    ///
    /// 任何一步失败都会回滚，不会留下半套任务。
    pub async fn create_assessments_impl(
        &self,
        teacher_id: i64,
        req: &CreateAssessmentRequest,
    ) -> Result<Vec<i64>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("开启事务失败: {e}")))?;

        let mut assessment_ids = Vec::with_capacity(req.group_ids.len());

        for group_id in &req.group_ids {
            let model = ActiveModel {
                title: Set(req.title.clone()),
                description: Set(req.description.clone()),
                course_id: Set(req.course_id),
                group_id: Set(*group_id),
                teacher_id: Set(teacher_id),
                due_date: Set(req.due_date.timestamp()),
                created_at: Set(now),
                ..Default::default()
            };

            let assessment = model.insert(&txn).await.map_err(|e| {
                PeerAssessError::database_operation(format!("创建互评任务失败: {e}"))
            })?;

            let criteria: Vec<CriterionActiveModel> = req
                .criteria
                .iter()
                .map(|c| CriterionActiveModel {
                    assessment_id: Set(assessment.id),
                    name: Set(c.name.clone()),
                    description: Set(c.description.clone()),
                    min_score: Set(c.min_score),
                    max_score: Set(c.max_score),
                    ..Default::default()
                })
                .collect();

            AssessmentCriteria::insert_many(criteria)
                .exec(&txn)
                .await
                .map_err(|e| {
                    PeerAssessError::database_operation(format!("创建评分维度失败: {e}"))
                })?;

            assessment_ids.push(assessment.id);
        }

        txn.commit()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(assessment_ids)
    }

    /// 获取任务及课程/小组名称
    pub async fn get_assessment_with_context_impl(
        &self,
        id: i64,
    ) -> Result<Option<AssessmentWithContext>> {
        let assessment = match Assessments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询互评任务失败: {e}")))?
        {
            Some(a) => a,
            None => return Ok(None),
        };

        let course_name = Courses::find_by_id(assessment.course_id)
            .one(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询课程失败: {e}")))?
            .map(|c| c.name)
            .unwrap_or_default();

        let group_name = Groups::find_by_id(assessment.group_id)
            .one(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询小组失败: {e}")))?
            .map(|g| g.name)
            .unwrap_or_default();

        Ok(Some(AssessmentWithContext {
            assessment: assessment.into_assessment(),
            course_name,
            group_name,
        }))
    }

    /// 列出任务的评分维度（按创建顺序）
    pub async fn list_criteria_impl(&self, assessment_id: i64) -> Result<Vec<Criterion>> {
        let results = AssessmentCriteria::find()
            .filter(CriterionColumn::AssessmentId.eq(assessment_id))
            .order_by_asc(CriterionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询评分维度失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_criterion()).collect())
    }

    /// 教师创建的任务及提交统计
    ///
    /// 统计用少量批量查询在内存中汇总，不按任务逐条发查询。
    pub async fn list_teacher_assessments_impl(
        &self,
        teacher_id: i64,
    ) -> Result<Vec<TeacherAssessmentRow>> {
        let assessments = Assessments::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询任务列表失败: {e}")))?;

        if assessments.is_empty() {
            return Ok(vec![]);
        }

        let assessment_ids: Vec<i64> = assessments.iter().map(|a| a.id).collect();
        let (course_names, group_names) = self.fetch_context_names(&assessments).await?;

        // 批量统计各小组人数
        let group_ids: Vec<i64> = assessments.iter().map(|a| a.group_id).collect();
        let group_members = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.is_in(group_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("统计小组人数失败: {e}")))?;
        let mut students_count: HashMap<i64, i64> = HashMap::new();
        for gs in &group_members {
            *students_count.entry(gs.group_id).or_insert(0) += 1;
        }

        // 批量统计已提交回复
        let responses = Responses::find()
            .filter(ResponseColumn::AssessmentId.is_in(assessment_ids))
            .filter(ResponseColumn::SubmittedAt.is_not_null())
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("统计提交情况失败: {e}")))?;

        let mut responses_count: HashMap<i64, i64> = HashMap::new();
        let mut feedback_count: HashMap<i64, i64> = HashMap::new();
        let mut max_submitted_at: HashMap<i64, i64> = HashMap::new();
        for r in &responses {
            *responses_count.entry(r.assessment_id).or_insert(0) += 1;
            if r.feedback.as_deref().is_some_and(|f| !f.is_empty()) {
                *feedback_count.entry(r.assessment_id).or_insert(0) += 1;
            }
            if let Some(ts) = r.submitted_at {
                let entry = max_submitted_at.entry(r.assessment_id).or_insert(ts);
                if ts > *entry {
                    *entry = ts;
                }
            }
        }

        Ok(assessments
            .into_iter()
            .map(|a| {
                let id = a.id;
                let group_id = a.group_id;
                TeacherAssessmentRow {
                    assessment: AssessmentWithContext {
                        course_name: course_names.get(&a.course_id).cloned().unwrap_or_default(),
                        group_name: group_names.get(&group_id).cloned().unwrap_or_default(),
                        assessment: a.into_assessment(),
                    },
                    responses_count: responses_count.get(&id).copied().unwrap_or(0),
                    students_count: students_count.get(&group_id).copied().unwrap_or(0),
                    feedback_count: feedback_count.get(&id).copied().unwrap_or(0),
                    max_submitted_at: max_submitted_at
                        .get(&id)
                        .and_then(|ts| chrono::DateTime::from_timestamp(*ts, 0)),
                }
            })
            .collect())
    }

    /// 学生所在小组的任务及本人回复状态
    pub async fn list_student_assessments_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<StudentAssessmentRow>> {
        let group_ids: Vec<i64> = GroupStudents::find()
            .filter(GroupStudentColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询所在小组失败: {e}")))?
            .into_iter()
            .map(|m| m.group_id)
            .collect();

        if group_ids.is_empty() {
            return Ok(vec![]);
        }

        let assessments = Assessments::find()
            .filter(Column::GroupId.is_in(group_ids))
            .order_by_asc(Column::DueDate)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询任务列表失败: {e}")))?;

        if assessments.is_empty() {
            return Ok(vec![]);
        }

        let assessment_ids: Vec<i64> = assessments.iter().map(|a| a.id).collect();
        let (course_names, group_names) = self.fetch_context_names(&assessments).await?;

        // 本人的回复一次取全
        let responses = Responses::find()
            .filter(ResponseColumn::AssessmentId.is_in(assessment_ids))
            .filter(ResponseColumn::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询回复状态失败: {e}")))?;
        let response_map: HashMap<i64, ResponseSummary> = responses
            .into_iter()
            .map(|r| {
                (
                    r.assessment_id,
                    ResponseSummary {
                        id: r.id,
                        student_id: r.student_id,
                        feedback: r.feedback,
                        submitted_at: r
                            .submitted_at
                            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)),
                    },
                )
            })
            .collect();

        Ok(assessments
            .into_iter()
            .map(|a| {
                let id = a.id;
                StudentAssessmentRow {
                    assessment: AssessmentWithContext {
                        course_name: course_names.get(&a.course_id).cloned().unwrap_or_default(),
                        group_name: group_names.get(&a.group_id).cloned().unwrap_or_default(),
                        assessment: a.into_assessment(),
                    },
                    response: response_map.get(&id).cloned(),
                }
            })
            .collect())
    }

    /// 批量取课程名与小组名
    async fn fetch_context_names(
        &self,
        assessments: &[crate::entity::assessments::Model],
    ) -> Result<(HashMap<i64, String>, HashMap<i64, String>)> {
        let course_ids: Vec<i64> = assessments.iter().map(|a| a.course_id).collect();
        let group_ids: Vec<i64> = assessments.iter().map(|a| a.group_id).collect();

        let course_names: HashMap<i64, String> = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询课程名称失败: {e}")))?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let group_names: HashMap<i64, String> = Groups::find()
            .filter(GroupColumn::Id.is_in(group_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询小组名称失败: {e}")))?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();

        Ok((course_names, group_names))
    }
}

//! 互评回复与评分结果存储操作

use std::collections::{BTreeMap, HashMap};

use super::SeaOrmStorage;
use crate::entity::group_students::{Column as GroupStudentColumn, Entity as GroupStudents};
use crate::entity::responses::{
    ActiveModel as ResponseActiveModel, Column as ResponseColumn, Entity as Responses,
};
use crate::entity::results::{
    ActiveModel as ResultActiveModel, Column as ResultColumn, Entity as Results,
};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{PeerAssessError, Result};
use crate::models::assessments::{
    entities::{ResponseSummary, ResponseWithEvaluatees, ResultRow},
    requests::ScoreInput,
    responses::{EvaluateeAverage, GivenScore, RosterEntry},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 获取某学生对某任务的回复
    pub async fn get_response_impl(
        &self,
        assessment_id: i64,
        student_id: i64,
    ) -> Result<Option<ResponseSummary>> {
        let result = Responses::find()
            .filter(ResponseColumn::AssessmentId.eq(assessment_id))
            .filter(ResponseColumn::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询回复失败: {e}")))?;

        Ok(result.map(|r| ResponseSummary {
            id: r.id,
            student_id: r.student_id,
            feedback: r.feedback,
            submitted_at: r
                .submitted_at
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)),
        }))
    }

    /// 列出回复中已给出的分数
    pub async fn list_given_scores_impl(&self, response_id: i64) -> Result<Vec<GivenScore>> {
        let results = Results::find()
            .filter(ResultColumn::ResponseId.eq(response_id))
            .order_by_asc(ResultColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询评分失败: {e}")))?;

        Ok(results
            .into_iter()
            .map(|r| GivenScore {
                criteria_id: r.criteria_id,
                student_id: r.student_id,
                given_score: r.given_score,
            })
            .collect())
    }

    /// 提交回复：覆盖式更新
    ///
    /// 同一事务内完成：回复行的插入或更新（submitted_at 重置为当前时间）、
    /// 旧评分结果的整体删除、新评分结果的插入。任何一步失败整体回滚，
    /// 不会出现半套分数。
    ///
    /// 同一学生并发重交时，(assessment_id, student_id) 唯一索引会让后插入的
    /// 事务失败，这里捕获唯一冲突重试一次，让后来者走更新分支。
    pub async fn submit_response_impl(
        &self,
        assessment_id: i64,
        student_id: i64,
        feedback: Option<String>,
        scores: &[ScoreInput],
    ) -> Result<(i64, Vec<EvaluateeAverage>)> {
        let mut last_err = None;

        for _attempt in 0..2 {
            match self
                .try_submit_response(assessment_id, student_id, feedback.clone(), scores)
                .await
            {
                Ok(response_id) => {
                    return Ok((response_id, average_scores_by_evaluatee(scores)));
                }
                Err(e) => {
                    let retryable = e.message().to_lowercase().contains("unique");
                    last_err = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| PeerAssessError::database_operation("提交回复失败".to_string())))
    }

    async fn try_submit_response(
        &self,
        assessment_id: i64,
        student_id: i64,
        feedback: Option<String>,
        scores: &[ScoreInput],
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = Responses::find()
            .filter(ResponseColumn::AssessmentId.eq(assessment_id))
            .filter(ResponseColumn::StudentId.eq(student_id))
            .one(&txn)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询回复失败: {e}")))?;

        let response_id = match existing {
            Some(model) => {
                // 覆盖旧回复并删除其全部评分结果
                let id = model.id;
                let mut active: ResponseActiveModel = model.into();
                active.feedback = Set(feedback);
                active.submitted_at = Set(Some(now));
                active.update(&txn).await.map_err(|e| {
                    PeerAssessError::database_operation(format!("更新回复失败: {e}"))
                })?;

                Results::delete_many()
                    .filter(ResultColumn::ResponseId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(|e| {
                        PeerAssessError::database_operation(format!("删除旧评分失败: {e}"))
                    })?;

                id
            }
            None => {
                let model = ResponseActiveModel {
                    assessment_id: Set(assessment_id),
                    student_id: Set(student_id),
                    feedback: Set(feedback),
                    submitted_at: Set(Some(now)),
                    ..Default::default()
                };

                model
                    .insert(&txn)
                    .await
                    .map_err(|e| {
                        PeerAssessError::database_operation(format!("创建回复失败: {e}"))
                    })?
                    .id
            }
        };

        let models: Vec<ResultActiveModel> = scores
            .iter()
            .map(|s| ResultActiveModel {
                response_id: Set(response_id),
                criteria_id: Set(s.criteria_id),
                student_id: Set(s.student_id),
                given_score: Set(s.score),
                ..Default::default()
            })
            .collect();

        Results::insert_many(models)
            .exec(&txn)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("写入评分失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(response_id)
    }

    /// 任务下全部评分结果行
    ///
    /// 两次查询取回完整矩阵，聚合在内存中完成。
    pub async fn list_assessment_results_impl(&self, assessment_id: i64) -> Result<Vec<ResultRow>> {
        let response_ids: Vec<i64> = Responses::find()
            .filter(ResponseColumn::AssessmentId.eq(assessment_id))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询回复列表失败: {e}")))?
            .into_iter()
            .map(|r| r.id)
            .collect();

        if response_ids.is_empty() {
            return Ok(vec![]);
        }

        let results = Results::find()
            .filter(ResultColumn::ResponseId.is_in(response_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询评分结果失败: {e}")))?;

        Ok(results
            .into_iter()
            .map(|r| ResultRow {
                criteria_id: r.criteria_id,
                student_id: r.student_id,
                given_score: r.given_score,
            })
            .collect())
    }

    /// 任务下已提交的回复及评价对象
    pub async fn list_submitted_responses_impl(
        &self,
        assessment_id: i64,
    ) -> Result<Vec<ResponseWithEvaluatees>> {
        let responses = Responses::find()
            .filter(ResponseColumn::AssessmentId.eq(assessment_id))
            .filter(ResponseColumn::SubmittedAt.is_not_null())
            .order_by_desc(ResponseColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询回复列表失败: {e}")))?;

        if responses.is_empty() {
            return Ok(vec![]);
        }

        let response_ids: Vec<i64> = responses.iter().map(|r| r.id).collect();
        let results = Results::find()
            .filter(ResultColumn::ResponseId.is_in(response_ids))
            .order_by_asc(ResultColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询评分结果失败: {e}")))?;

        // 评价者与被评者的姓名一次取全
        let mut user_ids: Vec<i64> = responses.iter().map(|r| r.student_id).collect();
        user_ids.extend(results.iter().map(|r| r.student_id));
        user_ids.sort_unstable();
        user_ids.dedup();

        let users: HashMap<i64, crate::entity::users::Model> = Users::find()
            .filter(UserColumn::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询用户信息失败: {e}")))?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        // 按回复归组评价对象（去重，保持插入顺序）
        let mut evaluatees: HashMap<i64, Vec<i64>> = HashMap::new();
        for r in &results {
            let entry = evaluatees.entry(r.response_id).or_default();
            if !entry.contains(&r.student_id) {
                entry.push(r.student_id);
            }
        }

        Ok(responses
            .into_iter()
            .filter_map(|r| {
                let submitted_at = r
                    .submitted_at
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))?;
                let evaluator = users.get(&r.student_id);
                let evaluated_ids = evaluatees.get(&r.id).cloned().unwrap_or_default();
                let evaluated_names = evaluated_ids
                    .iter()
                    .filter_map(|id| users.get(id))
                    .map(|u| format!("{} {}", u.first_name, u.last_name))
                    .collect();

                Some(ResponseWithEvaluatees {
                    response_id: r.id,
                    student_id: r.student_id,
                    first_name: evaluator.map(|u| u.first_name.clone()).unwrap_or_default(),
                    last_name: evaluator.map(|u| u.last_name.clone()).unwrap_or_default(),
                    q_number: evaluator.and_then(|u| u.q_number.clone()),
                    feedback: r.feedback,
                    submitted_at,
                    evaluated_student_ids: evaluated_ids,
                    evaluated_students: evaluated_names,
                })
            })
            .collect())
    }

    /// 小组名册及提交状态
    pub async fn list_group_roster_impl(
        &self,
        group_id: i64,
        assessment_id: i64,
    ) -> Result<Vec<RosterEntry>> {
        let member_ids: Vec<i64> = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .order_by_asc(GroupStudentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询小组成员失败: {e}")))?
            .into_iter()
            .map(|m| m.student_id)
            .collect();

        if member_ids.is_empty() {
            return Ok(vec![]);
        }

        let users: HashMap<i64, crate::entity::users::Model> = Users::find()
            .filter(UserColumn::Id.is_in(member_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询成员信息失败: {e}")))?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let responses: HashMap<i64, Option<i64>> = Responses::find()
            .filter(ResponseColumn::AssessmentId.eq(assessment_id))
            .filter(ResponseColumn::StudentId.is_in(member_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询提交状态失败: {e}")))?
            .into_iter()
            .map(|r| (r.student_id, r.submitted_at))
            .collect();

        Ok(member_ids
            .into_iter()
            .filter_map(|id| {
                let user = users.get(&id)?;
                let submitted_at = responses
                    .get(&id)
                    .copied()
                    .flatten()
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0));
                Some(RosterEntry {
                    id: user.id,
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    q_number: user.q_number.clone(),
                    has_submitted: submitted_at.is_some(),
                    submitted_at,
                })
            })
            .collect())
    }
}

/// 按被评学生汇总平均分（提交接口的即时回显）
fn average_scores_by_evaluatee(scores: &[ScoreInput]) -> Vec<EvaluateeAverage> {
    let mut sums: BTreeMap<i64, (f64, i64)> = BTreeMap::new();
    for s in scores {
        let entry = sums.entry(s.student_id).or_insert((0.0, 0));
        entry.0 += s.score;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(student_id, (sum, count))| EvaluateeAverage {
            student_id,
            average: (sum / count as f64 * 100.0).round() / 100.0, // 保留两位小数
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_scores_by_evaluatee() {
        let scores = vec![
            ScoreInput {
                criteria_id: 1,
                student_id: 7,
                score: 8.0,
            },
            ScoreInput {
                criteria_id: 2,
                student_id: 7,
                score: 9.0,
            },
            ScoreInput {
                criteria_id: 1,
                student_id: 9,
                score: 6.0,
            },
        ];

        let averages = average_scores_by_evaluatee(&scores);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].student_id, 7);
        assert_eq!(averages[0].average, 8.5);
        assert_eq!(averages[1].student_id, 9);
        assert_eq!(averages[1].average, 6.0);
    }

    #[test]
    fn test_average_rounding() {
        let scores = vec![
            ScoreInput {
                criteria_id: 1,
                student_id: 3,
                score: 7.0,
            },
            ScoreInput {
                criteria_id: 2,
                student_id: 3,
                score: 8.0,
            },
            ScoreInput {
                criteria_id: 3,
                student_id: 3,
                score: 8.0,
            },
        ];

        let averages = average_scores_by_evaluatee(&scores);
        assert_eq!(averages[0].average, 7.67);
    }
}

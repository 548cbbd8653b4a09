//! 小组存储操作

use super::SeaOrmStorage;
use crate::entity::group_students::{
    ActiveModel as GroupStudentActiveModel, Column as GroupStudentColumn, Entity as GroupStudents,
};
use crate::entity::groups::{ActiveModel, Column, Entity as Groups};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{PeerAssessError, Result};
use crate::models::{
    groups::{entities::Group, requests::CreateGroupRequest},
    users::entities::User,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;

impl SeaOrmStorage {
    /// 创建小组（小组行 + 初始成员，单事务）
    pub async fn create_group_impl(&self, req: CreateGroupRequest) -> Result<Group> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            course_id: Set(req.course_id),
            name: Set(req.name),
            created_at: Set(now),
            ..Default::default()
        };

        let group = model
            .insert(&txn)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("创建小组失败: {e}")))?;

        if !req.student_ids.is_empty() {
            let members: Vec<GroupStudentActiveModel> = req
                .student_ids
                .iter()
                .map(|student_id| GroupStudentActiveModel {
                    group_id: Set(group.id),
                    student_id: Set(*student_id),
                    ..Default::default()
                })
                .collect();

            GroupStudents::insert_many(members)
                .exec(&txn)
                .await
                .map_err(|e| {
                    PeerAssessError::database_operation(format!("添加小组成员失败: {e}"))
                })?;
        }

        txn.commit()
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(group.into_group())
    }

    /// 通过 ID 获取小组
    pub async fn get_group_by_id_impl(&self, group_id: i64) -> Result<Option<Group>> {
        let result = Groups::find_by_id(group_id)
            .one(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询小组失败: {e}")))?;

        Ok(result.map(|m| m.into_group()))
    }

    /// 列出课程下的小组
    pub async fn list_groups_by_course_impl(&self, course_id: i64) -> Result<Vec<Group>> {
        let results = Groups::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询小组列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_group()).collect())
    }

    /// 列出小组成员（按加入顺序）
    pub async fn list_group_students_impl(&self, group_id: i64) -> Result<Vec<User>> {
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

        let users = Users::find()
            .filter(UserColumn::Id.is_in(member_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询成员信息失败: {e}")))?;

        // 保持 group_students 的加入顺序
        let mut user_map: HashMap<i64, User> =
            users.into_iter().map(|m| (m.id, m.into_user())).collect();
        Ok(member_ids
            .into_iter()
            .filter_map(|id| user_map.remove(&id))
            .collect())
    }

    /// 删除小组
    pub async fn delete_group_impl(&self, group_id: i64) -> Result<bool> {
        let result = Groups::delete_by_id(group_id)
            .exec(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("删除小组失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 用户是否为小组成员
    pub async fn is_group_member_impl(&self, group_id: i64, user_id: i64) -> Result<bool> {
        let count = GroupStudents::find()
            .filter(GroupStudentColumn::GroupId.eq(group_id))
            .filter(GroupStudentColumn::StudentId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| PeerAssessError::database_operation(format!("查询成员关系失败: {e}")))?;

        Ok(count > 0)
    }
}

//! 聚合计算
//!
//! 完成度、分档、各维度平均分的纯函数集合。所有输入都来自存储层一次性取回的
//! 行集，这里只做内存汇总，不发查询。
//!
//! 约定："没有任何评分" 用 None 表示，序列化为 null（前端显示 N/A），
//! 与真实的 0 分严格区分。

use chrono::{DateTime, Utc};

use crate::models::assessments::entities::{Criterion, ResultRow, ScoreBand};
use crate::models::assessments::responses::CriterionScore;

/// 完成百分比：已提交人数 / 小组人数，四舍五入取整
///
/// 小组为空时定义为 0。
pub fn completion_percentage(responses_count: i64, students_count: i64) -> i64 {
    if students_count <= 0 {
        return 0;
    }
    (responses_count as f64 / students_count as f64 * 100.0).round() as i64
}

/// 教师视角的任务是否已完成：过了截止时间，或全组交齐
pub fn is_teacher_completed(
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
    responses_count: i64,
    students_count: i64,
) -> bool {
    due_date < now || responses_count == students_count
}

/// 教师视角展示的完成时间
///
/// 全组交齐取最后一次提交时间；未交齐但已过期取截止时间；其余为 None。
pub fn completion_date(
    responses_count: i64,
    students_count: i64,
    max_submitted_at: Option<DateTime<Utc>>,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if responses_count == students_count {
        max_submitted_at
    } else if due_date < now {
        Some(due_date)
    } else {
        None
    }
}

/// 分数颜色档位
///
/// 百分比断点：>=80 excellent，>=70 good，>=60 average，>=50 below-average，
/// 其余 poor。分数或满分缺失（含 0）时为 neutral。
pub fn score_band(score: Option<f64>, max_score: f64) -> ScoreBand {
    let score = match score {
        Some(s) if s != 0.0 => s,
        _ => return ScoreBand::Neutral,
    };
    if max_score == 0.0 {
        return ScoreBand::Neutral;
    }

    let percentage = score / max_score * 100.0;
    if percentage >= 80.0 {
        ScoreBand::Excellent
    } else if percentage >= 70.0 {
        ScoreBand::Good
    } else if percentage >= 60.0 {
        ScoreBand::Average
    } else if percentage >= 50.0 {
        ScoreBand::BelowAverage
    } else {
        ScoreBand::Poor
    }
}

/// 保留一位小数
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 某位被评学生在每个维度上的平均分
///
/// 对每个维度取匹配结果行的均值；没有任何评分的维度给 None 而不是 0。
pub fn criterion_averages(
    criteria: &[Criterion],
    rows: &[ResultRow],
    evaluatee_id: i64,
) -> Vec<CriterionScore> {
    criteria
        .iter()
        .map(|criterion| {
            let scores: Vec<f64> = rows
                .iter()
                .filter(|r| r.criteria_id == criterion.id && r.student_id == evaluatee_id)
                .map(|r| r.given_score)
                .collect();

            let number_of_ratings = scores.len() as i64;
            let average_score = if scores.is_empty() {
                None
            } else {
                Some(round1(scores.iter().sum::<f64>() / scores.len() as f64))
            };

            let score_display = match average_score {
                Some(avg) => format!("{:.1}/{}", avg, criterion.max_score),
                None => format!("N/A/{}", criterion.max_score),
            };

            CriterionScore {
                criteria_id: criterion.id,
                criteria_name: criterion.name.clone(),
                max_score: criterion.max_score,
                average_score,
                number_of_ratings,
                score_display,
                score_color: score_band(average_score, criterion.max_score),
            }
        })
        .collect()
}

/// 某位被评学生的总平均分及对应的满分均值
///
/// 对该生全部结果行做合并平均（不是各维度均值的再平均），
/// 满分均值按行加权，与分数同口径。
pub fn overall_average(
    criteria: &[Criterion],
    rows: &[ResultRow],
    evaluatee_id: i64,
) -> (Option<f64>, Option<f64>) {
    let mut score_sum = 0.0;
    let mut max_sum = 0.0;
    let mut count = 0usize;

    for row in rows.iter().filter(|r| r.student_id == evaluatee_id) {
        let Some(criterion) = criteria.iter().find(|c| c.id == row.criteria_id) else {
            continue;
        };
        score_sum += row.given_score;
        max_sum += criterion.max_score;
        count += 1;
    }

    if count == 0 {
        (None, None)
    } else {
        (
            Some(round1(score_sum / count as f64)),
            Some(round1(max_sum / count as f64)),
        )
    }
}

/// 总平均分的展示文本，如 "7.5/10.0"，无评分时为 "N/A"
pub fn overall_display(average: Option<f64>, max_average: Option<f64>) -> String {
    match (average, max_average) {
        (Some(avg), Some(max)) => format!("{avg:.1}/{max:.1}"),
        _ => "N/A".to_string(),
    }
}

/// 结果页总分刻度：各维度满分的平均值，无维度时退回 5.0
pub fn average_max_score(criteria: &[Criterion]) -> f64 {
    if criteria.is_empty() {
        return 5.0;
    }
    criteria.iter().map(|c| c.max_score).sum::<f64>() / criteria.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn criterion(id: i64, max_score: f64) -> Criterion {
        Criterion {
            id,
            assessment_id: 1,
            name: format!("criterion-{id}"),
            description: None,
            min_score: 0.0,
            max_score,
        }
    }

    fn row(criteria_id: i64, student_id: i64, given_score: f64) -> ResultRow {
        ResultRow {
            criteria_id,
            student_id,
            given_score,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(1, 2), 50);
        assert_eq!(completion_percentage(2, 2), 100);
        assert_eq!(completion_percentage(0, 5), 0);
        // 四舍五入
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
    }

    #[test]
    fn test_completion_percentage_empty_group() {
        assert_eq!(completion_percentage(0, 0), 0);
    }

    #[test]
    fn test_completion_percentage_bounds() {
        for responses in 0..=10 {
            let p = completion_percentage(responses, 10);
            assert!((0..=100).contains(&p));
        }
    }

    #[test]
    fn test_is_teacher_completed() {
        let due = at(1_000);
        // 已过期
        assert!(is_teacher_completed(due, at(2_000), 0, 4));
        // 全组交齐
        assert!(is_teacher_completed(due, at(500), 4, 4));
        // 未过期且未交齐
        assert!(!is_teacher_completed(due, at(500), 3, 4));
    }

    #[test]
    fn test_completion_date_full_submission() {
        let due = at(1_000);
        let last = at(800);
        assert_eq!(completion_date(4, 4, Some(last), due, at(900)), Some(last));
    }

    #[test]
    fn test_completion_date_overdue() {
        let due = at(1_000);
        assert_eq!(completion_date(2, 4, Some(at(800)), due, at(2_000)), Some(due));
    }

    #[test]
    fn test_completion_date_in_progress() {
        let due = at(1_000);
        assert_eq!(completion_date(2, 4, Some(at(800)), due, at(900)), None);
    }

    #[test]
    fn test_score_band_breakpoints() {
        assert_eq!(score_band(Some(8.0), 10.0), ScoreBand::Excellent); // 80%
        assert_eq!(score_band(Some(7.9), 10.0), ScoreBand::Good); // 79%
        assert_eq!(score_band(Some(7.0), 10.0), ScoreBand::Good); // 70%
        assert_eq!(score_band(Some(6.0), 10.0), ScoreBand::Average); // 60%
        assert_eq!(score_band(Some(8.0), 12.0), ScoreBand::Average); // 66.7%
        assert_eq!(score_band(Some(5.0), 10.0), ScoreBand::BelowAverage); // 50%
        assert_eq!(score_band(Some(4.9), 10.0), ScoreBand::Poor); // 49%
    }

    #[test]
    fn test_score_band_neutral() {
        assert_eq!(score_band(None, 10.0), ScoreBand::Neutral);
        assert_eq!(score_band(Some(0.0), 10.0), ScoreBand::Neutral);
        assert_eq!(score_band(Some(5.0), 0.0), ScoreBand::Neutral);
    }

    #[test]
    fn test_criterion_averages() {
        let criteria = vec![criterion(1, 10.0), criterion(2, 10.0)];
        let rows = vec![row(1, 7, 8.0), row(1, 7, 9.0), row(1, 9, 6.0)];

        let scores = criterion_averages(&criteria, &rows, 7);
        assert_eq!(scores.len(), 2);

        assert_eq!(scores[0].average_score, Some(8.5));
        assert_eq!(scores[0].number_of_ratings, 2);
        assert_eq!(scores[0].score_display, "8.5/10");
        assert_eq!(scores[0].score_color, ScoreBand::Excellent);

        // 无人评分的维度给 N/A 而不是 0
        assert_eq!(scores[1].average_score, None);
        assert_eq!(scores[1].number_of_ratings, 0);
        assert_eq!(scores[1].score_display, "N/A/10");
        assert_eq!(scores[1].score_color, ScoreBand::Neutral);
    }

    #[test]
    fn test_na_sentinel_distinct_from_zero() {
        let criteria = vec![criterion(1, 10.0)];
        let zero_rows = vec![row(1, 7, 0.0)];

        let with_zero = criterion_averages(&criteria, &zero_rows, 7);
        let with_nothing = criterion_averages(&criteria, &[], 7);

        assert_eq!(with_zero[0].average_score, Some(0.0));
        assert_eq!(with_nothing[0].average_score, None);
        assert_ne!(with_zero[0].score_display, with_nothing[0].score_display);
    }

    #[test]
    fn test_overall_average_is_pooled() {
        let criteria = vec![criterion(1, 10.0), criterion(2, 10.0)];
        // 维度1有三个 10 分，维度2只有一个 0 分：
        // 合并平均 = 30/4 = 7.5，各维度均值再平均 = (10+0)/2 = 5.0
        let rows = vec![
            row(1, 7, 10.0),
            row(1, 7, 10.0),
            row(1, 7, 10.0),
            row(2, 7, 0.0),
        ];

        let (avg, max_avg) = overall_average(&criteria, &rows, 7);
        assert_eq!(avg, Some(7.5));
        assert_eq!(max_avg, Some(10.0));
    }

    #[test]
    fn test_overall_average_empty() {
        let criteria = vec![criterion(1, 10.0)];
        let (avg, max_avg) = overall_average(&criteria, &[], 7);
        assert_eq!(avg, None);
        assert_eq!(max_avg, None);
        assert_eq!(overall_display(avg, max_avg), "N/A");
    }

    #[test]
    fn test_overall_display() {
        assert_eq!(overall_display(Some(7.5), Some(10.0)), "7.5/10.0");
        assert_eq!(overall_display(None, None), "N/A");
    }

    #[test]
    fn test_average_max_score() {
        let criteria = vec![criterion(1, 10.0), criterion(2, 20.0)];
        assert_eq!(average_max_score(&criteria), 15.0);
        assert_eq!(average_max_score(&[]), 5.0);
    }
}

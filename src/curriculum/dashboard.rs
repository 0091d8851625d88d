// src/curriculum/dashboard.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    curriculum::tree::{ModuleNode, PhaseNode, ProgressSummary, summarize},
    models::{profile::Profile, progress::ProgressRecord},
};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A module with a deadline, labelled with where it lives in the curriculum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadlineItem {
    pub module_id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub section_title: String,
    pub phase_title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub summary: ProgressSummary,
    pub upcoming: Vec<DeadlineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleCompletion {
    pub module_id: i64,
    pub module_title: String,
    pub section_title: String,
    pub phase_title: String,
    pub deadline: Option<DateTime<Utc>>,
    pub total_students: usize,
    pub completed_count: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentRef {
    pub user_id: i64,
    pub full_name: String,
    pub email: Option<String>,
}

/// Students who had not completed the most recently passed deadline.
#[derive(Debug, Clone, Serialize)]
pub struct MissedDeadline {
    pub module_id: i64,
    pub module_title: String,
    pub deadline: DateTime<Utc>,
    pub days_overdue: i64,
    pub students: Vec<StudentRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorDashboard {
    pub students_count: usize,
    pub module_completions: Vec<ModuleCompletion>,
    pub upcoming_deadlines: Vec<DeadlineItem>,
    pub missed_deadline: Option<MissedDeadline>,
}

fn located(tree: &[PhaseNode]) -> impl Iterator<Item = (&PhaseNode, &str, &ModuleNode)> {
    tree.iter().flat_map(|phase| {
        phase.sections.iter().flat_map(move |section| {
            section
                .modules
                .iter()
                .map(move |module| (phase, section.section.title.as_str(), module))
        })
    })
}

fn deadline_item(phase: &PhaseNode, section_title: &str, node: &ModuleNode) -> Option<DeadlineItem> {
    node.module.deadline.map(|deadline| DeadlineItem {
        module_id: node.module.id,
        title: node.module.title.clone(),
        deadline,
        section_title: section_title.to_string(),
        phase_title: phase.phase.title.clone(),
    })
}

/// Whole days past `deadline`, rounded up.
pub fn days_overdue(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed = (now - deadline).num_milliseconds().max(0);
    (elapsed + DAY_MS - 1) / DAY_MS
}

/// Dashboard for the student whose progress is attached to `tree`.
/// `tree` must be a student-role tree so only published modules count.
pub fn student_dashboard(tree: &[PhaseNode], limit: usize) -> StudentDashboard {
    let mut upcoming: Vec<DeadlineItem> = located(tree)
        .filter(|(_, _, node)| !node.is_completed())
        .filter_map(|(phase, section, node)| deadline_item(phase, section, node))
        .collect();
    upcoming.sort_by_key(|item| item.deadline);
    upcoming.truncate(limit);

    StudentDashboard {
        summary: summarize(tree),
        upcoming,
    }
}

/// Class-wide view for instructors.
///
/// `tree` holds the published curriculum, `progress` every stored record and
/// `students` the profiles with the student role. Records belonging to
/// non-students are ignored.
pub fn instructor_dashboard(
    tree: &[PhaseNode],
    progress: &[ProgressRecord],
    students: &[Profile],
    now: DateTime<Utc>,
    upcoming_limit: usize,
) -> InstructorDashboard {
    let student_ids: HashSet<i64> = students.iter().map(|s| s.user_id).collect();
    let total_students = student_ids.len();

    let completed_pairs: HashSet<(i64, i64)> = progress
        .iter()
        .filter(|r| r.is_completed && student_ids.contains(&r.user_id))
        .map(|r| (r.user_id, r.module_id))
        .collect();

    let mut completed_by_module: HashMap<i64, usize> = HashMap::new();
    for (_, module_id) in &completed_pairs {
        *completed_by_module.entry(*module_id).or_default() += 1;
    }

    let module_completions = located(tree)
        .map(|(phase, section_title, node)| {
            let completed_count = completed_by_module.get(&node.module.id).copied().unwrap_or(0);
            let completion_rate = if total_students > 0 {
                (completed_count as f64 / total_students as f64) * 100.0
            } else {
                0.0
            };

            ModuleCompletion {
                module_id: node.module.id,
                module_title: node.module.title.clone(),
                section_title: section_title.to_string(),
                phase_title: phase.phase.title.clone(),
                deadline: node.module.deadline,
                total_students,
                completed_count,
                completion_rate,
            }
        })
        .collect();

    let dated: Vec<DeadlineItem> = located(tree)
        .filter_map(|(phase, section, node)| deadline_item(phase, section, node))
        .collect();

    let mut upcoming_deadlines: Vec<DeadlineItem> = dated
        .iter()
        .filter(|item| item.deadline >= now)
        .cloned()
        .collect();
    upcoming_deadlines.sort_by_key(|item| item.deadline);
    upcoming_deadlines.truncate(upcoming_limit);

    let missed_deadline = dated
        .iter()
        .filter(|item| item.deadline < now)
        .max_by_key(|item| item.deadline)
        .map(|item| MissedDeadline {
            module_id: item.module_id,
            module_title: item.title.clone(),
            deadline: item.deadline,
            days_overdue: days_overdue(item.deadline, now),
            students: students
                .iter()
                .filter(|s| !completed_pairs.contains(&(s.user_id, item.module_id)))
                .map(|s| StudentRef {
                    user_id: s.user_id,
                    full_name: s
                        .full_name
                        .clone()
                        .unwrap_or_else(|| "Unknown Student".to_string()),
                    email: s.email.clone(),
                })
                .collect(),
        });

    InstructorDashboard {
        students_count: total_students,
        module_completions,
        upcoming_deadlines,
        missed_deadline,
    }
}

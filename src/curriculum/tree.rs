// src/curriculum/tree.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    curriculum::progress::{completion_rate, is_completed},
    models::{
        module::Module, phase::Phase, progress::ProgressRecord, section::Section, user::Role,
    },
};

/// A module plus the requesting user's progress on it.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleNode {
    #[serde(flatten)]
    pub module: Module,
    pub progress: Option<ProgressRecord>,
}

impl ModuleNode {
    pub fn is_completed(&self) -> bool {
        is_completed(self.progress.as_ref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionNode {
    #[serde(flatten)]
    pub section: Section,
    pub modules: Vec<ModuleNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseNode {
    #[serde(flatten)]
    pub phase: Phase,
    pub sections: Vec<SectionNode>,
}

/// Completion totals over every module in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub percentage: f64,
}

/// Compact module entry used for navigation and the table of contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub id: i64,
    pub title: String,
    pub module_order: i32,
    pub is_completed: bool,
}

impl From<&ModuleNode> for NavItem {
    fn from(node: &ModuleNode) -> Self {
        Self {
            id: node.module.id,
            title: node.module.title.clone(),
            module_order: node.module.module_order,
            is_completed: node.is_completed(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Adjacent {
    pub prev: Option<NavItem>,
    pub next: Option<NavItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlineSection {
    pub id: i64,
    pub title: String,
    pub modules: Vec<NavItem>,
}

/// The sections and modules of a single phase, as seen from one of its modules.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseOutline {
    pub phase_id: i64,
    pub phase_title: String,
    pub sections: Vec<OutlineSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionRef {
    pub id: i64,
    pub title: String,
    pub section_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseRef {
    pub id: i64,
    pub title: String,
    pub phase_order: i32,
}

/// Everything the module page needs in one payload.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleDetail {
    pub module: ModuleNode,
    pub section: SectionRef,
    pub phase: PhaseRef,
    pub outline: PhaseOutline,
    pub prev: Option<NavItem>,
    pub next: Option<NavItem>,
}

/// Whether `role` may see `module` at all.
pub fn visible_to(module: &Module, role: Role) -> bool {
    role == Role::Instructor || module.is_published
}

/// Assembles the Phase -> Section -> Module tree for one user.
///
/// Every level is stably sorted by its order column. Students never see
/// unpublished modules. Rows whose parent is missing are dropped, and when
/// `progress` holds several records for one module the first one wins.
pub fn build_tree(
    mut phases: Vec<Phase>,
    sections: Vec<Section>,
    modules: Vec<Module>,
    progress: Vec<ProgressRecord>,
    role: Role,
) -> Vec<PhaseNode> {
    let mut progress_by_module: HashMap<i64, ProgressRecord> = HashMap::new();
    for record in progress {
        progress_by_module.entry(record.module_id).or_insert(record);
    }

    let mut modules_by_section: HashMap<i64, Vec<Module>> = HashMap::new();
    for module in modules.into_iter().filter(|m| visible_to(m, role)) {
        modules_by_section.entry(module.section_id).or_default().push(module);
    }

    let mut sections_by_phase: HashMap<i64, Vec<Section>> = HashMap::new();
    for section in sections {
        sections_by_phase.entry(section.phase_id).or_default().push(section);
    }

    phases.sort_by_key(|p| p.phase_order);

    phases
        .into_iter()
        .map(|phase| {
            let mut sections = sections_by_phase.remove(&phase.id).unwrap_or_default();
            sections.sort_by_key(|s| s.section_order);

            let sections = sections
                .into_iter()
                .map(|section| {
                    let mut modules = modules_by_section.remove(&section.id).unwrap_or_default();
                    modules.sort_by_key(|m| m.module_order);

                    let modules = modules
                        .into_iter()
                        .map(|module| ModuleNode {
                            progress: progress_by_module.remove(&module.id),
                            module,
                        })
                        .collect();

                    SectionNode { section, modules }
                })
                .collect();

            PhaseNode { phase, sections }
        })
        .collect()
}

/// Iterates every module node of the tree in display order.
pub fn modules_in_order(tree: &[PhaseNode]) -> impl Iterator<Item = &ModuleNode> {
    tree.iter()
        .flat_map(|p| p.sections.iter())
        .flat_map(|s| s.modules.iter())
}

pub fn summarize(tree: &[PhaseNode]) -> ProgressSummary {
    let total = modules_in_order(tree).count();
    let completed = modules_in_order(tree).filter(|m| m.is_completed()).count();
    let percentage = completion_rate(
        modules_in_order(tree).filter_map(|m| m.progress.as_ref()),
        total,
    );

    ProgressSummary {
        total,
        completed,
        percentage,
    }
}

/// Concatenates the modules of every section of one phase, in display order.
pub fn flatten_phase(outline: &PhaseOutline) -> Vec<NavItem> {
    outline
        .sections
        .iter()
        .flat_map(|s| s.modules.iter().cloned())
        .collect()
}

/// Previous and next entries around `current_id`.
/// An id that is not in the list has no neighbours.
pub fn find_adjacent(flattened: &[NavItem], current_id: i64) -> Adjacent {
    let Some(index) = flattened.iter().position(|m| m.id == current_id) else {
        return Adjacent::default();
    };

    Adjacent {
        prev: index.checked_sub(1).map(|i| flattened[i].clone()),
        next: flattened.get(index + 1).cloned(),
    }
}

fn outline_of(phase: &PhaseNode) -> PhaseOutline {
    PhaseOutline {
        phase_id: phase.phase.id,
        phase_title: phase.phase.title.clone(),
        sections: phase
            .sections
            .iter()
            .map(|s| OutlineSection {
                id: s.section.id,
                title: s.section.title.clone(),
                modules: s.modules.iter().map(NavItem::from).collect(),
            })
            .collect(),
    }
}

/// Finds `module_id` together with the section and phase that hold it.
fn locate(tree: &[PhaseNode], module_id: i64) -> Option<(&PhaseNode, &SectionNode, &ModuleNode)> {
    tree.iter().find_map(|phase| {
        phase.sections.iter().find_map(|section| {
            section
                .modules
                .iter()
                .find(|m| m.module.id == module_id)
                .map(|node| (phase, section, node))
        })
    })
}

/// Outline of the phase that contains `module_id`.
pub fn phase_outline(tree: &[PhaseNode], module_id: i64) -> Option<PhaseOutline> {
    locate(tree, module_id).map(|(phase, _, _)| outline_of(phase))
}

/// Locates `module_id` in the tree and gathers its page payload.
/// Returns `None` when the module is absent or hidden from this tree's viewer.
pub fn module_detail(tree: &[PhaseNode], module_id: i64) -> Option<ModuleDetail> {
    let (phase, section, node) = locate(tree, module_id)?;
    let outline = phase_outline(tree, module_id)?;
    let Adjacent { prev, next } = find_adjacent(&flatten_phase(&outline), module_id);

    Some(ModuleDetail {
        module: node.clone(),
        section: SectionRef {
            id: section.section.id,
            title: section.section.title.clone(),
            section_order: section.section.section_order,
        },
        phase: PhaseRef {
            id: phase.phase.id,
            title: phase.phase.title.clone(),
            phase_order: phase.phase.phase_order,
        },
        outline,
        prev,
        next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::module::ContentType;

    fn phase(id: i64, order: i32) -> Phase {
        Phase {
            id,
            title: format!("P{}", id),
            description: String::new(),
            phase_order: order,
        }
    }

    fn section(id: i64, phase_id: i64, order: i32) -> Section {
        Section {
            id,
            phase_id,
            title: format!("S{}", id),
            description: String::new(),
            section_order: order,
        }
    }

    fn module(id: i64, section_id: i64, order: i32, is_published: bool) -> Module {
        Module {
            id,
            section_id,
            title: format!("M{}", id),
            description: String::new(),
            content: String::new(),
            content_type: ContentType::Text,
            external_url: None,
            deadline: None,
            module_order: order,
            is_published,
        }
    }

    fn done(module_id: i64) -> ProgressRecord {
        ProgressRecord {
            user_id: 1,
            module_id,
            is_completed: true,
            completed_at: None,
        }
    }

    fn nav(id: i64) -> NavItem {
        NavItem {
            id,
            title: format!("M{}", id),
            module_order: id as i32,
            is_completed: false,
        }
    }

    fn module_ids(tree: &[PhaseNode]) -> Vec<i64> {
        modules_in_order(tree).map(|m| m.module.id).collect()
    }

    #[test]
    fn tree_is_sorted_at_every_level() {
        let tree = build_tree(
            vec![phase(2, 2), phase(1, 1)],
            vec![section(20, 2, 1), section(11, 1, 2), section(10, 1, 1)],
            vec![
                module(103, 10, 2, true),
                module(101, 10, 1, true),
                module(110, 11, 1, true),
                module(200, 20, 1, true),
            ],
            Vec::new(),
            Role::Student,
        );

        assert_eq!(tree.iter().map(|p| p.phase.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            tree[0].sections.iter().map(|s| s.section.id).collect::<Vec<_>>(),
            vec![10, 11]
        );
        assert_eq!(module_ids(&tree), vec![101, 103, 110, 200]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let tree = build_tree(
            vec![phase(1, 1)],
            vec![section(10, 1, 1)],
            vec![module(5, 10, 1, true), module(4, 10, 1, true)],
            Vec::new(),
            Role::Student,
        );

        assert_eq!(module_ids(&tree), vec![5, 4]);
    }

    #[test]
    fn unpublished_modules_are_instructor_only() {
        let modules = vec![module(1, 10, 1, true), module(2, 10, 2, false)];

        let student = build_tree(
            vec![phase(1, 1)],
            vec![section(10, 1, 1)],
            modules.clone(),
            Vec::new(),
            Role::Student,
        );
        let instructor = build_tree(
            vec![phase(1, 1)],
            vec![section(10, 1, 1)],
            modules,
            Vec::new(),
            Role::Instructor,
        );

        assert_eq!(module_ids(&student), vec![1]);
        assert_eq!(module_ids(&instructor), vec![1, 2]);
    }

    #[test]
    fn duplicate_progress_takes_the_first_record() {
        let mut second = done(1);
        second.is_completed = false;

        let tree = build_tree(
            vec![phase(1, 1)],
            vec![section(10, 1, 1)],
            vec![module(1, 10, 1, true), module(2, 10, 2, true)],
            vec![done(1), second],
            Role::Student,
        );

        let summary = summarize(&tree);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.percentage, 50.0);
    }

    #[test]
    fn adjacent_in_three_module_phase() {
        let flat = vec![nav(1), nav(2), nav(3)];

        let first = find_adjacent(&flat, 1);
        assert_eq!(first.prev, None);
        assert_eq!(first.next.map(|m| m.id), Some(2));

        let middle = find_adjacent(&flat, 2);
        assert_eq!(middle.prev.map(|m| m.id), Some(1));
        assert_eq!(middle.next.map(|m| m.id), Some(3));

        let last = find_adjacent(&flat, 3);
        assert_eq!(last.prev.map(|m| m.id), Some(2));
        assert_eq!(last.next, None);

        assert_eq!(find_adjacent(&flat, 42), Adjacent::default());
    }

    #[test]
    fn navigation_stays_inside_the_phase() {
        let tree = build_tree(
            vec![phase(1, 1), phase(2, 2)],
            vec![section(10, 1, 1), section(11, 1, 2), section(20, 2, 1)],
            vec![
                module(1, 10, 1, true),
                module(2, 11, 1, true),
                module(3, 20, 1, true),
            ],
            vec![done(1)],
            Role::Student,
        );

        let detail = module_detail(&tree, 2).unwrap();
        assert_eq!(detail.phase.id, 1);
        assert_eq!(detail.section.id, 11);
        assert_eq!(detail.prev.as_ref().map(|m| m.id), Some(1));
        assert!(detail.prev.unwrap().is_completed);
        assert_eq!(detail.next, None);
        assert_eq!(detail.outline.sections.len(), 2);

        let outline = phase_outline(&tree, 3).unwrap();
        assert_eq!(outline.phase_id, 2);
        assert_eq!(flatten_phase(&outline).len(), 1);
    }

    #[test]
    fn hidden_module_has_no_detail_for_students() {
        let tree = build_tree(
            vec![phase(1, 1)],
            vec![section(10, 1, 1)],
            vec![module(1, 10, 1, false)],
            Vec::new(),
            Role::Student,
        );

        assert!(module_detail(&tree, 1).is_none());
    }
}

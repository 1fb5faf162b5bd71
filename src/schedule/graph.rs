//! Dependency graph analysis.
//!
//! Edges point from a task to the tasks it depends on. Only edges between
//! tasks of the same project count; anything else is a dangling reference
//! that the propagation step ignores.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{CycleError, ReferentialWarning};
use crate::model::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Child tasks of `project`, in input order.
pub fn project_scope(tasks: &[Task], project: TaskId) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.parent_task == Some(project))
        .cloned()
        .collect()
}

/// The task list with `candidate` replacing the task of the same id, or
/// appended when it is new.
fn merge_candidate<'a>(tasks: &'a [Task], candidate: Option<&'a Task>) -> Vec<&'a Task> {
    let mut merged: Vec<&Task> = Vec::with_capacity(tasks.len() + 1);
    let mut replaced = false;
    for task in tasks {
        match candidate {
            Some(c) if c.id == task.id => {
                merged.push(c);
                replaced = true;
            }
            _ => merged.push(task),
        }
    }
    if let (Some(c), false) = (candidate, replaced) {
        merged.push(c);
    }
    merged
}

/// True when `task -> dep` is an edge the engine schedules: both sit in the
/// same project. Dependencies declared on projects never count.
fn is_scheduled_edge(parents: &HashMap<TaskId, Option<TaskId>>, task: &Task, dep: &TaskId) -> bool {
    task.parent_task.is_some() && parents.get(dep) == Some(&task.parent_task)
}

/// Task id -> ids it depends on, keeping only same-project edges.
fn adjacency(tasks: &[&Task]) -> HashMap<TaskId, Vec<TaskId>> {
    let parents: HashMap<TaskId, Option<TaskId>> =
        tasks.iter().map(|t| (t.id, t.parent_task)).collect();

    tasks
        .iter()
        .map(|task| {
            let deps = task
                .dependencies
                .iter()
                .filter(|dep| is_scheduled_edge(&parents, task, dep))
                .copied()
                .collect();
            (task.id, deps)
        })
        .collect()
}

/// Find a dependency cycle, returning the path that closes it
/// (`[a, b, a]` means `a` depends on `b` which depends on `a`).
///
/// When `candidate` is given it is merged into `tasks` first, so a
/// proposed edit can be checked before it is applied.
pub fn find_cycle(tasks: &[Task], candidate: Option<&Task>) -> Option<Vec<TaskId>> {
    let nodes = merge_candidate(tasks, candidate);
    let adjacency = adjacency(&nodes);
    let mut marks: HashMap<TaskId, Mark> = HashMap::with_capacity(nodes.len());

    for root in nodes.iter().map(|t| t.id) {
        if marks.contains_key(&root) {
            continue;
        }

        // (node, index of the next edge to follow)
        let mut stack: Vec<(TaskId, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::Visiting);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let edges = adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[]);

            let Some(&dep) = edges.get(frame.1) else {
                marks.insert(node, Mark::Visited);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks.get(&dep) {
                Some(Mark::Visiting) => {
                    let from = stack.iter().position(|(id, _)| *id == dep).unwrap_or(0);
                    let mut cycle: Vec<TaskId> = stack[from..].iter().map(|(id, _)| *id).collect();
                    cycle.push(dep);
                    return Some(cycle);
                }
                Some(Mark::Visited) => {}
                None => {
                    marks.insert(dep, Mark::Visiting);
                    stack.push((dep, 0));
                }
            }
        }
    }

    None
}

/// True when the dependency edges (plus `candidate`, if any) form a cycle.
pub fn detect_cycle(tasks: &[Task], candidate: Option<&Task>) -> bool {
    find_cycle(tasks, candidate).is_some()
}

/// Order `tasks` so every dependency comes before its dependents.
///
/// Dependencies that are not part of `tasks` are ignored.
pub fn topological_order(tasks: &[Task]) -> Result<Vec<&Task>, CycleError> {
    let index: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
    for task in tasks {
        graph.add_node(task.id);
    }
    for task in tasks {
        for dep in task.dependencies.iter().filter(|d| index.contains_key(*d)) {
            graph.add_edge(*dep, task.id, ());
        }
    }

    let order = toposort(&graph, None).map_err(|cycle| CycleError {
        task: cycle.node_id(),
    })?;

    Ok(order
        .into_iter()
        .filter_map(|id| index.get(&id).copied())
        .collect())
}

/// Every task that transitively depends on `id`, nearest first.
pub fn dependents_of(tasks: &[Task], id: TaskId) -> Vec<TaskId> {
    let nodes: Vec<&Task> = tasks.iter().collect();
    let mut reverse: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for (task, deps) in adjacency(&nodes) {
        for dep in deps {
            reverse.entry(dep).or_default().push(task);
        }
    }
    for list in reverse.values_mut() {
        list.sort();
    }

    let mut seen: HashSet<TaskId> = HashSet::from([id]);
    let mut queue: VecDeque<TaskId> = VecDeque::from([id]);
    let mut affected = Vec::new();

    while let Some(current) = queue.pop_front() {
        for next in reverse.get(&current).into_iter().flatten() {
            if seen.insert(*next) {
                affected.push(*next);
                queue.push_back(*next);
            }
        }
    }

    affected
}

/// Dependency ids that do not resolve to a task in the same project,
/// including any dependency declared on a project.
pub fn dangling_dependencies(tasks: &[Task]) -> Vec<ReferentialWarning> {
    let parents: HashMap<TaskId, Option<TaskId>> =
        tasks.iter().map(|t| (t.id, t.parent_task)).collect();

    let mut warnings = Vec::new();
    for task in tasks {
        for dep in &task.dependencies {
            if !is_scheduled_edge(&parents, task, dep) {
                warnings.push(ReferentialWarning {
                    task: task.id,
                    missing: *dep,
                });
            }
        }
    }
    warnings
}

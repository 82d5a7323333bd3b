//! Cycle-safe traversal of nested state machines.

use std::collections::HashSet;

use tracing::trace;

use crate::model::{AssetObject, ObjectArena, ObjectId};

struct Frame {
    states: Vec<ObjectId>,
    children: Vec<ObjectId>,
    next_state: usize,
    next_child: usize,
}

/// Lazily yields every distinct state reachable from a root state machine.
///
/// Depth-first: a machine's states come before its child machines, siblings in
/// declared order. Each machine is entered at most once, so self-referential
/// and diamond-shaped graphs terminate. Empty, dangling and mistyped slots are
/// skipped.
pub struct StateWalker<'a> {
    arena: &'a ObjectArena,
    stack: Vec<Frame>,
    visited_machines: HashSet<ObjectId>,
    seen_states: HashSet<ObjectId>,
}

impl<'a> StateWalker<'a> {
    pub fn new(arena: &'a ObjectArena, root: ObjectId) -> Self {
        let mut walker = Self {
            arena,
            stack: Vec::new(),
            visited_machines: HashSet::new(),
            seen_states: HashSet::new(),
        };
        walker.enter(root);
        walker
    }

    fn enter(&mut self, machine: ObjectId) {
        if !self.visited_machines.insert(machine) {
            return;
        }
        let Some(AssetObject::StateMachine(sm)) = self.arena.get(machine) else {
            trace!(%machine, "skipping state machine slot that holds no state machine");
            return;
        };
        if sm.states.iter().any(|child| child.state.is_none()) {
            trace!(machine = %sm.name, "skipping empty state slot");
        }
        self.stack.push(Frame {
            states: sm.state_ids().collect(),
            children: sm.child_machine_ids().collect(),
            next_state: 0,
            next_child: 0,
        });
    }

    fn is_state(&self, id: ObjectId) -> bool {
        matches!(self.arena.get(id), Some(AssetObject::State(_)))
    }
}

impl Iterator for StateWalker<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.next_state < frame.states.len() {
                let state = frame.states[frame.next_state];
                frame.next_state += 1;
                if self.is_state(state) && self.seen_states.insert(state) {
                    return Some(state);
                }
                continue;
            }
            if frame.next_child < frame.children.len() {
                let child = frame.children[frame.next_child];
                frame.next_child += 1;
                self.enter(child);
                continue;
            }
            self.stack.pop();
        }
    }
}

/// Walks every state reachable from `root`.
pub fn walk_states(arena: &ObjectArena, root: ObjectId) -> StateWalker<'_> {
    StateWalker::new(arena, root)
}

/// Returns every state machine reachable from `root`, root first, each once.
pub fn walk_state_machines(arena: &ObjectArena, root: ObjectId) -> Vec<ObjectId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root];

    while let Some(machine) = stack.pop() {
        if !visited.insert(machine) {
            continue;
        }
        let Some(AssetObject::StateMachine(sm)) = arena.get(machine) else {
            continue;
        };
        order.push(machine);
        let children: Vec<ObjectId> = sm.child_machine_ids().collect();
        stack.extend(children.into_iter().rev());
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnimationClip, AnimatorState, ChildState, ChildStateMachine, StateMachine};

    fn machine_with_states(arena: &mut ObjectArena, name: &str, states: &[&str]) -> (ObjectId, Vec<ObjectId>) {
        let machine = arena.insert(StateMachine::new(name));
        let ids = states
            .iter()
            .map(|state| arena.add_state(machine, AnimatorState::new(*state), [0.0; 3]).unwrap())
            .collect();
        (machine, ids)
    }

    fn nest(arena: &mut ObjectArena, parent: ObjectId, child: ObjectId) {
        arena
            .state_machine_mut(parent)
            .unwrap()
            .state_machines
            .push(ChildStateMachine {
                state_machine: Some(child),
                position: [0.0; 3],
            });
    }

    #[test]
    fn test_states_before_children_in_declared_order() {
        let mut arena = ObjectArena::new();
        let (root, root_states) = machine_with_states(&mut arena, "Root", &["A", "B"]);
        let (left, left_states) = machine_with_states(&mut arena, "Left", &["C"]);
        let (right, right_states) = machine_with_states(&mut arena, "Right", &["D"]);
        let (deep, deep_states) = machine_with_states(&mut arena, "Deep", &["E"]);
        nest(&mut arena, root, left);
        nest(&mut arena, root, right);
        nest(&mut arena, left, deep);

        let walked: Vec<_> = walk_states(&arena, root).collect();
        let expected = [root_states, left_states, deep_states, right_states].concat();
        assert_eq!(walked, expected);
        assert_eq!(walk_state_machines(&arena, root), vec![root, left, deep, right]);
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut arena = ObjectArena::new();
        let (root, states) = machine_with_states(&mut arena, "Root", &["A"]);
        nest(&mut arena, root, root);

        let walked: Vec<_> = walk_states(&arena, root).collect();
        assert_eq!(walked, states);
    }

    #[test]
    fn test_diamond_visits_shared_machine_once() {
        let mut arena = ObjectArena::new();
        let (root, _) = machine_with_states(&mut arena, "Root", &[]);
        let (left, _) = machine_with_states(&mut arena, "Left", &[]);
        let (right, _) = machine_with_states(&mut arena, "Right", &[]);
        let (shared, shared_states) = machine_with_states(&mut arena, "Shared", &["S"]);
        nest(&mut arena, root, left);
        nest(&mut arena, root, right);
        nest(&mut arena, left, shared);
        nest(&mut arena, right, shared);

        let walked: Vec<_> = walk_states(&arena, root).collect();
        assert_eq!(walked, shared_states);
        assert_eq!(walk_state_machines(&arena, root).len(), 4);
    }

    #[test]
    fn test_skips_empty_dangling_and_mistyped_slots() {
        let mut arena = ObjectArena::new();
        let (root, states) = machine_with_states(&mut arena, "Root", &["A"]);
        let clip = arena.insert(AnimationClip::new("NotAState"));
        let sm = arena.state_machine_mut(root).unwrap();
        for slot in [None, Some(ObjectId(99)), Some(clip), Some(states[0])] {
            sm.states.push(ChildState {
                state: slot,
                position: [0.0; 3],
            });
        }

        let walked: Vec<_> = walk_states(&arena, root).collect();
        assert_eq!(walked, states);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_corrupt_slots_stay_below_warn() {
        let mut arena = ObjectArena::new();
        let (root, states) = machine_with_states(&mut arena, "Root", &["A"]);
        let sm = arena.state_machine_mut(root).unwrap();
        sm.states.push(ChildState {
            state: None,
            position: [0.0; 3],
        });
        sm.state_machines.push(ChildStateMachine {
            state_machine: Some(states[0]),
            position: [0.0; 3],
        });

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let walked: Vec<_> = tracing::subscriber::with_default(subscriber, || {
            (0..3).flat_map(|_| walk_states(&arena, root)).collect()
        });

        assert_eq!(walked, vec![states[0]; 3]);
        assert!(captured.0.lock().unwrap().is_empty());
    }
}

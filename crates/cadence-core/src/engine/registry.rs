use super::backend::Backend;
use super::observer::{Observer, Role};
use super::scheduler::Scheduler;
use slotmap::{SlotMap, new_key_type};
use tracing::debug;

new_key_type! {
    /// Handle identifying a live registration in a [`CallbackRegistry`].
    pub struct CallbackId;
}

/// A registered observer together with its schedule and role.
pub struct Registration<B: Backend> {
    pub label: String,
    pub role: Role,
    pub scheduler: Scheduler,
    pub observer: Box<dyn Observer<B>>,
}

/// Holds observer registrations and maintains the global notification order.
///
/// Invariant: every `Ordinary` registration precedes every `Targeter`, and
/// insertion order is preserved within each role group, regardless of how
/// registrations and removals interleave.
pub struct CallbackRegistry<B: Backend> {
    entries: SlotMap<CallbackId, Registration<B>>,
    order: Vec<CallbackId>,
}

impl<B: Backend + 'static> Default for CallbackRegistry<B> {
    fn default() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl<B: Backend + 'static> CallbackRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer, replacing any live registration with the same
    /// label. Replacement re-evaluates the position in the notification
    /// order.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        role: Role,
        scheduler: impl Into<Scheduler>,
        observer: Box<dyn Observer<B>>,
    ) -> CallbackId {
        let label = label.into();
        if let Some(existing) = self
            .order
            .iter()
            .copied()
            .find(|&id| self.entries[id].label == label)
        {
            debug!(label = %label, "replacing existing registration");
            self.remove(existing);
        }

        let id = self.entries.insert(Registration {
            label,
            role,
            scheduler: scheduler.into(),
            observer,
        });
        match role {
            Role::Targeter => self.order.push(id),
            Role::Ordinary => {
                // Keep targeters last: a new ordinary observer slots in just
                // before the first targeter.
                let position = self
                    .order
                    .iter()
                    .position(|&other| self.entries[other].role == Role::Targeter)
                    .unwrap_or(self.order.len());
                self.order.insert(position, id);
            }
        }
        id
    }

    /// Removes a registration; a stale handle is logged and ignored.
    pub fn remove(&mut self, id: CallbackId) {
        if self.entries.remove(id).is_some() {
            self.order.retain(|&other| other != id);
        } else {
            debug!(?id, "attempt to remove inexistent callback (dont worry)");
        }
    }

    pub fn get(&self, id: CallbackId) -> Option<&Registration<B>> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: CallbackId) -> Option<&mut Registration<B>> {
        self.entries.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registration handles in notification order.
    pub fn ids(&self) -> Vec<CallbackId> {
        self.order.clone()
    }

    /// Handles of targeter registrations, in notification order.
    pub fn targeter_ids(&self) -> Vec<CallbackId> {
        self.ids_with(|reg| reg.role == Role::Targeter)
    }

    /// Handles of ordinary registrations, in notification order.
    pub fn ordinary_ids(&self) -> Vec<CallbackId> {
        self.ids_with(|reg| reg.role == Role::Ordinary)
    }

    /// Handles of observers that may be re-notified on resume.
    pub fn rate_reporter_ids(&self) -> Vec<CallbackId> {
        self.ids_with(|reg| reg.observer.rate_reporter())
    }

    fn ids_with(&self, predicate: impl Fn(&Registration<B>) -> bool) -> Vec<CallbackId> {
        self.order
            .iter()
            .copied()
            .filter(|&id| predicate(&self.entries[id]))
            .collect()
    }

    /// Iterates registrations in notification order.
    pub fn iter(&self) -> impl Iterator<Item = (CallbackId, &Registration<B>)> {
        self.order.iter().map(move |&id| (id, &self.entries[id]))
    }

    /// Visits every registration mutably, in notification order.
    pub fn for_each_mut(&mut self, mut visit: impl FnMut(&mut Registration<B>)) {
        let ids = self.order.clone();
        for id in ids {
            if let Some(reg) = self.entries.get_mut(id) {
                visit(reg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::dryrun::DryRunBackend;
    use crate::engine::context::RunContext;
    use crate::engine::error::EngineError;
    use crate::engine::observer::Control;

    struct NullObserver;

    impl Observer<DryRunBackend> for NullObserver {
        fn notify(
            &mut self,
            _run: &mut RunContext<'_, DryRunBackend>,
        ) -> Result<Control, EngineError> {
            Ok(Control::Continue)
        }
    }

    fn null() -> Box<dyn Observer<DryRunBackend>> {
        Box::new(NullObserver)
    }

    fn labels(registry: &CallbackRegistry<DryRunBackend>) -> Vec<String> {
        registry
            .iter()
            .map(|(_, reg)| reg.label.clone())
            .collect()
    }

    #[test]
    fn ordinary_precede_targeters() {
        let mut registry = CallbackRegistry::new();
        registry.add("t1", Role::Targeter, 10u64, null());
        registry.add("w1", Role::Ordinary, 10u64, null());
        registry.add("t2", Role::Targeter, 10u64, null());
        registry.add("w2", Role::Ordinary, 10u64, null());
        assert_eq!(labels(&registry), ["w1", "w2", "t1", "t2"]);
    }

    #[test]
    fn replacement_keeps_a_single_entry() {
        let mut registry = CallbackRegistry::new();
        registry.add("w1", Role::Ordinary, 10u64, null());
        registry.add("w2", Role::Ordinary, 10u64, null());
        let replaced = registry.add("w1", Role::Ordinary, 25u64, null());
        assert_eq!(registry.len(), 2);
        assert_eq!(labels(&registry), ["w2", "w1"]);
        assert_eq!(
            registry.get(replaced).unwrap().scheduler.interval(),
            Some(25)
        );
    }

    #[test]
    fn stale_handle_removal_is_a_no_op() {
        let mut registry = CallbackRegistry::new();
        let id = registry.add("w1", Role::Ordinary, 10u64, null());
        registry.remove(id);
        registry.remove(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn role_filtered_views_keep_order() {
        let mut registry = CallbackRegistry::new();
        registry.add("w1", Role::Ordinary, 10u64, null());
        registry.add("t1", Role::Targeter, 10u64, null());
        registry.add("w2", Role::Ordinary, 10u64, null());
        assert_eq!(registry.ordinary_ids().len(), 2);
        assert_eq!(registry.targeter_ids().len(), 1);
        let all = registry.ids();
        assert_eq!(all.len(), 3);
        assert_eq!(registry.get(all[2]).unwrap().label, "t1");
    }

    mod ordering_property {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add { label: u8, targeter: bool },
            Remove { label: u8 },
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..8, any::<bool>())
                    .prop_map(|(label, targeter)| Op::Add { label, targeter }),
                (0u8..8).prop_map(|label| Op::Remove { label }),
            ]
        }

        proptest! {
            #[test]
            fn order_invariant_under_interleaving(ops in prop::collection::vec(op_strategy(), 0..40)) {
                let mut registry: CallbackRegistry<DryRunBackend> = CallbackRegistry::new();
                // Model: two insertion-ordered lists, one per role.
                let mut model_ordinary: Vec<String> = Vec::new();
                let mut model_targeters: Vec<String> = Vec::new();

                for op in ops {
                    match op {
                        Op::Add { label, targeter } => {
                            let label = format!("cb{}", label);
                            model_ordinary.retain(|l| *l != label);
                            model_targeters.retain(|l| *l != label);
                            if targeter {
                                registry.add(label.clone(), Role::Targeter, 10u64, null());
                                model_targeters.push(label);
                            } else {
                                registry.add(label.clone(), Role::Ordinary, 10u64, null());
                                model_ordinary.push(label);
                            }
                        }
                        Op::Remove { label } => {
                            let label = format!("cb{}", label);
                            let id = registry
                                .iter()
                                .find(|(_, reg)| reg.label == label)
                                .map(|(id, _)| id);
                            if let Some(id) = id {
                                registry.remove(id);
                            }
                            model_ordinary.retain(|l| *l != label);
                            model_targeters.retain(|l| *l != label);
                        }
                    }

                    let expected: Vec<String> = model_ordinary
                        .iter()
                        .chain(model_targeters.iter())
                        .cloned()
                        .collect();
                    prop_assert_eq!(labels(&registry), expected);
                }
            }
        }
    }
}

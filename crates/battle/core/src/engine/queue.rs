//! Ordered queue of pending states.
//!
//! The front slot is the active state. A slot may hold the end-turn marker
//! instead of a state. While a state thinks it is taken out of its slot, so
//! the slot keeps the metadata other queries need (kind, actor, casualty).

use std::collections::VecDeque;

use crate::state::UnitId;
use crate::states::{BattleState, StateKind};

pub(crate) type SlotId = u64;

pub(crate) enum Entry {
    State(Option<Box<dyn BattleState>>),
    EndTurn,
}

pub(crate) struct Slot {
    pub(crate) id: SlotId,
    pub(crate) entry: Entry,
    pub(crate) kind: Option<StateKind>,
    pub(crate) actor: Option<UnitId>,
    pub(crate) casualty: Option<UnitId>,
    /// Reset whenever the slot reaches the front again.
    pub(crate) initialized: bool,
    /// Set once the state thought at least once.
    pub(crate) started: bool,
}

impl Slot {
    pub(crate) fn is_end_turn(&self) -> bool {
        matches!(self.entry, Entry::EndTurn)
    }

    pub(crate) fn state(&self) -> Option<&dyn BattleState> {
        match &self.entry {
            Entry::State(state) => state.as_deref(),
            Entry::EndTurn => None,
        }
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut Box<dyn BattleState>> {
        match &mut self.entry {
            Entry::State(state) => state.as_mut(),
            Entry::EndTurn => None,
        }
    }
}

/// Read-only view of one queued slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedState {
    /// `None` for the end-turn marker.
    pub kind: Option<StateKind>,
    pub actor: Option<UnitId>,
    pub casualty: Option<UnitId>,
}

#[derive(Default)]
pub(crate) struct StateQueue {
    slots: VecDeque<Slot>,
    next_id: SlotId,
}

impl StateQueue {
    fn make_slot(&mut self, state: Option<Box<dyn BattleState>>) -> Slot {
        let id = self.next_id;
        self.next_id += 1;
        match state {
            Some(state) => Slot {
                id,
                kind: Some(state.kind()),
                actor: state.action().and_then(|action| action.actor),
                casualty: state.casualty(),
                entry: Entry::State(Some(state)),
                initialized: false,
                started: false,
            },
            None => Slot {
                id,
                entry: Entry::EndTurn,
                kind: None,
                actor: None,
                casualty: None,
                initialized: false,
                started: false,
            },
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn push_front(&mut self, state: Box<dyn BattleState>) -> SlotId {
        let slot = self.make_slot(Some(state));
        let id = slot.id;
        self.slots.push_front(slot);
        id
    }

    /// Second position, or the front of an empty queue.
    pub(crate) fn insert_next(&mut self, state: Box<dyn BattleState>) -> SlotId {
        let slot = self.make_slot(Some(state));
        let id = slot.id;
        let index = self.slots.len().min(1);
        self.slots.insert(index, slot);
        id
    }

    /// Inserts after the front keeping the given order.
    pub(crate) fn insert_next_batch(&mut self, states: Vec<Box<dyn BattleState>>) {
        let mut index = self.slots.len().min(1);
        for state in states {
            let slot = self.make_slot(Some(state));
            self.slots.insert(index, slot);
            index += 1;
        }
    }

    pub(crate) fn push_back(&mut self, state: Box<dyn BattleState>) -> SlotId {
        let slot = self.make_slot(Some(state));
        let id = slot.id;
        self.slots.push_back(slot);
        id
    }

    pub(crate) fn push_back_end_turn(&mut self) {
        let slot = self.make_slot(None);
        self.slots.push_back(slot);
    }

    pub(crate) fn front(&self) -> Option<&Slot> {
        self.slots.front()
    }

    pub(crate) fn front_mut(&mut self) -> Option<&mut Slot> {
        self.slots.front_mut()
    }

    pub(crate) fn front_is_end_turn(&self) -> bool {
        self.slots.front().is_some_and(Slot::is_end_turn)
    }

    pub(crate) fn pop_front(&mut self) -> Option<Slot> {
        self.slots.pop_front()
    }

    pub(crate) fn contains(&self, id: SlotId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    pub(crate) fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    pub(crate) fn remove(&mut self, id: SlotId) -> Option<Slot> {
        let index = self.slots.iter().position(|slot| slot.id == id)?;
        self.slots.remove(index)
    }

    /// Keeps the front and every other slot the predicate accepts.
    pub(crate) fn retain_after_front(&mut self, mut keep: impl FnMut(&Slot) -> bool) {
        let mut index = 0;
        self.slots.retain(|slot| {
            let first = index == 0;
            index += 1;
            first || keep(slot)
        });
    }

    /// Takes the state out of its slot for the duration of a call.
    pub(crate) fn take(&mut self, id: SlotId) -> Option<Box<dyn BattleState>> {
        match &mut self.slot_mut(id)?.entry {
            Entry::State(state) => state.take(),
            Entry::EndTurn => None,
        }
    }

    /// Puts a taken state back. Hands the state back when its slot was
    /// removed in the meantime.
    pub(crate) fn restore(
        &mut self,
        id: SlotId,
        state: Box<dyn BattleState>,
    ) -> Result<(), Box<dyn BattleState>> {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.entry = Entry::State(Some(state));
                Ok(())
            }
            None => Err(state),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub(crate) fn snapshot(&self) -> Vec<QueuedState> {
        self.slots
            .iter()
            .map(|slot| QueuedState {
                kind: slot.kind,
                actor: slot.actor,
                casualty: slot.casualty,
            })
            .collect()
    }
}

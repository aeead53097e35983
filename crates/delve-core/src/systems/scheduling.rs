//! Turn scheduler - decides whose turn comes next.
//!
//! Each registered actor has one entry keyed by its next activation time.
//! The earliest entry acts first; equal times resolve by the sequence number
//! assigned when the entry was (re)inserted, so the same sequence of adds
//! always produces the same turn order. Fully synchronous and pull-based.
//!
//! The scheduler only indexes actors; the registry owns their data. Callers
//! must pair add/remove with the registry (see [`crate::dungeon::DungeonMap`]).

use std::collections::{BTreeMap, HashMap};

use crate::registry::ActorId;

/// (activation time, insertion sequence)
type Slot = (u64, u64);

/// One actor's place in the turn order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub actor: ActorId,
    /// Turn cost added to the activation time after each turn
    pub speed: u64,
    pub next_activation: u64,
}

#[derive(Debug, Default)]
pub struct TurnScheduler {
    /// Time of the most recently started turn
    time: u64,
    next_seq: u64,
    queue: BTreeMap<Slot, ActorId>,
    entries: HashMap<ActorId, (Slot, u64)>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an actor first activating at `now + speed`. Returns `false`
    /// and changes nothing if the actor is already scheduled.
    pub fn add(&mut self, actor: ActorId, speed: u32) -> bool {
        if self.entries.contains_key(&actor) {
            log::warn!("Scheduler: ignoring duplicate add for {:?}", actor);
            return false;
        }
        let speed = u64::from(speed.max(1));
        self.insert(actor, self.time + speed, speed);
        true
    }

    /// Drop an actor's entry. Returns `false` if it was not scheduled.
    pub fn remove(&mut self, actor: ActorId) -> bool {
        match self.entries.remove(&actor) {
            Some((slot, _)) => {
                self.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Forget every entry and reset the clock
    pub fn clear(&mut self) {
        self.queue.clear();
        self.entries.clear();
        self.time = 0;
        self.next_seq = 0;
    }

    /// The actor with the earliest activation time
    pub fn next_actor(&self) -> Option<ActorId> {
        self.queue.values().next().copied()
    }

    /// Finish `actor`'s turn: the clock moves to its activation time and its
    /// entry is rescheduled one turn cost later. Returns `false` for an
    /// unscheduled actor.
    pub fn advance(&mut self, actor: ActorId) -> bool {
        let Some((slot, speed)) = self.entries.remove(&actor) else {
            return false;
        };
        self.queue.remove(&slot);
        self.time = self.time.max(slot.0);
        self.insert(actor, slot.0 + speed, speed);
        log::debug!("Scheduler: {:?} acted at t={}, next at t={}", actor, slot.0, slot.0 + speed);
        true
    }

    pub fn entry(&self, actor: ActorId) -> Option<ScheduleEntry> {
        self.entries.get(&actor).map(|&((next_activation, _), speed)| ScheduleEntry {
            actor,
            speed,
            next_activation,
        })
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.entries.contains_key(&actor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    fn insert(&mut self, actor: ActorId, at: u64, speed: u64) {
        let slot = (at, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(slot, actor);
        self.entries.insert(actor, (slot, speed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    fn actors(n: usize) -> Vec<ActorId> {
        let world = World::new();
        (0..n).map(|_| world.reserve_entity()).collect()
    }

    /// Pull `turns` actors, advancing each after it "acts"
    fn run(scheduler: &mut TurnScheduler, turns: usize) -> Vec<ActorId> {
        let mut order = Vec::with_capacity(turns);
        for _ in 0..turns {
            let next = scheduler.next_actor().unwrap();
            order.push(next);
            scheduler.advance(next);
        }
        order
    }

    #[test]
    fn test_equal_speed_alternates() {
        let ids = actors(2);
        let (a, b) = (ids[0], ids[1]);
        let mut scheduler = TurnScheduler::new();
        scheduler.add(a, 1);
        scheduler.add(b, 1);

        assert_eq!(run(&mut scheduler, 6), vec![a, b, a, b, a, b]);
    }

    #[test]
    fn test_faster_actor_acts_more_often() {
        let ids = actors(2);
        let (fast, slow) = (ids[0], ids[1]);
        let mut scheduler = TurnScheduler::new();
        scheduler.add(slow, 20);
        scheduler.add(fast, 10);

        let order = run(&mut scheduler, 6);
        let fast_turns = order.iter().filter(|&&id| id == fast).count();
        assert_eq!(fast_turns, 4);
        assert_eq!(order[0], fast);
    }

    #[test]
    fn test_ties_follow_insertion_order() {
        let ids = actors(3);
        let mut scheduler = TurnScheduler::new();
        for &id in &ids {
            scheduler.add(id, 5);
        }
        assert_eq!(run(&mut scheduler, 3), ids);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let ids = actors(1);
        let mut scheduler = TurnScheduler::new();
        assert!(scheduler.add(ids[0], 3));
        assert!(!scheduler.add(ids[0], 1));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.entry(ids[0]).unwrap().speed, 3);
    }

    #[test]
    fn test_removed_actor_never_returned() {
        let ids = actors(3);
        let mut scheduler = TurnScheduler::new();
        for &id in &ids {
            scheduler.add(id, 1);
        }
        run(&mut scheduler, 1);
        assert!(scheduler.remove(ids[1]));
        assert!(!scheduler.remove(ids[1]));

        let order = run(&mut scheduler, 6);
        assert!(!order.contains(&ids[1]));
        assert_eq!(order, vec![ids[2], ids[0], ids[2], ids[0], ids[2], ids[0]]);
    }

    #[test]
    fn test_late_add_starts_from_current_time() {
        let ids = actors(2);
        let mut scheduler = TurnScheduler::new();
        scheduler.add(ids[0], 10);
        run(&mut scheduler, 3);
        assert_eq!(scheduler.time(), 30);

        scheduler.add(ids[1], 10);
        assert_eq!(scheduler.entry(ids[1]).unwrap().next_activation, 40);
        // ids[0] was rescheduled to 40 first, so it keeps the tie
        assert_eq!(run(&mut scheduler, 2), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_clear_empties_everything() {
        let ids = actors(2);
        let mut scheduler = TurnScheduler::new();
        scheduler.add(ids[0], 1);
        scheduler.add(ids[1], 1);
        run(&mut scheduler, 2);

        scheduler.clear();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.next_actor(), None);
        assert_eq!(scheduler.time(), 0);
        assert!(!scheduler.advance(ids[0]));
    }
}

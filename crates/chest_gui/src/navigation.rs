//! Browser-style back/forward history for one player in one navigation
//! context.
//!
//! The system only stores and de-duplicates. Deciding when a container change
//! should be recorded is up to the session manager, which uses [`flag`] to
//! tell its own history moves apart from ordinary opens.
//!
//! [`flag`]: NavigationSystem::is_flagged

use crate::container::ContainerHandle;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct NavigationSystem {
    back: VecDeque<ContainerHandle>,
    forward: VecDeque<ContainerHandle>,
    recent: Option<ContainerHandle>,
    flag: bool,
    capacity: usize,
}

impl NavigationSystem {
    /// Creates an empty history keeping at most `capacity` entries per
    /// direction. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            back: VecDeque::new(),
            forward: VecDeque::new(),
            recent: None,
            flag: false,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn has_back(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn has_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Nearest back entry without removing it.
    pub fn get_back(&self) -> Option<&ContainerHandle> {
        self.back.back()
    }

    pub fn get_forward(&self) -> Option<&ContainerHandle> {
        self.forward.back()
    }

    pub fn remove_back(&mut self) -> Option<ContainerHandle> {
        self.back.pop_back()
    }

    pub fn remove_forward(&mut self) -> Option<ContainerHandle> {
        self.forward.pop_back()
    }

    /// Pushes onto the back stack. Returns `false` if `handle` already is the
    /// head.
    pub fn add_back(&mut self, handle: ContainerHandle) -> bool {
        Self::push(&mut self.back, handle, self.capacity)
    }

    pub fn add_forward(&mut self, handle: ContainerHandle) -> bool {
        Self::push(&mut self.forward, handle, self.capacity)
    }

    pub fn reset_back(&mut self) {
        self.back.clear();
    }

    pub fn reset_forward(&mut self) {
        self.forward.clear();
    }

    pub fn back_len(&self) -> usize {
        self.back.len()
    }

    pub fn forward_len(&self) -> usize {
        self.forward.len()
    }

    /// Back entries, oldest first.
    pub fn back_entries(&self) -> impl Iterator<Item = &ContainerHandle> {
        self.back.iter()
    }

    pub fn forward_entries(&self) -> impl Iterator<Item = &ContainerHandle> {
        self.forward.iter()
    }

    /// Container most recently shown in this context.
    pub fn recent(&self) -> Option<&ContainerHandle> {
        self.recent.as_ref()
    }

    pub fn set_recent(&mut self, handle: Option<ContainerHandle>) {
        self.recent = handle;
    }

    /// Whether the last container change was a history move.
    pub fn is_flagged(&self) -> bool {
        self.flag
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.flag = flag;
    }

    fn push(stack: &mut VecDeque<ContainerHandle>, handle: ContainerHandle, capacity: usize) -> bool {
        if stack.back() == Some(&handle) {
            return false;
        }
        stack.push_back(handle);
        while stack.len() > capacity {
            stack.pop_front();
        }
        true
    }
}

impl Default for NavigationSystem {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_HISTORY)
    }
}

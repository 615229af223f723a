// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Outside-click tracking for popover panels.
//!
//! A panel that wants to close on a click elsewhere subscribes while it is
//! open. The returned guard unsubscribes when dropped, so closing the panel
//! or dropping its owner releases the listener.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

/// Screen-space rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        let right = u32::from(self.x) + u32::from(self.width);
        let bottom = u32::from(self.y) + u32::from(self.height);
        column >= self.x
            && u32::from(column) < right
            && row >= self.y
            && u32::from(row) < bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: BTreeMap<u64, Option<Bounds>>,
}

#[derive(Debug, Clone, Default)]
pub struct PointerBus {
    registry: Rc<RefCell<Registry>>,
}

impl PointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> PointerSubscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id = registry.next_id.wrapping_add(1);
        let id = registry.next_id;
        registry.listeners.insert(id, None);
        PointerSubscription {
            id: ListenerId(id),
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Report a pointer press and return the listeners it landed outside of.
    /// Listeners whose bounds were never laid out are skipped.
    pub fn dispatch(&self, column: u16, row: u16) -> Vec<ListenerId> {
        self.registry
            .borrow()
            .listeners
            .iter()
            .filter_map(|(id, bounds)| {
                let bounds = (*bounds)?;
                (!bounds.contains(column, row)).then_some(ListenerId(*id))
            })
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

#[derive(Debug)]
pub struct PointerSubscription {
    id: ListenerId,
    registry: Weak<RefCell<Registry>>,
}

impl PointerSubscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        if let Some(registry) = self.registry.upgrade()
            && let Some(slot) = registry.borrow_mut().listeners.get_mut(&self.id.0)
        {
            *slot = Some(bounds);
        }
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.remove(&self.id.0);
        }
    }
}

/// Open/closed flag plus the subscription that exists only while open.
#[derive(Debug, Default)]
pub struct Popover {
    subscription: Option<PointerSubscription>,
}

impl Popover {
    pub fn is_open(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn open(&mut self, bus: &PointerBus) {
        if self.subscription.is_none() {
            self.subscription = Some(bus.subscribe());
        }
    }

    pub fn close(&mut self) {
        self.subscription = None;
    }

    pub fn toggle(&mut self, bus: &PointerBus) {
        if self.is_open() {
            self.close();
        } else {
            self.open(bus);
        }
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        if let Some(subscription) = &self.subscription {
            subscription.set_bounds(bounds);
        }
    }

    /// Close if one of `outside` is this popover's listener. Returns whether
    /// it closed.
    pub fn dismiss_if_outside(&mut self, outside: &[ListenerId]) -> bool {
        let hit = self
            .subscription
            .as_ref()
            .is_some_and(|subscription| outside.contains(&subscription.id()));
        if hit {
            self.close();
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, PointerBus, Popover};

    #[test]
    fn bounds_contain_only_interior_cells() {
        let bounds = Bounds::new(2, 3, 4, 2);
        assert!(bounds.contains(2, 3));
        assert!(bounds.contains(5, 4));
        assert!(!bounds.contains(6, 4));
        assert!(!bounds.contains(2, 5));
        assert!(!bounds.contains(1, 3));
    }

    #[test]
    fn popover_subscribes_only_while_open() {
        let bus = PointerBus::new();
        let mut popover = Popover::default();
        assert_eq!(bus.listener_count(), 0);

        popover.open(&bus);
        popover.open(&bus);
        assert_eq!(bus.listener_count(), 1);

        popover.close();
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn dropping_owner_releases_listener() {
        let bus = PointerBus::new();
        {
            let mut popover = Popover::default();
            popover.open(&bus);
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn click_outside_closes_and_click_inside_keeps_open() {
        let bus = PointerBus::new();
        let mut popover = Popover::default();
        popover.open(&bus);
        popover.set_bounds(Bounds::new(10, 10, 5, 5));

        let inside = bus.dispatch(12, 12);
        assert!(!popover.dismiss_if_outside(&inside));
        assert!(popover.is_open());

        let outside = bus.dispatch(0, 0);
        assert!(popover.dismiss_if_outside(&outside));
        assert!(!popover.is_open());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn unlaid_out_listeners_ignore_clicks() {
        let bus = PointerBus::new();
        let mut popover = Popover::default();
        popover.open(&bus);
        assert!(bus.dispatch(0, 0).is_empty());
    }

    #[test]
    fn two_popovers_are_dismissed_independently() {
        let bus = PointerBus::new();
        let mut left = Popover::default();
        let mut right = Popover::default();
        left.open(&bus);
        right.open(&bus);
        left.set_bounds(Bounds::new(0, 0, 10, 10));
        right.set_bounds(Bounds::new(20, 0, 10, 10));

        let outside = bus.dispatch(5, 5);
        assert!(!left.dismiss_if_outside(&outside));
        assert!(right.dismiss_if_outside(&outside));
        assert!(left.is_open());
        assert_eq!(bus.listener_count(), 1);
    }
}

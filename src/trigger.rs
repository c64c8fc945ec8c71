use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback = Box<dyn FnMut()>;

struct Inner {
    subscribers: Vec<(u64, Callback)>,
    next_id: u64,
    intersecting: bool,
    attached: bool,
    // Ids unsubscribed while their callbacks were checked out for
    // dispatch; pruned when dispatch finishes.
    dead: Vec<u64>,
}

/// Watches a sentinel position at the end of the rendered list and tells
/// subscribers when it scrolls into view. Deliberately knows nothing
/// about the rendering runtime: whatever drives the screen reports
/// visibility through `set_intersecting`, and subscribers react.
///
/// Fires exactly once per not-intersecting -> intersecting transition,
/// and only while attached. The feed detaches it once the result set is
/// exhausted so a dangling sentinel cannot keep requesting pages.
#[derive(Clone)]
pub struct ViewportTrigger {
    inner: Rc<RefCell<Inner>>,
}

/// Handle returned by `subscribe`. Dropping it (or calling
/// `unsubscribe`) removes the callback.
pub struct Subscription {
    inner: Weak<RefCell<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.borrow_mut();
            let before = inner.subscribers.len();
            let id = self.id;
            inner.subscribers.retain(|(sub_id, _)| *sub_id != id);
            if inner.subscribers.len() == before {
                inner.dead.push(id);
            }
        }
    }
}

impl ViewportTrigger {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                subscribers: Vec::new(),
                next_id: 0,
                intersecting: false,
                attached: true,
                dead: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, callback: impl FnMut() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        Subscription {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Reports the sentinel's current visibility. Only the rising edge
    /// notifies subscribers; staying visible does not re-fire.
    pub fn set_intersecting(&self, intersecting: bool) {
        let fire = {
            let mut inner = self.inner.borrow_mut();
            let rising = intersecting && !inner.intersecting;
            inner.intersecting = intersecting;
            rising && inner.attached
        };
        if !fire {
            return;
        }

        // Callbacks are checked out so they may re-enter the trigger
        // (subscribe, detach) without hitting the RefCell.
        let mut checked_out = std::mem::take(&mut self.inner.borrow_mut().subscribers);
        for (_, callback) in checked_out.iter_mut() {
            callback();
        }
        let mut inner = self.inner.borrow_mut();
        let added_during_dispatch = std::mem::take(&mut inner.subscribers);
        inner.subscribers = checked_out;
        inner.subscribers.extend(added_during_dispatch);
        let dead = std::mem::take(&mut inner.dead);
        inner.subscribers.retain(|(id, _)| !dead.contains(id));
    }

    /// Stops observation; subsequent visibility reports are ignored.
    pub fn detach(&self) {
        self.inner.borrow_mut().attached = false;
    }

    /// Re-arms observation after a reset made more pages available.
    pub fn attach(&self) {
        self.inner.borrow_mut().attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().attached
    }
}

impl Default for ViewportTrigger {
    fn default() -> Self {
        Self::new()
    }
}

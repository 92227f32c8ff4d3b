use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// Representing the instance of a Window, the half-open span [open, close).
//
// Identity is structural: two instances with the same bounds are the same
// window no matter what their trigger flag says, so a freshly built lookup
// finds the instance stored in the active window map.
#[derive(Debug, Clone, Copy)]
pub struct WindowInstance {
    pub open: i64,
    pub close: i64,
    pub has_triggered: bool,
}

impl WindowInstance {
    pub fn new(open: i64, close: i64) -> Self {
        Self {
            open,
            close,
            has_triggered: false,
        }
    }

    pub fn set_triggered(&mut self, val: bool) {
        self.has_triggered = val;
    }

    pub fn is_same_window(&self, other: &WindowInstance) -> bool {
        self.open == other.open && self.close == other.close
    }

    /// Whether `timestamp` falls inside `[open, close)`.
    pub fn contains(&self, timestamp: i64) -> bool {
        self.open <= timestamp && timestamp < self.close
    }

    pub fn width(&self) -> i64 {
        self.close - self.open
    }
}

impl PartialEq for WindowInstance {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_window(other)
    }
}

impl Eq for WindowInstance {}

impl Hash for WindowInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.open.hash(state);
        self.close.hash(state);
    }
}

// Ordered by closing bound first so that pending triggers fire in close order.
impl Ord for WindowInstance {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.close, self.open).cmp(&(other.close, other.open))
    }
}

impl PartialOrd for WindowInstance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WindowInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.open, self.close)
    }
}

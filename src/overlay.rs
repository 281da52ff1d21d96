//! Which menu or dropdown is open.

/// Tracks the single open overlay in a view.
///
/// Opening an overlay closes whichever was open before. An activation that
/// lands outside the open overlay closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayScope<K> {
    open: Option<K>,
}

impl<K> Default for OverlayScope<K> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<K: PartialEq> OverlayScope<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, key: K) {
        self.open = Some(key);
    }

    /// Open `key` or close it if it is already open. Returns whether it is
    /// open afterwards.
    pub fn toggle(&mut self, key: K) -> bool {
        if self.is_open(&key) {
            self.open = None;
            false
        } else {
            self.open = Some(key);
            true
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self, key: &K) -> bool {
        self.open.as_ref() == Some(key)
    }

    pub fn current(&self) -> Option<&K> {
        self.open.as_ref()
    }

    /// Handle an activation anywhere in the view. `inside` is the overlay the
    /// activation landed in, if any. Returns true when this closed something.
    pub fn activate(&mut self, inside: Option<&K>) -> bool {
        match (&self.open, inside) {
            (Some(open), Some(target)) if open == target => false,
            (Some(_), _) => {
                self.open = None;
                true
            }
            (None, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Menu {
        Post(&'static str),
        Notifications,
    }

    #[test]
    fn test_opening_one_closes_the_other() {
        let mut scope = OverlayScope::new();
        scope.open(Menu::Post("p1"));
        scope.open(Menu::Notifications);
        assert!(!scope.is_open(&Menu::Post("p1")));
        assert!(scope.is_open(&Menu::Notifications));
    }

    #[test]
    fn test_toggle() {
        let mut scope = OverlayScope::new();
        assert!(scope.toggle(Menu::Post("p1")));
        assert!(!scope.toggle(Menu::Post("p1")));
        assert_eq!(scope.current(), None);
    }

    #[test]
    fn test_outside_activation_closes() {
        let mut scope = OverlayScope::new();
        scope.open(Menu::Post("p1"));
        assert!(!scope.activate(Some(&Menu::Post("p1"))));
        assert!(scope.is_open(&Menu::Post("p1")));
        assert!(scope.activate(Some(&Menu::Post("p2"))));
        assert_eq!(scope.current(), None);
        assert!(!scope.activate(None));
    }
}

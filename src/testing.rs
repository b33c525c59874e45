//! Test doubles shared by the unit tests of several modules.

use crate::traits::WindowManager;
use std::cell::RefCell;
use std::collections::HashSet;

/// A window manager that records every call made to it and keeps an
/// in-memory set of occupied desktops.
///
/// Fresh desktops are named `desk0`, `desk1`, …; destroyed ids are handed
/// out again (most recently destroyed first) before new ones are minted.
#[derive(Debug, Default)]
pub(crate) struct RecorderWm {
    pub focused: String,
    pub occupied: RefCell<HashSet<String>>,
    pub created: Vec<String>,
    pub destroyed: Vec<String>,
    pub focus_calls: RefCell<Vec<String>>,
    pub claims: RefCell<Vec<String>>,
    pub fail_create: bool,
    pub fail_occupied: bool,
    pub fail_destroy: bool,
    pub fail_focus: bool,
    next_id: u32,
    recycled: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("recorder error")]
pub(crate) struct RecorderErr;

impl RecorderWm {
    pub fn new(focused: &str) -> Self {
        Self {
            focused: focused.into(),
            ..Self::default()
        }
    }

    pub fn occupy(&self, id: &str) {
        self.occupied.borrow_mut().insert(id.into());
    }

    pub fn vacate(&self, id: &str) {
        self.occupied.borrow_mut().remove(id);
    }
}

impl WindowManager for RecorderWm {
    type Error = RecorderErr;

    fn focused_desktop(&self) -> Result<String, RecorderErr> {
        Ok(self.focused.clone())
    }

    fn create_desktop(&mut self) -> Result<String, RecorderErr> {
        if self.fail_create {
            return Err(RecorderErr);
        }
        let id = match self.recycled.pop() {
            Some(id) => id,
            None => {
                let id = format!("desk{}", self.next_id);
                self.next_id += 1;
                id
            }
        };
        self.created.push(id.clone());
        Ok(id)
    }

    fn destroy_desktop(&mut self, id: &str) -> Result<(), RecorderErr> {
        if self.fail_destroy {
            return Err(RecorderErr);
        }
        self.destroyed.push(id.into());
        self.recycled.push(id.into());
        Ok(())
    }

    fn focus_desktop(&self, id: &str) -> Result<(), RecorderErr> {
        if self.fail_focus {
            return Err(RecorderErr);
        }
        self.focus_calls.borrow_mut().push(id.into());
        Ok(())
    }

    fn is_occupied(&self, id: &str) -> Result<bool, RecorderErr> {
        if self.fail_occupied {
            return Err(RecorderErr);
        }
        Ok(self.occupied.borrow().contains(id))
    }

    fn claim_focused_window(&self, id: &str) -> Result<(), RecorderErr> {
        self.claims.borrow_mut().push(id.into());
        Ok(())
    }
}

//! This module provides ways to tweak the local task service, so that it can return errors on some tests

use std::error::Error;

/// This stores some behaviour tweaks, that describe how a mocked service will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    // From the TaskService trait
    pub toggle_task_behaviour: (u32, u32),
    pub update_task_behaviour: (u32, u32),
    pub create_task_behaviour: (u32, u32),

    // From the TemplateService trait
    pub create_template_task_behaviour: (u32, u32),
    pub update_template_task_behaviour: (u32, u32),
    pub delete_template_task_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            toggle_task_behaviour: (0, n_fails),
            update_task_behaviour: (0, n_fails),
            create_task_behaviour: (0, n_fails),
            create_template_task_behaviour: (0, n_fails),
            update_template_task_behaviour: (0, n_fails),
            delete_template_task_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_toggle_task(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.toggle_task_behaviour, "toggle_task")
    }
    pub fn can_update_task(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_task_behaviour, "update_task")
    }
    pub fn can_create_task(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_task_behaviour, "create_task")
    }
    pub fn can_create_template_task(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_template_task_behaviour, "create_template_task")
    }
    pub fn can_update_template_task(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_template_task_behaviour, "update_template_task")
    }
    pub fn can_delete_template_task(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_template_task_behaviour, "delete_template_task")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), Box<dyn Error>> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}

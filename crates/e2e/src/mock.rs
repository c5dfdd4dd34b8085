//! In-memory surface for tests.
//!
//! Elements are registered up front, keyed by the locator's display form,
//! and every action is recorded so tests can assert on what a flow did.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{E2eError, E2eResult};
use crate::locator::LocatorPath;
use crate::surface::{Surface, WaitState};

#[derive(Debug, Clone)]
struct MockElement {
    text: String,
    visible: bool,
    count: usize,
}

/// An action performed against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    Click(String),
    Fill(String, String),
    WaitFor(String, WaitState),
    Screenshot(String),
    Close,
}

#[derive(Default)]
pub struct MockSurface {
    elements: HashMap<String, MockElement>,
    actions: Mutex<Vec<Action>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visible element with the given text
    pub fn with_text(mut self, locator: &LocatorPath, text: impl Into<String>) -> Self {
        self.elements.insert(
            locator.to_string(),
            MockElement {
                text: text.into(),
                visible: true,
                count: 1,
            },
        );
        self
    }

    /// Register a visible element with no text
    pub fn with_element(self, locator: &LocatorPath) -> Self {
        self.with_text(locator, "")
    }

    /// Register an element that is attached but not visible
    pub fn with_hidden(mut self, locator: &LocatorPath) -> Self {
        self.elements.insert(
            locator.to_string(),
            MockElement {
                text: String::new(),
                visible: false,
                count: 1,
            },
        );
        self
    }

    /// Register `count` visible matches for the locator
    pub fn with_count(mut self, locator: &LocatorPath, count: usize) -> Self {
        self.elements.insert(
            locator.to_string(),
            MockElement {
                text: String::new(),
                visible: count > 0,
                count,
            },
        );
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().clone()
    }

    /// Last value filled into the locator, if any
    pub fn filled(&self, locator: &LocatorPath) -> Option<String> {
        let key = locator.to_string();
        self.actions.lock().iter().rev().find_map(|action| match action {
            Action::Fill(target, text) if *target == key => Some(text.clone()),
            _ => None,
        })
    }

    pub fn clicked(&self, locator: &LocatorPath) -> bool {
        let key = locator.to_string();
        self.actions
            .lock()
            .iter()
            .any(|action| matches!(action, Action::Click(target) if *target == key))
    }

    pub fn is_closed(&self) -> bool {
        self.actions.lock().contains(&Action::Close)
    }

    fn record(&self, action: Action) {
        self.actions.lock().push(action);
    }

    fn element(&self, locator: &LocatorPath) -> E2eResult<&MockElement> {
        self.elements
            .get(&locator.to_string())
            .filter(|element| element.count > 0)
            .ok_or_else(|| E2eError::ElementNotFound(locator.to_string()))
    }

    fn actionable(&self, locator: &LocatorPath) -> E2eResult<&MockElement> {
        let element = self.element(locator)?;
        if element.visible {
            Ok(element)
        } else {
            Err(E2eError::Timeout(format!("{} to be visible", locator)))
        }
    }
}

#[async_trait]
impl Surface for MockSurface {
    async fn navigate(&self, path: &str) -> E2eResult<()> {
        self.record(Action::Navigate(path.to_string()));
        Ok(())
    }

    async fn count(&self, locator: &LocatorPath) -> E2eResult<usize> {
        Ok(self
            .elements
            .get(&locator.to_string())
            .map_or(0, |element| element.count))
    }

    async fn click(&self, locator: &LocatorPath) -> E2eResult<()> {
        self.actionable(locator)?;
        self.record(Action::Click(locator.to_string()));
        Ok(())
    }

    async fn fill(&self, locator: &LocatorPath, text: &str) -> E2eResult<()> {
        self.actionable(locator)?;
        self.record(Action::Fill(locator.to_string(), text.to_string()));
        Ok(())
    }

    async fn wait_for(&self, locator: &LocatorPath, state: WaitState) -> E2eResult<()> {
        let element = self.elements.get(&locator.to_string()).filter(|e| e.count > 0);
        let satisfied = match state {
            WaitState::Visible => element.map_or(false, |e| e.visible),
            WaitState::Hidden => element.map_or(true, |e| !e.visible),
            WaitState::Attached => element.is_some(),
            WaitState::Detached => element.is_none(),
        };
        if !satisfied {
            return Err(E2eError::Timeout(format!("{} to be {}", locator, state.as_str())));
        }
        self.record(Action::WaitFor(locator.to_string(), state));
        Ok(())
    }

    async fn text(&self, locator: &LocatorPath) -> E2eResult<String> {
        Ok(self.element(locator)?.text.clone())
    }

    async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        self.record(Action::Screenshot(name.to_string()));
        Ok(PathBuf::from(format!("{}.png", name)))
    }

    async fn close(&self) -> E2eResult<()> {
        self.record(Action::Close);
        Ok(())
    }
}

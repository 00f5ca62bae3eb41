use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    domain::{error::NavigationError, event::EventSource},
    port::frame::{Frame, Page}
};

#[derive(Default)]
struct History {
    current: Option<Page>,
    back:    Vec<Page>
}

/// In-memory frame keeping a back stack of displayed pages
#[derive(Default)]
pub struct HistoryFrame {
    history:   Mutex<History>,
    navigated: EventSource<Page>
}

impl HistoryFrame {
    pub fn new() -> Self {
        Self::default()
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Page currently displayed
    pub fn current(&self) -> Option<Page> {
        self.history().current.clone()
    }

    pub fn back_depth(&self) -> usize {
        self.history().back.len()
    }

    /// Fires with every page that becomes current, including on `go_back`
    pub fn navigated(&self) -> &EventSource<Page> {
        &self.navigated
    }
}

impl Frame for HistoryFrame {
    fn navigate(&self, page: Page) -> Result<(), NavigationError> {
        {
            let mut history = self.history();
            if let Some(previous) = history.current.replace(page.clone()) {
                history.back.push(previous);
            }
        }
        self.navigated.publish(&page);
        Ok(())
    }

    fn can_go_back(&self) -> bool {
        !self.history().back.is_empty()
    }

    fn go_back(&self) {
        let restored = {
            let mut history = self.history();
            let Some(previous) = history.back.pop() else {
                return;
            };
            history.current = Some(previous.clone());
            previous
        };
        self.navigated.publish(&restored);
    }
}

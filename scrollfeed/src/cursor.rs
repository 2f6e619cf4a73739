// Copyright 2026 scrollfeed Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Pagination state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CursorState {
    /// Ready to request the next page.
    #[default]
    Idle,
    /// A page request is outstanding.
    LoadingPage,
    /// The provider ran out of pages. Terminal.
    Exhausted,
    /// The last page request failed and will be retried on the next request.
    Failed,
}

/// Tracks which page comes next and whether one may be requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    next_page_index: usize,
    state: CursorState,
}

impl PageCursor {
    /// Index of the page the next request asks for.
    pub fn next_page_index(&self) -> usize {
        self.next_page_index
    }

    /// Current state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Whether a page request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state == CursorState::LoadingPage
    }

    /// Whether the provider reported its last page.
    pub fn is_exhausted(&self) -> bool {
        self.state == CursorState::Exhausted
    }

    /// Whether a new page request may be issued.
    pub fn can_request(&self) -> bool {
        matches!(self.state, CursorState::Idle | CursorState::Failed)
    }

    /// Enter [`CursorState::LoadingPage`] and return the page index to request.
    pub(crate) fn begin(&mut self) -> Option<usize> {
        if !self.can_request() {
            return None;
        }
        self.state = CursorState::LoadingPage;
        Some(self.next_page_index)
    }

    /// A non-empty page arrived.
    pub(crate) fn advance(&mut self) {
        self.next_page_index += 1;
        self.state = CursorState::Idle;
    }

    pub(crate) fn exhaust(&mut self) {
        self.state = CursorState::Exhausted;
    }

    pub(crate) fn fail(&mut self) {
        self.state = CursorState::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_transitions() {
        let mut cursor = PageCursor::default();
        assert_eq!(cursor.begin(), Some(0));
        assert!(cursor.is_loading());
        assert_eq!(cursor.begin(), None);

        cursor.advance();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.begin(), Some(1));

        cursor.fail();
        assert!(cursor.can_request());
        assert_eq!(cursor.begin(), Some(1));

        cursor.exhaust();
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.begin(), None);
        assert_eq!(cursor.next_page_index(), 1);
    }
}

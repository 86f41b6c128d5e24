//! Chapter navigation.

use crate::epub::{Book, Chapter};

/// Which chapter of the loaded book is on screen.
#[derive(Debug, Default)]
pub struct ReaderState {
    chapters: Vec<Chapter>,
    current: usize,
}

/// One row of the chapter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterListItem<'a> {
    pub index: usize,
    pub title: &'a str,
    pub active: bool,
}

impl ReaderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chapter list with a freshly imported book's.
    ///
    /// The previous book is discarded; the first chapter becomes current.
    pub fn load(&mut self, book: Book) {
        self.chapters = book.chapters;
        self.current = 0;
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Chapter> {
        self.chapters.get(self.current)
    }

    /// Jump to a chapter. Out-of-range indexes are ignored.
    ///
    /// Returns whether the current chapter changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.chapters.len() {
            return false;
        }
        let changed = self.current != index;
        self.current = index;
        changed
    }

    pub fn next(&mut self) -> bool {
        self.can_go_forward() && self.go_to(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.can_go_back() && self.go_to(self.current - 1)
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.chapters.len()
    }

    /// "Chapter 3 of 12".
    pub fn page_info(&self) -> String {
        format!("Chapter {} of {}", self.current + 1, self.chapters.len())
    }

    pub fn chapter_list(&self) -> impl Iterator<Item = ChapterListItem<'_>> {
        self.chapters
            .iter()
            .enumerate()
            .map(|(index, chapter)| ChapterListItem {
                index,
                title: &chapter.title,
                active: index == self.current,
            })
    }
}

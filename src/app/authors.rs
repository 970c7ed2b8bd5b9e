// TalkLog - app/authors.rs
//
// Author colour assignment and "self" detection.
//
// Colours come from a fixed pool, handed out in discovery order and cycling
// once the pool is exhausted. Assignments survive restarts through the
// session file.

use crate::util::constants;
use std::collections::HashMap;

/// Colour assignments for every author seen so far.
#[derive(Debug, Clone, Default)]
pub struct AuthorPalette {
    colours: HashMap<String, [u8; 3]>,
    /// Authors in assignment order, oldest first.
    order: Vec<String>,
    /// Index into the colour pool for the next new author.
    next_colour: usize,
    /// Names identifying the local user.
    self_names: Vec<String>,
}

impl AuthorPalette {
    pub fn new(self_names: Vec<String>) -> Self {
        Self {
            self_names,
            ..Self::default()
        }
    }

    /// Rebuild from persisted assignments. Entries beyond the retention cap
    /// are dropped, oldest first.
    pub fn from_persisted(
        assignments: Vec<(String, [u8; 3])>,
        next_colour: usize,
        self_names: Vec<String>,
    ) -> Self {
        let mut palette = Self::new(self_names);
        for (author, colour) in assignments {
            if palette.colours.insert(author.clone(), colour).is_none() {
                palette.order.push(author);
            }
        }
        palette.next_colour = next_colour % constants::AUTHOR_COLOUR_POOL.len();
        palette.enforce_cap();
        palette
    }

    /// Assignments in order, for persistence.
    pub fn to_persisted(&self) -> Vec<(String, [u8; 3])> {
        self.order
            .iter()
            .filter_map(|author| self.colours.get(author).map(|c| (author.clone(), *c)))
            .collect()
    }

    pub fn next_colour(&self) -> usize {
        self.next_colour
    }

    /// Register the authors of a newly loaded document. Returns the names
    /// that had no colour yet, in the order given.
    pub fn register_authors<'a, I>(&mut self, authors: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut discovered = Vec::new();
        for author in authors {
            if self.colours.contains_key(author) {
                continue;
            }
            let pool = &constants::AUTHOR_COLOUR_POOL;
            let colour = pool[self.next_colour % pool.len()];
            self.next_colour = (self.next_colour + 1) % pool.len();
            self.colours.insert(author.to_string(), colour);
            self.order.push(author.to_string());
            discovered.push(author.to_string());
        }
        self.enforce_cap();

        if !discovered.is_empty() {
            tracing::debug!(
                new_authors = discovered.len(),
                known = self.order.len(),
                "Authors registered"
            );
        }
        discovered
    }

    /// Override an author's colour. Unknown authors are remembered as if
    /// discovered, without advancing the pool.
    pub fn set_colour(&mut self, author: &str, colour: [u8; 3]) {
        if self.colours.insert(author.to_string(), colour).is_none() {
            self.order.push(author.to_string());
            self.enforce_cap();
        }
        tracing::debug!(author, ?colour, "Author colour set");
    }

    /// Assigned colour, or the neutral colour for unknown authors.
    pub fn colour_for(&self, author: &str) -> [u8; 3] {
        self.colours
            .get(author)
            .copied()
            .unwrap_or(constants::UNKNOWN_AUTHOR_COLOUR)
    }

    /// An author is the local user when it equals or contains any
    /// configured display name.
    pub fn is_self(&self, author: &str) -> bool {
        self.self_names
            .iter()
            .any(|name| !name.is_empty() && author.contains(name.as_str()))
    }

    pub fn self_names(&self) -> &[String] {
        &self.self_names
    }

    pub fn set_self_names(&mut self, names: Vec<String>) {
        self.self_names = names;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn enforce_cap(&mut self) {
        let excess = self
            .order
            .len()
            .saturating_sub(constants::MAX_REMEMBERED_AUTHORS);
        if excess == 0 {
            return;
        }
        for author in self.order.drain(..excess) {
            self.colours.remove(&author);
        }
    }
}

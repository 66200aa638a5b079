#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Highlighted row of the suggestion list. `None` is the "nothing highlighted" state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionNavigator {
    highlighted: Option<usize>,
    len: usize,
}

impl SelectionNavigator {
    /// Starts over for a freshly ranked list.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.highlighted = None;
    }

    pub fn clear(&mut self) {
        self.reset(0);
    }

    /// Returns `false` when there is nothing to move through.
    pub fn step(&mut self, direction: Direction) -> bool {
        match next_index(self.highlighted, self.len, direction) {
            Some(index) => {
                self.highlighted = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Highlighted index with -1 standing for none.
    pub fn highlighted_index(&self) -> isize {
        self.highlighted.map_or(-1, |index| index as isize)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Circular move over `len` rows; `None` when there are no rows.
fn next_index(current: Option<usize>, len: usize, direction: Direction) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let next = match (direction, current) {
        (Direction::Down, None) => 0,
        (Direction::Down, Some(index)) if index >= last => 0,
        (Direction::Down, Some(index)) => index + 1,
        (Direction::Up, None) | (Direction::Up, Some(0)) => last,
        (Direction::Up, Some(index)) => index - 1,
    };
    Some(next)
}

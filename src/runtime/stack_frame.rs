use crate::runtime::function_table::Range;

/// Maximum number of frames, root included.
pub const MAX_STACK_SIZE: usize = 512;

/// One level of the explicit call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackFrame {
    /// Opcodes this frame executes: the root script or a function body.
    pub range: Range,
    /// Where execution resumes within `range`.
    pub offset: usize,
}

impl StackFrame {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            offset: range.start,
        }
    }
}

/// Fixed-capacity frame array plus a depth cursor.
///
/// `depth` is the index of the active frame and drops below zero once the
/// root frame is exhausted.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<StackFrame>,
    depth: isize,
}

impl CallStack {
    /// A stack holding only the root frame over `root`.
    pub fn new(root: Range) -> Self {
        let mut frames = vec![StackFrame::default(); MAX_STACK_SIZE];
        frames[0] = StackFrame::new(root);
        Self { frames, depth: 0 }
    }

    pub fn depth(&self) -> isize {
        self.depth
    }

    /// `true` once the root frame has been popped.
    pub fn is_empty(&self) -> bool {
        self.depth < 0
    }

    pub fn is_full(&self) -> bool {
        self.depth >= MAX_STACK_SIZE as isize - 1
    }

    pub fn current(&self) -> &StackFrame {
        &self.frames[self.depth as usize]
    }

    pub fn current_mut(&mut self) -> &mut StackFrame {
        &mut self.frames[self.depth as usize]
    }

    /// Saves `resume` as the active frame's offset and enters `range`.
    pub fn push(&mut self, resume: usize, range: Range) {
        self.current_mut().offset = resume;
        self.depth += 1;
        self.frames[self.depth as usize] = StackFrame::new(range);
    }

    pub fn pop(&mut self) {
        self.depth -= 1;
    }

    /// Live frames from the innermost outwards.
    pub fn iter_innermost(&self) -> impl Iterator<Item = &StackFrame> {
        let live = (self.depth + 1).max(0) as usize;
        self.frames[..live].iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_frame() {
        let stack = CallStack::new(Range::new(0, 10));
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current().offset, 0);
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_push_saves_resume_point() {
        let mut stack = CallStack::new(Range::new(0, 10));
        stack.push(6, Range::new(1, 3));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.current().offset, 1);
        let frames: Vec<_> = stack.iter_innermost().collect();
        assert_eq!(frames[1].offset, 6);
    }

    #[test]
    fn test_pop_past_root() {
        let mut stack = CallStack::new(Range::new(0, 1));
        stack.pop();
        assert!(stack.is_empty());
        assert_eq!(stack.iter_innermost().count(), 0);
    }

    #[test]
    fn test_full_at_last_slot() {
        let mut stack = CallStack::new(Range::new(0, 2));
        for _ in 0..MAX_STACK_SIZE - 1 {
            assert!(!stack.is_full());
            stack.push(1, Range::new(0, 1));
        }
        assert!(stack.is_full());
    }
}

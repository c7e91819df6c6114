use super::*;

/// The current template plus a bounded ring of its predecessors, so shares
/// for recently replaced templates can still be matched.
#[derive(Debug)]
pub(crate) struct TemplateHistory {
    current: Option<BlockTemplate>,
    previous: VecDeque<BlockTemplate>,
    capacity: usize,
    next_sequence: u64,
}

impl TemplateHistory {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            current: None,
            previous: VecDeque::with_capacity(capacity),
            capacity,
            next_sequence: 1,
        }
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Makes `template` current and returns whichever template fell off the
    /// end of the ring, if any.
    pub(crate) fn replace(&mut self, template: BlockTemplate) -> Option<BlockTemplate> {
        let previous = self.current.replace(template)?;

        if self.capacity == 0 {
            return Some(previous);
        }

        let evicted = if self.previous.len() == self.capacity {
            self.previous.pop_back()
        } else {
            None
        };

        self.previous.push_front(previous);
        evicted
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<&BlockTemplate> {
        self.current.as_ref()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut BlockTemplate> {
        self.current.as_mut()
    }

    pub(crate) fn find(&self, job_id: &str) -> Option<&BlockTemplate> {
        self.current
            .iter()
            .chain(self.previous.iter())
            .find(|template| template.info().job_id == job_id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.current.iter().count() + self.previous.len()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, fixtures::*, pretty_assertions::assert_eq};

    fn push(history: &mut TemplateHistory, job_id: &str) -> Option<String> {
        let sequence = history.next_sequence();
        history
            .replace(template(job_id, sequence))
            .map(|evicted| evicted.info().job_id.clone())
    }

    #[test]
    fn empty() {
        let history = TemplateHistory::new(4);
        assert!(history.current().is_none());
        assert!(history.find("a").is_none());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn keeps_capacity_predecessors() {
        let mut history = TemplateHistory::new(2);

        assert_eq!(push(&mut history, "a"), None);
        assert_eq!(push(&mut history, "b"), None);
        assert_eq!(push(&mut history, "c"), None);
        assert_eq!(history.len(), 3);

        assert_eq!(push(&mut history, "d"), Some("a".into()));
        assert!(history.find("a").is_none());
        assert_eq!(history.find("b").unwrap().info().sequence, 2);
        assert_eq!(history.current().unwrap().info().job_id, "d");
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn zero_capacity_keeps_only_current() {
        let mut history = TemplateHistory::new(0);

        push(&mut history, "a");
        assert_eq!(push(&mut history, "b"), Some("a".into()));
        assert!(history.find("a").is_none());
        assert!(history.find("b").is_some());
    }

    #[test]
    fn sequence_increases() {
        let mut history = TemplateHistory::new(1);
        assert_eq!(history.next_sequence(), 1);
        assert_eq!(history.next_sequence(), 2);
    }

    #[test]
    fn current_mut_advances_counters() {
        let mut history = TemplateHistory::new(1);
        push(&mut history, "a");

        let template = history.current_mut().unwrap();
        template.issue_for_worker();
        assert_eq!(template.issue_for_worker().pool_nonce, 2);
    }
}

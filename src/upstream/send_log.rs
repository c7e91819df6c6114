use super::*;

/// Method names of the requests sent to a pool, keyed by envelope id. Every
/// outgoing envelope, the login included, takes its id from here.
#[derive(Debug, Default)]
pub(super) struct SendLog {
    last_id: u64,
    pending: BTreeMap<u64, &'static str>,
}

impl SendLog {
    /// Allocates the next envelope id and records `method` under it. The
    /// oldest entry is dropped once the log is full.
    pub(super) fn record(&mut self, method: &'static str) -> u64 {
        self.last_id += 1;

        while self.pending.len() >= SEND_LOG_CAPACITY {
            self.pending.pop_first();
        }
        self.pending.insert(self.last_id, method);

        self.last_id
    }

    pub(super) fn take(&mut self, id: u64) -> Option<&'static str> {
        self.pending.remove(&id)
    }

    /// Forgets unanswered requests. Ids keep increasing across connections.
    pub(super) fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn responses_match_once() {
        let mut log = SendLog::default();

        let login = log.record("login");
        let submit = log.record("submit");
        assert_eq!((login, submit), (1, 2));

        assert_eq!(log.take(submit), Some("submit"));
        assert_eq!(log.take(submit), None);
        assert_eq!(log.take(login), Some("login"));
        assert_eq!(log.take(99), None);
    }

    #[test]
    fn full_log_drops_oldest() {
        let mut log = SendLog::default();

        let first = log.record("heartbeat");
        for _ in 0..SEND_LOG_CAPACITY {
            log.record("submit");
        }

        assert_eq!(log.len(), SEND_LOG_CAPACITY);
        assert_eq!(log.take(first), None);
        assert_eq!(log.take(first + 1), Some("submit"));
    }

    #[test]
    fn ids_survive_clear() {
        let mut log = SendLog::default();
        log.record("login");
        log.clear();

        assert_eq!(log.len(), 0);
        assert_eq!(log.record("login"), 2);
    }
}

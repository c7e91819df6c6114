use super::*;

/// Per-miner difficulty controller. Retargets toward one share every
/// `target_time` and stages the result until the next job is issued.
#[derive(Debug, Clone)]
pub(crate) struct Vardiff {
    target_time: Duration,
    min: Difficulty,
    max: Difficulty,
    current: Difficulty,
    pending: Option<Difficulty>,
    fixed: bool,
}

impl Vardiff {
    pub(crate) fn new(
        start: Difficulty,
        min: Difficulty,
        max: Difficulty,
        target_time: Duration,
        fixed: bool,
    ) -> Self {
        Self {
            target_time,
            min,
            max,
            current: start,
            pending: None,
            fixed,
        }
    }

    pub(crate) fn current(&self) -> Difficulty {
        self.current
    }

    pub(crate) fn pending(&self) -> Option<Difficulty> {
        self.pending
    }

    #[cfg(test)]
    pub(crate) fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub(crate) fn reset(&mut self, start: Difficulty, fixed: bool) {
        self.current = start;
        self.pending = None;
        self.fixed = fixed;
    }

    pub(crate) fn set_new_diff(&mut self, difficulty: u64) {
        let difficulty = Difficulty::new(difficulty)
            .unwrap_or(Difficulty::MIN)
            .clamp(self.min, self.max);

        if difficulty == self.current {
            return;
        }

        debug!("Staging difficulty change {} -> {difficulty}", self.current);
        self.pending = Some(difficulty);
    }

    /// `hashes` is the sum of accepted share difficulties since `elapsed`
    /// started counting.
    pub(crate) fn retarget(&mut self, hashes: u64, elapsed: Duration) {
        let seconds = elapsed.as_secs();

        if self.fixed || hashes == 0 || seconds == 0 {
            return;
        }

        self.set_new_diff((hashes / seconds).saturating_mul(self.target_time.as_secs()));
    }

    pub(crate) fn apply_pending(&mut self) -> Option<Difficulty> {
        let difficulty = self.pending.take()?;
        self.current = difficulty;
        Some(difficulty)
    }
}

//! Clock and score of a time trial.

/// Countdown shared by a run of challenges. Each win scores a point and buys
/// more time; once the clock reaches zero the run is over and further wins
/// are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeTrial {
	initial_secs: u32,
	bonus_secs: u32,
	remaining_secs: u32,
	score: u32,
}

impl TimeTrial {
	/// A fresh run with `initial_secs` on the clock and `bonus_secs` per win.
	pub fn new(initial_secs: u32, bonus_secs: u32) -> Self {
		Self {
			initial_secs,
			bonus_secs,
			remaining_secs: initial_secs,
			score: 0,
		}
	}

	/// Seconds left on the clock.
	pub fn remaining_secs(&self) -> u32 {
		self.remaining_secs
	}

	/// Challenges won so far.
	pub fn score(&self) -> u32 {
		self.score
	}

	/// Seconds added for each win.
	pub fn bonus_secs(&self) -> u32 {
		self.bonus_secs
	}

	/// True once the clock has run out.
	pub fn is_over(&self) -> bool {
		self.remaining_secs == 0
	}

	/// One second passes. Returns true on the tick that ends the run.
	pub fn tick(&mut self) -> bool {
		if self.is_over() {
			return false;
		}
		self.remaining_secs -= 1;
		self.is_over()
	}

	/// Score a win and add the bonus. Returns false, changing nothing, once
	/// the run is over.
	pub fn record_win(&mut self) -> bool {
		if self.is_over() {
			return false;
		}
		self.score += 1;
		self.remaining_secs = self.remaining_secs.saturating_add(self.bonus_secs);
		true
	}

	/// Back to a full clock and no score.
	pub fn restart(&mut self) {
		self.remaining_secs = self.initial_secs;
		self.score = 0;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clock_runs_down_to_zero_once() {
		let mut trial = TimeTrial::new(3, 20);
		assert!(!trial.tick());
		assert!(!trial.tick());
		assert!(trial.tick());
		assert!(trial.is_over());
		assert!(!trial.tick());
		assert_eq!(trial.remaining_secs(), 0);
	}

	#[test]
	fn win_scores_and_adds_time() {
		let mut trial = TimeTrial::new(120, 20);
		for _ in 0..30 {
			trial.tick();
		}
		assert!(trial.record_win());
		assert_eq!(trial.score(), 1);
		assert_eq!(trial.remaining_secs(), 110);
		assert!(trial.record_win());
		assert_eq!(trial.score(), 2);
		assert_eq!(trial.remaining_secs(), 130);
	}

	#[test]
	fn wins_after_time_up_do_not_count() {
		let mut trial = TimeTrial::new(1, 20);
		assert!(trial.tick());
		assert!(!trial.record_win());
		assert_eq!(trial.score(), 0);
		assert!(trial.is_over());
	}

	#[test]
	fn restart_refills_the_clock() {
		let mut trial = TimeTrial::new(2, 20);
		trial.record_win();
		trial.tick();
		trial.tick();
		trial.restart();
		assert_eq!(trial.remaining_secs(), 2);
		assert_eq!(trial.score(), 0);
		assert!(!trial.is_over());
	}
}

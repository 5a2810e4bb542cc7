//! Interval between optimization steps.
use crate::error::JunctionError;
use serde::{Deserialize, Serialize};

/// Interval between optimization steps.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum OptInterval {
    /// Optimization interval specified as interaction steps.
    Steps(usize),

    /// Optimization interval specified as finished episodes.
    Episodes(usize),
}

impl Default for OptInterval {
    /// One update per finished episode.
    fn default() -> Self {
        Self::Episodes(1)
    }
}

impl OptInterval {
    /// Constructs the counter for optimization.
    pub fn counter(self) -> Result<OptIntervalCounter, JunctionError> {
        match self {
            Self::Steps(0) | Self::Episodes(0) => {
                Err(JunctionError::InvalidOptInterval(format!("{:?}", self)))
            }
            _ => Ok(OptIntervalCounter {
                opt_interval: self,
                count: 0,
            }),
        }
    }
}

/// The counter for optimization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OptIntervalCounter {
    opt_interval: OptInterval,
    count: usize,
}

impl OptIntervalCounter {
    /// Counts one interaction step and returns true if the optimization should be done.
    ///
    /// `is_done` tells whether the step finished an episode.
    pub fn do_optimize(&mut self, is_done: bool) -> bool {
        let interval = match self.opt_interval {
            OptInterval::Steps(interval) => interval,
            OptInterval::Episodes(interval) => {
                if !is_done {
                    return false;
                }
                interval
            }
        };

        self.count += 1;
        if self.count == interval {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_interval() {
        let mut counter = OptInterval::Steps(3).counter().unwrap();
        let fired = (0..7)
            .map(|_| counter.do_optimize(false))
            .collect::<Vec<_>>();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_episodes_interval() {
        let mut counter = OptInterval::Episodes(2).counter().unwrap();
        let dones = [false, true, false, false, true, true, true];
        let fired = dones
            .iter()
            .map(|d| counter.do_optimize(*d))
            .collect::<Vec<_>>();
        assert_eq!(fired, vec![false, false, false, false, true, false, true]);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(OptInterval::Steps(0).counter().is_err());
        assert!(OptInterval::Episodes(0).counter().is_err());
    }
}

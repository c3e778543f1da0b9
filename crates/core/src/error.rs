use thiserror::Error;

use crate::model::{IdError, PercentError, RatingParseError};
use crate::time::DayPolicyError;

/// Any validation failure raised by the domain layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Percent(#[from] PercentError),
    #[error(transparent)]
    Rating(#[from] RatingParseError),
    #[error(transparent)]
    DayPolicy(#[from] DayPolicyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Percent, Rating, ScenarioId};

    fn parse(id: &str, rating: &str, score: u32) -> Result<(ScenarioId, Rating, Percent), Error> {
        Ok((ScenarioId::new(id)?, rating.parse()?, Percent::new(score)?))
    }

    #[test]
    fn domain_errors_convert() {
        assert!(parse("cafe-1", "easy", 90).is_ok());
        assert!(matches!(parse(" ", "easy", 90), Err(Error::Id(_))));
        assert!(matches!(parse("cafe-1", "meh", 90), Err(Error::Rating(_))));
        assert!(matches!(parse("cafe-1", "hard", 101), Err(Error::Percent(_))));
    }
}

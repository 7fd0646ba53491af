//! Rating-polarity detector: too many 5-star ratings, or a 5★/1★ split with
//! an empty middle (review-bombing mixed with bought 5-stars).

use std::borrow::Cow;

use super::SignalResult;
use crate::review::{RatingDistribution, Review};

const EXTREME_P5: f64 = 85.0;
const HIGH_P5: f64 = 70.0;
const POLAR_SUM: f64 = 80.0;
const MIDDLE_FLOOR: f64 = 5.0;

pub fn evaluate(supplied: &RatingDistribution, reviews: &[Review]) -> SignalResult {
    let dist: Cow<'_, RatingDistribution> = if supplied.is_blank() {
        Cow::Owned(RatingDistribution::derive_from(reviews))
    } else {
        Cow::Borrowed(supplied)
    };

    let p5 = dist.percent(5);
    let p1 = dist.percent(1);
    let p3 = dist.percent(3);

    let mut out = SignalResult::clean();

    if p5 >= EXTREME_P5 {
        out.penalize_suspicious(35, format!("5-star reviews extremely high ({p5}%)"));
    } else if p5 >= HIGH_P5 {
        out.penalize(15, format!("High 5-star concentration ({p5}%)"));
    }

    if p5 + p1 >= POLAR_SUM && p3 < MIDDLE_FLOOR {
        out.penalize_suspicious(
            20,
            "Bimodal distribution: polarized 5★/1★ with no middle ratings",
        );
    }

    out.distribution = Some(dist.into_owned());
    out.finish()
}

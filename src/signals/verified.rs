//! Verified-purchase detector: campaigns rarely buy the product for every review.

use super::SignalResult;
use crate::review::Review;

pub fn evaluate(reviews: &[Review]) -> SignalResult {
    let mut out = SignalResult::clean();
    if reviews.is_empty() {
        return out;
    }

    let verified = reviews.iter().filter(|r| r.is_verified_purchase).count();
    let ratio = verified as f64 / reviews.len() as f64;
    out.vp_ratio = Some(ratio);

    let pct = (ratio * 100.0).round();
    if ratio < 0.4 {
        out.penalize_suspicious(35, format!("Low Verified Purchase ratio ({pct}%)"));
    } else if ratio < 0.6 {
        out.penalize(15, format!("Below average VP ratio ({pct}%)"));
    }

    out.finish()
}

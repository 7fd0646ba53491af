// tests/scenarios.rs
//
// End-to-end engine scenarios with hand-checked arithmetic.

use chrono::{Duration, NaiveDate};

use review_radar::{
    analyze, combine_scores, grade_reviews, ExternalJudgment, Grade, ProductSummary,
    RatingDistribution, Review, SignalKind, TrustReport,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Body whose every token is unique to `i`, so no two bodies overlap.
fn distinct_body(i: usize) -> String {
    format!("gadget{i} arrived{i} quickly{i} works{i} nicely{i}")
}

#[test]
fn scenario_a_healthy_product_grades_a() {
    let ratings = [5.0, 5.0, 5.0, 5.0, 4.0, 5.0, 3.0, 5.0, 2.0, 5.0];
    let bodies = [
        "Battery lasts about two days with heavy use, charging is quick.",
        "The strap irritated my wrist after a week so I swapped it.",
        "Screen is readable in direct sunlight which surprised me.",
        "Setup took five minutes and the companion app never crashed.",
        "Heart rate readings matched my chest strap during runs.",
        "Notifications arrive late sometimes, otherwise solid value.",
        "Packaging was dented but the device itself was fine.",
        "Sleep tracking overestimates deep sleep by a lot.",
        "Stopped syncing after a firmware update, support was slow.",
        "Gift for my father, he uses the step counter every morning.",
    ];
    let reviews: Vec<Review> = (0..10)
        .map(|i| {
            Review::new(format!("R{i}"), bodies[i])
                .rating(ratings[i])
                .verified(i != 3)
                .dated(ymd(2024, 1, 3) + Duration::weeks(i as i64))
        })
        .collect();
    // page-supplied distribution (p5 = 60%)
    let product = ProductSummary::with_distribution(RatingDistribution::from_pairs([
        (5, 60.0),
        (4, 20.0),
        (3, 10.0),
        (2, 5.0),
        (1, 5.0),
    ]));

    let r = analyze(&reviews, &product);
    for kind in SignalKind::ALL {
        assert_eq!(r.signal(kind).unwrap().raw_score, 100, "{kind:?}");
    }
    assert_eq!(r.score, 100);
    assert_eq!(r.grade, Grade::A);
    assert!(r.flags.is_empty());
    assert_eq!(r.review_count, 10);
    assert_eq!(r.signal(SignalKind::VerifiedPurchase).unwrap().vp_ratio, Some(0.9));
}

#[test]
fn scenario_a_without_page_distribution_sees_seventy_percent() {
    // The same ratings derived locally give p5 = 70%, one tier stricter.
    let ratings = [5.0, 5.0, 5.0, 5.0, 4.0, 5.0, 3.0, 5.0, 2.0, 5.0];
    let reviews: Vec<Review> = ratings
        .iter()
        .enumerate()
        .map(|(i, s)| Review::new(format!("R{i}"), distinct_body(i)).rating(*s))
        .collect();
    let r = analyze(&reviews, &ProductSummary::default());
    let rating = r.signal(SignalKind::RatingDistribution).unwrap();
    assert_eq!(rating.raw_score, 85);
    assert_eq!(rating.flags, vec!["High 5-star concentration (70%)"]);
}

#[test]
fn scenario_b_single_week_campaign() {
    let reviews: Vec<Review> = (0..20)
        .map(|i| {
            Review::new(format!("R{i}"), distinct_body(i))
                .rating(5.0)
                .verified(i < 2)
                .dated(ymd(2024, 5, 12) + Duration::days((i % 7) as i64))
        })
        .collect();

    let r = analyze(&reviews, &ProductSummary::default());

    let vp = r.signal(SignalKind::VerifiedPurchase).unwrap();
    assert_eq!(vp.raw_score, 65);
    assert_eq!(vp.flags, vec!["Low Verified Purchase ratio (10%)"]);

    // One occupied week: max == avg, so only the month rule fires.
    let burst = r.signal(SignalKind::Burst).unwrap();
    assert_eq!(burst.raw_score, 80);
    assert_eq!(burst.flags, vec!["All reviews clustered in the same month"]);
    assert_eq!(burst.peak_week_count, Some(20));

    // 45*.3 + 65*.3 + 80*.2 + 100*.2
    assert_eq!(r.score, 69);
    assert_eq!(r.grade, Grade::B);

    // A low-trust judgment pushes it into the failing range.
    let low_trust = ExternalJudgment::scored(10.0);
    let (_, fused, grade) =
        grade_reviews(&reviews, &ProductSummary::default(), Some(&low_trust));
    assert_eq!(fused, 34);
    assert_eq!(grade, Grade::D);
}

#[test]
fn scenario_b_burst_week_inside_one_month() {
    let mut dates = vec![ymd(2024, 5, 14); 17];
    dates.extend([ymd(2024, 5, 2), ymd(2024, 5, 22), ymd(2024, 5, 29)]);
    let reviews: Vec<Review> = dates
        .iter()
        .enumerate()
        .map(|(i, d)| {
            Review::new(format!("R{i}"), "Great value, five stars, recommended!")
                .rating(5.0)
                .verified(i < 2)
                .dated(*d)
        })
        .collect();

    let r = analyze(&reviews, &ProductSummary::default());
    let burst = r.signal(SignalKind::Burst).unwrap();
    // both penalties stack: 100 - 25 - 20
    assert_eq!(burst.raw_score, 55);
    assert_eq!(
        burst.flags,
        vec![
            "Review burst: 17 reviews in a single week",
            "All reviews clustered in the same month",
        ]
    );
    // Every signal at its floor: 45*.3 + 65*.3 + 55*.2 + 70*.2 = 58
    assert_eq!(r.score, 58);
    assert_eq!(r.grade, Grade::C);
    assert_eq!(r.flags.len(), 6);
}

#[test]
fn scenario_c_identical_bodies() {
    let bodies = [
        "This is the BEST product I have ever bought!",
        "this is the best product i have ever bought",
        "This is the best product I have ever bought!!!",
        "This is the best product, I have ever bought.",
        "THIS IS THE BEST PRODUCT I HAVE EVER BOUGHT",
    ];
    let reviews: Vec<Review> = bodies
        .iter()
        .enumerate()
        .map(|(i, b)| Review::new(format!("R{i}"), *b).verified(true))
        .collect();

    let r = analyze(&reviews, &ProductSummary::default());
    let sim = r.signal(SignalKind::Similarity).unwrap();
    assert_eq!(sim.cluster_size, Some(5));
    assert_eq!(sim.raw_score, 70);
    assert!(sim.suspicious);
    assert_eq!(sim.flags, vec!["5 reviews share suspiciously similar text"]);
}

#[test]
fn scenario_d_fusion_crosses_grade_boundary() {
    assert_eq!(Grade::from_score(50), Grade::C);
    let fused = combine_scores(50, Some(&ExternalJudgment::scored(90.0)));
    assert_eq!(fused, 74);
    assert_eq!(Grade::from_score(fused), Grade::B);
}

#[test]
fn report_keeps_local_grade_and_fused_grade_apart() {
    let reviews: Vec<Review> = (0..5)
        .map(|i| Review::new(format!("R{i}"), "Same words again and again").rating(5.0))
        .collect();
    let analysis = analyze(&reviews, &ProductSummary::default());
    let local = analysis.score;
    let report = TrustReport::assemble(
        Some("B0SCENARIO".into()),
        analysis,
        Some(ExternalJudgment::scored(5.0)),
        chrono::Utc::now(),
    );
    assert_eq!(report.analysis.score, local);
    assert_eq!(
        report.final_score,
        (f64::from(local) * 0.4 + 5.0 * 0.6).round() as u8
    );
    assert_eq!(report.final_grade, Grade::from_score(report.final_score));
}

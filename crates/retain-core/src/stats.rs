//! Aggregation primitives
//!
//! All functions here are pure and total: degenerate inputs (empty record
//! sets, zero denominators) yield zero-valued results, never errors or NaN.
//! Aggregation is commutative over the record set, so results do not depend
//! on input order except where ordering is part of the contract (stable
//! distribution ties, chronological buckets).

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{DistributionBucket, Granularity, NpsBreakdown, TrendPoint};

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Churn rate: cancelled / active-at-period-start, as a percentage
///
/// A zero or negative denominator yields 0.0. The denominator is an
/// explicit argument; callers derive it from the record set (or an
/// authoritative census), never from a constant.
pub fn churn_rate(cancelled: i64, active_at_start: i64) -> f64 {
    if active_at_start <= 0 {
        return 0.0;
    }
    round1(cancelled as f64 / active_at_start as f64 * 100.0)
}

/// Revenue-weighted churn rate: cancelled monthly value / monthly value
/// active at period start, as a percentage
pub fn revenue_churn_rate(cancelled_value: f64, value_at_start: f64) -> f64 {
    if value_at_start <= 0.0 {
        return 0.0;
    }
    round1(cancelled_value / value_at_start * 100.0)
}

/// Group items by a categorical key
///
/// Buckets are sorted descending by count; ties keep first-seen input
/// order. Percentages are each bucket's share of the item total, so bucket
/// counts always sum to the input length.
pub fn distribution<T, F>(items: &[T], key: F) -> Vec<DistributionBucket>
where
    F: Fn(&T) -> String,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, i64> = HashMap::new();
    for item in items {
        let k = key(item);
        if !counts.contains_key(&k) {
            order.push(k.clone());
        }
        *counts.entry(k).or_insert(0) += 1;
    }

    let total = items.len() as i64;
    let mut buckets: Vec<DistributionBucket> = order
        .into_iter()
        .map(|k| {
            let count = counts[&k];
            DistributionBucket {
                key: k,
                count,
                percentage: if total > 0 {
                    round1(count as f64 / total as f64 * 100.0)
                } else {
                    0.0
                },
            }
        })
        .collect();
    // sort_by is stable, so equal counts keep first-seen order
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

/// Net Promoter Score from 0-10 recommendation scores
///
/// Promoters are 9-10, detractors 0-6; passives (7-8) are excluded from
/// the formula but count toward the total. Empty input scores 0.
pub fn nps(scores: &[i64]) -> i64 {
    if scores.is_empty() {
        return 0;
    }
    let total = scores.len() as f64;
    let promoters = scores.iter().filter(|&&s| s >= 9).count() as f64;
    let detractors = scores.iter().filter(|&&s| s <= 6).count() as f64;
    ((promoters - detractors) / total * 100.0).round() as i64
}

/// Full NPS breakdown for report output
pub fn nps_breakdown(scores: &[i64]) -> NpsBreakdown {
    NpsBreakdown {
        score: nps(scores),
        promoters: scores.iter().filter(|&&s| s >= 9).count() as i64,
        passives: scores.iter().filter(|&&s| (7..=8).contains(&s)).count() as i64,
        detractors: scores.iter().filter(|&&s| s <= 6).count() as i64,
        total: scores.len() as i64,
    }
}

/// Mean rating to one decimal (CSAT); 0.0 when empty
pub fn csat(ratings: &[f64]) -> f64 {
    average(ratings)
}

/// Survey response rate: responses / invited, as a percentage
pub fn response_rate(responses: i64, invited: i64) -> f64 {
    if invited <= 0 {
        return 0.0;
    }
    round1(responses as f64 / invited as f64 * 100.0)
}

/// Mean of the values to one decimal; 0.0 when empty
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round1(values.iter().sum::<f64>() / values.len() as f64)
}

/// Whole months between two dates, minimum 1
///
/// Used for lifetime-value computation: a member who cancels in their
/// first month still paid for one.
pub fn months_active(start: NaiveDate, end: NaiveDate) -> i64 {
    let months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    months.max(1) as i64
}

/// Bucket label for a date at the given granularity
pub fn bucket_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => date.format("%Y-%m-%d").to_string(),
        // ISO week, so labels sort chronologically across year boundaries
        Granularity::Weekly => date.format("%G-W%V").to_string(),
        Granularity::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// Group dates into chronologically ordered buckets
pub fn time_buckets(dates: &[NaiveDate], granularity: Granularity) -> Vec<TrendPoint> {
    let mut sorted = dates.to_vec();
    sorted.sort();

    let mut points: Vec<TrendPoint> = Vec::new();
    for date in sorted {
        let label = bucket_label(date, granularity);
        match points.last_mut() {
            Some(last) if last.period == label => last.count += 1,
            _ => points.push(TrendPoint {
                period: label,
                count: 1,
            }),
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_churn_rate_zero_denominator() {
        assert_eq!(churn_rate(0, 0), 0.0);
        assert_eq!(churn_rate(5, 0), 0.0);
    }

    #[test]
    fn test_churn_rate_rounding() {
        assert_eq!(churn_rate(5, 10), 50.0);
        assert_eq!(churn_rate(1, 3), 33.3);
        assert_eq!(churn_rate(2, 3), 66.7);
    }

    #[test]
    fn test_revenue_churn_rate() {
        assert_eq!(revenue_churn_rate(150.0, 1000.0), 15.0);
        assert_eq!(revenue_churn_rate(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_distribution_counts_sum_to_total() {
        let items = vec!["price", "schedule", "price", "price", "schedule", "health"];
        let buckets = distribution(&items, |s| s.to_string());
        let total: i64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, items.len() as i64);
    }

    #[test]
    fn test_distribution_sorted_descending_with_stable_ties() {
        // "b" and "c" tie at 2; "b" appears first in the input
        let items = vec!["a", "b", "c", "b", "c", "a", "a"];
        let buckets = distribution(&items, |s| s.to_string());
        assert_eq!(buckets[0].key, "a");
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[1].key, "b");
        assert_eq!(buckets[2].key, "c");
    }

    #[test]
    fn test_distribution_percentages() {
        let items = vec!["price", "price", "price", "schedule", "schedule"];
        let buckets = distribution(&items, |s| s.to_string());
        assert_eq!(buckets[0].percentage, 60.0);
        assert_eq!(buckets[1].percentage, 40.0);
    }

    #[test]
    fn test_distribution_empty() {
        let items: Vec<&str> = vec![];
        assert!(distribution(&items, |s| s.to_string()).is_empty());
    }

    #[test]
    fn test_nps_extremes() {
        assert_eq!(nps(&[10, 10, 10]), 100);
        assert_eq!(nps(&[0, 0, 0]), -100);
        assert_eq!(nps(&[]), 0);
    }

    #[test]
    fn test_nps_passives_excluded_but_counted() {
        // 1 promoter, 1 detractor, 2 passives: (25% - 25%) = 0
        assert_eq!(nps(&[10, 3, 7, 8]), 0);
        let breakdown = nps_breakdown(&[10, 3, 7, 8]);
        assert_eq!(breakdown.promoters, 1);
        assert_eq!(breakdown.passives, 2);
        assert_eq!(breakdown.detractors, 1);
        assert_eq!(breakdown.total, 4);
    }

    #[test]
    fn test_response_rate() {
        assert_eq!(response_rate(25, 100), 25.0);
        assert_eq!(response_rate(0, 0), 0.0);
        assert_eq!(response_rate(1, 3), 33.3);
    }

    #[test]
    fn test_months_active_minimum_one() {
        assert_eq!(months_active(date(2024, 6, 1), date(2024, 6, 20)), 1);
        assert_eq!(months_active(date(2024, 1, 15), date(2024, 6, 2)), 5);
        assert_eq!(months_active(date(2023, 11, 1), date(2024, 2, 1)), 3);
    }

    #[test]
    fn test_time_buckets_chronological() {
        let dates = vec![
            date(2024, 6, 20),
            date(2024, 5, 2),
            date(2024, 6, 3),
            date(2024, 5, 28),
        ];
        let points = time_buckets(&dates, Granularity::Monthly);
        assert_eq!(
            points,
            vec![
                TrendPoint {
                    period: "2024-05".to_string(),
                    count: 2
                },
                TrendPoint {
                    period: "2024-06".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_weekly_buckets_use_iso_weeks() {
        // 2024-01-01 is a Monday, ISO week 2024-W01
        let points = time_buckets(&[date(2024, 1, 1)], Granularity::Weekly);
        assert_eq!(points[0].period, "2024-W01");
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let a = vec![date(2024, 6, 1), date(2024, 6, 2), date(2024, 5, 30)];
        let b = vec![date(2024, 5, 30), date(2024, 6, 2), date(2024, 6, 1)];
        assert_eq!(
            time_buckets(&a, Granularity::Daily),
            time_buckets(&b, Granularity::Daily)
        );
    }
}

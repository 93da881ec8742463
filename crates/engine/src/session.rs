//! Session building: slices a developer's daily commit plan into coding
//! sessions separated by inactivity gaps (spec.md §4.5).

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Exp};
use sdlc_synth_domain::Seniority;
use std::ops::Range;

use crate::timeline::DayPlan;

/// Per-seniority session shape (spec.md §3 table).
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub target_loc: Range<u32>,
    pub max_commits: Range<u32>,
    /// Inactivity gap in minutes.
    pub inactivity_gap_minutes: Range<i64>,
}

impl SessionParams {
    pub fn for_seniority(seniority: Seniority) -> Self {
        match seniority {
            Seniority::Junior => Self {
                target_loc: 50..151,
                max_commits: 2..6,
                inactivity_gap_minutes: 15..31,
            },
            Seniority::Mid => Self {
                target_loc: 100..301,
                max_commits: 4..9,
                inactivity_gap_minutes: 20..46,
            },
            Seniority::Senior => Self {
                target_loc: 150..501,
                max_commits: 5..13,
                inactivity_gap_minutes: 30..61,
            },
        }
    }
}

/// A transient build-time aggregate grouping planned commit timestamps. Not
/// stored - the commit generator consumes it to produce real `Commit`s, and
/// the PR assembler consumes the resulting commits, then the session itself
/// is discarded.
#[derive(Debug, Clone)]
pub struct Session {
    pub target_loc: u32,
    pub max_commits: u32,
    pub inactivity_gap: Duration,
    pub commit_timestamps: Vec<DateTime<Utc>>,
}

const WORKDAY_START_HOUR: u32 = 9;
const WORKDAY_SPAN_HOURS: f64 = 9.0; // 09:00-18:00 UTC

fn day_commit_timestamps(date: chrono::NaiveDate, count: u32, rng: &mut StdRng) -> Vec<DateTime<Utc>> {
    if count == 0 {
        return Vec::new();
    }

    let day_start = Utc
        .from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("valid midnight"));
    let first_offset_hours = WORKDAY_START_HOUR as f64 + rng.gen::<f64>() * WORKDAY_SPAN_HOURS;
    let mut ts = day_start + Duration::seconds((first_offset_hours * 3600.0) as i64);

    let mut out = Vec::with_capacity(count as usize);
    out.push(ts);

    let interarrival = Exp::new(1.0 / 20.0).expect("mean 20 minutes is positive");
    for _ in 1..count {
        let gap_minutes = interarrival.sample(rng);
        ts += Duration::seconds((gap_minutes * 60.0) as i64);
        out.push(ts);
    }

    out
}

/// Converts the daily commit plan into sessions. Every commit belongs to
/// exactly one session; sessions never cross day boundaries.
pub fn build_sessions(
    seniority: Seniority,
    plans: &[DayPlan],
    rng: &mut StdRng,
) -> Vec<Session> {
    let params = SessionParams::for_seniority(seniority);
    let mut sessions = Vec::new();

    for day_plan in plans {
        if day_plan.commit_count == 0 {
            continue;
        }

        let timestamps = day_commit_timestamps(day_plan.date, day_plan.commit_count, rng);
        let mut current: Option<Session> = None;

        for ts in timestamps {
            let start_new = match &current {
                None => true,
                Some(session) => {
                    let last = *session.commit_timestamps.last().unwrap();
                    let gap = ts - last;
                    gap > session.inactivity_gap
                        || session.commit_timestamps.len() as u32 >= session.max_commits
                }
            };

            if start_new {
                if let Some(session) = current.take() {
                    sessions.push(session);
                }
                current = Some(Session {
                    target_loc: rng.gen_range(params.target_loc.clone()),
                    max_commits: rng.gen_range(params.max_commits.clone()),
                    inactivity_gap: Duration::minutes(
                        rng.gen_range(params.inactivity_gap_minutes.clone()),
                    ),
                    commit_timestamps: vec![ts],
                });
            } else if let Some(session) = current.as_mut() {
                session.commit_timestamps.push(ts);
            }
        }

        if let Some(session) = current.take() {
            sessions.push(session);
        }
    }

    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn every_commit_belongs_to_exactly_one_session() {
        let plans = vec![DayPlan {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            commit_count: 10,
        }];
        let mut rng = crate::rng::RngStreams::new(7).sub_rng("test");
        let sessions = build_sessions(Seniority::Senior, &plans, &mut rng);
        let total: usize = sessions.iter().map(|s| s.commit_timestamps.len()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn sessions_never_cross_day_boundaries() {
        let plans = vec![
            DayPlan {
                date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
                commit_count: 3,
            },
            DayPlan {
                date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
                commit_count: 3,
            },
        ];
        let mut rng = crate::rng::RngStreams::new(7).sub_rng("test");
        let sessions = build_sessions(Seniority::Mid, &plans, &mut rng);
        for session in &sessions {
            let first_date = session.commit_timestamps.first().unwrap().date_naive();
            assert!(session
                .commit_timestamps
                .iter()
                .all(|ts| ts.date_naive() == first_date));
        }
    }

    #[test]
    fn empty_day_plan_produces_no_sessions() {
        let plans = vec![DayPlan {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            commit_count: 0,
        }];
        let mut rng = crate::rng::RngStreams::new(7).sub_rng("test");
        let sessions = build_sessions(Seniority::Junior, &plans, &mut rng);
        assert!(sessions.is_empty());
    }
}
